//! Checkpoint I/O
//!
//! Checkpoints are [`ModelState`] documents: metadata, an ordered parameter
//! table with shapes, and one flat data vector. JSON is the default format;
//! YAML is chosen by a `.yaml`/`.yml` extension.

mod format;
mod load;
mod model;
mod save;

pub use format::ModelFormat;
pub use load::{load_checkpoint, load_into};
pub use model::{ModelMetadata, ModelState, ParameterInfo};
pub use save::save_checkpoint;
