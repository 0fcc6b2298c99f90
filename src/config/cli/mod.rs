//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! rvae train --epochs 40 --nhid 512
//! rvae train --config run.yaml --seed 7
//! rvae validate run.yaml
//! rvae info run.yaml --format json
//! ```

mod core;
mod types;

pub use self::core::{apply_overrides, parse_args, Cli, Command, InfoArgs, TrainArgs, ValidateArgs};
pub use types::OutputFormat;
