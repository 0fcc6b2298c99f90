//! Run configuration: YAML schema, command line, validation

pub mod cli;
mod schema;
mod validate;

pub use cli::{apply_overrides, parse_args, Cli, Command, InfoArgs, OutputFormat, TrainArgs, ValidateArgs};
pub use schema::{DataConfig, ModelConfig, RvaeConfig, TrainingConfig};
pub use validate::{validate_config, ValidationError};
