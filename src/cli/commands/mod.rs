//! CLI command implementations

mod info;
mod train;
mod validate;


use crate::cli::LogLevel;
use crate::config::{Cli, Command, RvaeConfig};
use std::path::Path;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
    }
}

fn load_config(path: &Path) -> Result<RvaeConfig, String> {
    RvaeConfig::from_yaml_file(path).map_err(|e| format!("Config error: {e}"))
}
