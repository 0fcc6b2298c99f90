//! rvae CLI
//!
//! # Usage
//!
//! ```bash
//! # Train with defaults (Penn Treebank under data/penn)
//! rvae train
//!
//! # Train from config with overrides
//! rvae train --config rvae.yaml --epochs 40 --z-dim 16
//!
//! # Validate config
//! rvae validate rvae.yaml
//!
//! # Show config info
//! rvae info rvae.yaml --format json
//! ```

use clap::Parser;
use rvae::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
