//! Validate command implementation

use super::load_config;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{validate_config, RvaeConfig, ValidateArgs};

/// One-line summaries of each config section
pub fn summarize(config: &RvaeConfig) -> Vec<String> {
    let model = &config.model;
    let data = &config.data;
    let training = &config.training;
    vec![
        format!(
            "  Model: emsize={} nhid={} nlayers={} z_dim={}",
            model.emsize, model.nhid, model.nlayers, model.z_dim
        ),
        format!(
            "  Dropout: out={} hidden={} input={} embed={} weight={} keep_rate={}",
            model.dropout, model.dropouth, model.dropouti, model.dropoute, model.wdrop, model.keep_rate
        ),
        format!(
            "  Data: {} in {} (batch_size={}, bptt={})",
            data.dataset,
            data.data_dir.display(),
            data.batch_size,
            data.bptt
        ),
        format!(
            "  Optimizer: sgd (lr={}, clip={}, wdecay={}){}",
            training.lr,
            training.clip,
            training.wdecay,
            if training.asgd_trigger { " -> asgd" } else { "" }
        ),
        format!(
            "  KL anneal: start={} rate={} delay={} cap={}",
            training.kl_anneal_start, training.kl_anneal_rate, training.kl_anneal_delay, training.kl_anneal_cap
        ),
        format!("  Epochs: {}", training.epochs),
        match &training.save {
            Some(path) => format!("  Checkpoint: {}", path.display()),
            None => "  Checkpoint: disabled".to_string(),
        },
    ]
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let config = load_config(&args.config)?;
    validate_config(&config).map_err(|e| format!("Validation failed: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        for line in summarize(&config) {
            log(level, LogLevel::Normal, &line);
        }
    }

    Ok(())
}
