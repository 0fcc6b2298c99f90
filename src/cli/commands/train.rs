//! Train command implementation

use super::load_config;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, validate_config, RvaeConfig, TrainArgs};
use crate::data::{DataOptions, DatasetRegistry, Split};
use crate::train::{CancellationToken, RvaeTrainer};

const RULE_WIDTH: usize = 89;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => {
            log(level, LogLevel::Verbose, &format!("Loading config from {}", path.display()));
            load_config(path)?
        }
        None => RvaeConfig::default(),
    };
    apply_overrides(&mut config, &args);
    validate_config(&config).map_err(|e| format!("Config error: {e}"))?;

    let yaml = config.to_yaml().map_err(|e| e.to_string())?;
    log(level, LogLevel::Normal, "Configuration:");
    log(level, LogLevel::Normal, yaml.trim_end());

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config validated successfully");
        return Ok(());
    }

    let registry = DatasetRegistry::with_defaults();
    let source = registry
        .create(&config.data.dataset, &DataOptions::from_config(&config.data))
        .map_err(|e| format!("Data error: {e}"))?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Dataset {}: {} words in vocabulary, {}/{}/{} train/valid/test sentences",
            source.name(),
            source.vocab().len(),
            source.num_sentences(Split::Train),
            source.num_sentences(Split::Valid),
            source.num_sentences(Split::Test),
        ),
    );

    let mut trainer = RvaeTrainer::new(&config, source.vocab().len())
        .map_err(|e| e.to_string())?
        .with_log_level(level)
        .with_vocab(source.vocab());
    log(level, LogLevel::Verbose, &trainer.model().to_string());
    log(
        level,
        LogLevel::Normal,
        &format!("Model total parameters: {}", trainer.model().num_parameters()),
    );

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        log(level, LogLevel::Verbose, &format!("Ctrl-C handler not installed: {e}"));
    }

    let final_state = trainer
        .run_training(source.as_ref(), &cancel)
        .map_err(|e| format!("Training error: {e}"))?;

    let test = trainer
        .evaluate(&final_state, &source.batches(Split::Test, None))
        .map_err(|e| format!("Evaluation error: {e}"))?;
    log(level, LogLevel::Normal, &"=".repeat(RULE_WIDTH));
    log(
        level,
        LogLevel::Normal,
        &format!(
            "| End of training | test loss {:5.2} | test ppl {:8.2}",
            test.loss,
            test.perplexity()
        ),
    );
    log(level, LogLevel::Normal, &"=".repeat(RULE_WIDTH));

    if let Some(path) = &final_state.checkpoint {
        log(level, LogLevel::Normal, &format!("Checkpoint: {}", path.display()));
    }
    Ok(())
}
