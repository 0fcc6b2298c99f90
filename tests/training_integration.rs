//! End-to-end training tests
//!
//! Corpus files on disk → registry → trainer → checkpoint → reload.

use rvae::config::{ModelConfig, RvaeConfig};
use rvae::data::{BatchSource, DataOptions, DatasetRegistry, Split};
use rvae::io::load_into;
use rvae::model::Rvae;
use rvae::train::{CancellationToken, Evaluator, RvaeTrainer};
use rvae::Error;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WIKI: &str = " = Heading = \n\
 the cat sat on the mat \n\
 \n\
 = = Sub heading = = \n\
 a dog ran in the park \n\
 the dog sat on a mat \n\
 a cat ran in the park \n";

fn write_wikitext(dir: &Path) {
    for split in ["train", "valid", "test"] {
        fs::write(dir.join(format!("wiki.{split}.tokens")), WIKI).unwrap();
    }
}

fn tiny_config(dir: &Path) -> RvaeConfig {
    let mut config = RvaeConfig::default();
    config.model = ModelConfig {
        emsize: 6,
        nhid: 8,
        z_dim: 3,
        ..ModelConfig::default()
    };
    config.data.dataset = "wt2".to_string();
    config.data.data_dir = dir.to_path_buf();
    config.data.batch_size = 2;
    config.data.bptt = 10;
    config.training.epochs = 1;
    config.training.log_interval = 1000;
    config.training.deterministic_eval = true;
    config.training.save = Some(dir.join("ckpt").join("best.json"));
    config
}

#[test]
fn test_wikitext_training_checkpoint_reload() {
    let dir = TempDir::new().unwrap();
    write_wikitext(dir.path());
    let config = tiny_config(dir.path());

    let source = DatasetRegistry::with_defaults()
        .create("wt2", &DataOptions::from_config(&config.data))
        .unwrap();
    assert_eq!(source.num_sentences(Split::Train), 4);

    let mut trainer = RvaeTrainer::new(&config, source.vocab().len())
        .unwrap()
        .with_log_level(rvae::cli::LogLevel::Quiet)
        .with_vocab(source.vocab());
    let final_state = trainer.run_training(source.as_ref(), &CancellationToken::new()).unwrap();
    assert_eq!(final_state.epochs_completed(), 1);
    assert_eq!(final_state.state.global_step, 2);

    let test_batches = source.batches(Split::Test, None);
    let from_trainer = trainer.evaluate(&final_state, &test_batches).unwrap();
    assert!(from_trainer.loss.is_finite());
    assert!(from_trainer.perplexity() > 1.0);

    let path = final_state.checkpoint.clone().unwrap();
    let mut reloaded = Rvae::new(&config.model, source.vocab().len(), 999).unwrap();
    let metadata = load_into(&mut reloaded, &path).unwrap();
    assert_eq!(metadata.vocab.unwrap().len(), source.vocab().len());

    let pad = source.vocab().specials().pad;
    let from_checkpoint = Evaluator::new(0, true, pad)
        .evaluate(&reloaded, &test_batches, final_state.anneal())
        .unwrap();
    assert!((from_checkpoint.loss - from_trainer.loss).abs() < 1e-4);
}

#[test]
fn test_checkpoint_into_wrong_shape_fails() {
    let dir = TempDir::new().unwrap();
    write_wikitext(dir.path());
    let config = tiny_config(dir.path());
    let source = DatasetRegistry::with_defaults()
        .create("wt2", &DataOptions::from_config(&config.data))
        .unwrap();
    let mut trainer = RvaeTrainer::new(&config, source.vocab().len())
        .unwrap()
        .with_log_level(rvae::cli::LogLevel::Quiet);
    let final_state = trainer.run_training(source.as_ref(), &CancellationToken::new()).unwrap();

    let mut bigger = config.model.clone();
    bigger.nhid = 12;
    let mut other = Rvae::new(&bigger, source.vocab().len(), 1).unwrap();
    let err = load_into(&mut other, final_state.checkpoint.unwrap()).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn test_missing_corpus_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = tiny_config(dir.path());
    let err = DatasetRegistry::with_defaults()
        .create("wt2", &DataOptions::from_config(&config.data))
        .err()
        .unwrap();
    assert!(matches!(err, Error::Data(_)));
}

#[test]
fn test_cancelled_run_still_evaluates() {
    let dir = TempDir::new().unwrap();
    write_wikitext(dir.path());
    let mut config = tiny_config(dir.path());
    config.training.save = None;
    let source = DatasetRegistry::with_defaults()
        .create("wt2", &DataOptions::from_config(&config.data))
        .unwrap();
    let mut trainer = RvaeTrainer::new(&config, source.vocab().len())
        .unwrap()
        .with_log_level(rvae::cli::LogLevel::Quiet);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let final_state = trainer.run_training(source.as_ref(), &cancel).unwrap();
    assert!(final_state.cancelled);
    assert!(final_state.checkpoint.is_none());

    let result = trainer.evaluate(&final_state, &source.batches(Split::Test, None)).unwrap();
    assert!(result.loss.is_finite());
}
