//! YAML config and command-line override tests

use rvae::config::{apply_overrides, parse_args, validate_config, Command, RvaeConfig, ValidationError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_yaml_file_then_flags() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.yaml");
    fs::write(
        &path,
        "model:\n  z_dim: 16\n  keep_rate: 0.75\ntraining:\n  epochs: 40\n  lr_milestones: [10, 20]\n",
    )
    .unwrap();

    let cli = parse_args([
        "rvae",
        "train",
        "--config",
        path.to_str().unwrap(),
        "--epochs",
        "3",
        "--no-save",
    ])
    .unwrap();
    let Command::Train(args) = cli.command else {
        panic!("expected train command");
    };

    let mut config = RvaeConfig::from_yaml_file(args.config.as_ref().unwrap()).unwrap();
    apply_overrides(&mut config, &args);
    assert_eq!(config.model.z_dim, 16);
    assert_eq!(config.model.keep_rate, 0.75);
    assert_eq!(config.training.epochs, 3);
    assert_eq!(config.training.lr_milestones, vec![10, 20]);
    assert!(config.training.save.is_none());
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_yaml_out_of_range_value_rejected() {
    let config = RvaeConfig::from_yaml_str("training:\n  lr: -1.0\n").unwrap();
    assert_eq!(validate_config(&config), Err(ValidationError::InvalidLearningRate(-1.0)));
}
