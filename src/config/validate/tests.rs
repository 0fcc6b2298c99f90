//! Validation tests

use super::*;
use crate::config::RvaeConfig;
use proptest::prelude::*;

#[test]
fn test_defaults_are_valid() {
    assert_eq!(validate_config(&RvaeConfig::default()), Ok(()));
}

#[test]
fn test_rejects_multiple_layers() {
    let mut config = RvaeConfig::default();
    config.model.nlayers = 2;
    assert_eq!(validate_config(&config), Err(ValidationError::UnsupportedLayers(2)));
}

#[test]
fn test_rejects_zero_latent() {
    let mut config = RvaeConfig::default();
    config.model.z_dim = 0;
    assert_eq!(
        validate_config(&config),
        Err(ValidationError::InvalidDimension { name: "z_dim", value: 0 })
    );
}

#[test]
fn test_rejects_full_dropout() {
    let mut config = RvaeConfig::default();
    config.model.wdrop = 1.0;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidDropout { name: "wdrop", .. })
    ));
}

#[test]
fn test_keep_rate_bounds() {
    let mut config = RvaeConfig::default();
    for keep in [0.0, 0.5, 1.0] {
        config.model.keep_rate = keep;
        assert_eq!(validate_config(&config), Ok(()));
    }
    for keep in [-0.1, 1.1] {
        config.model.keep_rate = keep;
        assert_eq!(validate_config(&config), Err(ValidationError::InvalidKeepRate(keep)));
    }
}

#[test]
fn test_rejects_gpu_device() {
    let mut config = RvaeConfig::default();
    config.training.device = "cuda".to_string();
    assert_eq!(
        validate_config(&config),
        Err(ValidationError::UnsupportedDevice("cuda".to_string()))
    );
}

#[test]
fn test_rejects_inverted_anneal_range() {
    let mut config = RvaeConfig::default();
    config.training.kl_anneal_start = 0.5;
    config.training.kl_anneal_cap = 0.1;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidAnnealRange { .. })
    ));
}

#[test]
fn test_rejects_nan_learning_rate() {
    let mut config = RvaeConfig::default();
    config.training.lr = f32::NAN;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidLearningRate(_))
    ));
}

#[test]
fn test_rejects_negative_alpha() {
    let mut config = RvaeConfig::default();
    config.training.alpha = -1.0;
    assert_eq!(
        validate_config(&config),
        Err(ValidationError::NegativeCoefficient { name: "alpha", value: -1.0 })
    );
}

proptest! {
    #[test]
    fn prop_dropout_in_unit_interval_is_accepted(p in 0.0f32..0.999) {
        let mut config = RvaeConfig::default();
        config.model.dropout = p;
        config.model.dropoute = p;
        prop_assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn prop_non_positive_clip_is_rejected(clip in -10.0f32..=0.0) {
        let mut config = RvaeConfig::default();
        config.training.clip = clip;
        prop_assert_eq!(validate_config(&config), Err(ValidationError::InvalidGradClip(clip)));
    }
}
