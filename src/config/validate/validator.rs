//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::RvaeConfig;

/// Validate a run configuration
///
/// Checks numeric ranges and the supported architecture. Dataset files are
/// not touched here; the registry reports missing corpora when loading.
pub fn validate_config(config: &RvaeConfig) -> Result<(), ValidationError> {
    let model = &config.model;
    for (name, value) in [("emsize", model.emsize), ("nhid", model.nhid), ("z_dim", model.z_dim)] {
        if value == 0 {
            return Err(ValidationError::InvalidDimension { name, value });
        }
    }
    if model.nlayers != 1 {
        return Err(ValidationError::UnsupportedLayers(model.nlayers));
    }
    for (name, value) in [
        ("dropout", model.dropout),
        ("dropouth", model.dropouth),
        ("dropouti", model.dropouti),
        ("dropoute", model.dropoute),
        ("wdrop", model.wdrop),
    ] {
        if !(0.0..1.0).contains(&value) {
            return Err(ValidationError::InvalidDropout { name, value });
        }
    }
    if !(0.0..=1.0).contains(&model.keep_rate) {
        return Err(ValidationError::InvalidKeepRate(model.keep_rate));
    }

    let data = &config.data;
    if data.dataset.trim().is_empty() {
        return Err(ValidationError::EmptyDataset);
    }
    if data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(data.batch_size));
    }
    if data.bptt == 0 {
        return Err(ValidationError::InvalidSeqLen(data.bptt));
    }

    let training = &config.training;
    if !(training.lr.is_finite() && training.lr > 0.0) {
        return Err(ValidationError::InvalidLearningRate(training.lr));
    }
    if !(training.clip > 0.0) {
        return Err(ValidationError::InvalidGradClip(training.clip));
    }
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if !(training.kl_anneal_rate >= 0.0) {
        return Err(ValidationError::InvalidAnnealRate(training.kl_anneal_rate));
    }
    if !(training.kl_anneal_start >= 0.0 && training.kl_anneal_start <= training.kl_anneal_cap) {
        return Err(ValidationError::InvalidAnnealRange {
            start: training.kl_anneal_start,
            cap: training.kl_anneal_cap,
        });
    }
    for (name, value) in [
        ("max_kl_penalty", training.max_kl_penalty),
        ("alpha", training.alpha),
        ("beta", training.beta),
        ("wdecay", training.wdecay),
    ] {
        if !(value >= 0.0) {
            return Err(ValidationError::NegativeCoefficient { name, value });
        }
    }
    if !(training.lr_gamma > 0.0 && training.lr_gamma <= 1.0) {
        return Err(ValidationError::InvalidLrGamma(training.lr_gamma));
    }
    if training.nonmono == 0 {
        return Err(ValidationError::InvalidNonmono(training.nonmono));
    }
    if training.log_interval == 0 {
        return Err(ValidationError::InvalidLogInterval(training.log_interval));
    }
    if !training.device.eq_ignore_ascii_case("cpu") {
        return Err(ValidationError::UnsupportedDevice(training.device.clone()));
    }

    Ok(())
}
