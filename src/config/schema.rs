//! YAML schema for RVAE training runs
//!
//! Every field is defaulted, so an empty document is a valid configuration
//! and a YAML file only needs to name what it changes.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RvaeConfig {
    /// Architecture and regularisation of the network
    pub model: ModelConfig,

    /// Corpus selection and batching
    pub data: DataConfig,

    /// Optimisation loop
    pub training: TrainingConfig,
}

impl RvaeConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("Failed to parse YAML config: {e}")))
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))
    }
}

/// Network shape and dropout rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Word embedding size
    pub emsize: usize,

    /// LSTM hidden units
    pub nhid: usize,

    /// Recurrent layers (only 1 is supported)
    pub nlayers: usize,

    /// Latent code dimensionality
    pub z_dim: usize,

    /// Locked dropout on decoder outputs
    pub dropout: f32,

    /// Dropout on the encoder's final hidden state
    pub dropouth: f32,

    /// Locked dropout on embedded inputs
    pub dropouti: f32,

    /// Whole-word dropout on the embedding matrix
    pub dropoute: f32,

    /// DropConnect rate on hidden-to-hidden weights
    pub wdrop: f32,

    /// Probability of keeping a decoder input word
    pub keep_rate: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            emsize: 512,
            nhid: 1024,
            nlayers: 1,
            z_dim: 32,
            dropout: 0.5,
            dropouth: 0.25,
            dropouti: 0.1,
            dropoute: 0.1,
            wdrop: 0.5,
            keep_rate: 0.5,
        }
    }
}

/// Which corpus and how to batch it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Registered dataset name (`ptb`, `wt2`)
    pub dataset: String,

    /// Directory holding the split files
    pub data_dir: PathBuf,

    /// Sentences per batch
    pub batch_size: usize,

    /// Maximum words per sentence
    pub bptt: usize,

    /// Minimum training-set count for a word to get its own id
    pub min_freq: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset: "ptb".to_string(),
            data_dir: PathBuf::from("data/penn"),
            batch_size: 80,
            bptt: 70,
            min_freq: 1,
        }
    }
}

/// Optimisation and schedule settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Initial learning rate
    pub lr: f32,

    /// Global gradient-norm cap
    pub clip: f32,

    /// Upper epoch limit
    pub epochs: usize,

    /// Epoch at which the KL weight starts growing
    pub kl_anneal_delay: usize,

    /// KL weight increment per training batch
    pub kl_anneal_rate: f32,

    /// KL weight before annealing starts
    pub kl_anneal_start: f32,

    /// KL weight ceiling
    pub kl_anneal_cap: f32,

    /// Clamp on the KL term; 0 disables the clamp
    pub max_kl_penalty: f32,

    /// Activation regularisation coefficient
    pub alpha: f32,

    /// Temporal activation regularisation coefficient
    pub beta: f32,

    /// L2 weight decay
    pub wdecay: f32,

    /// Epochs at which the learning rate is decayed
    pub lr_milestones: Vec<usize>,

    /// Decay factor applied at each milestone
    pub lr_gamma: f32,

    /// Switch SGD to ASGD when validation stalls
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub asgd_trigger: bool,

    /// Non-monotone window for the ASGD trigger
    pub nonmono: usize,

    /// Evaluate with the posterior mean instead of a sample
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub deterministic_eval: bool,

    /// Random seed
    pub seed: u64,

    /// Batches between progress lines
    pub log_interval: usize,

    /// Compute device; only `cpu` is available
    pub device: String,

    /// Checkpoint path; `null` disables saving
    #[serde(default = "default_save_path")]
    pub save: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            lr: 1.0,
            clip: 3.0,
            epochs: 1000,
            kl_anneal_delay: 10,
            kl_anneal_rate: 0.0002,
            kl_anneal_start: 0.0001,
            kl_anneal_cap: 1.0,
            max_kl_penalty: 0.0,
            alpha: 2.0,
            beta: 1.0,
            wdecay: 1.2e-6,
            lr_milestones: vec![15, 25, 35, 45],
            lr_gamma: 0.7,
            asgd_trigger: false,
            nonmono: 5,
            deterministic_eval: false,
            seed: 1111,
            log_interval: 100,
            device: "cpu".to_string(),
            save: default_save_path(),
        }
    }
}

/// `<unix time in microseconds>.json`, unique per run
fn default_save_path() -> Option<PathBuf> {
    Some(PathBuf::from(format!("{}.json", chrono::Utc::now().timestamp_micros())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = RvaeConfig::from_yaml_str("{}").expect("empty config should parse");
        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.data, DataConfig::default());
        assert_eq!(config.training.epochs, 1000);
        assert_eq!(config.training.lr_milestones, vec![15, 25, 35, 45]);
        assert!(config.training.save.is_some());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let yaml = r"
model:
  nhid: 64
data:
  dataset: wt2
training:
  seed: 7
  asgd_trigger: 'true'
";
        let config = RvaeConfig::from_yaml_str(yaml).expect("config should parse");
        assert_eq!(config.model.nhid, 64);
        assert_eq!(config.model.emsize, 512);
        assert_eq!(config.data.dataset, "wt2");
        assert_eq!(config.data.batch_size, 80);
        assert_eq!(config.training.seed, 7);
        assert!(config.training.asgd_trigger);
    }

    #[test]
    fn test_null_save_disables_checkpointing() {
        let config = RvaeConfig::from_yaml_str("training:\n  save: null\n").expect("config should parse");
        assert!(config.training.save.is_none());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = RvaeConfig::default();
        config.training.save = Some(PathBuf::from("run.json"));
        let yaml = config.to_yaml().expect("serialize");
        assert_eq!(RvaeConfig::from_yaml_str(&yaml).expect("parse"), config);
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        assert!(matches!(
            RvaeConfig::from_yaml_str("model: [unclosed"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert!(matches!(
            RvaeConfig::from_yaml_file("/nonexistent/rvae.yaml"),
            Err(Error::Config(_))
        ));
    }
}
