//! Serializable checkpoint structure

use crate::error::{Error, Result};
use crate::model::Rvae;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Checkpoint metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Run identifier
    pub name: String,

    /// Model architecture type
    pub architecture: String,

    /// Format version
    pub version: String,

    /// Run configuration the weights were trained with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_config: Option<serde_json::Value>,

    /// Token list, index = id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab: Option<Vec<String>>,

    /// Custom metadata fields (epoch, validation loss, ...)
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create new metadata with minimal fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: "rvae".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            training_config: None,
            vocab: None,
            custom: HashMap::new(),
        }
    }

    /// Add custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }

    pub fn with_training_config(mut self, config: serde_json::Value) -> Self {
        self.training_config = Some(config);
        self
    }

    pub fn with_vocab(mut self, tokens: Vec<String>) -> Self {
        self.vocab = Some(tokens);
        self
    }
}

/// Information about a stored parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g. `decoder.lstm.w_hh`)
    pub name: String,

    /// `[rows, cols]`
    pub shape: Vec<usize>,

    /// Data type
    pub dtype: String,
}

/// Serializable model state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Parameter information, in storage order
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

impl ModelState {
    /// Snapshot the model's parameters
    pub fn capture(model: &Rvae, metadata: ModelMetadata) -> Self {
        let mut data = Vec::with_capacity(model.num_parameters());
        let parameters = model
            .named_parameters()
            .into_iter()
            .map(|(name, tensor)| {
                data.extend(tensor.data().iter().copied());
                let (rows, cols) = tensor.shape();
                ParameterInfo {
                    name,
                    shape: vec![rows, cols],
                    dtype: "f32".to_string(),
                }
            })
            .collect();

        Self {
            metadata,
            parameters,
            data,
        }
    }

    /// Copy stored weights into `model`
    ///
    /// Every model parameter must be present with the same shape; nothing is
    /// written unless all of them match.
    pub fn restore(&self, model: &mut Rvae) -> Result<()> {
        let mut offsets = HashMap::with_capacity(self.parameters.len());
        let mut offset = 0usize;
        for info in &self.parameters {
            let size: usize = info.shape.iter().product();
            offsets.insert(info.name.as_str(), (offset, info));
            offset += size;
        }
        if offset != self.data.len() {
            return Err(Error::shape_mismatch("checkpoint data length", offset, self.data.len()));
        }

        let mut updates = Vec::new();
        for (name, tensor) in model.named_parameters() {
            let (start, info) = offsets
                .get(name.as_str())
                .ok_or_else(|| Error::Serialization(format!("checkpoint is missing parameter {name}")))?;
            let (rows, cols) = tensor.shape();
            if info.shape != [rows, cols] {
                return Err(Error::shape_mismatch(
                    format!("checkpoint parameter {name}"),
                    format!("{:?}", [rows, cols]),
                    format!("{:?}", info.shape),
                ));
            }
            updates.push((*start, rows * cols));
        }

        for ((start, len), (_, tensor)) in updates.into_iter().zip(model.named_parameters_mut()) {
            let values = &self.data[start..start + len];
            tensor
                .data_mut()
                .iter_mut()
                .zip(values)
                .for_each(|(dst, &src)| *dst = src);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn tiny(seed: u64) -> Rvae {
        let config = ModelConfig {
            emsize: 3,
            nhid: 4,
            z_dim: 2,
            ..ModelConfig::default()
        };
        Rvae::new(&config, 8, seed).unwrap()
    }

    #[test]
    fn test_model_metadata_creation() {
        let meta = ModelMetadata::new("run")
            .with_custom("epoch", serde_json::json!(3))
            .with_vocab(vec!["<pad>".to_string()]);
        assert_eq!(meta.architecture, "rvae");
        assert_eq!(meta.custom.get("epoch"), Some(&serde_json::json!(3)));
        assert_eq!(meta.vocab.as_deref().map(<[String]>::len), Some(1));
    }

    #[test]
    fn test_capture_restore_copies_weights() {
        let source = tiny(1);
        let mut target = tiny(2);
        let state = ModelState::capture(&source, ModelMetadata::new("t"));
        assert_eq!(state.data.len(), source.num_parameters());
        state.restore(&mut target).unwrap();
        for (a, b) in source.parameters().iter().zip(target.parameters()) {
            assert_eq!(a.data(), b.data());
        }
    }

    #[test]
    fn test_restore_rejects_other_shapes() {
        let source = tiny(1);
        let config = ModelConfig {
            emsize: 3,
            nhid: 5,
            z_dim: 2,
            ..ModelConfig::default()
        };
        let mut other = Rvae::new(&config, 8, 1).unwrap();
        let before = other.embedding.data().clone();
        let state = ModelState::capture(&source, ModelMetadata::new("t"));
        assert!(matches!(state.restore(&mut other), Err(Error::ShapeMismatch { .. })));
        assert_eq!(other.embedding.data(), &before);
    }

    #[test]
    fn test_restore_rejects_truncated_data() {
        let source = tiny(1);
        let mut state = ModelState::capture(&source, ModelMetadata::new("t"));
        state.data.pop();
        assert!(matches!(state.restore(&mut tiny(2)), Err(Error::ShapeMismatch { .. })));
    }
}
