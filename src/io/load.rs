//! Checkpoint loading

use super::format::ModelFormat;
use super::model::{ModelMetadata, ModelState};
use crate::model::Rvae;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Read a checkpoint; the format follows the file extension
///
/// # Example
///
/// ```no_run
/// use rvae::io::load_checkpoint;
///
/// let state = load_checkpoint("1700000000000000.json").expect("failed to load checkpoint");
/// println!("{} parameters", state.parameters.len());
/// ```
pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<ModelState> {
    let path = path.as_ref();
    let format = ModelFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;

    let state = match format {
        ModelFormat::Json => serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}")))?,
    };
    Ok(state)
}

/// Load a checkpoint into an existing model of the same shape
pub fn load_into(model: &mut Rvae, path: impl AsRef<Path>) -> Result<ModelMetadata> {
    let state = load_checkpoint(path)?;
    state.restore(model)?;
    Ok(state.metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::io::save_checkpoint;
    use tempfile::TempDir;

    fn model(seed: u64) -> Rvae {
        let config = ModelConfig {
            emsize: 3,
            nhid: 4,
            z_dim: 2,
            ..ModelConfig::default()
        };
        Rvae::new(&config, 9, seed).unwrap()
    }

    #[test]
    fn test_save_load_roundtrip_restores_parameters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("best.json");
        let trained = model(10);
        let meta = ModelMetadata::new("run").with_custom("epoch", serde_json::json!(4));
        save_checkpoint(&ModelState::capture(&trained, meta), &path).unwrap();

        let mut fresh = model(11);
        let loaded = load_into(&mut fresh, &path).unwrap();
        assert_eq!(loaded.custom.get("epoch"), Some(&serde_json::json!(4)));
        for ((name, a), (_, b)) in trained.named_parameters().into_iter().zip(fresh.named_parameters()) {
            assert_eq!(a.data(), b.data(), "{name} differs after load");
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(load_checkpoint("/nonexistent/ckpt.json"), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_checkpoint(&path), Err(Error::Serialization(_))));
    }
}
