//! Checkpoint saving

use super::format::ModelFormat;
use super::model::ModelState;
use crate::{Error, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a checkpoint; the format follows the file extension
///
/// Parent directories are created when missing.
pub fn save_checkpoint(state: &ModelState, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ModelFormat::from_path(path)?;

    let data = match format {
        ModelFormat::Json => serde_json::to_string(state)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::to_string(state)
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;

    Ok(())
}
