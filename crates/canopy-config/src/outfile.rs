//! Writing the validated configuration back out as a single TOML file.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::ConfigError;

/// Check that `path` can be used for the combined configuration output.
///
/// The parent folder must exist and the file itself must not, so a run never
/// overwrites an earlier record. A bare file name refers to the current
/// folder.
///
/// # Errors
///
/// Returns [`ConfigError::OutputDirMissing`], [`ConfigError::OutputNotDir`]
/// or [`ConfigError::OutputExists`].
pub fn check_outfile(path: &Path) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        return Err(ConfigError::OutputDirMissing(dir).logged());
    }
    if !dir.is_dir() {
        return Err(ConfigError::OutputNotDir(dir).logged());
    }
    if path.exists() {
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(ConfigError::OutputExists { dir, file }.logged());
    }
    Ok(())
}

/// Write `config` to `path` as TOML.
///
/// # Errors
///
/// Returns [`ConfigError::Encode`] if the tree has no TOML form (e.g. it
/// holds a null), or [`ConfigError::Write`] on I/O failure.
pub fn write_config(config: &Value, path: &Path) -> Result<(), ConfigError> {
    info!("Saving all configuration details to {}", path.display());
    let text = toml::to_string_pretty(config).map_err(|e| ConfigError::Encode(e).logged())?;
    std::fs::write(path, text).map_err(|source| {
        ConfigError::Write {
            path: path.to_path_buf(),
            source,
        }
        .logged()
    })
}
