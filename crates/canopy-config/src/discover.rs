//! Locating configuration fragments.
//!
//! Users point the engine at any mix of `.toml` files and folders. Folders
//! expand to the `.toml` files they directly contain, in name order. Every
//! problem with the supplied paths is reported together before anything is
//! parsed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ConfigError;

/// Where a configuration fragment comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `.toml` file, or a folder of them.
    Path(PathBuf),
    /// TOML text supplied directly, e.g. on the command line.
    Inline {
        /// Name used for the fragment in error messages.
        label: String,
        /// The TOML document.
        text: String,
    },
}

impl ConfigSource {
    /// Convenience constructor for [`ConfigSource::Path`].
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Convenience constructor for [`ConfigSource::Inline`].
    pub fn inline(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Inline {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Expand `paths` into the list of configuration files to read.
///
/// # Errors
///
/// Returns, in order of precedence:
/// - [`ConfigError::PathsNotFound`] listing every path that does not exist,
/// - [`ConfigError::EmptyFolders`] listing every folder without `.toml` files,
/// - [`ConfigError::DuplicateFiles`] if a file is reached more than once,
///   directly or through a folder.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ConfigError> {
    let missing: Vec<PathBuf> = paths.iter().filter(|p| !p.exists()).cloned().collect();
    if !missing.is_empty() {
        return Err(ConfigError::PathsNotFound(missing).logged());
    }

    let mut files = Vec::new();
    let mut empty = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = toml_files_in(path)?;
            if found.is_empty() {
                empty.push(path.clone());
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    if !empty.is_empty() {
        return Err(ConfigError::EmptyFolders(empty).logged());
    }

    let duplicates = repeated_files(&files);
    if !duplicates.is_empty() {
        return Err(ConfigError::DuplicateFiles(duplicates).logged());
    }

    info!(files = files.len(), "Configuration files found");
    Ok(files)
}

/// The `.toml` files directly inside `dir`, sorted by name.
fn toml_files_in(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::read(dir, e).logged())?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConfigError::read(dir, e).logged())?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            found.push(path);
        }
    }
    found.sort();
    debug!(dir = %dir.display(), files = found.len(), "Scanned config folder");
    Ok(found)
}

/// Files that appear more than once once paths are canonicalised.
fn repeated_files(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut counts: BTreeMap<PathBuf, usize> = BTreeMap::new();
    for file in files {
        let key = file.canonicalize().unwrap_or_else(|_| file.clone());
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(path, _)| path)
        .collect()
}
