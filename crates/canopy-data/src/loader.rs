//! Reading labelled arrays from data files.
//!
//! File formats are pluggable: a [`DataLoader`] turns `(path, var_name)`
//! into a [`DataArray`], and the [`LoaderRegistry`] picks the loader from
//! the file extension. Only a JSON reader ships with the crate.

use std::collections::BTreeMap;
use std::path::Path;

use canopy_types::DataArray;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::LoadError;

/// Reads a named variable from a file.
pub trait DataLoader: Send + Sync {
    /// Load `var_name` from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read or does not hold
    /// the variable as a labelled array.
    fn load(&self, path: &Path, var_name: &str) -> Result<DataArray, LoadError>;
}

/// Loaders keyed by file extension (without the leading dot).
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: BTreeMap<String, Box<dyn DataLoader>>,
}

impl core::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the bundled loaders (`.json`).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("json", Box::new(JsonLoader));
        registry
    }

    /// Register `loader` for files ending in `extension`.
    ///
    /// An existing loader for the extension is replaced with a warning.
    pub fn register(&mut self, extension: &str, loader: Box<dyn DataLoader>) {
        let ext = extension.trim_start_matches('.').to_owned();
        if self.loaders.contains_key(&ext) {
            warn!("File format loader for .{ext} already exists and is being replaced");
        }
        self.loaders.insert(ext, loader);
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }

    /// Load `var_name` from `path` with the loader for its extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownFormat`] if no loader handles the
    /// extension, or the loader's own error.
    pub fn load(&self, path: &Path, var_name: &str) -> Result<DataArray, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let loader = self
            .loaders
            .get(ext)
            .ok_or_else(|| LoadError::UnknownFormat(ext.to_owned()).logged())?;
        info!(var_name, file = %path.display(), "Loading variable from file");
        loader.load(path, var_name).map_err(LoadError::logged)
    }
}

/// Loader for JSON documents mapping variable names to serialised arrays.
///
/// ```json
/// {"elev": {"dims": ["cell_id"], "values": [1.0, 2.0, 3.0, 4.0]}}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl DataLoader for JsonLoader {
    fn load(&self, path: &Path, var_name: &str) -> Result<DataArray, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            file: path.to_path_buf(),
            source,
        })?;
        let mut document: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&text).map_err(|source| LoadError::Format {
                file: path.to_path_buf(),
                source,
            })?;
        let value = document
            .remove(var_name)
            .ok_or_else(|| LoadError::VariableNotFound {
                var_name: var_name.to_owned(),
                file: path.to_path_buf(),
            })?;
        let array = DataArray::deserialize(value).map_err(|source| LoadError::NotAnArray {
            var_name: var_name.to_owned(),
            file: path.to_path_buf(),
            source,
        })?;
        Ok(match array.name() {
            Some(_) => array,
            None => array.with_name(var_name),
        })
    }
}
