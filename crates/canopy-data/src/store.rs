//! The grid-bound data store.
//!
//! [`DataStore`] holds every input array a simulation uses, keyed by
//! variable name. Arrays are validated against the grid on insertion, so
//! anything read back from the store is already in canonical form for each
//! core axis it uses.

use std::collections::BTreeMap;

use canopy_grid::Grid;
use canopy_types::{DataArray, DataConfig};
use tracing::{error, info};

use crate::axes::{AxisMatches, AxisRegistry};
use crate::error::DataError;
use crate::loader::LoaderRegistry;

/// Validated arrays bound to one grid.
///
/// The store borrows its grid and axis registry; both outlive it and stay
/// read-only while it exists.
#[derive(Debug)]
pub struct DataStore<'a> {
    grid: &'a Grid,
    axes: &'a AxisRegistry,
    data: BTreeMap<String, DataArray>,
    /// Validator matched per core axis, per variable.
    axis_matches: BTreeMap<String, AxisMatches>,
}

impl<'a> DataStore<'a> {
    /// Create an empty store for `grid`, validating with `axes`.
    pub const fn new(grid: &'a Grid, axes: &'a AxisRegistry) -> Self {
        Self {
            grid,
            axes,
            data: BTreeMap::new(),
            axis_matches: BTreeMap::new(),
        }
    }

    /// The grid arrays are validated against.
    pub const fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Validate `array` and store it under `name`, replacing any existing
    /// array of that name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Axis`] if axis validation fails; the store is
    /// left unchanged.
    pub fn insert(&mut self, name: &str, array: DataArray) -> Result<(), DataError> {
        if self.data.contains_key(name) {
            info!("Replacing data array for '{name}'");
        } else {
            info!("Adding data array for '{name}'");
        }

        let (validated, matches) = self.axes.validate(array, self.grid)?;
        self.data.insert(name.to_owned(), validated.with_name(name));
        self.axis_matches.insert(name.to_owned(), matches);
        Ok(())
    }

    /// The array stored under `name`.
    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.data.get(name)
    }

    /// Whether an array is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Whether the array `name` was validated on core axis `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownVariable`] or
    /// [`DataError::UnknownCoreAxis`] for names the store does not know.
    pub fn on_core_axis(&self, name: &str, axis: &str) -> Result<bool, DataError> {
        let matches = self
            .axis_matches
            .get(name)
            .ok_or_else(|| DataError::UnknownVariable(name.to_owned()).logged())?;
        let matched = matches
            .get(axis)
            .ok_or_else(|| DataError::UnknownCoreAxis(axis.to_owned()).logged())?;
        Ok(matched.is_some())
    }

    /// Stored variable names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Number of stored arrays.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Load every variable listed in the `core.data` configuration.
    ///
    /// All entries are attempted even after a failure so that every problem
    /// is logged in one pass.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::LoadFailed`] listing each failure if variable
    /// names repeat or any variable fails to load or validate.
    pub fn load_data_config(
        &mut self,
        config: &DataConfig,
        loaders: &LoaderRegistry,
    ) -> Result<(), DataError> {
        info!(variables = config.variable.len(), "Loading data from configuration");
        let mut failures = Vec::new();

        let duplicates = config.duplicate_names();
        if !duplicates.is_empty() {
            error!(names = ?duplicates, "Duplicate variable names in data configuration");
            failures.push(format!(
                "Duplicate variable names in data configuration: {}",
                duplicates.join(", ")
            ));
        }

        for var in &config.variable {
            let loaded = loaders
                .load(&var.file, &var.var_name)
                .map_err(|e| e.to_string())
                .and_then(|array| {
                    self.insert(&var.var_name, array)
                        .map_err(|e| e.to_string())
                });
            if let Err(message) = loaded {
                failures.push(message);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DataError::LoadFailed { failures }.logged())
        }
    }
}
