//! Typed views of the `core` configuration section.
//!
//! The configuration engine validates the merged configuration tree against
//! JSON schemas and injects defaults. Once that has succeeded, the `core`
//! section is deserialised into these structs so the grid and data crates
//! never have to walk the untyped tree themselves. The serde defaults here
//! mirror the defaults declared in the core schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::enums::GridType;

/// The validated `core` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Grid layout parameters.
    #[serde(default)]
    pub grid: GridConfig,

    /// Names of the modules whose schemas extend the configuration.
    #[serde(default)]
    pub modules: Vec<String>,

    /// Datasets to load onto the grid at start-up.
    #[serde(default)]
    pub data: DataConfig,
}

/// Grid layout parameters (`core.grid`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Tiling rule.
    #[serde(default)]
    pub grid_type: GridType,

    /// Area of each cell in square metres.
    #[serde(default = "default_cell_area")]
    pub cell_area: f64,

    /// Number of cells along the x (easting) axis.
    #[serde(default = "default_cell_count")]
    pub cell_nx: u32,

    /// Number of cells along the y (northing) axis.
    #[serde(default = "default_cell_count")]
    pub cell_ny: u32,

    /// Offset of the grid origin along x.
    #[serde(default)]
    pub xoff: f64,

    /// Offset of the grid origin along y.
    #[serde(default)]
    pub yoff: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_type: GridType::default(),
            cell_area: default_cell_area(),
            cell_nx: default_cell_count(),
            cell_ny: default_cell_count(),
            xoff: 0.0,
            yoff: 0.0,
        }
    }
}

/// Dataset loading configuration (`core.data`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Variables to load, in order.
    #[serde(default)]
    pub variable: Vec<DataVariable>,
}

/// A single variable to load from a data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataVariable {
    /// Path of the file holding the variable.
    pub file: PathBuf,

    /// Name of the variable inside the file, also used as the store key.
    pub var_name: String,
}

impl DataConfig {
    /// Return the variable names that appear more than once, sorted.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        let mut dupes = std::collections::BTreeSet::new();
        for var in &self.variable {
            if !seen.insert(var.var_name.as_str()) {
                dupes.insert(var.var_name.clone());
            }
        }
        dupes.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_cell_area() -> f64 {
    100.0
}

const fn default_cell_count() -> u32 {
    10
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: CoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.grid.grid_type, GridType::Square);
        assert_eq!(config.grid.cell_nx, 10);
        assert_eq!(config.grid.cell_ny, 10);
        assert!(config.modules.is_empty());
        assert!(config.data.variable.is_empty());
    }

    #[test]
    fn partial_grid_keeps_other_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"grid": {"grid_type": "hexagon", "cell_nx": 4}}"#).unwrap();
        assert_eq!(config.grid.grid_type, GridType::Hexagon);
        assert_eq!(config.grid.cell_nx, 4);
        assert_eq!(config.grid.cell_ny, 10);
    }

    #[test]
    fn duplicate_variable_names_are_reported_once() {
        let config = DataConfig {
            variable: vec![
                DataVariable { file: "a.json".into(), var_name: "elev".to_owned() },
                DataVariable { file: "b.json".into(), var_name: "temp".to_owned() },
                DataVariable { file: "c.json".into(), var_name: "elev".to_owned() },
                DataVariable { file: "d.json".into(), var_name: "elev".to_owned() },
            ],
        };
        assert_eq!(config.duplicate_names(), vec!["elev".to_owned()]);
    }
}
