//! The end-to-end configuration pipeline.
//!
//! [`validate_config`] runs every stage in order: output check, discovery,
//! parsing, collision check, merge, core defaults, schema assembly,
//! validation with defaults, and optional output. The first stage to fail
//! stops the run.

use std::path::Path;

use canopy_types::CoreConfig;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info};

use crate::discover::ConfigSource;
use crate::error::ConfigError;
use crate::merge::merge_fragments;
use crate::outfile::{check_outfile, write_config};
use crate::parse::load_sources;
use crate::schema::{
    CORE_MODULE, SchemaRegistry, add_core_defaults, construct_combined_schema, find_schema,
};
use crate::validate::validate_with_defaults;

/// A merged configuration that has passed validation, with all defaults
/// filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    tree: Value,
    modules: Vec<String>,
}

impl ValidatedConfig {
    /// The full configuration tree.
    pub const fn as_value(&self) -> &Value {
        &self.tree
    }

    /// Consume the wrapper, returning the tree.
    pub fn into_value(self) -> Value {
        self.tree
    }

    /// Modules named in `core.modules`, in order.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// The section for `module`, if present.
    pub fn module(&self, module: &str) -> Option<&Value> {
        self.tree.get(module)
    }

    /// The `core` section as typed structs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Section`] if the section does not deserialise.
    pub fn core(&self) -> Result<CoreConfig, ConfigError> {
        self.section(CORE_MODULE)
    }

    /// Deserialise the section for `module` into `T`.
    ///
    /// A missing section deserialises from an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Section`] if the section does not match `T`.
    pub fn section<T: DeserializeOwned>(&self, module: &str) -> Result<T, ConfigError> {
        let value = self
            .tree
            .get(module)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        serde_json::from_value(value).map_err(|source| {
            ConfigError::Section {
                section: module.to_owned(),
                source,
            }
            .logged()
        })
    }
}

/// Build and validate the configuration from `sources`.
///
/// If `outfile` is given it is checked before any input is read, and the
/// validated configuration is written there as TOML.
///
/// # Errors
///
/// Returns the [`ConfigError`] of the first stage that fails. Validation
/// stages log every violation before returning.
pub fn validate_config(
    sources: &[ConfigSource],
    registry: &SchemaRegistry,
    outfile: Option<&Path>,
) -> Result<ValidatedConfig, ConfigError> {
    if let Some(path) = outfile {
        check_outfile(path)?;
    }

    let fragments = load_sources(sources)?;
    let mut tree = Value::Object(merge_fragments(fragments)?);

    add_core_defaults(&mut tree, registry)?;
    let names = find_schema(&tree)?;
    let schema = construct_combined_schema(&names, registry)?;

    let errors = validate_with_defaults(&mut tree, &schema);
    if !errors.is_empty() {
        for message in &errors {
            error!("{message}");
        }
        return Err(ConfigError::Validation(errors).logged());
    }
    info!("Configuration files successfully validated!");

    if let Some(path) = outfile {
        write_config(&tree, path)?;
    }

    Ok(ValidatedConfig {
        tree,
        modules: names.into_iter().skip(1).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use canopy_types::GridType;

    use super::*;

    #[test]
    fn inline_only_configuration() {
        let sources = [ConfigSource::inline(
            "inline",
            "[core]\nmodules = []\n[core.grid]\ngrid_type = \"hexagon\"\ncell_nx = 4\n",
        )];
        let config = validate_config(&sources, &SchemaRegistry::with_core(), None).unwrap();

        let core = config.core().unwrap();
        assert_eq!(core.grid.grid_type, GridType::Hexagon);
        assert_eq!(core.grid.cell_nx, 4);
        assert_eq!(core.grid.cell_ny, 10);
        assert!(config.modules().is_empty());
    }

    #[test]
    fn missing_modules_list_stops_the_run() {
        let sources = [ConfigSource::inline("inline", "[core.grid]\ncell_nx = 4\n")];
        let result = validate_config(&sources, &SchemaRegistry::with_core(), None);
        assert!(matches!(result, Err(ConfigError::NoModules)));
    }

    #[test]
    fn absent_section_reads_as_empty() {
        let config = ValidatedConfig {
            tree: serde_json::json!({}),
            modules: Vec::new(),
        };
        let section: Result<serde_json::Map<String, Value>, _> = config.section("plants");
        assert_eq!(section.ok(), Some(serde_json::Map::new()));
        assert!(config.module("plants").is_none());
    }
}
