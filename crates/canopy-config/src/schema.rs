//! Module schema registry and combined schema assembly.
//!
//! Every module that reads configuration registers a JSON schema fragment
//! under its own name. A fragment describes a top-level object with exactly
//! one property, the module's section, which it must also list as required:
//!
//! ```json
//! {
//!   "type": "object",
//!   "properties": {"soil": {"type": "object", "default": {}, "properties": {}}},
//!   "required": ["soil"]
//! }
//! ```
//!
//! The `core` schema is built in. Before module schemas are consulted, the
//! `core` section alone is validated with defaults so that `core.modules`
//! can be read reliably.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value, json};
use tracing::{error, info};

use crate::error::{ConfigError, SchemaError};
use crate::validate::{check_schema, validate_with_defaults};

/// Name of the built-in core schema.
pub const CORE_MODULE: &str = "core";

/// Schemas keyed by module name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Value>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in `core` schema.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        registry
            .schemas
            .insert(CORE_MODULE.to_owned(), core_schema());
        registry
    }

    /// Register `schema` for module `module`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AlreadyRegistered`] for a repeated name, and
    /// [`SchemaError::RegistrationFailed`] wrapping the cause when the
    /// schema is malformed or lacks the module's section.
    pub fn register(&mut self, module: &str, schema: Value) -> Result<(), SchemaError> {
        if self.schemas.contains_key(module) {
            return Err(SchemaError::AlreadyRegistered(module.to_owned()).logged());
        }
        check_module_schema(module, &schema).map_err(|cause| failed(module, cause))?;
        info!(module, "Registered module schema");
        self.schemas.insert(module.to_owned(), schema);
        Ok(())
    }

    /// Parse `text` as JSON and register it for module `module`.
    ///
    /// # Errors
    ///
    /// As [`SchemaRegistry::register`], plus a wrapped
    /// [`SchemaError::Json`] if `text` is not valid JSON.
    pub fn register_str(&mut self, module: &str, text: &str) -> Result<(), SchemaError> {
        if self.schemas.contains_key(module) {
            return Err(SchemaError::AlreadyRegistered(module.to_owned()).logged());
        }
        let schema: Value =
            serde_json::from_str(text).map_err(|e| failed(module, SchemaError::Json(e)))?;
        self.register(module, schema)
    }

    /// The schema registered for `module`.
    pub fn get(&self, module: &str) -> Option<&Value> {
        self.schemas.get(module)
    }

    /// Whether `module` has a schema.
    pub fn contains(&self, module: &str) -> bool {
        self.schemas.contains_key(module)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

/// Log `cause` and wrap it as a registration failure for `module`.
fn failed(module: &str, cause: SchemaError) -> SchemaError {
    SchemaError::RegistrationFailed {
        module: module.to_owned(),
        cause: Box::new(cause.logged()),
    }
    .logged()
}

fn check_module_schema(module: &str, schema: &Value) -> Result<(), SchemaError> {
    check_schema(schema).map_err(|reason| SchemaError::Invalid {
        module: module.to_owned(),
        reason,
    })?;

    let missing = |key: &str| SchemaError::MissingKey {
        module: module.to_owned(),
        key: key.to_owned(),
    };
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err(missing("type: object"));
    }
    if schema.pointer(&format!("/properties/{module}")).is_none() {
        return Err(missing(&format!("properties.{module}")));
    }
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("required"))?;
    if !required.iter().any(|r| r.as_str() == Some(module)) {
        return Err(missing(&format!("required.{module}")));
    }
    Ok(())
}

/// The built-in schema for the `core` section.
///
/// Everything except `core.modules` has a default, so an empty
/// configuration gives a 10 x 10 grid of 100 m² square cells and no data.
pub fn core_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "core": {
                "description": "Configuration settings for the core module",
                "type": "object",
                "default": {},
                "properties": {
                    "grid": {
                        "description": "Details of the grid to configure",
                        "type": "object",
                        "default": {},
                        "properties": {
                            "grid_type": {
                                "description": "Tiling used to lay out cells",
                                "type": "string",
                                "enum": ["square", "hexagon", "triangle"],
                                "default": "square"
                            },
                            "cell_area": {
                                "description": "Area of each cell in square metres",
                                "type": "number",
                                "exclusiveMinimum": 0,
                                "default": 100
                            },
                            "cell_nx": {
                                "description": "Number of cells in the x direction",
                                "type": "integer",
                                "exclusiveMinimum": 0,
                                "default": 10
                            },
                            "cell_ny": {
                                "description": "Number of cells in the y direction",
                                "type": "integer",
                                "exclusiveMinimum": 0,
                                "default": 10
                            },
                            "xoff": {
                                "description": "Offset of the grid origin along x",
                                "type": "number",
                                "default": 0
                            },
                            "yoff": {
                                "description": "Offset of the grid origin along y",
                                "type": "number",
                                "default": 0
                            }
                        },
                        "additionalProperties": false
                    },
                    "modules": {
                        "description": "List of modules to be configured",
                        "type": "array",
                        "items": {"type": "string"}
                    },
                    "data": {
                        "description": "Datasets to load onto the grid",
                        "type": "object",
                        "default": {},
                        "properties": {
                            "variable": {
                                "type": "array",
                                "default": [],
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "file": {"type": "string"},
                                        "var_name": {"type": "string"}
                                    },
                                    "required": ["file", "var_name"],
                                    "additionalProperties": false
                                }
                            }
                        },
                        "additionalProperties": false
                    }
                },
                "required": ["grid", "data"],
                "additionalProperties": false
            }
        },
        "required": ["core"]
    })
}

/// Validate the `core` section of `config` with defaults.
///
/// # Errors
///
/// Returns [`ConfigError::MissingSchema`] if `registry` has no core schema,
/// or [`ConfigError::CoreValidation`] listing every violation, each of
/// which is logged.
pub fn add_core_defaults(
    config: &mut Value,
    registry: &SchemaRegistry,
) -> Result<(), ConfigError> {
    let schema = registry
        .get(CORE_MODULE)
        .ok_or_else(|| ConfigError::MissingSchema(CORE_MODULE.to_owned()).logged())?;

    let errors = validate_with_defaults(config, schema);
    if errors.is_empty() {
        return Ok(());
    }
    for message in &errors {
        error!("{message}");
    }
    Err(ConfigError::CoreValidation(errors).logged())
}

/// The schema names needed for `config`: `core`, then each entry of
/// `core.modules`.
///
/// # Errors
///
/// Returns [`ConfigError::NoModules`] if `core.modules` is absent, or
/// [`ConfigError::RepeatedModules`] if it names a module more than once.
pub fn find_schema(config: &Value) -> Result<Vec<String>, ConfigError> {
    let modules: Vec<String> = config
        .pointer("/core/modules")
        .and_then(Value::as_array)
        .ok_or_else(|| ConfigError::NoModules.logged())?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();

    let unique: BTreeSet<&str> = modules.iter().map(String::as_str).collect();
    let repeats = modules.len() - unique.len();
    if repeats > 0 {
        return Err(ConfigError::RepeatedModules(repeats).logged());
    }

    let mut names = Vec::with_capacity(modules.len() + 1);
    names.push(CORE_MODULE.to_owned());
    names.extend(modules.into_iter().filter(|m| m != CORE_MODULE));
    Ok(names)
}

/// Combine the schemas for `names` into one object schema.
///
/// Properties and required lists are concatenated in `names` order. The
/// result sets no `additionalProperties`, so sections for unlisted modules
/// pass through unchecked.
///
/// # Errors
///
/// Returns [`ConfigError::MissingSchema`] for the first name without a
/// registered schema.
pub fn construct_combined_schema(
    names: &[String],
    registry: &SchemaRegistry,
) -> Result<Value, ConfigError> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for name in names {
        let schema = registry
            .get(name)
            .ok_or_else(|| ConfigError::MissingSchema(name.clone()).logged())?;
        if let Some(props) = schema.get("properties").and_then(Value::as_object) {
            properties.extend(props.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(req) = schema.get("required").and_then(Value::as_array) {
            required.extend(req.iter().cloned());
        }
    }
    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}
