//! Integration tests for the configuration pipeline.
//!
//! Fixtures live in `tests/fixtures`: module schemas for two example modules
//! (`plants`, `soil`), complete configuration files, a folder of fragments
//! that merge cleanly, and a folder of fragments that collide.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use canopy_config::{
    ConfigError, ConfigSource, SchemaRegistry, construct_combined_schema, validate_config,
    validate_with_defaults,
};
use canopy_types::GridType;
use serde_json::{Value, json};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::with_core();
    for module in ["plants", "soil"] {
        let text =
            std::fs::read_to_string(fixtures().join(format!("schemas/{module}.json"))).unwrap();
        registry.register_str(module, &text).unwrap();
    }
    registry
}

#[test]
fn module_defaults_are_injected() {
    let registry = registry();
    let names = ["core", "plants", "soil"].map(str::to_owned);
    let schema = construct_combined_schema(&names, &registry).unwrap();

    let mut config = json!({"plants": {"ftypes": []}});
    assert!(validate_with_defaults(&mut config, &schema).is_empty());
    assert_eq!(config["plants"]["a_plant_integer"], json!(1));
    assert_eq!(config["soil"]["no_layers"], json!(2));

    let mut config = json!({"plants": {"ftypes": [], "a_plant_integer": 333}});
    assert!(validate_with_defaults(&mut config, &schema).is_empty());
    assert_eq!(config["plants"]["a_plant_integer"], json!(333));
}

#[test]
fn every_module_violation_is_reported() {
    let registry = registry();
    let names = ["core", "plants", "soil"].map(str::to_owned);
    let schema = construct_combined_schema(&names, &registry).unwrap();

    let mut config = json!({"soil": {"no_layers": -1}});
    assert_eq!(
        validate_with_defaults(&mut config, &schema),
        vec![
            "[plants]: 'ftypes' is a required property".to_owned(),
            "[soil][no_layers]: -1 is less than or equal to the minimum of 0".to_owned(),
        ]
    );
}

#[test]
fn defaults_only_file_validates_and_is_saved() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("default_config.toml");
    let config = validate_config(
        &[ConfigSource::path(fixtures().join("default_config.toml"))],
        &registry(),
        Some(&out),
    )
    .unwrap();

    assert_eq!(config.modules(), &["plants".to_owned(), "soil".to_owned()]);
    let core = config.core().unwrap();
    assert_eq!(core.grid.grid_type, GridType::Square);
    assert_eq!(core.grid.cell_nx, 10);
    assert!(core.data.variable.is_empty());

    let saved: Value = toml::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(&saved, config.as_value());
    assert_eq!(saved["plants"]["a_plant_integer"], json!(1));
    assert_eq!(saved["soil"]["no_layers"], json!(2));

    // A second run must not overwrite the saved file.
    let again = validate_config(
        &[ConfigSource::path(fixtures().join("default_config.toml"))],
        &registry(),
        Some(&out),
    );
    assert!(matches!(again, Err(ConfigError::OutputExists { .. })));
}

#[test]
fn fully_specified_file_keeps_every_value() {
    let config = validate_config(
        &[ConfigSource::path(fixtures().join("all_config.toml"))],
        &registry(),
        None,
    )
    .unwrap();

    let core = config.core().unwrap();
    assert_eq!(core.grid.grid_type, GridType::Hexagon);
    assert_eq!(core.grid.cell_nx, 12);
    assert_eq!(core.grid.cell_ny, 8);
    assert!((core.grid.xoff + 45.0).abs() < f64::EPSILON);
    assert_eq!(core.data.variable.len(), 1);
    assert_eq!(core.data.variable[0].var_name, "elev");

    let plants = config.module("plants").unwrap();
    assert_eq!(plants["a_plant_integer"], json!(12));
    assert_eq!(plants["ftypes"].as_array().map(Vec::len), Some(2));
}

#[test]
fn folder_fragments_merge() {
    let config = validate_config(
        &[ConfigSource::path(fixtures().join("split"))],
        &registry(),
        None,
    )
    .unwrap();
    let core = config.core().unwrap();
    assert_eq!((core.grid.cell_nx, core.grid.cell_ny), (3, 2));
    assert_eq!(config.modules(), &["soil".to_owned()]);
    assert_eq!(config.module("soil").unwrap()["no_layers"], json!(4));
}

#[test]
fn inline_fragment_extends_files() {
    let config = validate_config(
        &[
            ConfigSource::path(fixtures().join("split/core.toml")),
            ConfigSource::inline("--cfg-string", "[soil]\nno_layers = 7"),
        ],
        &registry(),
        None,
    )
    .unwrap();
    assert_eq!(config.module("soil").unwrap()["no_layers"], json!(7));
}

#[test]
fn colliding_files_name_both_sources() {
    let dir = fixtures().join("collide");
    let result = validate_config(&[ConfigSource::path(&dir)], &registry(), None);
    let message = result.err().unwrap().to_string();
    assert_eq!(
        message,
        format!(
            "The following tags are defined in multiple config files:\n\
             core.grid.cell_nx defined in both {} and {}",
            dir.join("b.toml").display(),
            dir.join("a.toml").display()
        )
    );
}

#[test]
fn invalid_module_values_fail_the_run() {
    let result = validate_config(
        &[ConfigSource::inline(
            "inline",
            "[core]\nmodules = [\"soil\"]\n[soil]\nno_layers = 0\nextra = true\n",
        )],
        &registry(),
        None,
    );
    let errors = match result {
        Err(ConfigError::Validation(errors)) => errors,
        other => panic!("expected validation errors, got {other:?}"),
    };
    assert_eq!(
        errors,
        vec![
            "[soil][no_layers]: 0 is less than or equal to the minimum of 0".to_owned(),
            "[soil]: Additional properties are not allowed ('extra' was unexpected)".to_owned(),
        ]
    );
}

#[test]
fn unregistered_module_is_reported() {
    let result = validate_config(
        &[ConfigSource::inline("inline", "[core]\nmodules = [\"animals\"]")],
        &registry(),
        None,
    );
    assert_eq!(
        result.err().unwrap().to_string(),
        "Expected a schema for animals module configuration, it was not provided!"
    );
}

#[test]
fn bad_core_values_stop_before_modules() {
    let result = validate_config(
        &[ConfigSource::inline(
            "inline",
            "[core]\nmodules = [\"animals\"]\n[core.grid]\ngrid_type = \"penrose\"",
        )],
        &registry(),
        None,
    );
    let errors = match result {
        Err(ConfigError::CoreValidation(errors)) => errors,
        other => panic!("expected core validation errors, got {other:?}"),
    };
    assert_eq!(
        errors,
        vec![
            "[core][grid][grid_type]: 'penrose' is not one of ['square', 'hexagon', 'triangle']"
                .to_owned()
        ]
    );
}
