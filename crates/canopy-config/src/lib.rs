//! Configuration merging and validation for Canopy.
//!
//! A simulation is configured by any number of TOML fragments. This crate
//! finds them, rejects keys defined more than once, merges them into one
//! tree, and validates that tree against the `core` schema plus the schema
//! of every module the configuration names, filling in declared defaults
//! along the way.
//!
//! # Modules
//!
//! - [`discover`] -- [`ConfigSource`] and expansion of files and folders.
//! - [`parse`] -- TOML parsing into [`Fragment`]s.
//! - [`merge`] -- Leaf collision detection and deep merging.
//! - [`schema`] -- [`SchemaRegistry`], the core schema, and schema assembly.
//! - [`validate`] -- JSON Schema subset validation with default injection.
//! - [`outfile`] -- Output path checks and TOML output.
//! - [`pipeline`] -- [`validate_config`] and [`ValidatedConfig`].
//! - [`error`] -- [`ConfigError`] and [`SchemaError`].

pub mod discover;
pub mod error;
pub mod merge;
pub mod outfile;
pub mod parse;
pub mod pipeline;
pub mod schema;
pub mod validate;

// Re-export primary types at crate root.
pub use discover::{ConfigSource, collect_files};
pub use error::{ConfigError, SchemaError};
pub use merge::{check_dict_leaves, merge_fragments};
pub use outfile::{check_outfile, write_config};
pub use parse::{Fragment, load_in_config_files, parse_fragment};
pub use pipeline::{ValidatedConfig, validate_config};
pub use schema::{
    CORE_MODULE, SchemaRegistry, add_core_defaults, construct_combined_schema, find_schema,
};
pub use validate::validate_with_defaults;
