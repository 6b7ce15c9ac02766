//! Error types for the setup binary.
//!
//! [`EngineError`] wraps the error of every library crate so the setup
//! sequence can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the setup binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Neither config paths nor inline fragments were given.
    #[error("No configuration given: pass config paths or --cfg-string")]
    NoConfig,

    /// A `--schema` argument is not of the form `module=path`.
    #[error("Schema argument '{0}' is not of the form module=path")]
    SchemaArg(String),

    /// A module schema file could not be read.
    #[error("Could not read schema file {}: {source}", path.display())]
    SchemaFile {
        /// The schema file.
        path: PathBuf,
        /// The I/O failure.
        source: std::io::Error,
    },

    /// Module schema registration failed.
    #[error("schema error: {source}")]
    Schema {
        /// The underlying registration error.
        #[from]
        source: canopy_config::SchemaError,
    },

    /// Configuration merging or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: canopy_config::ConfigError,
    },

    /// Grid construction or export failed.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: canopy_grid::GridError,
    },

    /// Loading configured data failed.
    #[error("data error: {source}")]
    Data {
        /// The underlying data error.
        #[from]
        source: canopy_data::DataError,
    },
}
