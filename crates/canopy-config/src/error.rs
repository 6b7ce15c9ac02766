//! Error types for the `canopy-config` crate.
//!
//! [`ConfigError`] covers every stage of building a validated
//! configuration. Stages that can find several problems at once (merge
//! collisions, schema validation) carry the full list so callers can show
//! all of them together. [`SchemaError`] covers module schema registration.

use std::path::{Path, PathBuf};

/// Errors raised while discovering, merging, validating, or writing the
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Some user supplied paths do not exist.
    #[error("The following (user provided) config paths do not exist:\n{}", list_paths(.0))]
    PathsNotFound(Vec<PathBuf>),

    /// Some user supplied folders hold no `.toml` files.
    #[error(
        "The following (user provided) config folders do not contain any toml files:\n{}",
        list_paths(.0)
    )]
    EmptyFolders(Vec<PathBuf>),

    /// The same file was reached through more than one path.
    #[error("A total of {} config files are specified more than once (possibly indirectly)", .0.len())]
    DuplicateFiles(Vec<PathBuf>),

    /// A configuration file could not be read.
    #[error("Could not read configuration file {}: {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// The I/O failure.
        source: std::io::Error,
    },

    /// A fragment is not valid TOML.
    #[error(
        "Configuration file {label} is incorrectly formatted. Failed with the following message:\n{message}"
    )]
    Parse {
        /// File name or inline label of the fragment.
        label: String,
        /// The parser message.
        message: String,
    },

    /// Leaf keys defined by more than one fragment.
    #[error("The following tags are defined in multiple config files:\n{}", .0.join("\n"))]
    Collisions(Vec<String>),

    /// The core section failed validation.
    #[error("Validation of core configuration files failed see above errors")]
    CoreValidation(Vec<String>),

    /// `core.modules` is absent.
    #[error("Core configuration does not specify which other modules should be configured!")]
    NoModules,

    /// `core.modules` repeats names.
    #[error(
        "The list of modules to configure given in the core configuration file repeats {0} names!"
    )]
    RepeatedModules(usize),

    /// A listed module has no registered schema.
    #[error("Expected a schema for {0} module configuration, it was not provided!")]
    MissingSchema(String),

    /// The merged configuration failed validation.
    #[error("Validation of complete configuration files failed see above errors")]
    Validation(Vec<String>),

    /// The output directory does not exist.
    #[error("The user specified output directory ({}) doesn't exist!", .0.display())]
    OutputDirMissing(PathBuf),

    /// The output directory is not a directory.
    #[error("The user specified output folder ({}) isn't a directory!", .0.display())]
    OutputNotDir(PathBuf),

    /// The output file already exists.
    #[error(
        "A file in the user specified output folder ({}) already makes use of the specified output file name ({file}), this file should either be renamed or deleted!",
        dir.display()
    )]
    OutputExists {
        /// The output directory.
        dir: PathBuf,
        /// The clashing file name.
        file: String,
    },

    /// The merged configuration could not be encoded as TOML.
    #[error("Failed to encode configuration as TOML: {0}")]
    Encode(#[from] toml::ser::Error),

    /// The output file could not be written.
    #[error("Could not write configuration to {}: {source}", path.display())]
    Write {
        /// The output file.
        path: PathBuf,
        /// The I/O failure.
        source: std::io::Error,
    },

    /// A validated section does not match its typed view.
    #[error("Configuration section '{section}' does not match its expected shape: {source}")]
    Section {
        /// The section name.
        section: String,
        /// The decoding failure.
        source: serde_json::Error,
    },
}

/// Errors raised while registering a module schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema of that name is already registered.
    #[error("The module schema for {0} is already registered")]
    AlreadyRegistered(String),

    /// The schema text is not valid JSON.
    #[error("JSON error in schema file: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema is not a valid schema document.
    #[error("Module schema invalid in: {module}: {reason}")]
    Invalid {
        /// The module.
        module: String,
        /// What is wrong with the document.
        reason: String,
    },

    /// The schema lacks a structural key every module schema needs.
    #[error("Missing key in module schema {module}: {key}")]
    MissingKey {
        /// The module.
        module: String,
        /// The missing key path.
        key: String,
    },

    /// Registration failed; the cause has been logged.
    #[error("Schema registration for {module} failed: check log")]
    RegistrationFailed {
        /// The module.
        module: String,
        /// The underlying failure.
        #[source]
        cause: Box<Self>,
    },
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigError {
    /// Log the error at error level and hand it back for returning.
    pub(crate) fn logged(self) -> Self {
        tracing::error!("{self}");
        self
    }

    /// Build a read error for `path`.
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SchemaError {
    /// Log the error at error level and hand it back for returning.
    pub(crate) fn logged(self) -> Self {
        tracing::error!("{self}");
        self
    }
}
