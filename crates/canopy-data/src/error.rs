//! Error types for the `canopy-data` crate.
//!
//! Three enums split the failure surface: [`AxisError`] for validator
//! registration and dispatch, [`LoadError`] for reading arrays from files,
//! and [`DataError`] for the data store itself.

use std::path::PathBuf;

use canopy_grid::GridError;
use canopy_types::ArrayError;

/// Errors raised while registering or running axis validators.
#[derive(Debug, thiserror::Error)]
pub enum AxisError {
    /// A validator declared an empty core axis name.
    #[error("Core axis name cannot be an empty string.")]
    EmptyCoreAxis,

    /// A validator declared no dimension names.
    #[error("AxisValidator dim names cannot be an empty set.")]
    EmptyDimNames,

    /// A validator with the same name is already registered on the axis.
    #[error("AxisValidator '{name}' is already registered on the '{axis}' axis")]
    DuplicateValidator {
        /// The core axis.
        axis: String,
        /// The validator name.
        name: String,
    },

    /// More than one validator on an axis accepted the same array.
    #[error("Validators on '{0}' axis not mutually exclusive")]
    NotMutuallyExclusive(String),

    /// The array uses dimension names of an axis but no validator accepts it.
    #[error("DataArray uses '{axis}' axis dimension names but does not match a validator: {dims}")]
    NoMatchingValidator {
        /// The core axis.
        axis: String,
        /// Comma-separated axis dimension names found on the array.
        dims: String,
    },

    /// The `cell_id` dimension does not match the number of grid cells.
    #[error("Grid defines {expected} cells, data provides {actual}")]
    CellCount {
        /// Number of grid cells.
        expected: usize,
        /// Size of the `cell_id` dimension.
        actual: usize,
    },

    /// The `cell_id` coordinate repeats a value.
    #[error("The data cell ids contain duplicate values.")]
    DuplicateCellIds,

    /// The `cell_id` coordinate misses some grid cells.
    #[error("The data cell ids are not a superset of grid cell ids.")]
    NotSuperset,

    /// The `cell_id` coordinate holds non-integer values.
    #[error("The data cell ids are not integers.")]
    NonIntegerCellIds,

    /// The x/y dimension sizes do not match the square grid.
    #[error("Data XY dimensions do not match square grid")]
    XyShape,

    /// The spatial mapper rejected the array coordinates.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Reshaping the array failed.
    #[error(transparent)]
    Array(#[from] ArrayError),
}

/// Errors raised while loading an array from a file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No loader is registered for the file extension.
    #[error("No file format loader provided for .{0}")]
    UnknownFormat(String),

    /// The file does not contain the requested variable.
    #[error("Variable '{var_name}' not found in {}", file.display())]
    VariableNotFound {
        /// The requested variable.
        var_name: String,
        /// The file searched.
        file: PathBuf,
    },

    /// The variable exists but is not a labelled array.
    #[error("Variable '{var_name}' in {} is not a labelled array: {source}", file.display())]
    NotAnArray {
        /// The requested variable.
        var_name: String,
        /// The file read.
        file: PathBuf,
        /// The decoding failure.
        source: serde_json::Error,
    },

    /// The file could not be read.
    #[error("Could not read data file {}: {source}", file.display())]
    Io {
        /// The file.
        file: PathBuf,
        /// The I/O failure.
        source: std::io::Error,
    },

    /// The file is not a JSON object of variables.
    #[error("Data file {} is not a JSON object of variables: {source}", file.display())]
    Format {
        /// The file.
        file: PathBuf,
        /// The parse failure.
        source: serde_json::Error,
    },
}

/// Errors raised by the data store.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// No array is stored under the name.
    #[error("Unknown variable name: {0}")]
    UnknownVariable(String),

    /// The core axis is not known to the axis registry.
    #[error("Unknown core axis name: {0}")]
    UnknownCoreAxis(String),

    /// The array failed axis validation.
    #[error(transparent)]
    Axis(#[from] AxisError),

    /// One or more configured variables failed to load or validate.
    #[error("Data configuration did not load cleanly")]
    LoadFailed {
        /// One message per failure, in configuration order.
        failures: Vec<String>,
    },
}

macro_rules! impl_logged {
    ($($ty:ty),+) => {$(
        impl $ty {
            /// Log the error at error level and hand it back for returning.
            pub(crate) fn logged(self) -> Self {
                tracing::error!("{self}");
                self
            }
        }
    )+};
}

impl_logged!(AxisError, LoadError, DataError);
