//! Axis validation, data loading, and the grid-bound data store for Canopy.
//!
//! Input datasets arrive in many layouts. This crate recognises those
//! layouts through axis validators, reshapes each array into the grid's
//! canonical cell order, and keeps the results in a [`DataStore`] that the
//! simulation models read from.
//!
//! # Modules
//!
//! - [`axes`] -- The [`AxisValidator`] trait and the [`AxisRegistry`] that
//!   dispatches arrays to exactly one validator per core axis.
//! - [`spatial`] -- Built-in validators for the `spatial` core axis.
//! - [`loader`] -- File loaders keyed by extension, with a JSON reader.
//! - [`store`] -- [`DataStore`], validated arrays bound to one grid.
//! - [`error`] -- Error types for validation, loading, and the store.

pub mod axes;
pub mod error;
pub mod loader;
pub mod spatial;
pub mod store;

// Re-export primary types at crate root.
pub use axes::{AxisMatches, AxisRegistry, AxisValidator};
pub use error::{AxisError, DataError, LoadError};
pub use loader::{DataLoader, JsonLoader, LoaderRegistry};
pub use spatial::SPATIAL_AXIS;
pub use store::DataStore;
