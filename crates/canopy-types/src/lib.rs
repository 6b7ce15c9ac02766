//! Shared type definitions for the Canopy simulation setup core.
//!
//! This crate is the single source of truth for the types that flow between
//! the grid, data, and configuration crates of the workspace.
//!
//! # Modules
//!
//! - [`ids`] -- The [`CellId`] newtype used to address grid cells
//! - [`enums`] -- Enumeration types (grid tilings)
//! - [`array`] -- [`DataArray`], the labelled array accepted by the data store
//! - [`config`] -- Typed views of the validated `core` configuration section

pub mod array;
pub mod config;
pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use array::{ArrayError, CoordValues, DataArray};
pub use config::{CoreConfig, DataConfig, DataVariable, GridConfig};
pub use enums::GridType;
pub use ids::CellId;
