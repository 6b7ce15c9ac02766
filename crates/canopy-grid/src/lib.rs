//! Grid geometry, neighbour topology, and spatial mapping for Canopy.
//!
//! This crate models the simulation grid: a regular tiling of equal-area
//! cells in a projected coordinate system, addressed by [`CellId`] in
//! row-major order from the north-west corner.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid construction, queries, and mapping.
//! - [`geometry`] -- Points, bounding boxes, and `geo`-backed polygons with
//!   closed point-in-polygon tests.
//! - [`grid`] -- [`Grid`] construction, neighbour and distance caches.
//! - [`mapping`] -- Mapping of x/y point data onto cells and canonical
//!   reindexing.
//! - [`export`] -- GeoJSON export of cell polygons.
//! - [`tiling`] -- Grid creators and the [`GridRegistry`] that selects one
//!   per tiling.
//!
//! [`CellId`]: canopy_types::CellId

pub mod error;
pub mod export;
pub mod geometry;
pub mod grid;
pub mod mapping;
pub mod tiling;

// Re-export primary types at crate root.
pub use error::GridError;
pub use geometry::{Bounds, Point, Polygon};
pub use grid::{DistanceMatrix, Grid};
pub use tiling::{GridCreator, GridRegistry, Layout};
