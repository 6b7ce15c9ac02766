//! Error types for the `canopy-grid` crate.
//!
//! All fallible operations in this crate, including the spatial mapper,
//! return [`GridError`]. The mapper variants carry fixed messages because
//! data validators surface them directly to users.

use canopy_types::{CellId, GridType};

/// Errors that can occur while building or querying a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The requested tiling has no generator.
    #[error("The grid_type {0} is not implemented.")]
    NotImplemented(GridType),

    /// A grid creator returned the wrong number of cell polygons.
    #[error("The {grid_type} creator function generated {actual} polygons for {expected} cells.")]
    CreatorLength {
        /// The tiling whose creator misbehaved.
        grid_type: GridType,
        /// Cells in the requested layout.
        expected: usize,
        /// Polygons returned.
        actual: usize,
    },

    /// A cell polygon has no vertices, so no centroid.
    #[error("The {grid_type} creator function generated an empty polygon for cell {cell}.")]
    EmptyCell {
        /// The tiling whose creator misbehaved.
        grid_type: GridType,
        /// Position of the empty polygon.
        cell: usize,
    },

    /// The cell area is not a positive finite number.
    #[error("cell_area must be a positive finite number, got {0}")]
    InvalidCellArea(f64),

    /// One of the cell counts is zero.
    #[error("cell_nx and cell_ny must be positive, got {nx} x {ny}")]
    InvalidCellCount {
        /// Cells along x.
        nx: u32,
        /// Cells along y.
        ny: u32,
    },

    /// The grid would hold more cells than a [`CellId`] can address.
    #[error("a {nx} x {ny} grid exceeds the maximum number of cells")]
    TooManyCells {
        /// Cells along x.
        nx: u32,
        /// Cells along y.
        ny: u32,
    },

    /// A grid offset is not finite.
    #[error("grid offsets must be finite, got ({xoff}, {yoff})")]
    InvalidOffset {
        /// Offset along x.
        xoff: f64,
        /// Offset along y.
        yoff: f64,
    },

    /// The neighbour distance is negative or not a number.
    #[error("neighbour distance must be a non-negative number, got {0}")]
    InvalidDistance(f64),

    /// Neighbours were read before [`set_neighbours`] was called.
    ///
    /// [`set_neighbours`]: crate::Grid::set_neighbours
    #[error("Neighbours not yet defined: use set_neighbours.")]
    NeighboursNotSet,

    /// A cell id is outside the grid.
    #[error("unknown cell id: {0}")]
    UnknownCellId(CellId),

    // -------------------------------------------------------------------
    // Spatial mapper
    // -------------------------------------------------------------------
    /// The x and y coordinate sequences differ in length.
    #[error("The x/y coordinates are of unequal length")]
    UnequalCoordinates,

    /// Only one of the x/y index sequences was supplied.
    #[error("Only one of x/y indices provided.")]
    PartialIndices,

    /// The x/y index sequences do not match the coordinates.
    #[error("Dimensions of x/y indices do not match coordinates")]
    IndexShapeMismatch,

    /// At least one point lies in no cell.
    #[error("Mapped points fall outside grid.")]
    PointsOutsideGrid,

    /// At least one point lies in more than one cell.
    #[error("Mapped points fall on cell boundaries.")]
    PointsOnBoundaries,

    /// Some cells received no point.
    #[error("Mapped points do not cover all cells.")]
    CellsNotCovered,

    /// Some cells received more than one point.
    #[error("Some cells contain more than one point.")]
    MultiplePointsPerCell,

    // -------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------
    /// The requested GeoJSON precision exceeds what `f64` can hold.
    #[error("GeoJSON precision must be at most {max} decimal places, got {0}", max = crate::export::MAX_DP)]
    InvalidPrecision(u8),

    /// Writing an export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the GeoJSON document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    /// Log the error at error level and hand it back for returning.
    pub(crate) fn logged(self) -> Self {
        tracing::error!("{self}");
        self
    }
}
