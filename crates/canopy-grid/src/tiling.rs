//! Grid creators for each supported tiling, and the registry that holds them.
//!
//! A creator returns one polygon per cell in cell id order. Cell ids are
//! `ix + iy * nx` and row `iy = 0` is the northernmost, so y offsets run
//! from `ny - 1` down to zero.

use std::collections::BTreeMap;

use canopy_types::GridType;
use tracing::warn;

use crate::error::GridError;
use crate::geometry::{Point, Polygon};

/// Layout parameters handed to a grid creator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Area of each cell.
    pub cell_area: f64,
    /// Cells along x.
    pub cell_nx: u32,
    /// Cells along y.
    pub cell_ny: u32,
    /// Origin offset along x.
    pub xoff: f64,
    /// Origin offset along y.
    pub yoff: f64,
}

impl Layout {
    /// Number of cells the layout asks for.
    pub const fn n_cells(&self) -> usize {
        self.cell_nx as usize * self.cell_ny as usize
    }
}

/// Builds the cell polygons of a tiling, in cell id order.
pub type GridCreator = fn(&Layout) -> Result<Vec<Polygon>, GridError>;

/// Grid creators keyed by tiling.
///
/// [`GridRegistry::with_defaults`] holds the square and hexagon creators.
/// Triangles have no bundled creator; registering one makes them
/// constructible.
#[derive(Debug, Clone, Default)]
pub struct GridRegistry {
    creators: BTreeMap<GridType, GridCreator>,
}

impl GridRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the bundled square and hexagon creators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(GridType::Square, square_cells);
        registry.register(GridType::Hexagon, hexagon_cells);
        registry
    }

    /// Register `creator` for `grid_type`.
    ///
    /// An existing creator for the tiling is replaced with a warning.
    pub fn register(&mut self, grid_type: GridType, creator: GridCreator) {
        if self.creators.contains_key(&grid_type) {
            warn!("Grid type {grid_type} already exists and is being replaced");
        }
        self.creators.insert(grid_type, creator);
    }

    /// Whether a creator is registered for `grid_type`.
    pub fn contains(&self, grid_type: GridType) -> bool {
        self.creators.contains_key(&grid_type)
    }

    /// Registered tilings, in declaration order.
    pub fn grid_types(&self) -> impl Iterator<Item = GridType> + '_ {
        self.creators.keys().copied()
    }

    /// Run the creator for `grid_type` and check it made one polygon per cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotImplemented`] if no creator is registered,
    /// [`GridError::CreatorLength`] if the creator returns the wrong number
    /// of polygons, or the creator's own error.
    pub fn create(&self, grid_type: GridType, layout: &Layout) -> Result<Vec<Polygon>, GridError> {
        let creator = self
            .creators
            .get(&grid_type)
            .ok_or_else(|| GridError::NotImplemented(grid_type).logged())?;
        let polygons = creator(layout)?;
        if polygons.len() != layout.n_cells() {
            return Err(GridError::CreatorLength {
                grid_type,
                expected: layout.n_cells(),
                actual: polygons.len(),
            }
            .logged());
        }
        Ok(polygons)
    }
}

// ---------------------------------------------------------------------------
// Bundled creators
// ---------------------------------------------------------------------------

/// Side length of a pointy-top hexagon with unit area.
fn hex_side_unit() -> f64 {
    3.0_f64.powf(0.25) * (2.0_f64 / 9.0).sqrt()
}

/// Apothem of a pointy-top hexagon with the given side length.
fn hex_apothem(side: f64) -> f64 {
    3.0_f64.sqrt() * side / 2.0
}

/// Unit-area square anchored at the origin.
fn square_prototype() -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ])
}

/// Unit-area pointy-top hexagon with its bounding box anchored at the origin.
fn hexagon_prototype() -> Polygon {
    let s = hex_side_unit();
    let a = hex_apothem(s);
    Polygon::new(vec![
        Point::new(a, 0.0),
        Point::new(2.0 * a, 0.5 * s),
        Point::new(2.0 * a, 1.5 * s),
        Point::new(a, 2.0 * s),
        Point::new(0.0, 1.5 * s),
        Point::new(0.0, 0.5 * s),
    ])
}

/// Square cells in rows and columns.
///
/// # Errors
///
/// Never fails; the signature matches [`GridCreator`].
#[allow(clippy::unnecessary_wraps)]
pub fn square_cells(layout: &Layout) -> Result<Vec<Polygon>, GridError> {
    let size = layout.cell_area.sqrt();
    Ok(tile(layout, &square_prototype(), |ix, _| (f64::from(ix) * size, size)))
}

/// Pointy-top hexagons with odd rows shifted east by one apothem.
///
/// # Errors
///
/// Never fails; the signature matches [`GridCreator`].
#[allow(clippy::unnecessary_wraps)]
pub fn hexagon_cells(layout: &Layout) -> Result<Vec<Polygon>, GridError> {
    let side = hex_side_unit() * layout.cell_area.sqrt();
    let apothem = hex_apothem(side);
    Ok(tile(layout, &hexagon_prototype(), |ix, iy| {
        let stagger = if iy % 2 == 1 { apothem } else { 0.0 };
        (2.0 * apothem * f64::from(ix) + stagger, 1.5 * side)
    }))
}

/// Place a unit-area prototype at every cell of `layout`.
///
/// `step(ix, iy)` gives the x offset of the cell and the vertical distance
/// between rows; rows are stacked from the south so row `iy = 0` ends up
/// northernmost.
fn tile(
    layout: &Layout,
    prototype: &Polygon,
    step: impl Fn(u32, u32) -> (f64, f64),
) -> Vec<Polygon> {
    let prototype = prototype
        .scale(layout.cell_area.sqrt())
        .translate(layout.xoff, layout.yoff);
    let mut polygons = Vec::with_capacity(layout.n_cells());
    for iy in 0..layout.cell_ny {
        let row = f64::from(layout.cell_ny - 1 - iy);
        for ix in 0..layout.cell_nx {
            let (dx, row_height) = step(ix, iy);
            polygons.push(prototype.translate(dx, row * row_height));
        }
    }
    polygons
}
