//! Built-in validators for the `spatial` core axis.
//!
//! The canonical spatial form of an array is a `cell_id` dimension whose
//! positions follow the grid's cell id order. Four layouts are recognised:
//!
//! | validator                   | dims       | coordinates     | grid   |
//! |-----------------------------|------------|-----------------|--------|
//! | `spatial_cell_id_dim_any`   | `cell_id`  | none            | any    |
//! | `spatial_cell_id_coord_any` | `cell_id`  | integer ids     | any    |
//! | `spatial_xy_dim_square`     | `x`, `y`   | none            | square |
//! | `spatial_xy_coord_square`   | `x`, `y`   | on both         | square |

use std::collections::BTreeMap;

use canopy_grid::Grid;
use canopy_types::{CoordValues, DataArray, GridType};

use crate::axes::AxisValidator;
use crate::error::AxisError;

/// Name of the spatial core axis.
pub const SPATIAL_AXIS: &str = "spatial";

const CELL_ID: &str = "cell_id";
const X: &str = "x";
const Y: &str = "y";

/// The four built-in spatial validators, in registration order.
pub fn validators() -> Vec<Box<dyn AxisValidator>> {
    vec![
        Box::new(CellIdDimAny),
        Box::new(CellIdCoordAny),
        Box::new(XyDimSquare),
        Box::new(XyCoordSquare),
    ]
}

fn has_xy_dims(array: &DataArray) -> bool {
    array.has_dim(X) && array.has_dim(Y)
}

/// Collapse the `y`/`x` dimensions into `cell_id` using per-cell indices.
fn stack_xy(array: &DataArray, x_idx: &[usize], y_idx: &[usize]) -> Result<DataArray, AxisError> {
    Ok(array.select_points(Y, X, y_idx, x_idx, CELL_ID)?)
}

// ---------------------------------------------------------------------------
// cell_id layouts
// ---------------------------------------------------------------------------

/// A `cell_id` dimension without coordinates, already in grid order.
#[derive(Debug, Clone, Copy)]
pub struct CellIdDimAny;

impl AxisValidator for CellIdDimAny {
    fn name(&self) -> &str {
        "spatial_cell_id_dim_any"
    }

    fn core_axis(&self) -> &str {
        SPATIAL_AXIS
    }

    fn dim_names(&self) -> Vec<&str> {
        vec![CELL_ID]
    }

    fn can_validate(&self, array: &DataArray, _grid: &Grid) -> bool {
        array.has_dim(CELL_ID) && !array.has_coord(CELL_ID)
    }

    fn run_validation(&self, array: DataArray, grid: &Grid) -> Result<DataArray, AxisError> {
        let actual = array.dim_size(CELL_ID).unwrap_or_default();
        if actual != grid.n_cells() {
            return Err(AxisError::CellCount {
                expected: grid.n_cells(),
                actual,
            });
        }
        Ok(array)
    }
}

/// A `cell_id` dimension with explicit ids, in any order and possibly
/// covering extra cells.
#[derive(Debug, Clone, Copy)]
pub struct CellIdCoordAny;

impl AxisValidator for CellIdCoordAny {
    fn name(&self) -> &str {
        "spatial_cell_id_coord_any"
    }

    fn core_axis(&self) -> &str {
        SPATIAL_AXIS
    }

    fn dim_names(&self) -> Vec<&str> {
        vec![CELL_ID]
    }

    fn can_validate(&self, array: &DataArray, _grid: &Grid) -> bool {
        array.has_dim(CELL_ID) && array.has_coord(CELL_ID)
    }

    fn run_validation(&self, array: DataArray, grid: &Grid) -> Result<DataArray, AxisError> {
        let ids = array
            .coord(CELL_ID)
            .and_then(CoordValues::as_ints)
            .ok_or(AxisError::NonIntegerCellIds)?;

        let mut position = BTreeMap::new();
        for (pos, &id) in ids.iter().enumerate() {
            if position.insert(id, pos).is_some() {
                return Err(AxisError::DuplicateCellIds);
            }
        }

        let order = grid
            .cell_ids()
            .iter()
            .map(|id| position.get(&i64::from(id.into_inner())).copied())
            .collect::<Option<Vec<usize>>>()
            .ok_or(AxisError::NotSuperset)?;

        Ok(array.select(CELL_ID, &order)?)
    }
}

// ---------------------------------------------------------------------------
// x/y layouts
// ---------------------------------------------------------------------------

/// `x` and `y` dimensions without coordinates, matching the square grid
/// shape with row zero at the north edge.
#[derive(Debug, Clone, Copy)]
pub struct XyDimSquare;

impl AxisValidator for XyDimSquare {
    fn name(&self) -> &str {
        "spatial_xy_dim_square"
    }

    fn core_axis(&self) -> &str {
        SPATIAL_AXIS
    }

    fn dim_names(&self) -> Vec<&str> {
        vec![X, Y]
    }

    fn can_validate(&self, array: &DataArray, grid: &Grid) -> bool {
        grid.grid_type() == GridType::Square
            && has_xy_dims(array)
            && !array.has_coord(X)
            && !array.has_coord(Y)
    }

    fn run_validation(&self, array: DataArray, grid: &Grid) -> Result<DataArray, AxisError> {
        let nx = grid.cell_nx() as usize;
        let ny = grid.cell_ny() as usize;
        if array.dim_size(X) != Some(nx) || array.dim_size(Y) != Some(ny) {
            return Err(AxisError::XyShape);
        }
        let x_idx: Vec<usize> = (0..grid.n_cells()).map(|c| c % nx).collect();
        let y_idx: Vec<usize> = (0..grid.n_cells()).map(|c| c / nx).collect();
        stack_xy(&array, &x_idx, &y_idx)
    }
}

/// `x` and `y` dimensions with coordinates; every point of the coordinate
/// mesh must fall inside exactly one cell and every cell must receive
/// exactly one point.
#[derive(Debug, Clone, Copy)]
pub struct XyCoordSquare;

impl AxisValidator for XyCoordSquare {
    fn name(&self) -> &str {
        "spatial_xy_coord_square"
    }

    fn core_axis(&self) -> &str {
        SPATIAL_AXIS
    }

    fn dim_names(&self) -> Vec<&str> {
        vec![X, Y]
    }

    fn can_validate(&self, array: &DataArray, grid: &Grid) -> bool {
        grid.grid_type() == GridType::Square
            && has_xy_dims(array)
            && array.has_coord(X)
            && array.has_coord(Y)
    }

    fn run_validation(&self, array: DataArray, grid: &Grid) -> Result<DataArray, AxisError> {
        let xs = array.coord(X).map(CoordValues::to_f64).unwrap_or_default();
        let ys = array.coord(Y).map(CoordValues::to_f64).unwrap_or_default();

        let n = xs.len() * ys.len();
        let (mut px, mut py) = (Vec::with_capacity(n), Vec::with_capacity(n));
        let (mut xi, mut yi) = (Vec::with_capacity(n), Vec::with_capacity(n));
        for (iy, &y) in ys.iter().enumerate() {
            for (ix, &x) in xs.iter().enumerate() {
                px.push(x);
                py.push(y);
                xi.push(ix);
                yi.push(iy);
            }
        }

        let (x_idx, y_idx) = grid.map_xy_to_cell_indexing(&px, &py, Some(&xi), Some(&yi), true)?;
        stack_xy(&array, &x_idx, &y_idx)
    }
}
