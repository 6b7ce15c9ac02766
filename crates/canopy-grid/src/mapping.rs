//! Mapping of point coordinates onto grid cells.
//!
//! Data files often carry their own x/y coordinates rather than cell ids.
//! The mapper finds the cell containing each point and, for validators that
//! need a one-to-one relationship, turns that mapping into index arrays that
//! pull the data into canonical cell id order.

use canopy_types::CellId;
use tracing::debug;

use crate::error::GridError;
use crate::geometry::Point;
use crate::grid::Grid;

impl Grid {
    /// Find the cells containing each `(x, y)` point.
    ///
    /// Each entry lists every cell whose closed polygon contains the point:
    /// empty when the point falls outside the grid, more than one when it
    /// lies on a shared cell boundary.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnequalCoordinates`] if `x` and `y` differ in
    /// length.
    pub fn map_xy_to_cell_id(&self, x: &[f64], y: &[f64]) -> Result<Vec<Vec<CellId>>, GridError> {
        if x.len() != y.len() {
            return Err(GridError::UnequalCoordinates.logged());
        }
        let mapped = x
            .iter()
            .zip(y)
            .map(|(&px, &py)| {
                let p = Point::new(px, py);
                self.cell_ids()
                    .iter()
                    .zip(self.polygons())
                    .filter(|(_, poly)| poly.contains(p))
                    .map(|(&id, _)| id)
                    .collect()
            })
            .collect();
        Ok(mapped)
    }

    /// Build index arrays that reorder point data into cell id order.
    ///
    /// The points must map one-to-one onto the grid cells. When `strict` is
    /// false, points outside the grid are allowed and skipped. `x_idx` and
    /// `y_idx` give, for each point, its position along the source x and y
    /// axes; both default to `0..len`. The returned pair `(x, y)` holds, for
    /// each cell in canonical order, the source positions of its point.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] mapper variant if the inputs are inconsistent,
    /// or if any point is outside the grid (strict only), on a cell boundary,
    /// or if the points do not cover every cell exactly once.
    pub fn map_xy_to_cell_indexing(
        &self,
        x: &[f64],
        y: &[f64],
        x_idx: Option<&[usize]>,
        y_idx: Option<&[usize]>,
        strict: bool,
    ) -> Result<(Vec<usize>, Vec<usize>), GridError> {
        let cell_map = self.map_xy_to_cell_id(x, y)?;

        let sequence: Vec<usize> = (0..x.len()).collect();
        let (x_idx, y_idx) = match (x_idx, y_idx) {
            (None, None) => (sequence.as_slice(), sequence.as_slice()),
            (Some(xi), Some(yi)) => (xi, yi),
            _ => return Err(GridError::PartialIndices.logged()),
        };
        if x_idx.len() != x.len() || y_idx.len() != y.len() {
            return Err(GridError::IndexShapeMismatch.logged());
        }

        if strict && cell_map.iter().any(Vec::is_empty) {
            return Err(GridError::PointsOutsideGrid.logged());
        }
        if cell_map.iter().any(|cells| cells.len() > 1) {
            return Err(GridError::PointsOnBoundaries.logged());
        }

        // Source positions per cell; a second hit on a cell is recorded as a
        // duplicate rather than overwriting the first.
        let mut slots: Vec<Option<(usize, usize)>> = vec![None; self.n_cells()];
        let mut duplicated = false;
        for ((cells, &xi), &yi) in cell_map.iter().zip(x_idx).zip(y_idx) {
            let Some(id) = cells.first() else { continue };
            if let Some(slot) = slots.get_mut(id.index()) {
                if slot.is_some() {
                    duplicated = true;
                } else {
                    *slot = Some((xi, yi));
                }
            }
        }

        if slots.iter().any(Option::is_none) {
            return Err(GridError::CellsNotCovered.logged());
        }
        if duplicated {
            return Err(GridError::MultiplePointsPerCell.logged());
        }

        debug!(points = x.len(), n_cells = self.n_cells(), "Mapped points onto cells");
        Ok(slots.into_iter().flatten().unzip())
    }
}
