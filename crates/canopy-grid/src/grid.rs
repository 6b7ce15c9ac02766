//! The simulation grid: cell polygons, centroids, and cached topology.
//!
//! A [`Grid`] is built once from its layout parameters. Afterwards only the
//! two caches change: the neighbour lists, which must be populated with
//! [`Grid::set_neighbours`] before they can be read, and the optional full
//! distance matrix, which [`Grid::populate_distances`] stores for fast
//! lookup at the cost of `n_cells^2` memory.

use canopy_types::{CellId, GridConfig, GridType};
use ndarray::{Array2, ArrayView1, Axis};
use tracing::{debug, info};

use crate::error::GridError;
use crate::geometry::{Bounds, Point, Polygon};
use crate::tiling::{GridRegistry, Layout};

/// A dense matrix of centroid distances between two sets of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix(Array2<f64>);

impl DistanceMatrix {
    /// Number of source cells.
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    /// Number of target cells.
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    /// Distance from source `row` to target `col`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.0.get((row, col)).copied()
    }

    /// Distances from source `row` to every target.
    pub fn row(&self, row: usize) -> Option<ArrayView1<'_, f64>> {
        (row < self.rows()).then(|| self.0.index_axis(Axis(0), row))
    }

    /// The underlying matrix.
    pub const fn as_array(&self) -> &Array2<f64> {
        &self.0
    }
}

/// The grid of cells a simulation runs on.
///
/// Cells are numbered `0..n_cells` in row-major order starting from the
/// north-west corner. Every per-cell vector is in that order.
#[derive(Debug, Clone)]
pub struct Grid {
    grid_type: GridType,
    cell_area: f64,
    cell_nx: u32,
    cell_ny: u32,
    xoff: f64,
    yoff: f64,
    cell_ids: Vec<CellId>,
    polygons: Vec<Polygon>,
    centroids: Vec<Point>,
    bounds: Bounds,
    /// Neighbour ids per cell, once computed.
    neighbours: Option<Vec<Vec<CellId>>>,
    /// Full symmetric distance matrix, once populated.
    distances: Option<DistanceMatrix>,
}

impl Grid {
    /// Build a grid from its layout parameters with the bundled creators.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the area is not a positive finite number,
    /// a cell count is zero, an offset is not finite, the cell count
    /// overflows, or the tiling has no creator.
    pub fn new(
        grid_type: GridType,
        cell_area: f64,
        cell_nx: u32,
        cell_ny: u32,
        xoff: f64,
        yoff: f64,
    ) -> Result<Self, GridError> {
        Self::with_registry(
            &GridRegistry::with_defaults(),
            grid_type,
            cell_area,
            cell_nx,
            cell_ny,
            xoff,
            yoff,
        )
    }

    /// Build a grid using the creator `registry` holds for `grid_type`.
    ///
    /// # Errors
    ///
    /// As [`Grid::new`], plus any failure of the registered creator.
    pub fn with_registry(
        registry: &GridRegistry,
        grid_type: GridType,
        cell_area: f64,
        cell_nx: u32,
        cell_ny: u32,
        xoff: f64,
        yoff: f64,
    ) -> Result<Self, GridError> {
        if !(cell_area.is_finite() && cell_area > 0.0) {
            return Err(GridError::InvalidCellArea(cell_area).logged());
        }
        if cell_nx == 0 || cell_ny == 0 {
            return Err(GridError::InvalidCellCount {
                nx: cell_nx,
                ny: cell_ny,
            }
            .logged());
        }
        if !(xoff.is_finite() && yoff.is_finite()) {
            return Err(GridError::InvalidOffset { xoff, yoff }.logged());
        }
        let n_cells = cell_nx.checked_mul(cell_ny).ok_or_else(|| {
            GridError::TooManyCells {
                nx: cell_nx,
                ny: cell_ny,
            }
            .logged()
        })?;

        let layout = Layout {
            cell_area,
            cell_nx,
            cell_ny,
            xoff,
            yoff,
        };
        let polygons = registry.create(grid_type, &layout)?;
        let centroids = polygons
            .iter()
            .enumerate()
            .map(|(cell, p)| {
                p.centroid()
                    .ok_or_else(|| GridError::EmptyCell { grid_type, cell }.logged())
            })
            .collect::<Result<Vec<Point>, GridError>>()?;
        let bounds = polygons
            .iter()
            .fold(Bounds::EMPTY, |b, p| b.union(p.bounds()));
        let cell_ids = (0..n_cells).map(CellId).collect();

        info!(
            grid_type = %grid_type,
            cell_area,
            cell_nx,
            cell_ny,
            n_cells,
            "Grid created"
        );

        Ok(Self {
            grid_type,
            cell_area,
            cell_nx,
            cell_ny,
            xoff,
            yoff,
            cell_ids,
            polygons,
            centroids,
            bounds,
            neighbours: None,
            distances: None,
        })
    }

    /// Build a grid from the `core.grid` configuration section.
    ///
    /// # Errors
    ///
    /// See [`Grid::new`].
    pub fn from_config(config: &GridConfig) -> Result<Self, GridError> {
        Self::from_config_with(&GridRegistry::with_defaults(), config)
    }

    /// Build a grid from the `core.grid` section using `registry`.
    ///
    /// # Errors
    ///
    /// See [`Grid::with_registry`].
    pub fn from_config_with(registry: &GridRegistry, config: &GridConfig) -> Result<Self, GridError> {
        Self::with_registry(
            registry,
            config.grid_type,
            config.cell_area,
            config.cell_nx,
            config.cell_ny,
            config.xoff,
            config.yoff,
        )
    }

    // -------------------------------------------------------------------
    // Layout accessors
    // -------------------------------------------------------------------

    /// The tiling rule.
    pub const fn grid_type(&self) -> GridType {
        self.grid_type
    }

    /// Area of each cell.
    pub const fn cell_area(&self) -> f64 {
        self.cell_area
    }

    /// Cells along x.
    pub const fn cell_nx(&self) -> u32 {
        self.cell_nx
    }

    /// Cells along y.
    pub const fn cell_ny(&self) -> u32 {
        self.cell_ny
    }

    /// Origin offset along x.
    pub const fn xoff(&self) -> f64 {
        self.xoff
    }

    /// Origin offset along y.
    pub const fn yoff(&self) -> f64 {
        self.yoff
    }

    /// Total number of cells.
    pub const fn n_cells(&self) -> usize {
        self.cell_ids.len()
    }

    /// Cell ids in canonical order.
    pub fn cell_ids(&self) -> &[CellId] {
        &self.cell_ids
    }

    /// Cell polygons in cell id order.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Cell centroids in cell id order.
    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    /// Bounding box of the whole grid.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Whether `id` addresses a cell of this grid.
    pub fn contains_cell(&self, id: CellId) -> bool {
        id.index() < self.n_cells()
    }

    // -------------------------------------------------------------------
    // Topology caches
    // -------------------------------------------------------------------

    /// Compute the neighbours of every cell.
    ///
    /// A cell's neighbours are all cells whose centroid lies within
    /// `distance` of its own centroid, the cell itself included.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDistance`] for a negative or NaN distance.
    pub fn set_neighbours(&mut self, distance: f64) -> Result<(), GridError> {
        if distance.is_nan() || distance < 0.0 {
            return Err(GridError::InvalidDistance(distance).logged());
        }
        let mut neighbours = Vec::with_capacity(self.n_cells());
        for &focal in &self.cell_ids {
            let row = self.distances(Some(&[focal]), None)?;
            let ids = self
                .cell_ids
                .iter()
                .enumerate()
                .filter(|&(col, _)| row.get(0, col).is_some_and(|d| d <= distance))
                .map(|(_, &id)| id)
                .collect();
            neighbours.push(ids);
        }
        debug!(distance, n_cells = self.n_cells(), "Neighbours set");
        self.neighbours = Some(neighbours);
        Ok(())
    }

    /// Neighbour ids of every cell, in cell id order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NeighboursNotSet`] before [`Grid::set_neighbours`]
    /// has been called.
    pub fn neighbours(&self) -> Result<&[Vec<CellId>], GridError> {
        self.neighbours
            .as_deref()
            .ok_or_else(|| GridError::NeighboursNotSet.logged())
    }

    /// Store the full distance matrix for fast lookup.
    pub fn populate_distances(&mut self) {
        let n = self.n_cells();
        let matrix = Array2::from_shape_fn((n, n), |(a, b)| self.centroid_distance(a, b));
        debug!(n_cells = n, "Distance matrix populated");
        self.distances = Some(DistanceMatrix(matrix));
    }

    /// Whether the full distance matrix is stored.
    pub const fn has_distances(&self) -> bool {
        self.distances.is_some()
    }

    /// Centroid distances between two sets of cells.
    ///
    /// `None` on either side stands for every cell. Uses the stored matrix
    /// when populated and computes distances on demand otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownCellId`] if any id is outside the grid.
    pub fn distances(
        &self,
        from: Option<&[CellId]>,
        to: Option<&[CellId]>,
    ) -> Result<DistanceMatrix, GridError> {
        let from = from.unwrap_or(&self.cell_ids);
        let to = to.unwrap_or(&self.cell_ids);
        if let Some(&bad) = from.iter().chain(to).find(|&&id| !self.contains_cell(id)) {
            return Err(GridError::UnknownCellId(bad).logged());
        }

        let matrix = Array2::from_shape_fn((from.len(), to.len()), |(i, j)| {
            match (from.get(i), to.get(j)) {
                (Some(&a), Some(&b)) => match &self.distances {
                    Some(cached) => cached.get(a.index(), b.index()).unwrap_or(f64::NAN),
                    None => self.centroid_distance(a.index(), b.index()),
                },
                _ => f64::NAN,
            }
        });
        Ok(DistanceMatrix(matrix))
    }

    /// Distance between the centroids of cells `a` and `b`; NaN if either
    /// is out of range.
    fn centroid_distance(&self, a: usize, b: usize) -> f64 {
        self.centroids
            .get(a)
            .zip(self.centroids.get(b))
            .map_or(f64::NAN, |(&p, &q)| p.distance(q))
    }
}

impl core::fmt::Display for Grid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Grid({}, A={}, nx={}, ny={}, n={}, bounds={})",
            self.grid_type,
            self.cell_area,
            self.cell_nx,
            self.cell_ny,
            self.n_cells(),
            self.bounds
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tiling::square_cells;

    fn square(nx: u32, ny: u32) -> Grid {
        Grid::new(GridType::Square, 100.0, nx, ny, 0.0, 0.0).unwrap()
    }

    #[test]
    fn square_grid_layout() {
        let grid = square(3, 2);
        assert_eq!(grid.n_cells(), 6);
        assert_eq!(grid.cell_ids().last(), Some(&CellId(5)));
        assert_eq!(grid.bounds().to_string(), "(0, 0, 30, 20)");
        assert_eq!(
            grid.to_string(),
            "Grid(square, A=100, nx=3, ny=2, n=6, bounds=(0, 0, 30, 20))"
        );
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            Grid::new(GridType::Square, 0.0, 3, 3, 0.0, 0.0),
            Err(GridError::InvalidCellArea(_))
        ));
        assert!(matches!(
            Grid::new(GridType::Square, f64::NAN, 3, 3, 0.0, 0.0),
            Err(GridError::InvalidCellArea(_))
        ));
        assert!(matches!(
            Grid::new(GridType::Hexagon, 1.0, 0, 3, 0.0, 0.0),
            Err(GridError::InvalidCellCount { nx: 0, ny: 3 })
        ));
        assert!(matches!(
            Grid::new(GridType::Triangle, 1.0, 3, 3, 0.0, 0.0),
            Err(GridError::NotImplemented(GridType::Triangle))
        ));
    }

    #[test]
    fn registered_creator_builds_triangle_grid() {
        let mut registry = GridRegistry::with_defaults();
        registry.register(GridType::Triangle, square_cells);
        let grid = Grid::with_registry(&registry, GridType::Triangle, 4.0, 2, 2, 0.0, 0.0).unwrap();
        assert_eq!(grid.grid_type(), GridType::Triangle);
        assert_eq!(grid.n_cells(), 4);
        assert_eq!(grid.bounds().to_string(), "(0, 0, 4, 4)");
    }

    #[test]
    fn empty_cell_polygon_is_rejected() {
        fn hollow(layout: &Layout) -> Result<Vec<Polygon>, GridError> {
            Ok(vec![Polygon::new(Vec::new()); layout.n_cells()])
        }
        let mut registry = GridRegistry::new();
        registry.register(GridType::Square, hollow);
        let result = Grid::with_registry(&registry, GridType::Square, 1.0, 2, 1, 0.0, 0.0);
        assert!(matches!(
            result,
            Err(GridError::EmptyCell {
                grid_type: GridType::Square,
                cell: 0,
            })
        ));
    }

    #[test]
    fn offsets_shift_every_cell() {
        let grid = Grid::new(GridType::Square, 100.0, 2, 2, 1000.0, -50.0).unwrap();
        let first = grid.centroids().first().copied().unwrap();
        assert!(first.distance(Point::new(1005.0, -35.0)) < 1e-9);
    }

    #[test]
    fn neighbours_unavailable_until_set() {
        let grid = square(3, 3);
        assert!(matches!(grid.neighbours(), Err(GridError::NeighboursNotSet)));
    }

    #[test]
    fn rook_neighbours_on_square_grid() {
        let mut grid = square(3, 3);
        grid.set_neighbours(10.0).unwrap();
        let neighbours = grid.neighbours().unwrap();
        assert_eq!(
            neighbours.get(4).unwrap(),
            &vec![CellId(1), CellId(3), CellId(4), CellId(5), CellId(7)]
        );
        assert_eq!(neighbours.first().unwrap(), &vec![CellId(0), CellId(1), CellId(3)]);
    }

    #[test]
    fn negative_neighbour_distance_rejected() {
        let mut grid = square(2, 2);
        assert!(matches!(
            grid.set_neighbours(-1.0),
            Err(GridError::InvalidDistance(_))
        ));
    }

    #[test]
    fn hexagon_interior_cell_has_six_neighbours() {
        let mut grid = Grid::new(GridType::Hexagon, 100.0, 5, 5, 0.0, 0.0).unwrap();
        // Centroid spacing equals twice the apothem; allow some slack.
        let spacing = 2.0 * 3.0_f64.sqrt() / 2.0 * 3.0_f64.powf(0.25) * (200.0_f64 / 9.0).sqrt();
        grid.set_neighbours(spacing * 1.01).unwrap();
        assert_eq!(grid.neighbours().unwrap().get(12).map(Vec::len), Some(7));
    }

    #[test]
    fn populated_and_on_demand_distances_agree() {
        let mut grid = square(4, 3);
        let from = [CellId(0), CellId(5)];
        let on_demand = grid.distances(Some(&from), None).unwrap();
        grid.populate_distances();
        assert!(grid.has_distances());
        let cached = grid.distances(Some(&from), None).unwrap();
        assert_eq!(on_demand, cached);
        assert_eq!((cached.rows(), cached.cols()), (2, 12));
        let d = cached.get(0, 5).unwrap();
        assert!((d - 200.0_f64.sqrt()).abs() < 1e-9);
        let row = cached.row(1).unwrap();
        assert_eq!(row.len(), 12);
        assert!(row.get(5).is_some_and(|d| d.abs() < 1e-12));
        assert!(cached.row(2).is_none());
    }

    #[test]
    fn distances_reject_unknown_ids() {
        let grid = square(2, 2);
        assert!(matches!(
            grid.distances(Some(&[CellId(4)]), None),
            Err(GridError::UnknownCellId(CellId(4)))
        ));
    }
}
