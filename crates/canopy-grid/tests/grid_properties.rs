//! Property tests for grid construction, topology, and mapping.
//!
//! Every generated grid is checked for the layout invariants (one id and
//! one polygon per cell, ids unique and sequential, polygons of the
//! requested area) and for the round trip between cell centroids and the
//! spatial mapper.

#![allow(clippy::unwrap_used)]

use canopy_grid::{Grid, GridError};
use canopy_types::{CellId, GridType};
use proptest::prelude::*;

fn grid_type() -> impl Strategy<Value = GridType> {
    prop_oneof![Just(GridType::Square), Just(GridType::Hexagon)]
}

proptest! {
    #[test]
    fn layout_invariants(
        kind in grid_type(),
        area in 1.0f64..10_000.0,
        nx in 1u32..12,
        ny in 1u32..12,
        xoff in -1_000.0f64..1_000.0,
        yoff in -1_000.0f64..1_000.0,
    ) {
        let grid = Grid::new(kind, area, nx, ny, xoff, yoff).unwrap();
        let n = (nx * ny) as usize;

        prop_assert_eq!(grid.n_cells(), n);
        prop_assert_eq!(grid.cell_ids().len(), n);
        prop_assert_eq!(grid.polygons().len(), n);
        prop_assert_eq!(grid.centroids().len(), n);

        for (i, id) in grid.cell_ids().iter().enumerate() {
            prop_assert_eq!(id.index(), i);
        }
        for poly in grid.polygons() {
            prop_assert!((poly.area() - area).abs() < area * 1e-9);
        }
    }

    #[test]
    fn centroids_map_back_to_their_cells(
        kind in grid_type(),
        area in 1.0f64..10_000.0,
        nx in 1u32..8,
        ny in 1u32..8,
    ) {
        let grid = Grid::new(kind, area, nx, ny, 0.0, 0.0).unwrap();
        let x: Vec<f64> = grid.centroids().iter().map(|p| p.x).collect();
        let y: Vec<f64> = grid.centroids().iter().map(|p| p.y).collect();

        let (xi, yi) = grid.map_xy_to_cell_indexing(&x, &y, None, None, true).unwrap();
        let expected: Vec<usize> = (0..grid.n_cells()).collect();
        prop_assert_eq!(xi, expected.clone());
        prop_assert_eq!(yi, expected);
    }

    #[test]
    fn neighbours_are_symmetric_and_reflexive(
        kind in grid_type(),
        nx in 1u32..7,
        ny in 1u32..7,
        reach in 0.0f64..40.0,
    ) {
        let mut grid = Grid::new(kind, 100.0, nx, ny, 0.0, 0.0).unwrap();
        grid.set_neighbours(reach).unwrap();
        let neighbours = grid.neighbours().unwrap();

        for (i, cell) in neighbours.iter().enumerate() {
            let me = CellId(u32::try_from(i).unwrap());
            prop_assert!(cell.contains(&me));
            for other in cell {
                prop_assert!(neighbours.get(other.index()).is_some_and(|n| n.contains(&me)));
            }
        }
    }
}

#[test]
fn data_superset_cells_example() {
    // 60 points cannot cover a 10 x 10 hexagon grid.
    let grid = Grid::new(GridType::Hexagon, 10_000.0, 10, 10, 0.0, 0.0).unwrap();
    let x: Vec<f64> = grid.centroids().iter().take(60).map(|p| p.x).collect();
    let y: Vec<f64> = grid.centroids().iter().take(60).map(|p| p.y).collect();
    let result = grid.map_xy_to_cell_indexing(&x, &y, None, None, true);
    assert!(matches!(result, Err(GridError::CellsNotCovered)));
}

#[test]
fn hexagon_bounds_include_stagger() {
    let grid = Grid::new(GridType::Hexagon, 1.0, 3, 2, 0.0, 0.0).unwrap();
    let side = 3.0_f64.powf(0.25) * (2.0_f64 / 9.0).sqrt();
    let apothem = 3.0_f64.sqrt() * side / 2.0;
    let b = grid.bounds();
    assert!(b.min_x.abs() < 1e-12);
    assert!(b.min_y.abs() < 1e-12);
    assert!((b.max_x - 7.0 * apothem).abs() < 1e-9);
    assert!((b.max_y - 3.5 * side).abs() < 1e-9);
}
