//! GeoJSON export of grid cells.
//!
//! Grids use an unspecified projected coordinate system, so the output does
//! not strictly follow RFC 7946, which expects WGS84 coordinates. It is
//! still readable by GIS tools that accept projected GeoJSON.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::GridError;
use crate::grid::Grid;

/// A GeoJSON feature collection.
#[derive(Debug, Serialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: CellProperties,
}

#[derive(Debug, Serialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Serialize)]
struct CellProperties {
    cell_id: u32,
    cell_cx: f64,
    cell_cy: f64,
}

/// Largest precision [`Grid::dumps`] accepts; `f64` carries about 15
/// significant decimal digits.
pub const MAX_DP: u8 = 15;

/// Round to `dp` decimal places, ties to even.
fn round_dp(value: f64, dp: u8) -> f64 {
    let factor = 10_f64.powi(i32::from(dp));
    (value * factor).round_ties_even() / factor
}

impl Grid {
    fn feature_collection(&self, dp: u8) -> FeatureCollection {
        let features = self
            .cell_ids()
            .iter()
            .zip(self.polygons())
            .zip(self.centroids())
            .map(|((id, poly), centroid)| Feature {
                kind: "Feature",
                geometry: Geometry {
                    kind: "Polygon",
                    coordinates: vec![
                        poly.exterior()
                            .map(|p| [round_dp(p.x, dp), round_dp(p.y, dp)])
                            .collect(),
                    ],
                },
                properties: CellProperties {
                    cell_id: id.into_inner(),
                    cell_cx: round_dp(centroid.x, dp),
                    cell_cy: round_dp(centroid.y, dp),
                },
            })
            .collect();
        FeatureCollection {
            kind: "FeatureCollection",
            features,
        }
    }

    /// Export the grid as a GeoJSON string with coordinates rounded to `dp`
    /// decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidPrecision`] if `dp` exceeds [`MAX_DP`],
    /// or [`GridError::Json`] if encoding fails.
    pub fn dumps(&self, dp: u8) -> Result<String, GridError> {
        if dp > MAX_DP {
            return Err(GridError::InvalidPrecision(dp).logged());
        }
        Ok(serde_json::to_string(&self.feature_collection(dp))?)
    }

    /// Export the grid as a GeoJSON file.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Io`] if the file cannot be written, or
    /// [`GridError::Json`] if encoding fails.
    pub fn dump(&self, path: &Path, dp: u8) -> Result<(), GridError> {
        let content = self.dumps(dp)?;
        std::fs::write(path, content).map_err(|e| GridError::from(e).logged())?;
        info!(path = %path.display(), n_cells = self.n_cells(), "Grid exported as GeoJSON");
        Ok(())
    }
}
