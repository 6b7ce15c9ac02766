//! Planar geometry primitives for grid cells.
//!
//! Grids live in an unspecified projected coordinate system with linear
//! units in metres, so everything here is plain Euclidean geometry on `f64`.
//! Cell polygons are backed by [`geo::Polygon`]; [`Point`] and [`Bounds`]
//! are the lightweight value types the rest of the crate passes around.

use geo::{
    Area, BoundingRect, Centroid, Coord, EuclideanDistance, Intersects, LineString, Scale,
    Translate,
};
use serde::{Deserialize, Serialize};

/// A point in the projected plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Self) -> f64 {
        geo::Point::from(self).euclidean_distance(&geo::Point::from(other))
    }
}

impl From<Point> for Coord {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Point> for geo::Point {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Coord> for Point {
    fn from(c: Coord) -> Self {
        Self::new(c.x, c.y)
    }
}

/// Axis-aligned bounding box, reported as `(min_x, min_y, max_x, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest x.
    pub min_x: f64,
    /// Smallest y.
    pub min_y: f64,
    /// Largest x.
    pub max_x: f64,
    /// Largest y.
    pub max_y: f64,
}

impl Bounds {
    /// An empty box that any union will replace.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Smallest box covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Box width.
    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    /// Box height.
    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }
}

impl From<geo::Rect> for Bounds {
    fn from(rect: geo::Rect) -> Self {
        Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        }
    }
}

impl core::fmt::Display for Bounds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// A simple polygon without holes.
///
/// Vertices run anticlockwise; the ring is closed on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    inner: geo::Polygon,
}

impl Polygon {
    /// Build a polygon from its vertices.
    pub fn new(vertices: Vec<Point>) -> Self {
        let ring: LineString = vertices.into_iter().map(Coord::from).collect();
        Self {
            inner: geo::Polygon::new(ring, Vec::new()),
        }
    }

    /// The underlying `geo` polygon.
    pub const fn as_geo(&self) -> &geo::Polygon {
        &self.inner
    }

    /// The exterior ring, closed by repeating the first vertex.
    pub fn exterior(&self) -> impl Iterator<Item = Point> + '_ {
        self.inner.exterior().coords().map(|&c| Point::from(c))
    }

    /// The bounding box; [`Bounds::EMPTY`] for a polygon without vertices.
    pub fn bounds(&self) -> Bounds {
        self.inner.bounding_rect().map_or(Bounds::EMPTY, Bounds::from)
    }

    /// Shift every vertex by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            inner: self.inner.translate(dx, dy),
        }
    }

    /// Scale every vertex by `factor` about the origin.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            inner: self
                .inner
                .scale_around_point(factor, factor, Coord { x: 0.0, y: 0.0 }),
        }
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.inner.unsigned_area()
    }

    /// Area centroid, if the polygon has any vertices.
    pub fn centroid(&self) -> Option<Point> {
        self.inner.centroid().map(|c| Point::new(c.x(), c.y()))
    }

    /// Closed point-in-polygon test: points on the boundary count as inside.
    pub fn contains(&self, p: Point) -> bool {
        self.inner.intersects(&geo::Point::from(p))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
    }

    #[test]
    fn area_and_centroid_of_square() {
        let sq = unit_square().scale(10.0).translate(5.0, -5.0);
        assert!((sq.area() - 100.0).abs() < 1e-9);
        let c = sq.centroid().unwrap();
        assert!((c.x - 10.0).abs() < 1e-9);
        assert!(c.y.abs() < 1e-9);
    }

    #[test]
    fn contains_is_closed() {
        let sq = unit_square();
        assert!(sq.contains(Point::new(0.5, 0.5)));
        assert!(sq.contains(Point::new(1.0, 0.5)));
        assert!(sq.contains(Point::new(0.0, 0.0)));
        assert!(!sq.contains(Point::new(1.01, 0.5)));
        assert!(!sq.contains(Point::new(-3.0, 7.0)));
    }

    #[test]
    fn exterior_ring_is_closed() {
        let ring: Vec<Point> = unit_square().exterior().collect();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn empty_polygon_has_no_centroid() {
        let empty = Polygon::new(Vec::new());
        assert!(empty.centroid().is_none());
        assert_eq!(empty.bounds(), Bounds::EMPTY);
    }

    #[test]
    fn bounds_display_matches_tuple_form() {
        let b = unit_square().scale(2.0).bounds();
        assert_eq!(b.to_string(), "(0, 0, 2, 2)");
    }

    #[test]
    fn point_distance() {
        let d = Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }
}
