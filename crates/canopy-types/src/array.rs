//! Labelled n-dimensional arrays.
//!
//! [`DataArray`] is the only container the data store accepts. It pairs an
//! [`ndarray::ArrayD`] of `f64` values with named dimensions and optional
//! one-dimensional coordinates along those dimensions. Axis validators use
//! the dimension and coordinate names to recognise the layout of incoming
//! data and the selection helpers here to reorder it into canonical grid
//! cell order.
//!
//! The serde representation is also the on-disk format of the bundled JSON
//! reader:
//!
//! ```json
//! {"name": "temp", "dims": ["y", "x"], "shape": [2, 2],
//!  "values": [1.0, 2.0, 3.0, 4.0], "coords": {"y": [1.5, 0.5], "x": [0.5, 1.5]}}
//! ```
//!
//! `shape` may be omitted for one-dimensional arrays.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayD, ArrayViewD, Axis, IxDyn};
use serde::{Deserialize, Serialize};

/// Errors raised while building or slicing a [`DataArray`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// The number of dimension names does not match the rank of the shape.
    #[error("array has {dims} dimension names but a shape of rank {rank}")]
    RankMismatch {
        /// Number of dimension names.
        dims: usize,
        /// Number of entries in the shape.
        rank: usize,
    },

    /// The value buffer does not fill the declared shape.
    #[error("shape {shape:?} implies {expected} values, data provides {actual}")]
    ValueCount {
        /// Declared shape.
        shape: Vec<usize>,
        /// Number of values implied by the shape.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// The product of the shape overflows `usize`.
    #[error("shape {0:?} is too large")]
    ShapeOverflow(Vec<usize>),

    /// A dimension name appears more than once.
    #[error("dimension name '{0}' is repeated")]
    DuplicateDimension(String),

    /// A dimension name was not found on the array.
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// A dimension being created already exists on the array.
    #[error("dimension '{0}' already exists")]
    DimensionExists(String),

    /// A coordinate does not have one value per position along its dimension.
    #[error("coordinate '{dim}' has {actual} values, dimension size is {expected}")]
    CoordLength {
        /// The coordinate (and dimension) name.
        dim: String,
        /// Size of the dimension.
        expected: usize,
        /// Number of coordinate values supplied.
        actual: usize,
    },

    /// A selection index exceeds the size of its dimension.
    #[error("index {index} out of range for dimension '{dim}' of size {size}")]
    IndexOutOfRange {
        /// The dimension being indexed.
        dim: String,
        /// The offending index.
        index: usize,
        /// Size of the dimension.
        size: usize,
    },

    /// Point selection was given indexers of different lengths.
    #[error("point selection needs equal-length indexers, got {y} and {x}")]
    PointIndexLength {
        /// Length of the y indexer.
        y: usize,
        /// Length of the x indexer.
        x: usize,
    },

    /// Point selection was asked to collapse a dimension onto itself.
    #[error("point selection needs two distinct dimensions, got '{0}' twice")]
    SameDimension(String),

    /// The underlying array rejected a shape.
    #[error("invalid array shape: {0}")]
    Shape(String),
}

impl From<ndarray::ShapeError> for ArrayError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Shape(err.to_string())
    }
}

/// Values of a one-dimensional coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordValues {
    /// Integer labels, e.g. cell ids.
    Int(Vec<i64>),
    /// Floating point positions, e.g. projected x/y coordinates.
    Float(Vec<f64>),
}

impl CoordValues {
    /// Number of coordinate values.
    pub const fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    /// Whether there are no coordinate values.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the values as integers, if they are integer labels.
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    /// Copy the values out as floats.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::Int(v) => v.iter().map(|&i| i as f64).collect(),
            Self::Float(v) => v.clone(),
        }
    }

    /// Pick the values at `indices`, which must already be in range.
    fn pick(&self, indices: &[usize]) -> Self {
        match self {
            Self::Int(v) => Self::Int(indices.iter().filter_map(|&i| v.get(i).copied()).collect()),
            Self::Float(v) => {
                Self::Float(indices.iter().filter_map(|&i| v.get(i).copied()).collect())
            }
        }
    }
}

impl From<Vec<i64>> for CoordValues {
    fn from(values: Vec<i64>) -> Self {
        Self::Int(values)
    }
}

impl From<Vec<f64>> for CoordValues {
    fn from(values: Vec<f64>) -> Self {
        Self::Float(values)
    }
}

/// A labelled n-dimensional array of `f64` values.
///
/// Invariants, enforced by every constructor:
/// - one unique name per axis of the underlying array;
/// - every coordinate is keyed by an existing dimension and holds exactly
///   one value per position along it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataArray", into = "RawDataArray")]
pub struct DataArray {
    name: Option<String>,
    dims: Vec<String>,
    data: ArrayD<f64>,
    coords: BTreeMap<String, CoordValues>,
}

/// Unchecked serde mirror of [`DataArray`].
#[derive(Serialize, Deserialize)]
struct RawDataArray {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    dims: Vec<String>,
    #[serde(default)]
    shape: Option<Vec<usize>>,
    values: Vec<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    coords: BTreeMap<String, CoordValues>,
}

impl TryFrom<RawDataArray> for DataArray {
    type Error = ArrayError;

    fn try_from(raw: RawDataArray) -> Result<Self, Self::Error> {
        let shape = match raw.shape {
            Some(shape) => shape,
            None if raw.dims.len() == 1 => vec![raw.values.len()],
            None => {
                return Err(ArrayError::RankMismatch {
                    dims: raw.dims.len(),
                    rank: 0,
                });
            }
        };
        let mut array = Self::new(raw.values, shape, raw.dims)?;
        array.name = raw.name;
        for (dim, values) in raw.coords {
            array.assign_coord(&dim, values)?;
        }
        Ok(array)
    }
}

impl From<DataArray> for RawDataArray {
    fn from(array: DataArray) -> Self {
        Self {
            name: array.name,
            dims: array.dims,
            shape: Some(array.data.shape().to_vec()),
            values: array.data.iter().copied().collect(),
            coords: array.coords,
        }
    }
}

impl DataArray {
    /// Build an array from row-major values, a shape and dimension names.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError`] if the dimension names and shape disagree, a
    /// name is repeated, or the values do not fill the shape.
    pub fn new<S: Into<String>>(
        values: Vec<f64>,
        shape: Vec<usize>,
        dims: impl IntoIterator<Item = S>,
    ) -> Result<Self, ArrayError> {
        let expected = element_count(&shape)?;
        if expected != values.len() {
            return Err(ArrayError::ValueCount {
                shape,
                expected,
                actual: values.len(),
            });
        }
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
        Self::from_array(data, dims)
    }

    /// Label an existing array with one dimension name per axis.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError`] if the name count differs from the array rank
    /// or a name is repeated.
    pub fn from_array<S: Into<String>>(
        data: ArrayD<f64>,
        dims: impl IntoIterator<Item = S>,
    ) -> Result<Self, ArrayError> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(ArrayError::RankMismatch {
                dims: dims.len(),
                rank: data.ndim(),
            });
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims.iter().skip(i.saturating_add(1)).any(|d| d == dim) {
                return Err(ArrayError::DuplicateDimension(dim.clone()));
            }
        }
        Ok(Self {
            name: None,
            dims,
            data,
            coords: BTreeMap::new(),
        })
    }

    /// Build a one-dimensional array along `dim`.
    pub fn from_vec(values: Vec<f64>, dim: &str) -> Self {
        Self {
            name: None,
            dims: vec![dim.to_owned()],
            data: Array1::from(values).into_dyn(),
            coords: BTreeMap::new(),
        }
    }

    /// Set the array name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a coordinate along an existing dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError`] if the dimension is unknown or the coordinate
    /// length does not match the dimension size.
    pub fn with_coord(
        mut self,
        dim: &str,
        values: impl Into<CoordValues>,
    ) -> Result<Self, ArrayError> {
        self.assign_coord(dim, values)?;
        Ok(self)
    }

    /// Attach or replace a coordinate along an existing dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError`] if the dimension is unknown or the coordinate
    /// length does not match the dimension size.
    pub fn assign_coord(
        &mut self,
        dim: &str,
        values: impl Into<CoordValues>,
    ) -> Result<(), ArrayError> {
        let values = values.into();
        let size = self
            .dim_size(dim)
            .ok_or_else(|| ArrayError::UnknownDimension(dim.to_owned()))?;
        if values.len() != size {
            return Err(ArrayError::CoordLength {
                dim: dim.to_owned(),
                expected: size,
                actual: values.len(),
            });
        }
        self.coords.insert(dim.to_owned(), values);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// The array name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Dimension names in storage order.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Size of each dimension.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The underlying array.
    pub const fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Values in logical row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Total number of values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `dim` is one of the array dimensions.
    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// Position of `dim` in the dimension list.
    pub fn dim_index(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Size of `dim`.
    pub fn dim_size(&self, dim: &str) -> Option<usize> {
        self.dim_index(dim)
            .and_then(|axis| self.data.shape().get(axis).copied())
    }

    /// Whether a coordinate is attached along `dim`.
    pub fn has_coord(&self, dim: &str) -> bool {
        self.coords.contains_key(dim)
    }

    /// The coordinate along `dim`, if attached.
    pub fn coord(&self, dim: &str) -> Option<&CoordValues> {
        self.coords.get(dim)
    }

    /// Names of the attached coordinates, sorted.
    pub fn coord_names(&self) -> impl Iterator<Item = &str> {
        self.coords.keys().map(String::as_str)
    }

    /// Value at a multi-dimensional index, if in range.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.data.ndim() {
            return None;
        }
        self.data.get(index).copied()
    }

    /// Sum of all values.
    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    // -------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------

    /// Select positions along one dimension, in the order given.
    ///
    /// Indices may repeat or omit positions; the coordinate along `dim` (if
    /// any) is selected with the values.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError`] if `dim` is unknown or an index is out of range.
    pub fn select(&self, dim: &str, indices: &[usize]) -> Result<Self, ArrayError> {
        let axis = self.require_dim(dim)?;
        check_indices(dim, indices, self.data.len_of(Axis(axis)))?;

        let coords = self
            .coords
            .iter()
            .map(|(name, c)| {
                let c = if name == dim { c.pick(indices) } else { c.clone() };
                (name.clone(), c)
            })
            .collect();

        Ok(Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            data: self.data.select(Axis(axis), indices),
            coords,
        })
    }

    /// Collapse two dimensions into one by pairwise point selection.
    ///
    /// Point `n` of the result takes the value at `y_idx[n]` along `y_dim`
    /// and `x_idx[n]` along `x_dim`. The new dimension `new_dim` takes the
    /// position of whichever of the two came first; other dimensions keep
    /// their order and coordinates. Coordinates of the collapsed dimensions
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError`] if the indexers differ in length, either
    /// dimension is unknown, an index is out of range, or `new_dim` clashes
    /// with a surviving dimension.
    pub fn select_points(
        &self,
        y_dim: &str,
        x_dim: &str,
        y_idx: &[usize],
        x_idx: &[usize],
        new_dim: &str,
    ) -> Result<Self, ArrayError> {
        if y_idx.len() != x_idx.len() {
            return Err(ArrayError::PointIndexLength {
                y: y_idx.len(),
                x: x_idx.len(),
            });
        }
        if y_dim == x_dim {
            return Err(ArrayError::SameDimension(y_dim.to_owned()));
        }
        let y_axis = self.require_dim(y_dim)?;
        let x_axis = self.require_dim(x_dim)?;
        check_indices(y_dim, y_idx, self.data.len_of(Axis(y_axis)))?;
        check_indices(x_dim, x_idx, self.data.len_of(Axis(x_axis)))?;
        if new_dim != y_dim && new_dim != x_dim && self.has_dim(new_dim) {
            return Err(ArrayError::DimensionExists(new_dim.to_owned()));
        }

        // Remove the later axis first so the earlier one keeps its position.
        let (lo, hi) = (y_axis.min(x_axis), y_axis.max(x_axis));
        let (lo_idx, hi_idx) = if y_axis < x_axis {
            (y_idx, x_idx)
        } else {
            (x_idx, y_idx)
        };
        let points: Vec<ArrayViewD<'_, f64>> = lo_idx
            .iter()
            .zip(hi_idx)
            .map(|(&l, &h)| {
                self.data
                    .view()
                    .index_axis_move(Axis(hi), h)
                    .index_axis_move(Axis(lo), l)
            })
            .collect();

        let mut dims: Vec<String> = self
            .dims
            .iter()
            .enumerate()
            .filter(|&(axis, _)| axis != lo && axis != hi)
            .map(|(_, d)| d.clone())
            .collect();
        dims.insert(lo, new_dim.to_owned());

        let data = if points.is_empty() {
            let mut shape: Vec<usize> = self
                .data
                .shape()
                .iter()
                .enumerate()
                .filter(|&(axis, _)| axis != lo && axis != hi)
                .map(|(_, &n)| n)
                .collect();
            shape.insert(lo, 0);
            ArrayD::zeros(IxDyn(&shape))
        } else {
            ndarray::stack(Axis(lo), &points)?
        };

        let coords = self
            .coords
            .iter()
            .filter(|(name, _)| name.as_str() != y_dim && name.as_str() != x_dim)
            .map(|(name, c)| (name.clone(), c.clone()))
            .collect();

        Ok(Self {
            name: self.name.clone(),
            dims,
            data,
            coords,
        })
    }

    fn require_dim(&self, dim: &str) -> Result<usize, ArrayError> {
        self.dim_index(dim)
            .ok_or_else(|| ArrayError::UnknownDimension(dim.to_owned()))
    }
}

/// Product of a shape, guarding against overflow.
fn element_count(shape: &[usize]) -> Result<usize, ArrayError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| ArrayError::ShapeOverflow(shape.to_vec()))
}

fn check_indices(dim: &str, indices: &[usize], size: usize) -> Result<(), ArrayError> {
    match indices.iter().find(|&&i| i >= size) {
        Some(&index) => Err(ArrayError::IndexOutOfRange {
            dim: dim.to_owned(),
            index,
            size,
        }),
        None => Ok(()),
    }
}
