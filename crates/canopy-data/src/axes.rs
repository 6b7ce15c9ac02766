//! Axis validators and the registry that dispatches them.
//!
//! Incoming data arrays can describe the same grid in several layouts: a
//! `cell_id` dimension with or without explicit ids, x/y dimensions with or
//! without coordinates, and so on. Each layout is handled by an
//! [`AxisValidator`] that recognises it and rewrites the array into the
//! canonical form for its *core axis*. The [`AxisRegistry`] groups
//! validators by core axis and, for every axis an array touches, requires
//! exactly one validator to accept it.

use std::collections::{BTreeMap, BTreeSet};

use canopy_grid::Grid;
use canopy_types::DataArray;
use tracing::debug;

use crate::error::AxisError;
use crate::spatial;

/// Per core axis, the name of the validator applied to an array, or `None`
/// if the array does not use that axis.
pub type AxisMatches = BTreeMap<String, Option<String>>;

/// A validator that maps one array layout onto a core axis.
///
/// Validators on the same core axis must be mutually exclusive: for any
/// array and grid, at most one of them may return `true` from
/// [`can_validate`]. The registry checks this at dispatch time.
///
/// [`can_validate`]: AxisValidator::can_validate
pub trait AxisValidator: Send + Sync {
    /// Unique name of the validator, recorded in the data store.
    fn name(&self) -> &str;

    /// The core axis the validator maps onto, e.g. `"spatial"`.
    fn core_axis(&self) -> &str;

    /// Dimension names that signal an array uses this core axis.
    fn dim_names(&self) -> Vec<&str>;

    /// Whether the validator recognises the layout of `array` on `grid`.
    fn can_validate(&self, array: &DataArray, grid: &Grid) -> bool;

    /// Check `array` against `grid` and return it in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError`] if the array is inconsistent with the grid.
    fn run_validation(&self, array: DataArray, grid: &Grid) -> Result<DataArray, AxisError>;
}

/// Validators grouped by core axis.
#[derive(Default)]
pub struct AxisRegistry {
    axes: BTreeMap<String, Vec<Box<dyn AxisValidator>>>,
}

impl core::fmt::Debug for AxisRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: BTreeMap<&str, Vec<&str>> = self
            .axes
            .iter()
            .map(|(axis, vs)| (axis.as_str(), vs.iter().map(|v| v.name()).collect()))
            .collect();
        f.debug_struct("AxisRegistry").field("axes", &names).finish()
    }
}

impl AxisRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in spatial validators.
    pub fn with_spatial() -> Self {
        let mut registry = Self::new();
        for validator in spatial::validators() {
            registry.push(validator);
        }
        registry
    }

    /// Add a validator to its core axis.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError`] if the core axis name is empty, the dimension
    /// names are empty, or a validator of the same name is already
    /// registered on the axis.
    pub fn register(&mut self, validator: Box<dyn AxisValidator>) -> Result<(), AxisError> {
        if validator.core_axis().is_empty() {
            return Err(AxisError::EmptyCoreAxis.logged());
        }
        if validator.dim_names().is_empty() {
            return Err(AxisError::EmptyDimNames.logged());
        }
        let axis = validator.core_axis();
        if self
            .axes
            .get(axis)
            .is_some_and(|vs| vs.iter().any(|v| v.name() == validator.name()))
        {
            return Err(AxisError::DuplicateValidator {
                axis: axis.to_owned(),
                name: validator.name().to_owned(),
            }
            .logged());
        }
        self.push(validator);
        Ok(())
    }

    fn push(&mut self, validator: Box<dyn AxisValidator>) {
        debug!(
            axis = validator.core_axis(),
            validator = validator.name(),
            "Registered axis validator"
        );
        self.axes
            .entry(validator.core_axis().to_owned())
            .or_default()
            .push(validator);
    }

    /// Names of the registered core axes, sorted.
    pub fn core_axes(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(String::as_str)
    }

    /// Validators registered on `axis`, in registration order.
    pub fn validators(&self, axis: &str) -> impl Iterator<Item = &dyn AxisValidator> {
        self.axes
            .get(axis)
            .into_iter()
            .flatten()
            .map(|v| &**v)
    }

    /// Union of the dimension names of all validators on `axis`.
    pub fn dim_names(&self, axis: &str) -> BTreeSet<&str> {
        self.validators(axis).flat_map(|v| v.dim_names()).collect()
    }

    /// Validate `array` on every core axis it uses.
    ///
    /// Every validator on every registered axis is asked whether it
    /// accepts the array. Where exactly one does, its output feeds the next
    /// axis. Where none does, the axis is recorded as `None` unless the
    /// array carries one of the axis dimension names.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError::NotMutuallyExclusive`] when several validators
    /// on an axis accept the array, [`AxisError::NoMatchingValidator`] when
    /// none accepts an array that uses the axis dimension names, or the
    /// error raised by the matching validator.
    pub fn validate(
        &self,
        mut array: DataArray,
        grid: &Grid,
    ) -> Result<(DataArray, AxisMatches), AxisError> {
        let mut matches = AxisMatches::new();

        for (axis, validators) in &self.axes {
            let accepting: Vec<&dyn AxisValidator> = validators
                .iter()
                .map(|v| &**v)
                .filter(|v| v.can_validate(&array, grid))
                .collect();
            let validator = match accepting.as_slice() {
                [v] => *v,
                [] => {
                    let axis_dims = self.dim_names(axis);
                    let used: Vec<&str> = array
                        .dims()
                        .iter()
                        .map(String::as_str)
                        .filter(|d| axis_dims.contains(d))
                        .collect();
                    if !used.is_empty() {
                        return Err(AxisError::NoMatchingValidator {
                            axis: axis.clone(),
                            dims: used.join(", "),
                        }
                        .logged());
                    }
                    matches.insert(axis.clone(), None);
                    continue;
                }
                _ => return Err(AxisError::NotMutuallyExclusive(axis.clone()).logged()),
            };

            debug!(axis = %axis, validator = validator.name(), "Validating data array");
            array = validator
                .run_validation(array, grid)
                .map_err(AxisError::logged)?;
            matches.insert(axis.clone(), Some(validator.name().to_owned()));
        }

        Ok((array, matches))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use canopy_types::GridType;

    use super::*;

    /// Test validator on the `testing` axis. `accepts` decides which arrays
    /// it claims; validation is the identity.
    struct Stub {
        name: &'static str,
        axis: &'static str,
        dims: Vec<&'static str>,
        accepts: fn(&DataArray) -> bool,
    }

    impl AxisValidator for Stub {
        fn name(&self) -> &str {
            self.name
        }
        fn core_axis(&self) -> &str {
            self.axis
        }
        fn dim_names(&self) -> Vec<&str> {
            self.dims.clone()
        }
        fn can_validate(&self, array: &DataArray, _grid: &Grid) -> bool {
            (self.accepts)(array)
        }
        fn run_validation(&self, array: DataArray, _grid: &Grid) -> Result<DataArray, AxisError> {
            Ok(array)
        }
    }

    fn has_test_dim(array: &DataArray) -> bool {
        array.has_dim("test")
    }

    fn stub(name: &'static str, axis: &'static str, dims: &[&'static str]) -> Box<Stub> {
        Box::new(Stub {
            name,
            axis,
            dims: dims.to_vec(),
            accepts: has_test_dim,
        })
    }

    fn grid() -> Grid {
        Grid::new(GridType::Square, 100.0, 2, 2, 0.0, 0.0).unwrap()
    }

    #[test]
    fn registration_rejects_empty_declarations() {
        let mut registry = AxisRegistry::new();
        assert!(matches!(
            registry.register(stub("a", "", &["test"])),
            Err(AxisError::EmptyCoreAxis)
        ));
        assert!(matches!(
            registry.register(stub("a", "testing", &[])),
            Err(AxisError::EmptyDimNames)
        ));
        registry.register(stub("a", "testing", &["test"])).unwrap();
        assert!(matches!(
            registry.register(stub("a", "testing", &["test"])),
            Err(AxisError::DuplicateValidator { .. })
        ));
    }

    #[test]
    fn spatial_registry_has_four_validators() {
        let registry = AxisRegistry::with_spatial();
        assert_eq!(registry.core_axes().collect::<Vec<_>>(), vec!["spatial"]);
        assert_eq!(registry.validators("spatial").count(), 4);
        assert_eq!(
            registry.dim_names("spatial").into_iter().collect::<Vec<_>>(),
            vec!["cell_id", "x", "y"]
        );
    }

    #[test]
    fn dispatch_records_matches_per_axis() {
        let grid = grid();
        let mut registry = AxisRegistry::with_spatial();
        registry.register(stub("t1", "testing", &["test"])).unwrap();

        let array = DataArray::from_vec(vec![0.0, 1.0, 2.0, 3.0], "cell_id");
        let (_, matches) = registry.validate(array, &grid).unwrap();
        assert_eq!(
            matches.get("spatial"),
            Some(&Some("spatial_cell_id_dim_any".to_owned()))
        );
        assert_eq!(matches.get("testing"), Some(&None));
    }

    #[test]
    fn unmatched_axis_dims_are_an_error() {
        let grid = grid();
        let registry = AxisRegistry::with_spatial();
        let array = DataArray::from_vec(vec![0.0; 4], "x");
        let err = registry.validate(array, &grid).unwrap_err();
        assert_eq!(
            err.to_string(),
            "DataArray uses 'spatial' axis dimension names but does not match a validator: x"
        );
    }

    #[test]
    fn overlapping_validators_are_an_error() {
        let grid = grid();
        let mut registry = AxisRegistry::new();
        registry.register(stub("t1", "testing", &["test"])).unwrap();
        registry.register(stub("t2", "testing", &["test"])).unwrap();
        let array = DataArray::from_vec(vec![0.0; 50], "test");
        let err = registry.validate(array, &grid).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validators on 'testing' axis not mutually exclusive"
        );
    }

    #[test]
    fn overlap_is_detected_outside_the_axis_dimension_names() {
        fn always(_: &DataArray) -> bool {
            true
        }
        let grid = grid();
        let mut registry = AxisRegistry::new();
        for name in ["t1", "t2"] {
            registry
                .register(Box::new(Stub {
                    name,
                    axis: "testing",
                    dims: vec!["test"],
                    accepts: always,
                }))
                .unwrap();
        }
        let array = DataArray::from_vec(vec![0.0; 4], "other");
        assert!(matches!(
            registry.validate(array, &grid),
            Err(AxisError::NotMutuallyExclusive(ref axis)) if axis == "testing"
        ));
    }

    #[test]
    fn validator_may_accept_without_axis_dimension_names() {
        fn has_elevation_name(array: &DataArray) -> bool {
            array.name() == Some("elev")
        }
        let grid = grid();
        let mut registry = AxisRegistry::new();
        registry
            .register(Box::new(Stub {
                name: "by_name",
                axis: "testing",
                dims: vec!["test"],
                accepts: has_elevation_name,
            }))
            .unwrap();
        let array = DataArray::from_vec(vec![0.0; 4], "other").with_name("elev");
        let (_, matches) = registry.validate(array, &grid).unwrap();
        assert_eq!(matches.get("testing"), Some(&Some("by_name".to_owned())));
    }

    #[test]
    fn unrelated_dims_pass_through() {
        let grid = grid();
        let registry = AxisRegistry::with_spatial();
        let array = DataArray::from_vec(vec![0.0; 4], "cell_identities");
        let (_, matches) = registry.validate(array, &grid).unwrap();
        assert_eq!(matches.get("spatial"), Some(&None));
    }
}
