//! Type-safe identifier for grid cells.
//!
//! Cell ids are assigned by the grid in row-major order starting at zero,
//! so the numeric value of a [`CellId`] is also its position in every
//! canonically ordered per-cell array.

use serde::{Deserialize, Serialize};

/// Unique identifier for a cell in the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u32);

impl CellId {
    /// Return the inner integer value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    /// Return the id as a position into canonically ordered arrays.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert an arbitrary integer (e.g. a coordinate read from a data
    /// file) into a cell id, if it is representable.
    pub fn from_i64(value: i64) -> Option<Self> {
        u32::try_from(value).ok().map(Self)
    }
}

impl core::fmt::Display for CellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<CellId> for u32 {
    fn from(id: CellId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_oversized_ids_are_rejected() {
        assert_eq!(CellId::from_i64(-1), None);
        assert_eq!(CellId::from_i64(i64::from(u32::MAX) + 1), None);
        assert_eq!(CellId::from_i64(7), Some(CellId(7)));
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&CellId(12)).unwrap();
        assert_eq!(json, "12");
    }
}
