//! Enumeration types for the Canopy setup core.

use serde::{Deserialize, Serialize};

/// The tiling rule used to lay out grid cells.
///
/// The string forms (`"square"`, `"hexagon"`, `"triangle"`) are the values
/// accepted in the `core.grid.grid_type` configuration key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    /// Square cells laid out in simple rows and columns.
    #[default]
    Square,
    /// Pointy-top hexagons in staggered rows.
    Hexagon,
    /// Equilateral triangles. Declared so configurations can name it, but
    /// no generator exists yet.
    Triangle,
}

impl GridType {
    /// All tilings, in declaration order.
    pub const ALL: [Self; 3] = [Self::Square, Self::Hexagon, Self::Triangle];

    /// Return the configuration name of this tiling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Hexagon => "hexagon",
            Self::Triangle => "triangle",
        }
    }
}

impl core::fmt::Display for GridType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for GridType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("The grid_type {s} is not defined."))
    }
}
