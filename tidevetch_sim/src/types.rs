// Core types shared across the simulation.
//
// Defines continuous map positions (`Point`), raster cell coordinates
// (`GridCell`), and strongly-typed identifiers for agents and river-graph
// elements. All types derive `Serialize` and `Deserialize` so landscapes and
// narrative records can round-trip through JSON.
//
// **Critical constraint: determinism.** Agent IDs are monotonic counters
// allocated by the sim state, so registry iteration order matches creation
// order. Do not use external UUID libraries or OS entropy.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position on the map, in map units (one raster cell is 1.0 x 1.0 units).
///
/// Points are immutable values: agent movement replaces the whole point
/// rather than mutating a coordinate in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// The point at the given polar offset from this one.
    ///
    /// `angle` is in radians, measured counterclockwise from the +x axis.
    pub fn offset_by(self, angle: f64, distance: f64) -> Self {
        Self {
            x: self.x + distance * angle.cos(),
            y: self.y + distance * angle.sin(),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// A cell in the competition raster. Each cell covers 1.0 x 1.0 map units.
///
/// Derives `Ord` so plot registries keyed by cell iterate in a fixed
/// row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Strongly-typed agent ID wrappers
// ---------------------------------------------------------------------------

macro_rules! agent_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

agent_id!(/// Unique identifier for a plant agent.
PlantId);
agent_id!(/// Unique identifier for a floating seed agent.
SeedId);
agent_id!(/// Unique identifier for a banked (dormant) seed agent.
BankedSeedId);

// ---------------------------------------------------------------------------
// River graph IDs — simple integers, not UUIDs, for compactness.
// ---------------------------------------------------------------------------

/// Compact identifier for a river graph node (a junction or terminus).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiverNodeId(pub u32);

/// Compact identifier for a river graph edge (a directed reach).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiverEdgeId(pub u32);

// ---------------------------------------------------------------------------
// Simulation enums
// ---------------------------------------------------------------------------

/// Why a run ended. Checked at each year boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// No plant reproduced this year.
    Extinction,
    /// The reproducing population exceeded the configured ceiling.
    PopulationLimit,
    /// The run reached the configured year horizon.
    YearHorizon,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
        assert_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn point_offset_by_cardinal_angles() {
        let origin = Point::new(10.0, 20.0);
        let east = origin.offset_by(0.0, 2.0);
        assert!((east.x - 12.0).abs() < 1e-12);
        assert!((east.y - 20.0).abs() < 1e-12);
        let north = origin.offset_by(std::f64::consts::FRAC_PI_2, 3.0);
        assert!((north.x - 10.0).abs() < 1e-12);
        assert!((north.y - 23.0).abs() < 1e-12);
    }

    #[test]
    fn grid_cell_ordering_is_row_major() {
        use std::collections::BTreeMap;
        let mut map = BTreeMap::new();
        map.insert(GridCell::new(1, 0), "b");
        map.insert(GridCell::new(0, 5), "a");
        map.insert(GridCell::new(1, 2), "c");
        let keys: Vec<GridCell> = map.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                GridCell::new(0, 5),
                GridCell::new(1, 0),
                GridCell::new(1, 2)
            ]
        );
    }

    #[test]
    fn agent_id_display() {
        assert_eq!(PlantId(7).to_string(), "PlantId(7)");
        assert_eq!(SeedId(0).to_string(), "SeedId(0)");
    }
}
