//! Fixed points in the world: NPC positions and map transition gates.
//!
//! Both are identified by `(map, x, y, name)`, the same tuple the server
//! reports for a visible unit, so a live [`MapUnit`] can be matched against
//! the catalog without ids.
//!
//! [`MapUnit`]: roam_types::MapUnit

use std::fmt;

use roam_types::{MapUnit, Point};
use serde::{Deserialize, Serialize};

/// A named unit pinned to a tile on a map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NpcRef {
    /// Map the NPC stands on.
    pub map: String,
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
    /// Display name.
    pub name: String,
}

impl NpcRef {
    /// The tile the NPC stands on.
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether a visible unit is this NPC. The map is checked by the caller.
    pub fn matches(&self, unit: &MapUnit) -> bool {
        unit.x == self.x && unit.y == self.y && unit.name == self.name
    }

    /// The reference a unit seen on `map` would have.
    pub fn of_unit(map: &str, unit: &MapUnit) -> Self {
        Self {
            map: map.to_owned(),
            x: unit.x,
            y: unit.y,
            name: unit.name.clone(),
        }
    }
}

impl fmt::Display for NpcRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}({},{})", self.name, self.map, self.x, self.y)
    }
}

/// A one-way transition from `map` to `to_map`, anchored at a gate unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    /// Gate name as the server reports it.
    pub name: String,
    /// Origin map.
    pub map: String,
    /// Destination map.
    pub to_map: String,
    /// Gate column on the origin map.
    pub x: i64,
    /// Gate row on the origin map.
    pub y: i64,
    /// Minimum player level the gate lets through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_level: Option<u32>,
}

impl TransitionEdge {
    /// The gate tile on the origin map.
    pub const fn gate(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The gate as an NPC reference on the origin map.
    pub fn gate_ref(&self) -> NpcRef {
        NpcRef {
            map: self.map.clone(),
            x: self.x,
            y: self.y,
            name: self.name.clone(),
        }
    }

    /// Whether a player of `level` may take this edge.
    pub fn admits(&self, level: u32) -> bool {
        self.required_level.is_none_or(|req| level >= req)
    }

    /// Whether a visible unit is this edge's gate.
    pub fn matches(&self, unit: &MapUnit) -> bool {
        unit.x == self.x && unit.y == self.y && unit.name == self.name
    }
}
