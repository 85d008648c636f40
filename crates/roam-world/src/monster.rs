//! Monster and harvestable entries.

use roam_types::{CombatStyle, UnitKind};
use serde::{Deserialize, Serialize};

/// A monster or harvestable resource as the catalog knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    /// Unique display name; live units are matched by it.
    pub name: String,
    /// Maximum health.
    pub hp: u64,
    /// Level.
    pub lv: u32,
    /// Combat tier or `herb`.
    pub tier: UnitKind,
    /// Maps it spawns on.
    #[serde(default)]
    pub maps: Vec<String>,
    /// Lowest player level that should engage it.
    pub min_level: u32,
    /// Highest player level that should engage it.
    pub max_level: u32,
    /// A combat style that does nothing against it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_style: Option<CombatStyle>,
    /// Never engaged while travelling (it would block the path).
    #[serde(default)]
    pub skip_when_travelling: bool,
    /// Refuse to engage below this fraction of maximum health.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_health_ratio: Option<f64>,
    /// Goods and equipment names it is known to drop.
    #[serde(default)]
    pub drops: Vec<String>,
}

impl Monster {
    /// Whether a player of `level` should engage it.
    pub const fn admits_level(&self, level: u32) -> bool {
        level >= self.min_level && level <= self.max_level
    }

    /// Whether `item` is a recorded drop.
    pub fn drops_item(&self, item: &str) -> bool {
        self.drops.iter().any(|d| d == item)
    }

    /// Whether a player at `health_ratio` passes the engagement guard.
    pub fn health_allows(&self, health_ratio: f64) -> bool {
        self.min_health_ratio.is_none_or(|floor| health_ratio >= floor)
    }
}
