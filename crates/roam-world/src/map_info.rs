//! Farming map entries.

use serde::{Deserialize, Serialize};

/// A map the agent may choose to farm on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Unique map name.
    pub name: String,
    /// Lowest admitted player level.
    pub min_level: u32,
    /// Highest admitted player level.
    pub max_level: u32,
    /// Gold the player should hold before choosing it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_gold: Option<u64>,
    /// Head home when the hp recovery pool drops below this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_hp_recovery: Option<u64>,
    /// Head home when the mp recovery pool drops below this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_mp_recovery: Option<u64>,
    /// Hp recovery pool the recovery allocator buys up to.
    #[serde(default)]
    pub target_hp_recovery: u64,
    /// Mp recovery pool the recovery allocator buys up to.
    #[serde(default)]
    pub target_mp_recovery: u64,
    /// Higher ranks win when several maps are eligible.
    #[serde(default)]
    pub priority: i32,
}

impl MapInfo {
    /// Whether a player with this level and gold may choose the map.
    pub fn admits(&self, level: u32, gold: u64) -> bool {
        level >= self.min_level
            && level <= self.max_level
            && self.require_gold.is_none_or(|req| gold >= req)
    }

    /// Whether either recovery pool sits below this map's floor.
    pub fn recovery_short(&self, hp_recovery: u64, mp_recovery: u64) -> bool {
        self.require_hp_recovery.is_some_and(|floor| hp_recovery < floor)
            || self.require_mp_recovery.is_some_and(|floor| mp_recovery < floor)
    }
}
