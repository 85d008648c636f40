//! Enumeration types for the Roam wire model.
//!
//! Covers the kind tag the server attaches to every visible map unit and
//! the combat style an agent plays.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Map units
// ---------------------------------------------------------------------------

/// Kind tag of a unit visible on the current map.
///
/// Serialized as the lowercase tag the server uses (`"m1"`, `"herb"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// A talking NPC (quest giver, villager, some gates).
    Npc,
    /// A shop keeper.
    Shop,
    /// Weakest combat tier.
    M1,
    /// Second combat tier.
    M2,
    /// Third combat tier (mini boss).
    M3,
    /// Fourth combat tier (boss).
    M4,
    /// Harvestable resource node.
    Herb,
    /// Another player.
    Player,
    /// A map transition gate.
    Io,
    /// Any tag this build does not know about.
    #[serde(other)]
    Unknown,
}

impl UnitKind {
    /// Whether the unit is something an agent fights or harvests.
    pub const fn is_engageable(self) -> bool {
        matches!(self, Self::M1 | Self::M2 | Self::M3 | Self::M4 | Self::Herb)
    }

    /// The lowercase wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Shop => "shop",
            Self::M1 => "m1",
            Self::M2 => "m2",
            Self::M3 => "m3",
            Self::M4 => "m4",
            Self::Herb => "herb",
            Self::Player => "player",
            Self::Io => "io",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// The damage type an agent deals, which also selects its equipment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatStyle {
    /// Physical attacks.
    #[default]
    Melee,
    /// Magic attacks.
    Magic,
}

impl std::fmt::Display for CombatStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Melee => f.write_str("melee"),
            Self::Magic => f.write_str("magic"),
        }
    }
}
