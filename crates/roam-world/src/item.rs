//! Item entries: consumable rules, restock rules, recovery yields.

use roam_types::Player;
use serde::{Deserialize, Serialize};

/// An item the catalog knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// When to consume it automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumable: Option<ConsumableRule>,
    /// When the shop visit should restock it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restock: Option<RestockRule>,
    /// Recovery pool points granted per unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery: Option<RecoveryYield>,
}

impl Item {
    /// Whether the shop visit should keep this item stocked at `level`.
    pub fn restocks_at(&self, level: u32) -> bool {
        self.restock.as_ref().is_some_and(|rule| rule.applies(level))
    }

    /// Whether the item is used the moment it is held, so its stock
    /// level carries no signal.
    pub fn is_auto_consumed(&self) -> bool {
        self.consumable
            .as_ref()
            .is_some_and(|rule| rule.trigger == ConsumeTrigger::Always)
    }
}

/// What must hold for a consumable to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumeTrigger {
    /// Use whenever held.
    Always,
    /// Use once at least `amount` health is missing.
    HpMissing,
    /// Use once at least `amount` mana is missing.
    MpMissing,
}

/// Automatic consumption rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableRule {
    /// Condition kind.
    pub trigger: ConsumeTrigger,
    /// Threshold for the missing-resource triggers.
    #[serde(default)]
    pub amount: u64,
    /// Consume the whole stack at once.
    #[serde(default)]
    pub all: bool,
}

impl ConsumableRule {
    /// Whether the rule fires for this player.
    pub const fn holds(&self, player: &Player) -> bool {
        match self.trigger {
            ConsumeTrigger::Always => true,
            ConsumeTrigger::HpMissing => player.hp_missing() >= self.amount,
            ConsumeTrigger::MpMissing => player.mp_missing() >= self.amount,
        }
    }
}

/// Level window in which an item is restocked. Empty means always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RestockRule {
    /// Restock only from this level.
    pub min_level: Option<u32>,
    /// Restock only up to this level.
    pub max_level: Option<u32>,
}

impl RestockRule {
    /// Whether the window contains `level`.
    pub fn applies(&self, level: u32) -> bool {
        self.min_level.is_none_or(|min| level >= min)
            && self.max_level.is_none_or(|max| level <= max)
    }
}

/// Recovery points one unit adds to the player's pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryYield {
    /// Health recovery points.
    pub hp: u64,
    /// Mana recovery points.
    pub mp: u64,
}
