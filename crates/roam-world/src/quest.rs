//! Quest entries.

use roam_types::GoodsItem;
use serde::{Deserialize, Serialize};

use crate::route::NpcRef;

/// A quest handed in at a fixed NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Unique quest id.
    pub id: String,
    /// Completed at most once per agent process.
    #[serde(default)]
    pub once: bool,
    /// Inventory condition; absent means always eligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<QuestTrigger>,
    /// Where the quest is handed in.
    pub npc: NpcRef,
}

impl Quest {
    /// Whether the trigger holds against the goods inventory.
    pub fn triggered(&self, goods: &[GoodsItem]) -> bool {
        self.trigger.as_ref().is_none_or(|t| t.holds(goods))
    }
}

/// "Holds at least `count` of `item`", where `item` is an id or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestTrigger {
    /// Item id or display name.
    pub item: String,
    /// Required stack size.
    pub count: u64,
}

impl QuestTrigger {
    /// Whether the goods inventory satisfies the trigger.
    pub fn holds(&self, goods: &[GoodsItem]) -> bool {
        goods
            .iter()
            .find(|g| g.id == self.item || g.name == self.item)
            .is_some_and(|g| g.count >= self.count)
    }
}
