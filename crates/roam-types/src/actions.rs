//! Request payloads for the game endpoints.
//!
//! One struct per endpoint body. Field names follow the server's JSON.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

// ---------------------------------------------------------------------------
// World interaction
// ---------------------------------------------------------------------------

/// Body of `POST /hey`: attack, harvest, or talk to a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeyRequest {
    /// Target unit id.
    pub id: String,
    /// Skill id to use.
    pub sklid: String,
    /// Target column.
    pub x: i64,
    /// Target row.
    pub y: i64,
}

/// Body of `POST /go`: one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoRequest {
    /// Destination column.
    pub x: i64,
    /// Destination row.
    pub y: i64,
}

/// Body of `POST /task`: answer a confirm dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// NPC reference from the dialog.
    pub npc: String,
    /// Task id from the dialog.
    pub tid: String,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Body of `POST /goods`: consume an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseGoodsRequest {
    /// Item id.
    pub id: String,
    /// Consume the whole stack.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub all: bool,
}

/// Body of `POST /equip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipRequest {
    /// Equipment instance id.
    pub id: u64,
}

/// Body of `POST /sell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    /// Equipment instance id.
    pub equip_id: u64,
}

/// One line of a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    /// Item id.
    pub goods_id: String,
    /// Units to buy.
    pub count: u64,
}

/// Body of `POST /buy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    /// Shop keeper reference from the shop block.
    pub npc: String,
    /// Shop id from the shop block.
    pub shop_id: String,
    /// What to buy.
    pub buy_items: Vec<PurchaseLine>,
}
