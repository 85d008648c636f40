//! Server responses.
//!
//! Every endpoint answers with an [`Envelope`]. Its payload, when present,
//! is a [`GameResponse`]: a partial update where each subsystem appears only
//! if the call touched it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::structs::{EquipItem, GoodsItem, MapUnit, PlayerPatch, Position, SkillInfo, SpecialMeter};

/// The outer `{status, data, msg}` wrapper. Negative status is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Status code, negative on failure.
    pub status: i64,
    /// Payload.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Human-readable message.
    #[serde(default)]
    pub msg: Option<String>,
}

impl<T> Envelope<T> {
    /// Whether the server rejected the request.
    pub const fn is_error(&self) -> bool {
        self.status < 0
    }
}

/// A partial world update. Absent fields mean "unchanged".
///
/// Map units and inventories are full snapshots when present; the player
/// block is a field-wise patch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameResponse {
    /// Player attribute patch.
    pub player: Option<PlayerPatch>,
    /// New position, possibly on a new map.
    pub pos: Option<Position>,
    /// Every unit visible on the current map.
    pub map_units: Option<Vec<MapUnit>>,
    /// Full goods inventory.
    pub goods_list: Option<Vec<GoodsItem>>,
    /// Full equipment list, worn and carried.
    pub equip_list: Option<Vec<EquipItem>>,
    /// Learned skills.
    pub skill_list: Option<Vec<SkillInfo>>,
    /// Event narration (loot, death, ...).
    pub normal_news: Option<String>,
    /// Goods narration.
    pub goods_news: Option<String>,
    /// Names of items dropped by the last kill.
    pub temp_drop_msg: Option<Vec<String>>,
    /// A dialog waiting for a task submission.
    pub confirm: Option<ConfirmDialog>,
    /// Shop contents after talking to a shop keeper.
    pub shop: Option<ShopInfo>,
    /// Special meter state.
    pub fb: Option<SpecialMeter>,
}

/// A dialog that must be answered through the task endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmDialog {
    /// Dialog title.
    #[serde(default)]
    pub title: String,
    /// Dialog text.
    #[serde(default)]
    pub content: String,
    /// NPC reference to echo back.
    #[serde(deserialize_with = "string_or_number")]
    pub npc: String,
    /// Task id to echo back.
    #[serde(deserialize_with = "string_or_number")]
    pub tid: String,
}

/// What a shop keeper offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInfo {
    /// Shop name.
    #[serde(default)]
    pub name: String,
    /// Shop keeper reference to echo back when buying.
    #[serde(deserialize_with = "string_or_number")]
    pub npc: String,
    /// Shop id to echo back when buying.
    #[serde(deserialize_with = "string_or_number")]
    pub shop_id: String,
    /// Price list.
    #[serde(default)]
    pub goods: Vec<ShopListing>,
}

/// One priced item in a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopListing {
    /// Item id.
    pub goods_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Flavor text.
    #[serde(default)]
    pub mark: String,
    /// Unit price. `None` when the shop lists the item without a price.
    #[serde(default, deserialize_with = "lenient_price")]
    pub sell_gold: Option<u64>,
}

impl ShopListing {
    /// The unit price, if the item can actually be bought.
    pub fn price(&self) -> Option<u64> {
        self.sell_gold.filter(|p| *p > 0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Number(serde_json::Number),
}

/// Accepts either a JSON string or a JSON number and keeps its text form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::String(raw) => raw,
        Scalar::Number(n) => n.to_string(),
    })
}

/// Prices arrive as numbers or numeric strings; anything unparsable is
/// treated as unpriced.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(Scalar::String(s)) => s.trim().parse::<u64>().ok(),
        Some(Scalar::Number(n)) => n.as_u64(),
    })
}
