//! Core entity structs for the Roam wire model.
//!
//! Covers the player sheet and its partial update, position, map units,
//! goods, equipment with its stat block, skills, and the special meter.

use serde::{Deserialize, Serialize};

use crate::enums::UnitKind;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A tile coordinate on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl Point {
    /// Build a point from its coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Declares [`Player`] and its all-optional twin [`PlayerPatch`] from one
/// field list, plus the field-wise merge between them.
macro_rules! player_sheet {
    ($( $(#[$meta:meta])* $field:ident : $ty:ty ),* $(,)?) => {
        /// The server-confirmed player sheet.
        ///
        /// Only ever changed by merging a [`PlayerPatch`] received from the
        /// server; nothing in the fleet advances these values on its own.
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct Player {
            $( $(#[$meta])* pub $field: $ty, )*
        }

        /// A partial player update. Absent fields leave the sheet untouched.
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct PlayerPatch {
            $( $(#[$meta])* #[serde(skip_serializing_if = "Option::is_none")] pub $field: Option<$ty>, )*
        }

        impl Player {
            /// Merge every present field of `patch` into this sheet.
            pub fn apply(&mut self, patch: &PlayerPatch) {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field.clone_from(value);
                    }
                )*
            }
        }
    };
}

player_sheet! {
    /// Account name, checked against the configured username at startup.
    username: String,
    /// Character level.
    lv: u32,
    /// Gold on hand.
    gold: u64,
    /// Experience toward the next level.
    exp: u64,
    /// Experience needed for the next level.
    lv_up_exp: u64,
    /// Maximum health.
    hp: u64,
    /// Current health.
    #[serde(rename = "hp_c")]
    hp_c: u64,
    /// Maximum mana.
    mp: u64,
    /// Current mana.
    #[serde(rename = "mp_c")]
    mp_c: u64,
    /// Stored health recovery pool, drained automatically by the server.
    hp_recovery: u64,
    /// Stored mana recovery pool.
    mp_recovery: u64,
    /// Tiles covered by one move request.
    speed: i64,
    /// Move pacing reduction in `[0, 1)`.
    move_speed: f64,
    /// Attack pacing reduction in `[0, 1)`.
    attack_speed: f64,
    /// Attack range in tiles.
    attack_distance: i64,
    /// Sight radius in tiles.
    vision: i64,
    /// Health regenerated per second.
    hp_sec: f64,
    /// Mana regenerated per second.
    mp_sec: f64,
}

impl Player {
    /// Health below maximum.
    pub const fn hp_missing(&self) -> u64 {
        self.hp.saturating_sub(self.hp_c)
    }

    /// Mana below maximum.
    pub const fn mp_missing(&self) -> u64 {
        self.mp.saturating_sub(self.mp_c)
    }

    /// Current health as a fraction of maximum, `0.0` when maximum is unknown.
    #[allow(clippy::cast_precision_loss)]
    pub fn health_ratio(&self) -> f64 {
        if self.hp == 0 {
            return 0.0;
        }
        self.hp_c as f64 / self.hp as f64
    }
}

// ---------------------------------------------------------------------------
// Position and map contents
// ---------------------------------------------------------------------------

/// Where the agent stands, and the bounds of the map it stands on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Map name.
    pub name: String,
    /// Largest valid column.
    #[serde(default)]
    pub size_x: i64,
    /// Largest valid row.
    #[serde(default)]
    pub size_y: i64,
    /// Current column.
    #[serde(default)]
    pub x: i64,
    /// Current row.
    #[serde(default)]
    pub y: i64,
}

impl Position {
    /// The current tile.
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `p` lies on the map.
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x <= self.size_x && p.y <= self.size_y
    }
}

/// One visible thing on the current map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapUnit {
    /// Server-side unit id, used to address attacks and talks.
    pub id: String,
    /// Maximum health (monsters only).
    #[serde(default)]
    pub hp: u64,
    /// Current health.
    #[serde(default, rename = "hp_c")]
    pub hp_c: u64,
    /// Level.
    #[serde(default)]
    pub lv: u32,
    /// Display name.
    pub name: String,
    /// Kind tag.
    #[serde(rename = "type")]
    pub kind: UnitKind,
    /// Column. Some gates omit it when it is zero.
    #[serde(default)]
    pub x: i64,
    /// Row.
    #[serde(default)]
    pub y: i64,
}

impl MapUnit {
    /// The tile the unit occupies.
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A stack of goods in the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsItem {
    /// Stack size.
    #[serde(default)]
    pub count: u64,
    /// Item id.
    pub id: String,
    /// Flavor text.
    #[serde(default)]
    pub mark: String,
    /// Display name.
    pub name: String,
    /// Rarity.
    #[serde(default)]
    pub quality: u32,
    /// Item category code.
    #[serde(default, rename = "type")]
    pub kind: i64,
}

/// Stat bonuses carried by a piece of equipment. Every stat is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipStats {
    /// Low end of physical damage.
    pub min_atk: Option<f64>,
    /// High end of physical damage.
    pub max_atk: Option<f64>,
    /// Physical defense penetration.
    pub neglect_def: Option<f64>,
    /// Low end of magic damage.
    pub min_magic: Option<f64>,
    /// High end of magic damage.
    pub max_magic: Option<f64>,
    /// Magic defense penetration.
    pub neglect_magic_def: Option<f64>,
    /// Physical defense.
    pub def: Option<f64>,
    /// Magic defense.
    pub magic_def: Option<f64>,
    /// Physical crit chance.
    pub str_crits_rate: Option<f64>,
    /// Physical crit damage multiplier.
    pub str_crits_damage_rate: Option<f64>,
    /// Magic crit chance.
    pub int_crits_rate: Option<f64>,
    /// Magic crit damage multiplier.
    pub int_crits_damage_rate: Option<f64>,
    /// Tiles covered per movement step.
    pub speed: Option<f64>,
    /// Attack speed bonus.
    pub attack_speed: Option<f64>,
    /// Movement speed bonus.
    pub move_speed: Option<f64>,
    /// HP regenerated per second.
    pub hp_sec: Option<f64>,
    /// MP regenerated per second.
    pub mp_sec: Option<f64>,
    /// Flat max HP.
    pub hp: Option<f64>,
    /// Flat max MP.
    pub mp: Option<f64>,
    /// Attack range in tiles.
    pub attack_distance: Option<f64>,
    /// Sight radius in tiles.
    pub vision: Option<f64>,
}

/// A piece of equipment, worn or in the bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipItem {
    /// Instance id used by the equip and sell endpoints.
    #[serde(rename = "_id")]
    pub id: u64,
    /// Template id.
    #[serde(default)]
    pub equip_id: u64,
    /// Level required to wear it.
    #[serde(default)]
    pub lv: u32,
    /// Display name.
    pub name: String,
    /// Rarity.
    #[serde(default)]
    pub quality: u32,
    /// `1` when worn, `0` when in the bag.
    #[serde(default)]
    pub status: u8,
    /// Slot code. One worn item per slot.
    #[serde(rename = "type")]
    pub slot: i64,
    /// Stat bonuses.
    #[serde(flatten)]
    pub stats: EquipStats,
}

impl EquipItem {
    /// Whether the item is currently worn.
    pub const fn is_equipped(&self) -> bool {
        self.status != 0
    }
}

/// A learned skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillInfo {
    /// Skill id, the value the attack endpoint takes as `sklid`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Power rating.
    #[serde(default)]
    pub ability: f64,
    /// Training progress.
    #[serde(default)]
    pub maturity: f64,
    /// Flavor text.
    #[serde(default)]
    pub mark: String,
    /// Skill category code.
    #[serde(default, rename = "type")]
    pub kind: i64,
}

/// The special resource meter that unlocks the upgrade exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialMeter {
    /// Current meter level.
    pub lv: u32,
    /// Meter quality tier.
    pub quality: u32,
    /// Progress toward the next level.
    pub exp: u64,
    /// Set by the server once the next level can be claimed.
    pub ready_lv_up: bool,
}
