//! Shared wire types for the Roam agent fleet.
//!
//! Every crate in the workspace speaks these types. They mirror the JSON the
//! game server sends and accepts, so field names are camelCase on the wire.
//!
//! # Modules
//!
//! - [`enums`] -- Unit kinds and combat styles.
//! - [`structs`] -- Player, position, map units, goods, equipment, skills,
//!   and the special meter.
//! - [`actions`] -- Request payloads for every game endpoint.
//! - [`response`] -- The server envelope and the partial-update body that
//!   every call may return.

pub mod actions;
pub mod enums;
pub mod response;
pub mod structs;

pub use actions::{
    BuyRequest, EquipRequest, GoRequest, HeyRequest, LoginRequest, PurchaseLine, SellRequest,
    TaskRequest, UseGoodsRequest,
};
pub use enums::{CombatStyle, UnitKind};
pub use response::{ConfirmDialog, Envelope, GameResponse, ShopInfo, ShopListing};
pub use structs::{
    EquipItem, EquipStats, GoodsItem, MapUnit, Player, PlayerPatch, Point, Position, SkillInfo,
    SpecialMeter,
};
