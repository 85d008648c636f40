//! Per-agent world view for the Roam fleet.
//!
//! This crate is the logic layer around one agent's state: everything that
//! reads or updates it without touching the network. It sits between
//! `roam-types`/`roam-world` (data and static knowledge) and `roam-core`
//! (decisions and the runtime loop).
//!
//! # Modules
//!
//! - [`equipment`] -- Per-style criterion tables, [`preferred_over`], and the
//!   equip/sell decision.
//! - [`fault`] -- [`DataFault`] and the [`FaultPolicy`] that handles it.
//! - [`inventory`] -- Goods lookups by id or name.
//! - [`merge`] -- Applying server responses and checking them against the
//!   catalog.
//! - [`shop`] -- The balanced restock and recovery top-up allocators.
//! - [`state`] -- [`AgentState`], its memory, timers, and [`Effect`]s.

pub mod equipment;
pub mod fault;
pub mod inventory;
pub mod merge;
pub mod shop;
pub mod state;

pub use equipment::{Criterion, EquipMove, evaluate_equipment, preferred_over, profile};
pub use fault::{DataFault, FaultPolicy};
pub use inventory::{counts_by_id, find_goods, has_goods, held_count};
pub use merge::{audit_loot, merge};
pub use shop::{PurchasePlan, ShopContext, audit_shop, plan_recovery_top_up, plan_restock};
pub use state::{AgentMemory, AgentState, Effect, Timers};
