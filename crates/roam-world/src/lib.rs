//! Static game knowledge for the Roam agent fleet.
//!
//! This crate holds everything an agent knows before it logs in: which
//! monsters live where and when they are worth fighting, which items to
//! consume and restock, which maps suit which levels, which quests to hand
//! in, and how maps connect.
//!
//! # Modules
//!
//! - [`catalog`] -- [`Catalog`], the validated and indexed YAML tables.
//! - [`error`] -- [`CatalogError`] for load and validation failures.
//! - [`graph`] -- [`TransitionGraph`] with the next-hop pathfinder.
//! - [`item`] -- Items with consumable, restock, and recovery rules.
//! - [`map_info`] -- Farming maps with level, gold, and recovery settings.
//! - [`monster`] -- Monsters and harvestables.
//! - [`quest`] -- Quests and their inventory triggers.
//! - [`route`] -- NPC positions and transition edges.
//! - [`settings`] -- Home base and narration phrases.

pub mod catalog;
pub mod error;
pub mod graph;
pub mod item;
pub mod map_info;
pub mod monster;
pub mod quest;
pub mod route;
pub mod settings;

pub use catalog::{Catalog, sample_catalog};
pub use error::CatalogError;
pub use graph::TransitionGraph;
pub use item::{ConsumableRule, ConsumeTrigger, Item, RecoveryYield, RestockRule};
pub use map_info::MapInfo;
pub use monster::Monster;
pub use quest::{Quest, QuestTrigger};
pub use route::{NpcRef, TransitionEdge};
pub use settings::{HomeSettings, Narration};
