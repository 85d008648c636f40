//! Behavior engine, agent runtime, and fleet registry for Roam bots.
//!
//! The engine is pure: it reads one agent's state and returns a
//! [`Decision`]. The runtime owns the network side, driving each agent
//! through a [`GameClient`] and reporting failures to the shared [`Fleet`].
//!
//! # Modules
//!
//! - [`client`] -- The [`GameClient`] trait and [`ClientError`].
//! - [`config`] -- Per-account bot settings and the fleet file.
//! - [`decision`] -- [`Decision`], [`Action`], and [`Intent`].
//! - [`engine`] -- [`decide`]: the priority chain for each script.
//! - [`fleet`] -- The agent registry and its kill switch.
//! - [`movement`] -- Single-step movement and the random walk.
//! - [`resupply`] -- When to resupply and which consumable to use.
//! - [`runtime`] -- [`Agent`]: the decide-act loop for one account.
//! - [`targeting`] -- Combat target selection.

pub mod client;
pub mod config;
pub mod decision;
pub mod engine;
pub mod fleet;
pub mod movement;
pub mod resupply;
pub mod runtime;
pub mod targeting;

pub use client::{ClientError, ClientResult, GameClient};
pub use config::{
    AccountConfig, BotConfig, ConfigError, FleetConfig, ResupplyStrategy, Script, UpgradeConfig,
};
pub use decision::{Action, Decision, DecisionError, Intent, TalkPurpose};
pub use engine::{decide, eligible_maps};
pub use fleet::Fleet;
pub use runtime::{Agent, AgentError, FleetContext};
pub use targeting::{Target, find_target};
