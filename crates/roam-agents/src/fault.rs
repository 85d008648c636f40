//! Data faults: disagreements between what the server shows and what the
//! catalog says.
//!
//! A fault means the catalog is stale. Whether that stops the fleet or is
//! only logged is decided by [`FaultPolicy`], applied the same way to every
//! fault except recorded-drop gaps, which are always just warnings.

use roam_types::UnitKind;
use roam_world::NpcRef;
use serde::{Deserialize, Serialize};

/// A live observation that contradicts the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataFault {
    /// A monster or harvestable the catalog does not list.
    #[error("unknown monster {name} (hp {hp}, lv {lv}, {kind}) on {map}")]
    UnknownMonster {
        /// Reported name.
        name: String,
        /// Reported maximum health.
        hp: u64,
        /// Reported level.
        lv: u32,
        /// Reported kind.
        kind: UnitKind,
        /// Map it was seen on.
        map: String,
    },

    /// A known monster whose reported stats differ from the catalog.
    #[error("monster {name} reported as hp {hp}, lv {lv}, {kind}; catalog says hp {expected_hp}, lv {expected_lv}, {expected_kind}")]
    MonsterMismatch {
        /// Monster name.
        name: String,
        /// Reported maximum health.
        hp: u64,
        /// Reported level.
        lv: u32,
        /// Reported kind.
        kind: UnitKind,
        /// Catalog health.
        expected_hp: u64,
        /// Catalog level.
        expected_lv: u32,
        /// Catalog tier.
        expected_kind: UnitKind,
    },

    /// A known monster seen on a map its entry does not list.
    #[error("monster {name} seen on unlisted map {map}")]
    MonsterOffMap {
        /// Monster name.
        name: String,
        /// Map it was seen on.
        map: String,
    },

    /// An NPC that is neither a recorded NPC nor a gate.
    #[error("unknown npc {npc}")]
    UnknownNpc {
        /// Where it was seen.
        npc: NpcRef,
    },

    /// A transition gate missing from the transition table.
    #[error("unknown gate {npc}")]
    UnknownGate {
        /// Where it was seen.
        npc: NpcRef,
    },

    /// A goods stack whose id the item table lacks.
    #[error("unknown goods {id} ({name})")]
    UnknownGoods {
        /// Item id.
        id: String,
        /// Display name.
        name: String,
    },

    /// A shop offering whose id the item table lacks.
    #[error("unknown shop item {id} ({name})")]
    UnknownShopItem {
        /// Item id.
        id: String,
        /// Display name.
        name: String,
    },

    /// Taking a gate landed somewhere the edge does not describe.
    #[error("gate {gate} should lead from {from} to {to}, but agent is on {actual}")]
    MisroutedTransition {
        /// The gate taken.
        gate: NpcRef,
        /// Edge origin.
        from: String,
        /// Edge destination.
        to: String,
        /// Map the agent ended up on.
        actual: String,
    },

    /// Loot that the monster's drop table does not record.
    #[error("unrecorded drop from {monster}: {item}")]
    UnrecordedDrop {
        /// Monster killed.
        monster: String,
        /// Item received.
        item: String,
    },
}

impl DataFault {
    /// Drop-table gaps never change decisions, so they are only reported.
    pub const fn is_catalog_gap(&self) -> bool {
        matches!(self, Self::UnrecordedDrop { .. })
    }
}

/// How the fleet reacts to a data fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Halt the whole fleet.
    #[default]
    Strict,
    /// Log and keep going.
    Tolerant,
}

impl FaultPolicy {
    /// Whether `fault` must halt the fleet under this policy.
    pub const fn is_fatal(self, fault: &DataFault) -> bool {
        matches!(self, Self::Strict) && !fault.is_catalog_gap()
    }
}
