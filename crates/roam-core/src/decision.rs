//! The output of one engine tick.
//!
//! A [`Decision`] pairs exactly one [`Action`] with the [`Effect`]s that
//! must be applied to agent memory before the action runs, and the
//! [`Intent`] (priority branch) that produced it. Effects that must wait
//! until the action's reply has been merged travel separately.

use std::fmt;
use std::time::Duration;

use roam_agents::Effect;
use roam_types::{MapUnit, Point};
use roam_world::TransitionEdge;

/// Errors that stop the engine from producing a decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    /// The transition graph has no usable route.
    #[error("no path from {from} to {to}")]
    NoPath {
        /// Map the agent stands on.
        from: String,
        /// Map it needs to reach.
        to: String,
    },

    /// No map admits the player for farming.
    #[error("no eligible farming map at level {level} with {gold} gold")]
    NoEligibleMap {
        /// Player level.
        level: u32,
        /// Player gold.
        gold: u64,
    },

    /// The bot has no attack skill configured.
    #[error("no skill configured")]
    MissingSkill,
}

/// The priority branch a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Idle script.
    Idle,
    /// Home script.
    Home,
    /// Periodic refresh.
    Maintenance,
    /// Equip or sell.
    Equipment,
    /// Quest fulfillment, including fights on the way.
    Quest,
    /// Special-meter upgrade.
    Upgrade,
    /// Consumables and the shop visit.
    Resupply,
    /// Heading to the farming map.
    Travel,
    /// Fighting on the farming map.
    Combat,
    /// Random walk.
    Wander,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Home => "home",
            Self::Maintenance => "maintenance",
            Self::Equipment => "equipment",
            Self::Quest => "quest",
            Self::Upgrade => "upgrade",
            Self::Resupply => "resupply",
            Self::Travel => "travel",
            Self::Combat => "combat",
            Self::Wander => "wander",
        };
        f.write_str(s)
    }
}

/// Why an agent talks to a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalkPurpose {
    /// Hand in or accept a quest.
    Quest {
        /// Quest id.
        id: String,
        /// Record the quest as done afterwards.
        once: bool,
    },
    /// Take a map transition.
    Transition(TransitionEdge),
    /// Open the shop.
    Shop,
}

/// One server interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sleep without a request.
    Wait(Duration),
    /// One movement step.
    Move(Point),
    /// Attack a monster or harvest a herb.
    Attack {
        /// The target as last seen.
        unit: MapUnit,
    },
    /// Interact with an NPC, gate, or shop.
    Talk {
        /// The unit talked to.
        unit: MapUnit,
        /// What to do with the reply.
        purpose: TalkPurpose,
    },
    /// Use a goods item.
    UseItem {
        /// Item id.
        id: String,
        /// Display name, for logging.
        name: String,
        /// Use the whole stack.
        all: bool,
    },
    /// Wear an equipment instance.
    Equip {
        /// Instance id.
        id: u64,
        /// Display name, for logging.
        name: String,
    },
    /// Sell an equipment instance.
    Sell {
        /// Instance id.
        id: u64,
        /// Display name, for logging.
        name: String,
    },
    /// Pull a full session snapshot.
    Refresh,
    /// Run the special-meter upgrade exchange.
    Upgrade,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wait(d) => write!(f, "wait {}ms", d.as_millis()),
            Self::Move(p) => write!(f, "move to ({}, {})", p.x, p.y),
            Self::Attack { unit } => write!(f, "attack {} at ({}, {})", unit.name, unit.x, unit.y),
            Self::Talk { unit, purpose } => match purpose {
                TalkPurpose::Quest { id, .. } => write!(f, "talk to {} for quest {id}", unit.name),
                TalkPurpose::Transition(edge) => {
                    write!(f, "talk to {} for {}", unit.name, edge.to_map)
                }
                TalkPurpose::Shop => write!(f, "shop at {}", unit.name),
            },
            Self::UseItem { name, all, .. } => {
                if *all {
                    write!(f, "use all {name}")
                } else {
                    write!(f, "use {name}")
                }
            }
            Self::Equip { name, .. } => write!(f, "equip {name}"),
            Self::Sell { name, .. } => write!(f, "sell {name}"),
            Self::Refresh => f.write_str("refresh"),
            Self::Upgrade => f.write_str("upgrade special"),
        }
    }
}

/// What to do this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The branch that decided.
    pub intent: Intent,
    /// The request to issue.
    pub action: Action,
    /// Memory updates to apply before the action.
    pub effects: Vec<Effect>,
    /// Memory updates to apply after the action's reply is merged.
    pub settle: Vec<Effect>,
}

impl Decision {
    /// A decision with no effects.
    pub const fn new(intent: Intent, action: Action) -> Self {
        Self {
            intent,
            action,
            effects: Vec::new(),
            settle: Vec::new(),
        }
    }

    /// Attach effects, keeping any already present first.
    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Attach effects that take hold only once the reply is merged.
    #[must_use]
    pub fn then_settle(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.settle.extend(effects);
        self
    }
}
