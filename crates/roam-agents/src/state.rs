//! The world as one agent sees it.
//!
//! [`AgentState`] is owned by exactly one runtime. Server snapshots flow in
//! through [`merge`](crate::merge::merge); the agent's own bookkeeping
//! changes only through [`Effect`]s, which the decision layer proposes and
//! the runtime applies in order.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use roam_types::{
    EquipItem, GoodsItem, MapUnit, Player, Point, Position, SkillInfo, SpecialMeter,
};

/// Delay before the first mandatory resupply after startup.
pub const INITIAL_RESUPPLY_DELAY_MINUTES: i64 = 10;

/// Combat and travel bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentMemory {
    /// Unit id of the committed target.
    pub locked_target: Option<String>,
    /// Name of the monster last attacked, for drop auditing.
    pub last_engaged: Option<String>,
    /// Random-walk destination on the current map.
    pub wander_target: Option<Point>,
    /// The map chosen for farming.
    pub farm_map: Option<String>,
}

/// Deadlines that force periodic work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    /// A resupply trip is due after this instant.
    pub next_resupply_at: DateTime<Utc>,
    /// An equipment and goods refresh is due after this instant.
    pub next_maintenance_at: DateTime<Utc>,
}

/// A proposed change to agent bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Commit to a target unit id.
    LockTarget(String),
    /// Drop the committed target.
    ReleaseTarget,
    /// Remember the monster being attacked.
    RecordEngagement(String),
    /// Forget the monster last attacked.
    ClearLastEngaged,
    /// Choose a farming map.
    SetFarmMap(String),
    /// Forget the farming map so a new one is chosen.
    ClearFarmMap,
    /// Remember a random-walk destination.
    SetWanderTarget(Point),
    /// Set the next mandatory resupply.
    ScheduleResupply(DateTime<Utc>),
    /// Set the next maintenance refresh.
    ScheduleMaintenance(DateTime<Utc>),
    /// Record a one-shot quest as done.
    CompleteQuest(String),
}

/// Everything one agent knows about its own session.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Account this state belongs to.
    pub username: String,
    /// Server-confirmed player sheet.
    pub player: Player,
    /// Current position and map bounds.
    pub pos: Position,
    /// Everything visible on the current map, in server order.
    pub map_units: Vec<MapUnit>,
    /// Goods inventory.
    pub goods: Vec<GoodsItem>,
    /// Worn and carried equipment.
    pub equipment: Vec<EquipItem>,
    /// Learned skills.
    pub skills: Vec<SkillInfo>,
    /// Special meter, once the server has reported it.
    pub special: Option<SpecialMeter>,
    /// Combat and travel bookkeeping.
    pub memory: AgentMemory,
    /// Periodic deadlines.
    pub timers: Timers,
    /// One-shot quests already handed in.
    pub completed_quests: BTreeSet<String>,
}

impl AgentState {
    /// A blank state for `username`, to be filled by the first server
    /// snapshot.
    pub fn new(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            player: Player::default(),
            pos: Position::default(),
            map_units: Vec::new(),
            goods: Vec::new(),
            equipment: Vec::new(),
            skills: Vec::new(),
            special: None,
            memory: AgentMemory::default(),
            timers: Timers {
                next_resupply_at: now
                    .checked_add_signed(Duration::minutes(INITIAL_RESUPPLY_DELAY_MINUTES))
                    .unwrap_or(now),
                next_maintenance_at: now,
            },
            completed_quests: BTreeSet::new(),
        }
    }

    /// Apply one effect.
    pub fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::LockTarget(id) => self.memory.locked_target = Some(id),
            Effect::ReleaseTarget => self.memory.locked_target = None,
            Effect::RecordEngagement(name) => self.memory.last_engaged = Some(name),
            Effect::ClearLastEngaged => self.memory.last_engaged = None,
            Effect::SetFarmMap(map) => self.memory.farm_map = Some(map),
            Effect::ClearFarmMap => self.memory.farm_map = None,
            Effect::SetWanderTarget(p) => self.memory.wander_target = Some(p),
            Effect::ScheduleResupply(at) => self.timers.next_resupply_at = at,
            Effect::ScheduleMaintenance(at) => self.timers.next_maintenance_at = at,
            Effect::CompleteQuest(id) => {
                self.completed_quests.insert(id);
            }
        }
    }

    /// Apply effects in order.
    pub fn apply_all(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.apply(effect);
        }
    }

    /// Replace the position. Moving to another map forgets map-local
    /// combat memory.
    pub fn set_position(&mut self, pos: Position) {
        if pos.name != self.pos.name {
            self.memory.wander_target = None;
            self.memory.locked_target = None;
            self.memory.last_engaged = None;
        }
        self.pos = pos;
    }

    /// A visible unit by id.
    pub fn unit(&self, id: &str) -> Option<&MapUnit> {
        self.map_units.iter().find(|u| u.id == id)
    }

    /// Whether `p` is within `radius` tiles on both axes.
    pub const fn in_range(&self, p: Point, radius: i64) -> bool {
        let dx = p.x.saturating_sub(self.pos.x).saturating_abs();
        let dy = p.y.saturating_sub(self.pos.y).saturating_abs();
        dx <= radius && dy <= radius
    }

    /// Whether `p` is within the player's attack range.
    pub const fn in_attack_range(&self, p: Point) -> bool {
        self.in_range(p, self.player.attack_distance)
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().unwrap_or_default()
    }

    fn at(map: &str, x: i64, y: i64) -> Position {
        Position {
            name: map.to_owned(),
            size_x: 50,
            size_y: 50,
            x,
            y,
        }
    }

    #[test]
    fn new_state_schedules_first_resupply() {
        let state = AgentState::new("ann", now());
        assert_eq!(
            state.timers.next_resupply_at - now(),
            Duration::minutes(INITIAL_RESUPPLY_DELAY_MINUTES)
        );
        assert_eq!(state.timers.next_maintenance_at, now());
    }

    #[test]
    fn map_change_clears_map_local_memory() {
        let mut state = AgentState::new("ann", now());
        state.set_position(at("Town", 1, 1));
        state.apply_all([
            Effect::LockTarget("u1".to_owned()),
            Effect::SetWanderTarget(Point::new(5, 5)),
            Effect::SetFarmMap("Mine".to_owned()),
        ]);

        state.set_position(at("Town", 2, 1));
        assert_eq!(state.memory.locked_target.as_deref(), Some("u1"));

        state.set_position(at("Mine", 0, 0));
        assert!(state.memory.locked_target.is_none());
        assert!(state.memory.wander_target.is_none());
        assert_eq!(state.memory.farm_map.as_deref(), Some("Mine"));
    }

    #[test]
    fn range_is_chebyshev() {
        let mut state = AgentState::new("ann", now());
        state.set_position(at("Town", 10, 10));
        assert!(state.in_range(Point::new(11, 11), 1));
        assert!(!state.in_range(Point::new(12, 11), 1));
        assert!(state.in_range(Point::new(10, 10), 0));
    }

    #[test]
    fn complete_quest_is_idempotent() {
        let mut state = AgentState::new("ann", now());
        state.apply(Effect::CompleteQuest("welcome".to_owned()));
        state.apply(Effect::CompleteQuest("welcome".to_owned()));
        assert_eq!(state.completed_quests.len(), 1);
    }
}
