//! The behavior engine.
//!
//! [`decide`] turns one snapshot of [`AgentState`] into exactly one
//! [`Decision`]. It never mutates state: memory changes travel as
//! [`Effect`]s that the runtime applies before executing the action.
//!
//! The battle script is a strict priority chain; the first branch that
//! applies decides:
//!
//! 1. periodic maintenance, then equipment moves
//! 2. quest fulfillment
//! 3. special-meter upgrade
//! 4. farming map selection (no action of its own)
//! 5. resupply
//! 6. travel to the farming map
//! 7. free combat, else a random-walk step

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use roam_agents::{AgentState, Effect, EquipMove, evaluate_equipment, find_goods};
use roam_types::{MapUnit, Player, Point, UnitKind};
use roam_world::{Catalog, MapInfo, Quest};

use crate::config::{BotConfig, Script};
use crate::decision::{Action, Decision, DecisionError, Intent, TalkPurpose};
use crate::movement::{step_toward, wander};
use crate::resupply::{needs_resupply, usable_consumable};
use crate::targeting::{Target, find_target};

/// Sleep used by idle decisions.
pub const IDLE_WAIT: StdDuration = StdDuration::from_secs(1);

/// Chebyshev radius within which NPCs, gates, and shops answer.
pub const TALK_RANGE: i64 = 1;

/// Bounds, in minutes, of the delay before the next forced resupply.
const RESUPPLY_DELAY_MINUTES: (i64, i64) = (30, 60);

/// Decide the next action for one agent.
///
/// # Errors
///
/// [`DecisionError::MissingSkill`] when no skill is configured,
/// [`DecisionError::NoEligibleMap`] when no map admits the player, and
/// [`DecisionError::NoPath`] when a needed destination is unreachable.
pub fn decide<R: Rng + ?Sized>(
    state: &AgentState,
    catalog: &Catalog,
    config: &BotConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Decision, DecisionError> {
    if config.skill_id.is_empty() {
        return Err(DecisionError::MissingSkill);
    }
    let mut planner = Planner {
        state,
        catalog,
        config,
        now,
        rng,
    };
    match config.script {
        Script::Idle => Ok(planner.idle()),
        Script::Home => planner.go_home(Intent::Home),
        Script::Battle => planner.battle(),
    }
}

/// Maps a player may farm: admitted by level and gold, restricted to the
/// highest priority rank among them, in catalog order.
pub fn eligible_maps<'a>(catalog: &'a Catalog, player: &Player) -> Vec<&'a MapInfo> {
    let admitted = || {
        catalog
            .maps()
            .iter()
            .filter(|m| m.admits(player.lv, player.gold))
    };
    let Some(top) = admitted().map(|m| m.priority).max() else {
        return Vec::new();
    };
    admitted().filter(|m| m.priority == top).collect()
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

struct Planner<'a, R: ?Sized> {
    state: &'a AgentState,
    catalog: &'a Catalog,
    config: &'a BotConfig,
    now: DateTime<Utc>,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> Planner<'a, R> {
    fn idle(&self) -> Decision {
        let mut effects = Vec::new();
        if self.state.memory.locked_target.is_some() {
            effects.push(Effect::ReleaseTarget);
        }
        if self.state.memory.farm_map.is_some() {
            effects.push(Effect::ClearFarmMap);
        }
        Decision::new(Intent::Idle, Action::Wait(IDLE_WAIT)).with_effects(effects)
    }

    fn battle(&mut self) -> Result<Decision, DecisionError> {
        if let Some(decision) = self.maintenance() {
            return Ok(decision);
        }
        if let Some(quest) = self.eligible_quest() {
            return self.pursue_quest(quest);
        }
        if let Some(decision) = self.upgrade() {
            return Ok(decision);
        }

        let (farm_map, fresh) = self.farm_map()?;
        if needs_resupply(self.state, self.catalog, self.config, self.now) {
            return self.resupply();
        }

        let decision = if self.state.pos.name == farm_map {
            self.combat()
        } else {
            self.travel(&farm_map, Intent::Travel, true)?
        };
        if fresh {
            let mut effects = vec![Effect::SetFarmMap(farm_map)];
            effects.extend(decision.effects);
            return Ok(Decision { effects, ..decision });
        }
        Ok(decision)
    }

    // -- Maintenance and upgrades --------------------------------------------

    fn maintenance(&self) -> Option<Decision> {
        if self.now >= self.state.timers.next_maintenance_at {
            let interval = Duration::from_std(StdDuration::from_secs(
                self.config.maintenance_interval_secs,
            ))
            .unwrap_or(Duration::MAX);
            let next = self
                .now
                .checked_add_signed(interval)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            return Some(
                Decision::new(Intent::Maintenance, Action::Refresh)
                    .with_effects([Effect::ScheduleMaintenance(next)]),
            );
        }
        let action = match evaluate_equipment(
            &self.state.equipment,
            self.state.player.lv,
            self.config.prefer_attr,
        )? {
            EquipMove::Equip { id, name } => Action::Equip { id, name },
            EquipMove::Sell { id, name } => Action::Sell { id, name },
        };
        Some(Decision::new(Intent::Equipment, action))
    }

    fn upgrade(&self) -> Option<Decision> {
        let cap = self.config.upgrade?.level_cap;
        let meter = self.state.special.as_ref()?;
        (meter.ready_lv_up && meter.lv < cap)
            .then(|| Decision::new(Intent::Upgrade, Action::Upgrade))
    }

    // -- Quests --------------------------------------------------------------

    fn eligible_quest(&self) -> Option<&'a Quest> {
        let state = self.state;
        self.catalog.quests().iter().find(|q| {
            !(q.once && state.completed_quests.contains(&q.id))
                && q.triggered(&state.goods)
                && state.map_units.iter().any(|u| q.npc.matches(u))
        })
    }

    fn pursue_quest(&mut self, quest: &'a Quest) -> Result<Decision, DecisionError> {
        let state = self.state;
        if state.pos.name != quest.npc.map {
            return self.travel(&quest.npc.map, Intent::Quest, true);
        }
        let npc = state.map_units.iter().find(|u| quest.npc.matches(u));
        match npc {
            Some(unit) if state.in_range(unit.point(), TALK_RANGE) => Ok(Decision::new(
                Intent::Quest,
                Action::Talk {
                    unit: unit.clone(),
                    purpose: TalkPurpose::Quest {
                        id: quest.id.clone(),
                        once: quest.once,
                    },
                },
            )),
            _ => {
                if let Some(decision) = self.engage(Intent::Quest, true) {
                    return Ok(decision);
                }
                Ok(self.walk(Intent::Quest, quest.npc.point()))
            }
        }
    }

    // -- Farming map ---------------------------------------------------------

    /// The farming map, and whether it was chosen just now.
    fn farm_map(&mut self) -> Result<(String, bool), DecisionError> {
        if let Some(map) = &self.state.memory.farm_map {
            return Ok((map.clone(), false));
        }
        if let Some(map) = &self.config.map_name {
            return Ok((map.clone(), true));
        }
        let candidates = eligible_maps(self.catalog, &self.state.player);
        let pick = if candidates.is_empty() {
            None
        } else {
            candidates.get(self.rng.random_range(0..candidates.len()))
        };
        pick.map(|m| (m.name.clone(), true))
            .ok_or(DecisionError::NoEligibleMap {
                level: self.state.player.lv,
                gold: self.state.player.gold,
            })
    }

    // -- Resupply ------------------------------------------------------------

    fn resupply(&mut self) -> Result<Decision, DecisionError> {
        if let Some(decision) = self.consume(Intent::Resupply) {
            return Ok(decision);
        }

        let mut effects = Vec::new();
        let farming = self.state.memory.farm_map.is_some();
        if farming {
            effects.push(Effect::ClearFarmMap);
        }
        if farming || self.now >= self.state.timers.next_resupply_at {
            let (lo, hi) = RESUPPLY_DELAY_MINUTES;
            let delay = Duration::minutes(self.rng.random_range(lo..=hi));
            let next = self.now.checked_add_signed(delay).unwrap_or(self.now);
            effects.push(Effect::ScheduleResupply(next));
        }

        let (state, catalog) = (self.state, self.catalog);
        let home = catalog.home();
        let shop = state.map_units.iter().find(|u| u.kind == UnitKind::Shop);
        let decision = match shop {
            Some(unit) if state.in_range(unit.point(), TALK_RANGE) => Decision::new(
                Intent::Resupply,
                Action::Talk {
                    unit: unit.clone(),
                    purpose: TalkPurpose::Shop,
                },
            ),
            Some(unit) => self.walk(Intent::Resupply, unit.point()),
            None if state.pos.name != home.map => self.go_home(Intent::Resupply)?,
            None => self.walk(Intent::Resupply, home.shop),
        };
        Ok(decision.with_effects(effects))
    }

    /// Head for the home map: wait there, read a return item, or travel.
    fn go_home(&mut self, intent: Intent) -> Result<Decision, DecisionError> {
        let catalog = self.catalog;
        let home = catalog.home();
        if self.state.pos.name == home.map {
            return Ok(Decision::new(intent, Action::Wait(IDLE_WAIT)));
        }
        if let Some(item) = find_goods(&self.state.goods, &home.return_item).filter(|g| g.count > 0)
        {
            return Ok(Decision::new(
                intent,
                Action::UseItem {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    all: false,
                },
            ));
        }
        self.travel(&home.map, intent, false)
    }

    // -- Travel --------------------------------------------------------------

    fn travel(
        &mut self,
        target: &str,
        intent: Intent,
        battle: bool,
    ) -> Result<Decision, DecisionError> {
        if battle && let Some(decision) = self.engage(intent, true) {
            return Ok(decision);
        }
        let (state, catalog) = (self.state, self.catalog);
        let edge = catalog
            .graph()
            .next_edge_for_level(&state.pos.name, target, state.player.lv)
            .ok_or_else(|| DecisionError::NoPath {
                from: state.pos.name.clone(),
                to: target.to_owned(),
            })?;
        match state.map_units.iter().find(|u| edge.matches(u)) {
            Some(gate) if state.in_range(gate.point(), TALK_RANGE) => Ok(Decision::new(
                intent,
                Action::Talk {
                    unit: gate.clone(),
                    purpose: TalkPurpose::Transition(edge.clone()),
                },
            )),
            Some(gate) => Ok(self.walk(intent, gate.point())),
            None => Ok(self.walk(intent, edge.gate())),
        }
    }

    // -- Combat --------------------------------------------------------------

    fn combat(&mut self) -> Decision {
        if let Some(decision) = self.engage(Intent::Combat, false) {
            return decision;
        }
        self.wander_step()
    }

    /// Use a consumable, or fight whatever the targeting rules pick.
    fn engage(&mut self, intent: Intent, for_pathing: bool) -> Option<Decision> {
        if let Some(decision) = self.consume(intent) {
            return Some(decision);
        }
        let (state, catalog, config) = (self.state, self.catalog, self.config);
        let resupply_due = needs_resupply(state, catalog, config, self.now);
        match find_target(state, catalog, config, for_pathing, resupply_due) {
            Target::None => None,
            Target::Vanished => {
                // Loot revealed by the step still belongs to the last fight.
                let step = self.wander_step();
                Some(
                    Decision::new(step.intent, step.action)
                        .with_effects([Effect::ReleaseTarget])
                        .with_effects(step.effects)
                        .then_settle([Effect::ClearLastEngaged]),
                )
            }
            Target::Keep(unit) => Some(self.strike(intent, unit, None)),
            Target::Acquire(unit) => {
                Some(self.strike(intent, unit, Some(Effect::LockTarget(unit.id.clone()))))
            }
        }
    }

    fn strike(&self, intent: Intent, unit: &MapUnit, lock: Option<Effect>) -> Decision {
        if self.state.in_attack_range(unit.point()) {
            Decision::new(intent, Action::Attack { unit: unit.clone() })
                .with_effects(lock)
                .with_effects([Effect::RecordEngagement(unit.name.clone())])
        } else {
            self.walk(intent, unit.point()).with_effects(lock)
        }
    }

    fn consume(&self, intent: Intent) -> Option<Decision> {
        let item = usable_consumable(self.state, self.catalog)?;
        let all = item.consumable.as_ref().is_some_and(|rule| rule.all);
        Some(Decision::new(
            intent,
            Action::UseItem {
                id: item.id.clone(),
                name: item.name.clone(),
                all,
            },
        ))
    }

    // -- Movement ------------------------------------------------------------

    fn walk(&self, intent: Intent, to: Point) -> Decision {
        let here = self.state.pos.point();
        if here == to {
            return Decision::new(intent, Action::Wait(IDLE_WAIT));
        }
        Decision::new(
            intent,
            Action::Move(step_toward(here, to, self.state.player.speed)),
        )
    }

    fn wander_step(&mut self) -> Decision {
        match wander(self.state, self.rng) {
            Some((step, effects)) => {
                Decision::new(Intent::Wander, Action::Move(step)).with_effects(effects)
            }
            None => Decision::new(Intent::Wander, Action::Wait(IDLE_WAIT)),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use roam_types::{EquipItem, EquipStats, GoodsItem, Position, SpecialMeter};
    use roam_world::sample_catalog;

    use super::*;
    use crate::config::UpgradeConfig;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().unwrap()
    }

    fn config() -> BotConfig {
        BotConfig {
            skill_id: "1001".to_owned(),
            ..BotConfig::default()
        }
    }

    fn unit(id: &str, name: &str, kind: UnitKind, x: i64, y: i64) -> MapUnit {
        MapUnit {
            id: id.to_owned(),
            hp: 50,
            hp_c: 50,
            lv: 1,
            name: name.to_owned(),
            kind,
            x,
            y,
        }
    }

    fn goods(id: &str, count: u64) -> GoodsItem {
        GoodsItem {
            count,
            id: id.to_owned(),
            mark: String::new(),
            name: id.to_owned(),
            quality: 1,
            kind: 1,
        }
    }

    /// An agent at (10, 10) on `map` with both timers an hour away, both
    /// greeting quests done, and nothing in the bag.
    fn agent(map: &str, lv: u32, gold: u64) -> AgentState {
        let mut state = AgentState::new("ann", now());
        state.set_position(Position {
            name: map.to_owned(),
            size_x: 50,
            size_y: 50,
            x: 10,
            y: 10,
        });
        state.player.lv = lv;
        state.player.gold = gold;
        state.player.hp = 100;
        state.player.hp_c = 100;
        state.player.speed = 1;
        state.player.attack_distance = 1;
        state.player.hp_recovery = 100_000;
        state.player.mp_recovery = 100_000;
        state.apply_all([
            Effect::ScheduleResupply(now() + Duration::hours(1)),
            Effect::ScheduleMaintenance(now() + Duration::hours(1)),
            Effect::CompleteQuest("welcome".to_owned()),
            Effect::CompleteQuest("elder".to_owned()),
        ]);
        state
    }

    fn stand(state: &mut AgentState, x: i64, y: i64) {
        state.pos.x = x;
        state.pos.y = y;
    }

    fn run(state: &AgentState, config: &BotConfig, seed: u64) -> Result<Decision, DecisionError> {
        let catalog = sample_catalog().unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        decide(state, &catalog, config, now(), &mut rng)
    }

    fn is_one_step(from: Point, to: Point, speed: i64) -> bool {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        (dx == 0) != (dy == 0) && dx.max(dy) <= speed
    }

    // -- Scripts and guards ----------------------------------------------------

    #[test]
    fn missing_skill_is_an_error() {
        let state = agent("Town", 5, 50);
        let err = run(&state, &BotConfig::default(), 1).unwrap_err();
        assert_eq!(err, DecisionError::MissingSkill);
    }

    #[test]
    fn idle_waits_and_forgets_targets() {
        let mut state = agent("Town", 5, 50);
        state.apply_all([
            Effect::LockTarget("u1".to_owned()),
            Effect::SetFarmMap("Town".to_owned()),
        ]);
        let config = BotConfig {
            script: Script::Idle,
            ..config()
        };
        let d = run(&state, &config, 1).unwrap();
        assert_eq!(d.intent, Intent::Idle);
        assert_eq!(d.action, Action::Wait(IDLE_WAIT));
        assert_eq!(d.effects, vec![Effect::ReleaseTarget, Effect::ClearFarmMap]);
    }

    #[test]
    fn home_script_reads_return_item_then_waits() {
        let config = BotConfig {
            script: Script::Home,
            ..config()
        };
        let mut away = agent("Mine", 12, 50);
        away.goods = vec![goods("scroll", 1)];
        let d = run(&away, &config, 1).unwrap();
        assert!(matches!(d.action, Action::UseItem { ref id, all: false, .. } if id == "scroll"));

        let home = agent("Town", 12, 50);
        let d = run(&home, &config, 1).unwrap();
        assert_eq!((d.intent, d.action), (Intent::Home, Action::Wait(IDLE_WAIT)));
    }

    // -- Maintenance, equipment, upgrade ---------------------------------------

    #[test]
    fn maintenance_refreshes_and_reschedules() {
        let mut state = agent("Town", 5, 50);
        state.apply(Effect::ScheduleMaintenance(now() - Duration::seconds(1)));
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Maintenance);
        assert_eq!(d.action, Action::Refresh);
        assert_eq!(
            d.effects,
            vec![Effect::ScheduleMaintenance(now() + Duration::seconds(300))]
        );
    }

    #[test]
    fn empty_slot_is_equipped_before_anything_else() {
        let mut state = agent("Town", 5, 50);
        state.equipment = vec![EquipItem {
            id: 77,
            equip_id: 7,
            lv: 1,
            name: "Club".to_owned(),
            quality: 1,
            status: 0,
            slot: 1,
            stats: EquipStats::default(),
        }];
        state.map_units = vec![unit("dog", "Wild Dog", UnitKind::M1, 10, 11)];
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Equipment);
        assert_eq!(
            d.action,
            Action::Equip {
                id: 77,
                name: "Club".to_owned()
            }
        );
    }

    #[test]
    fn ready_meter_below_cap_upgrades() {
        let mut state = agent("Town", 5, 50);
        state.special = Some(SpecialMeter {
            lv: 2,
            ready_lv_up: true,
            ..SpecialMeter::default()
        });
        let capped = BotConfig {
            upgrade: Some(UpgradeConfig { level_cap: 3 }),
            ..config()
        };
        assert_eq!(run(&state, &capped, 1).unwrap().action, Action::Upgrade);

        let reached = BotConfig {
            upgrade: Some(UpgradeConfig { level_cap: 2 }),
            ..config()
        };
        assert_ne!(run(&state, &reached, 1).unwrap().action, Action::Upgrade);
        assert_ne!(run(&state, &config(), 1).unwrap().action, Action::Upgrade);
    }

    // -- Quests ----------------------------------------------------------------

    #[test]
    fn unsatisfied_quest_at_level_five_falls_through_to_combat() {
        let mut state = agent("Town", 5, 50);
        state.goods = vec![goods("ebony", 3)];
        state.map_units = vec![
            unit("keeper", "Ebony Keeper", UnitKind::Npc, 5, 3),
            unit("dog", "Wild Dog", UnitKind::M1, 11, 10),
        ];
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Combat);
        assert!(matches!(d.action, Action::Attack { ref unit } if unit.id == "dog"));
        assert_eq!(
            d.effects,
            vec![
                Effect::SetFarmMap("Town".to_owned()),
                Effect::LockTarget("dog".to_owned()),
                Effect::RecordEngagement("Wild Dog".to_owned()),
            ]
        );
    }

    #[test]
    fn quest_pursuit_beats_free_combat() {
        let mut state = agent("Town", 5, 50);
        state.completed_quests = BTreeSet::new();
        stand(&mut state, 4, 4);
        state.map_units = vec![
            unit("dog", "Wild Dog", UnitKind::M1, 5, 4),
            unit("greeter", "Greeter", UnitKind::Npc, 3, 3),
        ];
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Quest);
        assert_eq!(
            d.action,
            Action::Talk {
                unit: state.map_units[1].clone(),
                purpose: TalkPurpose::Quest {
                    id: "welcome".to_owned(),
                    once: true,
                },
            }
        );
    }

    #[test]
    fn satisfied_quest_far_away_fights_en_route() {
        let mut state = agent("Town", 5, 50);
        state.goods = vec![goods("ebony", 10)];
        state.map_units = vec![
            unit("keeper", "Ebony Keeper", UnitKind::Npc, 5, 3),
            unit("dog", "Wild Dog", UnitKind::M1, 11, 10),
        ];
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Quest);
        assert!(matches!(d.action, Action::Attack { ref unit } if unit.id == "dog"));

        state.map_units.truncate(1);
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Quest);
        assert_eq!(d.action, Action::Move(Point::new(10, 9)));
    }

    #[test]
    fn completed_one_shot_quests_are_skipped() {
        let mut state = agent("Town", 5, 50);
        stand(&mut state, 4, 4);
        state.map_units = vec![unit("greeter", "Greeter", UnitKind::Npc, 3, 3)];
        let d = run(&state, &config(), 3).unwrap();
        assert_ne!(d.intent, Intent::Quest);
    }

    // -- Map selection ---------------------------------------------------------

    #[test]
    fn map_choice_is_restricted_to_top_priority() {
        let catalog = sample_catalog().unwrap();
        let player = Player {
            lv: 20,
            gold: 2_000_000,
            ..Player::default()
        };
        let names: Vec<&str> = eligible_maps(&catalog, &player)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Deep", "Valley"]);

        let mut picked = BTreeSet::new();
        for seed in 0..40 {
            let mut state = agent("Town", 20, 2_000_000);
            state.goods = vec![goods("bandage", 50)];
            let d = run(&state, &config(), seed).unwrap();
            if let Some(Effect::SetFarmMap(map)) = d.effects.first() {
                picked.insert(map.clone());
            }
        }
        assert_eq!(picked, BTreeSet::from(["Deep".to_owned(), "Valley".to_owned()]));
    }

    #[test]
    fn no_eligible_map_is_fatal() {
        let state = agent("Town", 100, 50);
        let err = run(&state, &config(), 1).unwrap_err();
        assert_eq!(err, DecisionError::NoEligibleMap { level: 100, gold: 50 });
    }

    // -- Resupply --------------------------------------------------------------

    #[test]
    fn lapsed_timer_with_shop_in_range_talks_to_shop() {
        let mut state = agent("Town", 5, 5000);
        state.goods = vec![goods("bandage", 50)];
        state.apply_all([
            Effect::SetFarmMap("Town".to_owned()),
            Effect::ScheduleResupply(now() - Duration::minutes(1)),
        ]);
        state.map_units = vec![
            unit("dog", "Wild Dog", UnitKind::M1, 11, 10),
            unit("shop", "General Store", UnitKind::Shop, 11, 11),
        ];
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Resupply);
        assert_eq!(
            d.action,
            Action::Talk {
                unit: state.map_units[1].clone(),
                purpose: TalkPurpose::Shop,
            }
        );
        assert_eq!(d.effects[0], Effect::ClearFarmMap);
        let Effect::ScheduleResupply(next) = d.effects[1] else {
            panic!("expected a reschedule, got {:?}", d.effects);
        };
        assert!(next >= now() + Duration::minutes(30));
        assert!(next <= now() + Duration::minutes(60));
    }

    #[test]
    fn held_consumable_is_used_before_the_shop() {
        let mut state = agent("Town", 5, 5000);
        state.goods = vec![goods("bandage", 50), goods("potion", 4)];
        state.apply(Effect::ScheduleResupply(now() - Duration::minutes(1)));
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Resupply);
        assert!(matches!(d.action, Action::UseItem { ref id, all: true, .. } if id == "potion"));
        assert!(d.effects.is_empty());
    }

    #[test]
    fn resupply_away_from_home_reads_scroll_or_walks_back() {
        let mut state = agent("Mine", 12, 50_000);
        state.goods = vec![goods("bandage", 50), goods("scroll", 1)];
        state.apply(Effect::ScheduleResupply(now() - Duration::minutes(1)));
        let d = run(&state, &config(), 1).unwrap();
        assert!(matches!(d.action, Action::UseItem { ref id, .. } if id == "scroll"));

        state.goods.truncate(1);
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Resupply);
        // The Town gate on Mine sits at (20, 0); equal deltas step vertically.
        assert_eq!(d.action, Action::Move(Point::new(10, 9)));
    }

    #[test]
    fn resupply_on_home_without_shop_walks_to_shop_tile() {
        let mut state = agent("Town", 5, 5000);
        state.goods = vec![goods("bandage", 2)];
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Resupply);
        assert!(d.effects.is_empty());
        // Toward the shop tile at (4, 3).
        assert_eq!(d.action, Action::Move(Point::new(10, 9)));
    }

    // -- Travel ----------------------------------------------------------------

    #[test]
    fn travel_walks_to_hidden_gate_then_talks() {
        let mut state = agent("Town", 12, 50);
        let config = BotConfig {
            map_name: Some("Mine".to_owned()),
            ..config()
        };
        let d = run(&state, &config, 1).unwrap();
        assert_eq!(d.intent, Intent::Travel);
        assert_eq!(d.action, Action::Move(Point::new(10, 11)));
        assert_eq!(d.effects, vec![Effect::SetFarmMap("Mine".to_owned())]);

        state.apply(Effect::SetFarmMap("Mine".to_owned()));
        stand(&mut state, 25, 49);
        state.map_units = vec![unit("gate", "Mine", UnitKind::Io, 25, 50)];
        let d = run(&state, &config, 1).unwrap();
        let Action::Talk {
            purpose: TalkPurpose::Transition(edge),
            ..
        } = d.action
        else {
            panic!("expected a transition talk, got {:?}", d.action);
        };
        assert_eq!(edge.to_map, "Mine");
    }

    #[test]
    fn level_locked_destination_has_no_path() {
        let state = agent("Town", 12, 50);
        let config = BotConfig {
            map_name: Some("Valley".to_owned()),
            ..config()
        };
        let err = run(&state, &config, 1).unwrap_err();
        assert_eq!(
            err,
            DecisionError::NoPath {
                from: "Town".to_owned(),
                to: "Valley".to_owned(),
            }
        );
    }

    // -- Combat ----------------------------------------------------------------

    #[test]
    fn out_of_range_target_is_approached_and_locked() {
        let mut state = agent("Town", 5, 50);
        state.apply(Effect::SetFarmMap("Town".to_owned()));
        state.map_units = vec![unit("dog", "Wild Dog", UnitKind::M1, 10, 15)];
        let d = run(&state, &config(), 1).unwrap();
        assert_eq!(d.intent, Intent::Combat);
        assert_eq!(d.action, Action::Move(Point::new(10, 11)));
        assert_eq!(d.effects, vec![Effect::LockTarget("dog".to_owned())]);
    }

    #[test]
    fn vanished_lock_takes_one_random_step_before_reacquiring() {
        let mut state = agent("Town", 5, 50);
        state.apply_all([
            Effect::SetFarmMap("Town".to_owned()),
            Effect::LockTarget("gone".to_owned()),
            Effect::RecordEngagement("Wild Dog".to_owned()),
        ]);
        state.map_units = vec![unit("dog", "Wild Dog", UnitKind::M1, 11, 10)];

        let d = run(&state, &config(), 9).unwrap();
        assert_eq!(d.intent, Intent::Wander);
        let Action::Move(step) = d.action else {
            panic!("expected a step, got {:?}", d.action);
        };
        assert!(is_one_step(state.pos.point(), step, 1));
        assert_eq!(d.effects[0], Effect::ReleaseTarget);
        assert!(matches!(d.effects[1], Effect::SetWanderTarget(_)));
        assert_eq!(d.settle, vec![Effect::ClearLastEngaged]);

        state.apply_all(d.effects);
        state.apply_all(d.settle);
        assert_eq!(state.memory.last_engaged, None);
        let again = run(&state, &config(), 9).unwrap();
        assert_eq!(again.intent, Intent::Combat);
        assert!(matches!(again.action, Action::Attack { ref unit } if unit.id == "dog"));
    }

    #[test]
    fn loot_after_a_vanished_lock_is_still_audited() {
        let catalog = sample_catalog().unwrap();
        let mut state = agent("Town", 5, 50);
        state.apply_all([
            Effect::SetFarmMap("Town".to_owned()),
            Effect::LockTarget("gone".to_owned()),
            Effect::RecordEngagement("Wild Dog".to_owned()),
        ]);

        let d = run(&state, &config(), 9).unwrap();
        state.apply_all(d.effects);
        let reply = roam_types::GameResponse {
            temp_drop_msg: Some(vec!["Crown".to_owned()]),
            ..roam_types::GameResponse::default()
        };
        let faults = roam_agents::merge(&mut state, &reply, &catalog);
        assert_eq!(faults.len(), 1);
        assert!(faults[0].is_catalog_gap());

        state.apply_all(d.settle);
        assert!(roam_agents::merge(&mut state, &reply, &catalog).is_empty());
    }

    #[test]
    fn nothing_to_fight_wanders() {
        let mut state = agent("Town", 5, 50);
        state.apply(Effect::SetFarmMap("Town".to_owned()));
        let d = run(&state, &config(), 4).unwrap();
        assert_eq!(d.intent, Intent::Wander);
        assert!(matches!(d.action, Action::Move(_)));
    }
}
