//! Combat target selection.
//!
//! A locked target is kept while it stays visible. Otherwise the visible
//! monsters and herbs are filtered by the catalog and bot settings, and the
//! one needing the fewest steps to bring into attack range is chosen.

use roam_agents::AgentState;
use roam_types::{MapUnit, UnitKind};
use roam_world::Catalog;

use crate::config::BotConfig;

/// Outcome of a target search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The locked target is still visible.
    Keep(&'a MapUnit),
    /// A new target to lock.
    Acquire(&'a MapUnit),
    /// The locked target disappeared from the snapshot.
    Vanished,
    /// Nothing to fight.
    None,
}

/// Find what to fight this tick.
///
/// `for_pathing` marks fights picked up while travelling, which skip
/// monsters flagged as unsafe on the way. `resupply_due` suppresses new
/// targets but keeps a locked one.
pub fn find_target<'a>(
    state: &'a AgentState,
    catalog: &Catalog,
    config: &BotConfig,
    for_pathing: bool,
    resupply_due: bool,
) -> Target<'a> {
    if let Some(locked) = state.memory.locked_target.as_deref() {
        return state.unit(locked).map_or(Target::Vanished, Target::Keep);
    }
    if resupply_due {
        return Target::None;
    }

    let mut best: Option<(&MapUnit, i64)> = None;
    for unit in state
        .map_units
        .iter()
        .filter(|u| eligible(state, catalog, config, u, for_pathing))
    {
        let cost = approach_cost(state, unit);
        if best.is_none_or(|(_, best_cost)| cost < best_cost) {
            best = Some((unit, cost));
        }
    }
    best.map_or(Target::None, |(unit, _)| Target::Acquire(unit))
}

/// Steps needed to bring `unit` into attack range, counted per axis.
pub fn approach_cost(state: &AgentState, unit: &MapUnit) -> i64 {
    let range = state.player.attack_distance.max(0);
    let dx = unit.x.saturating_sub(state.pos.x).saturating_abs();
    let dy = unit.y.saturating_sub(state.pos.y).saturating_abs();
    dx.saturating_sub(range)
        .max(0)
        .saturating_add(dy.saturating_sub(range).max(0))
}

fn eligible(
    state: &AgentState,
    catalog: &Catalog,
    config: &BotConfig,
    unit: &MapUnit,
    for_pathing: bool,
) -> bool {
    if !unit.kind.is_engageable() {
        return false;
    }
    let Some(monster) = catalog.monster(&unit.name) else {
        return false;
    };
    if unit.kind == UnitKind::Herb && !config.harvest {
        return false;
    }
    if !monster.admits_level(state.player.lv) {
        return false;
    }
    if for_pathing && monster.skip_when_travelling {
        return false;
    }
    if monster.excluded_style == Some(config.prefer_attr) {
        return false;
    }
    monster.health_allows(state.player.health_ratio())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use roam_agents::Effect;
    use roam_types::{CombatStyle, Position};
    use roam_world::sample_catalog;

    use super::*;

    fn unit(id: &str, name: &str, kind: UnitKind, x: i64, y: i64) -> MapUnit {
        MapUnit {
            id: id.to_owned(),
            hp: 10,
            hp_c: 10,
            lv: 1,
            name: name.to_owned(),
            kind,
            x,
            y,
        }
    }

    fn agent(map: &str, lv: u32, units: Vec<MapUnit>) -> AgentState {
        let mut state = AgentState::new("ann", Utc::now());
        state.set_position(Position {
            name: map.to_owned(),
            size_x: 50,
            size_y: 50,
            x: 10,
            y: 10,
        });
        state.player.lv = lv;
        state.player.hp = 100;
        state.player.hp_c = 100;
        state.player.attack_distance = 1;
        state.map_units = units;
        state
    }

    fn acquired<'a>(t: Target<'a>) -> Option<&'a str> {
        match t {
            Target::Acquire(u) => Some(u.id.as_str()),
            _ => None,
        }
    }

    #[test]
    fn nearest_by_approach_cost_wins() {
        let catalog = sample_catalog().unwrap();
        let state = agent(
            "Town",
            2,
            vec![
                unit("far", "Caterpillar", UnitKind::M1, 20, 20),
                unit("near", "Caterpillar", UnitKind::M1, 12, 10),
            ],
        );
        let config = BotConfig::default();
        let t = find_target(&state, &catalog, &config, false, false);
        assert_eq!(acquired(t), Some("near"));
    }

    #[test]
    fn ties_keep_snapshot_order() {
        let catalog = sample_catalog().unwrap();
        // Both are already within range 1, so both cost zero.
        let state = agent(
            "Town",
            2,
            vec![
                unit("first", "Caterpillar", UnitKind::M1, 11, 11),
                unit("second", "Caterpillar", UnitKind::M1, 10, 9),
            ],
        );
        let t = find_target(&state, &catalog, &BotConfig::default(), false, false);
        assert_eq!(acquired(t), Some("first"));
    }

    #[test]
    fn exclusions_apply() {
        let catalog = sample_catalog().unwrap();
        let config = BotConfig {
            harvest: false,
            ..BotConfig::default()
        };
        let state = agent(
            "Town",
            2,
            vec![
                unit("npc", "Greeter", UnitKind::Npc, 10, 11),
                unit("ghost", "Nobody", UnitKind::M1, 10, 11),
                unit("tree", "Dark Tree", UnitKind::Herb, 10, 11),
                unit("dog", "Wild Dog", UnitKind::M1, 10, 11),
                unit("bag", "Sandbag", UnitKind::M4, 10, 11),
            ],
        );
        assert_eq!(find_target(&state, &catalog, &config, false, false), Target::None);

        let harvesting = BotConfig::default();
        let t = find_target(&state, &catalog, &harvesting, false, false);
        assert_eq!(acquired(t), Some("tree"));
    }

    #[test]
    fn travel_unsafe_monsters_are_skipped_only_while_pathing() {
        let catalog = sample_catalog().unwrap();
        let state = agent("Town", 12, vec![unit("fox", "Fox Spirit", UnitKind::M3, 10, 11)]);
        let config = BotConfig::default();
        assert_eq!(find_target(&state, &catalog, &config, true, false), Target::None);
        assert_eq!(
            acquired(find_target(&state, &catalog, &config, false, false)),
            Some("fox")
        );
    }

    #[test]
    fn immune_and_guarded_monsters_are_skipped() {
        let catalog = sample_catalog().unwrap();
        let mut state = agent(
            "Mine",
            12,
            vec![unit("ghost", "Ghost", UnitKind::M2, 10, 11)],
        );
        let melee = BotConfig::default();
        assert_eq!(find_target(&state, &catalog, &melee, false, false), Target::None);
        let magic = BotConfig {
            prefer_attr: CombatStyle::Magic,
            ..BotConfig::default()
        };
        assert_eq!(
            acquired(find_target(&state, &catalog, &magic, false, false)),
            Some("ghost")
        );

        state.map_units = vec![unit("fox", "Fox Spirit", UnitKind::M3, 10, 11)];
        state.player.hp_c = 50;
        assert_eq!(find_target(&state, &catalog, &melee, false, false), Target::None);
    }

    #[test]
    fn lock_is_kept_or_reported_vanished() {
        let catalog = sample_catalog().unwrap();
        let mut state = agent("Town", 2, vec![unit("c1", "Caterpillar", UnitKind::M1, 30, 30)]);
        state.apply(Effect::LockTarget("c1".to_owned()));
        let config = BotConfig::default();
        assert!(matches!(
            find_target(&state, &catalog, &config, false, true),
            Target::Keep(u) if u.id == "c1"
        ));

        state.map_units.clear();
        assert_eq!(find_target(&state, &catalog, &config, false, false), Target::Vanished);
    }

    #[test]
    fn resupply_suppresses_new_targets() {
        let catalog = sample_catalog().unwrap();
        let state = agent("Town", 2, vec![unit("c1", "Caterpillar", UnitKind::M1, 10, 11)]);
        assert_eq!(
            find_target(&state, &catalog, &BotConfig::default(), false, true),
            Target::None
        );
    }
}
