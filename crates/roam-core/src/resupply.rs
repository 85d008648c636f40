//! When to resupply, and which consumable to use right now.

use chrono::{DateTime, Utc};
use roam_agents::{AgentState, held_count};
use roam_world::{Catalog, Item};

use crate::config::BotConfig;

/// Whether a resupply trip is due.
///
/// Never while a target is locked or gold is below the configured floor.
/// Otherwise due when the timer lapsed, when the recovery pools fall short
/// of the farming map's floors (the current map's when none is chosen),
/// or when any restockable item is held below `min_buy_count`. Items used
/// on pickup are left out of the stock check.
pub fn needs_resupply(
    state: &AgentState,
    catalog: &Catalog,
    config: &BotConfig,
    now: DateTime<Utc>,
) -> bool {
    if state.memory.locked_target.is_some() || state.player.gold < config.min_resupply_gold {
        return false;
    }
    if now >= state.timers.next_resupply_at {
        return true;
    }
    let map_name = state.memory.farm_map.as_deref().unwrap_or(&state.pos.name);
    if catalog
        .map(map_name)
        .is_some_and(|m| m.recovery_short(state.player.hp_recovery, state.player.mp_recovery))
    {
        return true;
    }
    catalog
        .items()
        .iter()
        .filter(|item| item.restocks_at(state.player.lv) && !item.is_auto_consumed())
        .any(|item| held_count(&state.goods, &item.id) < config.min_buy_count)
}

/// The held consumable to use now, if any.
///
/// Scans the catalog in reverse order; the first held item whose rule
/// holds for the current player wins.
pub fn usable_consumable<'a>(state: &AgentState, catalog: &'a Catalog) -> Option<&'a Item> {
    catalog.items().iter().rev().find(|item| {
        item.consumable
            .as_ref()
            .is_some_and(|rule| rule.holds(&state.player))
            && held_count(&state.goods, &item.id) > 0
    })
}
