//! Merging server responses into [`AgentState`] and checking them against
//! the catalog.
//!
//! Precedence: the player block is merged field by field; position is
//! replaced (a new map clears map-local memory); map units, goods,
//! equipment, and skills are replaced wholesale because each report is a
//! complete snapshot. Every check that fails yields a [`DataFault`]; the
//! caller decides what to do with them.

use roam_types::{GameResponse, MapUnit, UnitKind};
use roam_world::{Catalog, Monster, NpcRef};

use crate::fault::DataFault;
use crate::state::AgentState;

/// Merge `response` into `state` and return every catalog disagreement
/// found in it, in discovery order.
pub fn merge(state: &mut AgentState, response: &GameResponse, catalog: &Catalog) -> Vec<DataFault> {
    let mut faults = Vec::new();

    if let Some(patch) = &response.player {
        state.player.apply(patch);
    }
    if let Some(pos) = &response.pos {
        state.set_position(pos.clone());
    }
    if let Some(units) = &response.map_units {
        state.map_units.clone_from(units);
        for unit in units {
            if let Some(fault) = check_unit(unit, &state.pos.name, catalog) {
                faults.push(fault);
            }
        }
    }
    if let Some(skills) = &response.skill_list {
        state.skills.clone_from(skills);
    }
    if let Some(goods) = &response.goods_list {
        state.goods.clone_from(goods);
        for g in goods {
            if catalog.item(&g.id).is_none() {
                faults.push(DataFault::UnknownGoods {
                    id: g.id.clone(),
                    name: g.name.clone(),
                });
            }
        }
    }
    if let Some(equipment) = &response.equip_list {
        state.equipment.clone_from(equipment);
    }
    if let Some(meter) = &response.fb {
        state.special = Some(meter.clone());
    }
    if let Some(drops) = &response.temp_drop_msg
        && let Some(monster) = state
            .memory
            .last_engaged
            .as_deref()
            .and_then(|name| catalog.monster(name))
    {
        faults.extend(audit_loot(monster, drops.iter().map(String::as_str)));
    }

    faults
}

/// Every looted item the monster's drop table does not record.
pub fn audit_loot<'a>(
    monster: &Monster,
    items: impl IntoIterator<Item = &'a str>,
) -> Vec<DataFault> {
    items
        .into_iter()
        .filter(|item| !monster.drops_item(item))
        .map(|item| DataFault::UnrecordedDrop {
            monster: monster.name.clone(),
            item: item.to_owned(),
        })
        .collect()
}

fn check_unit(unit: &MapUnit, map: &str, catalog: &Catalog) -> Option<DataFault> {
    match unit.kind {
        kind if kind.is_engageable() => {
            let Some(known) = catalog.monster(&unit.name) else {
                return Some(DataFault::UnknownMonster {
                    name: unit.name.clone(),
                    hp: unit.hp,
                    lv: unit.lv,
                    kind,
                    map: map.to_owned(),
                });
            };
            if known.hp != unit.hp || known.lv != unit.lv || known.tier != kind {
                return Some(DataFault::MonsterMismatch {
                    name: unit.name.clone(),
                    hp: unit.hp,
                    lv: unit.lv,
                    kind,
                    expected_hp: known.hp,
                    expected_lv: known.lv,
                    expected_kind: known.tier,
                });
            }
            if !known.maps.iter().any(|m| m == map) {
                return Some(DataFault::MonsterOffMap {
                    name: unit.name.clone(),
                    map: map.to_owned(),
                });
            }
            None
        }
        UnitKind::Npc => {
            let npc = NpcRef::of_unit(map, unit);
            (!catalog.is_npc(&npc) && !catalog.graph().is_gate(&npc))
                .then_some(DataFault::UnknownNpc { npc })
        }
        UnitKind::Io => {
            let npc = NpcRef::of_unit(map, unit);
            (!catalog.graph().is_gate(&npc)).then_some(DataFault::UnknownGate { npc })
        }
        _ => None,
    }
}
