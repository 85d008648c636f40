//! Equipment comparison and the equip/sell decision.
//!
//! Each combat style has a fixed, ordered criterion table. Two items are
//! compared lexicographically: the first criterion that differs decides.

use std::cmp::Ordering;

use roam_types::{CombatStyle, EquipItem, EquipStats};

/// One scoring rule over an item's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Average physical attack plus defense penetration.
    PhysicalDamage,
    /// Average magic attack plus magic defense penetration.
    MagicDamage,
    /// Physical plus magic defense.
    Defenses,
    /// Physical crit rate.
    PhysicalCritRate,
    /// Physical crit damage multiplier.
    PhysicalCritDamage,
    /// Magic crit rate.
    MagicCritRate,
    /// Magic crit damage multiplier.
    MagicCritDamage,
    /// Speed plus attack speed plus move speed.
    Speeds,
    /// Health regeneration.
    HpRegen,
    /// Mana regeneration.
    MpRegen,
    /// Health pool.
    Hp,
    /// Attack range.
    AttackRange,
    /// Sight radius.
    Vision,
    /// Mana pool.
    Mp,
    /// Required level (higher is assumed better).
    RequiredLevel,
    /// Rarity.
    Quality,
}

const MELEE_PROFILE: &[Criterion] = &[
    Criterion::PhysicalDamage,
    Criterion::Defenses,
    Criterion::PhysicalCritRate,
    Criterion::PhysicalCritDamage,
    Criterion::Speeds,
    Criterion::HpRegen,
    Criterion::MpRegen,
    Criterion::Hp,
    Criterion::AttackRange,
    Criterion::Vision,
    Criterion::Mp,
    Criterion::RequiredLevel,
    Criterion::Quality,
];

const MAGIC_PROFILE: &[Criterion] = &[
    Criterion::MagicDamage,
    Criterion::Defenses,
    Criterion::MagicCritRate,
    Criterion::MagicCritDamage,
    Criterion::Speeds,
    Criterion::HpRegen,
    Criterion::MpRegen,
    Criterion::Hp,
    Criterion::AttackRange,
    Criterion::Vision,
    Criterion::Mp,
    Criterion::RequiredLevel,
    Criterion::Quality,
];

/// The criterion table for a combat style.
pub const fn profile(style: CombatStyle) -> &'static [Criterion] {
    match style {
        CombatStyle::Melee => MELEE_PROFILE,
        CombatStyle::Magic => MAGIC_PROFILE,
    }
}

fn stat(v: Option<f64>) -> f64 {
    v.unwrap_or(0.0)
}

impl Criterion {
    /// Score `item` under this criterion. Missing stats count as zero.
    pub fn score(self, item: &EquipItem) -> f64 {
        let s: &EquipStats = &item.stats;
        match self {
            Self::PhysicalDamage => {
                (stat(s.max_atk) + stat(s.min_atk)) / 2.0 + stat(s.neglect_def)
            }
            Self::MagicDamage => {
                (stat(s.max_magic) + stat(s.min_magic)) / 2.0 + stat(s.neglect_magic_def)
            }
            Self::Defenses => stat(s.def) + stat(s.magic_def),
            Self::PhysicalCritRate => stat(s.str_crits_rate),
            Self::PhysicalCritDamage => stat(s.str_crits_damage_rate),
            Self::MagicCritRate => stat(s.int_crits_rate),
            Self::MagicCritDamage => stat(s.int_crits_damage_rate),
            Self::Speeds => stat(s.speed) + stat(s.attack_speed) + stat(s.move_speed),
            Self::HpRegen => stat(s.hp_sec),
            Self::MpRegen => stat(s.mp_sec),
            Self::Hp => stat(s.hp),
            Self::AttackRange => stat(s.attack_distance),
            Self::Vision => stat(s.vision),
            Self::Mp => stat(s.mp),
            Self::RequiredLevel => f64::from(item.lv),
            Self::Quality => f64::from(item.quality),
        }
    }
}

/// Whether `a` is strictly better than `b` for `style`.
///
/// Irreflexive and asymmetric: never true for both orders. Incomparable
/// scores (NaN) count as a tie on that criterion.
pub fn preferred_over(a: &EquipItem, b: &EquipItem, style: CombatStyle) -> bool {
    for criterion in profile(style) {
        match criterion.score(a).partial_cmp(&criterion.score(b)) {
            Some(Ordering::Greater) => return true,
            Some(Ordering::Less) => return false,
            Some(Ordering::Equal) | None => {}
        }
    }
    false
}

/// What to do with one carried item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipMove {
    /// Wear the item.
    Equip {
        /// Instance id.
        id: u64,
        /// Display name, for logging.
        name: String,
    },
    /// Sell the item.
    Sell {
        /// Instance id.
        id: u64,
        /// Display name, for logging.
        name: String,
    },
}

/// The first equip or sell move among carried items, in list order.
///
/// A carried item is worn when its slot is empty or it beats the worn item,
/// provided its level requirement is met; it is sold when it does not beat
/// the worn item. A better item the player cannot wear yet is kept.
pub fn evaluate_equipment(
    equipment: &[EquipItem],
    level: u32,
    style: CombatStyle,
) -> Option<EquipMove> {
    let worn = |slot: i64| {
        equipment
            .iter()
            .rev()
            .find(|e| e.is_equipped() && e.slot == slot)
    };
    for item in equipment.iter().filter(|e| !e.is_equipped()) {
        let better = worn(item.slot).is_none_or(|current| preferred_over(item, current, style));
        if !better {
            return Some(EquipMove::Sell {
                id: item.id,
                name: item.name.clone(),
            });
        }
        if item.lv <= level {
            return Some(EquipMove::Equip {
                id: item.id,
                name: item.name.clone(),
            });
        }
    }
    None
}
