//! Shop purchase planning.
//!
//! Two allocators share one budget discipline: the plan never costs more
//! than the gold on hand, and a return-to-town item is reserved first when
//! the player qualifies for one.
//!
//! - [`plan_restock`] spreads gold so restockable items end up at one
//!   common stock level (a water fill, cheapest-stocked first).
//! - [`plan_recovery_top_up`] buys recovery items toward the farming map's
//!   hp/mp recovery targets, equalizing what is still missing when gold
//!   runs short.

use std::collections::BTreeSet;

use roam_types::{GoodsItem, Player, PurchaseLine, ShopListing};
use roam_world::{Catalog, MapInfo};

use crate::fault::DataFault;
use crate::inventory::{counts_by_id, held_count};

/// Inputs common to both allocators.
#[derive(Debug, Clone, Copy)]
pub struct ShopContext<'a> {
    /// Catalog for item rules.
    pub catalog: &'a Catalog,
    /// What the shop sells.
    pub listings: &'a [ShopListing],
    /// What the player holds.
    pub goods: &'a [GoodsItem],
    /// The buyer.
    pub player: &'a Player,
}

impl ShopContext<'_> {
    fn price(&self, id: &str) -> Option<u64> {
        self.listings
            .iter()
            .filter(|l| l.goods_id == id)
            .find_map(ShopListing::price)
    }
}

/// A planned purchase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PurchasePlan {
    /// Lines to submit, one per item.
    pub lines: Vec<PurchaseLine>,
    /// Total gold the lines cost.
    pub cost: u64,
}

impl PurchasePlan {
    fn push(&mut self, goods_id: &str, count: u64, unit_price: u64) {
        if count == 0 {
            return;
        }
        self.cost = self.cost.saturating_add(count.saturating_mul(unit_price));
        self.lines.push(PurchaseLine {
            goods_id: goods_id.to_owned(),
            count,
        });
    }

    /// Units planned for an item.
    pub fn count_of(&self, goods_id: &str) -> u64 {
        self.lines
            .iter()
            .filter(|l| l.goods_id == goods_id)
            .fold(0, |acc, l| acc.saturating_add(l.count))
    }

    /// Whether nothing is to be bought.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Every listing whose item the catalog does not know.
pub fn audit_shop(listings: &[ShopListing], catalog: &Catalog) -> Vec<DataFault> {
    listings
        .iter()
        .filter(|l| catalog.item(&l.goods_id).is_none())
        .map(|l| DataFault::UnknownShopItem {
            id: l.goods_id.clone(),
            name: l.name.clone(),
        })
        .collect()
}

/// Reserve one return-to-town item when the player qualifies and does not
/// hold one. Returns the gold left.
fn reserve_return_item(ctx: &ShopContext<'_>, gold: u64, plan: &mut PurchasePlan) -> u64 {
    let home = ctx.catalog.home();
    if ctx.player.lv < home.return_item_min_level
        || gold < home.return_item_min_gold
        || held_count(ctx.goods, &home.return_item) > 0
    {
        return gold;
    }
    match ctx.price(&home.return_item) {
        Some(price) if price <= gold => {
            plan.push(&home.return_item, 1, price);
            gold.saturating_sub(price)
        }
        _ => gold,
    }
}

/// Balanced restock of every priced, known item whose restock rule holds.
///
/// Items are ranked by held quantity, poorest first. A common buy-to level
/// rises while gold lasts: lifting the `k` poorest items by one unit costs
/// the sum of their prices. The level is capped at `max_buy_count`, and
/// each item below it gets one line for the difference.
pub fn plan_restock(ctx: &ShopContext<'_>, max_buy_count: u64) -> PurchasePlan {
    let mut plan = PurchasePlan::default();
    let mut gold = reserve_return_item(ctx, ctx.player.gold, &mut plan);
    let held = counts_by_id(ctx.goods);

    let mut seen = BTreeSet::new();
    let mut keys: Vec<(&str, u64, u64)> = ctx
        .listings
        .iter()
        .filter_map(|l| {
            let price = l.price()?;
            let item = ctx.catalog.item(&l.goods_id)?;
            (item.restocks_at(ctx.player.lv) && seen.insert(l.goods_id.as_str())).then(|| {
                let count = held.get(l.goods_id.as_str()).copied().unwrap_or(0);
                (l.goods_id.as_str(), count, price)
            })
        })
        .collect();
    keys.sort_by_key(|&(_, count, _)| count);

    let mut unit_price: u64 = 0;
    let mut buy_to: u64 = 0;
    for &(_, count, price) in &keys {
        let mut step = count.saturating_sub(buy_to);
        if let Some(affordable) = gold.checked_div(unit_price) {
            step = step.min(affordable);
        }
        gold = gold.saturating_sub(unit_price.saturating_mul(step));
        unit_price = unit_price.saturating_add(price);
        buy_to = buy_to.saturating_add(step);
    }
    if let Some(affordable) = gold.checked_div(unit_price) {
        buy_to = buy_to.saturating_add(affordable);
    }
    let buy_to = buy_to.min(max_buy_count);

    for &(id, count, price) in &keys {
        plan.push(id, buy_to.saturating_sub(count), price);
    }
    plan
}

/// Best recovery item for one pool: highest yield per gold, first wins ties.
fn best_recovery_item<'a>(
    ctx: &ShopContext<'a>,
    yield_of: impl Fn(&roam_world::RecoveryYield) -> u64,
) -> Option<(&'a str, u64, u64)> {
    let mut best: Option<(&'a str, u64, u64)> = None;
    for listing in ctx.listings {
        let Some(price) = listing.price() else {
            continue;
        };
        let Some(recovery) = ctx.catalog.item(&listing.goods_id).and_then(|i| i.recovery.as_ref())
        else {
            continue;
        };
        let points = yield_of(recovery);
        if points == 0 {
            continue;
        }
        let better = best.is_none_or(|(_, best_points, best_price)| {
            u128::from(points).saturating_mul(u128::from(best_price))
                > u128::from(best_points).saturating_mul(u128::from(price))
        });
        if better {
            best = Some((listing.goods_id.as_str(), points, price));
        }
    }
    best
}

/// Units of an item yielding `points` each needed to cover `deficit`.
fn units_for(deficit: u64, points: u64) -> u64 {
    if points == 0 {
        return 0;
    }
    deficit.div_ceil(points)
}

/// Top up the hp and mp recovery pools toward `map`'s targets.
///
/// When both deficits cannot be covered, the plan buys down to the lowest
/// common remaining deficit the budget allows, so neither pool is starved
/// to fill the other.
pub fn plan_recovery_top_up(ctx: &ShopContext<'_>, map: &MapInfo) -> PurchasePlan {
    let mut plan = PurchasePlan::default();
    let gold = reserve_return_item(ctx, ctx.player.gold, &mut plan);

    let hp_item = best_recovery_item(ctx, |r| r.hp);
    let mp_item = best_recovery_item(ctx, |r| r.mp);
    let hp_deficit = if hp_item.is_some() {
        map.target_hp_recovery.saturating_sub(ctx.player.hp_recovery)
    } else {
        0
    };
    let mp_deficit = if mp_item.is_some() {
        map.target_mp_recovery.saturating_sub(ctx.player.mp_recovery)
    } else {
        0
    };

    let units = |remaining: u64| {
        let hp = hp_item.map_or(0, |(_, points, _)| {
            units_for(hp_deficit.saturating_sub(remaining), points)
        });
        let mp = mp_item.map_or(0, |(_, points, _)| {
            units_for(mp_deficit.saturating_sub(remaining), points)
        });
        (hp, mp)
    };
    let cost = |remaining: u64| {
        let (hp, mp) = units(remaining);
        let hp_cost = hp_item.map_or(0, |(_, _, price)| hp.saturating_mul(price));
        let mp_cost = mp_item.map_or(0, |(_, _, price)| mp.saturating_mul(price));
        hp_cost.saturating_add(mp_cost)
    };

    // Smallest common remaining deficit that fits the budget.
    let mut lo: u64 = 0;
    let mut hi: u64 = hp_deficit.max(mp_deficit);
    while lo < hi {
        let mid = lo.saturating_add(hi.saturating_sub(lo) / 2);
        if cost(mid) <= gold {
            hi = mid;
        } else {
            lo = mid.saturating_add(1);
        }
    }

    let (hp_units, mp_units) = units(lo);
    match (hp_item, mp_item) {
        (Some((hp_id, _, hp_price)), Some((mp_id, _, mp_price))) if hp_id == mp_id => {
            // One item feeds both pools; buy enough for the larger need.
            plan.push(hp_id, hp_units.max(mp_units), hp_price.max(mp_price));
        }
        _ => {
            if let Some((id, _, price)) = hp_item {
                plan.push(id, hp_units, price);
            }
            if let Some((id, _, price)) = mp_item {
                plan.push(id, mp_units, price);
            }
        }
    }
    plan
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use roam_world::sample_catalog;

    use super::*;

    fn listing(id: &str, price: u64) -> ShopListing {
        ShopListing {
            goods_id: id.to_owned(),
            name: id.to_owned(),
            mark: String::new(),
            sell_gold: Some(price),
        }
    }

    fn stack(id: &str, count: u64) -> GoodsItem {
        GoodsItem {
            count,
            id: id.to_owned(),
            mark: String::new(),
            name: id.to_owned(),
            quality: 0,
            kind: 0,
        }
    }

    fn player(lv: u32, gold: u64) -> Player {
        Player {
            lv,
            gold,
            ..Player::default()
        }
    }

    fn shop() -> Vec<ShopListing> {
        vec![
            listing("potion", 10),
            listing("ether", 20),
            listing("big-potion", 50),
            listing("scroll", 500),
            listing("egg", 5),
        ]
    }

    #[test]
    fn restock_balances_stock_levels() {
        let catalog = sample_catalog().unwrap();
        let listings = shop();
        let goods = vec![stack("potion", 0), stack("ether", 10)];
        let p = player(5, 400);
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &goods,
            player: &p,
        };
        let plan = plan_restock(&ctx, 9999);
        // Potions are lifted to 10 (100 gold), then both rise together at
        // 30 per level: 300 gold buys 10 more levels.
        assert_eq!(plan.count_of("potion"), 20);
        assert_eq!(plan.count_of("ether"), 10);
        assert_eq!(plan.count_of("egg"), 0);
        assert_eq!(plan.count_of("big-potion"), 0);
        assert_eq!(plan.cost, 400);
    }

    #[test]
    fn restock_respects_cap() {
        let catalog = sample_catalog().unwrap();
        let listings = shop();
        let p = player(5, 1_000_000);
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &[],
            player: &p,
        };
        let plan = plan_restock(&ctx, 25);
        assert_eq!(plan.count_of("potion"), 25);
        assert_eq!(plan.count_of("ether"), 25);
    }

    #[test]
    fn restock_never_overspends_and_is_monotone() {
        let catalog = sample_catalog().unwrap();
        let listings = shop();
        let goods = vec![stack("potion", 7), stack("ether", 2)];
        let mut previous: Option<PurchasePlan> = None;
        for gold in (0..2_000).step_by(7) {
            let p = player(5, gold);
            let ctx = ShopContext {
                catalog: &catalog,
                listings: &listings,
                goods: &goods,
                player: &p,
            };
            let plan = plan_restock(&ctx, 9999);
            assert!(plan.cost <= gold, "gold {gold} cost {}", plan.cost);
            if let Some(prev) = &previous {
                for id in ["potion", "ether"] {
                    assert!(plan.count_of(id) >= prev.count_of(id), "gold {gold} {id}");
                }
            }
            previous = Some(plan);
        }
    }

    #[test]
    fn return_item_is_reserved_first() {
        let catalog = sample_catalog().unwrap();
        let listings = shop();
        let p = player(12, 10_000);
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &[],
            player: &p,
        };
        let plan = plan_restock(&ctx, 9999);
        assert_eq!(plan.lines[0].goods_id, "scroll");
        assert_eq!(plan.count_of("scroll"), 1);
        assert!(plan.cost <= 10_000);
        // Level 12 also restocks big potions.
        assert!(plan.count_of("big-potion") > 0);
    }

    #[test]
    fn return_item_skipped_when_held_or_poor() {
        let catalog = sample_catalog().unwrap();
        let listings = shop();
        let goods = vec![stack("scroll", 1)];
        let rich = player(12, 50_000);
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &goods,
            player: &rich,
        };
        assert_eq!(plan_restock(&ctx, 9999).count_of("scroll"), 0);

        let poor = player(12, 9_999);
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &[],
            player: &poor,
        };
        assert_eq!(plan_restock(&ctx, 9999).count_of("scroll"), 0);
    }

    #[test]
    fn unpriced_shop_plans_nothing() {
        let catalog = sample_catalog().unwrap();
        let listings = vec![ShopListing {
            sell_gold: None,
            ..listing("potion", 0)
        }];
        let p = player(5, 1000);
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &[],
            player: &p,
        };
        assert!(plan_restock(&ctx, 9999).is_empty());
    }

    #[test]
    fn unknown_listings_are_reported() {
        let catalog = sample_catalog().unwrap();
        let listings = vec![listing("potion", 10), listing("caviar", 99)];
        let faults = audit_shop(&listings, &catalog);
        assert_eq!(faults.len(), 1);
        assert!(matches!(&faults[0], DataFault::UnknownShopItem { id, .. } if id == "caviar"));
    }

    #[test]
    fn recovery_top_up_covers_both_when_affordable() {
        let catalog = sample_catalog().unwrap();
        let map = catalog.map("Town").unwrap().clone();
        let listings = shop();
        let p = Player {
            hp_recovery: 4000,
            mp_recovery: 4500,
            ..player(5, 1_000_000)
        };
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &[],
            player: &p,
        };
        let plan = plan_recovery_top_up(&ctx, &map);
        // 1000 hp missing: potions yield 10 hp per gold, big potions 10 too;
        // the first listed wins the tie.
        assert_eq!(plan.count_of("potion"), 10);
        assert_eq!(plan.count_of("ether"), 5);
    }

    #[test]
    fn recovery_top_up_equalizes_when_short() {
        let catalog = sample_catalog().unwrap();
        let map = catalog.map("Town").unwrap().clone();
        let listings = vec![listing("potion", 10), listing("ether", 10)];
        let p = Player {
            hp_recovery: 1000,
            mp_recovery: 3000,
            ..player(5, 300)
        };
        let ctx = ShopContext {
            catalog: &catalog,
            listings: &listings,
            goods: &[],
            player: &p,
        };
        let plan = plan_recovery_top_up(&ctx, &map);
        // Deficits 4000 and 2000, 30 units affordable: both pools end up
        // 1500 short (25 potions, 5 ethers).
        assert_eq!(plan.count_of("potion"), 25);
        assert_eq!(plan.count_of("ether"), 5);
        assert_eq!(plan.cost, 300);
    }

    #[test]
    fn recovery_top_up_never_overspends() {
        let catalog = sample_catalog().unwrap();
        let map = catalog.map("Town").unwrap().clone();
        let listings = shop();
        for gold in (0..3_000).step_by(37) {
            let p = player(5, gold);
            let ctx = ShopContext {
                catalog: &catalog,
                listings: &listings,
                goods: &[],
                player: &p,
            };
            assert!(plan_recovery_top_up(&ctx, &map).cost <= gold);
        }
    }
}
