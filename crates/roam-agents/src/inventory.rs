//! Goods inventory queries.
//!
//! Goods are looked up either by id or, where a human-authored catalog entry
//! refers to them, by id-or-name.

use std::collections::BTreeMap;

use roam_types::GoodsItem;

/// The first stack whose id or name equals `key`.
pub fn find_goods<'a>(goods: &'a [GoodsItem], key: &str) -> Option<&'a GoodsItem> {
    goods.iter().find(|g| g.id == key || g.name == key)
}

/// Units held of the item with this exact id.
pub fn held_count(goods: &[GoodsItem], id: &str) -> u64 {
    goods
        .iter()
        .filter(|g| g.id == id)
        .fold(0_u64, |acc, g| acc.saturating_add(g.count))
}

/// Whether at least `count` units of `key` (id or name) are held.
pub fn has_goods(goods: &[GoodsItem], key: &str, count: u64) -> bool {
    find_goods(goods, key).is_some_and(|g| g.count >= count)
}

/// Held units per item id.
pub fn counts_by_id(goods: &[GoodsItem]) -> BTreeMap<&str, u64> {
    let mut out: BTreeMap<&str, u64> = BTreeMap::new();
    for g in goods {
        let entry = out.entry(g.id.as_str()).or_insert(0);
        *entry = entry.saturating_add(g.count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(id: &str, name: &str, count: u64) -> GoodsItem {
        GoodsItem {
            count,
            id: id.to_owned(),
            mark: String::new(),
            name: name.to_owned(),
            quality: 0,
            kind: 0,
        }
    }

    #[test]
    fn lookups_by_id_and_name() {
        let goods = vec![stack("egg", "Egg", 3), stack("potion", "Potion", 20)];
        assert_eq!(find_goods(&goods, "Egg").map(|g| g.count), Some(3));
        assert_eq!(find_goods(&goods, "potion").map(|g| g.count), Some(20));
        assert!(has_goods(&goods, "Potion", 20));
        assert!(!has_goods(&goods, "Potion", 21));
        assert!(!has_goods(&goods, "ether", 1));
    }

    #[test]
    fn counts_sum_split_stacks() {
        let goods = vec![stack("egg", "Egg", 3), stack("egg", "Egg", 4)];
        assert_eq!(held_count(&goods, "egg"), 7);
        assert_eq!(held_count(&goods, "Egg"), 0);
        assert_eq!(counts_by_id(&goods).get("egg"), Some(&7));
    }
}
