//! Home base and narration settings.

use roam_types::Point;
use serde::{Deserialize, Serialize};

/// Where agents resupply and how they get back there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSettings {
    /// Home map name.
    pub map: String,
    /// Tile to walk to when no shop is visible on the home map.
    pub shop: Point,
    /// Item that teleports the holder home.
    pub return_item: String,
    /// Level from which the return item is bought.
    pub return_item_min_level: u32,
    /// Gold needed before the return item is bought.
    pub return_item_min_gold: u64,
}

/// Fixed phrases the server uses in event narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narration {
    /// Prefix of "loot gained" text.
    pub loot_prefix: String,
    /// Prefix of "you died" text.
    pub death_prefix: String,
    /// Separator between looted item names.
    pub loot_separator: String,
    /// Trailing punctuation after the loot list.
    #[serde(default)]
    pub loot_terminator: String,
}

impl Narration {
    /// Whether the text reports the agent's own death.
    pub fn is_death(&self, text: &str) -> bool {
        text.starts_with(self.death_prefix.as_str())
    }

    /// Item names listed in a "loot gained" text, or `None` for other text.
    pub fn loot<'a>(&self, text: &'a str) -> Option<Vec<&'a str>> {
        let rest = text.strip_prefix(self.loot_prefix.as_str())?;
        let rest = if self.loot_terminator.is_empty() {
            rest
        } else {
            rest.strip_suffix(self.loot_terminator.as_str()).unwrap_or(rest)
        };
        Some(
            rest.split(self.loot_separator.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn narration() -> Narration {
        Narration {
            loot_prefix: "You gained ".to_owned(),
            death_prefix: "You died".to_owned(),
            loot_separator: ", ".to_owned(),
            loot_terminator: ".".to_owned(),
        }
    }

    #[test]
    fn loot_list_is_split() {
        let items = narration().loot("You gained Tail, Egg.").unwrap();
        assert_eq!(items, vec!["Tail", "Egg"]);
    }

    #[test]
    fn non_loot_text_is_none() {
        assert!(narration().loot("Hello there").is_none());
    }

    #[test]
    fn death_prefix() {
        assert!(narration().is_death("You died at the hands of Fox"));
        assert!(!narration().is_death("You gained Egg."));
    }
}
