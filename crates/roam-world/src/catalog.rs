//! The domain catalog: every static table the agents decide against.
//!
//! A [`Catalog`] is loaded once from YAML, validated, indexed, and then
//! shared read-only by every agent in the fleet. Tables keep their file
//! order because quest priority, consumable scanning, and pathfinder ties
//! all depend on it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogError;
use crate::graph::TransitionGraph;
use crate::item::Item;
use crate::map_info::MapInfo;
use crate::monster::Monster;
use crate::quest::Quest;
use crate::route::{NpcRef, TransitionEdge};
use crate::settings::{HomeSettings, Narration};

/// The catalog shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.yaml");

/// Raw file layout, before validation.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    home: HomeSettings,
    narration: Narration,
    #[serde(default)]
    monsters: Vec<Monster>,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    maps: Vec<MapInfo>,
    #[serde(default)]
    npcs: Vec<NpcRef>,
    #[serde(default)]
    quests: Vec<Quest>,
    #[serde(default)]
    transitions: Vec<TransitionEdge>,
}

/// Validated, indexed, immutable game knowledge.
#[derive(Debug, Clone)]
pub struct Catalog {
    home: HomeSettings,
    narration: Narration,
    monsters: Vec<Monster>,
    monster_index: BTreeMap<String, usize>,
    items: Vec<Item>,
    item_index: BTreeMap<String, usize>,
    maps: Vec<MapInfo>,
    map_index: BTreeMap<String, usize>,
    npcs: BTreeSet<NpcRef>,
    quests: Vec<Quest>,
    graph: TransitionGraph,
}

impl Catalog {
    /// Load and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or any
    /// parse or validation error from [`Catalog::parse`].
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate a catalog from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] for malformed YAML, or a validation
    /// error for duplicate keys and dangling references.
    pub fn parse(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yml::from_str(yaml)?;
        Self::build(file)
    }

    /// The catalog embedded in the binary.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded file is itself invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG)
    }

    fn build(file: CatalogFile) -> Result<Self, CatalogError> {
        let monster_index = index(&file.monsters, |m| &m.name, CatalogError::DuplicateMonster)?;
        let item_index = index(&file.items, |i| &i.id, CatalogError::DuplicateItem)?;
        let map_index = index(&file.maps, |m| &m.name, CatalogError::DuplicateMap)?;
        index(&file.quests, |q| &q.id, CatalogError::DuplicateQuest)?;

        let npcs: BTreeSet<NpcRef> = file.npcs.into_iter().collect();
        for quest in &file.quests {
            if !npcs.contains(&quest.npc) {
                return Err(CatalogError::UnknownQuestNpc {
                    quest: quest.id.clone(),
                    npc: quest.npc.clone(),
                });
            }
        }
        for edge in &file.transitions {
            for map in [&edge.map, &edge.to_map] {
                if !map_index.contains_key(map) {
                    return Err(CatalogError::UnknownTransitionMap {
                        gate: edge.name.clone(),
                        map: map.clone(),
                    });
                }
            }
        }
        for monster in &file.monsters {
            if let Some(map) = monster.maps.iter().find(|m| !map_index.contains_key(*m)) {
                return Err(CatalogError::UnknownMonsterMap {
                    monster: monster.name.clone(),
                    map: map.clone(),
                });
            }
        }
        if !map_index.contains_key(&file.home.map) {
            return Err(CatalogError::UnknownHomeMap(file.home.map));
        }
        if !item_index.contains_key(&file.home.return_item) {
            return Err(CatalogError::UnknownReturnItem(file.home.return_item));
        }

        debug!(
            monsters = file.monsters.len(),
            items = file.items.len(),
            maps = file.maps.len(),
            quests = file.quests.len(),
            transitions = file.transitions.len(),
            "Catalog loaded"
        );

        Ok(Self {
            home: file.home,
            narration: file.narration,
            monsters: file.monsters,
            monster_index,
            items: file.items,
            item_index,
            maps: file.maps,
            map_index,
            npcs,
            quests: file.quests,
            graph: TransitionGraph::new(file.transitions),
        })
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// A monster by name.
    pub fn monster(&self, name: &str) -> Option<&Monster> {
        self.monster_index.get(name).and_then(|&i| self.monsters.get(i))
    }

    /// An item by id.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.item_index.get(id).and_then(|&i| self.items.get(i))
    }

    /// A map by name.
    pub fn map(&self, name: &str) -> Option<&MapInfo> {
        self.map_index.get(name).and_then(|&i| self.maps.get(i))
    }

    /// All monsters in file order.
    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    /// All items in file order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// All maps in file order.
    pub fn maps(&self) -> &[MapInfo] {
        &self.maps
    }

    /// Quests in priority order.
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    /// Whether an NPC is recorded at this position.
    pub fn is_npc(&self, npc: &NpcRef) -> bool {
        self.npcs.contains(npc)
    }

    /// The transition graph.
    pub const fn graph(&self) -> &TransitionGraph {
        &self.graph
    }

    /// Home base settings.
    pub const fn home(&self) -> &HomeSettings {
        &self.home
    }

    /// Narration phrases.
    pub const fn narration(&self) -> &Narration {
        &self.narration
    }
}

/// Index entries by key, rejecting duplicates.
fn index<T, K, E>(
    entries: &[T],
    key: K,
    duplicate: E,
) -> Result<BTreeMap<String, usize>, CatalogError>
where
    K: Fn(&T) -> &String,
    E: Fn(String) -> CatalogError,
{
    let mut out = BTreeMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        let k = key(entry);
        if out.insert(k.clone(), idx).is_some() {
            return Err(duplicate(k.clone()));
        }
    }
    Ok(out)
}

/// The small English catalog used across the workspace's tests.
#[doc(hidden)]
pub fn sample_catalog() -> Result<Catalog, CatalogError> {
    Catalog::parse(include_str!("../data/sample.yaml"))
}
