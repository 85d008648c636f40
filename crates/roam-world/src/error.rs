//! Error types for the `roam-world` crate.
//!
//! Every failure here happens while loading or validating a catalog. Once a
//! [`Catalog`](crate::Catalog) exists it is immutable and infallible.

use crate::route::NpcRef;

/// Errors raised while building a [`Catalog`](crate::Catalog).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to read the catalog file from disk.
    #[error("failed to read catalog file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse catalog YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Two monsters share a name.
    #[error("duplicate monster: {0}")]
    DuplicateMonster(String),

    /// Two items share an id.
    #[error("duplicate item id: {0}")]
    DuplicateItem(String),

    /// Two maps share a name.
    #[error("duplicate map: {0}")]
    DuplicateMap(String),

    /// Two quests share an id.
    #[error("duplicate quest id: {0}")]
    DuplicateQuest(String),

    /// A quest points at an NPC missing from the NPC table.
    #[error("quest {quest} targets unknown npc {npc}")]
    UnknownQuestNpc {
        /// The quest id.
        quest: String,
        /// The dangling NPC reference.
        npc: NpcRef,
    },

    /// A transition edge starts or ends on a map missing from the map table.
    #[error("transition {gate} references unknown map {map}")]
    UnknownTransitionMap {
        /// Gate name of the offending edge.
        gate: String,
        /// The missing map.
        map: String,
    },

    /// A monster lists a map missing from the map table.
    #[error("monster {monster} lists unknown map {map}")]
    UnknownMonsterMap {
        /// The monster name.
        monster: String,
        /// The missing map.
        map: String,
    },

    /// The home block names a map missing from the map table.
    #[error("home map {0} is not in the map table")]
    UnknownHomeMap(String),

    /// The home block names a return item missing from the item table.
    #[error("return item {0} is not in the item table")]
    UnknownReturnItem(String),
}

impl From<serde_yml::Error> for CatalogError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}
