//! Fleet and per-bot configuration.
//!
//! The fleet file is YAML: a list of accounts, each with credentials, an
//! optional session token, and the bot settings that steer its behavior.
//! Every bot setting except the skill id has a default, so a minimal entry
//! is just a username, a password, and `config.skill_id`.
//!
//! ```yaml
//! fault_policy: strict
//! accounts:
//!   - username: ann
//!     password: hunter2
//!     config:
//!       script: battle
//!       skill_id: "1001"
//!       prefer_attr: magic
//! ```

use std::path::Path;

use roam_agents::FaultPolicy;
use roam_types::CombatStyle;
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading or saving the fleet file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the fleet file.
    #[error("failed to access fleet file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse or render YAML content.
    #[error("failed to process fleet YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// Two accounts share a username.
    #[error("duplicate account: {0}")]
    DuplicateAccount(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// Bot settings
// ---------------------------------------------------------------------------

/// Top-level behavior mode of a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// Do nothing but keep the session alive.
    Idle,
    /// Walk back to the home map and wait there.
    #[serde(alias = "scriptHome")]
    Home,
    /// Farm, quest, resupply, and upgrade.
    #[default]
    #[serde(alias = "scriptBattle")]
    Battle,
}

/// Which shop allocator plans purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResupplyStrategy {
    /// Bring every restockable item to one common stock level.
    #[default]
    Balanced,
    /// Buy recovery items toward the farming map's recovery targets.
    Recovery,
}

/// Special-meter upgrade settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    /// Stop upgrading once the meter reaches this level.
    pub level_cap: u32,
}

/// Settings for one bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Behavior mode.
    #[serde(default)]
    pub script: Script,

    /// Skill used for every attack and talk.
    #[serde(default, alias = "skillId")]
    pub skill_id: String,

    /// Farm this map instead of choosing one.
    #[serde(default, alias = "mapName", skip_serializing_if = "Option::is_none")]
    pub map_name: Option<String>,

    /// Combat style; drives equipment scoring and monster immunities.
    #[serde(default, alias = "preferAttr")]
    pub prefer_attr: CombatStyle,

    /// Attack herbs as well as monsters.
    #[serde(default = "default_true")]
    pub harvest: bool,

    /// Restockable items held below this count trigger a resupply.
    #[serde(default = "default_min_buy_count", alias = "minBuyCount")]
    pub min_buy_count: u64,

    /// Upper bound on the stock level a restock buys up to.
    #[serde(default = "default_max_buy_count", alias = "maxBuyCount")]
    pub max_buy_count: u64,

    /// No resupply trip below this much gold.
    #[serde(default = "default_min_resupply_gold")]
    pub min_resupply_gold: u64,

    /// Shop allocator.
    #[serde(default)]
    pub resupply_strategy: ResupplyStrategy,

    /// Seconds between equipment and goods refreshes.
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,

    /// Special-meter upgrades; disabled when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradeConfig>,

    /// Log narration and decisions at `info`.
    #[serde(default)]
    pub log: bool,

    /// Log requests and decision detail at `debug`.
    #[serde(default)]
    pub debug: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            script: Script::default(),
            skill_id: String::new(),
            map_name: None,
            prefer_attr: CombatStyle::default(),
            harvest: true,
            min_buy_count: default_min_buy_count(),
            max_buy_count: default_max_buy_count(),
            min_resupply_gold: default_min_resupply_gold(),
            resupply_strategy: ResupplyStrategy::default(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
            upgrade: None,
            log: false,
            debug: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts and fleet
// ---------------------------------------------------------------------------

/// One game account and the bot that drives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Login name; must match the server's player name.
    pub username: String,
    /// Login password, used when the token is missing or rejected.
    pub password: String,
    /// Session token from the last login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Bot settings.
    #[serde(default)]
    pub config: BotConfig,
}

/// The whole fleet file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FleetConfig {
    /// How data-model faults are handled fleet-wide.
    #[serde(default)]
    pub fault_policy: FaultPolicy,
    /// Accounts in start order.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl FleetConfig {
    /// Load the fleet file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::DuplicateAccount`] if a username repeats.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a fleet file from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        let mut seen = std::collections::BTreeSet::new();
        for account in &config.accounts {
            if !seen.insert(account.username.as_str()) {
                return Err(ConfigError::DuplicateAccount(account.username.clone()));
            }
        }
        Ok(config)
    }

    /// Write the fleet file back, e.g. after a login refreshed tokens.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

const fn default_true() -> bool {
    true
}

const fn default_min_buy_count() -> u64 {
    10
}

const fn default_max_buy_count() -> u64 {
    9999
}

const fn default_min_resupply_gold() -> u64 {
    1000
}

const fn default_maintenance_interval_secs() -> u64 {
    300
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn minimal_account_gets_defaults() {
        let fleet = FleetConfig::parse(
            r#"
accounts:
  - username: ann
    password: pw
    config:
      skill_id: "7"
"#,
        )
        .unwrap();
        assert_eq!(fleet.fault_policy, FaultPolicy::Strict);
        let bot = &fleet.accounts[0].config;
        assert_eq!(bot.script, Script::Battle);
        assert!(bot.harvest);
        assert_eq!(bot.min_buy_count, 10);
        assert_eq!(bot.max_buy_count, 9999);
        assert_eq!(bot.resupply_strategy, ResupplyStrategy::Balanced);
        assert!(bot.upgrade.is_none());
        assert!(fleet.accounts[0].token.is_none());
    }

    #[test]
    fn legacy_key_spellings_are_accepted() {
        let fleet = FleetConfig::parse(
            r#"
fault_policy: tolerant
accounts:
  - username: bob
    password: pw
    token: abc
    config:
      script: scriptHome
      skillId: "3"
      mapName: Mine
      preferAttr: magic
      maxBuyCount: 50
      upgrade:
        level_cap: 4
"#,
        )
        .unwrap();
        assert_eq!(fleet.fault_policy, FaultPolicy::Tolerant);
        let account = &fleet.accounts[0];
        assert_eq!(account.token.as_deref(), Some("abc"));
        assert_eq!(account.config.script, Script::Home);
        assert_eq!(account.config.skill_id, "3");
        assert_eq!(account.config.map_name.as_deref(), Some("Mine"));
        assert_eq!(account.config.prefer_attr, CombatStyle::Magic);
        assert_eq!(account.config.max_buy_count, 50);
        assert_eq!(account.config.upgrade, Some(UpgradeConfig { level_cap: 4 }));
    }

    #[test]
    fn duplicate_usernames_are_rejected() {
        let err = FleetConfig::parse(
            r"
accounts:
  - { username: ann, password: a }
  - { username: ann, password: b }
",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateAccount(name) if name == "ann"));
    }

    #[test]
    fn saved_file_loads_back() {
        let mut fleet = FleetConfig::default();
        fleet.accounts.push(AccountConfig {
            username: "ann".to_owned(),
            password: "pw".to_owned(),
            token: Some("t0k".to_owned()),
            config: BotConfig::default(),
        });
        let path = std::env::temp_dir().join(format!("roam-fleet-{}.yaml", std::process::id()));
        fleet.save(&path).unwrap();
        let loaded = FleetConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, fleet);
    }
}
