//! Configuration types for the fleet runner.
//!
//! Process settings come from environment variables. Accounts and per-bot
//! settings live in the fleet file (see [`roam_core::FleetConfig`]).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::RunnerError;

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the fleet file.
    pub accounts_file: PathBuf,
    /// Path to a catalog file. The built-in catalog is used when unset.
    pub catalog_file: Option<PathBuf>,
    /// HTTP transport settings shared by every agent.
    pub transport: TransportConfig,
}

/// Settings for the HTTP game client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Game server API base URL (e.g. `http://localhost:8088/api`).
    pub server_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `SERVER_URL` -- game server API base URL
    ///
    /// Optional variables:
    /// - `ACCOUNTS_FILE` -- path to the fleet file (default `accounts.yaml`)
    /// - `CATALOG_FILE` -- path to a catalog file (default: built-in catalog)
    /// - `REQUEST_TIMEOUT_MS` -- per-request timeout (default 10000)
    /// - `MAX_RETRIES` -- transport retries per request (default 100)
    /// - `RETRY_DELAY_MS` -- pause between retries (default 500)
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let server_url = lookup("SERVER_URL")
            .ok_or_else(|| RunnerError::Config("missing required env var SERVER_URL".to_owned()))?
            .trim_end_matches('/')
            .to_owned();

        let accounts_file =
            PathBuf::from(lookup("ACCOUNTS_FILE").unwrap_or_else(|| "accounts.yaml".to_owned()));
        let catalog_file = lookup("CATALOG_FILE").map(PathBuf::from);

        let request_timeout_ms: u64 = lookup("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "10000".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid REQUEST_TIMEOUT_MS: {e}")))?;

        let max_retries: u32 = lookup("MAX_RETRIES")
            .unwrap_or_else(|| "100".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid MAX_RETRIES: {e}")))?;

        let retry_delay_ms: u64 = lookup("RETRY_DELAY_MS")
            .unwrap_or_else(|| "500".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid RETRY_DELAY_MS: {e}")))?;

        Ok(Self {
            transport: TransportConfig {
                server_url,
                request_timeout: Duration::from_millis(request_timeout_ms),
                max_retries,
                retry_delay: Duration::from_millis(retry_delay_ms),
            },
            accounts_file,
            catalog_file,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config =
            RunnerConfig::from_lookup(lookup(&[("SERVER_URL", "http://game/api/")])).unwrap();
        assert_eq!(config.transport.server_url, "http://game/api");
        assert_eq!(config.accounts_file, PathBuf::from("accounts.yaml"));
        assert!(config.catalog_file.is_none());
        assert_eq!(config.transport.request_timeout, Duration::from_secs(10));
        assert_eq!(config.transport.max_retries, 100);
        assert_eq!(config.transport.retry_delay, Duration::from_millis(500));
    }

    #[test]
    fn server_url_is_required() {
        let err = RunnerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("SERVER_URL"));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = RunnerConfig::from_lookup(lookup(&[
            ("SERVER_URL", "http://game/api"),
            ("MAX_RETRIES", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MAX_RETRIES"));
    }

    #[test]
    fn overrides_apply() {
        let config = RunnerConfig::from_lookup(lookup(&[
            ("SERVER_URL", "http://game/api"),
            ("ACCOUNTS_FILE", "/etc/roam/fleet.yaml"),
            ("CATALOG_FILE", "/etc/roam/catalog.yaml"),
            ("REQUEST_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();
        assert_eq!(config.accounts_file, PathBuf::from("/etc/roam/fleet.yaml"));
        assert_eq!(
            config.catalog_file,
            Some(PathBuf::from("/etc/roam/catalog.yaml"))
        );
        assert_eq!(config.transport.request_timeout, Duration::from_millis(2500));
    }
}
