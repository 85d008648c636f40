//! Fleet runner entry point for Roam.
//!
//! The runner plays every account in the fleet file at once. Each account
//! gets its own tokio task running the decide-act loop against the game
//! server over HTTP.
//!
//! # Architecture
//!
//! ```text
//! fleet file --> login / init --> Agent (engine + state) --> HTTP game client
//!                                    ^                              |
//!                                    +---------- response ----------+
//! ```
//!
//! Agents share only the fleet registry: a fleet-fatal error in one of them
//! stops all of them.

mod config;
mod error;
mod http;
mod runner;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RunnerConfig;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// then runs the fleet until every agent has stopped.
///
/// # Errors
///
/// Returns an error if configuration is invalid, loading fails, or the
/// fleet was halted.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("roam-runner starting");

    let config = RunnerConfig::from_env()?;
    info!(
        server_url = %config.transport.server_url,
        accounts_file = %config.accounts_file.display(),
        catalog_file = ?config.catalog_file,
        max_retries = config.transport.max_retries,
        request_timeout_ms = config.transport.request_timeout.as_millis(),
        "configuration loaded"
    );

    runner::run(config).await?;
    Ok(())
}
