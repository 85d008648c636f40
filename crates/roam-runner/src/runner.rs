//! Fleet startup and supervision.
//!
//! Loads the catalog and the fleet file, brings every account online (logging
//! in again when a stored token is rejected), spawns one task per agent, and
//! waits for all of them. Refreshed tokens are written back to the fleet
//! file.

use std::sync::Arc;

use roam_core::{AccountConfig, Agent, Fleet, FleetConfig, FleetContext};
use roam_world::Catalog;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::{RunnerConfig, TransportConfig};
use crate::error::RunnerError;
use crate::http::{HttpGameClient, build_http, login};

/// Run the whole fleet until every agent has stopped.
///
/// # Errors
///
/// Loading failures, and [`RunnerError::Halted`] when a fleet-fatal error
/// stopped the agents.
pub async fn run(config: RunnerConfig) -> Result<(), RunnerError> {
    let catalog = match &config.catalog_file {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::builtin()?,
    };
    info!(
        monsters = catalog.monsters().len(),
        items = catalog.items().len(),
        maps = catalog.maps().len(),
        quests = catalog.quests().len(),
        "catalog loaded"
    );

    let mut fleet_file = FleetConfig::from_file(&config.accounts_file)?;
    info!(
        accounts = fleet_file.accounts.len(),
        fault_policy = ?fleet_file.fault_policy,
        "fleet file loaded"
    );

    let http = build_http(&config.transport)?;
    let fleet = Arc::new(Fleet::new());
    let ctx = FleetContext {
        catalog: Arc::new(catalog),
        fleet: Arc::clone(&fleet),
        fault_policy: fleet_file.fault_policy,
    };

    let mut tasks = JoinSet::new();
    let mut tokens_refreshed = false;
    for account in &mut fleet_file.accounts {
        info!(agent = %account.username, "bringing agent online");
        match start_agent(&http, &config.transport, account, &ctx).await {
            Ok((agent, refreshed)) => {
                tokens_refreshed |= refreshed;
                tasks.spawn(agent.run());
            }
            Err(RunnerError::Agent { username, source }) if source.halts_fleet() => {
                fleet.halt_all(&username, &source).await;
                break;
            }
            Err(e) => {
                error!(agent = %account.username, error = %e, "agent failed to start");
                fleet.remove(&account.username).await;
            }
        }
    }

    if tokens_refreshed {
        fleet_file.save(&config.accounts_file)?;
        info!(path = %config.accounts_file.display(), "refreshed tokens saved");
    }

    info!(agents = tasks.len(), "fleet running");
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "agent task aborted");
        }
    }

    if fleet.is_halted() {
        return Err(RunnerError::Halted);
    }
    info!("all agents stopped");
    Ok(())
}

/// Register and initialize one agent.
///
/// A stored token is tried first. When it is missing or the first snapshot
/// fails, the account logs in once and the new token is stored on
/// `account`. Returns the agent and whether the token changed.
async fn start_agent(
    http: &reqwest::Client,
    transport: &TransportConfig,
    account: &mut AccountConfig,
    ctx: &FleetContext,
) -> Result<(Agent<HttpGameClient>, bool), RunnerError> {
    let destroyed = ctx.fleet.register(&account.username).await;
    let build = |token: &str| {
        let client = HttpGameClient::new(
            http.clone(),
            transport.clone(),
            &account.username,
            token,
            account.config.debug,
            Arc::clone(&destroyed),
        );
        Agent::new(
            client,
            &account.username,
            account.config.clone(),
            ctx.clone(),
            Arc::clone(&destroyed),
        )
    };

    if let Some(token) = account.token.as_deref().filter(|t| !t.is_empty()) {
        let mut agent = build(token);
        match agent.init().await {
            Ok(()) => return Ok((agent, false)),
            Err(e) if e.halts_fleet() => {
                return Err(RunnerError::Agent {
                    username: account.username.clone(),
                    source: e,
                });
            }
            Err(e) => warn!(
                agent = %account.username,
                error = %e,
                "stored token rejected, logging in"
            ),
        }
    }

    let token = login(http, transport, &account.username, &account.password).await?;
    let mut agent = build(&token);
    agent.init().await.map_err(|source| RunnerError::Agent {
        username: account.username.clone(),
        source,
    })?;
    account.token = Some(token);
    Ok((agent, true))
}
