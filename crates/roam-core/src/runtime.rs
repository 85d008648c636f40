//! The per-agent decide-act loop.
//!
//! An [`Agent`] owns one account's state and client. Each tick it asks the
//! engine for a [`Decision`], applies the decision's effects, issues the
//! action, and merges whatever the server answers. Pacing sleeps follow the
//! player's move and attack speed bonuses.
//!
//! An agent stops when its destroyed flag is set or the fleet halts. Errors
//! that mean the catalog or the account can no longer be trusted halt the
//! whole fleet; everything else only drops the failing agent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use roam_agents::{
    AgentState, DataFault, Effect, FaultPolicy, ShopContext, audit_loot, audit_shop, merge,
    plan_recovery_top_up, plan_restock,
};
use roam_types::{GameResponse, MapUnit, ShopInfo};
use roam_world::{Catalog, MapInfo, TransitionEdge};
use tracing::{debug, error, info, warn};

use crate::client::{ClientError, GameClient};
use crate::config::{BotConfig, ResupplyStrategy};
use crate::decision::{Action, Decision, DecisionError, TalkPurpose};
use crate::engine::{decide, eligible_maps};
use crate::fleet::Fleet;

/// Pacing base in seconds, scaled down by the player's speed bonuses.
const BASE_PACE_SECS: f64 = 0.65;

/// Pause after using an item.
const CONSUME_PAUSE: Duration = Duration::from_millis(300);

/// Pause around each half of the upgrade exchange.
const UPGRADE_PAUSE: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an agent stopped.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The client gave up on a request.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The engine could not decide.
    #[error(transparent)]
    Decision(#[from] DecisionError),

    /// A data fault that the fault policy treats as fatal.
    #[error("data fault: {0}")]
    Data(Box<DataFault>),

    /// The server narrated this agent's death.
    #[error("agent {username} died")]
    Died {
        /// The dead account.
        username: String,
    },

    /// The session belongs to another account.
    #[error("session belongs to {actual}, expected {expected}")]
    UsernameMismatch {
        /// Configured username.
        expected: String,
        /// Username the server reported.
        actual: String,
    },

    /// Talking to a shop keeper returned no shop.
    #[error("shop keeper {npc} returned no shop")]
    ShopUnavailable {
        /// Shop keeper name.
        npc: String,
    },

    /// The session snapshot came back empty.
    #[error("empty session snapshot")]
    EmptySnapshot,
}

impl From<DataFault> for AgentError {
    fn from(fault: DataFault) -> Self {
        Self::Data(Box::new(fault))
    }
}

impl AgentError {
    /// Whether this error must stop every agent, not just this one.
    ///
    /// A death, a fatal data fault, or an unreachable map all mean the
    /// shared catalog is wrong for every agent.
    pub const fn halts_fleet(&self) -> bool {
        matches!(
            self,
            Self::Died { .. } | Self::Data(_) | Self::Decision(DecisionError::NoPath { .. })
        )
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Shared, read-only inputs every agent of a fleet runs with.
#[derive(Debug, Clone)]
pub struct FleetContext {
    /// Static game knowledge.
    pub catalog: Arc<Catalog>,
    /// The fleet registry.
    pub fleet: Arc<Fleet>,
    /// How data faults are handled.
    pub fault_policy: FaultPolicy,
}

/// One account's running bot.
pub struct Agent<C> {
    client: C,
    state: AgentState,
    config: BotConfig,
    catalog: Arc<Catalog>,
    fleet: Arc<Fleet>,
    fault_policy: FaultPolicy,
    destroyed: Arc<AtomicBool>,
    rng: StdRng,
}

impl<C: GameClient> Agent<C> {
    /// A new agent for `username`. Call [`init`](Self::init) before
    /// [`run`](Self::run).
    ///
    /// `destroyed` is the flag the fleet handed out when the agent was
    /// registered.
    pub fn new(
        client: C,
        username: &str,
        config: BotConfig,
        ctx: FleetContext,
        destroyed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            client,
            state: AgentState::new(username, Utc::now()),
            config,
            catalog: ctx.catalog,
            fleet: ctx.fleet,
            fault_policy: ctx.fault_policy,
            destroyed,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the random source, for reproducible runs.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// The agent's current view of its session.
    pub const fn state(&self) -> &AgentState {
        &self.state
    }

    /// Mutable access to the session view.
    pub const fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    /// The agent's client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    fn name(&self) -> &str {
        &self.state.username
    }

    fn stopped(&self) -> bool {
        self.destroyed.load(Ordering::Acquire) || self.fleet.is_halted()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Pull the first snapshot and check it belongs to this account.
    ///
    /// # Errors
    ///
    /// Client failures, fatal data faults, an empty snapshot, or a session
    /// owned by another account.
    pub async fn init(&mut self) -> Result<(), AgentError> {
        let response = self.client.init().await?.ok_or(AgentError::EmptySnapshot)?;
        self.absorb(Some(&response))?;
        if self.state.player.username != self.state.username {
            return Err(AgentError::UsernameMismatch {
                expected: self.state.username.clone(),
                actual: self.state.player.username.clone(),
            });
        }
        info!(
            agent = %self.name(),
            level = self.state.player.lv,
            gold = self.state.player.gold,
            map = %self.state.pos.name,
            "agent initialized"
        );
        Ok(())
    }

    /// Tick until stopped, then report the outcome to the fleet.
    ///
    /// A destroyed flag ends the loop cleanly. A fleet-fatal error halts
    /// every agent; any other error removes only this one.
    ///
    /// # Errors
    ///
    /// The error that stopped the agent.
    pub async fn run(mut self) -> Result<(), AgentError> {
        let outcome = loop {
            if self.stopped() {
                break Ok(());
            }
            match self.tick().await {
                Ok(()) => {}
                Err(AgentError::Client(ClientError::Destroyed)) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        let username = self.state.username.clone();
        match &outcome {
            Ok(()) => info!(agent = %username, "agent stopped"),
            Err(e) if e.halts_fleet() => self.fleet.halt_all(&username, e).await,
            Err(e) => {
                error!(agent = %username, error = %e, "agent failed");
                self.fleet.remove(&username).await;
            }
        }
        outcome
    }

    /// Decide, apply effects, act.
    ///
    /// # Errors
    ///
    /// See [`AgentError`].
    pub async fn tick(&mut self) -> Result<(), AgentError> {
        let decision = decide(
            &self.state,
            &self.catalog,
            &self.config,
            Utc::now(),
            &mut self.rng,
        )?;
        self.log_decision(&decision);

        let Decision {
            action,
            effects,
            settle,
            ..
        } = decision;
        self.state.apply_all(effects);
        self.execute(action).await?;
        self.state.apply_all(settle);
        Ok(())
    }

    fn log_decision(&self, decision: &Decision) {
        if self.config.debug {
            debug!(
                agent = %self.name(),
                intent = %decision.intent,
                action = %decision.action,
                effects = ?decision.effects,
                "decision"
            );
        } else if self.config.log && !matches!(decision.action, Action::Wait(_) | Action::Move(_)) {
            info!(
                agent = %self.name(),
                intent = %decision.intent,
                action = %decision.action,
                "decision"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    async fn execute(&mut self, action: Action) -> Result<(), AgentError> {
        match action {
            Action::Wait(delay) => tokio::time::sleep(delay).await,
            Action::Move(p) => {
                let response = self.client.go(p.x, p.y).await?;
                self.absorb(response.as_ref())?;
                tokio::time::sleep(pace(self.state.player.move_speed)).await;
            }
            Action::Attack { unit } => {
                let response = self.hey(&unit).await?;
                self.audit_narrated_loot(response.as_ref(), &unit)?;
                tokio::time::sleep(pace(self.state.player.attack_speed)).await;
            }
            Action::Talk { unit, purpose } => {
                let response = self.hey(&unit).await?;
                tokio::time::sleep(pace(self.state.player.attack_speed)).await;
                self.follow_up(&unit, purpose, response).await?;
            }
            Action::UseItem { id, name, all } => {
                let response = self.client.use_goods(&id, all).await?;
                self.absorb(response.as_ref())?;
                debug!(agent = %self.name(), item = %name, all, "used item");
                tokio::time::sleep(CONSUME_PAUSE).await;
            }
            Action::Equip { id, name } => {
                let response = self.client.equip(id).await?;
                self.absorb(response.as_ref())?;
                info!(agent = %self.name(), item = %name, "equipped");
            }
            Action::Sell { id, name } => {
                let response = self.client.sell(id).await?;
                self.absorb(response.as_ref())?;
                info!(agent = %self.name(), item = %name, "sold");
            }
            Action::Refresh => {
                let response = self.client.init().await?;
                self.absorb(response.as_ref())?;
            }
            Action::Upgrade => {
                let response = self.client.upgrade().await?;
                self.absorb(response.as_ref())?;
                tokio::time::sleep(UPGRADE_PAUSE).await;
                let response = self.client.confirm_upgrade().await?;
                self.absorb(response.as_ref())?;
                tokio::time::sleep(UPGRADE_PAUSE).await;
                info!(agent = %self.name(), "special meter upgraded");
            }
        }
        Ok(())
    }

    async fn hey(&mut self, unit: &MapUnit) -> Result<Option<GameResponse>, AgentError> {
        let response = self
            .client
            .hey(&unit.id, &self.config.skill_id, unit.x, unit.y)
            .await?;
        self.absorb(response.as_ref())?;
        Ok(response)
    }

    /// Handle what a talk brought back.
    async fn follow_up(
        &mut self,
        unit: &MapUnit,
        purpose: TalkPurpose,
        response: Option<GameResponse>,
    ) -> Result<(), AgentError> {
        let response = response.unwrap_or_default();
        match purpose {
            TalkPurpose::Quest { id, once } => {
                self.confirm(&response).await?;
                if once {
                    self.state.apply(Effect::CompleteQuest(id.clone()));
                }
                info!(agent = %self.name(), quest = %id, npc = %unit.name, "quest handed in");
                Ok(())
            }
            TalkPurpose::Transition(edge) => {
                self.confirm(&response).await?;
                self.check_arrival(&edge)
            }
            TalkPurpose::Shop => match response.shop {
                Some(shop) => self.shop(shop).await,
                None => Err(AgentError::ShopUnavailable {
                    npc: unit.name.clone(),
                }),
            },
        }
    }

    /// Answer a pending dialog through the task endpoint.
    async fn confirm(&mut self, response: &GameResponse) -> Result<(), AgentError> {
        let Some(dialog) = &response.confirm else {
            return Ok(());
        };
        debug!(agent = %self.name(), title = %dialog.title, "confirming dialog");
        let answer = self.client.task(&dialog.npc, &dialog.tid).await?;
        self.absorb(answer.as_ref())
    }

    fn check_arrival(&self, edge: &TransitionEdge) -> Result<(), AgentError> {
        let actual = &self.state.pos.name;
        if *actual == edge.to_map || *actual == edge.map {
            return Ok(());
        }
        self.handle_faults(vec![DataFault::MisroutedTransition {
            gate: edge.gate_ref(),
            from: edge.map.clone(),
            to: edge.to_map.clone(),
            actual: actual.clone(),
        }])
    }

    async fn shop(&mut self, shop: ShopInfo) -> Result<(), AgentError> {
        self.handle_faults(audit_shop(&shop.goods, &self.catalog))?;

        let ctx = ShopContext {
            catalog: &self.catalog,
            listings: &shop.goods,
            goods: &self.state.goods,
            player: &self.state.player,
        };
        let plan = match (self.config.resupply_strategy, self.recovery_target()) {
            (ResupplyStrategy::Recovery, Some(map)) => plan_recovery_top_up(&ctx, map),
            _ => plan_restock(&ctx, self.config.max_buy_count),
        };
        if plan.is_empty() {
            info!(agent = %self.name(), shop = %shop.name, "nothing to buy");
            return Ok(());
        }

        info!(
            agent = %self.name(),
            shop = %shop.name,
            lines = plan.lines.len(),
            cost = plan.cost,
            "buying supplies"
        );
        let response = self.client.buy(&shop.npc, &shop.shop_id, &plan.lines).await?;
        self.absorb(response.as_ref())
    }

    /// The map whose recovery targets a top-up aims for.
    fn recovery_target(&self) -> Option<&MapInfo> {
        let catalog = self.catalog.as_ref();
        self.state
            .memory
            .farm_map
            .as_deref()
            .or_else(|| self.config.map_name.as_deref())
            .and_then(|name| catalog.map(name))
            .or_else(|| eligible_maps(catalog, &self.state.player).first().copied())
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Merge a response and apply the fault policy to what it reveals.
    ///
    /// Death narration ends the agent whichever request it answered.
    fn absorb(&mut self, response: Option<&GameResponse>) -> Result<(), AgentError> {
        let Some(response) = response else {
            return Ok(());
        };
        self.narrate(response);
        if response
            .normal_news
            .as_deref()
            .is_some_and(|text| self.catalog.narration().is_death(text))
        {
            return Err(AgentError::Died {
                username: self.state.username.clone(),
            });
        }
        let faults = merge(&mut self.state, response, &self.catalog);
        self.handle_faults(faults)
    }

    fn handle_faults(&self, faults: Vec<DataFault>) -> Result<(), AgentError> {
        for fault in faults {
            if self.fault_policy.is_fatal(&fault) {
                return Err(fault.into());
            }
            warn!(agent = %self.name(), fault = %fault, "data fault");
        }
        Ok(())
    }

    fn narrate(&self, response: &GameResponse) {
        if !self.config.log {
            return;
        }
        if let Some(news) = &response.normal_news {
            info!(agent = %self.name(), "{news}");
        }
        if let Some(news) = &response.goods_news {
            info!(agent = %self.name(), "{news}");
        }
        if let Some(drops) = &response.temp_drop_msg {
            info!(agent = %self.name(), drops = ?drops, "loot");
        }
    }

    /// Check loot narrated after an attack against the target's drop table.
    fn audit_narrated_loot(
        &self,
        response: Option<&GameResponse>,
        target: &MapUnit,
    ) -> Result<(), AgentError> {
        let Some(text) = response.and_then(|r| r.normal_news.as_deref()) else {
            return Ok(());
        };
        if let (Some(items), Some(monster)) = (
            self.catalog.narration().loot(text),
            self.catalog.monster(&target.name),
        ) {
            self.handle_faults(audit_loot(monster, items))?;
        }
        Ok(())
    }
}

/// Sleep after an action, shortened by a speed bonus in `[0, 1)`.
fn pace(bonus: f64) -> Duration {
    let factor = if bonus.is_finite() {
        (1.0 - bonus).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Duration::from_secs_f64(BASE_PACE_SECS * factor)
}
