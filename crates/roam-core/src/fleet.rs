//! The fleet registry and its kill switch.
//!
//! Each running agent registers its username and receives a shared
//! destroyed flag. The flag is checked by the transport before every
//! request and by the runtime loop before every tick. Dropping one agent
//! sets only its flag; [`Fleet::halt_all`] sets every flag at once.
//!
//! Agents share nothing else.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};
use tracing::{error, info};

/// Shared registry of running agents.
#[derive(Debug, Default)]
pub struct Fleet {
    /// Destroyed flags by username.
    agents: Mutex<BTreeMap<String, Arc<AtomicBool>>>,

    /// Set once by [`halt_all`](Self::halt_all); never cleared.
    halted: AtomicBool,

    /// Wakes [`wait_halted`](Self::wait_halted) callers.
    halt_notify: Notify,
}

impl Fleet {
    /// An empty fleet.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Register an agent and return its destroyed flag.
    ///
    /// On a halted fleet the flag comes back already set. Registering a
    /// username twice replaces the old entry and stops the old agent.
    pub async fn register(&self, username: &str) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(self.is_halted()));
        let previous = self
            .agents
            .lock()
            .await
            .insert(username.to_owned(), Arc::clone(&flag));
        if let Some(old) = previous {
            old.store(true, Ordering::Release);
        }
        flag
    }

    /// Stop one agent and drop it from the registry.
    pub async fn remove(&self, username: &str) {
        if let Some(flag) = self.agents.lock().await.remove(username) {
            flag.store(true, Ordering::Release);
            info!(agent = username, "agent removed from fleet");
        }
    }

    /// Number of registered agents.
    pub async fn len(&self) -> usize {
        self.agents.lock().await.len()
    }

    /// Whether no agent is registered.
    pub async fn is_empty(&self) -> bool {
        self.agents.lock().await.is_empty()
    }

    // -----------------------------------------------------------------------
    // Halt
    // -----------------------------------------------------------------------

    /// Stop every agent. Always logged at `error`.
    pub async fn halt_all(&self, origin: &str, reason: &(dyn Display + Sync)) {
        let mut agents = self.agents.lock().await;
        error!(
            origin,
            reason = %reason,
            agents = agents.len(),
            "halting the whole fleet"
        );
        for flag in agents.values() {
            flag.store(true, Ordering::Release);
        }
        agents.clear();
        self.halted.store(true, Ordering::Release);
        self.halt_notify.notify_waiters();
    }

    /// Whether the fleet was halted.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Wait until the fleet is halted. Returns at once if it already is.
    pub async fn wait_halted(&self) {
        loop {
            let notified = self.halt_notify.notified();
            if self.is_halted() {
                return;
            }
            notified.await;
        }
    }
}
