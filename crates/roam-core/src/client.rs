//! The seam between the runtime and the game server.
//!
//! Every call returns the server's partial-update body, if any. Transport
//! retries live behind this trait; the runtime only sees what survives them.

use std::future::Future;

use roam_types::{GameResponse, PurchaseLine};

/// Result of one game call.
pub type ClientResult = Result<Option<GameResponse>, ClientError>;

/// Errors surfaced by a [`GameClient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request kept failing until retries ran out.
    #[error("transport failed after retries: {message}")]
    Transport {
        /// Last underlying error.
        message: String,
    },

    /// The server answered with a negative status.
    #[error("server rejected request (status {status}): {message}")]
    Protocol {
        /// Envelope status.
        status: i64,
        /// Envelope message, or empty.
        message: String,
    },

    /// The body could not be decoded.
    #[error("undecodable response: {message}")]
    Decode {
        /// Decoder error.
        message: String,
    },

    /// The agent was stopped; no further requests are sent.
    #[error("agent destroyed")]
    Destroyed,
}

/// Game server operations used by one agent.
///
/// Implementations must check the agent's destroyed flag before every
/// request and return [`ClientError::Destroyed`] once it is set.
pub trait GameClient: Send + Sync {
    /// Full session snapshot.
    fn init(&self) -> impl Future<Output = ClientResult> + Send;

    /// Attack or talk to a unit with a skill.
    fn hey(&self, unit_id: &str, skill_id: &str, x: i64, y: i64)
    -> impl Future<Output = ClientResult> + Send;

    /// Step to a tile.
    fn go(&self, x: i64, y: i64) -> impl Future<Output = ClientResult> + Send;

    /// Confirm a dialog task.
    fn task(&self, npc: &str, tid: &str) -> impl Future<Output = ClientResult> + Send;

    /// Use a goods item, optionally the whole stack.
    fn use_goods(&self, id: &str, all: bool) -> impl Future<Output = ClientResult> + Send;

    /// Wear an equipment instance.
    fn equip(&self, id: u64) -> impl Future<Output = ClientResult> + Send;

    /// Sell an equipment instance.
    fn sell(&self, id: u64) -> impl Future<Output = ClientResult> + Send;

    /// Buy from a shop.
    fn buy(
        &self,
        npc: &str,
        shop_id: &str,
        lines: &[PurchaseLine],
    ) -> impl Future<Output = ClientResult> + Send;

    /// Start the special-meter upgrade.
    fn upgrade(&self) -> impl Future<Output = ClientResult> + Send;

    /// Confirm the special-meter upgrade.
    fn confirm_upgrade(&self) -> impl Future<Output = ClientResult> + Send;
}
