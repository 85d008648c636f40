//! Error types for the fleet runner.
//!
//! Uses `thiserror` for typed errors covering environment configuration,
//! loading the catalog and fleet file, logging in, and starting agents.

use roam_core::{AgentError, ConfigError};
use roam_world::CatalogError;

/// Errors that can occur while starting or running the fleet.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(String),

    /// The catalog file could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The fleet file could not be loaded or saved.
    #[error("fleet file error: {0}")]
    Accounts(#[from] ConfigError),

    /// Logging in failed.
    #[error("login failed for {username}: {message}")]
    Login {
        /// Account that failed.
        username: String,
        /// What went wrong.
        message: String,
    },

    /// An agent could not start, even after logging in again.
    #[error("agent {username} failed to start: {source}")]
    Agent {
        /// Account that failed.
        username: String,
        /// The startup error.
        source: AgentError,
    },

    /// The fleet was halted by a fleet-fatal error.
    #[error("fleet halted")]
    Halted,
}
