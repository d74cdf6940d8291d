//! Error types for the few fallible simulation surfaces.
//!
//! Everything that happens inside a running frame is infallible: invalid
//! actions (shooting at nothing, building on an occupied cell) are no-ops.
//! Only session start, session persistence and configuration loading can fail.

use crate::session::SessionPhase;
use thiserror::Error;

/// Errors surfaced by the simulation API.
#[derive(Debug, Error)]
pub enum SimError {
    /// Player name was rejected before any handshake was attempted.
    #[error("player name must be at least {min} characters")]
    InvalidPlayerName { min: usize },

    /// A session can only be started from the idle phase.
    #[error("cannot start a session while {from:?}")]
    InvalidTransition { from: SessionPhase },

    /// External registration/start handshake failed.
    #[error("session handshake failed: {0}")]
    Handshake(String),

    /// External persistence of the final summary failed.
    #[error("failed to persist session result: {0}")]
    Persist(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
