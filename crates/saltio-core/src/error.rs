// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Saltio facility core.

use thiserror::Error;

/// The primary error type used across all Saltio controllers and adapter traits.
#[derive(Debug, Error)]
pub enum SaltioError {
    /// Caller-supplied input violates a precondition (negative amount, empty
    /// payment list, notes required). Recoverable by correcting the input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation is not legal in the entity's current state (double pause,
    /// double close, finishing a finished session).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Violates a uniqueness or ownership invariant (opening a second till
    /// for the same operator).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A till close was blocked by items still attached to the drawer.
    ///
    /// This is an expected, recoverable outcome: the caller is meant to
    /// present a transfer choice and re-invoke close, not treat it as fatal.
    #[error("till has pending items: {open_orders} open order(s), {active_sessions} active session(s)")]
    PendingItems { open_orders: u32, active_sessions: u32 },

    /// Persisted duration text that matches neither accepted grammar.
    ///
    /// Read paths treat this as zero (fail-soft) and log it; see
    /// [`crate::duration::parse_or_zero`].
    #[error("malformed duration text: {text:?}")]
    MalformedDuration { text: String },

    /// A referenced entity does not exist in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
