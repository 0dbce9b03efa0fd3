//! Elimination engine error types.
//!
//! # Error Classification
//!
//! Only configuration errors are fatal to a season. Everything that can go
//! wrong once rounds are running is recovered locally:
//!
//! - **Provider failures** (generation/judging errors and timeouts) become
//!   sentinel responses or the deterministic judging fallback.
//! - **Insufficient funds** and **invalid targets** surface as
//!   [`EconomyError`] values and leave state untouched.
//! - **Persistence failures** are logged and the season continues.

use thiserror::Error;

use crate::participant::ParticipantId;

/// Season-level errors.
#[derive(Error, Debug)]
pub enum SeasonError {
    /// Invalid configuration (fatal at season start).
    #[error("Config error: {0}")]
    Config(String),

    /// The roster has no participants.
    #[error("Roster is empty")]
    EmptyRoster,

    /// Two roster entries share a name.
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),

    /// A participant id is not on the roster.
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// Generation or judging backend error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Network communication error.
    #[error("Network error: {0}")]
    Network(String),

    /// Round record could not be persisted.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for season operations
pub type Result<T> = std::result::Result<T, SeasonError>;

impl From<reqwest::Error> for SeasonError {
    fn from(err: reqwest::Error) -> Self {
        SeasonError::Network(err.to_string())
    }
}

impl From<toml::de::Error> for SeasonError {
    fn from(err: toml::de::Error) -> Self {
        SeasonError::Config(err.to_string())
    }
}

/// Token economy errors.
///
/// Every variant means the operation was rejected before any state changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// The payer cannot cover the amount.
    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Tokens required.
        needed: i64,
        /// Tokens held.
        available: i64,
    },

    /// The participant is eliminated and cannot take part.
    #[error("Participant eliminated: {0}")]
    Eliminated(ParticipantId),

    /// Resurrection target is still alive.
    #[error("Participant not eliminated: {0}")]
    NotEliminated(ParticipantId),

    /// The participant is not on the roster.
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// Amount must be positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Payer and payee are the same participant.
    #[error("Participant cannot target itself: {0}")]
    SelfTarget(ParticipantId),

    /// Loan terms out of range.
    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),
}
