use crate::session::Phase;
use schema::CatalogKey;
use thiserror::Error;

/// Errors raised by a catalog lookup. The engine never lets these reach the
/// session: every call site substitutes a fallback or skips the enhancement.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("catalog request for {resource} {key} failed: {source}")]
    Http {
        resource: &'static str,
        key: CatalogKey,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status
    #[error("catalog returned status {status} for {resource} {key}")]
    Status {
        resource: &'static str,
        key: CatalogKey,
        status: u16,
    },
    /// The record does not exist in the catalog
    #[error("{resource} {key} not found in catalog")]
    NotFound {
        resource: &'static str,
        key: CatalogKey,
    },
    /// The response body did not match the expected record shape
    #[error("malformed {resource} record for {key}: {details}")]
    Malformed {
        resource: &'static str,
        key: CatalogKey,
        details: String,
    },
}

/// Errors at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors while loading the RON configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// A transition was requested that the current session cannot accept.
/// The session is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The transition is not legal from the current phase
    #[error("action '{action}' is not available in phase {phase}")]
    WrongPhase { action: &'static str, phase: Phase },
    /// No active combatant is present
    #[error("no active combatant")]
    NoActiveCombatant,
    /// No opponent is present in the battle
    #[error("no opponent in battle")]
    NoOpponent,
    /// It is not the player's turn to choose a move
    #[error("not waiting for a move choice")]
    NotPlayerTurn,
    /// Move index is out of bounds
    #[error("invalid move index: {0}")]
    InvalidMoveIndex(usize),
    /// Lineage index is out of bounds
    #[error("invalid lineage index: {0}")]
    InvalidLineage(usize),
    /// The creature is not offered in the current selection
    #[error("creature {0} is not available to choose")]
    UnavailableCreature(u32),
    /// No evolution is waiting for confirmation
    #[error("no evolution pending")]
    NoPendingEvolution,
    /// The chosen creature's record could not be fetched
    #[error("creature {0} could not be loaded from the catalog")]
    CreatureUnavailable(u32),
    /// Capture preconditions were not met
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Capture preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("no capture items left")]
    NoItems,
    #[error("no defeated opponent to capture")]
    NoTarget,
}

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Type alias for Results using StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for Results using ActionError
pub type ActionResult<T> = Result<T, ActionError>;
