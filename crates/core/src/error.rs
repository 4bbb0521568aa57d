//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only. Storage failures live in the infra
/// layer and wrap this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was missing or empty.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A ball event tag that the catalog does not know.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced scoreboard does not exist.
    #[error("scoreboard not found: {0}")]
    AggregateNotFound(String),

    /// A referenced player is not on the scoreboard.
    #[error("player not found: {0}")]
    PlayerNotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_event_type(tag: impl Into<String>) -> Self {
        Self::UnknownEventType(tag.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn aggregate_not_found(id: impl core::fmt::Display) -> Self {
        Self::AggregateNotFound(id.to_string())
    }

    pub fn player_not_found(name: impl Into<String>) -> Self {
        Self::PlayerNotFound(name.into())
    }
}
