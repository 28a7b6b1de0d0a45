//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown threshold: {0}. Valid: all, majority, twothirds, fourfifths")]
    UnknownThreshold(String),

    #[error("Unknown reaction: {0}")]
    UnknownReaction(String),
}
