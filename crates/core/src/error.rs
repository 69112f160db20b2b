//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic numbering failures (validation, corrupted
/// counter values). Storage concerns belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. padding out of range).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stored `next_number` could not be parsed as a non-negative integer.
    ///
    /// The allocator recovers from this locally; it is never surfaced to callers
    /// of `allocate`.
    #[error("invalid stored counter: {0}")]
    InvalidStoredCounter(String),

    /// A requested counter does not exist.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_stored_counter(msg: impl Into<String>) -> Self {
        Self::InvalidStoredCounter(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
