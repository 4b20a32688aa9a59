//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Bookslot
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BookslotError {
    /// Malformed request: unknown appointment type, slot/duration mismatch,
    /// missing contact fields. Never retried automatically.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The chosen slot is no longer free at commit time. The caller must
    /// re-query availability.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// OAuth state invalid/expired, or insufficient role for the operation.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// External calendar provider failure. Always non-fatal to the booking
    /// domain; calendar state is left eventually-consistent.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Bookslot operations
pub type Result<T> = std::result::Result<T, BookslotError>;

impl BookslotError {
    /// Whether the error indicates a booking-time slot conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BookslotError::Conflict(_))
    }
}
