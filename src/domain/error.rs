//! Backend-agnostic storage error classification.
//!
//! Every backend maps its native failures onto [`StorageError`] so callers can
//! branch on the kind of failure without knowing which backend produced it.

/// Errors reported by a [`crate::domain::repositories::UrlRepository`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    /// The original URL already has a record.
    #[error("original URL already exists: {0}")]
    UniqueViolation(String),

    /// The generated short code is already taken by another record.
    #[error("short code already exists: {0}")]
    CodeCollision(String),

    #[error("short code not found: {0}")]
    NotFound(String),

    /// The record exists but has been soft-deleted.
    #[error("short code deleted: {0}")]
    Gone(String),

    #[error("storage operation timed out: {0}")]
    Timeout(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage query failed: {0}")]
    Query(String),

    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
