//! Storage backend contract for URL mappings.

use crate::domain::entities::{BatchItem, Stats};
use crate::domain::error::StorageResult;
use async_trait::async_trait;

/// Storage backend shared by the shortening service and the deletion pipeline.
///
/// All implementations report the same [`crate::domain::error::StorageError`]
/// classifications, so conflict handling never depends on the backend.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - in-process maps
/// - [`crate::infrastructure::persistence::FileUrlRepository`] - maps plus an append-only JSON log
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Looks up the code assigned to `original_url`.
    ///
    /// Returns `Ok(None)` when absent. Soft-deleted records are still found.
    async fn get_short_url(&self, original_url: &str) -> StorageResult<Option<String>>;

    /// Inserts a new mapping.
    ///
    /// # Errors
    ///
    /// - [`StorageError::UniqueViolation`](crate::domain::error::StorageError::UniqueViolation)
    ///   if `original_url` already exists
    /// - [`StorageError::CodeCollision`](crate::domain::error::StorageError::CodeCollision)
    ///   if `short_code` is taken
    async fn add(&self, original_url: &str, short_code: &str, owner_id: &str)
    -> StorageResult<()>;

    /// Resolves a code to its original URL.
    ///
    /// # Errors
    ///
    /// `NotFound` when the code is unknown, `Gone` when it was soft-deleted.
    async fn get_original_url(&self, short_code: &str) -> StorageResult<String>;

    /// Inserts every item that does not exist yet, as one unit.
    ///
    /// Items arrive with a candidate `short_code`. Items whose `original_url`
    /// already exists come back with the stored code and an empty
    /// `original_url`. Any other failure leaves the backend unchanged.
    async fn upload_batch(
        &self,
        owner_id: &str,
        items: Vec<BatchItem>,
    ) -> StorageResult<Vec<BatchItem>>;

    /// Lists the live records owned by `owner_id`, oldest first.
    async fn get_user_urls(&self, owner_id: &str) -> StorageResult<Vec<BatchItem>>;

    /// Soft-deletes the given codes that belong to `owner_id`.
    ///
    /// Codes that are unknown, owned by someone else or already deleted are
    /// skipped. Affecting zero records is not an error.
    async fn delete_urls(&self, owner_id: &str, short_codes: &[String]) -> StorageResult<()>;

    async fn stats(&self) -> StorageResult<Stats>;

    /// Liveness check.
    async fn ping(&self) -> StorageResult<()>;

    /// Short human-readable backend name for logs.
    fn backend_name(&self) -> &'static str;
}
