//! URL shortening, resolution and deletion service.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::deletion_request::DeletionRequest;
use crate::domain::deletion_worker::{DeletionSettings, run_deletion};
use crate::domain::entities::{BatchItem, Stats};
use crate::domain::error::StorageError;
use crate::domain::repositories::UrlRepository;
use crate::utils::code_generator::{CodeGenerator, GenerationError};

/// Attempts made before giving up on finding a free code.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Errors returned by [`ShortenerService`].
#[derive(Debug, thiserror::Error)]
pub enum ShortenError {
    #[error("failed to generate short code")]
    Generation(#[from] GenerationError),

    /// The URL was already shortened. `code` is the stored code.
    #[error("URL already shortened as {code}")]
    Duplicate {
        code: String,
        #[source]
        cause: StorageError,
    },

    #[error("short code not found: {0}")]
    NotFound(String),

    #[error("short code deleted: {0}")]
    Gone(String),

    #[error("no free short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error("{context}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },
}

impl ShortenError {
    fn storage(context: impl Into<String>, source: StorageError) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }
}

/// Orchestrates code generation against the configured storage backend.
///
/// Holds no per-request state. Concurrent shortening of the same URL is
/// resolved by the backend's uniqueness check: the loser gets
/// [`ShortenError::Duplicate`] carrying the winner's code.
#[derive(Clone)]
pub struct ShortenerService {
    repository: Arc<dyn UrlRepository>,
    generator: Arc<dyn CodeGenerator>,
    deletion: DeletionSettings,
}

impl ShortenerService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        generator: Arc<dyn CodeGenerator>,
        deletion: DeletionSettings,
    ) -> Self {
        Self {
            repository,
            generator,
            deletion,
        }
    }

    /// Shortens `original_url` on behalf of `owner_id`.
    ///
    /// # Errors
    ///
    /// - [`ShortenError::Duplicate`] with the existing code if the URL was
    ///   shortened before
    /// - [`ShortenError::Generation`] if the random source fails
    /// - [`ShortenError::CodeSpaceExhausted`] after [`MAX_CODE_ATTEMPTS`]
    ///   code collisions
    /// - [`ShortenError::Storage`] for any other backend failure
    pub async fn cut(&self, original_url: &str, owner_id: &str) -> Result<String, ShortenError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.generator.generate()?;

            match self.repository.add(original_url, &code, owner_id).await {
                Ok(()) => {
                    metrics::counter!("urls_shortened_total").increment(1);
                    tracing::info!(code = %code, owner_id, "URL shortened");
                    return Ok(code);
                }
                Err(StorageError::CodeCollision(_)) => {
                    metrics::counter!("code_collisions_total").increment(1);
                    tracing::warn!(attempt, code = %code, "Short code collision, regenerating");
                }
                Err(cause @ StorageError::UniqueViolation(_)) => {
                    return Err(self.recover_duplicate(original_url, cause).await);
                }
                Err(source) => {
                    return Err(ShortenError::storage(
                        format!("failed to store {original_url}"),
                        source,
                    ));
                }
            }
        }

        Err(ShortenError::CodeSpaceExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// Looks up the code of an URL that the backend reported as existing.
    async fn recover_duplicate(&self, original_url: &str, cause: StorageError) -> ShortenError {
        match self.repository.get_short_url(original_url).await {
            Ok(Some(code)) => {
                metrics::counter!("url_conflicts_total").increment(1);
                tracing::debug!(code = %code, "URL already shortened");
                ShortenError::Duplicate { code, cause }
            }
            Ok(None) => ShortenError::storage(
                format!("{cause}, but no stored code was found for it"),
                cause,
            ),
            Err(lookup) => ShortenError::storage(
                format!("{cause}, and looking up its code failed"),
                lookup,
            ),
        }
    }

    /// Resolves a code to its original URL.
    ///
    /// # Errors
    ///
    /// [`ShortenError::NotFound`] for unknown codes, [`ShortenError::Gone`]
    /// for deleted ones.
    pub async fn get_original_url(&self, short_code: &str) -> Result<String, ShortenError> {
        self.repository
            .get_original_url(short_code)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(code) => ShortenError::NotFound(code),
                StorageError::Gone(code) => ShortenError::Gone(code),
                other => ShortenError::storage(format!("failed to resolve {short_code}"), other),
            })
    }

    /// Shortens every item, reusing stored codes for known URLs.
    ///
    /// Known URLs come back with an empty `original_url`. The whole batch is
    /// regenerated and retried if a fresh code collides.
    ///
    /// # Errors
    ///
    /// Same as [`Self::cut`], except that duplicates are not errors.
    pub async fn upload_batch(
        &self,
        owner_id: &str,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchItem>, ShortenError> {
        if items.is_empty() {
            return Ok(items);
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let mut candidates = items.clone();
            for item in &mut candidates {
                item.short_code = self.generator.generate()?;
            }

            match self.repository.upload_batch(owner_id, candidates).await {
                Ok(results) => {
                    let created = results.iter().filter(|i| !i.original_url.is_empty()).count();
                    metrics::counter!("urls_shortened_total").increment(created as u64);
                    tracing::info!(
                        owner_id,
                        size = results.len(),
                        created,
                        "Batch shortened"
                    );
                    return Ok(results);
                }
                Err(StorageError::CodeCollision(code)) => {
                    metrics::counter!("code_collisions_total").increment(1);
                    tracing::warn!(attempt, code = %code, "Short code collision in batch, regenerating");
                }
                Err(source) => {
                    return Err(ShortenError::storage(
                        format!("failed to store batch of {}", items.len()),
                        source,
                    ));
                }
            }
        }

        Err(ShortenError::CodeSpaceExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    pub async fn get_user_urls(&self, owner_id: &str) -> Result<Vec<BatchItem>, ShortenError> {
        self.repository
            .get_user_urls(owner_id)
            .await
            .map_err(|e| ShortenError::storage(format!("failed to list URLs of {owner_id}"), e))
    }

    pub async fn stats(&self) -> Result<Stats, ShortenError> {
        self.repository
            .stats()
            .await
            .map_err(|e| ShortenError::storage("failed to read stats", e))
    }

    pub async fn ping(&self) -> Result<(), ShortenError> {
        self.repository
            .ping()
            .await
            .map_err(|e| ShortenError::storage("storage ping failed", e))
    }

    /// Starts soft-deleting `short_codes` owned by `owner_id` in the background.
    ///
    /// Returns immediately. The handle resolves once the deletion has finished
    /// or been cancelled; dropping it does not stop the work. Failures are
    /// logged by the pipeline and never reported here.
    pub fn delete_urls(&self, owner_id: &str, short_codes: Vec<String>) -> JoinHandle<()> {
        let request = DeletionRequest::new(owner_id, short_codes);
        tokio::spawn(run_deletion(
            self.repository.clone(),
            request,
            self.deletion,
        ))
    }
}
