//! PostgreSQL implementation of the URL repository.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::{BatchItem, Stats};
use crate::domain::error::{StorageError, StorageResult};
use crate::domain::repositories::UrlRepository;

const BACKEND_NAME: &str = "postgres";

/// Default upper bound for a single repository call.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

const SHORT_URL_CONSTRAINT: &str = "urls_short_url_key";

/// PostgreSQL repository backed by the `urls` table.
///
/// Every public call is bounded by `timeout`. Uniqueness conflicts are
/// detected through the table constraints, never by read-then-compare.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgUrlRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if a migration cannot be applied.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| StorageError::Unavailable(format!("migration failed: {e}")))
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| {
                StorageError::Timeout(format!("{operation} exceeded {:?}", self.timeout))
            })?
    }
}

/// Maps an insert failure, telling the two unique constraints apart.
fn map_insert_error(err: sqlx::Error, original_url: &str, short_code: &str) -> StorageError {
    if let Some(db) = err.as_database_error()
        && db.is_unique_violation()
    {
        return if db.constraint() == Some(SHORT_URL_CONSTRAINT) {
            StorageError::CodeCollision(short_code.to_string())
        } else {
            StorageError::UniqueViolation(original_url.to_string())
        };
    }

    map_sqlx_error(err)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn get_short_url(&self, original_url: &str) -> StorageResult<Option<String>> {
        self.bounded("get_short_url", async {
            sqlx::query_scalar::<_, String>("SELECT short_url FROM urls WHERE original_url = $1")
                .bind(original_url)
                .fetch_optional(self.pool.as_ref())
                .await
                .map_err(map_sqlx_error)
        })
        .await
    }

    async fn add(&self, original_url: &str, short_code: &str, owner_id: &str) -> StorageResult<()> {
        self.bounded("add", async {
            sqlx::query("INSERT INTO urls (short_url, original_url, owner_id) VALUES ($1, $2, $3)")
                .bind(short_code)
                .bind(original_url)
                .bind(owner_id)
                .execute(self.pool.as_ref())
                .await
                .map_err(|e| map_insert_error(e, original_url, short_code))?;
            Ok(())
        })
        .await
    }

    async fn get_original_url(&self, short_code: &str) -> StorageResult<String> {
        self.bounded("get_original_url", async {
            let row = sqlx::query_as::<_, (String, bool)>(
                "SELECT original_url, is_deleted FROM urls WHERE short_url = $1",
            )
            .bind(short_code)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

            match row {
                None => Err(StorageError::NotFound(short_code.to_string())),
                Some((_, true)) => Err(StorageError::Gone(short_code.to_string())),
                Some((original_url, false)) => Ok(original_url),
            }
        })
        .await
    }

    async fn upload_batch(
        &self,
        owner_id: &str,
        items: Vec<BatchItem>,
    ) -> StorageResult<Vec<BatchItem>> {
        self.bounded("upload_batch", async {
            // Dropping the transaction on an early return rolls it back.
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
            let mut results = Vec::with_capacity(items.len());

            for mut item in items {
                let inserted = sqlx::query_scalar::<_, String>(
                    r#"
                    INSERT INTO urls (short_url, original_url, owner_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (original_url) DO NOTHING
                    RETURNING short_url
                    "#,
                )
                .bind(&item.short_code)
                .bind(&item.original_url)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, &item.original_url, &item.short_code))?;

                if inserted.is_none() {
                    let existing = sqlx::query_scalar::<_, String>(
                        "SELECT short_url FROM urls WHERE original_url = $1",
                    )
                    .bind(&item.original_url)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;

                    item.short_code = existing;
                    item.original_url.clear();
                }

                results.push(item);
            }

            tx.commit().await.map_err(map_sqlx_error)?;
            Ok(results)
        })
        .await
    }

    async fn get_user_urls(&self, owner_id: &str) -> StorageResult<Vec<BatchItem>> {
        if owner_id.is_empty() {
            return Ok(Vec::new());
        }

        self.bounded("get_user_urls", async {
            let rows = sqlx::query_as::<_, (String, String)>(
                r#"
                SELECT short_url, original_url
                FROM urls
                WHERE owner_id = $1 AND NOT is_deleted
                ORDER BY id
                "#,
            )
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

            Ok(rows
                .into_iter()
                .map(|(short_url, original_url)| BatchItem::listed(short_url, original_url))
                .collect())
        })
        .await
    }

    async fn delete_urls(&self, owner_id: &str, short_codes: &[String]) -> StorageResult<()> {
        if owner_id.is_empty() || short_codes.is_empty() {
            return Ok(());
        }

        self.bounded("delete_urls", async {
            let result = sqlx::query(
                r#"
                UPDATE urls
                SET is_deleted = TRUE
                WHERE owner_id = $1 AND short_url = ANY($2) AND NOT is_deleted
                "#,
            )
            .bind(owner_id)
            .bind(short_codes)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

            tracing::debug!(
                owner_id,
                requested = short_codes.len(),
                affected = result.rows_affected(),
                "Soft-deleted URLs"
            );
            Ok(())
        })
        .await
    }

    async fn stats(&self) -> StorageResult<Stats> {
        self.bounded("stats", async {
            let (url_count, user_count) = sqlx::query_as::<_, (i64, i64)>(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE NOT is_deleted),
                    COUNT(DISTINCT owner_id) FILTER (WHERE owner_id <> '')
                FROM urls
                "#,
            )
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

            Ok(Stats {
                url_count,
                user_count,
            })
        })
        .await
    }

    async fn ping(&self) -> StorageResult<()> {
        self.bounded("ping", async {
            sqlx::query("SELECT 1")
                .execute(self.pool.as_ref())
                .await
                .map_err(map_sqlx_error)?;
            Ok(())
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}
