//! Fully in-memory URL storage.
//!
//! Nothing survives a restart. Used when neither a database nor a storage file
//! is configured, and as the default backend in tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::entities::{BatchItem, Stats, UrlRecord};
use crate::domain::error::StorageResult;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::url_index::UrlIndex;

const BACKEND_NAME: &str = "memory";

#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    index: RwLock<UrlIndex>,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn get_short_url(&self, original_url: &str) -> StorageResult<Option<String>> {
        Ok(self.index.read().await.short_url(original_url))
    }

    #[instrument(level = "debug", skip(self), fields(store = BACKEND_NAME), err)]
    async fn add(&self, original_url: &str, short_code: &str, owner_id: &str) -> StorageResult<()> {
        let mut index = self.index.write().await;
        index.check_insert(original_url, short_code)?;
        index.insert(UrlRecord::new(short_code, original_url, owner_id));
        Ok(())
    }

    async fn get_original_url(&self, short_code: &str) -> StorageResult<String> {
        self.index.read().await.resolve(short_code)
    }

    #[instrument(level = "debug", skip(self, items), fields(store = BACKEND_NAME, size = items.len()), err)]
    async fn upload_batch(
        &self,
        owner_id: &str,
        items: Vec<BatchItem>,
    ) -> StorageResult<Vec<BatchItem>> {
        let mut index = self.index.write().await;
        let plan = index.plan_batch(owner_id, items)?;
        for record in plan.inserts {
            index.insert(record);
        }
        Ok(plan.results)
    }

    async fn get_user_urls(&self, owner_id: &str) -> StorageResult<Vec<BatchItem>> {
        Ok(self.index.read().await.user_urls(owner_id))
    }

    #[instrument(level = "debug", skip(self, short_codes), fields(store = BACKEND_NAME, size = short_codes.len()), err)]
    async fn delete_urls(&self, owner_id: &str, short_codes: &[String]) -> StorageResult<()> {
        let mut index = self.index.write().await;
        for code in index.deletable(owner_id, short_codes) {
            index.mark_deleted(&code);
        }
        Ok(())
    }

    async fn stats(&self) -> StorageResult<Stats> {
        Ok(self.index.read().await.stats())
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}
