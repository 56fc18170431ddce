//! In-process index shared by the memory and file backends.
//!
//! Holds a forward map (original URL to code), a reverse map (code to record)
//! and the insertion order of codes. Callers wrap it in a single `RwLock`.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{BatchItem, Stats, UrlRecord};
use crate::domain::error::{StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct UrlIndex {
    by_original: HashMap<String, String>,
    by_code: HashMap<String, UrlRecord>,
    order: Vec<String>,
}

/// Outcome of planning a batch insert without touching the index.
#[derive(Debug, Default)]
pub struct BatchPlan {
    /// Records to insert, in request order.
    pub inserts: Vec<UrlRecord>,
    /// Echoed items with their final codes.
    pub results: Vec<BatchItem>,
}

impl UrlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn short_url(&self, original_url: &str) -> Option<String> {
        self.by_original.get(original_url).cloned()
    }

    pub fn record(&self, short_code: &str) -> Option<&UrlRecord> {
        self.by_code.get(short_code)
    }

    /// Fails with the conflict that inserting this pair would cause.
    pub fn check_insert(&self, original_url: &str, short_code: &str) -> StorageResult<()> {
        if self.by_original.contains_key(original_url) {
            return Err(StorageError::UniqueViolation(original_url.to_string()));
        }
        if self.by_code.contains_key(short_code) {
            return Err(StorageError::CodeCollision(short_code.to_string()));
        }
        Ok(())
    }

    /// Inserts a record that already passed [`Self::check_insert`].
    pub fn insert(&mut self, record: UrlRecord) {
        self.by_original
            .insert(record.original_url.clone(), record.short_code.clone());
        self.order.push(record.short_code.clone());
        self.by_code.insert(record.short_code.clone(), record);
    }

    pub fn resolve(&self, short_code: &str) -> StorageResult<String> {
        match self.by_code.get(short_code) {
            None => Err(StorageError::NotFound(short_code.to_string())),
            Some(record) if record.deleted => Err(StorageError::Gone(short_code.to_string())),
            Some(record) => Ok(record.original_url.clone()),
        }
    }

    /// Works out which batch items are new and which already exist.
    ///
    /// Existing URLs, including repeats within the same batch, come back with
    /// the stored code and an empty `original_url`. A candidate code that
    /// collides with a stored or staged code fails the whole plan.
    pub fn plan_batch(&self, owner_id: &str, items: Vec<BatchItem>) -> StorageResult<BatchPlan> {
        let mut plan = BatchPlan::default();
        let mut staged: HashMap<String, String> = HashMap::new();
        let mut staged_codes: HashSet<String> = HashSet::new();

        for item in items {
            let existing = self
                .by_original
                .get(&item.original_url)
                .or_else(|| staged.get(&item.original_url))
                .cloned();

            if let Some(short_code) = existing {
                plan.results.push(BatchItem {
                    correlation_id: item.correlation_id,
                    original_url: String::new(),
                    short_code,
                });
                continue;
            }

            if self.by_code.contains_key(&item.short_code) || staged_codes.contains(&item.short_code)
            {
                return Err(StorageError::CodeCollision(item.short_code));
            }

            staged.insert(item.original_url.clone(), item.short_code.clone());
            staged_codes.insert(item.short_code.clone());
            plan.inserts.push(UrlRecord::new(
                item.short_code.clone(),
                item.original_url.clone(),
                owner_id,
            ));
            plan.results.push(item);
        }

        Ok(plan)
    }

    pub fn user_urls(&self, owner_id: &str) -> Vec<BatchItem> {
        self.order
            .iter()
            .filter_map(|code| self.by_code.get(code))
            .filter(|record| record.is_owned_by(owner_id) && !record.deleted)
            .map(|record| BatchItem::listed(&record.short_code, &record.original_url))
            .collect()
    }

    /// Returns the subset of `short_codes` that `owner_id` may delete now.
    ///
    /// Unknown, foreign and already-deleted codes are skipped. Duplicates are
    /// reported once.
    pub fn deletable(&self, owner_id: &str, short_codes: &[String]) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut codes = Vec::new();

        for code in short_codes {
            let live_and_owned = self
                .by_code
                .get(code)
                .is_some_and(|r| r.is_owned_by(owner_id) && !r.deleted);

            if live_and_owned && seen.insert(code.as_str()) {
                codes.push(code.clone());
            }
        }

        codes
    }

    pub fn mark_deleted(&mut self, short_code: &str) {
        if let Some(record) = self.by_code.get_mut(short_code) {
            record.deleted = true;
        }
    }

    /// Applies a record read back from durable storage.
    ///
    /// A known code is updated in place, which is how deletion tombstones are
    /// replayed. A new code is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidData`] if the original URL is already
    /// mapped to a different code.
    pub fn restore(&mut self, record: UrlRecord) -> StorageResult<()> {
        if let Some(existing) = self.by_code.get_mut(&record.short_code) {
            if existing.original_url != record.original_url {
                return Err(StorageError::InvalidData(format!(
                    "code {} maps to two original URLs",
                    record.short_code
                )));
            }
            existing.deleted |= record.deleted;
            if existing.owner_id.is_empty() {
                existing.owner_id = record.owner_id;
            }
            return Ok(());
        }

        if let Some(code) = self.by_original.get(&record.original_url) {
            return Err(StorageError::InvalidData(format!(
                "original URL {} maps to codes {} and {}",
                record.original_url, code, record.short_code
            )));
        }

        self.insert(record);
        Ok(())
    }

    pub fn stats(&self) -> Stats {
        let url_count = self.by_code.values().filter(|r| !r.deleted).count();
        let user_count = self
            .by_code
            .values()
            .filter(|r| !r.owner_id.is_empty())
            .map(|r| r.owner_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        Stats {
            url_count: i64::try_from(url_count).unwrap_or(i64::MAX),
            user_count: i64::try_from(user_count).unwrap_or(i64::MAX),
        }
    }
}
