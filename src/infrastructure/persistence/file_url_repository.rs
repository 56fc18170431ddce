//! Append-only JSON-lines URL storage.
//!
//! Every mutation is appended to the log and flushed before the in-memory
//! index is updated, so a successful call is never ahead of the file. On open
//! the whole log is replayed to rebuild the index.
//!
//! # Line Format
//!
//! ```text
//! {"uuid":1,"short_url":"Ab3_x9Qz","original_url":"http://ya.ru","owner_id":"6f1c..."}
//! {"uuid":2,"short_url":"Ab3_x9Qz","original_url":"http://ya.ru","owner_id":"6f1c...","is_deleted":true}
//! ```
//!
//! `owner_id` is omitted when empty and `is_deleted` when false, so logs that
//! only carry `uuid`, `short_url` and `original_url` load unchanged. A line
//! with `is_deleted: true` for a known code is a deletion tombstone.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;

use crate::domain::entities::{BatchItem, Stats, UrlRecord};
use crate::domain::error::{StorageError, StorageResult};
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::url_index::UrlIndex;

const BACKEND_NAME: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
struct LogEntry {
    uuid: u64,
    short_url: String,
    original_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    owner_id: String,
    #[serde(default, skip_serializing_if = "is_false")]
    is_deleted: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<LogEntry> for UrlRecord {
    fn from(entry: LogEntry) -> Self {
        Self {
            short_code: entry.short_url,
            original_url: entry.original_url,
            owner_id: entry.owner_id,
            deleted: entry.is_deleted,
        }
    }
}

struct FileState {
    index: UrlIndex,
    log: File,
    next_uuid: u64,
}

impl FileState {
    fn entry_for(&mut self, record: &UrlRecord) -> LogEntry {
        let uuid = self.next_uuid;
        self.next_uuid += 1;
        LogEntry {
            uuid,
            short_url: record.short_code.clone(),
            original_url: record.original_url.clone(),
            owner_id: record.owner_id.clone(),
            is_deleted: record.deleted,
        }
    }

    /// Appends and flushes the entries as one write.
    async fn append(&mut self, entries: &[LogEntry]) -> StorageResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buffer = Vec::new();
        for entry in entries {
            serde_json::to_writer(&mut buffer, entry)
                .map_err(|e| StorageError::InvalidData(e.to_string()))?;
            buffer.push(b'\n');
        }

        self.log.write_all(&buffer).await?;
        self.log.flush().await?;
        self.log.sync_data().await?;
        Ok(())
    }
}

pub struct FileUrlRepository {
    state: RwLock<FileState>,
}

impl FileUrlRepository {
    /// Opens the log at `path`, creating it and its parent directories if
    /// needed, and replays existing entries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be read or created and
    /// [`StorageError::InvalidData`] naming the first malformed line.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut index = UrlIndex::new();
        let mut next_uuid = 1;

        match File::open(&path).await {
            Ok(file) => {
                let mut lines = BufReader::new(file).lines();
                let mut line_no = 0usize;

                while let Some(line) = lines.next_line().await? {
                    line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }

                    let entry: LogEntry = serde_json::from_str(&line).map_err(|e| {
                        StorageError::InvalidData(format!(
                            "{}:{}: {}",
                            path.display(),
                            line_no,
                            e
                        ))
                    })?;

                    let after = entry.uuid.checked_add(1).ok_or_else(|| {
                        StorageError::InvalidData(format!(
                            "{}:{}: uuid {} is out of range",
                            path.display(),
                            line_no,
                            entry.uuid
                        ))
                    })?;
                    next_uuid = next_uuid.max(after);
                    index.restore(entry.into()).map_err(|e| {
                        StorageError::InvalidData(format!("{}:{}: {}", path.display(), line_no, e))
                    })?;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if index.is_empty() {
            tracing::info!(path = %path.display(), "File storage created");
        } else {
            tracing::info!(
                path = %path.display(),
                records = index.len(),
                "File storage opened"
            );
        }

        Ok(Self {
            state: RwLock::new(FileState {
                index,
                log,
                next_uuid,
            }),
        })
    }
}

#[async_trait]
impl UrlRepository for FileUrlRepository {
    async fn get_short_url(&self, original_url: &str) -> StorageResult<Option<String>> {
        Ok(self.state.read().await.index.short_url(original_url))
    }

    async fn add(&self, original_url: &str, short_code: &str, owner_id: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        state.index.check_insert(original_url, short_code)?;

        let record = UrlRecord::new(short_code, original_url, owner_id);
        let entry = state.entry_for(&record);
        state.append(&[entry]).await?;
        state.index.insert(record);
        Ok(())
    }

    async fn get_original_url(&self, short_code: &str) -> StorageResult<String> {
        self.state.read().await.index.resolve(short_code)
    }

    async fn upload_batch(
        &self,
        owner_id: &str,
        items: Vec<BatchItem>,
    ) -> StorageResult<Vec<BatchItem>> {
        let mut state = self.state.write().await;
        let plan = state.index.plan_batch(owner_id, items)?;

        let entries: Vec<LogEntry> = plan.inserts.iter().map(|r| state.entry_for(r)).collect();
        state.append(&entries).await?;

        for record in plan.inserts {
            state.index.insert(record);
        }
        Ok(plan.results)
    }

    async fn get_user_urls(&self, owner_id: &str) -> StorageResult<Vec<BatchItem>> {
        Ok(self.state.read().await.index.user_urls(owner_id))
    }

    async fn delete_urls(&self, owner_id: &str, short_codes: &[String]) -> StorageResult<()> {
        let mut state = self.state.write().await;
        let codes = state.index.deletable(owner_id, short_codes);

        let tombstones: Vec<UrlRecord> = codes
            .iter()
            .filter_map(|code| state.index.record(code).cloned())
            .map(|mut record| {
                record.deleted = true;
                record
            })
            .collect();
        let entries: Vec<LogEntry> = tombstones.iter().map(|r| state.entry_for(r)).collect();
        state.append(&entries).await?;

        for code in &codes {
            state.index.mark_deleted(code);
        }
        Ok(())
    }

    async fn stats(&self) -> StorageResult<Stats> {
        Ok(self.state.read().await.index.stats())
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}
