//! Batched, bounded-concurrency soft deletion.
//!
//! A [`DeletionRequest`] is split into sub-batches that are pushed onto a
//! pre-filled queue. Up to `max_workers` tasks pull from the queue and call
//! [`UrlRepository::delete_urls`]. The first hard storage error flips a shared
//! cancellation flag so the remaining queued work is abandoned.
//!
//! Nothing is reported back to the requester. Errors are logged here and then
//! dropped, since the HTTP request that triggered the deletion has already been
//! answered.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinSet;

use crate::domain::deletion_request::DeletionRequest;
use crate::domain::repositories::UrlRepository;

/// Default number of codes passed to a single backend call.
pub const DELETE_BATCH_SIZE: usize = 100;

/// Default upper bound on concurrent deletion workers per request.
pub const MAX_DELETE_WORKERS: usize = 10;

/// Tuning knobs for [`run_deletion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionSettings {
    pub batch_size: usize,
    pub max_workers: usize,
}

impl Default for DeletionSettings {
    fn default() -> Self {
        Self {
            batch_size: DELETE_BATCH_SIZE,
            max_workers: MAX_DELETE_WORKERS,
        }
    }
}

impl DeletionSettings {
    /// Number of workers to start for `batches` sub-batches.
    pub fn workers_for(&self, batches: usize) -> usize {
        self.max_workers.max(1).min(batches)
    }
}

type BatchQueue = Arc<Mutex<mpsc::Receiver<Vec<String>>>>;

/// Runs a deletion request to completion or cancellation.
///
/// Partial completion is possible: batches already handed to the backend are
/// not rolled back when a later batch fails.
pub async fn run_deletion(
    repository: Arc<dyn UrlRepository>,
    request: DeletionRequest,
    settings: DeletionSettings,
) {
    let batches = request.batches(settings.batch_size);
    if batches.is_empty() {
        tracing::debug!(owner_id = %request.owner_id, "Nothing to delete");
        return;
    }

    let batch_count = batches.len();
    let workers = settings.workers_for(batch_count);

    let (tx, rx) = mpsc::channel(batch_count);
    for batch in batches {
        if tx.send(batch).await.is_err() {
            break;
        }
    }
    // Closing the sender lets workers see the end of the queue.
    drop(tx);

    let queue: BatchQueue = Arc::new(Mutex::new(rx));
    let cancel = Arc::new(watch::Sender::new(false));
    let owner_id: Arc<str> = Arc::from(request.owner_id.as_str());

    tracing::info!(
        owner_id = %owner_id,
        codes = request.short_codes.len(),
        batches = batch_count,
        workers,
        backend = repository.backend_name(),
        "Deletion started"
    );

    let mut set = JoinSet::new();
    for worker_id in 0..workers {
        set.spawn(deletion_worker(
            worker_id,
            repository.clone(),
            owner_id.clone(),
            queue.clone(),
            cancel.clone(),
        ));
    }

    let mut processed = 0usize;
    while let Some(result) = set.join_next().await {
        match result {
            Ok(count) => processed += count,
            Err(e) => tracing::error!(error = %e, "Deletion worker panicked"),
        }
    }

    if *cancel.borrow() {
        tracing::warn!(
            owner_id = %owner_id,
            processed,
            batches = batch_count,
            "Deletion cancelled after storage error"
        );
    } else {
        tracing::info!(owner_id = %owner_id, processed, "Deletion finished");
    }
}

/// Pulls batches until the queue is drained or cancellation is signalled.
///
/// Returns the number of batches this worker completed successfully.
async fn deletion_worker(
    worker_id: usize,
    repository: Arc<dyn UrlRepository>,
    owner_id: Arc<str>,
    queue: BatchQueue,
    cancel: Arc<watch::Sender<bool>>,
) -> usize {
    let mut cancelled = cancel.subscribe();
    let mut completed = 0;

    loop {
        let batch = tokio::select! {
            biased;
            _ = cancelled.wait_for(|c| *c) => {
                tracing::debug!(worker_id, "Deletion worker cancelled");
                break;
            }
            batch = next_batch(&queue) => match batch {
                Some(batch) => batch,
                None => break,
            },
        };

        match repository.delete_urls(&owner_id, &batch).await {
            Ok(()) => {
                completed += 1;
                tracing::debug!(worker_id, size = batch.len(), "Deletion batch applied");
            }
            Err(e) => {
                metrics::counter!("deletion_batches_failed_total").increment(1);
                tracing::error!(
                    worker_id,
                    owner_id = %owner_id,
                    size = batch.len(),
                    error = %e,
                    "Deletion batch failed, cancelling remaining work"
                );
                cancel.send_replace(true);
                break;
            }
        }
    }

    completed
}

async fn next_batch(queue: &BatchQueue) -> Option<Vec<String>> {
    queue.lock().await.recv().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{BatchItem, Stats};
    use crate::domain::error::{StorageError, StorageResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records every `delete_urls` call and the peak number running at once.
    #[derive(Default)]
    struct CountingRepository {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        largest_batch: AtomicUsize,
        seen: std::sync::Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    impl CountingRepository {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl UrlRepository for CountingRepository {
        async fn get_short_url(&self, _: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        async fn add(&self, _: &str, _: &str, _: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn get_original_url(&self, code: &str) -> StorageResult<String> {
            Err(StorageError::NotFound(code.to_string()))
        }

        async fn upload_batch(&self, _: &str, items: Vec<BatchItem>) -> StorageResult<Vec<BatchItem>> {
            Ok(items)
        }

        async fn get_user_urls(&self, _: &str) -> StorageResult<Vec<BatchItem>> {
            Ok(Vec::new())
        }

        async fn delete_urls(&self, owner_id: &str, short_codes: &[String]) -> StorageResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.largest_batch
                .fetch_max(short_codes.len(), Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((owner_id.to_string(), short_codes.to_vec()));

            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                Err(StorageError::Unavailable("connection reset".to_string()))
            } else {
                Ok(())
            }
        }

        async fn stats(&self) -> StorageResult<Stats> {
            Ok(Stats::default())
        }

        async fn ping(&self) -> StorageResult<()> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    fn codes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i:07}")).collect()
    }

    #[tokio::test]
    async fn test_bounded_workers_and_batch_size() {
        let repo = Arc::new(CountingRepository::default());

        run_deletion(
            repo.clone(),
            DeletionRequest::new("owner-1", codes(1001)),
            DeletionSettings::default(),
        )
        .await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 11);
        let peak = repo.peak.load(Ordering::SeqCst);
        assert!(peak <= 10, "peak concurrency was {peak}");
        assert!(peak > 1, "workers never overlapped");
        assert_eq!(repo.largest_batch.load(Ordering::SeqCst), 100);

        let seen = repo.seen.lock().unwrap();
        assert!(seen.iter().all(|(owner, _)| owner == "owner-1"));
        let mut all: Vec<String> = seen.iter().flat_map(|(_, c)| c.clone()).collect();
        all.sort();
        assert_eq!(all, codes(1001));
    }

    #[tokio::test]
    async fn test_single_batch_uses_single_worker() {
        let repo = Arc::new(CountingRepository::default());

        run_deletion(
            repo.clone(),
            DeletionRequest::new("owner-1", codes(3)),
            DeletionSettings::default(),
        )
        .await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
        assert_eq!(repo.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_request_makes_no_calls() {
        let repo = Arc::new(CountingRepository::default());

        run_deletion(
            repo.clone(),
            DeletionRequest::new("owner-1", Vec::new()),
            DeletionSettings::default(),
        )
        .await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_error_cancels_remaining_batches() {
        let repo = Arc::new(CountingRepository::failing());

        run_deletion(
            repo.clone(),
            DeletionRequest::new("owner-1", codes(500)),
            DeletionSettings {
                batch_size: 100,
                max_workers: 1,
            },
        )
        .await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_stops_all_workers() {
        let repo = Arc::new(CountingRepository::failing());

        run_deletion(
            repo.clone(),
            DeletionRequest::new("owner-1", codes(2000)),
            DeletionSettings {
                batch_size: 100,
                max_workers: 3,
            },
        )
        .await;

        // Each worker may have one call in flight when the flag flips.
        assert!(repo.calls.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_workers_for_caps_at_batch_count() {
        let settings = DeletionSettings::default();

        assert_eq!(settings.workers_for(1), 1);
        assert_eq!(settings.workers_for(4), 4);
        assert_eq!(settings.workers_for(11), 10);
        assert_eq!(settings.workers_for(0), 0);
    }
}
