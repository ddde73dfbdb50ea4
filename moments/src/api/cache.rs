use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{MomentsError, Result};
use crate::moments::MomentRecord;

struct Snapshot {
    moments: Arc<Vec<MomentRecord>>,
    fetched_at: Instant,
}

#[derive(Default)]
struct Slot {
    snapshot: Option<Snapshot>,
    /// Error of the most recent refresh, cleared by the next success.
    failure: Option<MomentsError>,
}

/// Last successful moment list, reused until it is `ttl` old.
///
/// Concurrent callers that find the list stale wait on the same refresh
/// instead of each starting their own, and all of them receive its outcome,
/// success or failure. A failure is not kept for later requests: the next
/// caller to arrive after it tries again.
#[derive(Clone)]
pub struct MomentCache {
    ttl: Duration,
    /// Bumped when a refresh finishes, while the slot lock is still held.
    refreshes: Arc<AtomicU64>,
    slot: Arc<Mutex<Slot>>,
}

impl MomentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            refreshes: Arc::new(AtomicU64::new(0)),
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Arc<Vec<MomentRecord>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<MomentRecord>>>,
    {
        let seen = self.refreshes.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;

        if let Some(snapshot) = slot.snapshot.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                return Ok(snapshot.moments.clone());
            }
        }

        // A refresh completed while this caller was queued: reuse its result.
        if self.refreshes.load(Ordering::Acquire) != seen {
            if let Some(failure) = slot.failure.as_ref() {
                return Err(failure.shared());
            }
            if let Some(snapshot) = slot.snapshot.as_ref() {
                return Ok(snapshot.moments.clone());
            }
        }

        let outcome = refresh().await;
        self.refreshes.fetch_add(1, Ordering::Release);

        match outcome {
            Ok(moments) => {
                let moments = Arc::new(moments);
                tracing::debug!(count = moments.len(), "Moment cache refreshed");
                slot.snapshot = Some(Snapshot {
                    moments: moments.clone(),
                    fetched_at: Instant::now(),
                });
                slot.failure = None;
                Ok(moments)
            }
            Err(e) => {
                slot.failure = Some(e.shared());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MomentsError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(id: &str) -> MomentRecord {
        MomentRecord {
            id: id.to_string(),
            ..MomentRecord::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuses_list_within_ttl() {
        let cache = MomentCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let refresh = move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![record(&format!("m{n}"))])
        };

        let first = cache.get_or_refresh(refresh).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = cache.get_or_refresh(refresh).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first[0].id, "m0");
        assert_eq!(second[0].id, "m0");

        tokio::time::advance(Duration::from_secs(31)).await;
        let third = cache.get_or_refresh(refresh).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(third[0].id, "m1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_cached() {
        let cache = MomentCache::new(Duration::from_secs(60));

        let failed = cache
            .get_or_refresh(|| async { Err(MomentsError::Internal("down".to_string())) })
            .await;
        assert!(failed.is_err());

        let ok = cache
            .get_or_refresh(|| async { Ok(vec![record("m")]) })
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_refresh() {
        let cache = MomentCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_refresh(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            Ok(vec![record("m")])
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_failed_refresh() {
        let cache = MomentCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    let result = cache
                        .get_or_refresh(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_secs(100)).await;
                            Err(MomentsError::Auth("API token is invalid.".to_string()))
                        })
                        .await;
                    (result, start.elapsed())
                })
            })
            .collect();

        for task in tasks {
            let (result, waited) = task.await.unwrap();
            let err = result.unwrap_err();
            assert_eq!(
                err.to_string(),
                "Notion authentication error: API token is invalid."
            );
            assert_eq!(waited, Duration::from_secs(100));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let retried = cache
            .get_or_refresh(|| async { Ok(vec![record("m")]) })
            .await
            .unwrap();
        assert_eq!(retried.len(), 1);
    }
}
