//! Periodic refresh of a fill store.
//!
//! A [`RefreshTask`] polls a [`FillSource`] on a fixed interval and replaces
//! the store's collection with each successful result. The first tick fires
//! immediately, so spawning the task also performs the initial load.
//!
//! Replacement is whole-collection, last writer wins: an optimistic change
//! applied while a fetch is in flight is dropped when that fetch lands, unless
//! the fetched data already contains it.
//!
//! The task owns a liveness flag. [`RefreshHandle::stop`] (or dropping the
//! handle) clears it and signals shutdown; a fetch that completes after that
//! point is discarded instead of being written into the store. The flag is
//! checked again once the store lock is held, so a stop that lands while the
//! task waits for the lock still wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::core::source::FillSource;
use crate::core::store::FillStore;
use crate::error::Result;

/// A fill store shared between its consumer and a refresh task.
pub type SharedFillStore = Arc<Mutex<FillStore>>;

/// Wrap a store for sharing with a refresh task.
#[must_use]
pub fn shared(store: FillStore) -> SharedFillStore {
    Arc::new(Mutex::new(store))
}

/// Lock a shared store, recovering from a poisoned lock.
///
/// Store operations never panic midway, so the data behind a poisoned lock is
/// still consistent.
pub fn lock(store: &SharedFillStore) -> MutexGuard<'_, FillStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fetch once and replace the store contents.
///
/// Returns the number of fills loaded.
///
/// # Errors
/// Returns the source error; the store is left untouched in that case.
pub async fn refresh_once<S: FillSource>(source: &S, store: &SharedFillStore) -> Result<usize> {
    let fills = source.fetch_all_fills().await?;
    let count = fills.len();
    lock(store).replace_all(fills);
    Ok(count)
}

/// Outcome counters published after every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    pub refresh_count: u64,
    pub failure_count: u64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Recurring refresh configuration.
pub struct RefreshTask<S> {
    source: S,
    store: SharedFillStore,
    every: Duration,
    initial_load: bool,
}

impl<S> RefreshTask<S>
where
    S: FillSource + 'static,
{
    /// Create a task refreshing `store` from `source` every `every`.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(source: S, store: SharedFillStore, every: Duration) -> Self {
        Self {
            source,
            store,
            every: every.max(Duration::from_millis(1)),
            initial_load: true,
        }
    }

    /// Wait one full interval before the first fetch.
    ///
    /// For callers that already loaded the store with [`refresh_once`].
    #[must_use]
    pub const fn skip_initial_load(mut self) -> Self {
        self.initial_load = false;
        self
    }

    /// Start the task on the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> RefreshHandle {
        let alive = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (status_tx, status_rx) = watch::channel(RefreshStatus::default());

        tracing::debug!(interval = ?self.every, "starting refresh task");
        let task = tokio::spawn(self.run(Arc::clone(&alive), shutdown_rx, status_tx));

        RefreshHandle {
            alive,
            shutdown: Some(shutdown_tx),
            status: status_rx,
            task: Some(task),
        }
    }

    async fn run(
        self,
        alive: Arc<AtomicBool>,
        mut shutdown: oneshot::Receiver<()>,
        status_tx: watch::Sender<RefreshStatus>,
    ) {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.initial_load {
            // The first tick completes immediately.
            ticker.tick().await;
        }
        let mut status = RefreshStatus::default();

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }

            let result = tokio::select! {
                result = self.source.fetch_all_fills() => result,
                _ = &mut shutdown => break,
            };

            if !alive.load(Ordering::Acquire) {
                tracing::debug!("refresh stopped; discarding fetched fills");
                break;
            }

            match result {
                Ok(fills) => {
                    let mut guard = lock(&self.store);
                    // stop() may have run while we waited for the lock.
                    if !alive.load(Ordering::Acquire) {
                        tracing::debug!("refresh stopped; discarding fetched fills");
                        break;
                    }
                    guard.replace_all(fills);
                    drop(guard);
                    status.refresh_count += 1;
                    status.last_refreshed_at = Some(Utc::now());
                    status.last_error = None;
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::warn!(error = %e, "fill refresh failed; keeping last known fills");
                    } else {
                        tracing::error!(error = %e, "fill refresh failed; keeping last known fills");
                    }
                    status.failure_count += 1;
                    status.last_error = Some(e.to_string());
                }
            }

            status_tx.send_replace(status.clone());
        }

        tracing::debug!(refreshes = status.refresh_count, "refresh task finished");
    }
}

/// Control handle for a running [`RefreshTask`]. Dropping it stops the task.
pub struct RefreshHandle {
    alive: Arc<AtomicBool>,
    shutdown: Option<oneshot::Sender<()>>,
    status: watch::Receiver<RefreshStatus>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Stop refreshing.
    ///
    /// The flag is re-checked under the store lock, so no write starts after
    /// this returns. A write already holding the lock finishes first.
    pub fn stop(&mut self) {
        self.alive.store(false, Ordering::Release);
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether the task is still scheduled to refresh.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::Acquire) && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Latest published status.
    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.status.borrow().refresh_count
    }

    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.status.borrow().failure_count
    }

    /// Receiver notified after every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RefreshStatus> {
        self.status.clone()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::FuelFillRecord;
    use crate::core::source::StaticSource;
    use crate::core::statistics::compute_statistics;
    use crate::test_utils::{make_test_fill_on, make_test_fleet};

    /// Source that takes a while to answer.
    struct SlowSource {
        inner: StaticSource,
        delay: Duration,
    }

    impl FillSource for SlowSource {
        async fn fetch_all_fills(&self) -> Result<Vec<FuelFillRecord>> {
            tokio::time::sleep(self.delay).await;
            self.inner.fetch_all_fills().await
        }
    }

    async fn wait_for_ticks(rx: &mut watch::Receiver<RefreshStatus>, ticks: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while {
                let status = rx.borrow_and_update();
                status.refresh_count + status.failure_count < ticks
            } {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn refresh_once_replaces_collection() {
        let store = shared(FillStore::new());
        let source = StaticSource::new(make_test_fleet());

        let count = refresh_once(&source, &store).await.unwrap();

        let guard = lock(&store);
        assert_eq!(count, guard.len());
        assert_eq!(guard.statistics(), &compute_statistics(&make_test_fleet()));
    }

    #[tokio::test]
    async fn refresh_once_failure_keeps_last_known() {
        let store = shared(FillStore::with_records(make_test_fleet()));
        let source = StaticSource::new(Vec::new());
        source.set_failure(Some("offline"));

        assert!(refresh_once(&source, &store).await.is_err());
        assert_eq!(lock(&store).len(), make_test_fleet().len());
    }

    #[tokio::test]
    async fn refresh_discards_pending_optimistic_add() {
        let store = shared(FillStore::with_records(make_test_fleet()));
        let source = StaticSource::new(make_test_fleet());

        {
            let mut guard = lock(&store);
            let id = guard.next_placeholder_id();
            guard.add_optimistic(make_test_fill_on(id, "2024-08-01").with_liters(40.0));
        }
        refresh_once(&source, &store).await.unwrap();

        let guard = lock(&store);
        assert_eq!(guard.len(), make_test_fleet().len());
        assert!(guard.records().iter().all(|r| r.id > 0));
    }

    #[tokio::test]
    async fn task_performs_initial_load() {
        let store = shared(FillStore::new());
        let source = StaticSource::new(make_test_fleet());
        let handle = RefreshTask::new(source, Arc::clone(&store), Duration::from_secs(60)).spawn();
        let mut rx = handle.subscribe();

        wait_for_ticks(&mut rx, 1).await;

        assert!(handle.is_running());
        assert_eq!(handle.refresh_count(), 1);
        assert_eq!(lock(&store).len(), make_test_fleet().len());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn skipped_initial_load_waits_one_interval() {
        let store = shared(FillStore::new());
        let source = StaticSource::new(make_test_fleet());
        let handle = RefreshTask::new(source.clone(), Arc::clone(&store), Duration::from_secs(60))
            .skip_initial_load()
            .spawn();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.fetch_count(), 0);
        assert!(lock(&store).is_empty());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn task_picks_up_new_data() {
        let store = shared(FillStore::new());
        let source = StaticSource::new(Vec::new());
        let handle =
            RefreshTask::new(source.clone(), Arc::clone(&store), Duration::from_millis(10)).spawn();
        let mut rx = handle.subscribe();

        wait_for_ticks(&mut rx, 1).await;
        source.set(make_test_fleet());
        let seen = rx.borrow().refresh_count;
        wait_for_ticks(&mut rx, seen + 1).await;

        assert_eq!(lock(&store).len(), make_test_fleet().len());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn task_failure_keeps_last_known_fills() {
        let store = shared(FillStore::with_records(make_test_fleet()));
        let source = StaticSource::new(Vec::new());
        source.set_failure(Some("server unavailable"));
        let handle = RefreshTask::new(source, Arc::clone(&store), Duration::from_secs(60)).spawn();
        let mut rx = handle.subscribe();

        wait_for_ticks(&mut rx, 1).await;

        let status = handle.status();
        assert_eq!(status.failure_count, 1);
        assert_eq!(status.refresh_count, 0);
        assert!(status.last_error.unwrap().contains("server unavailable"));
        assert_eq!(lock(&store).len(), make_test_fleet().len());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn stopped_task_never_writes() {
        let store = shared(FillStore::new());
        let inner = StaticSource::new(make_test_fleet());
        let source = SlowSource {
            inner: inner.clone(),
            delay: Duration::from_millis(100),
        };
        let mut handle = RefreshTask::new(source, Arc::clone(&store), Duration::from_secs(60)).spawn();

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.stop();
        assert!(!handle.is_running());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(lock(&store).is_empty());
        assert_eq!(inner.fetch_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[allow(clippy::await_holding_lock)]
    async fn stop_while_store_locked_discards_fetch() {
        let store = shared(FillStore::new());
        let source = StaticSource::new(make_test_fleet());

        // Hold the lock so the task parks between its fetch and its write.
        let guard = lock(&store);
        let mut handle =
            RefreshTask::new(source.clone(), Arc::clone(&store), Duration::from_secs(60)).spawn();
        tokio::time::timeout(Duration::from_secs(5), async {
            while source.fetch_count() == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        handle.stop();
        drop(guard);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(lock(&store).is_empty());
        assert_eq!(handle.refresh_count(), 0);
    }

    #[tokio::test]
    async fn dropping_handle_stops_task() {
        let store = shared(FillStore::new());
        let source = StaticSource::new(make_test_fleet());
        let handle =
            RefreshTask::new(source.clone(), Arc::clone(&store), Duration::from_millis(5)).spawn();
        let mut rx = handle.subscribe();
        wait_for_ticks(&mut rx, 1).await;
        drop(handle);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let fetches = source.fetch_count();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.fetch_count(), fetches);
    }
}
