//! A single worker loop

use crate::config::WorkerConfig;
use crate::crawler::{crawl_with_limits, CrawlLimits, CrawlRequest, Fetcher, StopReason};
use crate::storage::{lock_shared, PageRecord, SharedStorage, StorageResult, Task, TaskStore, UrlStore};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// What one pass of the worker loop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iteration {
    /// No task was pending
    Idle,
    /// A task was crawled, saved and completed
    Completed {
        task_id: i64,
        pages: usize,
        stop_reason: StopReason,
    },
}

/// Leases tasks from a shared store and crawls them
///
/// The store lock is only taken inside synchronous helpers, so it is never
/// held across a fetch or a sleep.
pub struct Worker<F: ?Sized, S> {
    id: usize,
    storage: SharedStorage<S>,
    fetcher: Arc<F>,
    config: WorkerConfig,
    limits: CrawlLimits,
}

impl<F, S> Worker<F, S>
where
    F: Fetcher + ?Sized,
    S: TaskStore + UrlStore + Send,
{
    pub fn new(
        id: usize,
        storage: SharedStorage<S>,
        fetcher: Arc<F>,
        config: WorkerConfig,
        limits: CrawlLimits,
    ) -> Self {
        Self {
            id,
            storage,
            fetcher,
            config,
            limits,
        }
    }

    /// Runs one claim, crawl, persist, complete pass
    ///
    /// Does nothing once shutdown has been signalled. Page-level failures
    /// never surface here; only store errors do. If saving the records fails
    /// the task is left Running.
    pub async fn run_once(
        &self,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> StorageResult<Iteration> {
        // A task leased after shutdown would be completed without being crawled.
        if shutdown.is_some_and(|rx| *rx.borrow()) {
            return Ok(Iteration::Idle);
        }

        let task = match self.claim()? {
            Some(task) => task,
            None => return Ok(Iteration::Idle),
        };

        tracing::info!(
            "Worker {} claimed task {} ({}, max depth {})",
            self.id,
            task.id,
            task.url,
            task.max_depth
        );

        let request = CrawlRequest::from(&task);
        let outcome = crawl_with_limits(&*self.fetcher, &request, &self.limits, shutdown).await;

        let mut pages = outcome.pages;
        for page in &mut pages {
            page.task_id = Some(task.id);
        }

        let (saved, completed) = self.persist(&task, &pages)?;
        let errors = pages.iter().filter(|p| p.is_error()).count();

        tracing::info!(
            "Worker {} completed task {}: {} pages saved, {} errors, stopped: {:?}",
            self.id,
            completed.id,
            saved,
            errors,
            outcome.stop_reason
        );

        Ok(Iteration::Completed {
            task_id: completed.id,
            pages: saved,
            stop_reason: outcome.stop_reason,
        })
    }

    /// Runs the loop until the shutdown signal is raised
    ///
    /// Each pass sleeps a random jitter, runs [`Worker::run_once`], then sleeps
    /// the cooldown. Store errors are logged and stretch the following sleep
    /// exponentially up to `store-retry-max-ms`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Worker {} started", self.id);
        let mut consecutive_failures: u32 = 0;

        loop {
            let jitter = jitter_delay(self.config.jitter_max_ms);
            if sleep_or_shutdown(jitter, &mut shutdown).await {
                break;
            }

            let pause = match self.run_once(Some(&shutdown)).await {
                Ok(_) => {
                    consecutive_failures = 0;
                    Duration::from_millis(self.config.cooldown_ms)
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    let delay = backoff_delay(&self.config, consecutive_failures);
                    tracing::error!(
                        "Worker {} store failure ({} in a row), retrying in {:?}: {}",
                        self.id,
                        consecutive_failures,
                        delay,
                        e
                    );
                    delay
                }
            };

            if sleep_or_shutdown(pause, &mut shutdown).await {
                break;
            }
        }

        tracing::info!("Worker {} stopped", self.id);
    }

    fn claim(&self) -> StorageResult<Option<Task>> {
        let mut store = lock_shared(&self.storage)?;
        store.claim_next_pending()
    }

    fn persist(&self, task: &Task, pages: &[PageRecord]) -> StorageResult<(usize, Task)> {
        let mut store = lock_shared(&self.storage)?;
        let saved = store.save_many(pages)?;
        let completed = store.complete_task(task)?;
        Ok((saved, completed))
    }
}

/// Random delay in `0..=max_ms` milliseconds taken before each claim
pub fn jitter_delay(max_ms: u64) -> Duration {
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

/// Pause after `failures` consecutive store errors
///
/// The cooldown doubles per failure and is capped at `store_retry_max_ms`.
pub fn backoff_delay(config: &WorkerConfig, failures: u32) -> Duration {
    let base = config.cooldown_ms.max(1);
    let factor = 1u64 << failures.min(20);
    Duration::from_millis(base.saturating_mul(factor).min(config.store_retry_max_ms.max(base)))
}

/// Sleeps for `delay`, returning true if shutdown was requested meanwhile
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }

    tokio::select! {
        _ = tokio::time::sleep(delay) => *shutdown.borrow(),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}
