//! Fixed-size pool of worker loops

use crate::config::{Config, WorkerConfig};
use crate::crawler::{CrawlLimits, Fetcher, HttpFetcher};
use crate::storage::{SharedStorage, SqliteStorage, StorageError, TaskStore, UrlStore};
use crate::worker::Worker;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Running workers plus the signal that stops them
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl WorkerPool {
    /// Spawns `config.pool_size` workers over one store and one fetcher
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, S>(
        storage: SharedStorage<S>,
        fetcher: Arc<F>,
        config: &WorkerConfig,
        limits: CrawlLimits,
    ) -> Self
    where
        F: Fetcher + ?Sized + 'static,
        S: TaskStore + UrlStore + Send + 'static,
    {
        let (shutdown, receiver) = watch::channel(false);

        let handles = (0..config.pool_size as usize)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&storage),
                    Arc::clone(&fetcher),
                    config.clone(),
                    limits,
                );
                tokio::spawn(worker.run(receiver.clone()))
            })
            .collect::<Vec<_>>();

        tracing::info!("Started {} workers", handles.len());

        Self { handles, shutdown }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Receiver that observes the same shutdown signal as the workers
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Asks every worker to stop after its current fetch or sleep
    pub fn signal_shutdown(&self) {
        // Workers hold receivers until they exit, so send only fails once all are gone.
        let _ = self.shutdown.send(true);
    }

    /// Signals shutdown and waits for every worker to exit
    pub async fn shutdown(self) {
        self.signal_shutdown();
        self.join().await;
    }

    /// Waits for every worker to exit without signalling
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }
        tracing::info!("All workers stopped");
    }
}

/// Runs a pool over the configured database until Ctrl-C
///
/// On interrupt every worker stops after its current fetch, saves what it
/// gathered and completes its task before the database is closed.
pub async fn run_pool(config: &Config) -> crate::Result<()> {
    let storage = Arc::new(Mutex::new(SqliteStorage::open(Path::new(
        &config.storage.database_path,
    ))?));
    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher)?);
    let limits = CrawlLimits::from_config(&config.crawler);

    tracing::info!(
        "Database: {}, workers: {}, max pages: {:?}, deadline: {:?}",
        config.storage.database_path,
        config.worker.pool_size,
        limits.max_pages,
        limits.deadline
    );

    let pool = WorkerPool::spawn(Arc::clone(&storage), fetcher, &config.worker, limits);

    let interrupted = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown requested, waiting for workers to finish");
    pool.shutdown().await;
    interrupted?;

    let storage = Arc::try_unwrap(storage)
        .map_err(|_| StorageError::Poisoned)?
        .into_inner()
        .map_err(|_| StorageError::Poisoned)?;
    storage.close()?;

    Ok(())
}
