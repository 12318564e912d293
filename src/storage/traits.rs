//! Storage traits and error types
//!
//! This module defines the two store interfaces the crawler core depends on
//! and the error type shared by their implementations.

use crate::state::TaskState;
use crate::storage::{NewTask, PageRecord, Stats, Task, TaskFilter};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid state transition for task {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: TaskState,
        to: TaskState,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage handle poisoned by a panicked worker")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Store handle shared by every worker in one process
pub type SharedStorage<S> = Arc<Mutex<S>>;

/// Locks a shared store, mapping a poisoned mutex to [`StorageError::Poisoned`]
pub fn lock_shared<S>(storage: &Mutex<S>) -> StorageResult<MutexGuard<'_, S>> {
    storage.lock().map_err(|_| StorageError::Poisoned)
}

/// Durable queue of crawl tasks
///
/// `claim_next_pending` and `complete_task` are the only operations that
/// change a task's state. Implementations must make the claim atomic with
/// respect to every other claimant, including other processes sharing the
/// same database.
pub trait TaskStore {
    /// Inserts a new task in the Pending state
    fn create_task(&mut self, task: &NewTask) -> StorageResult<Task>;

    /// Gets a task by id
    fn get_task(&self, id: i64) -> StorageResult<Option<Task>>;

    /// Lists tasks in id order, optionally restricted to one state
    fn list_tasks(&self, filter: &TaskFilter) -> StorageResult<Vec<Task>>;

    /// Leases one Pending task by moving it to Running
    ///
    /// Returns None when no task is pending. Two concurrent callers never
    /// receive the same task.
    fn claim_next_pending(&mut self) -> StorageResult<Option<Task>>;

    /// Moves a Running task to Completed and returns its new version
    ///
    /// Fails with [`StorageError::InvalidTransition`] if the task is not Running.
    fn complete_task(&mut self, task: &Task) -> StorageResult<Task>;
}

/// Durable collection of crawled page records
pub trait UrlStore {
    /// Persists a batch of records in one transaction, returning how many were written
    fn save_many(&mut self, records: &[PageRecord]) -> StorageResult<usize>;

    /// Lists records in insertion order
    fn list_urls(&self, offset: u32, limit: u32) -> StorageResult<Vec<PageRecord>>;

    /// Computes totals and histograms over every stored record
    fn compute_stats(&self) -> StorageResult<Stats>;
}
