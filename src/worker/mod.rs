//! Worker loops that drain the shared task queue
//!
//! A [`Worker`] repeatedly leases one pending task, crawls it, persists the
//! resulting records in one batch and marks the task completed. A
//! [`WorkerPool`] runs a fixed number of workers as tokio tasks over one
//! shared store and stops them through a watch channel.

mod pool;
mod runner;

pub use pool::{run_pool, WorkerPool};
pub use runner::{backoff_delay, jitter_delay, Iteration, Worker};
