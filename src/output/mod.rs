//! Output module for presenting tasks, crawled URLs and statistics
//!
//! This module handles:
//! - Human-readable tables for the CLI
//! - Pretty-printed JSON for scripting (`--json`)
//! - The statistics report

mod listing;
pub mod stats;

pub use listing::{format_task, format_tasks, format_urls};
pub use stats::{format_stats, print_stats};

use crate::storage::{PageRecord, Task};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Writes `value` as JSON, or as the text produced by `render`
pub fn emit<T, R>(format: OutputFormat, value: &T, render: R) -> OutputResult<()>
where
    T: Serialize + ?Sized,
    R: FnOnce(&T) -> String,
{
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Text => render(value),
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text.trim_end())?;
    Ok(())
}

pub fn print_tasks(tasks: &[Task], format: OutputFormat) -> OutputResult<()> {
    emit(format, tasks, format_tasks)
}

pub fn print_task(task: &Task, format: OutputFormat) -> OutputResult<()> {
    emit(format, task, format_task)
}

pub fn print_urls(records: &[PageRecord], format: OutputFormat) -> OutputResult<()> {
    emit(format, records, format_urls)
}
