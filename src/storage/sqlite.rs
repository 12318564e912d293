//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the [`TaskStore`]
//! and [`UrlStore`] traits.

use crate::state::TaskState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TaskStore, UrlStore};
use crate::storage::{DomainStats, NewTask, PageRecord, Stats, Task, TaskFilter};
use crate::url::extract_domain;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const TASK_COLUMNS: &str = "id, url, max_depth, domains, blacklist, state, created_at";

const URL_COLUMNS: &str =
    "id, url, status_code, content_size, content_title, links, task_id, created_at";

/// How long a connection waits for another writer before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite storage backend
///
/// Each instance owns one connection. Several instances, in one process or
/// many, may point at the same database file; the lease protocol stays
/// exclusive because every claim runs in an immediate write transaction.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and applies the schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the connection, reporting any error SQLite raises while doing so
    pub fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::from(e))
    }
}

impl TaskStore for SqliteStorage {
    fn create_task(&mut self, task: &NewTask) -> StorageResult<Task> {
        task.validate()?;

        let now = Utc::now();
        let domains = serde_json::to_string(&task.domains)?;
        let blacklist = serde_json::to_string(&task.blacklist)?;

        self.conn.execute(
            "INSERT INTO tasks (url, max_depth, domains, blacklist, state, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.url,
                task.max_depth,
                domains,
                blacklist,
                TaskState::Pending.to_db_string(),
                now.to_rfc3339()
            ],
        )?;

        Ok(Task {
            id: self.conn.last_insert_rowid(),
            url: task.url.clone(),
            max_depth: task.max_depth,
            domains: task.domains.clone(),
            blacklist: task.blacklist.clone(),
            state: TaskState::Pending,
            created_at: now,
        })
    }

    fn get_task(&self, id: i64) -> StorageResult<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id],
                task_from_row,
            )
            .optional()?;

        Ok(task)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> StorageResult<Vec<Task>> {
        let tasks = match filter.state {
            Some(state) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM tasks WHERE state = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
                    TASK_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![state.to_db_string(), filter.limit, filter.offset],
                    task_from_row,
                )?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM tasks ORDER BY id LIMIT ?1 OFFSET ?2",
                    TASK_COLUMNS
                ))?;
                let rows = stmt.query_map(params![filter.limit, filter.offset], task_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(tasks)
    }

    fn claim_next_pending(&mut self) -> StorageResult<Option<Task>> {
        // IMMEDIATE takes the write lock up front, so the select and the
        // update below see the same snapshot no matter how many connections race.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let task = tx
            .query_row(
                &format!(
                    "UPDATE tasks SET state = ?1
                     WHERE id = (SELECT id FROM tasks WHERE state = ?2 ORDER BY id LIMIT 1)
                       AND state = ?2
                     RETURNING {}",
                    TASK_COLUMNS
                ),
                params![
                    TaskState::Running.to_db_string(),
                    TaskState::Pending.to_db_string()
                ],
                task_from_row,
            )
            .optional()?;

        tx.commit()?;

        Ok(task)
    }

    fn complete_task(&mut self, task: &Task) -> StorageResult<Task> {
        if !task.state.can_transition_to(TaskState::Completed) {
            return Err(StorageError::InvalidTransition {
                id: task.id,
                from: task.state,
                to: TaskState::Completed,
            });
        }

        let updated = self.conn.execute(
            "UPDATE tasks SET state = ?1 WHERE id = ?2 AND state = ?3",
            params![
                TaskState::Completed.to_db_string(),
                task.id,
                TaskState::Running.to_db_string()
            ],
        )?;

        if updated == 0 {
            return match self.get_task(task.id)? {
                Some(current) => Err(StorageError::InvalidTransition {
                    id: task.id,
                    from: current.state,
                    to: TaskState::Completed,
                }),
                None => Err(StorageError::TaskNotFound(task.id)),
            };
        }

        self.get_task(task.id)?
            .ok_or(StorageError::TaskNotFound(task.id))
    }
}

impl UrlStore for SqliteStorage {
    fn save_many(&mut self, records: &[PageRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO crawled_urls
                 (url, domain, status_code, content_size, content_title, links, task_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in records {
                let links = serde_json::to_string(&record.links)?;
                let domain = extract_domain(&record.url).unwrap_or_default();
                stmt.execute(params![
                    record.url,
                    domain,
                    record.status_code,
                    record.content_size.map(|size| size as i64),
                    record.content_title,
                    links,
                    record.task_id,
                    record.created_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(records.len())
    }

    fn list_urls(&self, offset: u32, limit: u32) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawled_urls ORDER BY id LIMIT ?1 OFFSET ?2",
            URL_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![limit, offset], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn compute_stats(&self) -> StorageResult<Stats> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawled_urls", [], |row| row.get(0))?;

        let errors: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawled_urls WHERE status_code >= 400",
            [],
            |row| row.get(0),
        )?;

        let mut status_code_stats = BTreeMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT status_code, COUNT(*) FROM crawled_urls GROUP BY status_code")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, u16>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (status, count) = row?;
            status_code_stats.insert(status, count as u64);
        }

        let mut stmt = self.conn.prepare(
            "SELECT domain, COUNT(*) AS count FROM crawled_urls
             GROUP BY domain ORDER BY count DESC, domain ASC",
        )?;
        let domain_stats = stmt
            .query_map([], |row| {
                Ok(DomainStats {
                    domain: row.get(0)?,
                    total_crawled_urls: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Stats {
            total_crawled_urls: total as u64,
            total_errors_during_crawling: errors as u64,
            status_code_stats,
            domain_stats,
        })
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let state_str: String = row.get(5)?;
    let state = TaskState::from_db_string(&state_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown task state '{}'", state_str).into(),
        )
    })?;

    Ok(Task {
        id: row.get(0)?,
        url: row.get(1)?,
        max_depth: row.get(2)?,
        domains: json_column(row, 3)?,
        blacklist: json_column(row, 4)?,
        state,
        created_at: timestamp_column(row, 6)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        status_code: row.get(2)?,
        content_size: row.get::<_, Option<i64>>(3)?.map(|size| size as u64),
        content_title: row.get(4)?,
        links: json_column(row, 5)?,
        task_id: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
    })
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
