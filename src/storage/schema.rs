//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Crawlet database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl tasks and their lease state
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    max_depth INTEGER NOT NULL CHECK (max_depth >= 1),
    domains TEXT NOT NULL DEFAULT '[]',
    blacklist TEXT NOT NULL DEFAULT '[]',
    state TEXT NOT NULL CHECK (state IN ('pending', 'running', 'completed')),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_state ON tasks(state, id);

-- Tasks only move forward: pending -> running -> completed
CREATE TRIGGER IF NOT EXISTS trg_tasks_state_forward
BEFORE UPDATE OF state ON tasks
WHEN NOT (
    (OLD.state = 'pending' AND NEW.state = 'running')
    OR (OLD.state = 'running' AND NEW.state = 'completed')
)
BEGIN
    SELECT RAISE(ABORT, 'invalid task state transition');
END;

-- One row per page visited by a task
CREATE TABLE IF NOT EXISTS crawled_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    domain TEXT NOT NULL DEFAULT '',
    status_code INTEGER NOT NULL,
    content_size INTEGER,
    content_title TEXT,
    links TEXT NOT NULL DEFAULT '[]',
    task_id INTEGER REFERENCES tasks(id),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawled_urls_task ON crawled_urls(task_id);
CREATE INDEX IF NOT EXISTS idx_crawled_urls_domain ON crawled_urls(domain);
CREATE INDEX IF NOT EXISTS idx_crawled_urls_status ON crawled_urls(status_code);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
