//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore trait.
//! Several crawler processes may share one database file; the `UNIQUE(tag, url)`
//! constraint decides which of two racing inserts wins.

use crate::state::PageStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StoreError, StoreResult};
use crate::storage::{EnqueueOutcome, PageRecord, TagCounts};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const PAGE_COLUMNS: &str = "id, parent_id, url, tag, depth, fetched, failed, error, content";

/// How long a writer waits on another process's lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite frontier backend
pub struct SqliteFrontier {
    conn: Mutex<Connection>,
}

impl SqliteFrontier {
    /// Creates a new SqliteFrontier instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteFrontier)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        initialize_schema(&conn)?;

        tracing::debug!("Opened frontier database at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquires the connection for the duration of one store call
    fn acquire(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Writes a terminal timestamp if the page is still pending
    fn mark_terminal(&self, id: i64, sql: &str, text: &str) -> StoreResult<()> {
        let conn = self.acquire()?;
        let now = Utc::now().to_rfc3339();
        let changed = conn.execute(sql, params![now, text, id])?;

        if changed == 0 {
            let exists: Option<i64> = conn
                .query_row("SELECT id FROM pages WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })
                .optional()?;

            return Err(match exists {
                Some(_) => StoreError::AlreadyTerminal(id),
                None => StoreError::PageNotFound(id),
            });
        }

        Ok(())
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        url: row.get(2)?,
        tag: row.get(3)?,
        depth: row.get(4)?,
        fetched: row.get(5)?,
        failed: row.get(6)?,
        error: row.get(7)?,
        content: row.get(8)?,
    })
}

/// True for a `(tag, url)` uniqueness conflict, false for every other error
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

impl FrontierStore for SqliteFrontier {
    // ===== Frontier Writes =====

    fn enqueue(
        &self,
        parent_id: Option<i64>,
        url: &str,
        tag: &str,
        depth: u32,
    ) -> StoreResult<EnqueueOutcome> {
        let conn = self.acquire()?;
        let result = conn.execute(
            "INSERT INTO pages (parent_id, url, tag, depth) VALUES (?1, ?2, ?3, ?4)",
            params![parent_id, url, tag, depth],
        );

        match result {
            Ok(_) => Ok(EnqueueOutcome::Created(conn.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => Ok(EnqueueOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    fn reprioritize_seed(&self, url: &str, tag: &str, depth: u32) -> StoreResult<bool> {
        let conn = self.acquire()?;
        let changed = conn.execute(
            "UPDATE pages SET depth = ?1, parent_id = NULL
             WHERE tag = ?2 AND url = ?3 AND depth > ?1
             AND fetched IS NULL AND failed IS NULL",
            params![depth, tag, url],
        )?;
        Ok(changed > 0)
    }

    fn mark_fetched(&self, id: i64, content: &str) -> StoreResult<()> {
        self.mark_terminal(
            id,
            "UPDATE pages SET fetched = ?1, content = ?2
             WHERE id = ?3 AND fetched IS NULL AND failed IS NULL",
            content,
        )
    }

    fn mark_failed(&self, id: i64, error: &str) -> StoreResult<()> {
        self.mark_terminal(
            id,
            "UPDATE pages SET failed = ?1, error = ?2
             WHERE id = ?3 AND fetched IS NULL AND failed IS NULL",
            error,
        )
    }

    // ===== Scheduling Queries =====

    fn min_pending_depth(&self) -> StoreResult<Option<u32>> {
        let conn = self.acquire()?;
        let depth: Option<u32> = conn.query_row(
            "SELECT MIN(depth) FROM pages WHERE fetched IS NULL AND failed IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(depth)
    }

    fn pending_candidates_at(&self, depth: u32, limit: u32) -> StoreResult<Vec<PageRecord>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pages
             WHERE fetched IS NULL AND failed IS NULL AND depth = ?1
             ORDER BY id LIMIT ?2",
            PAGE_COLUMNS
        ))?;

        let pages = stmt
            .query_map(params![depth, limit], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    // ===== Lookups =====

    fn get_page(&self, id: i64) -> StoreResult<PageRecord> {
        let conn = self.acquire()?;
        conn.query_row(
            &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
            params![id],
            page_from_row,
        )
        .optional()?
        .ok_or(StoreError::PageNotFound(id))
    }

    fn get_page_by_url(&self, tag: &str, url: &str) -> StoreResult<Option<PageRecord>> {
        let conn = self.acquire()?;
        let page = conn
            .query_row(
                &format!(
                    "SELECT {} FROM pages WHERE tag = ?1 AND url = ?2",
                    PAGE_COLUMNS
                ),
                params![tag, url],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    // ===== Statistics =====

    fn count_pages_by_status(&self, status: PageStatus) -> StoreResult<u64> {
        let conn = self.acquire()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM pages WHERE {}", status.sql_predicate()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total_pages(&self) -> StoreResult<u64> {
        let conn = self.acquire()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn tag_breakdown(&self) -> StoreResult<Vec<TagCounts>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "SELECT tag,
                SUM(CASE WHEN fetched IS NULL AND failed IS NULL THEN 1 ELSE 0 END),
                SUM(CASE WHEN fetched IS NOT NULL THEN 1 ELSE 0 END),
                SUM(CASE WHEN fetched IS NULL AND failed IS NOT NULL THEN 1 ELSE 0 END)
             FROM pages GROUP BY tag ORDER BY tag",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(TagCounts {
                    tag: row.get(0)?,
                    pending: row.get::<_, i64>(1)? as u64,
                    fetched: row.get::<_, i64>(2)? as u64,
                    failed: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn depth_breakdown(&self) -> StoreResult<BTreeMap<u32, u64>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "SELECT depth, COUNT(*) FROM pages
             WHERE fetched IS NULL AND failed IS NULL
             GROUP BY depth ORDER BY depth",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut breakdown = BTreeMap::new();
        for row in rows {
            let (depth, count) = row?;
            breakdown.insert(depth, count);
        }

        Ok(breakdown)
    }

    fn failure_summary(&self, limit: u32) -> StoreResult<Vec<(String, u64)>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "SELECT COALESCE(error, ''), COUNT(*) AS count FROM pages
             WHERE fetched IS NULL AND failed IS NOT NULL
             GROUP BY error ORDER BY count DESC, error LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
