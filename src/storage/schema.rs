//! Database schema definitions
//!
//! This module contains the SQL schema for the frontier database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per discovered URL instance; rows are never deleted
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER REFERENCES pages(id),
    url TEXT NOT NULL,
    tag TEXT NOT NULL,
    depth INTEGER NOT NULL,
    fetched TEXT,
    failed TEXT,
    error TEXT,
    content TEXT,
    UNIQUE(tag, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_pending_depth ON pages(depth)
    WHERE fetched IS NULL AND failed IS NULL;
CREATE INDEX IF NOT EXISTS idx_pages_parent ON pages(parent_id);
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
