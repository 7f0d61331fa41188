//! Storage module for the crawl frontier
//!
//! This module owns the durable, append-only `pages` table:
//! - Schema management
//! - Enqueueing discovered URLs under the `(tag, url)` uniqueness constraint
//! - Pending-page queries used by the scheduler
//! - Write-once terminal transitions (fetched / failed)
//! - Read helpers for statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteFrontier;
pub use traits::{FrontierStore, StoreError, StoreResult};

use crate::state::PageStatus;

use std::path::Path;

/// Default cap on pending pages returned per scheduling query
pub const DEFAULT_CANDIDATE_LIMIT: u32 = 10_000;

/// Opens (or creates) a frontier database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteFrontier)` - Successfully opened store
/// * `Err(StoreError)` - Failed to open or initialize the database
pub fn open_store(path: &Path) -> StoreResult<SqliteFrontier> {
    SqliteFrontier::new(path)
}

/// Represents a page row in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub url: String,
    pub tag: String,
    pub depth: u32,
    pub fetched: Option<String>,
    pub failed: Option<String>,
    pub error: Option<String>,
    pub content: Option<String>,
}

impl PageRecord {
    /// Status derived from the terminal timestamps
    pub fn status(&self) -> PageStatus {
        PageStatus::from_timestamps(self.fetched.is_some(), self.failed.is_some())
    }

    /// Seeds have no parent
    pub fn is_seed(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Result of an enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new pending row was inserted with this id
    Created(i64),

    /// `(tag, url)` was already present; nothing was written
    AlreadyExists,
}

impl EnqueueOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Page counts for one tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounts {
    pub tag: String,
    pub pending: u64,
    pub fetched: u64,
    pub failed: u64,
}

impl TagCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.fetched + self.failed
    }
}
