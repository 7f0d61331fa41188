//! Storage traits and error types
//!
//! This module defines the trait interface for frontier store backends and
//! associated error types.

use crate::state::PageStatus;
use crate::storage::{EnqueueOutcome, PageRecord, TagCounts};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("Page {0} is already in a terminal state")]
    AlreadyTerminal(i64),

    #[error("Store connection lock poisoned")]
    Poisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for frontier store implementations
///
/// The store is the source of truth for deduplication: the `(tag, url)`
/// uniqueness constraint arbitrates between concurrent writers, possibly in
/// different processes. Every call acquires its connection for the duration of
/// the call only.
pub trait FrontierStore {
    // ===== Frontier Writes =====

    /// Appends a pending page
    ///
    /// A uniqueness conflict on `(tag, url)` is reported as
    /// `EnqueueOutcome::AlreadyExists`, never as an error.
    ///
    /// # Arguments
    ///
    /// * `parent_id` - The discovering page, `None` for seeds
    /// * `url` - Absolute URL as resolved at discovery time
    /// * `tag` - Crawl-group label
    /// * `depth` - Traversal cost from the seed
    fn enqueue(
        &self,
        parent_id: Option<i64>,
        url: &str,
        tag: &str,
        depth: u32,
    ) -> StoreResult<EnqueueOutcome>;

    /// Lowers the depth of an existing pending page to `depth` and makes it a seed
    ///
    /// Terminal pages and pages already at or below `depth` are untouched.
    /// Returns true if a row was updated.
    fn reprioritize_seed(&self, url: &str, tag: &str, depth: u32) -> StoreResult<bool>;

    /// Records a successful retrieval; rejects pages that are already terminal
    fn mark_fetched(&self, id: i64, content: &str) -> StoreResult<()>;

    /// Records a terminal failure; rejects pages that are already terminal
    fn mark_failed(&self, id: i64, error: &str) -> StoreResult<()>;

    // ===== Scheduling Queries =====

    /// Smallest depth among pending pages, `None` when the frontier is empty
    fn min_pending_depth(&self) -> StoreResult<Option<u32>>;

    /// Pending pages at exactly `depth`, ordered by id, at most `limit` of them
    fn pending_candidates_at(&self, depth: u32, limit: u32) -> StoreResult<Vec<PageRecord>>;

    // ===== Lookups =====

    /// Gets a page by ID
    fn get_page(&self, id: i64) -> StoreResult<PageRecord>;

    /// Gets a page by its `(tag, url)` key
    fn get_page_by_url(&self, tag: &str, url: &str) -> StoreResult<Option<PageRecord>>;

    // ===== Statistics =====

    /// Counts pages in the given status
    fn count_pages_by_status(&self, status: PageStatus) -> StoreResult<u64>;

    /// Gets total page count
    fn count_total_pages(&self) -> StoreResult<u64>;

    /// Per-tag status counts, sorted by tag
    fn tag_breakdown(&self) -> StoreResult<Vec<TagCounts>>;

    /// Pending page count per depth
    fn depth_breakdown(&self) -> StoreResult<BTreeMap<u32, u64>>;

    /// Most frequent failure messages with their counts, most frequent first
    fn failure_summary(&self, limit: u32) -> StoreResult<Vec<(String, u64)>>;
}
