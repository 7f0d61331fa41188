//! Statistics generation from the frontier database
//!
//! This module provides functionality for extracting and displaying
//! frontier statistics from the storage layer.

use crate::state::PageStatus;
use crate::storage::{FrontierStore, StoreResult, TagCounts};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// Number of distinct failure messages reported
pub const FAILURE_SUMMARY_LIMIT: u32 = 10;

/// Frontier statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of pages ever discovered
    pub total_pages: u64,

    /// Count of pages by status
    pub pages_by_status: HashMap<PageStatus, u64>,

    /// Per-tag status counts, sorted by tag
    pub tags: Vec<TagCounts>,

    /// Pending page count per depth
    pub pending_by_depth: BTreeMap<u32, u64>,

    /// Most frequent failure messages, most frequent first
    pub failure_summary: Vec<(String, u64)>,
}

impl CrawlStatistics {
    pub fn count(&self, status: PageStatus) -> u64 {
        self.pages_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Loads statistics from a frontier store
///
/// # Arguments
///
/// * `store` - The store to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StoreError)` - Failed to query statistics
pub fn load_statistics(store: &dyn FrontierStore) -> StoreResult<CrawlStatistics> {
    let total_pages = store.count_total_pages()?;

    let mut pages_by_status = HashMap::new();
    for status in PageStatus::all() {
        let count = store.count_pages_by_status(status)?;
        if count > 0 {
            pages_by_status.insert(status, count);
        }
    }

    Ok(CrawlStatistics {
        total_pages,
        pages_by_status,
        tags: store.tag_breakdown()?,
        pending_by_depth: store.depth_breakdown()?,
        failure_summary: store.failure_summary(FAILURE_SUMMARY_LIMIT)?,
    })
}

/// Formats statistics as a plain-text report
pub fn render_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Frontier Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total pages: {}", stats.total_pages);
    for status in PageStatus::all() {
        let count = stats.count(status);
        let percentage = if stats.total_pages > 0 {
            (count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", status, count, percentage);
    }
    let _ = writeln!(out);

    if !stats.tags.is_empty() {
        let _ = writeln!(out, "Tags ({}):", stats.tags.len());
        for tag in &stats.tags {
            let _ = writeln!(
                out,
                "  {}: {} pending, {} fetched, {} failed",
                tag.tag, tag.pending, tag.fetched, tag.failed
            );
        }
        let _ = writeln!(out);
    }

    if !stats.pending_by_depth.is_empty() {
        let _ = writeln!(out, "Pending by Depth:");
        for (depth, count) in &stats.pending_by_depth {
            let _ = writeln!(out, "  [{}]: {}", depth, count);
        }
        let _ = writeln!(out);
    }

    if !stats.failure_summary.is_empty() {
        let _ = writeln!(out, "Failure Summary:");
        for (error, count) in &stats.failure_summary {
            let _ = writeln!(out, "  {}: {}", error, count);
        }
        let _ = writeln!(out);
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", render_statistics(stats));
}
