//! Crawler module for fetching pages and growing the frontier
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with manual redirects and decompression
//! - Lexical (or DOM) link extraction and depth accounting
//! - Depth-bucketed random scheduling
//! - The in-process dedup cache
//! - The crawl driver loop

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod seen;

pub use coordinator::{CrawlSummary, Crawler, StepOutcome};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher};
pub use parser::{
    depth_increment, ChildLink, DomHrefScanner, HrefScanner, LexicalHrefScanner, LinkExtractor,
    CROSS_HOST_INCREMENT, SAME_HOST_INCREMENT,
};
pub use scheduler::Scheduler;
pub use seen::SeenCache;

use crate::config::Config;
use crate::storage::{open_store, SqliteFrontier};
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;

/// Opens the configured SQLite frontier and builds a crawler over it
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(Crawler)` - Ready to seed and run
/// * `Err(CrawlError)` - The store or HTTP client could not be initialized
///
/// # Example
///
/// ```no_run
/// use tagcrawl::config::load_config;
/// use tagcrawl::crawler::open_crawler;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(None)?;
/// let mut crawler = open_crawler(&config)?;
/// crawler.seed("docs", &["http://example.com/".to_string()]);
/// let summary = crawler.run().await;
/// println!("{} pages fetched", summary.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub fn open_crawler(config: &Config) -> Result<Crawler<SqliteFrontier>, CrawlError> {
    let store = open_store(Path::new(&config.store.database_path))?;
    Crawler::new(&config.crawler, Arc::new(store))
}
