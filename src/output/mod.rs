//! Output module for reporting on the frontier
//!
//! Crawl progress is reported through `tracing`; this module covers the
//! `--stats` report built from the store.

pub mod stats;

pub use stats::{load_statistics, print_statistics, render_statistics, CrawlStatistics};
