//! Tagcrawl: a persistent, tag-scoped web crawler
//!
//! This crate keeps an append-only frontier of discovered URLs in a durable
//! store, fetches pending pages in rough shallow-first order and enqueues the
//! links it finds with a depth that penalizes leaving the originating host.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Tagcrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, CrawlSummary};
pub use state::PageStatus;
pub use storage::{EnqueueOutcome, FrontierStore, PageRecord, SqliteFrontier};
