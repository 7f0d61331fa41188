use crate::storage::DEFAULT_CANDIDATE_LIMIT;
use serde::Deserialize;

/// Main configuration structure for Tagcrawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pending pages loaded per scheduling decision
    #[serde(rename = "candidate-limit")]
    pub candidate_limit: u32,

    /// Maximum number of redirects followed for one fetch
    #[serde(rename = "max-redirects")]
    pub max_redirects: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Which href scanner feeds the link extractor
    #[serde(rename = "link-extractor")]
    pub link_extractor: LinkExtractorKind,

    /// Maximum entries in the dedup cache before it is reset (0 = unbounded)
    #[serde(rename = "seen-cache-limit")]
    pub seen_cache_limit: usize,

    /// Pause after a store failure before the next iteration (milliseconds)
    #[serde(rename = "store-retry-delay-ms")]
    pub store_retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            max_redirects: 5,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("tagcrawl/{}", env!("CARGO_PKG_VERSION")),
            link_extractor: LinkExtractorKind::Lexical,
            seen_cache_limit: 0,
            store_retry_delay_ms: 1000,
        }
    }
}

/// Href scanner selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkExtractorKind {
    /// Regex scan for `href="..."` / `href='...'`
    #[default]
    Lexical,
    /// `href` attributes read from a parsed document
    Dom,
}

/// Frontier store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "tagcrawl.db".to_string(),
        }
    }
}
