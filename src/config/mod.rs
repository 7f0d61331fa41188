//! Configuration module for Tagcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and applying environment overrides for the store connection.
//!
//! # Example
//!
//! ```no_run
//! use tagcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("tagcrawl.toml"))).unwrap();
//! println!("Candidate limit: {}", config.crawler.candidate_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, LinkExtractorKind, StoreConfig};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, parse_config, ENV_DATABASE, ENV_USER_AGENT};
pub use validation::validate;
