//! URL handling module for Tagcrawl
//!
//! This module provides raw href cleanup, resolution against a base URL and
//! host comparison used for depth accounting.

mod domain;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use normalize::{clean_href, is_mailto};

/// Parses an absolute http(s) URL, as required for seeds
///
/// # Examples
///
/// ```
/// use tagcrawl::url::parse_seed;
///
/// assert!(parse_seed("http://example.com/").is_ok());
/// assert!(parse_seed("ftp://example.com/").is_err());
/// assert!(parse_seed("/relative").is_err());
/// ```
pub fn parse_seed(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    check_fetchable(&url)?;
    Ok(url)
}

/// Resolves a cleaned href against `base`
///
/// Returns `None` when the href cannot be resolved or does not resolve to an
/// http(s) URL with a host.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let resolved = base.join(href).ok()?;
    check_fetchable(&resolved).ok()?;
    Some(resolved)
}

fn check_fetchable(url: &Url) -> UrlResult<()> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url.to_string()));
    }
    Ok(())
}
