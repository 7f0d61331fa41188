//! Link extraction from fetched HTML
//!
//! Raw hrefs come from an [`HrefScanner`]. The default scanner is a lexical
//! regex pass over the markup; it misses script-generated links and will pick
//! up `href` values from any tag. A DOM-based scanner can be swapped in without
//! touching the cleanup, resolution and depth rules below.

use crate::config::LinkExtractorKind;
use crate::url::{clean_href, is_mailto, resolve_href, same_host};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

/// Depth added for a link that stays on the parent's host
pub const SAME_HOST_INCREMENT: u32 = 1;

/// Depth added for a link that leaves the parent's host
pub const CROSS_HOST_INCREMENT: u32 = 100;

/// Source of raw href strings, in document order
pub trait HrefScanner: Send + Sync {
    fn extract_hrefs(&self, html: &str) -> Vec<String>;
}

/// Regex scan for `href="..."` and `href='...'`
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalHrefScanner;

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)href\s*=\s*(?:"([^"\r\n]+)"|'([^'\r\n]+)')"#)
            .expect("href pattern is valid")
    })
}

impl HrefScanner for LexicalHrefScanner {
    fn extract_hrefs(&self, html: &str) -> Vec<String> {
        href_pattern()
            .captures_iter(html)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Reads `href` attributes from every element of a parsed document
#[derive(Debug, Default, Clone, Copy)]
pub struct DomHrefScanner;

impl HrefScanner for DomHrefScanner {
    fn extract_hrefs(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut hrefs = Vec::new();

        if let Ok(selector) = Selector::parse("[href]") {
            for element in document.select(&selector) {
                if let Some(href) = element.value().attr("href") {
                    hrefs.push(href.to_string());
                }
            }
        }

        hrefs
    }
}

/// A discovered child URL and the depth it adds to its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    pub url: Url,
    pub depth_increment: u32,
}

/// Turns page markup into deduplicated child links
pub struct LinkExtractor {
    scanner: Box<dyn HrefScanner>,
}

impl LinkExtractor {
    pub fn new(scanner: Box<dyn HrefScanner>) -> Self {
        Self { scanner }
    }

    pub fn lexical() -> Self {
        Self::new(Box::new(LexicalHrefScanner))
    }

    pub fn dom() -> Self {
        Self::new(Box::new(DomHrefScanner))
    }

    pub fn from_kind(kind: LinkExtractorKind) -> Self {
        match kind {
            LinkExtractorKind::Lexical => Self::lexical(),
            LinkExtractorKind::Dom => Self::dom(),
        }
    }

    /// Extracts child links, resolving and comparing hosts against `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use tagcrawl::crawler::LinkExtractor;
    /// use url::Url;
    ///
    /// let base = Url::parse("http://ex.com/p").unwrap();
    /// let links = LinkExtractor::lexical()
    ///     .extract_links(r#"<a href="/a?x=1&amp;y=2#frag">a</a>"#, &base);
    /// assert_eq!(links[0].url.as_str(), "http://ex.com/a?x=1&y=2");
    /// assert_eq!(links[0].depth_increment, 1);
    /// ```
    pub fn extract_links(&self, html: &str, base_url: &Url) -> Vec<ChildLink> {
        self.extract_links_from(html, base_url, base_url)
    }

    /// Extracts child links, resolving against `base_url` and charging depth
    /// relative to `origin`
    ///
    /// After a redirect the two differ: relative links are resolved against the
    /// final URL, while the depth increment is measured from the page's own
    /// stored URL.
    pub fn extract_links_from(&self, html: &str, base_url: &Url, origin: &Url) -> Vec<ChildLink> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for raw in self.scanner.extract_hrefs(html) {
            let href = clean_href(&raw);

            if is_mailto(&href) {
                continue;
            }

            let Some(url) = resolve_href(base_url, &href) else {
                tracing::trace!("Skipping unresolvable href {:?}", raw);
                continue;
            };

            if !seen.insert(url.as_str().to_string()) {
                continue;
            }

            links.push(ChildLink {
                depth_increment: depth_increment(origin, &url),
                url,
            });
        }

        links
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::lexical()
    }
}

/// Depth cost of moving from `parent` to `child`
pub fn depth_increment(parent: &Url, child: &Url) -> u32 {
    if same_host(parent, child) {
        SAME_HOST_INCREMENT
    } else {
        CROSS_HOST_INCREMENT
    }
}
