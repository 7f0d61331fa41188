//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with timeouts and user agent
//! - Manual redirect following (300-303) with a bounded chain
//! - Content-Type gating (only `text/html` is accepted)
//! - gzip / deflate decompression while the body streams in

use crate::config::CrawlerConfig;
use flate2::write::{GzDecoder, ZlibDecoder};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, LOCATION,
};
use reqwest::{redirect::Policy, Client, Response};
use std::io::Write;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A fetch failure
///
/// The `Display` text is what gets recorded in the page's `error` column.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Final response is not `text/html`
    #[error("Not html")]
    NotHtml { content_type: Option<String> },

    /// Redirect chain exceeded the configured bound
    #[error("Too many redirects")]
    TooManyRedirects { last_url: String },

    #[error("Redirect without Location header")]
    MissingLocation { url: String },

    #[error("Invalid redirect location '{location}': {source}")]
    InvalidLocation {
        location: String,
        source: url::ParseError,
    },

    /// Body could not be decompressed
    #[error("Failed to decode {encoding} body: {source}")]
    Decode {
        encoding: &'static str,
        source: std::io::Error,
    },

    /// DNS, connection, TLS, timeout or protocol error
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// A successfully retrieved HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that produced the final response, after redirects
    pub final_url: Url,
    /// HTTP status code of the final response
    pub status_code: u16,
    /// Number of redirects followed
    pub redirects: u32,
    /// Decompressed body text
    pub html: String,
}

/// Supported `Content-Encoding` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
}

impl ContentEncoding {
    fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("gzip") | Some("x-gzip") => Self::Gzip,
            Some("deflate") => Self::Deflate,
            _ => Self::Identity,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }
}

/// Accumulates body chunks, decompressing on the fly
enum BodySink {
    Identity(Vec<u8>),
    Gzip(GzDecoder<Vec<u8>>),
    Deflate(ZlibDecoder<Vec<u8>>),
}

impl BodySink {
    fn new(encoding: ContentEncoding) -> Self {
        match encoding {
            ContentEncoding::Identity => Self::Identity(Vec::new()),
            ContentEncoding::Gzip => Self::Gzip(GzDecoder::new(Vec::new())),
            ContentEncoding::Deflate => Self::Deflate(ZlibDecoder::new(Vec::new())),
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self {
            Self::Identity(buf) => {
                buf.extend_from_slice(chunk);
                Ok(())
            }
            Self::Gzip(decoder) => decoder.write_all(chunk),
            Self::Deflate(decoder) => decoder.write_all(chunk),
        }
    }

    fn finish(self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Identity(buf) => Ok(buf),
            Self::Gzip(decoder) => decoder.finish(),
            Self::Deflate(decoder) => decoder.finish(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Automatic redirects are disabled because the fetcher follows them itself,
/// and the client performs no decompression of its own.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::none())
        .build()
}

/// Retrieves HTML pages
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_redirects: u32,
}

impl Fetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, config.max_redirects))
    }

    /// Creates a fetcher around an existing client
    ///
    /// The client should have automatic redirects disabled.
    pub fn with_client(client: Client, max_redirects: u32) -> Self {
        Self {
            client,
            max_redirects,
        }
    }

    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// 1. GET the current URL
    /// 2. On 300-303, resolve `Location` against the current URL and repeat,
    ///    at most `max_redirects` times
    /// 3. Reject anything whose Content-Type is not `text/html`
    /// 4. Read the whole body, decompressing gzip / deflate
    ///
    /// No step is retried; every error is terminal for the page.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut current = url.clone();
        let mut redirects = 0;

        loop {
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status().as_u16();

            if is_redirect(status) {
                let location = header_str(&response, LOCATION.as_str()).ok_or_else(|| {
                    FetchError::MissingLocation {
                        url: current.to_string(),
                    }
                })?;

                if redirects >= self.max_redirects {
                    return Err(FetchError::TooManyRedirects {
                        last_url: current.to_string(),
                    });
                }

                let next = current
                    .join(&location)
                    .map_err(|source| FetchError::InvalidLocation {
                        location: location.clone(),
                        source,
                    })?;

                tracing::debug!("Redirect {} {} -> {}", status, current, next);
                current = next;
                redirects += 1;
                continue;
            }

            let content_type = header_str(&response, CONTENT_TYPE.as_str());
            if !is_html(content_type.as_deref()) {
                return Err(FetchError::NotHtml { content_type });
            }

            let encoding = ContentEncoding::from_header(
                header_str(&response, CONTENT_ENCODING.as_str()).as_deref(),
            );
            let html = read_body(response, encoding).await?;

            return Ok(FetchedPage {
                final_url: current,
                status_code: status,
                redirects,
                html,
            });
        }
    }
}

/// Statuses followed as redirects
fn is_redirect(status: u16) -> bool {
    (300..=303).contains(&status)
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

fn header_str(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Buffers the entire body in memory
async fn read_body(mut response: Response, encoding: ContentEncoding) -> Result<String, FetchError> {
    let decode_err = |source| FetchError::Decode {
        encoding: encoding.name(),
        source,
    };

    let mut sink = BodySink::new(encoding);
    while let Some(chunk) = response.chunk().await? {
        sink.write_chunk(&chunk).map_err(decode_err)?;
    }
    let bytes = sink.finish().map_err(decode_err)?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
