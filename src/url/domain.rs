use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased and the port is ignored. If the URL has no host it
/// returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tagcrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// True when both URLs name the same host
///
/// Scheme and port are not compared, so `http://a.com` and
/// `https://a.com:8443` are the same host.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
