/// Cleans a raw href taken from page markup
///
/// # Cleanup Steps
///
/// 1. Drop everything from the first `#`
/// 2. Unescape `&amp;` to `&`
/// 3. If the value is a percent-encoded absolute URL (`http%3A%2F%2F...`),
///    decode it once
///
/// Whitespace around the value is trimmed. No resolution happens here.
///
/// # Examples
///
/// ```
/// use tagcrawl::url::clean_href;
///
/// assert_eq!(clean_href("/a?x=1&amp;y=2#frag"), "/a?x=1&y=2");
/// assert_eq!(clean_href("http%3A%2F%2Fex.com%2Fp"), "http://ex.com/p");
/// ```
pub fn clean_href(raw: &str) -> String {
    let without_fragment = match raw.find('#') {
        Some(idx) => &raw[..idx],
        None => raw,
    };

    let unescaped = without_fragment.trim().replace("&amp;", "&");

    if is_encoded_absolute(&unescaped) {
        match urlencoding::decode(&unescaped) {
            Ok(decoded) => return decoded.into_owned(),
            Err(e) => {
                tracing::trace!("Leaving undecodable href {} as-is: {}", unescaped, e);
            }
        }
    }

    unescaped
}

/// True for `mailto:` hrefs, which are never enqueued
pub fn is_mailto(href: &str) -> bool {
    starts_with_ignore_case(href.trim_start(), "mailto:")
}

fn is_encoded_absolute(href: &str) -> bool {
    starts_with_ignore_case(href, "http%3A%2F%2F") || starts_with_ignore_case(href, "https%3A%2F%2F")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}
