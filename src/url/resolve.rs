use url::Url;

/// Resolves a link href against the page that referenced it
///
/// Returns None if the link cannot be followed:
/// - empty or fragment-only hrefs (same page anchors)
/// - javascript:, mailto:, tel: and data: schemes
/// - hrefs that fail to parse
/// - anything that is not HTTP(S) after resolution
///
/// # Examples
///
/// ```
/// use dynascrape::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://news.example.com/world/").unwrap();
/// let url = resolve_link("../sport/match-report", &base).unwrap();
/// assert_eq!(url.as_str(), "https://news.example.com/sport/match-report");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if is_absolute(&absolute_url) => Some(absolute_url),
        _ => None,
    }
}

/// Returns true if the URL is an absolute HTTP(S) URL with a host
pub fn is_absolute(url: &Url) -> bool {
    (url.scheme() == "http" || url.scheme() == "https") && url.host_str().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/news/page").unwrap()
    }

    #[test]
    fn test_absolute_link_unchanged() {
        let url = resolve_link("https://other.com/story", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://other.com/story");
    }

    #[test]
    fn test_root_relative_link() {
        let url = resolve_link("/other", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/other");
    }

    #[test]
    fn test_path_relative_link() {
        let url = resolve_link("story-1", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/news/story-1");
    }

    #[test]
    fn test_protocol_relative_link() {
        let url = resolve_link("//cdn.example.com/a", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/a");
    }

    #[test]
    fn test_query_only_link() {
        let url = resolve_link("?page=2", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/news/page?page=2");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let url = resolve_link("  /spaced \n", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/spaced");
    }

    #[test]
    fn test_skip_special_schemes() {
        for href in [
            "javascript:void(0)",
            "JavaScript:alert(1)",
            "mailto:test@example.com",
            "tel:+1234567890",
            "data:text/html,<h1>x</h1>",
        ] {
            assert!(resolve_link(href, &base_url()).is_none(), "{}", href);
        }
    }

    #[test]
    fn test_skip_fragment_and_empty() {
        assert!(resolve_link("#section", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
    }

    #[test]
    fn test_skip_non_http_scheme() {
        assert!(resolve_link("ftp://example.com/file", &base_url()).is_none());
    }

    #[test]
    fn test_resolved_links_are_absolute() {
        let base = base_url();
        for href in ["a", "/b", "../c", "./d?x=1", "https://e.com/f", "//g.com/h"] {
            let url = resolve_link(href, &base).unwrap();
            assert!(is_absolute(&url), "{} resolved to {}", href, url);
        }
    }
}
