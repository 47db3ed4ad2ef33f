use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitegraph::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns `scheme://host[:port]/` for a URL
///
/// This is the base that robots.txt rules of a site apply to.
pub fn site_root(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let root = match url.port() {
        Some(port) => format!("{}://{}:{}/", url.scheme(), host, port),
        None => format!("{}://{}/", url.scheme(), host),
    };
    Some(root)
}

/// Same-host crawl boundary
///
/// A candidate is in scope when its host equals the host of the crawl root.
/// The scheme and port are not part of the comparison, so `http://` and
/// `https://` variants of the same host are both accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    host: String,
}

impl DomainScope {
    /// Captures the host of the crawl root
    pub fn new(root: &Url) -> Option<Self> {
        extract_domain(root).map(|host| Self { host })
    }

    /// The host every crawled link must share
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Checks a parsed URL against the boundary
    pub fn contains(&self, url: &Url) -> bool {
        extract_domain(url).is_some_and(|host| host == self.host)
    }

    /// Checks a textual link, with or without its scheme prefix
    ///
    /// `https://example.com/x` and `example.com/x` are both in scope for
    /// `example.com`; `sub.example.com/x` and `example.com.evil.org/x` are not.
    pub fn contains_str(&self, candidate: &str) -> bool {
        if let Ok(url) = Url::parse(candidate) {
            return self.contains(&url);
        }

        let without_scheme = candidate
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(candidate);

        let authority_end = without_scheme
            .find(['/', '?', '#'])
            .unwrap_or(without_scheme.len());
        let authority = &without_scheme[..authority_end];
        let authority = authority.rsplit('@').next().unwrap_or(authority);
        let host = authority.split(':').next().unwrap_or(authority);

        host.eq_ignore_ascii_case(&self.host)
    }
}
