use crate::url::LinkRejection;
use url::Url;

/// Resolves an href found on `base` into an absolute URL
///
/// # Resolution Steps
///
/// 1. Trim surrounding whitespace
/// 2. Reject empty hrefs, the bare `#` marker and same-page anchors
/// 3. Join relative hrefs against the page they were found on
/// 4. Accept only http and https results
/// 5. Drop the fragment so anchors into one document name one page
///
/// # Examples
///
/// ```
/// use sitegraph::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/a/").unwrap();
/// let url = resolve_link("/path", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/path");
/// ```
pub fn resolve_link(href: &str, base: &Url) -> Result<Url, LinkRejection> {
    let href = href.trim();

    if href.is_empty() {
        return Err(LinkRejection::Invalid);
    }

    if href.starts_with('#') {
        return Err(LinkRejection::Fragment);
    }

    let mut resolved = base.join(href).map_err(|_| LinkRejection::Invalid)?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(LinkRejection::Invalid);
    }

    resolved.set_fragment(None);
    Ok(resolved)
}
