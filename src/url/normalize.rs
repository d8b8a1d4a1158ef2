use crate::UrlError;
use url::Url;

/// Parses an absolute HTTP(S) URL
///
/// Relative references, non-HTTP schemes and URLs without a host are rejected.
pub fn parse_absolute(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Normalizes a URL into the key used for visit and delivery deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed, relative or not HTTP(S)
/// 2. Lowercase the host (done by the parser)
/// 3. Remove the fragment
/// 4. Trim trailing slashes
///
/// Query strings are kept, so `?page=2` and `?page=3` stay distinct.
///
/// # Examples
///
/// ```
/// use site_sift::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/docs/#intro").unwrap();
/// assert_eq!(url, "https://example.com/docs");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let mut url = parse_absolute(url_str)?;
    url.set_fragment(None);
    Ok(trim_trailing_slashes(url.as_str()).to_string())
}

/// Strips the fragment from an already parsed URL and trims trailing slashes
pub fn normalize_parsed(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    trim_trailing_slashes(url.as_str()).to_string()
}

fn trim_trailing_slashes(s: &str) -> &str {
    s.trim_end_matches('/')
}
