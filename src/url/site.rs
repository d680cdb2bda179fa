use crate::config::PropertyKind;
use crate::{UrlError, UrlResult};
use url::Url;

/// Derives the inspection scope (`siteUrl`) from a URL
///
/// A URL-prefix property is the URL's origin with a trailing slash; a domain
/// property is `sc-domain:` followed by the lowercase host without `www.`.
///
/// # Examples
///
/// ```
/// use sumi_inspect::config::PropertyKind;
/// use sumi_inspect::url::derive_site_url;
///
/// let site = derive_site_url("https://Example.com/a/b?q=1", PropertyKind::UrlPrefix).unwrap();
/// assert_eq!(site, "https://example.com/");
///
/// let site = derive_site_url("https://www.example.com/a", PropertyKind::Domain).unwrap();
/// assert_eq!(site, "sc-domain:example.com");
/// ```
pub fn derive_site_url(url_str: &str, kind: PropertyKind) -> UrlResult<String> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::MissingHost(url_str.to_string()))?;

    match kind {
        PropertyKind::UrlPrefix => Ok(format!("{}/", url.origin().ascii_serialization())),
        PropertyKind::Domain => {
            let bare = host.strip_prefix("www.").unwrap_or(&host);
            Ok(format!("sc-domain:{}", bare))
        }
    }
}
