use url::Url;

/// Returns the top-level directory of a URL
///
/// The directory is `/` followed by the first non-empty path segment and a
/// trailing slash, or just `/` for URLs without path segments. Returns `None`
/// when the URL cannot be parsed.
///
/// # Examples
///
/// ```
/// use sumi_inspect::url::top_level_directory;
///
/// assert_eq!(top_level_directory("https://x.com/blog/post-1"), Some("/blog/".to_string()));
/// assert_eq!(top_level_directory("https://x.com/"), Some("/".to_string()));
/// assert_eq!(top_level_directory("not a url"), None);
/// ```
pub fn top_level_directory(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    let first = non_empty_segments(&url).next();
    Some(match first {
        Some(segment) => format!("/{}/", segment),
        None => "/".to_string(),
    })
}

/// Returns the number of non-empty path segments of a URL
///
/// `None` when the URL cannot be parsed.
///
/// # Examples
///
/// ```
/// use sumi_inspect::url::path_depth;
///
/// assert_eq!(path_depth("https://x.com/"), Some(0));
/// assert_eq!(path_depth("https://x.com/a/b/"), Some(2));
/// ```
pub fn path_depth(url_str: &str) -> Option<usize> {
    let url = Url::parse(url_str).ok()?;
    Some(non_empty_segments(&url).count())
}

fn non_empty_segments(url: &Url) -> impl Iterator<Item = &str> {
    url.path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
}
