//! Posix-style URL joining.
//!
//! Route URLs are composed by joining every ancestor container's base URL
//! with the controller's route URL. Joining normalises the result the way a
//! posix path join does: repeated slashes collapse, `.` segments vanish, `..`
//! pops the previous segment, and a trailing slash on the last part survives.

/// Joins two URL fragments.
///
/// Empty fragments are ignored, so joining two empty fragments yields an empty
/// string. The result is absolute when the first non-empty fragment is.
///
/// ```
/// use lyra_core::join_url;
///
/// assert_eq!(join_url("/a", "b"), "/a/b");
/// assert_eq!(join_url("/a/", "/b/"), "/a/b/");
/// assert_eq!(join_url("", "/users"), "/users");
/// assert_eq!(join_url("/api/v1", "../v2/users"), "/api/v2/users");
/// ```
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    match (base.is_empty(), path.is_empty()) {
        (true, true) => String::new(),
        (true, false) => normalize(path),
        (false, true) => normalize(base),
        (false, false) => normalize(&format!("{base}/{path}")),
    }
}

/// Joins any number of fragments left to right.
#[must_use]
pub fn join_all<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let joined = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        joined
    } else {
        normalize(&joined)
    }
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    let mut out = match (absolute, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    };
    if trailing && out != "/" {
        out.push('/');
    }
    out
}
