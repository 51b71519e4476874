//! Path joining and normalization.
//!
//! Registered paths always start with a single `/`, never contain repeated
//! slashes and only keep a trailing slash when they are the root. Request
//! paths are normalized the same way before matching, so `/users/` finds the
//! route registered as `/users`.

use once_cell::sync::Lazy;
use regex::Regex;

static SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new("/+").expect("slash regex is valid"));

fn collapse(path: &str) -> String {
    SLASHES.replace_all(path, "/").into_owned()
}

/// The final path of a route registered as `path` under `prefix`.
///
/// ```rust,ignore
/// assert_eq!(route_path("/api", "users/"), "/api/users");
/// assert_eq!(route_path("", "/"), "/");
/// ```
pub fn route_path(prefix: &str, path: &str) -> String {
    let joined = collapse(&format!(
        "/{}/{}",
        prefix.trim_matches('/'),
        path.trim_start_matches('/')
    ));
    strip_trailing(joined)
}

/// The ambient prefix inside a group with prefix `inner`, entered while
/// `outer` was active. The root composes to the empty string.
pub fn group_prefix(outer: &str, inner: &str) -> String {
    collapse(&format!("/{outer}/{inner}"))
        .trim_end_matches('/')
        .to_string()
}

/// Normalize an incoming request path for matching.
pub fn request_path(path: &str) -> String {
    strip_trailing(path.to_string())
}

fn strip_trailing(mut path: String) -> String {
    let len = path.trim_end_matches('/').len();
    path.truncate(len);
    if path.is_empty() {
        path.push('/');
    }
    path
}
