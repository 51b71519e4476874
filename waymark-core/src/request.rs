//! The request abstraction consumed by the dispatcher.

use std::collections::BTreeMap;

/// An incoming request, reduced to what routing and middlewares look at.
///
/// Parsing the wire format is the transport layer's job; this type only
/// carries the method, the URI path (query string split off) and the headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    headers: BTreeMap<String, String>,
}

impl Request {
    /// Create a request for `method` and `uri`.
    ///
    /// The method is uppercased. Anything after a `?` in `uri` is kept as the
    /// query string and is not part of the path used for matching.
    pub fn new(method: impl AsRef<str>, uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (uri, None),
        };

        Self {
            method: method.as_ref().to_ascii_uppercase(),
            path: path.to_string(),
            query,
            headers: BTreeMap::new(),
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(uri: impl AsRef<str>) -> Self {
        Self::new("GET", uri)
    }

    /// Shorthand for a `POST` request.
    pub fn post(uri: impl AsRef<str>) -> Self {
        Self::new("POST", uri)
    }

    /// Add a header. Header names are case-insensitive and stored lowercased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// The uppercased request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The URI path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Look up a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All headers, keyed by lowercased name.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_split_from_path() {
        let request = Request::new("get", "/users/42?expand=roles");
        assert_eq!(request.method(), "GET");
        assert_eq!(request.path(), "/users/42");
        assert_eq!(request.query(), Some("expand=roles"));
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let request = Request::get("/").with_header("Authorization", "Bearer abc");
        assert_eq!(request.header("authorization"), Some("Bearer abc"));
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer abc"));
        assert_eq!(request.header("x-missing"), None);
    }
}
