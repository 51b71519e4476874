//! # Route Definitions
//!
//! A [`RouteDefinition`] describes one routable endpoint: its path, the HTTP
//! methods it answers, the action it runs, the middlewares guarding it, an
//! optional name, per-placeholder patterns and attributes.
//!
//! # Path Placeholders
//!
//! `{identifier}` segments in the path become named captures. A placeholder
//! uses the route's pattern for that name, or [`DEFAULT_PATTERN`]:
//!
//! ```rust,ignore
//! let route = RouteDefinition::builder("/users/{id}", show_user)
//!     .patterns([("id", r"\d+")])
//!     .build();
//!
//! assert_eq!(route.path_regex(), r"/users/(?P<id>\d+)");
//! ```
//!
//! Patterns use the `regex` crate's syntax, where `\d` and `\w` are
//! Unicode-aware; use `[0-9]` to accept ASCII digits only.
//!
//! The matcher is compiled once, at construction. Patterns added afterwards
//! with [`RouteDefinition::add_pattern`] are recorded but do not change how
//! the route matches.
//!
//! # Serialization
//!
//! Definitions serialize with their matcher source verbatim, so a route read
//! back from a cache matches exactly like the one that was written.

use crate::{
    action::{IntoAction, RouteAction},
    params::{Attributes, Params},
    response::Response,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Every verb `any` registers for.
pub const ALL_METHODS: [&str; 7] = ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// Pattern used for a placeholder without an explicit pattern.
pub const DEFAULT_PATTERN: &str = "[^/]+";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]+)\}")
        .expect("placeholder regex is valid")
});

/// Uppercase and deduplicate `methods`, adding `HEAD` when `GET` is present.
///
/// ```rust,ignore
/// assert_eq!(normalize_methods(["get"]), vec!["GET", "HEAD"]);
/// ```
pub fn normalize_methods<I, S>(methods: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for method in methods {
        let method = method.as_ref().to_ascii_uppercase();
        if !normalized.contains(&method) {
            normalized.push(method);
        }
    }

    if normalized.iter().any(|m| m == "GET") && !normalized.iter().any(|m| m == "HEAD") {
        normalized.push("HEAD".to_string());
    }

    normalized
}

/// The compiled form of a route path.
#[derive(Debug, Clone)]
struct PathMatcher {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl PathMatcher {
    fn compile(path: &str, patterns: &BTreeMap<String, String>) -> Self {
        let mut source = String::with_capacity(path.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(path) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            source.push_str(&regex::escape(&path[last..whole.start()]));

            let pattern = patterns
                .get(name.as_str())
                .map(String::as_str)
                .unwrap_or(DEFAULT_PATTERN);
            source.push_str(&format!("(?P<{}>{})", name.as_str(), pattern));
            last = whole.end();
        }
        source.push_str(&regex::escape(&path[last..]));

        Self::from_source(source)
    }

    fn from_source(source: String) -> Self {
        let compiled = Regex::new(&format!("^(?:{source})$"));

        #[cfg(feature = "tracing")]
        {
            if let Err(error) = &compiled {
                tracing::warn!(source = %source, %error, "route pattern does not compile; route will never match");
            }
        }

        Self { source, compiled }
    }

    fn captures(&self, path: &str) -> Option<Attributes> {
        let regex = self.compiled.as_ref().ok()?;
        let caps = regex.captures(path)?;

        Some(
            regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), Value::String(m.as_str().to_string())))
                })
                .collect(),
        )
    }
}

/// One routable endpoint plus its compiled path matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RouteRecord", into = "RouteRecord")]
pub struct RouteDefinition {
    path: String,
    methods: Vec<String>,
    action: RouteAction,
    middlewares: Vec<String>,
    name: Option<String>,
    patterns: BTreeMap<String, String>,
    attributes: Attributes,
    dynamic: bool,
    matcher: PathMatcher,
}

impl RouteDefinition {
    /// A route answering `HEAD` and `GET` with no middlewares.
    pub fn new(path: impl Into<String>, action: impl IntoAction) -> Self {
        Self::builder(path, action).build()
    }

    /// Start building a route.
    pub fn builder(path: impl Into<String>, action: impl IntoAction) -> RouteBuilder {
        RouteBuilder::new(path, action)
    }

    /// Append a middleware unless it is already present.
    pub fn add_middleware(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.middlewares.contains(&name) {
            self.middlewares.push(name);
        }
        self
    }

    /// Append several middlewares, keeping the first occurrence of each.
    pub fn add_middlewares<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_middleware(name);
        }
        self
    }

    /// Set the route name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Record a pattern. Does not recompile the matcher.
    pub fn add_pattern(&mut self, name: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.patterns.insert(name.into(), pattern.into());
        self
    }

    /// Record several patterns. Does not recompile the matcher.
    pub fn add_patterns<I, K, V>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.patterns
            .extend(patterns.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set an attribute, overwriting any previous value.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Merge attributes, overwriting existing names.
    pub fn add_attributes<I, K, V>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The normalized path as registered.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Uppercase verbs this route answers.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// The action to run.
    ///
    /// A handler that could not be restored after deserialization is replaced
    /// by a fallback returning an empty response; see
    /// [`has_fallback_action`](Self::has_fallback_action).
    pub fn action(&self) -> RouteAction {
        match &self.action {
            RouteAction::Detached => {
                #[cfg(feature = "tracing")]
                {
                    tracing::warn!(path = %self.path, "route handler was not restored; using empty response");
                }
                RouteAction::handler(|_: &Params| Response::empty())
            }
            action => action.clone(),
        }
    }

    /// The action exactly as stored.
    pub fn stored_action(&self) -> &RouteAction {
        &self.action
    }

    /// True if [`action`](Self::action) will return the empty-response fallback.
    pub fn has_fallback_action(&self) -> bool {
        self.action.is_detached()
    }

    /// Middleware identifiers in run order.
    pub fn middlewares(&self) -> &[String] {
        &self.middlewares
    }

    /// The route name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Placeholder patterns.
    pub fn patterns(&self) -> &BTreeMap<String, String> {
        &self.patterns
    }

    /// Attributes, including captured path parameters after a match.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// True if the path contains placeholders.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// The matcher source (unanchored).
    pub fn path_regex(&self) -> &str {
        &self.matcher.source
    }

    /// Match a normalized request path against this route.
    ///
    /// Static routes compare the path string exactly. Dynamic routes run the
    /// anchored matcher and return the named captures.
    pub fn capture(&self, path: &str) -> Option<Attributes> {
        if !self.dynamic {
            return (self.path == path).then(Attributes::new);
        }
        self.matcher.captures(path)
    }
}

/// Builder for [`RouteDefinition`].
pub struct RouteBuilder {
    path: String,
    action: RouteAction,
    methods: Vec<String>,
    middlewares: Vec<String>,
    name: Option<String>,
    patterns: BTreeMap<String, String>,
    attributes: Attributes,
}

impl RouteBuilder {
    fn new(path: impl Into<String>, action: impl IntoAction) -> Self {
        Self {
            path: path.into(),
            action: action.into_action(),
            methods: vec!["HEAD".to_string(), "GET".to_string()],
            middlewares: Vec::new(),
            name: None,
            patterns: BTreeMap::new(),
            attributes: Attributes::new(),
        }
    }

    /// Set the verbs. They are normalized with [`normalize_methods`].
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = normalize_methods(methods);
        self
    }

    /// Set the middlewares, dropping duplicates.
    pub fn middlewares<I, S>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middlewares.clear();
        for name in middlewares {
            let name = name.into();
            if !self.middlewares.contains(&name) {
                self.middlewares.push(name);
            }
        }
        self
    }

    /// Set the route name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the placeholder patterns the matcher is compiled with.
    pub fn patterns<I, K, V>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.patterns = patterns
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Set the initial attributes.
    pub fn attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Compile the matcher and build the route.
    pub fn build(self) -> RouteDefinition {
        let matcher = PathMatcher::compile(&self.path, &self.patterns);

        RouteDefinition {
            dynamic: is_dynamic(&self.path),
            path: self.path,
            methods: self.methods,
            action: self.action,
            middlewares: self.middlewares,
            name: self.name,
            patterns: self.patterns,
            attributes: self.attributes,
            matcher,
        }
    }
}

fn is_dynamic(path: &str) -> bool {
    path.contains('{') && path.contains('}')
}

#[derive(Serialize, Deserialize)]
struct RouteRecord {
    path: String,
    methods: Vec<String>,
    action: RouteAction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    middlewares: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    patterns: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: Attributes,
    path_regex: String,
}

impl From<RouteDefinition> for RouteRecord {
    fn from(route: RouteDefinition) -> Self {
        Self {
            path: route.path,
            methods: route.methods,
            action: route.action,
            middlewares: route.middlewares,
            name: route.name,
            patterns: route.patterns,
            attributes: route.attributes,
            path_regex: route.matcher.source,
        }
    }
}

impl From<RouteRecord> for RouteDefinition {
    fn from(record: RouteRecord) -> Self {
        Self {
            dynamic: is_dynamic(&record.path),
            matcher: PathMatcher::from_source(record.path_regex),
            path: record.path,
            methods: record.methods,
            action: record.action,
            middlewares: record.middlewares,
            name: record.name,
            patterns: record.patterns,
            attributes: record.attributes,
        }
    }
}
