//! # Route Table
//!
//! An append-only store of [`RouteDefinition`]s with two indexes:
//!
//! - **by name**: the last route registered under a name wins
//! - **by method**: a route appears once under every method it declares
//!
//! The ordered list of all routes is the source of truth for counting and
//! iteration. Both indexes hold positions into it, so a route is stored once
//! no matter how many methods it answers.
//!
//! Serialized, a table is just its routes in insertion order; the indexes are
//! rebuilt on load.

use crate::{error::RoutingError, route::RouteDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Append-only route storage indexed by name and by HTTP method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<RouteDefinition>", into = "Vec<RouteDefinition>")]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    by_name: HashMap<String, usize>,
    by_method: HashMap<String, Vec<usize>>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route and index it.
    ///
    /// Returns a handle for further fluent changes; a name set through the
    /// handle is indexed too.
    pub fn add_route(&mut self, route: RouteDefinition) -> RouteHandle<'_> {
        let index = self.routes.len();

        if let Some(name) = route.name().filter(|n| !n.is_empty()) {
            self.by_name.insert(name.to_string(), index);
        }
        for method in route.methods() {
            self.by_method.entry(method.clone()).or_default().push(index);
        }
        self.routes.push(route);

        RouteHandle { table: self, index }
    }

    /// Look up a route by exact name.
    pub fn find_route_by_name(&self, name: &str) -> Result<&RouteDefinition, RoutingError> {
        self.by_name
            .get(name)
            .map(|&index| &self.routes[index])
            .ok_or_else(|| RoutingError::RouteNotFound(format!("no route named `{name}`")))
    }

    /// Routes registered under `method`, in registration order.
    pub fn routes_by_method<'a>(
        &'a self,
        method: &str,
    ) -> impl Iterator<Item = &'a RouteDefinition> + 'a {
        self.by_method
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&index| &self.routes[index])
    }

    /// Named routes, in no particular order.
    pub fn named_routes(&self) -> impl Iterator<Item = (&str, &RouteDefinition)> {
        self.by_name
            .iter()
            .map(|(name, &index)| (name.as_str(), &self.routes[index]))
    }

    /// All routes in insertion order.
    pub fn all_routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    /// Iterate over all routes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, RouteDefinition> {
        self.routes.iter()
    }

    /// Number of routes, each counted once regardless of its methods.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Fluent handle to the route at `index`.
    pub fn route_mut(&mut self, index: usize) -> Option<RouteHandle<'_>> {
        (index < self.routes.len()).then(|| RouteHandle { table: self, index })
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteDefinition;
    type IntoIter = std::slice::Iter<'a, RouteDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

impl FromIterator<RouteDefinition> for RouteTable {
    fn from_iter<I: IntoIterator<Item = RouteDefinition>>(iter: I) -> Self {
        let mut table = RouteTable::new();
        for route in iter {
            table.add_route(route);
        }
        table
    }
}

impl From<Vec<RouteDefinition>> for RouteTable {
    fn from(routes: Vec<RouteDefinition>) -> Self {
        routes.into_iter().collect()
    }
}

impl From<RouteTable> for Vec<RouteDefinition> {
    fn from(table: RouteTable) -> Self {
        table.routes
    }
}

/// A fluent handle to a route stored in a [`RouteTable`].
///
/// ```rust,ignore
/// dispatcher
///     .get("/users/{id}", show_user)
///     .set_name("users.show")
///     .add_middleware("auth");
/// ```
pub struct RouteHandle<'a> {
    table: &'a mut RouteTable,
    index: usize,
}

impl<'a> RouteHandle<'a> {
    fn route_mut(&mut self) -> &mut RouteDefinition {
        &mut self.table.routes[self.index]
    }

    /// The route behind this handle.
    pub fn route(&self) -> &RouteDefinition {
        &self.table.routes[self.index]
    }

    /// Position of the route in the table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name the route and index it under the new name.
    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let index = self.index;

        if let Some(old) = self.route().name().map(str::to_string) {
            if self.table.by_name.get(&old) == Some(&index) {
                self.table.by_name.remove(&old);
            }
        }
        if !name.is_empty() {
            self.table.by_name.insert(name.clone(), index);
        }
        self.route_mut().set_name(name);
        self
    }

    /// Append a middleware unless it is already present.
    pub fn add_middleware(mut self, name: impl Into<String>) -> Self {
        self.route_mut().add_middleware(name);
        self
    }

    /// Append several middlewares.
    pub fn add_middlewares<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_mut().add_middlewares(names);
        self
    }

    /// Record a pattern. The route's matcher is not recompiled.
    pub fn add_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.route_mut().add_pattern(name, pattern);
        self
    }

    /// Record several patterns. The route's matcher is not recompiled.
    pub fn add_patterns<I, K, V>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.route_mut().add_patterns(patterns);
        self
    }

    /// Set an attribute.
    pub fn add_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.route_mut().add_attribute(name, value);
        self
    }

    /// Merge attributes.
    pub fn add_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.route_mut().add_attributes(attributes);
        self
    }
}
