//! Name-keyed middleware registry.

use crate::error::RegistryError;
use std::{collections::HashMap, sync::Arc};
use waymark_core::{BoxError, Middleware, MiddlewareContainer};

/// Resolves middleware identifiers registered ahead of time.
///
/// # Example
///
/// ```rust,ignore
/// let middlewares = MiddlewareRegistry::new()
///     .register("auth", |req: &Request| req.header("authorization").is_some())
///     .register("json", JsonOnly);
/// ```
#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    middlewares: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` as `name`, replacing any previous entry.
    pub fn register<M: Middleware>(mut self, name: impl Into<String>, middleware: M) -> Self {
        self.insert(name, middleware);
        self
    }

    /// Register in place.
    pub fn insert<M: Middleware>(&mut self, name: impl Into<String>, middleware: M) {
        self.middlewares.insert(name.into(), Arc::new(middleware));
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.middlewares.contains_key(name)
    }

    /// Number of registered middlewares.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl MiddlewareContainer for MiddlewareRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Middleware>, BoxError> {
        self.middlewares
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownMiddleware(name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::Request;

    #[test]
    fn test_resolve_registered() {
        let registry = MiddlewareRegistry::new().register("deny", |_: &Request| false);
        let mw = registry.resolve("deny").unwrap();
        assert!(!mw.handle(&Request::get("/")).unwrap());
    }

    #[test]
    fn test_resolve_unknown() {
        let err = MiddlewareRegistry::new().resolve("auth").err().unwrap();
        let err = err.downcast::<RegistryError>().unwrap();
        assert_eq!(*err, RegistryError::UnknownMiddleware("auth".into()));
    }
}
