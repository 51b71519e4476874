//! # Middleware Contract
//!
//! A middleware is a pass/fail guard run before a route's action. The route
//! only stores middleware *identifiers*; a [`MiddlewareContainer`] resolves
//! each identifier to an object at dispatch time.
//!
//! Returning `Ok(false)` rejects the request. Returning `Err` means the
//! middleware itself broke, which is reported separately from a rejection.

use crate::{error::BoxError, request::Request};
use std::sync::Arc;

/// A pass/fail request guard.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Middleware`",
    label = "missing `Middleware` implementation",
    note = "Middlewares are `Fn(&Request) -> bool` or implement `handle` directly."
)]
pub trait Middleware: Send + Sync + 'static {
    /// Inspect the request. `true` allows it, `false` rejects it.
    fn handle(&self, request: &Request) -> Result<bool, BoxError>;
}

// Blanket impl for closures
impl<F> Middleware for F
where
    F: Fn(&Request) -> bool + Send + Sync + 'static,
{
    fn handle(&self, request: &Request) -> Result<bool, BoxError> {
        Ok((self)(request))
    }
}

/// Resolves middleware identifiers to instances.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot resolve middlewares",
    label = "missing `MiddlewareContainer` implementation"
)]
pub trait MiddlewareContainer: Send + Sync {
    /// Look up the middleware registered as `name`.
    fn resolve(&self, name: &str) -> Result<Arc<dyn Middleware>, BoxError>;
}
