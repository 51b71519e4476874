//! Error types for waymark.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RoutingError`] - Everything the dispatch pipeline can fail with
//! - [`ExtractError`] - Failed parameter extraction from route attributes
//!
//! Only [`RoutingError::RouteNotFound`] and [`RoutingError::MiddlewareFailed`]
//! originate in the routing core. Every other variant carries a collaborator
//! failure unmodified; the original error stays reachable via `source()`.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for route lookup and request dispatch.
#[derive(Error, Debug)]
pub enum RoutingError {
    /// No route matches the method + path, or a name lookup missed.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// A middleware in the chain rejected the request.
    #[error("middleware `{0}` rejected the request")]
    MiddlewareFailed(String),

    /// A middleware could not be resolved or raised while handling.
    #[error(transparent)]
    Middleware(BoxError),

    /// The action could not be resolved or failed while running.
    #[error(transparent)]
    Action(BoxError),

    /// A notification subscriber failed.
    #[error(transparent)]
    Notification(BoxError),

    /// The route cache could not be read or written.
    #[error(transparent)]
    Cache(BoxError),

    /// A route source failed while populating the table.
    #[error(transparent)]
    Discovery(BoxError),
}

impl RoutingError {
    /// HTTP status the transport layer should answer with.
    ///
    /// `RouteNotFound` maps to 404 and `MiddlewareFailed` to 401; collaborator
    /// failures map to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            RoutingError::RouteNotFound(_) => 404,
            RoutingError::MiddlewareFailed(_) => 401,
            _ => 500,
        }
    }

    /// Returns true for [`RoutingError::RouteNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, RoutingError::RouteNotFound(_))
    }

    /// Returns true for [`RoutingError::MiddlewareFailed`].
    pub fn is_middleware_failure(&self) -> bool {
        matches!(self, RoutingError::MiddlewareFailed(_))
    }
}

/// Errors raised while extracting a typed value from [`Params`].
///
/// [`Params`]: crate::Params
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The attribute is not present.
    #[error("missing route parameter `{0}`")]
    Missing(String),

    /// The attribute is present but cannot be converted.
    #[error("invalid route parameter `{name}`: {reason}")]
    Invalid {
        /// Attribute name.
        name: String,
        /// Why the conversion failed.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RoutingError::RouteNotFound("GET /".into()).status_code(), 404);
        assert_eq!(RoutingError::MiddlewareFailed("auth".into()).status_code(), 401);
        assert_eq!(RoutingError::Action("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_collaborator_error_is_transparent() {
        let io = std::io::Error::other("disk gone");
        let err = RoutingError::Cache(Box::new(io));
        assert_eq!(err.to_string(), "disk gone");
        assert!(!err.is_not_found());
    }
}
