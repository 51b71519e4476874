//! Named handler registry and the default action invoker.
//!
//! Routes that must survive the route cache refer to their handler by a
//! `(controller, method)` pair. [`ControllerRegistry`] maps those pairs back to
//! code at dispatch time and invokes in-memory handlers directly.

use crate::error::RegistryError;
use std::{collections::HashMap, sync::Arc};
use waymark_core::{Action, ActionInvoker, BoxError, Params, Reply, Response, RouteAction};

/// Maps `(controller, method)` pairs to handlers.
///
/// # Example
///
/// ```rust,ignore
/// let controllers = ControllerRegistry::new()
///     .register("Users", "show", |params: &Params| {
///         let id: u64 = params.parse("id")?;
///         Ok::<_, ExtractError>(format!("user {id}"))
///     });
/// ```
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    actions: HashMap<(String, String), Arc<dyn Action>>,
}

impl ControllerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for `controller::method`, replacing any previous one.
    pub fn register<A: Action>(
        mut self,
        controller: impl Into<String>,
        method: impl Into<String>,
        action: A,
    ) -> Self {
        self.insert(controller, method, action);
        self
    }

    /// Register in place.
    pub fn insert<A: Action>(
        &mut self,
        controller: impl Into<String>,
        method: impl Into<String>,
        action: A,
    ) {
        self.actions
            .insert((controller.into(), method.into()), Arc::new(action));
    }

    /// Look up the handler for `controller::method`.
    pub fn get(&self, controller: &str, method: &str) -> Option<&Arc<dyn Action>> {
        self.actions
            .get(&(controller.to_string(), method.to_string()))
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// A registry holding every handler submitted with `#[route]`.
    #[cfg(feature = "inventory")]
    pub fn discovered() -> Self {
        let mut registry = Self::new();
        for registration in crate::discovery::registrations() {
            registry.insert(
                registration.controller,
                registration.method,
                registration.handler,
            );
        }
        registry
    }
}

impl ActionInvoker for ControllerRegistry {
    fn invoke(&self, action: &RouteAction, params: &Params) -> Result<Reply, BoxError> {
        match action {
            RouteAction::Handler(handler) => handler.call(params),
            RouteAction::Controller { controller, method } => {
                let handler = self.get(controller, method).ok_or_else(|| {
                    RegistryError::UnknownController {
                        controller: controller.clone(),
                        method: method.clone(),
                    }
                })?;
                handler.call(params)
            }
            RouteAction::Detached => Ok(Reply::Response(Response::empty())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invokes_named_handler() {
        let registry = ControllerRegistry::new().register("Users", "show", |p: &Params| {
            format!("user {}", p.str("id").unwrap_or("?"))
        });

        let reply = registry
            .invoke(
                &RouteAction::controller("Users", "show"),
                &Params::new().with("id", "42"),
            )
            .unwrap();
        assert_eq!(reply.into_response().body(), &json!("user 42"));
    }

    #[test]
    fn test_invokes_handler_directly() {
        let registry = ControllerRegistry::new();
        let action = RouteAction::handler(|_: &Params| "inline");
        let reply = registry.invoke(&action, &Params::new()).unwrap();
        assert_eq!(reply.into_response().body(), &json!("inline"));
    }

    #[test]
    fn test_unknown_controller() {
        let registry = ControllerRegistry::new();
        let err = registry
            .invoke(&RouteAction::controller("Users", "show"), &Params::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown controller action `Users::show`");
    }

    #[test]
    fn test_handler_error_is_returned_unmodified() {
        let registry = ControllerRegistry::new().register("Users", "show", |p: &Params| {
            p.parse::<u64>("id").map(|id| id.to_string())
        });
        let err = registry
            .invoke(
                &RouteAction::controller("Users", "show"),
                &Params::new().with("id", "abc"),
            )
            .unwrap_err();
        assert!(err.downcast_ref::<waymark_core::ExtractError>().is_some());
    }
}
