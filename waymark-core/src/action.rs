//! # Route Actions
//!
//! An action is what a route runs once it has been matched and its middleware
//! chain has passed. A route stores it as a [`RouteAction`]:
//!
//! - **Handler**: an in-memory function value, called directly
//! - **Controller**: a named `(controller, method)` pair, resolved at call time
//!   through an [`ActionInvoker`] (usually a registry of named handlers)
//! - **Detached**: a handler that did not survive serialization
//!
//! Only controller pairs survive a round trip through the route cache; an
//! in-memory handler comes back detached and degrades to an empty response.

use crate::{error::BoxError, params::Params, response::IntoReply, response::Reply};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Method name used when an action is given as a bare controller name.
pub const INVOKE_METHOD: &str = "__invoke";

/// A route endpoint.
///
/// Implemented for every `Fn(&Params) -> R` where `R: IntoReply`, so plain
/// functions and closures work directly.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a route action",
    label = "missing `Action` implementation",
    note = "Actions are `Fn(&Params) -> impl IntoReply`; annotate closure arguments as `|params: &Params|`."
)]
pub trait Action: Send + Sync + 'static {
    /// Run the action with the route's attributes as named inputs.
    fn call(&self, params: &Params) -> Result<Reply, BoxError>;
}

// Blanket impl for closures
impl<F, R> Action for F
where
    F: Fn(&Params) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    fn call(&self, params: &Params) -> Result<Reply, BoxError> {
        (self)(params).into_reply()
    }
}

/// The action stored on a route.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "ActionRecord", into = "ActionRecord")]
pub enum RouteAction {
    /// An in-memory function value.
    Handler(Arc<dyn Action>),
    /// A named pair resolved through an [`ActionInvoker`].
    Controller {
        /// Controller (handler type) name.
        controller: String,
        /// Method name on the controller.
        method: String,
    },
    /// A handler that could not be restored after deserialization.
    Detached,
}

impl RouteAction {
    /// Wrap a function value.
    pub fn handler<A: Action>(action: A) -> Self {
        RouteAction::Handler(Arc::new(action))
    }

    /// A named `(controller, method)` pair.
    pub fn controller(controller: impl Into<String>, method: impl Into<String>) -> Self {
        RouteAction::Controller {
            controller: controller.into(),
            method: method.into(),
        }
    }

    /// True if the handler could not be restored.
    pub fn is_detached(&self) -> bool {
        matches!(self, RouteAction::Detached)
    }
}

impl fmt::Debug for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteAction::Handler(_) => f.write_str("Handler(..)"),
            RouteAction::Controller { controller, method } => f
                .debug_struct("Controller")
                .field("controller", controller)
                .field("method", method)
                .finish(),
            RouteAction::Detached => f.write_str("Detached"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ActionRecord {
    Closure,
    Controller { controller: String, method: String },
}

impl From<RouteAction> for ActionRecord {
    fn from(action: RouteAction) -> Self {
        match action {
            RouteAction::Controller { controller, method } => {
                ActionRecord::Controller { controller, method }
            }
            RouteAction::Handler(_) | RouteAction::Detached => ActionRecord::Closure,
        }
    }
}

impl From<ActionRecord> for RouteAction {
    fn from(record: ActionRecord) -> Self {
        match record {
            ActionRecord::Controller { controller, method } => {
                RouteAction::Controller { controller, method }
            }
            ActionRecord::Closure => RouteAction::Detached,
        }
    }
}

/// Conversion into a [`RouteAction`], accepted by every registration verb.
///
/// - functions and closures → [`RouteAction::Handler`]
/// - `(controller, method)` → [`RouteAction::Controller`]
/// - a bare controller name → `(name, INVOKE_METHOD)`
pub trait IntoAction {
    /// Perform the conversion.
    fn into_action(self) -> RouteAction;
}

impl IntoAction for RouteAction {
    fn into_action(self) -> RouteAction {
        self
    }
}

impl IntoAction for &str {
    fn into_action(self) -> RouteAction {
        RouteAction::controller(self, INVOKE_METHOD)
    }
}

impl IntoAction for String {
    fn into_action(self) -> RouteAction {
        RouteAction::controller(self, INVOKE_METHOD)
    }
}

impl IntoAction for (&str, &str) {
    fn into_action(self) -> RouteAction {
        RouteAction::controller(self.0, self.1)
    }
}

impl IntoAction for (String, String) {
    fn into_action(self) -> RouteAction {
        RouteAction::controller(self.0, self.1)
    }
}

impl<F, R> IntoAction for F
where
    F: Fn(&Params) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    fn into_action(self) -> RouteAction {
        RouteAction::handler(self)
    }
}

/// Invokes a resolved action with its named inputs.
///
/// This is the argument-resolution seam: implementations decide how
/// controller pairs map to code and how attributes reach it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot invoke route actions",
    label = "missing `ActionInvoker` implementation"
)]
pub trait ActionInvoker: Send + Sync {
    /// Invoke `action`. Failures are returned unmodified.
    fn invoke(&self, action: &RouteAction, params: &Params) -> Result<Reply, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    fn echo(params: &Params) -> String {
        params.str("id").unwrap_or_default().to_string()
    }

    #[test]
    fn test_bare_name_uses_invoke_method() {
        match "UserController".into_action() {
            RouteAction::Controller { controller, method } => {
                assert_eq!(controller, "UserController");
                assert_eq!(method, INVOKE_METHOD);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_function_is_a_handler() {
        let action = echo.into_action();
        let RouteAction::Handler(handler) = action else {
            panic!("expected a handler");
        };
        let reply = handler.call(&Params::new().with("id", "7")).unwrap();
        assert_eq!(reply.into_response(), Response::new("7"));
    }

    #[test]
    fn test_handler_serializes_as_detached() {
        let action = RouteAction::handler(|_: &Params| "hi");
        let json = serde_json::to_string(&action).unwrap();
        let back: RouteAction = serde_json::from_str(&json).unwrap();
        assert!(back.is_detached());
    }

    #[test]
    fn test_controller_round_trips() {
        let action = RouteAction::controller("Users", "show");
        let json = serde_json::to_string(&action).unwrap();
        let back: RouteAction = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, RouteAction::Controller { ref method, .. } if method == "show"));
    }
}
