#![allow(dead_code)]

use waymark::{
    ControllerRegistry, Dispatcher, MiddlewareRegistry, Params, Response, RouteAction,
    testing::{CountingAction, RecordingMiddleware},
};

// ============================================================================
// Actions
// ============================================================================

pub fn noop(_: &Params) {}

pub fn echo_id(params: &Params) -> String {
    params.str("id").unwrap_or_default().to_string()
}

pub fn counting() -> (CountingAction, RouteAction) {
    let action = CountingAction::new();
    let route_action = RouteAction::handler(action.clone());
    (action, route_action)
}

// ============================================================================
// Dispatchers
// ============================================================================

/// A dispatcher with an `allow` and a `deny` recording middleware.
pub struct Fixture {
    pub router: Dispatcher,
    pub allow: RecordingMiddleware,
    pub deny: RecordingMiddleware,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_controllers(ControllerRegistry::new())
    }

    pub fn with_controllers(controllers: ControllerRegistry) -> Self {
        let allow = RecordingMiddleware::allow();
        let deny = RecordingMiddleware::deny();
        let router = Dispatcher::builder()
            .middlewares(
                MiddlewareRegistry::new()
                    .register("allow", allow.clone())
                    .register("deny", deny.clone()),
            )
            .invoker(controllers)
            .build();

        Self {
            router,
            allow,
            deny,
        }
    }
}

/// A controller registry with `Users::show` and `Users::store`.
pub fn users_controller() -> ControllerRegistry {
    ControllerRegistry::new()
        .register("Users", "show", |params: &Params| {
            format!("user {}", params.str("id").unwrap_or("?"))
        })
        .register("Users", "store", |_: &Params| {
            Response::new("created").with_status(201)
        })
}
