//! # Dispatcher
//!
//! The dispatcher owns the route table and the ambient registration context,
//! and runs the request pipeline:
//!
//! 1. **Match**: the first route registered for the method whose path matches
//! 2. **Route found**: published; the notifier may replace the route
//! 3. **Middlewares**: run in order, the first rejection stops the request
//! 4. **Action**: invoked with the route attributes; payloads are wrapped in
//!    a default response
//! 5. **Before response send**: published; the notifier may replace the
//!    response
//!
//! Registration takes `&mut self`; matching and dispatch take `&self`, so a
//! fully built dispatcher can be shared between request threads.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut router = Dispatcher::builder()
//!     .middlewares(MiddlewareRegistry::new().register("auth", Auth))
//!     .build();
//!
//! router.route_with("/users/{id}", show_user, ["GET"], [("id", r"\d+")]);
//! router
//!     .group(|router| {
//!         router.post("/users", ("Users", "store"));
//!     })
//!     .prefix("/admin")
//!     .middleware("auth");
//!
//! let response = router.handle(&Request::get("/users/42"))?;
//! ```

use crate::{
    context::RegistrationContext,
    group::{Group, GroupContext},
    loader::{LoadOutcome, RouteLoader},
    path::{request_path, route_path},
};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, PoisonError, RwLock},
};
use waymark_core::{
    ALL_METHODS, ActionInvoker, BeforeResponseSend, IntoAction, MiddlewareContainer, Notifier,
    Params, Publish, Request, Response, RouteDefinition, RouteFound, RouteHandle, RouteTable,
    RoutingError,
};
use waymark_std::{controllers::ControllerRegistry, events::EventBus, middleware::MiddlewareRegistry};

/// Route registration and request dispatch.
pub struct Dispatcher {
    routes: RouteTable,
    context: RegistrationContext,
    middlewares: Arc<dyn MiddlewareContainer>,
    invoker: Arc<dyn ActionInvoker>,
    notifier: Arc<dyn Notifier>,
    current_route: RwLock<Option<RouteDefinition>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// A dispatcher with empty registries and a subscriber-less event bus.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register a `GET` (and `HEAD`) route.
    pub fn get(&mut self, path: &str, action: impl IntoAction) -> RouteHandle<'_> {
        self.route(path, action, ["HEAD", "GET"])
    }

    /// Register a `POST` route.
    pub fn post(&mut self, path: &str, action: impl IntoAction) -> RouteHandle<'_> {
        self.route(path, action, ["POST"])
    }

    /// Register a `PUT` route.
    pub fn put(&mut self, path: &str, action: impl IntoAction) -> RouteHandle<'_> {
        self.route(path, action, ["PUT"])
    }

    /// Register a `PATCH` route.
    pub fn patch(&mut self, path: &str, action: impl IntoAction) -> RouteHandle<'_> {
        self.route(path, action, ["PATCH"])
    }

    /// Register a `DELETE` route.
    pub fn delete(&mut self, path: &str, action: impl IntoAction) -> RouteHandle<'_> {
        self.route(path, action, ["DELETE"])
    }

    /// Register an `OPTIONS` route.
    pub fn options(&mut self, path: &str, action: impl IntoAction) -> RouteHandle<'_> {
        self.route(path, action, ["OPTIONS"])
    }

    /// Register a route answering every verb.
    pub fn any(&mut self, path: &str, action: impl IntoAction) -> RouteHandle<'_> {
        self.route(path, action, ALL_METHODS)
    }

    /// Register a route for `methods`.
    ///
    /// Methods are uppercased and `HEAD` is added next to `GET`. An empty
    /// method list registers every verb. The path is joined onto the ambient
    /// prefix and the route gets the ambient middlewares.
    pub fn route<I, S>(&mut self, path: &str, action: impl IntoAction, methods: I) -> RouteHandle<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.route_with(path, action, methods, std::iter::empty::<(String, String)>())
    }

    /// Register a route whose placeholders use `patterns`.
    ///
    /// The matcher is compiled here, so patterns added later through the
    /// returned handle do not change what the route matches.
    pub fn route_with<I, S, P, K, V>(
        &mut self,
        path: &str,
        action: impl IntoAction,
        methods: I,
        patterns: P,
    ) -> RouteHandle<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut methods: Vec<String> = methods
            .into_iter()
            .map(|m| m.as_ref().to_string())
            .collect();
        if methods.is_empty() {
            methods = ALL_METHODS.iter().map(|m| m.to_string()).collect();
        }

        let route = RouteDefinition::builder(route_path(&self.context.prefix, path), action)
            .methods(methods)
            .middlewares(self.context.middlewares.iter().cloned())
            .patterns(patterns)
            .build();

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                path = %route.path(),
                methods = ?route.methods(),
                middlewares = ?route.middlewares(),
                "Route registered"
            );
        }
        self.routes.add_route(route)
    }

    /// Insert a fully built route as is.
    pub fn add_route(&mut self, route: RouteDefinition) -> RouteHandle<'_> {
        self.routes.add_route(route)
    }

    /// Run `f` with `group` applied to the registration context.
    ///
    /// The previous context is restored afterwards, also if `f` panics (the
    /// panic then continues).
    pub fn with_group<F, T>(&mut self, group: Group, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let outer = self.context.clone();
        self.context = group.compose(&outer);

        #[cfg(feature = "tracing")]
        {
            tracing::trace!(prefix = %self.context.prefix, middlewares = ?self.context.middlewares, name = ?group.name, "Entering route group");
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| f(self)));
        self.context = outer;

        #[cfg(feature = "tracing")]
        {
            tracing::trace!(prefix = %self.context.prefix, "Leaving route group");
        }

        match result {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// A group whose `callback` runs when the returned context is dropped.
    pub fn group<'a, F>(&'a mut self, callback: F) -> GroupContext<'a>
    where
        F: FnOnce(&mut Dispatcher) + 'a,
    {
        GroupContext::new(self, callback)
    }

    /// The ambient registration context.
    pub fn context(&self) -> &RegistrationContext {
        &self.context
    }

    // ------------------------------------------------------------------------
    // Routes
    // ------------------------------------------------------------------------

    /// The route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Replace the route table.
    pub fn set_routes(&mut self, routes: RouteTable) {
        self.routes = routes;
    }

    /// Populate the route table through `loader`.
    pub fn load_routes(&mut self, loader: &RouteLoader) -> Result<LoadOutcome, RoutingError> {
        loader.load(self)
    }

    /// Look up a route by name.
    pub fn find_route_by_name(&self, name: &str) -> Result<&RouteDefinition, RoutingError> {
        self.routes.find_route_by_name(name)
    }

    /// The route selected by the most recent request.
    pub fn current_route(&self) -> Option<RouteDefinition> {
        self.current_route
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current_route(&self, route: &RouteDefinition) {
        *self
            .current_route
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(route.clone());
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Find the route for `method` and `path`.
    ///
    /// Candidates are tried in registration order and the first match wins.
    /// The returned route is a copy carrying the captured path parameters in
    /// its attributes; the table itself is not modified.
    pub fn find_route_by_uri(&self, path: &str, method: &str) -> Result<RouteDefinition, RoutingError> {
        let path = request_path(path);

        for candidate in self.routes.routes_by_method(method) {
            if let Some(captured) = candidate.capture(&path) {
                let mut route = candidate.clone();
                route.add_attributes(captured);

                #[cfg(feature = "tracing")]
                {
                    tracing::debug!(%method, %path, route = %route.path(), "Route matched");
                }
                return Ok(route);
            }
        }

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(%method, %path, "No route matched");
        }
        Err(RoutingError::RouteNotFound(format!("{method} {path}")))
    }

    /// Run the route's middlewares in order.
    ///
    /// The first middleware answering `false` stops the chain with
    /// [`RoutingError::MiddlewareFailed`]. A middleware that cannot be
    /// resolved or raises an error yields [`RoutingError::Middleware`]
    /// carrying that error.
    pub fn validate_middlewares(
        &self,
        route: RouteDefinition,
        request: &Request,
    ) -> Result<RouteDefinition, RoutingError> {
        for name in route.middlewares() {
            let middleware = self.middlewares.resolve(name).map_err(RoutingError::Middleware)?;

            if !middleware.handle(request).map_err(RoutingError::Middleware)? {
                #[cfg(feature = "tracing")]
                {
                    tracing::info!(middleware = %name, path = %request.path(), "Middleware rejected request");
                }
                return Err(RoutingError::MiddlewareFailed(name.clone()));
            }
        }
        Ok(route)
    }

    /// Dispatch `request` through the pipeline.
    pub fn handle(&self, request: &Request) -> Result<Response, RoutingError> {
        let route = self.find_route_by_uri(request.path(), request.method())?;

        let route = <dyn Notifier as Publish<RouteFound>>::dispatch(
            self.notifier.as_ref(),
            RouteFound::new(route),
        )
        .map_err(RoutingError::Notification)?
        .into_route();
        self.set_current_route(&route);

        let route = self.validate_middlewares(route, request)?;

        let params = Params::from(route.attributes().clone());
        let response = self
            .invoker
            .invoke(&route.action(), &params)
            .map_err(RoutingError::Action)?
            .into_response();

        let response = <dyn Notifier as Publish<BeforeResponseSend>>::dispatch(
            self.notifier.as_ref(),
            BeforeResponseSend::new(response),
        )
        .map_err(RoutingError::Notification)?
        .into_response();

        Ok(response)
    }
}

/// Builder for constructing a [`Dispatcher`].
pub struct DispatcherBuilder {
    routes: RouteTable,
    middlewares: Arc<dyn MiddlewareContainer>,
    invoker: Arc<dyn ActionInvoker>,
    notifier: Arc<dyn Notifier>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    /// Defaults: empty [`MiddlewareRegistry`], empty [`ControllerRegistry`]
    /// and an [`EventBus`] without subscribers.
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            middlewares: Arc::new(MiddlewareRegistry::new()),
            invoker: Arc::new(ControllerRegistry::new()),
            notifier: Arc::new(EventBus::new()),
        }
    }

    /// Start from an existing route table.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Set the middleware container.
    pub fn middlewares(mut self, middlewares: impl MiddlewareContainer + 'static) -> Self {
        self.middlewares = Arc::new(middlewares);
        self
    }

    /// Set the action invoker.
    pub fn invoker(mut self, invoker: impl ActionInvoker + 'static) -> Self {
        self.invoker = Arc::new(invoker);
        self
    }

    /// Set the notifier.
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            routes: self.routes,
            context: RegistrationContext::new(),
            middlewares: self.middlewares,
            invoker: self.invoker,
            notifier: self.notifier,
            current_route: RwLock::new(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use waymark_std::testing::{CountingAction, StaticMiddleware};

    fn noop(_: &Params) {}

    #[test]
    fn test_get_registers_head() {
        let mut router = Dispatcher::new();
        router.get("/x", noop);

        assert_eq!(router.routes().routes_by_method("HEAD").count(), 1);
        assert_eq!(router.routes().routes_by_method("GET").count(), 1);
    }

    #[test]
    fn test_route_normalizes_methods() {
        let mut router = Dispatcher::new();
        let handle = router.route("/x", noop, ["get", "post"]);
        assert_eq!(handle.route().methods(), ["GET", "POST", "HEAD"]);
    }

    #[test]
    fn test_empty_methods_register_every_verb() {
        let mut router = Dispatcher::new();
        router.route("/x", noop, Vec::<&str>::new());
        for method in ALL_METHODS {
            assert_eq!(router.routes().routes_by_method(method).count(), 1);
        }
    }

    #[test]
    fn test_string_action_uses_invoke() {
        let mut router = Dispatcher::new();
        let handle = router.get("/x", "HomeController");
        assert!(matches!(
            handle.route().stored_action(),
            waymark_core::RouteAction::Controller { method, .. } if method == waymark_core::INVOKE_METHOD
        ));
    }

    #[test]
    fn test_route_with_compiles_patterns() {
        let mut router = Dispatcher::new();
        router.route_with("/users/{id}", noop, ["GET"], [("id", r"\d+")]);

        assert!(router.find_route_by_uri("/users/abc", "GET").is_err());
        assert!(router.find_route_by_uri("/users/12", "GET").is_ok());
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let mut router = Dispatcher::new();
        router.get("/users", noop);
        router.get("/", noop);

        assert_eq!(router.find_route_by_uri("/users/", "GET").unwrap().path(), "/users");
        assert_eq!(router.find_route_by_uri("/", "GET").unwrap().path(), "/");
    }

    #[test]
    fn test_method_mismatch_is_not_found() {
        let mut router = Dispatcher::new();
        router.post("/users", noop);
        let err = router.find_route_by_uri("/users", "GET").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_matching_does_not_mutate_table() {
        let mut router = Dispatcher::new();
        router.get("/users/{id}", noop);

        let found = router.find_route_by_uri("/users/7", "GET").unwrap();
        assert_eq!(found.attributes().get("id"), Some(&json!("7")));
        assert!(router.routes().all_routes()[0].attributes().is_empty());
    }

    #[test]
    fn test_with_group_restores_on_panic() {
        let mut router = Dispatcher::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            router.with_group(Group::new("/api").middleware("auth"), |r| {
                r.get("/x", noop);
                panic!("registration failed");
            })
        }));

        assert!(result.is_err());
        assert_eq!(router.context(), &RegistrationContext::new());
        assert_eq!(router.routes().all_routes()[0].path(), "/api/x");
    }

    #[test]
    fn test_current_route_is_recorded() {
        let action = CountingAction::new();
        let mut router = Dispatcher::new();
        router.get("/users/{id}", waymark_core::RouteAction::handler(action.clone()));

        assert!(router.current_route().is_none());
        router.handle(&Request::get("/users/5")).unwrap();

        let current = router.current_route().unwrap();
        assert_eq!(current.path(), "/users/{id}");
        assert_eq!(current.attributes().get("id"), Some(&json!("5")));
        assert_eq!(action.count(), 1);
    }

    #[test]
    fn test_unknown_middleware_is_a_collaborator_error() {
        let mut router = Dispatcher::builder()
            .middlewares(MiddlewareRegistry::new().register("allow", StaticMiddleware::allow()))
            .build();
        router.get("/x", noop).add_middleware("allow").add_middleware("missing");

        let err = router.handle(&Request::get("/x")).unwrap_err();
        assert!(matches!(err, RoutingError::Middleware(_)));
        assert_eq!(err.status_code(), 500);
    }
}
