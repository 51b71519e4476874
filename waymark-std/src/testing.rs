//! Testing utilities for waymark.
//!
//! This module provides collaborators that make dispatcher tests easier to
//! write and to assert on.
//!
//! # Features
//!
//! - [`StaticMiddleware`]: always allows or always rejects
//! - [`RecordingMiddleware`]: records every request it sees
//! - [`FailingMiddleware`]: raises an error instead of answering
//! - [`CountingAction`]: counts invocations and records their parameters
//! - [`RecordingNotifier`]: records every published event

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use waymark_core::{
    Action, BeforeResponseSend, BoxError, Middleware, Params, Publish, Reply, Request, Response,
    RouteDefinition, RouteFound,
};

// ============================================================================
// Static Middleware
// ============================================================================

/// A middleware with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticMiddleware(pub bool);

impl StaticMiddleware {
    /// Always allows.
    pub fn allow() -> Self {
        Self(true)
    }

    /// Always rejects.
    pub fn deny() -> Self {
        Self(false)
    }
}

impl Middleware for StaticMiddleware {
    fn handle(&self, _request: &Request) -> Result<bool, BoxError> {
        Ok(self.0)
    }
}

// ============================================================================
// Recording Middleware
// ============================================================================

/// A middleware that records every request and answers with a fixed result.
///
/// Clones share the same record, so keep one clone for assertions.
///
/// # Example
///
/// ```rust,ignore
/// let auth = RecordingMiddleware::allow();
/// let middlewares = MiddlewareRegistry::new().register("auth", auth.clone());
///
/// dispatcher.handle(&Request::get("/admin"))?;
/// assert_eq!(auth.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingMiddleware {
    requests: Arc<Mutex<Vec<Request>>>,
    result: bool,
}

impl RecordingMiddleware {
    /// A recorder that allows every request.
    pub fn allow() -> Self {
        Self::with_result(true)
    }

    /// A recorder that rejects every request.
    pub fn deny() -> Self {
        Self::with_result(false)
    }

    /// A recorder with a specific answer.
    pub fn with_result(result: bool) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    /// Get a clone of the recorded requests.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the number of recorded requests.
    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Middleware for RecordingMiddleware {
    fn handle(&self, request: &Request) -> Result<bool, BoxError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.result)
    }
}

// ============================================================================
// Failing Middleware
// ============================================================================

/// A middleware that raises `message` instead of answering.
#[derive(Debug, Clone)]
pub struct FailingMiddleware {
    message: String,
}

impl FailingMiddleware {
    /// Create a failing middleware.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Middleware for FailingMiddleware {
    fn handle(&self, _request: &Request) -> Result<bool, BoxError> {
        Err(self.message.clone().into())
    }
}

// ============================================================================
// Counting Action
// ============================================================================

/// An action that counts invocations and records the parameters it got.
///
/// # Example
///
/// ```rust,ignore
/// let action = CountingAction::new();
/// dispatcher.get("/users/{id}", RouteAction::handler(action.clone()));
///
/// dispatcher.handle(&Request::get("/users/42"))?;
/// assert_eq!(action.count(), 1);
/// assert_eq!(action.last_params().unwrap().str("id"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct CountingAction {
    count: Arc<AtomicUsize>,
    params: Arc<Mutex<Vec<Params>>>,
    response: Response,
}

impl CountingAction {
    /// An action replying with an empty response.
    pub fn new() -> Self {
        Self::with_response(Response::empty())
    }

    /// An action replying with `response`.
    pub fn with_response(response: Response) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            params: Arc::new(Mutex::new(Vec::new())),
            response,
        }
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Parameters of the most recent invocation.
    pub fn last_params(&self) -> Option<Params> {
        self.params.lock().unwrap().last().cloned()
    }

    /// Reset the counter and the recorded parameters.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
        self.params.lock().unwrap().clear();
    }
}

impl Default for CountingAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for CountingAction {
    fn call(&self, params: &Params) -> Result<Reply, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.params.lock().unwrap().push(params.clone());
        Ok(Reply::Response(self.response.clone()))
    }
}

// ============================================================================
// Recording Notifier
// ============================================================================

/// A notifier that records every event and passes it on unchanged.
///
/// Optionally replaces the route of [`RouteFound`] events, which lets a test
/// exercise the route-override point of the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    routes: Arc<Mutex<Vec<RouteDefinition>>>,
    responses: Arc<Mutex<Vec<Response>>>,
    replacement: Option<RouteDefinition>,
}

impl RecordingNotifier {
    /// Create a new recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the route of every [`RouteFound`] event with `route`.
    pub fn replacing_route(route: RouteDefinition) -> Self {
        Self {
            replacement: Some(route),
            ..Self::default()
        }
    }

    /// Routes received through [`RouteFound`], before any replacement.
    pub fn routes(&self) -> Vec<RouteDefinition> {
        self.routes.lock().unwrap().clone()
    }

    /// Responses received through [`BeforeResponseSend`].
    pub fn responses(&self) -> Vec<Response> {
        self.responses.lock().unwrap().clone()
    }
}

impl Publish<RouteFound> for RecordingNotifier {
    fn dispatch(&self, mut event: RouteFound) -> Result<RouteFound, BoxError> {
        self.routes.lock().unwrap().push(event.route().clone());
        if let Some(route) = &self.replacement {
            event.set_route(route.clone());
        }
        Ok(event)
    }
}

impl Publish<BeforeResponseSend> for RecordingNotifier {
    fn dispatch(&self, event: BeforeResponseSend) -> Result<BeforeResponseSend, BoxError> {
        self.responses
            .lock()
            .unwrap()
            .push(event.response().clone());
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_middleware_shares_record() {
        let mw = RecordingMiddleware::deny();
        let clone = mw.clone();
        assert!(!clone.handle(&Request::get("/a")).unwrap());
        assert_eq!(mw.count(), 1);
        assert_eq!(mw.requests()[0].path(), "/a");
    }

    #[test]
    fn test_counting_action_records_params() {
        let action = CountingAction::new();
        action.call(&Params::new().with("id", "1")).unwrap();
        action.call(&Params::new().with("id", "2")).unwrap();
        assert_eq!(action.count(), 2);
        assert_eq!(action.last_params().unwrap().str("id"), Some("2"));
    }
}
