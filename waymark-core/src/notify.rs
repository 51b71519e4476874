//! # Notifications
//!
//! The dispatcher publishes two events per request:
//!
//! 1. [`RouteFound`] after matching, before middlewares run
//! 2. [`BeforeResponseSend`] after the action, before the response is returned
//!
//! Publishing hands the event to the [`Notifier`] and takes back whatever it
//! returns. A subscriber may replace the route or the response carried by the
//! event; the dispatcher continues with the replacement. This is the only
//! point where a collaborator can override route selection.

use crate::{error::BoxError, response::Response, route::RouteDefinition};

/// Published after a route was matched.
#[derive(Debug, Clone)]
pub struct RouteFound {
    route: RouteDefinition,
}

impl RouteFound {
    /// Wrap a matched route.
    pub fn new(route: RouteDefinition) -> Self {
        Self { route }
    }

    /// The route the dispatcher will continue with.
    pub fn route(&self) -> &RouteDefinition {
        &self.route
    }

    /// Mutable access to the route.
    pub fn route_mut(&mut self) -> &mut RouteDefinition {
        &mut self.route
    }

    /// Replace the route.
    pub fn set_route(&mut self, route: RouteDefinition) {
        self.route = route;
    }

    /// Unwrap the route.
    pub fn into_route(self) -> RouteDefinition {
        self.route
    }
}

/// Published right before a response leaves the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeResponseSend {
    response: Response,
}

impl BeforeResponseSend {
    /// Wrap a response.
    pub fn new(response: Response) -> Self {
        Self { response }
    }

    /// The response that will be returned.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Mutable access to the response.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Replace the response.
    pub fn set_response(&mut self, response: Response) {
        self.response = response;
    }

    /// Unwrap the response.
    pub fn into_response(self) -> Response {
        self.response
    }
}

/// Publishes events of type `E` and returns the (possibly replaced) event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot publish `{E}`",
    label = "missing `Publish<{E}>` implementation"
)]
pub trait Publish<E>: Send + Sync {
    /// Hand `event` to every subscriber and return the result.
    fn dispatch(&self, event: E) -> Result<E, BoxError>;
}

/// A notifier the dispatcher can publish both of its events through.
pub trait Notifier: Publish<RouteFound> + Publish<BeforeResponseSend> {}

impl<T> Notifier for T where T: Publish<RouteFound> + Publish<BeforeResponseSend> {}

/// Receives events of type `E` from a notifier.
///
/// Implemented for every `Fn(E) -> Result<E, BoxError>`.
pub trait Subscriber<E>: Send + Sync + 'static {
    /// Handle the event, returning it (possibly modified) for the next
    /// subscriber.
    fn notify(&self, event: E) -> Result<E, BoxError>;
}

// Blanket impl for closures
impl<F, E> Subscriber<E> for F
where
    F: Fn(E) -> Result<E, BoxError> + Send + Sync + 'static,
{
    fn notify(&self, event: E) -> Result<E, BoxError> {
        (self)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_subscriber_can_replace_response() {
        let teapot = |mut event: BeforeResponseSend| -> Result<_, BoxError> {
            event.response_mut().set_status(418);
            Ok(event)
        };

        let event = teapot
            .notify(BeforeResponseSend::new(Response::empty()))
            .unwrap();
        assert_eq!(event.response().status(), 418);
    }
}
