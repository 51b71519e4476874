//! In-process publish/subscribe notifier.
//!
//! [`EventBus`] passes each event through its subscribers in registration
//! order. Every subscriber receives the event returned by the previous one,
//! so a later subscriber sees (and may undo) an earlier replacement. The first
//! failing subscriber stops the chain.

use std::sync::Arc;
use waymark_core::{BeforeResponseSend, BoxError, Publish, RouteFound, Subscriber};

/// The standard [`Notifier`](waymark_core::Notifier).
#[derive(Default, Clone)]
pub struct EventBus {
    route_found: Vec<Arc<dyn Subscriber<RouteFound>>>,
    before_response_send: Vec<Arc<dyn Subscriber<BeforeResponseSend>>>,
}

impl EventBus {
    /// A bus without subscribers. Publishing returns events unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a bus.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    /// Total number of subscribers.
    pub fn len(&self) -> usize {
        self.route_found.len() + self.before_response_send.len()
    }

    /// Check if there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fold<E: 'static>(subscribers: &[Arc<dyn Subscriber<E>>], event: E) -> Result<E, BoxError> {
    subscribers
        .iter()
        .try_fold(event, |event, subscriber| subscriber.notify(event))
}

impl Publish<RouteFound> for EventBus {
    fn dispatch(&self, event: RouteFound) -> Result<RouteFound, BoxError> {
        fold(&self.route_found, event)
    }
}

impl Publish<BeforeResponseSend> for EventBus {
    fn dispatch(&self, event: BeforeResponseSend) -> Result<BeforeResponseSend, BoxError> {
        fold(&self.before_response_send, event)
    }
}

/// Builder for constructing an [`EventBus`].
#[derive(Default)]
pub struct EventBusBuilder {
    bus: EventBus,
}

impl EventBusBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to [`RouteFound`].
    pub fn on_route_found<S: Subscriber<RouteFound>>(mut self, subscriber: S) -> Self {
        self.bus.route_found.push(Arc::new(subscriber));
        self
    }

    /// Subscribe to [`BeforeResponseSend`].
    pub fn on_before_response_send<S: Subscriber<BeforeResponseSend>>(
        mut self,
        subscriber: S,
    ) -> Self {
        self.bus.before_response_send.push(Arc::new(subscriber));
        self
    }

    /// Build the bus.
    pub fn build(self) -> EventBus {
        self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::Response;

    #[test]
    fn test_subscribers_fold_in_order() {
        let bus = EventBus::builder()
            .on_before_response_send(|mut e: BeforeResponseSend| -> Result<_, BoxError> {
                e.response_mut().set_status(201);
                Ok(e)
            })
            .on_before_response_send(|mut e: BeforeResponseSend| -> Result<_, BoxError> {
                let status = e.response().status() + 1;
                e.response_mut().set_status(status);
                Ok(e)
            })
            .build();

        let event = bus
            .dispatch(BeforeResponseSend::new(Response::empty()))
            .unwrap();
        assert_eq!(event.response().status(), 202);
    }

    #[test]
    fn test_failing_subscriber_stops_chain() {
        let bus = EventBus::builder()
            .on_before_response_send(
                |_: BeforeResponseSend| -> Result<BeforeResponseSend, BoxError> {
                    Err("subscriber down".into())
                },
            )
            .on_before_response_send(
                |_: BeforeResponseSend| -> Result<BeforeResponseSend, BoxError> {
                    panic!("must not run")
                },
            )
            .build();

        let err = bus
            .dispatch(BeforeResponseSend::new(Response::empty()))
            .unwrap_err();
        assert_eq!(err.to_string(), "subscriber down");
    }

    #[test]
    fn test_empty_bus_passes_through() {
        let bus = EventBus::new();
        let event = bus
            .dispatch(BeforeResponseSend::new(Response::new("x")))
            .unwrap();
        assert_eq!(event.response(), &Response::new("x"));
    }
}
