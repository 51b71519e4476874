//! Logging subscriber for notification observation.

use waymark_core::{BeforeResponseSend, BoxError, RouteFound, Subscriber};

/// A subscriber that logs each notification and passes it on unchanged.
///
/// ```rust,ignore
/// let bus = EventBus::builder()
///     .on_route_found(LoggingSubscriber)
///     .on_before_response_send(LoggingSubscriber)
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubscriber;

impl Subscriber<RouteFound> for LoggingSubscriber {
    fn notify(&self, event: RouteFound) -> Result<RouteFound, BoxError> {
        #[cfg(feature = "tracing")]
        {
            let route = event.route();
            tracing::info!(
                path = %route.path(),
                name = ?route.name(),
                attributes = ?route.attributes(),
                "Route found"
            );
        }
        Ok(event)
    }
}

impl Subscriber<BeforeResponseSend> for LoggingSubscriber {
    fn notify(&self, event: BeforeResponseSend) -> Result<BeforeResponseSend, BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(status = event.response().status(), "Sending response");
        }
        Ok(event)
    }
}
