//! Route-found and before-response-send notifications.

use serde_json::json;
use waymark::{
    BeforeResponseSend, BoxError, Dispatcher, EventBus, LoggingSubscriber, Params, Request,
    Response, RouteDefinition, RouteFound, RoutingError, testing::RecordingNotifier,
};

mod common;
use common::{counting, noop};

#[test]
fn test_notifier_sees_matched_route_and_response() {
    let notifier = RecordingNotifier::new();
    let mut router = Dispatcher::builder().notifier(notifier.clone()).build();
    router.get("/users/{id}", |params: &Params| json!({ "id": params.str("id") }));

    router.handle(&Request::get("/users/8")).unwrap();

    let routes = notifier.routes();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].attributes().get("id"), Some(&json!("8")));
    assert_eq!(notifier.responses()[0].body(), &json!({ "id": "8" }));
}

#[test]
fn test_route_found_replacement_is_dispatched() {
    let (replacement_action, replacement) = counting();
    let (original_action, original) = counting();

    let notifier =
        RecordingNotifier::replacing_route(RouteDefinition::new("/maintenance", replacement));
    let mut router = Dispatcher::builder().notifier(notifier).build();
    router.get("/users", original);

    router.handle(&Request::get("/users")).unwrap();

    assert_eq!(original_action.count(), 0);
    assert_eq!(replacement_action.count(), 1);
    assert_eq!(router.current_route().unwrap().path(), "/maintenance");
}

#[test]
fn test_replacement_route_middlewares_are_validated() {
    let replacement = RouteDefinition::builder("/locked", noop)
        .middlewares(["missing"])
        .build();
    let mut router = Dispatcher::builder()
        .notifier(RecordingNotifier::replacing_route(replacement))
        .build();
    router.get("/open", noop);

    let err = router.handle(&Request::get("/open")).unwrap_err();
    assert!(matches!(err, RoutingError::Middleware(_)));
}

#[test]
fn test_response_replacement_is_returned() {
    let bus = EventBus::builder()
        .on_before_response_send(LoggingSubscriber)
        .on_before_response_send(|mut event: BeforeResponseSend| -> Result<_, BoxError> {
            event.response_mut().insert_header("x-served-by", "waymark");
            Ok(event)
        })
        .on_before_response_send(|event: BeforeResponseSend| -> Result<_, BoxError> {
            let status = event.response().status();
            Ok(BeforeResponseSend::new(
                Response::new(json!({ "wrapped": status })).with_status(status),
            ))
        })
        .build();
    let mut router = Dispatcher::builder().notifier(bus).build();
    router.get("/", |_: &Params| "home");

    let response = router.handle(&Request::get("/")).unwrap();

    // The last subscriber discarded the header set before it.
    assert_eq!(response.header("x-served-by"), None);
    assert_eq!(response.body(), &json!({ "wrapped": 200 }));
}

#[test]
fn test_failing_subscriber_stops_dispatch() {
    let (action, route_action) = counting();
    let bus = EventBus::builder()
        .on_route_found(LoggingSubscriber)
        .on_route_found(|_: RouteFound| -> Result<RouteFound, BoxError> {
            Err("route vetoed".into())
        })
        .build();
    let mut router = Dispatcher::builder().notifier(bus).build();
    router.get("/x", route_action);

    let err = router.handle(&Request::get("/x")).unwrap_err();

    assert!(matches!(err, RoutingError::Notification(_)));
    assert_eq!(err.to_string(), "route vetoed");
    assert_eq!(action.count(), 0);
}

#[test]
fn test_not_found_publishes_nothing() {
    let notifier = RecordingNotifier::new();
    let router = Dispatcher::builder().notifier(notifier.clone()).build();

    assert!(router.handle(&Request::get("/missing")).is_err());
    assert!(notifier.routes().is_empty());
    assert!(notifier.responses().is_empty());
}
