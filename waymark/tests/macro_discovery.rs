//! Routes declared with `#[waymark::route]` and discovered at load time.

#![cfg(feature = "macros")]

use lazy_static::lazy_static;
use std::{
    sync::Mutex,
    time::{Duration, SystemTime},
};
use waymark::{
    ControllerRegistry, Dispatcher, ExtractError, Group, MemoryCache, MiddlewareRegistry, Params,
    Request, Response, RouteAction, RouteLoader, discovery, loader::ControllerSource,
    testing::StaticMiddleware,
};

lazy_static! {
    static ref STORED: Mutex<Vec<String>> = Mutex::new(Vec::new());
}

#[waymark::route("/posts/{id}", methods = ["GET"], name = "posts.show", patterns(id = "\\d+"))]
fn show_post(params: &Params) -> Result<String, ExtractError> {
    let id: u64 = params.parse("id")?;
    Ok(format!("post {id}"))
}

#[waymark::route("/posts", methods = ["post"], middleware = ["auth"], attributes(kind = "article"))]
fn store_post(params: &Params) -> Response {
    STORED
        .lock()
        .unwrap()
        .push(params.str("kind").unwrap_or_default().to_string());
    Response::new("stored").with_status(201)
}

#[waymark::route("/about")]
fn about() -> &'static str {
    "about"
}

fn source() -> ControllerSource {
    ControllerSource::new().modified_at(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000))
}

fn dispatcher() -> Dispatcher {
    Dispatcher::builder()
        .middlewares(MiddlewareRegistry::new().register("auth", StaticMiddleware::allow()))
        .invoker(ControllerRegistry::discovered())
        .build()
}

fn loaded() -> Dispatcher {
    let mut router = dispatcher();
    router
        .load_routes(&RouteLoader::new(MemoryCache::new()).controllers(source()))
        .unwrap();
    router
}

#[test]
fn test_registrations_are_collected() {
    let mut methods: Vec<&str> = discovery::registrations().map(|r| r.method).collect();
    methods.sort_unstable();
    assert_eq!(methods, ["about", "show_post", "store_post"]);

    let show = discovery::registrations()
        .find(|r| r.method == "show_post")
        .unwrap();
    assert_eq!(show.controller, module_path!());
    assert_eq!(show.name, Some("posts.show"));
    assert_eq!(show.patterns, [("id", "\\d+")]);
}

#[test]
fn test_discovered_routes_dispatch() {
    let router = loaded();

    let response = router.handle(&Request::get("/posts/42")).unwrap();
    assert_eq!(response.body(), "post 42");
    assert!(router.find_route_by_uri("/posts/latest", "GET").is_err());
}

#[test]
fn test_discovered_route_metadata() {
    let router = loaded();

    let route = router.find_route_by_name("posts.show").unwrap();
    assert_eq!(route.path(), "/posts/{id}");
    assert!(matches!(
        route.stored_action(),
        RouteAction::Controller { controller, method }
            if controller == module_path!() && method == "show_post"
    ));

    let about = router.find_route_by_uri("/about", "HEAD").unwrap();
    assert_eq!(about.methods(), ["HEAD", "GET"]);
}

#[test]
fn test_discovered_middlewares_and_attributes() {
    let router = loaded();

    let response = router.handle(&Request::post("/posts")).unwrap();
    assert_eq!(response.status(), 201);
    assert!(STORED.lock().unwrap().contains(&"article".to_string()));
}

#[test]
fn test_discovery_honors_group_prefix() {
    let loader = RouteLoader::new(MemoryCache::new()).controllers(source());
    let mut router = dispatcher();
    router.with_group(Group::new("/blog"), |router| {
        router.load_routes(&loader).unwrap();
    });

    assert!(router.handle(&Request::get("/blog/about")).is_ok());
    assert!(router.handle(&Request::get("/about")).is_err());
}

#[test]
fn test_discovered_table_survives_cache() {
    let loader = RouteLoader::new(MemoryCache::new()).controllers(source());
    dispatcher().load_routes(&loader).unwrap();

    let mut router = dispatcher();
    assert!(router.load_routes(&loader).unwrap().is_cached());
    assert_eq!(router.handle(&Request::get("/posts/7")).unwrap().body(), "post 7");
}
