//! # waymark - Request Routing and Dispatch
//!
//! `waymark` maps an HTTP method + path to a registered action, runs an
//! ordered chain of pass/fail middlewares and invokes the action with the
//! captured path parameters.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use waymark::prelude::*;
//!
//! fn show_user(params: &Params) -> Result<String, ExtractError> {
//!     let id: u64 = params.parse("id")?;
//!     Ok(format!("user {id}"))
//! }
//!
//! let mut router = Dispatcher::builder()
//!     .middlewares(MiddlewareRegistry::new().register("auth", |req: &Request| {
//!         req.header("authorization").is_some()
//!     }))
//!     .build();
//!
//! router.route_with("/users/{id}", show_user, ["GET"], [("id", r"\d+")]);
//! router
//!     .group(|router| {
//!         router.delete("/users/{id}", ("Users", "destroy"));
//!     })
//!     .prefix("/admin")
//!     .middleware("auth");
//!
//! let response = router.handle(&Request::get("/users/42"))?;
//! ```
//!
//! ## Attribute Discovery
//!
//! With the `macros` feature, `#[route]` declares routes next to their
//! handlers. [`loader::ControllerSource`] registers them and
//! `ControllerRegistry::discovered()` invokes them:
//!
//! ```rust,ignore
//! #[waymark::route("/users/{id}", methods = ["GET"], patterns(id = "\\d+"))]
//! fn show(params: &Params) -> String { /* ... */ }
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod config;
mod context;
mod dispatcher;
mod group;
pub mod loader;
pub mod path;

pub use config::{ConfigError, LoaderConfig};
pub use context::RegistrationContext;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use group::{Group, GroupContext};
pub use loader::{LoadOutcome, RouteLoader, RouteSource, ScriptSource};

pub use waymark_core::{
    // Actions
    ALL_METHODS,
    Action,
    ActionInvoker,
    // Params / attributes
    Attributes,
    // Notifications
    BeforeResponseSend,
    // Errors
    BoxError,
    // Cache
    CacheItem,
    DEFAULT_PATTERN,
    ExtractError,
    INVOKE_METHOD,
    IntoAction,
    // Response
    IntoReply,
    Json,
    // Middleware
    Middleware,
    MiddlewareContainer,
    Notifier,
    Params,
    Publish,
    Reply,
    // Request
    Request,
    Response,
    RouteAction,
    // Route model
    RouteBuilder,
    RouteCache,
    RouteDefinition,
    RouteFound,
    RouteHandle,
    RouteTable,
    RoutingError,
    Subscriber,
    normalize_methods,
};

// Standard collaborators
pub use waymark_std::{
    cache::{FileCache, MemoryCache},
    controllers::ControllerRegistry,
    error::{CacheError, RegistryError},
    events::{EventBus, EventBusBuilder},
    logging::LoggingSubscriber,
    middleware::MiddlewareRegistry,
};

/// Routes declared with `#[route]`.
#[cfg(feature = "inventory")]
pub mod discovery {
    pub use waymark_std::discovery::{RouteRegistration, registrations};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use waymark_std::testing::*;
}

/// Prelude module - common imports for waymark.
///
/// # Usage
///
/// ```rust,ignore
/// use waymark::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Collaborators
        ControllerRegistry,
        // Routing
        Dispatcher,
        EventBus,
        ExtractError,
        Group,
        IntoReply,
        Json,
        MiddlewareRegistry,
        Params,
        // Request / response
        Request,
        Response,
        RouteDefinition,
        RouteLoader,
        RoutingError,
    };
}

#[cfg(feature = "macros")]
pub use waymark_macros::route;

#[cfg(feature = "inventory")]
pub use inventory;
