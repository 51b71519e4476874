//! # waymark-core
//!
//! Route model and collaborator contracts for the waymark dispatch framework.
//!
//! This crate holds everything the dispatcher reads or calls into, but none of
//! the dispatch logic itself. Plugins that only provide middlewares, caches or
//! notification subscribers can depend on it without pulling in the facade.
//!
//! # Route Model
//!
//! - [`RouteDefinition`] - one routable endpoint plus its compiled path matcher
//! - [`RouteTable`] - append-only store indexed by name and by HTTP method
//! - [`RouteHandle`] - fluent mutable handle to a route already in a table
//!
//! # Request / Response
//!
//! - [`Request`] - the method + path (+ headers) a route is resolved for
//! - [`Response`] - the envelope returned to the transport layer
//! - [`IntoReply`] - conversion of action results into a [`Reply`]
//! - [`Params`] - captured route attributes handed to an action
//!
//! # Collaborator Contracts
//!
//! - [`Middleware`] / [`MiddlewareContainer`] - pass/fail request guards
//! - [`Action`] / [`ActionInvoker`] - route endpoints and how they are called
//! - [`Notifier`] / [`Publish`] / [`Subscriber`] - route-found and
//!   before-response-send notifications
//! - [`RouteCache`] - freshness-stamped storage for a serialized route table
//!
//! # Error Types
//!
//! - [`RoutingError`] - everything the dispatch pipeline can fail with
//! - [`ExtractError`] - failed parameter extraction from [`Params`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod action;
mod cache;
mod error;
mod middleware;
mod notify;
mod params;
mod request;
mod response;
mod route;
mod table;

// Re-exports
pub use action::{Action, ActionInvoker, INVOKE_METHOD, IntoAction, RouteAction};
pub use cache::{CacheItem, RouteCache};
pub use error::{BoxError, ExtractError, RoutingError};
pub use middleware::{Middleware, MiddlewareContainer};
pub use notify::{BeforeResponseSend, Notifier, Publish, RouteFound, Subscriber};
pub use params::{Attributes, Params};
pub use request::Request;
pub use response::{IntoReply, Json, Reply, Response};
pub use route::{ALL_METHODS, DEFAULT_PATTERN, RouteBuilder, RouteDefinition, normalize_methods};
pub use table::{RouteHandle, RouteTable};
