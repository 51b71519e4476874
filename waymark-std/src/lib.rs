//! # waymark-std
//!
//! Standard collaborators for the waymark dispatch framework.
//!
//! This crate provides:
//! - **Middleware resolution**: [`MiddlewareRegistry`]
//! - **Named handlers**: [`ControllerRegistry`], which also invokes actions
//! - **Notifications**: [`EventBus`] and the [`LoggingSubscriber`]
//! - **Route caches**: [`MemoryCache`], [`FileCache`]
//! - **Discovery records** (feature `inventory`): `discovery::RouteRegistration`
//! - **Testing utilities**: [`testing`]
//!
//! [`MiddlewareRegistry`]: middleware::MiddlewareRegistry
//! [`ControllerRegistry`]: controllers::ControllerRegistry
//! [`EventBus`]: events::EventBus
//! [`LoggingSubscriber`]: logging::LoggingSubscriber
//! [`MemoryCache`]: cache::MemoryCache
//! [`FileCache`]: cache::FileCache

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use waymark_core;

// Modules
pub mod cache;
pub mod controllers;
#[cfg(feature = "inventory")]
pub mod discovery;
pub mod error;
pub mod events;
pub mod logging;
pub mod middleware;
pub mod testing;

#[cfg(feature = "inventory")]
pub use inventory;
