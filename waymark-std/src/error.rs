//! Error types raised by the standard collaborators.

use thiserror::Error;

/// Lookup failures in the middleware and controller registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No middleware registered under this name.
    #[error("unknown middleware `{0}`")]
    UnknownMiddleware(String),

    /// No handler registered for this controller method.
    #[error("unknown controller action `{controller}::{method}`")]
    UnknownController {
        /// Controller name.
        controller: String,
        /// Method name.
        method: String,
    },
}

/// Failures of the file-backed route cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading or writing a cache file failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cache file could not be encoded or decoded.
    #[error("cache encoding error: {0}")]
    Serialize(#[from] serde_json::Error),
}
