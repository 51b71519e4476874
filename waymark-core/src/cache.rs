//! Route cache contract.
//!
//! The loader stores the serialized route table under one key and trusts it
//! only while its creation time is newer than every route source.

use crate::error::BoxError;
use std::time::SystemTime;

/// The result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem {
    key: String,
    hit: bool,
    created_at: Option<SystemTime>,
    payload: Option<String>,
}

impl CacheItem {
    /// A miss for `key`.
    pub fn miss(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            hit: false,
            created_at: None,
            payload: None,
        }
    }

    /// A hit for `key`, created at `created_at`.
    pub fn hit(key: impl Into<String>, payload: impl Into<String>, created_at: SystemTime) -> Self {
        Self {
            key: key.into(),
            hit: true,
            created_at: Some(created_at),
            payload: Some(payload.into()),
        }
    }

    /// The key that was looked up.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True if the key was present.
    pub fn is_hit(&self) -> bool {
        self.hit
    }

    /// When the stored payload was written.
    pub fn created_at(&self) -> Option<SystemTime> {
        self.created_at
    }

    /// The stored payload, if any.
    pub fn get(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

/// Freshness-stamped storage for a serialized route table.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `RouteCache`",
    label = "missing `RouteCache` implementation"
)]
pub trait RouteCache: Send + Sync {
    /// Look up `key`. A missing key is a miss, not an error.
    fn get_item(&self, key: &str) -> Result<CacheItem, BoxError>;

    /// Store `payload` under `key`. The write may complete later; callers
    /// must not rely on it being durable when this returns.
    fn save_deferred(&self, key: &str, payload: String) -> Result<(), BoxError>;
}
