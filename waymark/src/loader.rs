//! # Route Loading
//!
//! [`RouteLoader`] fills a dispatcher's route table from two sources, in
//! order, unless a cached table can stand in for both:
//!
//! 1. attribute-discovered controllers ([`ControllerSource`], feature
//!    `inventory`)
//! 2. a route script ([`ScriptSource`])
//!
//! # Freshness
//!
//! The cached table is adopted only if the cache item is a hit with a
//! creation time strictly newer than the modification time of every
//! configured source. A source without a modification time is always
//! considered newer. A cached payload that cannot be decoded is ignored.
//!
//! When the cache is not adopted, both sources run into the dispatcher's
//! table and the result is handed to the cache with a deferred write.

use crate::Dispatcher;
use std::{fs, path::PathBuf, sync::Arc, time::SystemTime};
use waymark_core::{BoxError, CacheItem, RouteCache, RouteTable, RoutingError};

/// A source of route registrations.
pub trait RouteSource: Send + Sync {
    /// When the source last changed, if known.
    fn modified(&self) -> Option<SystemTime>;

    /// Register the source's routes on `dispatcher`.
    fn load(&self, dispatcher: &mut Dispatcher) -> Result<(), BoxError>;
}

#[derive(Debug, Clone)]
enum Stamp {
    File(PathBuf),
    Fixed(SystemTime),
    Unknown,
}

impl Stamp {
    fn modified(&self) -> Option<SystemTime> {
        match self {
            Stamp::File(path) => fs::metadata(path).and_then(|m| m.modified()).ok(),
            Stamp::Fixed(time) => Some(*time),
            Stamp::Unknown => None,
        }
    }
}

/// Routes registered by a function, stamped by the file it lives in.
///
/// ```rust,ignore
/// let script = ScriptSource::new("src/routes.rs", |router: &mut Dispatcher| {
///     router.get("/", home);
///     router.post("/login", ("Auth", "login"));
/// });
/// ```
pub struct ScriptSource {
    script: Box<dyn Fn(&mut Dispatcher) + Send + Sync>,
    stamp: Stamp,
}

impl ScriptSource {
    /// A script stamped by the modification time of `path`.
    pub fn new<F>(path: impl Into<PathBuf>, script: F) -> Self
    where
        F: Fn(&mut Dispatcher) + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            stamp: Stamp::File(path.into()),
        }
    }

    /// A script with a fixed modification time.
    pub fn modified_at<F>(modified: SystemTime, script: F) -> Self
    where
        F: Fn(&mut Dispatcher) + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            stamp: Stamp::Fixed(modified),
        }
    }

    /// A script without a modification time. A cache is never trusted over it.
    pub fn unstamped<F>(script: F) -> Self
    where
        F: Fn(&mut Dispatcher) + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            stamp: Stamp::Unknown,
        }
    }
}

impl RouteSource for ScriptSource {
    fn modified(&self) -> Option<SystemTime> {
        self.stamp.modified()
    }

    fn load(&self, dispatcher: &mut Dispatcher) -> Result<(), BoxError> {
        (self.script)(dispatcher);
        Ok(())
    }
}

/// Routes declared with `#[route(...)]` anywhere in the binary.
///
/// Each declaration becomes a route whose action is the
/// `(module path, function name)` pair; pair it with
/// `ControllerRegistry::discovered()` so the actions can be invoked.
#[cfg(feature = "inventory")]
#[derive(Debug, Clone)]
pub struct ControllerSource {
    stamp: Stamp,
}

#[cfg(feature = "inventory")]
impl ControllerSource {
    /// A source stamped by the running executable.
    pub fn new() -> Self {
        let stamp = std::env::current_exe()
            .map(Stamp::File)
            .unwrap_or(Stamp::Unknown);
        Self { stamp }
    }

    /// Stamp by the modification time of `path` instead.
    pub fn stamp(mut self, path: impl Into<PathBuf>) -> Self {
        self.stamp = Stamp::File(path.into());
        self
    }

    /// Use a fixed modification time instead.
    pub fn modified_at(mut self, modified: SystemTime) -> Self {
        self.stamp = Stamp::Fixed(modified);
        self
    }
}

#[cfg(feature = "inventory")]
impl Default for ControllerSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "inventory")]
impl RouteSource for ControllerSource {
    fn modified(&self) -> Option<SystemTime> {
        self.stamp.modified()
    }

    fn load(&self, dispatcher: &mut Dispatcher) -> Result<(), BoxError> {
        for registration in waymark_std::discovery::registrations() {
            let path = crate::path::route_path(&dispatcher.context().prefix, registration.path);
            let route = registration.definition(path);

            #[cfg(feature = "tracing")]
            {
                tracing::debug!(
                    controller = registration.controller,
                    method = registration.method,
                    path = %route.path(),
                    "Discovered route"
                );
            }
            dispatcher.add_route(route);
        }
        Ok(())
    }
}

/// What [`RouteLoader::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The cached table was adopted.
    Cached {
        /// Number of routes in the adopted table.
        routes: usize,
    },
    /// The sources ran and the table was handed to the cache.
    Discovered {
        /// Number of routes after discovery.
        routes: usize,
    },
}

impl LoadOutcome {
    /// True if the cached table was adopted.
    pub fn is_cached(&self) -> bool {
        matches!(self, LoadOutcome::Cached { .. })
    }

    /// Number of routes in the table.
    pub fn routes(&self) -> usize {
        match self {
            LoadOutcome::Cached { routes } | LoadOutcome::Discovered { routes } => *routes,
        }
    }
}

/// Populates a dispatcher's routes, gated by a freshness-checked cache.
///
/// # Example
///
/// ```rust,ignore
/// let config = LoaderConfig::load("waymark.toml")?;
/// let loader = RouteLoader::from_config(&config, FileCache::new("var/cache"))
///     .controllers(config.controllers())
///     .script(config.script(routes::register));
///
/// dispatcher.load_routes(&loader)?;
/// ```
pub struct RouteLoader {
    cache: Arc<dyn RouteCache>,
    cache_key: String,
    controllers: Option<Box<dyn RouteSource>>,
    script: Option<Box<dyn RouteSource>>,
}

impl RouteLoader {
    /// A loader using `cache` under the key `"_routes"` and no sources.
    pub fn new(cache: impl RouteCache + 'static) -> Self {
        Self::with_shared_cache(Arc::new(cache))
    }

    /// A loader using a cache shared with other components.
    pub fn with_shared_cache(cache: Arc<dyn RouteCache>) -> Self {
        Self {
            cache,
            cache_key: "_routes".to_string(),
            controllers: None,
            script: None,
        }
    }

    /// A loader using the configured cache key.
    pub fn from_config(config: &crate::LoaderConfig, cache: impl RouteCache + 'static) -> Self {
        Self::new(cache).cache_key(config.cache_key.clone())
    }

    /// Set the cache key.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    /// Set the first source (attribute discovery).
    pub fn controllers(mut self, source: impl RouteSource + 'static) -> Self {
        self.controllers = Some(Box::new(source));
        self
    }

    /// Set the second source (route script).
    pub fn script(mut self, source: impl RouteSource + 'static) -> Self {
        self.script = Some(Box::new(source));
        self
    }

    fn sources(&self) -> impl Iterator<Item = &(dyn RouteSource + 'static)> {
        self.controllers
            .iter()
            .chain(self.script.iter())
            .map(|source| &**source)
    }

    fn is_fresh(&self, item: &CacheItem) -> bool {
        let Some(created_at) = item.created_at().filter(|_| item.is_hit()) else {
            return false;
        };
        self.sources()
            .all(|source| source.modified().is_some_and(|modified| created_at > modified))
    }

    fn adopt(&self, item: &CacheItem) -> Option<RouteTable> {
        let payload = item.get()?;
        match serde_json::from_str(payload) {
            Ok(table) => Some(table),
            Err(_error) => {
                #[cfg(feature = "tracing")]
                {
                    tracing::warn!(key = %self.cache_key, error = %_error, "Cached route table is unreadable; rediscovering");
                }
                None
            }
        }
    }

    /// Load routes into `dispatcher`.
    pub fn load(&self, dispatcher: &mut Dispatcher) -> Result<LoadOutcome, RoutingError> {
        let item = self
            .cache
            .get_item(&self.cache_key)
            .map_err(RoutingError::Cache)?;

        if self.is_fresh(&item) {
            if let Some(table) = self.adopt(&item) {
                let routes = table.len();
                dispatcher.set_routes(table);

                #[cfg(feature = "tracing")]
                {
                    tracing::info!(key = %self.cache_key, routes, "Route table loaded from cache");
                }
                return Ok(LoadOutcome::Cached { routes });
            }
        }

        #[cfg(feature = "tracing")]
        {
            tracing::info!(key = %self.cache_key, hit = item.is_hit(), "Route cache is stale; running route sources");
        }

        for source in self.sources() {
            source.load(dispatcher).map_err(RoutingError::Discovery)?;
        }

        let payload =
            serde_json::to_string(dispatcher.routes()).map_err(|e| RoutingError::Cache(e.into()))?;
        self.cache
            .save_deferred(&self.cache_key, payload)
            .map_err(RoutingError::Cache)?;

        let routes = dispatcher.routes().len();
        #[cfg(feature = "tracing")]
        {
            tracing::info!(key = %self.cache_key, routes, "Route table persisted to cache");
        }
        Ok(LoadOutcome::Discovered { routes })
    }
}
