//! Route loading configuration, read from TOML.
//!
//! ```toml
//! cache_key = "_routes"
//! routes_file = "src/routes.rs"
//! controllers_path = "target/release/app"
//! cache_dir = "var/cache"
//! ```
//!
//! Every key is optional.

use crate::loader::ScriptSource;
use crate::Dispatcher;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use waymark_std::cache::FileCache;

/// Errors raised while reading a [`LoaderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where routes come from and where the cached table lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Cache key of the serialized route table (default: `"_routes"`).
    #[serde(default = "default_cache_key")]
    pub cache_key: String,

    /// File whose modification time stamps the route script.
    #[serde(default)]
    pub routes_file: Option<PathBuf>,

    /// File whose modification time stamps discovered controllers.
    /// Defaults to the running executable.
    #[serde(default)]
    pub controllers_path: Option<PathBuf>,

    /// Directory of the file-backed route cache.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_cache_key() -> String {
    "_routes".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache_key: default_cache_key(),
            routes_file: None,
            controllers_path: None,
            cache_dir: None,
        }
    }
}

impl LoaderConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// A route script stamped by [`routes_file`](Self::routes_file).
    ///
    /// Without a routes file the script has no modification time, and a
    /// cached table is never trusted over it.
    pub fn script<F>(&self, script: F) -> ScriptSource
    where
        F: Fn(&mut Dispatcher) + Send + Sync + 'static,
    {
        match &self.routes_file {
            Some(path) => ScriptSource::new(path, script),
            None => ScriptSource::unstamped(script),
        }
    }

    /// Attribute-discovered controllers stamped by
    /// [`controllers_path`](Self::controllers_path).
    #[cfg(feature = "inventory")]
    pub fn controllers(&self) -> crate::loader::ControllerSource {
        let source = crate::loader::ControllerSource::new();
        match &self.controllers_path {
            Some(path) => source.stamp(path),
            None => source,
        }
    }

    /// The file-backed cache in [`cache_dir`](Self::cache_dir), if configured.
    pub fn file_cache(&self) -> Option<FileCache> {
        self.cache_dir.as_ref().map(FileCache::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert_eq!(config.cache_key, "_routes");
        assert!(config.file_cache().is_none());
    }

    #[test]
    fn test_full_config() {
        let config = LoaderConfig::from_toml_str(
            r#"
            cache_key = "app_routes"
            routes_file = "src/routes.rs"
            cache_dir = "var/cache"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache_key, "app_routes");
        assert_eq!(config.routes_file, Some(PathBuf::from("src/routes.rs")));
        assert_eq!(config.controllers_path, None);
        assert_eq!(
            config.file_cache().unwrap().dir(),
            Path::new("var/cache")
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = LoaderConfig::from_toml_str("cache_key = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        fs::write(&path, "cache_key = \"from_file\"").unwrap();

        assert_eq!(LoaderConfig::load(&path).unwrap().cache_key, "from_file");
        assert!(matches!(
            LoaderConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
