//! Layered configuration for the offline cache.
//!
//! Values are resolved in order, later layers winning:
//! 1. built-in defaults,
//! 2. an optional file (TOML, YAML or JSON, chosen by extension),
//! 3. environment variables prefixed with `TESSERA_`, using `__` to separate
//!    nested keys (`TESSERA_CACHE__TILE_COUNT_LIMIT=10000`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tessera_compress::Compression;
use tracing::{debug, info};

pub const ENV_PREFIX: &str = "TESSERA_";
pub const DATABASE_FILENAME: &str = "offline.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Database file; defaults to the platform cache directory.
    pub path: Option<PathBuf>,
    /// Byte budget of the ambient (not region-retained) cache.
    pub max_ambient_size: u64,
    /// Codec name, see [`Compression`].
    pub compression: String,
    pub tile_count_limit: u64,
    pub hosted_url_prefix: String,
}
// Keep in step with `StoreOptions::default` in tessera-cache; this crate
// doesn't depend on it.
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_ambient_size: 50 * 1024 * 1024,
            compression: Compression::Deflate.as_str().to_string(),
            tile_count_limit: 6000,
            hosted_url_prefix: "mapbox://".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Fetches a single region download keeps in flight.
    pub max_concurrent_requests: usize,
}
// Same as `tessera_download::DEFAULT_MAX_CONCURRENT_REQUESTS`.
impl Default for DownloadConfig {
    fn default() -> Self {
        Self { max_concurrent_requests: 20 }
    }
}

impl Config {
    /// Load and validate the configuration, optionally layering `file` over
    /// the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file)?)
    }

    /// The provider stack [`load`](Self::load) extracts from. Exposed so
    /// callers can merge their own layers on top.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            if !path.exists() {
                exn::bail!(ErrorKind::NotFound(path.display().to_string()));
            }
            info!(path = %path.display(), "loading configuration from file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_requests == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "download.max_concurrent_requests",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.cache.hosted_url_prefix.is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "cache.hosted_url_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        self.compression()?;
        Ok(())
    }

    /// The configured codec.
    pub fn compression(&self) -> Result<Compression> {
        self.cache.compression.parse::<Compression>().or_raise(|| ErrorKind::Invalid {
            field: "cache.compression",
            reason: format!("unknown codec '{}'", self.cache.compression),
        })
    }

    /// Where the offline database lives: the configured path, or
    /// `offline.db` in the platform cache directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("", "", "tessera").ok_or_raise(|| ErrorKind::NoCacheDirectory)?;
        Ok(dirs.cache_dir().join(DATABASE_FILENAME))
    }
}
