//! Configuration for tile fetching
//!
//! Everything the fetcher needs to know about the outside world (service
//! endpoint, credential, cache location, throttling) lives in
//! [`FetcherConfig`] and is handed over at construction time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_NTILES, GRAB_RATE, STATIC_MAP_ENDPOINT, TILE_SIZE,
};
use crate::{MapError, Result};

/// Key compiled into the binary, used when no credential is configured.
pub const BUNDLED_API_KEY: &str = match option_env!("MAPSTITCH_BUNDLED_KEY") {
    Some(key) => key,
    None => "",
};

/// Environment variable overriding [`FetcherConfig::api_key`].
pub const API_KEY_ENV: &str = "MAPSTITCH_API_KEY";

/// Environment variable overriding [`FetcherConfig::cache_dir`].
pub const CACHE_DIR_ENV: &str = "MAPSTITCH_CACHE_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// API credential for the static-map service
    pub api_key: Option<String>,
    /// Static-map endpoint, without query string
    pub endpoint: String,
    /// Directory holding one file per cached tile
    pub cache_dir: PathBuf,
    /// Edge length of a single square tile in pixels
    pub tile_size: u32,
    /// Grid width used when no radius is requested
    pub default_ntiles: u32,
    /// Maximum downloads per second; zero or negative disables throttling
    pub grab_rate: f64,
    /// Decoded tiles kept in memory in front of the disk cache; zero disables it
    pub memory_cache_tiles: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl FetcherConfig {
    /// Reads a JSON config file. Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MapError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Applies `MAPSTITCH_API_KEY` and `MAPSTITCH_CACHE_DIR` if they are set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.cache_dir = PathBuf::from(dir);
            }
        }
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_grab_rate(mut self, grab_rate: f64) -> Self {
        self.grab_rate = grab_rate;
        self
    }

    /// The configured key, or the bundled one when none is set.
    pub fn resolved_api_key(&self) -> &str {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                log::warn!("no API key configured, falling back to the bundled key");
                BUNDLED_API_KEY
            }
        }
    }

    /// Pause applied after every network download.
    pub fn grab_delay(&self) -> Duration {
        if self.grab_rate > 0.0 && self.grab_rate.is_finite() {
            Duration::from_secs_f64(1.0 / self.grab_rate)
        } else {
            Duration::ZERO
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: STATIC_MAP_ENDPOINT.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            tile_size: TILE_SIZE,
            default_ntiles: DEFAULT_NTILES,
            grab_rate: GRAB_RATE,
            memory_cache_tiles: 64,
            request_timeout_secs: 30,
            user_agent: concat!("mapstitch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
