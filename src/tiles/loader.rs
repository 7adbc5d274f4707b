use image::RgbImage;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::sync::Arc;
use std::time::Duration;

use super::cache::TileCache;
use super::source::{TileRequest, TileSource};
use crate::core::config::FetcherConfig;
use crate::{MapError, Result};

/// Shared blocking HTTP client with a custom User-Agent. Building the client
/// once avoids the cost of TLS and connection pool setup for every tile.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    let config = FetcherConfig::default();
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to a default HTTP client: {}", e);
            Client::new()
        })
});

/// Anything that can turn a URL into the bytes behind it.
pub trait TileTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP transport; a single attempt per call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    fn shared() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
        }
    }

    /// Transport with the user agent and timeout from `config`. Reuses the
    /// shared client when both match the defaults.
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        if uses_default_client(config) {
            return Ok(Self::shared());
        }
        log::debug!("building HTTP client for user agent {}", config.user_agent);
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }
}

fn uses_default_client(config: &FetcherConfig) -> bool {
    let defaults = FetcherConfig::default();
    config.user_agent == defaults.user_agent
        && config.request_timeout_secs == defaults.request_timeout_secs
}

impl TileTransport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            return Err(MapError::HttpStatus {
                status: resp.status().as_u16(),
                url: url.split("&key=").next().unwrap_or(url).to_string(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}

/// Counters describing where tiles came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    pub cache_hits: u64,
    pub downloads: u64,
}

/// Loads single tiles, from the cache when possible and from the network
/// otherwise. Every download is followed by a fixed pause so that a grid of
/// misses never exceeds the service's free-tier rate.
pub struct TileLoader {
    source: Box<dyn TileSource>,
    transport: Box<dyn TileTransport>,
    cache: TileCache,
    grab_delay: Duration,
    stats: LoaderStats,
}

impl TileLoader {
    pub fn new(
        source: Box<dyn TileSource>,
        transport: Box<dyn TileTransport>,
        cache: TileCache,
        grab_delay: Duration,
    ) -> Self {
        Self {
            source,
            transport,
            cache,
            grab_delay,
            stats: LoaderStats::default(),
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn stats(&self) -> LoaderStats {
        self.stats
    }

    /// Returns the tile for `request` as an RGB8 image.
    pub fn load(&mut self, request: &TileRequest<'_>) -> Result<Arc<RgbImage>> {
        request.validate()?;
        let key = request.cache_key()?;

        if let Some(tile) = self.cache.load(&key)? {
            self.stats.cache_hits += 1;
            return Ok(tile);
        }

        let url = self.source.url(request);
        log::debug!("fetch tile {} for {}", key, request.center);
        let bytes = self.transport.get(&url)?;
        let tile = Arc::new(image::load_from_memory(&bytes)?.to_rgb8());
        log::info!(
            "downloaded tile {} ({} bytes, {}x{})",
            key,
            bytes.len(),
            tile.width(),
            tile.height()
        );

        self.cache.store(&key, &bytes, Arc::clone(&tile))?;
        self.stats.downloads += 1;

        if !self.grab_delay.is_zero() {
            std::thread::sleep(self.grab_delay);
        }
        Ok(tile)
    }
}
