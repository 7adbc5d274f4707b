//! Shared helpers: an in-memory transport that serves solid PNG tiles and
//! records every URL it was asked for.

#![allow(dead_code)]

use image::{ImageOutputFormat, Rgb, RgbImage};
use mapstitch::{FetcherConfig, MapError, Result, StaticMapSource, TileFetcher, TileTransport};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Colour of the tile served for the `n`th download (1-based).
pub fn call_color(n: usize) -> Rgb<u8> {
    Rgb([n as u8, (n >> 8) as u8, 7])
}

#[derive(Clone, Default)]
pub struct Recorder {
    urls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

pub struct SolidTransport {
    recorder: Recorder,
    tile_size: u32,
    fail_after: Option<usize>,
}

impl SolidTransport {
    pub fn new(recorder: Recorder, tile_size: u32) -> Self {
        Self {
            recorder,
            tile_size,
            fail_after: None,
        }
    }

    /// Fails every request after the first `calls` downloads
    pub fn failing_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }
}

impl TileTransport for SolidTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut urls = self.recorder.urls.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if urls.len() >= limit {
                return Err(MapError::HttpStatus {
                    status: 503,
                    url: url.to_string(),
                });
            }
        }
        urls.push(url.to_string());

        let tile = RgbImage::from_pixel(self.tile_size, self.tile_size, call_color(urls.len()));
        let mut bytes = Vec::new();
        tile.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

pub fn test_config(cache_dir: &Path, tile_size: u32, ntiles: u32) -> FetcherConfig {
    let mut config = FetcherConfig::default()
        .with_cache_dir(cache_dir)
        .with_tile_size(tile_size)
        .with_grab_rate(0.0)
        .with_api_key("TEST");
    config.default_ntiles = ntiles;
    config
}

pub fn fetcher(config: &FetcherConfig, transport: SolidTransport) -> TileFetcher {
    TileFetcher::with_parts(
        config,
        Box::new(StaticMapSource::new(config.endpoint.clone(), "TEST")),
        Box::new(transport),
    )
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
