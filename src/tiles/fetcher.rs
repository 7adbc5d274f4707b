//! Grid fetching and stitching
//!
//! A composite is an `ntiles × ntiles` grid of square tiles centred on the
//! requested coordinate. Each cell is requested from the service as its own
//! centred static map, and the decoded tiles are pasted side by side.

use image::{imageops, RgbImage};

use super::cache::TileCache;
use super::loader::{HttpTransport, LoaderStats, TileLoader, TileTransport};
use super::source::{MapType, StaticMapSource, TileRequest, TileSource};
use crate::core::config::FetcherConfig;
use crate::core::constants::DEGREE_PRECISION;
use crate::core::geo::{pixels_per_meter, LatLng, Marker, Path, WorldPixel};
use crate::{MapError, Result};

/// A stitched grid of tiles and the coordinates of its corner cells.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: RgbImage,
    /// Centre of the top-left cell
    pub north_west: LatLng,
    /// Centre of the bottom-right cell
    pub south_east: LatLng,
    pub ntiles: u32,
    pub tile_size: u32,
}

impl Composite {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

pub struct TileFetcher {
    loader: TileLoader,
    tile_size: u32,
    default_ntiles: u32,
}

impl TileFetcher {
    /// Fetcher talking to the configured static-map endpoint over HTTP.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let source = StaticMapSource::new(config.endpoint.clone(), config.resolved_api_key());
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::with_parts(config, Box::new(source), Box::new(transport)))
    }

    /// Fetcher with a caller-supplied URL scheme and transport.
    pub fn with_parts(
        config: &FetcherConfig,
        source: Box<dyn TileSource>,
        transport: Box<dyn TileTransport>,
    ) -> Self {
        let cache = TileCache::new(config.cache_dir.clone(), config.memory_cache_tiles);
        Self {
            loader: TileLoader::new(source, transport, cache, config.grab_delay()),
            tile_size: config.tile_size,
            default_ntiles: config.default_ntiles,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn stats(&self) -> LoaderStats {
        self.loader.stats()
    }

    pub fn cache(&self) -> &TileCache {
        self.loader.cache()
    }

    /// Grid width needed to cover `radius_meters` around `lat`, or the
    /// default width when no radius is given.
    pub fn grid_size(&self, lat: f64, zoom: u8, radius_meters: Option<f64>) -> Result<u32> {
        let ntiles = match radius_meters {
            None => self.default_ntiles,
            Some(radius) if radius > 0.0 && radius.is_finite() => {
                let tiles = 4.0 * pixels_per_meter(lat, zoom) * radius / self.tile_size as f64;
                (tiles.round() as u32).max(1)
            }
            Some(radius) => {
                return Err(MapError::InvalidRequest(format!(
                    "radius must be a positive number of meters, got {}",
                    radius
                )))
            }
        };

        if ntiles == 0 {
            return Err(MapError::InvalidRequest("grid must hold at least one tile".into()));
        }
        Ok(ntiles)
    }

    /// Fetches and stitches the grid around `center`.
    pub fn fetch(
        &mut self,
        center: LatLng,
        zoom: u8,
        map_type: MapType,
        markers: &[Marker],
        paths: &[Path],
        radius_meters: Option<f64>,
    ) -> Result<Composite> {
        let center = center.truncated(DEGREE_PRECISION);
        let ntiles = self.grid_size(center.lat, zoom, radius_meters)?;
        let tile_size = self.tile_size;
        let size = ntiles.checked_mul(tile_size).ok_or_else(|| {
            MapError::InvalidRequest(format!("{} tiles of {}px overflow", ntiles, tile_size))
        })?;

        log::debug!(
            "fetching {}x{} grid around {} at zoom {} ({})",
            ntiles,
            ntiles,
            center,
            zoom,
            map_type
        );

        let grid = Grid::new(center, ntiles, tile_size, zoom);
        let mut image = RgbImage::new(size, size);

        for column in 0..ntiles {
            let lng = grid.cell_lng(column);
            for row in 0..ntiles {
                let request = TileRequest {
                    center: LatLng::new(grid.cell_lat(row), lng),
                    zoom,
                    map_type,
                    tile_size,
                    markers,
                    paths,
                };
                let tile = self.loader.load(&request)?;
                imageops::replace(
                    &mut image,
                    &*tile,
                    (column * tile_size) as i64,
                    (row * tile_size) as i64,
                );
            }
        }

        let last = ntiles - 1;
        let composite = Composite {
            image,
            north_west: LatLng::new(grid.cell_lat(0), grid.cell_lng(0)),
            south_east: LatLng::new(grid.cell_lat(last), grid.cell_lng(last)),
            ntiles,
            tile_size,
        };
        log::info!(
            "composite {}x{} ready, nw {} se {}",
            size,
            size,
            composite.north_west,
            composite.south_east
        );
        Ok(composite)
    }
}

/// Cell-centre coordinates of a grid around a projected centre.
struct Grid {
    origin: WorldPixel,
    ntiles: u32,
    tile_size: u32,
    zoom: u8,
}

impl Grid {
    fn new(center: LatLng, ntiles: u32, tile_size: u32, zoom: u8) -> Self {
        Self {
            origin: WorldPixel::from_lat_lng(&center),
            ntiles,
            tile_size,
            zoom,
        }
    }

    /// Offset of cell `index`'s centre from the grid centre, in zoom pixels.
    fn cell_offset(&self, index: u32) -> f64 {
        (index as f64 + 0.5 - self.ntiles as f64 / 2.0) * self.tile_size as f64
    }

    fn cell_lng(&self, column: u32) -> f64 {
        self.origin
            .offset(self.cell_offset(column), 0.0, self.zoom)
            .to_lat_lng()
            .lng
    }

    fn cell_lat(&self, row: u32) -> f64 {
        self.origin
            .offset(0.0, self.cell_offset(row), self.zoom)
            .to_lat_lng()
            .lat
    }
}
