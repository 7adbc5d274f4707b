//! Engine-wide constants for the static-map tile grid and the zoom-21 pixel space.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Number of pixels in half the earth's circumference at zoom 21.
pub const EARTH_PIX: f64 = 268_435_456.0;

/// Zoom level at which [`EARTH_PIX`] is measured.
pub const REFERENCE_ZOOM: u8 = 21;

/// Number of decimal places kept when a coordinate becomes part of a request.
pub const DEGREE_PRECISION: u32 = 4;

/// Largest square tile the static-map service hands out on the free tier.
pub const TILE_SIZE: u32 = 640;

/// Fastest rate (tiles per second) at which tiles may be downloaded.
pub const GRAB_RATE: f64 = 4.0;

/// Grid width used when no radius is requested.
pub const DEFAULT_NTILES: u32 = 4;

/// Ground resolution in meters per pixel at zoom 0 on the equator.
pub const METERS_PER_PIXEL_AT_ZOOM_0: f64 = 156_543.033_92;

/// Highest zoom level the service accepts in a request.
pub const MAX_REQUEST_ZOOM: u8 = 22;

/// Zoom range a viewport will move within.
pub const MIN_VIEWPORT_ZOOM: u8 = 1;
pub const MAX_VIEWPORT_ZOOM: u8 = 21;

/// Default stroke for path overlays.
pub const DEFAULT_PATH_COLOR: &str = "0x0000ff";
pub const DEFAULT_PATH_WEIGHT: u32 = 5;

/// Static-map endpoint of the mapping service.
pub const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Directory used for the tile cache when nothing else is configured.
pub const DEFAULT_CACHE_DIR: &str = "mapscache";
