//! # mapstitch
//!
//! Fetches static map tiles from a web mapping service, stitches them into a
//! single composite image, caches every tile on disk and exposes a pannable,
//! zoomable window onto the composite.
//!
//! ```no_run
//! use mapstitch::{FetcherConfig, LatLng, MapType, Viewport};
//!
//! # fn main() -> mapstitch::Result<()> {
//! let config = FetcherConfig::default().with_env_overrides();
//! let mut view = Viewport::builder(800, 500, LatLng::new(23.2160579, 77.4052857))
//!     .zoom(15)
//!     .map_type(MapType::Roadmap)
//!     .build(config)?;
//! view.pan(40, -20);
//! let window = view.visible_image();
//! # let _ = window;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod input;
pub mod prelude;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::FetcherConfig,
    geo::{LatLng, Marker, Path},
    viewport::{Viewport, ViewportBuilder},
};

pub use crate::tiles::{
    fetcher::{Composite, TileFetcher},
    source::{MapType, StaticMapSource, TileRequest, TileSource},
    HttpTransport, TileTransport,
};

pub use crate::input::{events::InputEvent, handler::InputHandler};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot create cache directory {path}: {source}")]
    CacheDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
