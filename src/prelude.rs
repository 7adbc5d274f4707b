//! Prelude module for common mapstitch types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapstitch::prelude::*;`

pub use crate::core::{
    config::FetcherConfig,
    geo::{LatLng, Marker, Path, WorldPixel},
    viewport::{Viewport, ViewportBuilder},
};

pub use crate::tiles::{
    cache::TileCache,
    fetcher::{Composite, TileFetcher},
    loader::{HttpTransport, LoaderStats, TileLoader, TileTransport},
    source::{MapType, StaticMapSource, TileRequest, TileSource},
};

pub use crate::input::{
    events::{EventHandled, InputEvent, ViewEvent},
    handler::{EventManager, InputHandler},
};

pub use crate::{Error as MapError, Result};

pub use image::RgbImage;
