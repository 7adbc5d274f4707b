use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded::byte_serialize;
use xxhash_rust::xxh3::xxh3_128;

use crate::core::constants::MAX_REQUEST_ZOOM;
use crate::core::geo::{LatLng, Marker, Path};
use crate::{MapError, Result};

/// Rendering style of the static-map service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Roadmap,
    Terrain,
    Satellite,
    Hybrid,
}

impl MapType {
    pub const ALL: [MapType; 4] = [
        MapType::Roadmap,
        MapType::Terrain,
        MapType::Satellite,
        MapType::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::Roadmap => "roadmap",
            MapType::Terrain => "terrain",
            MapType::Satellite => "satellite",
            MapType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapType {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        MapType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MapError::ParseError(format!("unknown map type '{}'", s)))
    }
}

/// Everything that determines the content of one fetched tile.
///
/// Overlays are borrowed from the caller, a grid of requests shares them.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest<'a> {
    pub center: LatLng,
    pub zoom: u8,
    pub map_type: MapType,
    pub tile_size: u32,
    pub markers: &'a [Marker],
    pub paths: &'a [Path],
}

impl<'a> TileRequest<'a> {
    pub fn validate(&self) -> Result<()> {
        if self.zoom > MAX_REQUEST_ZOOM {
            return Err(MapError::InvalidRequest(format!(
                "zoom {} outside 0..={}",
                self.zoom, MAX_REQUEST_ZOOM
            )));
        }
        if self.tile_size == 0 {
            return Err(MapError::InvalidRequest("tile size must be positive".into()));
        }
        Ok(())
    }

    /// Canonical string form of the request. Two requests produce the same
    /// string exactly when they would return the same image. Overlays are
    /// serialized as JSON so labels and colours cannot bleed into each other.
    pub fn canonical(&self) -> Result<String> {
        Ok(format!(
            "{:.6}_{:.6}_{}_{}_{}_{}_{}_{}",
            self.center.lat,
            self.center.lng,
            self.zoom,
            self.map_type,
            self.tile_size,
            self.tile_size,
            serde_json::to_string(self.markers)?,
            serde_json::to_string(self.paths)?
        ))
    }

    /// Content hash of [`TileRequest::canonical`], used as the cache file name.
    pub fn cache_key(&self) -> Result<String> {
        Ok(format!("{:032x}", xxh3_128(self.canonical()?.as_bytes())))
    }
}

/// Trait representing anything that can produce a tile URL for a request.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested tile.
    fn url(&self, request: &TileRequest<'_>) -> String;
}

/// Google Static Maps style endpoint: one centred, square image per request.
#[derive(Debug, Clone)]
pub struct StaticMapSource {
    endpoint: String,
    api_key: String,
}

impl StaticMapSource {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// The request URL without the credential, safe to log.
    pub fn public_url(&self, request: &TileRequest<'_>) -> String {
        let mut url = format!(
            "{}?center={}&zoom={}&maptype={}&size={}x{}&format=jpg",
            self.endpoint,
            request.center,
            request.zoom,
            request.map_type,
            request.tile_size,
            request.tile_size
        );

        for marker in request.markers {
            url.push_str(&format!(
                "&markers=color:{}%7Clabel:{}%7C{}",
                encode(&marker.color),
                encode(&marker.label),
                marker.position
            ));
        }

        for path in request.paths {
            url.push_str(&format!(
                "&path=color:{}%7Cweight:{}",
                encode(&path.color),
                path.weight
            ));
            for point in &path.points {
                url.push_str(&format!("%7C{}", point));
            }
        }

        url
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

impl TileSource for StaticMapSource {
    fn url(&self, request: &TileRequest<'_>) -> String {
        format!("{}&key={}", self.public_url(request), self.api_key)
    }
}
