use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::core::constants::{
    DEFAULT_PATH_COLOR, DEFAULT_PATH_WEIGHT, EARTH_PIX, METERS_PER_PIXEL_AT_ZOOM_0, REFERENCE_ZOOM,
};

/// Pixels per radian of longitude at the reference zoom.
const PIX_RAD: f64 = EARTH_PIX / PI;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Drops every decimal past `digits` on both axes, truncating toward zero.
    ///
    /// Requests and cache keys are built from truncated coordinates so that
    /// floating-point noise in the caller does not produce new cache entries.
    pub fn truncated(&self, digits: u32) -> Self {
        Self::new(truncate_to(self.lat, digits), truncate_to(self.lng, digits))
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Truncates `value` to `digits` decimal places.
pub fn truncate_to(value: f64, digits: u32) -> f64 {
    let scale = 10_f64.powi(digits as i32);
    (value * scale).trunc() / scale
}

/// A labelled pin drawn by the mapping service on every tile it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: LatLng,
    pub label: String,
    pub color: String,
}

impl Marker {
    pub fn new(position: LatLng, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
            color: color.into(),
        }
    }
}

/// A polyline overlay connecting `points` in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<LatLng>,
    pub color: String,
    pub weight: u32,
}

impl Path {
    /// Creates a path with the default blue, 5px stroke
    pub fn new(points: Vec<LatLng>) -> Self {
        Self {
            points,
            color: DEFAULT_PATH_COLOR.to_string(),
            weight: DEFAULT_PATH_WEIGHT,
        }
    }

    pub fn with_style(mut self, color: impl Into<String>, weight: u32) -> Self {
        self.color = color.into();
        self.weight = weight;
        self
    }
}

/// Global pixel coordinates of a point at the reference zoom (21).
///
/// The origin sits at the antimeridian / north pole corner, so both axes are
/// positive and `x` grows eastward while `y` grows southward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPixel {
    pub x: f64,
    pub y: f64,
}

impl WorldPixel {
    /// Projects a coordinate with the spherical Mercator projection
    pub fn from_lat_lng(lat_lng: &LatLng) -> Self {
        let x = EARTH_PIX + lat_lng.lng.to_radians() * PIX_RAD;
        let sin_lat = lat_lng.lat.to_radians().sin();
        let y = EARTH_PIX - PIX_RAD * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / 2.0;
        Self { x, y }
    }

    /// Inverse of [`WorldPixel::from_lat_lng`]; latitude goes through the
    /// inverse-Mercator formula, not a linear scale.
    pub fn to_lat_lng(&self) -> LatLng {
        let lng = ((self.x - EARTH_PIX) / PIX_RAD).to_degrees();
        let lat = (PI / 2.0 - 2.0 * ((self.y - EARTH_PIX) / PIX_RAD).exp().atan()).to_degrees();
        LatLng::new(lat, lng)
    }

    /// Shifts by a distance measured in pixels at `zoom`.
    pub fn offset(&self, dx: f64, dy: f64, zoom: u8) -> Self {
        Self {
            x: self.x + to_reference_pixels(dx, zoom),
            y: self.y + to_reference_pixels(dy, zoom),
        }
    }
}

/// Scales a pixel distance at `zoom` to the reference zoom.
pub fn to_reference_pixels(pixels: f64, zoom: u8) -> f64 {
    pixels * 2_f64.powi(REFERENCE_ZOOM as i32 - zoom as i32)
}

/// Screen pixels per ground meter at `lat` and `zoom`.
pub fn pixels_per_meter(lat: f64, zoom: u8) -> f64 {
    2_f64.powi(zoom as i32) / (METERS_PER_PIXEL_AT_ZOOM_0 * lat.to_radians().cos())
}
