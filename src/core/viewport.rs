use image::{imageops, RgbImage};

use crate::core::config::FetcherConfig;
use crate::core::constants::{MAX_VIEWPORT_ZOOM, MIN_VIEWPORT_ZOOM};
use crate::core::geo::{LatLng, Marker, Path, WorldPixel};
use crate::tiles::fetcher::{Composite, TileFetcher};
use crate::tiles::source::MapType;
use crate::Result;

/// Builder for [`Viewport`]
#[derive(Debug, Clone)]
pub struct ViewportBuilder {
    width: u32,
    height: u32,
    center: LatLng,
    zoom: u8,
    map_type: MapType,
    radius_meters: Option<f64>,
    markers: Vec<Marker>,
    paths: Vec<Path>,
}

impl ViewportBuilder {
    pub fn zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn map_type(mut self, map_type: MapType) -> Self {
        self.map_type = map_type;
        self
    }

    /// Size the grid to cover this many meters around the centre
    pub fn radius_meters(mut self, radius: f64) -> Self {
        self.radius_meters = Some(radius);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn path(mut self, path: Path) -> Self {
        self.paths.push(path);
        self
    }

    /// Builds a viewport fetching over HTTP with `config`
    pub fn build(self, config: FetcherConfig) -> Result<Viewport> {
        let fetcher = TileFetcher::new(&config)?;
        self.build_with(fetcher)
    }

    /// Builds a viewport on top of an existing fetcher
    pub fn build_with(self, mut fetcher: TileFetcher) -> Result<Viewport> {
        let composite = fetcher.fetch(
            self.center,
            self.zoom,
            self.map_type,
            &self.markers,
            &self.paths,
            self.radius_meters,
        )?;

        let left_x = composite.width().saturating_sub(self.width) / 2;
        let upper_y = composite.height().saturating_sub(self.height) / 2;

        let mut viewport = Viewport {
            fetcher,
            composite,
            window: RgbImage::new(self.width, self.height),
            width: self.width,
            height: self.height,
            left_x,
            upper_y,
            center: self.center,
            zoom: self.zoom,
            map_type: self.map_type,
            radius_meters: self.radius_meters,
            markers: self.markers,
            paths: self.paths,
            fetch_count: 1,
        };
        viewport.update_window();
        Ok(viewport)
    }
}

/// A fixed-size window onto a fetched composite.
///
/// Panning only moves the window. Zoom, map type and overlay changes replace
/// the composite with a fresh fetch.
pub struct Viewport {
    fetcher: TileFetcher,
    composite: Composite,
    window: RgbImage,
    width: u32,
    height: u32,
    left_x: u32,
    upper_y: u32,
    center: LatLng,
    zoom: u8,
    map_type: MapType,
    radius_meters: Option<f64>,
    markers: Vec<Marker>,
    paths: Vec<Path>,
    fetch_count: u64,
}

impl Viewport {
    /// Starts building a `width × height` viewport centred on `center`
    pub fn builder(width: u32, height: u32, center: LatLng) -> ViewportBuilder {
        ViewportBuilder {
            width,
            height,
            center,
            zoom: 15,
            map_type: MapType::default(),
            radius_meters: None,
            markers: Vec::new(),
            paths: Vec::new(),
        }
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn add_markers(&mut self, markers: impl IntoIterator<Item = Marker>) {
        self.markers.extend(markers);
    }

    pub fn add_path(&mut self, path: Path) {
        self.paths.push(path);
    }

    pub fn add_paths(&mut self, paths: impl IntoIterator<Item = Path>) {
        self.paths.extend(paths);
    }

    /// Re-fetches with the current parameters and overlays.
    pub fn fetch_and_update(&mut self) -> Result<()> {
        self.refetch(self.zoom, self.map_type)
    }

    /// Moves the window by `(dx, dy)` pixels. An axis whose move would leave
    /// the composite keeps its current offset.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.left_x = pan_axis(self.left_x, dx, self.composite.width(), self.width);
        self.upper_y = pan_axis(self.upper_y, dy, self.composite.height(), self.height);
        self.update_window();
    }

    pub fn set_map_type(&mut self, map_type: MapType) -> Result<()> {
        self.refetch(self.zoom, map_type)
    }

    /// Switches zoom level. Levels outside 1..=21 are ignored.
    pub fn set_zoom(&mut self, zoom: u8) -> Result<()> {
        if !(MIN_VIEWPORT_ZOOM..=MAX_VIEWPORT_ZOOM).contains(&zoom) {
            log::debug!("ignoring zoom {} outside {}..={}", zoom, MIN_VIEWPORT_ZOOM, MAX_VIEWPORT_ZOOM);
            return Ok(());
        }
        self.refetch(zoom, self.map_type)
    }

    /// The display-sized window at the current offset.
    pub fn visible_image(&self) -> &RgbImage {
        &self.window
    }

    pub fn composite(&self) -> &Composite {
        &self.composite
    }

    pub fn north_west(&self) -> LatLng {
        self.composite.north_west
    }

    pub fn south_east(&self) -> LatLng {
        self.composite.south_east
    }

    /// Top-left corner of the window inside the composite
    pub fn offset(&self) -> (u32, u32) {
        (self.left_x, self.upper_y)
    }

    pub fn display_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Number of composites fetched over the viewport's lifetime
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    pub fn fetcher(&self) -> &TileFetcher {
        &self.fetcher
    }

    /// Geographic coordinate under window pixel `(x, y)`.
    pub fn lat_lng_at(&self, x: u32, y: u32) -> LatLng {
        let half_tile = self.composite.tile_size as f64 / 2.0;
        let dx = self.left_x as f64 + x as f64 - half_tile;
        let dy = self.upper_y as f64 + y as f64 - half_tile;
        WorldPixel::from_lat_lng(&self.composite.north_west)
            .offset(dx, dy, self.zoom)
            .to_lat_lng()
    }

    /// Fetches a new composite and commits `zoom`/`map_type` only on success.
    fn refetch(&mut self, zoom: u8, map_type: MapType) -> Result<()> {
        let composite = self.fetcher.fetch(
            self.center,
            zoom,
            map_type,
            &self.markers,
            &self.paths,
            self.radius_meters,
        )?;
        self.fetch_count += 1;
        self.zoom = zoom;
        self.map_type = map_type;
        self.composite = composite;

        self.left_x = clamp_axis(self.left_x, self.composite.width(), self.width);
        self.upper_y = clamp_axis(self.upper_y, self.composite.height(), self.height);
        self.update_window();
        Ok(())
    }

    fn update_window(&mut self) {
        let mut window = RgbImage::new(self.width, self.height);
        imageops::replace(
            &mut window,
            &self.composite.image,
            -(self.left_x as i64),
            -(self.upper_y as i64),
        );
        self.window = window;
    }
}

/// Applies `delta` to `offset` if the result stays in `0..=extent - view`,
/// otherwise leaves `offset` unchanged.
fn pan_axis(offset: u32, delta: i32, extent: u32, view: u32) -> u32 {
    let max = extent.saturating_sub(view) as i64;
    let moved = offset as i64 + delta as i64;
    if (0..=max).contains(&moved) {
        moved as u32
    } else {
        offset
    }
}

/// Pulls `offset` back inside a composite that may have shrunk.
fn clamp_axis(offset: u32, extent: u32, view: u32) -> u32 {
    offset.min(extent.saturating_sub(view))
}
