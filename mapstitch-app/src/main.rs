//! Headless static-map viewer: builds a viewport, applies the requested
//! pans and style changes, and writes what would be on screen to disk.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use mapstitch::input::{InputEvent, InputHandler};
use mapstitch::{FetcherConfig, LatLng, MapType, Marker, Path, Viewport};

#[derive(Parser)]
#[command(name = "mapstitch")]
#[command(author, version, about = "Fetch and stitch static map tiles", long_about = None)]
struct Cli {
    /// Latitude of the map centre
    #[arg(long, default_value_t = 23.2160579, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the map centre
    #[arg(long, default_value_t = 77.4052857, allow_hyphen_values = true)]
    lng: f64,

    /// Zoom level (1-21)
    #[arg(short, long, default_value_t = 15)]
    zoom: u8,

    /// Map style: roadmap, terrain, satellite or hybrid
    #[arg(short, long, default_value = "roadmap", value_parser = parse_map_type)]
    map_type: MapType,

    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 500)]
    height: u32,

    /// Cover this many meters around the centre instead of the default grid
    #[arg(long)]
    radius: Option<f64>,

    /// Marker as LAT,LNG,LABEL,COLOR (repeatable)
    #[arg(long = "marker", value_parser = parse_marker)]
    markers: Vec<Marker>,

    /// Path as LAT,LNG;LAT,LNG;... (repeatable)
    #[arg(long = "path", value_parser = parse_path)]
    paths: Vec<Path>,

    /// Pan the window by DX,DY pixels after loading (repeatable)
    #[arg(long = "drag", value_parser = parse_pair, allow_hyphen_values = true)]
    drags: Vec<(i32, i32)>,

    /// JSON fetcher configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tile cache directory (overrides the config file)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Where to write the visible window
    #[arg(short, long, default_value = "window.png")]
    output: PathBuf,

    /// Also write the full composite here
    #[arg(long)]
    composite: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &cli.config {
        Some(path) => FetcherConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FetcherConfig::default(),
    }
    .with_env_overrides();
    if let Some(dir) = &cli.cache_dir {
        config = config.with_cache_dir(dir);
    }

    let mut builder = Viewport::builder(cli.width, cli.height, LatLng::new(cli.lat, cli.lng))
        .zoom(cli.zoom)
        .map_type(cli.map_type);
    if let Some(radius) = cli.radius {
        builder = builder.radius_meters(radius);
    }
    for marker in cli.markers {
        builder = builder.marker(marker);
    }
    for path in cli.paths {
        builder = builder.path(path);
    }

    let mut viewport = builder.build(config).context("fetching initial map")?;
    log::info!(
        "map spans {} .. {}",
        viewport.north_west(),
        viewport.south_east()
    );

    let mut handler = InputHandler::new();
    for (dx, dy) in cli.drags {
        handler.handle(&mut viewport, InputEvent::PointerPressed { x: 0, y: 0 })?;
        handler.handle(&mut viewport, InputEvent::PointerDragged { x: -dx, y: -dy })?;
        handler.handle(&mut viewport, InputEvent::PointerReleased)?;
    }

    viewport
        .visible_image()
        .save(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    log::info!("window written to {}", cli.output.display());

    if let Some(path) = &cli.composite {
        viewport
            .composite()
            .image
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("composite written to {}", path.display());
    }

    let stats = viewport.fetcher().stats();
    println!(
        "{} tiles downloaded, {} from cache, window offset {:?}",
        stats.downloads,
        stats.cache_hits,
        viewport.offset()
    );
    Ok(())
}

fn parse_map_type(s: &str) -> Result<MapType> {
    Ok(s.parse()?)
}

fn parse_lat_lng(s: &str) -> Result<LatLng> {
    let Some((lat, lng)) = s.split_once(',') else {
        bail!("expected LAT,LNG, got '{}'", s);
    };
    Ok(LatLng::new(lat.trim().parse()?, lng.trim().parse()?))
}

fn parse_marker(s: &str) -> Result<Marker> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [lat, lng, label, color] = parts.as_slice() else {
        bail!("expected LAT,LNG,LABEL,COLOR, got '{}'", s);
    };
    Ok(Marker::new(
        LatLng::new(lat.parse()?, lng.parse()?),
        *label,
        *color,
    ))
}

fn parse_path(s: &str) -> Result<Path> {
    let points = s
        .split(';')
        .filter(|p| !p.trim().is_empty())
        .map(parse_lat_lng)
        .collect::<Result<Vec<_>>>()?;
    if points.is_empty() {
        bail!("a path needs at least one point");
    }
    Ok(Path::new(points))
}

fn parse_pair(s: &str) -> Result<(i32, i32)> {
    let Some((dx, dy)) = s.split_once(',') else {
        bail!("expected DX,DY, got '{}'", s);
    };
    Ok((dx.trim().parse()?, dy.trim().parse()?))
}
