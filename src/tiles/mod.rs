pub mod cache;
pub mod fetcher;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use fetcher::{Composite, TileFetcher};
pub use loader::{HttpTransport, LoaderStats, TileLoader, TileTransport};
pub use source::{MapType, StaticMapSource, TileRequest, TileSource};
