use image::RgbImage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{MapError, Result};

/// Tile cache: a content-addressed directory on disk, fronted by an optional
/// in-memory LRU of decoded tiles.
///
/// Disk entries are never evicted. The directory is created lazily on the
/// first write.
#[derive(Debug)]
pub struct TileCache {
    dir: PathBuf,
    memory: Option<LruCache<String, Arc<RgbImage>>>,
}

impl TileCache {
    /// Create a cache rooted at `dir` keeping up to `memory_capacity` decoded
    /// tiles in memory (0 disables the memory tier)
    pub fn new(dir: impl Into<PathBuf>, memory_capacity: usize) -> Self {
        Self {
            dir: dir.into(),
            memory: NonZeroUsize::new(memory_capacity).map(LruCache::new),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the encoded tile for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.jpg", key))
    }

    /// Check if a tile is on disk
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Get a decoded tile from memory or disk, `None` on a miss
    pub fn load(&mut self, key: &str) -> Result<Option<Arc<RgbImage>>> {
        if let Some(tile) = self.memory.as_mut().and_then(|m| m.get(key)) {
            log::debug!("tile {} served from memory", key);
            return Ok(Some(Arc::clone(tile)));
        }

        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }

        let bytes = std::fs::read(&path)?;
        let tile = Arc::new(image::load_from_memory(&bytes)?.to_rgb8());
        log::debug!("tile {} loaded from {}", key, path.display());

        if let Some(memory) = self.memory.as_mut() {
            memory.put(key.to_string(), Arc::clone(&tile));
        }
        Ok(Some(tile))
    }

    /// Persist the encoded bytes of a tile and remember its decoded form
    pub fn store(&mut self, key: &str, encoded: &[u8], tile: Arc<RgbImage>) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| MapError::CacheDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        std::fs::write(&path, encoded)?;
        log::debug!("tile {} saved to {}", key, path.display());

        if let Some(memory) = self.memory.as_mut() {
            memory.put(key.to_string(), tile);
        }
        Ok(())
    }

    /// Number of decoded tiles held in memory
    pub fn memory_len(&self) -> usize {
        self.memory.as_ref().map(|m| m.len()).unwrap_or(0)
    }

    /// Drop the memory tier; disk entries stay
    pub fn clear_memory(&mut self) {
        if let Some(memory) = self.memory.as_mut() {
            memory.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb};
    use std::io::Cursor;

    fn encoded_tile(color: [u8; 3]) -> (Vec<u8>, Arc<RgbImage>) {
        let tile = RgbImage::from_pixel(4, 4, Rgb(color));
        let mut bytes = Vec::new();
        tile.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        (bytes, Arc::new(tile))
    }

    #[test]
    fn test_directory_created_lazily() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("cache");
        let mut cache = TileCache::new(&dir, 4);

        assert!(!dir.exists());
        assert!(cache.load("abc").unwrap().is_none());
        assert!(!dir.exists());

        let (bytes, tile) = encoded_tile([1, 2, 3]);
        cache.store("abc", &bytes, tile).unwrap();
        assert!(dir.is_dir());
        assert!(cache.contains("abc"));
        assert_eq!(std::fs::read(cache.path_for("abc")).unwrap(), bytes);
    }

    #[test]
    fn test_disk_hit_without_memory_tier() {
        let root = tempfile::tempdir().unwrap();
        let mut cache = TileCache::new(root.path(), 0);
        let (bytes, tile) = encoded_tile([200, 10, 10]);
        cache.store("red", &bytes, tile).unwrap();
        assert_eq!(cache.memory_len(), 0);

        let loaded = cache.load("red").unwrap().unwrap();
        assert_eq!(loaded.dimensions(), (4, 4));
        assert_eq!(*loaded.get_pixel(0, 0), Rgb([200, 10, 10]));
    }

    #[test]
    fn test_memory_tier_is_bounded() {
        let root = tempfile::tempdir().unwrap();
        let mut cache = TileCache::new(root.path(), 2);
        for key in ["a", "b", "c"] {
            let (bytes, tile) = encoded_tile([0, 0, 0]);
            cache.store(key, &bytes, tile).unwrap();
        }
        assert_eq!(cache.memory_len(), 2);

        cache.clear_memory();
        assert_eq!(cache.memory_len(), 0);
        assert!(cache.load("a").unwrap().is_some());
        assert_eq!(cache.memory_len(), 1);
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let mut cache = TileCache::new(root.path(), 0);
        std::fs::write(cache.path_for("junk"), b"not an image").unwrap();

        assert!(matches!(cache.load("junk"), Err(MapError::Decode(_))));
    }

    #[test]
    fn test_uncreatable_directory() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let mut cache = TileCache::new(blocker.join("cache"), 0);

        let (bytes, tile) = encoded_tile([0, 0, 0]);
        assert!(matches!(
            cache.store("k", &bytes, tile),
            Err(MapError::CacheDir { .. })
        ));
    }
}
