//! DTED tile discovery and caching.
//!
//! This module resolves files, file lists and directories to DTED tile paths,
//! and provides [`TileCatalog`], a directory-backed catalog that narrows tiles
//! to a bounding box and caches parsed tiles.
//!
//! # Naming Conventions
//!
//! Two layouts are recognised when a tile's cell is derived from its path
//! (for listings and for [`cell_path`]). Box selection never relies on names;
//! it reads each tile's header.
//!
//! - Standard DTED: `{root}/{e|w}{lon:03}/{n|s}{lat:02}.dt{level}`
//!   (e.g. `w119/n33.dt1`)
//! - USGS EarthExplorer: `{n|s}{lat:02}_{e|w}{lon:03}_*.dt{level}`
//!   (e.g. `n33_w119_3arc_v1.dt1`)
//!
//! The cell is the **south-west corner** of the 1° × 1° tile.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;
use walkdir::WalkDir;

use crate::bounds::BoundingBox;
use crate::error::{DtedError, FormatError, Result};
use crate::header::{TileHeader, UHL_LEN};
use crate::reader::TileReader;

/// File extensions of DTED levels 0, 1 and 2.
pub const DTED_EXTENSIONS: [&str; 3] = ["dt0", "dt1", "dt2"];

/// Returns `true` if the path carries a DTED extension (case-insensitive).
pub fn is_dted_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DTED_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// The 1°×1° cell key `(floor_lat, floor_lon)` containing a coordinate.
pub fn cell_key(lat: f64, lon: f64) -> (i32, i32) {
    (lat.floor() as i32, lon.floor() as i32)
}

/// Relative path of a tile in the standard DTED directory layout.
///
/// # Examples
///
/// ```
/// use dted::catalog::cell_path;
/// use std::path::PathBuf;
///
/// assert_eq!(cell_path(33.3, -118.4, 1), PathBuf::from("w119/n33.dt1"));
/// assert_eq!(cell_path(-35.5, 149.2, 2), PathBuf::from("e149/s36.dt2"));
/// ```
pub fn cell_path(lat: f64, lon: f64, level: u8) -> PathBuf {
    let (lat, lon) = cell_key(lat, lon);
    let lat_prefix = if lat >= 0 { 'n' } else { 's' };
    let lon_prefix = if lon >= 0 { 'e' } else { 'w' };

    PathBuf::from(format!("{}{:03}", lon_prefix, lon.abs())).join(format!(
        "{}{:02}.dt{}",
        lat_prefix,
        lat.abs(),
        level
    ))
}

/// Parse a `[n|s]DD` latitude or `[e|w]DDD` longitude token.
fn parse_token(token: &str, digits: usize, positive: char, negative: char) -> Option<i32> {
    if token.len() != digits + 1 || !token.is_ascii() {
        return None;
    }
    let sign = match token.as_bytes()[0].to_ascii_lowercase() as char {
        c if c == positive => 1,
        c if c == negative => -1,
        _ => return None,
    };
    let value: i32 = token[1..].parse().ok()?;
    Some(sign * value)
}

/// Recover the cell key of a tile from its path.
///
/// Returns `None` if the path follows neither naming convention.
///
/// # Examples
///
/// ```
/// use dted::catalog::cell_key_from_path;
/// use std::path::Path;
///
/// assert_eq!(cell_key_from_path(Path::new("n33_w119_3arc_v1.dt1")), Some((33, -119)));
/// assert_eq!(cell_key_from_path(Path::new("/data/dted/e149/s36.dt1")), Some((-36, 149)));
/// assert_eq!(cell_key_from_path(Path::new("tile.dt1")), None);
/// ```
pub fn cell_key_from_path(path: &Path) -> Option<(i32, i32)> {
    let stem = path.file_stem()?.to_str()?;

    let mut parts = stem.split('_');
    let first = parts.next()?;
    if let Some(second) = parts.next() {
        let lat = parse_token(first, 2, 'n', 's')?;
        let lon = parse_token(second, 3, 'e', 'w')?;
        return Some((lat, lon));
    }

    let lat = parse_token(first, 2, 'n', 's')?;
    let parent = path.parent()?.file_name()?.to_str()?;
    let lon = parse_token(parent, 3, 'e', 'w')?;
    Some((lat, lon))
}

/// What to resolve into a set of tile paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    /// A single file, or a directory scanned recursively for DTED files.
    Path(PathBuf),
    /// An explicit list of files or directories.
    Paths(Vec<PathBuf>),
}

impl From<PathBuf> for TileSource {
    fn from(path: PathBuf) -> Self {
        TileSource::Path(path)
    }
}

impl From<&Path> for TileSource {
    fn from(path: &Path) -> Self {
        TileSource::Path(path.to_path_buf())
    }
}

impl From<&str> for TileSource {
    fn from(path: &str) -> Self {
        TileSource::Path(PathBuf::from(path))
    }
}

impl From<Vec<PathBuf>> for TileSource {
    fn from(paths: Vec<PathBuf>) -> Self {
        TileSource::Paths(paths)
    }
}

impl From<&[PathBuf]> for TileSource {
    fn from(paths: &[PathBuf]) -> Self {
        TileSource::Paths(paths.to_vec())
    }
}

/// Collect DTED files under `dir`, sorted.
///
/// Traversal errors (unreadable directories, symlink loops) are returned
/// rather than skipped, so a scan never reports a partial file set.
fn scan_dir(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir).follow_links(true);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_dted_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read only the User Header Label of a tile.
fn read_header(path: &Path) -> Result<TileHeader> {
    let unreadable = |e: std::io::Error| DtedError::format(path, FormatError::Unreadable(e));

    let mut uhl = Vec::with_capacity(UHL_LEN);
    File::open(path)
        .map_err(unreadable)?
        .take(UHL_LEN as u64)
        .read_to_end(&mut uhl)
        .map_err(unreadable)?;
    TileHeader::parse(&uhl).map_err(|kind| DtedError::format(path, kind))
}

/// Statistics about tile cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of tiles currently in the cache.
    pub entry_count: u64,
    /// Number of cache hits (tiles served from memory).
    pub hit_count: u64,
    /// Number of cache misses (tiles parsed from disk).
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// A directory of DTED tiles with an LRU cache of parsed tiles.
///
/// Building several interpolators from the same catalog parses each tile
/// once; the tiles are shared through [`Arc`].
///
/// # Example
///
/// ```ignore
/// use dted::{BoundingBox, TileCatalog};
///
/// let catalog = TileCatalog::new("/data/dted", 16);
/// let paths = catalog.tiles_for_box(&BoundingBox::new(33.3, -118.4, 33.8, -118.0))?;
/// ```
pub struct TileCatalog {
    /// Root directory scanned for tiles.
    root: PathBuf,
    /// Whether subdirectories are scanned.
    recursive: bool,
    /// LRU cache of parsed tiles, keyed by path.
    tile_cache: Cache<PathBuf, Arc<TileReader>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl TileCatalog {
    /// Create a catalog over `root`, caching up to `cache_size` tiles.
    pub fn new<P: AsRef<Path>>(root: P, cache_size: u64) -> Self {
        TileCatalogBuilder::new(root).cache_size(cache_size).build()
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(root: P) -> TileCatalogBuilder {
        TileCatalogBuilder::new(root)
    }

    /// Resolve a file, directory or list of either to DTED tile paths.
    ///
    /// Directories are scanned recursively for `.dt0`/`.dt1`/`.dt2` files;
    /// explicitly named files are kept whatever their extension. The result
    /// is deduplicated and sorted, with no geographic filtering.
    ///
    /// # Errors
    ///
    /// Returns [`DtedError::NotFound`] if a named path does not exist.
    pub fn resolve(source: impl Into<TileSource>) -> Result<Vec<PathBuf>> {
        let paths = match source.into() {
            TileSource::Path(path) => vec![path],
            TileSource::Paths(paths) => paths,
        };

        let mut resolved = BTreeSet::new();
        for path in paths {
            if path.is_dir() {
                resolved.extend(scan_dir(&path, true)?);
            } else if path.is_file() {
                resolved.insert(path);
            } else {
                return Err(DtedError::NotFound { path });
            }
        }

        Ok(resolved.into_iter().collect())
    }

    /// All DTED files under the catalog root, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`DtedError::NotFound`] if the root directory does not exist
    /// and [`DtedError::Io`] if any part of the tree cannot be traversed.
    pub fn scan_tile_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(DtedError::NotFound {
                path: self.root.clone(),
            });
        }
        let files = scan_dir(&self.root, self.recursive)?;
        tracing::info!(root = %self.root.display(), tiles = files.len(), "scanned DTED catalog");
        Ok(files)
    }

    /// Tile paths whose header bounding box intersects `bounds`.
    ///
    /// Every file under the root is a candidate whatever its name; only the
    /// header decides. Cached tiles answer from memory, others have just
    /// their header read.
    pub fn tiles_for_box(&self, bounds: &BoundingBox) -> Result<Vec<PathBuf>> {
        let mut selected = Vec::new();
        for path in self.scan_tile_files()? {
            let tile_bounds = match self.tile_cache.get(&path) {
                Some(tile) => tile.bounds(),
                None => read_header(&path)?.bounds(),
            };
            if tile_bounds.intersects(bounds) {
                selected.push(path);
            }
        }
        tracing::debug!(tiles = selected.len(), bounds = ?bounds, "selected tiles by header");
        Ok(selected)
    }

    /// Load a tile through the cache.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<TileReader>> {
        let path = path.as_ref();
        if let Some(tile) = self.tile_cache.get(path) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(tile);
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let tile = Arc::new(TileReader::open(path)?);
        self.tile_cache.insert(path.to_path_buf(), tile.clone());
        Ok(tile)
    }

    /// Load every tile whose header bounding box intersects `bounds`.
    pub fn load_for_box(&self, bounds: &BoundingBox) -> Result<Vec<Arc<TileReader>>> {
        self.tiles_for_box(bounds)?
            .iter()
            .map(|path| self.load(path))
            .collect()
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.tile_cache.entry_count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    /// Get the maximum cache size.
    pub fn cache_capacity(&self) -> u64 {
        self.tile_cache.policy().max_capacity().unwrap_or(0)
    }

    /// Remove one tile from the cache, e.g. after the file was replaced.
    pub fn invalidate<P: AsRef<Path>>(&self, path: P) {
        self.tile_cache.invalidate(path.as_ref());
    }

    /// Clear all tiles from the cache.
    pub fn clear_cache(&self) {
        self.tile_cache.invalidate_all();
    }

    /// The catalog root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Builder for creating [`TileCatalog`] with custom configuration.
pub struct TileCatalogBuilder {
    root: PathBuf,
    cache_size: u64,
    recursive: bool,
}

impl TileCatalogBuilder {
    /// Create a new builder for the specified root directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cache_size: 100,
            recursive: true,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DTED_DATA_DIR` | Root directory of DTED tiles | Required |
    /// | `DTED_CACHE_SIZE` | Maximum parsed tiles in cache | 100 |
    ///
    /// # Errors
    ///
    /// Returns an error if `DTED_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let root = std::env::var("DTED_DATA_DIR").map_err(|_| {
            DtedError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "DTED_DATA_DIR environment variable not set",
            ))
        })?;

        let cache_size: u64 = std::env::var("DTED_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Ok(Self::new(root).cache_size(cache_size))
    }

    /// Set the maximum number of parsed tiles to keep in cache.
    ///
    /// Default is 100 tiles.
    pub fn cache_size(mut self, size: u64) -> Self {
        self.cache_size = size;
        self
    }

    /// Scan subdirectories of the root. Enabled by default, as the standard
    /// layout keeps one directory per longitude.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Build the [`TileCatalog`].
    pub fn build(self) -> TileCatalog {
        TileCatalog {
            root: self.root,
            recursive: self.recursive,
            tile_cache: Cache::builder().max_capacity(self.cache_size).build(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }
}
