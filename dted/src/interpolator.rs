//! Bilinear elevation interpolation over a mosaic of DTED tiles.
//!
//! This module provides [`MosaicInterpolator`], which holds any number of
//! parsed tiles plus a [`GeoidModel`] and answers height-above-ellipsoid
//! queries. Points not covered by any tile contribute zero elevation, so an
//! interpolator with no tiles degrades to a pure geoid lookup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bounds::BoundingBox;
use crate::catalog::TileCatalog;
use crate::error::Result;
use crate::geoid::GeoidModel;
use crate::reader::TileReader;
use crate::void::VoidPolicy;

/// Height-above-ellipsoid queries over a set of DTED tiles.
///
/// The tile set is fixed at construction and only read afterwards, so one
/// interpolator can serve point queries from many threads.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use dted::{BoundingBox, ConstantGeoid, MosaicInterpolator, VoidPolicy};
///
/// let interp = MosaicInterpolator::new(
///     &["n33_w119_3arc_v1.dt1"],
///     Arc::new(ConstantGeoid(-36.49)),
///     BoundingBox::point(33.3174, -118.36258),
///     VoidPolicy::Preserve,
/// )?;
///
/// let legacy = interp.get_elevation_hae(33.3174, -118.36258);
/// let filled = interp.get_elevation_hae_with(33.3174, -118.36258, VoidPolicy::ZeroFill);
/// ```
pub struct MosaicInterpolator {
    /// Parsed tiles, searched in order.
    tiles: Vec<Arc<TileReader>>,
    /// Geoid-to-ellipsoid separation lookup.
    geoid: Arc<dyn GeoidModel>,
    /// The box the tiles were selected for.
    bounds: BoundingBox,
    /// Policy used when a call does not supply one.
    void_policy: VoidPolicy,
}

impl MosaicInterpolator {
    /// Build an interpolator from an explicit list of tile files.
    ///
    /// Every file is loaded, whether or not it intersects `bounds`. An empty
    /// list is valid: all elevations are then zero and heights are pure
    /// geoid values.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::DtedError::Format`] raised while opening a file.
    pub fn new<P: AsRef<Path>>(
        files: &[P],
        geoid: Arc<dyn GeoidModel>,
        bounds: BoundingBox,
        void_policy: VoidPolicy,
    ) -> Result<Self> {
        MosaicBuilder::new(geoid, bounds)
            .files(files)
            .void_policy(void_policy)
            .build()
    }

    /// Build an interpolator from the tiles of `catalog` that cover `bounds`.
    ///
    /// Every catalog file whose header bounding box intersects `bounds` is loaded.
    pub fn from_coords_and_list(
        bounds: BoundingBox,
        catalog: &TileCatalog,
        geoid: Arc<dyn GeoidModel>,
        void_policy: VoidPolicy,
    ) -> Result<Self> {
        MosaicBuilder::new(geoid, bounds)
            .catalog(catalog)
            .void_policy(void_policy)
            .build()
    }

    /// Create a builder for combining files, catalogs and preloaded tiles.
    pub fn builder<'a>(geoid: Arc<dyn GeoidModel>, bounds: BoundingBox) -> MosaicBuilder<'a> {
        MosaicBuilder::new(geoid, bounds)
    }

    /// Elevation relative to the geoid at `(lat, lon)`, using the default policy.
    pub fn get_elevation_geoid(&self, lat: f64, lon: f64) -> f64 {
        self.get_elevation_geoid_with(lat, lon, self.void_policy)
    }

    /// Elevation relative to the geoid at `(lat, lon)`.
    ///
    /// A tile whose postings surround the point is preferred; otherwise the
    /// first tile whose header box contains it answers with its edge
    /// postings clamped. Returns `0.0` when no tile covers the point.
    pub fn get_elevation_geoid_with(&self, lat: f64, lon: f64, policy: VoidPolicy) -> f64 {
        self.tiles
            .iter()
            .find(|tile| tile.header().posting_extent().contains(lat, lon))
            .or_else(|| self.tiles.iter().find(|tile| tile.contains(lat, lon)))
            .and_then(|tile| tile.elevation_at(lat, lon, policy))
            .unwrap_or(0.0)
    }

    /// Height above the ellipsoid at `(lat, lon)`, using the default policy.
    pub fn get_elevation_hae(&self, lat: f64, lon: f64) -> f64 {
        self.get_elevation_hae_with(lat, lon, self.void_policy)
    }

    /// Height above the ellipsoid at `(lat, lon)`: interpolated elevation plus
    /// the geoid separation.
    ///
    /// With [`VoidPolicy::Preserve`], a void neighbour enters the blend as
    /// -32767 and the result is a large negative height.
    pub fn get_elevation_hae_with(&self, lat: f64, lon: f64, policy: VoidPolicy) -> f64 {
        self.get_elevation_geoid_with(lat, lon, policy) + self.geoid.height(lat, lon)
    }

    /// Heights above the ellipsoid for a batch of `(lat, lon)` pairs.
    pub fn get_elevations_hae(&self, coords: &[(f64, f64)]) -> Vec<f64> {
        coords
            .iter()
            .map(|&(lat, lon)| self.get_elevation_hae(lat, lon))
            .collect()
    }

    /// Highest posting inside `bounds` across all tiles, using the default policy.
    pub fn get_max_geoid(&self, bounds: &BoundingBox) -> f64 {
        self.get_max_geoid_with(bounds, self.void_policy)
    }

    /// Highest posting inside `bounds` across all tiles.
    ///
    /// Returns `0.0` when no tiles are loaded or no posting lies in the box.
    pub fn get_max_geoid_with(&self, bounds: &BoundingBox, policy: VoidPolicy) -> f64 {
        self.tiles
            .iter()
            .filter_map(|tile| tile.max_in(bounds, policy))
            .max()
            .map(f64::from)
            .unwrap_or(0.0)
    }

    /// Lowest posting inside `bounds` across all tiles, using the default policy.
    pub fn get_min_geoid(&self, bounds: &BoundingBox) -> f64 {
        self.get_min_geoid_with(bounds, self.void_policy)
    }

    /// Lowest posting inside `bounds` across all tiles.
    ///
    /// Returns `0.0` when no tiles are loaded or no posting lies in the box.
    pub fn get_min_geoid_with(&self, bounds: &BoundingBox, policy: VoidPolicy) -> f64 {
        self.tiles
            .iter()
            .filter_map(|tile| tile.min_in(bounds, policy))
            .min()
            .map(f64::from)
            .unwrap_or(0.0)
    }

    /// [`Self::get_max_geoid`] plus the geoid separation at the box's
    /// reference point, its south-west corner.
    pub fn get_max_hae(&self, bounds: &BoundingBox) -> f64 {
        self.get_max_hae_with(bounds, self.void_policy)
    }

    /// [`Self::get_max_geoid_with`] plus the geoid separation at the box's
    /// south-west corner.
    pub fn get_max_hae_with(&self, bounds: &BoundingBox, policy: VoidPolicy) -> f64 {
        let (lat, lon) = bounds.reference_point();
        self.get_max_geoid_with(bounds, policy) + self.geoid.height(lat, lon)
    }

    /// [`Self::get_min_geoid`] plus the geoid separation at the box's
    /// reference point, its south-west corner.
    pub fn get_min_hae(&self, bounds: &BoundingBox) -> f64 {
        self.get_min_hae_with(bounds, self.void_policy)
    }

    /// [`Self::get_min_geoid_with`] plus the geoid separation at the box's
    /// south-west corner.
    pub fn get_min_hae_with(&self, bounds: &BoundingBox, policy: VoidPolicy) -> f64 {
        let (lat, lon) = bounds.reference_point();
        self.get_min_geoid_with(bounds, policy) + self.geoid.height(lat, lon)
    }

    /// The loaded tiles, in search order.
    pub fn tiles(&self) -> &[Arc<TileReader>] {
        &self.tiles
    }

    /// The box supplied at construction.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// The policy applied when a call does not supply one.
    pub fn void_policy(&self) -> VoidPolicy {
        self.void_policy
    }
}

/// Builder for [`MosaicInterpolator`].
///
/// Both public constructors go through this builder, so tiles from explicit
/// files, a catalog and already-parsed readers can be combined.
pub struct MosaicBuilder<'a> {
    geoid: Arc<dyn GeoidModel>,
    bounds: BoundingBox,
    void_policy: VoidPolicy,
    files: Vec<PathBuf>,
    catalog: Option<&'a TileCatalog>,
    tiles: Vec<Arc<TileReader>>,
}

impl<'a> MosaicBuilder<'a> {
    /// Create a builder with no tiles and the default void policy.
    pub fn new(geoid: Arc<dyn GeoidModel>, bounds: BoundingBox) -> Self {
        Self {
            geoid,
            bounds,
            void_policy: VoidPolicy::default(),
            files: Vec::new(),
            catalog: None,
            tiles: Vec::new(),
        }
    }

    /// Add tile files to load.
    pub fn files<P: AsRef<Path>>(mut self, files: &[P]) -> Self {
        self.files
            .extend(files.iter().map(|f| f.as_ref().to_path_buf()));
        self
    }

    /// Add the catalog tiles covering the builder's bounds.
    pub fn catalog(mut self, catalog: &'a TileCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Add an already-parsed tile.
    pub fn tile(mut self, tile: Arc<TileReader>) -> Self {
        self.tiles.push(tile);
        self
    }

    /// Set the default void policy.
    pub fn void_policy(mut self, policy: VoidPolicy) -> Self {
        self.void_policy = policy;
        self
    }

    /// Set the default void policy from an `ignore_voids` flag.
    pub fn ignore_voids(self, ignore_voids: bool) -> Self {
        self.void_policy(VoidPolicy::from_ignore_voids(ignore_voids))
    }

    /// Load every tile and build the [`MosaicInterpolator`].
    pub fn build(self) -> Result<MosaicInterpolator> {
        let mut tiles = self.tiles;

        for path in &self.files {
            tiles.push(Arc::new(TileReader::open(path)?));
        }
        if let Some(catalog) = self.catalog {
            tiles.extend(catalog.load_for_box(&self.bounds)?);
        }

        if tiles.is_empty() {
            tracing::warn!(
                bounds = ?self.bounds,
                "no DTED tiles loaded; elevations fall back to zero above the geoid"
            );
        } else {
            tracing::debug!(tiles = tiles.len(), "built mosaic interpolator");
        }

        Ok(MosaicInterpolator {
            tiles,
            geoid: self.geoid,
            bounds: self.bounds,
            void_policy: self.void_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoid::ConstantGeoid;
    use crate::test_support::TileFixture;
    use crate::void::VOID_VALUE;
    use tempfile::TempDir;

    /// A point on Santa Catalina Island that falls in a void cell.
    const VOID_LAT: f64 = 33.3174;
    const VOID_LON: f64 = -118.36258;

    /// Level 0 tile for N33W119 with the four postings around the void
    /// point set to the sentinel.
    fn catalina_tile() -> TileFixture {
        TileFixture::level0(33, -119)
            .fill_with(|c, r| 20 + ((c * 7 + r * 3) % 40) as i16)
            .set(76, 38, VOID_VALUE)
            .set(77, 38, VOID_VALUE)
            .set(76, 39, VOID_VALUE)
            .set(77, 39, VOID_VALUE)
    }

    fn catalina_geoid() -> Arc<dyn GeoidModel> {
        Arc::new(ConstantGeoid(-36.49))
    }

    fn sloped_geoid() -> Arc<dyn GeoidModel> {
        Arc::new(|lat: f64, lon: f64| lat * 2.0 - lon / 10.0)
    }

    #[test]
    fn test_void_cell_default_policy_leaks_sentinel() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("n33_w119_3arc_v1.dt1");
        catalina_tile().write_to(&path);

        let interp = MosaicInterpolator::new(
            &[&path],
            catalina_geoid(),
            BoundingBox::point(VOID_LAT, VOID_LON),
            VoidPolicy::Preserve,
        )
        .unwrap();

        let hae = interp.get_elevation_hae(VOID_LAT, VOID_LON);
        assert!((hae - -32803.49).abs() < 0.01, "got {}", hae);
    }

    #[test]
    fn test_void_cell_zero_fill() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("n33_w119_3arc_v1.dt1");
        catalina_tile().write_to(&path);

        let interp = MosaicInterpolator::new(
            &[&path],
            catalina_geoid(),
            BoundingBox::point(VOID_LAT, VOID_LON),
            VoidPolicy::ZeroFill,
        )
        .unwrap();

        let hae = interp.get_elevation_hae(VOID_LAT, VOID_LON);
        assert!((hae - -36.49).abs() < 0.01, "got {}", hae);
    }

    #[test]
    fn test_per_call_policy_overrides_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("n33_w119_3arc_v1.dt1");
        catalina_tile().write_to(&path);

        let interp = MosaicInterpolator::new(
            &[&path],
            catalina_geoid(),
            BoundingBox::point(VOID_LAT, VOID_LON),
            VoidPolicy::Preserve,
        )
        .unwrap();

        let filled = interp.get_elevation_hae_with(VOID_LAT, VOID_LON, VoidPolicy::ZeroFill);
        assert!((filled - -36.49).abs() < 0.01);
        let leaked = interp.get_elevation_hae_with(VOID_LAT, VOID_LON, VoidPolicy::Preserve);
        assert!((leaked - -32803.49).abs() < 0.01);
    }

    #[test]
    fn test_catalog_constructor_agrees() {
        let temp_dir = TempDir::new().unwrap();
        let dted_dir = temp_dir.path().join("dted");
        catalina_tile().write_to(&dted_dir.join("n33_w119_3arc_v1.dt1"));
        TileFixture::level0(33, -118).write_to(&dted_dir.join("n33_w118_3arc_v1.dt1"));
        TileFixture::level0(-36, 149).write_to(&dted_dir.join("s36_e149_3arc_v1.dt1"));

        let catalog = TileCatalog::new(temp_dir.path(), 10);
        let bounds = BoundingBox::from_lat_lon_box([33.3174, 33.8174, -118.36258, -118.0]);

        let legacy = MosaicInterpolator::from_coords_and_list(
            bounds,
            &catalog,
            catalina_geoid(),
            VoidPolicy::Preserve,
        )
        .unwrap();
        assert_eq!(legacy.tiles().len(), 2);
        assert!((legacy.get_elevation_hae(VOID_LAT, VOID_LON) - -32803.49).abs() < 0.01);

        let filled = MosaicInterpolator::from_coords_and_list(
            bounds,
            &catalog,
            catalina_geoid(),
            VoidPolicy::ZeroFill,
        )
        .unwrap();
        assert!((filled.get_elevation_hae(VOID_LAT, VOID_LON) - -36.49).abs() < 0.01);

        // Second construction reuses the parsed tiles.
        assert_eq!(catalog.cache_stats().hit_count, 2);
    }

    #[test]
    fn test_empty_tile_set() {
        let bounds = BoundingBox::from_lat_lon_box([10.0, 20.0, 10.5, 20.5]);
        let geoid = sloped_geoid();
        let interp =
            MosaicInterpolator::new::<PathBuf>(&[], geoid.clone(), bounds, VoidPolicy::Preserve)
                .unwrap();

        assert!(interp.tiles().is_empty());
        assert_eq!(interp.get_max_geoid(&bounds), 0.0);
        assert_eq!(interp.get_max_hae(&bounds), geoid.height(10.0, 10.5));
        assert_eq!(interp.get_min_hae(&bounds), geoid.height(10.0, 10.5));
        assert_eq!(interp.get_elevation_hae(15.0, 15.0), geoid.height(15.0, 15.0));
    }

    #[test]
    fn test_uncovered_point_falls_back_to_geoid() {
        let file = TileFixture::level0(33, -119).fill_with(|_, _| 100).write_temp();
        let geoid = sloped_geoid();
        let interp = MosaicInterpolator::new(
            &[file.path()],
            geoid.clone(),
            BoundingBox::point(33.5, -118.5),
            VoidPolicy::Preserve,
        )
        .unwrap();

        assert_eq!(interp.get_elevation_geoid(40.0, -100.0), 0.0);
        assert_eq!(interp.get_elevation_hae(40.0, -100.0), geoid.height(40.0, -100.0));

        let inside = interp.get_elevation_hae(33.5, -118.5);
        assert!((inside - (100.0 + geoid.height(33.5, -118.5))).abs() < 1e-9);
    }

    #[test]
    fn test_mosaic_spans_tiles() {
        let west = TileFixture::level0(33, -119).fill_with(|_, _| 100).write_temp();
        let east = TileFixture::level0(33, -118).fill_with(|_, _| 300).write_temp();
        let interp = MosaicInterpolator::new(
            &[west.path(), east.path()],
            Arc::new(ConstantGeoid(0.0)),
            BoundingBox::new(33.0, -119.0, 34.0, -117.0),
            VoidPolicy::Preserve,
        )
        .unwrap();

        assert!((interp.get_elevation_geoid(33.5, -118.5) - 100.0).abs() < 1e-9);
        assert!((interp.get_elevation_geoid(33.5, -117.5) - 300.0).abs() < 1e-9);

        let heights = interp.get_elevations_hae(&[(33.5, -118.5), (33.5, -117.5), (0.0, 0.0)]);
        assert_eq!(heights.len(), 3);
        assert!((heights[1] - 300.0).abs() < 1e-9);
        assert_eq!(heights[2], 0.0);
    }

    #[test]
    fn test_max_min_over_region() {
        let file = TileFixture::level0(10, 20)
            .fill_with(|_, _| 50)
            .set(60, 60, 1500)
            .set(30, 30, VOID_VALUE)
            .write_temp();
        let bounds = BoundingBox::new(10.0, 20.0, 11.0, 21.0);

        let legacy = MosaicInterpolator::new(
            &[file.path()],
            Arc::new(ConstantGeoid(12.0)),
            bounds,
            VoidPolicy::Preserve,
        )
        .unwrap();
        assert_eq!(legacy.get_max_geoid(&bounds), 1500.0);
        assert_eq!(legacy.get_max_hae(&bounds), 1512.0);
        assert_eq!(legacy.get_min_geoid(&bounds), VOID_VALUE as f64);

        let filled = MosaicInterpolator::builder(Arc::new(ConstantGeoid(12.0)), bounds)
            .files(&[file.path()])
            .ignore_voids(true)
            .build()
            .unwrap();
        assert_eq!(filled.get_min_geoid(&bounds), 0.0);
        assert_eq!(filled.get_min_hae(&bounds), 12.0);

        let elsewhere = BoundingBox::new(40.0, 40.0, 41.0, 41.0);
        assert_eq!(legacy.get_max_geoid(&elsewhere), 0.0);
    }

    #[test]
    fn test_aggregate_policy_per_call() {
        let file = TileFixture::level0(10, 20)
            .fill_with(|_, _| 50)
            .set(30, 30, VOID_VALUE)
            .write_temp();
        let bounds = BoundingBox::new(10.0, 20.0, 11.0, 21.0);
        let interp = MosaicInterpolator::new(
            &[file.path()],
            Arc::new(ConstantGeoid(12.0)),
            bounds,
            VoidPolicy::Preserve,
        )
        .unwrap();

        assert_eq!(interp.get_min_geoid(&bounds), VOID_VALUE as f64);
        assert_eq!(interp.get_min_geoid_with(&bounds, VoidPolicy::ZeroFill), 0.0);
        assert_eq!(interp.get_min_hae_with(&bounds, VoidPolicy::ZeroFill), 12.0);
        assert_eq!(
            interp.get_min_hae_with(&bounds, VoidPolicy::Preserve),
            VOID_VALUE as f64 + 12.0
        );

        // Only postings are void, so the maximum does not depend on the policy.
        assert_eq!(interp.get_max_geoid_with(&bounds, VoidPolicy::ZeroFill), 50.0);
        assert_eq!(interp.get_max_hae_with(&bounds, VoidPolicy::Preserve), 62.0);
    }

    #[test]
    fn test_catalog_agrees_with_file_list_on_edges() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("w119/n33.dt1");
        TileFixture::level0(33, -119)
            .fill_with(|_, _| 100)
            .write_to(&path);
        let catalog = TileCatalog::new(temp_dir.path(), 10);

        for (lat, lon) in [(34.0, -118.5), (33.5, -118.0)] {
            let bounds = BoundingBox::point(lat, lon);
            let direct = MosaicInterpolator::new(
                &[&path],
                Arc::new(ConstantGeoid(0.0)),
                bounds,
                VoidPolicy::Preserve,
            )
            .unwrap();
            let from_catalog = MosaicInterpolator::from_coords_and_list(
                bounds,
                &catalog,
                Arc::new(ConstantGeoid(0.0)),
                VoidPolicy::Preserve,
            )
            .unwrap();

            assert_eq!(from_catalog.tiles().len(), 1);
            let expected = direct.get_elevation_hae(lat, lon);
            assert!((expected - 100.0).abs() < 1e-9);
            assert!((from_catalog.get_elevation_hae(lat, lon) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_prefers_tile_with_surrounding_postings() {
        // The south tile's header box overhangs its last row by one interval.
        let south = TileFixture::level0(33, -119).fill_with(|_, _| 100).write_temp();
        let north = TileFixture::level0(34, -119).fill_with(|_, _| 300).write_temp();
        let interp = MosaicInterpolator::new(
            &[south.path(), north.path()],
            Arc::new(ConstantGeoid(0.0)),
            BoundingBox::new(33.0, -119.0, 35.0, -118.0),
            VoidPolicy::Preserve,
        )
        .unwrap();

        assert!(interp.tiles()[0].contains(34.004, -118.5));
        assert!((interp.get_elevation_geoid(34.004, -118.5) - 300.0).abs() < 1e-9);
        assert!((interp.get_elevation_geoid(33.999, -118.5) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_builder_with_preloaded_tile() {
        let file = TileFixture::level0(0, 0).fill_with(|_, _| 7).write_temp();
        let tile = Arc::new(TileReader::open(file.path()).unwrap());

        let interp = MosaicInterpolator::builder(Arc::new(ConstantGeoid(1.0)), tile.bounds())
            .tile(tile.clone())
            .build()
            .unwrap();
        assert_eq!(interp.void_policy(), VoidPolicy::Preserve);
        assert!((interp.get_elevation_hae(0.5, 0.5) - 8.0).abs() < 1e-9);
        assert_eq!(interp.bounds(), tile.bounds());
    }

    #[test]
    fn test_bad_file_is_format_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.dt1");
        std::fs::write(&path, b"UHL1 not really a header").unwrap();

        let result = MosaicInterpolator::new(
            &[&path],
            Arc::new(ConstantGeoid(0.0)),
            BoundingBox::point(0.0, 0.0),
            VoidPolicy::Preserve,
        );
        assert!(result.err().map(|e| e.is_format_error()).unwrap_or(false));
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MosaicInterpolator>();

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("n33_w119_3arc_v1.dt1");
        catalina_tile().write_to(&path);
        let interp = MosaicInterpolator::new(
            &[&path],
            catalina_geoid(),
            BoundingBox::point(VOID_LAT, VOID_LON),
            VoidPolicy::ZeroFill,
        )
        .unwrap();

        let expected = interp.get_elevation_hae(33.6, -118.6);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| interp.get_elevation_hae(33.6, -118.6)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
