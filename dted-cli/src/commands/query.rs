use anyhow::{Context, Result};
use dted::{BoundingBox, ConstantGeoid, MosaicInterpolator, VoidPolicy};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Serialize)]
struct ElevationResponse {
    lat: f64,
    lon: f64,
    /// Height above ellipsoid, `None` when no tile covers the point.
    hae: Option<f64>,
    geoid_offset: f64,
    void_policy: VoidPolicy,
    tile: Option<PathBuf>,
}

pub fn run(
    data_dir: Option<PathBuf>,
    cache_size: u64,
    lat: f64,
    lon: f64,
    ignore_voids: bool,
    geoid_offset: f64,
    json: bool,
) -> Result<()> {
    let catalog = super::catalog(data_dir, cache_size)?;
    let policy = VoidPolicy::from_ignore_voids(ignore_voids);

    let interp = MosaicInterpolator::from_coords_and_list(
        BoundingBox::point(lat, lon),
        &catalog,
        Arc::new(ConstantGeoid(geoid_offset)),
        policy,
    )
    .context("Failed to load tiles")?;

    let tiles = interp.tiles();
    let tile = tiles
        .iter()
        .find(|tile| tile.header().posting_extent().contains(lat, lon))
        .or_else(|| tiles.iter().find(|tile| tile.contains(lat, lon)))
        .map(|tile| tile.path().to_path_buf());
    let hae = tile
        .as_ref()
        .map(|_| interp.get_elevation_hae(lat, lon));

    if json {
        let response = ElevationResponse {
            lat,
            lon,
            hae,
            geoid_offset,
            void_policy: policy,
            tile,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", super::format_hae(hae));
    }

    Ok(())
}
