use anyhow::{bail, Context, Result};
use dted::{TileReader, VOID_VALUE};
use std::path::PathBuf;

pub fn run(tile_path: PathBuf) -> Result<()> {
    if !tile_path.exists() {
        bail!("Tile not found: {}", tile_path.display());
    }

    let tile = TileReader::open(&tile_path).context("Failed to load tile")?;
    let header = tile.header();
    let file_size = std::fs::metadata(&tile_path)?.len();

    let (min_elev, max_elev) = tile
        .grid()
        .iter()
        .filter(|&(_, _, v)| v != VOID_VALUE)
        .fold((i16::MAX, i16::MIN), |(lo, hi), (_, _, v)| (lo.min(v), hi.max(v)));
    let void_count = tile.void_count();

    let bounds = tile.bounds();
    let (cell_lat, cell_lon) = header.cell_key();

    println!("Tile: {}", super::format_cell(cell_lat, cell_lon));
    println!("Path: {}", tile_path.display());
    println!();
    println!(
        "Grid: {} columns x {} rows",
        header.columns, header.rows
    );
    println!(
        "Spacing: {:.1}\" lat, {:.1}\" lon",
        header.lat_interval * 3600.0,
        header.lon_interval * 3600.0
    );
    println!(
        "Coverage: lat {:.4} to {:.4}, lon {:.4} to {:.4}",
        bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
    );
    println!("File size: {}", super::format_size(file_size));
    println!();

    if min_elev <= max_elev {
        println!("Min elevation: {}m", min_elev);
        println!("Max elevation: {}m", max_elev);
    }

    let total = (header.columns * header.rows) as f64;
    if void_count > 0 {
        let void_pct = (void_count as f64 / total) * 100.0;
        println!("Void postings: {} ({:.2}%)", void_count, void_pct);
    } else {
        println!("Void postings: none");
    }

    Ok(())
}
