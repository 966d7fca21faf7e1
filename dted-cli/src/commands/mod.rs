pub mod batch;
pub mod info;
pub mod list;
pub mod query;
pub mod voids;

use anyhow::{Context, Result};
use dted::{TileCatalog, TileCatalogBuilder};
use std::path::PathBuf;

/// Build the tile catalog from `--data-dir` or the environment.
pub fn catalog(data_dir: Option<PathBuf>, cache_size: u64) -> Result<TileCatalog> {
    let builder = match data_dir {
        Some(dir) => TileCatalogBuilder::new(dir),
        None => TileCatalogBuilder::from_env().context(
            "DTED_DATA_DIR environment variable not set. Use --data-dir or set DTED_DATA_DIR",
        )?,
    };

    Ok(builder.cache_size(cache_size).build())
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Text for a height, or `no tile` when no tile covers the point.
pub fn format_hae(hae: Option<f64>) -> String {
    match hae {
        Some(hae) => format!("{:.2}", hae),
        None => "no tile".to_string(),
    }
}

/// Format a cell corner as e.g. `N33 W119`.
pub fn format_cell(lat: i32, lon: i32) -> String {
    format!(
        "{}{:02} {}{:03}",
        if lat >= 0 { "N" } else { "S" },
        lat.abs(),
        if lon >= 0 { "E" } else { "W" },
        lon.abs()
    )
}
