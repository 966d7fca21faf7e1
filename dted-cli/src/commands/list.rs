use anyhow::{Context, Result};
use dted::catalog::cell_key_from_path;
use std::path::PathBuf;

pub fn run(data_dir: Option<PathBuf>, cache_size: u64) -> Result<()> {
    let catalog = super::catalog(data_dir, cache_size)?;
    let dir = catalog.root().to_path_buf();

    let tiles = catalog
        .scan_tile_files()
        .with_context(|| format!("Data directory does not exist: {}", dir.display()))?;

    if tiles.is_empty() {
        println!("No DTED files found in: {}", dir.display());
        return Ok(());
    }

    let mut level_counts = [0usize; 3];
    let mut unknown_count = 0;
    let mut total_size: u64 = 0;

    println!("{:<36} {:>6} {:>12}", "TILE", "LEVEL", "CELL");
    println!("{}", "-".repeat(56));

    for path in &tiles {
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        total_size += size;

        let relative = path.strip_prefix(&dir).unwrap_or(path);
        let level = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.to_ascii_lowercase().strip_prefix("dt")?.parse::<usize>().ok())
            .filter(|level| *level < level_counts.len());
        let level_str = match level {
            Some(level) => {
                level_counts[level] += 1;
                level.to_string()
            }
            None => {
                unknown_count += 1;
                "?".to_string()
            }
        };

        let cell = cell_key_from_path(path)
            .map(|(lat, lon)| super::format_cell(lat, lon))
            .unwrap_or_else(|| "Unknown".to_string());

        println!("{:<36} {:>6} {:>12}", relative.display(), level_str, cell);
    }

    // Summary
    println!();
    println!("Summary:");
    println!("  Total tiles: {}", tiles.len());
    for (level, count) in level_counts.iter().enumerate() {
        if *count > 0 {
            println!("  DTED level {}: {}", level, count);
        }
    }
    if unknown_count > 0 {
        println!("  Unknown: {}", unknown_count);
    }
    println!("  Total size: {}", super::format_size(total_size));
    println!("  Data directory: {}", dir.display());

    Ok(())
}
