//! Basic example demonstrating dted library usage.
//!
//! Run with: cargo run --example basic -- /path/to/dted

use std::env;
use std::sync::Arc;

use dted::{BoundingBox, ConstantGeoid, DtedError, MosaicInterpolator, TileCatalog, VoidPolicy};

fn main() -> Result<(), DtedError> {
    // Get data directory from command line
    let data_dir = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/dted");
        std::process::exit(1);
    });

    // Catalog with up to 10 cached tiles
    let catalog = TileCatalog::new(&data_dir, 10);

    let locations = [
        ("Santa Catalina Island", 33.3174, -118.36258),
        ("Mount Whitney", 36.5785, -118.2923),
        ("Mount Kosciuszko", -36.4559, 148.2636),
    ];

    println!("Elevation queries (bilinear, geoid offset 0):");
    println!("{:-<50}", "");

    for (name, lat, lon) in &locations {
        let interp = MosaicInterpolator::from_coords_and_list(
            BoundingBox::point(*lat, *lon),
            &catalog,
            Arc::new(ConstantGeoid(0.0)),
            VoidPolicy::ZeroFill,
        )?;

        if interp.tiles().is_empty() {
            println!("{}: tile not available locally", name);
        } else {
            println!("{}: {:.1}m", name, interp.get_elevation_hae(*lat, *lon));
        }
    }

    // Show cache statistics
    let stats = catalog.cache_stats();
    println!("\nCache statistics:");
    println!("  Cached tiles: {}", stats.entry_count);
    println!("  Hits: {}", stats.hit_count);
    println!("  Misses: {}", stats.miss_count);
    println!("  Hit rate: {:.1}%", stats.hit_rate() * 100.0);

    Ok(())
}
