//! Example comparing the two void policies on every tile of a directory.
//!
//! Run with: cargo run --example void_policy -- /path/to/dted

use std::env;

use dted::{check_for_voids, DtedError, TileReader, VoidCheck, VoidPolicy};

fn main() -> Result<(), DtedError> {
    let target = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example void_policy -- /path/to/dted");
        std::process::exit(1);
    });

    let results = check_for_voids(target.as_str(), true)?;

    for (path, check) in &results {
        let VoidCheck::Report(report) = check else {
            continue;
        };
        let (columns, rows) = &report.indices;
        println!("{}: has_voids={} ({} postings)", path.display(), report.has_voids, columns.len());

        // Show how the first void reads under each policy
        if let (Some(&c), Some(&r)) = (columns.first(), rows.first()) {
            let tile = TileReader::open(path)?;
            println!(
                "  ({}, {}): preserve={} zero_fill={}",
                c,
                r,
                tile.read(c, r, VoidPolicy::Preserve)?,
                tile.read(c, r, VoidPolicy::ZeroFill)?
            );
        }
    }

    Ok(())
}
