//! Batch void detection across DTED tiles.
//!
//! Results use the strings `"True"`/`"False"` rather than booleans, the
//! format existing report consumers expect.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{TileCatalog, TileSource};
use crate::error::Result;
use crate::reader::TileReader;

/// Render a boolean as `"True"` or `"False"`.
pub fn bool_flag(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

/// Void report for one tile, including the location of every void posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidReport {
    /// `"True"` if any posting is void.
    pub has_voids: String,
    /// `(column indices, row indices)` of void postings, column-major order.
    pub indices: (Vec<usize>, Vec<usize>),
}

/// Result of checking one tile for voids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VoidCheck {
    /// `"True"` or `"False"`.
    Flag(String),
    /// Flag plus void indices.
    Report(VoidReport),
}

impl VoidCheck {
    /// Returns `true` if the tile contains at least one void posting.
    pub fn has_voids(&self) -> bool {
        match self {
            VoidCheck::Flag(flag) => flag == "True",
            VoidCheck::Report(report) => report.has_voids == "True",
        }
    }
}

/// Check one parsed tile for voids.
pub fn check_tile(tile: &TileReader, return_indices: bool) -> VoidCheck {
    if !return_indices {
        return VoidCheck::Flag(bool_flag(tile.has_voids()));
    }

    let indices = tile.void_indices();
    VoidCheck::Report(VoidReport {
        has_voids: bool_flag(!indices.0.is_empty()),
        indices,
    })
}

/// Check a file, a directory, or a list of either for void postings.
///
/// Every resolved file is parsed and scanned in full. With `return_indices`
/// each result also lists the void postings as `(columns, rows)`, scanning
/// column by column and south to north within a column.
///
/// # Errors
///
/// Fails on the first path that does not exist or does not parse.
///
/// # Example
///
/// ```ignore
/// use dted::check_for_voids;
///
/// let results = check_for_voids("/data/dted", false)?;
/// for (path, check) in &results {
///     println!("{}: {}", path.display(), check.has_voids());
/// }
/// ```
pub fn check_for_voids(
    source: impl Into<TileSource>,
    return_indices: bool,
) -> Result<BTreeMap<PathBuf, VoidCheck>> {
    let files = TileCatalog::resolve(source)?;

    let mut results = BTreeMap::new();
    for path in files {
        let tile = TileReader::open(&path)?;
        let check = check_tile(&tile, return_indices);
        tracing::debug!(path = %path.display(), voids = check.has_voids(), "checked tile for voids");
        results.insert(path, check);
    }

    tracing::info!(
        tiles = results.len(),
        with_voids = results.values().filter(|c| c.has_voids()).count(),
        "void scan complete"
    );
    Ok(results)
}
