//! # DTED - Terrain Elevation Library
//!
//! Reader and interpolation engine for DTED (Digital Terrain Elevation Data)
//! tiles, with explicit control over how void postings are treated.
//!
//! ## Features
//!
//! - **Exact format**: big-endian, signed-magnitude postings decoded without
//!   assuming host byte order
//! - **Mosaics**: bilinear interpolation across any number of adjacent tiles
//! - **HAE**: elevations corrected by a pluggable geoid model
//! - **Void policy**: every read and interpolation call chooses whether the
//!   `-32767` sentinel is kept or zero-filled
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use dted::{BoundingBox, ConstantGeoid, MosaicInterpolator, TileReader, VoidPolicy};
//!
//! let tile = TileReader::open("/data/dted/w119/n33.dt1")?;
//! let posting = tile.read(1000, 800, VoidPolicy::ZeroFill)?;
//!
//! let interp = MosaicInterpolator::new(
//!     &["/data/dted/w119/n33.dt1"],
//!     Arc::new(ConstantGeoid(-36.5)),
//!     BoundingBox::point(33.3174, -118.36258),
//!     VoidPolicy::Preserve,
//! )?;
//! println!("HAE: {:.2}m", interp.get_elevation_hae(33.3174, -118.36258));
//! ```
//!
//! ## DTED Data Format
//!
//! A DTED file holds a 3428-byte block of ASCII header records followed by
//! one data record per longitude line:
//!
//! - **Level 0**: 30 arc-second postings, 121×121 per 1° cell
//! - **Level 1**: 3 arc-second postings, 1201×1201 per 1° cell
//! - **Level 2**: 1 arc-second postings, 3601×3601 per 1° cell
//!
//! Each posting is a 16-bit big-endian signed-magnitude integer in meters.
//! The special value -32767 indicates void (no data).

pub mod bounds;
pub mod catalog;
pub mod error;
pub mod geoid;
pub mod header;
pub mod interpolator;
pub mod reader;
pub mod scanner;
pub mod void;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types at crate root for convenience
pub use bounds::BoundingBox;
pub use catalog::{CacheStats, TileCatalog, TileCatalogBuilder, TileSource};
pub use error::{DtedError, FormatError, Result};
pub use geoid::{ConstantGeoid, GeoidModel};
pub use header::TileHeader;
pub use interpolator::{MosaicBuilder, MosaicInterpolator};
pub use reader::{ElevationGrid, TileReader};
pub use scanner::{check_for_voids, VoidCheck, VoidReport};
pub use void::{repair, repair_values, repaired, Posting, VoidPolicy, VOID_VALUE};
