//! DTED tile parsing and posting access.
//!
//! This module provides [`TileReader`], which loads a whole DTED file into an
//! [`ElevationGrid`] and answers indexed and geographic queries against it.

use std::path::{Path, PathBuf};

use crate::bounds::BoundingBox;
use crate::error::{DtedError, FormatError, Result};
use crate::header::{TileHeader, DATA_OFFSET, RECORD_PREFIX_LEN, RECORD_SENTINEL};
use crate::void::{repair, VoidPolicy, VOID_VALUE};

/// Slack applied when snapping box edges to grid lines.
const GRID_EPSILON: f64 = 1e-9;

/// Decode a big-endian signed-magnitude posting.
///
/// DTED stores the sign in the high bit and the magnitude in the low 15 bits,
/// so the void sentinel `-32767` is the bit pattern `0xFFFF`.
#[inline]
pub fn decode_posting(bytes: [u8; 2]) -> i16 {
    let raw = u16::from_be_bytes(bytes);
    let magnitude = (raw & 0x7FFF) as i16;
    if raw & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// A dense grid of elevation postings.
///
/// Indexed as `(column, row)`: columns run west to east with longitude, rows
/// run south to north with latitude. Storage is column-major, matching the
/// on-disk record order.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    columns: usize,
    rows: usize,
    postings: Vec<i16>,
}

impl ElevationGrid {
    /// Create a grid from column-major postings.
    ///
    /// Returns `None` if `postings.len() != columns * rows`.
    pub fn new(columns: usize, rows: usize, postings: Vec<i16>) -> Option<Self> {
        (postings.len() == columns * rows).then_some(Self {
            columns,
            rows,
            postings,
        })
    }

    /// Number of columns (longitude lines).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows (latitude points per line).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The raw posting at `(column, row)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is outside the grid.
    #[inline]
    pub fn at(&self, column: usize, row: usize) -> i16 {
        assert!(
            column < self.columns && row < self.rows,
            "posting ({column}, {row}) outside {}x{} grid",
            self.columns,
            self.rows
        );
        self.postings[column * self.rows + row]
    }

    /// The raw posting at `(column, row)`, or `None` if out of range.
    #[inline]
    pub fn get(&self, column: usize, row: usize) -> Option<i16> {
        (column < self.columns && row < self.rows).then(|| self.postings[column * self.rows + row])
    }

    /// All postings of one column, south to north.
    pub fn column(&self, column: usize) -> &[i16] {
        let start = column * self.rows;
        &self.postings[start..start + self.rows]
    }

    /// Iterate `(column, row, value)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, i16)> + '_ {
        let rows = self.rows;
        self.postings
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / rows, i % rows, v))
    }
}

/// A parsed DTED tile held in memory.
///
/// The file handle is released as soon as parsing finishes; a `TileReader`
/// is immutable and can be shared between threads.
///
/// # Example
///
/// ```ignore
/// use dted::{TileReader, VoidPolicy};
///
/// let tile = TileReader::open("n33_w119_3arc_v1.dt1")?;
/// let raw = tile.read(1000, 800, VoidPolicy::Preserve)?;
/// let filled = tile.read(1000, 800, VoidPolicy::ZeroFill)?;
/// ```
#[derive(Debug, Clone)]
pub struct TileReader {
    path: PathBuf,
    header: TileHeader,
    grid: ElevationGrid,
}

impl TileReader {
    /// Load a DTED tile from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DtedError::Format`] if the file cannot be read, the header is
    /// malformed, the grid is empty, the file is truncated or a data record
    /// is missing its sentinel.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).map_err(|e| DtedError::format(path, FormatError::Unreadable(e)))?;
        Self::from_bytes(path, &bytes)
    }

    /// Parse a DTED tile from an in-memory buffer.
    ///
    /// `path` is only recorded for reporting.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self> {
        let path = path.into();
        let header = TileHeader::parse(bytes).map_err(|kind| DtedError::format(&path, kind))?;

        let expected = header.expected_file_size();
        if bytes.len() < expected {
            return Err(DtedError::format(
                &path,
                FormatError::Truncated {
                    size: bytes.len(),
                    expected,
                },
            ));
        }

        let record_len = header.record_len();
        let mut postings = Vec::with_capacity(header.columns * header.rows);
        for column in 0..header.columns {
            let start = DATA_OFFSET + column * record_len;
            if bytes[start] != RECORD_SENTINEL {
                return Err(DtedError::format(&path, FormatError::InvalidRecord { column }));
            }
            let data = &bytes[start + RECORD_PREFIX_LEN..start + RECORD_PREFIX_LEN + 2 * header.rows];
            postings.extend(data.chunks_exact(2).map(|b| decode_posting([b[0], b[1]])));
        }

        let grid = ElevationGrid {
            columns: header.columns,
            rows: header.rows,
            postings,
        };

        tracing::debug!(
            path = %path.display(),
            origin_lat = header.origin_lat,
            origin_lon = header.origin_lon,
            columns = header.columns,
            rows = header.rows,
            "parsed DTED tile"
        );

        Ok(Self { path, header, grid })
    }

    /// Read the posting at `(column, row)`, repaired according to `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`DtedError::IndexOutOfRange`] if the index lies outside the grid.
    #[inline]
    pub fn read(&self, column: usize, row: usize, policy: VoidPolicy) -> Result<i16> {
        match self.grid.get(column, row) {
            Some(v) => Ok(repair(v, policy)),
            None => Err(DtedError::IndexOutOfRange {
                column,
                row,
                columns: self.grid.columns,
                rows: self.grid.rows,
            }),
        }
    }

    /// Bilinearly interpolated elevation at `(lat, lon)` within this tile.
    ///
    /// Each of the four neighbouring postings is repaired before blending, so
    /// with [`VoidPolicy::Preserve`] a void neighbour drags the result towards
    /// -32767. Returns `None` if the coordinate lies outside the tile.
    pub fn elevation_at(&self, lat: f64, lon: f64, policy: VoidPolicy) -> Option<f64> {
        if !self.contains(lat, lon) {
            return None;
        }

        let (fx, fy) = self.header.grid_position(lat, lon);
        let (ix, iy) = (fx.floor(), fy.floor());
        let (dx, dy) = (fx - ix, fy - iy);

        let last_col = self.grid.columns - 1;
        let last_row = self.grid.rows - 1;
        let c0 = (ix.max(0.0) as usize).min(last_col);
        let r0 = (iy.max(0.0) as usize).min(last_row);
        let c1 = (c0 + 1).min(last_col);
        let r1 = (r0 + 1).min(last_row);

        let v00 = repair(self.grid.at(c0, r0), policy) as f64;
        let v10 = repair(self.grid.at(c1, r0), policy) as f64;
        let v01 = repair(self.grid.at(c0, r1), policy) as f64;
        let v11 = repair(self.grid.at(c1, r1), policy) as f64;

        Some(
            (1.0 - dx) * (1.0 - dy) * v00
                + dx * (1.0 - dy) * v10
                + (1.0 - dx) * dy * v01
                + dx * dy * v11,
        )
    }

    /// Check whether the tile's bounding box contains `(lat, lon)`.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.bounds().contains(lat, lon)
    }

    /// Highest repaired posting inside `bounds`, or `None` if no posting
    /// falls inside.
    pub fn max_in(&self, bounds: &BoundingBox, policy: VoidPolicy) -> Option<i16> {
        self.postings_in(bounds, policy).max()
    }

    /// Lowest repaired posting inside `bounds`, or `None` if no posting
    /// falls inside.
    pub fn min_in(&self, bounds: &BoundingBox, policy: VoidPolicy) -> Option<i16> {
        self.postings_in(bounds, policy).min()
    }

    fn postings_in<'a>(
        &'a self,
        bounds: &BoundingBox,
        policy: VoidPolicy,
    ) -> impl Iterator<Item = i16> + 'a {
        let (columns, rows) = self.index_range(bounds).unwrap_or((1..=0, 1..=0));
        columns.flat_map(move |c| {
            rows.clone()
                .map(move |r| repair(self.grid.at(c, r), policy))
        })
    }

    /// Inclusive column and row index ranges of postings inside `bounds`.
    fn index_range(
        &self,
        bounds: &BoundingBox,
    ) -> Option<(
        std::ops::RangeInclusive<usize>,
        std::ops::RangeInclusive<usize>,
    )> {
        if !self.bounds().intersects(bounds) {
            return None;
        }

        let (c0, r0) = self.header.grid_position(bounds.min_lat, bounds.min_lon);
        let (c1, r1) = self.header.grid_position(bounds.max_lat, bounds.max_lon);

        let c0 = (c0 - GRID_EPSILON).ceil().max(0.0);
        let r0 = (r0 - GRID_EPSILON).ceil().max(0.0);
        let c1 = (c1 + GRID_EPSILON).floor().min((self.grid.columns - 1) as f64);
        let r1 = (r1 + GRID_EPSILON).floor().min((self.grid.rows - 1) as f64);

        if c1 < c0 || r1 < r0 {
            return None;
        }
        Some((c0 as usize..=c1 as usize, r0 as usize..=r1 as usize))
    }

    /// Grid indices of every void posting as `(columns, rows)`.
    ///
    /// Scan order is column-major (column outer, row inner), the order
    /// postings are stored on disk.
    pub fn void_indices(&self) -> (Vec<usize>, Vec<usize>) {
        self.grid
            .iter()
            .filter(|&(_, _, v)| v == VOID_VALUE)
            .map(|(c, r, _)| (c, r))
            .unzip()
    }

    /// Number of void postings.
    pub fn void_count(&self) -> usize {
        self.grid.postings.iter().filter(|&&v| v == VOID_VALUE).count()
    }

    /// Returns `true` if any posting is void.
    pub fn has_voids(&self) -> bool {
        self.grid.postings.contains(&VOID_VALUE)
    }

    /// The tile's bounding box as declared by its header.
    pub fn bounds(&self) -> BoundingBox {
        self.header.bounds()
    }

    /// The parsed header.
    pub fn header(&self) -> &TileHeader {
        &self.header
    }

    /// The posting grid.
    pub fn grid(&self) -> &ElevationGrid {
        &self.grid
    }

    /// Path the tile was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of columns (longitude lines).
    pub fn columns(&self) -> usize {
        self.grid.columns
    }

    /// Number of rows (latitude points per line).
    pub fn rows(&self) -> usize {
        self.grid.rows
    }
}
