//! Synthetic DTED tiles for tests.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::header::{DATA_OFFSET, RECORD_SENTINEL, UHL_LEN};

/// Build an 80-byte UHL. Intervals are in tenths of arc-seconds.
pub(crate) fn uhl(
    origin_lat: i32,
    origin_lon: i32,
    lon_interval: u32,
    lat_interval: u32,
    columns: usize,
    rows: usize,
) -> Vec<u8> {
    let text = format!(
        "UHL1{:03}0000{}{:03}0000{}{:04}{:04}{:<4}{:<3}{:<12}{:04}{:04}0{:<24}",
        origin_lon.abs(),
        if origin_lon < 0 { 'W' } else { 'E' },
        origin_lat.abs(),
        if origin_lat < 0 { 'S' } else { 'N' },
        lon_interval,
        lat_interval,
        "NA",
        "U",
        "",
        columns,
        rows,
        "",
    );
    let bytes = text.into_bytes();
    assert_eq!(bytes.len(), UHL_LEN);
    bytes
}

/// Encode an elevation as a big-endian signed-magnitude posting.
pub(crate) fn encode_posting(value: i16) -> [u8; 2] {
    let raw = if value < 0 {
        0x8000 | (-(value as i32)) as u16
    } else {
        value as u16
    };
    raw.to_be_bytes()
}

/// A DTED tile under construction. Postings are stored column-major.
#[derive(Clone)]
pub(crate) struct TileFixture {
    origin_lat: i32,
    origin_lon: i32,
    interval: u32,
    columns: usize,
    rows: usize,
    postings: Vec<i16>,
}

impl TileFixture {
    /// A zero-filled tile with equal latitude and longitude intervals.
    pub(crate) fn new(
        origin_lat: i32,
        origin_lon: i32,
        interval: u32,
        columns: usize,
        rows: usize,
    ) -> Self {
        Self {
            origin_lat,
            origin_lon,
            interval,
            columns,
            rows,
            postings: vec![0; columns * rows],
        }
    }

    /// Level 1 tile: 3 arc-second postings, 1201 × 1201.
    pub(crate) fn level1(origin_lat: i32, origin_lon: i32) -> Self {
        Self::new(origin_lat, origin_lon, 30, 1201, 1201)
    }

    /// Level 0 tile: 30 arc-second postings, 121 × 121.
    pub(crate) fn level0(origin_lat: i32, origin_lon: i32) -> Self {
        Self::new(origin_lat, origin_lon, 300, 121, 121)
    }

    pub(crate) fn set(mut self, column: usize, row: usize, value: i16) -> Self {
        self.postings[column * self.rows + row] = value;
        self
    }

    pub(crate) fn fill_with(mut self, f: impl Fn(usize, usize) -> i16) -> Self {
        for column in 0..self.columns {
            for row in 0..self.rows {
                self.postings[column * self.rows + row] = f(column, row);
            }
        }
        self
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut out = uhl(
            self.origin_lat,
            self.origin_lon,
            self.interval,
            self.interval,
            self.columns,
            self.rows,
        );

        out.extend_from_slice(b"DSI");
        out.resize(UHL_LEN + 648, b' ');
        out.extend_from_slice(b"ACC");
        out.resize(DATA_OFFSET, b' ');

        for column in 0..self.columns {
            let mut record = vec![RECORD_SENTINEL, 0, 0, 0];
            record.extend_from_slice(&(column as u16).to_be_bytes());
            record.extend_from_slice(&0u16.to_be_bytes());
            for row in 0..self.rows {
                record.extend_from_slice(&encode_posting(self.postings[column * self.rows + row]));
            }
            let checksum: i32 = record.iter().map(|&b| b as i32).sum();
            record.extend_from_slice(&checksum.to_be_bytes());
            out.extend_from_slice(&record);
        }
        out
    }

    pub(crate) fn write_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, self.to_bytes()).unwrap();
    }

    pub(crate) fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.to_bytes()).unwrap();
        file
    }
}
