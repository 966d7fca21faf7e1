//! DTED User Header Label parsing.
//!
//! A DTED file starts with three fixed-size ASCII records:
//!
//! | Offset | Length | Record                              |
//! |--------|--------|-------------------------------------|
//! | 0      | 80     | User Header Label (UHL)             |
//! | 80     | 648    | Data Set Identification (DSI)       |
//! | 728    | 2700   | Accuracy Description (ACC)          |
//! | 3428   | ...    | Data records, one per longitude line |
//!
//! Only the UHL is needed to address the posting grid.

use crate::bounds::BoundingBox;
use crate::error::FormatError;

/// Length of the User Header Label.
pub const UHL_LEN: usize = 80;

/// Byte offset of the first data record.
pub const DATA_OFFSET: usize = 3428;

/// First byte of every data record.
pub const RECORD_SENTINEL: u8 = 0xAA;

/// Bytes preceding the postings in a data record: sentinel, block count,
/// longitude count, latitude count.
pub const RECORD_PREFIX_LEN: usize = 8;

/// Trailing checksum bytes of a data record.
pub const RECORD_CHECKSUM_LEN: usize = 4;

/// Tenths of arc-seconds per degree.
const TENTHS_ARCSEC_PER_DEGREE: f64 = 36_000.0;

/// Metadata parsed from the User Header Label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHeader {
    /// Latitude of the south-west corner in decimal degrees.
    pub origin_lat: f64,
    /// Longitude of the south-west corner in decimal degrees.
    pub origin_lon: f64,
    /// Latitude posting interval in degrees.
    pub lat_interval: f64,
    /// Longitude posting interval in degrees.
    pub lon_interval: f64,
    /// Number of latitude points per longitude line.
    pub rows: usize,
    /// Number of longitude lines.
    pub columns: usize,
}

impl TileHeader {
    /// Parse the UHL from the start of a DTED file.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < UHL_LEN {
            return Err(FormatError::Truncated {
                size: bytes.len(),
                expected: UHL_LEN,
            });
        }
        if &bytes[0..3] != b"UHL" {
            return Err(FormatError::MissingSentinel);
        }

        let origin_lon = parse_angle(&bytes[4..12], "origin longitude", b'E', b'W')?;
        let origin_lat = parse_angle(&bytes[12..20], "origin latitude", b'N', b'S')?;
        let lon_interval = parse_int(&bytes[20..24], "longitude interval")? as f64
            / TENTHS_ARCSEC_PER_DEGREE;
        let lat_interval = parse_int(&bytes[24..28], "latitude interval")? as f64
            / TENTHS_ARCSEC_PER_DEGREE;
        let columns = parse_int(&bytes[47..51], "number of longitude lines")?;
        let rows = parse_int(&bytes[51..55], "number of latitude points")?;

        if columns <= 0 || rows <= 0 {
            return Err(FormatError::NonPositiveDimension { columns, rows });
        }
        if lon_interval <= 0.0 || lat_interval <= 0.0 {
            return Err(FormatError::InvalidField {
                field: "posting interval",
                value: field_text(&bytes[20..28]),
            });
        }

        Ok(Self {
            origin_lat,
            origin_lon,
            lat_interval,
            lon_interval,
            rows: rows as usize,
            columns: columns as usize,
        })
    }

    /// Length in bytes of one data record (one column).
    pub fn record_len(&self) -> usize {
        RECORD_PREFIX_LEN + 2 * self.rows + RECORD_CHECKSUM_LEN
    }

    /// Minimum file size needed to hold every data record.
    pub fn expected_file_size(&self) -> usize {
        DATA_OFFSET + self.columns * self.record_len()
    }

    /// The tile's extent: origin plus interval times posting count.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.origin_lat,
            self.origin_lon,
            self.origin_lat + self.lat_interval * self.rows as f64,
            self.origin_lon + self.lon_interval * self.columns as f64,
        )
    }

    /// The box spanned by the postings themselves, from the first to the
    /// last row and column. One interval smaller than [`Self::bounds`].
    pub fn posting_extent(&self) -> BoundingBox {
        BoundingBox::new(
            self.origin_lat,
            self.origin_lon,
            self.origin_lat + self.lat_interval * (self.rows - 1) as f64,
            self.origin_lon + self.lon_interval * (self.columns - 1) as f64,
        )
    }

    /// Fractional `(column, row)` grid position of a coordinate.
    pub fn grid_position(&self, lat: f64, lon: f64) -> (f64, f64) {
        (
            (lon - self.origin_lon) / self.lon_interval,
            (lat - self.origin_lat) / self.lat_interval,
        )
    }

    /// The 1°×1° cell key `(floor_lat, floor_lon)` of the origin.
    pub fn cell_key(&self) -> (i32, i32) {
        (self.origin_lat.floor() as i32, self.origin_lon.floor() as i32)
    }
}

fn field_text(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

fn parse_int(field: &[u8], name: &'static str) -> Result<i64, FormatError> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| FormatError::InvalidField {
            field: name,
            value: field_text(field),
        })
}

/// Parse a `DDDMMSSH` angle, negating for the `negative` hemisphere letter.
fn parse_angle(
    field: &[u8],
    name: &'static str,
    positive: u8,
    negative: u8,
) -> Result<f64, FormatError> {
    let invalid = || FormatError::InvalidField {
        field: name,
        value: field_text(field),
    };

    let degrees = parse_int(&field[0..3], name).map_err(|_| invalid())?;
    let minutes = parse_int(&field[3..5], name).map_err(|_| invalid())?;
    let seconds = parse_int(&field[5..7], name).map_err(|_| invalid())?;
    let value = degrees as f64 + minutes as f64 / 60.0 + seconds as f64 / 3600.0;

    match field[7].to_ascii_uppercase() {
        h if h == positive => Ok(value),
        h if h == negative => Ok(-value),
        _ => Err(invalid()),
    }
}
