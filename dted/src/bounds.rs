//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

/// A geographic bounding box.
///
/// Coordinates are in decimal degrees (WGS84). Bounds are inclusive on every
/// side; a box with equal min and max on both axes is a single point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (southern boundary).
    pub min_lat: f64,
    /// Minimum longitude (western boundary).
    pub min_lon: f64,
    /// Maximum latitude (northern boundary).
    pub max_lat: f64,
    /// Maximum longitude (eastern boundary).
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    ///
    /// # Arguments
    ///
    /// * `min_lat` - Southern boundary latitude
    /// * `min_lon` - Western boundary longitude
    /// * `max_lat` - Northern boundary latitude
    /// * `max_lon` - Eastern boundary longitude
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// A degenerate box covering a single point.
    pub fn point(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, lat, lon)
    }

    /// Build a box from `[lat_min, lat_max, lon_min, lon_max]`, the ordering
    /// used by SAR processing toolchains.
    pub fn from_lat_lon_box(lat_lon_box: [f64; 4]) -> Self {
        let [lat_min, lat_max, lon_min, lon_max] = lat_lon_box;
        Self::new(lat_min, lon_min, lat_max, lon_max)
    }

    /// The point at which single-valued box queries are evaluated: the
    /// south-west corner `(min_lat, min_lon)`.
    pub fn reference_point(&self) -> (f64, f64) {
        (self.min_lat, self.min_lon)
    }

    /// Check if the box contains a point (inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Check if two boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
            && self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lat_lon_box_ordering() {
        let b = BoundingBox::from_lat_lon_box([10.0, 20.0, 10.5, 20.5]);
        assert_eq!(b.min_lat, 10.0);
        assert_eq!(b.max_lat, 20.0);
        assert_eq!(b.min_lon, 10.5);
        assert_eq!(b.max_lon, 20.5);
        assert_eq!(b.reference_point(), (10.0, 10.5));
    }

    #[test]
    fn test_contains_inclusive() {
        let b = BoundingBox::new(33.0, -119.0, 34.0, -118.0);
        assert!(b.contains(33.0, -119.0));
        assert!(b.contains(34.0, -118.0));
        assert!(b.contains(33.3174, -118.36258));
        assert!(!b.contains(34.01, -118.5));

        let p = BoundingBox::point(33.5, -118.5);
        assert!(p.contains(33.5, -118.5));
        assert!(!p.contains(33.5, -118.4));
    }

    #[test]
    fn test_intersects() {
        let tile = BoundingBox::new(33.0, -119.0, 34.0, -118.0);
        assert!(tile.intersects(&BoundingBox::point(33.3174, -118.36258)));
        assert!(tile.intersects(&BoundingBox::new(33.9, -118.1, 35.0, -117.0)));
        assert!(!tile.intersects(&BoundingBox::new(35.0, -118.0, 36.0, -117.0)));
    }
}
