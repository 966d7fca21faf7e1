//! Geoid-to-ellipsoid separation.
//!
//! The interpolator does not parse geoid grids itself; it asks a
//! [`GeoidModel`] for the separation at each query point. Any
//! `Fn(f64, f64) -> f64` closure is a model, which is how EGM-backed lookups
//! are plugged in.

/// A lookup returning the geoid height above the ellipsoid, in meters.
pub trait GeoidModel: Send + Sync {
    /// Separation in meters at `(lat, lon)` in decimal degrees.
    fn height(&self, lat: f64, lon: f64) -> f64;
}

impl<F> GeoidModel for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn height(&self, lat: f64, lon: f64) -> f64 {
        self(lat, lon)
    }
}

/// A geoid with the same separation everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantGeoid(pub f64);

impl GeoidModel for ConstantGeoid {
    fn height(&self, _lat: f64, _lon: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_model() {
        let model = |lat: f64, lon: f64| lat + lon;
        assert_eq!(model.height(10.0, 10.5), 20.5);

        let boxed: Box<dyn GeoidModel> = Box::new(model);
        assert_eq!(boxed.height(1.0, 2.0), 3.0);
    }

    #[test]
    fn test_constant_geoid() {
        assert_eq!(ConstantGeoid(-36.49).height(33.3, -118.3), -36.49);
        assert_eq!(ConstantGeoid::default().height(0.0, 0.0), 0.0);
    }
}
