//! Point-to-point distance functions used by the statistics engine.

use crate::grammar::CoordinateSystem;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between two points of a trajectory.
pub trait PointDistance: Send + Sync {
    fn distance(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64;

    fn name(&self) -> &'static str;
}

/// Straight-line distance in the plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl PointDistance for Euclidean {
    fn distance(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        (x2 - x1).hypot(y2 - y1)
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// Haversine distance in kilometres between `(lon, lat)` points in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircle;

impl PointDistance for GreatCircle {
    fn distance(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
        let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
        let d_phi = (lat2 - lat1).to_radians();
        let d_lambda = (lon2 - lon1).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }

    fn name(&self) -> &'static str {
        "great-circle"
    }
}

/// The distance function registered for a coordinate system.
pub fn for_coordinate_system(system: CoordinateSystem) -> Box<dyn PointDistance> {
    match system {
        CoordinateSystem::Cartesian => Box::new(Euclidean),
        CoordinateSystem::Geographic => Box::new(GreatCircle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_is_pythagorean() {
        assert_eq!(Euclidean.distance(0.0, 0.0, 3.0, 4.0), 5.0);
    }

    #[test]
    fn great_circle_one_degree_on_equator() {
        let d = GreatCircle.distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn great_circle_same_point_is_zero() {
        assert_eq!(GreatCircle.distance(-0.1278, 51.5074, -0.1278, 51.5074), 0.0);
    }

    #[test]
    fn selects_by_coordinate_system() {
        assert_eq!(for_coordinate_system(CoordinateSystem::Cartesian).name(), "euclidean");
        assert_eq!(for_coordinate_system(CoordinateSystem::Geographic).name(), "great-circle");
    }
}
