// WGS84 semi-axes.
const EQUATOR_RADIUS_KM: f64 = 6378.137;
const POLAR_RADIUS_KM: f64 = 6356.752;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    /// Distance between two points in kilometers: haversine with the sphere
    /// radius replaced by the ellipse radius at the mean latitude of the two
    /// points. Symmetric (`a.dist(b) == b.dist(a)`) and deterministic, which
    /// matters because acceptance decisions sit right at the distance
    /// threshold.
    pub fn ellipse_distance_km(&self, other: &Point) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude - self.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let central_angle = 2.0 * h.sqrt().asin();

        let mean_lat = (lat1 + lat2) / 2.0;
        let radius_km = EQUATOR_RADIUS_KM * mean_lat.cos().powi(2)
            + POLAR_RADIUS_KM * mean_lat.sin().powi(2);
        radius_km * central_angle
    }
}

/// Absolute difference between two bearings in degrees. No wrap-around at
/// 0/360, matching how heading change has always been judged here: a swing
/// across north reads as a large change.
pub fn bearing_delta(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance() {
        let p = Point {
            latitude: 31.23037,
            longitude: 121.47337,
        };
        assert_eq!(p.ellipse_distance_km(&p), 0.0);
    }

    #[test]
    fn symmetry() {
        let a = Point {
            latitude: 31.23037,
            longitude: 121.47337,
        };
        let b = Point {
            latitude: 30.2719716,
            longitude: 120.163856,
        };
        assert_eq!(a.ellipse_distance_km(&b), b.ellipse_distance_km(&a));
    }

    #[test]
    fn one_degree_of_latitude() {
        // a degree of latitude is roughly 111 km anywhere on the ellipse
        let a = Point {
            latitude: 30.0,
            longitude: 120.0,
        };
        let b = Point {
            latitude: 31.0,
            longitude: 120.0,
        };
        let d = a.ellipse_distance_km(&b);
        assert!((110.0..112.0).contains(&d), "got {}", d);
    }

    #[test]
    fn bearing_delta_is_unwrapped() {
        assert_eq!(bearing_delta(10.0, 350.0), 340.0);
        assert_eq!(bearing_delta(350.0, 10.0), 340.0);
        assert_eq!(bearing_delta(90.0, 45.0), 45.0);
    }
}
