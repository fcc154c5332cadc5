//! Great-circle distance between coordinate pairs.

use medirank_common::GeoPoint;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * h.sqrt().asin() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_at_identity() {
        let p = GeoPoint::new(19.076, 72.8777);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric() {
        let a = GeoPoint::new(28.7041, 77.1025); // Delhi
        let b = GeoPoint::new(19.076, 72.8777);  // Mumbai
        let d1 = haversine_km(a, b);
        let d2 = haversine_km(b, a);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Delhi to Mumbai is roughly 1150 km great-circle
        let a = GeoPoint::new(28.7041, 77.1025);
        let b = GeoPoint::new(19.076, 72.8777);
        let d = haversine_km(a, b);
        assert!(d > 1100.0 && d < 1200.0, "got {}", d);
    }
}
