// SPDX-License-Identifier: MIT

//! Haversine distance and the geofence admission decision.

use crate::models::GeoPoint;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points (haversine).
///
/// Pure and total for finite input; NaN propagates for non-finite
/// coordinates.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Outcome of evaluating a device reading against a session geofence.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeofenceDecision {
    /// Rounded distance from the device to the session center
    pub distance_meters: f64,
    /// Allowed radius
    pub radius_meters: f64,
    /// Whether the present mark is admitted
    pub admitted: bool,
}

/// Evaluate admission: admit iff `distance <= radius` (boundary admitted).
///
/// The reported accuracy of the reading is recorded elsewhere but never
/// compensates this decision.
pub fn evaluate(device: GeoPoint, center: GeoPoint, radius_meters: f64) -> GeofenceDecision {
    let distance = distance_meters(device, center).round();
    GeofenceDecision {
        distance_meters: distance,
        radius_meters,
        admitted: distance <= radius_meters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAKARTA: GeoPoint = GeoPoint {
        lat: -6.2088,
        lng: 106.8456,
    };
    const BANDUNG: GeoPoint = GeoPoint {
        lat: -6.9175,
        lng: 107.6191,
    };

    #[test]
    fn test_distance_is_symmetric() {
        let d1 = distance_meters(JAKARTA, BANDUNG);
        let d2 = distance_meters(BANDUNG, JAKARTA);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance_meters(BANDUNG, BANDUNG), 0.0);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        let east = GeoPoint { lat: 0.0, lng: 1.0 };

        let d = distance_meters(origin, east);
        let expected = 111_195.0;
        assert!(
            (d - expected).abs() / expected < 0.01,
            "expected ~{expected} m, got {d} m"
        );
    }

    #[test]
    fn test_nan_propagates() {
        let bad = GeoPoint {
            lat: f64::NAN,
            lng: 0.0,
        };
        assert!(distance_meters(bad, BANDUNG).is_nan());
    }

    #[test]
    fn test_admission_within_radius() {
        let center = GeoPoint {
            lat: -6.9273429,
            lng: 107.6559513,
        };
        // ~111 m north of center
        let nearby = GeoPoint {
            lat: center.lat + 0.001,
            lng: center.lng,
        };

        let decision = evaluate(nearby, center, 200.0);
        assert!(decision.admitted);
        assert!(decision.distance_meters > 0.0 && decision.distance_meters < 200.0);
    }

    #[test]
    fn test_rejection_outside_radius() {
        let center = GeoPoint {
            lat: -6.9273429,
            lng: 107.6559513,
        };
        let faraway = GeoPoint {
            lat: center.lat + 0.01,
            lng: center.lng,
        };

        let decision = evaluate(faraway, center, 200.0);
        assert!(!decision.admitted);
        assert!(decision.distance_meters > 200.0);
    }

    #[test]
    fn test_boundary_distance_admitted() {
        // Non-strict comparison: distance exactly equal to the radius
        // is still admitted.
        let center = GeoPoint { lat: 0.0, lng: 0.0 };
        let device = GeoPoint {
            lat: 0.001,
            lng: 0.0,
        };

        let exact = distance_meters(device, center).round();
        let decision = evaluate(device, center, exact);
        assert_eq!(decision.distance_meters, exact);
        assert!(decision.admitted);
    }

    #[test]
    fn test_zero_distance_at_center() {
        let center = GeoPoint {
            lat: -6.9273429,
            lng: 107.6559513,
        };
        let decision = evaluate(center, center, 200.0);
        assert_eq!(decision.distance_meters, 0.0);
        assert!(decision.admitted);
    }
}
