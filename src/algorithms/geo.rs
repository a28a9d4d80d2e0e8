//! Great-circle geometry between two geodetic positions
//!
//! Distances use the haversine formula on a spherical Earth, bearings the
//! forward azimuth. Both are total over finite inputs: identical points give
//! a distance of 0 and a bearing of 0, antipodal and polar inputs give some
//! finite value in range rather than NaN.

use crate::core::{GeoPosition, EARTH_RADIUS_M};

/// Wrap an angle in degrees into [0, 360)
pub fn wrap_360(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Haversine distance between two positions (meters)
pub fn distance_meters(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h marginally past 1 for antipodal points
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().atan2((1.0 - h).max(0.0).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from `from` to `to`, degrees clockwise from true north in [0, 360)
pub fn bearing_degrees(from: &GeoPosition, to: &GeoPosition) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    wrap_360(y.atan2(x).to_degrees() + 360.0)
}

/// Scale a distance into a [0, 1] proximity value
///
/// Distances at or beyond `max_distance` saturate to 1, negative distances
/// floor at 0.
pub fn normalize_distance(meters: f64, max_distance: f64) -> f64 {
    if max_distance <= 0.0 {
        return if meters > 0.0 { 1.0 } else { 0.0 };
    }
    (meters / max_distance).clamp(0.0, 1.0)
}
