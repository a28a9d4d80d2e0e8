//! Random ghost placement around a hotspot

use super::geo::distance_meters;
use crate::core::{now_ms, GeoPosition, METERS_PER_DEGREE_LAT};
use nalgebra::Vector2;
use rand::Rng;
use std::f64::consts::PI;

/// Pick a random position within `spawn_radius` meters of `hotspot`
///
/// Angle is uniform over [0, 2π) and distance uniform over the radius (not
/// over the disk area), so placements cluster toward the hotspot. The offset
/// is converted with an equirectangular approximation; if that overshoots the
/// haversine radius near the rim the offset is scaled back onto it.
pub fn spawn_ghost_position<R: Rng + ?Sized>(
    hotspot: &GeoPosition,
    spawn_radius: f64,
    rng: &mut R,
) -> GeoPosition {
    let radius = spawn_radius.max(0.0);
    let angle = rng.gen::<f64>() * 2.0 * PI;
    let distance = rng.gen::<f64>() * radius;

    // (east, north) in meters
    let offset = Vector2::new(angle.sin(), angle.cos()) * distance;

    let mut ghost = offset_position(hotspot, &offset);
    let actual = distance_meters(hotspot, &ghost);
    if actual > radius && actual > 0.0 {
        // Land just inside the rim so rounding cannot push it back out
        let scale = (radius / actual) * (1.0 - 1e-9);
        ghost = offset_position(hotspot, &(offset * scale));
    }
    ghost
}

fn offset_position(origin: &GeoPosition, offset: &Vector2<f64>) -> GeoPosition {
    // Keep the longitude scale finite at the poles
    let lat_scale = origin.latitude.to_radians().cos().abs().max(1e-9);
    let d_lat = offset.y / METERS_PER_DEGREE_LAT;
    let d_lon = offset.x / (METERS_PER_DEGREE_LAT * lat_scale);

    let mut longitude = origin.longitude + d_lon;
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }

    GeoPosition::new(
        (origin.latitude + d_lat).clamp(-90.0, 90.0),
        longitude,
        0.0,
        now_ms(),
    )
}
