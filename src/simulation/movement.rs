//! Random-walk movement in radar space

use crate::algorithms::wrap_360;
use crate::core::PolarPosition;
use rand::Rng;

/// Maximum angular step at speed 1.0 (degrees, peak to peak)
pub const ANGLE_STEP_DEG: f64 = 60.0;

/// Maximum radial step at speed 1.0 (normalized, peak to peak)
pub const DISTANCE_STEP: f64 = 0.1;

/// Closest the ghost may drift to the radar center
pub const MIN_GHOST_DISTANCE: f64 = 0.2;

/// Farthest the ghost may drift toward the radar edge
pub const MAX_GHOST_DISTANCE: f64 = 0.9;

/// Apply one random-walk step to `position`
///
/// The angle wraps around, the distance is clamped to
/// [`MIN_GHOST_DISTANCE`, `MAX_GHOST_DISTANCE`].
pub fn step_polar<R: Rng + ?Sized>(
    position: &PolarPosition,
    movement_speed: f64,
    rng: &mut R,
) -> PolarPosition {
    let angle_change = (rng.gen::<f64>() - 0.5) * ANGLE_STEP_DEG * movement_speed;
    let distance_change = (rng.gen::<f64>() - 0.5) * DISTANCE_STEP * movement_speed;

    PolarPosition {
        angle: wrap_360(position.angle + angle_change),
        distance: (position.distance + distance_change).clamp(MIN_GHOST_DISTANCE, MAX_GHOST_DISTANCE),
    }
}
