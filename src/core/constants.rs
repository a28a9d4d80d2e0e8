//! Physical constants and tracking parameters

/// Mean Earth radius used by the haversine formula (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate length of one degree of latitude (m)
pub const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

/// Distance at which proximity saturates to 1.0 (m)
pub const DEFAULT_MAX_DISTANCE_M: f64 = 50.0;

/// Radius around a hotspot in which a ghost may be placed (m)
pub const DEFAULT_SPAWN_RADIUS_M: f64 = 50.0;

/// Half-angle of the cone in which the directional indicator is shown
pub const FORWARD_CONE_HALF_ANGLE_DEG: f64 = 45.0;

/// Half-angle treated as "directly ahead"
pub const DIRECTLY_AHEAD_HALF_ANGLE_DEG: f64 = 5.0;
