//! Pure geometry: great-circle math, heading-relative bearings and ghost placement

pub mod geo;
pub mod bearing;
pub mod placement;

pub use geo::{bearing_degrees, distance_meters, normalize_distance, wrap_360};
pub use bearing::{is_in_forward_cone, relative_angle};
pub use placement::spawn_ghost_position;
