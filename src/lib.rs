//! Ghost Tracker
//!
//! Location-based ghost hunting model: great-circle tracking of a hidden
//! target from noisy GPS and compass streams, plus a timer-driven ghost
//! simulation with anomalies, sanity and a deduction lifecycle.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod simulation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use self::core::{GeoPosition, HeadingSample, PolarPosition, EARTH_RADIUS_M};
pub use algorithms::{bearing_degrees, distance_meters, is_in_forward_cone, normalize_distance, relative_angle};
pub use processing::{PositionSmoother, Throttle};
pub use simulation::{Anomaly, AnomalyKind, GhostType, PhotoQuality, SanityImpact};
pub use utils::{ConfigurationManager, TrackerConfig};
pub use api::{
    ApiResult, ApiError, InvestigationHandle, InvestigationMode, InvestigationRuntime,
    InvestigationSnapshot, InvestigationState, TrackingSession, TrackingSignals
};
