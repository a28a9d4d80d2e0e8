//! Investigation and tracking APIs
//!
//! `tracker` turns platform location/heading streams into tracking signals,
//! `investigation` owns the gameplay state, and `runtime` drives that state
//! from timers on a tokio runtime.

pub mod types;
pub mod investigation;
pub mod tracker;
pub mod runtime;

// Re-export commonly used API types
pub use types::{
    ApiResult, ApiError, BehaviorTask, Evidence, InvestigationMode, InvestigationSnapshot,
    SensorError, SensorStatus, TrackingSignals
};
pub use investigation::{Effect, InvestigationState};
pub use tracker::{Sensor, TrackingSession};
pub use runtime::{InvestigationHandle, InvestigationRuntime};
