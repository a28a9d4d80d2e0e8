//! Common API types and data structures

use crate::core::{GeoPosition, HeadingSample, PolarPosition};
use crate::simulation::{Anomaly, GhostType, PhotoRecord};
use crate::utils::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// A fix carried a coordinate the position math cannot use
    #[error("Invalid coordinate: {field} = {value}")]
    InvalidCoordinate { field: String, value: f64 },
    /// Requested mode change is not allowed from the current mode
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: InvestigationMode,
        to: InvestigationMode,
    },
    /// Operation needs an active ghost type
    #[error("No ghost type selected")]
    NoGhostType,
    /// Referenced anomaly is not in the event log
    #[error("Unknown anomaly: {id}")]
    UnknownAnomaly { id: String },
    /// Referenced photo does not exist or is already developed
    #[error("Unknown photo: {id}")]
    UnknownPhoto { id: u32 },
    /// Invalid configuration
    #[error("Configuration error: {parameter} = {value}")]
    ConfigurationError { parameter: String, value: String },
    /// The owning runtime task has stopped
    #[error("Investigation runtime is not running")]
    RuntimeStopped,
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidParameter { parameter, value, .. } => {
                ApiError::ConfigurationError { parameter, value }
            }
            ConfigError::IoError { message } | ConfigError::SerializationError { message } => {
                ApiError::ConfigurationError {
                    parameter: "file".to_string(),
                    value: message,
                }
            }
        }
    }
}

/// Investigation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestigationMode {
    Investigating,
    Deducing,
    Success,
    Failure,
    Ritual,
    Complete,
}

impl InvestigationMode {
    /// Whether `next` may follow `self`
    pub fn can_transition_to(&self, next: InvestigationMode) -> bool {
        use InvestigationMode::*;
        matches!(
            (self, next),
            (Investigating, Deducing)
                | (Investigating, Failure)
                | (Deducing, Success)
                | (Deducing, Failure)
                | (Success, Ritual)
                | (Ritual, Complete)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvestigationMode::Failure | InvestigationMode::Complete)
    }
}

impl fmt::Display for InvestigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvestigationMode::Investigating => "investigating",
            InvestigationMode::Deducing => "deducing",
            InvestigationMode::Success => "success",
            InvestigationMode::Failure => "failure",
            InvestigationMode::Ritual => "ritual",
            InvestigationMode::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// The three independent periodic behaviour tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorTask {
    Movement,
    Behavior,
    Sanity,
}

impl BehaviorTask {
    pub const ALL: [BehaviorTask; 3] = [BehaviorTask::Movement, BehaviorTask::Behavior, BehaviorTask::Sanity];
}

/// Evidence gathered by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Evidence {
    Anomaly(Anomaly),
    Photo(PhotoRecord),
}

/// Read model of an investigation, published to presentation code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationSnapshot {
    pub mode: InvestigationMode,
    pub ghost_type: Option<GhostType>,
    pub ghost_position: PolarPosition,
    pub sanity: f64,
    pub anomalies: Vec<Anomaly>,
    pub evidence: Vec<Evidence>,
    pub photos: Vec<PhotoRecord>,
    pub timer_generation: u64,
    pub epoch: u64,
}

/// Why a platform sensor stopped delivering samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorError {
    PermissionDenied,
    Unavailable,
    Timeout,
}

/// Availability of one platform sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    /// No sample and no error yet
    Waiting,
    Active,
    Failed(SensorError),
}

/// Derived tracking signals consumed by presentation code
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingSignals {
    pub player: Option<GeoPosition>,
    pub target: Option<GeoPosition>,
    pub heading: Option<HeadingSample>,
    pub distance_m: Option<f64>,
    pub proximity: Option<f64>,
    pub bearing: Option<f64>,
    pub relative_bearing: Option<f64>,
    pub indicator_visible: bool,
    pub directly_ahead: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvestigationMode::*;

    #[test]
    fn test_mode_transitions() {
        assert!(Investigating.can_transition_to(Deducing));
        assert!(Investigating.can_transition_to(Failure));
        assert!(Deducing.can_transition_to(Success));
        assert!(Success.can_transition_to(Ritual));
        assert!(Ritual.can_transition_to(Complete));

        assert!(!Investigating.can_transition_to(Success));
        assert!(!Failure.can_transition_to(Investigating));
        assert!(!Complete.can_transition_to(Ritual));
        assert!(!Deducing.can_transition_to(Ritual));
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::InvalidTransition { from: Failure, to: Deducing };
        assert_eq!(err.to_string(), "Invalid transition from failure to deducing");
        let err = ApiError::InvalidCoordinate { field: "latitude".to_string(), value: 91.0 };
        assert_eq!(err.to_string(), "Invalid coordinate: latitude = 91");
    }
}
