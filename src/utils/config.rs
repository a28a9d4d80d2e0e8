use crate::core::{
    DEFAULT_MAX_DISTANCE_M, DEFAULT_SPAWN_RADIUS_M, DIRECTLY_AHEAD_HALF_ANGLE_DEG,
    FORWARD_CONE_HALF_ANGLE_DEG,
};
use crate::simulation::anomaly::ANOMALY_LOG_CAPACITY;
use crate::simulation::photo::PHOTO_DEVELOP_DELAY_MS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Complete tracker configuration, as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// Location and heading pipeline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Minimum spacing between accepted GPS fixes (milliseconds)
    pub location_throttle_ms: u64,
    /// Minimum spacing between distance/bearing recomputations (milliseconds)
    pub recompute_throttle_ms: u64,
    /// Distance at which proximity saturates (meters)
    pub max_distance_m: f64,
    /// Radius around the hotspot for ghost placement (meters)
    pub spawn_radius_m: f64,
    /// Half-angle for showing the directional indicator (degrees)
    pub forward_cone_deg: f64,
    /// Half-angle treated as directly ahead (degrees)
    pub directly_ahead_deg: f64,
}

/// Ghost behaviour simulator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Random-walk period (milliseconds)
    pub movement_interval_ms: u64,
    /// Anomaly roll period (milliseconds)
    pub behavior_interval_ms: u64,
    /// Sanity drain period (milliseconds)
    pub sanity_interval_ms: u64,
    /// Number of anomalies kept in the event log
    pub anomaly_log_capacity: usize,
    /// Delay between sanity reaching zero and the failure transition (milliseconds)
    pub failure_transition_delay_ms: u64,
    /// Delay before a photo's quality is known (milliseconds)
    pub photo_develop_delay_ms: u64,
    /// Fixed RNG seed for reproducible runs
    pub rng_seed: Option<u64>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            location_throttle_ms: 1000,
            recompute_throttle_ms: 200,
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
            spawn_radius_m: DEFAULT_SPAWN_RADIUS_M,
            forward_cone_deg: FORWARD_CONE_HALF_ANGLE_DEG,
            directly_ahead_deg: DIRECTLY_AHEAD_HALF_ANGLE_DEG,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            movement_interval_ms: 2000,
            behavior_interval_ms: 1500,
            sanity_interval_ms: 1000,
            anomaly_log_capacity: ANOMALY_LOG_CAPACITY,
            failure_transition_delay_ms: 100,
            photo_develop_delay_ms: PHOTO_DEVELOP_DELAY_MS,
            rng_seed: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("I/O error: {message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl TrackerConfig {
    /// Check every field, returning all problems found
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        let t = &self.tracking;

        if t.location_throttle_ms == 0 {
            errors.push(invalid("location_throttle_ms", t.location_throttle_ms, "must be positive"));
        }
        if t.recompute_throttle_ms == 0 {
            errors.push(invalid("recompute_throttle_ms", t.recompute_throttle_ms, "must be positive"));
        }
        if !(t.max_distance_m.is_finite() && t.max_distance_m > 0.0) {
            errors.push(invalid("max_distance_m", t.max_distance_m, "must be a positive distance"));
        }
        if !(t.spawn_radius_m.is_finite() && t.spawn_radius_m > 0.0) {
            errors.push(invalid("spawn_radius_m", t.spawn_radius_m, "must be a positive distance"));
        }
        if !valid_half_angle(t.forward_cone_deg) {
            errors.push(invalid("forward_cone_deg", t.forward_cone_deg, "must be in (0, 180]"));
        }
        if !valid_half_angle(t.directly_ahead_deg) {
            errors.push(invalid("directly_ahead_deg", t.directly_ahead_deg, "must be in (0, 180]"));
        }

        if let Err(behavior_errors) = self.behavior.validate() {
            errors.extend(behavior_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl BehaviorConfig {
    /// Check the simulator parameters; zero timer periods are rejected
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("movement_interval_ms", self.movement_interval_ms),
            ("behavior_interval_ms", self.behavior_interval_ms),
            ("sanity_interval_ms", self.sanity_interval_ms),
        ] {
            if value == 0 {
                errors.push(invalid(name, value, "timer period must be positive"));
            }
        }
        if self.anomaly_log_capacity == 0 {
            errors.push(invalid("anomaly_log_capacity", self.anomaly_log_capacity, "must hold at least one anomaly"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn valid_half_angle(angle: f64) -> bool {
    angle.is_finite() && angle > 0.0 && angle <= 180.0
}

/// Loads, validates and adjusts the tracker configuration
pub struct ConfigurationManager {
    config: TrackerConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
            config_file_path: None,
            is_modified: false,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replace the whole configuration after validation
    pub fn update_config(&mut self, config: TrackerConfig) -> Result<(), ConfigError> {
        config.validate().map_err(first_error)?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file; missing sections take defaults
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: TrackerConfig = serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to parse config file '{}': {}", path_str, e),
        })?;

        config.validate().map_err(first_error)?;

        info!(path = %path_str, "configuration loaded");
        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        debug!(path = %path_str, "configuration saved");
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was last loaded from or saved to
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            }),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    // Runtime parameter adjustment; each setter returns the previous value

    pub fn set_max_distance(&mut self, meters: f64) -> Result<f64, ConfigError> {
        if !(meters.is_finite() && meters > 0.0) {
            return Err(invalid("max_distance_m", meters, "must be a positive distance"));
        }
        let old = std::mem::replace(&mut self.config.tracking.max_distance_m, meters);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_spawn_radius(&mut self, meters: f64) -> Result<f64, ConfigError> {
        if !(meters.is_finite() && meters > 0.0) {
            return Err(invalid("spawn_radius_m", meters, "must be a positive distance"));
        }
        let old = std::mem::replace(&mut self.config.tracking.spawn_radius_m, meters);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_forward_cone(&mut self, half_angle_deg: f64) -> Result<f64, ConfigError> {
        if !valid_half_angle(half_angle_deg) {
            return Err(invalid("forward_cone_deg", half_angle_deg, "must be in (0, 180]"));
        }
        let old = std::mem::replace(&mut self.config.tracking.forward_cone_deg, half_angle_deg);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_location_throttle(&mut self, interval_ms: u64) -> Result<u64, ConfigError> {
        if interval_ms == 0 {
            return Err(invalid("location_throttle_ms", interval_ms, "must be positive"));
        }
        let old = std::mem::replace(&mut self.config.tracking.location_throttle_ms, interval_ms);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_rng_seed(&mut self, seed: Option<u64>) -> Option<u64> {
        self.is_modified = true;
        std::mem::replace(&mut self.config.behavior.rng_seed, seed)
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn first_error(errors: Vec<ConfigError>) -> ConfigError {
    errors.into_iter().next().unwrap_or_else(|| ConfigError::InvalidParameter {
        parameter: "config".to_string(),
        value: "invalid".to_string(),
        reason: "Configuration validation failed".to_string(),
    })
}
