//! Configuration loading and validation

pub mod config;

pub use config::{BehaviorConfig, ConfigError, ConfigurationManager, TrackerConfig, TrackingConfig};
