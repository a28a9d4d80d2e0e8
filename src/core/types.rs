//! Core data types for the tracking model

use crate::api::types::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall clock time in milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A single position fix in geodetic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Reported 1-sigma horizontal error (meters)
    pub accuracy: f64,
    /// Fix time (milliseconds since epoch)
    pub timestamp: u64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp: u64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
        }
    }

    /// Exact position stamped with the current time
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, 0.0, now_ms())
    }

    /// Reject fixes whose coordinates cannot feed the position math
    pub fn validate(&self) -> ApiResult<()> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(ApiError::InvalidCoordinate {
                field: "latitude".to_string(),
                value: self.latitude,
            });
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(ApiError::InvalidCoordinate {
                field: "longitude".to_string(),
                value: self.longitude,
            });
        }
        if !self.accuracy.is_finite() || self.accuracy < 0.0 {
            return Err(ApiError::InvalidCoordinate {
                field: "accuracy".to_string(),
                value: self.accuracy,
            });
        }
        Ok(())
    }
}

/// Compass reading from the device orientation sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingSample {
    /// Heading in degrees clockwise from north
    pub heading: f64,
    /// Reported heading error (degrees)
    pub accuracy: f64,
}

impl HeadingSample {
    pub fn new(heading: f64, accuracy: f64) -> Self {
        Self { heading, accuracy }
    }
}

/// Ghost position in radar display space
///
/// `angle` is in degrees [0, 360), `distance` is normalized to [0, 1]
/// where 0 is the radar center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPosition {
    pub angle: f64,
    pub distance: f64,
}

impl Default for PolarPosition {
    fn default() -> Self {
        Self {
            angle: 0.0,
            distance: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_normal_fix() {
        let fix = GeoPosition::new(51.5007, -0.1246, 8.0, 1_000);
        assert!(fix.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let fix = GeoPosition::new(f64::NAN, 0.0, 5.0, 0);
        assert!(matches!(
            fix.validate(),
            Err(ApiError::InvalidCoordinate { ref field, .. }) if field == "latitude"
        ));

        let fix = GeoPosition::new(10.0, f64::INFINITY, 5.0, 0);
        assert!(fix.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(GeoPosition::new(91.0, 0.0, 1.0, 0).validate().is_err());
        assert!(GeoPosition::new(0.0, -181.0, 1.0, 0).validate().is_err());
        assert!(GeoPosition::new(0.0, 0.0, -1.0, 0).validate().is_err());
    }

    #[test]
    fn test_polar_default_is_mid_radar() {
        let polar = PolarPosition::default();
        assert_eq!(polar.angle, 0.0);
        assert_eq!(polar.distance, 0.5);
    }
}
