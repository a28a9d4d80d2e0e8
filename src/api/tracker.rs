//! Location and heading pipeline
//!
//! Raw fixes are validated, throttled and smoothed before they reach the
//! distance/bearing computation, which is throttled separately. Every derived
//! signal is `None` until the inputs it needs have arrived at least once, so
//! "no sample yet" is never confused with "a poor sample".

use crate::algorithms::{
    bearing_degrees, distance_meters, is_in_forward_cone, normalize_distance, relative_angle,
    spawn_ghost_position, wrap_360,
};
use crate::api::types::{ApiError, ApiResult, SensorError, SensorStatus, TrackingSignals};
use crate::core::{GeoPosition, HeadingSample};
use crate::processing::{PositionSmoother, Throttle};
use crate::utils::config::TrackingConfig;
use rand::Rng;
use tracing::{debug, trace, warn};

/// Platform sensor feeding the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Location,
    Heading,
}

pub struct TrackingSession {
    config: TrackingConfig,
    smoother: PositionSmoother,
    location_throttle: Throttle,
    recompute_throttle: Throttle,
    player: Option<GeoPosition>,
    target: Option<GeoPosition>,
    heading: Option<HeadingSample>,
    distance_m: Option<f64>,
    bearing: Option<f64>,
    location_status: SensorStatus,
    heading_status: SensorStatus,
}

impl TrackingSession {
    pub fn new(config: TrackingConfig) -> Self {
        let location_throttle = Throttle::new(config.location_throttle_ms);
        let recompute_throttle = Throttle::new(config.recompute_throttle_ms);
        Self {
            config,
            smoother: PositionSmoother::new(),
            location_throttle,
            recompute_throttle,
            player: None,
            target: None,
            heading: None,
            distance_m: None,
            bearing: None,
            location_status: SensorStatus::Waiting,
            heading_status: SensorStatus::Waiting,
        }
    }

    /// Feed a raw fix from the location sensor
    ///
    /// Returns the smoothed player position, or `None` when the fix was
    /// dropped by the throttle. Malformed fixes are rejected before they can
    /// touch any state.
    pub fn on_location(&mut self, fix: GeoPosition, now_ms: u64) -> ApiResult<Option<GeoPosition>> {
        fix.validate()?;
        self.location_status = SensorStatus::Active;

        if !self.location_throttle.try_acquire(now_ms) {
            trace!(now_ms, "location fix throttled");
            return Ok(None);
        }

        let smoothed = self.smoother.add_sample_at(fix, now_ms);
        self.player = Some(smoothed);
        self.recompute(now_ms);
        Ok(Some(smoothed))
    }

    /// Feed a compass reading; not throttled
    pub fn on_heading(&mut self, sample: HeadingSample) -> ApiResult<()> {
        if !sample.heading.is_finite() {
            return Err(ApiError::InvalidCoordinate {
                field: "heading".to_string(),
                value: sample.heading,
            });
        }
        self.heading_status = SensorStatus::Active;
        self.heading = Some(HeadingSample {
            heading: wrap_360(sample.heading),
            accuracy: sample.accuracy,
        });
        Ok(())
    }

    /// Record a sensor failure; derived signals keep their last values
    pub fn on_sensor_error(&mut self, sensor: Sensor, error: SensorError) {
        warn!(?sensor, ?error, "sensor error");
        match sensor {
            Sensor::Location => self.location_status = SensorStatus::Failed(error),
            Sensor::Heading => self.heading_status = SensorStatus::Failed(error),
        }
    }

    /// Point the tracker at a new target and recompute immediately
    pub fn set_target(&mut self, target: GeoPosition, now_ms: u64) -> ApiResult<()> {
        target.validate()?;
        self.target = Some(target);
        self.distance_m = None;
        self.bearing = None;
        self.recompute_throttle.reset();
        self.recompute(now_ms);
        Ok(())
    }

    /// Place the target at a random point around `hotspot`
    pub fn spawn_target<R: Rng + ?Sized>(
        &mut self,
        hotspot: &GeoPosition,
        rng: &mut R,
        now_ms: u64,
    ) -> ApiResult<GeoPosition> {
        hotspot.validate()?;
        let target = spawn_ghost_position(hotspot, self.config.spawn_radius_m, rng);
        debug!(
            latitude = target.latitude,
            longitude = target.longitude,
            "target spawned"
        );
        self.set_target(target, now_ms)?;
        Ok(target)
    }

    /// Recompute distance and bearing if the throttle allows; returns whether it ran
    pub fn recompute(&mut self, now_ms: u64) -> bool {
        let (Some(player), Some(target)) = (self.player, self.target) else {
            return false;
        };
        if !self.recompute_throttle.try_acquire(now_ms) {
            trace!(now_ms, "recompute throttled");
            return false;
        }
        self.distance_m = Some(distance_meters(&player, &target));
        self.bearing = Some(bearing_degrees(&player, &target));
        true
    }

    /// Drop all samples and derived values
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.location_throttle.reset();
        self.recompute_throttle.reset();
        self.player = None;
        self.target = None;
        self.heading = None;
        self.distance_m = None;
        self.bearing = None;
        self.location_status = SensorStatus::Waiting;
        self.heading_status = SensorStatus::Waiting;
    }

    pub fn player_position(&self) -> Option<GeoPosition> {
        self.player
    }

    pub fn target_position(&self) -> Option<GeoPosition> {
        self.target
    }

    pub fn heading(&self) -> Option<HeadingSample> {
        self.heading
    }

    pub fn distance_meters(&self) -> Option<f64> {
        self.distance_m
    }

    /// Normalized closeness in [0, 1]; 0 when on top of the target
    pub fn proximity(&self) -> Option<f64> {
        self.distance_m
            .map(|d| normalize_distance(d, self.config.max_distance_m))
    }

    pub fn bearing(&self) -> Option<f64> {
        self.bearing
    }

    /// Target bearing relative to the current heading, in (-180, 180]
    pub fn relative_bearing(&self) -> Option<f64> {
        match (self.bearing, self.heading) {
            (Some(bearing), Some(heading)) => Some(relative_angle(bearing, heading.heading)),
            _ => None,
        }
    }

    /// Whether the directional indicator should be shown
    pub fn indicator_visible(&self) -> bool {
        self.in_cone(self.config.forward_cone_deg)
    }

    pub fn directly_ahead(&self) -> bool {
        self.in_cone(self.config.directly_ahead_deg)
    }

    fn in_cone(&self, half_angle: f64) -> bool {
        match (self.bearing, self.heading) {
            (Some(bearing), Some(heading)) => is_in_forward_cone(bearing, heading.heading, half_angle),
            _ => false,
        }
    }

    pub fn sensor_status(&self, sensor: Sensor) -> SensorStatus {
        match sensor {
            Sensor::Location => self.location_status,
            Sensor::Heading => self.heading_status,
        }
    }

    pub fn signals(&self) -> TrackingSignals {
        TrackingSignals {
            player: self.player,
            target: self.target,
            heading: self.heading,
            distance_m: self.distance_m,
            proximity: self.proximity(),
            bearing: self.bearing,
            relative_bearing: self.relative_bearing(),
            indicator_visible: self.indicator_visible(),
            directly_ahead: self.directly_ahead(),
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new(TrackingConfig::default())
    }
}
