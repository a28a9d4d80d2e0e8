//! Single owner of all investigation state
//!
//! Every mutation goes through one of the methods below. Each mutator returns
//! the [`Effect`]s the driving runtime must carry out (timers to start or
//! cancel, deferred transitions to schedule), so the state itself never holds
//! a timer or a clock.
//!
//! Two counters guard against work that outlives its context:
//! - `timer_generation` changes on every ghost-type change and reset; ticks
//!   stamped with an older generation are ignored.
//! - `epoch` changes on reset only; deferred failures and photo development
//!   stamped with an older epoch are ignored.

use crate::api::types::{
    ApiError, ApiResult, BehaviorTask, Evidence, InvestigationMode, InvestigationSnapshot,
};
use crate::core::PolarPosition;
use crate::simulation::photo::roll_photo_quality;
use crate::simulation::{
    emit_anomaly, step_polar, Anomaly, AnomalyLog, GhostBehaviorProfile, GhostType, PhotoQuality,
    PhotoRecord, Sanity, SanityImpact, SanityOutcome,
};
use crate::utils::config::BehaviorConfig;
use rand::Rng;
use tracing::{debug, info, trace, warn};

/// Work the runtime must perform on behalf of the state owner
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Stop all three behaviour timers
    CancelTimers,
    /// Start all three behaviour timers for `generation`
    StartTimers {
        generation: u64,
        profile: GhostBehaviorProfile,
    },
    /// Deliver `enter_failure(epoch)` after a short delay
    ScheduleFailure { epoch: u64, delay_ms: u64 },
    /// Deliver `develop_photo(epoch, photo_id, ..)` after `delay_ms`
    DevelopPhoto {
        epoch: u64,
        photo_id: u32,
        delay_ms: u64,
    },
    /// A new anomaly was appended to the log
    AnomalyEmitted(Anomaly),
}

pub struct InvestigationState {
    config: BehaviorConfig,
    mode: InvestigationMode,
    ghost_type: Option<GhostType>,
    profile: Option<GhostBehaviorProfile>,
    ghost_position: PolarPosition,
    anomalies: AnomalyLog,
    sanity: Sanity,
    evidence: Vec<Evidence>,
    photos: Vec<PhotoRecord>,
    next_photo_id: u32,
    timer_generation: u64,
    epoch: u64,
    failure_pending: bool,
}

impl InvestigationState {
    pub fn new(config: BehaviorConfig) -> Self {
        let anomalies = AnomalyLog::new(config.anomaly_log_capacity);
        Self {
            config,
            mode: InvestigationMode::Investigating,
            ghost_type: None,
            profile: None,
            ghost_position: PolarPosition::default(),
            anomalies,
            sanity: Sanity::default(),
            evidence: Vec::new(),
            photos: Vec::new(),
            next_photo_id: 1,
            timer_generation: 0,
            epoch: 0,
            failure_pending: false,
        }
    }

    /// Select (or re-select) the ghost type, restarting all behaviour timers
    pub fn set_ghost_type(&mut self, ghost_type: GhostType) -> Vec<Effect> {
        self.timer_generation += 1;
        let profile = ghost_type.profile();
        self.ghost_type = Some(ghost_type);
        self.profile = Some(profile.clone());

        info!(
            ghost = %ghost_type,
            generation = self.timer_generation,
            "ghost type selected"
        );

        vec![
            Effect::CancelTimers,
            Effect::StartTimers {
                generation: self.timer_generation,
                profile,
            },
        ]
    }

    /// Apply one periodic tick, reading the current state at call time
    ///
    /// Once the investigation has failed or completed, the state stays frozen.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        generation: u64,
        task: BehaviorTask,
        rng: &mut R,
        now_ms: u64,
    ) -> Vec<Effect> {
        if generation != self.timer_generation {
            debug!(
                ?task,
                generation,
                current = self.timer_generation,
                "dropping tick from stale timer"
            );
            return Vec::new();
        }
        if self.mode.is_terminal() {
            trace!(?task, mode = %self.mode, "ignoring tick after investigation ended");
            return Vec::new();
        }
        let Some(profile) = self.profile.as_ref() else {
            return Vec::new();
        };

        match task {
            BehaviorTask::Movement => {
                self.ghost_position = step_polar(&self.ghost_position, profile.movement_speed, rng);
                Vec::new()
            }
            BehaviorTask::Behavior => match emit_anomaly(profile, rng, now_ms) {
                Some(anomaly) => {
                    debug!(id = %anomaly.id, intensity = anomaly.intensity, "anomaly emitted");
                    self.anomalies.push(anomaly.clone());
                    vec![Effect::AnomalyEmitted(anomaly)]
                }
                None => Vec::new(),
            },
            BehaviorTask::Sanity => {
                let drain = profile.sanity_drain;
                let outcome = self.sanity.drain(drain);
                self.on_sanity_outcome(outcome)
            }
        }
    }

    /// Apply a discrete sanity hit (or restore, for negative custom amounts)
    pub fn apply_sanity_impact(&mut self, impact: SanityImpact) -> Vec<Effect> {
        let outcome = self.sanity.apply_impact(impact);
        debug!(?impact, sanity = self.sanity.value(), "sanity impact");
        self.on_sanity_outcome(outcome)
    }

    fn on_sanity_outcome(&mut self, outcome: SanityOutcome) -> Vec<Effect> {
        if outcome != SanityOutcome::Depleted || self.failure_pending {
            return Vec::new();
        }
        warn!(epoch = self.epoch, "sanity depleted");
        self.failure_pending = true;
        vec![Effect::ScheduleFailure {
            epoch: self.epoch,
            delay_ms: self.config.failure_transition_delay_ms,
        }]
    }

    /// Deferred half of sanity exhaustion; returns whether the mode changed
    pub fn enter_failure(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping failure from previous investigation");
            return false;
        }
        self.failure_pending = false;
        if !self.mode.can_transition_to(InvestigationMode::Failure) {
            return false;
        }
        self.set_mode(InvestigationMode::Failure);
        true
    }

    /// Tear everything down and start a fresh investigation
    pub fn reset(&mut self) -> Vec<Effect> {
        self.timer_generation += 1;
        self.epoch += 1;
        self.mode = InvestigationMode::Investigating;
        self.ghost_type = None;
        self.profile = None;
        self.ghost_position = PolarPosition::default();
        self.anomalies.clear();
        self.sanity = Sanity::default();
        self.evidence.clear();
        self.photos.clear();
        self.next_photo_id = 1;
        self.failure_pending = false;

        info!(epoch = self.epoch, "investigation reset");
        vec![Effect::CancelTimers]
    }

    /// Take a photo of the ghost at its current distance
    pub fn take_photo(&mut self, now_ms: u64) -> (u32, Vec<Effect>) {
        let id = self.next_photo_id;
        self.next_photo_id += 1;
        self.photos.push(PhotoRecord {
            id,
            distance: self.ghost_position.distance,
            taken_at: now_ms,
            quality: None,
        });
        debug!(id, distance = self.ghost_position.distance, "photo taken");

        let effect = Effect::DevelopPhoto {
            epoch: self.epoch,
            photo_id: id,
            delay_ms: self.config.photo_develop_delay_ms,
        };
        (id, vec![effect])
    }

    /// Resolve a pending photo's quality from a uniform roll in [0, 1)
    ///
    /// Returns `Ok(None)` when the photo belongs to a previous investigation.
    pub fn develop_photo(&mut self, epoch: u64, photo_id: u32, roll: f64) -> ApiResult<Option<PhotoQuality>> {
        if epoch != self.epoch {
            return Ok(None);
        }
        let photo = self
            .photos
            .iter_mut()
            .find(|p| p.id == photo_id && p.quality.is_none())
            .ok_or(ApiError::UnknownPhoto { id: photo_id })?;

        let quality = roll_photo_quality(photo.distance, roll);
        photo.quality = Some(quality);
        info!(id = photo_id, ?quality, "photo developed");

        if quality.is_evidence() {
            let record = photo.clone();
            self.evidence.push(Evidence::Photo(record));
        }
        Ok(Some(quality))
    }

    /// Keep an anomaly from the event log as evidence; returns false if already kept
    pub fn collect_evidence(&mut self, anomaly_id: &str) -> ApiResult<bool> {
        let already = self
            .evidence
            .iter()
            .any(|e| matches!(e, Evidence::Anomaly(a) if a.id == anomaly_id));
        if already {
            return Ok(false);
        }
        let anomaly = self
            .anomalies
            .find(anomaly_id)
            .cloned()
            .ok_or_else(|| ApiError::UnknownAnomaly {
                id: anomaly_id.to_string(),
            })?;
        self.evidence.push(Evidence::Anomaly(anomaly));
        Ok(true)
    }

    pub fn begin_deduction(&mut self) -> ApiResult<()> {
        self.transition(InvestigationMode::Deducing)
    }

    /// Guess the ghost type; a correct guess succeeds, anything else fails
    pub fn submit_deduction(&mut self, guess: GhostType) -> ApiResult<InvestigationMode> {
        let actual = self.ghost_type.ok_or(ApiError::NoGhostType)?;
        let next = if guess == actual {
            InvestigationMode::Success
        } else {
            InvestigationMode::Failure
        };
        self.transition(next)?;
        Ok(next)
    }

    pub fn begin_ritual(&mut self) -> ApiResult<()> {
        self.transition(InvestigationMode::Ritual)
    }

    pub fn complete_ritual(&mut self) -> ApiResult<()> {
        self.transition(InvestigationMode::Complete)
    }

    fn transition(&mut self, next: InvestigationMode) -> ApiResult<()> {
        if !self.mode.can_transition_to(next) {
            return Err(ApiError::InvalidTransition {
                from: self.mode,
                to: next,
            });
        }
        self.set_mode(next);
        Ok(())
    }

    fn set_mode(&mut self, next: InvestigationMode) {
        info!(from = %self.mode, to = %next, "investigation mode changed");
        self.mode = next;
    }

    pub fn mode(&self) -> InvestigationMode {
        self.mode
    }

    pub fn ghost_type(&self) -> Option<GhostType> {
        self.ghost_type
    }

    pub fn ghost_position(&self) -> PolarPosition {
        self.ghost_position
    }

    pub fn sanity(&self) -> f64 {
        self.sanity.value()
    }

    pub fn anomalies(&self) -> &AnomalyLog {
        &self.anomalies
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn snapshot(&self) -> InvestigationSnapshot {
        InvestigationSnapshot {
            mode: self.mode,
            ghost_type: self.ghost_type,
            ghost_position: self.ghost_position,
            sanity: self.sanity.value(),
            anomalies: self.anomalies.to_vec(),
            evidence: self.evidence.clone(),
            photos: self.photos.clone(),
            timer_generation: self.timer_generation,
            epoch: self.epoch,
        }
    }
}

impl Default for InvestigationState {
    fn default() -> Self {
        Self::new(BehaviorConfig::default())
    }
}
