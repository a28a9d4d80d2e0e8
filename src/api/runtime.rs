//! Async driver for an investigation
//!
//! One owner task holds the [`InvestigationState`] and processes commands
//! from a single channel, one at a time. The three behaviour timers are
//! separate tasks that only ever send `Tick` messages into that channel, so
//! every tick is applied against the state as it is when the tick is
//! processed. Timers are aborted together whenever the ghost type changes,
//! the investigation is reset or the owner stops.

use crate::api::investigation::{Effect, InvestigationState};
use crate::api::types::{ApiError, ApiResult, BehaviorTask, InvestigationMode, InvestigationSnapshot};
use crate::simulation::{GhostType, SanityImpact};
use crate::utils::config::{first_error, BehaviorConfig};
use crate::core::now_ms;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

enum Command {
    SetGhostType(GhostType),
    Tick { generation: u64, task: BehaviorTask },
    SanityImpact(SanityImpact),
    EnterFailure { epoch: u64 },
    TakePhoto { reply: oneshot::Sender<u32> },
    DevelopPhoto { epoch: u64, photo_id: u32 },
    CollectEvidence { anomaly_id: String, reply: oneshot::Sender<ApiResult<bool>> },
    BeginDeduction { reply: oneshot::Sender<ApiResult<()>> },
    SubmitDeduction { guess: GhostType, reply: oneshot::Sender<ApiResult<InvestigationMode>> },
    BeginRitual { reply: oneshot::Sender<ApiResult<()>> },
    CompleteRitual { reply: oneshot::Sender<ApiResult<()>> },
    Reset,
    Snapshot { reply: oneshot::Sender<InvestigationSnapshot> },
    Shutdown,
}

/// The three behaviour timers of one ghost-type selection
struct BehaviorTimers {
    generation: u64,
    handles: Vec<JoinHandle<()>>,
}

impl Drop for BehaviorTimers {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
        debug!(generation = self.generation, "behavior timers cancelled");
    }
}

/// Clock that follows tokio time, so paused-time tests see virtual timestamps
struct Clock {
    wall_at_start: u64,
    started: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            wall_at_start: now_ms(),
            started: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.wall_at_start + self.started.elapsed().as_millis() as u64
    }
}

struct Owner {
    state: InvestigationState,
    rng: StdRng,
    clock: Clock,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Sender<InvestigationSnapshot>,
    timers: Option<BehaviorTimers>,
    deferred: Vec<JoinHandle<()>>,
}

impl Owner {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = inbox.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            let effects = self.handle(command);
            self.apply(effects);
            self.snapshots.send_replace(self.state.snapshot());
        }

        self.timers = None;
        self.cancel_deferred();
        info!("investigation runtime stopped");
    }

    fn handle(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::SetGhostType(ghost_type) => self.state.set_ghost_type(ghost_type),
            Command::Tick { generation, task } => {
                trace!(?task, generation, "tick");
                let now = self.clock.now_ms();
                self.state.tick(generation, task, &mut self.rng, now)
            }
            Command::SanityImpact(impact) => self.state.apply_sanity_impact(impact),
            Command::EnterFailure { epoch } => {
                self.state.enter_failure(epoch);
                Vec::new()
            }
            Command::TakePhoto { reply } => {
                let (id, effects) = self.state.take_photo(self.clock.now_ms());
                let _ = reply.send(id);
                effects
            }
            Command::DevelopPhoto { epoch, photo_id } => {
                let roll = self.rng.gen::<f64>();
                if let Err(e) = self.state.develop_photo(epoch, photo_id, roll) {
                    debug!(error = %e, "photo development skipped");
                }
                Vec::new()
            }
            Command::CollectEvidence { anomaly_id, reply } => {
                let _ = reply.send(self.state.collect_evidence(&anomaly_id));
                Vec::new()
            }
            Command::BeginDeduction { reply } => {
                let _ = reply.send(self.state.begin_deduction());
                Vec::new()
            }
            Command::SubmitDeduction { guess, reply } => {
                let _ = reply.send(self.state.submit_deduction(guess));
                Vec::new()
            }
            Command::BeginRitual { reply } => {
                let _ = reply.send(self.state.begin_ritual());
                Vec::new()
            }
            Command::CompleteRitual { reply } => {
                let _ = reply.send(self.state.complete_ritual());
                Vec::new()
            }
            Command::Reset => {
                self.cancel_deferred();
                self.state.reset()
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
                Vec::new()
            }
            Command::Shutdown => Vec::new(),
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CancelTimers => self.timers = None,
                Effect::StartTimers { generation, .. } => {
                    let config = self.state.config();
                    let handles = BehaviorTask::ALL
                        .iter()
                        .map(|&task| {
                            let period_ms = match task {
                                BehaviorTask::Movement => config.movement_interval_ms,
                                BehaviorTask::Behavior => config.behavior_interval_ms,
                                BehaviorTask::Sanity => config.sanity_interval_ms,
                            };
                            spawn_timer(task, period_ms, generation, self.commands.clone())
                        })
                        .collect();
                    self.timers = Some(BehaviorTimers { generation, handles });
                    debug!(generation, "behavior timers started");
                }
                Effect::ScheduleFailure { epoch, delay_ms } => {
                    self.defer(delay_ms, Command::EnterFailure { epoch });
                }
                Effect::DevelopPhoto { epoch, photo_id, delay_ms } => {
                    self.defer(delay_ms, Command::DevelopPhoto { epoch, photo_id });
                }
                Effect::AnomalyEmitted(anomaly) => {
                    trace!(id = %anomaly.id, "anomaly recorded");
                }
            }
        }
    }

    fn defer(&mut self, delay_ms: u64, command: Command) {
        self.deferred.retain(|handle| !handle.is_finished());
        let commands = self.commands.clone();
        self.deferred.push(tokio::spawn(async move {
            time::sleep(Duration::from_millis(delay_ms)).await;
            let _ = commands.send(command);
        }));
    }

    fn cancel_deferred(&mut self) {
        for handle in self.deferred.drain(..) {
            handle.abort();
        }
    }
}

fn spawn_timer(
    task: BehaviorTask,
    period_ms: u64,
    generation: u64,
    commands: mpsc::UnboundedSender<Command>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_millis(period_ms);
        // First tick one full period after start, like a browser interval
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if commands.send(Command::Tick { generation, task }).is_err() {
                break;
            }
        }
    })
}

/// Entry point for running investigations on a tokio runtime
pub struct InvestigationRuntime;

impl InvestigationRuntime {
    /// Start the owner task; must be called from within a tokio runtime
    ///
    /// Fails without spawning anything if a timer period or the log capacity is zero.
    pub fn spawn(config: BehaviorConfig) -> ApiResult<InvestigationHandle> {
        config.validate().map_err(first_error)?;

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = InvestigationState::new(config);
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot());
        let (commands, inbox) = mpsc::unbounded_channel();

        let owner = Owner {
            state,
            rng,
            clock: Clock::new(),
            commands: commands.clone(),
            snapshots,
            timers: None,
            deferred: Vec::new(),
        };
        let task = tokio::spawn(owner.run(inbox));
        info!("investigation runtime started");

        Ok(InvestigationHandle {
            commands,
            snapshots: snapshot_rx,
            task: Some(task),
        })
    }
}

/// Command sender and snapshot reader for a running investigation
///
/// Dropping the handle stops the owner task and every timer it started.
pub struct InvestigationHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<InvestigationSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl InvestigationHandle {
    fn send(&self, command: Command) -> ApiResult<()> {
        self.commands.send(command).map_err(|_| ApiError::RuntimeStopped)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> ApiResult<T> {
        let (reply, response) = oneshot::channel();
        self.send(make(reply))?;
        response.await.map_err(|_| ApiError::RuntimeStopped)
    }

    /// Select the ghost type, restarting all behaviour timers
    pub fn set_ghost_type(&self, ghost_type: GhostType) -> ApiResult<()> {
        self.send(Command::SetGhostType(ghost_type))
    }

    pub fn apply_sanity_impact(&self, impact: SanityImpact) -> ApiResult<()> {
        self.send(Command::SanityImpact(impact))
    }

    /// Cancel all timers and start over without a ghost type
    pub fn reset(&self) -> ApiResult<()> {
        self.send(Command::Reset)
    }

    /// Take a photo; its quality is known after the development delay
    pub async fn take_photo(&self) -> ApiResult<u32> {
        self.request(|reply| Command::TakePhoto { reply }).await
    }

    pub async fn collect_evidence(&self, anomaly_id: &str) -> ApiResult<bool> {
        let anomaly_id = anomaly_id.to_string();
        self.request(|reply| Command::CollectEvidence { anomaly_id, reply }).await?
    }

    pub async fn begin_deduction(&self) -> ApiResult<()> {
        self.request(|reply| Command::BeginDeduction { reply }).await?
    }

    pub async fn submit_deduction(&self, guess: GhostType) -> ApiResult<InvestigationMode> {
        self.request(|reply| Command::SubmitDeduction { guess, reply }).await?
    }

    pub async fn begin_ritual(&self) -> ApiResult<()> {
        self.request(|reply| Command::BeginRitual { reply }).await?
    }

    pub async fn complete_ritual(&self) -> ApiResult<()> {
        self.request(|reply| Command::CompleteRitual { reply }).await?
    }

    /// Snapshot taken after every command sent before this call
    pub async fn snapshot(&self) -> ApiResult<InvestigationSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Most recently published snapshot, without waiting
    pub fn latest(&self) -> InvestigationSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<InvestigationSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the owner task and wait for it to finish
    pub async fn shutdown(mut self) -> ApiResult<()> {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            task.await.map_err(|_| ApiError::RuntimeStopped)?;
        }
        Ok(())
    }
}

impl Drop for InvestigationHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.commands.send(Command::Shutdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PolarPosition;
    use crate::simulation::PhotoQuality;

    fn seeded() -> BehaviorConfig {
        BehaviorConfig {
            rng_seed: Some(1234),
            ..BehaviorConfig::default()
        }
    }

    async fn advance(ms: u64) {
        time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_without_ghost_type() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        advance(10_000).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.sanity, 100.0);
        assert_eq!(snapshot.ghost_position, PolarPosition::default());
        assert!(snapshot.anomalies.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sanity_drains_once_per_second() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Phantom).unwrap();
        advance(10_500).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert!((snapshot.sanity - 99.0).abs() < 1e-9, "sanity = {}", snapshot.sanity);
        assert_ne!(snapshot.ghost_position, PolarPosition::default());
        assert!(!snapshot.anomalies.is_empty());
        assert!(snapshot.anomalies.len() <= 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ghost_change_restarts_all_timers() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Demon).unwrap();
        advance(2_500).await;
        handle.set_ghost_type(GhostType::Shade).unwrap();
        advance(3_200).await;

        // Demon drained twice (0.3), then Shade three times (0.05)
        let snapshot = handle.snapshot().await.unwrap();
        assert!((snapshot.sanity - 99.25).abs() < 1e-9, "sanity = {}", snapshot.sanity);
        assert_eq!(snapshot.ghost_type, Some(GhostType::Shade));
        assert_eq!(snapshot.timer_generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_every_timer() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Wraith).unwrap();
        advance(5_500).await;
        assert!(handle.snapshot().await.unwrap().sanity < 100.0);

        handle.reset().unwrap();
        advance(20_000).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.sanity, 100.0);
        assert_eq!(snapshot.ghost_type, None);
        assert_eq!(snapshot.ghost_position, PolarPosition::default());
        assert!(snapshot.anomalies.is_empty());
        assert_eq!(snapshot.epoch, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sanity_exhaustion_fails_once() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.apply_sanity_impact(SanityImpact::Custom(99.95)).unwrap();
        handle.set_ghost_type(GhostType::Demon).unwrap();

        advance(1_050).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.sanity, 0.0);
        // The failure transition is deferred
        assert_eq!(snapshot.mode, InvestigationMode::Investigating);

        advance(100).await;
        assert_eq!(handle.snapshot().await.unwrap().mode, InvestigationMode::Failure);

        advance(5_000).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.mode, InvestigationMode::Failure);
        assert_eq!(snapshot.sanity, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_failure() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.apply_sanity_impact(SanityImpact::Custom(150.0)).unwrap();
        handle.reset().unwrap();
        advance(1_000).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.mode, InvestigationMode::Investigating);
        assert_eq!(snapshot.sanity, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_photo_develops_after_delay() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Phantom).unwrap();
        let id = handle.take_photo().await.unwrap();

        advance(6_900).await;
        let snapshot = handle.snapshot().await.unwrap();
        let photo = snapshot.photos.iter().find(|p| p.id == id).unwrap();
        assert_eq!(photo.quality, None);

        advance(200).await;
        let snapshot = handle.snapshot().await.unwrap();
        let photo = snapshot.photos.iter().find(|p| p.id == id).unwrap();
        let quality = photo.quality.expect("photo should be developed");
        let as_evidence = snapshot
            .evidence
            .iter()
            .any(|e| matches!(e, crate::api::types::Evidence::Photo(p) if p.id == id));
        assert_eq!(as_evidence, quality != PhotoQuality::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deduction_through_handle() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Banshee).unwrap();
        assert!(handle.begin_ritual().await.is_err());
        handle.begin_deduction().await.unwrap();
        let mode = handle.submit_deduction(GhostType::Banshee).await.unwrap();
        assert_eq!(mode, InvestigationMode::Success);
        handle.begin_ritual().await.unwrap();
        handle.complete_ritual().await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().mode, InvestigationMode::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_evidence_through_handle() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Phantom).unwrap();
        advance(15_100).await;

        let snapshot = handle.snapshot().await.unwrap();
        let id = snapshot.anomalies.last().map(|a| a.id.clone()).unwrap();
        assert!(handle.collect_evidence(&id).await.unwrap());
        assert!(!handle.collect_evidence(&id).await.unwrap());
        assert!(handle.collect_evidence("nope").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_publishes_latest_state() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        let mut updates = handle.subscribe();
        handle.set_ghost_type(GhostType::Poltergeist).unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().ghost_type, Some(GhostType::Poltergeist));
        assert_eq!(handle.latest().ghost_type, Some(GhostType::Poltergeist));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_rejects_zero_periods() {
        for config in [
            BehaviorConfig { movement_interval_ms: 0, ..seeded() },
            BehaviorConfig { behavior_interval_ms: 0, ..seeded() },
            BehaviorConfig { sanity_interval_ms: 0, ..seeded() },
        ] {
            match InvestigationRuntime::spawn(config) {
                Err(ApiError::ConfigurationError { parameter, value }) => {
                    assert!(parameter.ends_with("_interval_ms"));
                    assert_eq!(value, "0");
                }
                Err(other) => panic!("unexpected error {:?}", other),
                Ok(_) => panic!("zero period was accepted"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_frozen_after_failure() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Poltergeist).unwrap();
        handle.apply_sanity_impact(SanityImpact::Custom(100.0)).unwrap();
        advance(500).await;

        let frozen = handle.snapshot().await.unwrap();
        assert_eq!(frozen.mode, InvestigationMode::Failure);
        advance(20_000).await;
        assert_eq!(handle.snapshot().await.unwrap(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_tears_down_runtime() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        let mut updates = handle.subscribe();
        handle.set_ghost_type(GhostType::Demon).unwrap();
        handle.snapshot().await.unwrap();
        updates.borrow_and_update();
        let commands = handle.commands.clone();

        drop(handle);
        advance(5_000).await;

        assert!(commands.send(Command::Reset).is_err());
        // Sender side is gone and nothing was published after the drop
        assert!(updates.changed().await.is_err());
        assert_eq!(updates.borrow().sanity, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_runtime() {
        let handle = InvestigationRuntime::spawn(seeded()).unwrap();
        handle.set_ghost_type(GhostType::Wraith).unwrap();
        let commands = handle.commands.clone();
        handle.shutdown().await.unwrap();
        assert!(commands.send(Command::Reset).is_err());
    }
}
