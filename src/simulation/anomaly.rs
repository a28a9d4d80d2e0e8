//! Anomaly events emitted by the behaviour task

use super::profiles::GhostBehaviorProfile;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Default number of anomalies kept in the event log
pub const ANOMALY_LOG_CAPACITY: usize = 20;

/// Lower bound of a randomly drawn anomaly intensity
pub const MIN_INTENSITY: f64 = 0.5;

/// Upper bound of a randomly drawn anomaly intensity
pub const MAX_INTENSITY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Emf,
    Cold,
    Whisper,
    Motion,
    Static,
    Silhouette,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::Emf => "emf",
            AnomalyKind::Cold => "cold",
            AnomalyKind::Whisper => "whisper",
            AnomalyKind::Motion => "motion",
            AnomalyKind::Static => "static",
            AnomalyKind::Silhouette => "silhouette",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single simulated paranormal event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// `<kind>-<timestamp>`
    pub id: String,
    pub kind: AnomalyKind,
    /// Creation time (milliseconds since epoch)
    pub timestamp: u64,
    /// Strength in [0.5, 1.0]
    pub intensity: f64,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, timestamp: u64, intensity: f64) -> Self {
        Self {
            id: format!("{}-{}", kind, timestamp),
            kind,
            timestamp,
            intensity,
        }
    }
}

/// Pick an anomaly kind by walking `weights` in order against a single roll
///
/// The first entry whose running sum exceeds `roll` wins. Weights are not
/// renormalized: if they sum below 1 some rolls select nothing, if they sum
/// above 1 trailing entries may be unreachable.
pub fn select_anomaly(weights: &[(AnomalyKind, f64)], roll: f64) -> Option<AnomalyKind> {
    let mut cumulative = 0.0;
    for &(kind, weight) in weights {
        cumulative += weight;
        if roll < cumulative {
            return Some(kind);
        }
    }
    None
}

/// Roll once against a profile's weights, drawing an intensity on a hit
pub fn emit_anomaly<R: Rng + ?Sized>(
    profile: &GhostBehaviorProfile,
    rng: &mut R,
    now_ms: u64,
) -> Option<Anomaly> {
    let roll = rng.gen::<f64>();
    let kind = select_anomaly(&profile.anomaly_weights, roll)?;
    let intensity = rng.gen_range(MIN_INTENSITY..=MAX_INTENSITY);
    Some(Anomaly::new(kind, now_ms, intensity))
}

/// Bounded log of the most recent anomalies, oldest dropped on overflow
#[derive(Debug, Clone)]
pub struct AnomalyLog {
    capacity: usize,
    events: VecDeque<Anomaly>,
}

impl AnomalyLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, anomaly: Anomaly) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(anomaly);
    }

    pub fn find(&self, id: &str) -> Option<&Anomaly> {
        self.events.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anomaly> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&Anomaly> {
        self.events.back()
    }

    pub fn to_vec(&self) -> Vec<Anomaly> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for AnomalyLog {
    fn default() -> Self {
        Self::new(ANOMALY_LOG_CAPACITY)
    }
}
