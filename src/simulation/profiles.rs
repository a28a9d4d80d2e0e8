//! Per-ghost-type behaviour tables

use super::anomaly::AnomalyKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GhostType {
    Phantom,
    Poltergeist,
    Wraith,
    Banshee,
    Shade,
    Demon,
}

/// Static behaviour configuration for one ghost type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostBehaviorProfile {
    /// Multiplier applied to every random-walk step
    pub movement_speed: f64,
    /// Ordered anomaly weights; iteration order is significant
    pub anomaly_weights: Vec<(AnomalyKind, f64)>,
    /// Sanity removed on each sanity tick
    pub sanity_drain: f64,
}

impl GhostBehaviorProfile {
    /// Sum of all anomaly weights (not necessarily 1)
    pub fn total_weight(&self) -> f64 {
        self.anomaly_weights.iter().map(|(_, w)| w).sum()
    }
}

impl GhostType {
    pub const ALL: [GhostType; 6] = [
        GhostType::Phantom,
        GhostType::Poltergeist,
        GhostType::Wraith,
        GhostType::Banshee,
        GhostType::Shade,
        GhostType::Demon,
    ];

    pub fn profile(&self) -> GhostBehaviorProfile {
        use AnomalyKind::*;

        let (movement_speed, anomaly_weights, sanity_drain) = match self {
            GhostType::Phantom => (
                1.0,
                vec![(Emf, 0.3), (Cold, 0.2), (Whisper, 0.1), (Motion, 0.1), (Static, 0.1), (Silhouette, 0.2)],
                0.1,
            ),
            GhostType::Poltergeist => (
                1.5,
                vec![(Motion, 0.4), (Static, 0.3), (Emf, 0.2), (Whisper, 0.1)],
                0.15,
            ),
            GhostType::Wraith => (
                2.0,
                vec![(Cold, 0.3), (Silhouette, 0.2), (Whisper, 0.2), (Emf, 0.1)],
                0.2,
            ),
            GhostType::Banshee => (
                0.8,
                vec![(Whisper, 0.5), (Static, 0.2), (Cold, 0.2)],
                0.25,
            ),
            GhostType::Shade => (
                0.5,
                vec![(Cold, 0.2), (Silhouette, 0.1), (Emf, 0.1)],
                0.05,
            ),
            GhostType::Demon => (
                1.2,
                vec![(Emf, 0.3), (Static, 0.3), (Motion, 0.2), (Silhouette, 0.2), (Cold, 0.1)],
                0.3,
            ),
        };

        GhostBehaviorProfile {
            movement_speed,
            anomaly_weights,
            sanity_drain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GhostType::Phantom => "phantom",
            GhostType::Poltergeist => "poltergeist",
            GhostType::Wraith => "wraith",
            GhostType::Banshee => "banshee",
            GhostType::Shade => "shade",
            GhostType::Demon => "demon",
        }
    }
}

impl fmt::Display for GhostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_are_sane() {
        for ghost in GhostType::ALL {
            let profile = ghost.profile();
            assert!(profile.movement_speed > 0.0, "{}", ghost);
            assert!(profile.sanity_drain > 0.0, "{}", ghost);
            assert!(!profile.anomaly_weights.is_empty(), "{}", ghost);
            assert!(profile.anomaly_weights.iter().all(|(_, w)| *w > 0.0));
        }
    }

    #[test]
    fn test_weight_sums_are_not_normalized() {
        assert!(GhostType::Shade.profile().total_weight() < 1.0);
        assert!(GhostType::Demon.profile().total_weight() > 1.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&GhostType::Poltergeist).unwrap();
        assert_eq!(json, "\"poltergeist\"");
        let parsed: GhostType = serde_json::from_str("\"wraith\"").unwrap();
        assert_eq!(parsed, GhostType::Wraith);
    }
}
