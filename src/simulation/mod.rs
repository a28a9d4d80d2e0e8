//! Ghost behaviour model: movement, anomalies, sanity and photos
//!
//! Everything here is a pure step function over explicit state and an
//! injected random source. Timing and ownership live in `api`.

pub mod profiles;
pub mod anomaly;
pub mod movement;
pub mod sanity;
pub mod photo;

pub use profiles::{GhostBehaviorProfile, GhostType};
pub use anomaly::{emit_anomaly, select_anomaly, Anomaly, AnomalyKind, AnomalyLog};
pub use movement::step_polar;
pub use sanity::{Sanity, SanityImpact, SanityOutcome};
pub use photo::{roll_photo_quality, PhotoQuality, PhotoRecord};
