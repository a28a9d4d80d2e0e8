//! Bounded sanity resource

use serde::{Deserialize, Serialize};

pub const MAX_SANITY: f64 = 100.0;
pub const MIN_SANITY: f64 = 0.0;

/// Discrete events that cost the player sanity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanityImpact {
    Whisper,
    Static,
    Manifestation,
    Proximity,
    Ambient,
    /// Explicit magnitude
    Custom(f64),
}

impl SanityImpact {
    pub fn magnitude(&self) -> f64 {
        match self {
            SanityImpact::Whisper => 5.0,
            SanityImpact::Static => 3.0,
            SanityImpact::Manifestation => 15.0,
            SanityImpact::Proximity => 2.0,
            SanityImpact::Ambient => 1.0,
            SanityImpact::Custom(amount) => *amount,
        }
    }
}

/// Result of a sanity mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityOutcome {
    Unchanged,
    Changed,
    /// Sanity just reached zero from a positive value
    Depleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sanity(f64);

impl Sanity {
    pub fn new(value: f64) -> Self {
        Sanity(clamp_sanity(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_depleted(&self) -> bool {
        self.0 <= MIN_SANITY
    }

    /// Remove `amount` sanity; negative amounts restore it
    pub fn drain(&mut self, amount: f64) -> SanityOutcome {
        self.set(self.0 - amount)
    }

    pub fn apply_impact(&mut self, impact: SanityImpact) -> SanityOutcome {
        self.drain(impact.magnitude())
    }

    fn set(&mut self, value: f64) -> SanityOutcome {
        let previous = self.0;
        let next = clamp_sanity(value);
        self.0 = next;

        if previous > MIN_SANITY && next <= MIN_SANITY {
            SanityOutcome::Depleted
        } else if next != previous {
            SanityOutcome::Changed
        } else {
            SanityOutcome::Unchanged
        }
    }
}

impl Default for Sanity {
    fn default() -> Self {
        Sanity(MAX_SANITY)
    }
}

fn clamp_sanity(value: f64) -> f64 {
    if value.is_nan() {
        // NaN would poison every later comparison
        return MIN_SANITY;
    }
    value.clamp(MIN_SANITY, MAX_SANITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drain_reports_depletion_once() {
        let mut sanity = Sanity::new(1.0);
        assert_eq!(sanity.drain(0.5), SanityOutcome::Changed);
        assert_eq!(sanity.drain(0.7), SanityOutcome::Depleted);
        assert_eq!(sanity.value(), 0.0);
        assert_eq!(sanity.drain(0.5), SanityOutcome::Unchanged);
        assert_eq!(sanity.drain(10.0), SanityOutcome::Unchanged);
    }

    #[test]
    fn test_impacts_use_default_magnitudes() {
        let mut sanity = Sanity::default();
        sanity.apply_impact(SanityImpact::Whisper);
        sanity.apply_impact(SanityImpact::Manifestation);
        sanity.apply_impact(SanityImpact::Ambient);
        assert!((sanity.value() - 79.0).abs() < 1e-9);
    }

    #[test]
    fn test_restore_is_capped() {
        let mut sanity = Sanity::new(95.0);
        sanity.drain(-20.0);
        assert_eq!(sanity.value(), MAX_SANITY);
    }

    #[test]
    fn test_depletion_can_recur_after_restore() {
        let mut sanity = Sanity::new(2.0);
        assert_eq!(sanity.apply_impact(SanityImpact::Static), SanityOutcome::Depleted);
        sanity.apply_impact(SanityImpact::Custom(-10.0));
        assert_eq!(sanity.value(), 10.0);
        assert_eq!(sanity.apply_impact(SanityImpact::Manifestation), SanityOutcome::Depleted);
    }

    proptest! {
        #[test]
        fn prop_sanity_always_clamped(amounts in proptest::collection::vec(-50.0f64..50.0, 1..200)) {
            let mut sanity = Sanity::default();
            let mut was_zero = false;
            for amount in amounts {
                if sanity.drain(amount) == SanityOutcome::Depleted {
                    prop_assert!(!was_zero);
                }
                was_zero = sanity.is_depleted();
                prop_assert!(sanity.value() >= MIN_SANITY && sanity.value() <= MAX_SANITY);
            }
        }
    }
}
