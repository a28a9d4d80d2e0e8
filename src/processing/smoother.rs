use crate::core::{now_ms, GeoPosition};
use nalgebra::Vector2;
use std::collections::VecDeque;

/// Number of recent fixes retained by the smoother
pub const SMOOTHER_CAPACITY: usize = 3;

/// Weights applied oldest-to-newest within the current window
pub const SMOOTHER_WEIGHTS: [f64; SMOOTHER_CAPACITY] = [0.2, 0.3, 0.5];

/// Weight for any window slot past the end of `SMOOTHER_WEIGHTS`
const FALLBACK_WEIGHT: f64 = 0.33;

/// Weighted moving-average filter for jittery GPS fixes
///
/// Keeps the last three fixes and blends their coordinates, favouring the
/// newest. The reported accuracy is the worst among the blended fixes so the
/// output never claims more precision than its inputs.
#[derive(Debug, Clone, Default)]
pub struct PositionSmoother {
    samples: VecDeque<GeoPosition>,
}

impl PositionSmoother {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(SMOOTHER_CAPACITY + 1),
        }
    }

    /// Add a fix and return the smoothed position stamped with the current time
    pub fn add_sample(&mut self, position: GeoPosition) -> GeoPosition {
        self.add_sample_at(position, now_ms())
    }

    /// Add a fix and return the smoothed position stamped with `now_ms`
    pub fn add_sample_at(&mut self, position: GeoPosition, now_ms: u64) -> GeoPosition {
        self.samples.push_back(position);
        while self.samples.len() > SMOOTHER_CAPACITY {
            self.samples.pop_front();
        }

        if self.samples.len() == 1 {
            return position;
        }

        let mut weighted = Vector2::zeros();
        let mut total_weight = 0.0;
        let mut worst_accuracy = f64::MIN;

        for (index, sample) in self.samples.iter().enumerate() {
            let weight = SMOOTHER_WEIGHTS.get(index).copied().unwrap_or(FALLBACK_WEIGHT);
            weighted += Vector2::new(sample.latitude, sample.longitude) * weight;
            total_weight += weight;
            worst_accuracy = worst_accuracy.max(sample.accuracy);
        }

        let mean = weighted / total_weight;
        GeoPosition::new(mean.x, mean.y, worst_accuracy, now_ms)
    }

    /// Forget all buffered fixes
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lon: f64, accuracy: f64) -> GeoPosition {
        GeoPosition::new(lat, lon, accuracy, 1_000)
    }

    #[test]
    fn test_first_sample_unchanged() {
        let mut smoother = PositionSmoother::new();
        let first = fix(40.0, -74.0, 12.0);
        assert_eq!(smoother.add_sample_at(first, 5_000), first);
    }

    #[test]
    fn test_two_samples_normalize_by_used_weights() {
        let mut smoother = PositionSmoother::new();
        smoother.add_sample_at(fix(10.0, 20.0, 5.0), 0);
        let out = smoother.add_sample_at(fix(20.0, 30.0, 4.0), 0);

        // (0.2 * 10 + 0.3 * 20) / 0.5
        assert!((out.latitude - 16.0).abs() < 1e-9);
        assert!((out.longitude - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_samples_weighted_average() {
        let mut smoother = PositionSmoother::new();
        smoother.add_sample_at(fix(1.0, 10.0, 3.0), 0);
        smoother.add_sample_at(fix(2.0, 20.0, 3.0), 0);
        let out = smoother.add_sample_at(fix(3.0, 30.0, 3.0), 42);

        assert!((out.latitude - 2.3).abs() < 1e-9);
        assert!((out.longitude - 23.0).abs() < 1e-9);
        assert_eq!(out.timestamp, 42);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut smoother = PositionSmoother::new();
        smoother.add_sample_at(fix(100.0, 0.0, 1.0), 0);
        smoother.add_sample_at(fix(1.0, 0.0, 1.0), 0);
        smoother.add_sample_at(fix(2.0, 0.0, 1.0), 0);
        let out = smoother.add_sample_at(fix(3.0, 0.0, 1.0), 0);

        assert_eq!(smoother.len(), SMOOTHER_CAPACITY);
        assert!((out.latitude - 2.3).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_is_worst_in_window() {
        let mut smoother = PositionSmoother::new();
        smoother.add_sample_at(fix(1.0, 1.0, 25.0), 0);
        smoother.add_sample_at(fix(1.0, 1.0, 4.0), 0);
        let out = smoother.add_sample_at(fix(1.0, 1.0, 6.0), 0);
        assert_eq!(out.accuracy, 25.0);

        // 25.0 has now been evicted
        let out = smoother.add_sample_at(fix(1.0, 1.0, 3.0), 0);
        assert_eq!(out.accuracy, 6.0);
    }

    #[test]
    fn test_reset_returns_next_sample_unchanged() {
        let mut smoother = PositionSmoother::new();
        smoother.add_sample_at(fix(1.0, 1.0, 1.0), 0);
        smoother.add_sample_at(fix(2.0, 2.0, 1.0), 0);
        smoother.reset();
        assert!(smoother.is_empty());

        let next = fix(9.0, 9.0, 2.0);
        assert_eq!(smoother.add_sample_at(next, 0), next);
    }
}
