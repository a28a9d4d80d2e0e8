/// Leading-edge rate limiter
///
/// The first call in a window passes and starts a cooldown of `interval_ms`;
/// calls arriving during the cooldown are dropped, not queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: u64,
    last_fired_ms: Option<u64>,
    dropped: u64,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_ms: None,
            dropped: 0,
        }
    }

    /// Returns true if a call at `now_ms` may proceed
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        match self.last_fired_ms {
            Some(last) if now_ms.saturating_sub(last) < self.interval_ms => {
                self.dropped += 1;
                false
            }
            _ => {
                self.last_fired_ms = Some(now_ms);
                true
            }
        }
    }

    /// Clear the cooldown so the next call passes
    pub fn reset(&mut self) {
        self.last_fired_ms = None;
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Calls dropped since construction
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_edge_passes_immediately() {
        let mut throttle = Throttle::new(1000);
        assert!(throttle.try_acquire(5_000));
    }

    #[test]
    fn test_calls_inside_cooldown_are_dropped() {
        let mut throttle = Throttle::new(1000);
        assert!(throttle.try_acquire(0));
        assert!(!throttle.try_acquire(1));
        assert!(!throttle.try_acquire(999));
        assert!(throttle.try_acquire(1000));
        assert!(!throttle.try_acquire(1500));
        assert!(throttle.try_acquire(2000));
        assert_eq!(throttle.dropped(), 3);
    }

    #[test]
    fn test_dropped_calls_do_not_extend_cooldown() {
        let mut throttle = Throttle::new(200);
        assert!(throttle.try_acquire(0));
        assert!(!throttle.try_acquire(150));
        assert!(throttle.try_acquire(200));
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut throttle = Throttle::new(200);
        assert!(throttle.try_acquire(100));
        throttle.reset();
        assert!(throttle.try_acquire(101));
    }
}
