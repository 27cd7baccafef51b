//! Ack-success link quality estimation.

/// Exponentially-weighted estimate of unicast ack success, kept by the Sender.
///
/// Every acknowledged unicast pulls the estimate towards 1, every unacknowledged one towards 0,
/// with a decay constant of 0.99 per sample. Since each update is a convex combination of the
/// previous value and 0 or 1, the estimate can never leave `[0, 1]`.
#[derive(Debug, Copy, Clone)]
pub struct LinkQuality {
    quality: f32,
}

/// Weight of the previous estimate in each update.
const DECAY: f32 = 0.99;

/// Below this estimate the link counts as degraded and a channel hop is requested.
const DEGRADED_THRESHOLD: f32 = 0.75;

impl LinkQuality {
    /// Creates a fresh estimator that assumes a perfect link.
    pub fn new() -> Self {
        LinkQuality { quality: 1.0 }
    }

    /// Folds the ack outcome of one unicast frame into the estimate.
    pub fn record(&mut self, acked: bool) {
        let sample = if acked { 1.0 } else { 0.0 };
        self.quality = DECAY * self.quality + (1.0 - DECAY) * sample;
    }

    /// Returns the current estimate in `[0, 1]`.
    pub fn get(&self) -> f32 {
        self.quality
    }

    /// Returns whether the estimate has fallen below the hop threshold.
    pub fn is_degraded(&self) -> bool {
        self.quality < DEGRADED_THRESHOLD
    }

    /// Restarts the estimate at 1.0.
    ///
    /// Called once a hop request has been handed to the radio, so that a single degradation does
    /// not emit a burst of hop requests while the exchange is still in flight.
    pub fn reset(&mut self) {
        self.quality = 1.0;
    }
}

impl Default for LinkQuality {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_in_unit_interval() {
        let mut q = LinkQuality::new();
        // Alternating and biased outcomes never push the estimate out of [0, 1].
        for i in 0..10_000 {
            q.record(i % 3 == 0);
            assert!(q.get() >= 0.0 && q.get() <= 1.0);
        }
        for _ in 0..10_000 {
            q.record(false);
            assert!(q.get() >= 0.0 && q.get() <= 1.0);
        }
    }

    #[test]
    fn degrades_after_consecutive_failures() {
        let mut q = LinkQuality::new();
        for _ in 0..28 {
            q.record(false);
        }
        // 0.99^28 ≈ 0.7547
        assert!(!q.is_degraded());

        for _ in 0..12 {
            q.record(false);
        }
        // 0.99^40 ≈ 0.6690
        assert!(q.is_degraded());
    }

    #[test]
    fn reset_restores_perfect_estimate() {
        let mut q = LinkQuality::new();
        for _ in 0..100 {
            q.record(false);
        }
        assert!(q.is_degraded());
        q.reset();
        assert!(!q.is_degraded());
        assert_eq!(q.get(), 1.0);
    }
}
