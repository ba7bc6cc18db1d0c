//! Retry-interval policy (spec.md §4.3).
//!
//! `RetryIntervalMs` starts at a configured floor. Each full-frame ack
//! updates an exponentially weighted moving average of the observed
//! frame round-trip time, and the retry interval is re-derived as
//! `max(floor, ewma_rtt / 2)`, capped at a configured ceiling so a silent
//! receiver never stalls the data thread for unbounded waits.

use std::time::Duration;

/// Smoothing factor for the RTT EWMA, matching the classic TCP SRTT
/// estimator (Jacobson '88): new values are weighted at 1/8.
const EWMA_ALPHA: f64 = 0.125;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    floor_ms: u64,
    ceiling_ms: u64,
    ewma_rtt_ms: Option<f64>,
    current_ms: u64,
}

impl RetryPolicy {
    pub fn new(floor_ms: u64, ceiling_ms: u64) -> Self {
        Self {
            floor_ms,
            ceiling_ms,
            ewma_rtt_ms: None,
            current_ms: floor_ms,
        }
    }

    /// Folds one observed frame-RTT sample into the EWMA and re-derives
    /// the current retry interval.
    pub fn on_full_frame_ack(&mut self, observed_rtt: Duration) {
        let sample_ms = observed_rtt.as_secs_f64() * 1000.0;
        let ewma = match self.ewma_rtt_ms {
            None => sample_ms,
            Some(prev) => (1.0 - EWMA_ALPHA) * prev + EWMA_ALPHA * sample_ms,
        };
        self.ewma_rtt_ms = Some(ewma);

        let derived_ms = (ewma / 2.0).round() as u64;
        self.current_ms = derived_ms.clamp(self.floor_ms, self.ceiling_ms);
    }

    /// The interval the data thread should wait for before retransmitting
    /// unacknowledged fragments.
    pub fn current(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_floor() {
        let policy = RetryPolicy::new(5, 200);
        assert_eq!(policy.current(), Duration::from_millis(5));
    }

    #[test]
    fn never_goes_below_floor() {
        let mut policy = RetryPolicy::new(5, 200);
        policy.on_full_frame_ack(Duration::from_millis(1));
        assert!(policy.current() >= Duration::from_millis(5));
    }

    #[test]
    fn never_exceeds_ceiling() {
        let mut policy = RetryPolicy::new(5, 50);
        policy.on_full_frame_ack(Duration::from_millis(1000));
        assert_eq!(policy.current(), Duration::from_millis(50));
    }

    #[test]
    fn tracks_steady_rtt() {
        let mut policy = RetryPolicy::new(1, 1000);
        for _ in 0..50 {
            policy.on_full_frame_ack(Duration::from_millis(40));
        }
        // Converges toward rtt/2 == 20ms.
        let ms = policy.current().as_millis();
        assert!((18..=22).contains(&ms), "unexpected convergence: {ms}ms");
    }
}
