//! Efficiency counters surfaced to the host (spec.md §4.3, and the
//! reader-side counterpart supplemented from original_source's
//! `ARSTREAMING_Reader_GetEstimatedEfficiency`).

use std::sync::atomic::{AtomicU64, Ordering};

/// Ratio of useful transmissions (or receptions) to total, updated from a
/// single thread (the data thread of the owning endpoint) and read from
/// any thread.
///
/// Sender: `transmitted` counts every fragment datagram pushed to the bus
/// (first send and retransmissions); `useful` counts fragments that ended
/// up part of the bitmap acknowledged as complete. Reader: `transmitted`
/// counts every fragment received (including ones belonging to frames
/// later abandoned or skipped); `useful` counts fragments that were part
/// of a frame eventually delivered `Complete`.
#[derive(Debug, Default)]
pub struct EfficiencyCounter {
    transmitted: AtomicU64,
    useful: AtomicU64,
}

impl EfficiencyCounter {
    pub const fn new() -> Self {
        Self {
            transmitted: AtomicU64::new(0),
            useful: AtomicU64::new(0),
        }
    }

    pub fn record_transmitted(&self, count: u64) {
        self.transmitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_useful(&self, count: u64) {
        self.useful.fetch_add(count, Ordering::Relaxed);
    }

    /// `useful / transmitted`, or `1.0` when nothing has been transmitted
    /// yet (matches the "no retransmission" baseline from spec.md §4.3).
    pub fn efficiency(&self) -> f32 {
        let transmitted = self.transmitted.load(Ordering::Relaxed);
        if transmitted == 0 {
            return 1.0;
        }
        let useful = self.useful.load(Ordering::Relaxed);
        useful as f32 / transmitted as f32
    }

    pub fn reset(&self) {
        self.transmitted.store(0, Ordering::Relaxed);
        self.useful.store(0, Ordering::Relaxed);
    }
}
