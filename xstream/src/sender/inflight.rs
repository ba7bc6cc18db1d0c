//! The sender's in-flight state: the one frame currently being transmitted,
//! and its per-fragment ack bitmap (spec.md §3, §4.3).
//!
//! The mutex is paired with exactly the data the ack thread and the data
//! thread both touch, per spec.md §9's "pair the mutex with the data it
//! guards, not with the whole endpoint" redesign guidance.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Snapshot of the in-flight frame's ack state, returned by value so callers
/// never hold the lock across their own logic.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    /// `None` when no frame is currently in flight.
    pub frame_number: Option<u16>,
    pub fragments_in_frame: u8,
    pub ack_bitmap: u64,
    pub preempted: bool,
    /// A pre-emption that arrived while no frame was in flight, latched here
    /// so it isn't lost to the race between `submit()`'s enqueue-then-preempt
    /// and the data thread's pop-then-begin (both of which briefly let go of
    /// the queue lock). Consumed by the next `begin()`.
    preempt_pending: bool,
}

impl Snapshot {
    fn idle() -> Self {
        Self {
            frame_number: None,
            fragments_in_frame: 0,
            ack_bitmap: 0,
            preempted: false,
            preempt_pending: false,
        }
    }

    /// Bit mask covering exactly `fragments_in_frame` fragments.
    fn full_mask(&self) -> u64 {
        full_mask(self.fragments_in_frame)
    }

    /// True once every fragment has been acknowledged.
    pub fn is_complete(&self) -> bool {
        self.fragments_in_frame > 0 && self.ack_bitmap & self.full_mask() == self.full_mask()
    }
}

fn full_mask(fragments_in_frame: u8) -> u64 {
    if fragments_in_frame >= 64 {
        u64::MAX
    } else {
        (1u64 << fragments_in_frame) - 1
    }
}

/// Shared in-flight state, guarded by a mutex and signalled through a
/// condvar whenever the ack thread, the submit path, or shutdown changes it.
pub struct Inflight {
    state: Mutex<Snapshot>,
    changed: Condvar,
}

impl Inflight {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Snapshot::idle()),
            changed: Condvar::new(),
        }
    }

    /// Begins tracking a newly-started frame, clearing any prior ack state.
    pub fn begin(&self, frame_number: u16, fragments_in_frame: u8) {
        let mut guard = self.state.lock().unwrap();
        let carried = guard.preempt_pending;
        *guard = Snapshot {
            frame_number: Some(frame_number),
            fragments_in_frame,
            ack_bitmap: 0,
            preempted: carried,
            preempt_pending: false,
        };
        self.changed.notify_all();
    }

    /// Clears the in-flight frame (completion, cancellation, or shutdown).
    pub fn end(&self) {
        let mut guard = self.state.lock().unwrap();
        *guard = Snapshot::idle();
        self.changed.notify_all();
    }

    /// Merges a received ack bitmap into the in-flight frame's state.
    ///
    /// Drops the ack (returns `false`, no state change) if `frame_number`
    /// does not match the frame currently in flight — spec.md §4.4 step 2.
    pub fn apply_ack(&self, frame_number: u16, bitmap: u64) -> bool {
        let mut guard = self.state.lock().unwrap();
        if guard.frame_number != Some(frame_number) {
            return false;
        }
        let masked = bitmap & guard.full_mask();
        let merged = guard.ack_bitmap | masked;
        if merged == guard.ack_bitmap {
            return false;
        }
        guard.ack_bitmap = merged;
        self.changed.notify_all();
        true
    }

    /// Marks the in-flight frame pre-empted by a flush, waking the data
    /// thread out of its retry wait immediately. If no frame is in flight
    /// right now, the pre-emption is latched and applied to whichever frame
    /// `begin()` starts next, rather than silently dropped.
    pub fn preempt(&self) {
        let mut guard = self.state.lock().unwrap();
        if guard.frame_number.is_some() {
            guard.preempted = true;
        } else {
            guard.preempt_pending = true;
        }
        self.changed.notify_all();
    }

    pub fn snapshot(&self) -> Snapshot {
        *self.state.lock().unwrap()
    }

    /// Waits up to `timeout` for the in-flight state to change (ack applied,
    /// pre-emption signalled), returning the state afterward regardless of
    /// whether it actually changed (a timeout is a legitimate wakeup: it
    /// means "retransmit now").
    pub fn wait_timeout(&self, timeout: Duration) -> Snapshot {
        let guard = self.state.lock().unwrap();
        let (guard, _) = self.changed.wait_timeout(guard, timeout).unwrap();
        *guard
    }

    /// Wakes every waiter unconditionally (used by `stop()`).
    pub fn notify_all(&self) {
        self.changed.notify_all();
    }
}

impl Default for Inflight {
    fn default() -> Self {
        Self::new()
    }
}
