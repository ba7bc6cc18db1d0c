//! The sender endpoint: accepts whole frames, fragments and transmits them,
//! retransmits unacknowledged fragments, and reports completion (spec.md §4,
//! §6).

mod ack_thread;
mod data_thread;
mod inflight;
mod retry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use log::{debug, warn};

use crate::bus::{ChannelId, DatagramBus};
use crate::callback::{SenderCallback, SenderStatus};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::{Frame, FrameQueue};
use crate::stats::EfficiencyCounter;
use inflight::Inflight;

/// Frame queue plus its condvar, so `submit` can push a frame and wake the
/// data thread without a separate signalling channel.
struct QueueState {
    queue: Mutex<FrameQueue>,
    available: Condvar,
}

/// Shared state reachable from both the public handle and the two
/// background threads.
struct Shared {
    inflight: Inflight,
    queue_state: QueueState,
    shutdown: AtomicBool,
    stats: EfficiencyCounter,
    next_frame_number: Mutex<u16>,
    /// Frames dropped by a flush pre-emption while only queued (never
    /// in flight). Drained by the data thread, which alone owns the
    /// completion callback.
    cancelled: Mutex<Vec<Frame>>,
}

/// A running sender endpoint.
///
/// Owns its two background threads (data, ack); dropping a `Sender` that has
/// not been `stop()`-ed first blocks until they exit, matching spec.md §9's
/// redesign guidance of an owned value with `Drop` semantics in place of the
/// original's raw-pointer `Delete` call.
pub struct Sender {
    shared: Arc<Shared>,
    config: Config,
    bus: Arc<dyn DatagramBus>,
    data_channel: ChannelId,
    ack_channel: ChannelId,
    data_handle: Option<JoinHandle<()>>,
    ack_handle: Option<JoinHandle<()>>,
}

impl Sender {
    /// Starts a sender endpoint pushing fragments on `data_channel` and
    /// listening for acks on `ack_channel`, both multiplexed through `bus`.
    ///
    /// `callback` is invoked from the data thread exactly once per submitted
    /// frame, with its final disposition.
    pub fn new<B, C>(
        bus: Arc<B>,
        data_channel: ChannelId,
        ack_channel: ChannelId,
        config: Config,
        callback: C,
    ) -> Result<Self>
    where
        B: DatagramBus + 'static,
        C: SenderCallback,
    {
        config.validate()?;

        let shared = Arc::new(Shared {
            inflight: Inflight::new(),
            queue_state: QueueState {
                queue: Mutex::new(FrameQueue::new(config.frames_buffer_size())),
                available: Condvar::new(),
            },
            shutdown: AtomicBool::new(false),
            stats: EfficiencyCounter::new(),
            next_frame_number: Mutex::new(0),
            cancelled: Mutex::new(Vec::new()),
        });

        let data_handle = {
            let shared = Arc::clone(&shared);
            let bus = Arc::clone(&bus);
            std::thread::Builder::new()
                .name("xstream-sender-data".into())
                .spawn(move || data_thread::run(shared, bus, data_channel, config, callback))
                .map_err(|_| Error::AllocFailed)?
        };

        let ack_handle = {
            let shared = Arc::clone(&shared);
            let bus = Arc::clone(&bus);
            std::thread::Builder::new()
                .name("xstream-sender-ack".into())
                .spawn(move || ack_thread::run(shared, bus, ack_channel))
                .map_err(|_| Error::AllocFailed)?
        };

        Ok(Self {
            shared,
            config,
            bus,
            data_channel,
            ack_channel,
            data_handle: Some(data_handle),
            ack_handle: Some(ack_handle),
        })
    }

    /// Submits a whole frame for transmission.
    ///
    /// Returns the queue occupancy *before* this frame was added. Fails
    /// with `FrameTooLarge` if the payload exceeds `Config::max_frame_size`,
    /// or `QueueFull` if the queue is at capacity and `flush` is not set.
    pub fn submit(&self, payload: Vec<u8>, flush: bool) -> Result<usize> {
        if payload.is_empty() {
            return Err(Error::BadParameters);
        }
        if payload.len() > self.config.max_frame_size() {
            return Err(Error::FrameTooLarge);
        }

        let frame_number = {
            let mut next = self.shared.next_frame_number.lock().unwrap();
            let n = *next;
            *next = next.wrapping_add(1);
            n
        };
        let frame = Frame::new(payload, frame_number, flush);

        let mut queue = self.shared.queue_state.queue.lock().unwrap();
        let enqueued = queue.enqueue(frame).inspect_err(|_| {
            warn!("sender submit: queue full, frame {frame_number} rejected");
        })?;
        drop(queue);

        if !enqueued.cancelled.is_empty() {
            debug!(
                "sender submit: flush frame {frame_number} cancels {} queued frame(s)",
                enqueued.cancelled.len()
            );
            self.shared
                .cancelled
                .lock()
                .unwrap()
                .extend(enqueued.cancelled);
        }

        if flush {
            self.shared.inflight.preempt();
        }
        self.shared.queue_state.available.notify_all();

        Ok(enqueued.previous_occupancy)
    }

    /// Current useful/transmitted efficiency ratio.
    pub fn efficiency(&self) -> f32 {
        self.shared.stats.efficiency()
    }

    /// Signals both background threads to exit and waits for them to do so.
    /// Idempotent: calling `stop` more than once is a no-op after the first.
    pub fn stop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.inflight.notify_all();
        self.shared.queue_state.available.notify_all();
        self.bus.cancel(self.data_channel);
        self.bus.cancel(self.ack_channel);

        if let Some(handle) = self.data_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.ack_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        self.stop();
    }
}
