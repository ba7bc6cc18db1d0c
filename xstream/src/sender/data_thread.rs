//! The sender's data thread: fragments the in-flight frame, (re)transmits
//! unacknowledged fragments, and reports completion (spec.md §4.3).

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::bus::{ChannelId, DatagramBus};
use crate::callback::{SenderCallback, SenderStatus};
use crate::config::Config;
use crate::frame::Frame;
use crate::packet::DataHeader;

use super::retry::RetryPolicy;
use super::Shared;

/// How long to wait on the frame queue's condvar when idle, so shutdown is
/// noticed promptly even with no frames flowing.
const IDLE_POLL: Duration = Duration::from_millis(100);

pub(super) fn run<B, C>(
    shared: Arc<Shared>,
    bus: Arc<B>,
    data_channel: ChannelId,
    config: Config,
    mut callback: C,
) where
    B: DatagramBus,
    C: SenderCallback,
{
    let mut scratch = vec![0u8; crate::packet::header::HEADER_SIZE + config.max_fragment_size()];
    let mut retry = RetryPolicy::new(
        config.retry_interval_floor_ms(),
        config.retry_interval_ceiling_ms(),
    );
    let mut current: Option<Frame> = None;
    let mut frame_start: Option<Instant> = None;

    loop {
        deliver_cancelled(&shared, &mut callback);

        if shared.shutdown.load(std::sync::atomic::Ordering::SeqCst) {
            if let Some(frame) = current.take() {
                shared.inflight.end();
                debug!("sender data thread: shutdown cancels frame {}", frame.number);
                callback.on_frame_done(SenderStatus::Cancelled, frame.payload);
            }
            break;
        }

        if current.is_none() {
            let mut queue = shared.queue_state.queue.lock().unwrap();
            match queue.pop_front() {
                Some(frame) => {
                    drop(queue);
                    let n = frame.fragment_count(config.max_fragment_size());
                    shared.inflight.begin(frame.number, n);
                    trace!(
                        "sender data thread: starting frame {} ({} fragments, flush={})",
                        frame.number, n, frame.flush
                    );
                    frame_start = Some(Instant::now());
                    current = Some(frame);
                }
                None => {
                    let _guard = shared
                        .queue_state
                        .available
                        .wait_timeout(queue, IDLE_POLL)
                        .unwrap();
                    continue;
                }
            }
        }

        let frame = current.as_ref().unwrap();
        let n = frame.fragment_count(config.max_fragment_size());
        let snapshot = shared.inflight.snapshot();

        if snapshot.preempted {
            let frame = current.take().unwrap();
            shared.inflight.end();
            debug!(
                "sender data thread: frame {} pre-empted by a newer flush frame",
                frame.number
            );
            callback.on_frame_done(SenderStatus::Cancelled, frame.payload);
            continue;
        }

        if snapshot.is_complete() {
            let frame = current.take().unwrap();
            shared.inflight.end();
            shared.stats.record_useful(n as u64);
            if let Some(start) = frame_start.take() {
                retry.on_full_frame_ack(start.elapsed());
            }
            trace!("sender data thread: frame {} fully acked", frame.number);
            callback.on_frame_done(SenderStatus::Sent, frame.payload);
            continue;
        }

        let mut sent = 0u64;
        for index in 0..n {
            if snapshot.ack_bitmap & (1u64 << index) != 0 {
                continue;
            }
            let payload = frame.fragment(index, config.max_fragment_size()).unwrap();
            let header = DataHeader::new(frame.number, frame.flush, index, n);
            match header.encode_packet(payload, &mut scratch) {
                Ok(len) => match bus.push(data_channel, &scratch[..len]) {
                    Ok(()) => sent += 1,
                    Err(_) => warn!(
                        "sender data thread: transport error pushing frame {} fragment {index}",
                        frame.number
                    ),
                },
                Err(_) => warn!(
                    "sender data thread: failed to encode frame {} fragment {index}",
                    frame.number
                ),
            }
        }
        if sent > 0 {
            trace!(
                "sender data thread: transmitted {sent}/{n} fragments of frame {}",
                frame.number
            );
        }
        shared.stats.record_transmitted(sent);

        let after_send = shared.inflight.snapshot();
        if after_send.is_complete() {
            // Looping back hits the top-of-loop completion check, which
            // records the useful count and invokes the callback.
            continue;
        }

        shared.inflight.wait_timeout(retry.current());
    }
}

fn deliver_cancelled<C: SenderCallback>(shared: &Shared, callback: &mut C) {
    let cancelled: Vec<Frame> = {
        let mut guard = shared.cancelled.lock().unwrap();
        std::mem::take(&mut *guard)
    };
    for frame in cancelled {
        callback.on_frame_done(SenderStatus::Cancelled, frame.payload);
    }
}
