//! The reader's data thread: receives fragments, reassembles them into
//! whole frames, detects frame boundaries and gaps, and delivers complete
//! frames to the application (spec.md §4.5).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::bus::{ChannelId, DatagramBus};
use crate::callback::{ReaderCallback, ReaderCause, ReaderEvent};
use crate::config::Config;
use crate::packet::DataHeader;
use crate::seq::forward_distance;

use super::reassembly::FragmentOutcome;
use super::Shared;

pub(super) fn run<B, C>(
    shared: Arc<Shared>,
    bus: Arc<B>,
    data_channel: ChannelId,
    config: Config,
    initial_buffer: Vec<u8>,
    mut callback: C,
) where
    B: DatagramBus,
    C: ReaderCallback,
{
    let mut recv_buf = vec![0u8; crate::packet::header::HEADER_SIZE + config.max_fragment_size()];
    let mut buffer = initial_buffer;

    // Tracks, for the frame currently being reassembled, the highest
    // `offset + len` observed so far: since every fragment but the last is
    // exactly `max_fragment_size` bytes, this converges to the true frame
    // size once the last fragment (whichever index that turns out to be)
    // has been stored (spec.md §4.5 step 7).
    let mut frame_used_size: usize = 0;
    // Exact total size of the current frame, known only once the
    // last-indexed fragment (whose index is always `fragments_in_frame - 1`)
    // has been observed, since it's the only fragment allowed to be shorter
    // than `max_fragment_size`. Out-of-order arrival means this can be
    // learned before the frame is otherwise complete.
    let mut exact_frame_size: Option<usize> = None;
    let mut frame_is_flush = false;

    // The frame number immediately after the last one this reader fully
    // accounted for (delivered complete, or folded into a skip count).
    // `None` until the first frame boundary is crossed.
    let mut next_expected: Option<u16> = None;
    let mut skipped_since_previous: u16 = 0;

    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }

        let len = match bus.pull(data_channel, &mut recv_buf) {
            Ok(len) => len,
            Err(_) => {
                if shared.shutdown.load(Ordering::SeqCst) {
                    break;
                }
                continue;
            }
        };

        let (header, payload) = match DataHeader::decode(&recv_buf[..len]) {
            Ok(parsed) => parsed,
            Err(_) => {
                shared.corrupt_packets.fetch_add(1, Ordering::Relaxed);
                warn!("reader data thread: dropping malformed data packet");
                continue;
            }
        };

        shared.stats.record_transmitted(1);

        match shared.reassembly.classify(header.frame_number) {
            FragmentOutcome::Stale => {
                trace!(
                    "reader data thread: dropping stale fragment for frame {}",
                    header.frame_number
                );
                continue;
            }
            FragmentOutcome::SameFrame => {}
            FragmentOutcome::NewFrame { previous } => {
                if let Some(previous) = previous {
                    debug!(
                        "reader data thread: frame {previous} abandoned incomplete, frame {} arriving",
                        header.frame_number
                    );
                }
                if let Some(expected) = next_expected {
                    skipped_since_previous =
                        skipped_since_previous.wrapping_add(forward_distance(
                            expected,
                            header.frame_number,
                        ));
                }
                // This frame is now either going to be delivered complete or
                // folded into the next skip count itself; either way it's
                // accounted for, so the next gap measurement must start from
                // here, not from the last frame actually delivered.
                next_expected = Some(header.frame_number);
                shared
                    .reassembly
                    .begin(header.frame_number, header.fragments_in_frame);
                frame_used_size = 0;
                exact_frame_size = None;
                frame_is_flush = header.flush;
            }
        }

        let offset = header.fragment_number as usize * config.max_fragment_size();
        let needed = offset + payload.len();

        if header.fragment_number as usize + 1 == header.fragments_in_frame as usize {
            exact_frame_size = Some(needed);
        }

        if needed > buffer.len() {
            let old_capacity = buffer.len();
            let required_size = exact_frame_size.unwrap_or(needed).max(needed);
            let new_buffer = callback.on_event(ReaderEvent {
                cause: ReaderCause::TooSmall,
                data: &[],
                is_flush: frame_is_flush,
                skipped_frames: 0,
                required_size,
            });

            if new_buffer.len() < needed {
                warn!(
                    "reader data thread: buffer growth insufficient for frame {} ({} < {needed}), abandoning",
                    header.frame_number,
                    new_buffer.len()
                );
                buffer = new_buffer;
                shared.reassembly.clear();
                continue;
            }

            new_buffer[..old_capacity.min(buffer.len())]
                .copy_from_slice(&buffer[..old_capacity.min(buffer.len())]);
            let old_buffer = std::mem::replace(&mut buffer, new_buffer);

            let _ = callback.on_event(ReaderEvent {
                cause: ReaderCause::CopyComplete,
                data: &[],
                is_flush: frame_is_flush,
                skipped_frames: 0,
                required_size: 0,
            });
            drop(old_buffer);
        }

        buffer[offset..offset + payload.len()].copy_from_slice(payload);
        frame_used_size = frame_used_size.max(needed);

        let complete = shared.reassembly.mark_received(header.fragment_number);
        if !complete {
            continue;
        }
        shared
            .stats
            .record_useful(header.fragments_in_frame as u64);

        trace!(
            "reader data thread: frame {} complete ({frame_used_size} bytes)",
            header.frame_number
        );

        let reported_skips = skipped_since_previous;
        skipped_since_previous = 0;
        next_expected = Some(header.frame_number.wrapping_add(1));

        let new_buffer = callback.on_event(ReaderEvent {
            cause: ReaderCause::Complete,
            data: &buffer[..frame_used_size],
            is_flush: frame_is_flush,
            skipped_frames: reported_skips,
            required_size: 0,
        });
        shared.reassembly.clear();
        buffer = new_buffer;
    }

    shared.reassembly.clear();
    let _ = callback.on_event(ReaderEvent {
        cause: ReaderCause::Cancel,
        data: &[],
        is_flush: false,
        skipped_frames: 0,
        required_size: 0,
    });
}
