//! The reader's ack thread: periodically emits the current reception
//! bitmap for the frame being reassembled (spec.md §4.6).

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use log::{trace, warn};

use crate::bus::{ChannelId, DatagramBus};
use crate::config::Config;
use crate::packet::{AckPacket, ACK_PACKET_SIZE};

use super::Shared;

pub(super) fn run<B>(shared: Arc<Shared>, bus: Arc<B>, ack_channel: ChannelId, config: Config)
where
    B: DatagramBus,
{
    let interval = Duration::from_millis(config.ack_send_interval_ms());
    let mut buf = [0u8; ACK_PACKET_SIZE];

    while !shared.shutdown.load(Ordering::SeqCst) {
        std::thread::sleep(interval);
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }

        let snapshot = shared.reassembly.snapshot();
        let Some(frame_number) = snapshot.frame_number else {
            continue;
        };

        let ack = AckPacket::new(frame_number, snapshot.rx_bitmap);
        match ack.encode(&mut buf) {
            Ok(len) => {
                if bus.push(ack_channel, &buf[..len]).is_err() {
                    warn!("reader ack thread: transport error pushing ack for frame {frame_number}");
                } else {
                    trace!("reader ack thread: sent ack for frame {frame_number}");
                }
            }
            Err(_) => warn!("reader ack thread: failed to encode ack for frame {frame_number}"),
        }
    }
}
