//! The sender's ack thread: receives ack datagrams and folds their bitmap
//! into the in-flight state (spec.md §4.4).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{trace, warn};

use crate::bus::{ChannelId, DatagramBus};
use crate::packet::AckPacket;

use super::Shared;

pub(super) fn run<B>(shared: Arc<Shared>, bus: Arc<B>, ack_channel: ChannelId)
where
    B: DatagramBus,
{
    let mut buf = vec![0u8; crate::packet::ack::ACK_PACKET_SIZE];

    while !shared.shutdown.load(Ordering::SeqCst) {
        let len = match bus.pull(ack_channel, &mut buf) {
            Ok(len) => len,
            Err(_) => {
                if shared.shutdown.load(Ordering::SeqCst) {
                    break;
                }
                continue;
            }
        };

        let ack = match AckPacket::decode(&buf[..len]) {
            Ok(ack) => ack,
            Err(_) => {
                warn!("sender ack thread: dropping malformed ack packet");
                continue;
            }
        };

        if shared
            .inflight
            .apply_ack(ack.frame_number, ack.high_packets_ack)
        {
            trace!(
                "sender ack thread: merged ack for frame {}",
                ack.frame_number
            );
        }
    }
}
