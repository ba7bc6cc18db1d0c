//! Ack-packet codec: frame number plus the reception bitmap.

use crate::error::{Error, Result};

/// Ack-packet wire size in bytes (`2 + 8 + 8`).
pub const ACK_PACKET_SIZE: usize = 18;

/// Selective-ack report for one frame.
///
/// `low_packets_ack` is reserved for profiles with more than 64 fragments
/// per frame; in this profile (`MaxFragmentsPerFrame <= 64`) senders must
/// ignore it and readers must transmit zero (spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckPacket {
    /// The frame this ack refers to.
    pub frame_number: u16,

    /// Bit `i` set ⇔ fragment `i` received.
    pub high_packets_ack: u64,

    /// Reserved; always zero in this profile.
    pub low_packets_ack: u64,
}

impl AckPacket {
    /// Builds an ack packet for the ≤64-fragment profile (`low` reserved).
    pub const fn new(frame_number: u16, high_packets_ack: u64) -> Self {
        Self {
            frame_number,
            high_packets_ack,
            low_packets_ack: 0,
        }
    }

    /// Encodes the ack packet into `out[..ACK_PACKET_SIZE]`.
    pub fn encode(&self, out: &mut [u8]) -> Result<usize> {
        if out.len() < ACK_PACKET_SIZE {
            return Err(Error::BadParameters);
        }
        out[0..2].copy_from_slice(&self.frame_number.to_be_bytes());
        out[2..10].copy_from_slice(&self.high_packets_ack.to_be_bytes());
        out[10..18].copy_from_slice(&self.low_packets_ack.to_be_bytes());
        Ok(ACK_PACKET_SIZE)
    }

    /// Decodes an ack packet. Fails with `MalformedPacket` if `bytes` is
    /// shorter than `ACK_PACKET_SIZE`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ACK_PACKET_SIZE {
            return Err(Error::MalformedPacket);
        }
        let frame_number = u16::from_be_bytes([bytes[0], bytes[1]]);
        let high_packets_ack = u64::from_be_bytes(bytes[2..10].try_into().unwrap());
        let low_packets_ack = u64::from_be_bytes(bytes[10..18].try_into().unwrap());
        Ok(Self {
            frame_number,
            high_packets_ack,
            low_packets_ack,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let ack = AckPacket::new(42, 0b1011);
        let mut buf = [0u8; ACK_PACKET_SIZE];
        ack.encode(&mut buf).unwrap();
        assert_eq!(AckPacket::decode(&buf).unwrap(), ack);
    }

    #[test]
    fn short_buffer_is_malformed() {
        let buf = [0u8; ACK_PACKET_SIZE - 1];
        assert_eq!(AckPacket::decode(&buf), Err(Error::MalformedPacket));
    }

    proptest::proptest! {
        #[test]
        fn or_merge_is_idempotent_and_commutative(a: u64, b: u64) {
            let merged_ab = a | b;
            let merged_ba = b | a;
            prop_assert_eq!(merged_ab, merged_ba);
            prop_assert_eq!(merged_ab | a, merged_ab);
            prop_assert_eq!(merged_ab | b, merged_ab);
        }
    }
}
