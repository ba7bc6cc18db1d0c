//! Data-packet header: frame number, flush flag, fragment index/count.
//!
//! ```text
//! 0               1               2               3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |         frameNumber          |  frameFlags   | fragmentNumber|
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |fragmentsInFrame|                  payload...
//! +-+-+-+-+-+-+-+-+
//! ```

use crate::error::{Error, Result};

/// Bit 0 of `frameFlags`: this frame pre-empts older queued/in-flight frames.
pub const FLUSH_BIT: u8 = 1 << 0;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 5;

/// Fixed-layout header carried by every data-channel datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// Monotonically increasing frame identifier, wraps at `u16::MAX`.
    pub frame_number: u16,

    /// Set when this frame pre-empts older queued frames (typically an
    /// I-frame). Reserved flag bits are always zero on write.
    pub flush: bool,

    /// Index of this fragment within the frame, `0..fragments_in_frame`.
    pub fragment_number: u8,

    /// Total fragment count `N` for this frame, `1..=64` in this profile.
    pub fragments_in_frame: u8,
}

impl DataHeader {
    /// Builds a header, panicking-free: callers construct fields directly
    /// since all combinations are validated at `decode` time, not here.
    pub const fn new(
        frame_number: u16,
        flush: bool,
        fragment_number: u8,
        fragments_in_frame: u8,
    ) -> Self {
        Self {
            frame_number,
            flush,
            fragment_number,
            fragments_in_frame,
        }
    }

    /// Encodes the header into `out[..HEADER_SIZE]`, returning the number of
    /// bytes written. `out` must be at least `HEADER_SIZE` bytes long.
    pub fn encode(&self, out: &mut [u8]) -> Result<usize> {
        if out.len() < HEADER_SIZE {
            return Err(Error::BadParameters);
        }
        let fbytes = self.frame_number.to_be_bytes();
        out[0] = fbytes[0];
        out[1] = fbytes[1];
        out[2] = if self.flush { FLUSH_BIT } else { 0 };
        out[3] = self.fragment_number;
        out[4] = self.fragments_in_frame;
        Ok(HEADER_SIZE)
    }

    /// Encodes the header followed by `payload` into `out`.
    pub fn encode_packet(&self, payload: &[u8], out: &mut [u8]) -> Result<usize> {
        if out.len() < HEADER_SIZE + payload.len() {
            return Err(Error::BadParameters);
        }
        let n = self.encode(out)?;
        out[n..n + payload.len()].copy_from_slice(payload);
        Ok(n + payload.len())
    }

    /// Decodes a header from the front of `bytes`, returning the header and
    /// the remaining payload slice.
    ///
    /// Fails with `MalformedPacket` when the datagram is smaller than the
    /// header, when `fragmentsInFrame == 0`, or when
    /// `fragmentNumber >= fragmentsInFrame`. Reserved flag bits are ignored
    /// on read (forward compatibility, spec.md §6).
    pub fn decode(bytes: &[u8]) -> Result<(Self, &[u8])> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::MalformedPacket);
        }
        let frame_number = u16::from_be_bytes([bytes[0], bytes[1]]);
        let flush = bytes[2] & FLUSH_BIT != 0;
        let fragment_number = bytes[3];
        let fragments_in_frame = bytes[4];

        if fragments_in_frame == 0 || fragment_number >= fragments_in_frame {
            return Err(Error::MalformedPacket);
        }

        Ok((
            Self {
                frame_number,
                flush,
                fragment_number,
                fragments_in_frame,
            },
            &bytes[HEADER_SIZE..],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let header = DataHeader::new(0xBEEF, true, 3, 7);
        let mut buf = [0u8; HEADER_SIZE];
        header.encode(&mut buf).unwrap();
        let (decoded, rest) = DataHeader::decode(&buf).unwrap();
        assert_eq!(decoded, header);
        assert!(rest.is_empty());
    }

    #[test]
    fn round_trip_with_payload() {
        let header = DataHeader::new(1, false, 0, 1);
        let mut buf = [0u8; HEADER_SIZE + 3];
        header.encode_packet(b"abc", &mut buf).unwrap();
        let (decoded, payload) = DataHeader::decode(&buf).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(payload, b"abc");
    }

    #[test]
    fn reserved_flag_bits_are_ignored_on_read() {
        let mut buf = [0u8; HEADER_SIZE];
        DataHeader::new(1, true, 0, 1).encode(&mut buf).unwrap();
        buf[2] |= 0b1111_1100; // set every reserved bit
        let (decoded, _) = DataHeader::decode(&buf).unwrap();
        assert!(decoded.flush);
    }

    #[test]
    fn reserved_flag_bits_are_zero_on_write() {
        let mut buf = [0u8; HEADER_SIZE];
        DataHeader::new(1, false, 0, 1).encode(&mut buf).unwrap();
        assert_eq!(buf[2], 0);
    }

    #[test]
    fn zero_fragments_in_frame_is_malformed() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[4] = 0;
        assert_eq!(DataHeader::decode(&buf), Err(Error::MalformedPacket));
    }

    #[test]
    fn fragment_number_at_or_past_total_is_malformed() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[3] = 4;
        buf[4] = 4;
        assert_eq!(DataHeader::decode(&buf), Err(Error::MalformedPacket));
    }

    #[test]
    fn short_datagram_is_malformed() {
        let buf = [0u8; HEADER_SIZE - 1];
        assert_eq!(DataHeader::decode(&buf), Err(Error::MalformedPacket));
    }

    proptest::proptest! {
        #[test]
        fn encode_decode_identity(
            frame_number: u16,
            flush: bool,
            fragments_in_frame in 1u8..=255,
        ) {
            let fragment_number = fragments_in_frame - 1;
            let header = DataHeader::new(frame_number, flush, fragment_number, fragments_in_frame);
            let mut buf = [0u8; HEADER_SIZE];
            header.encode(&mut buf).unwrap();
            let (decoded, _) = DataHeader::decode(&buf).unwrap();
            prop_assert_eq!(decoded, header);
        }
    }
}
