//! Wire packet codec (spec.md §4.1).
//!
//! Pure value-level transforms: no I/O, no allocation. Integer fields are
//! big-endian on the wire, matching the teacher's manual `to_be_bytes` /
//! `from_be_bytes` header encoding rather than pulling in a byte-order
//! crate.

pub mod ack;
pub mod header;

pub use ack::{AckPacket, ACK_PACKET_SIZE};
pub use header::{DataHeader, HEADER_SIZE};
