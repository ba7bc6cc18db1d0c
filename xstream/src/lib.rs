//! Fragmentation and selective-ack retransmission transport for discrete
//! application frames delivered over a pair of unreliable datagram
//! channels (spec.md §1).
//!
//! This crate implements the protocol the sender and reader sides of such
//! a link run jointly: fragmentation of whole frames into bounded-size
//! packets, a rolling ack bitmap, pre-emption of stale frames by newer
//! ones, and the two-thread-per-endpoint concurrency model described in
//! spec.md §5. The lower-layer datagram multiplexer, the encoder/decoder,
//! and the application itself are external collaborators reached only
//! through [`bus::DatagramBus`] and the completion-callback traits in
//! [`callback`].

pub mod bus;
pub mod callback;
pub mod config;
pub mod error;
pub mod frame;
pub mod packet;
pub mod reader;
pub mod sender;
mod seq;
pub mod stats;

pub use bus::{ChannelId, DatagramBus};
pub use callback::{ReaderCallback, ReaderCause, ReaderEvent, SenderCallback, SenderStatus};
pub use config::Config;
pub use error::{Error, Result};
pub use reader::Reader;
pub use sender::Sender;
