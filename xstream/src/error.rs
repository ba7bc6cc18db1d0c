//! Error types for the frame transport protocol.
//!
//! This module defines the error taxonomy for the public API
//! (`BadParameters`, `FrameTooLarge`, `QueueFull`, `AllocFailed`, `Busy`)
//! and for the two background threads, where faults are counted and
//! suppressed rather than propagated (`MalformedPacket`, `TransportError`).

use std::fmt;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds returned from the public API and surfaced from the I/O loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Null/empty buffer, zero size, or out-of-range configuration.
    BadParameters,

    /// Frame exceeds `MaxFragmentSize * MaxFragmentsPerFrame`.
    FrameTooLarge,

    /// The frame queue is full and `flush` was not set.
    QueueFull,

    /// Endpoint construction failed.
    AllocFailed,

    /// `stop`/drop attempted while a thread is still running.
    Busy,

    /// Decoded header failed validation.
    MalformedPacket,

    /// The datagram bus reported a push/pull failure.
    TransportError,
}

impl Error {
    /// Human-readable description, matching the taxonomy above.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::BadParameters => "bad parameters",
            Error::FrameTooLarge => "frame too large",
            Error::QueueFull => "frame queue full",
            Error::AllocFailed => "allocation failed",
            Error::Busy => "endpoint busy, stop first",
            Error::MalformedPacket => "malformed packet",
            Error::TransportError => "datagram bus transport error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Error {}
