//! Recognised configuration options (spec.md §6).

use crate::error::{Error, Result};

/// Fragmentation and retransmission-cadence configuration shared by the
/// sender and the reader.
///
/// Built with the same `with_*` builder idiom as the teacher's
/// `TransportConfig`.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Upper bound on bytes per fragment payload.
    max_fragment_size: usize,

    /// Upper bound on fragments per frame. Must stay in `1..=64` since the
    /// in-flight bitmap is a single `u64`.
    max_fragments_per_frame: u8,

    /// Sender frame-queue capacity.
    frames_buffer_size: usize,

    /// Minimum wait between retransmission passes.
    retry_interval_floor_ms: u64,

    /// Maximum wait between retransmission passes.
    retry_interval_ceiling_ms: u64,

    /// Reader ack cadence.
    ack_send_interval_ms: u64,
}

impl Config {
    /// Creates a configuration with the canonical profile's defaults:
    /// 1024-byte fragments, 64 fragments per frame (the full 64-bit bitmap),
    /// an 8-frame queue, a 5 ms retry floor, a 200 ms retry ceiling, and a
    /// 5 ms ack cadence.
    pub const fn new() -> Self {
        Self {
            max_fragment_size: 1024,
            max_fragments_per_frame: 64,
            frames_buffer_size: 8,
            retry_interval_floor_ms: 5,
            retry_interval_ceiling_ms: 200,
            ack_send_interval_ms: 5,
        }
    }

    /// Sets the maximum payload bytes per fragment.
    pub const fn with_max_fragment_size(mut self, size: usize) -> Self {
        self.max_fragment_size = size;
        self
    }

    /// Sets the maximum fragment count per frame (rejected by `validate`
    /// unless it lands in `1..=64`).
    pub const fn with_max_fragments_per_frame(mut self, n: u8) -> Self {
        self.max_fragments_per_frame = n;
        self
    }

    /// Sets the sender's frame-queue capacity. The recommended setting is
    /// strictly greater than the distance between flush frames (one GOP).
    pub const fn with_frames_buffer_size(mut self, n: usize) -> Self {
        self.frames_buffer_size = n;
        self
    }

    /// Sets the retry-interval floor and ceiling, in milliseconds.
    pub const fn with_retry_interval_ms(mut self, floor: u64, ceiling: u64) -> Self {
        self.retry_interval_floor_ms = floor;
        self.retry_interval_ceiling_ms = ceiling;
        self
    }

    /// Sets the reader's ack-send cadence, in milliseconds.
    pub const fn with_ack_send_interval_ms(mut self, ms: u64) -> Self {
        self.ack_send_interval_ms = ms;
        self
    }

    /// Validates the configuration per spec.md §4.7.
    pub fn validate(&self) -> Result<()> {
        if self.max_fragment_size == 0 {
            return Err(Error::BadParameters);
        }
        if self.max_fragments_per_frame == 0 || self.max_fragments_per_frame > 64 {
            return Err(Error::BadParameters);
        }
        if self.frames_buffer_size == 0 {
            return Err(Error::BadParameters);
        }
        if self.retry_interval_floor_ms == 0
            || self.retry_interval_ceiling_ms < self.retry_interval_floor_ms
        {
            return Err(Error::BadParameters);
        }
        if self.ack_send_interval_ms == 0 {
            return Err(Error::BadParameters);
        }
        Ok(())
    }

    pub const fn max_fragment_size(&self) -> usize {
        self.max_fragment_size
    }

    pub const fn max_fragments_per_frame(&self) -> u8 {
        self.max_fragments_per_frame
    }

    pub const fn frames_buffer_size(&self) -> usize {
        self.frames_buffer_size
    }

    pub const fn retry_interval_floor_ms(&self) -> u64 {
        self.retry_interval_floor_ms
    }

    pub const fn retry_interval_ceiling_ms(&self) -> u64 {
        self.retry_interval_ceiling_ms
    }

    pub const fn ack_send_interval_ms(&self) -> u64 {
        self.ack_send_interval_ms
    }

    /// Largest frame payload this configuration can fragment.
    pub const fn max_frame_size(&self) -> usize {
        self.max_fragment_size * self.max_fragments_per_frame as usize
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_fragment_size_rejected() {
        let cfg = Config::default().with_max_fragment_size(0);
        assert_eq!(cfg.validate(), Err(Error::BadParameters));
    }

    #[test]
    fn more_than_64_fragments_rejected() {
        let cfg = Config::default().with_max_fragments_per_frame(65);
        assert_eq!(cfg.validate(), Err(Error::BadParameters));
    }

    #[test]
    fn one_fragment_per_frame_is_valid() {
        let cfg = Config::default().with_max_fragments_per_frame(1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn max_frame_size_is_product() {
        let cfg = Config::default()
            .with_max_fragment_size(1000)
            .with_max_fragments_per_frame(4);
        assert_eq!(cfg.max_frame_size(), 4000);
    }
}
