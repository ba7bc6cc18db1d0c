//! In-memory `DatagramBus` test double used by the scenario tests in
//! `tests/scenarios.rs` (spec.md §8's concrete end-to-end scenarios S1-S6).
//!
//! Two fixed channels (data, ack), each a `Mutex`-guarded `VecDeque` of
//! datagrams with a condvar for blocking `pull`. An optional drop predicate
//! lets a test simulate loss of specific fragments on the data channel.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use xstream::{ChannelId, DatagramBus, Error, Result};

pub const DATA: ChannelId = ChannelId(0);
pub const ACK: ChannelId = ChannelId(1);

struct Queue {
    datagrams: VecDeque<Vec<u8>>,
    cancelled: bool,
}

impl Queue {
    fn new() -> Self {
        Self {
            datagrams: VecDeque::new(),
            cancelled: false,
        }
    }
}

/// An in-process, lossy-by-request datagram bus connecting one sender and
/// one reader within a single test process.
pub struct MemoryBus {
    data: Mutex<Queue>,
    ack: Mutex<Queue>,
    cond: Condvar,
    drop_data: Mutex<Box<dyn FnMut(&[u8]) -> bool + Send>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(Queue::new()),
            ack: Mutex::new(Queue::new()),
            cond: Condvar::new(),
            drop_data: Mutex::new(Box::new(|_| false)),
        }
    }

    /// Installs a predicate invoked once per data-channel push; datagrams
    /// for which it returns `true` are silently discarded, simulating loss.
    pub fn drop_data_when(&self, predicate: impl FnMut(&[u8]) -> bool + Send + 'static) {
        *self.drop_data.lock().unwrap() = Box::new(predicate);
    }

    fn queue(&self, channel: ChannelId) -> &Mutex<Queue> {
        match channel {
            DATA => &self.data,
            ACK => &self.ack,
            _ => panic!("unknown test channel {channel:?}"),
        }
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl DatagramBus for MemoryBus {
    fn push(&self, channel: ChannelId, bytes: &[u8]) -> Result<()> {
        if channel == DATA && (self.drop_data.lock().unwrap())(bytes) {
            return Ok(());
        }
        let mut guard = self.queue(channel).lock().unwrap();
        guard.datagrams.push_back(bytes.to_vec());
        self.cond.notify_all();
        Ok(())
    }

    fn pull(&self, channel: ChannelId, buf: &mut [u8]) -> Result<usize> {
        let mut guard = self.queue(channel).lock().unwrap();
        loop {
            if let Some(datagram) = guard.datagrams.pop_front() {
                if datagram.len() > buf.len() {
                    return Err(Error::TransportError);
                }
                buf[..datagram.len()].copy_from_slice(&datagram);
                return Ok(datagram.len());
            }
            if guard.cancelled {
                return Err(Error::TransportError);
            }
            guard = self.cond.wait(guard).unwrap();
        }
    }

    fn cancel(&self, channel: ChannelId) {
        let mut guard = self.queue(channel).lock().unwrap();
        guard.cancelled = true;
        self.cond.notify_all();
    }
}
