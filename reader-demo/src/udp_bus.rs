//! Minimal `DatagramBus` over a pair of connected UDP sockets.
//!
//! One socket per logical channel, each `connect()`-ed to the peer's fixed
//! address so `send`/`recv` need no explicit destination. `pull` polls with
//! a read timeout rather than blocking forever, so a cancelled channel is
//! noticed within one timeout window instead of hanging until a datagram
//! happens to arrive.

use std::net::{ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use xstream::{ChannelId, DatagramBus, Error, Result};

const DATA: ChannelId = ChannelId(0);
const ACK: ChannelId = ChannelId(1);

const POLL_TIMEOUT: Duration = Duration::from_millis(200);

pub struct UdpDatagramBus {
    data: UdpSocket,
    ack: UdpSocket,
    data_cancelled: AtomicBool,
    ack_cancelled: AtomicBool,
}

impl UdpDatagramBus {
    pub fn connect(
        data_bind: impl ToSocketAddrs,
        data_peer: impl ToSocketAddrs,
        ack_bind: impl ToSocketAddrs,
        ack_peer: impl ToSocketAddrs,
    ) -> std::io::Result<Self> {
        let data = UdpSocket::bind(data_bind)?;
        data.connect(data_peer)?;
        data.set_read_timeout(Some(POLL_TIMEOUT))?;

        let ack = UdpSocket::bind(ack_bind)?;
        ack.connect(ack_peer)?;
        ack.set_read_timeout(Some(POLL_TIMEOUT))?;

        Ok(Self {
            data,
            ack,
            data_cancelled: AtomicBool::new(false),
            ack_cancelled: AtomicBool::new(false),
        })
    }

    fn socket(&self, channel: ChannelId) -> &UdpSocket {
        match channel {
            DATA => &self.data,
            ACK => &self.ack,
            _ => panic!("unknown channel {channel:?}"),
        }
    }

    fn cancelled(&self, channel: ChannelId) -> &AtomicBool {
        match channel {
            DATA => &self.data_cancelled,
            ACK => &self.ack_cancelled,
            _ => panic!("unknown channel {channel:?}"),
        }
    }
}

impl DatagramBus for UdpDatagramBus {
    fn push(&self, channel: ChannelId, bytes: &[u8]) -> Result<()> {
        self.socket(channel)
            .send(bytes)
            .map(|_| ())
            .map_err(|_| Error::TransportError)
    }

    fn pull(&self, channel: ChannelId, buf: &mut [u8]) -> Result<usize> {
        loop {
            if self.cancelled(channel).load(Ordering::SeqCst) {
                return Err(Error::TransportError);
            }
            match self.socket(channel).recv(buf) {
                Ok(len) => return Ok(len),
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue
                }
                Err(_) => return Err(Error::TransportError),
            }
        }
    }

    fn cancel(&self, channel: ChannelId) {
        self.cancelled(channel).store(true, Ordering::SeqCst);
    }
}
