//! Sequenced channel
//!
//! Every outgoing payload is prefixed with a send counter. On receive, any
//! packet whose counter is not strictly newer than the last accepted one is
//! dropped, so the caller only ever sees a monotonic stream.

use std::time::{Duration, Instant};

use super::link::Link;
use super::packet::{POINT_LEN, Packet};
use crate::consts::RECV_TIMEOUT_SECS;
use crate::error::NetError;

/// Payload the active side sends to announce itself
pub const HANDSHAKE_SENTINEL: [u8; POINT_LEN] = *b"BOUT";

/// Larger than any valid packet so oversized datagrams show up as such
const RECV_BUF_LEN: usize = 64;

/// Traffic counters, logged at shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub sent: u64,
    pub accepted: u64,
    /// Packets dropped for not being newer than the last accepted one
    pub stale: u64,
    /// Receive windows that elapsed without an accepted packet
    pub timeouts: u64,
}

#[derive(Debug)]
pub struct SequencedChannel<L: Link> {
    link: L,
    sent_seq: u32,
    /// `None` until the first packet is accepted, so counter 0 is accepted
    last_accepted: Option<u32>,
    window: Duration,
    stats: ChannelStats,
}

impl<L: Link> SequencedChannel<L> {
    pub fn new(link: L) -> Self {
        Self::with_window(link, Duration::from_secs(RECV_TIMEOUT_SECS))
    }

    /// Channel whose `receive` gives up after `window`
    pub fn with_window(link: L, window: Duration) -> Self {
        Self {
            link,
            sent_seq: 0,
            last_accepted: None,
            window,
            stats: ChannelStats::default(),
        }
    }

    /// Send one payload, tagged with the next counter value
    pub fn send(&mut self, payload: [u8; POINT_LEN]) -> Result<(), NetError> {
        let packet = Packet::new(self.sent_seq, payload);
        self.link.send(packet.as_bytes())?;
        self.sent_seq = self.sent_seq.wrapping_add(1);
        self.stats.sent += 1;
        Ok(())
    }

    /// Wait for the next packet newer than anything accepted so far.
    ///
    /// The window covers the whole call; discarded packets do not extend it.
    pub fn receive(&mut self) -> Result<[u8; POINT_LEN], NetError> {
        let deadline = Instant::now() + self.window;
        let mut buf = [0u8; RECV_BUF_LEN];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(len) = self.link.recv(&mut buf, remaining)? else {
                self.stats.timeouts += 1;
                return Err(NetError::Timeout);
            };

            let packet = Packet::from_bytes(&buf[..len])?;
            let seq = packet.seq();
            if let Some(last) = self.last_accepted
                && seq <= last
            {
                log::debug!("Dropping stale packet {seq} (last accepted {last})");
                self.stats.stale += 1;
                continue;
            }

            self.last_accepted = Some(seq);
            self.stats.accepted += 1;
            return Ok(packet.payload());
        }
    }

    /// Passive handshake: wait for the peer's announcement, retrying on
    /// timeouts up to `attempts` times
    pub fn accept(&mut self, attempts: u32) -> Result<[u8; POINT_LEN], NetError> {
        for attempt in 1..=attempts {
            match self.receive() {
                Ok(payload) => {
                    if payload != HANDSHAKE_SENTINEL {
                        log::debug!("Handshake payload {payload:?} is not the sentinel");
                    }
                    log::info!("Client connected after {attempt} attempt(s)");
                    return Ok(payload);
                }
                Err(NetError::Timeout) => log::warn!("Waiting for client..."),
                Err(e) => return Err(e),
            }
        }
        Err(NetError::HandshakeExhausted { attempts })
    }

    /// Active handshake: announce ourselves once, without waiting for a reply
    pub fn connect(&mut self) -> Result<(), NetError> {
        self.send(HANDSHAKE_SENTINEL)?;
        log::info!("Announced to server");
        Ok(())
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    pub fn last_accepted_seq(&self) -> Option<u32> {
        self.last_accepted
    }

    /// Counter the next send will carry
    pub fn sent_seq(&self) -> u32 {
        self.sent_seq
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}
