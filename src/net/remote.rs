//! Remote paddle mirroring
//!
//! Each tick one side receives first and the other sends first, so the two
//! never block on `receive` at the same time.

use super::channel::{ChannelStats, SequencedChannel};
use super::link::Link;
use super::packet::{decode_point, encode_point};
use crate::error::NetError;
use crate::sim::Point;

/// Which side of a pairing we are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Receive, then send
    Host,
    /// Send, then receive
    Guest,
}

#[derive(Debug)]
pub struct RemoteAdapter<L: Link> {
    channel: SequencedChannel<L>,
    role: Role,
}

impl<L: Link> RemoteAdapter<L> {
    pub fn new(channel: SequencedChannel<L>, role: Role) -> Self {
        Self { channel, role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Exchange paddle positions for this tick.
    ///
    /// Returns the opponent's position, or `None` if the receive window
    /// elapsed. A host that times out skips its send for the tick.
    pub fn sync(&mut self, local: Point) -> Result<Option<Point>, NetError> {
        let payload = encode_point(local);
        let received = match self.role {
            Role::Host => {
                let received = self.receive()?;
                if received.is_some() {
                    self.channel.send(payload)?;
                }
                received
            }
            Role::Guest => {
                self.channel.send(payload)?;
                self.receive()?
            }
        };
        Ok(received)
    }

    fn receive(&mut self) -> Result<Option<Point>, NetError> {
        match self.channel.receive() {
            Ok(bytes) => decode_point(&bytes).map(Some),
            Err(NetError::Timeout) => {
                log::warn!("No update from peer this tick, skipping sync");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn stats(&self) -> ChannelStats {
        self.channel.stats()
    }

    pub fn channel(&self) -> &SequencedChannel<L> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut SequencedChannel<L> {
        &mut self.channel
    }
}
