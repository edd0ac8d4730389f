//! Datagram links
//!
//! `Link` is the only thing the sequenced channel needs from a transport:
//! fire-and-forget sends and a receive that gives up after a timeout.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::NetError;

/// Unreliable, unordered datagram transport
pub trait Link {
    /// Send one datagram to the peer
    fn send(&mut self, datagram: &[u8]) -> Result<(), NetError>;

    /// Wait up to `timeout` for one datagram.
    ///
    /// Returns the number of bytes written into `buf`, or `None` if the
    /// timeout elapsed first.
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>, NetError>;
}

/// UDP socket with a single peer.
///
/// A passive endpoint learns its peer from the first datagram it receives.
#[derive(Debug)]
pub struct UdpLink {
    socket: UdpSocket,
    peer: Option<SocketAddr>,
}

impl UdpLink {
    /// Bind on all IPv4 interfaces
    pub fn bind(port: u16) -> Result<Self, NetError> {
        Self::bind_addr(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    pub fn bind_addr(addr: SocketAddr) -> Result<Self, NetError> {
        let socket = UdpSocket::bind(addr)?;
        log::debug!("UDP socket bound to {}", socket.local_addr()?);
        Ok(Self { socket, peer: None })
    }

    /// Resolve `host:port` and make it the peer
    pub fn connect(&mut self, host: &str, port: u16) -> Result<SocketAddr, NetError> {
        let resolve_err = || NetError::Resolve {
            host: host.to_string(),
        };
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|_| resolve_err())?
            .collect();
        // The socket is IPv4; prefer a matching address
        let addr = addrs
            .iter()
            .copied()
            .find(SocketAddr::is_ipv4)
            .or_else(|| addrs.first().copied())
            .ok_or_else(resolve_err)?;
        self.peer = Some(addr);
        Ok(addr)
    }

    pub fn set_peer(&mut self, peer: SocketAddr) {
        self.peer = Some(peer);
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Link for UdpLink {
    fn send(&mut self, datagram: &[u8]) -> Result<(), NetError> {
        let peer = self.peer.ok_or(NetError::NotConnected)?;
        self.socket.send_to(datagram, peer)?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>, NetError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            // A zero read timeout is rejected by the OS
            if remaining.is_zero() {
                return Ok(None);
            }
            self.socket.set_read_timeout(Some(remaining))?;
            match self.socket.recv_from(buf) {
                Ok((len, from)) => match self.peer {
                    Some(peer) if peer != from => {
                        log::debug!("Ignoring datagram from {from} (peer is {peer})");
                    }
                    Some(_) => return Ok(Some(len)),
                    None => {
                        log::info!("Peer is {from}");
                        self.peer = Some(from);
                        return Ok(Some(len));
                    }
                },
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

type Queue = Rc<RefCell<VecDeque<Option<Vec<u8>>>>>;

/// In-process link for single-threaded pairings and tests.
///
/// Receiving from an empty queue reports an elapsed timeout immediately
/// instead of blocking.
#[derive(Debug, Clone, Default)]
pub struct MemoryLink {
    inbox: Queue,
    outbox: Queue,
}

impl MemoryLink {
    /// Two ends wired to each other
    pub fn pair() -> (Self, Self) {
        let a: Queue = Rc::default();
        let b: Queue = Rc::default();
        (
            Self {
                inbox: a.clone(),
                outbox: b.clone(),
            },
            Self { inbox: b, outbox: a },
        )
    }

    /// Queue a timeout at the back of this end's inbox
    pub fn stall(&self) {
        self.inbox.borrow_mut().push_back(None);
    }

    /// Datagrams waiting to be received by this end
    pub fn pending(&self) -> usize {
        self.inbox.borrow().iter().filter(|d| d.is_some()).count()
    }
}

impl Link for MemoryLink {
    fn send(&mut self, datagram: &[u8]) -> Result<(), NetError> {
        self.outbox.borrow_mut().push_back(Some(datagram.to_vec()));
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<Option<usize>, NetError> {
        match self.inbox.borrow_mut().pop_front() {
            Some(Some(datagram)) => {
                // Oversized datagrams are truncated, as a socket would
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(Some(len))
            }
            Some(None) | None => Ok(None),
        }
    }
}
