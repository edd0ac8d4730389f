//! Error types
//!
//! Geometric absence (no intersection, no collision) is never an error; it is
//! an `Option` or `Collision::Miss`. Everything here is a real failure.

use std::io;

use thiserror::Error;

/// Failures of the datagram link and the sequenced channel on top of it
#[derive(Debug, Error)]
pub enum NetError {
    /// Socket init, bind, send or receive failed
    #[error("socket error: {0}")]
    Socket(#[from] io::Error),

    /// Hostname did not resolve to any address
    #[error("could not resolve host `{host}`")]
    Resolve { host: String },

    /// The receive window elapsed without an acceptable packet
    #[error("receive timed out")]
    Timeout,

    /// Byte length did not match the wire format
    #[error("expected {expected} bytes, got {actual}")]
    Serialization { expected: usize, actual: usize },

    /// The passive handshake gave up
    #[error("no client after {attempts} attempts")]
    HandshakeExhausted { attempts: u32 },

    /// Tried to send before a peer address was known
    #[error("no peer address to send to")]
    NotConnected,
}

impl NetError {
    /// Timeouts are the only recoverable failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, NetError::Timeout)
    }
}

/// Failures while building the startup configuration
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file: {0}")]
    Io(#[from] io::Error),

    #[error("settings parse: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`{flag}` expects a value")]
    MissingValue { flag: String },
}
