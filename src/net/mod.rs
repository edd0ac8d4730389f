//! Two-player link
//!
//! A thin sequencing layer over unreliable datagrams. Only the latest paddle
//! position matters, so there are no acks and no retransmission: stale or
//! reordered packets are simply dropped.

pub mod channel;
pub mod link;
pub mod packet;
pub mod remote;

pub use channel::{ChannelStats, HANDSHAKE_SENTINEL, SequencedChannel};
pub use link::{Link, MemoryLink, UdpLink};
pub use packet::{PACKET_LEN, POINT_LEN, Packet, decode_point, encode_point};
pub use remote::{RemoteAdapter, Role};
