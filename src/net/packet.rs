//! Wire formats
//!
//! Position: x then y, each a u16 written low byte first (4 bytes).
//! Packet: u32 little-endian sequence counter, then a position (8 bytes).

use bytemuck::{Pod, Zeroable};

use crate::error::NetError;
use crate::sim::Point;

pub const POINT_LEN: usize = 4;
pub const PACKET_LEN: usize = 8;

pub fn encode_point(p: Point) -> [u8; POINT_LEN] {
    let [x0, x1] = p.x.to_le_bytes();
    let [y0, y1] = p.y.to_le_bytes();
    [x0, x1, y0, y1]
}

/// Any length other than exactly 4 bytes is rejected
pub fn decode_point(bytes: &[u8]) -> Result<Point, NetError> {
    let &[x0, x1, y0, y1] = bytes else {
        return Err(NetError::Serialization {
            expected: POINT_LEN,
            actual: bytes.len(),
        });
    };
    Ok(Point::new(
        u16::from_le_bytes([x0, x1]),
        u16::from_le_bytes([y0, y1]),
    ))
}

/// One sequenced datagram, laid out exactly as it goes on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Packet {
    seq: [u8; 4],
    payload: [u8; POINT_LEN],
}

impl Packet {
    pub fn new(seq: u32, payload: [u8; POINT_LEN]) -> Self {
        Self {
            seq: seq.to_le_bytes(),
            payload,
        }
    }

    pub fn seq(&self) -> u32 {
        u32::from_le_bytes(self.seq)
    }

    pub fn payload(&self) -> [u8; POINT_LEN] {
        self.payload
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Any length other than exactly 8 bytes is rejected
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NetError> {
        if bytes.len() != PACKET_LEN {
            return Err(NetError::Serialization {
                expected: PACKET_LEN,
                actual: bytes.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_byte_order() {
        assert_eq!(encode_point(Point::new(0x0102, 0x0304)), [0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn test_point_wrong_length() {
        for bytes in [&[][..], &[1, 2, 3][..], &[1, 2, 3, 4, 5][..]] {
            match decode_point(bytes) {
                Err(NetError::Serialization { expected, actual }) => {
                    assert_eq!(expected, 4);
                    assert_eq!(actual, bytes.len());
                }
                other => panic!("expected a serialization error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_packet_layout() {
        let packet = Packet::new(0x0a0b0c0d, encode_point(Point::new(400, 300)));
        assert_eq!(
            packet.as_bytes(),
            &[0x0d, 0x0c, 0x0b, 0x0a, 0x90, 0x01, 0x2c, 0x01]
        );
        let back = Packet::from_bytes(packet.as_bytes()).unwrap();
        assert_eq!(back.seq(), 0x0a0b0c0d);
        assert_eq!(decode_point(&back.payload()).unwrap(), Point::new(400, 300));
    }

    #[test]
    fn test_packet_rejects_legacy_four_byte_format() {
        let legacy = encode_point(Point::new(1, 2));
        assert!(matches!(
            Packet::from_bytes(&legacy),
            Err(NetError::Serialization {
                expected: 8,
                actual: 4
            })
        ));
    }

    proptest! {
        #[test]
        fn prop_point_round_trip(x in any::<u16>(), y in any::<u16>()) {
            let p = Point::new(x, y);
            prop_assert_eq!(decode_point(&encode_point(p)).unwrap(), p);
        }
    }
}
