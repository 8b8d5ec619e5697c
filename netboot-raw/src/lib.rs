#![allow(clippy::uninlined_format_args)]

use core::net::{SocketAddr, SocketAddrV4, SocketAddrV6};

pub mod bytes;
pub mod ether;
pub mod ip;
pub mod udp;

pub use ether::Encapsulation;

use ip::{Ipv4PacketHeader, Ipv6PacketHeader};
use udp::UdpPacketHeader;

/// An error type for decoding captured frames
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Error {
    DataUnderflow,
    BufferOverflow,
    InvalidFormat,
}

impl From<bytes::Error> for Error {
    fn from(value: bytes::Error) -> Self {
        match value {
            bytes::Error::BufferOverflow => Self::BufferOverflow,
            bytes::Error::DataUnderflow => Self::DataUnderflow,
            bytes::Error::InvalidFormat => Self::InvalidFormat,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let str = match self {
            Self::DataUnderflow => "Data underflow",
            Self::BufferOverflow => "Buffer overflow",
            Self::InvalidFormat => "Invalid format",
        };

        write!(f, "{}", str)
    }
}

impl std::error::Error for Error {}

/// The IP version a frame filter selects for
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IpVersion {
    V4,
    V6,
}

/// An inclusive port range filter, the `udp portrange` analogue
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PortFilter {
    pub lo: u16,
    pub hi: u16,
}

impl PortFilter {
    pub const fn new(lo: u16, hi: u16) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.lo..=self.hi).contains(&port)
    }
}

/// Demultiplexes a captured frame down to its UDP payload.
///
/// Strips the link-layer header per `encap`, keeps only frames of the
/// requested IP version carrying UDP, and applies `filter` to the ports.
/// Returns `None` for frames that do not match; an error only for frames
/// that match the filters but are structurally broken.
#[allow(clippy::type_complexity)]
pub fn frame_udp_decode(
    frame: &[u8],
    encap: Encapsulation,
    version: IpVersion,
    filter: Option<PortFilter>,
) -> Result<Option<(SocketAddr, SocketAddr, &[u8])>, Error> {
    let (ethertype, packet) = ether::decode(frame, encap)?;

    match version {
        IpVersion::V4 => {
            if ethertype != ether::ETHERTYPE_IPV4 {
                return Ok(None);
            }

            let Some((ip_hdr, ip_payload)) =
                Ipv4PacketHeader::decode_with_payload(packet, Some(UdpPacketHeader::PROTO))?
            else {
                return Ok(None);
            };

            let Some((udp_hdr, payload)) =
                UdpPacketHeader::decode_with_payload(ip_payload, filter)?
            else {
                return Ok(None);
            };

            Ok(Some((
                SocketAddr::V4(SocketAddrV4::new(ip_hdr.src, udp_hdr.src)),
                SocketAddr::V4(SocketAddrV4::new(ip_hdr.dst, udp_hdr.dst)),
                payload,
            )))
        }
        IpVersion::V6 => {
            if ethertype != ether::ETHERTYPE_IPV6 {
                return Ok(None);
            }

            let Some((ip_hdr, ip_payload)) =
                Ipv6PacketHeader::decode_with_payload(packet, Some(UdpPacketHeader::PROTO))?
            else {
                return Ok(None);
            };

            let Some((udp_hdr, payload)) =
                UdpPacketHeader::decode_with_payload(ip_payload, filter)?
            else {
                return Ok(None);
            };

            Ok(Some((
                SocketAddr::V6(SocketAddrV6::new(ip_hdr.src, udp_hdr.src, 0, 0)),
                SocketAddr::V6(SocketAddrV6::new(ip_hdr.dst, udp_hdr.dst, 0, 0)),
                payload,
            )))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
        let udp_len = (udp::UdpPacketHeader::SIZE + payload.len()) as u16;
        let ip_len = ip::Ipv4PacketHeader::MIN_SIZE as u16 + udp_len;

        let mut frame = vec![
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5, 0x08, 0x00,
        ];
        frame.extend_from_slice(&[0x45, 0x00]);
        frame.extend_from_slice(&ip_len.to_be_bytes());
        frame.extend_from_slice(&[0, 0, 0, 0, 0x40, 17, 0, 0]);
        frame.extend_from_slice(&[0, 0, 0, 0]); // src 0.0.0.0
        frame.extend_from_slice(&[255, 255, 255, 255]);
        frame.extend_from_slice(&src_port.to_be_bytes());
        frame.extend_from_slice(&dst_port.to_be_bytes());
        frame.extend_from_slice(&udp_len.to_be_bytes());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn test_dhcp_frame_matches() {
        let frame = udp_frame(68, 67, b"dhcp");

        let (src, dst, payload) = frame_udp_decode(
            &frame,
            Encapsulation::Ethernet,
            IpVersion::V4,
            Some(PortFilter::new(67, 68)),
        )
        .unwrap()
        .unwrap();

        assert_eq!(src.port(), 68);
        assert_eq!(dst.port(), 67);
        assert_eq!(payload, b"dhcp");
    }

    #[test]
    fn test_foreign_traffic_filtered() {
        let frame = udp_frame(40000, 53, b"dns");

        assert!(frame_udp_decode(
            &frame,
            Encapsulation::Ethernet,
            IpVersion::V4,
            Some(PortFilter::new(67, 68)),
        )
        .unwrap()
        .is_none());

        // v6 filter never matches a v4 frame
        assert!(frame_udp_decode(
            &udp_frame(68, 67, b"dhcp"),
            Encapsulation::Ethernet,
            IpVersion::V6,
            None,
        )
        .unwrap()
        .is_none());
    }
}
