use core::net::{Ipv4Addr, Ipv6Addr};

use super::bytes::BytesIn;

use super::Error;

/// Represents a parsed IPv4 header
#[derive(Clone, Debug)]
pub struct Ipv4PacketHeader {
    /// Version
    pub version: u8,
    /// Header length
    pub hlen: u8,
    /// Type of service
    pub tos: u8,
    /// Total length
    pub len: u16,
    /// Identification
    pub id: u16,
    /// Fragment offset field
    pub off: u16,
    /// Time to live
    pub ttl: u8,
    /// Protocol
    pub p: u8,
    /// Checksum
    pub sum: u16,
    /// Source address
    pub src: Ipv4Addr,
    /// Dest address
    pub dst: Ipv4Addr,
}

impl Ipv4PacketHeader {
    pub const MIN_SIZE: usize = 20;

    /// Decodes the header from a byte slice
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        let vhl = bytes.byte()?;

        Ok(Self {
            version: vhl >> 4,
            hlen: (vhl & 0x0f) * 4,
            tos: bytes.byte()?,
            len: u16::from_be_bytes(bytes.arr()?),
            id: u16::from_be_bytes(bytes.arr()?),
            off: u16::from_be_bytes(bytes.arr()?),
            ttl: bytes.byte()?,
            p: bytes.byte()?,
            sum: u16::from_be_bytes(bytes.arr()?),
            src: u32::from_be_bytes(bytes.arr()?).into(),
            dst: u32::from_be_bytes(bytes.arr()?).into(),
        })
    }

    /// Decodes the provided packet into a header and a payload slice.
    ///
    /// Returns `None` when the packet does not carry `filter_proto`, or when
    /// it is a non-initial fragment (the transport header is absent there).
    pub fn decode_with_payload(
        packet: &[u8],
        filter_proto: Option<u8>,
    ) -> Result<Option<(Self, &[u8])>, Error> {
        let hdr = Self::decode(packet)?;

        if hdr.version != 4 {
            return Err(Error::InvalidFormat);
        }

        if let Some(filter_proto) = filter_proto {
            if filter_proto != hdr.p {
                return Ok(None);
            }
        }

        if hdr.off & 0x1fff != 0 {
            return Ok(None);
        }

        let len = hdr.len as usize;
        let hdr_len = hdr.hlen as usize;
        if hdr_len < Self::MIN_SIZE || len < hdr_len || packet.len() < len {
            Err(Error::DataUnderflow)?;
        }

        let packet = &packet[..len];

        Ok(Some((hdr.clone(), &packet[hdr_len..])))
    }
}

/// Represents a parsed IPv6 fixed header
#[derive(Clone, Debug)]
pub struct Ipv6PacketHeader {
    /// Version
    pub version: u8,
    /// Traffic class
    pub tc: u8,
    /// Flow label
    pub flow: u32,
    /// Payload length
    pub payload_len: u16,
    /// Next header
    pub next_header: u8,
    /// Hop limit
    pub hop_limit: u8,
    /// Source address
    pub src: Ipv6Addr,
    /// Dest address
    pub dst: Ipv6Addr,
}

impl Ipv6PacketHeader {
    pub const SIZE: usize = 40;

    /// Decodes the header from a byte slice
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        let vtf = u32::from_be_bytes(bytes.arr()?);

        Ok(Self {
            version: (vtf >> 28) as u8,
            tc: ((vtf >> 20) & 0xff) as u8,
            flow: vtf & 0x000f_ffff,
            payload_len: u16::from_be_bytes(bytes.arr()?),
            next_header: bytes.byte()?,
            hop_limit: bytes.byte()?,
            src: bytes.arr::<16>()?.into(),
            dst: bytes.arr::<16>()?.into(),
        })
    }

    /// Decodes the provided packet into a header and a payload slice.
    ///
    /// Extension headers are not walked: a packet whose next-header is not
    /// `filter_proto` is filtered out rather than rejected. DHCP traffic is
    /// carried as plain UDP directly after the fixed header.
    pub fn decode_with_payload(
        packet: &[u8],
        filter_proto: Option<u8>,
    ) -> Result<Option<(Self, &[u8])>, Error> {
        let hdr = Self::decode(packet)?;

        if hdr.version != 6 {
            return Err(Error::InvalidFormat);
        }

        if let Some(filter_proto) = filter_proto {
            if filter_proto != hdr.next_header {
                return Ok(None);
            }
        }

        let len = Self::SIZE + hdr.payload_len as usize;
        if packet.len() < len {
            Err(Error::DataUnderflow)?;
        }

        Ok(Some((hdr.clone(), &packet[Self::SIZE..len])))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ipv4_udp_packet(payload: &[u8]) -> Vec<u8> {
        let len = (Ipv4PacketHeader::MIN_SIZE + payload.len()) as u16;

        let mut packet = vec![
            0x45, 0x00, // v4, hlen 20, tos
            (len >> 8) as u8,
            len as u8,
            0x00, 0x00, 0x00, 0x00, // id, off
            0x40, 17, // ttl, UDP
            0x00, 0x00, // sum
            10, 0, 0, 1, // src
            255, 255, 255, 255, // dst
        ];
        packet.extend_from_slice(payload);
        packet
    }

    #[test]
    fn test_v4_filter() {
        let packet = ipv4_udp_packet(&[1, 2, 3]);

        let (hdr, payload) = Ipv4PacketHeader::decode_with_payload(&packet, Some(17))
            .unwrap()
            .unwrap();
        assert_eq!(hdr.src, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(payload, &[1, 2, 3]);

        assert!(Ipv4PacketHeader::decode_with_payload(&packet, Some(6))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_v6() {
        let mut packet = vec![0x60, 0x00, 0x00, 0x00, 0x00, 0x02, 17, 0x40];
        packet.extend_from_slice(&[0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        packet.extend_from_slice(&[0xff, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 2]);
        packet.extend_from_slice(&[0xaa, 0xbb]);

        let (hdr, payload) = Ipv6PacketHeader::decode_with_payload(&packet, Some(17))
            .unwrap()
            .unwrap();
        assert_eq!(hdr.next_header, 17);
        assert_eq!(payload, &[0xaa, 0xbb]);
    }
}
