use super::bytes::BytesIn;

use super::Error;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_IPV6: u16 = 0x86dd;

const ETHERTYPE_VLAN: u16 = 0x8100;

/// Link-layer encapsulation of a captured frame.
///
/// `LinuxCooked` covers captures taken on Linux "any" pseudo-interfaces
/// (SLL, 16-byte pseudo-header) where no real Ethernet header is present.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Encapsulation {
    Ethernet,
    LinuxCooked,
}

/// Represents a parsed Ethernet II header
#[derive(Clone, Debug)]
pub struct EthernetFrameHeader {
    pub dst: [u8; 6],
    pub src: [u8; 6],
    pub ethertype: u16,
}

impl EthernetFrameHeader {
    pub const MIN_SIZE: usize = 14;

    /// Decodes the header from a byte slice
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        Ok(Self {
            dst: bytes.arr()?,
            src: bytes.arr()?,
            ethertype: u16::from_be_bytes(bytes.arr()?),
        })
    }

    /// Decodes the provided frame into a header and a payload slice,
    /// stepping over a single 802.1Q tag if one is present
    pub fn decode_with_payload(frame: &[u8]) -> Result<(Self, &[u8]), Error> {
        let mut hdr = Self::decode(frame)?;
        let mut offset = Self::MIN_SIZE;

        if hdr.ethertype == ETHERTYPE_VLAN {
            let mut bytes = BytesIn::new(&frame[offset..]);

            let _tci = bytes.arr::<2>()?;
            hdr.ethertype = u16::from_be_bytes(bytes.arr()?);
            offset += 4;
        }

        Ok((hdr, &frame[offset..]))
    }
}

/// Represents a parsed Linux cooked (SLL) capture header
#[derive(Clone, Debug)]
pub struct CookedFrameHeader {
    pub packet_type: u16,
    pub arphrd_type: u16,
    pub addr_len: u16,
    pub addr: [u8; 8],
    pub protocol: u16,
}

impl CookedFrameHeader {
    pub const SIZE: usize = 16;

    /// Decodes the header from a byte slice
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        Ok(Self {
            packet_type: u16::from_be_bytes(bytes.arr()?),
            arphrd_type: u16::from_be_bytes(bytes.arr()?),
            addr_len: u16::from_be_bytes(bytes.arr()?),
            addr: bytes.arr()?,
            protocol: u16::from_be_bytes(bytes.arr()?),
        })
    }

    /// Decodes the provided frame into a header and a payload slice
    pub fn decode_with_payload(frame: &[u8]) -> Result<(Self, &[u8]), Error> {
        let hdr = Self::decode(frame)?;

        Ok((hdr, &frame[Self::SIZE..]))
    }
}

/// Strips the link-layer header off a captured frame, returning the
/// network-layer protocol (an ethertype) and the network-layer payload
pub fn decode(frame: &[u8], encap: Encapsulation) -> Result<(u16, &[u8]), Error> {
    match encap {
        Encapsulation::Ethernet => {
            let (hdr, payload) = EthernetFrameHeader::decode_with_payload(frame)?;

            Ok((hdr.ethertype, payload))
        }
        Encapsulation::LinuxCooked => {
            let (hdr, payload) = CookedFrameHeader::decode_with_payload(frame)?;

            Ok((hdr.protocol, payload))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ethernet() {
        let mut frame = vec![
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // dst
            0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5, // src
            0x08, 0x00, // IPv4
        ];
        frame.extend_from_slice(&[0x45, 0x00]);

        let (ethertype, payload) = decode(&frame, Encapsulation::Ethernet).unwrap();

        assert_eq!(ethertype, ETHERTYPE_IPV4);
        assert_eq!(payload, &[0x45, 0x00]);
    }

    #[test]
    fn test_vlan_tag() {
        let mut frame = vec![
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5,
        ];
        frame.extend_from_slice(&[0x81, 0x00, 0x00, 0x64, 0x86, 0xdd]); // VLAN 100, IPv6
        frame.push(0x60);

        let (ethertype, payload) = decode(&frame, Encapsulation::Ethernet).unwrap();

        assert_eq!(ethertype, ETHERTYPE_IPV6);
        assert_eq!(payload, &[0x60]);
    }

    #[test]
    fn test_truncated() {
        assert!(decode(&[0xff; 6], Encapsulation::Ethernet).is_err());
        assert!(decode(&[0x00; 10], Encapsulation::LinuxCooked).is_err());
    }
}
