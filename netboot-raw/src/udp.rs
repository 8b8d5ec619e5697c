use log::trace;

use super::bytes::BytesIn;

use super::{Error, PortFilter};

/// Represents a parsed UDP header
#[derive(Clone, Debug)]
pub struct UdpPacketHeader {
    /// Source port
    pub src: u16,
    /// Destination port
    pub dst: u16,
    /// UDP length
    pub len: u16,
    /// UDP checksum
    pub sum: u16,
}

impl UdpPacketHeader {
    pub const PROTO: u8 = 17;

    pub const SIZE: usize = 8;

    /// Decodes the header from a byte slice
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        Ok(Self {
            src: u16::from_be_bytes(bytes.arr()?),
            dst: u16::from_be_bytes(bytes.arr()?),
            len: u16::from_be_bytes(bytes.arr()?),
            sum: u16::from_be_bytes(bytes.arr()?),
        })
    }

    /// Decodes the provided datagram into a header and a payload slice.
    ///
    /// Returns `None` when neither port falls inside `filter`. The checksum
    /// is not verified: captures taken on hosts with checksum offload
    /// routinely carry zero or partial sums.
    pub fn decode_with_payload(
        packet: &[u8],
        filter: Option<PortFilter>,
    ) -> Result<Option<(Self, &[u8])>, Error> {
        let hdr = Self::decode(packet)?;

        if let Some(filter) = filter {
            if !filter.contains(hdr.src) && !filter.contains(hdr.dst) {
                trace!(
                    "UDP datagram {}->{} outside filter {}-{}",
                    hdr.src,
                    hdr.dst,
                    filter.lo,
                    filter.hi
                );

                return Ok(None);
            }
        }

        let len = hdr.len as usize;
        if len < Self::SIZE || packet.len() < len {
            Err(Error::DataUnderflow)?;
        }

        let packet = &packet[..len];

        Ok(Some((hdr.clone(), &packet[Self::SIZE..])))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn datagram(src: u16, dst: u16, payload: &[u8]) -> Vec<u8> {
        let len = (UdpPacketHeader::SIZE + payload.len()) as u16;

        let mut packet = Vec::new();
        packet.extend_from_slice(&src.to_be_bytes());
        packet.extend_from_slice(&dst.to_be_bytes());
        packet.extend_from_slice(&len.to_be_bytes());
        packet.extend_from_slice(&[0, 0]);
        packet.extend_from_slice(payload);
        packet
    }

    #[test]
    fn test_port_filter() {
        let filter = PortFilter::new(67, 68);

        let dhcp = datagram(68, 67, &[0xab]);
        let (hdr, payload) = UdpPacketHeader::decode_with_payload(&dhcp, Some(filter))
            .unwrap()
            .unwrap();
        assert_eq!((hdr.src, hdr.dst), (68, 67));
        assert_eq!(payload, &[0xab]);

        let dns = datagram(5353, 53, &[0xab]);
        assert!(UdpPacketHeader::decode_with_payload(&dns, Some(filter))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_truncated() {
        let mut dhcp = datagram(68, 67, &[1, 2, 3, 4]);
        dhcp.truncate(10);

        assert!(UdpPacketHeader::decode_with_payload(&dhcp, None).is_err());
    }
}
