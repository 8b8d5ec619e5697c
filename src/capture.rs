//! The offline conversation decoder: replays captured DHCP traffic through
//! the same message codecs the live exchange uses.

use std::io::{Read, Write};

use log::{debug, trace};
use thiserror::Error;

use pcap_file::pcap::PcapReader;
use pcap_file::PcapError;

use netboot_dhcp::{v4, v6};
use netboot_raw::{frame_udp_decode, Encapsulation, IpVersion, PortFilter};

use crate::Family;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not read capture: {0}")]
    Read(#[from] PcapError),

    #[error("frame {index} is not decodable: {source}")]
    Frame {
        index: usize,
        source: netboot_raw::Error,
    },

    #[error("DHCP message in frame {index} is not decodable: {source}")]
    Message {
        index: usize,
        source: netboot_dhcp::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The client/server port range DHCP traffic of the family travels on
fn traffic_filter(family: Family) -> PortFilter {
    match family {
        Family::V4 => PortFilter::new(v4::DEFAULT_SERVER_PORT, v4::DEFAULT_CLIENT_PORT),
        Family::V6 => PortFilter::new(v6::DEFAULT_CLIENT_PORT, v6::DEFAULT_SERVER_PORT),
    }
}

/// Decodes every DHCP message of `family` found in a classic pcap capture,
/// writing one summary line per message to `out` in capture order.
///
/// Frames that are not DHCP traffic of the requested family are skipped.
/// End-of-capture ends the loop cleanly; a frame that matches the traffic
/// filter but does not decode is fatal. Returns the number of messages
/// decoded. With `dump` set, the raw UDP payload is written before each
/// summary.
pub fn decode_capture<R, W>(
    reader: R,
    family: Family,
    encap: Encapsulation,
    dump: bool,
    out: &mut W,
) -> Result<usize, CaptureError>
where
    R: Read,
    W: Write,
{
    let mut pcap = PcapReader::new(reader)?;

    debug!(
        "capture datalink {:?}, decoding as {:?}",
        pcap.header().datalink,
        encap
    );

    let version = match family {
        Family::V4 => IpVersion::V4,
        Family::V6 => IpVersion::V6,
    };
    let filter = traffic_filter(family);

    let mut index = 0;
    let mut decoded = 0;

    while let Some(record) = pcap.next_packet() {
        let record = record?;
        index += 1;

        let matched = frame_udp_decode(&record.data, encap, version, Some(filter))
            .map_err(|source| CaptureError::Frame { index, source })?;

        let Some((src, dst, payload)) = matched else {
            trace!("frame {}: not {} DHCP traffic, skipped", index, family);
            continue;
        };

        if dump {
            writeln!(out, "  [{} bytes] {:02x?}", payload.len(), payload)?;
        }

        let summary = match family {
            Family::V4 => v4::Packet::decode(payload).map(|packet| packet.to_string()),
            Family::V6 => v6::Message::decode(payload).map(|message| message.to_string()),
        }
        .map_err(|source| CaptureError::Message { index, source })?;

        writeln!(out, "{} -> {} {}", src, dst, summary)?;
        decoded += 1;
    }

    Ok(decoded)
}

#[cfg(test)]
mod test {
    use super::*;

    use std::io::Cursor;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    use pcap_file::pcap::{PcapPacket, PcapWriter};

    fn ipv4_frame(proto: u8, transport: &[u8]) -> Vec<u8> {
        let ip_len = 20 + transport.len() as u16;

        let mut frame = vec![
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // dst
            0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5, // src
            0x08, 0x00, // IPv4
        ];
        frame.extend_from_slice(&[0x45, 0x00]);
        frame.extend_from_slice(&ip_len.to_be_bytes());
        frame.extend_from_slice(&[0, 0, 0, 0, 0x40, proto, 0, 0]);
        frame.extend_from_slice(&[0, 0, 0, 0]); // 0.0.0.0
        frame.extend_from_slice(&[255, 255, 255, 255]);
        frame.extend_from_slice(transport);
        frame
    }

    fn udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
        let udp_len = 8 + payload.len() as u16;

        let mut transport = Vec::new();
        transport.extend_from_slice(&src_port.to_be_bytes());
        transport.extend_from_slice(&dst_port.to_be_bytes());
        transport.extend_from_slice(&udp_len.to_be_bytes());
        transport.extend_from_slice(&[0, 0]);
        transport.extend_from_slice(payload);

        ipv4_frame(17, &transport)
    }

    fn dhcp_payload(message_type: v4::MessageType, reply: bool) -> Vec<u8> {
        let options = [v4::DhcpOption::MessageType(message_type)];
        let mut packet = v4::Packet::new_request([0xaa; 6], 0x2a, 0, v4::Options::new(&options));
        packet.reply = reply;
        packet.yiaddr = Ipv4Addr::new(10, 0, 0, 5);

        let mut buf = [0; 1500];
        packet.encode(&mut buf).unwrap().to_vec()
    }

    fn capture(frames: &[Vec<u8>]) -> Vec<u8> {
        let mut pcap = PcapWriter::new(Vec::new()).unwrap();

        for frame in frames {
            pcap.write_packet(&PcapPacket::new(
                Duration::from_secs(0),
                frame.len() as u32,
                frame,
            ))
            .unwrap();
        }

        pcap.into_writer()
    }

    #[test]
    fn test_dhcp_frames_decoded_in_capture_order() {
        // two DHCPv4 frames and one unrelated TCP frame
        let capture = capture(&[
            udp_frame(68, 67, &dhcp_payload(v4::MessageType::Discover, false)),
            ipv4_frame(6, &[0x01, 0xbb, 0x00, 0x50, 0, 0, 0, 0]),
            udp_frame(67, 68, &dhcp_payload(v4::MessageType::Ack, true)),
        ]);

        let mut out = Vec::new();
        let decoded = decode_capture(
            Cursor::new(capture),
            Family::V4,
            Encapsulation::Ethernet,
            false,
            &mut out,
        )
        .unwrap();

        assert_eq!(decoded, 2);

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("DHCPDISCOVER"));
        assert!(lines[1].contains("DHCPACK"));
    }

    #[test]
    fn test_empty_capture() {
        let capture = capture(&[]);

        let mut out = Vec::new();
        let decoded = decode_capture(
            Cursor::new(capture),
            Family::V4,
            Encapsulation::Ethernet,
            false,
            &mut out,
        )
        .unwrap();

        assert_eq!(decoded, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_wrong_family_matches_nothing() {
        let capture = capture(&[udp_frame(
            68,
            67,
            &dhcp_payload(v4::MessageType::Discover, false),
        )]);

        let decoded = decode_capture(
            Cursor::new(capture),
            Family::V6,
            Encapsulation::Ethernet,
            false,
            &mut Vec::new(),
        )
        .unwrap();

        assert_eq!(decoded, 0);
    }

    #[test]
    fn test_undecodable_message_is_fatal() {
        // matches the port filter but carries garbage instead of DHCP
        let capture = capture(&[
            udp_frame(68, 67, &[0xde, 0xad, 0xbe, 0xef]),
            udp_frame(67, 68, &dhcp_payload(v4::MessageType::Ack, true)),
        ]);

        let err = decode_capture(
            Cursor::new(capture),
            Family::V4,
            Encapsulation::Ethernet,
            false,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(err, CaptureError::Message { index: 1, .. }));
    }

    #[test]
    fn test_truncated_capture_is_fatal() {
        let mut capture = capture(&[udp_frame(
            68,
            67,
            &dhcp_payload(v4::MessageType::Discover, false),
        )]);
        capture.truncate(capture.len() - 4);

        let err = decode_capture(
            Cursor::new(capture),
            Family::V4,
            Encapsulation::Ethernet,
            false,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(err, CaptureError::Read(_)));
    }
}
