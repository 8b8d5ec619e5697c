//! One full DHCPv4 negotiation: discover → offer → request → ack.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::time::Instant;

use log::trace;

use socket2::{Domain, Protocol, Socket, Type};

use netboot_dhcp::v4::{
    client::Client, DhcpOption, Options, Packet, DEFAULT_CLIENT_PORT, DEFAULT_SERVER_PORT,
};

use crate::conversation::Conversation;
use crate::link::InterfaceId;
use crate::Family;

use super::{ExchangeError, RetryPolicy};

pub(super) fn negotiate(
    iface: &InterfaceId,
    policy: &RetryPolicy,
) -> Result<Conversation, (ExchangeError, Conversation)> {
    let mut conversation = Conversation::new(Family::V4);

    match negotiate_inner(iface, policy, &mut conversation) {
        Ok(()) => Ok(conversation),
        Err(error) => Err((error, conversation)),
    }
}

fn negotiate_inner(
    iface: &InterfaceId,
    policy: &RetryPolicy,
    conversation: &mut Conversation,
) -> Result<(), ExchangeError> {
    // The socket lives exactly as long as this attempt
    let socket = bind_client_socket(iface)?;

    let mut client = Client {
        rng: rand::thread_rng(),
        mac: iface.mac,
    };

    let started = Instant::now();

    let mut out = [0; 1500];
    let mut buf = [0; 1500];

    // DISCOVER
    let mut opt_buf = Options::buf();
    let (discover, xid) = client.discover(&mut opt_buf, 0, None);

    let data = discover.encode(&mut out)?;
    conversation.push_sent(data);
    socket.send_to(data, (Ipv4Addr::BROADCAST, DEFAULT_SERVER_PORT))?;

    // OFFER
    let deadline = Instant::now() + policy.timeout;
    let (offer_ip, server_ip) = recv_reply(
        &socket,
        &mut buf,
        deadline,
        "DHCPOFFER",
        conversation,
        |packet| {
            client.is_offer(packet, xid).then(|| {
                let server = packet.options.iter().find_map(|option| {
                    if let DhcpOption::ServerIdentifier(ip) = option {
                        Some(ip)
                    } else {
                        None
                    }
                });

                (packet.yiaddr, server.unwrap_or(packet.siaddr))
            })
        },
    )?;

    // REQUEST
    let secs = started.elapsed().as_secs().min(u16::MAX as u64) as u16;

    let mut opt_buf = Options::buf();
    let (request, xid) = client.request(&mut opt_buf, secs, offer_ip, server_ip);

    let data = request.encode(&mut out)?;
    conversation.push_sent(data);
    socket.send_to(data, (Ipv4Addr::BROADCAST, DEFAULT_SERVER_PORT))?;

    // ACK or NAK
    let deadline = Instant::now() + policy.timeout;
    recv_reply(
        &socket,
        &mut buf,
        deadline,
        "DHCPACK",
        conversation,
        |packet| {
            if client.is_ack(packet, xid) {
                Some(Ok(()))
            } else if client.is_nak(packet, xid) {
                let reason = packet.options.iter().find_map(|option| {
                    if let DhcpOption::Message(msg) = option {
                        Some(msg.to_string())
                    } else {
                        None
                    }
                });

                Some(Err(reason.unwrap_or_else(|| "DHCPNAK".to_string())))
            } else {
                None
            }
        },
    )?
    .map_err(ExchangeError::Declined)
}

/// Receives datagrams until `classify` accepts one or `deadline` passes.
/// The accepted message is recorded in the conversation; foreign or
/// undecodable broadcast traffic is skipped silently.
fn recv_reply<T>(
    socket: &UdpSocket,
    buf: &mut [u8],
    deadline: Instant,
    want: &'static str,
    conversation: &mut Conversation,
    mut classify: impl FnMut(&Packet<'_>) -> Option<T>,
) -> Result<T, ExchangeError> {
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .filter(|remaining| !remaining.is_zero())
            .ok_or(ExchangeError::NoResponse(want))?;

        socket.set_read_timeout(Some(remaining))?;

        let len = match socket.recv_from(buf) {
            Ok((len, _)) => len,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                return Err(ExchangeError::NoResponse(want))
            }
            Err(err) => return Err(err.into()),
        };

        match Packet::decode(&buf[..len]) {
            Ok(packet) => {
                if let Some(value) = classify(&packet) {
                    conversation.push_received(&buf[..len]);

                    return Ok(value);
                }

                trace!("ignoring {}", packet);
            }
            Err(err) => trace!("ignoring undecodable datagram: {}", err),
        }
    }
}

fn bind_client_socket(iface: &InterfaceId) -> Result<UdpSocket, ExchangeError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_reuse_address(true)?;
    socket.set_broadcast(true)?;
    socket.bind_device(Some(iface.name.as_bytes()))?;
    socket.bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_CLIENT_PORT).into())?;

    Ok(socket.into())
}
