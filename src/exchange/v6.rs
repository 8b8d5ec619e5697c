//! One full DHCPv6 negotiation: solicit → advertise → request → reply.

use std::io;
use std::net::{Ipv6Addr, SocketAddrV6, UdpSocket};
use std::time::Instant;

use log::trace;

use socket2::{Domain, Protocol, Socket, Type};

use netboot_dhcp::v6::{
    client::Client, status_name, DhcpOption, IaAddr, IaNa, Message, MessageType, OptionCodes,
    Options, NETBOOT_ORO, STATUS_SUCCESS,
};

use crate::conversation::Conversation;
use crate::link::InterfaceId;
use crate::Family;

use super::{ExchangeError, RetryPolicy};

pub(super) fn negotiate(
    iface: &InterfaceId,
    link_local: Ipv6Addr,
    policy: &RetryPolicy,
) -> Result<Conversation, (ExchangeError, Conversation)> {
    let mut conversation = Conversation::new(Family::V6);

    match negotiate_inner(iface, link_local, policy, &mut conversation) {
        Ok(()) => Ok(conversation),
        Err(error) => Err((error, conversation)),
    }
}

fn negotiate_inner(
    iface: &InterfaceId,
    link_local: Ipv6Addr,
    policy: &RetryPolicy,
    conversation: &mut Conversation,
) -> Result<(), ExchangeError> {
    let socket = bind_client_socket(iface, link_local, policy)?;
    let dest = SocketAddrV6::new(
        policy.v6.server_addr,
        policy.v6.server_port,
        0,
        iface.index,
    );

    let mut client = Client {
        rng: rand::thread_rng(),
        mac: iface.mac,
    };

    let duid = client.duid();
    let iaid = client.iaid();
    let started = Instant::now();

    let mut out = [0; 1500];
    let mut buf = [0; 1500];

    // SOLICIT
    let xid = client.next_xid();

    let options = [
        DhcpOption::ClientId(&duid),
        DhcpOption::ElapsedTime(0),
        DhcpOption::Oro(OptionCodes::new(NETBOOT_ORO)),
        DhcpOption::IaNa(IaNa {
            iaid,
            t1: 0,
            t2: 0,
            options: Options::new(&[]),
        }),
    ];
    let solicit = Message::new(MessageType::Solicit, xid, Options::new(&options));

    let data = solicit.encode(&mut out)?;
    conversation.push_sent(data);
    socket.send_to(data, dest)?;

    // ADVERTISE
    let deadline = Instant::now() + policy.timeout;
    let (server_id, addr) = recv_reply(
        &socket,
        &mut buf,
        deadline,
        "ADVERTISE",
        conversation,
        |message| {
            if !client.is_advertise(message, xid) {
                return None;
            }

            if let Some((code, msg)) = server_status(message) {
                if code != STATUS_SUCCESS {
                    return Some(Err(format!("{} ({})", status_name(code), msg)));
                }
            }

            let server_id = message.server_id()?.to_vec();
            let addr = message
                .ia_na()
                .and_then(|ia| ia.addresses().next())
                .map(|ia_addr| ia_addr.addr)?;

            Some(Ok((server_id, addr)))
        },
    )?
    .map_err(ExchangeError::Declined)?;

    // REQUEST
    let xid = client.next_xid();
    let elapsed = hundredths(started);

    let ia_options = [DhcpOption::IaAddr(IaAddr {
        addr,
        preferred_lifetime: 0,
        valid_lifetime: 0,
        options: Options::new(&[]),
    })];
    let options = [
        DhcpOption::ClientId(&duid),
        DhcpOption::ServerId(&server_id),
        DhcpOption::ElapsedTime(elapsed),
        DhcpOption::Oro(OptionCodes::new(NETBOOT_ORO)),
        DhcpOption::IaNa(IaNa {
            iaid,
            t1: 0,
            t2: 0,
            options: Options::new(&ia_options),
        }),
    ];
    let request = Message::new(MessageType::Request, xid, Options::new(&options));

    let data = request.encode(&mut out)?;
    conversation.push_sent(data);
    socket.send_to(data, dest)?;

    // REPLY
    let deadline = Instant::now() + policy.timeout;
    recv_reply(
        &socket,
        &mut buf,
        deadline,
        "REPLY",
        conversation,
        |message| {
            if !client.is_reply(message, xid) {
                return None;
            }

            match server_status(message) {
                Some((code, msg)) if code != STATUS_SUCCESS => {
                    Some(Err(format!("{} ({})", status_name(code), msg)))
                }
                _ => Some(Ok(())),
            }
        },
    )?
    .map_err(ExchangeError::Declined)
}

/// The server's verdict: a message-level status code, or failing that, the
/// status tucked into the IA_NA.
fn server_status(message: &Message<'_>) -> Option<(u16, String)> {
    message
        .status()
        .or_else(|| message.ia_na().and_then(|ia| ia.status()))
        .map(|(code, msg)| (code, msg.to_string()))
}

fn hundredths(started: Instant) -> u16 {
    u16::try_from(started.elapsed().as_millis() / 10).unwrap_or(u16::MAX)
}

fn recv_reply<T>(
    socket: &UdpSocket,
    buf: &mut [u8],
    deadline: Instant,
    want: &'static str,
    conversation: &mut Conversation,
    mut classify: impl FnMut(&Message<'_>) -> Option<T>,
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

        match Message::decode(&buf[..len]) {
            Ok(message) => {
                if let Some(value) = classify(&message) {
                    conversation.push_received(&buf[..len]);

                    return Ok(value);
                }

                trace!("ignoring {}", message);
            }
            Err(err) => trace!("ignoring undecodable datagram: {}", err),
        }
    }
}

fn bind_client_socket(
    iface: &InterfaceId,
    link_local: Ipv6Addr,
    policy: &RetryPolicy,
) -> Result<UdpSocket, ExchangeError> {
    let socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_reuse_address(true)?;
    socket.set_only_v6(true)?;
    socket.bind_device(Some(iface.name.as_bytes()))?;
    socket.bind(&SocketAddrV6::new(link_local, policy.v6.client_port, 0, iface.index).into())?;
    socket.set_multicast_if_v6(iface.index)?;

    Ok(socket.into())
}
