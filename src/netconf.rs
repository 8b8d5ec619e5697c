//! The canonical network configuration record and its extraction from a
//! finished conversation.

use core::fmt;

use std::net::{IpAddr, Ipv4Addr};

use thiserror::Error;

use netboot_dhcp::{v4, v6};

use crate::conversation::Conversation;
use crate::Family;

/// One address assignment, with the lifetimes the server attached to it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddrConf {
    pub address: IpAddr,
    pub prefix_len: u8,
    pub preferred_lifetime: Option<u32>,
    pub valid_lifetime: Option<u32>,
}

/// Netboot-specific fields. Optional: a plain address-assignment exchange
/// yields a record without them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootConf {
    /// Boot file path (v4) or URL (v6)
    pub file: String,
    pub server: Option<IpAddr>,
}

/// Canonical, family-agnostic result of a negotiation. Only ever observed
/// fully built: extraction either returns a complete record or an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetConf {
    pub addrs: Vec<AddrConf>,
    pub routers: Vec<IpAddr>,
    pub dns_servers: Vec<IpAddr>,
    pub dns_search_list: Vec<String>,
    pub boot: Option<BootConf>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("conversation contains no {0}")]
    IncompleteConversation(&'static str),

    #[error("{option} option is {reason}")]
    MalformedOption {
        option: &'static str,
        reason: &'static str,
    },
}

impl NetConf {
    /// Pure function over the conversation: same input, same record,
    /// however often it is called.
    pub fn from_conversation(conversation: &Conversation) -> Result<Self, ExtractError> {
        match conversation.family() {
            Family::V4 => extract_v4(conversation),
            Family::V6 => extract_v6(conversation),
        }
    }
}

impl fmt::Display for NetConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addrs=[")?;
        for (index, addr) in self.addrs.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }

            write!(f, "{}/{}", addr.address, addr.prefix_len)?;
        }
        write!(f, "]")?;

        if !self.routers.is_empty() {
            write!(f, " routers={:?}", self.routers)?;
        }

        if !self.dns_servers.is_empty() {
            write!(f, " dns={:?}", self.dns_servers)?;
        }

        if !self.dns_search_list.is_empty() {
            write!(f, " search={:?}", self.dns_search_list)?;
        }

        if let Some(boot) = &self.boot {
            write!(f, " bootfile={}", boot.file)?;

            if let Some(server) = boot.server {
                write!(f, " bootserver={}", server)?;
            }
        }

        Ok(())
    }
}

fn extract_v4(conversation: &Conversation) -> Result<NetConf, ExtractError> {
    // the terminal acknowledgment is the last ACK on the wire
    let mut ack = None;

    for envelope in conversation.messages() {
        if let Ok(packet) = v4::Packet::decode(&envelope.data) {
            if packet.reply && packet.message_type() == Some(v4::MessageType::Ack) {
                ack = Some(packet);
            }
        }
    }

    let ack = ack.ok_or(ExtractError::IncompleteConversation("DHCPACK"))?;

    if ack.yiaddr.is_unspecified() {
        return Err(ExtractError::MalformedOption {
            option: "assigned address",
            reason: "unspecified",
        });
    }

    let mask = ack
        .options
        .iter()
        .find_map(|option| {
            if let v4::DhcpOption::SubnetMask(mask) = option {
                Some(mask)
            } else {
                None
            }
        })
        .ok_or(ExtractError::MalformedOption {
            option: "subnet mask",
            reason: "missing",
        })?;

    let prefix_len = mask_to_prefix(mask).ok_or(ExtractError::MalformedOption {
        option: "subnet mask",
        reason: "not contiguous",
    })?;

    let lease = ack.options.iter().find_map(|option| {
        if let v4::DhcpOption::IpAddressLeaseTime(secs) = option {
            Some(secs)
        } else {
            None
        }
    });

    let mut netconf = NetConf {
        addrs: vec![AddrConf {
            address: ack.yiaddr.into(),
            prefix_len,
            preferred_lifetime: lease,
            valid_lifetime: lease,
        }],
        ..Default::default()
    };

    let mut boot_file = ack.boot_file().map(str::to_string);
    let mut boot_server: Option<IpAddr> = (!ack.siaddr.is_unspecified()).then(|| ack.siaddr.into());

    for option in ack.options.iter() {
        match option {
            v4::DhcpOption::Router(ips) => netconf.routers.extend(ips.iter().map(IpAddr::from)),
            v4::DhcpOption::DomainNameServer(ips) => {
                netconf.dns_servers.extend(ips.iter().map(IpAddr::from))
            }
            v4::DhcpOption::DomainName(name) => netconf.dns_search_list.push(name.to_string()),
            v4::DhcpOption::BootFileName(name) => boot_file = Some(name.to_string()),
            v4::DhcpOption::TftpServerName(name) => {
                // option 66 may hold an address or a hostname; only an
                // address beats the siaddr header field
                if let Ok(addr) = name.parse::<Ipv4Addr>() {
                    boot_server = Some(addr.into());
                }
            }
            _ => (),
        }
    }

    netconf.boot = boot_file.map(|file| BootConf {
        file,
        server: boot_server,
    });

    Ok(netconf)
}

fn extract_v6(conversation: &Conversation) -> Result<NetConf, ExtractError> {
    let mut reply = None;

    for envelope in conversation.messages() {
        if let Ok(message) = v6::Message::decode(&envelope.data) {
            if message.msg_type == v6::MessageType::Reply {
                reply = Some(message);
            }
        }
    }

    let reply = reply.ok_or(ExtractError::IncompleteConversation("REPLY"))?;

    let ia = reply.ia_na().ok_or(ExtractError::MalformedOption {
        option: "IA_NA",
        reason: "missing",
    })?;

    // IA_NA addresses carry no prefix on the wire; /64 matches how netboot
    // consumers expect the on-link prefix to look
    let addrs: Vec<_> = ia
        .addresses()
        .map(|addr| AddrConf {
            address: addr.addr.into(),
            prefix_len: 64,
            preferred_lifetime: Some(addr.preferred_lifetime),
            valid_lifetime: Some(addr.valid_lifetime),
        })
        .collect();

    if addrs.is_empty() {
        return Err(ExtractError::MalformedOption {
            option: "IA_NA",
            reason: "contains no addresses",
        });
    }

    let mut netconf = NetConf {
        addrs,
        ..Default::default()
    };

    for option in reply.options.iter() {
        match option {
            v6::DhcpOption::DnsServers(ips) => {
                netconf.dns_servers.extend(ips.iter().map(IpAddr::from))
            }
            v6::DhcpOption::DomainSearchList(data) => {
                let domains =
                    v6::parse_domains(data).map_err(|_| ExtractError::MalformedOption {
                        option: "domain search list",
                        reason: "invalid label data",
                    })?;

                netconf.dns_search_list.extend(domains);
            }
            v6::DhcpOption::BootFileUrl(url) => {
                netconf.boot = Some(BootConf {
                    file: url.to_string(),
                    server: None,
                })
            }
            _ => (),
        }
    }

    Ok(netconf)
}

fn mask_to_prefix(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);

    (bits.count_ones() == bits.leading_ones()).then(|| bits.count_ones() as u8)
}
