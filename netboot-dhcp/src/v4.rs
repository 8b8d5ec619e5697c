//! DHCPv4 (RFC 2131/2132) message codec, including the BOOTP netboot
//! fields and options that PXE-style bootstrap clients care about.

use core::fmt;

pub use core::net::Ipv4Addr;

use num_enum::TryFromPrimitive;

use netboot_raw::bytes::{BytesIn, BytesOut};

use super::{EitherIterator, Error};

pub mod client;

pub const DEFAULT_SERVER_PORT: u16 = 67;
pub const DEFAULT_CLIENT_PORT: u16 = 68;

///
/// DHCP Message Type.
///
/// The semantics of the various DHCP message types are described in RFC 2131
/// (Table 2); their numeric values live in option 53 per RFC 2132 Section 9.6.
///
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum MessageType {
    /// Client broadcast to locate available servers.
    Discover = 1,

    /// Server to client in response to DHCPDISCOVER with offer of configuration parameters.
    Offer = 2,

    /// Client message to servers requesting offered parameters from one server and
    /// implicitly declining offers from all others.
    Request = 3,

    /// Client to server indicating network address is already in use.
    Decline = 4,

    /// Server to client with configuration parameters, including committed network address.
    Ack = 5,

    /// Server to client refusing the request.
    Nak = 6,

    /// Client to server relinquishing network address and cancelling remaining lease.
    Release = 7,

    /// Client to server, asking only for local configuration parameters.
    Inform = 8,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover => "DHCPDISCOVER",
            Self::Offer => "DHCPOFFER",
            Self::Request => "DHCPREQUEST",
            Self::Decline => "DHCPDECLINE",
            Self::Ack => "DHCPACK",
            Self::Nak => "DHCPNAK",
            Self::Release => "DHCPRELEASE",
            Self::Inform => "DHCPINFORM",
        }
        .fmt(f)
    }
}

/// DHCP Packet Structure
///
/// Unlike pure address-assignment clients, netboot needs the legacy BOOTP
/// `sname`/`file` header fields as well: servers without options 66/67
/// deliver the boot file path there.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Packet<'a> {
    pub reply: bool,
    pub hops: u8,
    pub xid: u32,
    pub secs: u16,
    pub broadcast: bool,
    pub ciaddr: Ipv4Addr,
    pub yiaddr: Ipv4Addr,
    pub siaddr: Ipv4Addr,
    pub giaddr: Ipv4Addr,
    pub chaddr: [u8; 16],
    pub sname: &'a [u8],
    pub file: &'a [u8],
    pub options: Options<'a>,
}

impl<'a> Packet<'a> {
    const COOKIE: [u8; 4] = [99, 130, 83, 99];

    const BOOT_REQUEST: u8 = 1; // From Client
    const BOOT_REPLY: u8 = 2; // From Server

    const SERVER_NAME_LEN: usize = 64;
    const FILE_NAME_LEN: usize = 128;

    const END: u8 = 255;
    const PAD: u8 = 0;

    pub fn new_request(mac: [u8; 6], xid: u32, secs: u16, options: Options<'a>) -> Self {
        let mut chaddr = [0; 16];
        chaddr[..6].copy_from_slice(&mac);

        Self {
            reply: false,
            hops: 0,
            xid,
            secs,
            broadcast: true,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr,
            sname: &[],
            file: &[],
            options,
        }
    }

    pub fn is_for_us(&self, mac: &[u8; 6], xid: u32) -> bool {
        const MAC_TRAILING_ZEROS: [u8; 10] = [0; 10];

        self.chaddr[0..6] == *mac
            && self.chaddr[6..16] == MAC_TRAILING_ZEROS
            && self.xid == xid
            && self.reply
    }

    pub fn message_type(&self) -> Option<MessageType> {
        self.options.iter().find_map(|option| {
            if let DhcpOption::MessageType(mt) = option {
                Some(mt)
            } else {
                None
            }
        })
    }

    /// The `sname` header field as a string, if non-empty
    pub fn server_name(&self) -> Option<&'a str> {
        nul_trimmed(self.sname)
    }

    /// The `file` header field as a string, if non-empty
    pub fn boot_file(&self) -> Option<&'a str> {
        nul_trimmed(self.file)
    }

    /// Parses the packet from a byte slice
    pub fn decode(data: &'a [u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        Ok(Self {
            reply: {
                let reply = bytes.byte()? == Self::BOOT_REPLY;
                let _htype = bytes.byte()?; // Hardware address type; 1 = 10Mb Ethernet
                let hlen = bytes.byte()?;

                if hlen != 6 {
                    Err(Error::InvalidHlen)?;
                }

                reply
            },
            hops: bytes.byte()?,
            xid: u32::from_be_bytes(bytes.arr()?),
            secs: u16::from_be_bytes(bytes.arr()?),
            broadcast: u16::from_be_bytes(bytes.arr()?) & 0x8000 != 0,
            ciaddr: bytes.arr()?.into(),
            yiaddr: bytes.arr()?.into(),
            siaddr: bytes.arr()?.into(),
            giaddr: bytes.arr()?.into(),
            chaddr: bytes.arr()?,
            sname: bytes.slice(Self::SERVER_NAME_LEN)?,
            file: bytes.slice(Self::FILE_NAME_LEN)?,
            options: {
                if bytes.arr()? != Self::COOKIE {
                    Err(Error::MissingCookie)?;
                }

                Options(OptionsInner::decode(bytes.remaining())?)
            },
        })
    }

    /// Encodes the packet into the provided buf slice
    pub fn encode<'o>(&self, buf: &'o mut [u8]) -> Result<&'o [u8], Error> {
        let mut bytes = BytesOut::new(buf);

        bytes
            .push(&[if self.reply {
                Self::BOOT_REPLY
            } else {
                Self::BOOT_REQUEST
            }])?
            .byte(1)?
            .byte(6)?
            .byte(self.hops)?
            .push(&u32::to_be_bytes(self.xid))?
            .push(&u16::to_be_bytes(self.secs))?
            .push(&u16::to_be_bytes(if self.broadcast { 0x8000 } else { 0 }))?
            .push(&self.ciaddr.octets())?
            .push(&self.yiaddr.octets())?
            .push(&self.siaddr.octets())?
            .push(&self.giaddr.octets())?
            .push(&self.chaddr)?;

        for (field, len) in [
            (self.sname, Self::SERVER_NAME_LEN),
            (self.file, Self::FILE_NAME_LEN),
        ] {
            if field.len() > len {
                Err(Error::BufferOverflow)?;
            }

            bytes.push(field)?;

            for _ in field.len()..len {
                bytes.byte(0)?;
            }
        }

        bytes.push(&Self::COOKIE)?;

        self.options.0.encode(&mut bytes)?;

        bytes.byte(Self::END)?;

        while bytes.len() < 272 {
            bytes.byte(Self::PAD)?;
        }

        let len = bytes.len();

        Ok(&buf[..len])
    }
}

impl fmt::Display for Packet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message_type() {
            Some(mt) => write!(f, "{}", mt)?,
            None if self.reply => write!(f, "BOOTREPLY")?,
            None => write!(f, "BOOTREQUEST")?,
        }

        write!(f, " xid=0x{:08x}", self.xid)?;

        if !self.yiaddr.is_unspecified() {
            write!(f, " yiaddr={}", self.yiaddr)?;
        }

        if !self.siaddr.is_unspecified() {
            write!(f, " siaddr={}", self.siaddr)?;
        }

        for option in self.options.iter() {
            match option {
                DhcpOption::RequestedIpAddress(ip) => write!(f, " requested={}", ip)?,
                DhcpOption::ServerIdentifier(ip) => write!(f, " server={}", ip)?,
                DhcpOption::SubnetMask(mask) => write!(f, " subnet={}", mask)?,
                DhcpOption::Router(ips) => write_addrs(f, "router", &ips)?,
                DhcpOption::DomainNameServer(ips) => write_addrs(f, "dns", &ips)?,
                DhcpOption::IpAddressLeaseTime(secs) => write!(f, " lease={}s", secs)?,
                DhcpOption::DomainName(name) => write!(f, " domain={}", name)?,
                DhcpOption::TftpServerName(name) => write!(f, " tftp={}", name)?,
                DhcpOption::BootFileName(name) => write!(f, " bootfile={}", name)?,
                DhcpOption::Message(msg) => write!(f, " message={:?}", msg)?,
                _ => (),
            }
        }

        if let Some(file) = self.boot_file() {
            write!(f, " file={}", file)?;
        }

        Ok(())
    }
}

fn write_addrs(f: &mut fmt::Formatter<'_>, label: &str, addrs: &Ipv4Addrs<'_>) -> fmt::Result {
    write!(f, " {}=[", label)?;

    for (index, addr) in addrs.iter().enumerate() {
        if index > 0 {
            write!(f, " ")?;
        }

        write!(f, "{}", addr)?;
    }

    write!(f, "]")
}

fn nul_trimmed(field: &[u8]) -> Option<&str> {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());

    if end == 0 {
        None
    } else {
        core::str::from_utf8(&field[..end]).ok()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Options<'a>(OptionsInner<'a>);

impl<'a> Options<'a> {
    /// What a bootstrap client asks the server to fill in: basic IP
    /// configuration plus the netboot-class options (66/67).
    const REQUEST_PARAMS: &'static [u8] = &[
        DhcpOption::CODE_SUBNET,
        DhcpOption::CODE_ROUTER,
        DhcpOption::CODE_DNS,
        DhcpOption::CODE_DOMAIN_NAME,
        DhcpOption::CODE_TFTP_SERVER,
        DhcpOption::CODE_BOOT_FILE,
    ];

    pub const fn new(options: &'a [DhcpOption<'a>]) -> Self {
        Self(OptionsInner::DataSlice(options))
    }

    #[inline(always)]
    pub const fn buf() -> [DhcpOption<'a>; 8] {
        [DhcpOption::Message(""); 8]
    }

    pub fn discover(requested_ip: Option<Ipv4Addr>, buf: &'a mut [DhcpOption<'a>]) -> Self {
        buf[0] = DhcpOption::MessageType(MessageType::Discover);
        buf[1] = DhcpOption::ParameterRequestList(Self::REQUEST_PARAMS);

        let mut offset = 2;

        if let Some(requested_ip) = requested_ip {
            buf[2] = DhcpOption::RequestedIpAddress(requested_ip);
            offset += 1;
        }

        Self::new(&buf[..offset])
    }

    pub fn request(ip: Ipv4Addr, server_ip: Ipv4Addr, buf: &'a mut [DhcpOption<'a>]) -> Self {
        buf[0] = DhcpOption::MessageType(MessageType::Request);
        buf[1] = DhcpOption::RequestedIpAddress(ip);
        buf[2] = DhcpOption::ServerIdentifier(server_ip);
        buf[3] = DhcpOption::ParameterRequestList(Self::REQUEST_PARAMS);

        Self::new(&buf[..4])
    }

    pub fn iter(&self) -> impl Iterator<Item = DhcpOption<'a>> + 'a {
        self.0.iter()
    }
}

impl fmt::Debug for Options<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum OptionsInner<'a> {
    ByteSlice(&'a [u8]),
    DataSlice(&'a [DhcpOption<'a>]),
}

impl<'a> OptionsInner<'a> {
    fn decode(data: &'a [u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        while DhcpOption::decode(&mut bytes)?.is_some() {}

        Ok(Self::ByteSlice(data))
    }

    fn encode(&self, buf: &mut BytesOut) -> Result<(), Error> {
        for option in self.iter() {
            option.encode(buf)?;
        }

        Ok(())
    }

    fn iter(&self) -> impl Iterator<Item = DhcpOption<'a>> + 'a {
        struct ByteSliceDhcpOptions<'a>(BytesIn<'a>);

        impl<'a> Iterator for ByteSliceDhcpOptions<'a> {
            type Item = DhcpOption<'a>;

            fn next(&mut self) -> Option<Self::Item> {
                if self.0.is_empty() {
                    None
                } else {
                    // The options block was validated when it was decoded
                    DhcpOption::decode(&mut self.0).ok().flatten()
                }
            }
        }

        match self {
            Self::ByteSlice(data) => {
                EitherIterator::First(ByteSliceDhcpOptions(BytesIn::new(data)))
            }
            Self::DataSlice(data) => EitherIterator::Second(data.iter().cloned()),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DhcpOption<'a> {
    /// 53: DHCP Message Type
    MessageType(MessageType),
    /// 54: Server Identifier
    ServerIdentifier(Ipv4Addr),
    /// 55: Parameter Request List
    ParameterRequestList(&'a [u8]),
    /// 50: Requested IP Address
    RequestedIpAddress(Ipv4Addr),
    /// 12: Host Name Option
    HostName(&'a str),
    /// 3: Router Option
    Router(Ipv4Addrs<'a>),
    /// 6: Domain Name Server Option
    DomainNameServer(Ipv4Addrs<'a>),
    /// 51: IP Address Lease Time
    IpAddressLeaseTime(u32),
    /// 1: Subnet Mask
    SubnetMask(Ipv4Addr),
    /// 15: Domain Name
    DomainName(&'a str),
    /// 56: Message
    Message(&'a str),
    /// 57: Maximum DHCP Message Size
    MaximumMessageSize(u16),
    /// 61: Client-identifier
    ClientIdentifier(&'a [u8]),
    /// 66: TFTP Server Name
    TftpServerName(&'a str),
    /// 67: Bootfile Name
    BootFileName(&'a str),
    // Other (unrecognized)
    Unrecognized(u8, &'a [u8]),
}

impl DhcpOption<'_> {
    pub const CODE_SUBNET: u8 = DhcpOption::SubnetMask(Ipv4Addr::UNSPECIFIED).code();
    pub const CODE_ROUTER: u8 = DhcpOption::Router(Ipv4Addrs::new(&[])).code();
    pub const CODE_DNS: u8 = DhcpOption::DomainNameServer(Ipv4Addrs::new(&[])).code();
    pub const CODE_DOMAIN_NAME: u8 = DhcpOption::DomainName("").code();
    pub const CODE_TFTP_SERVER: u8 = DhcpOption::TftpServerName("").code();
    pub const CODE_BOOT_FILE: u8 = DhcpOption::BootFileName("").code();

    fn decode<'o>(bytes: &mut BytesIn<'o>) -> Result<Option<DhcpOption<'o>>, Error> {
        loop {
            if bytes.is_empty() {
                return Ok(None);
            }

            let code = bytes.byte()?;
            if code == Packet::END {
                return Ok(None);
            } else if code == Packet::PAD {
                continue;
            }

            let len = bytes.byte()? as usize;
            let mut bytes = BytesIn::new(bytes.slice(len)?);

            let option = match code {
                DHCP_MESSAGE_TYPE => DhcpOption::MessageType(
                    TryFromPrimitive::try_from_primitive(bytes.remaining_byte()?)
                        .map_err(|_| Error::InvalidMessageType)?,
                ),
                SERVER_IDENTIFIER => {
                    DhcpOption::ServerIdentifier(Ipv4Addr::from(bytes.remaining_arr()?))
                }
                PARAMETER_REQUEST_LIST => DhcpOption::ParameterRequestList(bytes.remaining()),
                REQUESTED_IP_ADDRESS => {
                    DhcpOption::RequestedIpAddress(Ipv4Addr::from(bytes.remaining_arr()?))
                }
                HOST_NAME => DhcpOption::HostName(
                    core::str::from_utf8(bytes.remaining()).map_err(Error::InvalidUtf8Str)?,
                ),
                MAXIMUM_DHCP_MESSAGE_SIZE => {
                    DhcpOption::MaximumMessageSize(u16::from_be_bytes(bytes.remaining_arr()?))
                }
                ROUTER => {
                    DhcpOption::Router(Ipv4Addrs(Ipv4AddrsInner::ByteSlice(bytes.remaining())))
                }
                DOMAIN_NAME_SERVER => DhcpOption::DomainNameServer(Ipv4Addrs(
                    Ipv4AddrsInner::ByteSlice(bytes.remaining()),
                )),
                IP_ADDRESS_LEASE_TIME => {
                    DhcpOption::IpAddressLeaseTime(u32::from_be_bytes(bytes.remaining_arr()?))
                }
                SUBNET_MASK => DhcpOption::SubnetMask(Ipv4Addr::from(bytes.remaining_arr()?)),
                DOMAIN_NAME => DhcpOption::DomainName(
                    core::str::from_utf8(bytes.remaining()).map_err(Error::InvalidUtf8Str)?,
                ),
                MESSAGE => DhcpOption::Message(
                    core::str::from_utf8(bytes.remaining()).map_err(Error::InvalidUtf8Str)?,
                ),
                CLIENT_IDENTIFIER => {
                    if len < 2 {
                        return Err(Error::DataUnderflow);
                    }

                    DhcpOption::ClientIdentifier(bytes.remaining())
                }
                TFTP_SERVER_NAME => DhcpOption::TftpServerName(
                    core::str::from_utf8(bytes.remaining()).map_err(Error::InvalidUtf8Str)?,
                ),
                BOOT_FILE_NAME => DhcpOption::BootFileName(
                    core::str::from_utf8(bytes.remaining()).map_err(Error::InvalidUtf8Str)?,
                ),
                _ => DhcpOption::Unrecognized(code, bytes.remaining()),
            };

            return Ok(Some(option));
        }
    }

    fn encode(&self, out: &mut BytesOut) -> Result<(), Error> {
        out.byte(self.code())?;

        self.data(|data| {
            out.byte(data.len() as _)?;
            out.push(data)?;

            Ok(())
        })
    }

    pub const fn code(&self) -> u8 {
        match self {
            Self::MessageType(_) => DHCP_MESSAGE_TYPE,
            Self::ServerIdentifier(_) => SERVER_IDENTIFIER,
            Self::ParameterRequestList(_) => PARAMETER_REQUEST_LIST,
            Self::RequestedIpAddress(_) => REQUESTED_IP_ADDRESS,
            Self::HostName(_) => HOST_NAME,
            Self::Router(_) => ROUTER,
            Self::DomainNameServer(_) => DOMAIN_NAME_SERVER,
            Self::IpAddressLeaseTime(_) => IP_ADDRESS_LEASE_TIME,
            Self::SubnetMask(_) => SUBNET_MASK,
            Self::DomainName(_) => DOMAIN_NAME,
            Self::Message(_) => MESSAGE,
            Self::MaximumMessageSize(_) => MAXIMUM_DHCP_MESSAGE_SIZE,
            Self::ClientIdentifier(_) => CLIENT_IDENTIFIER,
            Self::TftpServerName(_) => TFTP_SERVER_NAME,
            Self::BootFileName(_) => BOOT_FILE_NAME,
            Self::Unrecognized(code, _) => *code,
        }
    }

    fn data(&self, mut f: impl FnMut(&[u8]) -> Result<(), Error>) -> Result<(), Error> {
        match self {
            Self::MessageType(mtype) => f(&[*mtype as _]),
            Self::ServerIdentifier(addr) => f(&addr.octets()),
            Self::ParameterRequestList(prl) => f(prl),
            Self::RequestedIpAddress(addr) => f(&addr.octets()),
            Self::HostName(name) => f(name.as_bytes()),
            Self::Router(addrs) | Self::DomainNameServer(addrs) => {
                for addr in addrs.iter() {
                    f(&addr.octets())?;
                }

                Ok(())
            }
            Self::IpAddressLeaseTime(secs) => f(&secs.to_be_bytes()),
            Self::SubnetMask(mask) => f(&mask.octets()),
            Self::DomainName(name) => f(name.as_bytes()),
            Self::Message(msg) => f(msg.as_bytes()),
            Self::MaximumMessageSize(size) => f(&size.to_be_bytes()),
            Self::ClientIdentifier(id) => f(id),
            Self::TftpServerName(name) => f(name.as_bytes()),
            Self::BootFileName(name) => f(name.as_bytes()),
            Self::Unrecognized(_, data) => f(data),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Ipv4Addrs<'a>(Ipv4AddrsInner<'a>);

impl<'a> Ipv4Addrs<'a> {
    pub const fn new(addrs: &'a [Ipv4Addr]) -> Self {
        Self(Ipv4AddrsInner::DataSlice(addrs))
    }

    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + 'a {
        self.0.iter()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Ipv4AddrsInner<'a> {
    ByteSlice(&'a [u8]),
    DataSlice(&'a [Ipv4Addr]),
}

impl<'a> Ipv4AddrsInner<'a> {
    fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + 'a {
        match *self {
            Self::ByteSlice(data) => {
                EitherIterator::First((0..data.len() / 4).map(move |index| {
                    let offset = index * 4;
                    let octets: [u8; 4] = [
                        data[offset],
                        data[offset + 1],
                        data[offset + 2],
                        data[offset + 3],
                    ];

                    octets.into()
                }))
            }
            Self::DataSlice(data) => EitherIterator::Second(data.iter().cloned()),
        }
    }
}

// DHCP Options
const SUBNET_MASK: u8 = 1;
const ROUTER: u8 = 3;
const DOMAIN_NAME_SERVER: u8 = 6;
const HOST_NAME: u8 = 12;
const DOMAIN_NAME: u8 = 15;

// DHCP Extensions
const REQUESTED_IP_ADDRESS: u8 = 50;
const IP_ADDRESS_LEASE_TIME: u8 = 51;
const DHCP_MESSAGE_TYPE: u8 = 53;
const SERVER_IDENTIFIER: u8 = 54;
const PARAMETER_REQUEST_LIST: u8 = 55;
const MESSAGE: u8 = 56;
const MAXIMUM_DHCP_MESSAGE_SIZE: u8 = 57;
const CLIENT_IDENTIFIER: u8 = 61;
const TFTP_SERVER_NAME: u8 = 66;
const BOOT_FILE_NAME: u8 = 67;

#[cfg(test)]
mod test {
    use super::*;

    fn ack_packet(buf: &mut [u8]) -> usize {
        let routers = [Ipv4Addr::new(10, 0, 0, 1)];
        let dns_servers = [Ipv4Addr::new(8, 8, 8, 8)];
        let options = [
            DhcpOption::MessageType(MessageType::Ack),
            DhcpOption::ServerIdentifier(Ipv4Addr::new(10, 0, 0, 1)),
            DhcpOption::SubnetMask(Ipv4Addr::new(255, 255, 255, 0)),
            DhcpOption::Router(Ipv4Addrs::new(&routers)),
            DhcpOption::DomainNameServer(Ipv4Addrs::new(&dns_servers)),
            DhcpOption::IpAddressLeaseTime(3600),
            DhcpOption::BootFileName("pxelinux.0"),
        ];

        let mut packet = Packet::new_request([0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5], 0x2a, 0, Options::new(&options));
        packet.reply = true;
        packet.yiaddr = Ipv4Addr::new(10, 0, 0, 5);

        packet.encode(buf).unwrap().len()
    }

    #[test]
    fn test_decode_ack() {
        let mut buf = [0; 1500];
        let len = ack_packet(&mut buf);

        let packet = Packet::decode(&buf[..len]).unwrap();

        assert!(packet.reply);
        assert_eq!(packet.xid, 0x2a);
        assert_eq!(packet.yiaddr, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(packet.message_type(), Some(MessageType::Ack));

        let subnet = packet.options.iter().find_map(|option| {
            if let DhcpOption::SubnetMask(mask) = option {
                Some(mask)
            } else {
                None
            }
        });
        assert_eq!(subnet, Some(Ipv4Addr::new(255, 255, 255, 0)));

        let bootfile = packet.options.iter().find_map(|option| {
            if let DhcpOption::BootFileName(name) = option {
                Some(name)
            } else {
                None
            }
        });
        assert_eq!(bootfile, Some("pxelinux.0"));
    }

    #[test]
    fn test_summary() {
        let mut buf = [0; 1500];
        let len = ack_packet(&mut buf);

        let packet = Packet::decode(&buf[..len]).unwrap();
        let summary = packet.to_string();

        assert!(summary.starts_with("DHCPACK xid=0x0000002a yiaddr=10.0.0.5"));
        assert!(summary.contains("subnet=255.255.255.0"));
        assert!(summary.contains("router=[10.0.0.1]"));
        assert!(summary.contains("dns=[8.8.8.8]"));
        assert!(summary.contains("bootfile=pxelinux.0"));
        assert!(!summary.contains('\n'));
    }

    #[test]
    fn test_header_boot_fields() {
        let mut buf = [0; 1500];

        let mut packet = Packet::new_request([0; 6], 1, 0, Options::new(&[]));
        packet.sname = b"tftp.example.org";
        packet.file = b"boot/vmlinuz";

        let len = packet.encode(&mut buf).unwrap().len();
        let decoded = Packet::decode(&buf[..len]).unwrap();

        assert_eq!(decoded.server_name(), Some("tftp.example.org"));
        assert_eq!(decoded.boot_file(), Some("boot/vmlinuz"));
    }

    #[test]
    fn test_discover_options() {
        let mut opt_buf = Options::buf();
        let options = Options::discover(None, &mut opt_buf);

        let codes: Vec<_> = options.iter().map(|option| option.code()).collect();
        assert_eq!(codes, [DHCP_MESSAGE_TYPE, PARAMETER_REQUEST_LIST]);

        let params = options.iter().find_map(|option| {
            if let DhcpOption::ParameterRequestList(params) = option {
                Some(params.to_vec())
            } else {
                None
            }
        });
        assert!(params.unwrap().contains(&BOOT_FILE_NAME));
    }
}
