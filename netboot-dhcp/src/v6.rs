//! DHCPv6 (RFC 8415) message codec, covering the stateful
//! solicit/advertise/request/reply cycle plus the netboot options from
//! RFC 3646 (DNS), RFC 3898-style domain lists and RFC 5970 (boot file).

use core::fmt;

pub use core::net::Ipv6Addr;

use num_enum::TryFromPrimitive;

use netboot_raw::bytes::{BytesIn, BytesOut};

use super::{EitherIterator, Error};

pub mod client;

pub const DEFAULT_SERVER_PORT: u16 = 547;
pub const DEFAULT_CLIENT_PORT: u16 = 546;

/// All_DHCP_Relay_Agents_and_Servers (RFC 8415 Section 7.1)
pub const ALL_RELAY_AGENTS_AND_SERVERS: Ipv6Addr =
    Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0x0001, 0x0002);

#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum MessageType {
    Solicit = 1,
    Advertise = 2,
    Request = 3,
    Confirm = 4,
    Renew = 5,
    Rebind = 6,
    Reply = 7,
    Release = 8,
    Decline = 9,
    Reconfigure = 10,
    InformationRequest = 11,
    RelayForw = 12,
    RelayRepl = 13,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solicit => "SOLICIT",
            Self::Advertise => "ADVERTISE",
            Self::Request => "REQUEST",
            Self::Confirm => "CONFIRM",
            Self::Renew => "RENEW",
            Self::Rebind => "REBIND",
            Self::Reply => "REPLY",
            Self::Release => "RELEASE",
            Self::Decline => "DECLINE",
            Self::Reconfigure => "RECONFIGURE",
            Self::InformationRequest => "INFORMATION-REQUEST",
            Self::RelayForw => "RELAY-FORW",
            Self::RelayRepl => "RELAY-REPL",
        }
        .fmt(f)
    }
}

/// DHCPv6 Message Structure
///
/// The transaction id is 24 bits on the wire; only the low three bytes of
/// `xid` are encoded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message<'a> {
    pub msg_type: MessageType,
    pub xid: u32,
    pub options: Options<'a>,
}

impl<'a> Message<'a> {
    pub const fn new(msg_type: MessageType, xid: u32, options: Options<'a>) -> Self {
        Self {
            msg_type,
            xid,
            options,
        }
    }

    /// Parses the message from a byte slice
    pub fn decode(data: &'a [u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        Ok(Self {
            msg_type: TryFromPrimitive::try_from_primitive(bytes.byte()?)
                .map_err(|_| Error::InvalidMessageType)?,
            xid: {
                let xid: [u8; 3] = bytes.arr()?;

                u32::from_be_bytes([0, xid[0], xid[1], xid[2]])
            },
            options: Options(OptionsInner::decode(bytes.remaining())?),
        })
    }

    /// Encodes the message into the provided buf slice
    pub fn encode<'o>(&self, buf: &'o mut [u8]) -> Result<&'o [u8], Error> {
        let mut bytes = BytesOut::new(buf);

        bytes
            .byte(self.msg_type as u8)?
            .push(&u32::to_be_bytes(self.xid)[1..])?;

        self.options.0.encode(&mut bytes)?;

        let len = bytes.len();

        Ok(&buf[..len])
    }

    pub fn client_id(&self) -> Option<&'a [u8]> {
        self.options.iter().find_map(|option| {
            if let DhcpOption::ClientId(id) = option {
                Some(id)
            } else {
                None
            }
        })
    }

    pub fn server_id(&self) -> Option<&'a [u8]> {
        self.options.iter().find_map(|option| {
            if let DhcpOption::ServerId(id) = option {
                Some(id)
            } else {
                None
            }
        })
    }

    pub fn ia_na(&self) -> Option<IaNa<'a>> {
        self.options.iter().find_map(|option| {
            if let DhcpOption::IaNa(ia) = option {
                Some(ia)
            } else {
                None
            }
        })
    }

    /// The message-level status code, if the server attached one
    pub fn status(&self) -> Option<(u16, &'a str)> {
        self.options.iter().find_map(|option| {
            if let DhcpOption::StatusCode(code, msg) = option {
                Some((code, msg))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} xid=0x{:06x}", self.msg_type, self.xid)?;

        for option in self.options.iter() {
            match option {
                DhcpOption::ClientId(id) => write!(f, " client-id={}", HexSlice(id))?,
                DhcpOption::ServerId(id) => write!(f, " server-id={}", HexSlice(id))?,
                DhcpOption::IaNa(ia) => {
                    write!(f, " ia_na{{iaid=0x{:08x}", ia.iaid)?;

                    for addr in ia.addresses() {
                        write!(
                            f,
                            " addr={} pltime={} vltime={}",
                            addr.addr, addr.preferred_lifetime, addr.valid_lifetime
                        )?;
                    }

                    if let Some((code, msg)) = ia.status() {
                        write!(f, " status={}({})", status_name(code), msg)?;
                    }

                    write!(f, "}}")?;
                }
                DhcpOption::Oro(codes) => {
                    write!(f, " oro=[")?;

                    for (index, code) in codes.iter().enumerate() {
                        if index > 0 {
                            write!(f, " ")?;
                        }

                        write!(f, "{}", code)?;
                    }

                    write!(f, "]")?;
                }
                DhcpOption::Preference(pref) => write!(f, " preference={}", pref)?,
                DhcpOption::ElapsedTime(time) => write!(f, " elapsed={}", time)?,
                DhcpOption::StatusCode(code, msg) => {
                    write!(f, " status={}({})", status_name(code), msg)?
                }
                DhcpOption::RapidCommit => write!(f, " rapid-commit")?,
                DhcpOption::DnsServers(addrs) => {
                    write!(f, " dns=[")?;

                    for (index, addr) in addrs.iter().enumerate() {
                        if index > 0 {
                            write!(f, " ")?;
                        }

                        write!(f, "{}", addr)?;
                    }

                    write!(f, "]")?;
                }
                DhcpOption::DomainSearchList(data) => {
                    write!(f, " search=[")?;

                    if let Ok(domains) = parse_domains(data) {
                        for (index, domain) in domains.iter().enumerate() {
                            if index > 0 {
                                write!(f, " ")?;
                            }

                            write!(f, "{}", domain)?;
                        }
                    }

                    write!(f, "]")?;
                }
                DhcpOption::BootFileUrl(url) => write!(f, " bootfile-url={}", url)?,
                DhcpOption::BootFileParam(_) => write!(f, " bootfile-param")?,
                _ => (),
            }
        }

        Ok(())
    }
}

struct HexSlice<'a>(&'a [u8]);

impl fmt::Display for HexSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}

// RFC 8415 Section 21.13
pub const STATUS_SUCCESS: u16 = 0;
pub const STATUS_NO_ADDRS_AVAIL: u16 = 2;

pub fn status_name(code: u16) -> &'static str {
    match code {
        0 => "Success",
        1 => "UnspecFail",
        2 => "NoAddrsAvail",
        3 => "NoBinding",
        4 => "NotOnLink",
        5 => "UseMulticast",
        6 => "NoPrefixAvail",
        _ => "Unknown",
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Options<'a>(OptionsInner<'a>);

impl<'a> Options<'a> {
    pub const fn new(options: &'a [DhcpOption<'a>]) -> Self {
        Self(OptionsInner::DataSlice(options))
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

    fn encoded_len(&self) -> usize {
        self.iter().map(|option| 4 + option.data_len()).sum()
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

/// Identity Association for Non-temporary Addresses (RFC 8415 Section 21.4)
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IaNa<'a> {
    pub iaid: u32,
    pub t1: u32,
    pub t2: u32,
    pub options: Options<'a>,
}

impl<'a> IaNa<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        Ok(Self {
            iaid: u32::from_be_bytes(bytes.arr()?),
            t1: u32::from_be_bytes(bytes.arr()?),
            t2: u32::from_be_bytes(bytes.arr()?),
            options: Options(OptionsInner::decode(bytes.remaining())?),
        })
    }

    pub fn addresses(&self) -> impl Iterator<Item = IaAddr<'a>> + 'a {
        self.options.iter().filter_map(|option| {
            if let DhcpOption::IaAddr(addr) = option {
                Some(addr)
            } else {
                None
            }
        })
    }

    pub fn status(&self) -> Option<(u16, &'a str)> {
        self.options.iter().find_map(|option| {
            if let DhcpOption::StatusCode(code, msg) = option {
                Some((code, msg))
            } else {
                None
            }
        })
    }
}

/// IA Address option, nested inside an IA_NA (RFC 8415 Section 21.6)
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IaAddr<'a> {
    pub addr: Ipv6Addr,
    pub preferred_lifetime: u32,
    pub valid_lifetime: u32,
    pub options: Options<'a>,
}

impl<'a> IaAddr<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self, Error> {
        let mut bytes = BytesIn::new(data);

        Ok(Self {
            addr: bytes.arr::<16>()?.into(),
            preferred_lifetime: u32::from_be_bytes(bytes.arr()?),
            valid_lifetime: u32::from_be_bytes(bytes.arr()?),
            options: Options(OptionsInner::decode(bytes.remaining())?),
        })
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DhcpOption<'a> {
    /// 1: Client Identifier (DUID)
    ClientId(&'a [u8]),
    /// 2: Server Identifier (DUID)
    ServerId(&'a [u8]),
    /// 3: Identity Association for Non-temporary Addresses
    IaNa(IaNa<'a>),
    /// 5: IA Address (nested inside IA_NA)
    IaAddr(IaAddr<'a>),
    /// 6: Option Request
    Oro(OptionCodes<'a>),
    /// 7: Preference
    Preference(u8),
    /// 8: Elapsed Time, in hundredths of a second
    ElapsedTime(u16),
    /// 13: Status Code
    StatusCode(u16, &'a str),
    /// 14: Rapid Commit
    RapidCommit,
    /// 23: DNS Recursive Name Servers
    DnsServers(Ipv6Addrs<'a>),
    /// 24: Domain Search List (uncompressed DNS labels)
    DomainSearchList(&'a [u8]),
    /// 59: Boot File URL
    BootFileUrl(&'a str),
    /// 60: Boot File Parameters
    BootFileParam(&'a [u8]),
    // Other (unrecognized)
    Unrecognized(u16, &'a [u8]),
}

impl<'a> DhcpOption<'a> {
    fn decode<'o>(bytes: &mut BytesIn<'o>) -> Result<Option<DhcpOption<'o>>, Error> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let code = u16::from_be_bytes(bytes.arr()?);
        let len = u16::from_be_bytes(bytes.arr()?) as usize;
        let mut bytes = BytesIn::new(bytes.slice(len)?);

        let option = match code {
            CLIENT_ID => DhcpOption::ClientId(bytes.remaining()),
            SERVER_ID => DhcpOption::ServerId(bytes.remaining()),
            IA_NA => DhcpOption::IaNa(IaNa::decode(bytes.remaining())?),
            IA_ADDR => DhcpOption::IaAddr(IaAddr::decode(bytes.remaining())?),
            ORO => {
                if len % 2 != 0 {
                    Err(Error::InvalidPacket)?;
                }

                DhcpOption::Oro(OptionCodes(OptionCodesInner::ByteSlice(bytes.remaining())))
            }
            PREFERENCE => DhcpOption::Preference(bytes.remaining_byte()?),
            ELAPSED_TIME => DhcpOption::ElapsedTime(u16::from_be_bytes(bytes.remaining_arr()?)),
            STATUS_CODE => DhcpOption::StatusCode(
                u16::from_be_bytes(bytes.arr()?),
                core::str::from_utf8(bytes.remaining()).map_err(Error::InvalidUtf8Str)?,
            ),
            RAPID_COMMIT => DhcpOption::RapidCommit,
            DNS_SERVERS => {
                if len % 16 != 0 {
                    Err(Error::InvalidPacket)?;
                }

                DhcpOption::DnsServers(Ipv6Addrs(Ipv6AddrsInner::ByteSlice(bytes.remaining())))
            }
            DOMAIN_SEARCH_LIST => DhcpOption::DomainSearchList(bytes.remaining()),
            BOOT_FILE_URL => DhcpOption::BootFileUrl(
                core::str::from_utf8(bytes.remaining()).map_err(Error::InvalidUtf8Str)?,
            ),
            BOOT_FILE_PARAM => DhcpOption::BootFileParam(bytes.remaining()),
            _ => DhcpOption::Unrecognized(code, bytes.remaining()),
        };

        Ok(Some(option))
    }

    fn encode(&self, out: &mut BytesOut) -> Result<(), Error> {
        out.push(&self.code().to_be_bytes())?;
        out.push(&(self.data_len() as u16).to_be_bytes())?;

        match self {
            Self::ClientId(id) | Self::ServerId(id) => {
                out.push(id)?;
            }
            Self::IaNa(ia) => {
                out.push(&ia.iaid.to_be_bytes())?;
                out.push(&ia.t1.to_be_bytes())?;
                out.push(&ia.t2.to_be_bytes())?;

                ia.options.0.encode(out)?;
            }
            Self::IaAddr(addr) => {
                out.push(&addr.addr.octets())?;
                out.push(&addr.preferred_lifetime.to_be_bytes())?;
                out.push(&addr.valid_lifetime.to_be_bytes())?;

                addr.options.0.encode(out)?;
            }
            Self::Oro(codes) => {
                for code in codes.iter() {
                    out.push(&code.to_be_bytes())?;
                }
            }
            Self::Preference(pref) => {
                out.byte(*pref)?;
            }
            Self::ElapsedTime(time) => {
                out.push(&time.to_be_bytes())?;
            }
            Self::StatusCode(code, msg) => {
                out.push(&code.to_be_bytes())?;
                out.push(msg.as_bytes())?;
            }
            Self::RapidCommit => (),
            Self::DnsServers(addrs) => {
                for addr in addrs.iter() {
                    out.push(&addr.octets())?;
                }
            }
            Self::DomainSearchList(data) | Self::BootFileParam(data) => {
                out.push(data)?;
            }
            Self::BootFileUrl(url) => {
                out.push(url.as_bytes())?;
            }
            Self::Unrecognized(_, data) => {
                out.push(data)?;
            }
        }

        Ok(())
    }

    pub const fn code(&self) -> u16 {
        match self {
            Self::ClientId(_) => CLIENT_ID,
            Self::ServerId(_) => SERVER_ID,
            Self::IaNa(_) => IA_NA,
            Self::IaAddr(_) => IA_ADDR,
            Self::Oro(_) => ORO,
            Self::Preference(_) => PREFERENCE,
            Self::ElapsedTime(_) => ELAPSED_TIME,
            Self::StatusCode(_, _) => STATUS_CODE,
            Self::RapidCommit => RAPID_COMMIT,
            Self::DnsServers(_) => DNS_SERVERS,
            Self::DomainSearchList(_) => DOMAIN_SEARCH_LIST,
            Self::BootFileUrl(_) => BOOT_FILE_URL,
            Self::BootFileParam(_) => BOOT_FILE_PARAM,
            Self::Unrecognized(code, _) => *code,
        }
    }

    fn data_len(&self) -> usize {
        match self {
            Self::ClientId(id) | Self::ServerId(id) => id.len(),
            Self::IaNa(ia) => 12 + ia.options.0.encoded_len(),
            Self::IaAddr(addr) => 24 + addr.options.0.encoded_len(),
            Self::Oro(codes) => codes.iter().count() * 2,
            Self::Preference(_) => 1,
            Self::ElapsedTime(_) => 2,
            Self::StatusCode(_, msg) => 2 + msg.len(),
            Self::RapidCommit => 0,
            Self::DnsServers(addrs) => addrs.iter().count() * 16,
            Self::DomainSearchList(data) | Self::BootFileParam(data) => data.len(),
            Self::BootFileUrl(url) => url.len(),
            Self::Unrecognized(_, data) => data.len(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OptionCodes<'a>(OptionCodesInner<'a>);

impl<'a> OptionCodes<'a> {
    pub const fn new(codes: &'a [u16]) -> Self {
        Self(OptionCodesInner::DataSlice(codes))
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + 'a {
        self.0.iter()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum OptionCodesInner<'a> {
    ByteSlice(&'a [u8]),
    DataSlice(&'a [u16]),
}

impl<'a> OptionCodesInner<'a> {
    fn iter(&self) -> impl Iterator<Item = u16> + 'a {
        match *self {
            Self::ByteSlice(data) => EitherIterator::First(
                (0..data.len() / 2)
                    .map(move |index| u16::from_be_bytes([data[index * 2], data[index * 2 + 1]])),
            ),
            Self::DataSlice(data) => EitherIterator::Second(data.iter().cloned()),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Ipv6Addrs<'a>(Ipv6AddrsInner<'a>);

impl<'a> Ipv6Addrs<'a> {
    pub const fn new(addrs: &'a [Ipv6Addr]) -> Self {
        Self(Ipv6AddrsInner::DataSlice(addrs))
    }

    pub fn iter(&self) -> impl Iterator<Item = Ipv6Addr> + 'a {
        self.0.iter()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Ipv6AddrsInner<'a> {
    ByteSlice(&'a [u8]),
    DataSlice(&'a [Ipv6Addr]),
}

impl<'a> Ipv6AddrsInner<'a> {
    fn iter(&self) -> impl Iterator<Item = Ipv6Addr> + 'a {
        match *self {
            Self::ByteSlice(data) => EitherIterator::First((0..data.len() / 16).map(move |index| {
                let offset = index * 16;

                let mut octets = [0; 16];
                octets.copy_from_slice(&data[offset..offset + 16]);

                octets.into()
            })),
            Self::DataSlice(data) => EitherIterator::Second(data.iter().cloned()),
        }
    }
}

/// Parses an uncompressed DNS label sequence into dotted domain names.
/// Compression pointers are invalid in DHCPv6 and rejected.
pub fn parse_domains(data: &[u8]) -> Result<Vec<String>, Error> {
    let mut bytes = BytesIn::new(data);

    let mut domains = Vec::new();
    let mut labels: Vec<&str> = Vec::new();

    while !bytes.is_empty() {
        let len = bytes.byte()? as usize;

        if len == 0 {
            if !labels.is_empty() {
                domains.push(labels.join("."));
                labels.clear();
            }
        } else if len > 63 {
            Err(Error::InvalidPacket)?;
        } else {
            labels.push(core::str::from_utf8(bytes.slice(len)?).map_err(Error::InvalidUtf8Str)?);
        }
    }

    if !labels.is_empty() {
        domains.push(labels.join("."));
    }

    Ok(domains)
}

// DHCPv6 Options (RFC 8415 Section 21, RFC 3646, RFC 5970)
const CLIENT_ID: u16 = 1;
const SERVER_ID: u16 = 2;
const IA_NA: u16 = 3;
const IA_ADDR: u16 = 5;
const ORO: u16 = 6;
const PREFERENCE: u16 = 7;
const ELAPSED_TIME: u16 = 8;
const STATUS_CODE: u16 = 13;
const RAPID_COMMIT: u16 = 14;
const DNS_SERVERS: u16 = 23;
const DOMAIN_SEARCH_LIST: u16 = 24;
const BOOT_FILE_URL: u16 = 59;
const BOOT_FILE_PARAM: u16 = 60;

/// The options a netboot client asks the server to return
pub const NETBOOT_ORO: &[u16] = &[DNS_SERVERS, DOMAIN_SEARCH_LIST, BOOT_FILE_URL, BOOT_FILE_PARAM];

#[cfg(test)]
mod test {
    use super::*;

    const DUID: [u8; 10] = [0, 3, 0, 1, 0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5];

    fn reply_message(buf: &mut [u8]) -> usize {
        let ia_options = [DhcpOption::IaAddr(IaAddr {
            addr: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5),
            preferred_lifetime: 3600,
            valid_lifetime: 7200,
            options: Options::new(&[]),
        })];

        let dns_servers = [Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888)];
        let options = [
            DhcpOption::ClientId(&DUID),
            DhcpOption::ServerId(&[0, 1, 0, 1, 1, 2, 3, 4]),
            DhcpOption::IaNa(IaNa {
                iaid: 0x6aa223f5,
                t1: 1800,
                t2: 2880,
                options: Options::new(&ia_options),
            }),
            DhcpOption::DnsServers(Ipv6Addrs::new(&dns_servers)),
            DhcpOption::BootFileUrl("tftp://[2001:db8::1]/boot/netboot.efi"),
        ];

        let message = Message::new(MessageType::Reply, 0x05a3f2, Options::new(&options));

        message.encode(buf).unwrap().len()
    }

    #[test]
    fn test_decode_reply() {
        let mut buf = [0; 1500];
        let len = reply_message(&mut buf);

        let message = Message::decode(&buf[..len]).unwrap();

        assert_eq!(message.msg_type, MessageType::Reply);
        assert_eq!(message.xid, 0x05a3f2);
        assert_eq!(message.client_id(), Some(&DUID[..]));

        let ia = message.ia_na().unwrap();
        assert_eq!(ia.iaid, 0x6aa223f5);

        let addrs: Vec<_> = ia.addresses().collect();
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].addr, Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5));
        assert_eq!(addrs[0].preferred_lifetime, 3600);
        assert_eq!(addrs[0].valid_lifetime, 7200);
    }

    #[test]
    fn test_summary() {
        let mut buf = [0; 1500];
        let len = reply_message(&mut buf);

        let message = Message::decode(&buf[..len]).unwrap();
        let summary = message.to_string();

        assert!(summary.starts_with("REPLY xid=0x05a3f2"));
        assert!(summary.contains("addr=2001:db8::5"));
        assert!(summary.contains("dns=[2001:4860:4860::8888]"));
        assert!(summary.contains("bootfile-url=tftp://[2001:db8::1]/boot/netboot.efi"));
        assert!(!summary.contains('\n'));
    }

    #[test]
    fn test_oro_codes() {
        let mut buf = [0; 128];

        let options = [DhcpOption::Oro(OptionCodes::new(NETBOOT_ORO))];
        let message = Message::new(MessageType::Solicit, 1, Options::new(&options));

        let len = message.encode(&mut buf).unwrap().len();
        let decoded = Message::decode(&buf[..len]).unwrap();

        let oro = decoded.options.iter().find_map(|option| {
            if let DhcpOption::Oro(codes) = option {
                Some(codes.iter().collect::<Vec<_>>())
            } else {
                None
            }
        });
        assert_eq!(oro.unwrap(), NETBOOT_ORO);
    }

    #[test]
    fn test_domain_search_list() {
        // "example.org" "lab"
        let data = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'o', b'r', b'g', 0, 3, b'l', b'a',
            b'b', 0,
        ];

        assert_eq!(parse_domains(&data).unwrap(), ["example.org", "lab"]);
    }
}
