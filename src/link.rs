//! Link readiness gate and interface identity queries.

use std::fs;
use std::io;
use std::net::Ipv6Addr;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use thiserror::Error;

use crate::sys;

const OPERSTATE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("interface {0} is not available")]
    InterfaceUnavailable(String),

    #[error("interface {interface} did not come up within {timeout:?}")]
    Timeout {
        interface: String,
        timeout: Duration,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Identity of the interface one bootstrap run configures
#[derive(Clone, Debug)]
pub struct InterfaceId {
    pub name: String,
    pub index: u32,
    pub mac: [u8; 6],
}

impl InterfaceId {
    pub fn query(name: &str) -> Result<Self, LinkError> {
        let index = read_sysfs(name, "ifindex")?
            .trim()
            .parse()
            .map_err(|_| LinkError::InterfaceUnavailable(name.to_string()))?;

        let mac = parse_mac(read_sysfs(name, "address")?.trim())
            .ok_or_else(|| LinkError::InterfaceUnavailable(name.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            index,
            mac,
        })
    }
}

/// Brings the interface into an operational "up" state, waiting at most
/// `timeout`. Calling it on an already-up interface returns immediately.
pub fn bring_up(name: &str, timeout: Duration) -> Result<(), LinkError> {
    set_link_up(name)?;

    let deadline = Instant::now() + timeout;

    loop {
        if oper_up(name)? {
            debug!("interface {} is up", name);

            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(LinkError::Timeout {
                interface: name.to_string(),
                timeout,
            });
        }

        thread::sleep(OPERSTATE_POLL);
    }
}

/// The link-local (fe80::/10) address of the interface, if it has one.
/// Read from `/proc/net/if_inet6`, whose rows are
/// `<addr> <ifindex> <prefixlen> <scope> <flags> <ifname>`.
pub fn link_local_addr(name: &str) -> Result<Option<Ipv6Addr>, LinkError> {
    // A missing interface must surface as such, not as "no address"
    InterfaceId::query(name)?;

    const SCOPE_LINK: u8 = 0x20;

    for line in fs::read_to_string("/proc/net/if_inet6")?.lines() {
        let mut fields = line.split_whitespace();

        let Some(addr) = fields.next() else { continue };
        let scope = fields.nth(2);
        let ifname = fields.nth(1);

        if ifname != Some(name) {
            continue;
        }

        let scoped_link = scope
            .and_then(|scope| u8::from_str_radix(scope, 16).ok())
            .is_some_and(|scope| scope == SCOPE_LINK);

        if scoped_link {
            if let Some(addr) = parse_if_inet6_addr(addr) {
                return Ok(Some(addr));
            }
        }
    }

    Ok(None)
}

fn parse_if_inet6_addr(addr: &str) -> Option<Ipv6Addr> {
    if addr.len() != 32 {
        return None;
    }

    let mut octets = [0; 16];
    for (index, octet) in octets.iter_mut().enumerate() {
        *octet = u8::from_str_radix(&addr[index * 2..index * 2 + 2], 16).ok()?;
    }

    Some(octets.into())
}

fn parse_mac(addr: &str) -> Option<[u8; 6]> {
    let mut mac = [0; 6];
    let mut parts = addr.split(':');

    for byte in &mut mac {
        *byte = u8::from_str_radix(parts.next()?, 16).ok()?;
    }

    parts.next().is_none().then_some(mac)
}

fn read_sysfs(name: &str, attribute: &str) -> Result<String, LinkError> {
    fs::read_to_string(format!("/sys/class/net/{}/{}", name, attribute)).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            LinkError::InterfaceUnavailable(name.to_string())
        } else {
            err.into()
        }
    })
}

fn oper_up(name: &str) -> Result<bool, LinkError> {
    let state = read_sysfs(name, "operstate")?;
    let state = state.trim();

    // links without operstate support report "unknown"
    Ok(state == "up" || state == "unknown")
}

fn set_link_up(name: &str) -> Result<(), LinkError> {
    let socket = sys::control_socket()?;
    let mut req = sys::ifreq_for(name)?;

    let flags = unsafe {
        sys::ioctl(&socket, libc::SIOCGIFFLAGS, &mut req).map_err(|err| not_found(name, err))?;

        req.ifr_ifru.ifru_flags
    };

    if flags & libc::IFF_UP as libc::c_short != 0 {
        return Ok(());
    }

    debug!("setting interface {} up", name);

    unsafe {
        req.ifr_ifru.ifru_flags = flags | (libc::IFF_UP | libc::IFF_RUNNING) as libc::c_short;

        sys::ioctl(&socket, libc::SIOCSIFFLAGS, &mut req).map_err(|err| not_found(name, err))?;
    }

    Ok(())
}

fn not_found(name: &str, err: io::Error) -> LinkError {
    if err.raw_os_error() == Some(libc::ENODEV) {
        LinkError::InterfaceUnavailable(name.to_string())
    } else {
        err.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_mac() {
        assert_eq!(
            parse_mac("4c:cc:6a:a2:23:f5"),
            Some([0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5])
        );
        assert_eq!(parse_mac("4c:cc:6a:a2:23"), None);
        assert_eq!(parse_mac("4c:cc:6a:a2:23:f5:00"), None);
        assert_eq!(parse_mac("zz:cc:6a:a2:23:f5"), None);
    }

    #[test]
    fn test_parse_if_inet6_addr() {
        assert_eq!(
            parse_if_inet6_addr("fe80000000000000021122fffe334455"),
            Some(Ipv6Addr::new(
                0xfe80, 0, 0, 0, 0x0211, 0x22ff, 0xfe33, 0x4455
            ))
        );
        assert_eq!(parse_if_inet6_addr("fe80"), None);
    }

    #[test]
    fn test_missing_interface() {
        let err = InterfaceId::query("does-not-exist0").unwrap_err();

        assert!(matches!(err, LinkError::InterfaceUnavailable(_)));
    }
}
