//! The interface configurator: applies a negotiated record to live system
//! state, or only reports it in dry-run mode.

use std::ffi::CString;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::netconf::NetConf;
use crate::sys;

const RESOLV_CONF: &str = "/etc/resolv.conf";

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("interface {0} disappeared before configuration could be applied")]
    InterfaceNotFound(String),

    #[error("{what} rejected: {source}")]
    ConfigurationRejected { what: String, source: io::Error },
}

/// Applies `netconf` to the named interface. Re-applying the same record is
/// a no-op in effect: addresses and routes overwrite rather than append,
/// and an already-present identical route counts as success.
pub fn apply(ifname: &str, netconf: &NetConf, dry_run: bool) -> Result<(), ApplyError> {
    if dry_run {
        info!("dry run requested, not changing network configuration");

        return Ok(());
    }

    for addr in &netconf.addrs {
        match addr.address {
            IpAddr::V4(ip) => set_ipv4_addr(ifname, ip, addr.prefix_len)
                .map_err(|err| classify(ifname, format!("address {}/{}", ip, addr.prefix_len), err))?,
            IpAddr::V6(ip) => add_ipv6_addr(ifname, ip, addr.prefix_len)
                .map_err(|err| classify(ifname, format!("address {}/{}", ip, addr.prefix_len), err))?,
        }

        debug!("assigned {}/{} to {}", addr.address, addr.prefix_len, ifname);
    }

    for router in &netconf.routers {
        match router {
            IpAddr::V4(gateway) => {
                add_default_route(ifname, *gateway)
                    .map_err(|err| classify(ifname, format!("default route via {}", gateway), err))?;

                debug!("installed default route via {}", gateway);
            }
            // DHCPv6 does not convey routers; v6 defaults come from RA
            IpAddr::V6(gateway) => debug!("skipping IPv6 default route via {}", gateway),
        }
    }

    if !netconf.dns_servers.is_empty() {
        write_resolv_conf(
            Path::new(RESOLV_CONF),
            &netconf.dns_servers,
            &netconf.dns_search_list,
        )
        .map_err(|err| classify(ifname, "name servers".to_string(), err))?;

        debug!("recorded {} name server(s)", netconf.dns_servers.len());
    }

    Ok(())
}

fn classify(ifname: &str, what: String, err: io::Error) -> ApplyError {
    if err.raw_os_error() == Some(libc::ENODEV) {
        ApplyError::InterfaceNotFound(ifname.to_string())
    } else {
        ApplyError::ConfigurationRejected { what, source: err }
    }
}

/// SIOCSIFADDR replaces the primary address outright, which is exactly the
/// overwrite semantics re-application needs.
fn set_ipv4_addr(ifname: &str, addr: Ipv4Addr, prefix_len: u8) -> io::Result<()> {
    let socket = sys::control_socket()?;

    let mut req = sys::ifreq_for(ifname)?;
    req.ifr_ifru.ifru_addr = sys::sockaddr_in(addr);

    unsafe {
        sys::ioctl(&socket, libc::SIOCSIFADDR, &mut req)?;
    }

    let mut req = sys::ifreq_for(ifname)?;
    req.ifr_ifru.ifru_netmask = sys::sockaddr_in(prefix_to_mask(prefix_len));

    unsafe {
        sys::ioctl(&socket, libc::SIOCSIFNETMASK, &mut req)?;
    }

    Ok(())
}

fn add_ipv6_addr(ifname: &str, addr: Ipv6Addr, prefix_len: u8) -> io::Result<()> {
    // glibc does not export in6_ifreq
    #[repr(C)]
    struct In6Ifreq {
        addr: libc::in6_addr,
        prefixlen: u32,
        ifindex: libc::c_int,
    }

    let ifindex = if_index(ifname)?;
    let socket = sys::control_socket_v6()?;

    let mut req = In6Ifreq {
        addr: libc::in6_addr {
            s6_addr: addr.octets(),
        },
        prefixlen: prefix_len as u32,
        ifindex,
    };

    match unsafe { sys::ioctl(&socket, libc::SIOCSIFADDR, &mut req) } {
        Err(err) if err.raw_os_error() == Some(libc::EEXIST) => Ok(()),
        result => result,
    }
}

fn add_default_route(ifname: &str, gateway: Ipv4Addr) -> io::Result<()> {
    let dev = CString::new(ifname)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "interface name"))?;

    let socket = sys::control_socket()?;

    let mut route: libc::rtentry = unsafe { std::mem::zeroed() };
    route.rt_dst = sys::sockaddr_in(Ipv4Addr::UNSPECIFIED);
    route.rt_genmask = sys::sockaddr_in(Ipv4Addr::UNSPECIFIED);
    route.rt_gateway = sys::sockaddr_in(gateway);
    route.rt_flags = libc::RTF_UP | libc::RTF_GATEWAY;
    route.rt_dev = dev.as_ptr() as *mut libc::c_char;

    match unsafe { sys::ioctl(&socket, libc::SIOCADDRT, &mut route) } {
        // the route is already there, which is the state we wanted
        Err(err) if err.raw_os_error() == Some(libc::EEXIST) => Ok(()),
        result => result,
    }
}

fn if_index(ifname: &str) -> io::Result<libc::c_int> {
    let name = CString::new(ifname)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "interface name"))?;

    match unsafe { libc::if_nametoindex(name.as_ptr()) } {
        0 => Err(io::Error::from_raw_os_error(libc::ENODEV)),
        index => Ok(index as libc::c_int),
    }
}

fn prefix_to_mask(prefix_len: u8) -> Ipv4Addr {
    let bits = match prefix_len {
        0 => 0,
        len => u32::MAX << (32 - len.min(32) as u32),
    };

    Ipv4Addr::from(bits)
}

fn write_resolv_conf(path: &Path, servers: &[IpAddr], search: &[String]) -> io::Result<()> {
    let mut content = String::new();

    if !search.is_empty() {
        content.push_str(&format!("search {}\n", search.join(" ")));
    }

    for server in servers {
        content.push_str(&format!("nameserver {}\n", server));
    }

    // overwrite, not append: the new lease owns name resolution now
    fs::write(path, content)
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::netconf::AddrConf;

    #[test]
    fn test_dry_run_never_touches_the_system() {
        let netconf = NetConf {
            addrs: vec![AddrConf {
                address: Ipv4Addr::new(10, 0, 0, 5).into(),
                prefix_len: 24,
                preferred_lifetime: Some(3600),
                valid_lifetime: Some(3600),
            }],
            routers: vec![Ipv4Addr::new(10, 0, 0, 1).into()],
            dns_servers: vec![Ipv4Addr::new(8, 8, 8, 8).into()],
            ..Default::default()
        };

        // the interface does not even exist; dry-run must not notice
        apply("no-such-iface0", &netconf, true).unwrap();
    }

    #[test]
    fn test_prefix_to_mask() {
        assert_eq!(prefix_to_mask(24), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(prefix_to_mask(32), Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(prefix_to_mask(0), Ipv4Addr::new(0, 0, 0, 0));
    }

    #[test]
    fn test_write_resolv_conf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolv.conf");

        write_resolv_conf(
            &path,
            &[
                IpAddr::from(Ipv4Addr::new(8, 8, 8, 8)),
                IpAddr::from(Ipv4Addr::new(1, 1, 1, 1)),
            ],
            &["lab.example.org".to_string()],
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "search lab.example.org\nnameserver 8.8.8.8\nnameserver 1.1.1.1\n"
        );

        // second write overwrites rather than appends
        write_resolv_conf(&path, &[IpAddr::from(Ipv4Addr::new(9, 9, 9, 9))], &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "nameserver 9.9.9.9\n");
    }
}
