//! Thin ioctl plumbing shared by the link gate and the configurator.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddrV6, UdpSocket};
use std::os::fd::AsRawFd;

/// A throwaway AF_INET datagram socket to issue interface ioctls against
pub(crate) fn control_socket() -> io::Result<UdpSocket> {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
}

/// Same, AF_INET6 flavor (IPv6 address ioctls need an IPv6 socket)
pub(crate) fn control_socket_v6() -> io::Result<UdpSocket> {
    UdpSocket::bind(SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, 0, 0, 0))
}

pub(crate) fn ifreq_for(name: &str) -> io::Result<libc::ifreq> {
    let mut req: libc::ifreq = unsafe { std::mem::zeroed() };

    if name.len() >= req.ifr_name.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "interface name too long",
        ));
    }

    for (dst, src) in req.ifr_name.iter_mut().zip(name.as_bytes()) {
        *dst = *src as libc::c_char;
    }

    Ok(req)
}

/// # Safety
///
/// `arg` must be the argument type the ioctl `request` expects.
pub(crate) unsafe fn ioctl<T>(
    socket: &UdpSocket,
    request: libc::c_ulong,
    arg: &mut T,
) -> io::Result<()> {
    if libc::ioctl(socket.as_raw_fd(), request as _, arg as *mut T) < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

pub(crate) fn sockaddr_in(addr: Ipv4Addr) -> libc::sockaddr {
    let sin = libc::sockaddr_in {
        sin_family: libc::AF_INET as libc::sa_family_t,
        sin_port: 0,
        sin_addr: libc::in_addr {
            s_addr: u32::from_ne_bytes(addr.octets()),
        },
        sin_zero: [0; 8],
    };

    // sockaddr and sockaddr_in are layout-compatible by construction
    unsafe { std::mem::transmute(sin) }
}
