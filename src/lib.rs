//! Host-side network bootstrap: negotiate IP configuration over DHCPv4 or
//! DHCPv6, turn the finished conversation into a canonical network
//! configuration record, and apply that record to a local interface.
//!
//! The pipeline is strictly sequential and blocking: readiness gate →
//! exchange engine → configuration extractor → interface configurator,
//! orchestrated by [`driver::run`]. The [`capture`] module is the offline
//! companion: it decodes captured DHCP traffic with the same message codecs.

#![allow(clippy::uninlined_format_args)]

use core::fmt;

pub mod capture;
pub mod configure;
pub mod conversation;
pub mod driver;
pub mod exchange;
pub mod link;
pub mod netconf;

pub(crate) mod sys;

pub use conversation::{Conversation, Direction, Envelope};
pub use driver::Config;

/// The address family one bootstrap run negotiates for
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Family {
    V4,
    V6,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => "IPv4",
            Self::V6 => "IPv6",
        }
        .fmt(f)
    }
}
