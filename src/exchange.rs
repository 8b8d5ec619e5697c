//! The exchange engine: one retry-governed DHCP conversation per call.

use std::io;
use std::net::Ipv6Addr;
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

use crate::conversation::Conversation;
use crate::link::{self, LinkError};
use crate::Family;

mod v4;
mod v6;

/// Family-specific endpoint configuration for DHCPv6. DHCPv4 needs none:
/// it is broadcast from the unspecified address with fixed ports.
#[derive(Clone, Debug)]
pub struct V6Endpoints {
    pub client_port: u16,
    pub server_port: u16,
    pub server_addr: Ipv6Addr,
}

impl Default for V6Endpoints {
    fn default() -> Self {
        Self {
            client_port: netboot_dhcp::v6::DEFAULT_CLIENT_PORT,
            server_port: netboot_dhcp::v6::DEFAULT_SERVER_PORT,
            server_addr: netboot_dhcp::v6::ALL_RELAY_AGENTS_AND_SERVERS,
        }
    }
}

/// How persistently one exchange is driven. `attempts` is clamped to at
/// least 1 at use site; `timeout` bounds each request/response round-trip.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub timeout: Duration,
    pub v6: V6Endpoints,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            timeout: Duration::from_secs(3),
            v6: V6Endpoints::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("interface {0} not found")]
    InterfaceNotFound(String),

    #[error("no link-local address on {0}")]
    LinkLocalAddressUnavailable(String),

    #[error("no {0} received before the attempt timed out")]
    NoResponse(&'static str),

    #[error("request declined by the server: {0}")]
    Declined(String),

    #[error("malformed message: {0}")]
    Protocol(#[from] netboot_dhcp::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What one exchange produced: the conversation recorded so far and,
/// simultaneously, the error that ended it. A failed exchange still carries
/// every message the final attempt managed to put on (or take off) the wire.
#[derive(Debug)]
pub struct ExchangeOutcome {
    pub conversation: Conversation,
    pub error: Option<ExchangeError>,
}

impl ExchangeOutcome {
    fn failed(family: Family, error: ExchangeError) -> Self {
        Self {
            conversation: Conversation::new(family),
            error: Some(error),
        }
    }

    pub fn into_result(self) -> Result<Conversation, ExchangeError> {
        match self.error {
            None => Ok(self.conversation),
            Some(error) => Err(error),
        }
    }
}

/// Performs one full DHCP conversation on `ifname`, retrying whole
/// negotiations up to the policy's attempt budget.
///
/// With `verbose` set, a one-line summary of every recorded message is
/// logged — for failed exchanges too — before the caller gets to look at
/// the error.
pub fn exchange(
    family: Family,
    ifname: &str,
    policy: &RetryPolicy,
    verbose: bool,
) -> ExchangeOutcome {
    let outcome = run(family, ifname, policy);

    if verbose {
        for line in outcome.conversation.summaries() {
            info!("{}", line);
        }
    }

    outcome
}

fn run(family: Family, ifname: &str, policy: &RetryPolicy) -> ExchangeOutcome {
    // Addressing is resolved before the loop: an interface without the
    // prerequisites fails immediately, without burning the attempt budget.
    let iface = match link::InterfaceId::query(ifname) {
        Ok(iface) => iface,
        Err(err) => return ExchangeOutcome::failed(family, interface_error(ifname, err)),
    };

    match family {
        Family::V4 => run_attempts(policy.attempts, |_| v4::negotiate(&iface, policy)),
        Family::V6 => {
            let link_local = match link::link_local_addr(ifname) {
                Ok(Some(addr)) => addr,
                Ok(None) => {
                    return ExchangeOutcome::failed(
                        family,
                        ExchangeError::LinkLocalAddressUnavailable(ifname.to_string()),
                    )
                }
                Err(err) => return ExchangeOutcome::failed(family, interface_error(ifname, err)),
            };

            run_attempts(policy.attempts, |_| {
                v6::negotiate(&iface, link_local, policy)
            })
        }
    }
}

fn interface_error(ifname: &str, err: LinkError) -> ExchangeError {
    match err {
        LinkError::InterfaceUnavailable(name) => ExchangeError::InterfaceNotFound(name),
        LinkError::Io(err) => err.into(),
        LinkError::Timeout { interface, .. } => ExchangeError::InterfaceNotFound(interface),
    }
}

fn run_attempts<F>(attempts: u32, mut attempt: F) -> ExchangeOutcome
where
    F: FnMut(u32) -> Result<Conversation, (ExchangeError, Conversation)>,
{
    let attempts = attempts.max(1);
    let mut n = 1;

    loop {
        info!("Attempt {} of {}", n, attempts);

        match attempt(n) {
            Ok(conversation) => {
                break ExchangeOutcome {
                    conversation,
                    error: None,
                }
            }
            Err((error, conversation)) => {
                if n >= attempts {
                    break ExchangeOutcome {
                        conversation,
                        error: Some(error),
                    };
                }

                warn!("Error: {}", error);
                n += 1;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tagged_conversation(tag: u8) -> Conversation {
        let mut conversation = Conversation::new(Family::V4);
        conversation.push_sent(&[tag]);

        conversation
    }

    #[test]
    fn test_success_stops_the_loop() {
        let mut calls = 0;

        let outcome = run_attempts(4, |n| {
            calls += 1;

            if n == 2 {
                Ok(tagged_conversation(n as u8))
            } else {
                Err((
                    ExchangeError::NoResponse("DHCPOFFER"),
                    tagged_conversation(n as u8),
                ))
            }
        });

        assert_eq!(calls, 2);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.conversation.messages()[0].data, [2]);
    }

    #[test]
    fn test_exhausted_budget_returns_final_conversation() {
        let outcome = run_attempts(3, |n| {
            Err((
                ExchangeError::NoResponse("DHCPOFFER"),
                tagged_conversation(n as u8),
            ))
        });

        assert!(matches!(
            outcome.error,
            Some(ExchangeError::NoResponse("DHCPOFFER"))
        ));
        // the final attempt's conversation, not an earlier one
        assert_eq!(outcome.conversation.messages()[0].data, [3]);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let mut calls = 0;

        let outcome = run_attempts(0, |_| {
            calls += 1;

            Err((
                ExchangeError::NoResponse("DHCPOFFER"),
                Conversation::new(Family::V4),
            ))
        });

        assert_eq!(calls, 1);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_three_failures_then_success() {
        // retry budget 3 means 4 attempts; the 4th lands the conversation
        let outcome = run_attempts(4, |n| {
            if n <= 3 {
                Err((
                    ExchangeError::NoResponse("DHCPOFFER"),
                    tagged_conversation(n as u8),
                ))
            } else {
                Ok(tagged_conversation(0x2a))
            }
        });

        assert!(outcome.error.is_none());
        assert_eq!(outcome.conversation.messages()[0].data, [0x2a]);
    }
}
