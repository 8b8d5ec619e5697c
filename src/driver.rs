//! The driver: one immutable configuration value, one strictly sequential
//! run through gate → exchange → extract → apply.

use std::time::Duration;

use log::info;
use thiserror::Error;

use crate::configure::{self, ApplyError};
use crate::exchange::{self, ExchangeError, RetryPolicy};
use crate::link::{self, LinkError};
use crate::netconf::{ExtractError, NetConf};
use crate::Family;

/// Everything a run needs, constructed once from the CLI and passed down
/// explicitly; no component reads process-wide state.
#[derive(Clone, Debug)]
pub struct Config {
    pub family: Family,
    pub interface: String,
    pub dry_run: bool,
    pub verbose: bool,
    /// Retries on top of the first attempt: 3 means 4 attempts total
    pub retries: u32,
    pub skip_ifup: bool,
    pub ifup_timeout: Duration,
    pub exchange_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            family: Family::V6,
            interface: "eth0".to_string(),
            dry_run: false,
            verbose: false,
            retries: 3,
            skip_ifup: false,
            ifup_timeout: Duration::from_secs(5),
            exchange_timeout: Duration::from_secs(3),
        }
    }
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retries.saturating_add(1),
            timeout: self.exchange_timeout,
            ..RetryPolicy::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bring interface up: {0}")]
    Link(#[from] LinkError),

    #[error("DHCP exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("could not extract network configuration: {0}")]
    Extract(#[from] ExtractError),

    #[error("failed to apply network configuration: {0}")]
    Apply(#[from] ApplyError),
}

/// Runs the whole bootstrap pipeline. Fails fast: the configurator never
/// sees a record unless exchange and extraction both succeeded, so the
/// interface either ends up fully configured or keeps its prior state.
pub fn run(config: &Config) -> Result<(), Error> {
    if !config.skip_ifup {
        link::bring_up(&config.interface, config.ifup_timeout)?;
    }

    let outcome = exchange::exchange(
        config.family,
        &config.interface,
        &config.retry_policy(),
        config.verbose,
    );

    let conversation = outcome.into_result()?;
    let netconf = NetConf::from_conversation(&conversation)?;

    info!("Setting network configuration:");
    info!("{}", netconf);

    configure::apply(&config.interface, &netconf, config.dry_run)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_retry_policy_counts_attempts() {
        let config = Config {
            retries: 3,
            ..Config::default()
        };

        assert_eq!(config.retry_policy().attempts, 4);

        let config = Config {
            retries: 0,
            ..Config::default()
        };

        assert_eq!(config.retry_policy().attempts, 1);
    }
}
