use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use netboot::capture;
use netboot::exchange::{self, RetryPolicy};
use netboot::Family;

use netboot_raw::Encapsulation;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum IpVersion {
    #[value(name = "4")]
    V4,
    #[value(name = "6")]
    V6,
}

impl From<IpVersion> for Family {
    fn from(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => Family::V4,
            IpVersion::V6 => Family::V6,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dhcpdump")]
#[command(about = "Decode DHCP traffic from a capture file, or from a live exchange")]
struct Args {
    /// IP version to decode
    #[arg(short = 'v', long = "ip-version", value_enum, default_value = "6")]
    ip_version: IpVersion,

    /// Capture file to decode; a live exchange is performed when absent
    #[arg(short, long)]
    read: Option<PathBuf>,

    /// Interface for the live exchange
    #[arg(short, long, default_value = "eth0")]
    interface: String,

    /// Capture uses Linux cooked (SLL) encapsulation instead of Ethernet
    #[arg(long)]
    cooked: bool,

    /// Verbose output, including raw payload dumps
    #[arg(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::init_from_env(env_logger::Env::default().filter_or(
        env_logger::DEFAULT_FILTER_ENV,
        if args.debug { "debug" } else { "info" },
    ));

    let family = args.ip_version.into();

    match &args.read {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open capture {}", path.display()))?;

            let encap = if args.cooked {
                Encapsulation::LinuxCooked
            } else {
                Encapsulation::Ethernet
            };

            let decoded = capture::decode_capture(
                BufReader::new(file),
                family,
                encap,
                args.debug,
                &mut io::stdout().lock(),
            )?;

            info!("{} message(s) decoded", decoded);
        }
        None => {
            // Best-effort single attempt; the conversation is printed even
            // when the exchange fails, before the error is reported.
            let policy = RetryPolicy {
                attempts: 1,
                ..RetryPolicy::default()
            };

            let outcome = exchange::exchange(family, &args.interface, &policy, false);

            for line in outcome.conversation.summaries() {
                println!("{}", line);
            }

            outcome.into_result()?;
        }
    }

    Ok(())
}
