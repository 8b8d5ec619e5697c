use clap::{Parser, ValueEnum};

use netboot::{driver, Config, Family};

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
#[command(name = "dhclient")]
#[command(about = "Negotiate IP configuration over DHCP and apply it to an interface")]
struct Args {
    /// IP version to negotiate
    #[arg(short = 'v', long = "ip-version", value_enum, default_value = "6")]
    ip_version: IpVersion,

    /// Interface to configure
    #[arg(short, long, default_value = "eth0")]
    interface: String,

    /// Report the configuration that would be applied without applying it
    #[arg(long)]
    dry_run: bool,

    /// Verbose output, including a summary of every exchanged message
    #[arg(short, long)]
    debug: bool,

    /// Retries on top of the first attempt
    #[arg(short, long, default_value_t = 3)]
    retries: u32,

    /// Do not wait for the interface to come up before negotiating
    #[arg(long)]
    no_ifup: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::init_from_env(env_logger::Env::default().filter_or(
        env_logger::DEFAULT_FILTER_ENV,
        if args.debug { "debug" } else { "info" },
    ));

    let config = Config {
        family: args.ip_version.into(),
        interface: args.interface,
        dry_run: args.dry_run,
        verbose: args.debug,
        retries: args.retries,
        skip_ifup: args.no_ifup,
        ..Config::default()
    };

    driver::run(&config)?;

    Ok(())
}
