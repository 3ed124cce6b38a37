pub mod expand;
pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use sweepr_common::config::{DEFAULT_CONCURRENCY, ScanConfig};
use sweepr_common::network::port::PortRange;

#[derive(Parser)]
#[command(name = "sweepr", version)]
#[command(about = "A bounded-concurrency TCP port sweeper.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Hide the startup banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Print less (-q drops decorations, -qq prints bare addr:port lines)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Do not listen for the 'q' key during a sweep
    #[arg(long, global = true)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every port of the given targets
    #[command(alias = "s")]
    Scan {
        #[command(flatten)]
        targets: TargetArgs,
        #[command(flatten)]
        options: ScanArgs,
    },
    /// Print the addresses a target specification expands to
    #[command(alias = "e")]
    Expand {
        #[command(flatten)]
        targets: TargetArgs,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// One address, a space-separated list, or a range such as 10.0.0.1-10.0.0.20.
    /// Read from stdin when omitted.
    pub targets: Vec<String>,

    /// Read the target specification from a file
    #[arg(short, long, value_name = "FILE", conflicts_with = "targets")]
    pub input: Option<PathBuf>,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Connect timeout per probe, in seconds
    #[arg(short, long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Connect timeout per probe, in milliseconds (overrides --timeout)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum number of probes in flight
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Ports probed on every target, e.g. 1-1024 or 443
    #[arg(short, long, value_name = "RANGE", default_value_t = PortRange::full())]
    pub ports: PortRange,
}

impl ScanArgs {
    pub fn to_scan_config(&self) -> ScanConfig {
        let timeout: Duration = match self.timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_secs(self.timeout),
        };
        ScanConfig::default()
            .with_timeout(timeout)
            .with_concurrency(self.concurrency)
            .with_ports(self.ports)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
