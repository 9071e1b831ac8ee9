//! Command line arguments of `check_ontap`.

use std::env;
use std::ffi::OsString;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::warn;

use crate::ontap::OntapConfig;
use crate::units::{ByteUnit, UsageMetric};
use crate::{ItemFilter, Result, Threshold};

/// Seconds after which a check gives up, unless overridden by `TIMEOUT`.
pub const DEFAULT_TIMEOUT: u64 = 60;

/// Nagios/Icinga checks for NetApp ONTAP clusters.
#[derive(Parser, Debug)]
#[command(name = "check_ontap", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the ONTAP version of the cluster
    About(BasicArgs),
    /// Check space usage of aggregates and reconstructing raid groups
    AggregateUsage(UsageArgs),
    /// Check the cluster status and the state of its nodes
    ClusterHealth(BasicArgs),
    /// Check disk states or disk path symmetry
    DiskHealth(DiskHealthArgs),
    /// Check node hardware and environment sensors
    HardwareHealth(HardwareHealthArgs),
    /// Check interface status and home location
    InterfaceHealth(FilteredArgs),
    /// Check space usage of luns
    LunUsage(UsageArgs),
    /// Check state of ethernet and fibre channel ports
    PortHealth(FilteredArgs),
    /// Check health and lag time of snapmirror relationships
    SnapmirrorHealth(SnapmirrorHealthArgs),
    /// Check age and count of snapshots per volume
    SnapshotHealth(SnapshotHealthArgs),
    /// Check state of volumes: online, offline, error or mixed
    VolumeHealth(VolumeHealthArgs),
    /// Check space, inode and snapshot reserve usage of volumes
    VolumeUsage(VolumeUsageArgs),
}

impl Command {
    pub fn connection(&self) -> &ConnectionArgs {
        match self {
            Command::About(args) | Command::ClusterHealth(args) => &args.connection,
            Command::AggregateUsage(args) | Command::LunUsage(args) => &args.connection,
            Command::DiskHealth(args) => &args.connection,
            Command::HardwareHealth(args) => &args.connection,
            Command::InterfaceHealth(args) | Command::PortHealth(args) => &args.connection,
            Command::SnapmirrorHealth(args) => &args.connection,
            Command::SnapshotHealth(args) => &args.connection,
            Command::VolumeHealth(args) => &args.connection,
            Command::VolumeUsage(args) => &args.usage.connection,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// NetApp device service address to connect to
    #[arg(short = 'H', long)]
    pub host: String,

    /// Port to connect on
    #[arg(short = 'P', long, default_value_t = 443)]
    pub port: u16,

    /// API user name to use when connecting to host
    #[arg(short = 'u', long = "api_user")]
    pub api_user: String,

    /// Password to use when connecting to host, can also be set by env NETAPP_API_PASS
    #[arg(
        short = 'p',
        long = "api_pass",
        env = "NETAPP_API_PASS",
        hide_env_values = true
    )]
    pub api_pass: String,

    /// Disable ssl host certificate verification
    #[arg(long = "disable-ssl-verification", visible_alias = "nossl")]
    pub disable_ssl_verification: bool,

    /// Verbose output, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl ConnectionArgs {
    pub fn ontap_config(&self, timeout: Option<Duration>) -> OntapConfig {
        OntapConfig {
            host: self.host.clone(),
            port: self.port,
            user: self.api_user.clone(),
            password: self.api_pass.clone(),
            insecure: self.disable_ssl_verification,
            timeout,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Regular expression of items to exclude
    #[arg(long)]
    pub exclude: Option<String>,

    /// Regular expression of items to include, ignored if --exclude is given
    #[arg(long)]
    pub include: Option<String>,
}

impl FilterArgs {
    pub fn item_filter(&self) -> Result<ItemFilter> {
        ItemFilter::new(self.include.as_deref(), self.exclude.as_deref())
    }
}

#[derive(Args, Debug)]
pub struct BasicArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct FilteredArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug)]
pub struct UsageArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Warning threshold
    #[arg(short, long)]
    pub warning: String,

    /// Critical threshold
    #[arg(short, long)]
    pub critical: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Unit the thresholds are given in: % or a size like GB. Raw bytes if omitted
    #[arg(short = 'U', long)]
    pub unit: Option<ByteUnit>,

    /// The metric to apply the thresholds on: usage (in percent), used_<unit> or free_<unit>,
    /// e.g. free_GB or used_TB
    #[arg(short, long, conflicts_with = "unit")]
    pub metric: Option<UsageMetric>,
}

impl UsageArgs {
    pub fn threshold(&self) -> Result<Threshold> {
        Threshold::parse(Some(&self.warning), Some(&self.critical))
    }

    /// The figure to compare, `None` meaning used space in bytes.
    pub fn usage_metric(&self) -> Option<UsageMetric> {
        self.unit.map(UsageMetric::from_unit).or(self.metric)
    }
}

#[derive(Args, Debug)]
pub struct VolumeUsageArgs {
    #[command(flatten)]
    pub usage: UsageArgs,

    /// Only check the given volumes
    #[arg(long, num_args = 1..)]
    pub name: Vec<String>,

    /// Inode warning threshold in percent
    #[arg(long)]
    pub inode_warning: Option<String>,

    /// Inode critical threshold in percent
    #[arg(long)]
    pub inode_critical: Option<String>,

    /// Snapshot used space warning threshold in percent
    #[arg(long)]
    pub snapshot_warning: Option<String>,

    /// Snapshot used space critical threshold in percent
    #[arg(long)]
    pub snapshot_critical: Option<String>,
}

#[derive(Args, Debug)]
pub struct VolumeHealthArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Comma separated volume states to warn on, e.g. mixed
    #[arg(short, long)]
    pub warning: Option<String>,

    /// Comma separated volume states to go critical on, e.g. offline,error
    #[arg(short, long)]
    pub critical: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Only check the given volumes
    #[arg(long, num_args = 1..)]
    pub name: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DiskMode {
    /// Symmetric number of paths per disk, requires ONTAP 9.9
    Multipath,
    /// Disk state and home node
    #[default]
    #[value(alias = "diskstate")]
    Diskhealth,
}

#[derive(Args, Debug)]
pub struct DiskHealthArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Which disk health mode to check
    #[arg(long, value_enum, default_value_t = DiskMode::Diskhealth)]
    pub mode: DiskMode,
}

#[derive(Args, Debug)]
pub struct HardwareHealthArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Add sensor values as performance data
    #[arg(long)]
    pub perfdata: bool,

    /// Sensor types to check: fan thermal voltage current battery-life discrete fru nvmem counter
    /// minutes percent agent unknown
    #[arg(long = "type", num_args = 1..)]
    pub types: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SnapmirrorHealthArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Lag time warning threshold in seconds
    #[arg(short, long)]
    pub warning: Option<String>,

    /// Lag time critical threshold in seconds
    #[arg(short, long)]
    pub critical: Option<String>,

    // filters on the source path of the relationships
    #[command(flatten)]
    pub filter: FilterArgs,
}

impl SnapmirrorHealthArgs {
    pub fn threshold(&self) -> Result<Threshold> {
        Threshold::parse(self.warning.as_deref(), self.critical.as_deref())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SnapshotFilterMode {
    /// Include/exclude apply to volume names
    Volume,
    /// Include/exclude apply to snapshot names
    #[default]
    Snapshot,
}

#[derive(Args, Debug)]
pub struct SnapshotHealthArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Warning age of the oldest snapshot, in seconds or with a unit: 1d, 1.5h, 2w
    #[arg(short, long)]
    pub warning: Option<String>,

    /// Critical age of the oldest snapshot, in seconds or with a unit: 1d, 1.5h, 2w
    #[arg(short, long)]
    pub critical: Option<String>,

    /// Warning range for the number of snapshots per volume
    #[arg(long)]
    pub count: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Warn if a volume has no snapshot
    #[arg(long)]
    pub no_snapshot: bool,

    /// Whether include/exclude apply to volume or snapshot names
    #[arg(long, value_enum, default_value_t = SnapshotFilterMode::Snapshot)]
    pub mode: SnapshotFilterMode,
}

/// Rewrites the traditional single dash `-nossl` flag into its long form.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-nossl" {
                OsString::from("--nossl")
            } else {
                arg
            }
        })
        .collect()
}

/// The overall deadline from the `TIMEOUT` environment variable. `TIMEOUT=0` disables it.
pub fn timeout_from_env() -> Option<Duration> {
    parse_timeout(env::var("TIMEOUT").ok().as_deref())
}

fn parse_timeout(value: Option<&str>) -> Option<Duration> {
    let seconds = match value.map(str::trim) {
        None | Some("") => DEFAULT_TIMEOUT,
        Some(s) => s.parse().unwrap_or_else(|_| {
            warn!("ignoring invalid TIMEOUT {:?}", s);
            DEFAULT_TIMEOUT
        }),
    };
    match seconds {
        0 => None,
        seconds => Some(Duration::from_secs(seconds)),
    }
}
