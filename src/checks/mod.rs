//! The individual checks. Each one fetches its records through an [OntapApi], fills a
//! [CheckReport] and reduces it into an [Outcome].

use log::info;

use crate::cli::Command;
use crate::ontap::{models, record, OntapApi};
use crate::{CheckReport, Outcome, Result, State};

pub mod about;
pub mod aggregate_usage;
pub mod cluster_health;
pub mod disk_health;
pub mod hardware_health;
pub mod interface_health;
pub mod lun_usage;
pub mod port_health;
pub mod snapmirror_health;
pub mod snapshot_health;
pub mod usage;
pub mod volume_health;
pub mod volume_usage;

/// Runs the check selected on the command line.
pub fn run<A>(api: &A, command: &Command) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    match command {
        Command::About(_) => about::run(api),
        Command::AggregateUsage(args) => aggregate_usage::run(api, args),
        Command::ClusterHealth(_) => cluster_health::run(api),
        Command::DiskHealth(args) => disk_health::run(api, args),
        Command::HardwareHealth(args) => hardware_health::run(api, args),
        Command::InterfaceHealth(args) => interface_health::run(api, args),
        Command::LunUsage(args) => lun_usage::run(api, args),
        Command::PortHealth(args) => port_health::run(api, args),
        Command::SnapmirrorHealth(args) => snapmirror_health::run(api, args),
        Command::SnapshotHealth(args) => snapshot_health::run(api, args),
        Command::VolumeHealth(args) => volume_health::run(api, args),
        Command::VolumeUsage(args) => volume_usage::run(api, args),
    }
}

/// Reduces the report. Messages are joined by `separator`, `all_ok` replaces them when nothing is
/// wrong.
pub(crate) fn finish(report: CheckReport, separator: &str, all_ok: Option<&str>) -> Outcome {
    let (state, message) = report.check_messages(separator, all_ok);
    report.exit(state, message)
}

/// Like [finish], with `summary` as first line in front of the messages.
pub(crate) fn finish_with_summary(report: CheckReport, separator: &str, summary: &str) -> Outcome {
    let (state, message) = report.check_messages(separator, None);
    if message.is_empty() {
        return report.exit(state, summary);
    }
    report.exit(state, format!("{}\n{}", summary, message))
}

/// Checks that the cluster runs at least `minimum`. Returns the UNKNOWN outcome to end the check
/// with otherwise.
pub(crate) fn require_version<A>(api: &A, minimum: &str) -> Result<Option<Outcome>>
where
    A: OntapApi + ?Sized,
{
    let software: models::Software = record(api, models::SOFTWARE, "version")?;
    let version = software.version.unwrap_or_default();
    info!("cluster runs ONTAP {}", version);

    if crate::helper::version_at_least(minimum, &version)? {
        return Ok(None);
    }

    Ok(Some(CheckReport::new().exit(
        State::Unknown,
        format!(
            "at least ONTAP v{} is required. Currently v{} is installed",
            minimum, version
        ),
    )))
}
