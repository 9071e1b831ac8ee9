use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::cli::{SnapshotFilterMode, SnapshotHealthArgs};
use crate::helper::parse_duration;
use crate::ontap::{collection, models, OntapApi};
use crate::{CheckReport, Outcome, PerfData, Range, Result, State, Threshold};

const MIN_VERSION: &str = "9.10.1";

/// The oldest snapshot of a volume.
#[derive(Debug)]
struct VolumeSnapshots {
    volume: String,
    count: u64,
    oldest: Option<(String, f64)>,
}

/// An age limit like `1.5h` as range `0:<seconds>`.
fn age_range(age: Option<&str>) -> Result<Option<Range>> {
    match age.map(str::trim) {
        None | Some("") => Ok(None),
        Some(age) => Ok(Some(Range::new(0.0, parse_duration(age)?, true)?)),
    }
}

/// Checks the age of the oldest snapshot and the number of snapshots of every volume.
pub fn run<A>(api: &A, args: &SnapshotHealthArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    run_at(api, args, Utc::now())
}

fn run_at<A>(api: &A, args: &SnapshotHealthArgs, now: DateTime<Utc>) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let filter = args.filter.item_filter()?;
    let age = Threshold::new(
        age_range(args.warning.as_deref())?,
        age_range(args.critical.as_deref())?,
    );
    let count_threshold = Threshold::parse(args.count.as_deref(), None)?;

    if let Some(outcome) = super::require_version(api, MIN_VERSION)? {
        return Ok(outcome);
    }

    let volumes: Vec<models::Volume> =
        collection(api, models::VOLUMES, "name,uuid,snapshot_count", &[])?;

    let mut snaps = Vec::new();
    let mut with_snapshots = 0;
    for vol in volumes.iter() {
        let name = vol.name.as_deref().unwrap_or("unknown");
        if args.mode == SnapshotFilterMode::Volume && filter.should_exclude(name) {
            info!("item filter has matched {}", name);
            continue;
        }
        let Some(count) = vol.snapshot_count else {
            debug!("{} has no snapshot count", name);
            continue;
        };

        if count == 0 {
            debug!("no snapshots found for {}", name);
            snaps.push(VolumeSnapshots {
                volume: name.to_owned(),
                count,
                oldest: None,
            });
            continue;
        }

        let Some(uuid) = vol.uuid.as_deref() else {
            continue;
        };
        let snapshots: Vec<models::Snapshot> =
            collection(api, &models::snapshots(uuid), "name,create_time", &[])?;
        info!("{} has {} snapshots", name, count);

        let oldest = snapshots
            .iter()
            .filter(|s| {
                let excluded = args.mode == SnapshotFilterMode::Snapshot
                    && filter.should_exclude(s.name.as_deref().unwrap_or_default());
                !excluded
            })
            .filter_map(|s| Some((s.name.clone().unwrap_or_default(), s.create_time?)))
            .min_by_key(|(_, created)| *created);

        let Some((snapshot, created)) = oldest else {
            continue;
        };
        with_snapshots += 1;

        let seconds = (now - created.with_timezone(&Utc)).num_seconds().max(0) as f64;
        info!("oldest snapshot of {} is {} from {}", name, snapshot, created);
        snaps.push(VolumeSnapshots {
            volume: name.to_owned(),
            count,
            oldest: Some((snapshot, seconds)),
        });
    }

    let mut report = CheckReport::new();
    let mut outdated = 0;
    for snap in snaps.iter() {
        if !count_threshold.is_empty() {
            let status = count_threshold.get_status(snap.count as f64);
            if status != State::Ok {
                report.add_message(
                    status,
                    format!("{} has {} snapshots", snap.volume, snap.count),
                );
                report.add_perfdata(
                    PerfData::new(&format!("{}_snapshots", snap.volume), snap.count as f64)
                        .with_threshold(&count_threshold),
                );
            }
        }

        if let Some((snapshot, seconds)) = snap.oldest.as_ref() {
            let status = age.get_status(*seconds);
            if status != State::Ok {
                outdated += 1;
                report.add_message(
                    status,
                    format!(
                        "Snapshot {} of volume {} is outdated",
                        snapshot, snap.volume
                    ),
                );
            }
        }

        if args.no_snapshot && snap.count == 0 {
            report.add_message(
                State::Warning,
                format!("no snapshots for volume {}", snap.volume),
            );
        }
    }

    report.add_perfdata(PerfData::new("total_volumes", volumes.len() as f64));
    report.add_perfdata(PerfData::new("snapshoted_volumes", with_snapshots as f64));

    let all_ok = format!(
        "{} of total {} volumes with snapshots are fine",
        with_snapshots,
        volumes.len()
    );
    let (state, message) = report.check_messages("\n", Some(&all_ok));
    if state == State::Ok {
        return Ok(report.exit(state, message));
    }
    Ok(report.exit(
        state,
        format!(
            "found {} volumes with outdated snapshots\n{}",
            outdated, message
        ),
    ))
}
