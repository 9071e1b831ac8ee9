use std::collections::BTreeMap;

use log::{debug, info};

use crate::cli::{DiskHealthArgs, DiskMode};
use crate::ontap::{collection, count, models, OntapApi};
use crate::{CheckReport, ItemFilter, Outcome, PerfData, Result, State};

const MULTIPATH_MIN_VERSION: &str = "9.9";

fn bay(disk: &models::Disk) -> String {
    disk.bay.map_or_else(|| "-".to_owned(), |b| b.to_string())
}

fn reference_name(reference: &Option<models::Reference>) -> &str {
    reference.as_ref().map_or("unknown", |r| r.name())
}

/// Checks disk states, or with `--mode multipath` that every disk has a symmetric number of paths.
pub fn run<A>(api: &A, args: &DiskHealthArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let filter = args.filter.item_filter()?;

    if args.mode == DiskMode::Multipath {
        if let Some(outcome) = super::require_version(api, MULTIPATH_MIN_VERSION)? {
            return Ok(outcome);
        }
    }

    let total = count(api, models::DISKS)?;
    debug!("found {} disks", total);
    if total == 0 {
        return Ok(CheckReport::new().exit(State::Unknown, "no disks found"));
    }

    let fields = match args.mode {
        DiskMode::Multipath => "name,bay,node,paths",
        DiskMode::Diskhealth => "name,state,container_type,bay,node,home_node",
    };
    let disks: Vec<models::Disk> = collection(api, models::DISKS, fields, &[])?;

    let mut report = CheckReport::new();
    match args.mode {
        DiskMode::Multipath => check_multipath(&mut report, &filter, &disks),
        DiskMode::Diskhealth => check_diskstate(&mut report, &filter, &disks),
    }

    Ok(super::finish(report, "\n  ", None))
}

fn check_multipath(report: &mut CheckReport, filter: &ItemFilter, disks: &[models::Disk]) {
    info!("starting multipath check");
    let mut checked = 0u64;

    for disk in disks {
        let name = disk.name.as_deref().unwrap_or("unknown");
        if filter.should_exclude(name) {
            continue;
        }
        let Some(paths) = disk.paths.as_ref() else {
            debug!("disk {} has no paths", name);
            continue;
        };

        if paths.len() % 2 != 0 {
            report.add_message(
                State::Warning,
                format!(
                    "Disk {:7} on bay {:>2} of node {} has {} paths",
                    name,
                    bay(disk),
                    reference_name(&disk.node),
                    paths.len()
                ),
            );
        }
        checked += 1;
    }

    report.add_perfdata(PerfData::new("total", checked as f64));
    report.add_message(
        State::Ok,
        format!("{} disks have symmetric paths", checked),
    );
}

fn check_diskstate(report: &mut CheckReport, filter: &ItemFilter, disks: &[models::Disk]) {
    let mut container_types: BTreeMap<&str, u64> = BTreeMap::new();
    let mut healthy = Vec::new();
    let mut checked = 0u64;

    for disk in disks {
        let name = disk.name.as_deref().unwrap_or("unknown");
        if filter.should_exclude(name) {
            continue;
        }
        debug!("disk {:?}", disk);
        checked += 1;

        let container_type = disk.container_type.as_deref().unwrap_or("unknown");
        *container_types.entry(container_type).or_insert(0) += 1;

        let state = disk.state.as_deref().unwrap_or("unknown");
        let home = reference_name(&disk.home_node);
        let node = reference_name(&disk.node);

        if container_type == "remote" {
            if node != home {
                report.add_message(
                    State::Warning,
                    format!(
                        "Disk {:7} on bay {:>2} of node {} is not on home node",
                        name,
                        bay(disk),
                        home
                    ),
                );
            }
            continue;
        }

        let node_uuid = disk.node.as_ref().and_then(|n| n.uuid.as_deref());
        let home_uuid = disk.home_node.as_ref().and_then(|n| n.uuid.as_deref());
        if node_uuid != home_uuid {
            report.add_message(
                State::Warning,
                format!("Disk {} is on node {} instead of {}", name, node, home),
            );
        }

        let msg = format!(
            "Disk {:7} on bay {:>2} of node {} is {}",
            name,
            bay(disk),
            home,
            state
        );
        if state.starts_with("reconstructing") {
            report.add_message(State::Warning, msg);
        } else if state.starts_with("broken") || state.starts_with("offline") {
            report.add_message(State::Critical, msg);
        } else {
            healthy.push((name, msg));
        }
    }

    for (container_type, n) in container_types.iter() {
        report.add_perfdata(PerfData::new(container_type, *n as f64));
    }
    report.add_perfdata(PerfData::new("total", checked as f64));

    let types: Vec<String> = container_types
        .iter()
        .map(|(t, n)| format!("{} {}", n, t))
        .collect();
    report.add_message(
        State::Ok,
        format!("found {} disks at all while {}", checked, types.join(" - ")),
    );

    healthy.sort();
    for (_, msg) in healthy {
        report.add_message(State::Ok, msg);
    }
}
