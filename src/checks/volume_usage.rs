use log::{debug, info};

use super::usage::{self, SpaceUsage};
use crate::cli::VolumeUsageArgs;
use crate::ontap::{collection, count, models, OntapApi};
use crate::units::to_percent;
use crate::{CheckReport, Outcome, PerfData, Result, State, Threshold, Unit};

const FIELDS: &str = "name,uuid,svm,space,files";

/// The perfdata prefix of a volume: its name, prefixed with the SVM unless the name contains it
/// already.
fn volume_label(volume: &models::Volume) -> String {
    let name = volume.name.as_deref().unwrap_or("unknown");
    match volume.svm.as_ref().and_then(|svm| svm.name.as_deref()) {
        Some(svm) if !name.contains(svm) => format!("{}_{}", svm, name),
        _ => name.to_owned(),
    }
}

fn fetch_volumes<A>(api: &A, names: &[String], report: &mut CheckReport) -> Result<Vec<models::Volume>>
where
    A: OntapApi + ?Sized,
{
    if names.is_empty() {
        return collection(api, models::VOLUMES, FIELDS, &[]);
    }

    let mut volumes = Vec::new();
    for name in names {
        info!("find volume {}", name);
        let found: Vec<models::Volume> =
            collection(api, models::VOLUMES, FIELDS, &[("name", name.as_str())])?;
        if found.is_empty() {
            report.add_message(State::Unknown, format!("volume {} not found", name));
        }
        volumes.extend(found);
    }
    Ok(volumes)
}

/// Checks space usage of volumes, and optionally inode and snapshot reserve usage.
pub fn run<A>(api: &A, args: &VolumeUsageArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let threshold = args.usage.threshold()?;
    let filter = args.usage.filter.item_filter()?;
    let metric = args.usage.usage_metric();
    let inode_threshold =
        Threshold::parse(args.inode_warning.as_deref(), args.inode_critical.as_deref())?;
    let snapshot_threshold = Threshold::parse(
        args.snapshot_warning.as_deref(),
        args.snapshot_critical.as_deref(),
    )?;

    let total = count(api, models::VOLUMES)?;
    info!("found {} volumes", total);
    if total == 0 {
        return Ok(CheckReport::new().exit(State::Unknown, "no volumes found"));
    }

    let mut report = CheckReport::new();
    let volumes = fetch_volumes(api, &args.name, &mut report)?;

    let mut checked = 0;
    for vol in volumes {
        let name = vol.name.as_deref().unwrap_or("unknown");
        let Some(space) = vol.space.as_ref() else {
            debug!("volume {} has no space information", name);
            continue;
        };
        if filter.should_exclude(name) {
            debug!("exclude volume {}", name);
            continue;
        }
        checked += 1;

        let label = volume_label(&vol);
        usage::evaluate(
            &mut report,
            &threshold,
            metric,
            &SpaceUsage {
                name,
                label: &label,
                size: space.size.unwrap_or(0),
                used: space.used.unwrap_or(0),
                available: space.available,
            },
        )?;

        if !inode_threshold.is_empty() {
            let files = vol.files.clone().unwrap_or_default();
            let maximum = files.maximum.unwrap_or(0);
            let used = files.used.unwrap_or(0);
            let pct = to_percent(maximum as f64, used as f64);
            report.add_perfdata(
                PerfData::new(&format!("{}_inodes", label), pct)
                    .with_unit(Unit::Percentage)
                    .with_threshold(&inode_threshold)
                    .with_min(0.0)
                    .with_max(100.0),
            );
            report.add_message(
                inode_threshold.get_status(pct),
                format!("{} (Inodes {}/{} {}%)", name, used, maximum, pct),
            );
        }

        if !snapshot_threshold.is_empty() {
            let snapshot = space.snapshot.clone().unwrap_or_default();
            let pct = snapshot.space_used_percent.unwrap_or_else(|| {
                to_percent(
                    snapshot.reserve_size.unwrap_or(0) as f64,
                    snapshot.used.unwrap_or(0) as f64,
                )
            });
            report.add_perfdata(
                PerfData::new(&format!("{}_snapshot_percent", label), pct)
                    .with_unit(Unit::Percentage)
                    .with_threshold(&snapshot_threshold)
                    .with_min(0.0),
            );
            report.add_message(
                snapshot_threshold.get_status(pct),
                format!("{} (Snapshot reserve used {}%)", name, pct),
            );
        }
    }

    let all_ok = format!("all {} volumes are ok", checked);
    Ok(super::finish(report, "\n  ", Some(&all_ok)))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::cli::Command;
    use crate::testutil::{parse_args, FakeApi};

    fn volume(name: &str, svm: &str, used: u64) -> Value {
        json!({
            "name": name,
            "uuid": format!("uuid-{}", name),
            "svm": {"name": svm, "uuid": "82b98e0f"},
            "space": {
                "size": 1000,
                "used": used,
                "available": 1000 - used,
                "snapshot": {"used": 30, "reserve_size": 50, "space_used_percent": 60}
            },
            "files": {"maximum": 200, "used": 190}
        })
    }

    fn api() -> FakeApi {
        FakeApi::new()
            .with(
                "/api/storage/volumes",
                json!({
                    "records": [
                        volume("nasvol", "svm1", 500),
                        volume("svm1_root", "svm1", 10),
                        {"name": "offline_vol", "svm": {"name": "svm2"}}
                    ],
                    "num_records": 3
                }),
            )
            .with(
                "/api/storage/volumes?name=nasvol",
                json!({"records": [volume("nasvol", "svm1", 950)], "num_records": 1}),
            )
            .with(
                "/api/storage/volumes?name=missing",
                json!({"records": [], "num_records": 0}),
            )
    }

    fn run_args(api: &FakeApi, args: &[&str]) -> Outcome {
        let cli = parse_args(args);
        let Some(Command::VolumeUsage(args)) = cli.command else {
            panic!("wrong command");
        };
        run(api, &args).unwrap()
    }

    #[test]
    fn test_labels() {
        let outcome = run_args(&api(), &["volume-usage", "-w", "80", "-c", "90", "-U", "%"]);

        assert_eq!(outcome.state(), State::Ok);
        assert_eq!(outcome.message(), "all 2 volumes are ok");
        let labels: Vec<_> = outcome.perfdata().iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            [
                "svm1_nasvol_percent",
                "svm1_nasvol_space",
                "svm1_root_percent",
                "svm1_root_space",
            ]
        );
    }

    #[test]
    fn test_names() {
        let outcome = run_args(
            &api(),
            &["volume-usage", "-w", "80", "-c", "90", "-U", "%", "--name", "nasvol", "missing"],
        );

        assert_eq!(outcome.state(), State::Critical);
        assert_eq!(
            outcome.message(),
            "nasvol (Usage 0/0GB 95%)\n  volume missing not found"
        );
    }

    #[test]
    fn test_inodes_and_snapshot_reserve() {
        let outcome = run_args(
            &api(),
            &[
                "volume-usage",
                "-w",
                "80",
                "-c",
                "90",
                "-U",
                "%",
                "--exclude",
                "root",
                "--inode-warning",
                "90",
                "--inode-critical",
                "98",
                "--snapshot-warning",
                "50",
            ],
        );

        assert_eq!(outcome.state(), State::Warning);
        assert_eq!(
            outcome.message(),
            "nasvol (Inodes 190/200 95%)\n  nasvol (Snapshot reserve used 60%)"
        );
        assert_eq!(
            outcome.perfdata()[2].to_perf_string(),
            "svm1_nasvol_inodes=95%;90;98;0;100"
        );
        assert_eq!(
            outcome.perfdata()[3].to_perf_string(),
            "svm1_nasvol_snapshot_percent=60%;50;;0"
        );
    }

    #[test]
    fn test_volume_label() {
        let vol: models::Volume =
            serde_json::from_value(json!({"name": "data", "svm": {"name": "svm1"}})).unwrap();
        assert_eq!(volume_label(&vol), "svm1_data");

        let vol: models::Volume = serde_json::from_value(json!({"name": "data"})).unwrap();
        assert_eq!(volume_label(&vol), "data");
    }
}
