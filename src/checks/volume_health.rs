use log::{debug, info};

use crate::cli::VolumeHealthArgs;
use crate::ontap::{collection, count, models, OntapApi};
use crate::{CheckReport, ItemFilter, Outcome, Result, State};

const FIELDS: &str = "name,state,style,comment";

/// Splits a comma separated list of volume states like `offline,error`.
fn state_list(states: Option<&str>) -> Vec<&str> {
    states
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn classify(state: &str, warning: &[&str], critical: &[&str]) -> State {
    if critical.contains(&state) {
        State::Critical
    } else if warning.contains(&state) {
        State::Warning
    } else {
        State::Ok
    }
}

fn fetch_volumes<A>(
    api: &A,
    args: &VolumeHealthArgs,
    filter: &ItemFilter,
    report: &mut CheckReport,
) -> Result<Vec<models::Volume>>
where
    A: OntapApi + ?Sized,
{
    if args.name.is_empty() {
        let volumes: Vec<models::Volume> = collection(api, models::VOLUMES, FIELDS, &[])?;
        return Ok(volumes
            .into_iter()
            .filter(|vol| {
                let name = vol.name.as_deref().unwrap_or("unknown");
                !filter.should_exclude(name)
            })
            .collect());
    }

    let mut volumes = Vec::new();
    for name in &args.name {
        info!("find volume {}", name);
        let found: Vec<models::Volume> =
            collection(api, models::VOLUMES, FIELDS, &[("name", name.as_str())])?;
        if found.is_empty() {
            report.add_message(State::Unknown, format!("Vol: {} not found", name));
        }
        volumes.extend(found);
    }
    Ok(volumes)
}

/// Checks the state of volumes against lists of warning and critical states.
pub fn run<A>(api: &A, args: &VolumeHealthArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let filter = args.filter.item_filter()?;
    let warning = state_list(args.warning.as_deref());
    let critical = state_list(args.critical.as_deref());

    let total = count(api, models::VOLUMES)?;
    info!("found {} volumes", total);
    if total == 0 {
        return Ok(CheckReport::new().exit(State::Unknown, "no volumes found"));
    }

    let mut report = CheckReport::new();
    let volumes = fetch_volumes(api, args, &filter, &mut report)?;

    let mut checked = 0;
    for vol in volumes {
        let name = vol.name.as_deref().unwrap_or("unknown");
        let Some(state) = vol.state.as_deref() else {
            debug!("volume {} has no state", name);
            continue;
        };
        info!(
            "state: {}\tname: {}\tstyle: {}\tcomment: {}",
            state,
            name,
            vol.style.as_deref().unwrap_or_default(),
            vol.comment.as_deref().unwrap_or_default()
        );
        checked += 1;

        report.add_message(
            classify(state, &warning, &critical),
            format!("Vol: {} has state {}", name, state),
        );
    }

    let summary = format!("checked {} volumes", checked);
    Ok(super::finish_with_summary(report, "\n", &summary))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cli::Command;
    use crate::testutil::{parse_args, FakeApi};

    fn api() -> FakeApi {
        FakeApi::new()
            .with(
                "/api/storage/volumes",
                json!({
                    "records": [
                        {"name": "vol1", "state": "online", "style": "flexvol"},
                        {"name": "vol2", "state": "offline", "style": "flexvol"},
                        {"name": "vol3", "state": "mixed", "style": "flexgroup"},
                        {"name": "vol4"}
                    ],
                    "num_records": 4
                }),
            )
            .with(
                "/api/storage/volumes?name=vol1",
                json!({"records": [{"name": "vol1", "state": "online"}]}),
            )
    }

    fn run_args(api: &FakeApi, args: &[&str]) -> Outcome {
        let cli = parse_args(args);
        let Some(Command::VolumeHealth(args)) = cli.command else {
            panic!("wrong command");
        };
        run(api, &args).unwrap()
    }

    #[test]
    fn test_state_lists() {
        let outcome = run_args(
            &api(),
            &["volume-health", "-w", "mixed", "-c", "offline,error"],
        );

        assert_eq!(outcome.state(), State::Critical);
        assert_eq!(
            outcome.message(),
            "checked 3 volumes\nVol: vol2 has state offline\nVol: vol3 has state mixed"
        );
    }

    #[test]
    fn test_critical_wins_over_warning() {
        let outcome = run_args(
            &api(),
            &["volume-health", "-w", "offline", "-c", "offline", "--include", "vol2"],
        );
        assert_eq!(outcome.state(), State::Critical);
        assert_eq!(outcome.message(), "checked 1 volumes\nVol: vol2 has state offline");
    }

    #[test]
    fn test_all_ok() {
        let outcome = run_args(&api(), &["volume-health", "--name", "vol1"]);
        assert_eq!(
            outcome.to_nagios_string(),
            "OK - checked 1 volumes\nVol: vol1 has state online"
        );
    }

    #[test]
    fn test_missing_volume() {
        let api = api().with("/api/storage/volumes?name=gone", json!({"records": []}));
        let outcome = run_args(&api, &["volume-health", "--name", "vol1", "gone"]);
        assert_eq!(outcome.state(), State::Unknown);
        assert_eq!(outcome.message(), "checked 1 volumes\nVol: gone not found");
    }

    #[test]
    fn test_state_list() {
        assert_eq!(state_list(Some("offline, error,,")), ["offline", "error"]);
        assert!(state_list(None).is_empty());
    }
}
