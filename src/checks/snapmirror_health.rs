use log::{debug, info, warn};

use crate::cli::SnapmirrorHealthArgs;
use crate::helper::{format_duration, parse_iso8601_duration};
use crate::ontap::{collection, models, OntapApi};
use crate::{CheckReport, Outcome, Result, State};

/// Checks health and lag time of snapmirror relationships.
pub fn run<A>(api: &A, args: &SnapmirrorHealthArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let threshold = args.threshold()?;
    let filter = args.filter.item_filter()?;

    let relationships: Vec<models::SnapmirrorRelationship> = collection(
        api,
        models::SNAPMIRROR_RELATIONSHIPS,
        "state,healthy,lag_time,source,unhealthy_reason",
        &[],
    )?;

    let mut report = CheckReport::new();
    let mut checked = 0;
    let mut problems = 0;
    for rel in relationships {
        let path = rel
            .source
            .as_ref()
            .and_then(|s| s.path.as_deref())
            .unwrap_or("unknown");
        if filter.should_exclude(path) {
            debug!("exclude relationship {}", path);
            continue;
        }
        checked += 1;

        let state = rel.state.as_deref().unwrap_or("unknown");
        let healthy = rel.healthy.unwrap_or(false);

        match rel.lag_time.as_deref().map(|l| (l, parse_iso8601_duration(l))) {
            Some((lag_time, Err(err))) => {
                warn!("{}: {}", path, err);
                problems += 1;
                report.add_message(
                    State::Unknown,
                    format!("lag time {} of {} is not readable", lag_time, path),
                );
            }
            Some((_, Ok(lag))) => {
                info!(
                    "Health: {} state: {} lag: {} {}",
                    healthy,
                    state,
                    format_duration(lag),
                    path
                );
                let status = threshold.get_status(lag as f64);
                if status != State::Ok {
                    problems += 1;
                }
                report.add_message(
                    status,
                    format!("lag time for {} is {}", path, format_duration(lag)),
                );
            }
            None => info!("no lag time for {} in state {}", path, state),
        }

        if healthy {
            continue;
        }
        problems += 1;

        let reasons = rel.unhealthy_reason.unwrap_or_default();
        if reasons.is_empty() {
            report.add_message(
                State::Critical,
                format!("Relationship {} for {}", state, path),
            );
        }
        for reason in reasons {
            report.add_message(
                State::Critical,
                reason.message.unwrap_or_else(|| "unhealthy".to_owned()),
            );
        }
    }

    let (state, message) = report.check_messages("\n  ", None);
    if state == State::Ok {
        return Ok(report.exit(state, format!("No problems found ( {} checked )", checked)));
    }
    Ok(report.exit(
        state,
        format!("{} Problems found\n  {}", problems, message),
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::cli::Command;
    use crate::testutil::{parse_args, FakeApi};

    fn relationship(path: &str, healthy: bool, lag_time: &str) -> Value {
        json!({
            "state": "snapmirrored",
            "healthy": healthy,
            "lag_time": lag_time,
            "source": {"path": path}
        })
    }

    fn api(relationships: Vec<Value>) -> FakeApi {
        FakeApi::new().with(
            "/api/snapmirror/relationships",
            json!({"records": relationships}),
        )
    }

    fn run_args(api: &FakeApi, args: &[&str]) -> Outcome {
        let cli = parse_args(args);
        let Some(Command::SnapmirrorHealth(args)) = cli.command else {
            panic!("wrong command");
        };
        run(api, &args).unwrap()
    }

    #[test]
    fn test_no_problems() {
        let api = api(vec![
            relationship("svm1:vol1", true, "PT1H"),
            relationship("svm1:vol2", true, "PT15M"),
        ]);
        let outcome = run_args(&api, &["snapmirror-health", "-w", "7200", "-c", "86400"]);

        assert_eq!(
            outcome.to_nagios_string(),
            "OK - No problems found ( 2 checked )"
        );
    }

    #[test]
    fn test_lag_and_health() {
        let mut broken = relationship("svm1:vol3", false, "PT5M");
        broken["unhealthy_reason"] = json!([{"message": "Transfer failed.", "code": "6619546"}]);
        let mut uninitialized = relationship("svm1:vol4", false, "PT1S");
        uninitialized["state"] = json!("uninitialized");

        let api = api(vec![
            relationship("svm1:vol1", true, "P1DT2H"),
            broken,
            uninitialized,
        ]);
        let outcome = run_args(&api, &["snapmirror-health", "-w", "7200", "-c", "86400"]);

        assert_eq!(outcome.state(), State::Critical);
        assert_eq!(
            outcome.message(),
            "3 Problems found\n  \
             lag time for svm1:vol1 is 1d 2:00:00\n  \
             Transfer failed.\n  \
             Relationship uninitialized for svm1:vol4"
        );
    }

    #[test]
    fn test_filter_on_source_path() {
        let api = api(vec![
            relationship("svm1:vol1", false, "PT1H"),
            relationship("svm2:vol1", true, "PT1H"),
        ]);
        let outcome = run_args(&api, &["snapmirror-health", "--include", "^svm2:"]);
        assert_eq!(outcome.message(), "No problems found ( 1 checked )");
    }

    #[test]
    fn test_unreadable_lag_time() {
        let api = api(vec![
            relationship("svm1:vol1", true, "yesterday"),
            relationship("svm1:vol2", true, "P1DT2H"),
            relationship("svm1:vol3", true, "PT1.5S"),
        ]);
        let outcome = run_args(&api, &["snapmirror-health", "-w", "7200"]);

        assert_eq!(outcome.state(), State::Warning);
        assert_eq!(
            outcome.message(),
            "2 Problems found\n  \
             lag time for svm1:vol2 is 1d 2:00:00\n  \
             lag time yesterday of svm1:vol1 is not readable"
        );
    }
}
