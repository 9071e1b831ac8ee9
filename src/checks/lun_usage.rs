use log::{debug, info};

use super::usage::{self, SpaceUsage};
use crate::cli::UsageArgs;
use crate::ontap::{collection, count, models, OntapApi};
use crate::{CheckReport, Outcome, Result, State};

/// Checks the space usage of every lun.
pub fn run<A>(api: &A, args: &UsageArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let threshold = args.threshold()?;
    let filter = args.filter.item_filter()?;
    let metric = args.usage_metric();

    let total = count(api, models::LUNS)?;
    info!("found {} luns", total);
    if total == 0 {
        return Ok(CheckReport::new().exit(State::Unknown, "no luns found"));
    }

    let luns: Vec<models::Lun> = collection(api, models::LUNS, "name,space", &[])?;

    let mut report = CheckReport::new();
    let mut checked = 0;
    for lun in luns {
        debug!("lun info {:?}", lun);
        let name = lun.name.as_deref().unwrap_or("unknown");
        if filter.should_exclude(name) {
            continue;
        }
        checked += 1;

        let space = lun.space.clone().unwrap_or_default();
        usage::evaluate(
            &mut report,
            &threshold,
            metric,
            &SpaceUsage {
                name,
                label: name,
                size: space.size.unwrap_or(0),
                used: space.used.unwrap_or(0),
                available: space.available,
            },
        )?;
    }

    let all_ok = format!("all {} luns are ok", checked);
    Ok(super::finish(report, "\n  ", Some(&all_ok)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cli::Command;
    use crate::testutil::{parse_args, FakeApi};

    fn api() -> FakeApi {
        FakeApi::new().with(
            "/api/storage/luns",
            json!({
                "records": [
                    {"name": "/vol/esx01/lun0", "space": {"size": 2000, "used": 1000}},
                    {"name": "/vol/esx02/lun0", "space": {"size": 2000, "used": 1900}},
                    {"name": "/vol/sql01/lun0", "space": {"size": 4000, "used": 100}}
                ],
                "num_records": 3
            }),
        )
    }

    fn run_args(api: &FakeApi, args: &[&str]) -> Outcome {
        let cli = parse_args(args);
        let Some(Command::LunUsage(args)) = cli.command else {
            panic!("wrong command");
        };
        run(api, &args).unwrap()
    }

    #[test]
    fn test_raw_bytes() {
        let outcome = run_args(&api(), &["lun-usage", "-w", "1500", "-c", "1800"]);

        assert_eq!(outcome.state(), State::Critical);
        assert_eq!(outcome.message(), "/vol/esx02/lun0 (Usage 1900/2000B 95%)");
        assert_eq!(
            outcome.perfdata()[0].to_perf_string(),
            "/vol/esx01/lun0_space=1000B;1500;1800;0;2000"
        );
        assert_eq!(
            outcome.perfdata()[1].to_perf_string(),
            "/vol/esx01/lun0_percent=50%;75;90;0;100"
        );
    }

    #[test]
    fn test_all_ok() {
        let outcome = run_args(
            &api(),
            &["lun-usage", "-w", "80", "-c", "90", "-U", "%", "--include", "esx01|sql"],
        );
        assert_eq!(outcome.to_nagios_string().lines().next().unwrap(), {
            "OK - all 2 luns are ok | /vol/esx01/lun0_percent=50%;80;90;0;100 \
             /vol/esx01/lun0_space=1000B;1600;1800;0;2000 \
             /vol/sql01/lun0_percent=2.5%;80;90;0;100 \
             /vol/sql01/lun0_space=100B;3200;3600;0;4000"
        });
    }

    #[test]
    fn test_no_luns() {
        let api = FakeApi::new().with("/api/storage/luns", json!({"num_records": 0}));
        let outcome = run_args(&api, &["lun-usage", "-w", "80", "-c", "90"]);
        assert_eq!(outcome.state(), State::Unknown);
        assert_eq!(outcome.message(), "no luns found");
    }
}
