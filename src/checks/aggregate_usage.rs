use log::{debug, info};

use super::usage::{self, SpaceUsage};
use crate::cli::UsageArgs;
use crate::ontap::{collection, count, models, OntapApi};
use crate::{CheckReport, Outcome, Result, State};

/// Checks the block storage usage of every aggregate. A raid group under reconstruction is
/// critical regardless of the usage.
pub fn run<A>(api: &A, args: &UsageArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let threshold = args.threshold()?;
    let filter = args.filter.item_filter()?;
    let metric = args.usage_metric();

    let total = count(api, models::AGGREGATES)?;
    info!("found {} aggregates", total);
    if total == 0 {
        return Ok(CheckReport::new().exit(State::Unknown, "no aggregates found"));
    }

    let aggregates: Vec<models::Aggregate> =
        collection(api, models::AGGREGATES, "name,uuid,space", &[])?;

    let mut report = CheckReport::new();
    let mut checked = 0;
    for aggr in aggregates {
        let name = aggr.name.as_deref().unwrap_or("unknown");
        if filter.should_exclude(name) {
            debug!("exclude aggregate {}", name);
            continue;
        }
        checked += 1;

        if let Some(uuid) = aggr.uuid.as_deref() {
            let plexes: Vec<models::Plex> =
                collection(api, &models::plexes(uuid), "name,raid_groups", &[])?;
            for plex in plexes {
                debug!("plex {:?}", plex);
                for rg in plex.raid_groups.unwrap_or_default() {
                    let reconstructing = rg.reconstruct.and_then(|r| r.active).unwrap_or(false);
                    if reconstructing {
                        report.add_message(
                            State::Critical,
                            format!(
                                "RaidGroup {} on Plex {} is reconstructing",
                                rg.name.as_deref().unwrap_or("unknown"),
                                plex.name.as_deref().unwrap_or("unknown")
                            ),
                        );
                    }
                }
            }
        }

        let space = aggr
            .space
            .and_then(|s| s.block_storage)
            .unwrap_or_default();
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

    let all_ok = format!("all {} aggregates are fine", checked);
    Ok(super::finish(report, "\n  ", Some(&all_ok)))
}
