use log::{debug, info};

use crate::cli::FilteredArgs;
use crate::ontap::{collection, count, models, OntapApi};
use crate::{CheckReport, Outcome, Result, State};

/// Checks that enabled ip interfaces are up and located on their home node.
pub fn run<A>(api: &A, args: &FilteredArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let filter = args.filter.item_filter()?;

    let total = count(api, models::IP_INTERFACES)?;
    info!("found {} interfaces", total);
    if total == 0 {
        return Ok(CheckReport::new().exit(State::Unknown, "no interfaces found"));
    }

    let interfaces: Vec<models::IpInterface> = collection(
        api,
        models::IP_INTERFACES,
        "name,state,enabled,ip,location",
        &[],
    )?;
    let interfaces: Vec<_> = interfaces
        .into_iter()
        .filter(|int| {
            let name = int.name.as_deref().unwrap_or("unknown");
            let excluded = filter.should_exclude(name);
            if excluded {
                debug!("exclude interface {}", name);
            }
            !excluded
        })
        .collect();

    let mut report = CheckReport::new();
    let mut up = 0;
    for int in interfaces.iter() {
        let name = int.name.as_deref().unwrap_or("unknown");
        if !int.enabled.unwrap_or(false) {
            info!("Interface {} is not enabled, ignore", name);
            continue;
        }

        let state = int.state.as_deref().unwrap_or("unknown");
        if state.contains("down") {
            report.add_message(State::Critical, format!("int {} is {}", name, state));
        } else {
            up += 1;
        }

        let location = int.location.clone().unwrap_or_default();
        if !location.is_home.unwrap_or(false) {
            report.add_message(
                State::Critical,
                format!(
                    "Int {} is on {} but should be on {}",
                    name,
                    location.node.as_ref().map_or("unknown", |n| n.name()),
                    location.home_node.as_ref().map_or("unknown", |n| n.name()),
                ),
            );
        }
    }

    report.add_message(
        State::Ok,
        format!("{} of {} Interfaces are up", up, interfaces.len()),
    );
    for int in interfaces.iter() {
        let ip = int.ip.clone().unwrap_or_default();
        report.add_message(
            State::Ok,
            format!(
                "Int {:40}{:5}{:16}/{:3} is homed {}",
                int.name.as_deref().unwrap_or("unknown"),
                int.state.as_deref().unwrap_or("unknown"),
                ip.address.as_deref().unwrap_or("-"),
                ip.netmask.as_deref().unwrap_or("-"),
                int.location
                    .as_ref()
                    .and_then(|l| l.is_home)
                    .unwrap_or(false)
            ),
        );
    }

    Ok(super::finish(report, "\n  ", None))
}
