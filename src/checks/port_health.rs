use std::collections::HashSet;

use log::{debug, error, info};

use crate::cli::FilteredArgs;
use crate::ontap::{collection, models, OntapApi};
use crate::{CheckReport, ItemFilter, Outcome, Result, State};

const FC_OK: &[&str] = &["online", "link_not_connected"];
const FC_WARNING: &[&str] = &["startup", "link_disconnected"];
const FC_CRITICAL: &[&str] = &["node_offline", "offlined_by_system"];

/// Number of ports looked at and how many of them are disabled.
#[derive(Debug, Default, PartialEq)]
struct PortCount {
    total: u64,
    disabled: u64,
}

fn fc_state(state: &str) -> State {
    if FC_OK.contains(&state) {
        State::Ok
    } else if FC_WARNING.contains(&state) {
        State::Warning
    } else if FC_CRITICAL.contains(&state) {
        State::Critical
    } else {
        State::Unknown
    }
}

fn names(ports: &Option<Vec<models::Reference>>) -> Vec<&str> {
    ports
        .iter()
        .flatten()
        .map(|p| p.name())
        .collect()
}

fn fibre_channel<A>(api: &A, filter: &ItemFilter, report: &mut CheckReport) -> PortCount
where
    A: OntapApi + ?Sized,
{
    let ports: Vec<models::FcPort> = match collection(
        api,
        models::FC_PORTS,
        "name,state,enabled,physical_protocol,node",
        &[],
    ) {
        Ok(ports) => ports,
        Err(err) => {
            error!("fetching fc ports failed: {}", err);
            report.add_message(State::Unknown, format!("Error retrieving FC ports: {}", err));
            return PortCount::default();
        }
    };

    if ports.is_empty() {
        info!("no fc-ports found");
        report.add_message(State::Ok, "no fc-ports found on device");
        return PortCount::default();
    }

    let mut count = PortCount::default();
    for fc in ports {
        let name = fc.name.as_deref().unwrap_or("unknown");
        if filter.should_exclude(name) {
            info!("exclude port {}", name);
            continue;
        }

        let protocol = fc.physical_protocol.as_deref().unwrap_or("unknown");
        if protocol != "fibre_channel" {
            info!("FcPort isn't a fibre channel {} {}", name, protocol);
            continue;
        }

        count.total += 1;
        let state = fc.state.as_deref().unwrap_or("unknown");
        if !fc.enabled.unwrap_or(false) || state.contains("offlined_by_user") {
            info!("FcPort isn't enabled {}", name);
            count.disabled += 1;
            continue;
        }

        let node = fc.node.as_ref().map_or("unknown", |n| n.name());
        debug!("{:?}", fc);
        report.add_message(
            fc_state(state),
            format!("{} {} on node {} is {}", protocol, name, node, state),
        );
    }
    count
}

fn ethernet<A>(api: &A, filter: &ItemFilter, report: &mut CheckReport) -> PortCount
where
    A: OntapApi + ?Sized,
{
    let ports: Vec<models::Port> = match collection(
        api,
        models::ETHERNET_PORTS,
        "name,type,state,enabled,node,lag",
        &[],
    ) {
        Ok(ports) => ports,
        Err(err) => {
            error!("fetching ports failed: {}", err);
            report.add_message(State::Unknown, format!("Error retrieving ports: {}", err));
            return PortCount::default();
        }
    };

    if ports.is_empty() {
        report.add_message(State::Ok, "no ports found on device");
        return PortCount::default();
    }

    let mut count = PortCount::default();
    for port in ports {
        let name = port.name.as_deref().unwrap_or("unknown");
        if filter.should_exclude(name) {
            info!("exclude port {}", name);
            continue;
        }

        count.total += 1;
        if !port.enabled.unwrap_or(false) {
            info!("Port isn't enabled {}", name);
            count.disabled += 1;
            continue;
        }

        let kind = port.kind.as_deref().unwrap_or("unknown");
        let state = port.state.as_deref().unwrap_or("unknown");
        let node = port.node.as_ref().map_or("unknown", |n| n.name());
        info!("checking {} - {} - {}", node, name, kind);
        let out = format!("{} {} on node {} is {}", kind, name, node, state);

        if kind.contains("lag") {
            let lag = port.lag.clone().unwrap_or_default();
            let active = names(&lag.active_ports);
            let active_set: HashSet<&str> = active.iter().copied().collect();
            let missing: Vec<&str> = names(&lag.member_ports)
                .into_iter()
                .filter(|m| !active_set.contains(m))
                .collect();

            if missing.is_empty() {
                report.add_message(
                    State::Ok,
                    format!("{}, with members [{}]", out, active.join(", ")),
                );
            } else {
                report.add_message(
                    State::Critical,
                    format!("{}, port [{}] is missing on lag", out, missing.join(", ")),
                );
            }
        } else if state.contains("up") {
            report.add_message(State::Ok, out);
        } else {
            report.add_message(State::Critical, out);
        }
    }
    count
}

/// Checks fibre channel and ethernet ports. A failure to fetch one family is reported and the
/// other family is still checked.
pub fn run<A>(api: &A, args: &FilteredArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let filter = args.filter.item_filter()?;
    let mut report = CheckReport::new();

    let fc = fibre_channel(api, &filter, &mut report);
    let eth = ethernet(api, &filter, &mut report);

    let total = fc.total + eth.total;
    let disabled = fc.disabled + eth.disabled;
    let summary = format!(
        "checked {} Ports; ({} enabled, {} disabled)",
        total,
        total - disabled,
        disabled
    );
    Ok(super::finish_with_summary(report, "\n", &summary))
}
