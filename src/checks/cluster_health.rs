use log::debug;

use crate::ontap::{collection, models, record, OntapApi};
use crate::{CheckReport, Outcome, Result, State};

fn ha_state(state: &Option<models::HaState>) -> &str {
    state
        .as_ref()
        .and_then(|s| s.state.as_deref())
        .unwrap_or("unknown")
}

/// Checks the global cluster status and the state of every node.
pub fn run<A>(api: &A) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let mut report = CheckReport::new();

    let cluster: models::Cluster = record(api, models::CLUSTER, "name,metric,version")?;
    debug!("cluster info {:?}", cluster);

    let status = cluster
        .metric
        .as_ref()
        .and_then(|m| m.status.as_deref())
        .unwrap_or("unknown");
    if status.contains("ok") {
        let version = cluster
            .version
            .as_ref()
            .and_then(|v| v.full.as_deref())
            .unwrap_or("unknown version");
        report.add_message(State::Ok, version);
    } else {
        report.add_message(
            State::Critical,
            format!("Cluster global status is {}", status),
        );
    }

    let nodes: Vec<models::Node> =
        collection(api, models::NODES, "name,state,membership,ha", &[])?;
    for node in nodes {
        debug!("node info {:?}", node);
        let state = node.state.as_deref().unwrap_or("unknown");
        let ha = node.ha.unwrap_or_default();
        let msg = format!(
            "{} state {} as {}; giveback: {}; takeover: {}",
            node.name.as_deref().unwrap_or("unknown"),
            state,
            node.membership.as_deref().unwrap_or("unknown"),
            ha_state(&ha.giveback),
            ha_state(&ha.takeover),
        );

        if state.contains("up") {
            report.add_message(State::Ok, msg);
        } else if state.contains("down") {
            report.add_message(State::Critical, msg);
        } else {
            report.add_message(State::Warning, msg);
        }
    }

    Ok(super::finish(report, "\n", None))
}
