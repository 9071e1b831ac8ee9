use log::debug;

use crate::ontap::{models, record, OntapApi};
use crate::{CheckReport, Outcome, Result, State};

/// Reports the ONTAP version of the cluster. Useful to verify credentials and connectivity.
pub fn run<A>(api: &A) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let software: models::Software = record(api, models::SOFTWARE, "version")?;
    debug!("software info {:?}", software);

    let mut report = CheckReport::new();
    report.add_message(
        State::Ok,
        format!(
            "current version id {}",
            software.version.as_deref().unwrap_or("unknown")
        ),
    );

    Ok(super::finish(report, "\n", None))
}
