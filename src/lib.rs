//! The checkontap crate implements nagios/icinga checks for NetApp ONTAP clusters.
//!
//! Every check follows the same recipe: fetch records through the [ontap] client, drop the ones
//! rejected by an [ItemFilter], classify the interesting figures with a [Threshold] and collect the
//! findings in a [CheckReport], which is reduced once into the final [Outcome].
//!
//! ```rust
//! # use checkontap::{CheckReport, State, Threshold};
//! let threshold = Threshold::parse(Some("80"), Some("90")).unwrap();
//! let mut report = CheckReport::new();
//! report.add_message(threshold.get_status(85.0), "aggr1 is 85% full");
//! report.add_message(State::Ok, "aggr2 is 12% full");
//!
//! let (state, message) = report.check_messages("\n", None);
//! let outcome = report.exit(state, message);
//! assert_eq!(outcome.to_nagios_string(), "WARNING - aggr1 is 85% full");
//! assert_eq!(outcome.exit_code(), 1);
//! ```

use std::cmp::Ordering;
use std::fmt;

#[macro_use]
mod macros;

pub mod checks;
pub mod cli;
pub mod config_generator;
mod error;
pub mod filter;
pub mod helper;
pub mod ontap;
mod perfdata;
mod range;
mod report;
mod runner;
pub mod units;

#[cfg(test)]
mod testutil;

pub use crate::error::{Error, Result};
pub use crate::filter::ItemFilter;
pub use crate::perfdata::{PerfData, ToPerfString, Unit};
pub use crate::range::{Range, Threshold};
pub use crate::report::{CheckReport, Message, Outcome};
pub use crate::runner::{install_panic_hook, Runner, RunnerResult};

/// Represents a service state from nagios.
///
/// States are ordered by how bad they are: OK < UNKNOWN < WARNING < CRITICAL. An UNKNOWN finding
/// beats OK but never hides a real warning or critical problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl State {
    /// Returns the corresponding nagios exit code to signal the service state of self.
    pub fn exit_code(&self) -> i32 {
        match self {
            State::Ok => 0,
            State::Warning => 1,
            State::Critical => 2,
            State::Unknown => 3,
        }
    }

    fn severity(&self) -> u8 {
        match self {
            State::Ok => 0,
            State::Unknown => 1,
            State::Warning => 2,
            State::Critical => 3,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Ok => "OK",
            State::Warning => "WARNING",
            State::Critical => "CRITICAL",
            State::Unknown => "UNKNOWN",
        })
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &State) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &State) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}
