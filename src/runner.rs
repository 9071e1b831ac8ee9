use std::fmt::Display;
use std::marker::PhantomData;
use std::time::Duration;
use std::{panic, process, thread};

use log::debug;

use crate::{Error, Outcome, State};

/// Runs a check and turns errors into a nagios result instead of a crash.
///
/// Errors are reported as UNKNOWN. With [Runner::with_timeout] the whole process is ended with
/// UNKNOWN once the deadline passes, even if the check is blocked in a network call.
pub struct Runner<E> {
    timeout: Option<Duration>,
    _error: PhantomData<E>,
}

impl<E: Display> Default for Runner<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Display> Runner<E> {
    pub fn new() -> Self {
        Self {
            timeout: None,
            _error: PhantomData,
        }
    }

    /// Sets the deadline of the run. `None` runs without one.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `f`. An error becomes an UNKNOWN result carrying the error text.
    pub fn safe_run(self, f: impl FnOnce() -> Result<Outcome, E>) -> RunnerResult {
        if let Some(timeout) = self.timeout {
            spawn_watchdog(timeout);
        }

        match f() {
            Ok(outcome) => RunnerResult::Ok(outcome),
            Err(err) => RunnerResult::Err(State::Unknown, err.to_string()),
        }
    }
}

fn spawn_watchdog(timeout: Duration) {
    debug!("timeout set to {:?}", timeout);
    thread::spawn(move || {
        thread::sleep(timeout);
        println!("{} - {}", State::Unknown, Error::Timeout);
        process::exit(State::Unknown.exit_code());
    });
}

/// Reports panics the nagios way: one UNKNOWN line and exit code 3.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let payload = info.payload();
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| info.to_string());

        println!("{} - Unhandled exception: {}", State::Unknown, msg);
        process::exit(State::Unknown.exit_code());
    }));
}

#[derive(Debug)]
pub enum RunnerResult {
    Ok(Outcome),
    Err(State, String),
}

impl RunnerResult {
    pub fn to_nagios_string(&self) -> String {
        match self {
            RunnerResult::Ok(outcome) => outcome.to_nagios_string(),
            RunnerResult::Err(state, msg) => format!("{} - {}", state, msg),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerResult::Ok(outcome) => outcome.exit_code(),
            RunnerResult::Err(state, _) => state.exit_code(),
        }
    }

    pub fn print_and_exit(self) -> ! {
        match self {
            RunnerResult::Ok(outcome) => outcome.print_and_exit(),
            RunnerResult::Err(state, msg) => {
                println!("{} - {}", state, msg);
                process::exit(state.exit_code());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckReport;

    #[derive(Debug, thiserror::Error)]
    #[error("woops")]
    struct EmptyError;

    #[test]
    fn test_runner_ok() {
        let result = Runner::<EmptyError>::new()
            .safe_run(|| Ok(CheckReport::new().exit(State::Warning, "test")));

        assert!(matches!(result, RunnerResult::Ok(_)));
        assert_eq!(result.to_nagios_string(), "WARNING - test");
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_runner_error_is_unknown() {
        let result = Runner::<EmptyError>::new().safe_run(|| Err(EmptyError {}));

        assert_eq!(result.to_nagios_string(), "UNKNOWN - woops");
        assert_eq!(result.exit_code(), 3);
    }

    #[test]
    fn test_runner_without_deadline() {
        let result = Runner::<EmptyError>::new()
            .with_timeout(None)
            .safe_run(|| Ok(CheckReport::new().exit(State::Ok, "fine")));

        assert!(matches!(result, RunnerResult::Ok(_)));
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn test_runner_crate_errors() {
        let result = Runner::<Error>::new().safe_run(|| {
            Err(Error::Api {
                status: 401,
                body: "not authorized".to_owned(),
            })
        });
        assert_eq!(result.to_nagios_string(), "UNKNOWN - Error => not authorized");

        let result = Runner::<Error>::new().safe_run(|| Err(Error::Timeout));
        assert_eq!(result.to_nagios_string(), "UNKNOWN - Timeout reached");
    }

    #[test]
    fn test_runner_anyhow() -> anyhow::Result<()> {
        let threshold: crate::Threshold = crate::Threshold::parse(Some("80"), None)?;
        let result = Runner::<anyhow::Error>::new().safe_run(|| {
            anyhow::ensure!(threshold.get_status(95.0) == State::Ok, "aggr1 is full");
            Ok(CheckReport::new().exit(State::Ok, "fine"))
        });

        assert_eq!(result.to_nagios_string(), "UNKNOWN - aggr1 is full");
        Ok(())
    }
}
