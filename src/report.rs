use std::process;

use crate::{PerfData, State};

/// One finding of a check.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    state: State,
    text: String,
}

impl Message {
    pub fn state(&self) -> State {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Collects the messages and performance data of a single check run.
///
/// A check creates one report, appends to it while walking over the records it fetched and
/// reduces it with [CheckReport::check_messages] and [CheckReport::exit] at the end.
#[derive(Debug, Default)]
pub struct CheckReport {
    messages: Vec<Message>,
    perfdata: Vec<PerfData>,
}

impl CheckReport {
    pub fn new() -> Self {
        CheckReport::default()
    }

    pub fn add_message(&mut self, state: State, text: impl Into<String>) {
        self.messages.push(Message {
            state,
            text: text.into(),
        })
    }

    pub fn add_perfdata(&mut self, perfdata: PerfData) {
        self.perfdata.push(perfdata)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn perfdata(&self) -> &[PerfData] {
        &self.perfdata
    }

    /// Reduces the collected messages into the overall state and text.
    ///
    /// The state is the worst one of all messages. The text consists of the critical, warning and
    /// unknown messages, in that order, joined by `separator`. If everything is OK `all_ok` is used
    /// instead, or the OK messages when no such text is given.
    pub fn check_messages(&self, separator: &str, all_ok: Option<&str>) -> (State, String) {
        let state = self
            .messages
            .iter()
            .map(|m| m.state)
            .max()
            .unwrap_or(State::Ok);

        if state == State::Ok {
            let text = match all_ok {
                Some(text) => text.to_owned(),
                None => self.join(&[State::Ok], separator),
            };
            return (state, text);
        }

        let text = self.join(&[State::Critical, State::Warning, State::Unknown], separator);
        (state, text)
    }

    fn join(&self, states: &[State], separator: &str) -> String {
        states
            .iter()
            .flat_map(|state| self.messages.iter().filter(move |m| m.state == *state))
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Finishes the check with the given state and message.
    pub fn exit(self, state: State, message: impl Into<String>) -> Outcome {
        Outcome {
            state,
            message: message.into(),
            perfdata: self.perfdata,
        }
    }
}

/// The final result of a check, ready to be handed to nagios.
#[derive(Debug, PartialEq)]
pub struct Outcome {
    state: State,
    message: String,
    perfdata: Vec<PerfData>,
}

impl Outcome {
    pub fn state(&self) -> State {
        self.state
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn perfdata(&self) -> &[PerfData] {
        &self.perfdata
    }

    /// Returns a string which nagios understands to determine the service state.
    ///
    /// The first line carries the state, the summary and the performance data, the remaining lines
    /// of the message follow as long output.
    pub fn to_nagios_string(&self) -> String {
        let mut lines = self.message.splitn(2, '\n');
        let summary = lines.next().unwrap_or_default();

        let mut s = self.state.to_string();
        if !summary.is_empty() {
            s.push_str(&format!(" - {}", summary));
        }

        if !self.perfdata.is_empty() {
            s.push_str(" |");

            for perf in self.perfdata.iter() {
                s.push_str(&format!(" {}", perf.to_perf_string()));
            }
        }

        if let Some(long_output) = lines.next() {
            s.push('\n');
            s.push_str(long_output);
        }

        s
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }

    /// Will print Self::to_nagios_string and exit with the exit code from Self::exit_code
    pub fn print_and_exit(&self) -> ! {
        println!("{}", self.to_nagios_string());
        process::exit(self.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Threshold, Unit};

    #[test]
    fn test_worst_state_wins() {
        let mut report = CheckReport::new();
        report.add_message(State::Ok, "a");
        report.add_message(State::Warning, "b");
        report.add_message(State::Ok, "c");

        assert_eq!(
            report.check_messages(", ", None),
            (State::Warning, "b".to_owned())
        );
    }

    #[test]
    fn test_all_ok_text() {
        let mut report = CheckReport::new();
        report.add_message(State::Ok, "a");
        report.add_message(State::Ok, "b");

        assert_eq!(
            report.check_messages("\n", Some("fine")),
            (State::Ok, "fine".to_owned())
        );
        assert_eq!(
            report.check_messages("\n", None),
            (State::Ok, "a\nb".to_owned())
        );
    }

    #[test]
    fn test_empty_report() {
        let report = CheckReport::new();
        assert_eq!(report.check_messages("\n", None), (State::Ok, String::new()));
        assert_eq!(
            report.check_messages("\n", Some("all 0 luns are ok")),
            (State::Ok, "all 0 luns are ok".to_owned())
        );
    }

    #[test]
    fn test_critical_messages_come_first() {
        let mut report = CheckReport::new();
        report.add_message(State::Warning, "w1");
        report.add_message(State::Unknown, "u1");
        report.add_message(State::Critical, "c1");
        report.add_message(State::Warning, "w2");
        report.add_message(State::Critical, "c2");

        assert_eq!(
            report.check_messages("|", None),
            (State::Critical, "c1|c2|w1|w2|u1".to_owned())
        );
    }

    #[test]
    fn test_unknown_only_beats_ok() {
        let mut report = CheckReport::new();
        report.add_message(State::Ok, "fine");
        report.add_message(State::Unknown, "battery_unknown");
        assert_eq!(report.check_messages(" ", None).0, State::Unknown);

        report.add_message(State::Warning, "warn-high");
        assert_eq!(report.check_messages(" ", None).0, State::Warning);
    }

    #[test]
    fn test_end_to_end() {
        let threshold = Threshold::parse(Some("80"), Some("90")).unwrap();
        let mut report = CheckReport::new();
        report.add_message(threshold.get_status(85.0), format!("value is {}", 85));
        report.add_perfdata(
            PerfData::new("value", 85u32)
                .with_unit(Unit::Percentage)
                .with_threshold(&threshold),
        );

        let (state, message) = report.check_messages("\n", None);
        let outcome = report.exit(state, message);
        assert_eq!(outcome.state(), State::Warning);
        assert!(outcome.message().contains("85"));
        assert_eq!(
            outcome.to_nagios_string(),
            "WARNING - value is 85 | value=85%;80;90"
        );
    }

    #[test]
    fn test_long_output() {
        let mut report = CheckReport::new();
        report.add_perfdata(PerfData::new("total", 3u32));
        let outcome = report.exit(State::Critical, "checked 3 volumes\nVol: a has state offline");

        assert_eq!(
            outcome.to_nagios_string(),
            "CRITICAL - checked 3 volumes | total=3\nVol: a has state offline"
        );
        assert_eq!(outcome.exit_code(), 2);
    }

    #[test]
    fn test_state_only() {
        let outcome = CheckReport::new().exit(State::Unknown, "");
        assert_eq!(outcome.to_nagios_string(), "UNKNOWN");
    }
}
