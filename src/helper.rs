use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::{Error, Result};

/// Logging setup derived from the number of `-v` flags. Logs go to stderr so they never mix with
/// the plugin output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogConfig {
    level: LevelFilter,
}

impl LogConfig {
    pub fn from_verbosity(verbose: u8) -> Self {
        let level = match verbose {
            0 => LevelFilter::Off,
            1 | 2 => LevelFilter::Error,
            3 => LevelFilter::Warn,
            4 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };
        LogConfig { level }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Installs the global logger. Does nothing when logging is off or a logger is already set.
    pub fn init(&self) {
        if self.level == LevelFilter::Off {
            return;
        }
        let _ = TermLogger::init(
            self.level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Never,
        );
    }
}

fn version_parts(version: &str) -> Result<Vec<u64>> {
    version
        .split(|c: char| c == '.' || c.is_ascii_alphabetic())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| Error::Version(version.to_owned()))
        })
        .collect()
}

/// Returns whether `current` is at least `required`. Letters count as separators, so `9.10.1P3`
/// is newer than `9.10.1`.
pub fn version_at_least(required: &str, current: &str) -> Result<bool> {
    let required = version_parts(required)?;
    let current = version_parts(current)?;

    for i in 0..required.len().max(current.len()) {
        let r = required.get(i).copied().unwrap_or(0);
        let c = current.get(i).copied().unwrap_or(0);
        if c != r {
            return Ok(c > r);
        }
    }
    Ok(true)
}

/// Parses an ISO 8601 duration as used by ONTAP for lag times, e.g. `P1DT2H30M` or `PT15S`.
///
/// Fractions like `PT1.5S` are accepted, a year counts 365 days and a month 30 days. The result
/// is rounded down to whole seconds.
pub fn parse_iso8601_duration(s: &str) -> Result<u64> {
    let invalid = || Error::Duration(s.to_owned());
    let rest = s.strip_prefix('P').ok_or_else(invalid)?;

    let mut seconds = 0f64;
    let mut number = String::new();
    let mut in_time = false;
    let mut seen_any = false;

    for c in rest.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
            continue;
        }

        if c == 'T' && number.is_empty() && !in_time {
            in_time = true;
            continue;
        }

        let value: f64 = number.parse().map_err(|_| invalid())?;
        number.clear();
        let factor = match (c, in_time) {
            ('Y', false) => 365.0 * 86400.0,
            ('M', false) => 30.0 * 86400.0,
            ('W', false) => 7.0 * 86400.0,
            ('D', false) => 86400.0,
            ('H', true) => 3600.0,
            ('M', true) => 60.0,
            ('S', true) => 1.0,
            _ => return Err(invalid()),
        };
        seconds += value * factor;
        seen_any = true;
    }

    // u64::MAX as f64 rounds up, so the bound itself is already out of range
    if !number.is_empty() || !seen_any || !seconds.is_finite() || seconds >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(seconds.floor() as u64)
}

/// Parses an age threshold: plain seconds or a number with one of the suffixes `s`, `m`, `h`,
/// `d` or `w`, e.g. `1.5h`.
pub fn parse_duration(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let (number, factor) = match trimmed.char_indices().last() {
        Some((i, 's')) => (&trimmed[..i], 1.0),
        Some((i, 'm')) => (&trimmed[..i], 60.0),
        Some((i, 'h')) => (&trimmed[..i], 3600.0),
        Some((i, 'd')) => (&trimmed[..i], 86400.0),
        Some((i, 'w')) => (&trimmed[..i], 604800.0),
        _ => (trimmed, 1.0),
    };

    match number.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(n * factor),
        _ => Err(Error::Duration(s.to_owned())),
    }
}

/// Formats seconds as `[<days>d ]H:MM:SS`.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = seconds % 86400 / 3600;
    let minutes = seconds % 3600 / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}:{:02}:{:02}", days, hours, minutes, secs)
    } else {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    }
}
