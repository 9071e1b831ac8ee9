//! Nagios threshold ranges.
//!
//! A range is written `[@]start:end`. Without `@` an alert is raised when the value lies outside
//! of `start..=end`, with `@` when it lies inside. `~` stands for negative infinity, an empty
//! start or end leaves that side unbounded and a bare number `n` is the same as `0:n`.
//!
//! ```rust
//! # use checkontap::{Range, State, Threshold};
//! let threshold = Threshold::parse(Some("80"), Some("90")).unwrap();
//! assert_eq!(threshold.get_status(85.0), State::Warning);
//!
//! let range: Range = "@10:20".parse().unwrap();
//! assert!(range.alerts(15.0));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result, State};

#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    start: f64,
    end: f64,
    outside: bool,
}

impl Range {
    pub fn new(start: f64, end: f64, outside: bool) -> Result<Self> {
        let spec = format!("{}:{}", start, end);
        if start.is_nan() || end.is_nan() {
            return Err(Error::threshold(&spec, "bounds must be numbers"));
        }
        if start > end {
            return Err(Error::threshold(&spec, "start is greater than end"));
        }

        Ok(Range {
            start,
            end,
            outside,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// True for the default mode where values outside of the range raise an alert.
    pub fn is_outside(&self) -> bool {
        self.outside
    }

    /// Returns whether `value` raises an alert for this range.
    pub fn alerts(&self, value: f64) -> bool {
        let inside = self.start <= value && value <= self.end;
        inside != self.outside
    }

    /// Converts the finite bounds with `f`, e.g. to express a range given in GB in bytes.
    /// Infinite bounds stay infinite.
    pub fn map_bounds<F>(&self, f: F) -> Range
    where
        F: Fn(f64) -> f64,
    {
        let map = |bound: f64| if bound.is_finite() { f(bound) } else { bound };
        let (start, end) = (map(self.start), map(self.end));

        // a conversion with a negative factor would swap the bounds
        Range {
            start: start.min(end),
            end: start.max(end),
            outside: self.outside,
        }
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        let (outside, body) = match trimmed.strip_prefix('@') {
            Some(rest) => (false, rest),
            None => (true, trimmed),
        };

        if body.is_empty() {
            return Err(Error::threshold(spec, "range is empty"));
        }

        let (start, end) = match body.split_once(':') {
            Some((start, end)) => {
                if end.contains(':') {
                    return Err(Error::threshold(spec, "more than one ':'"));
                }
                let start = match start.trim() {
                    "" | "~" => f64::NEG_INFINITY,
                    s => parse_bound(spec, s)?,
                };
                let end = match end.trim() {
                    "" => f64::INFINITY,
                    s => parse_bound(spec, s)?,
                };
                (start, end)
            }
            None => (0.0, parse_bound(spec, body)?),
        };

        if start > end {
            return Err(Error::threshold(spec, "start is greater than end"));
        }

        Ok(Range {
            start,
            end,
            outside,
        })
    }
}

fn parse_bound(spec: &str, bound: &str) -> Result<f64> {
    match bound.trim().parse::<f64>() {
        Ok(value) if !value.is_nan() => Ok(value),
        _ => Err(Error::threshold(spec, format!("{:?} is not a number", bound))),
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.outside {
            f.write_str("@")?;
        }

        if self.start == 0.0 && self.end.is_finite() {
            return write!(f, "{}", self.end);
        }

        if self.start == f64::NEG_INFINITY {
            f.write_str("~:")?;
        } else {
            write!(f, "{}:", self.start)?;
        }

        if self.end.is_finite() {
            write!(f, "{}", self.end)?;
        }

        Ok(())
    }
}

/// A pair of optional warning and critical ranges. Critical takes precedence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Threshold {
    warning: Option<Range>,
    critical: Option<Range>,
}

impl Threshold {
    pub fn new(warning: Option<Range>, critical: Option<Range>) -> Self {
        Threshold { warning, critical }
    }

    /// Parses both ranges. Missing or blank strings leave that level unset.
    pub fn parse(warning: Option<&str>, critical: Option<&str>) -> Result<Self> {
        let parse = |spec: Option<&str>| -> Result<Option<Range>> {
            match spec.map(str::trim) {
                Some(s) if !s.is_empty() => s.parse().map(Some),
                _ => Ok(None),
            }
        };

        Ok(Threshold {
            warning: parse(warning)?,
            critical: parse(critical)?,
        })
    }

    pub fn warning(&self) -> Option<&Range> {
        self.warning.as_ref()
    }

    pub fn critical(&self) -> Option<&Range> {
        self.critical.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.warning.is_none() && self.critical.is_none()
    }

    /// Classifies `value`. Without any range configured this is always OK.
    pub fn get_status(&self, value: f64) -> State {
        if self.critical.as_ref().map_or(false, |r| r.alerts(value)) {
            State::Critical
        } else if self.warning.as_ref().map_or(false, |r| r.alerts(value)) {
            State::Warning
        } else {
            State::Ok
        }
    }

    pub fn map_bounds<F>(&self, f: F) -> Threshold
    where
        F: Fn(f64) -> f64,
    {
        Threshold {
            warning: self.warning.as_ref().map(|r| r.map_bounds(&f)),
            critical: self.critical.as_ref().map(|r| r.map_bounds(&f)),
        }
    }
}
