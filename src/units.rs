//! Conversions between raw byte counts, binary size units and percentages.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

const BLOCK_SIZE: f64 = 1024.0;

/// A unit a threshold can be expressed in: a percentage of some maximum or a binary size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteUnit {
    Percent,
    KiloBytes,
    MegaBytes,
    GigaBytes,
    TeraBytes,
    PetaBytes,
    ExaBytes,
}

impl ByteUnit {
    /// The power of 1024 of this unit, `None` for percent.
    pub fn exponent(&self) -> Option<i32> {
        match self {
            ByteUnit::Percent => None,
            ByteUnit::KiloBytes => Some(1),
            ByteUnit::MegaBytes => Some(2),
            ByteUnit::GigaBytes => Some(3),
            ByteUnit::TeraBytes => Some(4),
            ByteUnit::PetaBytes => Some(5),
            ByteUnit::ExaBytes => Some(6),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ByteUnit::Percent => "%",
            ByteUnit::KiloBytes => "kB",
            ByteUnit::MegaBytes => "MB",
            ByteUnit::GigaBytes => "GB",
            ByteUnit::TeraBytes => "TB",
            ByteUnit::PetaBytes => "PB",
            ByteUnit::ExaBytes => "EB",
        }
    }
}

impl FromStr for ByteUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "%" => Ok(ByteUnit::Percent),
            "kB" => Ok(ByteUnit::KiloBytes),
            "MB" => Ok(ByteUnit::MegaBytes),
            "GB" => Ok(ByteUnit::GigaBytes),
            "TB" => Ok(ByteUnit::TeraBytes),
            "PB" => Ok(ByteUnit::PetaBytes),
            "EB" => Ok(ByteUnit::ExaBytes),
            other => Err(Error::InvalidUnit(other.to_owned())),
        }
    }
}

impl fmt::Display for ByteUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds half to even at the given number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Converts a byte count into `unit`. For percent the value is related to `maximum`.
///
/// ```rust
/// # use checkontap::units::{bytes_to_unit, ByteUnit};
/// assert_eq!(bytes_to_unit(1536.0, ByteUnit::KiloBytes, None).unwrap(), 1.5);
/// assert_eq!(bytes_to_unit(25.0, ByteUnit::Percent, Some(200.0)).unwrap(), 12.5);
/// ```
pub fn bytes_to_unit(value: f64, unit: ByteUnit, maximum: Option<f64>) -> Result<f64> {
    match unit.exponent() {
        None => {
            let maximum = maximum.ok_or(Error::MissingMaximum)?;
            if maximum == 0.0 {
                return Err(Error::DivisionByZero);
            }
            Ok(round_to(value / maximum * 100.0, 2))
        }
        Some(k) => Ok(round_to(value / BLOCK_SIZE.powi(k), 3)),
    }
}

/// The inverse of [bytes_to_unit].
pub fn unit_to_bytes(value: f64, unit: ByteUnit, maximum: Option<f64>) -> Result<f64> {
    match unit.exponent() {
        None => {
            let maximum = maximum.ok_or(Error::MissingMaximum)?;
            Ok(round_to(maximum / 100.0 * value, 2))
        }
        Some(k) => Ok(round_to(value * BLOCK_SIZE.powi(k), 3)),
    }
}

/// `value` as a percentage of `max`, rounded to two decimals. An empty `max` yields 0.
pub fn to_percent(max: f64, value: f64) -> f64 {
    if max == 0.0 {
        return 0.0;
    }
    round_to(value / max * 100.0, 2)
}

/// The absolute amount `pct` percent of `max` stands for.
pub fn percent_to(max: f64, pct: f64) -> f64 {
    (max / 100.0 * pct).trunc()
}

/// Which figure of a space record is compared against the thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageMetric {
    /// Used space as a percentage of the total size.
    Usage,
    Used(ByteUnit),
    Free(ByteUnit),
}

impl UsageMetric {
    /// The metric selected by a `--unit` argument: percent means usage, sizes mean used space.
    pub fn from_unit(unit: ByteUnit) -> Self {
        match unit {
            ByteUnit::Percent => UsageMetric::Usage,
            unit => UsageMetric::Used(unit),
        }
    }
}

impl FromStr for UsageMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "usage" {
            return Ok(UsageMetric::Usage);
        }

        let invalid = || Error::InvalidMetric(s.to_owned());
        let (kind, unit) = s.split_once('_').ok_or_else(invalid)?;
        let unit = match unit.parse()? {
            ByteUnit::Percent => return Err(invalid()),
            unit => unit,
        };

        match kind {
            "used" => Ok(UsageMetric::Used(unit)),
            "free" => Ok(UsageMetric::Free(unit)),
            _ => Err(invalid()),
        }
    }
}
