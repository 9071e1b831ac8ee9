use std::fmt;

use crate::{Range, Threshold};

/// The purpose of ToPerfString is only so one can define custom representations of custom types
/// without using the ToString trait so we don't interfere with that.
///
/// Also used internally for generation of the final output.
pub trait ToPerfString {
    fn to_perf_string(&self) -> String;
}

impl_to_perf_string_on_to_string!(f64, String, Range);

impl<T> ToPerfString for Option<T>
where
    T: ToPerfString,
{
    fn to_perf_string(&self) -> String {
        match self {
            Some(ref s) => s.to_perf_string(),
            None => String::new(),
        }
    }
}

/// Unit of measurement of a perfdata value.
#[derive(Clone, Debug, PartialEq)]
pub enum Unit {
    None,
    Percentage,
    Bytes,
    Other(String),
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::None => Ok(()),
            Unit::Percentage => f.write_str("%"),
            Unit::Bytes => f.write_str("B"),
            Unit::Other(s) => f.write_str(s),
        }
    }
}

/// One `label=value[uom];warn;crit;min;max` token.
///
/// ```rust
/// # use checkontap::{PerfData, Threshold, Unit};
/// let threshold = Threshold::parse(Some("80"), Some("90")).unwrap();
/// let perf = PerfData::new("aggr1_percent", 68.4)
///     .with_unit(Unit::Percentage)
///     .with_threshold(&threshold)
///     .with_min(0.0)
///     .with_max(100.0);
/// assert_eq!(perf.to_perf_string(), "aggr1_percent=68.4%;80;90;0;100");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PerfData {
    label: String,
    value: f64,
    unit: Unit,
    warning: Option<Range>,
    critical: Option<Range>,
    min: Option<f64>,
    max: Option<f64>,
}

impl PerfData {
    pub fn new(label: &str, value: impl Into<f64>) -> Self {
        PerfData {
            label: label.to_owned(),
            value: value.into(),
            unit: Unit::None,
            warning: None,
            critical: None,
            min: None,
            max: None,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_threshold(mut self, threshold: &Threshold) -> Self {
        self.warning = threshold.warning().cloned();
        self.critical = threshold.critical().cloned();
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn to_perf_string(&self) -> String {
        // replace `=`
        let name = self.label.replace('=', "_");

        // quote `'`
        let name = name.replace('\'', "''");

        // quote if contains spaces
        let name = if name.contains(' ') {
            format!("'{}'", name)
        } else {
            name
        };

        metric_string!(
            name,
            format!("{}{}", self.value.to_perf_string(), self.unit),
            self.warning,
            self.critical,
            self.min,
            self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value() {
        assert_eq!(PerfData::new("total", 12u32).to_perf_string(), "total=12");
        assert_eq!(
            PerfData::new("total", 12u32)
                .with_unit(Unit::Percentage)
                .to_perf_string(),
            "total=12%"
        );
    }

    #[test]
    fn test_trailing_fields_are_dropped() {
        let perf = PerfData::new("aggr_space", 400.0)
            .with_unit(Unit::Bytes)
            .with_min(0.0);
        assert_eq!(perf.to_perf_string(), "aggr_space=400B;;;0");
    }

    #[test]
    fn test_ranges() {
        let threshold = Threshold::parse(Some("@10:20"), Some("~:30")).unwrap();
        let perf = PerfData::new("lag", 5.0)
            .with_unit(Unit::Other("s".to_owned()))
            .with_threshold(&threshold);
        assert_eq!(perf.to_perf_string(), "lag=5s;@10:20;~:30");
    }

    #[test]
    fn test_labels() {
        let test_data = [
            ("test", "test=0"),
            ("test=a", "test_a=0"),
            ("te'st", "te''st=0"),
            ("te st", "'te st'=0"),
        ];
        for (label, expected_string) in &test_data {
            assert_eq!(&PerfData::new(label, 0u32).to_perf_string(), expected_string);
        }
    }

    #[test]
    fn test_other_unit() {
        let perf = PerfData::new("node1_PSU1 Current", 1.5).with_unit(Unit::Other("A".to_owned()));
        assert_eq!(perf.to_perf_string(), "'node1_PSU1 Current'=1.5A");
    }
}
