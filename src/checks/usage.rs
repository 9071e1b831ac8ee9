//! Space usage evaluation shared by the aggregate, volume and lun checks.
//!
//! The thresholds are given in the unit selected with `--unit` or `--metric`. Both perfdata
//! entries, `<label>_space` in bytes and `<label>_percent`, carry them converted into their own
//! unit so graphs show the same limits either way.

use crate::units::{bytes_to_unit, percent_to, to_percent, unit_to_bytes, ByteUnit, UsageMetric};
use crate::{CheckReport, PerfData, Result, Threshold, Unit};

/// The space figures of one item.
#[derive(Clone, Debug)]
pub struct SpaceUsage<'a> {
    /// Name shown in the message.
    pub name: &'a str,
    /// Prefix of the perfdata labels.
    pub label: &'a str,
    pub size: u64,
    pub used: u64,
    pub available: Option<u64>,
}

impl<'a> SpaceUsage<'a> {
    fn free(&self) -> u64 {
        self.available
            .unwrap_or_else(|| self.size.saturating_sub(self.used))
    }
}

/// Adds the perfdata and the message for one item to `report`.
pub fn evaluate(
    report: &mut CheckReport,
    threshold: &Threshold,
    metric: Option<UsageMetric>,
    usage: &SpaceUsage<'_>,
) -> Result<()> {
    let size = usage.size as f64;
    let used = usage.used as f64;
    let pct = to_percent(size, used);

    let space = PerfData::new(&format!("{}_space", usage.label), used)
        .with_unit(Unit::Bytes)
        .with_min(0.0)
        .with_max(size);
    let percent = PerfData::new(&format!("{}_percent", usage.label), pct)
        .with_unit(Unit::Percentage)
        .with_min(0.0)
        .with_max(100.0);

    match metric {
        None => {
            let pct_threshold = threshold.map_bounds(|b| to_percent(size, b));
            report.add_perfdata(space.with_threshold(threshold));
            report.add_perfdata(percent.with_threshold(&pct_threshold));
            report.add_message(
                threshold.get_status(used),
                format!(
                    "{} (Usage {}/{}B {}%)",
                    usage.name, usage.used, usage.size, pct
                ),
            );
        }
        Some(UsageMetric::Usage) => {
            let bytes_threshold = threshold.map_bounds(|b| percent_to(size, b));
            report.add_perfdata(percent.with_threshold(threshold));
            report.add_perfdata(space.with_threshold(&bytes_threshold));

            let gb = ByteUnit::GigaBytes;
            report.add_message(
                threshold.get_status(pct),
                format!(
                    "{} (Usage {}/{}GB {}%)",
                    usage.name,
                    bytes_to_unit(used, gb, None)?,
                    bytes_to_unit(size, gb, None)?,
                    pct
                ),
            );
        }
        Some(UsageMetric::Used(unit)) => {
            let factor = unit_to_bytes(1.0, unit, None)?;
            let bytes_threshold = threshold.map_bounds(|b| b * factor);
            let pct_threshold = bytes_threshold.map_bounds(|b| to_percent(size, b));
            report.add_perfdata(space.with_threshold(&bytes_threshold));
            report.add_perfdata(percent.with_threshold(&pct_threshold));

            let value = bytes_to_unit(used, unit, None)?;
            report.add_message(
                threshold.get_status(value),
                format!(
                    "{} (Usage {}/{}{} {}%)",
                    usage.name,
                    value,
                    bytes_to_unit(size, unit, None)?,
                    unit,
                    pct
                ),
            );
        }
        Some(UsageMetric::Free(unit)) => {
            let free = usage.free() as f64;
            let factor = unit_to_bytes(1.0, unit, None)?;
            let bytes_threshold = threshold.map_bounds(|b| b * factor);
            report.add_perfdata(space);
            report.add_perfdata(percent);
            report.add_perfdata(
                PerfData::new(&format!("{}_free", usage.label), free)
                    .with_unit(Unit::Bytes)
                    .with_threshold(&bytes_threshold)
                    .with_min(0.0)
                    .with_max(size),
            );

            let value = bytes_to_unit(free, unit, None)?;
            report.add_message(
                threshold.get_status(value),
                format!(
                    "{} (Free {}/{}{} {}%)",
                    usage.name,
                    value,
                    bytes_to_unit(size, unit, None)?,
                    unit,
                    to_percent(size, free)
                ),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::State;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn aggr1(available: u64) -> SpaceUsage<'static> {
        SpaceUsage {
            name: "aggr1",
            label: "aggr1",
            size: 100 * GIB,
            used: 85 * GIB,
            available: Some(available),
        }
    }

    fn evaluate_one(metric: Option<UsageMetric>, warning: &str, critical: &str) -> CheckReport {
        let threshold = Threshold::parse(Some(warning), Some(critical)).unwrap();
        let mut report = CheckReport::new();
        evaluate(&mut report, &threshold, metric, &aggr1(15 * GIB)).unwrap();
        report
    }

    fn perf_strings(report: &CheckReport) -> Vec<String> {
        report.perfdata().iter().map(|p| p.to_perf_string()).collect()
    }

    #[test]
    fn test_percent_usage() {
        let report = evaluate_one(Some(UsageMetric::Usage), "80", "90");

        assert_eq!(report.messages()[0].state(), State::Warning);
        assert_eq!(report.messages()[0].text(), "aggr1 (Usage 85/100GB 85%)");
        assert_eq!(
            perf_strings(&report),
            [
                "aggr1_percent=85%;80;90;0;100",
                "aggr1_space=91268055040B;85899345920;96636764160;0;107374182400",
            ]
        );
    }

    #[test]
    fn test_used_in_unit() {
        let report = evaluate_one(Some(UsageMetric::Used(ByteUnit::GigaBytes)), "80", "90");

        assert_eq!(report.messages()[0].state(), State::Warning);
        assert_eq!(report.messages()[0].text(), "aggr1 (Usage 85/100GB 85%)");
        assert_eq!(
            perf_strings(&report),
            [
                "aggr1_space=91268055040B;85899345920;96636764160;0;107374182400",
                "aggr1_percent=85%;80;90;0;100",
            ]
        );
    }

    #[test]
    fn test_raw_bytes() {
        let report = evaluate_one(None, "90000000000", "100000000000");

        // outside of the warning range, still inside the critical one
        assert_eq!(report.messages()[0].state(), State::Warning);
        assert_eq!(
            report.messages()[0].text(),
            "aggr1 (Usage 91268055040/107374182400B 85%)"
        );
    }

    #[test]
    fn test_free_space() {
        let report = evaluate_one(Some(UsageMetric::Free(ByteUnit::GigaBytes)), "10:", "5:");
        assert_eq!(report.messages()[0].state(), State::Ok);
        assert_eq!(report.messages()[0].text(), "aggr1 (Free 15/100GB 15%)");
        assert_eq!(
            report.perfdata()[2].to_perf_string(),
            "aggr1_free=16106127360B;10737418240:;5368709120:;0;107374182400"
        );

        let threshold = Threshold::parse(Some("10:"), Some("5:")).unwrap();
        let mut report = CheckReport::new();
        let metric = Some(UsageMetric::Free(ByteUnit::GigaBytes));
        evaluate(&mut report, &threshold, metric, &aggr1(8 * GIB)).unwrap();
        assert_eq!(report.messages()[0].state(), State::Warning);
    }

    #[test]
    fn test_empty_item() {
        let threshold = Threshold::parse(Some("80"), Some("90")).unwrap();
        let mut report = CheckReport::new();
        let lun = SpaceUsage {
            name: "/vol/v1/lun0",
            label: "/vol/v1/lun0",
            size: 0,
            used: 0,
            available: None,
        };
        evaluate(&mut report, &threshold, Some(UsageMetric::Usage), &lun).unwrap();
        assert_eq!(report.messages()[0].state(), State::Ok);
        assert_eq!(report.messages()[0].text(), "/vol/v1/lun0 (Usage 0/0GB 0%)");
    }
}
