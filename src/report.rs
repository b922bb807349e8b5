//! Heat-up text reports

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    aggregate::{DailyResultSet, SummaryStatistic},
    config::SensorTargets,
    timestamp::{DATE_FORMAT, REPORT_FORMAT},
};

pub const DETAIL_REPORT: &str = "heating_analysis_report.txt";
pub const SUMMARY_REPORT: &str = "summary_statistics.txt";

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("Failed to write the report {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to format the report")]
    Fmt(#[from] std::fmt::Error),
}
type Result<T> = std::result::Result<T, ReportError>;

fn rule(c: char) -> String {
    c.to_string().repeat(50)
}

/// Renders the per-date and per-sensor results
pub fn detail_report(results: &DailyResultSet) -> Result<String> {
    let mut report = String::new();
    writeln!(report, "Industrial Oven Heating Analysis")?;
    writeln!(report, "{}\n", rule('='))?;
    for (date, sensors) in results {
        writeln!(report, "Date: {}", date.format(DATE_FORMAT))?;
        writeln!(report, "{}", rule('-'))?;
        for (sensor, r) in sensors {
            writeln!(report, "Sensor: {}", sensor)?;
            writeln!(report, "Target Temperature: {}°C", r.target_temp)?;
            writeln!(report, "Start Time: {}", r.start_time.format(REPORT_FORMAT))?;
            writeln!(report, "Starting Temperature: {:.2}°C", r.start_temp)?;
            match (r.reached_time, r.time_to_target) {
                (Some(reached), Some(minutes)) => {
                    writeln!(report, "Target Reached Time: {}", reached.format(REPORT_FORMAT))?;
                    writeln!(report, "Time to Target: {:.1} minutes", minutes)?;
                    match r.heating_rate {
                        Some(rate) => writeln!(report, "Heating Rate: {:.2}°C/min", rate)?,
                        None => writeln!(report, "Heating Rate: n/a (target met at start)")?,
                    }
                }
                _ => writeln!(report, "Target NOT reached during this session")?,
            }
            writeln!(report, "Final Temperature: {:.2}°C", r.final_temp)?;
            writeln!(report, "Data Points: {}", r.data_points)?;
            writeln!(report)?;
        }
        writeln!(report)?;
    }
    Ok(report)
}

/// Renders the per-sensor summary statistics
pub fn summary_report(
    summary: &BTreeMap<String, SummaryStatistic>,
    targets: &SensorTargets,
) -> Result<String> {
    let mut report = String::new();
    writeln!(report, "Summary Statistics Across All Dates")?;
    writeln!(report, "{}\n", rule('='))?;
    for (sensor, stats) in summary {
        writeln!(report, "Sensor: {}", sensor)?;
        if let Some(target) = targets.target(sensor) {
            writeln!(report, "Target Temperature: {}°C", target)?;
        }
        writeln!(report, "Days Reaching Target: {}", stats.count)?;
        writeln!(
            report,
            "Average Time to Target: {:.1} ± {:.1} mins",
            stats.avg_time, stats.std_time
        )?;
        writeln!(
            report,
            "Range: {:.1} - {:.1} mins",
            stats.min_time, stats.max_time
        )?;
        match stats.avg_rate.zip(stats.std_rate) {
            Some((avg, std)) => {
                writeln!(report, "Average Heating Rate: {:.2} ± {:.2}°C/min", avg, std)?
            }
            None => writeln!(report, "Average Heating Rate: n/a")?,
        }
        writeln!(
            report,
            "Earliest Start Time: {}",
            stats.earliest_start.format(REPORT_FORMAT)
        )?;
        writeln!(
            report,
            "Latest Start Time: {}",
            stats.latest_start.format(REPORT_FORMAT)
        )?;
        writeln!(
            report,
            "Fastest Target Achievement: {}",
            stats.fastest_reach.format(REPORT_FORMAT)
        )?;
        writeln!(
            report,
            "Slowest Target Achievement: {}",
            stats.slowest_reach.format(REPORT_FORMAT)
        )?;
        writeln!(report)?;
    }
    Ok(report)
}

/// Writes both reports into `dir`, returning their paths
pub fn write_reports<P: AsRef<Path>>(
    dir: P,
    results: &DailyResultSet,
    summary: &BTreeMap<String, SummaryStatistic>,
    targets: &SensorTargets,
) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| ReportError::Io(dir.to_path_buf(), e))?;
    let detail_path = dir.join(DETAIL_REPORT);
    fs::write(&detail_path, detail_report(results)?)
        .map_err(|e| ReportError::Io(detail_path.clone(), e))?;
    let summary_path = dir.join(SUMMARY_REPORT);
    fs::write(&summary_path, summary_report(summary, targets)?)
        .map_err(|e| ReportError::Io(summary_path.clone(), e))?;
    log::info!("Reports written to {:?}", dir);
    Ok((detail_path, summary_path))
}
