//! Cross-file heat-up statistics
//!
//! Every daily log of a directory is analyzed and its results are filed
//! under the date encoded in the log file name. The per-sensor summary
//! statistics are then derived from all the days where the sensor reached
//! its target.

use chrono::{NaiveDate, NaiveDateTime};
use glob::{glob_with, MatchOptions};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    analysis::{analyze_file, FileResults},
    config::SensorTargets,
    scada::ScadaLog,
    timestamp::date_from_filename,
};

/// Sensor results of every analyzed log, keyed by date
pub type DailyResultSet = BTreeMap<NaiveDate, FileResults>;

/// Returns the SCADA logs (`*.CSV`, any case) of a directory
pub fn log_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, glob::PatternError> {
    let pattern = dir.as_ref().join("*.csv");
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };
    Ok(glob_with(&pattern.to_string_lossy(), options)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        })
        .collect())
}

/// A log that did not make it into the results
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Daily results accumulator
#[derive(Debug)]
pub struct Aggregator<'a> {
    targets: &'a SensorTargets,
    results: DailyResultSet,
    skipped: Vec<Skipped>,
}
impl<'a> Aggregator<'a> {
    pub fn new(targets: &'a SensorTargets) -> Self {
        Self {
            targets,
            results: DailyResultSet::new(),
            skipped: vec![],
        }
    }
    fn skip(&mut self, path: &Path, reason: String) {
        log::warn!("Skipping {:?}: {}", path, reason);
        self.skipped.push(Skipped {
            path: path.to_path_buf(),
            reason,
        });
    }
    /// Analyzes a log file and files its results under the file name date
    ///
    /// Returns the date and the loaded log, or `None` if the file is skipped.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Option<(NaiveDate, ScadaLog)> {
        let path = path.as_ref();
        let Some(date) = date_from_filename(path) else {
            self.skip(path, "no DDMMYY date at the start of the file name".into());
            return None;
        };
        match analyze_file(path, self.targets) {
            Ok((log, results)) => {
                if self.results.insert(date, results).is_some() {
                    log::warn!("{:?} replaces the results of {}", path, date);
                }
                Some((date, log))
            }
            Err(e) => {
                self.skip(path, e.to_string());
                None
            }
        }
    }
    /// Analyzes all the given log files
    pub fn extend<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.add_file(path);
        }
        self
    }
    /// Analyzes all the logs of a directory
    pub fn run<P: AsRef<Path>>(self, dir: P) -> Result<Self, glob::PatternError> {
        Ok(self.extend(log_files(dir)?))
    }
    pub fn results(&self) -> &DailyResultSet {
        &self.results
    }
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }
    pub fn summary(&self) -> BTreeMap<String, SummaryStatistic> {
        summarize(&self.results, self.targets)
    }
}

/// Heat-up statistics of a sensor over the days it reached its target
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistic {
    /// Number of days the target was reached
    pub count: usize,
    pub avg_time: f64,
    pub std_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    /// Heating rate mean, `None` if the target was always met from the start
    pub avg_rate: Option<f64>,
    pub std_rate: Option<f64>,
    pub earliest_start: NaiveDateTime,
    pub latest_start: NaiveDateTime,
    pub fastest_reach: NaiveDateTime,
    pub slowest_reach: NaiveDateTime,
}

/// Mean and population standard deviation
fn stats(x: &[f64]) -> Option<(f64, f64)> {
    if x.is_empty() {
        return None;
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let std = (x.iter().map(|x| x - mean).fold(0f64, |s, x| s + x * x) / n).sqrt();
    Some((mean, std))
}

/// Computes the summary statistics of every sensor target
///
/// Sensors that never reached their target are left out.
pub fn summarize(
    results: &DailyResultSet,
    targets: &SensorTargets,
) -> BTreeMap<String, SummaryStatistic> {
    targets
        .sensors()
        .filter_map(|sensor| {
            let reached: Vec<_> = results
                .values()
                .filter_map(|day| day.get(sensor))
                .filter_map(|r| {
                    r.reached_time
                        .zip(r.time_to_target)
                        .map(|(reach, time)| (r, reach, time))
                })
                .collect();
            let times: Vec<f64> = reached.iter().map(|(_, _, t)| *t).collect();
            let rates: Vec<f64> = reached.iter().filter_map(|(r, _, _)| r.heating_rate).collect();
            let (avg_time, std_time) = stats(&times)?;
            let (avg_rate, std_rate) = stats(&rates).unzip();
            let starts = reached.iter().map(|(r, _, _)| r.start_time);
            let reaches = reached.iter().map(|(_, t, _)| *t);
            Some((
                sensor.to_owned(),
                SummaryStatistic {
                    count: reached.len(),
                    avg_time,
                    std_time,
                    min_time: times.iter().cloned().fold(f64::INFINITY, f64::min),
                    max_time: times.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                    avg_rate,
                    std_rate,
                    earliest_start: starts.clone().min()?,
                    latest_start: starts.max()?,
                    fastest_reach: reaches.clone().min()?,
                    slowest_reach: reaches.max()?,
                },
            ))
        })
        .collect()
}
