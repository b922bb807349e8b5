//! Per-file heat-up analysis

use chrono::NaiveDateTime;
use std::{collections::BTreeMap, path::Path};

use crate::{
    config::SensorTargets,
    scada::{ScadaError, ScadaLog},
    threshold::{first_crossing, heating_rate, Reading},
};

/// Heat-up outcome of one sensor in one log
#[derive(Debug, Clone, PartialEq)]
pub struct SensorResult {
    /// Timestamp of the first log sample
    pub start_time: NaiveDateTime,
    /// First valid reading of the sensor [C]
    pub start_temp: f64,
    pub target_temp: f64,
    /// Timestamp of the first reading at or above target
    pub reached_time: Option<NaiveDateTime>,
    /// Minutes from the log start to `reached_time`
    pub time_to_target: Option<f64>,
    /// Average heating rate [C/min]
    pub heating_rate: Option<f64>,
    /// Last valid reading of the sensor [C]
    pub final_temp: f64,
    /// Number of valid samples in the log
    pub data_points: usize,
}
impl SensorResult {
    pub fn reached(&self) -> bool {
        self.reached_time.is_some()
    }
}

/// Sensor results of one log, keyed by sensor identifier
pub type FileResults = BTreeMap<String, SensorResult>;

/// Analyzes every `ActValue` column of a log matching a sensor target
///
/// Columns without target are ignored and, when 2 columns match the same
/// sensor, the first one is kept.
pub fn analyze(log: &ScadaLog, targets: &SensorTargets) -> FileResults {
    let mut results = FileResults::new();
    let Some(start_time) = log.start() else {
        return results;
    };
    for (column, header) in log.columns().iter().enumerate() {
        let Some(target) = targets.match_column(header) else {
            continue;
        };
        if results.contains_key(&target.sensor) {
            log::debug!("{}: {} already analyzed", header, target.sensor);
            continue;
        }
        let readings: Vec<Reading> = log
            .series(column)
            .filter_map(|(t, m, v)| v.map(|v| Reading::new(t, m, v)))
            .collect();
        let (Some(first), Some(last)) = (readings.first(), readings.last()) else {
            log::warn!("{}: no numeric reading", header);
            continue;
        };
        let (start_temp, final_temp) = (first.temperature, last.temperature);
        let crossing = first_crossing(readings.iter().copied(), target.target);
        results.insert(
            target.sensor.clone(),
            SensorResult {
                start_time,
                start_temp,
                target_temp: target.target,
                reached_time: crossing.map(|r| r.timestamp),
                time_to_target: crossing.map(|r| r.elapsed_minutes),
                heating_rate: crossing
                    .and_then(|r| heating_rate(start_temp, target.target, r.elapsed_minutes)),
                final_temp,
                data_points: log.len(),
            },
        );
    }
    results
}

/// Loads and analyzes a log file
pub fn analyze_file<P: AsRef<Path>>(
    path: P,
    targets: &SensorTargets,
) -> Result<(ScadaLog, FileResults), ScadaError> {
    let log = ScadaLog::from_path(path)?;
    let results = analyze(&log, targets);
    Ok((log, results))
}
