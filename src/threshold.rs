//! Target temperature crossing

use chrono::NaiveDateTime;

/// A sensor temperature sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    /// Minutes since the start of the log
    pub elapsed_minutes: f64,
    pub temperature: f64,
}
impl Reading {
    pub fn new(timestamp: NaiveDateTime, elapsed_minutes: f64, temperature: f64) -> Self {
        Self {
            timestamp,
            elapsed_minutes,
            temperature,
        }
    }
}

/// Returns the first reading at or above the target temperature
///
/// `None` means the target was not reached.
pub fn first_crossing<I>(readings: I, target: f64) -> Option<Reading>
where
    I: IntoIterator<Item = Reading>,
{
    readings.into_iter().find(|r| r.temperature >= target)
}

/// Average heating rate [C/min] from `start` to `target` in `elapsed_minutes`
///
/// Undefined, hence `None`, when no time has elapsed.
pub fn heating_rate(start: f64, target: f64, elapsed_minutes: f64) -> Option<f64> {
    (elapsed_minutes > 0f64).then(|| (target - start) / elapsed_minutes)
}
