//! Date and time normalization
//!
//! The SCADA exports split every sample timestamp into a `Date` column
//! (`28-Apr-25`) and a 12-hour `Time` column (` 03:00:55 AM`), the latter
//! often padded with whitespace.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::Path;

/// Format of the joined `Date` and `Time` columns
pub const SCADA_FORMAT: &str = "%d-%b-%y %I:%M:%S %p";
/// Format of the timestamps written to the reports
pub const REPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Format of the dates written to the reports
pub const DATE_FORMAT: &str = "%d-%b-%Y";
/// Format of the date encoded in the first 6 characters of a log file name
pub const FILENAME_DATE_FORMAT: &str = "%d%m%y";

/// Parses a `Date` and `Time` pair into a timestamp
///
/// Returns `None` if the pair does not match [SCADA_FORMAT]
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let stamp = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&stamp, SCADA_FORMAT).ok()
}

/// Minutes elapsed from `origin` to `timestamp`
pub fn elapsed_minutes(origin: NaiveDateTime, timestamp: NaiveDateTime) -> f64 {
    (timestamp - origin).num_milliseconds() as f64 / 60_000f64
}

/// Parses the date from the leading `DDMMYY` characters of a file name
pub fn date_from_filename<P: AsRef<Path>>(path: P) -> Option<NaiveDate> {
    let name = path.as_ref().file_name()?.to_str()?;
    let prefix = name.get(..6)?;
    NaiveDate::parse_from_str(prefix, FILENAME_DATE_FORMAT).ok()
}

/// Parses a strict `HH:MM` 24-hour clock time
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let strict = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !strict {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}
