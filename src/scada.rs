//! SCADA temperature log reader
//!
//! The oven SCADA exports one tab separated file per day, UTF-16 encoded,
//! with a `Date` column, a `Time` column and one `*ActValue*` column per
//! temperature sensor.

use chrono::NaiveDateTime;
use std::{collections::HashSet, fs, path::Path, time::Instant};

use crate::timestamp::{elapsed_minutes, parse_timestamp};

/// Marker of the live temperature columns
pub const ACT_VALUE: &str = "ActValue";

#[derive(thiserror::Error, Debug)]
pub enum ScadaError {
    #[error("Failed to open the SCADA log")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode the SCADA log as UTF-16 or UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("Failed to read the tab separated records")]
    Csv(#[from] csv::Error),
    #[error("Missing the {0:?} column")]
    MissingColumn(&'static str),
    #[error("No row with a valid date and time")]
    NoValidRow,
}
type Result<T> = std::result::Result<T, ScadaError>;

/// Decodes the raw bytes of a log, trying UTF-16 first and UTF-8 next
pub fn decode(bytes: &[u8]) -> Result<String> {
    if let Some(text) = decode_utf16(bytes) {
        return Ok(text);
    }
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    Ok(String::from_utf8(bytes.to_vec())?)
}
fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = match bytes {
        [0xFF, 0xFE, body @ ..] => (body, true),
        [0xFE, 0xFF, body @ ..] => (body, false),
        // no BOM: little endian if the first character is ASCII
        [_, 0, ..] => (bytes, true),
        _ => return None,
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|c| {
            if little_endian {
                u16::from_le_bytes([c[0], c[1]])
            } else {
                u16::from_be_bytes([c[0], c[1]])
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}
/// Encodes text as UTF-16LE with a byte order mark
pub fn encode_utf16(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(|u| u.to_le_bytes()));
    bytes
}

/// A log row with a valid timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Raw `Date` cell
    pub date: String,
    /// Raw `Time` cell, trimmed
    pub time: String,
    pub timestamp: NaiveDateTime,
    /// Minutes since the first valid sample
    pub elapsed_minutes: f64,
    /// One reading per [ScadaLog::columns] entry, `None` if not numeric
    pub readings: Vec<Option<f64>>,
}

/// Temperature time series of a SCADA log
#[derive(Debug, Default, Clone)]
pub struct ScadaLog {
    columns: Vec<String>,
    samples: Vec<Sample>,
    dropped: usize,
}
impl ScadaLog {
    /// Loads a log file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading {:?}...", path);
        let now = Instant::now();
        let bytes = fs::read(path)?;
        let this = Self::parse(&decode(&bytes)?)?;
        log::info!(
            " - {} samples ({} dropped) in {}ms",
            this.len(),
            this.dropped,
            now.elapsed().as_millis()
        );
        Ok(this)
    }
    /// Parses the decoded contents of a log
    ///
    /// Rows with an invalid or repeated timestamp are dropped. Samples are
    /// sorted by timestamp and the elapsed minutes are counted from the first
    /// one.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());
        let headers = rdr.headers()?.clone();
        let position = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(ScadaError::MissingColumn(name))
        };
        let date_idx = position("Date")?;
        let time_idx = position("Time")?;
        let (value_idx, columns): (Vec<usize>, Vec<String>) = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(ACT_VALUE))
            .map(|(i, h)| (i, h.to_owned()))
            .unzip();

        let mut samples = vec![];
        let mut seen = HashSet::new();
        let mut dropped = 0usize;
        for (row, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    log::debug!("row #{}: {}", row + 1, e);
                    dropped += 1;
                    continue;
                }
            };
            let (date, time) = (
                record.get(date_idx).unwrap_or_default(),
                record.get(time_idx).unwrap_or_default(),
            );
            let Some(timestamp) = parse_timestamp(date, time) else {
                log::debug!("row #{}: invalid timestamp {:?} {:?}", row + 1, date, time);
                dropped += 1;
                continue;
            };
            if !seen.insert(timestamp) {
                log::debug!("row #{}: duplicated timestamp {}", row + 1, timestamp);
                dropped += 1;
                continue;
            }
            let readings = value_idx
                .iter()
                .map(|&i| {
                    record
                        .get(i)
                        .and_then(|v| v.parse::<f64>().ok())
                        .filter(|v| v.is_finite())
                })
                .collect();
            samples.push(Sample {
                date: date.to_owned(),
                time: time.to_owned(),
                timestamp,
                elapsed_minutes: 0f64,
                readings,
            });
        }
        samples.sort_by_key(|s| s.timestamp);
        let origin = samples.first().ok_or(ScadaError::NoValidRow)?.timestamp;
        samples
            .iter_mut()
            .for_each(|s| s.elapsed_minutes = elapsed_minutes(origin, s.timestamp));
        Ok(Self {
            columns,
            samples,
            dropped,
        })
    }
    /// Number of valid samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Number of rows dropped while parsing
    pub fn dropped_rows(&self) -> usize {
        self.dropped
    }
    /// Headers of the `ActValue` columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
    /// Timestamp of the first sample
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.samples.first().map(|s| s.timestamp)
    }
    /// Iterator over the (timestamp, elapsed minutes, reading) of a column
    pub fn series(
        &self,
        column: usize,
    ) -> impl Iterator<Item = (NaiveDateTime, f64, Option<f64>)> + '_ {
        self.samples.iter().map(move |s| {
            (
                s.timestamp,
                s.elapsed_minutes,
                s.readings.get(column).copied().flatten(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "Date\tTime\tWU311.ActValue\tWU312.ActValue\tStatus\n\
28-Apr-25\t 03:00:00 AM\t35.0\t36.0\tOK\n\
28-Apr-25\t 03:00:30 AM\t40.5\t\tOK\n\
garbage\t 03:00:45 AM\t41.0\t41.0\tOK\n\
28-Apr-25\t 03:01:00 AM\tn/a\t45.0\tOK\n\
28-Apr-25\t 03:01:00 AM\t99.0\t99.0\tOK\n\
28-Apr-25\t 03:01:30 AM\t50.0\t48.0\tOK\n";

    #[test]
    fn parse_log() {
        let log = ScadaLog::parse(LOG).unwrap();
        assert_eq!(log.columns(), ["WU311.ActValue", "WU312.ActValue"]);
        assert_eq!(log.len(), 4);
        assert_eq!(log.dropped_rows(), 2);
        let series: Vec<_> = log.series(0).map(|(_, m, v)| (m, v)).collect();
        assert_eq!(
            series,
            vec![(0., Some(35.)), (0.5, Some(40.5)), (1., None), (1.5, Some(50.))]
        );
        assert_eq!(log.samples()[1].readings[1], None);
        assert_eq!(log.samples()[0].time, "03:00:00 AM");
    }

    #[test]
    fn leading_garbage() {
        let log = ScadaLog::parse(
            "Date\tTime\tWU311.ActValue\n\
             bad\tbad\t1\n\
             28-Apr-25\t03:00:30 AM\t2\n\
             28-Apr-25\t03:01:30 AM\t3\n",
        )
        .unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.samples()[0].elapsed_minutes, 0.);
        assert_eq!(log.samples()[1].elapsed_minutes, 1.);
    }

    #[test]
    fn out_of_order() {
        let log = ScadaLog::parse(
            "Date\tTime\tWU311.ActValue\n\
             28-Apr-25\t03:01:00 AM\t3\n\
             28-Apr-25\t03:00:00 AM\t1\n",
        )
        .unwrap();
        let series: Vec<_> = log.series(0).map(|(_, m, v)| (m, v)).collect();
        assert_eq!(series, vec![(0., Some(1.)), (1., Some(3.))]);
    }

    #[test]
    fn missing_columns() {
        assert!(matches!(
            ScadaLog::parse("Date\tWU311.ActValue\n28-Apr-25\t1\n"),
            Err(ScadaError::MissingColumn("Time"))
        ));
        assert!(matches!(
            ScadaLog::parse("Date\tTime\tWU311.ActValue\nx\ty\t1\n"),
            Err(ScadaError::NoValidRow)
        ));
    }

    #[test]
    fn utf16_roundtrip() {
        let bytes = encode_utf16(LOG);
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        assert_eq!(decode(&bytes).unwrap(), LOG);
    }

    #[test]
    fn utf16_without_bom() {
        let bytes: Vec<u8> = "Date\tTime".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        assert_eq!(decode(&bytes).unwrap(), "Date\tTime");
    }

    #[test]
    fn utf8_fallback() {
        assert_eq!(decode("Date\tTime°".as_bytes()).unwrap(), "Date\tTime°");
        assert_eq!(decode(b"\xEF\xBB\xBFDate").unwrap(), "Date");
        assert!(decode(&[0xC3, 0x28, 0x41]).is_err());
    }

    #[test]
    fn from_file() {
        let path = std::env::temp_dir().join(format!("scada-log-{}.CSV", std::process::id()));
        fs::write(&path, encode_utf16(LOG)).unwrap();
        let log = ScadaLog::from_path(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log.start().unwrap().to_string(), "2025-04-28 03:00:00");
    }
}
