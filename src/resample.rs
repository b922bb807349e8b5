//! Log resampling
//!
//! The raw SCADA logs are sampled every second. The heat-up analysis works
//! on logs resampled every 30s, each resampled row being the raw row nearest
//! in time to the resampling instant.

use chrono::{Duration, NaiveDateTime};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::scada::{encode_utf16, Sample, ScadaError, ScadaLog};

/// Default resampling interval [s]
pub const INTERVAL_SECONDS: i64 = 30;

#[derive(thiserror::Error, Debug)]
pub enum ResampleError {
    #[error("Failed to load the log to resample")]
    Scada(#[from] ScadaError),
    #[error("Failed to write the resampled records")]
    Csv(#[from] csv::Error),
    #[error("Failed to write the resampled log {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Resampled records are not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid resampling interval: {0}s")]
    Interval(i64),
}
type Result<T> = std::result::Result<T, ResampleError>;

/// Index of the sample nearest to `t`, the earliest one on ties
fn nearest(samples: &[Sample], t: NaiveDateTime) -> Option<usize> {
    let i = samples.partition_point(|s| s.timestamp < t);
    match (i.checked_sub(1), samples.get(i)) {
        (Some(before), Some(after)) => {
            if t - samples[before].timestamp <= after.timestamp - t {
                Some(before)
            } else {
                Some(i)
            }
        }
        (Some(before), None) => Some(before),
        (None, Some(_)) => Some(i),
        (None, None) => None,
    }
}

/// Returns the samples nearest to every `interval` seconds from the log start
///
/// The resampling instants run from the first sample to the last one plus
/// one interval, exclusive.
pub fn resample(log: &ScadaLog, interval: i64) -> Result<Vec<&Sample>> {
    if interval <= 0 {
        return Err(ResampleError::Interval(interval));
    }
    let samples = log.samples();
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Ok(vec![]);
    };
    let step = Duration::seconds(interval);
    let end = last.timestamp + step;
    let mut t = first.timestamp;
    let mut resampled = vec![];
    while t < end {
        if let Some(i) = nearest(samples, t) {
            resampled.push(&samples[i]);
        }
        t += step;
    }
    Ok(resampled)
}

/// Renders resampled rows as a tab separated table
pub fn to_tsv(columns: &[String], samples: &[&Sample]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(vec![]);
    let mut headers = vec!["Date", "Time"];
    headers.extend(columns.iter().map(|c| c.as_str()));
    wtr.write_record(&headers)?;
    for sample in samples {
        let mut record = vec![sample.date.clone(), sample.time.clone()];
        record.extend(
            sample
                .readings
                .iter()
                .map(|r| r.map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ResampleError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Resamples a log file into `<output_dir>/<stem>_30s.CSV`
pub fn resample_file<P, Q>(input: P, output_dir: Q, interval: i64) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();
    let log = ScadaLog::from_path(input)?;
    let resampled = resample(&log, interval)?;
    log::info!(
        "{:?}: {} samples resampled to {}",
        input,
        log.len(),
        resampled.len()
    );
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let path = output_dir.join(format!("{}_{}s.CSV", stem, interval));
    fs::create_dir_all(output_dir).map_err(|e| ResampleError::Io(output_dir.to_path_buf(), e))?;
    let contents = to_tsv(log.columns(), &resampled)?;
    fs::write(&path, encode_utf16(&contents)).map_err(|e| ResampleError::Io(path.clone(), e))?;
    Ok(path)
}
