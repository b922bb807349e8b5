//! Industrial oven heat-up analysis
//!
//! Tools to analyze the heat-up of an industrial oven from its SCADA
//! temperature logs and to recommend when to start the burners:
//!  - [scada] reads the tab separated SCADA logs,
//!  - [resample] resamples the per-second logs every 30s,
//!  - [analysis] finds when every sensor reaches its target temperature in a log,
//!  - [aggregate] collects the results of a directory of daily logs and
//!    derives per-sensor statistics,
//!  - [report] writes the results and the statistics to text files,
//!  - [predict] back-calculates the burners start time from a pre-trained
//!    [model] and the current [weather].

pub mod aggregate;
pub mod analysis;
pub mod config;
mod error;
pub mod model;
#[cfg(feature = "plot")]
pub mod plot;
pub mod predict;
pub mod report;
pub mod resample;
pub mod scada;
pub mod threshold;
pub mod timestamp;
pub mod weather;

pub use aggregate::{summarize, Aggregator, DailyResultSet, SummaryStatistic};
pub use analysis::{analyze, analyze_file, FileResults, SensorResult};
pub use config::{Config, SensorTarget, SensorTargets};
pub use error::{Error, Result};
pub use model::{HeatUpModel, LinearModel};
pub use predict::{calculate_start_times, PredictionResult, StartTimePredictor};
pub use scada::ScadaLog;
pub use weather::WeatherSnapshot;
