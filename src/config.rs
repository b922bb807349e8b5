//! Analysis and prediction configuration
//!
//! A single [Config] is handed to every component in place of process-wide
//! constants. [Config::default] is the reference deployment; any field may be
//! overridden from a TOML file:
//!
//! ```toml
//! data_dir = "30s_sampled_data"
//! output_dir = "Analysis_Results"
//!
//! [[sensor_targets]]
//! sensor = "WU311"
//! target = 160.0
//!
//! [weather]
//! location = "Pune"
//! oven_offset = 8.0
//! ```

use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    ops::Deref,
    path::{Path, PathBuf},
};

use crate::weather::WeatherSnapshot;

/// Environment variable holding the weather API key
pub const WEATHER_API_KEY_VAR: &str = "WEATHER_API_KEY";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read the configuration file {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse the configuration file")]
    Toml(#[from] toml::de::Error),
    #[error("No sensor targets are configured")]
    NoTargets,
}
type Result<T> = std::result::Result<T, ConfigError>;

/// A sensor identifier and the temperature [C] it must reach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorTarget {
    pub sensor: String,
    pub target: f64,
}
impl SensorTarget {
    pub fn new(sensor: impl Into<String>, target: f64) -> Self {
        Self {
            sensor: sensor.into(),
            target,
        }
    }
}

/// Ordered list of sensor targets
///
/// A log column belongs to the first sensor whose identifier appears in the
/// column header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorTargets(Vec<SensorTarget>);
impl Default for SensorTargets {
    fn default() -> Self {
        Self(vec![
            SensorTarget::new("WU311", 160.),
            SensorTarget::new("WU312", 190.),
            SensorTarget::new("WU314", 190.),
            SensorTarget::new("WU321", 190.),
            SensorTarget::new("WU322", 190.),
            SensorTarget::new("WU323", 190.),
        ])
    }
}
impl Deref for SensorTargets {
    type Target = [SensorTarget];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl FromIterator<SensorTarget> for SensorTargets {
    fn from_iter<I: IntoIterator<Item = SensorTarget>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl SensorTargets {
    /// Returns the sensor target matching a log column header
    pub fn match_column(&self, column: &str) -> Option<&SensorTarget> {
        self.iter().find(|t| column.contains(t.sensor.as_str()))
    }
    /// Returns the target temperature of a sensor
    pub fn target(&self, sensor: &str) -> Option<f64> {
        self.iter().find(|t| t.sensor == sensor).map(|t| t.target)
    }
    /// Iterator over the sensor identifiers
    pub fn sensors(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|t| t.sensor.as_str())
    }
}

/// Weather service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    pub api_key: String,
    pub location: String,
    pub timeout_secs: u64,
    /// Offset [C] added to the ambient temperature to get the oven starting temperature
    pub oven_offset: f64,
    /// Conditions used whenever the service cannot be reached
    pub fallback: WeatherSnapshot,
}
impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://api.weatherapi.com/v1/current.json"),
            api_key: String::new(),
            location: String::from("Pune"),
            timeout_secs: 5,
            oven_offset: 8.,
            fallback: WeatherSnapshot::fallback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sensor_targets: SensorTargets,
    /// Directory of the daily SCADA logs
    pub data_dir: PathBuf,
    /// Directory of the reports and plots
    pub output_dir: PathBuf,
    /// Pre-trained heat-up model artifact
    pub model_path: PathBuf,
    /// Minutes added to every predicted heating time
    pub safety_buffer_minutes: f64,
    pub weather: WeatherConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            sensor_targets: SensorTargets::default(),
            data_dir: PathBuf::from("30s_sampled_data"),
            output_dir: PathBuf::from("Analysis_Results"),
            model_path: PathBuf::from("oven_time_predictor.pkl"),
            safety_buffer_minutes: 10.,
            weather: WeatherConfig::default(),
        }
    }
}
impl Config {
    /// Loads the configuration from a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&contents)
    }
    /// Parses the configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if config.sensor_targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        Ok(config)
    }
    /// Loads the configuration file if any, the defaults otherwise,
    /// and applies the environment overrides
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        Ok(config.with_env())
    }
    /// Takes the weather API key from [WEATHER_API_KEY_VAR] if it is set
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = env::var(WEATHER_API_KEY_VAR) {
            self.weather.api_key = key;
        }
        self
    }
    pub fn data_dir<P: AsRef<Path>>(self, data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn output_dir<P: AsRef<Path>>(self, output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn model_path<P: AsRef<Path>>(self, model_path: P) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            ..self
        }
    }
}
