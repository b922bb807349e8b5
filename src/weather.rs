//! Current weather conditions
//!
//! The ambient temperature drives the oven starting temperature used by the
//! start-time predictor. The weather service is never allowed to stop a
//! prediction: any failure falls back to fixed conditions.

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

use crate::config::WeatherConfig;

#[derive(thiserror::Error, Debug)]
pub enum WeatherError {
    #[error("Weather service request failed")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected weather service response")]
    Json(#[from] serde_json::Error),
}
type Result<T> = std::result::Result<T, WeatherError>;

/// Weather conditions and the derived oven starting temperature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Ambient temperature [C]
    pub ambient_temp: f64,
    /// Oven starting temperature [C]
    pub oven_temp: f64,
    /// Relative humidity [%]
    pub humidity: f64,
    pub conditions: String,
}
impl WeatherSnapshot {
    /// Conditions assumed when the weather service cannot be reached
    pub fn fallback() -> Self {
        Self {
            ambient_temp: 25.,
            oven_temp: 30.,
            humidity: 60.,
            conditions: String::from("Unknown"),
        }
    }
    /// Parses a `current.json` response body
    pub fn from_response(body: &str, oven_offset: f64) -> Result<Self> {
        let Response { current } = serde_json::from_str(body)?;
        Ok(Self {
            ambient_temp: current.temp_c,
            oven_temp: current.temp_c + oven_offset,
            humidity: current.humidity,
            conditions: current.condition.text,
        })
    }
}
impl fmt::Display for WeatherSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Atmospheric Temperature: {}°C", self.ambient_temp)?;
        writeln!(f, "Oven Starting Temperature: {}°C", self.oven_temp)?;
        writeln!(f, "Humidity: {}%", self.humidity)?;
        write!(f, "Weather Conditions: {}", self.conditions)
    }
}

#[derive(Deserialize)]
struct Response {
    current: Current,
}
#[derive(Deserialize)]
struct Current {
    temp_c: f64,
    humidity: f64,
    condition: Condition,
}
#[derive(Deserialize)]
struct Condition {
    text: String,
}

/// Blocking client of the weather service
pub struct WeatherClient<'a> {
    config: &'a WeatherConfig,
    http: reqwest::blocking::Client,
}
impl<'a> WeatherClient<'a> {
    pub fn new(config: &'a WeatherConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }
    /// Requests the current conditions at the configured location
    pub fn fetch(&self) -> Result<WeatherSnapshot> {
        let body = self
            .http
            .get(&self.config.endpoint)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("q", self.config.location.as_str()),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        WeatherSnapshot::from_response(&body, self.config.oven_offset)
    }
}

/// Current conditions, or the configured fallback if the service fails
pub fn current_conditions(config: &WeatherConfig) -> WeatherSnapshot {
    match WeatherClient::new(config).and_then(|client| client.fetch()) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("Weather API error: {} ({:?})", e, e);
            config.fallback.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "location": {"name": "Pune"},
        "current": {
            "temp_c": 22.4,
            "humidity": 71,
            "condition": {"text": "Partly cloudy", "code": 1003}
        }
    }"#;

    #[test]
    fn response() {
        let snapshot = WeatherSnapshot::from_response(BODY, 8.).unwrap();
        assert_eq!(snapshot.ambient_temp, 22.4);
        assert!((snapshot.oven_temp - 30.4).abs() < 1e-12);
        assert_eq!(snapshot.humidity, 71.);
        assert_eq!(snapshot.conditions, "Partly cloudy");
    }

    #[test]
    fn malformed_response() {
        assert!(WeatherSnapshot::from_response("<html>", 8.).is_err());
        assert!(WeatherSnapshot::from_response(r#"{"current": {"temp_c": 20}}"#, 8.).is_err());
        assert!(WeatherSnapshot::from_response(r#"{"error": {"code": 2006}}"#, 8.).is_err());
    }

    #[test]
    fn unreachable_service() {
        let config = WeatherConfig {
            endpoint: String::from("http://127.0.0.1:9/v1/current.json"),
            timeout_secs: 1,
            ..Default::default()
        };
        let snapshot = current_conditions(&config);
        assert_eq!(snapshot, WeatherSnapshot::fallback());
        assert_eq!(snapshot.ambient_temp, 25.);
        assert_eq!(snapshot.oven_temp, 30.);
    }
}
