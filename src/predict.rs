//! Oven start-time prediction
//!
//! For a target completion time, the heating duration of every sensor is
//! predicted from the current conditions and the latest start time of each
//! sensor is back-calculated. The sensor with the earliest start time binds
//! the whole oven.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::{
    fmt,
    io::{self, BufRead, Write},
};

use crate::{
    config::{Config, SensorTargets},
    model::{Features, HeatUpModel, LinearModel, ModelError},
    timestamp::parse_clock_time,
    weather::{current_conditions, WeatherSnapshot},
};

/// Default minutes added to every predicted heating duration
pub const SAFETY_BUFFER_MINUTES: f64 = 10.;

/// Prompts for a `HH:MM` target time until a valid one is entered
pub fn prompt_target_time<R, W>(mut input: R, output: &mut W) -> io::Result<NaiveTime>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "Enter target time in HH:MM format (e.g., 03:00 for 3 AM): ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no target time entered",
            ));
        }
        match parse_clock_time(&line) {
            Some(time) => return Ok(time),
            None => writeln!(output, "Invalid format! Please use HH:MM (e.g., 06:30)")?,
        }
    }
}

/// Model features of a sensor under the given conditions
///
/// The sensor is one-hot encoded over all the sensor targets as `sensor_<ID>`.
pub fn features(weather: &WeatherSnapshot, targets: &SensorTargets, sensor: &str) -> Features {
    let mut features = Features::from([
        ("start_temp".to_string(), weather.oven_temp),
        ("ambient_temp".to_string(), weather.ambient_temp),
        ("humidity".to_string(), weather.humidity),
        (
            "target_temp".to_string(),
            targets.target(sensor).unwrap_or(f64::NAN),
        ),
    ]);
    features.extend(
        targets
            .sensors()
            .map(|s| (format!("sensor_{}", s), if s == sensor { 1. } else { 0. })),
    );
    features
}

/// Heating requirement of one sensor
#[derive(Debug, Clone, PartialEq)]
pub struct SensorPrediction {
    pub sensor: String,
    pub target_temp: f64,
    /// Predicted heating duration including the safety buffer [min]
    pub heating_minutes: f64,
    /// Latest start time to reach the target temperature in time
    pub start_time: NaiveDateTime,
}

/// Start times of all the sensors for a target completion time
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub weather: WeatherSnapshot,
    pub target: NaiveDateTime,
    pub sensors: Vec<SensorPrediction>,
}
impl PredictionResult {
    /// The sensor with the earliest start time, i.e. the longest heat-up
    pub fn binding(&self) -> Option<&SensorPrediction> {
        self.sensors.iter().min_by_key(|p| p.start_time)
    }
}
impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{:-^40}", " Current Conditions ")?;
        writeln!(f, "{}\n", self.weather)?;
        writeln!(f, "{:-^40}", " Sensor Requirements ")?;
        for p in &self.sensors {
            writeln!(f, "{} (Target: {}°C):", p.sensor, p.target_temp)?;
            writeln!(f, "→ Required Heating Time: {:.1} minutes", p.heating_minutes)?;
            writeln!(f, "→ Latest Start Time: {}\n", p.start_time.format("%H:%M"))?;
        }
        if let Some(binding) = self.binding() {
            writeln!(f, "{:-^40}", " OPERATIONAL DECISION ")?;
            writeln!(
                f,
                "To reach all targets by {}:",
                self.target.format("%H:%M")
            )?;
            writeln!(
                f,
                "→ Start ALL burners by: {}",
                binding.start_time.format("%H:%M")
            )?;
            write!(
                f,
                "→ Based on longest heating time: {:.1} minutes ({})",
                binding.heating_minutes, binding.sensor
            )?;
        }
        Ok(())
    }
}

/// Start-time predictor
pub struct StartTimePredictor<'a, M> {
    targets: &'a SensorTargets,
    model: &'a M,
    safety_buffer_minutes: f64,
}
impl<'a, M: HeatUpModel> StartTimePredictor<'a, M> {
    pub fn new(targets: &'a SensorTargets, model: &'a M) -> Self {
        Self {
            targets,
            model,
            safety_buffer_minutes: SAFETY_BUFFER_MINUTES,
        }
    }
    pub fn safety_buffer(self, minutes: f64) -> Self {
        Self {
            safety_buffer_minutes: minutes,
            ..self
        }
    }
    /// Predicts the start time of every sensor to be heated by `target`
    pub fn predict(
        &self,
        target: NaiveDateTime,
        weather: &WeatherSnapshot,
    ) -> Result<PredictionResult, ModelError> {
        let sensors = self
            .targets
            .iter()
            .map(|t| {
                let features = features(weather, self.targets, &t.sensor);
                let heating_minutes = self.model.predict(&features)? + self.safety_buffer_minutes;
                log::debug!("{}: {:.1} minutes", t.sensor, heating_minutes);
                let start_time = Some(heating_minutes)
                    .filter(|m| m.is_finite() && *m > 0.)
                    .and_then(|m| Duration::try_seconds((m * 60.).round() as i64))
                    .and_then(|d| target.checked_sub_signed(d))
                    .ok_or(ModelError::InvalidPrediction(heating_minutes))?;
                Ok(SensorPrediction {
                    sensor: t.sensor.clone(),
                    target_temp: t.target,
                    heating_minutes,
                    start_time,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        Ok(PredictionResult {
            weather: weather.clone(),
            target,
            sensors,
        })
    }
}

/// Loads the model, fetches the weather and predicts the start times for
/// `target_time` on `date`
pub fn calculate_start_times(
    config: &Config,
    date: NaiveDate,
    target_time: NaiveTime,
) -> crate::Result<PredictionResult> {
    let model = LinearModel::load(&config.model_path)?;
    let weather = current_conditions(&config.weather);
    let prediction = StartTimePredictor::new(&config.sensor_targets, &model)
        .safety_buffer(config.safety_buffer_minutes)
        .predict(date.and_time(target_time), &weather)?;
    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SensorTarget, WeatherConfig};
    use std::collections::BTreeMap;

    /// Returns a fixed duration per one-hot encoded sensor
    struct FixedModel {
        names: Vec<String>,
        minutes: BTreeMap<String, f64>,
    }
    impl FixedModel {
        fn new(minutes: &[(&str, f64)]) -> Self {
            Self {
                names: vec!["start_temp".into()],
                minutes: minutes.iter().map(|(s, m)| (s.to_string(), *m)).collect(),
            }
        }
    }
    impl HeatUpModel for FixedModel {
        fn feature_names(&self) -> &[String] {
            &self.names
        }
        fn predict(&self, features: &Features) -> Result<f64, ModelError> {
            self.input_vector(features)?;
            let (sensor, _) = features
                .iter()
                .find(|(k, v)| k.starts_with("sensor_") && **v == 1.)
                .ok_or_else(|| ModelError::MissingFeature("sensor_*".into()))?;
            Ok(self.minutes[sensor.trim_start_matches("sensor_")])
        }
    }

    fn two_sensors() -> SensorTargets {
        vec![SensorTarget::new("WU311", 160.), SensorTarget::new("WU312", 190.)]
            .into_iter()
            .collect()
    }

    fn six_am() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 28)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    #[test]
    fn one_hot_features() {
        let targets = SensorTargets::default();
        let features = features(&WeatherSnapshot::fallback(), &targets, "WU314");
        assert_eq!(features.len(), 4 + 6);
        assert_eq!(features["start_temp"], 30.);
        assert_eq!(features["ambient_temp"], 25.);
        assert_eq!(features["humidity"], 60.);
        assert_eq!(features["target_temp"], 190.);
        assert_eq!(features["sensor_WU314"], 1.);
        assert_eq!(
            features
                .iter()
                .filter(|(k, _)| k.starts_with("sensor_"))
                .map(|(_, v)| v)
                .sum::<f64>(),
            1.
        );
    }

    #[test]
    fn binding_sensor() {
        let targets = two_sensors();
        let model = FixedModel::new(&[("WU311", 30.), ("WU312", 45.)]);
        let result = StartTimePredictor::new(&targets, &model)
            .predict(six_am(), &WeatherSnapshot::fallback())
            .unwrap();
        assert_eq!(result.sensors[0].heating_minutes, 40.);
        assert_eq!(result.sensors[1].heating_minutes, 55.);
        assert_eq!(result.sensors[0].start_time.format("%H:%M").to_string(), "05:20");
        let binding = result.binding().unwrap();
        assert_eq!(binding.sensor, "WU312");
        assert_eq!(binding.start_time.format("%H:%M").to_string(), "05:05");
        let text = result.to_string();
        assert!(text.contains("→ Start ALL burners by: 05:05"));
        assert!(text.contains("To reach all targets by 06:00:"));
    }

    #[test]
    fn crosses_midnight() {
        let targets = two_sensors();
        let model = FixedModel::new(&[("WU311", 20.), ("WU312", 50.)]);
        let target = NaiveDate::from_ymd_opt(2025, 4, 28)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap();
        let result = StartTimePredictor::new(&targets, &model)
            .predict(target, &WeatherSnapshot::fallback())
            .unwrap();
        // 00:00 on the same day and 23:30 the day before
        assert_eq!(result.binding().unwrap().sensor, "WU312");
        assert_eq!(
            result.binding().unwrap().start_time.to_string(),
            "2025-04-27 23:30:00"
        );
    }

    #[test]
    fn missing_feature() {
        let targets = two_sensors();
        let model = LinearModel::new(vec!["wind_speed".into()], vec![1.], 0.).unwrap();
        assert!(matches!(
            StartTimePredictor::new(&targets, &model).predict(six_am(), &WeatherSnapshot::fallback()),
            Err(ModelError::MissingFeature(_))
        ));
    }

    #[test]
    fn invalid_predictions() {
        let targets = two_sensors();
        for coefficient in [1e13, f64::NAN, f64::INFINITY, -1.] {
            let model = LinearModel::new(vec!["target_temp".into()], vec![coefficient], 0.).unwrap();
            let result = StartTimePredictor::new(&targets, &model)
                .predict(six_am(), &WeatherSnapshot::fallback());
            assert!(
                matches!(result, Err(ModelError::InvalidPrediction(_))),
                "{}: {:?}",
                coefficient,
                result
            );
        }
    }

    #[test]
    fn weather_outage() {
        let dir = std::env::temp_dir().join(format!("predict-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let model_path = dir.join("model.json");
        let model = LinearModel::new(
            vec!["start_temp".into(), "ambient_temp".into()],
            vec![1., 1.],
            0.,
        )
        .unwrap();
        std::fs::write(&model_path, serde_json::to_vec(&model).unwrap()).unwrap();
        let config = Config {
            sensor_targets: two_sensors(),
            weather: WeatherConfig {
                endpoint: String::from("http://127.0.0.1:9/v1/current.json"),
                timeout_secs: 1,
                ..Default::default()
            },
            ..Default::default()
        }
        .model_path(&model_path);
        let result = calculate_start_times(
            &config,
            NaiveDate::from_ymd_opt(2025, 4, 28).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        )
        .unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(result.weather.ambient_temp, 25.);
        assert_eq!(result.weather.oven_temp, 30.);
        // 30 + 25 + 10 minutes
        assert_eq!(result.sensors[0].heating_minutes, 65.);
        assert_eq!(result.binding().unwrap().start_time.format("%H:%M").to_string(), "04:55");
    }

    #[test]
    fn missing_model() {
        let config = Config::default().model_path("does/not/exist.pkl");
        let date = NaiveDate::from_ymd_opt(2025, 4, 28).unwrap();
        let time = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        assert!(matches!(
            calculate_start_times(&config, date, time),
            Err(crate::Error::Model(ModelError::Io(..)))
        ));
    }

    #[test]
    fn prompt() {
        let input = b"6:30\nnoon\n06:30\n".as_slice();
        let mut output = vec![];
        let time = prompt_target_time(input, &mut output).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Invalid format!").count(), 2);
    }

    #[test]
    fn prompt_eof() {
        let mut output = vec![];
        let err = prompt_target_time(b"25:00\n".as_slice(), &mut output).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
