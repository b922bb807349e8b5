//! Pre-trained heat-up duration model
//!
//! The model is an opaque artifact trained elsewhere. The predictor only sees
//! the [HeatUpModel] trait: it hands over features by name and gets back a
//! duration in minutes. The model is responsible for laying the features out
//! in the order it was trained with.

use serde::{Deserialize, Serialize};
use serde_pickle as pickle;
use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Failed to open the model file {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to unpickle the model")]
    Pickle(#[from] pickle::Error),
    #[error("Failed to parse the JSON model")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported model file {0:?}, expected a .pkl or .json file")]
    Format(PathBuf),
    #[error("Model has {features} features but {coefficients} coefficients")]
    Shape { features: usize, coefficients: usize },
    #[error("Missing feature {0:?}")]
    MissingFeature(String),
    #[error("Invalid heating time prediction: {0} minutes")]
    InvalidPrediction(f64),
}
type Result<T> = std::result::Result<T, ModelError>;

/// Model input: feature values keyed by feature name
pub type Features = BTreeMap<String, f64>;

/// Heating duration regression model
pub trait HeatUpModel {
    /// Feature names in training order
    fn feature_names(&self) -> &[String];
    /// Predicted heating duration [min]
    fn predict(&self, features: &Features) -> Result<f64>;
    /// Model input vector, assembled by feature name in training order
    fn input_vector(&self, features: &Features) -> Result<Vec<f64>> {
        self.feature_names()
            .iter()
            .map(|name| {
                features
                    .get(name)
                    .copied()
                    .ok_or_else(|| ModelError::MissingFeature(name.clone()))
            })
            .collect()
    }
}

/// Linear regression exported with its feature names
///
/// The artifact is a dictionary with the `feature_names`, `coefficients` and
/// `intercept` keys, pickled (`.pkl`) or in JSON (`.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}
impl LinearModel {
    pub fn new(feature_names: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        Self {
            feature_names,
            coefficients,
            intercept,
        }
        .checked()
    }
    fn checked(self) -> Result<Self> {
        if self.feature_names.len() != self.coefficients.len() {
            return Err(ModelError::Shape {
                features: self.feature_names.len(),
                coefficients: self.coefficients.len(),
            });
        }
        Ok(self)
    }
    /// Loads the model artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let open = || {
            File::open(path)
                .map(BufReader::new)
                .map_err(|e| ModelError::Io(path.to_path_buf(), e))
        };
        log::info!("Loading model {:?}", path);
        let model: Self = match extension.as_deref() {
            Some("pkl") | Some("pickle") => pickle::from_reader(open()?, Default::default())?,
            Some("json") => serde_json::from_reader(open()?)?,
            _ => return Err(ModelError::Format(path.to_path_buf())),
        };
        model.checked()
    }
}
impl HeatUpModel for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
    fn predict(&self, features: &Features) -> Result<f64> {
        Ok(self
            .input_vector(features)?
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |y, (x, c)| y + x * c))
    }
}
