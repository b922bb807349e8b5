use crate::{
    config::ConfigError, model::ModelError, report::ReportError, resample::ResampleError,
    scada::ScadaError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `scada` module")]
    Scada(#[from] ScadaError),
    #[error("Error in the `config` module")]
    Config(#[from] ConfigError),
    #[error("Error in the `model` module")]
    Model(#[from] ModelError),
    #[error("Error in the `report` module")]
    Report(#[from] ReportError),
    #[error("Error in the `resample` module")]
    Resample(#[from] ResampleError),
    #[cfg(feature = "plot")]
    #[error("Error in the `plot` module")]
    Plot(#[from] crate::plot::PlotError),
}
pub type Result<T> = std::result::Result<T, Error>;
