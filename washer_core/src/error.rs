use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum WasherError {
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("output error: {0}")]
    Output(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("scenario error: {0}")]
    Scenario(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing panel")]
    MissingPanel,
    #[error("missing output stage")]
    MissingOutputs,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
