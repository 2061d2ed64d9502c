//! Error types for tunekit

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuneError {
    /// Array shapes disagree (covariates vs. response, train vs. predict width)
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// A hyperparameter name or value the target family does not accept
    #[error("invalid parameter for {family}: {detail}")]
    InvalidParam { family: String, detail: String },

    /// Configuration rejected before any fitting started
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Data rejected by an estimator (bad labels, too few samples, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Predict/score called before fit
    #[error("model has not been fitted")]
    ModelNotFitted,

    /// Unknown scoring name passed to the metric registry
    #[error("unknown scoring metric: {0}")]
    UnknownMetric(String),

    #[error("dataframe error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TuneError>;
