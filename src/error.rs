//! Error types for the rating pipeline.
//!
//! [`CityError`] covers failures scoped to one city: the worker that hit it
//! logs it and drops the city. [`PipelineError`] aborts the run.

use thiserror::Error;

/// Failure talking to the weather source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no forecast source configured for city '{0}'")]
    UnknownCity(String),

    #[error("invalid forecast url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to '{url}' failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("request to '{url}' returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CityError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed forecast payload: {0}")]
    MalformedPayload(String),

    #[error("no full forecast day for city '{city}'")]
    InsufficientData { city: String },
}

impl From<serde_json::Error> for CityError {
    fn from(e: serde_json::Error) -> Self {
        CityError::MalformedPayload(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dataset is empty, no city to rank")]
    EmptyDataset,

    #[error("failed to persist dataset to '{path}': {reason}")]
    Persistence { path: String, reason: String },
}
