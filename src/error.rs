use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the score dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data unavailable: could not read {path}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset: {0}")]
    Malformed(#[from] csv::Error),
    #[error("malformed dataset: missing column `{0}`")]
    MissingColumn(String),
}

/// Inputs the statistics layer refuses to summarize.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("no samples to summarize")]
    EmptyInput,
    #[error("degenerate input: x values have no spread")]
    DegenerateInput,
    #[error("samples are not finite or overflow the sums")]
    NonFiniteInput,
    #[error("paired samples differ in length ({x} x values, {y} y values)")]
    LengthMismatch { x: usize, y: usize },
    #[error("invalid histogram domain [{lo}, {hi}]")]
    InvalidDomain { lo: f64, hi: f64 },
    #[error("histogram needs at least one bin")]
    InvalidBinCount,
}
