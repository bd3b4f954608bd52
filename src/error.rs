//! Error types shared across the pipeline.

/// Pipeline error types.
///
/// Nothing in the pipeline catches or retries these; every failure aborts the
/// current step and propagates to the caller.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Missing or out-of-range hyperparameter.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or inconsistent input table.
    #[error("Data error: {0}")]
    Data(String),

    /// Model construction or forward-pass error.
    #[error("Model error: {0}")]
    Model(String),

    /// Tensor-layer error (shape mismatches, device failures, ...).
    #[error("Tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// CSV parse or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `std::result::Result<T, PipelineError>`.
pub type Result<T> = std::result::Result<T, PipelineError>;
