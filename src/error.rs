//! Crate-wide error type

use crate::config::ValidationError;
use crate::tracking::TrackingError;

/// Result type alias for iqa-train operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading data, training or evaluating
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Dataset error: {0}")]
    Data(String),

    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    Shape {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),
}

impl Error {
    /// Build a shape mismatch error
    pub fn shape(context: impl Into<String>, expected: Vec<usize>, actual: Vec<usize>) -> Self {
        Self::Shape { context: context.into(), expected, actual }
    }
}
