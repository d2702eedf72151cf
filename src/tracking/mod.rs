//! Scalar curve tracking
//!
//! Each run phase (`train`, `val`, `test`) gets its own directory under
//! `logs/` holding a `scalars.jsonl` file: one `{"tag", "value", "step"}`
//! object per line, appended as training progresses.
//!
//! # Example
//!
//! ```no_run
//! use iqa_train::tracking::ScalarLogger;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut logger = ScalarLogger::create("logs/EXP0-LIVE-WaDIQaM-NR-train")?;
//! logger.scalar_summary("loss", 12.5, 0)?;
//! # Ok(())
//! # }
//! ```

mod scalar;

pub use scalar::{read_scalars, PhaseLoggers, ScalarEntry, ScalarLogger, SCALARS_FILE};

/// Errors from scalar tracking
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;
