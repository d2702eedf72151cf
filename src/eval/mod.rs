//! Evaluation of predicted quality against subjective scores
//!
//! - [`measure`]: SROCC, KROCC, PLCC, RMSE and outlier ratio
//! - [`evaluate_split`]: run a model over a split and measure it

mod evaluator;
mod measures;
pub mod stats;

pub use evaluator::{evaluate_split, SplitEvaluation};
pub use measures::{measure, IqaMeasures, QualityMetric};
pub(crate) use measures::nan_from_null;
