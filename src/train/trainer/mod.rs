//! IQA training controller

mod core;
mod epoch;
mod result;
mod step;

pub use self::core::{IqaTrainer, SplitLoaders, TrainerConfig};
pub use result::{BestRecord, EpochReport, PhaseResult, TrainOutcome};
