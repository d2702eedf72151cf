//! Training
//!
//! - [`IqaTrainer`]: epoch loop with best-model selection by validation loss
//! - [`run_experiment`]: config to trained, tested model
//! - [`L1Loss`]: the training objective

mod experiment;
mod loss;
mod trainer;

pub use experiment::{evaluate_checkpoint, load_checkpoint, prepare_data, run_experiment};
pub use loss::{L1Loss, LossFn};
pub use trainer::{
    BestRecord, EpochReport, IqaTrainer, PhaseResult, SplitLoaders, TrainOutcome, TrainerConfig,
};
