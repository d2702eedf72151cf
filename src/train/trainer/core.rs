//! Core trainer struct and configuration

use crate::config::RunPaths;
use crate::data::{DataLoader, DatasetSplits};
use crate::model::IqaModel;
use crate::optim::Optimizer;
use crate::tracking::PhaseLoggers;

/// Epoch loop settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// Experiment id, reported in best-model updates
    pub exp_id: u64,
    pub n_epochs: usize,
    /// Evaluate the test split after every epoch
    pub test_during_training: bool,
    /// Best-model updates start after `n_epochs / warmup_divisor` epochs
    pub warmup_divisor: f64,
}

impl TrainerConfig {
    pub fn new(exp_id: u64, n_epochs: usize) -> Self {
        Self { exp_id, n_epochs, test_during_training: false, warmup_divisor: 6.0 }
    }

    pub fn with_test_during_training(mut self, enabled: bool) -> Self {
        self.test_during_training = enabled;
        self
    }

    /// Whether `epoch` is past the warm-up window (real division)
    pub fn past_warmup(&self, epoch: usize) -> bool {
        epoch as f64 > self.n_epochs as f64 / self.warmup_divisor
    }
}

/// Loaders of one experiment
#[derive(Debug, Clone)]
pub struct SplitLoaders {
    /// Shuffled every epoch
    pub train: DataLoader,
    /// One image per batch, file order
    pub val: DataLoader,
    /// One image per batch, file order
    pub test: Option<DataLoader>,
    /// Reference contents of the test split
    pub test_index: Vec<String>,
}

impl SplitLoaders {
    pub fn new(splits: DatasetSplits, feature_dim: usize, batch_size: usize, seed: u64) -> Self {
        let test = (!splits.test.is_empty()).then(|| DataLoader::new(splits.test, feature_dim, 1));
        Self {
            train: DataLoader::new(splits.train, feature_dim, batch_size).with_shuffle(seed),
            val: DataLoader::new(splits.val, feature_dim, 1),
            test,
            test_index: splits.test_index,
        }
    }
}

/// Runs the epoch loop, keeps the best model by validation loss and tests it
///
/// # Example
///
/// ```no_run
/// use iqa_train::config::RunPaths;
/// use iqa_train::data::{split_database, synthetic_database, SplitConfig};
/// use iqa_train::model::{Aggregation, ModelKind, WaDIQaM, WaDIQaMConfig};
/// use iqa_train::optim::Adam;
/// use iqa_train::train::{IqaTrainer, SplitLoaders, TrainerConfig};
///
/// # fn main() -> iqa_train::Result<()> {
/// let db = synthetic_database(10, 4, 8, 6, 0);
/// let splits = split_database(&db, &SplitConfig::for_experiment(0.6, 0.2, 0, 0))?;
/// let mut loaders = SplitLoaders::new(splits, db.feature_dim, 4, 0);
///
/// let model = WaDIQaM::new(WaDIQaMConfig {
///     kind: ModelKind::NoReference,
///     aggregation: Aggregation::Weighted,
///     feature_dim: db.feature_dim,
///     hidden_dim: 16,
///     seed: 0,
/// })?;
/// let mut trainer = IqaTrainer::new(
///     model,
///     Box::new(Adam::with_weight_decay(1e-3, 0.0)),
///     TrainerConfig::new(0, 30),
///     RunPaths::new("out", "synthetic", "WaDIQaM-NR", 0),
/// );
/// let outcome = trainer.run(&mut loaders)?;
/// println!("best epoch: {:?}", outcome.best.map(|b| b.epoch));
/// # Ok(())
/// # }
/// ```
pub struct IqaTrainer<M: IqaModel> {
    pub(crate) model: M,
    pub(crate) optimizer: Box<dyn Optimizer>,
    pub(crate) config: TrainerConfig,
    pub(crate) paths: RunPaths,
    pub(crate) loggers: Option<PhaseLoggers>,
    /// Validation loss of the current best model
    pub(crate) best_val_loss: f32,
    /// Whether a parameter snapshot has been written in this run
    pub(crate) snapshot_written: bool,
}

impl<M: IqaModel> IqaTrainer<M> {
    pub fn new(
        model: M,
        optimizer: Box<dyn Optimizer>,
        config: TrainerConfig,
        paths: RunPaths,
    ) -> Self {
        Self {
            model,
            optimizer,
            config,
            paths,
            loggers: None,
            best_val_loss: f32::INFINITY,
            snapshot_written: false,
        }
    }

    /// Record scalar curves
    pub fn with_loggers(mut self, loggers: PhaseLoggers) -> Self {
        self.loggers = Some(loggers);
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    /// Validation loss of the current best model (infinite before the first update)
    pub fn best_val_loss(&self) -> f32 {
        self.best_val_loss
    }

    /// Get current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }
}
