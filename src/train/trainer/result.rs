//! Training result types

use crate::eval::{IqaMeasures, SplitEvaluation};
use serde::{Deserialize, Serialize};

/// Loss and measures of one evaluated split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub loss: f32,
    pub measures: IqaMeasures,
}

impl From<&SplitEvaluation> for PhaseResult {
    fn from(evaluation: &SplitEvaluation) -> Self {
        Self { loss: evaluation.loss, measures: evaluation.measures }
    }
}

/// What happened in one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub epoch: usize,
    /// Mean training batch loss
    pub train_loss: f32,
    pub val: PhaseResult,
    /// Present when the test split is evaluated during training
    pub test: Option<PhaseResult>,
    /// Whether this epoch produced a new best model
    pub best_updated: bool,
}

/// The epoch whose model was kept as best
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    pub epoch: usize,
    pub val: PhaseResult,
    pub test: Option<PhaseResult>,
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// One report per epoch
    pub epochs: Vec<EpochReport>,
    /// Last best-model update, if any happened
    pub best: Option<BestRecord>,
    /// Final evaluation of the best model on the test split
    pub test: Option<SplitEvaluation>,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}

impl TrainOutcome {
    /// Training loss of the last epoch
    pub fn final_train_loss(&self) -> Option<f32> {
        self.epochs.last().map(|e| e.train_loss)
    }

    /// Number of best-model updates
    pub fn num_updates(&self) -> usize {
        self.epochs.iter().filter(|e| e.best_updated).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(loss: f32) -> PhaseResult {
        PhaseResult {
            loss,
            measures: IqaMeasures { srocc: 0.5, krocc: 0.4, plcc: 0.6, rmse: 3.0, outlier_ratio: 0.0 },
        }
    }

    #[test]
    fn test_outcome_summaries() {
        let epochs = (0..3)
            .map(|epoch| EpochReport {
                epoch,
                train_loss: 10.0 - epoch as f32,
                val: phase(5.0),
                test: None,
                best_updated: epoch > 0,
            })
            .collect();
        let outcome = TrainOutcome { epochs, best: None, test: None, elapsed_secs: 0.0 };
        assert_eq!(outcome.final_train_loss(), Some(8.0));
        assert_eq!(outcome.num_updates(), 2);
    }

    #[test]
    fn test_empty_outcome() {
        let outcome = TrainOutcome { epochs: vec![], best: None, test: None, elapsed_secs: 0.0 };
        assert!(outcome.final_train_loss().is_none());
    }

    #[test]
    fn test_phase_from_evaluation() {
        let evaluation = SplitEvaluation {
            loss: 1.5,
            measures: phase(0.0).measures,
            sq: vec![1.0],
            sq_std: vec![1.0],
            q: vec![1.0],
        };
        assert_eq!(PhaseResult::from(&evaluation).loss, 1.5);
    }
}
