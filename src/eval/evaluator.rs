//! Split-level evaluation loop

use super::measures::{measure, IqaMeasures};
use crate::data::DataLoader;
use crate::model::IqaModel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Outcome of evaluating a model on a full split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvaluation {
    /// Mean batch loss
    pub loss: f32,
    pub measures: IqaMeasures,
    /// Subjective scores in evaluation order
    pub sq: Vec<f32>,
    /// Subjective std-devs in evaluation order
    pub sq_std: Vec<f32>,
    /// Predicted scores in evaluation order
    pub q: Vec<f32>,
}

/// Run the model over every batch of a split and measure the predictions.
///
/// The caller puts the model in the desired mode; the model is not changed.
pub fn evaluate_split<M: IqaModel + ?Sized>(
    model: &M,
    loader: &mut DataLoader,
) -> Result<SplitEvaluation> {
    let mut total_loss = 0.0;
    let mut num_batches = 0;
    let mut sq = Vec::with_capacity(loader.len());
    let mut sq_std = Vec::with_capacity(loader.len());
    let mut q = Vec::with_capacity(loader.len());

    for batch in loader.iter() {
        let batch = batch?;
        let output = model.forward(&batch)?;
        total_loss += output.loss_value();
        num_batches += 1;

        sq.extend_from_slice(&batch.mos);
        sq_std.extend_from_slice(&batch.mos_std);
        q.extend(output.quality);
    }

    if num_batches == 0 {
        return Err(Error::Evaluation("cannot evaluate an empty split".to_string()));
    }

    let measures = measure(&sq, &q, &sq_std)?;
    Ok(SplitEvaluation { loss: total_loss / num_batches as f32, measures, sq, sq_std, q })
}
