//! Training step operations

use super::core::IqaTrainer;
use crate::autograd::backward;
use crate::data::{DataLoader, IqaBatch};
use crate::model::IqaModel;
use crate::{Error, Result};

impl<M: IqaModel> IqaTrainer<M> {
    /// Perform a single optimization step on one batch
    ///
    /// Returns the batch loss before the update.
    pub fn train_step(&mut self, batch: &IqaBatch) -> Result<f32> {
        self.optimizer.zero_grad_refs(&mut self.model.parameters_mut());

        let output = self.model.forward(batch)?;
        let mut loss = output.loss;
        let loss_val = loss.data()[0];

        backward(&mut loss, None);
        self.optimizer.step_refs(&mut self.model.parameters_mut());

        Ok(loss_val)
    }

    /// Train for one pass over `loader` in training mode
    ///
    /// Returns the mean batch loss.
    pub fn train_epoch(&mut self, loader: &mut DataLoader) -> Result<f32> {
        self.model.train();

        let mut total_loss = 0.0;
        let mut num_batches = 0;
        for batch in loader.iter() {
            total_loss += self.train_step(&batch?)?;
            num_batches += 1;
        }

        if num_batches == 0 {
            return Err(Error::Data("training split has no batches".to_string()));
        }
        Ok(total_loss / num_batches as f32)
    }
}
