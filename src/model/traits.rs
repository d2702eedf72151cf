//! Model abstraction used by the training controller and the evaluator

use crate::data::IqaBatch;
use crate::io::ModelMetadata;
use crate::{Result, Tensor};

/// Result of a forward pass
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Scalar loss against the batch's subjective scores
    pub loss: Tensor,
    /// Per-patch quality scores
    pub patch_scores: Tensor,
    /// Per-patch aggregation weights (weighted aggregation only)
    pub patch_weights: Option<Tensor>,
    /// Predicted quality, one value per image
    pub quality: Vec<f32>,
}

impl ModelOutput {
    /// Loss value
    pub fn loss_value(&self) -> f32 {
        self.loss.data()[0]
    }
}

/// A differentiable IQA model
pub trait IqaModel {
    /// Compute the loss and the predicted quality of a batch
    fn forward(&self, batch: &IqaBatch) -> Result<ModelOutput>;

    /// Switch to training mode
    fn train(&mut self);

    /// Switch to evaluation mode
    fn eval(&mut self);

    /// Whether the model is in training mode
    fn is_training(&self) -> bool;

    /// Trainable parameters in a stable order
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Named copies of the parameters
    fn state_dict(&self) -> Vec<(String, Tensor)>;

    /// Overwrite parameters by name; every parameter must be present
    fn load_state_dict(&mut self, params: &[(String, Tensor)]) -> Result<()>;

    /// Metadata describing the architecture, enough to rebuild the model
    fn metadata(&self) -> ModelMetadata;

    /// Freeze or unfreeze all parameters
    fn set_requires_grad(&mut self, requires_grad: bool) {
        for param in self.parameters_mut() {
            param.set_requires_grad(requires_grad);
        }
    }

    /// Total number of scalar parameters
    fn num_parameters(&self) -> usize {
        self.state_dict().iter().map(|(_, t)| t.len()).sum()
    }
}
