//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from the model that owns them, so every method
/// works on `&mut Tensor` references.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step_refs(&mut self, params: &mut [&mut Tensor]);

    /// Zero gradients on referenced parameters
    fn zero_grad_refs(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Optimizer name for logging
    fn name(&self) -> &'static str;
}
