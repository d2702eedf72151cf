//! Loss functions

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Trait for loss functions
pub trait LossFn {
    /// Compute a scalar loss and record its gradient rule
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &'static str;
}

/// L1 Loss (Mean Absolute Error)
///
/// L = mean(|predictions - targets|)
///
/// # Example
///
/// ```
/// use iqa_train::train::{L1Loss, LossFn};
/// use iqa_train::Tensor;
///
/// let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
/// let target = Tensor::from_vec(vec![1.5, 2.5, 3.5], false);
///
/// let loss = L1Loss.forward(&pred, &target);
/// assert!((loss.data()[0] - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct L1Loss;

impl LossFn for L1Loss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let diff = predictions.data() - targets.data();
        let mae = diff.mapv(f32::abs).mean().unwrap_or(0.0);

        let mut loss = Tensor::from_vec(vec![mae], predictions.requires_grad());

        if predictions.requires_grad() {
            // ∂L/∂pred = sign(pred - target) / n, zero at the kink
            let n = predictions.len() as f32;
            let local_grad = diff.mapv(|d| {
                if d > 0.0 {
                    1.0 / n
                } else if d < 0.0 {
                    -1.0 / n
                } else {
                    0.0
                }
            });
            loss.set_backward_op(Rc::new(L1Backward {
                predictions: predictions.clone(),
                local_grad,
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "L1"
    }
}

struct L1Backward {
    predictions: Tensor,
    local_grad: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for L1Backward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.local_grad * grad[0]);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.predictions]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_l1_loss_basic() {
        let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        let target = Tensor::from_vec(vec![2.0, 2.0, 1.0], false);
        let loss = L1Loss.forward(&pred, &target);
        assert_abs_diff_eq!(loss.data()[0], 1.0);
    }

    #[test]
    fn test_l1_loss_gradient() {
        let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], true);
        let target = Tensor::from_vec(vec![2.0, 2.0, 1.0, 5.0], false);
        let mut loss = L1Loss.forward(&pred, &target);
        backward(&mut loss, None);

        let grad = pred.grad().expect("gradient should be available");
        assert_eq!(grad.to_vec(), vec![-0.25, 0.0, 0.25, -0.25]);
    }

    #[test]
    fn test_l1_no_grad_for_constants() {
        let pred = Tensor::from_vec(vec![1.0], false);
        let target = Tensor::from_vec(vec![0.0], false);
        let loss = L1Loss.forward(&pred, &target);
        assert!(!loss.requires_grad());
        assert!(loss.backward_op().is_none());
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_l1_mismatched_lengths() {
        let pred = Tensor::from_vec(vec![1.0, 2.0], true);
        let target = Tensor::from_vec(vec![1.0], false);
        let _ = L1Loss.forward(&pred, &target);
    }
}
