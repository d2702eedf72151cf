//! Segment pooling: aggregate per-patch values into per-image values
//!
//! `groups[g]` is the number of consecutive elements that belong to image `g`.

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

fn check_groups(len: usize, groups: &[usize]) {
    assert_eq!(groups.iter().sum::<usize>(), len, "group sizes must cover the tensor");
    assert!(groups.iter().all(|&g| g > 0), "group sizes must be positive");
}

/// Weighted average per group: `Σ wᵢ qᵢ / Σ wᵢ`
///
/// Weights must be strictly positive.
pub fn weighted_average_pool(q: &Tensor, w: &Tensor, groups: &[usize]) -> Tensor {
    assert_eq!(q.len(), w.len(), "scores and weights must have same length");
    check_groups(q.len(), groups);

    let mut out = Vec::with_capacity(groups.len());
    let mut start = 0;
    for &size in groups {
        let qs = q.data().slice(ndarray::s![start..start + size]);
        let ws = w.data().slice(ndarray::s![start..start + size]);
        out.push((&qs * &ws).sum() / ws.sum());
        start += size;
    }

    let requires_grad = q.requires_grad() || w.requires_grad();
    let mut result = Tensor::from_vec(out, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(WeightedPoolBackward {
            q: q.clone(),
            w: w.clone(),
            groups: groups.to_vec(),
            pooled: result.data().clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct WeightedPoolBackward {
    q: Tensor,
    w: Tensor,
    groups: Vec<usize>,
    pooled: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for WeightedPoolBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let mut grad_q = Array1::zeros(self.q.len());
            let mut grad_w = Array1::zeros(self.w.len());
            let mut start = 0;
            for (g, &size) in self.groups.iter().enumerate() {
                let total_w: f32 = self.w.data().slice(ndarray::s![start..start + size]).sum();
                for i in start..start + size {
                    // ∂out/∂qᵢ = wᵢ / W, ∂out/∂wᵢ = (qᵢ - out) / W
                    grad_q[i] = grad[g] * self.w.data()[i] / total_w;
                    grad_w[i] = grad[g] * (self.q.data()[i] - self.pooled[g]) / total_w;
                }
                start += size;
            }
            if self.q.requires_grad() {
                self.q.accumulate_grad(grad_q);
            }
            if self.w.requires_grad() {
                self.w.accumulate_grad(grad_w);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.q, &self.w]
    }
}

/// Arithmetic mean per group
pub fn mean_pool(q: &Tensor, groups: &[usize]) -> Tensor {
    check_groups(q.len(), groups);

    let mut out = Vec::with_capacity(groups.len());
    let mut start = 0;
    for &size in groups {
        out.push(q.data().slice(ndarray::s![start..start + size]).sum() / size as f32);
        start += size;
    }

    let requires_grad = q.requires_grad();
    let mut result = Tensor::from_vec(out, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MeanPoolBackward {
            q: q.clone(),
            groups: groups.to_vec(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MeanPoolBackward {
    q: Tensor,
    groups: Vec<usize>,
    result_grad: GradCell,
}

impl BackwardOp for MeanPoolBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.q.requires_grad() {
                let mut grad_q = Array1::zeros(self.q.len());
                let mut start = 0;
                for (g, &size) in self.groups.iter().enumerate() {
                    for i in start..start + size {
                        grad_q[i] = grad[g] / size as f32;
                    }
                    start += size;
                }
                self.q.accumulate_grad(grad_q);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.q]
    }
}
