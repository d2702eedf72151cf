//! Matrix multiplication and bias broadcast
//!
//! Matrices are stored row-major in flat tensors.

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::{Array1, ArrayView2, Axis};
use std::rc::Rc;

/// Compute C = A @ B on row-major buffers
///
/// * `a` - Left matrix (m×k flattened)
/// * `b` - Right matrix (k×n flattened)
pub fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let a = ArrayView2::from_shape((m, k), a).expect("matrix A shape matches m×k");
    let b = ArrayView2::from_shape((k, n), b).expect("matrix B shape matches k×n");
    a.dot(&b).iter().copied().collect()
}

/// Matrix multiplication with autograd support
///
/// Computes C = A @ B where A is m×k and B is k×n, both flattened row-major.
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "Matrix A size mismatch");
    assert_eq!(b.len(), k * n, "Matrix B size mismatch");

    let result_data = matmul_compute(contiguous(a), contiguous(b), m, k, n);

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(Array1::from(result_data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

fn contiguous(t: &Tensor) -> &[f32] {
    t.data().as_slice().expect("tensor data is contiguous")
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: GradCell,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            let grad_c = ArrayView2::from_shape(
                (self.m, self.n),
                grad_output.as_slice().expect("gradient output is contiguous"),
            )
            .expect("gradient shape matches m×n");

            if self.a.requires_grad() {
                // ∂L/∂A = ∂L/∂C @ Bᵀ  (m×n) @ (n×k)
                let b = ArrayView2::from_shape((self.k, self.n), contiguous(&self.b))
                    .expect("matrix B shape matches k×n");
                let grad_a = grad_c.dot(&b.t());
                self.a.accumulate_grad(grad_a.iter().copied().collect());
            }

            if self.b.requires_grad() {
                // ∂L/∂B = Aᵀ @ ∂L/∂C  (k×m) @ (m×n)
                let a = ArrayView2::from_shape((self.m, self.k), contiguous(&self.a))
                    .expect("matrix A shape matches m×k");
                let grad_b = a.t().dot(&grad_c);
                self.b.accumulate_grad(grad_b.iter().copied().collect());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}

/// Add a bias row vector to every row of a rows×cols matrix
pub fn add_bias(x: &Tensor, bias: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(x.len(), rows * cols, "Matrix size mismatch");
    assert_eq!(bias.len(), cols, "Bias size mismatch");

    let mut data = x.data().clone();
    for (i, value) in data.iter_mut().enumerate() {
        *value += bias.data()[i % cols];
    }

    let requires_grad = x.requires_grad() || bias.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            x: x.clone(),
            bias: bias.clone(),
            rows,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    x: Tensor,
    bias: Tensor,
    rows: usize,
    cols: usize,
    result_grad: GradCell,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                self.x.accumulate_grad(grad.clone());
            }
            if self.bias.requires_grad() {
                let grad_2d = ArrayView2::from_shape(
                    (self.rows, self.cols),
                    grad.as_slice().expect("gradient is contiguous"),
                )
                .expect("gradient shape matches rows×cols");
                self.bias.accumulate_grad(grad_2d.sum_axis(Axis(0)));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.x, &self.bias]
    }
}
