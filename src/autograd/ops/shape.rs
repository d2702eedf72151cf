//! Shape manipulation ops

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Concatenate row-major matrices along the column axis.
///
/// Every part has `rows` rows; `parts[i]` has `parts[i].len() / rows` columns.
pub fn concat_cols(parts: &[&Tensor], rows: usize) -> Tensor {
    assert!(rows > 0, "concat_cols: rows must be positive");
    let widths: Vec<usize> = parts
        .iter()
        .map(|p| {
            assert_eq!(p.len() % rows, 0, "concat_cols: part is not rows×cols");
            p.len() / rows
        })
        .collect();
    let total: usize = widths.iter().sum();

    let mut data = Vec::with_capacity(rows * total);
    for r in 0..rows {
        for (part, &w) in parts.iter().zip(&widths) {
            data.extend(part.data().iter().skip(r * w).take(w));
        }
    }

    let requires_grad = parts.iter().any(|p| p.requires_grad());
    let mut result = Tensor::from_vec(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ConcatBackward {
            parts: parts.iter().map(|&p| p.clone()).collect(),
            widths,
            rows,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ConcatBackward {
    parts: Vec<Tensor>,
    widths: Vec<usize>,
    rows: usize,
    result_grad: GradCell,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let total: usize = self.widths.iter().sum();
            let mut offset = 0;
            for (part, &w) in self.parts.iter().zip(&self.widths) {
                if part.requires_grad() {
                    let mut part_grad = Array1::zeros(self.rows * w);
                    for r in 0..self.rows {
                        for c in 0..w {
                            part_grad[r * w + c] = grad[r * total + offset + c];
                        }
                    }
                    part.accumulate_grad(part_grad);
                }
                offset += w;
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        self.parts.iter().collect()
    }
}
