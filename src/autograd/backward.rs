//! Backward operation trait and graph traversal

use super::Tensor;
use ndarray::Array1;
use std::collections::HashSet;
use std::rc::Rc;

/// Gradient rule of a differentiable op.
///
/// `backward` reads the gradient accumulated on the op's result and adds the
/// input gradients into the inputs' cells. It must not recurse: ordering is
/// owned by [`backward`].
pub trait BackwardOp {
    /// Propagate the result gradient to the inputs
    fn backward(&self);

    /// Inputs of the op
    fn inputs(&self) -> Vec<&Tensor>;
}

/// Perform a backward pass from `tensor`.
///
/// Seeds the output gradient (ones when `grad_output` is `None`) and runs
/// every reachable backward op exactly once, consumers before producers.
pub fn backward(tensor: &mut Tensor, grad_output: Option<Array1<f32>>) {
    let seed = grad_output.unwrap_or_else(|| Array1::ones(tensor.len()));
    tensor.set_grad(seed);

    let mut visited = HashSet::new();
    let mut order = Vec::new();
    topo_sort(tensor, &mut visited, &mut order);

    for op in order.iter().rev() {
        op.backward();
    }
}

fn topo_sort(tensor: &Tensor, visited: &mut HashSet<usize>, order: &mut Vec<Rc<dyn BackwardOp>>) {
    let Some(op) = tensor.backward_op() else {
        return;
    };
    if !visited.insert(tensor.node_id()) {
        return;
    }
    for input in op.inputs() {
        topo_sort(input, visited, order);
    }
    order.push(op);
}
