//! Reverse-mode autograd engine
//!
//! Tensors are flat `f32` buffers. Ops record a [`BackwardOp`] on their
//! result; [`backward`] walks the recorded graph in reverse topological order
//! so nodes shared by several consumers receive the sum of their gradients.

mod backward;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{backward, BackwardOp};
pub use ops::*;
pub use tensor::{GradCell, Tensor};
