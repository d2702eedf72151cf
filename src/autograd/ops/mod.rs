//! Autograd operations with backward passes
//!
//! This module provides the differentiable operations used by the IQA network.

mod activations;
mod basic;
mod matmul;
mod pooling;
mod shape;

pub use activations::relu;
pub use basic::{add, add_scalar, mul, scale, sub, sum};
pub use matmul::{add_bias, matmul, matmul_compute};
pub use pooling::{mean_pool, weighted_average_pool};
pub use shape::concat_cols;
