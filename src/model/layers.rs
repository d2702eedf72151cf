//! Fully connected layers

use crate::autograd::{add_bias, matmul, relu};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::Rng;

/// Affine layer `y = x W + b` on row-major batches
#[derive(Debug, Clone)]
pub struct Linear {
    /// `in_features × out_features`
    pub weight: Tensor,
    /// `out_features`
    pub bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Uniform init in `±1/√in_features`
    pub fn new(in_features: usize, out_features: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (in_features as f32).sqrt();
        let weight = (0..in_features * out_features).map(|_| rng.random_range(-bound..bound)).collect();
        let bias = (0..out_features).map(|_| rng.random_range(-bound..bound)).collect();
        Self {
            weight: Tensor::from_vec(weight, true),
            bias: Tensor::from_vec(bias, true),
            in_features,
            out_features,
        }
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Apply to a `rows × in_features` input
    pub fn forward(&self, x: &Tensor, rows: usize) -> Tensor {
        let y = matmul(x, &self.weight, rows, self.in_features, self.out_features);
        add_bias(&y, &self.bias, rows, self.out_features)
    }
}

/// Two linear layers with a ReLU between them
#[derive(Debug, Clone)]
pub struct Mlp {
    pub hidden: Linear,
    pub output: Linear,
}

impl Mlp {
    pub fn new(in_features: usize, hidden: usize, out_features: usize, rng: &mut StdRng) -> Self {
        Self {
            hidden: Linear::new(in_features, hidden, rng),
            output: Linear::new(hidden, out_features, rng),
        }
    }

    pub fn forward(&self, x: &Tensor, rows: usize) -> Tensor {
        let h = relu(&self.hidden.forward(x, rows));
        self.output.forward(&h, rows)
    }

    /// Layers with their index suffix
    pub fn layers(&self) -> [(usize, &Linear); 2] {
        [(0, &self.hidden), (1, &self.output)]
    }

    pub fn layers_mut(&mut self) -> [(usize, &mut Linear); 2] {
        [(0, &mut self.hidden), (1, &mut self.output)]
    }
}
