//! Adam optimizer with L2 weight decay

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Adam optimizer
///
/// Weight decay is coupled: `λ * θ` is added to the gradient before the
/// moment updates (classic L2 regularization, not AdamW).
///
/// m_t = β1 * m_{t-1} + (1 - β1) * g
/// v_t = β2 * v_{t-1} + (1 - β2) * g²
/// θ_t = θ_{t-1} - lr * m̂_t / (√v̂_t + ε)
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>,
    v: Vec<Option<Array1<f32>>>,
}

impl Adam {
    /// Create a new Adam optimizer without weight decay
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self { lr, beta1, beta2, epsilon, weight_decay: 0.0, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Create Adam with default betas and the given weight decay
    pub fn with_weight_decay(lr: f32, weight_decay: f32) -> Self {
        Self { weight_decay, ..Self::new(lr, 0.9, 0.999, 1e-8) }
    }

    /// Optimizer step counter
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// Weight decay coefficient
    #[must_use]
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }
}

impl Optimizer for Adam {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        if self.m.len() < params.len() {
            self.m.resize(params.len(), None);
            self.v.resize(params.len(), None);
        }
        self.t += 1;

        let bias1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias2 = 1.0 - self.beta2.powi(self.t as i32);

        for (i, param) in params.iter_mut().enumerate() {
            if !param.requires_grad() {
                continue;
            }
            let Some(mut grad) = param.grad() else {
                continue;
            };

            if self.weight_decay != 0.0 {
                grad = grad + param.data() * self.weight_decay;
            }

            let m_t = match &self.m[i] {
                Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
                None => &grad * (1.0 - self.beta1),
            };
            let grad_sq = &grad * &grad;
            let v_t = match &self.v[i] {
                Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
                None => &grad_sq * (1.0 - self.beta2),
            };

            let m_hat = &m_t / bias1;
            let v_hat = &v_t / bias2;
            let update = &m_hat / &(v_hat.mapv(f32::sqrt) + self.epsilon) * self.lr;
            *param.data_mut() -= &update;

            self.m[i] = Some(m_t);
            self.v[i] = Some(v_t);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn name(&self) -> &'static str {
        "adam"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_adam_first_step_moves_by_lr() {
        // With bias correction the first update is lr * sign(g)
        let mut opt = Adam::new(0.1, 0.9, 0.999, 1e-8);
        let mut param = Tensor::from_vec(vec![1.0, -1.0], true);
        param.set_grad(arr1(&[2.0, -0.5]));

        opt.step_refs(&mut [&mut param]);

        assert_abs_diff_eq!(param.data()[0], 0.9, epsilon = 1e-5);
        assert_abs_diff_eq!(param.data()[1], -0.9, epsilon = 1e-5);
        assert_eq!(opt.step_count(), 1);
    }

    #[test]
    fn test_adam_skips_params_without_grad() {
        let mut opt = Adam::new(0.1, 0.9, 0.999, 1e-8);
        let mut param = Tensor::from_vec(vec![1.0, 2.0], true);

        opt.step_refs(&mut [&mut param]);
        assert_eq!(param.data().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_adam_skips_frozen_params() {
        let mut opt = Adam::new(0.1, 0.9, 0.999, 1e-8);
        let mut param = Tensor::from_vec(vec![1.0], false);
        param.set_grad(arr1(&[1.0]));

        opt.step_refs(&mut [&mut param]);
        assert_eq!(param.data()[0], 1.0);
    }

    #[test]
    fn test_weight_decay_pulls_towards_zero() {
        // Zero loss gradient: only the decay term drives the update
        let mut opt = Adam::with_weight_decay(0.01, 0.1);
        let mut param = Tensor::from_vec(vec![5.0, -5.0], true);
        param.set_grad(arr1(&[0.0, 0.0]));

        opt.step_refs(&mut [&mut param]);
        assert!(param.data()[0] < 5.0);
        assert!(param.data()[1] > -5.0);
    }

    #[test]
    fn test_adam_minimizes_quadratic() {
        // f(x) = (x - 3)², ∇f = 2(x - 3)
        let mut opt = Adam::new(0.1, 0.9, 0.999, 1e-8);
        let mut param = Tensor::from_vec(vec![0.0], true);

        for _ in 0..500 {
            param.zero_grad();
            let x = param.data()[0];
            param.set_grad(arr1(&[2.0 * (x - 3.0)]));
            opt.step_refs(&mut [&mut param]);
        }

        assert_abs_diff_eq!(param.data()[0], 3.0, epsilon = 0.05);
    }
}
