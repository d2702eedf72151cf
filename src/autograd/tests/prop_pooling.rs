//! Property-based tests for segment pooling

use crate::autograd::{weighted_average_pool, Tensor};
use proptest::collection::vec;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_weighted_pool_bounded_by_group_extremes(
        values in vec((-10.0f32..10.0, 0.01f32..5.0), 1..20),
        split in 0usize..20,
    ) {
        let n = values.len();
        let first = split.min(n - 1) + 1;
        let groups: Vec<usize> = if first < n { vec![first, n - first] } else { vec![n] };

        let q: Vec<f32> = values.iter().map(|v| v.0).collect();
        let w: Vec<f32> = values.iter().map(|v| v.1).collect();
        let out = weighted_average_pool(
            &Tensor::from_vec(q.clone(), false),
            &Tensor::from_vec(w, false),
            &groups,
        );

        let mut start = 0;
        for (g, &size) in groups.iter().enumerate() {
            let slice = &q[start..start + size];
            let lo = slice.iter().copied().fold(f32::INFINITY, f32::min);
            let hi = slice.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            prop_assert!(out.data()[g] >= lo - 1e-3 && out.data()[g] <= hi + 1e-3);
            start += size;
        }
    }

    #[test]
    fn prop_uniform_weights_equal_mean(q in vec(-5.0f32..5.0, 1..30)) {
        let n = q.len();
        let out = weighted_average_pool(
            &Tensor::from_vec(q.clone(), false),
            &Tensor::from_vec(vec![1.0; n], false),
            &[n],
        );
        let mean = q.iter().sum::<f32>() / n as f32;
        prop_assert!((out.data()[0] - mean).abs() < 1e-4);
    }
}
