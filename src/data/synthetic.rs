//! Synthetic IQA database with a learnable quality signal
//!
//! Feature 0 of every distorted patch carries the distortion level; the other
//! features carry the reference content. Quality decreases linearly with the
//! level, so both network variants can fit it.

use super::{Database, IqaSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Build a database of `n_refs × n_distortions` images
pub fn synthetic_database(
    n_refs: usize,
    n_distortions: usize,
    n_patches: usize,
    feature_dim: usize,
    seed: u64,
) -> Database {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(n_refs * n_distortions);

    for r in 0..n_refs {
        let content: Vec<f32> = (0..feature_dim).map(|_| rng.random_range(-1.0..1.0)).collect();
        let reference_patches: Vec<Vec<f32>> = (0..n_patches)
            .map(|_| {
                let mut row: Vec<f32> =
                    content.iter().map(|c| c + rng.random_range(-0.05..0.05)).collect();
                row[0] = 0.0;
                row
            })
            .collect();

        for d in 0..n_distortions {
            let level = (d + 1) as f32 / n_distortions as f32;
            let patches: Vec<Vec<f32>> = reference_patches
                .iter()
                .map(|ref_row| {
                    let mut row: Vec<f32> =
                        ref_row.iter().map(|v| v + rng.random_range(-0.05..0.05)).collect();
                    row[0] = level + rng.random_range(-0.02..0.02);
                    row
                })
                .collect();

            samples.push(IqaSample {
                id: format!("img{r}_{d}"),
                reference: format!("ref{r}"),
                distortion: d,
                mos: 90.0 - 70.0 * level + rng.random_range(-2.0..2.0),
                mos_std: rng.random_range(3.0..8.0),
                patches,
                ref_patches: Some(reference_patches.clone()),
            });
        }
    }

    Database { name: "synthetic".to_string(), feature_dim, samples }
}
