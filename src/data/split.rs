//! Reference-disjoint train / val / test splitting
//!
//! Reference contents are permuted with a seed derived from the experiment id.
//! Over the permuted list of `n` references:
//!
//! - train: `[0, ceil(train_ratio * n))`
//! - val:   `[ceil(train_ratio * n), n - ceil(test_ratio * n))`
//! - test:  `[n - ceil(test_ratio * n), n)`
//!
//! Every distorted image follows its reference, so no content is shared
//! between splits.

use super::{Database, IqaSample};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Split ratios and the experiment seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of references used for training
    pub train_ratio: f64,
    /// Fraction of references held out for testing (0 disables the test split)
    pub test_ratio: f64,
    /// Seed of the reference permutation
    pub seed: u64,
}

impl SplitConfig {
    /// Permutation seed for one experiment run
    pub fn for_experiment(train_ratio: f64, test_ratio: f64, base_seed: u64, exp_id: u64) -> Self {
        Self { train_ratio, test_ratio, seed: base_seed.wrapping_add(exp_id) }
    }
}

/// The three splits of one experiment
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    pub train: Vec<IqaSample>,
    pub val: Vec<IqaSample>,
    /// Empty when `test_ratio == 0`
    pub test: Vec<IqaSample>,
    /// Reference ids of the test split, in permutation order
    pub test_index: Vec<String>,
}

impl DatasetSplits {
    /// Whether a test split exists
    pub fn has_test(&self) -> bool {
        !self.test.is_empty()
    }
}

/// `ceil` that ignores floating-point noise just above an integer
fn ceil_count(ratio: f64, n: usize) -> usize {
    let exact = ratio * n as f64;
    ((exact - 1e-9).ceil().max(0.0) as usize).min(n)
}

/// Split a database by reference content
pub fn split_database(database: &Database, config: &SplitConfig) -> Result<DatasetSplits> {
    let mut references = database.references();
    let n = references.len();
    let mut rng = StdRng::seed_from_u64(config.seed);
    references.shuffle(&mut rng);

    let train_end = ceil_count(config.train_ratio, n);
    let test_start = if config.test_ratio > 0.0 {
        n - ceil_count(config.test_ratio, n)
    } else {
        n
    };

    if train_end == 0 {
        return Err(Error::Data(format!(
            "train split is empty ({n} references, train_ratio={})",
            config.train_ratio
        )));
    }
    if test_start <= train_end {
        return Err(Error::Data(format!(
            "validation split is empty ({n} references, train_ratio={}, test_ratio={})",
            config.train_ratio, config.test_ratio
        )));
    }
    if config.test_ratio > 0.0 && test_start == n {
        return Err(Error::Data(format!(
            "test split is empty ({n} references, test_ratio={})",
            config.test_ratio
        )));
    }

    let train_refs: HashSet<&str> = references[..train_end].iter().map(String::as_str).collect();
    let test_refs: HashSet<&str> = references[test_start..].iter().map(String::as_str).collect();

    let mut splits = DatasetSplits {
        train: Vec::new(),
        val: Vec::new(),
        test: Vec::new(),
        test_index: references[test_start..].to_vec(),
    };
    for sample in &database.samples {
        let reference = sample.reference.as_str();
        if test_refs.contains(reference) {
            splits.test.push(sample.clone());
        } else if train_refs.contains(reference) {
            splits.train.push(sample.clone());
        } else {
            splits.val.push(sample.clone());
        }
    }

    Ok(splits)
}
