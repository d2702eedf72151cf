//! Batching of IQA samples

use super::IqaSample;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A batch of images, patches stacked row-major
#[derive(Debug, Clone)]
pub struct IqaBatch {
    /// Image ids, one per image
    pub ids: Vec<String>,
    /// Distorted patch features, `Σ patches_per_image × feature_dim`
    pub patches: Vec<f32>,
    /// Reference patch features with the same layout, when every image has them
    pub ref_patches: Option<Vec<f32>>,
    /// Patch count of every image
    pub patches_per_image: Vec<usize>,
    /// Feature vector length
    pub feature_dim: usize,
    /// Distortion labels
    pub labels: Vec<usize>,
    /// Subjective quality mean
    pub mos: Vec<f32>,
    /// Subjective quality standard deviation
    pub mos_std: Vec<f32>,
}

impl IqaBatch {
    /// Stack samples into a batch
    pub fn collate(samples: &[&IqaSample], feature_dim: usize) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::Data("cannot collate an empty batch".to_string()));
        }

        let total: usize = samples.iter().map(|s| s.n_patches()).sum();
        let mut patches = Vec::with_capacity(total * feature_dim);
        let with_refs = samples.iter().all(|s| s.ref_patches.is_some());
        let mut ref_patches = with_refs.then(|| Vec::with_capacity(total * feature_dim));

        for sample in samples {
            if sample.patches.is_empty() {
                return Err(Error::Data(format!("Sample '{}' has no patches", sample.id)));
            }
            for row in &sample.patches {
                if row.len() != feature_dim {
                    return Err(Error::shape(
                        format!("patch features of '{}'", sample.id),
                        vec![feature_dim],
                        vec![row.len()],
                    ));
                }
                patches.extend_from_slice(row);
            }
            if let (Some(out), Some(rows)) = (ref_patches.as_mut(), sample.ref_patches.as_ref()) {
                for row in rows {
                    out.extend_from_slice(row);
                }
            }
        }

        Ok(Self {
            ids: samples.iter().map(|s| s.id.clone()).collect(),
            patches,
            ref_patches,
            patches_per_image: samples.iter().map(|s| s.n_patches()).collect(),
            feature_dim,
            labels: samples.iter().map(|s| s.distortion).collect(),
            mos: samples.iter().map(|s| s.mos).collect(),
            mos_std: samples.iter().map(|s| s.mos_std).collect(),
        })
    }

    /// Number of images
    pub fn size(&self) -> usize {
        self.mos.len()
    }

    /// Total number of patches
    pub fn n_patches(&self) -> usize {
        self.patches_per_image.iter().sum()
    }
}

/// Iterates a split in batches.
///
/// A shuffling loader draws a fresh permutation at the start of every pass.
#[derive(Debug, Clone)]
pub struct DataLoader {
    samples: Vec<IqaSample>,
    feature_dim: usize,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl DataLoader {
    /// Create a loader
    pub fn new(samples: Vec<IqaSample>, feature_dim: usize, batch_size: usize) -> Self {
        Self {
            samples,
            feature_dim,
            batch_size: batch_size.max(1),
            shuffle: false,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Shuffle every pass with the given seed
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the loader has no images
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of batches per pass
    pub fn num_batches(&self) -> usize {
        self.samples.len().div_ceil(self.batch_size)
    }

    /// Samples in file order
    pub fn samples(&self) -> &[IqaSample] {
        &self.samples
    }

    /// Start a pass over the split
    pub fn iter(&mut self) -> BatchIter<'_> {
        let mut order: Vec<usize> = (0..self.samples.len()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        BatchIter { loader: self, order, position: 0 }
    }
}

/// One pass of a [`DataLoader`]
pub struct BatchIter<'a> {
    loader: &'a DataLoader,
    order: Vec<usize>,
    position: usize,
}

impl Iterator for BatchIter<'_> {
    type Item = Result<IqaBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.loader.batch_size).min(self.order.len());
        let samples: Vec<&IqaSample> =
            self.order[self.position..end].iter().map(|&i| &self.loader.samples[i]).collect();
        self.position = end;
        Some(IqaBatch::collate(&samples, self.loader.feature_dim))
    }
}
