//! WaDIQaM: weighted average deep image quality measure
//!
//! Patch features go through a shared extractor. The full-reference variant
//! fuses reference and distorted features as `[f_ref, f_dist, f_ref - f_dist]`.
//! A regression head scores every patch and, with weighted aggregation, a
//! weight head decides how much each patch contributes to the image score.

use super::layers::Mlp;
use super::{IqaModel, ModelOutput};
use crate::autograd::{add_scalar, concat_cols, mean_pool, relu, sub, weighted_average_pool};
use crate::data::IqaBatch;
use crate::io::ModelMetadata;
use crate::train::{L1Loss, LossFn};
use crate::{Error, Result, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound added to patch weights so every image has positive total weight
pub const WEIGHT_EPS: f32 = 1e-6;

/// Network variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// No-reference: only distorted patches
    #[serde(rename = "WaDIQaM-NR")]
    NoReference,
    /// Full-reference: distorted and reference patches
    #[serde(rename = "WaDIQaM-FR")]
    FullReference,
}

impl ModelKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::NoReference => "WaDIQaM-NR",
            Self::FullReference => "WaDIQaM-FR",
        }
    }

    pub fn is_full_reference(self) -> bool {
        self == Self::FullReference
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WaDIQaM-NR" | "NR" | "nr" => Ok(Self::NoReference),
            "WaDIQaM-FR" | "FR" | "fr" => Ok(Self::FullReference),
            other => Err(Error::Config(format!(
                "Unknown model '{other}' (expected WaDIQaM-NR or WaDIQaM-FR)"
            ))),
        }
    }
}

/// How patch scores become an image score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Learned per-patch weights
    #[default]
    Weighted,
    /// Plain mean; the training loss is taken per patch
    Patchwise,
}

/// Architecture hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaDIQaMConfig {
    pub kind: ModelKind,
    #[serde(default)]
    pub aggregation: Aggregation,
    pub feature_dim: usize,
    pub hidden_dim: usize,
    /// Parameter init seed
    #[serde(default)]
    pub seed: u64,
}

/// The WaDIQaM network
#[derive(Debug, Clone)]
pub struct WaDIQaM {
    config: WaDIQaMConfig,
    features: Mlp,
    fc_q: Mlp,
    fc_w: Option<Mlp>,
    training: bool,
}

impl WaDIQaM {
    /// Build a freshly initialized network
    pub fn new(config: WaDIQaMConfig) -> Result<Self> {
        if config.feature_dim == 0 || config.hidden_dim == 0 {
            return Err(Error::Config(format!(
                "feature_dim and hidden_dim must be > 0 (got {} and {})",
                config.feature_dim, config.hidden_dim
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let hidden = config.hidden_dim;
        let fused = if config.kind.is_full_reference() { 3 * hidden } else { hidden };

        let features = Mlp::new(config.feature_dim, hidden, hidden, &mut rng);
        let fc_q = Mlp::new(fused, hidden, 1, &mut rng);
        let fc_w = match config.aggregation {
            Aggregation::Weighted => Some(Mlp::new(fused, hidden, 1, &mut rng)),
            Aggregation::Patchwise => None,
        };

        Ok(Self { config, features, fc_q, fc_w, training: true })
    }

    /// Architecture hyperparameters
    pub fn config(&self) -> &WaDIQaMConfig {
        &self.config
    }

    /// Rebuild a network from the metadata written by [`IqaModel::metadata`]
    pub fn from_metadata(metadata: &ModelMetadata) -> Result<Self> {
        let value = metadata.custom.get("config").ok_or_else(|| {
            Error::Checkpoint(format!(
                "model '{}' carries no architecture config (is it a bare parameter snapshot?)",
                metadata.name
            ))
        })?;
        let config: WaDIQaMConfig = serde_json::from_value(value.clone())
            .map_err(|e| Error::Checkpoint(format!("invalid architecture config: {e}")))?;
        Self::new(config)
    }

    fn extract(&self, patches: &[f32], rows: usize) -> Tensor {
        let x = Tensor::from_vec(patches.to_vec(), false);
        relu(&self.features.forward(&x, rows))
    }

    fn named_mlps(&self) -> Vec<(&'static str, &Mlp)> {
        let mut mlps = vec![("features", &self.features), ("fc_q", &self.fc_q)];
        if let Some(fc_w) = &self.fc_w {
            mlps.push(("fc_w", fc_w));
        }
        mlps
    }

    fn named_mlps_mut(&mut self) -> Vec<(&'static str, &mut Mlp)> {
        let mut mlps = vec![("features", &mut self.features), ("fc_q", &mut self.fc_q)];
        if let Some(fc_w) = self.fc_w.as_mut() {
            mlps.push(("fc_w", fc_w));
        }
        mlps
    }

    fn check_batch(&self, batch: &IqaBatch) -> Result<usize> {
        if batch.feature_dim != self.config.feature_dim {
            return Err(Error::shape(
                "patch feature dimension",
                vec![self.config.feature_dim],
                vec![batch.feature_dim],
            ));
        }
        let rows = batch.n_patches();
        if rows == 0 || batch.patches.len() != rows * batch.feature_dim {
            return Err(Error::shape(
                "distorted patches",
                vec![rows, batch.feature_dim],
                vec![batch.patches.len()],
            ));
        }
        if let Some(pos) = batch.patches_per_image.iter().position(|&n| n == 0) {
            return Err(Error::Data(format!("image {pos} of the batch has no patches")));
        }
        if batch.mos.len() != batch.patches_per_image.len() {
            return Err(Error::shape(
                "subjective scores",
                vec![batch.patches_per_image.len()],
                vec![batch.mos.len()],
            ));
        }
        Ok(rows)
    }
}

impl IqaModel for WaDIQaM {
    fn forward(&self, batch: &IqaBatch) -> Result<ModelOutput> {
        let rows = self.check_batch(batch)?;
        let h_dist = self.extract(&batch.patches, rows);

        let fused = if self.config.kind.is_full_reference() {
            let refs = batch.ref_patches.as_ref().ok_or_else(|| {
                Error::Data("full-reference model needs reference patches".to_string())
            })?;
            if refs.len() != batch.patches.len() {
                return Err(Error::shape(
                    "reference patches",
                    vec![batch.patches.len()],
                    vec![refs.len()],
                ));
            }
            let h_ref = self.extract(refs, rows);
            concat_cols(&[&h_ref, &h_dist, &sub(&h_ref, &h_dist)], rows)
        } else {
            h_dist
        };

        let patch_scores = self.fc_q.forward(&fused, rows);
        let targets = Tensor::from_vec(batch.mos.clone(), false);
        let groups = &batch.patches_per_image;

        match &self.fc_w {
            Some(fc_w) => {
                let weights = add_scalar(&relu(&fc_w.forward(&fused, rows)), WEIGHT_EPS);
                let quality = weighted_average_pool(&patch_scores, &weights, groups);
                let loss = L1Loss.forward(&quality, &targets);
                Ok(ModelOutput {
                    loss,
                    quality: quality.data().to_vec(),
                    patch_scores,
                    patch_weights: Some(weights),
                })
            }
            None => {
                let quality = mean_pool(&patch_scores, groups);
                let loss = if self.training {
                    let patch_targets: Vec<f32> = batch
                        .mos
                        .iter()
                        .zip(groups)
                        .flat_map(|(&mos, &n)| std::iter::repeat(mos).take(n))
                        .collect();
                    L1Loss.forward(&patch_scores, &Tensor::from_vec(patch_targets, false))
                } else {
                    L1Loss.forward(&quality, &targets)
                };
                Ok(ModelOutput {
                    loss,
                    quality: quality.data().to_vec(),
                    patch_scores,
                    patch_weights: None,
                })
            }
        }
    }

    fn train(&mut self) {
        self.training = true;
    }

    fn eval(&mut self) {
        self.training = false;
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = Vec::new();
        for (_, mlp) in self.named_mlps_mut() {
            for (_, layer) in mlp.layers_mut() {
                params.push(&mut layer.weight);
                params.push(&mut layer.bias);
            }
        }
        params
    }

    fn state_dict(&self) -> Vec<(String, Tensor)> {
        let mut state = Vec::new();
        for (prefix, mlp) in self.named_mlps() {
            for (i, layer) in mlp.layers() {
                let mut weight = layer.weight.detach();
                weight.set_requires_grad(layer.weight.requires_grad());
                let mut bias = layer.bias.detach();
                bias.set_requires_grad(layer.bias.requires_grad());
                state.push((format!("{prefix}.{i}.weight"), weight));
                state.push((format!("{prefix}.{i}.bias"), bias));
            }
        }
        state
    }

    fn load_state_dict(&mut self, params: &[(String, Tensor)]) -> Result<()> {
        let find = |name: &str| -> Result<&Tensor> {
            params
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, t)| t)
                .ok_or_else(|| Error::Checkpoint(format!("missing parameter '{name}'")))
        };

        let mut expected = 0;
        for (prefix, mlp) in self.named_mlps_mut() {
            for (i, layer) in mlp.layers_mut() {
                for (suffix, target) in [("weight", &mut layer.weight), ("bias", &mut layer.bias)] {
                    let name = format!("{prefix}.{i}.{suffix}");
                    let source = find(&name)?;
                    if source.len() != target.len() {
                        return Err(Error::shape(
                            format!("parameter '{name}'"),
                            vec![target.len()],
                            vec![source.len()],
                        ));
                    }
                    *target.data_mut() = source.data().clone();
                    target.zero_grad();
                    expected += 1;
                }
            }
        }

        if params.len() != expected {
            return Err(Error::Checkpoint(format!(
                "unexpected parameters: expected {expected}, found {}",
                params.len()
            )));
        }
        Ok(())
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata::new(self.config.kind.name(), "wadiqam").with_custom(
            "config",
            serde_json::to_value(self.config).unwrap_or(serde_json::Value::Null),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use crate::data::{synthetic_database, IqaSample};
    use approx::assert_abs_diff_eq;

    fn config(kind: ModelKind, aggregation: Aggregation) -> WaDIQaMConfig {
        WaDIQaMConfig { kind, aggregation, feature_dim: 6, hidden_dim: 8, seed: 7 }
    }

    fn batch(n_images: usize) -> IqaBatch {
        let db = synthetic_database(n_images, 1, 3, 6, 5);
        let samples: Vec<&IqaSample> = db.samples.iter().collect();
        IqaBatch::collate(&samples, 6).unwrap()
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("WaDIQaM-NR".parse::<ModelKind>().unwrap(), ModelKind::NoReference);
        assert_eq!("WaDIQaM-FR".parse::<ModelKind>().unwrap(), ModelKind::FullReference);
        assert!("DIQaM".parse::<ModelKind>().is_err());
        assert_eq!(ModelKind::FullReference.to_string(), "WaDIQaM-FR");
    }

    #[test]
    fn test_forward_outputs_one_quality_per_image() {
        for kind in [ModelKind::NoReference, ModelKind::FullReference] {
            let model = WaDIQaM::new(config(kind, Aggregation::Weighted)).unwrap();
            let out = model.forward(&batch(4)).unwrap();
            assert_eq!(out.quality.len(), 4);
            assert_eq!(out.patch_scores.len(), 12);
            assert!(out.patch_weights.as_ref().unwrap().data().iter().all(|&w| w > 0.0));
            assert!(out.loss_value().is_finite());
        }
    }

    #[test]
    fn test_weighted_loss_is_l1_of_image_quality() {
        let model = WaDIQaM::new(config(ModelKind::NoReference, Aggregation::Weighted)).unwrap();
        let b = batch(3);
        let out = model.forward(&b).unwrap();
        let expected: f32 =
            out.quality.iter().zip(&b.mos).map(|(q, m)| (q - m).abs()).sum::<f32>() / 3.0;
        assert_abs_diff_eq!(out.loss_value(), expected, epsilon = 1e-3);
    }

    #[test]
    fn test_patchwise_loss_depends_on_mode() {
        let mut model =
            WaDIQaM::new(config(ModelKind::NoReference, Aggregation::Patchwise)).unwrap();
        let b = batch(2);

        model.eval();
        let eval_out = model.forward(&b).unwrap();
        let expected: f32 =
            eval_out.quality.iter().zip(&b.mos).map(|(q, m)| (q - m).abs()).sum::<f32>() / 2.0;
        assert_abs_diff_eq!(eval_out.loss_value(), expected, epsilon = 1e-3);
        assert!(eval_out.patch_weights.is_none());

        model.train();
        let train_out = model.forward(&b).unwrap();
        assert_eq!(train_out.quality, eval_out.quality);
    }

    #[test]
    fn test_full_reference_requires_reference_patches() {
        let model = WaDIQaM::new(config(ModelKind::FullReference, Aggregation::Weighted)).unwrap();
        let mut b = batch(2);
        b.ref_patches = None;
        assert!(matches!(model.forward(&b), Err(Error::Data(_))));
    }

    #[test]
    fn test_image_without_patches_is_error() {
        let model = WaDIQaM::new(config(ModelKind::NoReference, Aggregation::Weighted)).unwrap();
        let mut b = batch(3);
        b.patches_per_image = vec![3, 0, 6];
        assert!(matches!(model.forward(&b), Err(Error::Data(_))));
    }

    #[test]
    fn test_feature_dim_mismatch() {
        let model = WaDIQaM::new(WaDIQaMConfig {
            feature_dim: 5,
            ..config(ModelKind::NoReference, Aggregation::Weighted)
        })
        .unwrap();
        assert!(matches!(model.forward(&batch(1)), Err(Error::Shape { .. })));
    }

    #[test]
    fn test_backward_populates_every_parameter() {
        let mut model =
            WaDIQaM::new(config(ModelKind::FullReference, Aggregation::Weighted)).unwrap();
        let mut out = model.forward(&batch(3)).unwrap();
        backward(&mut out.loss, None);

        let params = model.parameters_mut();
        assert_eq!(params.len(), 12);
        assert!(params.iter().all(|p| p.grad().is_some()));
    }

    #[test]
    fn test_state_dict_round_trip() {
        let source = WaDIQaM::new(config(ModelKind::NoReference, Aggregation::Weighted)).unwrap();
        let mut target = WaDIQaM::new(WaDIQaMConfig {
            seed: 99,
            ..config(ModelKind::NoReference, Aggregation::Weighted)
        })
        .unwrap();

        let b = batch(2);
        assert_ne!(source.forward(&b).unwrap().quality, target.forward(&b).unwrap().quality);

        target.load_state_dict(&source.state_dict()).unwrap();
        assert_eq!(source.forward(&b).unwrap().quality, target.forward(&b).unwrap().quality);
    }

    #[test]
    fn test_load_state_dict_rejects_wrong_architecture() {
        let nr = WaDIQaM::new(config(ModelKind::NoReference, Aggregation::Weighted)).unwrap();
        let mut fr =
            WaDIQaM::new(config(ModelKind::FullReference, Aggregation::Weighted)).unwrap();
        assert!(fr.load_state_dict(&nr.state_dict()).is_err());

        let mut patchwise =
            WaDIQaM::new(config(ModelKind::NoReference, Aggregation::Patchwise)).unwrap();
        assert!(matches!(
            patchwise.load_state_dict(&nr.state_dict()),
            Err(Error::Checkpoint(_))
        ));
    }

    #[test]
    fn test_metadata_rebuilds_same_architecture() {
        let model = WaDIQaM::new(config(ModelKind::FullReference, Aggregation::Patchwise)).unwrap();
        let rebuilt = WaDIQaM::from_metadata(&model.metadata()).unwrap();
        assert_eq!(rebuilt.config(), model.config());
        assert_eq!(rebuilt.num_parameters(), model.num_parameters());
    }

    #[test]
    fn test_freeze_parameters() {
        let mut model =
            WaDIQaM::new(config(ModelKind::NoReference, Aggregation::Weighted)).unwrap();
        model.set_requires_grad(false);
        assert!(model.state_dict().iter().all(|(_, t)| !t.requires_grad()));
        let out = model.forward(&batch(1)).unwrap();
        assert!(out.loss.backward_op().is_none());
    }
}
