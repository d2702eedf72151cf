//! Resolved experiment configuration

use crate::model::{Aggregation, ModelKind, WaDIQaMConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
pub(crate) fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

fn default_train_ratio() -> f64 {
    0.6
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_batch_size() -> usize {
    4
}

fn default_n_epochs() -> usize {
    100
}

fn default_learning_rate() -> f32 {
    1e-4
}

fn default_hidden_dim() -> usize {
    32
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Experiment configuration after the database and model sections are merged
///
/// Unknown keys (including the per-database and per-model sections
/// themselves) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqaConfig {
    /// Database name, selects the database section
    pub database: String,

    /// Model name (`WaDIQaM-NR` or `WaDIQaM-FR`), selects the model section
    pub model: String,

    /// Path of the database index (JSON)
    pub data_index: PathBuf,

    #[serde(default = "default_train_ratio")]
    pub train_ratio: f64,

    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_n_epochs")]
    pub n_epochs: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,

    #[serde(default)]
    pub weight_decay: f32,

    /// Write scalar curves under `logs/`
    #[serde(default, alias = "enableTensorboard", deserialize_with = "deserialize_bool_lenient")]
    pub enable_tensorboard: bool,

    /// Evaluate the test split after every epoch
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub test_during_training: bool,

    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,

    #[serde(default)]
    pub aggregation: Aggregation,

    /// Base seed; the experiment id is added to it
    #[serde(default)]
    pub seed: u64,

    /// Root of the `models/`, `results/` and `logs/` directories
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl IqaConfig {
    /// Parsed model variant
    pub fn model_kind(&self) -> crate::Result<ModelKind> {
        self.model.parse()
    }

    /// Seed of experiment `exp_id`
    pub fn experiment_seed(&self, exp_id: u64) -> u64 {
        self.seed.wrapping_add(exp_id)
    }

    /// Architecture of the network for a database with `feature_dim` features
    pub fn network(&self, feature_dim: usize, exp_id: u64) -> crate::Result<WaDIQaMConfig> {
        Ok(WaDIQaMConfig {
            kind: self.model_kind()?,
            aggregation: self.aggregation,
            feature_dim,
            hidden_dim: self.hidden_dim,
            seed: self.experiment_seed(exp_id),
        })
    }

    /// Whether a test split exists
    pub fn has_test(&self) -> bool {
        self.test_ratio > 0.0
    }
}
