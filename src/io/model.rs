//! Serializable model state

use crate::{Error, Result, Tensor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model metadata containing architecture and training information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier (e.g. "WaDIQaM-NR")
    pub name: String,

    /// Architecture tag; `"state_dict"` for bare parameter snapshots
    pub architecture: String,

    /// Crate version that wrote the file
    pub version: String,

    /// Time the state was captured
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Custom metadata fields (the full model stores its `config` here)
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create new metadata with minimal fields
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            custom: HashMap::new(),
        }
    }

    /// Add custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// Information about a model parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g., "features.0.weight")
    pub name: String,

    /// Number of elements
    pub len: usize,

    /// Whether this parameter requires gradients
    #[serde(deserialize_with = "crate::config::deserialize_bool_lenient")]
    pub requires_grad: bool,
}

/// Serializable model state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Parameter information
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

/// Named parameters plus metadata
pub struct Model {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Model parameters
    pub parameters: Vec<(String, Tensor)>,
}

impl Model {
    /// Create a new model
    pub fn new(metadata: ModelMetadata, parameters: Vec<(String, Tensor)>) -> Self {
        Self { metadata, parameters }
    }

    /// Get parameter by name
    pub fn get_parameter(&self, name: &str) -> Option<&Tensor> {
        self.parameters.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Convert model to serializable state
    pub fn to_state(&self) -> ModelState {
        let mut data = Vec::new();
        let parameters = self
            .parameters
            .iter()
            .map(|(name, tensor)| {
                data.extend(tensor.data().iter().copied());
                ParameterInfo {
                    name: name.clone(),
                    len: tensor.len(),
                    requires_grad: tensor.requires_grad(),
                }
            })
            .collect();

        ModelState { metadata: self.metadata.clone(), parameters, data }
    }

    /// Create model from serializable state
    pub fn from_state(state: ModelState) -> Result<Self> {
        let expected: usize = state.parameters.iter().map(|p| p.len).sum();
        if expected != state.data.len() {
            return Err(Error::Checkpoint(format!(
                "parameter table covers {expected} values but the file holds {}",
                state.data.len()
            )));
        }

        let mut offset = 0;
        let parameters = state
            .parameters
            .into_iter()
            .map(|info| {
                let values = state.data[offset..offset + info.len].to_vec();
                offset += info.len;
                (info.name, Tensor::from_vec(values, info.requires_grad))
            })
            .collect();

        Ok(Self { metadata: state.metadata, parameters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Vec<(String, Tensor)> {
        vec![
            ("fc.weight".to_string(), Tensor::from_vec(vec![1.0, 2.0, 3.0], true)),
            ("fc.bias".to_string(), Tensor::from_vec(vec![0.1], false)),
        ]
    }

    #[test]
    fn test_model_metadata_with_custom() {
        let meta = ModelMetadata::new("WaDIQaM-NR", "wadiqam")
            .with_custom("hidden_dim", serde_json::json!(32));
        assert_eq!(meta.name, "WaDIQaM-NR");
        assert_eq!(meta.custom.get("hidden_dim"), Some(&serde_json::json!(32)));
    }

    #[test]
    fn test_model_state_round_trip() {
        let original = Model::new(ModelMetadata::new("test", "state_dict"), params());
        let restored = Model::from_state(original.to_state()).unwrap();

        assert_eq!(restored.parameters.len(), 2);
        let weight = restored.get_parameter("fc.weight").unwrap();
        assert_eq!(weight.data().to_vec(), vec![1.0, 2.0, 3.0]);
        assert!(!restored.get_parameter("fc.bias").unwrap().requires_grad());
        assert!(restored.get_parameter("missing").is_none());
    }

    #[test]
    fn test_from_state_rejects_truncated_data() {
        let mut state = Model::new(ModelMetadata::new("test", "state_dict"), params()).to_state();
        state.data.pop();
        assert!(matches!(Model::from_state(state), Err(Error::Checkpoint(_))));
    }

    #[test]
    fn test_requires_grad_accepts_quoted_bool() {
        let info: ParameterInfo =
            serde_yaml::from_str("name: w\nlen: 2\nrequires_grad: \"false\"\n").unwrap();
        assert!(!info.requires_grad);
    }
}
