//! Model loading functionality

use super::format::ModelFormat;
use super::model::{Model, ModelState};
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Load a model from a file
///
/// The format is detected from the file extension (`.json`, `.full`, `.yaml`, `.yml`).
pub fn load_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();

    let format = ModelFormat::from_path(path).ok_or_else(|| {
        Error::Serialization(format!("Unsupported model file extension: {}", path.display()))
    })?;

    load_model_as(path, format)
}

/// Load a model from a file in an explicit format
pub fn load_model_as(path: impl AsRef<Path>, format: ModelFormat) -> Result<Model> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::Checkpoint(format!("Model file not found: {}", path.display())));
    }
    let content = fs::read_to_string(path)?;

    let state: ModelState = match format {
        ModelFormat::Json => serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}")))?,
    };

    Model::from_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{save_model, ModelMetadata, SaveConfig};
    use crate::Tensor;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_round_trip_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.yml");
        let params = vec![
            ("a".to_string(), Tensor::from_vec(vec![1.5, -2.0], true)),
            ("b".to_string(), Tensor::from_vec(vec![3.0], true)),
        ];
        let model = Model::new(ModelMetadata::new("rt", "state_dict"), params);
        save_model(&model, &path, &SaveConfig::new(ModelFormat::Yaml)).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.metadata.name, "rt");
        assert_eq!(loaded.get_parameter("a").unwrap().data().to_vec(), vec![1.5, -2.0]);
    }

    #[test]
    fn test_load_model_file_not_found() {
        let result = load_model("/nonexistent/model.json");
        assert!(matches!(result, Err(Error::Checkpoint(_))));
    }

    #[test]
    fn test_load_model_unsupported_extension() {
        let result = load_model("model.npy");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_load_model_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_model(&path), Err(Error::Serialization(_))));
    }
}
