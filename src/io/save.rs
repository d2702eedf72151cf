//! Model saving functionality

use super::format::{ModelFormat, SaveConfig};
use super::model::Model;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Save a model to a file, creating parent directories as needed
///
/// # Example
///
/// ```no_run
/// use iqa_train::io::{save_model, Model, ModelFormat, ModelMetadata, SaveConfig};
/// use iqa_train::Tensor;
///
/// let params = vec![("fc.weight".to_string(), Tensor::from_vec(vec![1.0, 2.0], true))];
/// let model = Model::new(ModelMetadata::new("my-model", "state_dict"), params);
/// save_model(&model, "model.json", &SaveConfig::new(ModelFormat::Json)).unwrap();
/// ```
pub fn save_model(model: &Model, path: impl AsRef<Path>, config: &SaveConfig) -> Result<()> {
    let path = path.as_ref();
    let state = model.to_state();

    let data = match config.format {
        ModelFormat::Json => serde_json::to_string(&state)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::to_string(&state)
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ModelMetadata;
    use crate::Tensor;
    use tempfile::TempDir;

    fn model() -> Model {
        let params = vec![("w".to_string(), Tensor::from_vec(vec![1.0, 2.0], true))];
        Model::new(ModelMetadata::new("test-model", "state_dict"), params)
    }

    #[test]
    fn test_save_model_json_compact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        save_model(&model(), &path, &SaveConfig::new(ModelFormat::Json)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("test-model"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_save_model_yaml_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("m.yaml");
        save_model(&model(), &path, &SaveConfig::new(ModelFormat::Yaml)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("state_dict"));
    }
}
