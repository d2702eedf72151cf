//! Parameter snapshots and full model objects
//!
//! A snapshot holds only named parameters (architecture `"state_dict"`) and
//! must be loaded into an already constructed model. A full model also
//! carries the architecture config, so it can be rebuilt from the file alone.

use super::format::{ModelFormat, SaveConfig};
use super::load::load_model_as;
use super::model::{Model, ModelMetadata};
use super::save::save_model;
use crate::model::{IqaModel, WaDIQaM};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Architecture tag of bare parameter snapshots
pub const STATE_DICT_ARCHITECTURE: &str = "state_dict";

/// Extension appended to the snapshot path for the full model object
pub const FULL_MODEL_EXTENSION: &str = "full";

/// Path of the full model object belonging to a snapshot path
pub fn full_model_path(snapshot: &Path) -> PathBuf {
    let mut name = snapshot.as_os_str().to_os_string();
    name.push(".");
    name.push(FULL_MODEL_EXTENSION);
    PathBuf::from(name)
}

fn format_for(path: &Path) -> ModelFormat {
    ModelFormat::from_path(path).unwrap_or_default()
}

/// Save the model's parameters as a snapshot
pub fn save_state_dict<M: IqaModel + ?Sized>(model: &M, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let metadata = ModelMetadata::new(model.metadata().name, STATE_DICT_ARCHITECTURE);
    let snapshot = Model::new(metadata, model.state_dict());
    save_model(&snapshot, path, &SaveConfig::new(format_for(path)))
}

/// Load a snapshot into an existing model
pub fn load_state_dict<M: IqaModel + ?Sized>(model: &mut M, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let snapshot = load_model_as(path, format_for(path))?;
    model.load_state_dict(&snapshot.parameters)
}

/// Save the model together with the metadata needed to rebuild it
pub fn save_full_model<M: IqaModel + ?Sized>(model: &M, path: impl AsRef<Path>) -> Result<()> {
    let full = Model::new(model.metadata(), model.state_dict());
    save_model(&full, path, &SaveConfig::new(ModelFormat::Json))
}

/// Rebuild a model from a full model file
pub fn load_full_model(path: impl AsRef<Path>) -> Result<WaDIQaM> {
    let path = path.as_ref();
    let full = load_model_as(path, format_for(path))?;
    if full.metadata.architecture == STATE_DICT_ARCHITECTURE {
        return Err(Error::Checkpoint(format!(
            "{} is a parameter snapshot; load it into a constructed model instead",
            path.display()
        )));
    }

    let mut model = WaDIQaM::from_metadata(&full.metadata)?;
    model.load_state_dict(&full.parameters)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aggregation, ModelKind, WaDIQaMConfig};
    use tempfile::TempDir;

    fn config(seed: u64) -> WaDIQaMConfig {
        WaDIQaMConfig {
            kind: ModelKind::FullReference,
            aggregation: Aggregation::Weighted,
            feature_dim: 3,
            hidden_dim: 4,
            seed,
        }
    }

    fn params_of(model: &WaDIQaM) -> Vec<Vec<f32>> {
        model.state_dict().iter().map(|(_, t)| t.data().to_vec()).collect()
    }

    #[test]
    fn test_full_model_path_appends_extension() {
        let path = full_model_path(Path::new("models/WaDIQaM-NR-LIVE-EXP0"));
        assert_eq!(path, PathBuf::from("models/WaDIQaM-NR-LIVE-EXP0.full"));
    }

    #[test]
    fn test_state_dict_round_trip_without_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("WaDIQaM-FR-LIVE-EXP0");

        let source = WaDIQaM::new(config(1)).unwrap();
        save_state_dict(&source, &path).unwrap();

        let mut target = WaDIQaM::new(config(2)).unwrap();
        assert_ne!(params_of(&source), params_of(&target));
        load_state_dict(&mut target, &path).unwrap();
        assert_eq!(params_of(&source), params_of(&target));
    }

    #[test]
    fn test_state_dict_into_wrong_architecture_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.json");
        save_state_dict(&WaDIQaM::new(config(1)).unwrap(), &path).unwrap();

        let mut nr = WaDIQaM::new(WaDIQaMConfig { kind: ModelKind::NoReference, ..config(1) }).unwrap();
        assert!(load_state_dict(&mut nr, &path).is_err());
    }

    #[test]
    fn test_full_model_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = full_model_path(&dir.path().join("m"));

        let source = WaDIQaM::new(config(7)).unwrap();
        save_full_model(&source, &path).unwrap();

        let restored = load_full_model(&path).unwrap();
        assert_eq!(restored.config(), source.config());
        assert_eq!(params_of(&restored), params_of(&source));
    }

    #[test]
    fn test_snapshot_is_not_a_full_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.json");
        save_state_dict(&WaDIQaM::new(config(1)).unwrap(), &path).unwrap();
        assert!(matches!(load_full_model(&path), Err(Error::Checkpoint(_))));
    }
}
