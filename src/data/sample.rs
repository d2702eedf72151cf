//! Database index: labeled distorted images and their patch features

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One distorted image with its subjective score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqaSample {
    /// Image identifier
    pub id: String,
    /// Identifier of the pristine reference content
    pub reference: String,
    /// Distortion type label
    pub distortion: usize,
    /// Subjective quality mean (MOS / DMOS)
    pub mos: f32,
    /// Subjective quality standard deviation
    pub mos_std: f32,
    /// Distorted patch features, one row per patch
    pub patches: Vec<Vec<f32>>,
    /// Reference patch features aligned with `patches` (full-reference only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_patches: Option<Vec<Vec<f32>>>,
}

impl IqaSample {
    /// Number of patches
    pub fn n_patches(&self) -> usize {
        self.patches.len()
    }
}

/// A labeled IQA database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Database name (e.g. "LIVE", "TID2013")
    pub name: String,
    /// Length of every patch feature vector
    pub feature_dim: usize,
    /// Labeled images
    pub samples: Vec<IqaSample>,
}

impl Database {
    /// Load a database index from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Data(format!("Failed to read database index {}: {e}", path.display()))
        })?;
        let database: Self = serde_json::from_str(&content).map_err(|e| {
            Error::Serialization(format!("Failed to parse database index {}: {e}", path.display()))
        })?;
        database.validate(false)?;
        Ok(database)
    }

    /// Write the database index as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string(self)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Check structural consistency.
    ///
    /// With `full_reference`, every sample must carry reference patches
    /// matching its distorted patches.
    pub fn validate(&self, full_reference: bool) -> Result<()> {
        if self.samples.is_empty() {
            return Err(Error::Data(format!("Database '{}' has no samples", self.name)));
        }
        if self.feature_dim == 0 {
            return Err(Error::Data("feature_dim must be > 0".to_string()));
        }

        let mut ids = HashSet::new();
        for sample in &self.samples {
            if !ids.insert(sample.id.as_str()) {
                return Err(Error::Data(format!("Duplicate sample id '{}'", sample.id)));
            }
            if sample.patches.is_empty() {
                return Err(Error::Data(format!("Sample '{}' has no patches", sample.id)));
            }
            if !sample.mos.is_finite() || !sample.mos_std.is_finite() {
                return Err(Error::Data(format!("Sample '{}' has a non-finite score", sample.id)));
            }
            if sample.mos_std < 0.0 {
                return Err(Error::Data(format!(
                    "Sample '{}' has negative mos_std {}",
                    sample.id, sample.mos_std
                )));
            }
            check_rows(&sample.id, &sample.patches, self.feature_dim)?;

            match (&sample.ref_patches, full_reference) {
                (Some(refs), _) => {
                    if refs.len() != sample.patches.len() {
                        return Err(Error::shape(
                            format!("reference patches of '{}'", sample.id),
                            vec![sample.patches.len()],
                            vec![refs.len()],
                        ));
                    }
                    check_rows(&sample.id, refs, self.feature_dim)?;
                }
                (None, true) => {
                    return Err(Error::Data(format!(
                        "Sample '{}' has no reference patches (required by full-reference models)",
                        sample.id
                    )));
                }
                (None, false) => {}
            }
        }
        Ok(())
    }

    /// Reference content ids in order of first appearance
    pub fn references(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.samples
            .iter()
            .filter(|s| seen.insert(s.reference.as_str()))
            .map(|s| s.reference.clone())
            .collect()
    }
}

fn check_rows(id: &str, rows: &[Vec<f32>], dim: usize) -> Result<()> {
    for row in rows {
        if row.len() != dim {
            return Err(Error::shape(format!("patch features of '{id}'"), vec![dim], vec![row.len()]));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample(id: &str, reference: &str) -> IqaSample {
        IqaSample {
            id: id.to_string(),
            reference: reference.to_string(),
            distortion: 0,
            mos: 50.0,
            mos_std: 5.0,
            patches: vec![vec![0.1, 0.2], vec![0.3, 0.4]],
            ref_patches: None,
        }
    }

    fn database(samples: Vec<IqaSample>) -> Database {
        Database { name: "toy".to_string(), feature_dim: 2, samples }
    }

    #[test]
    fn test_references_first_appearance_order() {
        let db = database(vec![sample("a", "r2"), sample("b", "r1"), sample("c", "r2")]);
        assert_eq!(db.references(), vec!["r2".to_string(), "r1".to_string()]);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let db = database(vec![]);
        assert!(matches!(db.validate(false), Err(Error::Data(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_feature_dim() {
        let mut s = sample("a", "r");
        s.patches[1] = vec![1.0];
        let err = database(vec![s]).validate(false).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_validate_rejects_negative_std() {
        let mut s = sample("a", "r");
        s.mos_std = -1.0;
        assert!(database(vec![s]).validate(false).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let db = database(vec![sample("a", "r1"), sample("a", "r2")]);
        assert!(db.validate(false).is_err());
    }

    #[test]
    fn test_full_reference_requires_ref_patches() {
        let db = database(vec![sample("a", "r")]);
        assert!(db.validate(false).is_ok());
        assert!(db.validate(true).is_err());

        let mut s = sample("a", "r");
        s.ref_patches = Some(vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
        assert!(database(vec![s]).validate(true).is_ok());
    }

    #[test]
    fn test_save_load_round_trip() {
        let db = database(vec![sample("a", "r1"), sample("b", "r2")]);
        let file = NamedTempFile::new().unwrap();
        db.save(file.path()).unwrap();

        let loaded = Database::load(file.path()).unwrap();
        assert_eq!(loaded, db);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Database::load("/nonexistent/db.json");
        assert!(matches!(result, Err(Error::Data(_))));
    }
}
