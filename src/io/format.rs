//! File formats for model state

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialization format of a model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    #[default]
    Json,
    Yaml,
}

impl ModelFormat {
    /// Detect the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" | "full" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Detect the format from a path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|s| s.to_str()).and_then(Self::from_extension)
    }
}

/// Options for saving a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveConfig {
    pub format: ModelFormat,
}

impl SaveConfig {
    pub fn new(format: ModelFormat) -> Self {
        Self { format }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(ModelFormat::from_extension("JSON"), Some(ModelFormat::Json));
        assert_eq!(ModelFormat::from_extension("yml"), Some(ModelFormat::Yaml));
        assert_eq!(ModelFormat::from_extension("full"), Some(ModelFormat::Json));
        assert_eq!(ModelFormat::from_extension("npy"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(ModelFormat::from_path(Path::new("m/a.yaml")), Some(ModelFormat::Yaml));
        assert_eq!(ModelFormat::from_path(Path::new("m/a")), None);
    }
}
