//! YAML loading and section merging
//!
//! A config file has shared keys at the root plus one section per database
//! and per model:
//!
//! ```yaml
//! database: LIVE
//! model: WaDIQaM-NR
//! batch_size: 4
//! LIVE:
//!   data_index: data/live.json
//!   train_ratio: 0.6
//! WaDIQaM-NR:
//!   learning_rate: 0.0001
//! ```
//!
//! The database section is merged over the root, then the model section
//! (later keys win).

use super::schema::IqaConfig;
use crate::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Values from the command line that take precedence over the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Applied before the sections are chosen
    pub database: Option<String>,
    /// Applied before the sections are chosen
    pub model: Option<String>,
    pub n_epochs: Option<usize>,
    pub learning_rate: Option<f32>,
    pub output_dir: Option<PathBuf>,
}

/// Read, merge and deserialize a config file
pub fn load_config(path: impl AsRef<Path>, overrides: &ConfigOverrides) -> Result<IqaConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    let root: Value = serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse YAML config: {e}")))?;
    resolve_config(root, overrides)
}

/// Merge the selected sections of a parsed YAML document into an [`IqaConfig`]
pub fn resolve_config(root: Value, overrides: &ConfigOverrides) -> Result<IqaConfig> {
    let Value::Mapping(mut conf) = root else {
        return Err(Error::Config("config root must be a mapping".to_string()));
    };

    if let Some(database) = &overrides.database {
        conf.insert("database".into(), Value::String(database.clone()));
    }
    if let Some(model) = &overrides.model {
        conf.insert("model".into(), Value::String(model.clone()));
    }

    let database = selector(&conf, "database")?;
    let model = selector(&conf, "model")?;
    merge_section(&mut conf, &database)?;
    merge_section(&mut conf, &model)?;

    if let Some(n_epochs) = overrides.n_epochs {
        conf.insert("n_epochs".into(), Value::Number(n_epochs.into()));
    }
    if let Some(lr) = overrides.learning_rate {
        conf.insert("learning_rate".into(), Value::Number(f64::from(lr).into()));
    }
    if let Some(dir) = &overrides.output_dir {
        conf.insert("output_dir".into(), Value::String(dir.display().to_string()));
    }

    serde_yaml::from_value(Value::Mapping(conf))
        .map_err(|e| Error::Config(format!("Invalid config: {e}")))
}

fn selector(conf: &Mapping, key: &str) -> Result<String> {
    match conf.get(key) {
        Some(Value::String(name)) => Ok(name.clone()),
        Some(other) => Err(Error::Config(format!("'{key}' must be a string, got {other:?}"))),
        None => Err(Error::Config(format!("missing '{key}'"))),
    }
}

fn merge_section(conf: &mut Mapping, name: &str) -> Result<()> {
    let section = match conf.get(name) {
        Some(Value::Mapping(section)) => section.clone(),
        Some(Value::Null) | None => {
            log::debug!("no '{name}' section in config");
            return Ok(());
        }
        Some(_) => return Err(Error::Config(format!("section '{name}' must be a mapping"))),
    };
    for (key, value) in section {
        conf.insert(key, value);
    }
    Ok(())
}
