//! Results report and test record files

use crate::eval::{IqaMeasures, SplitEvaluation};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Per-image test predictions and the resulting measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub sq: Vec<f32>,
    pub sq_std: Vec<f32>,
    pub q: Vec<f32>,
    pub test_loss: f32,
    pub measures: IqaMeasures,
    /// Reference contents of the test split
    pub test_index: Vec<String>,
}

impl TestRecord {
    pub fn from_evaluation(evaluation: &SplitEvaluation, test_index: &[String]) -> Self {
        Self {
            sq: evaluation.sq.clone(),
            sq_std: evaluation.sq_std.clone(),
            q: evaluation.q.clone(),
            test_loss: evaluation.loss,
            measures: evaluation.measures,
            test_index: test_index.to_vec(),
        }
    }

    /// Write as pretty JSON, replacing any previous record
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("test record: {e}")))?;
        create_parent(path)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| Error::Serialization(format!("test record: {e}")))
    }
}

/// Plain-text summary written whenever the best model changes
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsReport {
    pub exp_id: u64,
    pub epoch: usize,
    pub val_loss: f32,
    pub val: IqaMeasures,
    /// Test loss and measures, when testing during training
    pub test: Option<(f32, IqaMeasures)>,
}

impl ResultsReport {
    /// Header line announcing the best-model update
    pub fn headline(&self) -> String {
        format!(
            "EXP ID={}: Update best model using best_val_criterion in epoch {}",
            self.exp_id, self.epoch
        )
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n{}\n", self.headline(), self.val.summary("val", self.val_loss));
        if let Some((loss, measures)) = &self.test {
            out.push_str(&measures.summary("test", *loss));
            out.push('\n');
        }
        out
    }

    /// Overwrite the report file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        create_parent(path)?;
        fs::write(path, self.render())?;
        Ok(())
    }
}
