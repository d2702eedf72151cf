//! Output locations of one experiment

use crate::io::full_model_path;
use std::path::{Path, PathBuf};

/// Training phase, used to name scalar log directories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Val,
    Test,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }
}

/// Files written by one experiment, rooted at `output_dir`
///
/// ```text
/// models/{model}-{database}-EXP{id}          parameter snapshot
/// models/{model}-{database}-EXP{id}.full     full model
/// results/{model}-{database}-EXP{id}.txt     results report
/// results/{model}-{database}-EXP{id}.json    test record
/// logs/EXP{id}-{database}-{model}-{phase}/   scalar curves
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    root: PathBuf,
    database: String,
    model: String,
    exp_id: u64,
}

impl RunPaths {
    pub fn new(
        root: impl Into<PathBuf>,
        database: impl Into<String>,
        model: impl Into<String>,
        exp_id: u64,
    ) -> Self {
        Self { root: root.into(), database: database.into(), model: model.into(), exp_id }
    }

    fn stem(&self) -> String {
        format!("{}-{}-EXP{}", self.model, self.database, self.exp_id)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Parameter snapshot of the best model
    pub fn snapshot(&self) -> PathBuf {
        self.models_dir().join(self.stem())
    }

    /// Full model object of the best model
    pub fn full_model(&self) -> PathBuf {
        full_model_path(&self.snapshot())
    }

    /// Plain-text results report
    pub fn report(&self) -> PathBuf {
        self.results_dir().join(format!("{}.txt", self.stem()))
    }

    /// Test predictions and measures
    pub fn test_record(&self) -> PathBuf {
        self.results_dir().join(format!("{}.json", self.stem()))
    }

    /// Scalar log directory of a phase
    pub fn log_dir(&self, phase: Phase) -> PathBuf {
        self.logs_dir().join(format!(
            "EXP{}-{}-{}-{}",
            self.exp_id,
            self.database,
            self.model,
            phase.as_str()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let paths = RunPaths::new("/out", "LIVE", "WaDIQaM-FR", 2);
        assert_eq!(paths.snapshot(), PathBuf::from("/out/models/WaDIQaM-FR-LIVE-EXP2"));
        assert_eq!(paths.full_model(), PathBuf::from("/out/models/WaDIQaM-FR-LIVE-EXP2.full"));
        assert_eq!(paths.report(), PathBuf::from("/out/results/WaDIQaM-FR-LIVE-EXP2.txt"));
        assert_eq!(paths.test_record(), PathBuf::from("/out/results/WaDIQaM-FR-LIVE-EXP2.json"));
        assert_eq!(
            paths.log_dir(Phase::Val),
            PathBuf::from("/out/logs/EXP2-LIVE-WaDIQaM-FR-val")
        );
    }
}
