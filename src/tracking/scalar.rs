//! JSON-lines scalar logger

use super::{Result, TrackingError};
use crate::eval::{IqaMeasures, QualityMetric};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the scalar log inside a run directory
pub const SCALARS_FILE: &str = "scalars.jsonl";

/// One logged data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarEntry {
    pub tag: String,
    #[serde(deserialize_with = "crate::eval::nan_from_null")]
    pub value: f64,
    pub step: u64,
}

/// Appends scalar summaries to `<dir>/scalars.jsonl`
#[derive(Debug)]
pub struct ScalarLogger {
    dir: PathBuf,
    writer: BufWriter<File>,
}

impl ScalarLogger {
    /// Create the run directory and start a fresh scalar file
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(dir.join(SCALARS_FILE))?;
        Ok(Self { dir, writer: BufWriter::new(file) })
    }

    /// Run directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the scalar file
    pub fn path(&self) -> PathBuf {
        self.dir.join(SCALARS_FILE)
    }

    /// Record one value
    pub fn scalar_summary(&mut self, tag: &str, value: f64, step: u64) -> Result<()> {
        let entry = ScalarEntry { tag: tag.to_string(), value, step };
        serde_json::to_writer(&mut self.writer, &entry)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Record the loss and every quality measure of one evaluation
    pub fn log_evaluation(&mut self, loss: f32, measures: &IqaMeasures, step: u64) -> Result<()> {
        self.scalar_summary("loss", f64::from(loss), step)?;
        for metric in QualityMetric::ALL {
            self.scalar_summary(metric.name(), measures.get(metric), step)?;
        }
        Ok(())
    }
}

/// Read every entry of a scalar file
pub fn read_scalars(path: impl AsRef<Path>) -> Result<Vec<ScalarEntry>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line).map_err(TrackingError::from)?);
    }
    Ok(entries)
}

/// Loggers of the three training phases
#[derive(Debug)]
pub struct PhaseLoggers {
    pub train: ScalarLogger,
    pub val: ScalarLogger,
    /// Present only when the test split is evaluated during training
    pub test: Option<ScalarLogger>,
}

impl PhaseLoggers {
    pub fn create(train: &Path, val: &Path, test: Option<&Path>) -> Result<Self> {
        Ok(Self {
            train: ScalarLogger::create(train)?,
            val: ScalarLogger::create(val)?,
            test: test.map(ScalarLogger::create).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scalar_summary_appends_lines() {
        let dir = TempDir::new().unwrap();
        let mut logger = ScalarLogger::create(dir.path().join("run")).unwrap();
        logger.scalar_summary("loss", 1.5, 0).unwrap();
        logger.scalar_summary("loss", 1.25, 1).unwrap();

        let entries = read_scalars(logger.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], ScalarEntry { tag: "loss".to_string(), value: 1.25, step: 1 });
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = TempDir::new().unwrap();
        let run = dir.path().join("run");
        ScalarLogger::create(&run).unwrap().scalar_summary("loss", 3.0, 0).unwrap();

        let logger = ScalarLogger::create(&run).unwrap();
        assert!(read_scalars(logger.path()).unwrap().is_empty());
    }

    #[test]
    fn test_log_evaluation_writes_all_tags() {
        let dir = TempDir::new().unwrap();
        let mut logger = ScalarLogger::create(dir.path()).unwrap();
        let measures =
            IqaMeasures { srocc: f64::NAN, krocc: 0.5, plcc: 0.6, rmse: 2.0, outlier_ratio: 0.1 };
        logger.log_evaluation(4.0, &measures, 3).unwrap();

        let entries = read_scalars(logger.path()).unwrap();
        let tags: Vec<&str> = entries.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["loss", "SROCC", "KROCC", "PLCC", "RMSE", "OR"]);
        assert!(entries[1].value.is_nan());
        assert!(entries.iter().all(|e| e.step == 3));
    }

    #[test]
    fn test_phase_loggers_without_test() {
        let dir = TempDir::new().unwrap();
        let loggers =
            PhaseLoggers::create(&dir.path().join("train"), &dir.path().join("val"), None).unwrap();
        assert!(loggers.test.is_none());
        assert!(loggers.val.path().exists());
    }

    #[test]
    fn test_read_scalars_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SCALARS_FILE);
        fs::write(&path, "not json\n").unwrap();
        assert!(matches!(read_scalars(&path), Err(TrackingError::Json(_))));
    }
}
