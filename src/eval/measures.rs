//! IQA accuracy measures

use super::stats::{kendall_tau_b, pearson, spearman};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The five standard IQA performance measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityMetric {
    /// Spearman rank-order correlation (prediction monotonicity)
    Srocc,
    /// Kendall rank-order correlation
    Krocc,
    /// Pearson linear correlation (prediction accuracy)
    Plcc,
    /// Root mean squared error
    Rmse,
    /// Fraction of predictions outside twice the subjective std-dev
    OutlierRatio,
}

impl QualityMetric {
    /// All measures in reporting order
    pub const ALL: [Self; 5] = [Self::Srocc, Self::Krocc, Self::Plcc, Self::Rmse, Self::OutlierRatio];

    /// Short name used in reports and scalar tags
    pub fn name(self) -> &'static str {
        match self {
            Self::Srocc => "SROCC",
            Self::Krocc => "KROCC",
            Self::Plcc => "PLCC",
            Self::Rmse => "RMSE",
            Self::OutlierRatio => "OR",
        }
    }

    /// Whether higher values are better
    pub fn higher_is_better(self) -> bool {
        matches!(self, Self::Srocc | Self::Krocc | Self::Plcc)
    }
}

impl fmt::Display for QualityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSON has no NaN; serde_json writes it as `null`, read it back as NaN.
pub(crate) fn nan_from_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Measures of one split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqaMeasures {
    #[serde(deserialize_with = "nan_from_null")]
    pub srocc: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub krocc: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub plcc: f64,
    pub rmse: f64,
    pub outlier_ratio: f64,
}

impl IqaMeasures {
    /// Value of one measure
    pub fn get(&self, metric: QualityMetric) -> f64 {
        match metric {
            QualityMetric::Srocc => self.srocc,
            QualityMetric::Krocc => self.krocc,
            QualityMetric::Plcc => self.plcc,
            QualityMetric::Rmse => self.rmse,
            QualityMetric::OutlierRatio => self.outlier_ratio,
        }
    }

    /// One-line report, e.g. `Val results: val loss=…, SROCC=…, …, OR=…%`
    pub fn summary(&self, label: &str, loss: f32) -> String {
        format!(
            "{} results: {} loss={:.4}, SROCC={:.4}, KROCC={:.4}, PLCC={:.4}, RMSE={:.4}, OR={:.2}%",
            capitalize(label),
            label,
            loss,
            self.srocc,
            self.krocc,
            self.plcc,
            self.rmse,
            self.outlier_ratio * 100.0
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Compare predicted quality `q` against subjective scores `sq`.
///
/// `sq_std` is the per-image subjective std-dev used for the outlier ratio.
/// All three slices must have the same, non-zero length.
pub fn measure(sq: &[f32], q: &[f32], sq_std: &[f32]) -> Result<IqaMeasures> {
    if sq.is_empty() {
        return Err(Error::Evaluation("cannot measure an empty split".to_string()));
    }
    if q.len() != sq.len() || sq_std.len() != sq.len() {
        return Err(Error::Evaluation(format!(
            "length mismatch: {} subjective scores, {} predictions, {} std-devs",
            sq.len(),
            q.len(),
            sq_std.len()
        )));
    }

    let sq: Vec<f64> = sq.iter().map(|&v| f64::from(v)).collect();
    let q: Vec<f64> = q.iter().map(|&v| f64::from(v)).collect();
    let n = sq.len() as f64;

    let mse = sq.iter().zip(&q).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / n;
    let outliers = sq
        .iter()
        .zip(&q)
        .zip(sq_std)
        .filter(|((a, b), &std)| (*a - *b).abs() > 2.0 * f64::from(std))
        .count();

    Ok(IqaMeasures {
        srocc: spearman(&sq, &q),
        krocc: kendall_tau_b(&sq, &q),
        plcc: pearson(&sq, &q),
        rmse: mse.sqrt(),
        outlier_ratio: outliers as f64 / n,
    })
}
