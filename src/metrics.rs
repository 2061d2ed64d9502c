//! Scoring metrics
//!
//! Every score follows the greater-is-better convention; loss-style metrics
//! are negated and named accordingly (`neg_log_loss`, `neg_mean_absolute_error`).

use crate::error::{Result, TuneError};
use crate::models::TunedModel;
use ndarray::{Array1, Array2};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Named metrics resolvable from their string identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    RocAuc,
    NegLogLoss,
    Accuracy,
    F1,
    NegMeanAbsoluteError,
    NegMeanSquaredError,
    R2,
    ExplainedVariance,
}

impl Metric {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "roc_auc" => Ok(Metric::RocAuc),
            "neg_log_loss" => Ok(Metric::NegLogLoss),
            "accuracy" => Ok(Metric::Accuracy),
            "f1" => Ok(Metric::F1),
            "neg_mean_absolute_error" => Ok(Metric::NegMeanAbsoluteError),
            "neg_mean_squared_error" => Ok(Metric::NegMeanSquaredError),
            "r2" => Ok(Metric::R2),
            "explained_variance" => Ok(Metric::ExplainedVariance),
            other => Err(TuneError::UnknownMetric(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::RocAuc => "roc_auc",
            Metric::NegLogLoss => "neg_log_loss",
            Metric::Accuracy => "accuracy",
            Metric::F1 => "f1",
            Metric::NegMeanAbsoluteError => "neg_mean_absolute_error",
            Metric::NegMeanSquaredError => "neg_mean_squared_error",
            Metric::R2 => "r2",
            Metric::ExplainedVariance => "explained_variance",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of a user-supplied scorer: fitted estimator, held-out
/// covariates, held-out response -> greater-is-better score.
pub type ScoreFn = Arc<dyn Fn(&TunedModel, &Array2<f64>, &Array1<f64>) -> Result<f64> + Send + Sync>;

/// A scoring specification: a named metric or a callable.
#[derive(Clone)]
pub enum Scoring {
    Named(Metric),
    Callable(ScoreFn),
}

impl Scoring {
    pub fn from_name(name: &str) -> Result<Self> {
        Metric::from_name(name).map(Scoring::Named)
    }

    pub fn name(&self) -> &str {
        match self {
            Scoring::Named(m) => m.name(),
            Scoring::Callable(_) => "custom",
        }
    }

    /// Score a fitted estimator on held-out data.
    pub fn score(&self, model: &TunedModel, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        match self {
            Scoring::Callable(f) => f(model, x, y),
            Scoring::Named(metric) => match metric {
                Metric::Accuracy => Ok(accuracy(y, &model.predict(x)?)),
                Metric::F1 => Ok(f1_score(y, &model.predict(x)?)),
                Metric::RocAuc => {
                    let proba = model.predict_proba(x)?;
                    if proba.ncols() != 2 {
                        return Err(TuneError::InvalidInput(format!(
                            "roc_auc requires a binary classifier, got {} classes",
                            proba.ncols()
                        )));
                    }
                    let scores = proba.column(1).to_owned();
                    roc_auc(y, &scores)
                }
                Metric::NegLogLoss => {
                    let proba = model.predict_proba(x)?;
                    let classes = model.classes().ok_or_else(|| {
                        TuneError::InvalidInput(
                            "neg_log_loss requires a classifier with known classes".to_string(),
                        )
                    })?;
                    Ok(-log_loss(y, &proba, classes)?)
                }
                Metric::NegMeanAbsoluteError => Ok(-mean_absolute_error(y, &model.predict(x)?)),
                Metric::NegMeanSquaredError => Ok(-mean_squared_error(y, &model.predict(x)?)),
                Metric::R2 => Ok(r2_score(y, &model.predict(x)?)),
                Metric::ExplainedVariance => Ok(explained_variance(y, &model.predict(x)?)),
            },
        }
    }
}

impl fmt::Debug for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoring::Named(m) => write!(f, "Scoring::Named({m})"),
            Scoring::Callable(_) => write!(f, "Scoring::Callable(..)"),
        }
    }
}

impl PartialEq for Scoring {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scoring::Named(a), Scoring::Named(b)) => a == b,
            (Scoring::Callable(a), Scoring::Callable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// Scorings serialize as their metric name so search reports stay
// JSON-round-trippable; a callable has no stable representation and
// cannot be deserialized back.
impl Serialize for Scoring {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Scoring {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Scoring::from_name(&name).map_err(D::Error::custom)
    }
}

/// Fraction of predictions within 0.5 of the true label.
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Binary F1 with 1.0 as the positive label.
pub fn f1_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t_pos = *t > 0.5;
        let p_pos = *p > 0.5;
        match (t_pos, p_pos) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    if tp == 0 {
        return 0.0;
    }
    let precision = tp as f64 / (tp + fp) as f64;
    let recall = tp as f64 / (tp + fn_) as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Area under the ROC curve, computed rank-based (Mann-Whitney) with
/// average ranks for tied scores. Labels above 0.5 count as positive.
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<f64> {
    let n = y_true.len();
    if n != scores.len() {
        return Err(TuneError::ShapeError {
            expected: format!("{n} scores"),
            actual: format!("{} scores", scores.len()),
        });
    }

    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(TuneError::InvalidInput(
            "roc_auc is undefined when only one class is present".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks over tie groups
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && (scores[order[j + 1]] - scores[order[i]]).abs() < 1e-12 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&t, _)| t > 0.5)
        .map(|(_, &r)| r)
        .sum();

    let u = rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Ok(u / (n_pos * n_neg) as f64)
}

/// Multinomial log loss; probabilities are clamped away from 0 and 1.
pub fn log_loss(y_true: &Array1<f64>, proba: &Array2<f64>, classes: &[f64]) -> Result<f64> {
    const EPS: f64 = 1e-15;
    if y_true.len() != proba.nrows() {
        return Err(TuneError::ShapeError {
            expected: format!("{} probability rows", y_true.len()),
            actual: format!("{} probability rows", proba.nrows()),
        });
    }

    let mut total = 0.0;
    for (i, &t) in y_true.iter().enumerate() {
        let col = classes
            .iter()
            .position(|&c| (c - t).abs() < 1e-9)
            .ok_or_else(|| {
                TuneError::InvalidInput(format!("label {t} not among the fitted classes"))
            })?;
        let p = proba[[i, col]].clamp(EPS, 1.0 - EPS);
        total -= p.ln();
    }
    Ok(total / y_true.len() as f64)
}

pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y_true.sum() / n as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}

/// 1 - Var[y - y_hat] / Var[y]. Differs from R² only under biased errors.
pub fn explained_variance(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let residuals: Vec<f64> = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| t - p)
        .collect();
    let res_mean = residuals.iter().sum::<f64>() / n as f64;
    let res_var = residuals.iter().map(|r| (r - res_mean).powi(2)).sum::<f64>() / n as f64;

    let y_mean = y_true.sum() / n as f64;
    let y_var = y_true.iter().map(|t| (t - y_mean).powi(2)).sum::<f64>() / n as f64;

    if y_var > 0.0 {
        1.0 - res_var / y_var
    } else {
        0.0
    }
}
