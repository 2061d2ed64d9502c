//! Search strategies and the shared cross-validated executor
//!
//! A strategy decides WHICH candidates to evaluate (all of them for grid
//! search, a sample for randomized search); the executor here owns HOW one
//! candidate is evaluated across folds, the error-score policy, result
//! aggregation, and the refit of the winner.

mod grid;
mod random;

pub use grid::GridSearch;
pub use random::RandomizedSearch;

use crate::cross_validation::{CrossValidator, CvStrategy};
use crate::error::{Result, TuneError};
use crate::families::ModelFamily;
use crate::metrics::Scoring;
use crate::models::{ClassWeight, TunedModel};
use crate::params::{FitParams, ParamGrid, ParamSet};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What to do when a candidate fails to build or fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ErrorScore {
    /// Abort the whole search, propagating the candidate's error
    Raise,
    /// Record this fallback score for every fold of the failing candidate
    Value(f64),
}

impl Default for ErrorScore {
    fn default() -> Self {
        ErrorScore::Raise
    }
}

/// Everything the executor needs for one search call.
pub struct SearchJob<'a> {
    pub x: &'a Array2<f64>,
    pub y: &'a Array1<f64>,
    pub family: ModelFamily,
    /// Estimator-constructor pass-through for the forest classifier
    pub class_weight: Option<&'a ClassWeight>,
    pub param_grid: &'a ParamGrid,
    pub scoring: &'a Scoring,
    pub fit_params: &'a FitParams,
    pub cv: CvStrategy,
    pub n_jobs: usize,
    pub refit: bool,
    pub verbose: bool,
    pub error_score: ErrorScore,
    pub return_train_score: bool,
    pub random_state: Option<u64>,
}

/// A pluggable search strategy.
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn search(&self, job: &SearchJob<'_>) -> Result<SearchReport>;
}

/// Per-candidate cross-validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params: ParamSet,
    pub fold_test_scores: Vec<f64>,
    pub fold_train_scores: Option<Vec<f64>>,
    pub mean_test_score: f64,
    pub std_test_score: f64,
    pub mean_train_score: Option<f64>,
    /// 1 = best; ties share the smaller rank
    pub rank_test_score: usize,
}

/// The per-candidate results table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvResults {
    pub candidates: Vec<CandidateResult>,
}

impl CvResults {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Index of the highest mean test score, NaN-scoring candidates skipped.
    pub fn best_index(&self) -> Option<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.mean_test_score.is_nan())
            .max_by(|(_, a), (_, b)| {
                a.mean_test_score
                    .partial_cmp(&b.mean_test_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }
}

/// The complete outcome of one search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Name of the strategy that produced this report
    pub strategy: String,
    pub cv_results: CvResults,
    pub best_index: usize,
    pub best_params: ParamSet,
    pub best_score: f64,
    /// The winner refitted on the full dataset; None when refit is off
    pub best_estimator: Option<TunedModel>,
    pub scorer: Scoring,
    /// Folds actually used
    pub n_splits: usize,
}

/// Evaluate the given candidates under the job's cross-validation and
/// scoring, apply the error-score policy, rank, and optionally refit the
/// winner. Shared by every strategy.
pub(crate) fn evaluate_candidates(
    job: &SearchJob<'_>,
    candidates: Vec<ParamSet>,
    strategy: &'static str,
) -> Result<SearchReport> {
    if candidates.is_empty() {
        return Err(TuneError::ValidationError(
            "search produced no candidates to evaluate".to_string(),
        ));
    }

    let mut validator = CrossValidator::new(job.cv);
    if let Some(seed) = job.random_state {
        validator = validator.with_random_state(seed);
    }
    let splits = validator.split(job.x.nrows(), Some(job.y))?;
    let n_splits = splits.len();

    // Materialize fold data once; every candidate reuses it. Per-sample
    // fit parameters are narrowed to each fold's training rows.
    let n_samples = job.x.nrows();
    let folds: Vec<FoldData> = splits
        .iter()
        .map(|split| FoldData {
            x_train: job.x.select(Axis(0), &split.train_indices),
            y_train: split.train_indices.iter().map(|&i| job.y[i]).collect(),
            x_test: job.x.select(Axis(0), &split.test_indices),
            y_test: split.test_indices.iter().map(|&i| job.y[i]).collect(),
            fit_params: job.fit_params.subset(&split.train_indices, n_samples),
        })
        .collect();

    debug!(
        family = job.family.name(),
        strategy,
        n_candidates = candidates.len(),
        n_splits,
        "starting search"
    );

    let evaluate = |params: &ParamSet| -> Result<(Vec<f64>, Option<Vec<f64>>)> {
        let mut test_scores = Vec::with_capacity(n_splits);
        let mut train_scores = job.return_train_score.then(|| Vec::with_capacity(n_splits));
        for fold in &folds {
            let mut model = job.family.build(params, job.class_weight)?;
            model.fit(&fold.x_train, &fold.y_train, &fold.fit_params)?;
            test_scores.push(job.scoring.score(&model, &fold.x_test, &fold.y_test)?);
            if let Some(train_scores) = train_scores.as_mut() {
                train_scores.push(job.scoring.score(&model, &fold.x_train, &fold.y_train)?);
            }
        }
        Ok((test_scores, train_scores))
    };

    // Candidates are independent; fan out across a pool sized by n_jobs
    let raw: Vec<Result<(Vec<f64>, Option<Vec<f64>>)>> = if job.n_jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(job.n_jobs)
            .build()
            .map_err(|e| TuneError::ValidationError(format!("thread pool: {e}")))?;
        pool.install(|| candidates.par_iter().map(evaluate).collect())
    } else {
        candidates.iter().map(evaluate).collect()
    };

    let mut results = Vec::with_capacity(candidates.len());
    for (idx, (params, outcome)) in candidates.into_iter().zip(raw).enumerate() {
        let (test_scores, train_scores) = match outcome {
            Ok(scores) => scores,
            Err(err) => match job.error_score {
                ErrorScore::Raise => return Err(err),
                ErrorScore::Value(v) => {
                    info!(candidate = idx, error = %err, fallback = v, "candidate failed, scoring fallback");
                    (vec![v; n_splits], job.return_train_score.then(|| vec![v; n_splits]))
                }
            },
        };

        let mean = test_scores.iter().sum::<f64>() / n_splits as f64;
        let std = (test_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
            / n_splits as f64)
            .sqrt();
        let mean_train =
            train_scores.as_ref().map(|ts| ts.iter().sum::<f64>() / n_splits as f64);

        if job.verbose {
            info!(
                candidate = idx,
                params = %params,
                mean_test_score = mean,
                "evaluated candidate"
            );
        }

        results.push(CandidateResult {
            params,
            fold_test_scores: test_scores,
            fold_train_scores: train_scores,
            mean_test_score: mean,
            std_test_score: std,
            mean_train_score: mean_train,
            rank_test_score: 0,
        });
    }

    // Ranks: 1 + number of strictly better candidates, so ties share a
    // rank. NaN scorers sort to the bottom.
    let means: Vec<f64> = results.iter().map(|c| c.mean_test_score).collect();
    let n_results = results.len();
    for (i, candidate) in results.iter_mut().enumerate() {
        candidate.rank_test_score = if means[i].is_nan() {
            n_results
        } else {
            1 + means
                .iter()
                .enumerate()
                .filter(|(j, m)| *j != i && **m > means[i])
                .count()
        };
    }

    let cv_results = CvResults { candidates: results };
    let best_index = cv_results.best_index().ok_or_else(|| {
        TuneError::ValidationError("every candidate scored NaN; nothing to select".to_string())
    })?;
    let best = &cv_results.candidates[best_index];
    let best_params = best.params.clone();
    let best_score = best.mean_test_score;

    let best_estimator = if job.refit {
        let mut model = job.family.build(&best_params, job.class_weight)?;
        model.fit(job.x, job.y, job.fit_params)?;
        Some(model)
    } else {
        None
    };

    if job.verbose {
        info!(
            family = job.family.name(),
            best_index,
            best_score,
            best_params = %best_params,
            "search complete"
        );
    }

    Ok(SearchReport {
        strategy: strategy.to_string(),
        cv_results,
        best_index,
        best_params,
        best_score,
        best_estimator,
        scorer: job.scoring.clone(),
        n_splits,
    })
}

struct FoldData {
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
    fit_params: FitParams,
}
