//! Randomized search over the expanded grid

use super::{evaluate_candidates, SearchJob, SearchReport, SearchStrategy};
use crate::error::{Result, TuneError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Evaluates a uniform sample of `n_iter` candidates from the grid's
/// expansion instead of all of them. When the grid is smaller than
/// `n_iter`, this degenerates to exhaustive search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RandomizedSearch {
    pub n_iter: usize,
    pub seed: Option<u64>,
}

impl RandomizedSearch {
    pub fn new(n_iter: usize) -> Self {
        Self { n_iter, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl SearchStrategy for RandomizedSearch {
    fn name(&self) -> &'static str {
        "randomized_search"
    }

    fn search(&self, job: &SearchJob<'_>) -> Result<SearchReport> {
        if self.n_iter == 0 {
            return Err(TuneError::ValidationError(
                "randomized search needs n_iter >= 1".to_string(),
            ));
        }

        let mut candidates = job.param_grid.expand();
        if candidates.len() > self.n_iter {
            let mut rng = match self.seed.or(job.random_state) {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            candidates.shuffle(&mut rng);
            candidates.truncate(self.n_iter);
        }

        evaluate_candidates(job, candidates, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_validation::CvStrategy;
    use crate::families::ModelFamily;
    use crate::metrics::{Metric, Scoring};
    use crate::params::{FitParams, ParamGrid};
    use crate::search::ErrorScore;
    use ndarray::{Array1, Array2};

    #[test]
    fn test_candidate_count_bounded_by_n_iter() {
        let x = Array2::from_shape_fn((12, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(12, |i| 2.0 * i as f64);
        let grid = ModelFamily::LinearRegression.default_grid(); // 4 candidates
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();
        let job = SearchJob {
            x: &x,
            y: &y,
            family: ModelFamily::LinearRegression,
            class_weight: None,
            param_grid: &grid,
            scoring: &scoring,
            fit_params: &fp,
            cv: CvStrategy::k_fold(3),
            n_jobs: 1,
            refit: false,
            verbose: false,
            error_score: ErrorScore::Raise,
            return_train_score: false,
            random_state: Some(1),
        };

        let report = RandomizedSearch::new(2).with_seed(9).search(&job).unwrap();
        assert_eq!(report.cv_results.len(), 2);
        assert_eq!(report.strategy, "randomized_search");

        // n_iter beyond the grid size evaluates everything once
        let report = RandomizedSearch::new(100).with_seed(9).search(&job).unwrap();
        assert_eq!(report.cv_results.len(), 4);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let x = Array2::from_shape_fn((6, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(6, |i| i as f64);
        let grid = ParamGrid::new();
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();
        let job = SearchJob {
            x: &x,
            y: &y,
            family: ModelFamily::LinearRegression,
            class_weight: None,
            param_grid: &grid,
            scoring: &scoring,
            fit_params: &fp,
            cv: CvStrategy::k_fold(2),
            n_jobs: 1,
            refit: false,
            verbose: false,
            error_score: ErrorScore::Raise,
            return_train_score: false,
            random_state: None,
        };
        assert!(RandomizedSearch::new(0).search(&job).is_err());
    }
}
