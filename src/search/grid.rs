//! Exhaustive grid search, the default strategy

use super::{evaluate_candidates, SearchJob, SearchReport, SearchStrategy};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Evaluates every candidate in the cartesian expansion of the grid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GridSearch;

impl SearchStrategy for GridSearch {
    fn name(&self) -> &'static str {
        "grid_search"
    }

    fn search(&self, job: &SearchJob<'_>) -> Result<SearchReport> {
        let candidates = job.param_grid.expand();
        evaluate_candidates(job, candidates, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_validation::CvStrategy;
    use crate::families::ModelFamily;
    use crate::metrics::{Metric, Scoring};
    use crate::models::TunedModel;
    use crate::params::{floats, FitParams, ParamGrid};
    use crate::search::ErrorScore;
    use ndarray::{Array1, Array2};

    fn regression_data() -> (Array2<f64>, Array1<f64>) {
        // y = 3x + noise-free line, 12 samples
        let x = Array2::from_shape_fn((12, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(12, |i| 3.0 * i as f64 + 1.0);
        (x, y)
    }

    fn job<'a>(
        x: &'a Array2<f64>,
        y: &'a Array1<f64>,
        grid: &'a ParamGrid,
        scoring: &'a Scoring,
        fit_params: &'a FitParams,
        error_score: ErrorScore,
    ) -> SearchJob<'a> {
        SearchJob {
            x,
            y,
            family: ModelFamily::LinearRegression,
            class_weight: None,
            param_grid: grid,
            scoring,
            fit_params,
            cv: CvStrategy::KFold { n_splits: 3, shuffle: true },
            n_jobs: 1,
            refit: true,
            verbose: false,
            error_score,
            return_train_score: true,
            random_state: Some(0),
        }
    }

    #[test]
    fn test_grid_search_evaluates_all_candidates() {
        let (x, y) = regression_data();
        let grid = ModelFamily::LinearRegression.default_grid();
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();
        let report = GridSearch
            .search(&job(&x, &y, &grid, &scoring, &fp, ErrorScore::Raise))
            .unwrap();

        assert_eq!(report.cv_results.len(), grid.n_candidates());
        assert_eq!(report.n_splits, 3);
        assert_eq!(report.strategy, "grid_search");

        // Linear data: the line fits exactly, so the best score is ~1
        assert!(report.best_score > 0.99, "best {}", report.best_score);
        assert!(matches!(report.best_estimator, Some(TunedModel::LinearRegression(_))));
    }

    #[test]
    fn test_best_score_is_max_of_means() {
        let (x, y) = regression_data();
        let grid = ModelFamily::LinearRegression.default_grid();
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();
        let report = GridSearch
            .search(&job(&x, &y, &grid, &scoring, &fp, ErrorScore::Raise))
            .unwrap();

        let max = report
            .cv_results
            .candidates
            .iter()
            .map(|c| c.mean_test_score)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(report.best_score, max);
        assert_eq!(report.cv_results.candidates[report.best_index].rank_test_score, 1);
    }

    #[test]
    fn test_error_score_raise_aborts() {
        let (x, y) = regression_data();
        // Tolerance is not a linear-regression hyperparameter
        let grid = ParamGrid::new().axis("tol", floats(&[0.1]));
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();
        let result = GridSearch.search(&job(&x, &y, &grid, &scoring, &fp, ErrorScore::Raise));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_score_fallback_completes() {
        let (x, y) = regression_data();
        let mut grid = ModelFamily::LinearRegression.default_grid();
        grid.insert("tol", floats(&[0.1])); // poisons every candidate
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();
        let report = GridSearch
            .search(&job(&x, &y, &grid, &scoring, &fp, ErrorScore::Value(-999.0)))
            .unwrap();
        for candidate in &report.cv_results.candidates {
            assert_eq!(candidate.mean_test_score, -999.0);
        }
    }

    #[test]
    fn test_no_refit_leaves_estimator_empty() {
        let (x, y) = regression_data();
        let grid = ModelFamily::LinearRegression.default_grid();
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();
        let mut j = job(&x, &y, &grid, &scoring, &fp, ErrorScore::Raise);
        j.refit = false;
        let report = GridSearch.search(&j).unwrap();
        assert!(report.best_estimator.is_none());
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (x, y) = regression_data();
        let grid = ModelFamily::LinearRegression.default_grid();
        let scoring = Scoring::Named(Metric::R2);
        let fp = FitParams::new();

        let serial = GridSearch
            .search(&job(&x, &y, &grid, &scoring, &fp, ErrorScore::Raise))
            .unwrap();
        let mut j = job(&x, &y, &grid, &scoring, &fp, ErrorScore::Raise);
        j.n_jobs = 4;
        let parallel = GridSearch.search(&j).unwrap();

        assert_eq!(serial.best_index, parallel.best_index);
        for (a, b) in serial
            .cv_results
            .candidates
            .iter()
            .zip(parallel.cv_results.candidates.iter())
        {
            assert!((a.mean_test_score - b.mean_test_score).abs() < 1e-12);
        }
    }
}
