//! Integration test: search reports, custom scorers, serialization

use ndarray::{Array1, Array2};
use std::sync::Arc;
use tunekit::prelude::*;

fn classification_data() -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((24, 2), |(i, j)| {
        let base = if i < 12 { 0.0 } else { 5.0 };
        base + ((i * 3 + j) % 7) as f64 / 7.0
    });
    let y = Array1::from_shape_fn(24, |i| if i < 12 { 0.0 } else { 1.0 });
    (x, y)
}

fn quiet_tuner(x: Array2<f64>, y: Array1<f64>) -> Tuner {
    Tuner::new(x, y)
        .with_verbose(false)
        .with_n_jobs(1)
        .with_random_state(0)
        .with_n_splits(3)
}

#[test]
fn test_report_carries_realized_splits_and_ranks() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);

    let grid = ParamGrid::new()
        .axis("criterion", names(&["gini", "entropy"]))
        .axis("max_depth", ints(&[2, 5]));
    tuner
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid))
        .unwrap();

    let outcome = tuner.outcome().unwrap();
    assert_eq!(outcome.n_splits, 3);
    assert_eq!(outcome.report.strategy, "grid_search");
    assert_eq!(outcome.cv_results.len(), 4);

    for candidate in &outcome.cv_results.candidates {
        assert_eq!(candidate.fold_test_scores.len(), 3);
        assert!(candidate.rank_test_score >= 1);
        assert!(candidate.rank_test_score <= 4);
        // Train scores are on by default
        assert_eq!(candidate.fold_train_scores.as_ref().unwrap().len(), 3);
    }
    assert_eq!(outcome.cv_results.candidates[outcome.best_index].rank_test_score, 1);
}

#[test]
fn test_return_train_score_off_drops_train_columns() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y).with_return_train_score(false);

    let grid = ParamGrid::new().axis("max_depth", ints(&[3]));
    tuner
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid))
        .unwrap();

    for candidate in &tuner.cv_results().unwrap().candidates {
        assert!(candidate.fold_train_scores.is_none());
        assert!(candidate.mean_train_score.is_none());
    }
}

#[test]
fn test_callable_scorer_drives_selection() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);

    // Plain accuracy through the callable seam
    let scorer = Scoring::Callable(Arc::new(|model: &TunedModel, x, y| {
        let pred = model.predict(x)?;
        let correct = pred
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        Ok(correct as f64 / y.len() as f64)
    }));

    let grid = ParamGrid::new().axis("max_depth", ints(&[1, 4]));
    tuner
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid).scoring(scorer))
        .unwrap();

    assert_eq!(tuner.scorer().unwrap().name(), "custom");
    // Accuracy is a fraction
    let best = tuner.best_score().unwrap();
    assert!((0.0..=1.0).contains(&best));
    assert!(best > 0.9, "separable data should score high, got {best}");
}

#[test]
fn test_named_scoring_override_by_string() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);

    let grid = ParamGrid::new().axis("max_depth", ints(&[3]));
    tuner
        .decision_tree_classifier(
            TuneOverrides::new()
                .param_grid(grid)
                .scoring(Scoring::from_name("accuracy").unwrap()),
        )
        .unwrap();
    assert_eq!(tuner.scoring().unwrap().name(), "accuracy");
}

#[test]
fn test_report_serializes_to_json() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);

    let grid = ParamGrid::new().axis("max_depth", ints(&[2]));
    tuner
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid))
        .unwrap();

    let report = &tuner.outcome().unwrap().report;
    let json = serde_json::to_string(report).unwrap();
    assert!(json.contains("\"neg_log_loss\""));
    assert!(json.contains("max_depth"));

    let back: SearchReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.best_index, report.best_index);
    assert_eq!(back.n_splits, report.n_splits);
    assert_eq!(back.cv_results.len(), report.cv_results.len());
}

#[test]
fn test_randomized_strategy_respects_seed() {
    let (x, y) = classification_data();

    let run = |seed: u64| {
        let mut tuner = quiet_tuner(x.clone(), y.clone());
        let grid = ParamGrid::new()
            .axis("max_depth", ints(&[1, 2, 3, 4, 5, 6]))
            .axis("criterion", names(&["gini", "entropy"]));
        tuner
            .decision_tree_classifier(
                TuneOverrides::new()
                    .param_grid(grid)
                    .optimizer(RandomizedSearch::new(3).with_seed(seed)),
            )
            .unwrap();
        tuner
            .cv_results()
            .unwrap()
            .candidates
            .iter()
            .map(|c| format!("{}", c.params))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(5), run(5));
    assert_eq!(run(5).len(), 3);
}

#[test]
fn test_parallel_search_matches_serial_selection() {
    let (x, y) = classification_data();

    let grid = ParamGrid::new()
        .axis("criterion", names(&["gini", "entropy"]))
        .axis("max_depth", ints(&[2, 4, 6]));

    let mut serial = quiet_tuner(x.clone(), y.clone());
    serial
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid.clone()))
        .unwrap();

    let mut parallel = quiet_tuner(x, y).with_n_jobs(4);
    parallel
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid))
        .unwrap();

    assert_eq!(serial.best_index(), parallel.best_index());
    assert_eq!(
        format!("{}", serial.best_params().unwrap()),
        format!("{}", parallel.best_params().unwrap())
    );
}
