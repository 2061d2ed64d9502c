//! Integration test: Tuner configuration resolution and end-to-end searches

use ndarray::{Array1, Array2};
use polars::prelude::*;
use tunekit::prelude::*;

/// Separable binary-labeled dataset, 15 samples per class.
fn classification_data() -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((30, 2), |(i, j)| {
        let base = if i < 15 { 1.0 } else { 8.0 };
        base + ((i * 7 + j * 3) % 10) as f64 / 10.0
    });
    let y = Array1::from_shape_fn(30, |i| if i < 15 { 0.0 } else { 1.0 });
    (x, y)
}

/// Noise-free linear response over 24 samples.
fn regression_data() -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((24, 2), |(i, j)| (i + j * 5) as f64);
    let y = Array1::from_shape_fn(24, |i| 2.0 * i as f64 + 3.0);
    (x, y)
}

fn classification_df() -> DataFrame {
    let (x, y) = classification_data();
    df!(
        "f1" => x.column(0).to_vec(),
        "f2" => x.column(1).to_vec(),
        "target" => y.to_vec()
    )
    .unwrap()
}

fn quiet_tuner(x: Array2<f64>, y: Array1<f64>) -> Tuner {
    Tuner::new(x, y).with_verbose(false).with_n_jobs(1).with_random_state(0)
}

#[test]
fn test_logistic_regression_defaults_persisted_and_search_runs() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);

    tuner.logistic_regression(TuneOverrides::new()).unwrap();

    // Persisted configuration reflects the family defaults
    assert_eq!(tuner.scoring().unwrap().name(), "roc_auc");
    let grid = tuner.param_grid().unwrap();
    let keys: Vec<&str> = grid.keys().collect();
    assert_eq!(keys, vec!["C", "fit_intercept", "tol"]);
    assert_eq!(tuner.cv().unwrap(), &CvStrategy::stratified_k_fold(5));

    // The search completed and recorded a fitted logistic model
    match tuner.best_estimator().unwrap() {
        TunedModel::LogisticRegression(m) => assert!(m.is_fitted),
        other => panic!("expected logistic regression, got {}", other.name()),
    }
    assert_eq!(tuner.scorer().unwrap().name(), "roc_auc");
    assert_eq!(tuner.outcome().unwrap().n_splits, 5);
}

#[test]
fn test_best_params_subset_of_grid_and_best_score_is_max() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);
    tuner.logistic_regression(TuneOverrides::new()).unwrap();

    let grid_keys: Vec<String> =
        tuner.param_grid().unwrap().keys().map(str::to_string).collect();
    for key in tuner.best_params().unwrap().keys() {
        assert!(grid_keys.iter().any(|k| k == key), "{key} not a grid key");
    }

    let results = tuner.cv_results().unwrap();
    let max = results
        .candidates
        .iter()
        .map(|c| c.mean_test_score)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(tuner.best_score().unwrap(), max);
    assert_eq!(results.candidates[tuner.best_index().unwrap()].rank_test_score, 1);
}

#[test]
fn test_override_persists_then_later_calls_preserve() {
    let (x, y) = regression_data();
    let mut tuner = quiet_tuner(x, y);

    // First call: defaults are persisted
    tuner.linear_regression(TuneOverrides::new()).unwrap();
    assert_eq!(tuner.param_grid().unwrap().n_candidates(), 4);

    // Second call: explicit grid replaces the persisted one
    let small = ParamGrid::new().axis("fit_intercept", vec![ParamValue::Bool(true)]);
    tuner
        .linear_regression(TuneOverrides::new().param_grid(small.clone()))
        .unwrap();
    assert_eq!(tuner.param_grid(), Some(&small));

    // Third call with no override preserves the second call's grid
    tuner.linear_regression(TuneOverrides::new()).unwrap();
    assert_eq!(tuner.param_grid(), Some(&small));
    assert_eq!(tuner.cv_results().unwrap().len(), 1);
}

#[test]
fn test_cv_defaults_stratified_for_classifiers_plain_for_regressors() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y).with_n_splits(3);
    let grid = ParamGrid::new().axis("C", floats(&[1.0]));
    tuner
        .logistic_regression(TuneOverrides::new().param_grid(grid.clone()))
        .unwrap();
    assert_eq!(tuner.cv().unwrap(), &CvStrategy::stratified_k_fold(3));
    assert_eq!(tuner.outcome().unwrap().n_splits, 3);

    let (x, y) = regression_data();
    let mut tuner = quiet_tuner(x, y).with_n_splits(4);
    tuner.linear_regression(TuneOverrides::new()).unwrap();
    assert_eq!(tuner.cv().unwrap(), &CvStrategy::k_fold(4));
    assert_eq!(tuner.outcome().unwrap().n_splits, 4);
}

#[test]
fn test_explicit_cv_override_is_kept() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);
    let cv = CvStrategy::KFold { n_splits: 3, shuffle: true };
    let grid = ParamGrid::new().axis("C", floats(&[1.0]));
    tuner
        .logistic_regression(TuneOverrides::new().param_grid(grid).cv(cv))
        .unwrap();
    assert_eq!(tuner.cv(), Some(&cv));

    // A later call must not silently reset it to the family default
    tuner.logistic_regression(TuneOverrides::new()).unwrap();
    assert_eq!(tuner.cv(), Some(&cv));
}

#[test]
fn test_error_score_raise_aborts_on_invalid_candidate() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);

    let grid = ParamGrid::new()
        .axis("criterion", names(&["gini", "bogus"]))
        .axis("max_depth", ints(&[3]));
    let result = tuner.decision_tree_classifier(TuneOverrides::new().param_grid(grid));
    assert!(result.is_err());
    assert!(tuner.outcome().is_none());
}

#[test]
fn test_error_score_fallback_completes_search() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y).with_error_score(ErrorScore::Value(-5.0));

    let grid = ParamGrid::new()
        .axis("criterion", names(&["gini", "bogus"]))
        .axis("max_depth", ints(&[3]));
    tuner
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid))
        .unwrap();

    let results = tuner.cv_results().unwrap();
    assert_eq!(results.len(), 2);
    let failed: Vec<&_> = results
        .candidates
        .iter()
        .filter(|c| c.mean_test_score == -5.0)
        .collect();
    assert_eq!(failed.len(), 1);
    // The valid candidate wins
    assert!(tuner.best_score().unwrap() > -5.0);
}

#[test]
fn test_results_overwritten_by_next_search() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y);

    let two = ParamGrid::new().axis("C", floats(&[0.1, 1.0]));
    tuner.logistic_regression(TuneOverrides::new().param_grid(two)).unwrap();
    assert_eq!(tuner.cv_results().unwrap().len(), 2);

    let one = ParamGrid::new().axis("max_depth", ints(&[3]));
    tuner
        .decision_tree_classifier(TuneOverrides::new().param_grid(one))
        .unwrap();
    assert_eq!(tuner.cv_results().unwrap().len(), 1);
    assert!(matches!(
        tuner.best_estimator().unwrap(),
        TunedModel::DecisionTreeClassifier(_)
    ));
}

#[test]
fn test_svc_with_required_class_weight() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y).with_n_splits(3);

    let grid = ParamGrid::new()
        .axis("C", floats(&[1.0]))
        .axis("kernel", names(&["rbf"]))
        .axis("gamma", floats(&[0.1]));
    tuner
        .svc(TuneOverrides::new().param_grid(grid), ClassWeight::Balanced)
        .unwrap();

    assert!(matches!(tuner.best_estimator().unwrap(), TunedModel::Svc(_)));
    assert_eq!(tuner.scoring().unwrap().name(), "neg_log_loss");
}

#[test]
fn test_random_forest_classifier_class_weight_passthrough() {
    let (x, y) = classification_data();
    let mut tuner = quiet_tuner(x, y).with_n_splits(3);

    let grid = ParamGrid::new()
        .axis("n_estimators", ints(&[10]))
        .axis("max_depth", ints(&[4]));
    tuner
        .random_forest_classifier(
            TuneOverrides::new().param_grid(grid),
            Some(ClassWeight::Balanced),
        )
        .unwrap();

    match tuner.best_estimator().unwrap() {
        TunedModel::RandomForestClassifier(m) => {
            assert_eq!(m.class_weight, ClassWeight::Balanced);
        }
        other => panic!("expected random forest, got {}", other.name()),
    }
}

#[test]
fn test_optimizer_override_randomized_search() {
    let (x, y) = regression_data();
    let mut tuner = quiet_tuner(x, y);

    tuner
        .linear_regression(
            TuneOverrides::new().optimizer(RandomizedSearch::new(2).with_seed(4)),
        )
        .unwrap();

    let outcome = tuner.outcome().unwrap();
    assert_eq!(outcome.report.strategy, "randomized_search");
    assert_eq!(outcome.cv_results.len(), 2); // default grid has 4 candidates

    // The replaced optimizer persists for the next call
    tuner.linear_regression(TuneOverrides::new()).unwrap();
    assert_eq!(tuner.outcome().unwrap().report.strategy, "randomized_search");
}

#[test]
fn test_fit_params_sliced_per_fold() {
    let (x, y) = regression_data();
    let n = y.len();
    let mut tuner = quiet_tuner(x, y);

    let fp = FitParams::new().with("sample_weight", FitValue::FloatVec(vec![1.0; n]));
    tuner
        .linear_regression(TuneOverrides::new().fit_params(fp))
        .unwrap();

    assert!(tuner.fit_params().is_some());
    assert!(tuner.best_score().is_some());
}

#[test]
fn test_refit_disabled_still_selects_best() {
    let (x, y) = regression_data();
    let mut tuner = quiet_tuner(x, y).with_refit(false);
    tuner.linear_regression(TuneOverrides::new()).unwrap();

    assert!(tuner.best_estimator().is_none());
    assert!(tuner.best_params().is_some());
    assert!(tuner.best_score().is_some());
}

#[test]
fn test_from_dataframe_end_to_end() {
    let df = classification_df();
    let mut tuner = Tuner::from_dataframe(&df, "target")
        .unwrap()
        .with_verbose(false)
        .with_n_jobs(1)
        .with_random_state(0)
        .with_n_splits(3);

    let grid = ParamGrid::new()
        .axis("criterion", names(&["gini", "entropy"]))
        .axis("max_depth", ints(&[2, 4]));
    tuner
        .decision_tree_classifier(TuneOverrides::new().param_grid(grid))
        .unwrap();

    assert_eq!(tuner.cv_results().unwrap().len(), 4);
    let best = tuner.best_estimator().unwrap();
    let pred = best.predict(tuner.x()).unwrap();
    let correct = pred
        .iter()
        .zip(tuner.y().iter())
        .filter(|(p, t)| (*p - *t).abs() < 0.5)
        .count();
    assert!(correct >= 27, "refitted tree got {correct}/30 right");
}

#[test]
fn test_regressor_families_end_to_end() {
    let (x, y) = regression_data();

    // Family-specific small grids keep the runs quick
    let cases: Vec<(ModelFamily, ParamGrid)> = vec![
        (
            ModelFamily::Svr,
            ParamGrid::new()
                .axis("C", floats(&[10.0]))
                .axis("kernel", names(&["linear"])),
        ),
        (
            ModelFamily::LinearSvr,
            ParamGrid::new()
                .axis("C", floats(&[10.0]))
                .axis("epsilon", floats(&[0.0])),
        ),
        (
            ModelFamily::AdaBoostRegressor,
            ParamGrid::new()
                .axis("n_estimators", ints(&[5]))
                .axis("loss", names(&["linear"])),
        ),
        (
            ModelFamily::GradientBoostRegressor,
            ParamGrid::new()
                .axis("n_estimators", ints(&[20]))
                .axis("learning_rate", floats(&[0.3])),
        ),
        (
            ModelFamily::RandomForestRegressor,
            ParamGrid::new().axis("n_estimators", ints(&[10])),
        ),
    ];

    for (family, grid) in cases {
        let mut tuner = quiet_tuner(x.clone(), y.clone()).with_n_splits(3);
        tuner.tune(family, TuneOverrides::new().param_grid(grid)).unwrap();
        assert!(
            tuner.best_score().is_some(),
            "{family} search recorded no score"
        );
        assert!(tuner.best_estimator().is_some(), "{family} did not refit");
        assert_eq!(tuner.cv().unwrap(), &CvStrategy::k_fold(3), "{family} cv default");
    }
}

#[test]
fn test_classifier_families_end_to_end() {
    let (x, y) = classification_data();

    let cases: Vec<(ModelFamily, ParamGrid)> = vec![
        (
            ModelFamily::LinearSvc,
            ParamGrid::new()
                .axis("C", floats(&[1.0]))
                .axis("loss", names(&["squared_hinge"])),
        ),
        (
            ModelFamily::AdaBoostClassifier,
            ParamGrid::new()
                .axis("n_estimators", ints(&[10]))
                .axis("learning_rate", floats(&[1.0])),
        ),
        (
            ModelFamily::GradientBoostClassifier,
            ParamGrid::new()
                .axis("n_estimators", ints(&[20]))
                .axis("learning_rate", floats(&[0.5])),
        ),
    ];

    for (family, grid) in cases {
        let mut tuner = quiet_tuner(x.clone(), y.clone()).with_n_splits(3);
        tuner.tune(family, TuneOverrides::new().param_grid(grid)).unwrap();
        assert_eq!(
            tuner.cv().unwrap(),
            &CvStrategy::stratified_k_fold(3),
            "{family} cv default"
        );
        let best = tuner.best_estimator().unwrap();
        assert!(best.is_classifier());
        let acc = {
            let pred = best.predict(tuner.x()).unwrap();
            pred.iter()
                .zip(tuner.y().iter())
                .filter(|(p, t)| (*p - *t).abs() < 0.5)
                .count()
        };
        assert!(acc >= 25, "{family} refit accuracy {acc}/30");
    }
}
