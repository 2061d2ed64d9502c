//! Estimator implementations and the dispatch enum over them

pub mod boosting;
pub mod forest;
pub mod linear;
pub mod svm;
pub mod tree;

pub use boosting::{
    AdaBoostClassifier, AdaBoostRegressor, AdaLoss, GradientBoostingClassifier,
    GradientBoostingConfig, GradientBoostingRegressor,
};
pub use forest::RandomForest;
pub use linear::{LinearRegression, LogisticRegression};
pub use svm::{EpsilonLoss, HingeLoss, Kernel, LinearSvc, LinearSvr, Svc, Svr};
pub use tree::{Criterion, DecisionTree, MaxFeatures, Splitter, SplitSize};

use crate::error::{Result, TuneError};
use crate::params::FitParams;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Class weighting policy for imbalanced classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every sample counts equally
    Uniform,
    /// n / (n_classes * count(class)) per class
    Balanced,
    /// Explicit (label, weight) pairs; must cover every label seen
    Custom(Vec<(f64, f64)>),
}

/// One fitted (or to-be-fitted) estimator of any supported family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TunedModel {
    LinearRegression(LinearRegression),
    LogisticRegression(LogisticRegression),
    DecisionTreeClassifier(DecisionTree),
    Svc(Svc),
    Svr(Svr),
    LinearSvc(LinearSvc),
    LinearSvr(LinearSvr),
    AdaBoostClassifier(AdaBoostClassifier),
    AdaBoostRegressor(AdaBoostRegressor),
    GradientBoostingClassifier(GradientBoostingClassifier),
    GradientBoostingRegressor(GradientBoostingRegressor),
    RandomForestClassifier(RandomForest),
    RandomForestRegressor(RandomForest),
}

impl TunedModel {
    pub fn name(&self) -> &'static str {
        match self {
            TunedModel::LinearRegression(_) => "linear_regression",
            TunedModel::LogisticRegression(_) => "logistic_regression",
            TunedModel::DecisionTreeClassifier(_) => "decision_tree_classifier",
            TunedModel::Svc(_) => "svc",
            TunedModel::Svr(_) => "svr",
            TunedModel::LinearSvc(_) => "linear_svc",
            TunedModel::LinearSvr(_) => "linear_svr",
            TunedModel::AdaBoostClassifier(_) => "ada_boost_classifier",
            TunedModel::AdaBoostRegressor(_) => "ada_boost_regressor",
            TunedModel::GradientBoostingClassifier(_) => "gradient_boost_classifier",
            TunedModel::GradientBoostingRegressor(_) => "gradient_boost_regressor",
            TunedModel::RandomForestClassifier(_) => "random_forest_classifier",
            TunedModel::RandomForestRegressor(_) => "random_forest_regressor",
        }
    }

    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            TunedModel::LogisticRegression(_)
                | TunedModel::DecisionTreeClassifier(_)
                | TunedModel::Svc(_)
                | TunedModel::LinearSvc(_)
                | TunedModel::AdaBoostClassifier(_)
                | TunedModel::GradientBoostingClassifier(_)
                | TunedModel::RandomForestClassifier(_)
        )
    }

    /// Sorted class labels once fitted; None for regressors.
    pub fn classes(&self) -> Option<&[f64]> {
        match self {
            TunedModel::LogisticRegression(m) => Some(m.classes()),
            TunedModel::DecisionTreeClassifier(m) => Some(m.classes()),
            TunedModel::Svc(m) => Some(m.classes()),
            TunedModel::LinearSvc(m) => Some(m.classes()),
            TunedModel::AdaBoostClassifier(m) => Some(m.classes()),
            TunedModel::GradientBoostingClassifier(m) => Some(m.classes()),
            TunedModel::RandomForestClassifier(m) => Some(m.classes()),
            _ => None,
        }
    }

    /// Fit the estimator. Fit parameters are forwarded; an estimator that
    /// cannot honor one rejects the call rather than silently ignoring it.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, fit_params: &FitParams) -> Result<()> {
        for key in fit_params.keys() {
            if key != "sample_weight" {
                return Err(TuneError::InvalidInput(format!(
                    "unsupported fit parameter: {key}"
                )));
            }
        }
        let sw = fit_params.sample_weight();

        match self {
            TunedModel::LinearRegression(m) => m.fit_weighted(x, y, sw),
            TunedModel::LogisticRegression(m) => m.fit_weighted(x, y, sw),
            TunedModel::LinearSvc(m) => m.fit_weighted(x, y, sw),
            TunedModel::LinearSvr(m) => m.fit_weighted(x, y, sw),
            TunedModel::AdaBoostClassifier(m) => m.fit_weighted(x, y, sw),
            other => {
                if sw.is_some() {
                    return Err(TuneError::InvalidInput(format!(
                        "{} does not accept sample_weight",
                        other.name()
                    )));
                }
                match other {
                    TunedModel::DecisionTreeClassifier(m) => m.fit(x, y),
                    TunedModel::Svc(m) => m.fit(x, y),
                    TunedModel::Svr(m) => m.fit(x, y),
                    TunedModel::AdaBoostRegressor(m) => m.fit(x, y),
                    TunedModel::GradientBoostingClassifier(m) => m.fit(x, y),
                    TunedModel::GradientBoostingRegressor(m) => m.fit(x, y),
                    TunedModel::RandomForestClassifier(m) => m.fit(x, y),
                    TunedModel::RandomForestRegressor(m) => m.fit(x, y),
                    _ => unreachable!("weighted variants handled above"),
                }
            }
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TunedModel::LinearRegression(m) => m.predict(x),
            TunedModel::LogisticRegression(m) => m.predict(x),
            TunedModel::DecisionTreeClassifier(m) => m.predict(x),
            TunedModel::Svc(m) => m.predict(x),
            TunedModel::Svr(m) => m.predict(x),
            TunedModel::LinearSvc(m) => m.predict(x),
            TunedModel::LinearSvr(m) => m.predict(x),
            TunedModel::AdaBoostClassifier(m) => m.predict(x),
            TunedModel::AdaBoostRegressor(m) => m.predict(x),
            TunedModel::GradientBoostingClassifier(m) => m.predict(x),
            TunedModel::GradientBoostingRegressor(m) => m.predict(x),
            TunedModel::RandomForestClassifier(m) => m.predict(x),
            TunedModel::RandomForestRegressor(m) => m.predict(x),
        }
    }

    /// Class probabilities, columns ordered by sorted class label.
    /// Errors for regression families.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            TunedModel::LogisticRegression(m) => m.predict_proba(x),
            TunedModel::DecisionTreeClassifier(m) => m.predict_proba(x),
            TunedModel::Svc(m) => m.predict_proba(x),
            TunedModel::LinearSvc(m) => m.predict_proba(x),
            TunedModel::AdaBoostClassifier(m) => m.predict_proba(x),
            TunedModel::GradientBoostingClassifier(m) => m.predict_proba(x),
            TunedModel::RandomForestClassifier(m) => m.predict_proba(x),
            other => Err(TuneError::InvalidInput(format!(
                "{} does not expose class probabilities",
                other.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FitParams, FitValue};
    use ndarray::array;

    #[test]
    fn test_dispatch_fit_predict() {
        let x = array![[0.0], [1.0], [4.0], [5.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut model = TunedModel::DecisionTreeClassifier(DecisionTree::new_classifier());
        model.fit(&x, &y, &FitParams::new()).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.is_classifier());
        assert_eq!(model.classes(), Some(&[0.0, 1.0][..]));
    }

    #[test]
    fn test_unknown_fit_param_rejected() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];
        let fp = FitParams::new().with("warm_start", FitValue::Bool(true));
        let mut model = TunedModel::LinearRegression(LinearRegression::new());
        assert!(model.fit(&x, &y, &fp).is_err());
    }

    #[test]
    fn test_sample_weight_rejected_where_unsupported() {
        let x = array![[0.0], [1.0], [4.0], [5.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let fp = FitParams::new()
            .with("sample_weight", FitValue::FloatVec(vec![1.0, 1.0, 1.0, 1.0]));
        let mut model = TunedModel::RandomForestClassifier(RandomForest::new_classifier(5));
        assert!(model.fit(&x, &y, &fp).is_err());
    }

    #[test]
    fn test_sample_weight_accepted_for_linear() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 1.0, 2.0, 3.0];
        let fp = FitParams::new()
            .with("sample_weight", FitValue::FloatVec(vec![1.0, 2.0, 1.0, 2.0]));
        let mut model = TunedModel::LinearRegression(LinearRegression::new());
        model.fit(&x, &y, &fp).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!((pred[2] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_regressor_has_no_proba() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];
        let mut model = TunedModel::LinearRegression(LinearRegression::new());
        model.fit(&x, &y, &FitParams::new()).unwrap();
        assert!(model.predict_proba(&x).is_err());
        assert!(model.classes().is_none());
    }
}
