//! Model family registry
//!
//! One place answers every per-family question the tuner has: the default
//! hyperparameter grid, the default scoring, which cross-validation kind
//! applies, and how to build a fresh estimator from a candidate parameter
//! set. Classifier families default to stratified folds, regressor families
//! to plain folds (stratification needs discrete labels).

use crate::cross_validation::CvStrategy;
use crate::error::{Result, TuneError};
use crate::metrics::{Metric, Scoring};
use crate::models::{
    AdaBoostClassifier, AdaBoostRegressor, AdaLoss, ClassWeight, Criterion, DecisionTree,
    EpsilonLoss, GradientBoostingClassifier, GradientBoostingConfig, GradientBoostingRegressor,
    HingeLoss, Kernel, LinearRegression, LinearSvc, LinearSvr, LogisticRegression, MaxFeatures,
    RandomForest, SplitSize, Splitter, Svc, Svr, TunedModel,
};
use crate::params::{bools, floats, ints, names, ParamGrid, ParamSet, ParamValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    LinearRegression,
    LogisticRegression,
    DecisionTreeClassifier,
    Svc,
    Svr,
    LinearSvc,
    LinearSvr,
    AdaBoostClassifier,
    AdaBoostRegressor,
    GradientBoostClassifier,
    GradientBoostRegressor,
    RandomForestClassifier,
    RandomForestRegressor,
}

/// Every family, in a stable order.
pub const ALL_FAMILIES: [ModelFamily; 13] = [
    ModelFamily::LinearRegression,
    ModelFamily::LogisticRegression,
    ModelFamily::DecisionTreeClassifier,
    ModelFamily::Svc,
    ModelFamily::Svr,
    ModelFamily::LinearSvc,
    ModelFamily::LinearSvr,
    ModelFamily::AdaBoostClassifier,
    ModelFamily::AdaBoostRegressor,
    ModelFamily::GradientBoostClassifier,
    ModelFamily::GradientBoostRegressor,
    ModelFamily::RandomForestClassifier,
    ModelFamily::RandomForestRegressor,
];

impl ModelFamily {
    pub fn name(&self) -> &'static str {
        match self {
            ModelFamily::LinearRegression => "linear_regression",
            ModelFamily::LogisticRegression => "logistic_regression",
            ModelFamily::DecisionTreeClassifier => "decision_tree_classifier",
            ModelFamily::Svc => "svc",
            ModelFamily::Svr => "svr",
            ModelFamily::LinearSvc => "linear_svc",
            ModelFamily::LinearSvr => "linear_svr",
            ModelFamily::AdaBoostClassifier => "ada_boost_classifier",
            ModelFamily::AdaBoostRegressor => "ada_boost_regressor",
            ModelFamily::GradientBoostClassifier => "gradient_boost_classifier",
            ModelFamily::GradientBoostRegressor => "gradient_boost_regressor",
            ModelFamily::RandomForestClassifier => "random_forest_classifier",
            ModelFamily::RandomForestRegressor => "random_forest_regressor",
        }
    }

    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            ModelFamily::LogisticRegression
                | ModelFamily::DecisionTreeClassifier
                | ModelFamily::Svc
                | ModelFamily::LinearSvc
                | ModelFamily::AdaBoostClassifier
                | ModelFamily::GradientBoostClassifier
                | ModelFamily::RandomForestClassifier
        )
    }

    /// Default cross-validation: stratified folds for classifiers, plain
    /// folds for regressors.
    pub fn default_cv(&self, n_splits: usize) -> CvStrategy {
        if self.is_classifier() {
            CvStrategy::stratified_k_fold(n_splits)
        } else {
            CvStrategy::k_fold(n_splits)
        }
    }

    pub fn default_scoring(&self) -> Scoring {
        let metric = match self {
            ModelFamily::LogisticRegression => Metric::RocAuc,
            ModelFamily::DecisionTreeClassifier
            | ModelFamily::Svc
            | ModelFamily::LinearSvc
            | ModelFamily::AdaBoostClassifier
            | ModelFamily::GradientBoostClassifier
            | ModelFamily::RandomForestClassifier => Metric::NegLogLoss,
            ModelFamily::GradientBoostRegressor | ModelFamily::RandomForestRegressor => {
                Metric::NegMeanAbsoluteError
            }
            ModelFamily::LinearRegression
            | ModelFamily::Svr
            | ModelFamily::LinearSvr
            | ModelFamily::AdaBoostRegressor => Metric::ExplainedVariance,
        };
        Scoring::Named(metric)
    }

    pub fn default_grid(&self) -> ParamGrid {
        match self {
            ModelFamily::LinearRegression => ParamGrid::new()
                .axis("normalize", bools())
                .axis("fit_intercept", bools()),
            ModelFamily::LogisticRegression => ParamGrid::new()
                .axis("C", floats(&[1e-2, 1e-1, 1.0, 10.0]))
                .axis("tol", floats(&[1e-3, 1e-4, 1e-5]))
                .axis("fit_intercept", bools()),
            ModelFamily::DecisionTreeClassifier => ParamGrid::new()
                .axis("criterion", names(&["gini", "entropy"]))
                .axis("splitter", names(&["best", "random"]))
                .axis("max_features", with_null(names(&["sqrt", "log2"])))
                .axis("max_depth", with_null(ints(&[2, 5, 10])))
                .axis("min_samples_split", split_sizes())
                .axis("min_impurity_decrease", floats(&[1e-7, 1e-6])),
            ModelFamily::Svc => ParamGrid::new()
                .axis("C", floats(&[1e-3, 1e-2, 1e-1, 1.0, 10.0]))
                .axis("kernel", names(&["rbf", "linear"]))
                .axis("gamma", floats(&[1e-3, 1e-4, 1e-5, 1e-6, 1e-7])),
            ModelFamily::Svr => ParamGrid::new()
                .axis("C", floats(&[1e-2, 1e-1, 1.0, 10.0]))
                .axis("epsilon", floats(&[0.01, 0.1, 1.0]))
                .axis("kernel", names(&["rbf", "linear", "poly", "sigmoid"]))
                .axis("gamma", floats(&[1e-2, 1e-3, 1e-4])),
            ModelFamily::LinearSvc => ParamGrid::new()
                .axis("C", floats(&[1e-2, 1e-1, 1.0, 10.0]))
                .axis("loss", names(&["hinge", "squared_hinge"]))
                .axis("tol", floats(&[1e-3, 1e-4, 1e-5]))
                .axis("fit_intercept", bools()),
            ModelFamily::LinearSvr => ParamGrid::new()
                .axis("C", floats(&[1e-2, 1e-1, 1.0, 10.0]))
                .axis("loss", names(&["epsilon_insensitive", "squared_epsilon_insensitive"]))
                .axis("epsilon", floats(&[0.0, 0.01, 0.1]))
                .axis("dual", vec![ParamValue::Bool(false)])
                .axis("tol", floats(&[1e-3, 1e-4, 1e-5]))
                .axis("fit_intercept", bools()),
            ModelFamily::AdaBoostClassifier => ParamGrid::new()
                .axis("n_estimators", ints(&[25, 50, 75, 100]))
                .axis("learning_rate", floats(&[0.1, 0.5, 1.0])),
            ModelFamily::AdaBoostRegressor => ParamGrid::new()
                .axis("n_estimators", ints(&[25, 50, 75, 100]))
                .axis("learning_rate", floats(&[0.1, 0.5, 1.0]))
                .axis("loss", names(&["linear", "exponential", "square"])),
            ModelFamily::GradientBoostClassifier | ModelFamily::GradientBoostRegressor => {
                ParamGrid::new()
                    .axis("n_estimators", ints(&[10, 100, 500]))
                    .axis("learning_rate", floats(&[0.01, 0.1, 0.5]))
                    .axis("max_features", with_null(names(&["sqrt", "log2"])))
                    .axis("max_depth", with_null(ints(&[1, 10])))
                    .axis("min_samples_split", split_sizes())
            }
            ModelFamily::RandomForestClassifier => ParamGrid::new()
                .axis("criterion", names(&["gini", "entropy"]))
                .axis("n_estimators", ints(&[10, 100, 500]))
                .axis("max_features", with_null(names(&["sqrt", "log2"])))
                .axis("max_depth", with_null(ints(&[1, 10])))
                .axis("min_samples_split", split_sizes()),
            ModelFamily::RandomForestRegressor => ParamGrid::new()
                .axis("n_estimators", ints(&[10, 100, 500]))
                .axis("max_features", with_null(names(&["sqrt", "log2"])))
                .axis("max_depth", with_null(ints(&[1, 10])))
                .axis("min_samples_split", split_sizes()),
        }
    }

    /// Construct a fresh, untrained estimator for one grid candidate.
    /// Only candidate parameters are applied; everything else stays at the
    /// estimator's own defaults. Unknown names and out-of-domain values are
    /// construction errors.
    pub fn build(
        &self,
        params: &ParamSet,
        class_weight: Option<&ClassWeight>,
    ) -> Result<TunedModel> {
        let builder = FamilyBuilder { family: *self, params };
        builder.check_known_keys()?;

        let model = match self {
            ModelFamily::LinearRegression => {
                let mut m = LinearRegression::new();
                if let Some(v) = builder.bool("fit_intercept")? {
                    m = m.with_fit_intercept(v);
                }
                if let Some(v) = builder.bool("normalize")? {
                    m = m.with_normalize(v);
                }
                TunedModel::LinearRegression(m)
            }
            ModelFamily::LogisticRegression => {
                let mut m = LogisticRegression::new();
                if let Some(v) = builder.positive_f64("C")? {
                    m = m.with_c(v);
                }
                if let Some(v) = builder.positive_f64("tol")? {
                    m = m.with_tol(v);
                }
                if let Some(v) = builder.bool("fit_intercept")? {
                    m = m.with_fit_intercept(v);
                }
                TunedModel::LogisticRegression(m)
            }
            ModelFamily::DecisionTreeClassifier => {
                let mut m = DecisionTree::new_classifier();
                if let Some(v) = builder.criterion()? {
                    m = m.with_criterion(v);
                }
                if let Some(v) = builder.splitter()? {
                    m = m.with_splitter(v);
                }
                if let Some(v) = builder.max_features()? {
                    m = m.with_max_features(v);
                }
                if let Some(v) = builder.max_depth()? {
                    m = m.with_max_depth(v);
                }
                if let Some(v) = builder.min_samples_split()? {
                    m = m.with_min_samples_split(v);
                }
                if let Some(v) = builder.nonnegative_f64("min_impurity_decrease")? {
                    m = m.with_min_impurity_decrease(v);
                }
                TunedModel::DecisionTreeClassifier(m)
            }
            ModelFamily::Svc => {
                let mut m = Svc::new();
                if let Some(w) = class_weight {
                    m = m.with_class_weight(w.clone());
                }
                if let Some(v) = builder.positive_f64("C")? {
                    m = m.with_c(v);
                }
                if let Some(k) = builder.kernel()? {
                    m = m.with_kernel(k);
                }
                // A class_weight grid axis, when present, wins over the
                // constructor-level argument for this candidate
                if let Some(w) = builder.class_weight_axis()? {
                    m = m.with_class_weight(w);
                }
                TunedModel::Svc(m)
            }
            ModelFamily::Svr => {
                let mut m = Svr::new();
                if let Some(v) = builder.positive_f64("C")? {
                    m = m.with_c(v);
                }
                if let Some(v) = builder.nonnegative_f64("epsilon")? {
                    m = m.with_epsilon(v);
                }
                if let Some(k) = builder.kernel()? {
                    m = m.with_kernel(k);
                }
                TunedModel::Svr(m)
            }
            ModelFamily::LinearSvc => {
                let mut m = LinearSvc::new();
                if let Some(v) = builder.positive_f64("C")? {
                    m = m.with_c(v);
                }
                if let Some(v) = builder.hinge_loss()? {
                    m = m.with_loss(v);
                }
                if let Some(v) = builder.positive_f64("tol")? {
                    m = m.with_tol(v);
                }
                if let Some(v) = builder.bool("fit_intercept")? {
                    m = m.with_fit_intercept(v);
                }
                TunedModel::LinearSvc(m)
            }
            ModelFamily::LinearSvr => {
                builder.dual_must_be_false()?;
                let mut m = LinearSvr::new();
                if let Some(v) = builder.positive_f64("C")? {
                    m = m.with_c(v);
                }
                if let Some(v) = builder.epsilon_loss()? {
                    m = m.with_loss(v);
                }
                if let Some(v) = builder.nonnegative_f64("epsilon")? {
                    m = m.with_epsilon(v);
                }
                if let Some(v) = builder.positive_f64("tol")? {
                    m = m.with_tol(v);
                }
                if let Some(v) = builder.bool("fit_intercept")? {
                    m = m.with_fit_intercept(v);
                }
                TunedModel::LinearSvr(m)
            }
            ModelFamily::AdaBoostClassifier => {
                let mut m = AdaBoostClassifier::default();
                if let Some(v) = builder.positive_usize("n_estimators")? {
                    m.n_estimators = v;
                }
                if let Some(v) = builder.positive_f64("learning_rate")? {
                    m.learning_rate = v;
                }
                TunedModel::AdaBoostClassifier(m)
            }
            ModelFamily::AdaBoostRegressor => {
                let mut m = AdaBoostRegressor::default();
                if let Some(v) = builder.positive_usize("n_estimators")? {
                    m.n_estimators = v;
                }
                if let Some(v) = builder.positive_f64("learning_rate")? {
                    m.learning_rate = v;
                }
                if let Some(v) = builder.ada_loss()? {
                    m = m.with_loss(v);
                }
                TunedModel::AdaBoostRegressor(m)
            }
            ModelFamily::GradientBoostClassifier => {
                TunedModel::GradientBoostingClassifier(GradientBoostingClassifier::new(
                    builder.gradient_boosting_config()?,
                ))
            }
            ModelFamily::GradientBoostRegressor => {
                TunedModel::GradientBoostingRegressor(GradientBoostingRegressor::new(
                    builder.gradient_boosting_config()?,
                ))
            }
            ModelFamily::RandomForestClassifier => {
                let mut m = RandomForest::new_classifier(100);
                if let Some(v) = builder.criterion()? {
                    m = m.with_criterion(v);
                }
                if let Some(v) = builder.positive_usize("n_estimators")? {
                    m.n_estimators = v;
                }
                if let Some(v) = builder.max_features()? {
                    m = m.with_max_features(v);
                }
                if let Some(v) = builder.max_depth()? {
                    m = m.with_max_depth(v);
                }
                if let Some(v) = builder.min_samples_split()? {
                    m = m.with_min_samples_split(v);
                }
                if let Some(w) = class_weight {
                    m = m.with_class_weight(w.clone());
                }
                TunedModel::RandomForestClassifier(m)
            }
            ModelFamily::RandomForestRegressor => {
                let mut m = RandomForest::new_regressor(100);
                if let Some(v) = builder.positive_usize("n_estimators")? {
                    m.n_estimators = v;
                }
                if let Some(v) = builder.max_features()? {
                    m = m.with_max_features(v);
                }
                if let Some(v) = builder.max_depth()? {
                    m = m.with_max_depth(v);
                }
                if let Some(v) = builder.min_samples_split()? {
                    m = m.with_min_samples_split(v);
                }
                TunedModel::RandomForestRegressor(m)
            }
        };
        Ok(model)
    }

    /// Parameter names this family's factory understands.
    fn known_keys(&self) -> &'static [&'static str] {
        match self {
            ModelFamily::LinearRegression => &["fit_intercept", "normalize"],
            ModelFamily::LogisticRegression => &["C", "tol", "fit_intercept"],
            ModelFamily::DecisionTreeClassifier => &[
                "criterion",
                "splitter",
                "max_features",
                "max_depth",
                "min_samples_split",
                "min_impurity_decrease",
            ],
            ModelFamily::Svc => &["C", "kernel", "gamma", "class_weight"],
            ModelFamily::Svr => &["C", "epsilon", "kernel", "gamma"],
            ModelFamily::LinearSvc => &["C", "loss", "tol", "fit_intercept"],
            ModelFamily::LinearSvr => &["C", "loss", "epsilon", "dual", "tol", "fit_intercept"],
            ModelFamily::AdaBoostClassifier => &["n_estimators", "learning_rate"],
            ModelFamily::AdaBoostRegressor => &["n_estimators", "learning_rate", "loss"],
            ModelFamily::GradientBoostClassifier | ModelFamily::GradientBoostRegressor => &[
                "n_estimators",
                "learning_rate",
                "max_features",
                "max_depth",
                "min_samples_split",
            ],
            ModelFamily::RandomForestClassifier => &[
                "criterion",
                "n_estimators",
                "max_features",
                "max_depth",
                "min_samples_split",
            ],
            ModelFamily::RandomForestRegressor => {
                &["n_estimators", "max_features", "max_depth", "min_samples_split"]
            }
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn with_null(mut values: Vec<ParamValue>) -> Vec<ParamValue> {
    values.push(ParamValue::Null);
    values
}

fn split_sizes() -> Vec<ParamValue> {
    vec![ParamValue::Int(2), ParamValue::Float(0.01), ParamValue::Float(0.1)]
}

/// Typed, validated access to one candidate's parameters for one family.
struct FamilyBuilder<'a> {
    family: ModelFamily,
    params: &'a ParamSet,
}

impl<'a> FamilyBuilder<'a> {
    fn err(&self, detail: impl Into<String>) -> TuneError {
        TuneError::InvalidParam {
            family: self.family.name().to_string(),
            detail: detail.into(),
        }
    }

    fn check_known_keys(&self) -> Result<()> {
        let known = self.family.known_keys();
        for key in self.params.keys() {
            if !known.contains(&key) {
                return Err(self.err(format!("unknown hyperparameter {key:?}")));
            }
        }
        Ok(())
    }

    fn bool(&self, name: &str) -> Result<Option<bool>> {
        match self.params.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.err(format!("{name} must be a boolean, got {v}"))),
        }
    }

    fn f64(&self, name: &str) -> Result<Option<f64>> {
        match self.params.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.err(format!("{name} must be numeric, got {v}"))),
        }
    }

    fn positive_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.f64(name)? {
            Some(v) if v <= 0.0 => Err(self.err(format!("{name} must be positive, got {v}"))),
            other => Ok(other),
        }
    }

    fn nonnegative_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.f64(name)? {
            Some(v) if v < 0.0 => Err(self.err(format!("{name} must be >= 0, got {v}"))),
            other => Ok(other),
        }
    }

    fn positive_usize(&self, name: &str) -> Result<Option<usize>> {
        match self.params.get(name) {
            None => Ok(None),
            Some(v) => match v.as_usize() {
                Some(n) if n >= 1 => Ok(Some(n)),
                _ => Err(self.err(format!("{name} must be a positive integer, got {v}"))),
            },
        }
    }

    fn str_choice(&self, name: &str, choices: &[&str]) -> Result<Option<&'a str>> {
        match self.params.get(name) {
            None => Ok(None),
            Some(v) => {
                let s = v
                    .as_str()
                    .ok_or_else(|| self.err(format!("{name} must be one of {choices:?}, got {v}")))?;
                if choices.contains(&s) {
                    Ok(Some(s))
                } else {
                    Err(self.err(format!("{name} must be one of {choices:?}, got {s:?}")))
                }
            }
        }
    }

    fn criterion(&self) -> Result<Option<Criterion>> {
        Ok(self.str_choice("criterion", &["gini", "entropy"])?.map(|s| match s {
            "gini" => Criterion::Gini,
            _ => Criterion::Entropy,
        }))
    }

    fn splitter(&self) -> Result<Option<Splitter>> {
        Ok(self.str_choice("splitter", &["best", "random"])?.map(|s| match s {
            "best" => Splitter::Best,
            _ => Splitter::Random,
        }))
    }

    fn max_features(&self) -> Result<Option<MaxFeatures>> {
        match self.params.get("max_features") {
            None => Ok(None),
            Some(ParamValue::Null) => Ok(Some(MaxFeatures::All)),
            Some(v) => match v.as_str() {
                Some("sqrt") => Ok(Some(MaxFeatures::Sqrt)),
                Some("log2") => Ok(Some(MaxFeatures::Log2)),
                _ => Err(self.err(format!(
                    "max_features must be \"sqrt\", \"log2\", or null, got {v}"
                ))),
            },
        }
    }

    fn max_depth(&self) -> Result<Option<Option<usize>>> {
        match self.params.get("max_depth") {
            None => Ok(None),
            Some(ParamValue::Null) => Ok(Some(None)),
            Some(v) => match v.as_usize() {
                Some(d) if d >= 1 => Ok(Some(Some(d))),
                _ => Err(self.err(format!("max_depth must be a positive integer or null, got {v}"))),
            },
        }
    }

    /// Integer counts and fractional sizes share the axis, as in the
    /// original grids: `2` is a count, `0.01` a fraction.
    fn min_samples_split(&self) -> Result<Option<SplitSize>> {
        match self.params.get("min_samples_split") {
            None => Ok(None),
            Some(ParamValue::Int(n)) if *n >= 2 => Ok(Some(SplitSize::Count(*n as usize))),
            Some(ParamValue::Float(f)) if *f > 0.0 && *f <= 1.0 => {
                Ok(Some(SplitSize::Fraction(*f)))
            }
            Some(v) => Err(self.err(format!(
                "min_samples_split must be an integer >= 2 or a fraction in (0, 1], got {v}"
            ))),
        }
    }

    fn kernel(&self) -> Result<Option<Kernel>> {
        let gamma = match self.positive_f64("gamma")? {
            Some(g) => g,
            None => 1.0,
        };
        match self.str_choice("kernel", &["rbf", "linear", "poly", "sigmoid"])? {
            None => {
                // Gamma alone retunes the default RBF kernel
                if self.params.contains("gamma") {
                    Ok(Some(Kernel::Rbf { gamma }))
                } else {
                    Ok(None)
                }
            }
            Some("linear") => Ok(Some(Kernel::Linear)),
            Some("rbf") => Ok(Some(Kernel::Rbf { gamma })),
            Some("poly") => Ok(Some(Kernel::Poly { gamma, degree: 3, coef0: 0.0 })),
            Some(_) => Ok(Some(Kernel::Sigmoid { gamma, coef0: 0.0 })),
        }
    }

    fn hinge_loss(&self) -> Result<Option<HingeLoss>> {
        Ok(self.str_choice("loss", &["hinge", "squared_hinge"])?.map(|s| match s {
            "hinge" => HingeLoss::Hinge,
            _ => HingeLoss::SquaredHinge,
        }))
    }

    fn epsilon_loss(&self) -> Result<Option<EpsilonLoss>> {
        Ok(self
            .str_choice("loss", &["epsilon_insensitive", "squared_epsilon_insensitive"])?
            .map(|s| match s {
                "epsilon_insensitive" => EpsilonLoss::EpsilonInsensitive,
                _ => EpsilonLoss::SquaredEpsilonInsensitive,
            }))
    }

    fn ada_loss(&self) -> Result<Option<AdaLoss>> {
        Ok(self
            .str_choice("loss", &["linear", "square", "exponential"])?
            .map(|s| match s {
                "linear" => AdaLoss::Linear,
                "square" => AdaLoss::Square,
                _ => AdaLoss::Exponential,
            }))
    }

    /// The solver is primal-only; `dual` is accepted on the axis solely so
    /// the original grid stays expressible.
    fn dual_must_be_false(&self) -> Result<()> {
        match self.params.get("dual") {
            None | Some(ParamValue::Bool(false)) => Ok(()),
            Some(v) => Err(self.err(format!("only dual=false is supported, got {v}"))),
        }
    }

    /// `class_weight` travels on the grid so it shows up in cv_results:
    /// null means uniform, "balanced" reweights by class frequency.
    fn class_weight_axis(&self) -> Result<Option<ClassWeight>> {
        match self.params.get("class_weight") {
            None => Ok(None),
            Some(ParamValue::Null) => Ok(Some(ClassWeight::Uniform)),
            Some(v) => match v.as_str() {
                Some("balanced") => Ok(Some(ClassWeight::Balanced)),
                _ => Err(self.err(format!(
                    "class_weight must be \"balanced\" or null, got {v}"
                ))),
            },
        }
    }

    fn gradient_boosting_config(&self) -> Result<GradientBoostingConfig> {
        let mut config = GradientBoostingConfig::default();
        if let Some(v) = self.positive_usize("n_estimators")? {
            config.n_estimators = v;
        }
        if let Some(v) = self.positive_f64("learning_rate")? {
            config.learning_rate = v;
        }
        if let Some(v) = self.max_features()? {
            config.max_features = v;
        }
        if let Some(v) = self.max_depth()? {
            config.max_depth = v;
        }
        if let Some(v) = self.min_samples_split()? {
            config.min_samples_split = v;
        }
        Ok(config)
    }
}
