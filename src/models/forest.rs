//! Random forest implementation

use crate::error::{Result, TuneError};
use crate::models::tree::{Criterion, DecisionTree, MaxFeatures, SplitSize};
use crate::models::ClassWeight;
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of decision trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub criterion: Criterion,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: SplitSize,
    pub random_state: Option<u64>,
    /// Bootstrap reweighting for imbalanced classification
    pub class_weight: ClassWeight,
    is_classification: bool,
    classes: Vec<f64>,
}

impl RandomForest {
    pub fn new_classifier(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            criterion: Criterion::Gini,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: SplitSize::Count(2),
            random_state: None,
            class_weight: ClassWeight::Uniform,
            is_classification: true,
            classes: Vec::new(),
        }
    }

    pub fn new_regressor(n_estimators: usize) -> Self {
        Self {
            criterion: Criterion::Mse,
            is_classification: false,
            ..Self::new_classifier(n_estimators)
        }
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: SplitSize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Per-sample bootstrap weights from the class-weight policy.
    fn sample_weights(&self, y: &Array1<f64>) -> Result<Option<Vec<f64>>> {
        if !self.is_classification {
            return Ok(None);
        }
        match &self.class_weight {
            ClassWeight::Uniform => Ok(None),
            ClassWeight::Balanced => {
                // n / (n_classes * count(class))
                let n = y.len() as f64;
                let k = self.classes.len() as f64;
                let weights = y
                    .iter()
                    .map(|&v| {
                        let count =
                            y.iter().filter(|&&u| (u - v).abs() < 1e-9).count() as f64;
                        n / (k * count)
                    })
                    .collect();
                Ok(Some(weights))
            }
            ClassWeight::Custom(pairs) => {
                let weights: Result<Vec<f64>> = y
                    .iter()
                    .map(|&v| {
                        pairs
                            .iter()
                            .find(|(label, _)| (label - v).abs() < 1e-9)
                            .map(|(_, w)| *w)
                            .ok_or_else(|| {
                                TuneError::InvalidInput(format!(
                                    "class_weight has no entry for label {v}"
                                ))
                            })
                    })
                    .collect();
                weights.map(Some)
            }
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(TuneError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.n_estimators == 0 {
            return Err(TuneError::InvalidInput(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        if self.is_classification {
            let mut classes: Vec<f64> = y.to_vec();
            classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            classes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
            self.classes = classes;
        }

        let weights = self.sample_weights(y)?;
        let base_seed = self.random_state.unwrap_or(0);

        // Each tree gets its own derived seed so fits can run in parallel
        // and stay reproducible
        let trees: Result<Vec<DecisionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let seed = base_seed.wrapping_add(t as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let indices: Vec<usize> = match &weights {
                    Some(w) => {
                        let dist = WeightedIndex::new(w).map_err(|e| {
                            TuneError::InvalidInput(format!("invalid class weights: {e}"))
                        })?;
                        (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
                    }
                    None => (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect(),
                };

                let x_boot = x.select(ndarray::Axis(0), &indices);
                let y_boot: Array1<f64> = indices.iter().map(|&i| y[i]).collect();

                let mut tree = if self.is_classification {
                    DecisionTree::new_classifier()
                } else {
                    DecisionTree::new_regressor()
                }
                .with_criterion(self.criterion)
                .with_max_features(self.max_features)
                .with_max_depth(self.max_depth)
                .with_min_samples_split(self.min_samples_split)
                .with_random_state(seed);
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(TuneError::ModelNotFitted);
        }
        if self.is_classification {
            let proba = self.predict_proba(x)?;
            Ok((0..proba.nrows())
                .map(|i| {
                    let row = proba.row(i);
                    let best = row
                        .iter()
                        .enumerate()
                        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                        .map(|(j, _)| j)
                        .unwrap_or(0);
                    self.classes[best]
                })
                .collect())
        } else {
            let mut sum = Array1::<f64>::zeros(x.nrows());
            for tree in &self.trees {
                sum += &tree.predict(x)?;
            }
            Ok(sum / self.trees.len() as f64)
        }
    }

    /// Average of the per-tree leaf distributions.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(TuneError::ModelNotFitted);
        }
        if !self.is_classification {
            return Err(TuneError::InvalidInput(
                "predict_proba requires a classification forest".to_string(),
            ));
        }

        let mut total = Array2::<f64>::zeros((x.nrows(), self.classes.len()));
        for tree in &self.trees {
            // Bootstrap draws can miss a class entirely; realign columns
            let proba = tree.predict_proba(x)?;
            let tree_classes = tree.classes();
            for (tj, &label) in tree_classes.iter().enumerate() {
                if let Some(fj) =
                    self.classes.iter().position(|&c| (c - label).abs() < 1e-9)
                {
                    for i in 0..x.nrows() {
                        total[[i, fj]] += proba[[i, tj]];
                    }
                }
            }
        }
        Ok(total / self.trees.len() as f64)
    }
}
