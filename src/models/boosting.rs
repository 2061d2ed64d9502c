//! Boosted ensembles: AdaBoost (SAMME / R2) and gradient boosting
//!
//! Both reuse the CART tree as the base learner. AdaBoost keeps the sample
//! weight distribution explicit and refits base trees on weighted bootstrap
//! draws; gradient boosting fits regression trees to residuals.

use crate::error::{Result, TuneError};
use crate::models::tree::{DecisionTree, MaxFeatures, SplitSize};
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// AdaBoost.R2 loss for scaling per-sample errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AdaLoss {
    Linear,
    Square,
    Exponential,
}

fn check_boosting_params(n_estimators: usize, learning_rate: f64) -> Result<()> {
    if n_estimators == 0 {
        return Err(TuneError::InvalidInput(
            "n_estimators must be at least 1".to_string(),
        ));
    }
    if learning_rate <= 0.0 {
        return Err(TuneError::InvalidInput(format!(
            "learning_rate must be positive, got {learning_rate}"
        )));
    }
    Ok(())
}

fn check_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(TuneError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    Ok(())
}

/// Draw a weighted bootstrap sample of indices.
fn weighted_draw(weights: &[f64], n: usize, rng: &mut ChaCha8Rng) -> Result<Vec<usize>> {
    let dist = WeightedIndex::new(weights)
        .map_err(|e| TuneError::InvalidInput(format!("degenerate sample weights: {e}")))?;
    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

/// AdaBoost classifier (SAMME), depth-1 stumps as base learners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostClassifier {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub random_state: Option<u64>,
    stumps: Vec<DecisionTree>,
    stage_weights: Vec<f64>,
    classes: Vec<f64>,
}

impl Default for AdaBoostClassifier {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostClassifier {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            random_state: None,
            stumps: Vec::new(),
            stage_weights: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        !self.stumps.is_empty()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.fit_weighted(x, y, None)
    }

    pub fn fit_weighted(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        sample_weight: Option<&[f64]>,
    ) -> Result<()> {
        check_boosting_params(self.n_estimators, self.learning_rate)?;
        check_shapes(x, y)?;
        if let Some(w) = sample_weight {
            if w.len() != x.nrows() {
                return Err(TuneError::ShapeError {
                    expected: format!("sample_weight length = {}", x.nrows()),
                    actual: format!("sample_weight length = {}", w.len()),
                });
            }
        }

        let n = x.nrows();
        let mut classes: Vec<f64> = y.to_vec();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        if classes.len() < 2 {
            return Err(TuneError::InvalidInput(
                "AdaBoost requires at least 2 classes".to_string(),
            ));
        }
        self.classes = classes;
        let k = self.classes.len() as f64;

        let mut weights: Vec<f64> = match sample_weight {
            Some(w) => w.to_vec(),
            None => vec![1.0 / n as f64; n],
        };
        let total: f64 = weights.iter().sum();
        for w in weights.iter_mut() {
            *w /= total;
        }

        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        self.stumps.clear();
        self.stage_weights.clear();

        for round in 0..self.n_estimators {
            let indices = weighted_draw(&weights, n, &mut rng)?;
            let x_boot = x.select(ndarray::Axis(0), &indices);
            let y_boot: Array1<f64> = indices.iter().map(|&i| y[i]).collect();

            let mut stump = DecisionTree::new_classifier()
                .with_max_depth(Some(1))
                .with_random_state(self.random_state.unwrap_or(0).wrapping_add(round as u64));
            stump.fit(&x_boot, &y_boot)?;

            let pred = stump.predict(x)?;
            let error: f64 = weights
                .iter()
                .zip(pred.iter().zip(y.iter()))
                .filter(|(_, (p, t))| (*p - *t).abs() > 1e-9)
                .map(|(w, _)| *w)
                .sum();
            let error = error.clamp(1e-15, 1.0 - 1e-15);

            // SAMME stage weight; the (k - 1) term keeps multi-class stages positive
            let alpha = self.learning_rate * (((1.0 - error) / error).ln() + (k - 1.0).ln());
            if alpha <= 0.0 {
                // Worse than chance; resample and move on
                continue;
            }

            for (w, (p, t)) in weights.iter_mut().zip(pred.iter().zip(y.iter())) {
                if (p - t).abs() > 1e-9 {
                    *w *= alpha.exp();
                }
            }
            let w_sum: f64 = weights.iter().sum();
            if w_sum > 0.0 {
                for w in weights.iter_mut() {
                    *w /= w_sum;
                }
            }

            self.stumps.push(stump);
            self.stage_weights.push(alpha);
        }

        if self.stumps.is_empty() {
            return Err(TuneError::InvalidInput(
                "AdaBoost found no stage better than chance".to_string(),
            ));
        }
        Ok(())
    }

    fn class_scores(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.stumps.is_empty() {
            return Err(TuneError::ModelNotFitted);
        }
        let mut scores = Array2::<f64>::zeros((x.nrows(), self.classes.len()));
        for (stump, &alpha) in self.stumps.iter().zip(self.stage_weights.iter()) {
            let pred = stump.predict(x)?;
            for (i, &p) in pred.iter().enumerate() {
                if let Some(j) = self.classes.iter().position(|&c| (c - p).abs() < 1e-9) {
                    scores[[i, j]] += alpha;
                }
            }
        }
        Ok(scores)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.class_scores(x)?;
        Ok((0..scores.nrows())
            .map(|i| {
                let row = scores.row(i);
                let best = row
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(j, _)| j)
                    .unwrap_or(0);
                self.classes[best]
            })
            .collect())
    }

    /// Softmax over the weighted vote totals.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let scores = self.class_scores(x)?;
        let mut proba = Array2::<f64>::zeros(scores.dim());
        for i in 0..scores.nrows() {
            let row = scores.row(i);
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let exp_sum: f64 = row.iter().map(|&s| (s - max).exp()).sum();
            for j in 0..row.len() {
                proba[[i, j]] = (row[j] - max).exp() / exp_sum;
            }
        }
        Ok(proba)
    }
}

/// AdaBoost regressor (AdaBoost.R2), shallow regression trees as base
/// learners, weighted-median prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub loss: AdaLoss,
    pub random_state: Option<u64>,
    trees: Vec<DecisionTree>,
    stage_weights: Vec<f64>,
}

impl Default for AdaBoostRegressor {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            loss: AdaLoss::Linear,
            random_state: None,
            trees: Vec::new(),
            stage_weights: Vec::new(),
        }
    }

    pub fn with_loss(mut self, loss: AdaLoss) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_boosting_params(self.n_estimators, self.learning_rate)?;
        check_shapes(x, y)?;

        let n = x.nrows();
        let mut weights = vec![1.0 / n as f64; n];
        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        self.trees.clear();
        self.stage_weights.clear();

        for round in 0..self.n_estimators {
            let indices = weighted_draw(&weights, n, &mut rng)?;
            let x_boot = x.select(ndarray::Axis(0), &indices);
            let y_boot: Array1<f64> = indices.iter().map(|&i| y[i]).collect();

            let mut tree = DecisionTree::new_regressor()
                .with_max_depth(Some(3))
                .with_random_state(self.random_state.unwrap_or(0).wrapping_add(round as u64));
            tree.fit(&x_boot, &y_boot)?;

            let pred = tree.predict(x)?;
            let abs_errors: Vec<f64> =
                pred.iter().zip(y.iter()).map(|(p, t)| (p - t).abs()).collect();
            let max_error = abs_errors.iter().copied().fold(0.0f64, f64::max);
            if max_error < 1e-12 {
                // Perfect stage: keep it with full confidence and stop
                self.trees.push(tree);
                self.stage_weights.push(1.0);
                break;
            }

            let losses: Vec<f64> = abs_errors
                .iter()
                .map(|&e| {
                    let ratio = e / max_error;
                    match self.loss {
                        AdaLoss::Linear => ratio,
                        AdaLoss::Square => ratio * ratio,
                        AdaLoss::Exponential => 1.0 - (-ratio).exp(),
                    }
                })
                .collect();

            let avg_loss: f64 = weights.iter().zip(losses.iter()).map(|(w, l)| w * l).sum();
            if avg_loss >= 0.5 {
                // Stage no better than chance under R2; stop boosting
                break;
            }

            let beta = avg_loss / (1.0 - avg_loss);
            let stage_weight = self.learning_rate * (1.0 / beta).ln();

            for (w, l) in weights.iter_mut().zip(losses.iter()) {
                *w *= beta.powf((1.0 - l) * self.learning_rate);
            }
            let w_sum: f64 = weights.iter().sum();
            if w_sum > 0.0 {
                for w in weights.iter_mut() {
                    *w /= w_sum;
                }
            }

            self.trees.push(tree);
            self.stage_weights.push(stage_weight);
        }

        if self.trees.is_empty() {
            return Err(TuneError::InvalidInput(
                "AdaBoost.R2 produced no usable stage".to_string(),
            ));
        }
        Ok(())
    }

    /// Weighted median across stage predictions.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(TuneError::ModelNotFitted);
        }
        let per_tree: Vec<Array1<f64>> =
            self.trees.iter().map(|t| t.predict(x)).collect::<Result<_>>()?;
        let total_weight: f64 = self.stage_weights.iter().sum();

        Ok((0..x.nrows())
            .map(|i| {
                let mut pairs: Vec<(f64, f64)> = per_tree
                    .iter()
                    .zip(self.stage_weights.iter())
                    .map(|(p, &w)| (p[i], w))
                    .collect();
                pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                let mut acc = 0.0;
                for (v, w) in &pairs {
                    acc += w;
                    if acc >= total_weight / 2.0 {
                        return *v;
                    }
                }
                pairs.last().map(|(v, _)| *v).unwrap_or(0.0)
            })
            .collect())
    }
}

/// Shared knobs for the gradient-boosted ensembles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub min_samples_split: SplitSize,
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: Some(3),
            max_features: MaxFeatures::All,
            min_samples_split: SplitSize::Count(2),
            random_state: None,
        }
    }
}

impl GradientBoostingConfig {
    fn validate(&self) -> Result<()> {
        check_boosting_params(self.n_estimators, self.learning_rate)
    }

    fn base_tree(&self, round: usize) -> DecisionTree {
        DecisionTree::new_regressor()
            .with_max_depth(self.max_depth)
            .with_max_features(self.max_features)
            .with_min_samples_split(self.min_samples_split)
            .with_random_state(self.random_state.unwrap_or(0).wrapping_add(round as u64))
    }
}

/// Least-squares gradient boosting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    pub config: GradientBoostingConfig,
    trees: Vec<DecisionTree>,
    initial_prediction: f64,
    fitted: bool,
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self { config, trees: Vec::new(), initial_prediction: 0.0, fitted: false }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.config.validate()?;
        check_shapes(x, y)?;

        self.initial_prediction = y.mean().unwrap_or(0.0);
        let mut current = Array1::from_elem(x.nrows(), self.initial_prediction);
        self.trees.clear();

        for round in 0..self.config.n_estimators {
            let residuals: Array1<f64> = y - &current;
            let mut tree = self.config.base_tree(round);
            tree.fit(x, &residuals)?;
            let update = tree.predict(x)?;
            current.scaled_add(self.config.learning_rate, &update);
            self.trees.push(tree);
        }

        self.fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(TuneError::ModelNotFitted);
        }
        let mut pred = Array1::from_elem(x.nrows(), self.initial_prediction);
        for tree in &self.trees {
            pred.scaled_add(self.config.learning_rate, &tree.predict(x)?);
        }
        Ok(pred)
    }
}

/// Binary logistic gradient boosting: regression trees fit to the
/// probability residuals, predictions squashed through a sigmoid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    pub config: GradientBoostingConfig,
    trees: Vec<DecisionTree>,
    initial_log_odds: f64,
    classes: Vec<f64>,
    fitted: bool,
}

impl GradientBoostingClassifier {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            initial_log_odds: 0.0,
            classes: Vec::new(),
            fitted: false,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.config.validate()?;
        check_shapes(x, y)?;

        let mut classes: Vec<f64> = y.to_vec();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        if classes.len() != 2 {
            return Err(TuneError::InvalidInput(format!(
                "gradient boosting classification requires exactly 2 classes, got {}",
                classes.len()
            )));
        }
        self.classes = classes;

        let t: Array1<f64> = y
            .iter()
            .map(|&v| if (v - self.classes[1]).abs() < 1e-9 { 1.0 } else { 0.0 })
            .collect();

        let pos_rate = t.mean().unwrap_or(0.5).clamp(1e-9, 1.0 - 1e-9);
        self.initial_log_odds = (pos_rate / (1.0 - pos_rate)).ln();

        let mut f = Array1::from_elem(x.nrows(), self.initial_log_odds);
        self.trees.clear();

        for round in 0..self.config.n_estimators {
            let residuals: Array1<f64> =
                t.iter().zip(f.iter()).map(|(&ti, &fi)| ti - sigmoid_scalar(fi)).collect();
            let mut tree = self.config.base_tree(round);
            tree.fit(x, &residuals)?;
            let update = tree.predict(x)?;
            f.scaled_add(self.config.learning_rate, &update);
            self.trees.push(tree);
        }

        self.fitted = true;
        Ok(())
    }

    fn raw_scores(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(TuneError::ModelNotFitted);
        }
        let mut f = Array1::from_elem(x.nrows(), self.initial_log_odds);
        for tree in &self.trees {
            f.scaled_add(self.config.learning_rate, &tree.predict(x)?);
        }
        Ok(f)
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let f = self.raw_scores(x)?;
        let mut proba = Array2::<f64>::zeros((x.nrows(), 2));
        for (i, &fi) in f.iter().enumerate() {
            let p = sigmoid_scalar(fi);
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let f = self.raw_scores(x)?;
        Ok(f.iter()
            .map(|&fi| if fi >= 0.0 { self.classes[1] } else { self.classes[0] })
            .collect())
    }
}

fn sigmoid_scalar(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
