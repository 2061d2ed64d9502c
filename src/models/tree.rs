//! Decision tree (CART) implementation
//!
//! One tree type serves classification (gini/entropy, class-distribution
//! leaves) and regression (mse leaves), so forests and boosting reuse it.

use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Impurity criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Gini impurity (classification)
    Gini,
    /// Information entropy (classification)
    Entropy,
    /// Mean squared error (regression)
    Mse,
}

/// Split-point selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Splitter {
    /// Scan all threshold midpoints per candidate feature
    Best,
    /// Draw one random threshold per candidate feature
    Random,
}

/// How many features to consider per split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    All,
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil() as usize,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features)
    }
}

/// Minimum node size to attempt a split: an absolute count or a fraction
/// of the training set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SplitSize {
    Count(usize),
    Fraction(f64),
}

impl SplitSize {
    fn resolve(&self, n_samples: usize) -> Result<usize> {
        match *self {
            SplitSize::Count(c) => {
                if c < 2 {
                    return Err(TuneError::InvalidInput(format!(
                        "min_samples_split count must be >= 2, got {c}"
                    )));
                }
                Ok(c)
            }
            SplitSize::Fraction(f) => {
                if f <= 0.0 || f > 1.0 {
                    return Err(TuneError::InvalidInput(format!(
                        "min_samples_split fraction must be in (0, 1], got {f}"
                    )));
                }
                Ok(((f * n_samples as f64).ceil() as usize).max(2))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
        /// Class proportions aligned with `DecisionTree::classes`
        distribution: Option<Vec<f64>>,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// CART decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub criterion: Criterion,
    pub splitter: Splitter,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: SplitSize,
    /// Minimum weighted impurity decrease required to keep a split
    pub min_impurity_decrease: f64,
    pub random_state: Option<u64>,
    is_classification: bool,
    classes: Vec<f64>,
    n_features: usize,
    n_total: usize,
}

impl DecisionTree {
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            criterion: Criterion::Gini,
            splitter: Splitter::Best,
            max_features: MaxFeatures::All,
            max_depth: None,
            min_samples_split: SplitSize::Count(2),
            min_impurity_decrease: 0.0,
            random_state: None,
            is_classification: true,
            classes: Vec::new(),
            n_features: 0,
            n_total: 0,
        }
    }

    pub fn new_regressor() -> Self {
        Self {
            criterion: Criterion::Mse,
            is_classification: false,
            ..Self::new_classifier()
        }
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_splitter(mut self, splitter: Splitter) -> Self {
        self.splitter = splitter;
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

    pub fn with_min_impurity_decrease(mut self, decrease: f64) -> Self {
        self.min_impurity_decrease = decrease;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(TuneError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(TuneError::InvalidInput("empty training set".to_string()));
        }
        if self.is_classification && !matches!(self.criterion, Criterion::Gini | Criterion::Entropy)
        {
            return Err(TuneError::InvalidInput(
                "classification trees require gini or entropy".to_string(),
            ));
        }
        if self.min_impurity_decrease < 0.0 {
            return Err(TuneError::InvalidInput(format!(
                "min_impurity_decrease must be >= 0, got {}",
                self.min_impurity_decrease
            )));
        }

        self.n_features = x.ncols();
        self.n_total = n_samples;

        if self.is_classification {
            let mut classes: Vec<f64> = y.to_vec();
            classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            classes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
            self.classes = classes;
        }

        let min_split = self.min_samples_split.resolve(n_samples)?;
        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build(x, y, &indices, 0, min_split, &mut rng));
        Ok(())
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        min_split: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_node = indices.len();
        let y_node: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let stop = n_node < min_split
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure(&y_node);
        if stop {
            return self.leaf(&y_node);
        }

        let parent_impurity = self.impurity(&y_node);
        let split = self.find_split(x, y, indices, rng);

        match split {
            Some((feature_idx, threshold, weighted_child_impurity)) => {
                // Weighted impurity decrease, relative to the full training set
                let decrease =
                    n_node as f64 / self.n_total as f64 * (parent_impurity - weighted_child_impurity);
                if decrease < self.min_impurity_decrease {
                    return self.leaf(&y_node);
                }

                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);
                if left_idx.is_empty() || right_idx.is_empty() {
                    return self.leaf(&y_node);
                }

                let left = Box::new(self.build(x, y, &left_idx, depth + 1, min_split, rng));
                let right = Box::new(self.build(x, y, &right_idx, depth + 1, min_split, rng));
                TreeNode::Split { feature_idx, threshold, left, right, n_samples: n_node }
            }
            None => self.leaf(&y_node),
        }
    }

    /// Returns (feature, threshold, weighted child impurity) of the best
    /// candidate split, or None when no split improves on the parent.
    fn find_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, f64)> {
        let n_candidates = self.max_features.resolve(self.n_features);
        let mut features: Vec<usize> = (0..self.n_features).collect();
        if n_candidates < self.n_features {
            features.shuffle(rng);
            features.truncate(n_candidates);
        }

        let parent_impurity = self.impurity(&indices.iter().map(|&i| y[i]).collect::<Vec<_>>());
        let mut best: Option<(usize, f64, f64)> = None;
        let mut best_gain = 0.0f64;

        for &feature_idx in &features {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
            if values.len() < 2 {
                continue;
            }

            let thresholds: Vec<f64> = match self.splitter {
                Splitter::Best => values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect(),
                Splitter::Random => {
                    let lo = values[0];
                    let hi = values[values.len() - 1];
                    vec![rng.gen_range(lo..hi)]
                }
            };

            for threshold in thresholds {
                let left: Vec<f64> = indices
                    .iter()
                    .filter(|&&i| x[[i, feature_idx]] <= threshold)
                    .map(|&i| y[i])
                    .collect();
                let right: Vec<f64> = indices
                    .iter()
                    .filter(|&&i| x[[i, feature_idx]] > threshold)
                    .map(|&i| y[i])
                    .collect();
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let n = indices.len() as f64;
                let weighted = (left.len() as f64 * self.impurity(&left)
                    + right.len() as f64 * self.impurity(&right))
                    / n;
                let gain = parent_impurity - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, threshold, weighted));
                }
            }
        }
        best
    }

    fn leaf(&self, y_node: &[f64]) -> TreeNode {
        if self.is_classification {
            let mut counts = vec![0usize; self.classes.len()];
            for &v in y_node {
                if let Some(pos) = self.classes.iter().position(|&c| (c - v).abs() < 1e-9) {
                    counts[pos] += 1;
                }
            }
            let total = y_node.len().max(1) as f64;
            let distribution: Vec<f64> = counts.iter().map(|&c| c as f64 / total).collect();
            let majority = counts
                .iter()
                .enumerate()
                .max_by_key(|(_, &c)| c)
                .map(|(i, _)| self.classes[i])
                .unwrap_or(0.0);
            TreeNode::Leaf {
                value: majority,
                distribution: Some(distribution),
                n_samples: y_node.len(),
            }
        } else {
            let mean = if y_node.is_empty() {
                0.0
            } else {
                y_node.iter().sum::<f64>() / y_node.len() as f64
            };
            TreeNode::Leaf { value: mean, distribution: None, n_samples: y_node.len() }
        }
    }

    fn impurity(&self, y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        match self.criterion {
            Criterion::Gini => {
                let counts = class_counts(y);
                let n = y.len() as f64;
                1.0 - counts.values().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
            }
            Criterion::Entropy => {
                let counts = class_counts(y);
                let n = y.len() as f64;
                -counts
                    .values()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p.ln()
                    })
                    .sum::<f64>()
            }
            Criterion::Mse => {
                let mean = y.iter().sum::<f64>() / y.len() as f64;
                y.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / y.len() as f64
            }
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(TuneError::ModelNotFitted)?;
        Ok((0..x.nrows())
            .map(|i| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value, .. } => return *value,
                        TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                            node = if x[[i, *feature_idx]] <= *threshold { left } else { right };
                        }
                    }
                }
            })
            .collect())
    }

    /// Class probabilities from the leaf distributions; classifier only.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(TuneError::ModelNotFitted)?;
        if !self.is_classification {
            return Err(TuneError::InvalidInput(
                "predict_proba requires a classification tree".to_string(),
            ));
        }
        let n_classes = self.classes.len();
        let mut proba = Array2::<f64>::zeros((x.nrows(), n_classes));
        for i in 0..x.nrows() {
            let mut node = root;
            loop {
                match node {
                    TreeNode::Leaf { distribution, .. } => {
                        if let Some(dist) = distribution {
                            for (j, &p) in dist.iter().enumerate() {
                                proba[[i, j]] = p;
                            }
                        }
                        break;
                    }
                    TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                        node = if x[[i, *feature_idx]] <= *threshold { left } else { right };
                    }
                }
            }
        }
        Ok(proba)
    }

    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

fn class_counts(y: &[f64]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for &v in y {
        *counts.entry(v.round() as i64).or_insert(0) += 1;
    }
    counts
}

fn is_pure(y: &[f64]) -> bool {
    y.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-10)
}
