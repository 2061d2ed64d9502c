//! Cross-validation splitters
//!
//! Two strategies: plain k-fold for regression targets and stratified
//! k-fold for discrete labels. Stratification groups samples by class and
//! deals them round-robin so every fold keeps the class proportions.

use crate::error::{Result, TuneError};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-validation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CvStrategy {
    /// Contiguous folds over the sample order (shuffled if requested)
    KFold { n_splits: usize, shuffle: bool },
    /// Folds that preserve per-class proportions; requires discrete labels
    StratifiedKFold { n_splits: usize, shuffle: bool },
}

impl CvStrategy {
    /// Plain k-fold without shuffling, the regressor default.
    pub fn k_fold(n_splits: usize) -> Self {
        CvStrategy::KFold { n_splits, shuffle: false }
    }

    /// Stratified k-fold without shuffling, the classifier default.
    pub fn stratified_k_fold(n_splits: usize) -> Self {
        CvStrategy::StratifiedKFold { n_splits, shuffle: false }
    }

    pub fn n_splits(&self) -> usize {
        match self {
            CvStrategy::KFold { n_splits, .. } | CvStrategy::StratifiedKFold { n_splits, .. } => {
                *n_splits
            }
        }
    }

    pub fn is_stratified(&self) -> bool {
        matches!(self, CvStrategy::StratifiedKFold { .. })
    }
}

/// A single train/test split.
#[derive(Debug, Clone)]
pub struct CvSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Generates train/test splits for a strategy.
pub struct CrossValidator {
    strategy: CvStrategy,
    random_state: Option<u64>,
}

impl CrossValidator {
    pub fn new(strategy: CvStrategy) -> Self {
        Self { strategy, random_state: None }
    }

    /// Seed the shuffle for reproducible folds.
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Generate splits. The response is required for stratified folds.
    pub fn split(&self, n_samples: usize, y: Option<&Array1<f64>>) -> Result<Vec<CvSplit>> {
        let n_splits = self.strategy.n_splits();
        if n_splits < 2 {
            return Err(TuneError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < n_splits {
            return Err(TuneError::ValidationError(format!(
                "n_samples ({n_samples}) must be >= n_splits ({n_splits})"
            )));
        }

        match self.strategy {
            CvStrategy::KFold { n_splits, shuffle } => {
                self.k_fold_split(n_samples, n_splits, shuffle)
            }
            CvStrategy::StratifiedKFold { n_splits, shuffle } => {
                let y = y.ok_or_else(|| {
                    TuneError::ValidationError(
                        "stratified k-fold requires the response array".to_string(),
                    )
                })?;
                self.stratified_split(y, n_splits, shuffle)
            }
        }
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    fn k_fold_split(&self, n_samples: usize, n_splits: usize, shuffle: bool) -> Result<Vec<CvSplit>> {
        let mut indices: Vec<usize> = (0..n_samples).collect();
        if shuffle {
            indices.shuffle(&mut self.rng());
        }

        // First (n_samples % n_splits) folds take one extra sample
        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;

        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;
        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();
            splits.push(CvSplit { train_indices, test_indices, fold_idx });
            current += fold_size;
        }
        Ok(splits)
    }

    fn stratified_split(&self, y: &Array1<f64>, n_splits: usize, shuffle: bool) -> Result<Vec<CvSplit>> {
        // Group sample indices by class label; BTreeMap keeps class order
        // stable across runs
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            if (val - val.round()).abs() > 1e-9 {
                return Err(TuneError::ValidationError(format!(
                    "stratified k-fold requires discrete labels, sample {idx} has {val}"
                )));
            }
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        if shuffle {
            let mut rng = self.rng();
            for indices in class_indices.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        // Deal each class round-robin across the folds
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        for indices in class_indices.values() {
            for (i, &idx) in indices.iter().enumerate() {
                folds[i % n_splits].push(idx);
            }
        }

        let mut splits = Vec::with_capacity(n_splits);
        for fold_idx in 0..n_splits {
            let test_indices = folds[fold_idx].clone();
            let train_indices: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != fold_idx)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();
            splits.push(CvSplit { train_indices, test_indices, fold_idx });
        }
        Ok(splits)
    }
}
