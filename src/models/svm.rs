//! Support vector machine implementations
//!
//! `Svc` uses a simplified SMO solver over the kernel matrix; `Svr` fits a
//! kernelized coefficient vector by subgradient descent on the
//! epsilon-insensitive loss. The linear variants solve the primal directly.

use crate::error::{Result, TuneError};
use crate::models::ClassWeight;
use ndarray::{Array1, Array2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Kernel function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
    Poly { gamma: f64, degree: u32, coef0: f64 },
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Kernel {
    pub fn compute(&self, a: &[f64], b: &[f64]) -> f64 {
        let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        match *self {
            Kernel::Linear => dot,
            Kernel::Rbf { gamma } => {
                let sq_dist: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * sq_dist).exp()
            }
            Kernel::Poly { gamma, degree, coef0 } => (gamma * dot + coef0).powi(degree as i32),
            Kernel::Sigmoid { gamma, coef0 } => (gamma * dot + coef0).tanh(),
        }
    }

    fn validate(&self) -> Result<()> {
        let gamma = match *self {
            Kernel::Linear => return Ok(()),
            Kernel::Rbf { gamma } => gamma,
            Kernel::Poly { gamma, .. } => gamma,
            Kernel::Sigmoid { gamma, .. } => gamma,
        };
        if gamma <= 0.0 {
            return Err(TuneError::InvalidInput(format!(
                "kernel gamma must be positive, got {gamma}"
            )));
        }
        Ok(())
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::Rbf { gamma: 1.0 }
    }
}

/// Classification loss for the linear SVM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HingeLoss {
    Hinge,
    SquaredHinge,
}

/// Regression loss for the linear SVM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EpsilonLoss {
    EpsilonInsensitive,
    SquaredEpsilonInsensitive,
}

fn check_c(c: f64) -> Result<()> {
    if c <= 0.0 {
        return Err(TuneError::InvalidInput(format!("C must be positive, got {c}")));
    }
    Ok(())
}

fn check_weights(n: usize, sample_weight: Option<&[f64]>) -> Result<()> {
    if let Some(w) = sample_weight {
        if w.len() != n {
            return Err(TuneError::ShapeError {
                expected: format!("sample_weight length = {n}"),
                actual: format!("sample_weight length = {}", w.len()),
            });
        }
    }
    Ok(())
}

fn binary_classes(y: &Array1<f64>) -> Result<Vec<f64>> {
    let mut classes: Vec<f64> = y.to_vec();
    classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    classes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    if classes.len() != 2 {
        return Err(TuneError::InvalidInput(format!(
            "support vector classification requires exactly 2 classes, got {}",
            classes.len()
        )));
    }
    Ok(classes)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Linear support vector classifier, primal subgradient descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    pub c: f64,
    pub loss: HingeLoss,
    pub tol: f64,
    pub fit_intercept: bool,
    pub max_iter: usize,
    pub learning_rate: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
    classes: Vec<f64>,
}

impl Default for LinearSvc {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSvc {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            loss: HingeLoss::SquaredHinge,
            tol: 1e-4,
            fit_intercept: true,
            max_iter: 1000,
            learning_rate: 0.1,
            weights: None,
            bias: 0.0,
            classes: Vec::new(),
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_loss(mut self, loss: HingeLoss) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
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
        check_c(self.c)?;
        if x.nrows() != y.len() {
            return Err(TuneError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        check_weights(x.nrows(), sample_weight)?;
        self.classes = binary_classes(y)?;

        let n = x.nrows();
        let signs: Vec<f64> = y
            .iter()
            .map(|&v| if (v - self.classes[1]).abs() < 1e-9 { 1.0 } else { -1.0 })
            .collect();

        let lambda = 1.0 / (self.c * n as f64);
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0f64;

        for _ in 0..self.max_iter {
            let mut grad_w = w.mapv(|v| v * lambda);
            let mut grad_b = 0.0;

            for i in 0..n {
                let margin = signs[i] * (x.row(i).dot(&w) + b);
                let sw = sample_weight.map_or(1.0, |ws| ws[i]);
                let pull = match self.loss {
                    HingeLoss::Hinge => {
                        if margin < 1.0 {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    HingeLoss::SquaredHinge => {
                        if margin < 1.0 {
                            2.0 * (1.0 - margin)
                        } else {
                            0.0
                        }
                    }
                };
                if pull > 0.0 {
                    let factor = sw * pull * signs[i] / n as f64;
                    grad_w.scaled_add(-factor, &x.row(i));
                    if self.fit_intercept {
                        grad_b -= factor;
                    }
                }
            }

            w.scaled_add(-self.learning_rate, &grad_w);
            b -= self.learning_rate * grad_b;

            let grad_norm = grad_w.iter().map(|g| g * g).sum::<f64>().sqrt() + grad_b.abs();
            if grad_norm < self.tol {
                break;
            }
        }

        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.weights.as_ref().ok_or(TuneError::ModelNotFitted)?;
        Ok(x.dot(w) + self.bias)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let decision = self.decision_function(x)?;
        Ok(decision
            .iter()
            .map(|&d| if d >= 0.0 { self.classes[1] } else { self.classes[0] })
            .collect())
    }

    /// Sigmoid-squashed decision values; not calibrated probabilities.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let decision = self.decision_function(x)?;
        let mut proba = Array2::<f64>::zeros((x.nrows(), 2));
        for (i, &d) in decision.iter().enumerate() {
            let p = sigmoid(d);
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }
}

/// Linear support vector regressor, primal subgradient descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvr {
    pub c: f64,
    pub loss: EpsilonLoss,
    pub epsilon: f64,
    pub tol: f64,
    pub fit_intercept: bool,
    pub max_iter: usize,
    pub learning_rate: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl Default for LinearSvr {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSvr {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            loss: EpsilonLoss::EpsilonInsensitive,
            epsilon: 0.0,
            tol: 1e-4,
            fit_intercept: true,
            max_iter: 1000,
            learning_rate: 0.01,
            weights: None,
            bias: 0.0,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_loss(mut self, loss: EpsilonLoss) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
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
        check_c(self.c)?;
        if self.epsilon < 0.0 {
            return Err(TuneError::InvalidInput(format!(
                "epsilon must be >= 0, got {}",
                self.epsilon
            )));
        }
        if x.nrows() != y.len() {
            return Err(TuneError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        check_weights(x.nrows(), sample_weight)?;

        let n = x.nrows();
        let lambda = 1.0 / (self.c * n as f64);
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0f64;

        for _ in 0..self.max_iter {
            let mut grad_w = w.mapv(|v| v * lambda);
            let mut grad_b = 0.0;

            for i in 0..n {
                let residual = x.row(i).dot(&w) + b - y[i];
                let excess = residual.abs() - self.epsilon;
                if excess <= 0.0 {
                    continue;
                }
                let sw = sample_weight.map_or(1.0, |ws| ws[i]);
                let pull = match self.loss {
                    EpsilonLoss::EpsilonInsensitive => residual.signum(),
                    EpsilonLoss::SquaredEpsilonInsensitive => 2.0 * excess * residual.signum(),
                };
                let factor = sw * pull / n as f64;
                grad_w.scaled_add(factor, &x.row(i));
                if self.fit_intercept {
                    grad_b += factor;
                }
            }

            w.scaled_add(-self.learning_rate, &grad_w);
            b -= self.learning_rate * grad_b;

            let grad_norm = grad_w.iter().map(|g| g * g).sum::<f64>().sqrt() + grad_b.abs();
            if grad_norm < self.tol {
                break;
            }
        }

        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.weights.as_ref().ok_or(TuneError::ModelNotFitted)?;
        Ok(x.dot(w) + self.bias)
    }
}

/// Kernel support vector classifier, binary, simplified SMO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Svc {
    pub c: f64,
    pub kernel: Kernel,
    pub tol: f64,
    pub max_iter: usize,
    pub random_state: Option<u64>,
    /// Per-class scaling of the penalty C
    pub class_weight: ClassWeight,
    support_vectors: Option<Array2<f64>>,
    alphas: Vec<f64>,
    support_signs: Vec<f64>,
    bias: f64,
    classes: Vec<f64>,
}

impl Default for Svc {
    fn default() -> Self {
        Self::new()
    }
}

impl Svc {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            kernel: Kernel::default(),
            tol: 1e-3,
            max_iter: 100,
            random_state: Some(42),
            class_weight: ClassWeight::Uniform,
            support_vectors: None,
            alphas: Vec::new(),
            support_signs: Vec::new(),
            bias: 0.0,
            classes: Vec::new(),
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
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

    /// Per-sample penalty cap: C scaled by the sample's class weight.
    fn penalty_caps(&self, y: &Array1<f64>) -> Result<Vec<f64>> {
        match &self.class_weight {
            ClassWeight::Uniform => Ok(vec![self.c; y.len()]),
            ClassWeight::Balanced => {
                let n = y.len() as f64;
                let k = self.classes.len() as f64;
                Ok(y.iter()
                    .map(|&v| {
                        let count = y.iter().filter(|&&u| (u - v).abs() < 1e-9).count() as f64;
                        self.c * n / (k * count)
                    })
                    .collect())
            }
            ClassWeight::Custom(pairs) => y
                .iter()
                .map(|&v| {
                    pairs
                        .iter()
                        .find(|(label, _)| (label - v).abs() < 1e-9)
                        .map(|(_, w)| self.c * w)
                        .ok_or_else(|| {
                            TuneError::InvalidInput(format!(
                                "class_weight has no entry for label {v}"
                            ))
                        })
                })
                .collect(),
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_c(self.c)?;
        self.kernel.validate()?;
        if x.nrows() != y.len() {
            return Err(TuneError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        self.classes = binary_classes(y)?;

        let n = x.nrows();
        let signs: Vec<f64> = y
            .iter()
            .map(|&v| if (v - self.classes[1]).abs() < 1e-9 { 1.0 } else { -1.0 })
            .collect();
        let caps = self.penalty_caps(y)?;

        // Precompute the kernel matrix; datasets at tuning scale fit in memory
        let rows: Vec<Vec<f64>> = (0..n).map(|i| x.row(i).to_vec()).collect();
        let mut k = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let v = self.kernel.compute(&rows[i], &rows[j]);
                k[[i, j]] = v;
                k[[j, i]] = v;
            }
        }

        let mut alphas = vec![0.0f64; n];
        let mut b = 0.0f64;
        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let decision = |alphas: &[f64], b: f64, k: &Array2<f64>, idx: usize| -> f64 {
            let mut sum = b;
            for j in 0..n {
                if alphas[j] > 0.0 {
                    sum += alphas[j] * signs[j] * k[[j, idx]];
                }
            }
            sum
        };

        // Simplified SMO: sweep samples, pair each KKT violator with a
        // random partner, solve the two-variable subproblem analytically.
        // Stops after three consecutive quiet sweeps, or max_iter sweeps total.
        let mut quiet_passes = 0;
        let mut total_passes = 0;
        while quiet_passes < 3 && total_passes < self.max_iter {
            total_passes += 1;
            let mut changed = 0;
            for i in 0..n {
                let e_i = decision(&alphas, b, &k, i) - signs[i];
                let violates = (signs[i] * e_i < -self.tol && alphas[i] < caps[i])
                    || (signs[i] * e_i > self.tol && alphas[i] > 0.0);
                if !violates {
                    continue;
                }

                let mut j = rng.gen_range(0..n - 1);
                if j >= i {
                    j += 1;
                }
                let e_j = decision(&alphas, b, &k, j) - signs[j];

                let (alpha_i_old, alpha_j_old) = (alphas[i], alphas[j]);
                let (lo, hi) = if (signs[i] - signs[j]).abs() > 1e-12 {
                    (
                        (alpha_j_old - alpha_i_old).max(0.0),
                        (caps[i] + alpha_j_old - alpha_i_old).min(caps[j]),
                    )
                } else {
                    (
                        (alpha_i_old + alpha_j_old - caps[i]).max(0.0),
                        (alpha_i_old + alpha_j_old).min(caps[j]),
                    )
                };
                if (hi - lo).abs() < 1e-12 || hi < lo {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                let mut alpha_j = alpha_j_old - signs[j] * (e_i - e_j) / eta;
                alpha_j = alpha_j.clamp(lo, hi);
                if (alpha_j - alpha_j_old).abs() < 1e-7 {
                    continue;
                }
                let alpha_i = alpha_i_old + signs[i] * signs[j] * (alpha_j_old - alpha_j);

                let b1 = b - e_i
                    - signs[i] * (alpha_i - alpha_i_old) * k[[i, i]]
                    - signs[j] * (alpha_j - alpha_j_old) * k[[i, j]];
                let b2 = b - e_j
                    - signs[i] * (alpha_i - alpha_i_old) * k[[i, j]]
                    - signs[j] * (alpha_j - alpha_j_old) * k[[j, j]];
                b = if alpha_i > 0.0 && alpha_i < caps[i] {
                    b1
                } else if alpha_j > 0.0 && alpha_j < caps[j] {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                alphas[i] = alpha_i;
                alphas[j] = alpha_j;
                changed += 1;
            }

            if changed == 0 {
                quiet_passes += 1;
            } else {
                quiet_passes = 0;
            }
        }

        // Keep only the support vectors
        let support: Vec<usize> = (0..n).filter(|&i| alphas[i] > 1e-8).collect();
        self.support_vectors = Some(x.select(ndarray::Axis(0), &support));
        self.alphas = support.iter().map(|&i| alphas[i]).collect();
        self.support_signs = support.iter().map(|&i| signs[i]).collect();
        self.bias = b;
        Ok(())
    }

    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let sv = self.support_vectors.as_ref().ok_or(TuneError::ModelNotFitted)?;
        Ok((0..x.nrows())
            .map(|i| {
                let xi = x.row(i).to_vec();
                let mut sum = self.bias;
                for (j, (&alpha, &sign)) in
                    self.alphas.iter().zip(self.support_signs.iter()).enumerate()
                {
                    sum += alpha * sign * self.kernel.compute(&sv.row(j).to_vec(), &xi);
                }
                sum
            })
            .collect())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let decision = self.decision_function(x)?;
        Ok(decision
            .iter()
            .map(|&d| if d >= 0.0 { self.classes[1] } else { self.classes[0] })
            .collect())
    }

    /// Sigmoid-squashed decision values; not calibrated probabilities.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let decision = self.decision_function(x)?;
        let mut proba = Array2::<f64>::zeros((x.nrows(), 2));
        for (i, &d) in decision.iter().enumerate() {
            let p = sigmoid(d);
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }
}

/// Kernel support vector regressor: coefficients per training sample,
/// subgradient descent on the epsilon-insensitive loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Svr {
    pub c: f64,
    pub kernel: Kernel,
    pub epsilon: f64,
    pub tol: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    train_x: Option<Array2<f64>>,
    beta: Vec<f64>,
    bias: f64,
}

impl Default for Svr {
    fn default() -> Self {
        Self::new()
    }
}

impl Svr {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            kernel: Kernel::default(),
            epsilon: 0.1,
            tol: 1e-4,
            max_iter: 500,
            learning_rate: 0.01,
            train_x: None,
            beta: Vec::new(),
            bias: 0.0,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_c(self.c)?;
        self.kernel.validate()?;
        if self.epsilon < 0.0 {
            return Err(TuneError::InvalidInput(format!(
                "epsilon must be >= 0, got {}",
                self.epsilon
            )));
        }
        if x.nrows() != y.len() {
            return Err(TuneError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let n = x.nrows();
        let rows: Vec<Vec<f64>> = (0..n).map(|i| x.row(i).to_vec()).collect();
        let mut k = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let v = self.kernel.compute(&rows[i], &rows[j]);
                k[[i, j]] = v;
                k[[j, i]] = v;
            }
        }

        let lambda = 1.0 / (self.c * n as f64);
        let mut beta = vec![0.0f64; n];
        let mut b = y.mean().unwrap_or(0.0);

        for _ in 0..self.max_iter {
            // f(x_i) for the current coefficients
            let f: Vec<f64> = (0..n)
                .map(|i| b + (0..n).map(|j| beta[j] * k[[j, i]]).sum::<f64>())
                .collect();

            let mut grad = vec![0.0f64; n];
            let mut grad_b = 0.0;
            for i in 0..n {
                let residual = f[i] - y[i];
                if residual.abs() > self.epsilon {
                    let pull = residual.signum() / n as f64;
                    for j in 0..n {
                        grad[j] += pull * k[[i, j]];
                    }
                    grad_b += pull;
                }
            }
            for j in 0..n {
                grad[j] += lambda * beta[j];
            }

            let mut grad_norm = grad_b.abs();
            for j in 0..n {
                beta[j] -= self.learning_rate * grad[j];
                grad_norm += grad[j] * grad[j];
            }
            b -= self.learning_rate * grad_b;

            if grad_norm.sqrt() < self.tol {
                break;
            }
        }

        self.train_x = Some(x.clone());
        self.beta = beta;
        self.bias = b;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let train = self.train_x.as_ref().ok_or(TuneError::ModelNotFitted)?;
        Ok((0..x.nrows())
            .map(|i| {
                let xi = x.row(i).to_vec();
                let mut sum = self.bias;
                for (j, &bj) in self.beta.iter().enumerate() {
                    if bj.abs() > 1e-12 {
                        sum += bj * self.kernel.compute(&train.row(j).to_vec(), &xi);
                    }
                }
                sum
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        (
            array![
                [0.0, 0.5],
                [0.5, 0.0],
                [0.3, 0.3],
                [0.1, 0.2],
                [4.0, 4.5],
                [4.5, 4.0],
                [4.2, 4.2],
                [4.4, 4.1],
            ],
            array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_linear_svc_separable() {
        let (x, y) = separable();
        let mut model = LinearSvc::new().with_c(10.0);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_linear_svc_hinge_variant() {
        let (x, y) = separable();
        let mut model = LinearSvc::new().with_loss(HingeLoss::Hinge).with_c(10.0);
        model.fit(&x, &y).unwrap();
        let acc = model
            .predict(&x)
            .unwrap()
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        assert!(acc >= 7);
    }

    #[test]
    fn test_svc_rbf_separable() {
        let (x, y) = separable();
        let mut model = Svc::new().with_kernel(Kernel::Rbf { gamma: 0.5 }).with_c(5.0);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_svc_linear_kernel() {
        let (x, y) = separable();
        let mut model = Svc::new().with_kernel(Kernel::Linear).with_c(5.0);
        model.fit(&x, &y).unwrap();
        let acc = model
            .predict(&x)
            .unwrap()
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        assert!(acc >= 7);
    }

    #[test]
    fn test_svc_proba_monotone_in_decision() {
        let (x, y) = separable();
        let mut model = Svc::new().with_kernel(Kernel::Rbf { gamma: 0.5 });
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        // Positive-class samples get higher positive-class probability
        assert!(proba[[4, 1]] > proba[[0, 1]]);
    }

    #[test]
    fn test_invalid_gamma_rejected() {
        let (x, y) = separable();
        let mut model = Svc::new().with_kernel(Kernel::Rbf { gamma: -1.0 });
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_linear_svr_fits_line() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0];
        let mut model = LinearSvr::new().with_c(100.0).with_epsilon(0.01);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let mae: f64 =
            pred.iter().zip(y.iter()).map(|(p, t)| (p - t).abs()).sum::<f64>() / y.len() as f64;
        assert!(mae < 1.5, "mae {mae}");
    }

    #[test]
    fn test_svr_rbf_nonlinear() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![0.0, 1.0, 4.0, 9.0, 16.0, 25.0];
        let mut model = Svr::new().with_kernel(Kernel::Rbf { gamma: 0.5 }).with_c(100.0);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        // Predictions follow the curve's ordering
        assert!(pred[5] > pred[2]);
        assert!(pred[2] > pred[0]);
    }

    #[test]
    fn test_svc_balanced_class_weight_fits() {
        let x = array![[0.1], [0.2], [0.3], [0.4], [0.5], [5.0], [5.1]];
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];
        let mut model = Svc::new()
            .with_kernel(Kernel::Rbf { gamma: 0.5 })
            .with_class_weight(ClassWeight::Balanced);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&array![[5.05]]).unwrap();
        assert_eq!(pred[0], 1.0);
    }

    #[test]
    fn test_nonpositive_c_rejected() {
        let (x, y) = separable();
        assert!(LinearSvc::new().with_c(-1.0).fit(&x, &y).is_err());
        assert!(Svc::new().with_c(0.0).fit(&x, &y).is_err());
    }
}
