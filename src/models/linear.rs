//! Linear model implementations

use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve the symmetric positive-definite system `a * x = b` by Cholesky
/// factorization, retrying once with a ridge on the diagonal when the
/// matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    fn factor_and_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
        let n = a.nrows();
        let mut l = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
                if i == j {
                    let diag = a[[i, i]] - sum;
                    if diag <= 0.0 {
                        return None;
                    }
                    l[[i, j]] = diag.sqrt();
                } else {
                    l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
                }
            }
        }

        // L y = b, then L^T x = y
        let mut y = Array1::<f64>::zeros(n);
        for i in 0..n {
            let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
            y[i] = (b[i] - sum) / l[[i, i]];
        }
        let mut x = Array1::<f64>::zeros(n);
        for i in (0..n).rev() {
            let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
            x[i] = (y[i] - sum) / l[[i, i]];
        }
        Some(x)
    }

    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }
    if let Some(x) = factor_and_solve(a, b) {
        return Some(x);
    }
    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
    let mut a_reg = a.clone();
    for k in 0..n {
        a_reg[[k, k]] += ridge.max(1e-12);
    }
    factor_and_solve(&a_reg, b)
}

/// Gaussian-elimination solve with partial pivoting, the fallback for
/// systems Cholesky rejects.
fn gaussian_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut aug = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if aug[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for j in 0..=n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[pivot, j]];
                aug[[pivot, j]] = tmp;
            }
        }
        for row in col + 1..n {
            let factor = aug[[row, col]] / aug[[col, col]];
            for j in col..=n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| aug[[i, j]] * x[j]).sum();
        x[i] = (aug[[i, n]] - sum) / aug[[i, i]];
    }
    Some(x)
}

/// Least squares via the normal equations, optionally sample-weighted.
fn solve_least_squares(
    x: &Array2<f64>,
    y: &Array1<f64>,
    sample_weight: Option<&[f64]>,
) -> Result<Array1<f64>> {
    let (xtx, xty) = match sample_weight {
        None => (x.t().dot(x), x.t().dot(y)),
        Some(w) => {
            // X^T W X and X^T W y without materializing W
            let mut xw = x.clone();
            for (mut row, &wi) in xw.axis_iter_mut(Axis(0)).zip(w.iter()) {
                row *= wi;
            }
            (x.t().dot(&xw), xw.t().dot(y))
        }
    };

    cholesky_solve(&xtx, &xty)
        .or_else(|| gaussian_solve(&xtx, &xty))
        .ok_or_else(|| TuneError::InvalidInput("singular design matrix".to_string()))
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

/// Ordinary least squares regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients, in input units
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: f64,
    /// Whether to fit an intercept
    pub fit_intercept: bool,
    /// Standardize features to unit variance before solving
    pub normalize: bool,
    pub is_fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            fit_intercept: true,
            normalize: false,
            is_fitted: false,
        }
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
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
        check_shapes(x, y)?;
        check_weights(x.nrows(), sample_weight)?;

        let mut x_work = x.clone();
        let mut y_work = y.clone();

        let (x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .ok_or_else(|| TuneError::InvalidInput("empty covariate matrix".to_string()))?;
            let y_mean = y.mean().unwrap_or(0.0);
            x_work -= &x_mean.clone().insert_axis(Axis(0));
            y_work -= y_mean;
            (x_mean, y_mean)
        } else {
            (Array1::zeros(x.ncols()), 0.0)
        };

        // Unit-variance scaling, undone on the coefficients afterwards so
        // they stay in input units
        let scales = if self.normalize {
            let scales: Array1<f64> = x_work
                .axis_iter(Axis(1))
                .map(|col| {
                    let var = col.iter().map(|v| v * v).sum::<f64>() / col.len().max(1) as f64;
                    let s = var.sqrt();
                    if s > 1e-12 {
                        s
                    } else {
                        1.0
                    }
                })
                .collect();
            for (mut col, &s) in x_work.axis_iter_mut(Axis(1)).zip(scales.iter()) {
                col /= s;
            }
            Some(scales)
        } else {
            None
        };

        let mut coef = solve_least_squares(&x_work, &y_work, sample_weight)?;
        if let Some(scales) = scales {
            coef /= &scales;
        }

        self.intercept = if self.fit_intercept {
            y_mean - x_mean.dot(&coef)
        } else {
            0.0
        };
        self.coefficients = Some(coef);
        self.is_fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coef = self.coefficients.as_ref().ok_or(TuneError::ModelNotFitted)?;
        if x.ncols() != coef.len() {
            return Err(TuneError::ShapeError {
                expected: format!("{} features", coef.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(coef) + self.intercept)
    }
}

/// Binary logistic regression fitted by gradient descent on the
/// L2-regularized log loss (regularization strength 1/C).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// Inverse regularization strength
    pub c: f64,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    pub fit_intercept: bool,
    pub max_iter: usize,
    pub learning_rate: f64,
    /// The two class labels, sorted
    classes: Vec<f64>,
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            c: 1.0,
            tol: 1e-4,
            fit_intercept: true,
            max_iter: 1000,
            learning_rate: 0.1,
            classes: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
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

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
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
        check_shapes(x, y)?;
        check_weights(x.nrows(), sample_weight)?;
        if self.c <= 0.0 {
            return Err(TuneError::InvalidInput(format!(
                "C must be positive, got {}",
                self.c
            )));
        }

        let mut classes: Vec<f64> = y.to_vec();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        if classes.len() != 2 {
            return Err(TuneError::InvalidInput(format!(
                "logistic regression requires exactly 2 classes, got {}",
                classes.len()
            )));
        }
        self.classes = classes;

        let n = x.nrows() as f64;
        // Targets in {0, 1} by class order
        let t: Array1<f64> = y
            .iter()
            .map(|&v| if (v - self.classes[1]).abs() < 1e-9 { 1.0 } else { 0.0 })
            .collect();

        let lambda = 1.0 / (self.c * n);
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0f64;

        for _ in 0..self.max_iter {
            let z = x.dot(&w) + b;
            let p = z.mapv(Self::sigmoid);
            let mut residual = &p - &t;
            if let Some(sw) = sample_weight {
                for (r, &wi) in residual.iter_mut().zip(sw.iter()) {
                    *r *= wi;
                }
            }

            let mut grad_w = x.t().dot(&residual) / n;
            grad_w += &(w.mapv(|v| v * lambda));
            let grad_b = if self.fit_intercept { residual.sum() / n } else { 0.0 };

            w -= &(grad_w.mapv(|v| v * self.learning_rate));
            b -= self.learning_rate * grad_b;

            let grad_norm = grad_w.iter().map(|g| g * g).sum::<f64>().sqrt() + grad_b.abs();
            if grad_norm < self.tol {
                break;
            }
        }

        self.coefficients = Some(w);
        self.intercept = b;
        self.is_fitted = true;
        Ok(())
    }

    /// Probability of each class, columns ordered by sorted class label.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let coef = self.coefficients.as_ref().ok_or(TuneError::ModelNotFitted)?;
        let z = x.dot(coef) + self.intercept;
        let mut proba = Array2::<f64>::zeros((x.nrows(), 2));
        for (i, &zi) in z.iter().enumerate() {
            let p1 = Self::sigmoid(zi);
            proba[[i, 0]] = 1.0 - p1;
            proba[[i, 1]] = p1;
        }
        Ok(proba)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .column(1)
            .iter()
            .map(|&p| if p >= 0.5 { self.classes[1] } else { self.classes[0] })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_exact_line() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0]; // y = 2x + 1

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-6, "slope {}", coef[0]);
        assert!((model.intercept - 1.0).abs() < 1e-6, "intercept {}", model.intercept);

        let pred = model.predict(&array![[5.0]]).unwrap();
        assert!((pred[0] - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_regression_no_intercept() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];
        let mut model = LinearRegression::new().with_fit_intercept(false);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.intercept, 0.0);
        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_regression_normalize_same_fit() {
        let x = array![[1.0, 100.0], [2.0, 250.0], [3.0, 175.0], [4.0, 300.0]];
        let y = array![1.0, 2.5, 2.0, 3.5];

        let mut plain = LinearRegression::new();
        plain.fit(&x, &y).unwrap();
        let mut scaled = LinearRegression::new().with_normalize(true);
        scaled.fit(&x, &y).unwrap();

        // Coefficients come back in input units either way
        let a = plain.predict(&x).unwrap();
        let b = scaled.predict(&x).unwrap();
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert!((pa - pb).abs() < 1e-6);
        }
    }

    #[test]
    fn test_logistic_separable() {
        let x = array![[0.0], [0.5], [1.0], [4.0], [4.5], [5.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new().with_max_iter(2000);
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert_eq!(p, t);
        }

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[[0, 1]] < 0.5);
        assert!(proba[[5, 1]] > 0.5);
        for i in 0..6 {
            assert!((proba[[i, 0]] + proba[[i, 1]] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_logistic_rejects_multiclass() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.0, 1.0, 2.0];
        let mut model = LogisticRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_logistic_rejects_nonpositive_c() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];
        let mut model = LogisticRegression::new().with_c(0.0);
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LinearRegression::new();
        assert!(model.predict(&array![[1.0]]).is_err());
    }
}
