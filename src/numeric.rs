//! Numeric helpers shared by the dynamics, reconstruction and distance modules

use nalgebra::{DMatrix, Dyn, SVD, SymmetricEigen};
use rand::Rng;

use crate::error::ExplorerError;

/// Standard normal sample (Box-Muller)
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.r#gen::<f64>();
    let u2: f64 = rng.r#gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Pearson correlation; 0 when either input is constant
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let (mx, my) = (mean(&x[..n]), mean(&y[..n]));
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for i in 0..n {
        let (dx, dy) = (x[i] - mx, y[i] - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= f64::EPSILON || syy <= f64::EPSILON {
        return 0.0;
    }
    sxy / (sxx * syy).sqrt()
}

/// Row means of a variables x observations matrix
pub fn row_means(data: &DMatrix<f64>) -> Vec<f64> {
    data.row_iter().map(|row| row.mean()).collect()
}

/// Biased covariance of the rows of a variables x observations matrix
pub fn covariance_matrix(data: &DMatrix<f64>) -> DMatrix<f64> {
    let n = data.ncols().max(1) as f64;
    let centered = center_rows(data);
    &centered * centered.transpose() / n
}

/// Time-lagged covariance `D[i][j] = cov(x_i(t + 1), x_j(t))`
pub fn lagged_covariance(data: &DMatrix<f64>) -> DMatrix<f64> {
    let steps = data.ncols();
    if steps < 2 {
        return DMatrix::zeros(data.nrows(), data.nrows());
    }
    let centered = center_rows(data);
    let next = centered.columns(1, steps - 1);
    let prev = centered.columns(0, steps - 1);
    next * prev.transpose() / (steps - 1) as f64
}

/// Pearson correlation of the rows; constant rows correlate 0 with everything
/// but keep a unit diagonal
pub fn correlation_matrix(data: &DMatrix<f64>) -> DMatrix<f64> {
    let n = data.nrows();
    let cov = covariance_matrix(data);
    let mut corr = DMatrix::zeros(n, n);
    for i in 0..n {
        corr[(i, i)] = 1.0;
        for j in (i + 1)..n {
            let denom = (cov[(i, i)] * cov[(j, j)]).sqrt();
            let value = if denom > f64::EPSILON {
                (cov[(i, j)] / denom).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            corr[(i, j)] = value;
            corr[(j, i)] = value;
        }
    }
    corr
}

fn center_rows(data: &DMatrix<f64>) -> DMatrix<f64> {
    let means = row_means(data);
    let mut centered = data.clone();
    for (i, m) in means.iter().enumerate() {
        centered.row_mut(i).add_scalar_mut(-m);
    }
    centered
}

/// Iteration cap for the SVD, symmetric eigen and Schur solvers
pub const MAX_DECOMPOSITION_ITERATIONS: usize = 50_000;

/// Rejects matrices holding NaN or infinite entries before they reach an
/// iterative solver
pub fn ensure_finite(matrix: &DMatrix<f64>, what: &str) -> Result<(), ExplorerError> {
    if matrix.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ExplorerError::Computation(format!("{} has non-finite entries", what)))
    }
}

/// Moore-Penrose pseudo-inverse
pub fn pseudo_inverse(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, ExplorerError> {
    ensure_finite(matrix, "pseudo-inverse input")?;
    SVD::try_new(matrix.clone(), true, true, f64::EPSILON, MAX_DECOMPOSITION_ITERATIONS)
        .ok_or_else(|| {
            ExplorerError::Computation("singular value decomposition did not converge".to_string())
        })?
        .pseudo_inverse(1e-10)
        .map_err(|e| ExplorerError::Computation(format!("pseudo-inverse failed: {}", e)))
}

/// Eigen decomposition of a symmetric matrix
pub fn symmetric_eigen(matrix: &DMatrix<f64>) -> Result<SymmetricEigen<f64, Dyn>, ExplorerError> {
    ensure_finite(matrix, "eigen decomposition input")?;
    SymmetricEigen::try_new(matrix.clone(), f64::EPSILON, MAX_DECOMPOSITION_ITERATIONS)
        .ok_or_else(|| ExplorerError::Computation("eigen decomposition did not converge".to_string()))
}

/// Eigenvalues of a symmetric matrix, ascending
pub fn symmetric_eigenvalues(matrix: &DMatrix<f64>) -> Result<Vec<f64>, ExplorerError> {
    if matrix.nrows() == 0 {
        return Ok(Vec::new());
    }
    let mut values: Vec<f64> = symmetric_eigen(matrix)?.eigenvalues.iter().copied().collect();
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// Applies `f` to the spectrum of a symmetric matrix: `V f(L) V^T`
pub fn symmetric_function(
    matrix: &DMatrix<f64>,
    f: impl Fn(f64) -> f64,
) -> Result<DMatrix<f64>, ExplorerError> {
    if matrix.nrows() == 0 {
        return Ok(matrix.clone());
    }
    let eigen = symmetric_eigen(matrix)?;
    let mapped = DMatrix::from_diagonal(&eigen.eigenvalues.map(f));
    Ok(&eigen.eigenvectors * mapped * eigen.eigenvectors.transpose())
}

/// Normalizes non-negative weights into a probability vector
pub fn normalize(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![0.0; weights.len()];
    }
    weights.iter().map(|w| w / total).collect()
}

/// Shannon entropy in bits
pub fn entropy(p: &[f64]) -> f64 {
    p.iter()
        .filter(|&&v| v > 0.0)
        .map(|&v| -v * v.log2())
        .sum()
}

/// Jensen-Shannon divergence in bits; shorter input is zero-padded
pub fn jensen_shannon(p: &[f64], q: &[f64]) -> f64 {
    let len = p.len().max(q.len());
    let at = |v: &[f64], i: usize| v.get(i).copied().unwrap_or(0.0);
    let m: Vec<f64> = (0..len).map(|i| 0.5 * (at(p, i) + at(q, i))).collect();
    let divergence = entropy(&m) - 0.5 * (entropy(p) + entropy(q));
    divergence.max(0.0)
}

/// Expectation of `f(x)` for `x ~ N(0, 1)` by trapezoid quadrature on [-8, 8]
pub fn gaussian_expectation(f: impl Fn(f64) -> f64) -> f64 {
    const POINTS: usize = 401;
    const LIMIT: f64 = 8.0;
    let step = 2.0 * LIMIT / (POINTS - 1) as f64;
    let norm = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
    let mut total = 0.0;
    for k in 0..POINTS {
        let x = -LIMIT + k as f64 * step;
        let weight = if k == 0 || k == POINTS - 1 { 0.5 } else { 1.0 };
        total += weight * norm * (-0.5 * x * x).exp() * f(x);
    }
    total * step
}

/// Root of an increasing function on `[lo, hi]` by bisection
pub fn bisect(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if f(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
