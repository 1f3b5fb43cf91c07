//! Network reconstruction from time series
//!
//! Each method turns an entities x steps series into an N x N score matrix.
//! A [`ThresholdRule`] then keeps the highest-scoring node pairs until the
//! requested average degree is reached. Correlation Spanning Tree is the
//! exception: it builds a tree directly and ignores the degree target.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::error::ExplorerError;
use crate::graph::Graph;
use crate::numeric::{
    bisect, correlation_matrix, covariance_matrix, gaussian_expectation, lagged_covariance,
    pearson, pseudo_inverse, row_means, symmetric_eigen,
};
use crate::registry::ReconstructionKind;
use crate::table::TimeSeries;

const MAGNETIZATION_CAP: f64 = 0.999;
const EXACT_MEAN_FIELD_ITERATIONS: usize = 20;
const MLE_ITERATIONS: usize = 200;
const MLE_RATE: f64 = 1.0;
const CCM_EMBEDDING: usize = 3;
const MI_BINS: usize = 10;
const GLASSO_ALPHA: f64 = 0.01;
const GLASSO_ITERATIONS: usize = 100;
const GLASSO_TOLERANCE: f64 = 1e-4;
const CONVERGENCE_TOLERANCE: f64 = 1e-6;
/// Largest accepted series value; squares and pair products stay finite
const MAX_SERIES_MAGNITUDE: f64 = 1e100;

/// Outcome of a reconstruction request
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    Graph(Graph),
    /// The method is registered but has no implementation
    Placeholder(String),
}

/// Degree-thresholded conversion of a score matrix into a graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    pub avg_degree: f64,
    /// Drop weights (true) or keep them as a `weight` link attribute
    pub binary: bool,
}

impl ThresholdRule {
    /// Binary output targeting `avg_degree`
    pub fn degree(avg_degree: f64) -> Self {
        Self {
            avg_degree,
            binary: true,
        }
    }

    /// Keeps the `round(N * k / 2)` strongest node pairs.
    ///
    /// A pair scores the larger absolute value of its two directed entries;
    /// pairs scoring zero (or non-finite) never become edges. Ties go to the
    /// lower node indices.
    pub fn apply(&self, scores: &DMatrix<f64>) -> Result<Graph, ExplorerError> {
        let n = scores.nrows();
        let mut graph = Graph::with_nodes(n);
        let target = (n as f64 * self.avg_degree / 2.0).round() as usize;

        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let score = scores[(i, j)].abs().max(scores[(j, i)].abs());
                if score.is_finite() && score > 0.0 {
                    pairs.push((score, i, j));
                }
            }
        }
        pairs.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });

        for &(score, i, j) in pairs.iter().take(target) {
            if self.binary {
                graph.add_edge(i, j)?;
            } else {
                let mut attrs = Map::new();
                attrs.insert("weight".to_string(), Value::from(score));
                graph.add_edge_with_attrs(i, j, attrs)?;
            }
        }
        Ok(graph)
    }
}

/// Infers a graph from `ts` with the selected method
pub fn reconstruct<R: Rng + ?Sized>(
    kind: ReconstructionKind,
    ts: &TimeSeries,
    rule: &ThresholdRule,
    rng: &mut R,
) -> Result<Reconstruction, ExplorerError> {
    if !rule.avg_degree.is_finite() || rule.avg_degree < 0.0 {
        return Err(ExplorerError::invalid("avg", "average degree must be a non-negative number"));
    }
    let data = ts.matrix();
    let n = ts.num_entities();
    if data.iter().any(|v| !v.is_finite() || v.abs() > MAX_SERIES_MAGNITUDE) {
        return Err(ExplorerError::invalid(
            "ts",
            format!("series values must be finite and within ±{:e}", MAX_SERIES_MAGNITUDE),
        ));
    }

    let scores = match kind {
        ReconstructionKind::FreeEnergyMinimization => {
            return Ok(Reconstruction::Placeholder(format!(
                "{} reconstruction is not available",
                kind.name()
            )));
        }
        ReconstructionKind::CorrelationSpanningTree => {
            return Ok(Reconstruction::Graph(correlation_spanning_tree(data, rule.binary)?));
        }
        ReconstructionKind::Random => DMatrix::from_fn(n, n, |_, _| rng.r#gen::<f64>()),
        ReconstructionKind::CorrelationMatrix => correlation_matrix(data),
        ReconstructionKind::PartialCorrelationMatrix => partial_correlation(data)?,
        ReconstructionKind::PartialCorrelationInfluence => partial_correlation_influence(data),
        ReconstructionKind::NaiveMeanField => {
            require_steps(ts, 2, kind)?;
            mean_field(data, false)?
        }
        ReconstructionKind::ExactMeanField => {
            require_steps(ts, 2, kind)?;
            mean_field(data, true)?
        }
        ReconstructionKind::ThoulessAndersonPalmer => {
            require_steps(ts, 2, kind)?;
            thouless_anderson_palmer(data)?
        }
        ReconstructionKind::MaximumLikelihoodEstimation => {
            require_steps(ts, 2, kind)?;
            maximum_likelihood(data)
        }
        ReconstructionKind::ConvergentCrossMapping => {
            require_steps(ts, CCM_EMBEDDING + 2, kind)?;
            convergent_cross_mapping(data)
        }
        ReconstructionKind::MutualInformationMatrix => mutual_information(data),
        ReconstructionKind::OuInference => {
            require_steps(ts, 2, kind)?;
            ou_inference(data)?
        }
        ReconstructionKind::GraphicalLasso => graphical_lasso(data),
        ReconstructionKind::MarchenkoPastur => marchenko_pastur(data)?,
        ReconstructionKind::TimeGrangerCausality => {
            require_steps(ts, 4, kind)?;
            granger_causality(data)?
        }
    };

    Ok(Reconstruction::Graph(rule.apply(&scores)?))
}

fn require_steps(ts: &TimeSeries, min: usize, kind: ReconstructionKind) -> Result<(), ExplorerError> {
    if ts.num_steps() < min {
        return Err(ExplorerError::invalid(
            "ts",
            format!("{} needs at least {} time steps, got {}", kind.name(), min, ts.num_steps()),
        ));
    }
    Ok(())
}

fn series_rows(data: &DMatrix<f64>) -> Vec<Vec<f64>> {
    data.row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

/// `-P_ij / sqrt(P_ii P_jj)` for a precision-like matrix `P`
fn precision_to_partial(precision: &DMatrix<f64>) -> DMatrix<f64> {
    let n = precision.nrows();
    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            return 0.0;
        }
        let denom = precision[(i, i)] * precision[(j, j)];
        if denom > f64::EPSILON {
            -precision[(i, j)] / denom.sqrt()
        } else {
            0.0
        }
    })
}

fn partial_correlation(data: &DMatrix<f64>) -> Result<DMatrix<f64>, ExplorerError> {
    let precision = pseudo_inverse(&correlation_matrix(data))?;
    Ok(precision_to_partial(&precision))
}

/// Correlation of `i` and `j` controlling for `k`
fn first_order_partial(corr: &DMatrix<f64>, i: usize, j: usize, k: usize) -> f64 {
    let denom = ((1.0 - corr[(i, k)].powi(2)) * (1.0 - corr[(j, k)].powi(2))).sqrt();
    if denom > 1e-12 {
        (corr[(i, j)] - corr[(i, k)] * corr[(j, k)]) / denom
    } else {
        0.0
    }
}

/// Entry `(k, i)` is the mean drop in `i`'s correlations once `k` is
/// controlled for
fn partial_correlation_influence(data: &DMatrix<f64>) -> DMatrix<f64> {
    let corr = correlation_matrix(data);
    let n = corr.nrows();
    let mut influence: DMatrix<f64> = DMatrix::zeros(n, n);
    if n < 3 {
        return influence;
    }
    for i in 0..n {
        for k in (0..n).filter(|&k| k != i) {
            let total: f64 = (0..n)
                .filter(|&j| j != i && j != k)
                .map(|j| corr[(i, j)] - first_order_partial(&corr, i, j, k))
                .sum();
            influence[(k, i)] = total / (n - 2) as f64;
        }
    }
    influence
}

/// Equal-time and one-step statistics of a kinetic Ising series
struct IsingStatistics {
    magnetization: Vec<f64>,
    covariance: DMatrix<f64>,
    /// `D C^+`: lagged covariance times the pseudo-inverse covariance
    response: DMatrix<f64>,
}

impl IsingStatistics {
    fn from_series(data: &DMatrix<f64>) -> Result<Self, ExplorerError> {
        let magnetization = row_means(data)
            .into_iter()
            .map(|m| m.clamp(-MAGNETIZATION_CAP, MAGNETIZATION_CAP))
            .collect();
        let covariance = covariance_matrix(data);
        let response = lagged_covariance(data) * pseudo_inverse(&covariance)?;
        Ok(Self {
            magnetization,
            covariance,
            response,
        })
    }

    fn naive_couplings(&self) -> DMatrix<f64> {
        let n = self.response.nrows();
        DMatrix::from_fn(n, n, |i, j| {
            self.response[(i, j)] / (1.0 - self.magnetization[i].powi(2))
        })
    }
}

/// Kinetic Ising couplings by mean-field inversion; `exact` solves the
/// self-consistent Gaussian-field correction
fn mean_field(data: &DMatrix<f64>, exact: bool) -> Result<DMatrix<f64>, ExplorerError> {
    let stats = IsingStatistics::from_series(data)?;
    let mut couplings = stats.naive_couplings();
    if !exact {
        return Ok(couplings);
    }

    let n = couplings.nrows();
    for _ in 0..EXACT_MEAN_FIELD_ITERATIONS {
        let spread = &couplings * &stats.covariance * couplings.transpose();
        let mut updated = couplings.clone();
        for i in 0..n {
            let width = spread[(i, i)].max(0.0).sqrt();
            let m = stats.magnetization[i];
            let field = bisect(
                |h| gaussian_expectation(|x| (h + x * width).tanh()) - m,
                -20.0,
                20.0,
            );
            let slope = gaussian_expectation(|x| 1.0 - (field + x * width).tanh().powi(2)).max(1e-6);
            for j in 0..n {
                updated[(i, j)] = stats.response[(i, j)] / slope;
            }
        }
        let change = (&updated - &couplings).abs().max();
        couplings = updated;
        if change < CONVERGENCE_TOLERANCE {
            break;
        }
    }
    Ok(couplings)
}

/// Naive mean-field couplings with the TAP reaction-term correction
fn thouless_anderson_palmer(data: &DMatrix<f64>) -> Result<DMatrix<f64>, ExplorerError> {
    let stats = IsingStatistics::from_series(data)?;
    let naive = stats.naive_couplings();
    let n = naive.nrows();
    let mut couplings = naive.clone();
    for i in 0..n {
        let susceptibility: f64 = (0..n)
            .map(|j| naive[(i, j)].powi(2) * (1.0 - stats.magnetization[j].powi(2)))
            .sum();
        let target = (1.0 - stats.magnetization[i].powi(2)).powi(2) * susceptibility;
        // f (1 - f)^2 peaks at 4/27 on [0, 1/3]
        let correction = if target >= 4.0 / 27.0 {
            1.0 / 3.0
        } else {
            bisect(|f| f * (1.0 - f).powi(2) - target, 0.0, 1.0 / 3.0)
        };
        for j in 0..n {
            couplings[(i, j)] = naive[(i, j)] / (1.0 - correction);
        }
    }
    Ok(couplings)
}

/// Gradient ascent on the kinetic Ising log-likelihood
fn maximum_likelihood(data: &DMatrix<f64>) -> DMatrix<f64> {
    let (n, steps) = data.shape();
    let prev = data.columns(0, steps - 1).into_owned();
    let next = data.columns(1, steps - 1).into_owned();
    let samples = (steps - 1) as f64;

    let mut couplings: DMatrix<f64> = DMatrix::zeros(n, n);
    for _ in 0..MLE_ITERATIONS {
        let predicted = (&couplings * &prev).map(f64::tanh);
        let gradient = (&next - predicted) * prev.transpose() / samples;
        couplings += &gradient * MLE_RATE;
        if gradient.abs().max() < CONVERGENCE_TOLERANCE {
            break;
        }
    }
    couplings
}

/// For every point of the delay embedding of `series`, its `E + 1` nearest
/// neighbors as `(time index, weight)`
fn shadow_neighbors(series: &[f64]) -> Vec<Vec<(usize, f64)>> {
    let e = CCM_EMBEDDING;
    let times: Vec<usize> = ((e - 1)..series.len()).collect();
    let embed = |t: usize| -> Vec<f64> { (0..e).map(|lag| series[t - lag]).collect() };
    let points: Vec<Vec<f64>> = times.iter().map(|&t| embed(t)).collect();
    let k = (e + 1).min(points.len() - 1);

    points
        .iter()
        .enumerate()
        .map(|(p, point)| {
            let mut candidates: Vec<(f64, usize)> = points
                .iter()
                .enumerate()
                .filter(|(q, _)| *q != p)
                .map(|(q, other)| {
                    let d2: f64 = point.iter().zip(other).map(|(a, b)| (a - b).powi(2)).sum();
                    (d2.sqrt(), q)
                })
                .collect();
            if candidates.len() > k {
                candidates.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                candidates.truncate(k);
            }
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let nearest = candidates.first().map_or(0.0, |c| c.0);
            let raw: Vec<f64> = candidates
                .iter()
                .map(|&(d, _)| {
                    if nearest > 0.0 {
                        (-d / nearest).exp()
                    } else if d == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect();
            let total: f64 = raw.iter().sum();
            candidates
                .iter()
                .zip(raw)
                .map(|(&(_, q), w)| (times[q], if total > 0.0 { w / total } else { 0.0 }))
                .collect()
        })
        .collect()
}

/// Entry `(i, j)` is the skill of recovering `i` from `j`'s shadow manifold,
/// i.e. evidence that `i` drives `j`
fn convergent_cross_mapping(data: &DMatrix<f64>) -> DMatrix<f64> {
    let series = series_rows(data);
    let n = series.len();
    let offset = CCM_EMBEDDING - 1;
    let tables: Vec<Vec<Vec<(usize, f64)>>> =
        series.par_iter().map(|s| shadow_neighbors(s)).collect();

    let mut scores: DMatrix<f64> = DMatrix::zeros(n, n);
    for j in 0..n {
        for i in (0..n).filter(|&i| i != j) {
            let actual = &series[i][offset..];
            let predicted: Vec<f64> = tables[j]
                .iter()
                .map(|neighbors| neighbors.iter().map(|&(t, w)| w * series[i][t]).sum())
                .collect();
            scores[(i, j)] = pearson(&predicted, actual).max(0.0);
        }
    }
    scores
}

fn bin_series(values: &[f64]) -> Vec<usize> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = hi - lo;
    values
        .iter()
        .map(|&v| {
            if width <= f64::EPSILON {
                0
            } else {
                (((v - lo) / width * MI_BINS as f64) as usize).min(MI_BINS - 1)
            }
        })
        .collect()
}

/// Mutual information (nats) of two binned series
fn binned_mutual_information(a: &[usize], b: &[usize]) -> f64 {
    let samples = a.len() as f64;
    let mut joint = vec![0.0; MI_BINS * MI_BINS];
    let mut pa = vec![0.0; MI_BINS];
    let mut pb = vec![0.0; MI_BINS];
    for (&x, &y) in a.iter().zip(b) {
        joint[x * MI_BINS + y] += 1.0 / samples;
        pa[x] += 1.0 / samples;
        pb[y] += 1.0 / samples;
    }
    let mut total = 0.0;
    for x in 0..MI_BINS {
        for y in 0..MI_BINS {
            let p = joint[x * MI_BINS + y];
            if p > 0.0 {
                total += p * (p / (pa[x] * pb[y])).ln();
            }
        }
    }
    total.max(0.0)
}

fn mutual_information(data: &DMatrix<f64>) -> DMatrix<f64> {
    let binned: Vec<Vec<usize>> = series_rows(data).iter().map(|s| bin_series(s)).collect();
    let n = binned.len();
    let mut scores: DMatrix<f64> = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let value = binned_mutual_information(&binned[i], &binned[j]);
            scores[(i, j)] = value;
            scores[(j, i)] = value;
        }
    }
    scores
}

/// Drift matrix of a discretized Ornstein-Uhlenbeck process,
/// `C(1) C(0)^+ - I`
fn ou_inference(data: &DMatrix<f64>) -> Result<DMatrix<f64>, ExplorerError> {
    let covariance = covariance_matrix(data);
    let transition = lagged_covariance(data) * pseudo_inverse(&covariance)?;
    let n = transition.nrows();
    Ok(transition - DMatrix::identity(n, n))
}

fn soft_threshold(x: f64, alpha: f64) -> f64 {
    x.signum() * (x.abs() - alpha).max(0.0)
}

fn lasso_coordinate_descent(w11: &DMatrix<f64>, s12: &[f64], beta: &mut [f64]) {
    for _ in 0..GLASSO_ITERATIONS {
        let mut max_change: f64 = 0.0;
        for a in 0..beta.len() {
            let residual = s12[a]
                - (0..beta.len())
                    .filter(|&b| b != a)
                    .map(|b| w11[(a, b)] * beta[b])
                    .sum::<f64>();
            let updated = soft_threshold(residual, GLASSO_ALPHA) / w11[(a, a)];
            max_change = max_change.max((updated - beta[a]).abs());
            beta[a] = updated;
        }
        if max_change < GLASSO_TOLERANCE {
            break;
        }
    }
}

/// Sparse inverse covariance by block coordinate descent, reported as
/// partial correlations
fn graphical_lasso(data: &DMatrix<f64>) -> DMatrix<f64> {
    let sample = correlation_matrix(data);
    let n = sample.nrows();
    if n < 2 {
        return DMatrix::zeros(n, n);
    }

    let mut w = &sample + DMatrix::identity(n, n) * GLASSO_ALPHA;
    let mut betas: DMatrix<f64> = DMatrix::zeros(n, n);
    for _ in 0..GLASSO_ITERATIONS {
        let previous = w.clone();
        for j in 0..n {
            let others: Vec<usize> = (0..n).filter(|&k| k != j).collect();
            let w11 = DMatrix::from_fn(n - 1, n - 1, |a, b| w[(others[a], others[b])]);
            let s12: Vec<f64> = others.iter().map(|&k| sample[(k, j)]).collect();
            let mut beta: Vec<f64> = others.iter().map(|&k| betas[(k, j)]).collect();
            lasso_coordinate_descent(&w11, &s12, &mut beta);
            for (a, &k) in others.iter().enumerate() {
                let value: f64 = (0..n - 1).map(|b| w11[(a, b)] * beta[b]).sum();
                w[(k, j)] = value;
                w[(j, k)] = value;
                betas[(k, j)] = beta[a];
            }
        }
        if (&w - &previous).abs().mean() < GLASSO_TOLERANCE {
            break;
        }
    }

    let mut precision: DMatrix<f64> = DMatrix::zeros(n, n);
    for j in 0..n {
        let dot: f64 = (0..n).filter(|&k| k != j).map(|k| w[(k, j)] * betas[(k, j)]).sum();
        let theta = 1.0 / (w[(j, j)] - dot).max(1e-12);
        precision[(j, j)] = theta;
        for k in (0..n).filter(|&k| k != j) {
            precision[(k, j)] = -betas[(k, j)] * theta;
        }
    }
    precision_to_partial(&precision)
}

/// Correlation matrix rebuilt from the eigenmodes above the
/// Marchenko-Pastur upper edge
fn marchenko_pastur(data: &DMatrix<f64>) -> Result<DMatrix<f64>, ExplorerError> {
    let (n, steps) = data.shape();
    let eigen = symmetric_eigen(&correlation_matrix(data))?;
    let upper = (1.0 + (n as f64 / steps as f64).sqrt()).powi(2);
    let mut cleaned: DMatrix<f64> = DMatrix::zeros(n, n);
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda > upper {
            let v = eigen.eigenvectors.column(k);
            cleaned += (v * v.transpose()) * lambda;
        }
    }
    Ok(cleaned)
}

/// Residual sum of squares of an OLS fit with intercept
fn least_squares_rss(y: &[f64], regressors: &[&[f64]]) -> Result<f64, ExplorerError> {
    let rows = y.len();
    let x = DMatrix::from_fn(rows, regressors.len() + 1, |r, c| {
        if c == 0 { 1.0 } else { regressors[c - 1][r] }
    });
    let target = DVector::from_column_slice(y);
    let xt = x.transpose();
    let coefficients = pseudo_inverse(&(&xt * &x))? * (&xt * &target);
    Ok((target - x * coefficients).norm_squared())
}

/// Log ratio of restricted to full residual variance for a lag-1 model of
/// `target`, with and without `driver`'s past
fn granger_score(target: &[f64], driver: &[f64]) -> Result<f64, ExplorerError> {
    let len = target.len();
    let y = &target[1..];
    let own = &target[..len - 1];
    let other = &driver[..len - 1];
    let restricted = least_squares_rss(y, &[own])?;
    let full = least_squares_rss(y, &[own, other])?;
    Ok((restricted.max(1e-12) / full.max(1e-12)).ln().max(0.0))
}

/// Entry `(j, i)` scores how much `j`'s past improves prediction of `i`
fn granger_causality(data: &DMatrix<f64>) -> Result<DMatrix<f64>, ExplorerError> {
    let series = series_rows(data);
    let n = series.len();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        Ok(0.0)
                    } else {
                        granger_score(&series[i], &series[j])
                    }
                })
                .collect::<Result<Vec<f64>, ExplorerError>>()
        })
        .collect::<Result<_, _>>()?;
    Ok(DMatrix::from_fn(n, n, |cause, effect| rows[effect][cause]))
}

/// Maximum spanning tree of the correlations (Prim on `sqrt(2 (1 - rho))`)
fn correlation_spanning_tree(data: &DMatrix<f64>, binary: bool) -> Result<Graph, ExplorerError> {
    let corr = correlation_matrix(data);
    let n = corr.nrows();
    let mut graph = Graph::with_nodes(n);
    let distance = |a: usize, b: usize| (2.0 * (1.0 - corr[(a, b)])).max(0.0).sqrt();

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    if n > 0 {
        best[0] = 0.0;
    }
    for _ in 0..n {
        let Some(u) = (0..n)
            .filter(|&v| !in_tree[v])
            .min_by(|&a, &b| best[a].total_cmp(&best[b]))
        else {
            break;
        };
        in_tree[u] = true;
        if let Some(p) = parent[u] {
            if binary {
                graph.add_edge(p, u)?;
            } else {
                let mut attrs = Map::new();
                attrs.insert("weight".to_string(), Value::from(corr[(p, u)]));
                graph.add_edge_with_attrs(p, u, attrs)?;
            }
        }
        for v in (0..n).filter(|&v| !in_tree[v]) {
            let d = distance(u, v);
            if d < best[v] {
                best[v] = d;
                parent[v] = Some(u);
            }
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::simulate;
    use crate::graph::tests::cycle;
    use crate::numeric::standard_normal;
    use crate::registry::DynamicsKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn unwrap_graph(result: Reconstruction) -> Graph {
        match result {
            Reconstruction::Graph(graph) => graph,
            Reconstruction::Placeholder(text) => panic!("unexpected placeholder: {}", text),
        }
    }

    #[test]
    fn test_threshold_keeps_strongest_pairs() {
        let scores = DMatrix::from_row_slice(
            4,
            4,
            &[
                0.0, 0.9, 0.1, 0.0, //
                0.9, 0.0, 0.2, 0.0, //
                0.1, 0.2, 0.0, -0.8, //
                0.0, 0.0, -0.8, 0.0,
            ],
        );
        let graph = ThresholdRule::degree(1.0).apply(&scores).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(2, 3));
    }

    #[test]
    fn test_threshold_never_adds_zero_pairs() {
        let scores = DMatrix::from_row_slice(3, 3, &[0.0, 0.5, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let graph = ThresholdRule::degree(2.0).apply(&scores).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_threshold_weighted_output() {
        let scores = DMatrix::from_row_slice(2, 2, &[0.0, 0.25, 0.75, 0.0]);
        let rule = ThresholdRule {
            avg_degree: 1.0,
            binary: false,
        };
        let graph = rule.apply(&scores).unwrap();
        assert_eq!(
            graph.edge_attrs(0, 1).unwrap().get("weight"),
            Some(&Value::from(0.75))
        );
    }

    #[test]
    fn test_zero_degree_gives_no_edges() {
        let ts = TimeSeries::new(DMatrix::from_fn(5, 20, |i, t| ((i + t) % 3) as f64));
        let graph = unwrap_graph(
            reconstruct(
                ReconstructionKind::Random,
                &ts,
                &ThresholdRule::degree(0.0),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap(),
        );
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_random_hits_degree_target() {
        let ts = TimeSeries::new(DMatrix::zeros(10, 5));
        let graph = unwrap_graph(
            reconstruct(
                ReconstructionKind::Random,
                &ts,
                &ThresholdRule::degree(4.0),
                &mut StdRng::seed_from_u64(2),
            )
            .unwrap(),
        );
        assert_eq!(graph.edge_count(), 20);
        assert_eq!(graph.mean_degree(), 4.0);
    }

    #[test]
    fn test_free_energy_minimization_placeholder() {
        let ts = TimeSeries::new(DMatrix::zeros(3, 10));
        let result = reconstruct(
            ReconstructionKind::FreeEnergyMinimization,
            &ts,
            &ThresholdRule::degree(1.0),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert!(matches!(result, Reconstruction::Placeholder(_)));
    }

    #[test]
    fn test_negative_degree_rejected() {
        let ts = TimeSeries::new(DMatrix::zeros(3, 10));
        let result = reconstruct(
            ReconstructionKind::CorrelationMatrix,
            &ts,
            &ThresholdRule::degree(-1.0),
            &mut StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(ExplorerError::InvalidParameter { .. })));
    }

    #[test]
    fn test_lagged_methods_need_two_steps() {
        let ts = TimeSeries::new(DMatrix::zeros(3, 1));
        let result = reconstruct(
            ReconstructionKind::NaiveMeanField,
            &ts,
            &ThresholdRule::degree(1.0),
            &mut StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(ExplorerError::InvalidParameter { .. })));
    }

    #[test]
    fn test_correlation_finds_coupled_pair() {
        let mut rng = StdRng::seed_from_u64(4);
        let base: Vec<f64> = (0..200).map(|_| standard_normal(&mut rng)).collect();
        let data = DMatrix::from_fn(3, 200, |i, t| match i {
            0 => base[t],
            1 => base[t] + 0.01 * standard_normal(&mut rng),
            _ => standard_normal(&mut rng),
        });
        let graph = unwrap_graph(
            reconstruct(
                ReconstructionKind::CorrelationMatrix,
                &TimeSeries::new(data),
                &ThresholdRule::degree(0.7),
                &mut rng,
            )
            .unwrap(),
        );
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(0, 1));
    }

    #[test]
    fn test_granger_detects_lagged_driver() {
        let mut rng = StdRng::seed_from_u64(8);
        let driver: Vec<f64> = (0..300).map(|_| standard_normal(&mut rng)).collect();
        let follower: Vec<f64> = (0..300)
            .map(|t| if t == 0 { 0.0 } else { driver[t - 1] } + 0.1 * standard_normal(&mut rng))
            .collect();
        let forward = granger_score(&follower, &driver).unwrap();
        let backward = granger_score(&driver, &follower).unwrap();
        assert!(forward > 1.0);
        assert!(forward > backward);
    }

    #[test]
    fn test_spanning_tree_is_tree() {
        let mut rng = StdRng::seed_from_u64(6);
        let data = DMatrix::from_fn(7, 50, |_, _| standard_normal(&mut rng));
        let graph = unwrap_graph(
            reconstruct(
                ReconstructionKind::CorrelationSpanningTree,
                &TimeSeries::new(data),
                &ThresholdRule::degree(4.0),
                &mut rng,
            )
            .unwrap(),
        );
        assert_eq!(graph.edge_count(), 6);
        assert!(graph.is_connected());
    }

    fn overflowing_series() -> DMatrix<f64> {
        DMatrix::from_fn(3, 20, |i, t| {
            let sign = if (i + t) % 2 == 0 { 1.0 } else { -1.0 };
            sign * 1e200 + t as f64 * 1e199
        })
    }

    #[test]
    fn test_out_of_range_series_rejected() {
        let ts = TimeSeries::new(overflowing_series());
        for kind in ReconstructionKind::ALL {
            let result = reconstruct(kind, &ts, &ThresholdRule::degree(1.0), &mut StdRng::seed_from_u64(0));
            assert!(
                matches!(result, Err(ExplorerError::InvalidParameter { .. })),
                "{}",
                kind.name()
            );
        }
    }

    #[test]
    fn test_overflowing_statistics_fail_fast() {
        let data = overflowing_series();
        assert!(matches!(partial_correlation(&data), Err(ExplorerError::Computation(_))));
        assert!(matches!(ou_inference(&data), Err(ExplorerError::Computation(_))));
        assert!(matches!(mean_field(&data, false), Err(ExplorerError::Computation(_))));
        assert!(matches!(mean_field(&data, true), Err(ExplorerError::Computation(_))));
        assert!(matches!(thouless_anderson_palmer(&data), Err(ExplorerError::Computation(_))));
        assert!(matches!(marchenko_pastur(&data), Err(ExplorerError::Computation(_))));
    }

    #[test]
    fn test_exact_mean_field_corrects_naive_couplings() {
        let mut rng = StdRng::seed_from_u64(12);
        let ts = simulate(DynamicsKind::SherringtonKirkpatrickIsing, &cycle(6), 400, &mut rng).unwrap();
        let naive = mean_field(ts.matrix(), false).unwrap();
        let exact = mean_field(ts.matrix(), true).unwrap();
        assert_eq!(naive.shape(), exact.shape());
        assert!((&exact - &naive).abs().max() > 1e-6);
    }

    #[test]
    fn test_every_method_runs_on_simulated_spins() {
        let mut rng = StdRng::seed_from_u64(12);
        let ts = simulate(DynamicsKind::SherringtonKirkpatrickIsing, &cycle(6), 120, &mut rng).unwrap();
        let rule = ThresholdRule::degree(2.0);
        for kind in ReconstructionKind::ALL {
            let result = reconstruct(kind, &ts, &rule, &mut rng).unwrap();
            match result {
                Reconstruction::Graph(graph) => {
                    assert_eq!(graph.node_count(), 6, "{}", kind.name());
                    assert!(graph.edge_count() <= 6, "{}", kind.name());
                }
                Reconstruction::Placeholder(_) => {
                    assert_eq!(kind, ReconstructionKind::FreeEnergyMinimization)
                }
            }
        }
    }
}
