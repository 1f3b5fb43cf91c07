//! Graph distance metrics and the pairwise distance table
//!
//! Metrics that compare matrices entry by entry treat nodes as aligned by
//! position and need equal node counts; see
//! [`DistanceKind::requires_alignment`]. Every metric returns 0 for a graph
//! compared with itself.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use nalgebra::{DMatrix, Schur};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::ExplorerError;
use crate::graph::Graph;
use crate::numeric::{
    MAX_DECOMPOSITION_ITERATIONS, jensen_shannon, mean, normalize, pseudo_inverse, std_dev,
    symmetric_eigenvalues, symmetric_function,
};
use crate::registry::DistanceKind;

/// Lorentzian half-width of the Ipsen-Mikhailov spectral density
const IM_GAMMA: f64 = 0.08;
/// Weight of the spectral term in Hamming-Ipsen-Mikhailov
const HIM_XI: f64 = 1.0;
const POLYNOMIAL_ORDER: i32 = 5;
const POLYNOMIAL_ALPHA: f64 = 1.0;
const QUANTUM_BETA: f64 = 0.1;
const NETLSD_TIMESCALES: usize = 250;
const NBD_EIGENVALUES: usize = 20;
/// Half width at half maximum of the Laplacian spectral kernel
const SPECTRAL_HWHM: f64 = 0.011775;
const SPECTRAL_GRID: usize = 2001;

/// One cell of the long-form distance table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceRow {
    pub group: String,
    pub variable: String,
    pub value: f64,
}

impl DistanceKind {
    /// Distance between `a` and `b` under this metric
    pub fn dist(&self, a: &Graph, b: &Graph) -> Result<f64, ExplorerError> {
        compute(*self, a, b)
    }
}

pub fn compute(kind: DistanceKind, a: &Graph, b: &Graph) -> Result<f64, ExplorerError> {
    if a.is_empty() || b.is_empty() {
        return Err(ExplorerError::invalid("graph", "distances need graphs with at least one node"));
    }
    if kind.requires_alignment() && a.node_count() != b.node_count() {
        return Err(ExplorerError::ShapeMismatch(format!(
            "{} compares graphs node by node, got {} and {} nodes",
            kind.name(),
            a.node_count(),
            b.node_count()
        )));
    }

    let value = match kind {
        DistanceKind::Jaccard => jaccard(a, b),
        DistanceKind::Hamming => hamming(a, b),
        DistanceKind::Frobenius => (a.adjacency_matrix() - b.adjacency_matrix()).norm(),
        DistanceKind::PortraitDivergence => map_divergence(&portrait(a), &portrait(b)),
        DistanceKind::IpsenMikhailov => {
            LorentzSpectrum::of(a)?.distance(&LorentzSpectrum::of(b)?)
        }
        DistanceKind::HammingIpsenMikhailov => hamming_ipsen_mikhailov(a, b)?,
        DistanceKind::ResistancePerturbation => {
            (resistance_matrix(a)? - resistance_matrix(b)?).norm()
        }
        DistanceKind::NetSimile => canberra(&netsimile_signature(a), &netsimile_signature(b)),
        DistanceKind::PolynomialDissimilarity => {
            let n = a.node_count() as f64;
            (polynomial_matrix(a)? - polynomial_matrix(b)?).norm() / (n * n)
        }
        DistanceKind::OnionDivergence => map_divergence(&onion_spectrum(a), &onion_spectrum(b)),
        DistanceKind::QuantumSpectralJsd => quantum_jsd(a, b)?,
        DistanceKind::DegreeDivergence => {
            jensen_shannon(&degree_distribution(a), &degree_distribution(b))
        }
        DistanceKind::NetLsd => {
            let (ha, hb) = (heat_trace(a)?, heat_trace(b)?);
            ha.iter().zip(&hb).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
        }
        DistanceKind::CommunicabilitySequence => {
            jensen_shannon(&communicability_sequence(a)?, &communicability_sequence(b)?)
        }
        DistanceKind::NonBacktrackingDistance => {
            point_distance(&nonbacktracking_spectrum(a)?, &nonbacktracking_spectrum(b)?)
        }
        DistanceKind::DeltaCon => {
            let root = |m: DMatrix<f64>| m.map(|v| v.max(0.0).sqrt());
            (root(deltacon_affinity(a)?) - root(deltacon_affinity(b)?)).norm()
        }
        DistanceKind::LaplacianSpectral => {
            jensen_shannon(&spectral_density(a)?, &spectral_density(b)?).sqrt()
        }
    };

    if !value.is_finite() {
        return Err(ExplorerError::Computation(format!(
            "{} produced a non-finite distance",
            kind.name()
        )));
    }
    Ok(value)
}

/// All 16 ordered pairwise distances, row index `i` outer and `j` inner
pub fn distance_table(
    kind: DistanceKind,
    labels: &[String; 4],
    graphs: &[Graph; 4],
) -> Result<Vec<DistanceRow>, ExplorerError> {
    let values: Vec<f64> = (0..16)
        .into_par_iter()
        .map(|cell| compute(kind, &graphs[cell / 4], &graphs[cell % 4]))
        .collect::<Result<_, _>>()?;

    Ok(values
        .into_iter()
        .enumerate()
        .map(|(cell, value)| DistanceRow {
            group: labels[cell / 4].clone(),
            variable: labels[cell % 4].clone(),
            value,
        })
        .collect())
}

fn jaccard(a: &Graph, b: &Graph) -> f64 {
    let (ea, eb) = (a.edge_ids(), b.edge_ids());
    let union = ea.union(&eb).count();
    if union == 0 {
        return 0.0;
    }
    1.0 - ea.intersection(&eb).count() as f64 / union as f64
}

/// Fraction of differing adjacency entries
fn hamming(a: &Graph, b: &Graph) -> f64 {
    let n = a.node_count() as f64;
    (a.adjacency_matrix() - b.adjacency_matrix()).abs().sum() / (n * n)
}

/// JSD (bits) between two sparse distributions over the same key space
fn map_divergence<K: Ord + Clone>(p: &BTreeMap<K, f64>, q: &BTreeMap<K, f64>) -> f64 {
    let mut keys: Vec<&K> = p.keys().chain(q.keys()).collect();
    keys.sort();
    keys.dedup();
    let pv: Vec<f64> = keys.iter().map(|k| p.get(*k).copied().unwrap_or(0.0)).collect();
    let qv: Vec<f64> = keys.iter().map(|k| q.get(*k).copied().unwrap_or(0.0)).collect();
    jensen_shannon(&pv, &qv)
}

/// Network portrait as a distribution over `(distance l, count k)`: the
/// weight of a cell is `k B[l][k]` over the number of reachable pairs
fn portrait(graph: &Graph) -> BTreeMap<(usize, usize), f64> {
    let mut cells: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for source in 0..graph.node_count() {
        let mut shells: BTreeMap<usize, usize> = BTreeMap::new();
        for d in graph.bfs_distances(source).into_iter().flatten() {
            *shells.entry(d).or_default() += 1;
        }
        for (l, k) in shells {
            *cells.entry((l, k)).or_default() += k as f64;
        }
    }
    let total: f64 = cells.values().sum();
    cells.values_mut().for_each(|w| *w /= total);
    cells
}

/// Lorentzian-broadened vibrational spectrum used by Ipsen-Mikhailov
struct LorentzSpectrum {
    frequencies: Vec<f64>,
    norm: f64,
}

impl LorentzSpectrum {
    /// Drops the smallest Laplacian eigenvalue (the zero mode)
    fn of(graph: &Graph) -> Result<Self, ExplorerError> {
        let frequencies = symmetric_eigenvalues(&graph.laplacian_matrix())?
            .into_iter()
            .skip(1)
            .map(|lambda| lambda.abs().sqrt())
            .collect();
        Ok(Self::from_frequencies(frequencies))
    }

    fn from_frequencies(frequencies: Vec<f64>) -> Self {
        let norm = frequencies
            .iter()
            .map(|w| FRAC_PI_2 + (w / IM_GAMMA).atan())
            .sum();
        Self { frequencies, norm }
    }

    fn density(&self, omega: f64) -> f64 {
        if self.norm <= 0.0 {
            return 0.0;
        }
        self.frequencies
            .iter()
            .map(|w| IM_GAMMA / ((omega - w).powi(2) + IM_GAMMA * IM_GAMMA))
            .sum::<f64>()
            / self.norm
    }

    /// L2 distance between the two densities on `[0, max frequency + tail]`
    fn distance(&self, other: &Self) -> f64 {
        const POINTS: usize = 4001;
        let upper = self
            .frequencies
            .iter()
            .chain(&other.frequencies)
            .fold(0.0_f64, |acc, &w| acc.max(w))
            + 10.0;
        let step = upper / (POINTS - 1) as f64;
        let mut total = 0.0;
        for k in 0..POINTS {
            let omega = k as f64 * step;
            let weight = if k == 0 || k == POINTS - 1 { 0.5 } else { 1.0 };
            total += weight * (self.density(omega) - other.density(omega)).powi(2);
        }
        (total * step).sqrt()
    }
}

/// Blend of normalized Hamming and Ipsen-Mikhailov distances. The spectral
/// part is scaled by its value between the empty and complete graphs.
fn hamming_ipsen_mikhailov(a: &Graph, b: &Graph) -> Result<f64, ExplorerError> {
    let n = a.node_count();
    let hamming = if n > 1 {
        (a.adjacency_matrix() - b.adjacency_matrix()).abs().sum() / (n * (n - 1)) as f64
    } else {
        0.0
    };
    let spectral = LorentzSpectrum::of(a)?.distance(&LorentzSpectrum::of(b)?);
    // empty graph: n - 1 zero modes; complete graph: n - 1 modes at sqrt(n)
    let modes = n.saturating_sub(1);
    let empty = LorentzSpectrum::from_frequencies(vec![0.0; modes]);
    let complete = LorentzSpectrum::from_frequencies(vec![(n as f64).sqrt(); modes]);
    let reference = empty.distance(&complete);
    let spectral = if reference > 0.0 { spectral / reference } else { 0.0 };
    Ok(((hamming.powi(2) + HIM_XI * spectral.powi(2)) / (1.0 + HIM_XI)).sqrt())
}

/// Effective resistance between every node pair
fn resistance_matrix(graph: &Graph) -> Result<DMatrix<f64>, ExplorerError> {
    let pinv = pseudo_inverse(&graph.laplacian_matrix())?;
    let n = pinv.nrows();
    Ok(DMatrix::from_fn(n, n, |i, j| {
        pinv[(i, i)] + pinv[(j, j)] - 2.0 * pinv[(i, j)]
    }))
}

fn clustering(graph: &Graph, node: usize) -> f64 {
    let neighbors: Vec<usize> = graph.neighbors(node).collect();
    let d = neighbors.len();
    if d < 2 {
        return 0.0;
    }
    let mut links = 0;
    for (idx, &u) in neighbors.iter().enumerate() {
        for &v in &neighbors[idx + 1..] {
            if graph.has_edge(u, v) {
                links += 1;
            }
        }
    }
    2.0 * links as f64 / (d * (d - 1)) as f64
}

/// Seven local features per node, each aggregated by median, mean,
/// standard deviation, skewness and excess kurtosis
fn netsimile_signature(graph: &Graph) -> Vec<f64> {
    let n = graph.node_count();
    let degrees = graph.degrees();
    let coefficients: Vec<f64> = (0..n).map(|i| clustering(graph, i)).collect();

    let mut features: Vec<Vec<f64>> = vec![Vec::with_capacity(n); 7];
    for i in 0..n {
        let neighbors: Vec<usize> = graph.neighbors(i).collect();
        let neighbor_mean = |values: &dyn Fn(usize) -> f64| {
            if neighbors.is_empty() {
                0.0
            } else {
                neighbors.iter().map(|&j| values(j)).sum::<f64>() / neighbors.len() as f64
            }
        };

        let mut ego = neighbors.clone();
        ego.push(i);
        let inner_links = ego
            .iter()
            .enumerate()
            .map(|(idx, &u)| ego[idx + 1..].iter().filter(|&&v| graph.has_edge(u, v)).count())
            .sum::<usize>();
        let ego_degree: usize = ego.iter().map(|&u| degrees[u]).sum();
        let mut outside: Vec<usize> = ego
            .iter()
            .flat_map(|&u| graph.neighbors(u))
            .filter(|v| !ego.contains(v))
            .collect();
        outside.sort_unstable();
        outside.dedup();

        features[0].push(degrees[i] as f64);
        features[1].push(coefficients[i]);
        features[2].push(neighbor_mean(&|j| degrees[j] as f64));
        features[3].push(neighbor_mean(&|j| coefficients[j]));
        features[4].push(inner_links as f64);
        features[5].push((ego_degree - 2 * inner_links) as f64);
        features[6].push(outside.len() as f64);
    }

    features
        .iter()
        .flat_map(|values| {
            let (skew, kurtosis) = shape_moments(values);
            [median(values), mean(values), std_dev(values), skew, kurtosis]
        })
        .collect()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Sample skewness and excess kurtosis; both 0 for constant input
fn shape_moments(values: &[f64]) -> (f64, f64) {
    let m = mean(values);
    let len = values.len().max(1) as f64;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / len;
    if m2 <= f64::EPSILON {
        return (0.0, 0.0);
    }
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / len;
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / len;
    (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
}

fn canberra(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let denom = a.abs() + b.abs();
            if denom > 0.0 { (a - b).abs() / denom } else { 0.0 }
        })
        .sum()
}

/// `sum_k A^k / (N - 1)^(alpha (k - 1))` for k = 1..=K
fn polynomial_matrix(graph: &Graph) -> Result<DMatrix<f64>, ExplorerError> {
    let scale = (graph.node_count().max(2) - 1) as f64;
    symmetric_function(&graph.adjacency_matrix(), |lambda| {
        (1..=POLYNOMIAL_ORDER)
            .map(|k| lambda.powi(k) / scale.powf(POLYNOMIAL_ALPHA * (k - 1) as f64))
            .sum()
    })
}

/// Onion decomposition: peel nodes of minimum remaining degree in layers
fn onion_layers(graph: &Graph) -> Vec<usize> {
    let n = graph.node_count();
    let mut remaining_degree = graph.degrees();
    let mut layer = vec![0; n];
    let mut removed = vec![false; n];
    let mut left = n;
    let mut core = 0;
    let mut current = 1;

    while left > 0 {
        let shell: Vec<usize> = (0..n)
            .filter(|&v| !removed[v] && remaining_degree[v] <= core)
            .collect();
        if shell.is_empty() {
            core = (0..n)
                .filter(|&v| !removed[v])
                .map(|v| remaining_degree[v])
                .min()
                .unwrap_or(core);
            continue;
        }
        for &v in &shell {
            removed[v] = true;
            layer[v] = current;
            left -= 1;
        }
        for &v in &shell {
            for u in graph.neighbors(v) {
                if !removed[u] {
                    remaining_degree[u] -= 1;
                }
            }
        }
        current += 1;
    }
    layer
}

/// Distribution of nodes over `(onion layer, degree)`
fn onion_spectrum(graph: &Graph) -> BTreeMap<(usize, usize), f64> {
    let n = graph.node_count() as f64;
    let degrees = graph.degrees();
    let mut cells: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (v, layer) in onion_layers(graph).into_iter().enumerate() {
        *cells.entry((layer, degrees[v])).or_default() += 1.0 / n;
    }
    cells
}

/// Von Neumann entropy (bits) of a density matrix
fn von_neumann_entropy(rho: &DMatrix<f64>) -> Result<f64, ExplorerError> {
    Ok(symmetric_eigenvalues(rho)?
        .into_iter()
        .filter(|&v| v > 1e-15)
        .map(|v| -v * v.log2())
        .sum())
}

fn density_matrix(graph: &Graph) -> Result<DMatrix<f64>, ExplorerError> {
    let heat = symmetric_function(&graph.laplacian_matrix(), |lambda| (-QUANTUM_BETA * lambda).exp())?;
    let trace = heat.trace();
    Ok(heat / trace)
}

/// Square root of the quantum Jensen-Shannon divergence of the two
/// Laplacian density matrices
fn quantum_jsd(a: &Graph, b: &Graph) -> Result<f64, ExplorerError> {
    let (rho_a, rho_b) = (density_matrix(a)?, density_matrix(b)?);
    let mix = (&rho_a + &rho_b) * 0.5;
    let divergence = von_neumann_entropy(&mix)?
        - 0.5 * (von_neumann_entropy(&rho_a)? + von_neumann_entropy(&rho_b)?);
    Ok(divergence.max(0.0).sqrt())
}

fn degree_distribution(graph: &Graph) -> Vec<f64> {
    let degrees = graph.degrees();
    let max = degrees.iter().copied().max().unwrap_or(0);
    let mut counts = vec![0.0; max + 1];
    for d in degrees {
        counts[d] += 1.0;
    }
    normalize(&counts)
}

/// Heat trace of the normalized Laplacian on log-spaced times in [1e-2, 1e2]
fn heat_trace(graph: &Graph) -> Result<Vec<f64>, ExplorerError> {
    let eigenvalues = symmetric_eigenvalues(&graph.normalized_laplacian_matrix())?;
    Ok((0..NETLSD_TIMESCALES)
        .map(|k| {
            let exponent = -2.0 + 4.0 * k as f64 / (NETLSD_TIMESCALES - 1) as f64;
            let t = 10f64.powf(exponent);
            eigenvalues.iter().map(|lambda| (-t * lambda).exp()).sum()
        })
        .collect())
}

/// Upper triangle of `exp(A)` as a probability vector
fn communicability_sequence(graph: &Graph) -> Result<Vec<f64>, ExplorerError> {
    let comm = symmetric_function(&graph.adjacency_matrix(), f64::exp)?;
    let n = comm.nrows();
    let entries: Vec<f64> = (0..n)
        .flat_map(|i| (i..n).map(move |j| (i, j)))
        .map(|(i, j)| comm[(i, j)].max(0.0))
        .collect();
    Ok(normalize(&entries))
}

/// Largest-magnitude eigenvalues of the non-backtracking operator, from the
/// 2N x 2N Ihara block matrix `[[A, I - D], [I, 0]]`
fn nonbacktracking_spectrum(graph: &Graph) -> Result<Vec<(f64, f64)>, ExplorerError> {
    let n = graph.node_count();
    let adjacency = graph.adjacency_matrix();
    let degrees = graph.degrees();
    let mut ihara: DMatrix<f64> = DMatrix::zeros(2 * n, 2 * n);
    for i in 0..n {
        for j in 0..n {
            ihara[(i, j)] = adjacency[(i, j)];
        }
        ihara[(i, n + i)] = 1.0 - degrees[i] as f64;
        ihara[(n + i, i)] = 1.0;
    }

    let schur = Schur::try_new(ihara, f64::EPSILON, MAX_DECOMPOSITION_ITERATIONS)
        .ok_or_else(|| {
            ExplorerError::Computation("non-backtracking eigenvalues did not converge".to_string())
        })?;
    let mut points: Vec<(f64, f64)> = schur
        .complex_eigenvalues()
        .iter()
        .map(|z| (z.re, z.im))
        .collect();
    points.sort_by(|a, b| {
        b.0.hypot(b.1)
            .total_cmp(&a.0.hypot(a.1))
            .then(a.0.total_cmp(&b.0))
            .then(a.1.total_cmp(&b.1))
    });
    points.truncate(NBD_EIGENVALUES);
    Ok(points)
}

/// Euclidean distance between two ordered point lists, padded with the origin
fn point_distance(a: &[(f64, f64)], b: &[(f64, f64)]) -> f64 {
    let len = a.len().max(b.len());
    let at = |v: &[(f64, f64)], i: usize| v.get(i).copied().unwrap_or((0.0, 0.0));
    (0..len)
        .map(|i| {
            let (p, q) = (at(a, i), at(b, i));
            (p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)
        })
        .sum::<f64>()
        .sqrt()
}

/// Fast belief propagation affinity `[I + e^2 D - e A]^-1`, `e = 1 / (1 + max degree)`
fn deltacon_affinity(graph: &Graph) -> Result<DMatrix<f64>, ExplorerError> {
    let n = graph.node_count();
    let degrees = graph.degrees();
    let epsilon = 1.0 / (1.0 + degrees.iter().copied().max().unwrap_or(0) as f64);
    let mut system = DMatrix::identity(n, n) - graph.adjacency_matrix() * epsilon;
    for (i, &d) in degrees.iter().enumerate() {
        system[(i, i)] += epsilon * epsilon * d as f64;
    }
    system
        .try_inverse()
        .ok_or_else(|| ExplorerError::Computation("DeltaCon affinity system is singular".to_string()))
}

/// Gaussian-smoothed normalized Laplacian spectrum on [0, 2], as a
/// probability vector
fn spectral_density(graph: &Graph) -> Result<Vec<f64>, ExplorerError> {
    let eigenvalues = symmetric_eigenvalues(&graph.normalized_laplacian_matrix())?;
    let sigma = SPECTRAL_HWHM / (2.0 * 2f64.ln()).sqrt();
    let density: Vec<f64> = (0..SPECTRAL_GRID)
        .map(|k| {
            let x = 2.0 * k as f64 / (SPECTRAL_GRID - 1) as f64;
            eigenvalues
                .iter()
                .map(|lambda| (-0.5 * ((x - lambda) / sigma).powi(2)).exp())
                .sum()
        })
        .collect();
    Ok(normalize(&density))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{complete, cycle, path};

    fn labels() -> [String; 4] {
        ["Ground Truth", "A", "B", "C"].map(String::from)
    }

    #[test]
    fn test_identical_graphs_are_at_zero() {
        let graph = cycle(6);
        for kind in DistanceKind::ALL {
            let value = compute(kind, &graph, &graph).unwrap();
            assert!(value.abs() < 1e-9, "{} gave {}", kind.name(), value);
        }
    }

    #[test]
    fn test_known_values() {
        let (a, b) = (cycle(4), path(4));
        assert!((compute(DistanceKind::Jaccard, &a, &b).unwrap() - 0.25).abs() < 1e-12);
        assert!((compute(DistanceKind::Hamming, &a, &b).unwrap() - 0.125).abs() < 1e-12);
        assert!((compute(DistanceKind::Frobenius, &a, &b).unwrap() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_different_graphs_are_apart() {
        let (a, b) = (cycle(6), complete(6));
        for kind in DistanceKind::ALL {
            let value = compute(kind, &a, &b).unwrap();
            assert!(value > 0.0, "{} gave {}", kind.name(), value);
        }
    }

    #[test]
    fn test_symmetry() {
        let (a, b) = (cycle(5), path(5));
        for kind in DistanceKind::ALL {
            let ab = compute(kind, &a, &b).unwrap();
            let ba = compute(kind, &b, &a).unwrap();
            assert!((ab - ba).abs() < 1e-6, "{}: {} vs {}", kind.name(), ab, ba);
        }
    }

    #[test]
    fn test_alignment_required() {
        let result = compute(DistanceKind::Frobenius, &cycle(4), &cycle(5));
        assert!(matches!(result, Err(ExplorerError::ShapeMismatch(_))));
        assert!(compute(DistanceKind::Jaccard, &cycle(4), &cycle(5)).is_ok());
        assert!(compute(DistanceKind::NetLsd, &cycle(4), &cycle(5)).is_ok());
    }

    #[test]
    fn test_empty_graph_rejected() {
        let result = compute(DistanceKind::Jaccard, &Graph::new(), &cycle(3));
        assert!(matches!(result, Err(ExplorerError::InvalidParameter { .. })));
    }

    #[test]
    fn test_onion_layers_of_path() {
        // leaves peel first, then the middle
        assert_eq!(onion_layers(&path(3)), vec![1, 2, 1]);
    }

    #[test]
    fn test_distance_table_layout() {
        let graphs = [cycle(5), path(5), complete(5), cycle(5)];
        let rows = distance_table(DistanceKind::Hamming, &labels(), &graphs).unwrap();
        assert_eq!(rows.len(), 16);
        assert_eq!(rows[0].group, "Ground Truth");
        assert_eq!(rows[1].variable, "A");
        assert_eq!(rows[4].group, "A");
        for i in 0..4 {
            assert_eq!(rows[i * 4 + i].value, 0.0);
        }
        assert_eq!(rows[3].value, 0.0);
        assert!(rows[2].value > 0.0);
    }

    #[test]
    fn test_distance_table_propagates_errors() {
        let graphs = [cycle(5), path(4), complete(5), cycle(5)];
        let result = distance_table(DistanceKind::DeltaCon, &labels(), &graphs);
        assert!(matches!(result, Err(ExplorerError::ShapeMismatch(_))));
    }
}
