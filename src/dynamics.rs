//! Dynamical processes simulated on a graph
//!
//! Every model returns an entities x steps [`TimeSeries`] whose first column is
//! the initial state.

use nalgebra::DMatrix;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ExplorerError;
use crate::graph::Graph;
use crate::numeric::{logistic, standard_normal};
use crate::registry::DynamicsKind;
use crate::table::TimeSeries;

/// Fraction of nodes active at the start of a branching process
const BRANCHING_INITIAL_FRACTION: f64 = 0.1;
/// Expected number of descendants per active node
const BRANCHING_RATIO: f64 = 0.9975;
/// Long-run activity level the spontaneous activation rate aims for
const BRANCHING_TARGET_ACTIVITY: f64 = 0.2;
/// Inverse temperature of the Glauber Ising model
const GLAUBER_BETA: f64 = 2.0;

/// Runs `kind` on `graph` for `steps` time steps
pub fn simulate<R: Rng + ?Sized>(
    kind: DynamicsKind,
    graph: &Graph,
    steps: usize,
    rng: &mut R,
) -> Result<TimeSeries, ExplorerError> {
    if graph.is_empty() {
        return Err(ExplorerError::invalid("graph", "dynamics need at least one node"));
    }
    if steps == 0 {
        return Err(ExplorerError::invalid("len", "must be at least 1"));
    }

    let data = match kind {
        DynamicsKind::SherringtonKirkpatrickIsing => sherrington_kirkpatrick(graph, steps, rng),
        DynamicsKind::BranchingModel => branching(graph, steps, rng),
        DynamicsKind::VoterModel => voter(graph, steps, rng),
        DynamicsKind::SingleUnbiasedRandomWalker => random_walker(graph, steps, rng),
        DynamicsKind::IsingGlauber => ising_glauber(graph, steps, rng),
    };
    Ok(TimeSeries::new(data))
}

fn random_spin<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.r#gen::<bool>() { 1.0 } else { -1.0 }
}

/// Kinetic Ising model with Gaussian couplings on the graph's edges, each
/// direction drawn independently; parallel updates
fn sherrington_kirkpatrick<R: Rng + ?Sized>(graph: &Graph, steps: usize, rng: &mut R) -> DMatrix<f64> {
    let n = graph.node_count();
    let scale = 1.0 / (n as f64).sqrt();
    let mut couplings = DMatrix::zeros(n, n);
    for (a, b) in graph.edges() {
        couplings[(a, b)] = standard_normal(rng) * scale;
        couplings[(b, a)] = standard_normal(rng) * scale;
    }

    let mut data = DMatrix::zeros(n, steps);
    for i in 0..n {
        data[(i, 0)] = random_spin(rng);
    }
    for t in 1..steps {
        let field = &couplings * data.column(t - 1);
        for i in 0..n {
            let p_up = logistic(2.0 * field[i]);
            data[(i, t)] = if rng.r#gen::<f64>() < p_up { 1.0 } else { -1.0 };
        }
    }
    data
}

/// Branching process: each active node activates each neighbor with
/// probability `ratio / degree`, plus spontaneous activation
fn branching<R: Rng + ?Sized>(graph: &Graph, steps: usize, rng: &mut R) -> DMatrix<f64> {
    let n = graph.node_count();
    let spontaneous = BRANCHING_TARGET_ACTIVITY * (1.0 - BRANCHING_RATIO);

    let mut data = DMatrix::zeros(n, steps);
    for i in 0..n {
        if rng.r#gen::<f64>() < BRANCHING_INITIAL_FRACTION {
            data[(i, 0)] = 1.0;
        }
    }
    for t in 1..steps {
        for i in 0..n {
            if rng.r#gen::<f64>() < spontaneous {
                data[(i, t)] = 1.0;
            }
        }
        for i in 0..n {
            if data[(i, t - 1)] == 0.0 {
                continue;
            }
            let degree = graph.degree(i);
            if degree == 0 {
                continue;
            }
            let p = (BRANCHING_RATIO / degree as f64).min(1.0);
            for neighbor in graph.neighbors(i) {
                if rng.r#gen::<f64>() < p {
                    data[(neighbor, t)] = 1.0;
                }
            }
        }
    }
    data
}

/// Voter model: nodes visited in random order copy a random neighbor's
/// opinion, or pick a random opinion with probability `1 / n`
fn voter<R: Rng + ?Sized>(graph: &Graph, steps: usize, rng: &mut R) -> DMatrix<f64> {
    let n = graph.node_count();
    let noise = 1.0 / n as f64;
    let neighbors: Vec<Vec<usize>> = (0..n).map(|i| graph.neighbors(i).collect()).collect();

    let mut state: Vec<f64> = (0..n).map(|_| random_spin(rng)).collect();
    let mut data = DMatrix::zeros(n, steps);
    let mut order: Vec<usize> = (0..n).collect();
    for t in 0..steps {
        if t > 0 {
            order.shuffle(rng);
            for &i in &order {
                if rng.r#gen::<f64>() < noise {
                    state[i] = random_spin(rng);
                } else if let Some(&other) = neighbors[i].choose(rng) {
                    state[i] = state[other];
                }
            }
        }
        for (i, value) in state.iter().enumerate() {
            data[(i, t)] = *value;
        }
    }
    data
}

/// One walker moving to a uniformly chosen neighbor each step; the series is
/// the one-hot occupancy. A walker on an isolated node stays put.
fn random_walker<R: Rng + ?Sized>(graph: &Graph, steps: usize, rng: &mut R) -> DMatrix<f64> {
    let n = graph.node_count();
    let neighbors: Vec<Vec<usize>> = (0..n).map(|i| graph.neighbors(i).collect()).collect();

    let mut data = DMatrix::zeros(n, steps);
    let mut position = rng.gen_range(0..n);
    for t in 0..steps {
        if t > 0 {
            if let Some(&next) = neighbors[position].choose(rng) {
                position = next;
            }
        }
        data[(position, t)] = 1.0;
    }
    data
}

/// Glauber dynamics of the ferromagnetic Ising model with 0/1 states;
/// parallel updates from the previous step
fn ising_glauber<R: Rng + ?Sized>(graph: &Graph, steps: usize, rng: &mut R) -> DMatrix<f64> {
    let n = graph.node_count();
    let mut data = DMatrix::zeros(n, steps);
    for i in 0..n {
        if rng.r#gen::<bool>() {
            data[(i, 0)] = 1.0;
        }
    }
    for t in 1..steps {
        for i in 0..n {
            let degree = graph.degree(i);
            if degree == 0 {
                data[(i, t)] = data[(i, t - 1)];
                continue;
            }
            let magnetization: f64 = graph
                .neighbors(i)
                .map(|j| 2.0 * data[(j, t - 1)] - 1.0)
                .sum::<f64>()
                / degree as f64;
            let p_up = logistic(2.0 * GLAUBER_BETA * magnetization);
            if rng.r#gen::<f64>() < p_up {
                data[(i, t)] = 1.0;
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{complete, cycle};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_shapes() {
        let graph = cycle(6);
        let mut rng = StdRng::seed_from_u64(42);
        for kind in DynamicsKind::ALL {
            let ts = simulate(kind, &graph, 50, &mut rng).unwrap();
            assert_eq!(ts.num_entities(), 6, "{}", kind.name());
            assert_eq!(ts.num_steps(), 50, "{}", kind.name());
        }
    }

    #[test]
    fn test_spin_models_are_binary() {
        let graph = complete(5);
        let mut rng = StdRng::seed_from_u64(1);
        for kind in [DynamicsKind::SherringtonKirkpatrickIsing, DynamicsKind::VoterModel] {
            let ts = simulate(kind, &graph, 30, &mut rng).unwrap();
            assert!(ts.matrix().iter().all(|&v| v == 1.0 || v == -1.0));
        }
        let ts = simulate(DynamicsKind::IsingGlauber, &graph, 30, &mut rng).unwrap();
        assert!(ts.matrix().iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_random_walker_one_hot_and_adjacent() {
        let graph = cycle(8);
        let ts = simulate(
            DynamicsKind::SingleUnbiasedRandomWalker,
            &graph,
            100,
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();
        let mut previous = None;
        for t in 0..ts.num_steps() {
            let column = ts.matrix().column(t);
            assert_eq!(column.sum(), 1.0);
            let position = column.iter().position(|&v| v == 1.0).unwrap();
            if let Some(prev) = previous {
                assert!(graph.has_edge(prev, position));
            }
            previous = Some(position);
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let graph = cycle(5);
        let a = simulate(DynamicsKind::BranchingModel, &graph, 40, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = simulate(DynamicsKind::BranchingModel, &graph, 40, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(simulate(DynamicsKind::VoterModel, &Graph::new(), 10, &mut rng).is_err());
        assert!(simulate(DynamicsKind::VoterModel, &cycle(3), 0, &mut rng).is_err());
    }
}
