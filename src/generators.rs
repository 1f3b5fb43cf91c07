//! Random and deterministic network generators
//!
//! The front end sends two raw parameters, `cliq` and `size`. How they are
//! typed depends on the generator: Erdos-Renyi and random geometric graphs
//! take (count, real), the others take (count, count).

use std::collections::BTreeSet;

use rand::Rng;
use serde_json::json;
use tracing::debug;

use crate::error::ExplorerError;
use crate::graph::Graph;
use crate::registry::GeneratorKind;

/// Validated generator parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetworkSpec {
    RingOfCliques { num_cliques: usize, clique_size: usize },
    BarabasiAlbert { nodes: usize, edges_per_node: usize },
    ErdosRenyi { nodes: usize, probability: f64 },
    RandomGeometric { nodes: usize, radius: f64 },
}

pub(crate) fn parse_count(name: &str, raw: &str) -> Result<usize, ExplorerError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ExplorerError::invalid(name, format!("expected a non-negative integer, got '{}'", raw)))
}

pub(crate) fn parse_real(name: &str, raw: &str) -> Result<f64, ExplorerError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ExplorerError::invalid(name, format!("expected a number, got '{}'", raw)))?;
    if !value.is_finite() {
        return Err(ExplorerError::invalid(name, "must be finite"));
    }
    Ok(value)
}

impl NetworkSpec {
    /// Types and validates the raw `cliq`/`size` pair for the given generator
    pub fn parse(kind: GeneratorKind, cliq: &str, size: &str) -> Result<Self, ExplorerError> {
        let first = parse_count("cliq", cliq)?;
        let spec = if kind.takes_real_parameter() {
            let second = parse_real("size", size)?;
            match kind {
                GeneratorKind::ErdosRenyi => NetworkSpec::ErdosRenyi {
                    nodes: first,
                    probability: second,
                },
                _ => NetworkSpec::RandomGeometric {
                    nodes: first,
                    radius: second,
                },
            }
        } else {
            let second = parse_count("size", size)?;
            match kind {
                GeneratorKind::RingOfCliques => NetworkSpec::RingOfCliques {
                    num_cliques: first,
                    clique_size: second,
                },
                _ => NetworkSpec::BarabasiAlbert {
                    nodes: first,
                    edges_per_node: second,
                },
            }
        };
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<(), ExplorerError> {
        match *self {
            NetworkSpec::RingOfCliques {
                num_cliques,
                clique_size,
            } => {
                if num_cliques < 2 {
                    return Err(ExplorerError::invalid("cliq", "a ring needs at least two cliques"));
                }
                if clique_size < 2 {
                    return Err(ExplorerError::invalid("size", "cliques need at least two nodes"));
                }
            }
            NetworkSpec::BarabasiAlbert {
                nodes,
                edges_per_node,
            } => {
                if edges_per_node < 1 || edges_per_node >= nodes {
                    return Err(ExplorerError::invalid(
                        "size",
                        format!("edges per node must satisfy 1 <= m < n, got m = {}, n = {}", edges_per_node, nodes),
                    ));
                }
            }
            NetworkSpec::ErdosRenyi { nodes, probability } => {
                if nodes == 0 {
                    return Err(ExplorerError::invalid("cliq", "graph needs at least one node"));
                }
                if !(0.0..=1.0).contains(&probability) {
                    return Err(ExplorerError::invalid("size", "edge probability must lie in [0, 1]"));
                }
            }
            NetworkSpec::RandomGeometric { nodes, radius } => {
                if nodes == 0 {
                    return Err(ExplorerError::invalid("cliq", "graph needs at least one node"));
                }
                if radius < 0.0 {
                    return Err(ExplorerError::invalid("size", "radius must be non-negative"));
                }
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        match *self {
            NetworkSpec::RingOfCliques {
                num_cliques,
                clique_size,
            } => num_cliques.saturating_mul(clique_size),
            NetworkSpec::BarabasiAlbert { nodes, .. }
            | NetworkSpec::ErdosRenyi { nodes, .. }
            | NetworkSpec::RandomGeometric { nodes, .. } => nodes,
        }
    }

    /// Produces one graph; may be disconnected
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Graph, ExplorerError> {
        match *self {
            NetworkSpec::RingOfCliques {
                num_cliques,
                clique_size,
            } => ring_of_cliques(num_cliques, clique_size),
            NetworkSpec::BarabasiAlbert {
                nodes,
                edges_per_node,
            } => barabasi_albert(nodes, edges_per_node, rng),
            NetworkSpec::ErdosRenyi { nodes, probability } => {
                erdos_renyi(nodes, probability, rng)
            }
            NetworkSpec::RandomGeometric { nodes, radius } => {
                random_geometric(nodes, radius, rng)
            }
        }
    }
}

/// Generates graphs until one is connected, giving up after `max_attempts`
pub fn generate_connected<R: Rng + ?Sized>(
    spec: &NetworkSpec,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Graph, ExplorerError> {
    for attempt in 1..=max_attempts {
        let graph = spec.generate(rng)?;
        if graph.is_connected() {
            debug!(attempt, nodes = graph.node_count(), edges = graph.edge_count(), "generated connected graph");
            return Ok(graph);
        }
        debug!(attempt, "generated graph is disconnected, retrying");
    }
    Err(ExplorerError::GenerationFailed {
        attempts: max_attempts,
    })
}

/// `num_cliques` complete graphs joined in a ring by single edges
fn ring_of_cliques(num_cliques: usize, clique_size: usize) -> Result<Graph, ExplorerError> {
    let total = num_cliques * clique_size;
    let mut graph = Graph::with_nodes(total);
    for clique in 0..num_cliques {
        let start = clique * clique_size;
        for a in start..start + clique_size {
            for b in (a + 1)..start + clique_size {
                graph.add_edge(a, b)?;
            }
        }
        graph.add_edge(start + 1, ((clique + 1) * clique_size) % total)?;
    }
    Ok(graph)
}

/// Preferential attachment grown from a star on `m + 1` nodes
fn barabasi_albert<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Result<Graph, ExplorerError> {
    let mut graph = Graph::with_nodes(n);
    let mut repeated: Vec<usize> = Vec::with_capacity(2 * m * n);
    for leaf in 1..=m {
        graph.add_edge(0, leaf)?;
        repeated.push(0);
        repeated.push(leaf);
    }

    for source in (m + 1)..n {
        let mut targets = BTreeSet::new();
        while targets.len() < m {
            targets.insert(repeated[rng.gen_range(0..repeated.len())]);
        }
        for &target in &targets {
            graph.add_edge(source, target)?;
            repeated.push(target);
            repeated.push(source);
        }
    }
    Ok(graph)
}

/// G(n, p)
fn erdos_renyi<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Result<Graph, ExplorerError> {
    let mut graph = Graph::with_nodes(n);
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.r#gen::<f64>() < p {
                graph.add_edge(a, b)?;
            }
        }
    }
    Ok(graph)
}

/// Uniform points in the unit square joined when within `radius`.
///
/// Node positions are kept in a `pos` attribute.
fn random_geometric<R: Rng + ?Sized>(n: usize, radius: f64, rng: &mut R) -> Result<Graph, ExplorerError> {
    let mut graph = Graph::with_nodes(n);
    let positions: Vec<(f64, f64)> = (0..n).map(|_| (rng.r#gen(), rng.r#gen())).collect();
    for (idx, (x, y)) in positions.iter().enumerate() {
        graph.set_node_attr(idx, "pos", json!([x, y]))?;
    }
    let r2 = radius * radius;
    for a in 0..n {
        for b in (a + 1)..n {
            let dx = positions[a].0 - positions[b].0;
            let dy = positions[a].1 - positions[b].1;
            if dx * dx + dy * dy <= r2 {
                graph.add_edge(a, b)?;
            }
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_parameter_typing() {
        assert_eq!(
            NetworkSpec::parse(GeneratorKind::ErdosRenyi, "10", "0.5").unwrap(),
            NetworkSpec::ErdosRenyi {
                nodes: 10,
                probability: 0.5
            }
        );
        assert!(matches!(
            NetworkSpec::parse(GeneratorKind::RingOfCliques, "3", "0.5"),
            Err(ExplorerError::InvalidParameter { .. })
        ));
        assert!(matches!(
            NetworkSpec::parse(GeneratorKind::BarabasiAlbert, "ten", "2"),
            Err(ExplorerError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_validation() {
        assert!(NetworkSpec::parse(GeneratorKind::RingOfCliques, "1", "1").is_err());
        assert!(NetworkSpec::parse(GeneratorKind::BarabasiAlbert, "5", "5").is_err());
        assert!(NetworkSpec::parse(GeneratorKind::ErdosRenyi, "5", "1.5").is_err());
        assert!(NetworkSpec::parse(GeneratorKind::RandomGeometric, "5", "-0.1").is_err());
    }

    #[test]
    fn test_ring_of_cliques_structure() {
        let spec = NetworkSpec::parse(GeneratorKind::RingOfCliques, "3", "4").unwrap();
        let graph = spec.generate(&mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(graph.node_count(), 12);
        assert_eq!(graph.edge_count(), 3 * 6 + 3);
        assert!(graph.is_connected());
    }

    #[test]
    fn test_barabasi_albert_edge_count() {
        let spec = NetworkSpec::parse(GeneratorKind::BarabasiAlbert, "30", "2").unwrap();
        let graph = spec.generate(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(graph.node_count(), 30);
        assert_eq!(graph.edge_count(), 2 + 2 * (30 - 3));
    }

    #[test]
    fn test_random_geometric_positions() {
        let spec = NetworkSpec::parse(GeneratorKind::RandomGeometric, "8", "0.9").unwrap();
        let graph = spec.generate(&mut StdRng::seed_from_u64(5)).unwrap();
        for idx in 0..graph.node_count() {
            let pos = graph.node_attrs(idx).unwrap().get("pos").unwrap();
            assert_eq!(pos.as_array().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_every_generator_yields_connected_graph() {
        let cases = [
            (GeneratorKind::RingOfCliques, "4", "5"),
            (GeneratorKind::BarabasiAlbert, "40", "2"),
            (GeneratorKind::ErdosRenyi, "20", "0.4"),
            (GeneratorKind::RandomGeometric, "20", "0.6"),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        for (kind, cliq, size) in cases {
            let spec = NetworkSpec::parse(kind, cliq, size).unwrap();
            let graph = generate_connected(&spec, 100, &mut rng).unwrap();
            assert!(graph.is_connected(), "{} produced a disconnected graph", kind.name());
        }
    }

    #[test]
    fn test_retry_bound() {
        let spec = NetworkSpec::parse(GeneratorKind::ErdosRenyi, "5", "0").unwrap();
        let result = generate_connected(&spec, 7, &mut StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(ExplorerError::GenerationFailed { attempts: 7 })
        ));
    }
}
