//! Graph model and node-link JSON codec
//!
//! Graphs exchanged with the front end use the standard node-link encoding:
//!
//! ```json
//! {
//!   "directed": false,
//!   "multigraph": false,
//!   "graph": {},
//!   "nodes": [{"id": 0}, {"id": 1}],
//!   "links": [{"source": 0, "target": 1}]
//! }
//! ```
//!
//! Node identifiers are opaque (integers or strings). The in-memory [`Graph`]
//! keeps nodes in insertion order; that order is the row/column order of every
//! matrix derived from the graph.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while building or decoding a graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("directed and multigraph inputs are not supported")]
    Unsupported,

    #[error("link references unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node id {0} is not supported; ids must be strings or 64-bit integers")]
    UnsupportedNodeId(String),

    #[error("node {0} is listed more than once")]
    DuplicateNode(NodeId),

    #[error("self-loop on node {0} is not supported")]
    SelfLoop(NodeId),

    #[error("node index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// Opaque node identifier (JSON integer or string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(id) => write!(f, "{}", id),
            NodeId::Str(id) => write!(f, "'{}'", id),
        }
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        NodeId::Int(id as i64)
    }
}

impl TryFrom<&Value> for NodeId {
    type Error = GraphError;

    /// Accepts JSON strings and integers that fit in an `i64`
    fn try_from(value: &Value) -> Result<Self, GraphError> {
        match value {
            Value::String(id) => Ok(NodeId::Str(id.clone())),
            Value::Number(number) => number
                .as_i64()
                .map(NodeId::Int)
                .ok_or_else(|| GraphError::UnsupportedNodeId(value.to_string())),
            other => Err(GraphError::UnsupportedNodeId(other.to_string())),
        }
    }
}

impl From<&NodeId> for Value {
    fn from(id: &NodeId) -> Self {
        match id {
            NodeId::Int(id) => Value::from(*id),
            NodeId::Str(id) => Value::from(id.as_str()),
        }
    }
}

/// A node in the node-link encoding; ids stay raw JSON until
/// [`Graph::from_node_link`] decodes them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub id: Value,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// A link (edge) in the node-link encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    pub source: Value,
    pub target: Value,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// Portable node-link representation of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    #[serde(default)]
    pub graph: Map<String, Value>,
    pub nodes: Vec<NodeLinkNode>,
    /// Newer encoders emit `edges` instead of `links`
    #[serde(default, alias = "edges")]
    pub links: Vec<NodeLinkEdge>,
}

/// Undirected simple graph with optional node and edge attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<NodeId>,
    node_attrs: Vec<Map<String, Value>>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<BTreeSet<usize>>,
    /// Keyed by `(min, max)` node index
    edges: BTreeMap<(usize, usize), Map<String, Value>>,
    graph_attrs: Map<String, Value>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with nodes `0..n` and no edges
    pub fn with_nodes(n: usize) -> Self {
        let mut graph = Self::new();
        for id in 0..n {
            graph.add_node(NodeId::from(id));
        }
        graph
    }

    /// Adds a node and returns its index. Re-adding an existing id returns the
    /// existing index.
    pub fn add_node(&mut self, id: NodeId) -> usize {
        self.add_node_with_attrs(id, Map::new())
    }

    /// Adds a node with attributes, merging attributes into an existing node
    pub fn add_node_with_attrs(&mut self, id: NodeId, attrs: Map<String, Value>) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            self.node_attrs[idx].extend(attrs);
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(id.clone(), idx);
        self.nodes.push(id);
        self.node_attrs.push(attrs);
        self.adjacency.push(BTreeSet::new());
        idx
    }

    /// Sets a single attribute on the node at `idx`
    pub fn set_node_attr(&mut self, idx: usize, key: &str, value: Value) -> Result<(), GraphError> {
        let attrs = self
            .node_attrs
            .get_mut(idx)
            .ok_or(GraphError::IndexOutOfRange(idx))?;
        attrs.insert(key.to_string(), value);
        Ok(())
    }

    /// Adds an undirected edge between two node indices.
    ///
    /// Returns `true` if the edge is new.
    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<bool, GraphError> {
        self.add_edge_with_attrs(a, b, Map::new())
    }

    pub fn add_edge_with_attrs(
        &mut self,
        a: usize,
        b: usize,
        attrs: Map<String, Value>,
    ) -> Result<bool, GraphError> {
        let n = self.nodes.len();
        if a >= n {
            return Err(GraphError::IndexOutOfRange(a));
        }
        if b >= n {
            return Err(GraphError::IndexOutOfRange(b));
        }
        if a == b {
            return Err(GraphError::SelfLoop(self.nodes[a].clone()));
        }

        let key = (a.min(b), a.max(b));
        match self.edges.get_mut(&key) {
            Some(existing) => {
                existing.extend(attrs);
                Ok(false)
            }
            None => {
                self.edges.insert(key, attrs);
                self.adjacency[a].insert(b);
                self.adjacency[b].insert(a);
                Ok(true)
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn node_attrs(&self, idx: usize) -> Option<&Map<String, Value>> {
        self.node_attrs.get(idx)
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains_key(&(a.min(b), a.max(b)))
    }

    /// Edge attributes for the edge between two node indices
    pub fn edge_attrs(&self, a: usize, b: usize) -> Option<&Map<String, Value>> {
        self.edges.get(&(a.min(b), a.max(b)))
    }

    /// Neighbor indices of the node at `idx`, in ascending order
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(idx)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency.get(idx).map_or(0, BTreeSet::len)
    }

    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency.iter().map(BTreeSet::len).collect()
    }

    /// Edges as `(min, max)` index pairs in ascending order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.keys().copied()
    }

    /// Edge set expressed with node identifiers, each pair ordered
    pub fn edge_ids(&self) -> BTreeSet<(NodeId, NodeId)> {
        self.edges
            .keys()
            .map(|&(a, b)| {
                let (x, y) = (self.nodes[a].clone(), self.nodes[b].clone());
                if x <= y { (x, y) } else { (y, x) }
            })
            .collect()
    }

    /// Mean node degree (0 for the empty graph)
    pub fn mean_degree(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        2.0 * self.edges.len() as f64 / self.nodes.len() as f64
    }

    /// Hop distances from `source` (None for unreachable nodes)
    pub fn bfs_distances(&self, source: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.nodes.len()];
        if source >= self.nodes.len() {
            return dist;
        }
        dist[source] = Some(0);
        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            let next = dist[node].map_or(0, |d| d + 1);
            for neighbor in &self.adjacency[node] {
                if dist[*neighbor].is_none() {
                    dist[*neighbor] = Some(next);
                    queue.push_back(*neighbor);
                }
            }
        }
        dist
    }

    /// Whether every node is reachable from every other node.
    ///
    /// The graph with no nodes is not considered connected.
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.bfs_distances(0).iter().all(Option::is_some)
    }

    /// Sizes of the connected components
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut seen = vec![false; self.nodes.len()];
        let mut sizes = Vec::new();
        for start in 0..self.nodes.len() {
            if seen[start] {
                continue;
            }
            let reached: Vec<usize> = self
                .bfs_distances(start)
                .iter()
                .enumerate()
                .filter_map(|(idx, d)| d.map(|_| idx))
                .collect();
            for idx in &reached {
                seen[*idx] = true;
            }
            sizes.push(reached.len());
        }
        sizes
    }

    /// Dense 0/1 adjacency matrix in node order
    pub fn adjacency_matrix(&self) -> DMatrix<f64> {
        let n = self.nodes.len();
        let mut matrix = DMatrix::zeros(n, n);
        for &(a, b) in self.edges.keys() {
            matrix[(a, b)] = 1.0;
            matrix[(b, a)] = 1.0;
        }
        matrix
    }

    /// Combinatorial Laplacian `D - A`
    pub fn laplacian_matrix(&self) -> DMatrix<f64> {
        let mut laplacian = -self.adjacency_matrix();
        for (idx, degree) in self.degrees().into_iter().enumerate() {
            laplacian[(idx, idx)] = degree as f64;
        }
        laplacian
    }

    /// Symmetric normalized Laplacian `I - D^-1/2 A D^-1/2`.
    ///
    /// Isolated nodes get a zero diagonal entry.
    pub fn normalized_laplacian_matrix(&self) -> DMatrix<f64> {
        let n = self.nodes.len();
        let degrees = self.degrees();
        let mut laplacian = DMatrix::zeros(n, n);
        for (idx, &degree) in degrees.iter().enumerate() {
            if degree > 0 {
                laplacian[(idx, idx)] = 1.0;
            }
        }
        for &(a, b) in self.edges.keys() {
            let value = -1.0 / ((degrees[a] * degrees[b]) as f64).sqrt();
            laplacian[(a, b)] = value;
            laplacian[(b, a)] = value;
        }
        laplacian
    }

    /// Decodes a node-link record
    pub fn from_node_link(data: &NodeLinkGraph) -> Result<Self, GraphError> {
        if data.directed || data.multigraph {
            return Err(GraphError::Unsupported);
        }

        let mut graph = Graph::new();
        graph.graph_attrs = data.graph.clone();
        for node in &data.nodes {
            let id = NodeId::try_from(&node.id)?;
            if graph.index_of(&id).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
            graph.add_node_with_attrs(id, node.attrs.clone());
        }
        for link in &data.links {
            let source = graph.endpoint(&link.source)?;
            let target = graph.endpoint(&link.target)?;
            graph.add_edge_with_attrs(source, target, link.attrs.clone())?;
        }
        Ok(graph)
    }

    fn endpoint(&self, raw: &Value) -> Result<usize, GraphError> {
        let id = NodeId::try_from(raw)?;
        self.index_of(&id).ok_or(GraphError::UnknownNode(id))
    }

    /// Encodes the graph in node-link form
    pub fn to_node_link(&self) -> NodeLinkGraph {
        let nodes = self
            .nodes
            .iter()
            .zip(&self.node_attrs)
            .map(|(id, attrs)| NodeLinkNode {
                id: Value::from(id),
                attrs: attrs.clone(),
            })
            .collect();
        let links = self
            .edges
            .iter()
            .map(|(&(a, b), attrs)| NodeLinkEdge {
                source: Value::from(&self.nodes[a]),
                target: Value::from(&self.nodes[b]),
                attrs: attrs.clone(),
            })
            .collect();

        NodeLinkGraph {
            directed: false,
            multigraph: false,
            graph: self.graph_attrs.clone(),
            nodes,
            links,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Cycle on nodes `0..n`
    pub(crate) fn cycle(n: usize) -> Graph {
        let mut graph = Graph::with_nodes(n);
        for i in 0..n {
            graph.add_edge(i, (i + 1) % n).unwrap();
        }
        graph
    }

    /// Path on nodes `0..n`
    pub(crate) fn path(n: usize) -> Graph {
        let mut graph = Graph::with_nodes(n);
        for i in 1..n {
            graph.add_edge(i - 1, i).unwrap();
        }
        graph
    }

    /// Complete graph on nodes `0..n`
    pub(crate) fn complete(n: usize) -> Graph {
        let mut graph = Graph::with_nodes(n);
        for i in 0..n {
            for j in (i + 1)..n {
                graph.add_edge(i, j).unwrap();
            }
        }
        graph
    }

    #[test]
    fn test_cycle_mean_degree() {
        let graph = cycle(4);
        assert_eq!(graph.mean_degree(), 2.0);
        assert_eq!(graph.degrees(), vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::new();
        assert_eq!(graph.mean_degree(), 0.0);
        assert!(!graph.is_connected());
    }

    #[test]
    fn test_single_node_is_connected() {
        assert!(Graph::with_nodes(1).is_connected());
    }

    #[test]
    fn test_connectivity() {
        let mut graph = path(4);
        assert!(graph.is_connected());
        graph.add_node(NodeId::Int(99));
        assert!(!graph.is_connected());
        assert_eq!(graph.component_sizes(), vec![4, 1]);
    }

    #[test]
    fn test_duplicate_edge_is_merged() {
        let mut graph = Graph::with_nodes(2);
        assert!(graph.add_edge(0, 1).unwrap());
        assert!(!graph.add_edge(1, 0).unwrap());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut graph = Graph::with_nodes(2);
        assert_eq!(
            graph.add_edge(1, 1),
            Err(GraphError::SelfLoop(NodeId::Int(1)))
        );
    }

    #[test]
    fn test_laplacian_rows_sum_to_zero() {
        let laplacian = cycle(5).laplacian_matrix();
        for row in laplacian.row_iter() {
            assert!(row.sum().abs() < 1e-12);
        }
    }

    #[test]
    fn test_bfs_distances() {
        let graph = path(4);
        assert_eq!(
            graph.bfs_distances(0),
            vec![Some(0), Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn test_node_link_roundtrip_preserves_identity() {
        let input = json!({
            "directed": false,
            "multigraph": false,
            "graph": {"name": "demo"},
            "nodes": [{"id": "a", "club": "x"}, {"id": "b"}, {"id": 3}],
            "links": [
                {"source": "a", "target": "b", "weight": 0.5},
                {"source": 3, "target": "a"}
            ]
        });
        let data: NodeLinkGraph = serde_json::from_value(input).unwrap();
        let graph = Graph::from_node_link(&data).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let encoded = graph.to_node_link();
        let decoded = Graph::from_node_link(&encoded).unwrap();
        assert_eq!(decoded.nodes(), graph.nodes());
        assert_eq!(decoded.edge_ids(), graph.edge_ids());
        assert_eq!(encoded.graph.get("name"), Some(&json!("demo")));

        let a = decoded.index_of(&NodeId::Str("a".into())).unwrap();
        let b = decoded.index_of(&NodeId::Str("b".into())).unwrap();
        assert_eq!(decoded.node_attrs(a).unwrap().get("club"), Some(&json!("x")));
        assert_eq!(decoded.edge_attrs(a, b).unwrap().get("weight"), Some(&json!(0.5)));
    }

    #[test]
    fn test_edges_key_accepted() {
        let input = json!({
            "nodes": [{"id": 0}, {"id": 1}],
            "edges": [{"source": 0, "target": 1}]
        });
        let data: NodeLinkGraph = serde_json::from_value(input).unwrap();
        let graph = Graph::from_node_link(&data).unwrap();
        assert!(graph.has_edge(0, 1));
    }

    #[test]
    fn test_unknown_link_endpoint() {
        let input = json!({
            "nodes": [{"id": 0}],
            "links": [{"source": 0, "target": 7}]
        });
        let data: NodeLinkGraph = serde_json::from_value(input).unwrap();
        assert_eq!(
            Graph::from_node_link(&data),
            Err(GraphError::UnknownNode(NodeId::Int(7)))
        );
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let input = json!({
            "nodes": [{"id": 0}, {"id": 1}, {"id": 0, "club": "y"}],
            "links": []
        });
        let data: NodeLinkGraph = serde_json::from_value(input).unwrap();
        assert_eq!(
            Graph::from_node_link(&data),
            Err(GraphError::DuplicateNode(NodeId::Int(0)))
        );
    }

    #[test]
    fn test_unsupported_node_ids_are_named() {
        let input = json!({"nodes": [{"id": 1.5}], "links": []});
        let data: NodeLinkGraph = serde_json::from_value(input).unwrap();
        let err = Graph::from_node_link(&data).unwrap_err();
        assert_eq!(err, GraphError::UnsupportedNodeId("1.5".to_string()));
        assert!(err.to_string().contains("1.5"));

        let input = json!({
            "nodes": [{"id": 0}],
            "links": [{"source": 0, "target": u64::MAX}]
        });
        let data: NodeLinkGraph = serde_json::from_value(input).unwrap();
        assert_eq!(
            Graph::from_node_link(&data),
            Err(GraphError::UnsupportedNodeId(u64::MAX.to_string()))
        );
    }

    #[test]
    fn test_directed_input_rejected() {
        let input = json!({"directed": true, "nodes": [], "links": []});
        let data: NodeLinkGraph = serde_json::from_value(input).unwrap();
        assert_eq!(Graph::from_node_link(&data), Err(GraphError::Unsupported));
    }
}
