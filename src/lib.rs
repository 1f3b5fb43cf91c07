//! # netrd-explorer - Network Reconstruction and Distance Explorer
//!
//! A small web service behind an interactive page for experimenting with
//! network science: generate a graph, simulate a dynamical process on it,
//! reconstruct a graph from the resulting time series, and compare graphs
//! under a range of distance metrics.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the explorer on the default address (127.0.0.1:5000)
//! netrd-explorer
//!
//! # Reproducible results on another port, opening a browser
//! netrd-explorer --port 8080 --seed 42 --open
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! PUT /network  -> graph
//! PUT /time     graph -> time series
//! PUT /recon/_  time series -> graph
//! PUT /distance 4 graphs -> 16-row distance table
//! ```
//!
//! Every computation is also available as a library function, see
//! [`generate_connected`], [`simulate`], [`reconstruct`] and
//! [`distance_table`].

pub mod config;
pub mod distance;
pub mod dynamics;
pub mod error;
pub mod generators;
pub mod graph;
pub mod numeric;
pub mod reconstruction;
pub mod registry;
pub mod table;
pub mod web;

pub use config::{
    ConfigError, DefaultsConfig, ExplorerConfig, LimitsConfig, ServerSection, load_config,
    load_config_file,
};
pub use distance::{DistanceRow, compute, distance_table};
pub use dynamics::simulate;
pub use error::ExplorerError;
pub use generators::{NetworkSpec, generate_connected};
pub use graph::{Graph, GraphError, NodeId, NodeLinkEdge, NodeLinkGraph, NodeLinkNode};
pub use reconstruction::{Reconstruction, ThresholdRule, reconstruct};
pub use registry::{
    DistanceKind, DynamicsKind, GeneratorKind, OptionCatalog, OptionKind, ReconstructionKind,
    catalog,
};
pub use table::{Record, TableError, TimeSeries};
