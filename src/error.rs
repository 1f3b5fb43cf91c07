//! Error type shared by every request-facing operation

use thiserror::Error;

use crate::graph::GraphError;
use crate::registry::OptionKind;
use crate::table::TableError;

/// Errors surfaced to HTTP clients
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("unknown {kind} option '{name}'")]
    UnknownOption { kind: OptionKind, name: String },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),

    #[error("invalid time series: {0}")]
    Table(#[from] TableError),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("no connected graph produced after {attempts} attempts")]
    GenerationFailed { attempts: usize },

    #[error("computation failed: {0}")]
    Computation(String),
}

impl ExplorerError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ExplorerError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case identifier used in error responses
    pub fn kind(&self) -> &'static str {
        match self {
            ExplorerError::UnknownOption { .. } => "unknown_option",
            ExplorerError::InvalidParameter { .. } => "invalid_parameter",
            ExplorerError::MalformedBody(_) => "malformed_body",
            ExplorerError::PayloadTooLarge(_) => "payload_too_large",
            ExplorerError::Graph(_) => "invalid_graph",
            ExplorerError::Table(_) => "invalid_time_series",
            ExplorerError::ShapeMismatch(_) => "shape_mismatch",
            ExplorerError::GenerationFailed { .. } => "generation_failed",
            ExplorerError::Computation(_) => "computation_failed",
        }
    }
}
