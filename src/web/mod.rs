//! HTTP front end for the explorer
//!
//! Exposes network generation, dynamics simulation, reconstruction and graph
//! distances as PUT endpoints, and serves the bundled explorer page.

pub mod response;
pub mod routes;
pub mod server;

pub use response::Envelope;
pub use server::{AppState, ServerConfig, build_router, start_server};
