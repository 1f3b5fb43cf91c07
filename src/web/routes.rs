//! HTTP routes for the explorer
//!
//! API endpoints take their options as query strings and graphs or time
//! series as JSON bodies. Simulation, reconstruction and distance work runs on
//! the blocking pool so request handling threads stay free.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, put},
};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::distance::{DistanceRow, distance_table};
use crate::dynamics::simulate;
use crate::error::ExplorerError;
use crate::generators::{NetworkSpec, generate_connected, parse_count, parse_real};
use crate::graph::{Graph, NodeLinkGraph};
use crate::reconstruction::{Reconstruction, ThresholdRule, reconstruct};
use crate::registry::{
    DistanceKind, DynamicsKind, GeneratorKind, OptionCatalog, ReconstructionKind, catalog,
};
use crate::table::{Record, TimeSeries};

use super::response::Envelope;
use super::server::AppState;

/// Embedded static assets
#[derive(RustEmbed)]
#[folder = "web-assets/"]
struct Assets;

fn default_generator() -> String {
    GeneratorKind::RingOfCliques.name().to_string()
}

fn default_dynamics() -> String {
    DynamicsKind::SherringtonKirkpatrickIsing.name().to_string()
}

fn default_reconstruction() -> String {
    ReconstructionKind::Random.name().to_string()
}

fn default_distance() -> String {
    DistanceKind::Jaccard.name().to_string()
}

fn default_one() -> String {
    "1".to_string()
}

fn default_len() -> String {
    "2000".to_string()
}

fn default_avg() -> String {
    "0".to_string()
}

fn default_label() -> String {
    "N/A".to_string()
}

/// Query parameters for PUT /network
#[derive(Debug, Deserialize)]
struct NetworkQuery {
    #[serde(rename = "gen", default = "default_generator")]
    generator: String,
    #[serde(default = "default_one")]
    cliq: String,
    #[serde(default = "default_one")]
    size: String,
    seed: Option<u64>,
}

/// Query parameters for PUT /time
#[derive(Debug, Deserialize)]
struct TimeQuery {
    #[serde(rename = "gen", default = "default_dynamics")]
    dynamics: String,
    #[serde(default = "default_len")]
    len: String,
    seed: Option<u64>,
}

/// Query parameters for PUT /recon/{id}
#[derive(Debug, Deserialize)]
struct ReconQuery {
    #[serde(default = "default_reconstruction")]
    recon: String,
    #[serde(default = "default_avg")]
    avg: String,
    seed: Option<u64>,
}

/// Query parameters for PUT /distance
#[derive(Debug, Deserialize)]
struct DistanceQuery {
    #[serde(default = "default_distance")]
    dist: String,
    #[serde(default = "default_label")]
    g1: String,
    #[serde(default = "default_label")]
    g2: String,
    #[serde(default = "default_label")]
    g3: String,
}

/// Query parameters for PUT /scale
#[derive(Debug, Deserialize)]
struct ScaleQuery {
    #[serde(default = "default_distance")]
    dist: String,
    #[serde(default = "default_avg")]
    avg: String,
    seed: Option<u64>,
}

/// Body of PUT /distance: the ground truth and three comparison graphs
#[derive(Debug, Deserialize)]
struct DistanceBody {
    g0: NodeLinkGraph,
    g1: NodeLinkGraph,
    g2: NodeLinkGraph,
    g3: NodeLinkGraph,
}

/// Body of PUT /scale
#[derive(Debug, Deserialize)]
struct ScaleBody {
    ts: Vec<Record>,
    #[serde(rename = "G")]
    graph: NodeLinkGraph,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ReconPayload {
    Graph(NodeLinkGraph),
    Placeholder { placeholder: String },
}

#[derive(Debug, Serialize)]
struct MeanDegree {
    mean_degree: f64,
}

#[derive(Debug, Serialize)]
struct ScaleDistance {
    distance: f64,
}

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/network", put(put_network))
        .route("/time", put(put_time))
        .route("/recon/{recon_id}", put(put_reconstruction))
        .route("/distance", put(put_distance))
        .route("/metrics", put(put_metrics))
        .route("/scale", put(put_scale))
        .route("/options", get(get_options))
        .route("/api/health", get(health_check))
}

/// Create static file routes
pub fn static_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index_html))
        .route("/{*path}", get(static_handler))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ExplorerError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ExplorerError::invalid("query", rejection.body_text()))
}

fn parse_body<T: DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
) -> Result<T, ExplorerError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ExplorerError::PayloadTooLarge(rejection.body_text())
        } else {
            ExplorerError::MalformedBody(rejection.body_text())
        }
    })?;
    serde_json::from_slice(&body).map_err(|e| ExplorerError::MalformedBody(e.to_string()))
}

fn decode_graph(state: &AppState, data: &NodeLinkGraph) -> Result<Graph, ExplorerError> {
    let graph = Graph::from_node_link(data)?;
    state.check_nodes("graph", graph.node_count())?;
    Ok(graph)
}

fn decode_series(state: &AppState, records: &[Record]) -> Result<TimeSeries, ExplorerError> {
    let ts = TimeSeries::from_records(records)?;
    state.check_nodes("ts", ts.num_entities())?;
    Ok(ts)
}

/// Runs CPU-bound work on the blocking thread pool
async fn run_blocking<T, F>(task: F) -> Result<T, ExplorerError>
where
    F: FnOnce() -> Result<T, ExplorerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ExplorerError::Computation(format!("worker task failed: {}", e)))?
}

/// PUT /network - Generates a connected graph
async fn put_network(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Envelope<NodeLinkGraph>, ExplorerError> {
    let query = query_params(query)?;
    let kind = GeneratorKind::from_name(&query.generator)?;
    let spec = NetworkSpec::parse(kind, &query.cliq, &query.size)?;
    state.check_nodes("cliq", spec.node_count())?;

    let mut rng = state.rng(query.seed);
    let attempts = state.limits.max_generation_attempts;
    let graph = run_blocking(move || generate_connected(&spec, attempts, &mut rng)).await?;

    info!(
        generator = kind.name(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "generated network"
    );
    Ok(Envelope::ok(graph.to_node_link()))
}

/// PUT /time - Simulates dynamics on the posted graph
async fn put_time(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TimeQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope<Vec<Record>>, ExplorerError> {
    let query = query_params(query)?;
    let kind = DynamicsKind::from_name(&query.dynamics)?;
    let steps = parse_count("len", &query.len)?;
    if steps == 0 || steps > state.limits.max_time_steps {
        return Err(ExplorerError::invalid(
            "len",
            format!("must be between 1 and {}", state.limits.max_time_steps),
        ));
    }
    let graph = decode_graph(&state, &parse_body(body)?)?;

    let mut rng = state.rng(query.seed);
    let ts = run_blocking(move || simulate(kind, &graph, steps, &mut rng)).await?;

    info!(
        dynamics = kind.name(),
        entities = ts.num_entities(),
        steps = ts.num_steps(),
        "simulated time series"
    );
    Ok(Envelope::ok(ts.to_records()))
}

/// PUT /recon/{recon_id} - Reconstructs a graph from a time series
///
/// The path segment is accepted for compatibility and otherwise unused.
async fn put_reconstruction(
    State(state): State<Arc<AppState>>,
    Path(_recon_id): Path<String>,
    query: Result<Query<ReconQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope<ReconPayload>, ExplorerError> {
    let query = query_params(query)?;
    let kind = ReconstructionKind::from_name(&query.recon)?;
    let rule = ThresholdRule::degree(parse_real("avg", &query.avg)?);
    let records: Vec<Record> = parse_body(body)?;
    let ts = decode_series(&state, &records)?;

    let mut rng = state.rng(query.seed);
    let result = run_blocking(move || reconstruct(kind, &ts, &rule, &mut rng)).await?;

    let payload = match result {
        Reconstruction::Graph(graph) => {
            info!(
                method = kind.name(),
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "reconstructed network"
            );
            ReconPayload::Graph(graph.to_node_link())
        }
        Reconstruction::Placeholder(placeholder) => ReconPayload::Placeholder { placeholder },
    };
    Ok(Envelope::ok(payload))
}

/// PUT /distance - 4x4 distance table between the posted graphs
async fn put_distance(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DistanceQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope<Vec<DistanceRow>>, ExplorerError> {
    let query = query_params(query)?;
    let kind = DistanceKind::from_name(&query.dist)?;
    let body: DistanceBody = parse_body(body)?;
    let graphs = [
        decode_graph(&state, &body.g0)?,
        decode_graph(&state, &body.g1)?,
        decode_graph(&state, &body.g2)?,
        decode_graph(&state, &body.g3)?,
    ];
    let labels = ["Ground Truth".to_string(), query.g1, query.g2, query.g3];

    let rows = run_blocking(move || distance_table(kind, &labels, &graphs)).await?;
    info!(metric = kind.name(), "computed distance table");
    Ok(Envelope::ok(rows))
}

/// PUT /metrics - Mean degree of the posted graph
async fn put_metrics(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope<MeanDegree>, ExplorerError> {
    let graph = decode_graph(&state, &parse_body(body)?)?;
    Ok(Envelope::ok(MeanDegree {
        mean_degree: graph.mean_degree(),
    }))
}

/// PUT /scale - Distance between a random reconstruction of the posted
/// series and the posted reference graph
async fn put_scale(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ScaleQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope<ScaleDistance>, ExplorerError> {
    let query = query_params(query)?;
    let kind = DistanceKind::from_name(&query.dist)?;
    let rule = ThresholdRule::degree(parse_real("avg", &query.avg)?);
    let body: ScaleBody = parse_body(body)?;
    let ts = decode_series(&state, &body.ts)?;
    let reference = decode_graph(&state, &body.graph)?;
    ts.check_entities(&reference)?;

    let mut rng = state.rng(query.seed);
    let distance = run_blocking(move || {
        match reconstruct(ReconstructionKind::Random, &ts, &rule, &mut rng)? {
            Reconstruction::Graph(graph) => kind.dist(&graph, &reference),
            Reconstruction::Placeholder(text) => Err(ExplorerError::Computation(text)),
        }
    })
    .await?;

    info!(metric = kind.name(), distance, "computed scale distance");
    Ok(Envelope::ok(ScaleDistance { distance }))
}

/// GET /options - Every selectable option name
async fn get_options() -> Envelope<OptionCatalog> {
    Envelope::ok(catalog())
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// GET / - Serve index.html
async fn index_html() -> Response {
    match Assets::get("index.html") {
        Some(content) => Html(content.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

/// Static file handler for embedded assets
async fn static_handler(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response(),
    }
}
