//! Axum routes for the thinking-map service.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, ValidationError};
use crate::explorer::Explorer;
use crate::ids::RandomIds;
use crate::store::GraphSnapshot;
use crate::types::{GraphId, NodeId, SummaryResponse};
use crate::SCHEMA_VERSION;

use super::middleware::record_graph_metrics;
use super::state::{ServiceState, Session};

/// Shared state handed to every handler.
pub type AppState = Arc<ServiceState>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to start a new graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGraphRequest {
    /// Topic to explore.
    pub topic: String,
}

/// Request to draft an answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Optional notes passed to the backend.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to rename a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    /// New title.
    pub title: String,
}

/// Result of a mutation that created or touched nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    /// Nodes created or updated by the call.
    pub node_ids: Vec<NodeId>,
    /// Graph state after the call.
    pub graph: GraphSnapshot,
}

/// Service health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub session_count: usize,
    /// Generation backend name; absent when all content is generated locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    pub fallback_on_failure: bool,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Error response paired with its HTTP status.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn graph_not_found(graph_id: &GraphId) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::new("GRAPH_NOT_FOUND", format!("Graph not found: {}", graph_id))
                .with_details(graph_id.to_string()),
        }
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Invariant(_) => StatusCode::CONFLICT,
            Error::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            body: ErrorResponse::new(err.code(), err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(
            status = self.status.as_u16(),
            code = %self.body.code,
            error = %self.body.error,
            "Request error"
        );
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Helpers
// ============================================================================

async fn find_session(state: &ServiceState, graph_id: &GraphId) -> Result<Session, ApiError> {
    state
        .session(graph_id)
        .await
        .ok_or_else(|| ApiError::graph_not_found(graph_id))
}

fn snapshot(explorer: &Explorer<RandomIds>) -> Result<GraphSnapshot, ApiError> {
    explorer
        .store()
        .snapshot()
        .ok_or_else(|| Error::from(ValidationError::NoGraph).into())
}

fn mutation(
    operation: &str,
    started: Instant,
    explorer: &Explorer<RandomIds>,
    node_ids: Vec<NodeId>,
) -> ApiResult<MutationResponse> {
    let graph = snapshot(explorer)?;
    record_graph_metrics(
        operation,
        graph.graph.num_nodes(),
        graph.graph.num_edges(),
        started.elapsed().as_millis() as u64,
    );
    Ok(Json(MutationResponse { node_ids, graph }))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Start a new graph: initialize and seed guiding questions.
async fn create_graph_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateGraphRequest>,
) -> Result<(StatusCode, Json<GraphSnapshot>), ApiError> {
    let mut explorer = state.new_explorer();
    let graph_id = explorer.start(&request.topic).await?;
    let body = snapshot(&explorer)?;
    state.register(graph_id, explorer).await;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Current graph, positions and selection.
async fn get_graph_handler(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> ApiResult<GraphSnapshot> {
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let explorer = session.lock().await;
    Ok(Json(snapshot(&explorer)?))
}

/// Drop a graph's session.
async fn delete_graph_handler(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let graph_id = GraphId::new(graph_id);
    if state.remove(&graph_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::graph_not_found(&graph_id))
    }
}

/// Discard the question layer and reseed it.
async fn regenerate_themes_handler(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> ApiResult<MutationResponse> {
    let started = Instant::now();
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let mut explorer = session.lock().await;
    let created = explorer.regenerate_themes().await?;
    mutation("themes", started, &explorer, created)
}

/// Generate follow-up questions under a question.
async fn expand_handler(
    State(state): State<AppState>,
    Path((graph_id, node_id)): Path<(String, String)>,
) -> ApiResult<MutationResponse> {
    let started = Instant::now();
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let mut explorer = session.lock().await;
    let created = explorer.expand(&NodeId::new(node_id)).await?;
    mutation("expand", started, &explorer, created)
}

/// Draft or redraft the answer to a question.
async fn answer_handler(
    State(state): State<AppState>,
    Path((graph_id, node_id)): Path<(String, String)>,
    request: Option<Json<AnswerRequest>>,
) -> ApiResult<MutationResponse> {
    let started = Instant::now();
    let notes = request.and_then(|Json(r)| r.notes);
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let mut explorer = session.lock().await;
    let answer_id = explorer
        .draft_answer(&NodeId::new(node_id), notes.as_deref())
        .await?;
    mutation("answer", started, &explorer, vec![answer_id])
}

/// Rename a node.
async fn rename_handler(
    State(state): State<AppState>,
    Path((graph_id, node_id)): Path<(String, String)>,
    Json(request): Json<RenameRequest>,
) -> ApiResult<MutationResponse> {
    let started = Instant::now();
    let node_id = NodeId::new(node_id);
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let mut explorer = session.lock().await;
    explorer
        .store_mut()
        .update_node_title(&node_id, &request.title)?;
    mutation("rename", started, &explorer, vec![node_id])
}

/// Toggle the pinned flag.
async fn pin_handler(
    State(state): State<AppState>,
    Path((graph_id, node_id)): Path<(String, String)>,
) -> ApiResult<MutationResponse> {
    let started = Instant::now();
    let node_id = NodeId::new(node_id);
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let mut explorer = session.lock().await;
    explorer.store_mut().toggle_pinned(&node_id)?;
    mutation("pin", started, &explorer, vec![node_id])
}

/// Toggle the hidden flag.
async fn hide_handler(
    State(state): State<AppState>,
    Path((graph_id, node_id)): Path<(String, String)>,
) -> ApiResult<MutationResponse> {
    let started = Instant::now();
    let node_id = NodeId::new(node_id);
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let mut explorer = session.lock().await;
    explorer.store_mut().toggle_hidden(&node_id)?;
    mutation("hide", started, &explorer, vec![node_id])
}

/// Markdown digest of the graph.
async fn summary_handler(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> ApiResult<SummaryResponse> {
    let session = find_session(&state, &GraphId::new(graph_id)).await?;
    let explorer = session.lock().await;
    let summary_markdown = explorer.summarize().await?;
    Ok(Json(SummaryResponse { summary_markdown }))
}

/// Health check endpoint (detailed).
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        session_count: state.session_count().await,
        backend: state.backend_name().map(str::to_string),
        fallback_on_failure: state.config().fallback_on_failure,
    })
}

/// Liveness check endpoint.
///
/// Returns 200 if the process is alive.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the thinking-map service.
pub fn create_router(state: ServiceState) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Graph lifecycle
        .route("/api/graphs", post(create_graph_handler))
        .route(
            "/api/graphs/:graph_id",
            get(get_graph_handler).delete(delete_graph_handler),
        )
        .route("/api/graphs/:graph_id/themes", post(regenerate_themes_handler))
        .route("/api/graphs/:graph_id/summary", post(summary_handler))
        // Node operations
        .route("/api/graphs/:graph_id/nodes/:node_id", patch(rename_handler))
        .route("/api/graphs/:graph_id/nodes/:node_id/expand", post(expand_handler))
        .route("/api/graphs/:graph_id/nodes/:node_id/answer", post(answer_handler))
        .route("/api/graphs/:graph_id/nodes/:node_id/pin", post(pin_handler))
        .route("/api/graphs/:graph_id/nodes/:node_id/hide", post(hide_handler))
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}
