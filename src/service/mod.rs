//! Thinking-map REST service.
//!
//! Keeps one exploration session per graph in memory, up to a capacity
//! past which the least recently used session is evicted, and exposes the
//! session operations over HTTP.
//!
//! ## Endpoints
//!
//! - `POST /api/graphs` - Start a graph from `{topic}` and seed guiding questions
//! - `GET /api/graphs/:graph_id` - Graph, positions, selection and fingerprint
//! - `DELETE /api/graphs/:graph_id` - Drop the session
//! - `POST /api/graphs/:graph_id/themes` - Discard and reseed the question layer
//! - `POST /api/graphs/:graph_id/nodes/:node_id/expand` - Generate follow-up questions
//! - `POST /api/graphs/:graph_id/nodes/:node_id/answer` - Draft an answer from optional `{notes}`
//! - `PATCH /api/graphs/:graph_id/nodes/:node_id` - Rename a node with `{title}`
//! - `POST /api/graphs/:graph_id/nodes/:node_id/pin` - Toggle pinned
//! - `POST /api/graphs/:graph_id/nodes/:node_id/hide` - Toggle hidden
//! - `POST /api/graphs/:graph_id/summary` - Markdown digest
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness check

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_graph_metrics};
pub use routes::{create_router, ApiError, AppState, ErrorResponse};
pub use state::{ServiceState, Session, SessionRegistry};
