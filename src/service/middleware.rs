//! Service middleware for request metrics.
//!
//! Metrics are emitted as `tracing` events under the `thinking_map::metrics`
//! target and can be aggregated from logs.

use axum::{extract::Request, middleware::Next, response::Response};
use regex_lite::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;

/// Records request count, status and latency by normalized path.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "thinking_map::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

fn id_segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/(graphs|nodes)/[^/]+").expect("id segment pattern is a valid regex")
    })
}

/// Replace graph and node ids in a path with placeholders to bound cardinality.
fn normalize_path(path: &str) -> String {
    id_segment_pattern()
        .replace_all(path, "/${1}/:id")
        .to_string()
}

/// Record the size of a graph after a mutation.
pub fn record_graph_metrics(operation: &str, node_count: usize, edge_count: usize, latency_ms: u64) {
    info!(
        target: "thinking_map::metrics",
        metric_type = "graph",
        operation = operation,
        node_count = node_count,
        edge_count = edge_count,
        latency_ms = latency_ms,
        "graph_metric"
    );
}
