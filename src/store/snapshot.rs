//! Read-only view of a store, as handed to renderers.

use serde::{Deserialize, Serialize};

use crate::types::{Graph, NodeId, Positions};

/// Graph, positions and selection at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    /// The graph.
    pub graph: Graph,
    /// Advisory node positions.
    pub positions: Positions,
    /// Selected node, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node_id: Option<NodeId>,
    /// [`Graph::fingerprint`] of `graph`.
    pub fingerprint: String,
}

impl GraphSnapshot {
    /// Capture a snapshot.
    pub fn capture(graph: &Graph, positions: &Positions, selected: Option<&NodeId>) -> Self {
        Self {
            fingerprint: graph.fingerprint(),
            graph: graph.clone(),
            positions: positions.clone(),
            selected_node_id: selected.cloned(),
        }
    }
}
