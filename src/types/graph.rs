//! The graph value and its derived positions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::edge::{Edge, EdgeId, Relation};
use super::node::{Node, NodeFlags, NodeId, NodeKind};
use crate::canonical::canonical_hash_hex;
use crate::error::InvariantViolation;

/// Unique identifier for a graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(String);

impl GraphId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Advisory 2-D position of a rendered node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node id → position. `BTreeMap` keeps iteration deterministic.
pub type Positions = BTreeMap<NodeId, Position>;

/// A topic graph: one topic root, questions, answers and the edges between them.
///
/// Nodes and edges are kept in insertion order. Sibling order (and therefore
/// layout and summaries) follows that order; lookups go by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Graph identifier.
    pub id: GraphId,
    /// The topic node.
    pub root_id: NodeId,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Create a graph holding only its root.
    pub fn new(id: GraphId, root: Node) -> Self {
        Self {
            id,
            root_id: root.id.clone(),
            nodes: vec![root],
            edges: Vec::new(),
        }
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a node.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Look up a node mutably.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    /// Look up an edge.
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    /// The topic root.
    pub fn root(&self) -> Option<&Node> {
        self.node(&self.root_id).filter(|n| n.is_topic())
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether a node with this id exists.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Question nodes in insertion order.
    pub fn questions(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_question())
    }

    /// Targets of `relation` edges leaving `parent`, in edge order.
    pub fn children(&self, parent: &NodeId, relation: Relation) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| &e.source_id == parent && e.relation == relation)
            .filter_map(|e| self.node(&e.target_id))
            .collect()
    }

    /// The `answers` edge leaving `question`, if one exists.
    pub fn answer_edge(&self, question: &NodeId) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| &e.source_id == question && e.relation == Relation::Answers)
    }

    /// Add a node, rejecting duplicate ids.
    pub fn insert_node(&mut self, node: Node) -> Result<(), InvariantViolation> {
        if self.contains_node(&node.id) {
            return Err(InvariantViolation::DuplicateNodeId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Add an edge, rejecting duplicate ids and dangling endpoints.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), InvariantViolation> {
        if self.edge(&edge.id).is_some() {
            return Err(InvariantViolation::DuplicateEdgeId(edge.id));
        }
        for endpoint in [&edge.source_id, &edge.target_id] {
            if !self.contains_node(endpoint) {
                return Err(InvariantViolation::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Drop every node except the root, and every edge.
    pub fn clear_below_root(&mut self) {
        let root_id = self.root_id.clone();
        self.nodes.retain(|n| n.id == root_id);
        self.edges.clear();
    }

    /// Stable digest of the graph structure and content.
    ///
    /// Timestamps are excluded, so two graphs built from the same inputs
    /// with the same allocator share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let view = FingerprintView {
            id: &self.id,
            root_id: &self.root_id,
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeView {
                    id: &n.id,
                    title: &n.title,
                    body: n.body.as_deref(),
                    depth: n.depth,
                    flags: n.flags,
                    parent_id: n.parent_id.as_ref(),
                    kind: &n.kind,
                })
                .collect(),
            edges: &self.edges,
        };
        canonical_hash_hex(&view)
    }
}

#[derive(Serialize)]
struct FingerprintView<'a> {
    id: &'a GraphId,
    root_id: &'a NodeId,
    nodes: Vec<NodeView<'a>>,
    edges: &'a [Edge],
}

#[derive(Serialize)]
struct NodeView<'a> {
    id: &'a NodeId,
    title: &'a str,
    body: Option<&'a str>,
    depth: u32,
    flags: NodeFlags,
    parent_id: Option<&'a NodeId>,
    kind: &'a NodeKind,
}
