//! Edge types for the thinking map.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::NodeId;

/// Unique identifier for an edge within a graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relation carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Parent question (or topic) to follow-up question.
    Expands,
    /// Question to its drafted answer.
    Answers,
    /// Evidence in favour of the target.
    Supports,
    /// Evidence against the target.
    Refutes,
    /// Loose sequencing.
    LeadsTo,
}

impl Relation {
    /// Parse a relation from its wire name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "expands" => Some(Self::Expands),
            "answers" => Some(Self::Answers),
            "supports" => Some(Self::Supports),
            "refutes" => Some(Self::Refutes),
            "leads_to" => Some(Self::LeadsTo),
            _ => None,
        }
    }

    /// Whether this relation establishes the target's single parent.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Expands | Self::Answers)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expands => write!(f, "expands"),
            Self::Answers => write!(f, "answers"),
            Self::Supports => write!(f, "supports"),
            Self::Refutes => write!(f, "refutes"),
            Self::LeadsTo => write!(f, "leads_to"),
        }
    }
}

/// Directed edge from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique edge identifier.
    pub id: EdgeId,
    /// Source node.
    pub source_id: NodeId,
    /// Target node.
    pub target_id: NodeId,
    /// Relation type.
    pub relation: Relation,
}

impl Edge {
    /// Create a new edge.
    pub fn new(id: EdgeId, source_id: NodeId, target_id: NodeId, relation: Relation) -> Self {
        Self {
            id,
            source_id,
            target_id,
            relation,
        }
    }

    /// Create an `expands` edge.
    pub fn expands(id: EdgeId, parent: NodeId, child: NodeId) -> Self {
        Self::new(id, parent, child, Relation::Expands)
    }

    /// Create an `answers` edge.
    pub fn answers(id: EdgeId, question: NodeId, answer: NodeId) -> Self {
        Self::new(id, question, answer, Relation::Answers)
    }
}
