//! Identifier allocation.
//!
//! Each store owns its allocator, so independent graphs (and independent
//! tests) get independent, reproducible id sequences.

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::types::{EdgeId, GraphId, NodeId};

/// Entity kinds that receive identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdKind {
    /// A graph.
    Graph,
    /// The topic root.
    Topic,
    /// A question node.
    Question,
    /// An answer node.
    Answer,
    /// An insight node.
    Insight,
    /// A decision node.
    Decision,
    /// A reference node.
    Reference,
    /// An edge.
    Edge,
}

impl IdKind {
    /// Prefix used in the string form of ids of this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Topic => "topic",
            Self::Question => "q",
            Self::Answer => "ans",
            Self::Insight => "insight",
            Self::Decision => "decision",
            Self::Reference => "ref",
            Self::Edge => "edge",
        }
    }
}

/// Source of unique identifiers.
///
/// Implementations must never return the same id twice for the same kind.
pub trait IdAllocator: Clone + Send + Sync {
    /// Issue the next identifier for `kind`.
    fn next_raw(&mut self, kind: IdKind) -> String;

    /// Issue a graph id.
    fn graph_id(&mut self) -> GraphId {
        GraphId::new(self.next_raw(IdKind::Graph))
    }

    /// Issue a node id.
    fn node_id(&mut self, kind: IdKind) -> NodeId {
        NodeId::new(self.next_raw(kind))
    }

    /// Issue an edge id.
    fn edge_id(&mut self) -> EdgeId {
        EdgeId::new(self.next_raw(IdKind::Edge))
    }
}

/// Per-kind counters: `q-1`, `q-2`, `edge-1`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    counters: BTreeMap<IdKind, u64>,
}

impl SequentialIds {
    /// Create an allocator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdAllocator for SequentialIds {
    fn next_raw(&mut self, kind: IdKind) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        format!("{}-{}", kind.prefix(), counter)
    }
}

/// Random UUID v4 ids with the kind prefix: `q-6f1c...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdAllocator for RandomIds {
    fn next_raw(&mut self, kind: IdKind) -> String {
        format!("{}-{}", kind.prefix(), Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_counters_are_per_kind() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.node_id(IdKind::Question).as_str(), "q-1");
        assert_eq!(ids.node_id(IdKind::Question).as_str(), "q-2");
        assert_eq!(ids.edge_id().as_str(), "edge-1");
        assert_eq!(ids.node_id(IdKind::Answer).as_str(), "ans-1");
        assert_eq!(ids.graph_id().as_str(), "graph-1");
    }

    #[test]
    fn test_independent_allocators() {
        let mut a = SequentialIds::new();
        let mut b = SequentialIds::new();
        a.node_id(IdKind::Question);
        assert_eq!(b.node_id(IdKind::Question).as_str(), "q-1");
    }

    #[test]
    fn test_random_ids_unique() {
        let mut ids = RandomIds;
        let issued: HashSet<_> = (0..100).map(|_| ids.next_raw(IdKind::Question)).collect();
        assert_eq!(issued.len(), 100);
        assert!(issued.iter().all(|id| id.starts_with("q-")));
    }
}
