//! Error types.
//!
//! Every fallible operation returns [`Result<T>`](Result). The three concerns
//! are kept apart so callers can tell bad input, a rejected mutation and a
//! misbehaving collaborator from each other without string matching.

use crate::types::{EdgeId, NodeId};

/// Input was missing or malformed. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Topic was empty after trimming.
    #[error("Topic is required")]
    EmptyTopic,
    /// Node id was empty after trimming.
    #[error("Node id is required")]
    EmptyNodeId,
    /// Title was empty after trimming.
    #[error("Title must not be blank")]
    EmptyTitle,
    /// Node id does not resolve to a node.
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),
    /// Selection target is hidden.
    #[error("Node is hidden: {0}")]
    HiddenNode(NodeId),
    /// No graph has been initialized yet.
    #[error("No graph has been initialized")]
    NoGraph,
}

/// The requested mutation would break a graph invariant. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Follow-ups were already generated for this question.
    #[error("Question already expanded: {0}")]
    AlreadyExpanded(NodeId),
    /// Question sits at the maximum question depth.
    #[error("Question {node_id} is at depth {depth}; questions cannot be expanded past depth {max}")]
    MaxDepthReached {
        /// The question.
        node_id: NodeId,
        /// Its depth.
        depth: u32,
        /// Maximum question depth.
        max: u32,
    },
    /// Node exists but is not a question.
    #[error("Node is not a question: {0}")]
    NotAQuestion(NodeId),
    /// No question with this id exists.
    #[error("Question not found: {0}")]
    QuestionNotFound(NodeId),
    /// Root is missing or is not a topic node.
    #[error("Graph root is missing or is not a topic")]
    MissingRoot,
    /// Allocator produced an id that is already in use.
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(NodeId),
    /// Allocator produced an edge id that is already in use.
    #[error("Duplicate edge id: {0}")]
    DuplicateEdgeId(EdgeId),
    /// Edge endpoint does not exist.
    #[error("Edge {edge_id} references missing node {node_id}")]
    DanglingEdge {
        /// The edge.
        edge_id: EdgeId,
        /// The missing endpoint.
        node_id: NodeId,
    },
}

/// The generation collaborator failed or returned something unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Collaborator could not be reached.
    #[error("Generation backend unreachable: {0}")]
    Transport(String),
    /// Collaborator answered with a non-success status.
    #[error("Generation backend returned status {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// Collaborator answered without content.
    #[error("Generation backend returned no content")]
    EmptyResponse,
    /// No structured payload could be extracted.
    #[error("Unparsable generation payload: {0}")]
    Unparsable(String),
}

/// Crate-level error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Bad input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Rejected mutation.
    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
    /// Collaborator failure that could not be recovered.
    #[error("Generation failure: {0}")]
    Generation(#[from] GenerationError),
}

impl Error {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Invariant(_) => "INVARIANT_VIOLATION",
            Self::Generation(_) => "GENERATION_FAILURE",
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Error::from(ValidationError::EmptyTopic).code(), "VALIDATION_ERROR");
        assert_eq!(
            Error::from(InvariantViolation::AlreadyExpanded(NodeId::from("q-1"))).code(),
            "INVARIANT_VIOLATION"
        );
        assert_eq!(Error::from(GenerationError::EmptyResponse).code(), "GENERATION_FAILURE");
    }

    #[test]
    fn test_messages_name_the_node() {
        let err = Error::from(InvariantViolation::MaxDepthReached {
            node_id: NodeId::from("q-7"),
            depth: 2,
            max: 2,
        });
        assert!(err.to_string().contains("q-7"));
    }
}
