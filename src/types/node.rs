//! Node types for the thinking map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::suggestion::AnswerDraft;

/// Unique identifier for a node within a graph.
///
/// Issued by an [`IdAllocator`](crate::ids::IdAllocator); the string form
/// carries the kind prefix (`topic-1`, `q-4`, `ans-2`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Who produced a node's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// Typed or edited by the person exploring the topic.
    User,
    /// Produced by the generation collaborator or the deterministic fallback.
    Generated,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Generated => write!(f, "generated"),
        }
    }
}

/// Presentation flags. None of them affect a node's existence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags {
    /// Kept in focus by the user.
    #[serde(default)]
    pub pinned: bool,
    /// Not rendered; the node and its edges remain in the graph.
    #[serde(default)]
    pub hidden: bool,
    /// Follow-up questions have been generated for this node.
    #[serde(default)]
    pub expanded: bool,
}

/// Kind-specific payload of a node.
///
/// Every site that branches on a node's kind matches this enum exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// The root subject of the graph.
    Topic,
    /// A guiding or follow-up question.
    Question {
        /// Theme or category the question was framed under.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        framing: Option<String>,
        /// Ordering hint among siblings, starting at 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<u32>,
    },
    /// A drafted answer to exactly one question.
    Answer {
        /// Confidence in [0, 1].
        confidence: f64,
        /// Non-empty list of assumptions the answer rests on.
        assumptions: Vec<String>,
        /// Suggested next step.
        #[serde(rename = "nextStep")]
        next_step: String,
    },
    /// A distilled observation.
    Insight,
    /// A recorded decision.
    Decision,
    /// A pointer to outside material.
    Reference,
}

impl NodeKind {
    /// Short lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Question { .. } => "question",
            Self::Answer { .. } => "answer",
            Self::Insight => "insight",
            Self::Decision => "decision",
            Self::Reference => "reference",
        }
    }

    /// Answer payload carrying a draft's confidence, assumptions and next step.
    pub fn answer_from(draft: &AnswerDraft) -> Self {
        Self::Answer {
            confidence: draft.confidence(),
            assumptions: draft.assumptions().to_vec(),
            next_step: draft.next_step().to_string(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the thinking map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Display title.
    pub title: String,
    /// Optional body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Distance from the topic root.
    pub depth: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Content origin.
    pub author: Author,
    /// Presentation flags.
    #[serde(default)]
    pub flags: NodeFlags,
    /// Parent node, absent only for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    /// Build a topic node.
    pub fn topic(id: NodeId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        let title = title.into();
        Self {
            body: Some(format!("Central topic: {}", title)),
            id,
            title,
            depth: 0,
            created_at: now,
            updated_at: now,
            author: Author::User,
            flags: NodeFlags::default(),
            parent_id: None,
            kind: NodeKind::Topic,
        }
    }

    /// Build a generated question node under `parent_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn question(
        id: NodeId,
        parent_id: NodeId,
        depth: u32,
        title: impl Into<String>,
        body: Option<String>,
        framing: Option<String>,
        priority: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            body,
            depth,
            created_at: now,
            updated_at: now,
            author: Author::Generated,
            flags: NodeFlags::default(),
            parent_id: Some(parent_id),
            kind: NodeKind::Question { framing, priority },
        }
    }

    /// Build a generated answer node under `question_id`.
    pub fn answer(
        id: NodeId,
        question_id: NodeId,
        depth: u32,
        title: impl Into<String>,
        draft: &AnswerDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            body: Some(draft.answer().to_string()),
            depth,
            created_at: now,
            updated_at: now,
            author: Author::Generated,
            flags: NodeFlags::default(),
            parent_id: Some(question_id),
            kind: NodeKind::answer_from(draft),
        }
    }

    /// Check whether this node is the topic root kind.
    pub fn is_topic(&self) -> bool {
        matches!(self.kind, NodeKind::Topic)
    }

    /// Check whether this node is a question.
    pub fn is_question(&self) -> bool {
        matches!(self.kind, NodeKind::Question { .. })
    }

    /// Check whether this node is an answer.
    pub fn is_answer(&self) -> bool {
        matches!(self.kind, NodeKind::Answer { .. })
    }

    /// Bump the modification time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
