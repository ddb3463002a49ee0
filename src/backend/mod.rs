//! Text-generation collaborator.
//!
//! A backend turns a request into raw completion text. It makes no promise
//! about the shape of that text: it may be clean JSON, JSON wrapped in
//! prose or a fenced block, or nothing usable at all. Extraction and repair
//! happen in [`normalize`](crate::normalize).

pub mod scripted;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::types::{Graph, NodeId};

pub use scripted::{ScriptedBackend, ScriptedCall};

/// Raw completion text, or the reason there is none.
pub type Completion = Result<String, GenerationError>;

/// Request/response collaborator producing suggestion text.
///
/// Implementations must be usable from several tasks at once.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Themes for a topic, shaped like `{"themes": [{theme, reason, questions}]}`.
    async fn generate_themes(&self, topic: &str) -> Completion;

    /// Follow-ups for a question, shaped like `[{rank, question, why, category}]`.
    async fn expand_question(&self, node_id: &NodeId, parent_title: &str) -> Completion;

    /// An answer draft, shaped like `{answer, confidence, assumptions, nextStep}`.
    async fn draft_answer(
        &self,
        node_id: &NodeId,
        question: &str,
        notes: Option<&str>,
    ) -> Completion;

    /// A digest of the graph, shaped like `{"summaryMarkdown": "..."}`.
    async fn summarize(&self, graph: &Graph) -> Completion;
}
