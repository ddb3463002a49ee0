//! Scripted backend for testing.
//!
//! Replies come from per-request queues filled ahead of time. An empty
//! queue answers with a transport failure, so a test that forgets to script
//! a call exercises the fallback path instead of hanging.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Completion, GenerationBackend};
use crate::error::GenerationError;
use crate::types::{Graph, NodeId};

/// A request the backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedCall {
    /// `generate_themes(topic)`.
    Themes(String),
    /// `expand_question(node_id, parent_title)`.
    Expand(NodeId, String),
    /// `draft_answer(node_id, question, notes)`.
    Answer(NodeId, String, Option<String>),
    /// `summarize(graph)`, recorded by graph fingerprint.
    Summary(String),
}

#[derive(Debug, Default)]
struct Script {
    themes: VecDeque<Completion>,
    expansions: VecDeque<Completion>,
    answers: VecDeque<Completion>,
    summaries: VecDeque<Completion>,
    calls: Vec<ScriptedCall>,
}

/// Backend replaying queued completions.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

fn next(queue: &mut VecDeque<Completion>, request: &str) -> Completion {
    queue
        .pop_front()
        .unwrap_or_else(|| Err(GenerationError::Transport(format!("no scripted reply for {}", request))))
}

impl ScriptedBackend {
    /// Create a backend with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a reply for the next theme request.
    pub fn push_themes(&self, reply: Completion) -> &Self {
        self.script().themes.push_back(reply);
        self
    }

    /// Queue a reply for the next expansion request.
    pub fn push_expansion(&self, reply: Completion) -> &Self {
        self.script().expansions.push_back(reply);
        self
    }

    /// Queue a reply for the next answer request.
    pub fn push_answer(&self, reply: Completion) -> &Self {
        self.script().answers.push_back(reply);
        self
    }

    /// Queue a reply for the next summary request.
    pub fn push_summary(&self, reply: Completion) -> &Self {
        self.script().summaries.push_back(reply);
        self
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.script().calls.clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_themes(&self, topic: &str) -> Completion {
        let mut script = self.script();
        script.calls.push(ScriptedCall::Themes(topic.to_string()));
        next(&mut script.themes, "themes")
    }

    async fn expand_question(&self, node_id: &NodeId, parent_title: &str) -> Completion {
        let mut script = self.script();
        script
            .calls
            .push(ScriptedCall::Expand(node_id.clone(), parent_title.to_string()));
        next(&mut script.expansions, "expansion")
    }

    async fn draft_answer(
        &self,
        node_id: &NodeId,
        question: &str,
        notes: Option<&str>,
    ) -> Completion {
        let mut script = self.script();
        script.calls.push(ScriptedCall::Answer(
            node_id.clone(),
            question.to_string(),
            notes.map(str::to_string),
        ));
        next(&mut script.answers, "answer")
    }

    async fn summarize(&self, graph: &Graph) -> Completion {
        let mut script = self.script();
        script.calls.push(ScriptedCall::Summary(graph.fingerprint()));
        next(&mut script.summaries, "summary")
    }
}
