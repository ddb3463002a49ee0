//! Exploration session.
//!
//! An [`Explorer`] drives one graph through its lifecycle: it asks the
//! generation backend for content, pushes the reply through the normalizer
//! and applies the result to its [`GraphStore`]. Every request is validated
//! before the backend is called, and the store is only touched once a
//! normalized value exists, so a failed call never changes the graph.
//!
//! Methods take `&mut self` across the backend call. One explorer therefore
//! never has two generation requests in flight.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::{Completion, GenerationBackend};
use crate::config::ExplorerConfig;
use crate::error::{GenerationError, InvariantViolation, Result, ValidationError};
use crate::ids::{IdAllocator, SequentialIds};
use crate::layout::LayoutEngine;
use crate::normalize::{extract_json, summary_markdown, SuggestionNormalizer};
use crate::store::{answerable_question, expandable_question, GraphStore};
use crate::types::{Graph, GraphId, NodeId};

const PREVIEW_CHARS: usize = 120;

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn require_node_id(id: &NodeId) -> Result<()> {
    if id.as_str().trim().is_empty() {
        return Err(ValidationError::EmptyNodeId.into());
    }
    Ok(())
}

/// One exploration session over one graph.
pub struct Explorer<A: IdAllocator = SequentialIds> {
    store: GraphStore<A>,
    backend: Option<Arc<dyn GenerationBackend>>,
    normalizer: SuggestionNormalizer,
    config: ExplorerConfig,
}

impl Explorer<SequentialIds> {
    /// Explorer with sequential ids and no backend.
    pub fn new(config: ExplorerConfig) -> Self {
        Self::with_allocator(SequentialIds::new(), config)
    }
}

impl<A: IdAllocator> Explorer<A> {
    /// Explorer issuing ids from `ids`, with no backend.
    pub fn with_allocator(ids: A, config: ExplorerConfig) -> Self {
        let store = GraphStore::with_allocator(ids).with_layout(LayoutEngine::new(config.layout));
        Self {
            store,
            backend: None,
            normalizer: SuggestionNormalizer::default(),
            config,
        }
    }

    /// Ask `backend` for content. Without one, all content is generated locally.
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Session settings.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &GraphStore<A> {
        &self.store
    }

    /// The underlying store, for direct edits (titles, flags, selection, positions).
    pub fn store_mut(&mut self) -> &mut GraphStore<A> {
        &mut self.store
    }

    /// The current graph.
    pub fn graph(&self) -> Option<&Graph> {
        self.store.graph()
    }

    fn require_graph(&self) -> Result<&Graph> {
        self.store
            .graph()
            .ok_or_else(|| ValidationError::NoGraph.into())
    }

    /// Turn a completion into a JSON payload, or decide what a failure means.
    ///
    /// `Ok(None)` asks the caller to fall back to generated content.
    fn recover(&self, op: &'static str, completion: Completion) -> Result<Option<Value>> {
        let outcome = completion.and_then(|text| {
            if text.trim().is_empty() {
                return Err(GenerationError::EmptyResponse);
            }
            extract_json(&text).ok_or_else(|| GenerationError::Unparsable(preview(&text)))
        });

        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.fail(op, err).map(|()| None),
        }
    }

    fn fail(&self, op: &'static str, err: GenerationError) -> Result<()> {
        let backend = self.backend.as_ref().map(|b| b.name()).unwrap_or("none");
        if self.config.fallback_on_failure {
            warn!(op, backend, error = %err, "Generation failed, using generated content");
            Ok(())
        } else {
            warn!(op, backend, error = %err, "Generation failed");
            Err(err.into())
        }
    }

    /// Start a new graph for `topic` and seed its guiding questions.
    ///
    /// Any previous graph held by this explorer is discarded.
    pub async fn start(&mut self, topic: &str) -> Result<GraphId> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic.into());
        }

        let raw = match self.backend.clone() {
            Some(backend) => self.recover("themes", backend.generate_themes(topic).await)?,
            None => None,
        };
        let themes = self.normalizer.normalize_themes(topic, raw.as_ref());

        let mut next = self.store.clone();
        let graph_id = next.initialize(topic)?;
        next.seed(&themes)?;
        self.store = next;

        info!(
            graph_id = %graph_id,
            topic,
            themes = themes.themes().len(),
            questions = themes.question_count(),
            "Exploration started"
        );
        Ok(graph_id)
    }

    /// Replace the question layer with freshly generated themes.
    pub async fn regenerate_themes(&mut self) -> Result<Vec<NodeId>> {
        let topic = self
            .require_graph()?
            .root()
            .map(|r| r.title.clone())
            .ok_or(InvariantViolation::MissingRoot)?;

        let raw = match self.backend.clone() {
            Some(backend) => self.recover("themes", backend.generate_themes(&topic).await)?,
            None => None,
        };
        let themes = self.normalizer.normalize_themes(&topic, raw.as_ref());
        let created = self.store.seed(&themes)?;
        info!(topic = %topic, questions = created.len(), "Themes regenerated");
        Ok(created)
    }

    /// Generate follow-up questions under `node_id` and mark it expanded.
    pub async fn expand(&mut self, node_id: &NodeId) -> Result<Vec<NodeId>> {
        require_node_id(node_id)?;
        let title = expandable_question(self.require_graph()?, node_id)?.title.clone();

        let raw = match self.backend.clone() {
            Some(backend) => {
                self.recover("expand", backend.expand_question(node_id, &title).await)?
            }
            None => None,
        };
        let items = self
            .normalizer
            .normalize_expansions(node_id.as_str(), Some(&title), raw.as_ref());

        let created = self.store.add_children(node_id, &items)?;
        self.store.mark_expanded(node_id);
        debug!(node_id = %node_id, children = created.len(), "Question expanded");
        Ok(created)
    }

    /// Draft (or redraft) the answer to `question_id`.
    pub async fn draft_answer(&mut self, question_id: &NodeId, notes: Option<&str>) -> Result<NodeId> {
        require_node_id(question_id)?;
        let title = answerable_question(self.require_graph()?, question_id)?
            .title
            .clone();
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());

        let raw = match self.backend.clone() {
            Some(backend) => self.recover(
                "answer",
                backend.draft_answer(question_id, &title, notes).await,
            )?,
            None => None,
        };

        let draft = match self.normalizer.coerce_answer(raw.as_ref()) {
            Some(draft) => draft,
            None => {
                if raw.is_some() {
                    self.fail(
                        "answer",
                        GenerationError::Unparsable("payload has no answer text".to_string()),
                    )?;
                }
                self.normalizer
                    .generator()
                    .generate_answer(&format!("{}:{}", question_id, title))
            }
        };

        let answer_id = self.store.upsert_answer(question_id, &draft)?;
        debug!(
            question_id = %question_id,
            answer_id = %answer_id,
            confidence = draft.confidence(),
            "Answer drafted"
        );
        Ok(answer_id)
    }

    /// Markdown digest of the current graph.
    ///
    /// A payload without a `summaryMarkdown` string is treated like an
    /// answer payload without answer text: unparsable. A summary that is
    /// present but too short is always replaced by the generated digest.
    pub async fn summarize(&self) -> Result<String> {
        let graph = self.require_graph()?;

        let raw = match self.backend.clone() {
            Some(backend) => self.recover("summary", backend.summarize(graph).await)?,
            None => None,
        };
        let markdown = summary_markdown(raw.as_ref());
        if raw.is_some() && markdown.is_none() {
            self.fail(
                "summary",
                GenerationError::Unparsable("payload has no summaryMarkdown".to_string()),
            )?;
        }
        Ok(self.normalizer.ensure_summary(graph, markdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Relation;

    #[tokio::test]
    async fn test_offline_session() {
        let mut explorer = Explorer::new(ExplorerConfig::default());
        let graph_id = explorer.start("Pricing").await.unwrap();
        assert_eq!(graph_id.as_str(), "graph-1");

        let graph = explorer.graph().unwrap();
        let first = graph.children(&graph.root_id, Relation::Expands)[0].id.clone();
        let children = explorer.expand(&first).await.unwrap();
        assert!((4..=7).contains(&children.len()));
        assert!(explorer.store().node(&first).unwrap().flags.expanded);

        let answer = explorer.draft_answer(&children[0], Some("  ")).await.unwrap();
        assert!(explorer.store().node(&answer).unwrap().is_answer());

        let summary = explorer.summarize().await.unwrap();
        assert!(summary.contains("## Decisions"));
    }

    #[tokio::test]
    async fn test_validation_before_generation() {
        let mut explorer = Explorer::new(ExplorerConfig::default());
        assert_eq!(
            explorer.start("  ").await,
            Err(Error::Validation(ValidationError::EmptyTopic))
        );
        assert_eq!(
            explorer.expand(&NodeId::from("q-1")).await,
            Err(Error::Validation(ValidationError::NoGraph))
        );
        assert_eq!(
            explorer.summarize().await,
            Err(Error::Validation(ValidationError::NoGraph))
        );

        explorer.start("Pricing").await.unwrap();
        assert_eq!(
            explorer.draft_answer(&NodeId::from(""), None).await,
            Err(Error::Validation(ValidationError::EmptyNodeId))
        );
    }

    #[tokio::test]
    async fn test_expand_twice_rejected() {
        let mut explorer = Explorer::new(ExplorerConfig::default());
        explorer.start("Pricing").await.unwrap();
        let graph = explorer.graph().unwrap();
        let first = graph.children(&graph.root_id, Relation::Expands)[0].id.clone();

        explorer.expand(&first).await.unwrap();
        assert!(matches!(
            explorer.expand(&first).await,
            Err(Error::Invariant(InvariantViolation::AlreadyExpanded(_)))
        ));
    }
}
