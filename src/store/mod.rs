//! In-memory graph store.
//!
//! The store owns the graph, its positions, the current selection and the
//! id allocator. Every mutation runs against a copy of that state and is
//! swapped in only when it succeeds, so a rejected call leaves no trace.

pub mod snapshot;

use chrono::Utc;
use tracing::debug;

use crate::bounds::{MAX_EXPANSIONS, MAX_QUESTION_DEPTH, MAX_SEED_QUESTIONS};
use crate::error::{InvariantViolation, Result, ValidationError};
use crate::ids::{IdAllocator, IdKind, SequentialIds};
use crate::layout::LayoutEngine;
use crate::types::{
    AnswerDraft, Edge, Graph, GraphId, Node, NodeId, NodeKind, NormalizedExpansions,
    NormalizedThemes, Position, Positions,
};

pub use snapshot::GraphSnapshot;

#[derive(Debug, Clone)]
struct StoreState<A> {
    graph: Option<Graph>,
    positions: Positions,
    selected: Option<NodeId>,
    ids: A,
}

fn require_node_id(id: &NodeId) -> Result<()> {
    if id.as_str().trim().is_empty() {
        return Err(ValidationError::EmptyNodeId.into());
    }
    Ok(())
}

/// The question under `id`, provided follow-ups may still be generated for it.
pub(crate) fn expandable_question<'g>(graph: &'g Graph, id: &NodeId) -> Result<&'g Node> {
    let node = graph
        .node(id)
        .ok_or_else(|| InvariantViolation::QuestionNotFound(id.clone()))?;
    if !node.is_question() {
        return Err(InvariantViolation::NotAQuestion(id.clone()).into());
    }
    if node.depth >= MAX_QUESTION_DEPTH {
        return Err(InvariantViolation::MaxDepthReached {
            node_id: id.clone(),
            depth: node.depth,
            max: MAX_QUESTION_DEPTH,
        }
        .into());
    }
    if node.flags.expanded {
        return Err(InvariantViolation::AlreadyExpanded(id.clone()).into());
    }
    Ok(node)
}

/// The question under `id`, for drafting an answer.
pub(crate) fn answerable_question<'g>(graph: &'g Graph, id: &NodeId) -> Result<&'g Node> {
    let node = graph
        .node(id)
        .ok_or_else(|| InvariantViolation::QuestionNotFound(id.clone()))?;
    if !node.is_question() {
        return Err(InvariantViolation::NotAQuestion(id.clone()).into());
    }
    Ok(node)
}

fn existing_node<'g>(graph: &'g mut Graph, id: &NodeId) -> Result<&'g mut Node> {
    require_node_id(id)?;
    graph
        .node_mut(id)
        .ok_or_else(|| ValidationError::UnknownNode(id.clone()).into())
}

/// Owner of one topic graph and everything derived from it.
#[derive(Debug, Clone)]
pub struct GraphStore<A: IdAllocator = SequentialIds> {
    state: StoreState<A>,
    layout: LayoutEngine,
}

impl GraphStore<SequentialIds> {
    /// Create an empty store with sequential ids.
    pub fn new() -> Self {
        Self::with_allocator(SequentialIds::new())
    }
}

impl Default for GraphStore<SequentialIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: IdAllocator> GraphStore<A> {
    /// Create an empty store issuing ids from `ids`.
    pub fn with_allocator(ids: A) -> Self {
        Self {
            state: StoreState {
                graph: None,
                positions: Positions::new(),
                selected: None,
                ids,
            },
            layout: LayoutEngine::default(),
        }
    }

    /// Use a custom layout engine.
    pub fn with_layout(mut self, layout: LayoutEngine) -> Self {
        self.layout = layout;
        self
    }

    /// The current graph, if initialized.
    pub fn graph(&self) -> Option<&Graph> {
        self.state.graph.as_ref()
    }

    /// Current node positions.
    pub fn positions(&self) -> &Positions {
        &self.state.positions
    }

    /// Currently selected node.
    pub fn selected(&self) -> Option<&NodeId> {
        self.state.selected.as_ref()
    }

    /// Look up a node in the current graph.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.graph().and_then(|g| g.node(id))
    }

    /// Snapshot of graph, positions and selection.
    pub fn snapshot(&self) -> Option<GraphSnapshot> {
        self.graph()
            .map(|g| GraphSnapshot::capture(g, &self.state.positions, self.state.selected.as_ref()))
    }

    fn commit<T>(
        &mut self,
        op: &'static str,
        mutation: impl FnOnce(&mut StoreState<A>, &LayoutEngine) -> Result<T>,
    ) -> Result<T> {
        let mut next = self.state.clone();
        match mutation(&mut next, &self.layout) {
            Ok(out) => {
                self.state = next;
                debug!(op, "Store mutation committed");
                Ok(out)
            }
            Err(err) => {
                debug!(op, error = %err, "Store mutation rejected");
                Err(err)
            }
        }
    }

    /// Discard any prior graph and start a new one holding only the topic.
    pub fn initialize(&mut self, topic: &str) -> Result<GraphId> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic.into());
        }

        self.commit("initialize", |state, _| {
            let root_id = state.ids.node_id(IdKind::Topic);
            let graph_id = state.ids.graph_id();
            let root = Node::topic(root_id.clone(), topic, Utc::now());

            state.graph = Some(Graph::new(graph_id.clone(), root));
            state.positions = Positions::from([(root_id.clone(), Position::default())]);
            state.selected = Some(root_id);
            Ok(graph_id)
        })
    }

    /// Replace the whole question layer with `themes`.
    ///
    /// Returns the new question ids in priority order.
    pub fn seed(&mut self, themes: &NormalizedThemes) -> Result<Vec<NodeId>> {
        self.commit("seed", |state, layout| {
            let StoreState {
                graph,
                positions,
                selected,
                ids,
            } = state;
            let graph = graph.as_mut().ok_or(ValidationError::NoGraph)?;
            let (root_id, depth) = graph
                .root()
                .map(|r| (r.id.clone(), r.depth + 1))
                .ok_or(InvariantViolation::MissingRoot)?;

            graph.clear_below_root();
            let root_position = positions.get(&root_id).copied().unwrap_or_default();
            *positions = Positions::from([(root_id.clone(), root_position)]);

            let now = Utc::now();
            let mut created: Vec<NodeId> = Vec::new();
            'themes: for theme in themes.themes() {
                for question in &theme.questions {
                    if created.len() >= MAX_SEED_QUESTIONS {
                        break 'themes;
                    }
                    let id = ids.node_id(IdKind::Question);
                    graph.insert_node(Node::question(
                        id.clone(),
                        root_id.clone(),
                        depth,
                        question.clone(),
                        Some(theme.reason.clone()),
                        Some(theme.theme.clone()),
                        Some(created.len() as u32 + 1),
                        now,
                    ))?;
                    graph.insert_edge(Edge::expands(ids.edge_id(), root_id.clone(), id.clone()))?;
                    created.push(id);
                }
            }

            layout.layout_children(graph, positions, &root_id);
            *selected = Some(root_id);
            debug!(questions = created.len(), "Seeded question layer");
            Ok(created)
        })
    }

    /// Append follow-up questions under `parent_id`.
    ///
    /// The parent must be a question below the maximum depth that has not
    /// been expanded yet. The parent's `expanded` flag is left alone; see
    /// [`mark_expanded`](Self::mark_expanded).
    pub fn add_children(
        &mut self,
        parent_id: &NodeId,
        expansions: &NormalizedExpansions,
    ) -> Result<Vec<NodeId>> {
        require_node_id(parent_id)?;
        self.commit("add_children", |state, layout| {
            let StoreState {
                graph,
                positions,
                ids,
                ..
            } = state;
            let graph = graph.as_mut().ok_or(ValidationError::NoGraph)?;
            let depth = expandable_question(graph, parent_id)?.depth + 1;

            let now = Utc::now();
            let mut created = Vec::new();
            for item in expansions.items().iter().take(MAX_EXPANSIONS) {
                let id = ids.node_id(IdKind::Question);
                graph.insert_node(Node::question(
                    id.clone(),
                    parent_id.clone(),
                    depth,
                    item.question.clone(),
                    Some(item.why.clone()),
                    Some(item.category.clone()),
                    Some(item.rank),
                    now,
                ))?;
                graph.insert_edge(Edge::expands(ids.edge_id(), parent_id.clone(), id.clone()))?;
                created.push(id);
            }

            layout.layout_children(graph, positions, parent_id);
            debug!(parent = %parent_id, children = created.len(), "Added follow-up questions");
            Ok(created)
        })
    }

    /// Set the `expanded` flag. Returns `false` when the node does not exist.
    pub fn mark_expanded(&mut self, node_id: &NodeId) -> bool {
        let Some(node) = self.state.graph.as_mut().and_then(|g| g.node_mut(node_id)) else {
            return false;
        };
        node.flags.expanded = true;
        node.touch(Utc::now());
        true
    }

    /// Create or update the single answer attached to `question_id`.
    ///
    /// Returns the answer node id.
    pub fn upsert_answer(&mut self, question_id: &NodeId, draft: &AnswerDraft) -> Result<NodeId> {
        require_node_id(question_id)?;
        self.commit("upsert_answer", |state, layout| {
            let StoreState {
                graph,
                positions,
                ids,
                ..
            } = state;
            let graph = graph.as_mut().ok_or(ValidationError::NoGraph)?;
            let question = answerable_question(graph, question_id)?;
            let title = format!("Answer to {}", question.title);
            let depth = question.depth + 1;
            let now = Utc::now();

            if let Some(edge) = graph.answer_edge(question_id) {
                let answer_id = edge.target_id.clone();
                if let Some(node) = graph.node_mut(&answer_id) {
                    if node.title.trim().is_empty() {
                        node.title = title;
                    }
                    node.body = Some(draft.answer().to_string());
                    node.kind = NodeKind::answer_from(draft);
                    node.touch(now);
                }
                debug!(question = %question_id, answer = %answer_id, "Updated answer");
                return Ok(answer_id);
            }

            let answer_id = ids.node_id(IdKind::Answer);
            graph.insert_node(Node::answer(
                answer_id.clone(),
                question_id.clone(),
                depth,
                title,
                draft,
                now,
            ))?;
            graph.insert_edge(Edge::answers(ids.edge_id(), question_id.clone(), answer_id.clone()))?;
            layout.place_answer(positions, question_id, &answer_id);
            debug!(question = %question_id, answer = %answer_id, "Created answer");
            Ok(answer_id)
        })
    }

    /// Rename a node. Blank titles are rejected.
    pub fn update_node_title(&mut self, node_id: &NodeId, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        self.commit("update_node_title", |state, _| {
            let graph = state.graph.as_mut().ok_or(ValidationError::NoGraph)?;
            let node = existing_node(graph, node_id)?;
            node.title = title.to_string();
            node.touch(Utc::now());
            Ok(())
        })
    }

    /// Flip the `pinned` flag. Returns the new value.
    pub fn toggle_pinned(&mut self, node_id: &NodeId) -> Result<bool> {
        self.commit("toggle_pinned", |state, _| {
            let graph = state.graph.as_mut().ok_or(ValidationError::NoGraph)?;
            let node = existing_node(graph, node_id)?;
            node.flags.pinned = !node.flags.pinned;
            node.touch(Utc::now());
            Ok(node.flags.pinned)
        })
    }

    /// Flip the `hidden` flag. Returns the new value.
    ///
    /// Hiding the selected node clears the selection.
    pub fn toggle_hidden(&mut self, node_id: &NodeId) -> Result<bool> {
        self.commit("toggle_hidden", |state, _| {
            let graph = state.graph.as_mut().ok_or(ValidationError::NoGraph)?;
            let node = existing_node(graph, node_id)?;
            node.flags.hidden = !node.flags.hidden;
            node.touch(Utc::now());
            let hidden = node.flags.hidden;
            if hidden && state.selected.as_ref() == Some(node_id) {
                state.selected = None;
            }
            Ok(hidden)
        })
    }

    /// Select a node, or clear the selection with `None`.
    pub fn select(&mut self, node_id: Option<&NodeId>) -> Result<()> {
        self.commit("select", |state, _| {
            let Some(node_id) = node_id else {
                state.selected = None;
                return Ok(());
            };
            let graph = state.graph.as_mut().ok_or(ValidationError::NoGraph)?;
            let node = existing_node(graph, node_id)?;
            if node.flags.hidden {
                return Err(ValidationError::HiddenNode(node_id.clone()).into());
            }
            state.selected = Some(node_id.clone());
            Ok(())
        })
    }

    /// Override the position of an existing node.
    pub fn set_node_position(&mut self, node_id: &NodeId, position: Position) -> Result<()> {
        self.commit("set_node_position", |state, _| {
            let graph = state.graph.as_mut().ok_or(ValidationError::NoGraph)?;
            existing_node(graph, node_id)?;
            state.positions.insert(node_id.clone(), position);
            Ok(())
        })
    }
}
