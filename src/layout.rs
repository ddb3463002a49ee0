//! Deterministic node layout.
//!
//! Only the direct `expands` children of the mutated parent are repositioned;
//! every other position is left as it was. Children under the topic fan out
//! horizontally beneath it, children under a question fan out vertically to
//! its right, and an answer sits directly below its question.

use serde::{Deserialize, Serialize};

use crate::types::{Graph, NodeId, Position, Positions, Relation};

/// Layout spacing constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Horizontal gap between children of the topic.
    pub root_spacing: f64,
    /// Vertical offset from the topic to its children.
    pub root_offset_y: f64,
    /// Horizontal offset from a question to its children.
    pub branch_offset_x: f64,
    /// Vertical gap between children of a question.
    pub branch_spacing: f64,
    /// Vertical offset from a question to its answer.
    pub answer_offset_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root_spacing: 280.0,
            root_offset_y: 260.0,
            branch_offset_x: 320.0,
            branch_spacing: 180.0,
            answer_offset_y: 160.0,
        }
    }
}

/// Pure layout over a graph and its position map.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine with the given spacing.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Current spacing constants.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Reposition the direct `expands` children of `parent_id`, in edge order.
    ///
    /// A parent without a position is treated as sitting at the origin.
    pub fn layout_children(&self, graph: &Graph, positions: &mut Positions, parent_id: &NodeId) {
        let Some(parent) = graph.node(parent_id) else {
            return;
        };
        let origin = positions.get(parent_id).copied().unwrap_or_default();
        let children = graph.children(parent_id, Relation::Expands);
        let count = children.len();
        let horizontal = parent.is_topic();

        for (idx, child) in children.into_iter().enumerate() {
            let offset = centered_offset(idx, count);
            let position = if horizontal {
                Position::new(
                    origin.x + offset * self.config.root_spacing,
                    origin.y + self.config.root_offset_y,
                )
            } else {
                Position::new(
                    origin.x + self.config.branch_offset_x,
                    origin.y + offset * self.config.branch_spacing,
                )
            };
            positions.insert(child.id.clone(), position);
        }
    }

    /// Place an answer directly below its question.
    pub fn place_answer(&self, positions: &mut Positions, question_id: &NodeId, answer_id: &NodeId) {
        let origin = positions.get(question_id).copied().unwrap_or_default();
        positions.insert(
            answer_id.clone(),
            Position::new(origin.x, origin.y + self.config.answer_offset_y),
        );
    }
}

fn centered_offset(idx: usize, count: usize) -> f64 {
    idx as f64 - (count.saturating_sub(1)) as f64 / 2.0
}
