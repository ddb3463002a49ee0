//! Core types for the thinking map.

pub mod edge;
pub mod graph;
pub mod node;
pub mod suggestion;

pub use edge::{Edge, EdgeId, Relation};
pub use graph::{Graph, GraphId, Position, Positions};
pub use node::{Author, Node, NodeFlags, NodeId, NodeKind};
pub use suggestion::{
    AnswerDraft, AnswerSuggestion, ExpansionSuggestion, NormalizedExpansions, NormalizedThemes,
    SummaryResponse, ThemeResponse, ThemeSuggestion,
};
