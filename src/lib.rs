//! # thinking-map
//!
//! Bounded question graphs built from untrusted generated suggestions.
//!
//! A topic is decomposed into guiding questions, nested follow-up questions
//! and drafted answers. Content comes from a text-generation backend whose
//! replies may be clean, malformed or missing; every reply is normalized
//! (or replaced by deterministic fallback content) before it reaches the
//! graph, so the graph is always well-formed.
//!
//! ## Architecture
//!
//! ```text
//! Topic → GenerationBackend → extract_json → SuggestionNormalizer → GraphStore → LayoutEngine
//!                 ↓ (failure / unusable)            ↑
//!                 └──────── DeterministicGenerator ──┘
//! ```
//!
//! ## Guarantees
//!
//! - Exactly one topic root at depth 0; every other node has exactly one parent
//! - A seeded graph holds 6 to 10 guiding questions, at least one of them contrarian
//! - An expansion adds 3 to 7 follow-ups, at least one of them contrarian
//! - Questions at depth 2 cannot be expanded; each question has at most one answer
//! - Rejected mutations leave graph, positions and selection untouched
//! - Same inputs produce the same generated content and the same layout

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod bounds;
pub mod canonical;
pub mod config;
pub mod error;
pub mod explorer;
pub mod generator;
pub mod ids;
pub mod layout;
pub mod normalize;
pub mod store;
pub mod types;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use backend::{GenerationBackend, ScriptedBackend, ScriptedCall};
pub use bounds::{is_contrarian_expansion, is_contrarian_question};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use config::{ExplorerConfig, LogFormat, ServiceConfig};
pub use error::{Error, GenerationError, InvariantViolation, Result, ValidationError};
pub use explorer::Explorer;
pub use generator::{hash_key, DeterministicGenerator, SeededRandom};
pub use ids::{IdAllocator, IdKind, RandomIds, SequentialIds};
pub use layout::{LayoutConfig, LayoutEngine};
pub use normalize::{extract_json, summary_markdown, SuggestionNormalizer};
pub use store::{GraphSnapshot, GraphStore};
pub use types::{
    AnswerDraft, AnswerSuggestion, Author, Edge, EdgeId, ExpansionSuggestion, Graph, GraphId, Node,
    NodeFlags, NodeId, NodeKind, NormalizedExpansions, NormalizedThemes, Position, Positions,
    Relation, SummaryResponse, ThemeResponse, ThemeSuggestion,
};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version of the graph wire format.
/// Increment on breaking changes to any serialized type.
pub const SCHEMA_VERSION: &str = "1.0.0";
