//! Deterministic content generator.
//!
//! Produces themes, follow-ups, answers and summaries without any
//! collaborator. It is the only content source when no backend is
//! configured, and the final fallback whenever a backend payload is
//! unusable. Output depends only on the input strings.

pub mod random;
pub mod summary;

use crate::bounds::{self, contrarian_expansion, MAX_EXPANSIONS};
use crate::types::{
    AnswerDraft, AnswerSuggestion, ExpansionSuggestion, Graph, NormalizedExpansions,
    NormalizedThemes, ThemeSuggestion,
};

pub use random::{hash_key, SeededRandom};

struct ThemeSeed {
    theme: &'static str,
    reason: &'static str,
}

const THEME_POOL: &[ThemeSeed] = &[
    ThemeSeed {
        theme: "Strategy & Positioning",
        reason: "Clarify how the initiative creates distinctive value and where it competes.",
    },
    ThemeSeed {
        theme: "Customer Insight",
        reason: "Understand the people affected, their unmet needs, and adoption barriers.",
    },
    ThemeSeed {
        theme: "Execution & Delivery",
        reason: "Translate the ambition into operating models, teams, and milestones.",
    },
    ThemeSeed {
        theme: "Risks & Resilience",
        reason: "Surface blind spots, dependencies, and failure modes early.",
    },
    ThemeSeed {
        theme: "Metrics & Outcomes",
        reason: "Define what success means and how it will be measured.",
    },
];

const QUESTION_TEMPLATES: &[&str] = &[
    "What would an ambitious yet plausible win for {topic} look like in 18 months?",
    "Which stakeholder feels the most pain today related to {topic}, and why?",
    "Where could momentum for {topic} stall because of structural resistance?",
    "How might we prototype {topic} in a way that de-risks the riskiest assumption?",
    "If {topic} succeeds wildly, what second-order effects appear?",
    "What evidence would convince a skeptic that {topic} matters now?",
    "Which leading indicator tells us early that {topic} is working?",
    "What existing behaviors can we leverage to accelerate {topic}?",
    "Where are we most likely to overspend or overbuild for {topic}?",
    "What would make {topic} obsolete faster than expected?",
];

const EXPANSION_TEMPLATES: &[&str] = &[
    "Which constraint makes this angle fragile?",
    "What supporting data would strengthen this direction?",
    "Who needs to be convinced first and how do we earn their trust?",
    "What assumption is everyone making here that might be wrong?",
    "Which small experiment would create clarity quickly?",
    "How does this connect to broader portfolio priorities?",
    "If we reversed this idea, what new possibility emerges?",
];

pub(crate) const FOLLOW_UP_WHY: &str =
    "Expands on nuances surfaced by the previous layer to stress-test the logic.";
pub(crate) const FOLLOW_UP_CATEGORY: &str = "follow_up";

const ANSWER_PATTERNS: &[&str] = &[
    "Frame a pilot with a narrow scope and explicit success criteria.",
    "Co-create with lead users to validate desirability before scaling.",
    "Sequence the work so the riskiest dependencies are addressed first.",
];

const ASSUMPTION_POOL: &[&str] = &[
    "Stakeholders will share candid feedback quickly.",
    "Budget for experimentation is protected.",
    "Data needed for evaluation is accessible and reliable.",
];

const ANSWER_NEXT_STEP: &str = "Draft a concise decision memo outlining scope, timeline, and owner.";

/// Seeded fallback content source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicGenerator;

impl DeterministicGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self
    }

    /// 3–4 themes of 2–3 questions each, bounded to [6, 10] questions with a contrarian one.
    ///
    /// Seeded by the lowercased topic; the topic itself is substituted verbatim.
    pub fn generate_themes(&self, topic: &str) -> NormalizedThemes {
        let topic = topic.trim();
        let mut rng = SeededRandom::from_key(&topic.to_lowercase());

        let theme_count = 3 + rng.next_index(2);
        let mut pool: Vec<&ThemeSeed> = THEME_POOL.iter().collect();
        let mut selected = Vec::with_capacity(theme_count);
        while selected.len() < theme_count && !pool.is_empty() {
            let idx = rng.next_index(pool.len());
            selected.push(pool.remove(idx));
        }

        let mut cursor = 0usize;
        let themes: Vec<ThemeSuggestion> = selected
            .into_iter()
            .map(|seed| {
                let count = 2 + rng.next_index(2);
                let questions = (0..count)
                    .map(|_| {
                        let template = QUESTION_TEMPLATES[cursor % QUESTION_TEMPLATES.len()];
                        cursor += 1;
                        template.replace("{topic}", topic)
                    })
                    .collect();
                ThemeSuggestion {
                    theme: seed.theme.to_string(),
                    reason: seed.reason.to_string(),
                    questions,
                }
            })
            .collect();

        NormalizedThemes::from_checked(bounds::finish_themes(topic, themes))
    }

    /// 3–5 templated follow-ups plus exactly one contrarian item.
    ///
    /// Seeded by `"<seed>:<parent_title>"`.
    pub fn generate_expansions(&self, seed: &str, parent_title: Option<&str>) -> NormalizedExpansions {
        let parent_title = parent_title.map(str::trim).filter(|t| !t.is_empty());
        let mut rng = SeededRandom::from_key(&format!("{}:{}", seed, parent_title.unwrap_or("")));
        let label = parent_title.unwrap_or("this idea");

        let count = 3 + rng.next_index(3);
        let mut pool: Vec<&str> = EXPANSION_TEMPLATES.to_vec();
        let mut items: Vec<ExpansionSuggestion> = Vec::with_capacity(count + 1);
        while items.len() < count && !pool.is_empty() {
            let template = pool.remove(rng.next_index(pool.len()));
            items.push(ExpansionSuggestion {
                rank: items.len() as u32 + 1,
                question: format!("{} ({})", template, label),
                why: FOLLOW_UP_WHY.to_string(),
                category: FOLLOW_UP_CATEGORY.to_string(),
            });
        }
        items.push(contrarian_expansion(parent_title, items.len() as u32 + 1));
        items.truncate(MAX_EXPANSIONS);

        NormalizedExpansions::from_checked(items)
    }

    /// One stock answer with confidence in [0.55, 0.90) and 2–3 assumptions.
    pub fn generate_answer(&self, seed: &str) -> AnswerDraft {
        let mut rng = SeededRandom::from_key(seed);
        let confidence = 0.55 + rng.next_f64() * 0.35;
        let answer = ANSWER_PATTERNS[rng.next_index(ANSWER_PATTERNS.len())];
        let assumption_count = 2 + rng.next_index(2);

        AnswerDraft::from_checked(AnswerSuggestion {
            answer: answer.to_string(),
            confidence,
            assumptions: ASSUMPTION_POOL[..assumption_count]
                .iter()
                .map(|a| a.to_string())
                .collect(),
            next_step: ANSWER_NEXT_STEP.to_string(),
        })
    }

    /// Markdown digest of the graph. No randomness.
    pub fn generate_summary(&self, graph: &Graph) -> String {
        summary::build_summary(graph)
    }
}
