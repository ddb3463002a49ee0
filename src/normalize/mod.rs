//! Suggestion normalization.
//!
//! Turns untrusted collaborator payloads into bounded, repaired values the
//! graph store accepts. Anything unusable is replaced, in whole or in part,
//! by [`DeterministicGenerator`] output, so every entry point here returns a
//! valid value (except [`SuggestionNormalizer::coerce_answer`], where absence
//! is meaningful to the caller).

pub mod extract;

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::bounds::{
    self, DEFAULT_CONFIDENCE, MAX_QUESTIONS_PER_THEME, MIN_EXPANSIONS, MIN_SEED_QUESTIONS,
    MIN_SUMMARY_CHARS,
};
use crate::generator::{DeterministicGenerator, FOLLOW_UP_CATEGORY, FOLLOW_UP_WHY};
use crate::types::{
    AnswerDraft, AnswerSuggestion, ExpansionSuggestion, Graph, NormalizedExpansions,
    NormalizedThemes, ThemeSuggestion,
};

pub use extract::extract_json;

const DEFAULT_THEME_NAME: &str = "Exploration Theme";
const DEFAULT_THEME_REASON: &str = "Explore this angle to make the topic actionable.";
const FALLBACK_ASSUMPTION: &str = "Identify the riskiest assumption and design a quick validation.";
const DEFAULT_NEXT_STEP: &str = "Document the most critical assumption and outline the validation step.";

fn trimmed_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| trimmed_str(Some(item)))
                .collect()
        })
        .unwrap_or_default()
}

fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| object.get(*name))
}

/// Validates and repairs collaborator payloads, falling back to generated content.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionNormalizer {
    generator: DeterministicGenerator,
}

impl SuggestionNormalizer {
    /// Create a normalizer backed by `generator`.
    pub fn new(generator: DeterministicGenerator) -> Self {
        Self { generator }
    }

    /// The fallback generator.
    pub fn generator(&self) -> &DeterministicGenerator {
        &self.generator
    }

    /// Bound a theme payload to [6, 10] questions with at least one contrarian question.
    ///
    /// Accepts `{"themes": [...]}` or a bare array of theme objects.
    pub fn normalize_themes(&self, topic: &str, raw: Option<&Value>) -> NormalizedThemes {
        let topic = topic.trim();
        let entries = match raw {
            Some(Value::Object(object)) => object.get("themes").and_then(Value::as_array),
            Some(Value::Array(items)) => Some(items),
            _ => None,
        };
        let Some(entries) = entries else {
            debug!(topic = %topic, "Theme payload is not theme-shaped; using generated themes");
            return self.generator.generate_themes(topic);
        };

        let mut themes: Vec<ThemeSuggestion> = entries
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|entry| {
                let mut questions = string_list(entry.get("questions"));
                if questions.is_empty() {
                    return None;
                }
                questions.truncate(MAX_QUESTIONS_PER_THEME);
                Some(ThemeSuggestion {
                    theme: trimmed_str(entry.get("theme"))
                        .unwrap_or_else(|| DEFAULT_THEME_NAME.to_string()),
                    reason: trimmed_str(entry.get("reason"))
                        .unwrap_or_else(|| DEFAULT_THEME_REASON.to_string()),
                    questions,
                })
            })
            .collect();

        if themes.is_empty() {
            debug!(topic = %topic, "Theme payload empty after filtering; using generated themes");
            return self.generator.generate_themes(topic);
        }

        let mut total = bounds::question_total(&themes);
        if total < MIN_SEED_QUESTIONS {
            let mut seen: HashSet<String> = themes
                .iter()
                .flat_map(|t| t.questions.iter())
                .map(|q| q.to_lowercase())
                .collect();
            let fallback = self.generator.generate_themes(topic);
            let backfill: Vec<String> = fallback
                .questions()
                .filter(|q| seen.insert(q.to_lowercase()))
                .take(MIN_SEED_QUESTIONS - total)
                .map(str::to_string)
                .collect();
            debug!(
                topic = %topic,
                had = total,
                added = backfill.len(),
                "Backfilled themes from generated questions"
            );
            total += backfill.len();
            if let Some(last) = themes.last_mut() {
                last.questions.extend(backfill);
            }
        }
        debug_assert!(total >= MIN_SEED_QUESTIONS);

        NormalizedThemes::from_checked(bounds::finish_themes(topic, themes))
    }

    /// Bound a follow-up payload to [3, 7] unique, ranked items with a contrarian one.
    ///
    /// Accepts a bare array or `{"expansions": [...]}`; items may be objects
    /// with a `question` field or plain strings.
    pub fn normalize_expansions(
        &self,
        seed: &str,
        parent_title: Option<&str>,
        raw: Option<&Value>,
    ) -> NormalizedExpansions {
        let parent_title = parent_title.map(str::trim).filter(|t| !t.is_empty());
        let entries = match raw {
            Some(Value::Array(items)) => Some(items),
            Some(Value::Object(object)) => object.get("expansions").and_then(Value::as_array),
            _ => None,
        };
        let entries = match entries {
            Some(items) if !items.is_empty() => items,
            _ => {
                debug!(seed = %seed, "Expansion payload unusable; using generated follow-ups");
                return self.generator.generate_expansions(seed, parent_title);
            }
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut items: Vec<ExpansionSuggestion> = Vec::new();
        for entry in entries {
            let (question, why, category) = match entry {
                Value::String(_) => (trimmed_str(Some(entry)), None, None),
                Value::Object(object) => (
                    trimmed_str(object.get("question")),
                    trimmed_str(object.get("why")),
                    trimmed_str(object.get("category")),
                ),
                _ => (None, None, None),
            };
            let Some(question) = question else { continue };
            if !seen.insert(question.to_lowercase()) {
                continue;
            }
            items.push(ExpansionSuggestion {
                rank: items.len() as u32 + 1,
                question,
                why: why.unwrap_or_else(|| FOLLOW_UP_WHY.to_string()),
                category: category.unwrap_or_else(|| FOLLOW_UP_CATEGORY.to_string()),
            });
        }

        if items.len() < MIN_EXPANSIONS {
            let fallback = self.generator.generate_expansions(seed, parent_title);
            for entry in fallback.into_vec() {
                if items.len() >= MIN_EXPANSIONS {
                    break;
                }
                if seen.insert(entry.question.to_lowercase()) {
                    items.push(entry);
                }
            }
            debug!(seed = %seed, count = items.len(), "Backfilled follow-ups");
        }

        NormalizedExpansions::from_checked(bounds::finish_expansions(parent_title, items))
    }

    /// Repair an answer payload, or `None` when it carries no answer text.
    pub fn coerce_answer(&self, raw: Option<&Value>) -> Option<AnswerDraft> {
        let object = raw?.as_object()?;
        let answer = trimmed_str(object.get("answer"))?;

        let confidence = object
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);

        let mut assumptions = string_list(object.get("assumptions"));
        if assumptions.is_empty() {
            assumptions.push(FALLBACK_ASSUMPTION.to_string());
        }

        let next_step = trimmed_str(field(object, &["nextStep", "next_step"]))
            .unwrap_or_else(|| DEFAULT_NEXT_STEP.to_string());

        Some(AnswerDraft::from_checked(AnswerSuggestion {
            answer,
            confidence,
            assumptions,
            next_step,
        }))
    }

    /// Keep a generated summary only if it has at least 10 characters after trimming.
    pub fn ensure_summary(&self, graph: &Graph, raw: Option<&str>) -> String {
        match raw.map(str::trim) {
            Some(text) if text.chars().count() >= MIN_SUMMARY_CHARS => text.to_string(),
            _ => self.generator.generate_summary(graph),
        }
    }
}

/// Read the Markdown field of a summary payload.
pub fn summary_markdown(raw: Option<&Value>) -> Option<&str> {
    raw?.as_object()
        .and_then(|object| field(object, &["summaryMarkdown", "summary_markdown"]))
        .and_then(Value::as_str)
}
