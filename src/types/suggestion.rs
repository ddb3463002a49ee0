//! Suggestion payloads exchanged with the generation collaborator.
//!
//! The raw shapes (`ThemeSuggestion`, `ExpansionSuggestion`, `AnswerSuggestion`)
//! mirror the collaborator's wire format. The normalized shapes
//! (`NormalizedThemes`, `NormalizedExpansions`, `AnswerDraft`) can only be
//! built inside this crate by the normalizer or the deterministic generator,
//! so anything handed to the graph store is already bounded and repaired.

use serde::{Deserialize, Serialize};

/// A named grouping of initial guiding questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSuggestion {
    /// Theme name.
    pub theme: String,
    /// Why this angle matters.
    pub reason: String,
    /// Guiding questions under this theme.
    pub questions: Vec<String>,
}

/// Collaborator response to a theme request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeResponse {
    /// Suggested themes.
    pub themes: Vec<ThemeSuggestion>,
}

/// One suggested follow-up question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionSuggestion {
    /// 1-based rank among siblings.
    pub rank: u32,
    /// Question text.
    pub question: String,
    /// Why the follow-up is worth asking.
    pub why: String,
    /// Free-form category (`follow_up`, `contrarian`, ...).
    pub category: String,
}

/// A drafted answer to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSuggestion {
    /// Answer text.
    pub answer: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Assumptions behind the answer.
    pub assumptions: Vec<String>,
    /// Suggested next step.
    pub next_step: String,
}

/// Collaborator response to a summary request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    /// Markdown digest.
    pub summary_markdown: String,
}

/// Themes holding between 6 and 10 questions in total, at least one of them contrarian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedThemes(Vec<ThemeSuggestion>);

impl NormalizedThemes {
    pub(crate) fn from_checked(themes: Vec<ThemeSuggestion>) -> Self {
        Self(themes)
    }

    /// The themes in order.
    pub fn themes(&self) -> &[ThemeSuggestion] {
        &self.0
    }

    /// Total question count across themes.
    pub fn question_count(&self) -> usize {
        self.0.iter().map(|t| t.questions.len()).sum()
    }

    /// Every question, flattened in theme order.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flat_map(|t| t.questions.iter().map(String::as_str))
    }

    /// Wire form.
    pub fn into_response(self) -> ThemeResponse {
        ThemeResponse { themes: self.0 }
    }
}

/// Between 3 and 7 ranked follow-ups, unique by case-insensitive text, at least one contrarian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedExpansions(Vec<ExpansionSuggestion>);

impl NormalizedExpansions {
    pub(crate) fn from_checked(items: Vec<ExpansionSuggestion>) -> Self {
        Self(items)
    }

    /// The follow-ups in rank order.
    pub fn items(&self) -> &[ExpansionSuggestion] {
        &self.0
    }

    /// Number of follow-ups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no follow-ups.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wire form.
    pub fn into_vec(self) -> Vec<ExpansionSuggestion> {
        self.0
    }
}

/// An answer with non-empty text, clamped confidence and at least one assumption.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnswerDraft(AnswerSuggestion);

impl AnswerDraft {
    pub(crate) fn from_checked(answer: AnswerSuggestion) -> Self {
        Self(answer)
    }

    /// Answer text.
    pub fn answer(&self) -> &str {
        &self.0.answer
    }

    /// Confidence in [0, 1].
    pub fn confidence(&self) -> f64 {
        self.0.confidence
    }

    /// Non-empty assumptions.
    pub fn assumptions(&self) -> &[String] {
        &self.0.assumptions
    }

    /// Next step.
    pub fn next_step(&self) -> &str {
        &self.0.next_step
    }

    /// Wire form.
    pub fn into_suggestion(self) -> AnswerSuggestion {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_wire_uses_camel_case() {
        let raw = r#"{"answer":"Pilot","confidence":0.7,"assumptions":["a"],"nextStep":"Write memo"}"#;
        let parsed: AnswerSuggestion = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.next_step, "Write memo");
    }

    #[test]
    fn test_normalized_themes_counts() {
        let themes = NormalizedThemes::from_checked(vec![
            ThemeSuggestion {
                theme: "A".to_string(),
                reason: "r".to_string(),
                questions: vec!["one".to_string(), "two".to_string()],
            },
            ThemeSuggestion {
                theme: "B".to_string(),
                reason: "r".to_string(),
                questions: vec!["three".to_string()],
            },
        ]);
        assert_eq!(themes.question_count(), 3);
        assert_eq!(themes.questions().collect::<Vec<_>>(), vec!["one", "two", "three"]);
    }
}
