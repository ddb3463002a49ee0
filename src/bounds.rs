//! Size bounds and contrarian checks shared by the normalizer and the generator.

use crate::types::{ExpansionSuggestion, ThemeSuggestion};

/// Fewest questions a seeded graph may hold.
pub const MIN_SEED_QUESTIONS: usize = 6;
/// Most questions a seeded graph may hold.
pub const MAX_SEED_QUESTIONS: usize = 10;
/// Most questions kept from a single raw theme.
pub const MAX_QUESTIONS_PER_THEME: usize = 10;
/// Fewest follow-ups an expansion yields.
pub const MIN_EXPANSIONS: usize = 3;
/// Most follow-ups an expansion yields.
pub const MAX_EXPANSIONS: usize = 7;
/// Questions at this depth cannot be expanded.
pub const MAX_QUESTION_DEPTH: u32 = 2;
/// Generated summaries shorter than this (after trimming) are replaced.
pub const MIN_SUMMARY_CHARS: usize = 10;
/// Confidence used when a draft carries none.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

const THEME_CONTRARIAN_TOKENS: &[&str] = &["prove", "wrong", "fail", "disconfirm"];
const EXPANSION_CONTRARIAN_TOKENS: &[&str] = &["abandon", "wrong", "prove", "fail", "stop"];

pub(crate) const CONTRARIAN_THEME_NAME: &str = "Contrarian Checks";
pub(crate) const CONTRARIAN_THEME_REASON: &str = "Add a falsification lens to avoid groupthink.";
pub(crate) const CONTRARIAN_WHY: &str = "A contrarian check that actively seeks disconfirming evidence.";
pub(crate) const CONTRARIAN_CATEGORY: &str = "contrarian";

fn contains_any(text: &str, tokens: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    tokens.iter().any(|t| lowered.contains(t))
}

/// Whether a guiding question seeks disconfirming evidence.
pub fn is_contrarian_question(text: &str) -> bool {
    contains_any(text, THEME_CONTRARIAN_TOKENS)
}

/// Whether a follow-up question seeks disconfirming evidence.
pub fn is_contrarian_expansion(text: &str) -> bool {
    contains_any(text, EXPANSION_CONTRARIAN_TOKENS)
}

pub(crate) fn contrarian_question(topic: &str) -> String {
    format!(
        "What observable signal would prove that our approach to {} is wrong?",
        topic
    )
}

pub(crate) fn contrarian_expansion(parent_title: Option<&str>, rank: u32) -> ExpansionSuggestion {
    ExpansionSuggestion {
        rank,
        question: format!(
            "What would convince us to abandon \"{}\" entirely?",
            parent_title.unwrap_or("this direction")
        ),
        why: CONTRARIAN_WHY.to_string(),
        category: CONTRARIAN_CATEGORY.to_string(),
    }
}

pub(crate) fn question_total(themes: &[ThemeSuggestion]) -> usize {
    themes.iter().map(|t| t.questions.len()).sum()
}

/// Add a contrarian question if none is present, then trim to the seed maximum.
///
/// Trimming walks from the last theme backward and never removes the only
/// contrarian question; themes left empty are dropped.
pub(crate) fn finish_themes(topic: &str, mut themes: Vec<ThemeSuggestion>) -> Vec<ThemeSuggestion> {
    let has_contrarian = themes
        .iter()
        .any(|t| t.questions.iter().any(|q| is_contrarian_question(q)));

    if !has_contrarian {
        let question = contrarian_question(topic);
        match themes.last_mut() {
            Some(last) => last.questions.push(question),
            None => themes.push(ThemeSuggestion {
                theme: CONTRARIAN_THEME_NAME.to_string(),
                reason: CONTRARIAN_THEME_REASON.to_string(),
                questions: vec![question],
            }),
        }
    }

    trim_themes(&mut themes, MAX_SEED_QUESTIONS);
    themes
}

fn trim_themes(themes: &mut Vec<ThemeSuggestion>, max: usize) {
    let mut excess = question_total(themes).saturating_sub(max);
    let mut contrarian_left = themes
        .iter()
        .flat_map(|t| t.questions.iter())
        .filter(|q| is_contrarian_question(q))
        .count();

    for theme in themes.iter_mut().rev() {
        if excess == 0 {
            break;
        }
        let mut idx = theme.questions.len();
        while excess > 0 && idx > 0 {
            idx -= 1;
            let contrarian = is_contrarian_question(&theme.questions[idx]);
            if contrarian && contrarian_left == 1 {
                continue;
            }
            if contrarian {
                contrarian_left -= 1;
            }
            theme.questions.remove(idx);
            excess -= 1;
        }
    }

    themes.retain(|t| !t.questions.is_empty());
}

/// Make sure a contrarian follow-up survives, cap at the maximum and re-rank 1..n.
pub(crate) fn finish_expansions(
    parent_title: Option<&str>,
    mut items: Vec<ExpansionSuggestion>,
) -> Vec<ExpansionSuggestion> {
    items.truncate(MAX_EXPANSIONS);
    if !items.iter().any(|i| is_contrarian_expansion(&i.question)) {
        items.truncate(MAX_EXPANSIONS - 1);
        items.push(contrarian_expansion(parent_title, 0));
    }
    for (idx, item) in items.iter_mut().enumerate() {
        item.rank = idx as u32 + 1;
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(name: &str, questions: &[&str]) -> ThemeSuggestion {
        ThemeSuggestion {
            theme: name.to_string(),
            reason: "r".to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[test]
    fn test_contrarian_matching_is_case_insensitive() {
        assert!(is_contrarian_question("How could this FAIL?"));
        assert!(is_contrarian_question("What would Disconfirm it?"));
        assert!(!is_contrarian_question("Who benefits?"));
        assert!(is_contrarian_expansion("When should we STOP?"));
        assert!(!is_contrarian_expansion("What would disconfirm this?"));
    }

    #[test]
    fn test_finish_themes_appends_contrarian_to_last_theme() {
        let themes = finish_themes("Pricing", vec![theme("A", &["a1", "a2"]), theme("B", &["b1"])]);
        assert_eq!(themes[1].questions.len(), 2);
        assert!(is_contrarian_question(&themes[1].questions[1]));
        assert!(themes[1].questions[1].contains("Pricing"));
    }

    #[test]
    fn test_finish_themes_keeps_contrarian_when_trimming() {
        let themes = finish_themes(
            "Pricing",
            vec![
                theme("A", &["a1", "a2", "a3", "a4"]),
                theme("B", &["b1", "b2", "b3", "b4"]),
                theme("C", &["c1", "c2", "c3"]),
            ],
        );
        assert_eq!(question_total(&themes), MAX_SEED_QUESTIONS);
        let contrarian = themes
            .iter()
            .flat_map(|t| t.questions.iter())
            .filter(|q| is_contrarian_question(q))
            .count();
        assert_eq!(contrarian, 1);
        assert_eq!(themes[0].questions, vec!["a1", "a2", "a3", "a4"]);
        assert_eq!(themes[1].questions, vec!["b1", "b2", "b3", "b4"]);
    }

    #[test]
    fn test_trim_prunes_emptied_themes() {
        let themes = finish_themes(
            "X",
            vec![
                theme("A", &["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "will it fail?"]),
                theme("B", &["b1", "b2"]),
            ],
        );
        assert_eq!(themes.len(), 1);
        assert_eq!(question_total(&themes), MAX_SEED_QUESTIONS);
    }

    #[test]
    fn test_finish_expansions_caps_and_reranks() {
        let items: Vec<_> = (0..9)
            .map(|i| ExpansionSuggestion {
                rank: 42,
                question: format!("Follow-up {}", i),
                why: "w".to_string(),
                category: "follow_up".to_string(),
            })
            .collect();
        let finished = finish_expansions(Some("Parent"), items);
        assert_eq!(finished.len(), MAX_EXPANSIONS);
        assert!(is_contrarian_expansion(&finished.last().unwrap().question));
        let ranks: Vec<_> = finished.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, (1..=7).collect::<Vec<_>>());
    }
}
