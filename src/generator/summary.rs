//! Markdown digest built purely from graph contents.

use std::collections::BTreeSet;

use crate::types::{Graph, Node, NodeKind, Relation};

const MAX_LISTED: usize = 5;

const NO_INSIGHTS: &str = "- Insights will appear once questions are expanded.";
const NO_DECISIONS: &str = "- No decisions drafted yet.";
const NO_OPEN_QUESTIONS: &str = "- All surfaced questions have draft answers.";
const CLOSING_ACTION: &str = "- Schedule a synthesis session to align on decisions.";

fn bullet_list(lines: Vec<String>, empty: &str) -> String {
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

/// Sections: Context, Key Insights, Decisions, Open Questions, Next Actions.
pub fn build_summary(graph: &Graph) -> String {
    let questions: Vec<&Node> = graph.questions().collect();
    let answered: BTreeSet<_> = graph
        .edges()
        .iter()
        .filter(|e| e.relation == Relation::Answers)
        .map(|e| &e.source_id)
        .collect();

    let context = match graph.root() {
        Some(root) => format!(
            "Exploring **{}** with {} guiding questions.",
            root.title,
            questions.len()
        ),
        None => "Exploration snapshot.".to_string(),
    };

    let insights = questions
        .iter()
        .take(MAX_LISTED)
        .map(|q| format!("- {}", q.title))
        .collect();

    let mut decisions = Vec::new();
    let mut next_actions = Vec::new();
    for node in graph.nodes() {
        match &node.kind {
            NodeKind::Answer { next_step, .. } => {
                decisions.push(format!(
                    "- {}: {}",
                    node.title,
                    node.body.as_deref().unwrap_or_default()
                ));
                next_actions.push(format!("- {}", next_step));
            }
            NodeKind::Topic
            | NodeKind::Question { .. }
            | NodeKind::Insight
            | NodeKind::Decision
            | NodeKind::Reference => {}
        }
    }
    next_actions.push(CLOSING_ACTION.to_string());

    let open = questions
        .iter()
        .filter(|q| !answered.contains(&q.id))
        .take(MAX_LISTED)
        .map(|q| format!("- {}", q.title))
        .collect();

    [
        "## Context".to_string(),
        context,
        "\n## Key Insights".to_string(),
        bullet_list(insights, NO_INSIGHTS),
        "\n## Decisions".to_string(),
        bullet_list(decisions, NO_DECISIONS),
        "\n## Open Questions".to_string(),
        bullet_list(open, NO_OPEN_QUESTIONS),
        "\n## Next Actions".to_string(),
        next_actions.join("\n"),
    ]
    .join("\n")
}
