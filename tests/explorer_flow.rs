//! End-to-end exploration sessions against a scripted generation backend.
//!
//! Covers payload recovery (fenced, prose, garbage), depth and answer
//! invariants, and the difference between fallback and strict sessions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thinking_map::{
    DeterministicGenerator, Error, Explorer, ExplorerConfig, GenerationError, InvariantViolation,
    NodeId, NodeKind, Relation, ScriptedBackend, ScriptedCall,
};

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

const FENCED_THEMES: &str = r#"Sure, here is a breakdown:

```json
{
  "themes": [
    {"theme": "Buyers", "reason": "Who decides", "questions": ["Who signs the contract?", "Who pays first?", "Who blocks the deal?"]},
    {"theme": "Risks", "reason": "What breaks", "questions": ["What could fail first?", "Which channel stalls?", "What do we skip?"]}
  ]
}
```
Let me know if you need more."#;

const PROSE_EXPANSIONS: &str = r#"Here are some follow-ups: [{"question": "Which tier sells first?"}, "Who pays monthly?", "who pays monthly?", {"question": "When should we stop discounting?", "category": "contrarian"}] Hope that helps."#;

fn scripted() -> Arc<ScriptedBackend> {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_themes(Ok(FENCED_THEMES.to_string()));
    backend
}

async fn session(config: ExplorerConfig, backend: &Arc<ScriptedBackend>) -> Explorer {
    let mut explorer = Explorer::new(config).with_backend(backend.clone());
    explorer.start("Pricing").await.unwrap();
    explorer
}

fn first_question(explorer: &Explorer) -> NodeId {
    let graph = explorer.graph().unwrap();
    graph.children(&graph.root_id, Relation::Expands)[0].id.clone()
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload Recovery
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fenced_theme_payload_is_used() {
    let backend = scripted();
    let explorer = session(ExplorerConfig::default(), &backend).await;
    let graph = explorer.graph().unwrap();

    let titles: Vec<&str> = graph
        .children(&graph.root_id, Relation::Expands)
        .iter()
        .map(|n| n.title.as_str())
        .collect();
    assert_eq!(titles.len(), 6);
    assert_eq!(titles[0], "Who signs the contract?");
    assert_eq!(titles[4], "Which channel stalls?");

    let framing = match &graph.node(&NodeId::from("q-4")).unwrap().kind {
        NodeKind::Question { framing, priority } => {
            assert_eq!(*priority, Some(4));
            framing.clone()
        }
        other => panic!("expected question, got {}", other),
    };
    assert_eq!(framing.as_deref(), Some("Risks"));
}

#[tokio::test]
async fn test_prose_expansion_payload_is_deduplicated() {
    let backend = scripted();
    backend.push_expansion(Ok(PROSE_EXPANSIONS.to_string()));
    let mut explorer = session(ExplorerConfig::default(), &backend).await;
    let parent = first_question(&explorer);

    let children = explorer.expand(&parent).await.unwrap();
    let titles: Vec<String> = children
        .iter()
        .map(|id| explorer.store().node(id).unwrap().title.clone())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Which tier sells first?",
            "Who pays monthly?",
            "When should we stop discounting?",
        ]
    );

    let priorities: Vec<Option<u32>> = children
        .iter()
        .map(|id| match explorer.store().node(id).unwrap().kind {
            NodeKind::Question { priority, .. } => priority,
            _ => None,
        })
        .collect();
    assert_eq!(priorities, vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_garbage_payload_falls_back_to_generated_content() {
    let backend = scripted();
    backend.push_expansion(Ok("I'm sorry, I can't help with that.".to_string()));
    let mut explorer = session(ExplorerConfig::default(), &backend).await;
    let parent = first_question(&explorer);
    let title = explorer.store().node(&parent).unwrap().title.clone();

    let children = explorer.expand(&parent).await.unwrap();
    let expected = DeterministicGenerator::new().generate_expansions(parent.as_str(), Some(&title));
    let titles: Vec<&str> = children
        .iter()
        .map(|id| explorer.store().node(id).unwrap().title.as_str())
        .collect();
    let expected: Vec<&str> = expected.items().iter().map(|i| i.question.as_str()).collect();
    assert_eq!(titles, expected);
}

#[tokio::test]
async fn test_missing_backend_reply_falls_back() {
    let backend = Arc::new(ScriptedBackend::new());
    let explorer = session(ExplorerConfig::default(), &backend).await;

    let expected = DeterministicGenerator::new().generate_themes("Pricing");
    assert_eq!(explorer.graph().unwrap().questions().count(), expected.question_count());
}

// ─────────────────────────────────────────────────────────────────────────────
// Depth and Answer Invariants
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_expansion_depth_is_capped() {
    let mut explorer = Explorer::new(ExplorerConfig::default());
    explorer.start("Pricing").await.unwrap();
    let parent = first_question(&explorer);

    let children = explorer.expand(&parent).await.unwrap();
    for child in &children {
        assert_eq!(explorer.store().node(child).unwrap().depth, 2);
    }

    let err = explorer.expand(&children[0]).await.unwrap_err();
    assert_eq!(
        err,
        Error::Invariant(InvariantViolation::MaxDepthReached {
            node_id: children[0].clone(),
            depth: 2,
            max: 2,
        })
    );
    assert_eq!(err.code(), "INVARIANT_VIOLATION");
}

#[tokio::test]
async fn test_duplicate_expand_is_rejected_without_backend_call() {
    let backend = scripted();
    backend.push_expansion(Ok(PROSE_EXPANSIONS.to_string()));
    let mut explorer = session(ExplorerConfig::default(), &backend).await;
    let parent = first_question(&explorer);

    explorer.expand(&parent).await.unwrap();
    assert_eq!(
        explorer.expand(&parent).await,
        Err(Error::Invariant(InvariantViolation::AlreadyExpanded(parent.clone())))
    );

    let expand_calls = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, ScriptedCall::Expand(..)))
        .count();
    assert_eq!(expand_calls, 1);
}

#[tokio::test]
async fn test_answer_upsert_keeps_one_answer() {
    let backend = scripted();
    backend
        .push_answer(Ok(r#"{"answer": "Run a pilot", "confidence": 1.4, "assumptions": [], "nextStep": "Book the room"}"#.to_string()))
        .push_answer(Ok(r#"{"answer": "Run two pilots", "confidence": 0.3, "assumptions": ["Budget holds"]}"#.to_string()));
    let mut explorer = session(ExplorerConfig::default(), &backend).await;
    let question = first_question(&explorer);

    let first = explorer.draft_answer(&question, Some("keep it cheap")).await.unwrap();
    match &explorer.store().node(&first).unwrap().kind {
        NodeKind::Answer {
            confidence,
            assumptions,
            next_step,
        } => {
            assert_eq!(*confidence, 1.0);
            assert!(!assumptions.is_empty());
            assert_eq!(next_step, "Book the room");
        }
        other => panic!("expected answer, got {}", other),
    }

    let second = explorer.draft_answer(&question, None).await.unwrap();
    assert_eq!(first, second);

    let graph = explorer.graph().unwrap();
    let answers = graph.children(&question, Relation::Answers);
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].body.as_deref(), Some("Run two pilots"));
    assert_eq!(answers[0].title, "Answer to Who signs the contract?");

    assert!(backend.calls().contains(&ScriptedCall::Answer(
        question.clone(),
        "Who signs the contract?".to_string(),
        Some("keep it cheap".to_string()),
    )));
}

#[tokio::test]
async fn test_answer_on_answer_node_is_rejected() {
    let mut explorer = Explorer::new(ExplorerConfig::default());
    explorer.start("Pricing").await.unwrap();
    let question = first_question(&explorer);
    let answer = explorer.draft_answer(&question, None).await.unwrap();

    assert!(matches!(
        explorer.draft_answer(&answer, None).await,
        Err(Error::Invariant(InvariantViolation::NotAQuestion(_)))
    ));
    assert!(matches!(
        explorer.draft_answer(&NodeId::from("q-404"), None).await,
        Err(Error::Invariant(InvariantViolation::QuestionNotFound(_)))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Strict Sessions
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_strict_failure_leaves_state_untouched() {
    let backend = scripted();
    backend.push_expansion(Err(GenerationError::Transport("connection reset".to_string())));
    let mut explorer = session(ExplorerConfig::strict(), &backend).await;
    let parent = first_question(&explorer);
    let before = explorer.graph().unwrap().fingerprint();
    let positions = explorer.store().positions().clone();

    let err = explorer.expand(&parent).await.unwrap_err();
    assert_eq!(
        err,
        Error::Generation(GenerationError::Transport("connection reset".to_string()))
    );
    assert_eq!(err.code(), "GENERATION_FAILURE");

    assert_eq!(explorer.graph().unwrap().fingerprint(), before);
    assert_eq!(explorer.store().positions(), &positions);
    assert!(!explorer.store().node(&parent).unwrap().flags.expanded);
}

#[tokio::test]
async fn test_strict_rejects_unusable_payloads() {
    let backend = scripted();
    backend
        .push_answer(Ok("   ".to_string()))
        .push_answer(Ok(r#"{"confidence": 0.9}"#.to_string()))
        .push_summary(Ok("no json here".to_string()));
    let mut explorer = session(ExplorerConfig::strict(), &backend).await;
    let question = first_question(&explorer);

    assert_eq!(
        explorer.draft_answer(&question, None).await,
        Err(Error::Generation(GenerationError::EmptyResponse))
    );
    assert!(matches!(
        explorer.draft_answer(&question, None).await,
        Err(Error::Generation(GenerationError::Unparsable(_)))
    ));
    assert!(explorer.graph().unwrap().answer_edge(&question).is_none());

    assert_eq!(
        explorer.summarize().await,
        Err(Error::Generation(GenerationError::Unparsable(
            "no json here".to_string()
        )))
    );
}

#[tokio::test]
async fn test_summary_payload_without_markdown() {
    let payload = r#"{"summary": "A digest under the wrong key."}"#;

    let backend = scripted();
    backend.push_summary(Ok(payload.to_string()));
    let strict = session(ExplorerConfig::strict(), &backend).await;
    assert_eq!(
        strict.summarize().await,
        Err(Error::Generation(GenerationError::Unparsable(
            "payload has no summaryMarkdown".to_string()
        )))
    );

    let backend = scripted();
    backend.push_summary(Ok(payload.to_string()));
    let lenient = session(ExplorerConfig::default(), &backend).await;
    let graph = lenient.graph().unwrap();
    assert_eq!(
        lenient.summarize().await.unwrap(),
        DeterministicGenerator::new().generate_summary(graph)
    );
}

#[tokio::test]
async fn test_bracket_flood_reply_falls_back_quickly() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_themes(Ok(format!("Thinking {}", "{".repeat(40_000))));

    let started = Instant::now();
    let explorer = session(ExplorerConfig::default(), &backend).await;
    assert!(started.elapsed() < Duration::from_secs(2));

    let expected = DeterministicGenerator::new().generate_themes("Pricing");
    assert_eq!(explorer.graph().unwrap().questions().count(), expected.question_count());
}

#[tokio::test]
async fn test_strict_start_failure_keeps_previous_graph() {
    let backend = scripted();
    let mut explorer = session(ExplorerConfig::strict(), &backend).await;
    let before = explorer.graph().unwrap().fingerprint();

    assert!(matches!(
        explorer.start("Hiring").await,
        Err(Error::Generation(GenerationError::Transport(_)))
    ));
    let graph = explorer.graph().unwrap();
    assert_eq!(graph.fingerprint(), before);
    assert_eq!(graph.root().unwrap().title, "Pricing");
}

// ─────────────────────────────────────────────────────────────────────────────
// Reseeding and Summaries
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_regenerate_discards_question_layer() {
    let backend = scripted();
    backend.push_expansion(Ok(PROSE_EXPANSIONS.to_string()));
    let mut explorer = session(ExplorerConfig::default(), &backend).await;
    let parent = first_question(&explorer);
    let children = explorer.expand(&parent).await.unwrap();

    let created = explorer.regenerate_themes().await.unwrap();
    let graph = explorer.graph().unwrap();
    assert_eq!(graph.num_nodes(), created.len() + 1);
    assert_eq!(graph.num_edges(), created.len());
    assert!(!graph.contains_node(&children[0]));
    assert!(graph.questions().all(|q| q.depth == 1 && !q.flags.expanded));
    assert_eq!(explorer.store().selected(), Some(&graph.root_id));

    let themes_calls = backend
        .calls()
        .into_iter()
        .filter(|c| *c == ScriptedCall::Themes("Pricing".to_string()))
        .count();
    assert_eq!(themes_calls, 2);
}

#[tokio::test]
async fn test_summary_from_backend_or_fallback() {
    let backend = scripted();
    backend
        .push_summary(Ok(r#"{"summaryMarkdown": "  # Pricing\n\nShip the annual plan first.  "}"#.to_string()))
        .push_summary(Ok(r#"{"summaryMarkdown": "short"}"#.to_string()));
    let explorer = session(ExplorerConfig::default(), &backend).await;

    assert_eq!(
        explorer.summarize().await.unwrap(),
        "# Pricing\n\nShip the annual plan first."
    );

    let fallback = explorer.summarize().await.unwrap();
    let graph = explorer.graph().unwrap();
    assert_eq!(fallback, DeterministicGenerator::new().generate_summary(graph));

    let fingerprint = graph.fingerprint();
    assert!(backend
        .calls()
        .contains(&ScriptedCall::Summary(fingerprint)));
}
