//! Performance benchmarks for payload normalization and graph seeding.
//!
//! Run with: `cargo bench --bench normalization`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | JSON extraction | <50µs p99 | Fenced or prose-wrapped payloads |
//! | Theme normalization | <100µs p99 | Including trim and backfill |
//! | Seed + layout | <1ms p99 | 10 questions |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use thinking_map::{extract_json, DeterministicGenerator, GraphStore, SuggestionNormalizer};

/// A theme payload with `themes` groups of `per_theme` questions each.
fn make_themes(themes: usize, per_theme: usize) -> Value {
    let themes: Vec<Value> = (0..themes)
        .map(|t| {
            let questions: Vec<String> = (0..per_theme)
                .map(|q| format!("Question {} under theme {}?", q, t))
                .collect();
            json!({"theme": format!("Theme {}", t), "reason": "bench", "questions": questions})
        })
        .collect();
    json!({ "themes": themes })
}

/// Benchmark extraction across payload wrappings.
fn bench_extract_json(c: &mut Criterion) {
    let payload = make_themes(4, 3).to_string();
    let cases = [
        ("clean", payload.clone()),
        ("fenced", format!("Here you go:\n```json\n{}\n```\nAnything else?", payload)),
        ("prose", format!("Sure thing. {} Let me know.", payload)),
    ];

    let mut group = c.benchmark_group("extract_json");
    for (name, text) in cases.iter() {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("wrapping", name), text, |b, text| {
            b.iter(|| {
                let value = extract_json(black_box(text));
                assert!(value.is_some());
                value
            })
        });
    }
    group.finish();
}

/// Benchmark theme normalization from sparse to oversized payloads.
fn bench_normalize_themes(c: &mut Criterion) {
    let normalizer = SuggestionNormalizer::default();
    let mut group = c.benchmark_group("normalize_themes");

    for (themes, per_theme) in [(1, 2), (3, 3), (6, 10)] {
        let raw = make_themes(themes, per_theme);
        group.throughput(Throughput::Elements((themes * per_theme) as u64));
        group.bench_with_input(
            BenchmarkId::new("questions", themes * per_theme),
            &raw,
            |b, raw| b.iter(|| normalizer.normalize_themes("Pricing Strategy", Some(black_box(raw)))),
        );
    }
    group.finish();
}

/// Benchmark follow-up normalization with duplicates and backfill.
fn bench_normalize_expansions(c: &mut Criterion) {
    let normalizer = SuggestionNormalizer::default();
    let mut group = c.benchmark_group("normalize_expansions");

    for count in [1, 5, 20] {
        let items: Vec<Value> = (0..count)
            .map(|i| json!({"question": format!("Follow-up {}?", i % 4), "why": "bench"}))
            .collect();
        let raw = Value::Array(items);
        group.bench_with_input(BenchmarkId::new("items", count), &raw, |b, raw| {
            b.iter(|| normalizer.normalize_expansions("q-1", Some("Who pays?"), Some(black_box(raw))))
        });
    }
    group.finish();
}

/// Benchmark the deterministic generator.
fn bench_generator(c: &mut Criterion) {
    let generator = DeterministicGenerator::new();

    c.bench_function("generate_themes", |b| {
        b.iter(|| generator.generate_themes(black_box("Pricing Strategy")))
    });
    c.bench_function("generate_expansions", |b| {
        b.iter(|| generator.generate_expansions(black_box("q-1"), Some("Who pays?")))
    });
}

/// Benchmark seeding a fresh graph including layout and fingerprinting.
fn bench_seed_and_layout(c: &mut Criterion) {
    let themes = DeterministicGenerator::new().generate_themes("Pricing Strategy");

    c.bench_function("seed_and_layout", |b| {
        b.iter(|| {
            let mut store = GraphStore::new();
            store.initialize("Pricing Strategy").unwrap();
            let created = store.seed(black_box(&themes)).unwrap();
            assert_eq!(created.len(), themes.question_count());
            store.graph().map(|g| g.fingerprint())
        })
    });
}

criterion_group!(
    benches,
    bench_extract_json,
    bench_normalize_themes,
    bench_normalize_expansions,
    bench_generator,
    bench_seed_and_layout,
);
criterion_main!(benches);
