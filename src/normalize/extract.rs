//! Structured payload extraction from free-form completion text.
//!
//! Generated text is often almost-JSON: wrapped in a Markdown fence, or
//! preceded by a sentence of prose. Extraction tries, in order:
//!
//! 1. the whole trimmed text as JSON
//! 2. the body of the first fenced code block
//! 3. the first outermost balanced `{...}` or `[...]` region that parses
//!
//! A JSON `null` counts as no payload.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("fence pattern is a valid regex")
    })
}

fn parse(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate.trim())
        .ok()
        .filter(|v| !v.is_null())
}

/// Extract the first usable JSON value from completion text.
pub fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(value) = parse(trimmed) {
        return Some(value);
    }

    if let Some(body) = fence_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
    {
        if let Some(value) = parse(body.as_str()) {
            return Some(value);
        }
    }

    balanced_regions(trimmed).into_iter().find_map(parse)
}

/// Outermost balanced `{...}` / `[...]` regions of `text`, in order, found in one pass.
///
/// Brackets inside JSON string literals (with escapes) are ignored. A
/// mismatched closer abandons every open bracket. Regions nested inside a
/// larger balanced region are not returned, so the returned regions are
/// disjoint and parsing all of them stays linear in the input.
fn balanced_regions(text: &str) -> Vec<&str> {
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut regions: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(('}', idx)),
            '[' => open.push((']', idx)),
            '}' | ']' => match open.pop() {
                Some((close, start)) if close == c => {
                    while regions.last().is_some_and(|&(inner, _)| inner >= start) {
                        regions.pop();
                    }
                    regions.push((start, idx + c.len_utf8()));
                }
                Some(_) => open.clear(),
                None => {}
            },
            _ => {}
        }
    }

    regions
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .collect()
}
