//! Multi-strategy JSON recovery from free-form model output.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or
//! markdown fences. Strategies run in order of strictness; the final
//! fallback is a sentinel value, never an error.

use regex::Regex;
use serde_json::{json, Map, Value};

/// Minimum key count for an object found by the loose regex scan to be
/// accepted as the analysis payload rather than an incidental fragment.
const MIN_CANDIDATE_KEYS: usize = 3;

/// Outcome of JSON recovery. Callers must branch on `Fallback` — the raw
/// text is still useful downstream, but it is not structured data.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovered {
    Parsed(Value),
    Fallback { raw_text: String },
}

impl Recovered {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Recovered::Fallback { .. })
    }

    /// The recovered object, or the sentinel record
    /// `{"raw_analysis": …, "parsing_error": true}`.
    pub fn into_json(self) -> Value {
        match self {
            Recovered::Parsed(value) => value,
            Recovered::Fallback { raw_text } => json!({
                "raw_analysis": raw_text,
                "parsing_error": true,
            }),
        }
    }

    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            Recovered::Parsed(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// Recover one JSON object from model text. Strategies, first hit wins:
/// whole-string parse, ```json fenced block, brace-depth matched span,
/// regex candidate scan, depth-aware line scan, raw-text fallback.
pub fn recover_json(text: &str) -> Recovered {
    let strategies = [
        parse_direct,
        parse_fenced,
        parse_brace_matched,
        parse_regex_candidates,
        parse_line_scan,
    ];

    for strategy in strategies {
        if let Some(value) = strategy(text) {
            return Recovered::Parsed(value);
        }
    }

    Recovered::Fallback {
        raw_text: text.to_string(),
    }
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

fn parse_direct(text: &str) -> Option<Value> {
    parse_object(text.trim())
}

fn parse_fenced(text: &str) -> Option<Value> {
    let start = text.find("```json")? + "```json".len();
    let end = text[start..].find("```")? + start;
    parse_object(text[start..end].trim())
}

fn parse_brace_matched(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let span = brace_span(&text[start..])?;
    parse_object(span)
}

/// The prefix of `text` (which must start at a `{`) up to and including the
/// matching closing brace. Depth counting skips braces inside string
/// literals so nested objects and trailing prose braces don't confuse it.
fn brace_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..idx + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_regex_candidates(text: &str) -> Option<Value> {
    // Tolerates up to three levels of nesting, which covers the records the
    // providers are asked for.
    let pattern =
        Regex::new(r"(?s)\{(?:[^{}]|(?:\{(?:[^{}]|\{[^{}]*\})*\}))*\}").unwrap();

    for candidate in pattern.find_iter(text) {
        if let Some(value) = parse_object(candidate.as_str()) {
            let keys = value.as_object().map(Map::len).unwrap_or(0);
            if keys > MIN_CANDIDATE_KEYS {
                return Some(value);
            }
        }
    }

    None
}

fn parse_line_scan(text: &str) -> Option<Value> {
    let mut collected = Vec::new();
    let mut depth = 0isize;
    let mut in_json = false;

    for line in text.lines() {
        let stripped = line.trim();
        if !in_json && !stripped.starts_with('{') {
            continue;
        }
        in_json = true;
        collected.push(line);
        depth += line.matches('{').count() as isize;
        depth -= line.matches('}').count() as isize;
        if depth <= 0 {
            break;
        }
    }

    if collected.is_empty() {
        return None;
    }
    parse_object(&collected.join("\n"))
}
