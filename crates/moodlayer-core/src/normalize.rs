//! Coerce an arbitrary contract return value into an [`AdviceResponse`].
//!
//! The contract has returned, depending on SDK version and call path, plain
//! JSON strings, strings with JSON embedded in prose, byte buffers, single
//! element arrays, and objects wrapping the payload under `result`/`value`/
//! `data`/`response`. Interpretations are tried in a fixed priority order:
//!
//! 1. `Null` → default pair
//! 2. text → whole-string JSON, then embedded `{..}`, then embedded `[..]`,
//!    else the text itself is the advice
//! 3. list → first element (empty → default pair)
//! 4. bytes → UTF-8 text
//! 5. object with string `advice`/`suggested_action` → those fields
//! 6. object with a truthy wrapper field → that field
//! 7. object with a string field holding JSON → that JSON
//! 8. any other object → its compact JSON as the advice
//! 9. scalar → its string form as the advice
//!
//! Embedded extraction is greedy: it spans from the first opening bracket to
//! the last closing one, so two separate fragments in one string are taken
//! together and usually fail to parse.

use serde_json::Value;
use tracing::{debug, warn};

use crate::AdviceResponse;
use crate::raw::RawResult;

/// Nesting limit for untrusted payloads; deeper values give the default pair.
pub const MAX_DEPTH: usize = 32;

const WRAPPER_FIELDS: [&str; 4] = ["result", "value", "data", "response"];

/// Normalize a raw contract result. Never fails.
pub fn normalize(raw: &RawResult) -> AdviceResponse {
    normalize_at(raw, 0)
}

fn normalize_at(raw: &RawResult, depth: usize) -> AdviceResponse {
    if depth > MAX_DEPTH {
        warn!(depth, "contract result nested too deeply, using default advice");
        return AdviceResponse::default();
    }

    match raw {
        RawResult::Null => AdviceResponse::default(),
        RawResult::Text(s) => normalize_text(s, depth),
        RawResult::List(items) => match items.first() {
            Some(first) => normalize_at(first, depth + 1),
            None => AdviceResponse::default(),
        },
        RawResult::Bytes { data, .. } => {
            debug!(len = data.len(), "decoding byte result as UTF-8");
            normalize_text(&String::from_utf8_lossy(data), depth + 1)
        }
        RawResult::Map(fields) => normalize_map(raw, fields, depth),
        RawResult::Scalar(scalar) => AdviceResponse::with_default_action(scalar.to_string()),
    }
}

fn normalize_text(text: &str, depth: usize) -> AdviceResponse {
    let s = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(s) {
        return normalize_at(&RawResult::from_json(value), depth + 1);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(value) = embedded_json(s, open, close) {
            debug!(open = %open, "extracted embedded JSON from text result");
            return normalize_at(&RawResult::from_json(value), depth + 1);
        }
    }

    AdviceResponse::with_default_action(s)
}

/// Parse the span from the first `open` to the last `close`, if any.
fn embedded_json(s: &str, open: char, close: char) -> Option<Value> {
    let start = s.find(open)?;
    let end = s.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&s[start..=end]).ok()
}

fn normalize_map(raw: &RawResult, fields: &[(String, RawResult)], depth: usize) -> AdviceResponse {
    let advice = raw.field("advice").and_then(RawResult::as_text);
    let action = raw.field("suggested_action").and_then(RawResult::as_text);
    if advice.is_some() || action.is_some() {
        let defaults = AdviceResponse::default();
        return AdviceResponse::new(
            advice.map_or(defaults.advice, str::to_string),
            action.map_or(defaults.suggested_action, str::to_string),
        );
    }

    let wrapped = WRAPPER_FIELDS
        .iter()
        .find_map(|name| raw.field(name).filter(|v| v.is_truthy()).map(|v| (*name, v)));
    if let Some((name, inner)) = wrapped {
        debug!(field = name, "unwrapping contract result");
        return normalize_at(inner, depth + 1);
    }

    for (key, value) in fields {
        let Some(text) = value.as_text() else {
            continue;
        };
        let trimmed = text.trim();
        if !looks_like_json(trimmed) {
            continue;
        }
        if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
            debug!(field = %key, "found JSON string inside contract result");
            return normalize_at(&RawResult::from_json(parsed), depth + 1);
        }
    }

    match serde_json::to_string(&raw.to_json()) {
        Ok(json) => AdviceResponse::with_default_action(json),
        Err(e) => {
            warn!(error = %e, "could not serialize contract result");
            AdviceResponse::default()
        }
    }
}

fn looks_like_json(s: &str) -> bool {
    (s.starts_with('{') && s.ends_with('}')) || (s.starts_with('[') && s.ends_with(']'))
}
