//! Property-object literals: `{key: value, key: [v, v], ...}`.
//!
//! Values are parsed shallowly: quoted string, `true`/`false`, number,
//! `[...]` list (recursively), anything else passes through as a raw string.

use std::sync::LazyLock;

use regex::Regex;
use smallvec::SmallVec;

use crate::model::{PropertyMap, Value};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid regex"));

/// Parse a `{...}` literal into an ordered property map.
pub fn parse_object(src: &str) -> Result<PropertyMap, String> {
    let body = src
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.trim_end().strip_suffix('}'))
        .ok_or_else(|| format!("invalid properties object: {src}"))?
        .trim();

    let mut out = PropertyMap::new();
    for part in split_top_level(body) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, raw) = part
            .split_once(':')
            .ok_or_else(|| format!("malformed property: {part}"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("malformed property: {part}"));
        }
        out.insert(key.to_owned(), parse_value(raw.trim()));
    }
    Ok(out)
}

/// Parse one literal value token.
pub fn parse_value(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Value::String(raw[1..raw.len() - 1].to_owned());
    }
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if NUMBER_RE.is_match(raw) {
        if let Some(number) = parse_number(raw) {
            return number;
        }
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return Value::List(
            split_top_level(inner.trim())
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_value)
                .collect(),
        );
    }
    Value::String(raw.to_owned())
}

fn parse_number(raw: &str) -> Option<Value> {
    if !raw.contains('.') {
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Value::Int(i));
        }
    }
    raw.parse::<f64>().ok().map(Value::Float)
}

/// Split on commas that sit outside brackets, braces, parens and double
/// quotes. Nesting is counted, not parsed.
fn split_top_level(body: &str) -> SmallVec<[&str; 8]> {
    let mut parts = SmallVec::new();
    if body.is_empty() {
        return parts;
    }
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '[' | '{' | '(' if !in_quotes => depth += 1,
            ']' | '}' | ')' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if depth == 0 && !in_quotes => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}
