//! Heuristic parsing of annotation argument text.
//!
//! Annotation arguments are kept as raw source text. This module pulls keyed
//! fields (`description:`, `example:`, `required:`, `status:`, ...) and literal
//! values out of that text without evaluating it. Anything it cannot make sense
//! of yields `None` so callers can fall back to their documented default.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*\((.*)\)$").unwrap());

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*)*$").unwrap());

/// Documentation fields carried by a documented-property annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDoc {
    pub description: String,
    pub example: Option<Value>,
    pub required: Option<bool>,
}

/// Splits `text` on `separator` wherever it is not nested in brackets or quotes.
///
/// Empty pieces are dropped, so trailing commas are harmless.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in text.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                current.push(ch);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            c if c == separator && depth <= 0 => {
                pieces.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    pieces.push(current);

    pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Whether the text is an object literal `{ ... }`
pub fn is_object_literal(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('{') && text.ends_with('}')
}

/// Top-level `key: value` entries of an object literal, in source order.
///
/// Shorthand entries (`{ name }`) map to themselves. Non-object text yields nothing.
pub fn object_entries(text: &str) -> Vec<(String, String)> {
    let text = text.trim();
    if !is_object_literal(text) {
        return Vec::new();
    }
    let inner = &text[1..text.len() - 1];

    split_top_level(inner, ',')
        .into_iter()
        .filter_map(|entry| {
            let mut parts = split_top_level_once(&entry, ':');
            let key = strip_quotes(parts.0.trim());
            if key.is_empty() || key.starts_with("...") {
                return None;
            }
            let value = parts.1.take().unwrap_or_else(|| key.clone());
            Some((key, value.trim().to_string()))
        })
        .collect()
}

fn split_top_level_once(text: &str, separator: char) -> (String, Option<String>) {
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                return (
                    text[..idx].to_string(),
                    Some(text[idx + ch.len_utf8()..].to_string()),
                );
            }
            _ => {}
        }
    }
    (text.to_string(), None)
}

/// Raw text of the value stored under `key` in an object literal
pub fn keyed_value(text: &str, key: &str) -> Option<String> {
    object_entries(text)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// String literal stored under `key` in an object literal
pub fn keyed_string(text: &str, key: &str) -> Option<String> {
    keyed_value(text, key).and_then(|v| string_literal(&v))
}

/// Parses a literal: string, boolean, null or number.
pub fn parse_literal(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Some(s) = quoted_content(text) {
        return Some(Value::String(s));
    }
    match text {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }
    if NUMBER_RE.is_match(text) {
        if let Ok(int) = text.parse::<i64>() {
            return Some(Value::Number(int.into()));
        }
        return text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number);
    }
    None
}

/// Content of a quoted string literal, escapes for the quote itself undone
pub fn string_literal(text: &str) -> Option<String> {
    quoted_content(text.trim())
}

fn quoted_content(text: &str) -> Option<String> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if !matches!(first, '\'' | '"' | '`') || first != last {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    let escaped_quote = format!("\\{}", first);
    Some(inner.replace(&escaped_quote, &first.to_string()).replace("\\\\", "\\"))
}

/// Removes every quote character
pub fn strip_quotes(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\'' | '"' | '`')).collect()
}

/// Removes braces and quotes, then trims
pub fn strip_braces_and_quotes(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '{' | '}' | '\'' | '"' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Splits a call expression `callee(a, b)` into its callee and argument texts
pub fn call_expression(text: &str) -> Option<(String, Vec<String>)> {
    let caps = CALL_RE.captures(text.trim())?;
    let callee = caps.get(1)?.as_str().to_string();
    let args = split_top_level(caps.get(2)?.as_str(), ',');
    Some((callee, args))
}

/// Segments of a property-access chain (`Errors.NOT_FOUND.message`), or `None` for other expressions
pub fn reference_segments(text: &str) -> Option<Vec<String>> {
    let text = text.trim();
    if !REFERENCE_RE.is_match(text) {
        return None;
    }
    Some(text.split('.').map(|s| s.trim().to_string()).collect())
}

/// Last segment of a dotted name
pub fn last_segment(text: &str) -> &str {
    text.rsplit('.').next().unwrap_or(text).trim()
}

/// Extracts description, example and `required` from a documented-property annotation argument
pub fn property_doc(argument: Option<&str>) -> PropertyDoc {
    let Some(argument) = argument else {
        return PropertyDoc::default();
    };

    let description = keyed_string(argument, "description").unwrap_or_default();
    let example = keyed_value(argument, "example").and_then(|v| parse_literal(&v));
    let required = match keyed_value(argument, "required").as_deref().map(str::trim) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    PropertyDoc {
        description,
        example,
        required,
    }
}
