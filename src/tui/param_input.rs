//! `key=value; key=value` parameter lines typed in the add/edit rule prompt.
//!
//! Values in double quotes are taken verbatim (spaces and `;` included). Numeric and boolean
//! parameters are recognised by name; everything else is text.

use serde_json::{json, Map, Value};

use crate::rules::{RuleKind, RuleType};

const NUMERIC_KEYS: [&str; 6] = ["index", "count", "from", "start", "step", "digits"];
const BOOL_KEYS: [&str; 3] = ["caseSensitive", "trimSpaces", "trimDuplicateSpaces"];

pub fn parse_rule_params(rule_type: RuleType, input: &str) -> Result<RuleKind, String> {
    let mut params = Map::new();

    for field in split_fields(input) {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        let (key, raw) = field
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got `{}`", field))?;
        let key = key.trim();
        let raw = raw.trim();

        let value = if let Some(inner) = unquote(raw) {
            Value::String(inner.to_string())
        } else if NUMERIC_KEYS.contains(&key) {
            let n: i64 = raw.parse().map_err(|_| format!("`{}` must be a number", key))?;
            Value::from(n)
        } else if BOOL_KEYS.contains(&key) {
            match raw {
                "true" | "yes" | "on" => Value::Bool(true),
                "false" | "no" | "off" => Value::Bool(false),
                _ => return Err(format!("`{}` must be true or false", key)),
            }
        } else {
            Value::String(raw.to_string())
        };

        params.insert(key.to_string(), value);
    }

    serde_json::from_value(json!({ "type": rule_type.as_str(), "params": params }))
        .map_err(|e| e.to_string())
}

/// Inverse of `parse_rule_params`, used to prefill the prompt when editing a rule.
pub fn format_rule_params(kind: &RuleKind) -> String {
    let value = match serde_json::to_value(kind) {
        Ok(value) => value,
        Err(_) => return String::new(),
    };

    let Some(params) = value.get("params").and_then(Value::as_object) else {
        return String::new();
    };

    params
        .iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some(format!("{}=\"{}\"", key, s)),
            Value::Number(n) => Some(format!("{}={}", key, n)),
            Value::Bool(b) => Some(format!("{}={}", key, b)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Starting text for a new rule of the given type.
pub fn param_template(rule_type: RuleType) -> &'static str {
    match rule_type {
        RuleType::Replace => "search=\"\"; replace=\"\"; caseSensitive=false",
        RuleType::Regex => "pattern=\"\"; replace=\"\"",
        RuleType::Insert => "text=\"\"; position=start",
        RuleType::Delete => "mode=text; text=\"\"; caseSensitive=false",
        RuleType::Serialize => "prefix=\"\"; suffix=\"\"; start=1; step=1; digits=2; position=start",
        RuleType::Case => "mode=title",
        RuleType::Strip => "trimSpaces=true; trimDuplicateSpaces=true; chars=\"\"",
    }
}

pub fn param_hint(rule_type: RuleType) -> &'static str {
    match rule_type {
        RuleType::Replace => "search, replace, caseSensitive",
        RuleType::Regex => "pattern, replace ($1 / ${name} for groups)",
        RuleType::Insert => "text, position=start|end|index, index",
        RuleType::Delete => "mode=text|first|last|toText|fromText|range, text, caseSensitive, count, from",
        RuleType::Serialize => "prefix, suffix, start, step, digits, position=start|end|replace",
        RuleType::Case => "mode=upper|lower|title",
        RuleType::Strip => "trimSpaces, trimDuplicateSpaces, chars",
    }
}

fn unquote(raw: &str) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

/// Splits on `;` outside double quotes.
fn split_fields(input: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
