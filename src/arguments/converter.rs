//! Default conversion of raw tokens into typed values.

use std::sync::LazyLock;

use regex::Regex;

use crate::mode::ArgumentModeController;
use crate::value::Value;

static SYMBOL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static INTEGER_STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

static FLOAT_STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());

static KEYWORD_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:true|false|null|nil)$").unwrap());

/// YAML anchors and aliases (`&name`, `*name`) outside quoted scalars are refused
static YAML_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s\[{,:])[&*][A-Za-z0-9_-]").unwrap());

/// Converts raw tokens into scalars and structures when it is safe to do so.
///
/// In json or eval mode every token is kept as a string; the mode controller
/// coerces it later.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueConverter {
    modes: ArgumentModeController,
}

impl ValueConverter {
    pub fn new(modes: ArgumentModeController) -> Self {
        Self { modes }
    }

    pub fn convert(&self, raw: &str) -> Value {
        if self.modes.raw_mode() {
            return Value::str(raw);
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::str(raw);
        }

        if SYMBOL_LITERAL.is_match(trimmed) {
            return Value::symbol(&trimmed[1..]);
        }

        if is_literal_like(trimmed) {
            if let Some(literal) = parse_safe_literal(trimmed) {
                return literal;
            }
        }

        if is_null_literal(trimmed) {
            return Value::Nil;
        }

        match trimmed.to_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        if INTEGER_STRING.is_match(trimmed) {
            if let Ok(i) = trimmed.parse() {
                return Value::Integer(i);
            }
        }
        if FLOAT_STRING.is_match(trimmed) {
            if let Ok(f) = trimmed.parse() {
                return Value::Float(f);
            }
        }

        Value::str(raw)
    }
}

pub fn is_null_literal(text: &str) -> bool {
    matches!(text.to_lowercase().as_str(), "null" | "~")
}

fn is_literal_like(text: &str) -> bool {
    text.starts_with(['[', '{', '"', '\''])
        || text.starts_with("---")
        || KEYWORD_LITERAL.is_match(text)
}

/// Parse a JSON/YAML literal restricted to plain scalars and collections.
/// A null result only counts for an explicit null literal.
pub fn parse_safe_literal(text: &str) -> Option<Value> {
    if text.starts_with(['[', '{']) {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(text) {
            return Some(Value::from_json(json));
        }
    }

    if YAML_ANCHOR.is_match(&mask_quoted_scalars(text)) {
        return None;
    }

    let yaml: serde_yaml::Value = match serde_yaml::from_str(text) {
        Ok(yaml) => yaml,
        Err(err) => {
            tracing::trace!("not a literal: {}", err);
            return None;
        }
    };
    let value = from_yaml(yaml)?;
    if value == Value::Nil && !is_null_literal(text) {
        return None;
    }
    Some(value)
}

/// Replace each complete quoted scalar with `_`
fn mask_quoted_scalars(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut masked = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let token_start = i == 0 || matches!(chars[i - 1], ' ' | '\t' | '\n' | '[' | '{' | ',' | ':');
        if matches!(c, '"' | '\'') && token_start {
            if let Some(end) = closing_quote(&chars, i) {
                masked.push('_');
                i = end + 1;
                continue;
            }
        }
        masked.push(c);
        i += 1;
    }
    masked
}

fn closing_quote(chars: &[char], start: usize) -> Option<usize> {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if quote == '"' => i += 2,
            '\'' if quote == '\'' && chars.get(i + 1) == Some(&'\'') => i += 2,
            c if c == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn from_yaml(yaml: serde_yaml::Value) -> Option<Value> {
    Some(match yaml {
        serde_yaml::Value::Null => Value::Nil,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64()?),
        },
        serde_yaml::Value::String(s) => Value::Str(s),
        serde_yaml::Value::Sequence(items) => Value::List(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Option<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => Value::Map(
            mapping
                .into_iter()
                .map(|(k, v)| Some((from_yaml(k)?, from_yaml(v)?)))
                .collect::<Option<Vec<_>>>()?,
        ),
        serde_yaml::Value::Tagged(_) => return None,
    })
}
