//! Type annotation and placeholder token grammar.
//!
//! Accepted type forms: `[A, B]`, `(A)`, `A|B`, `Array<A>`, `A[]`, `@A`, plus
//! literal enumerations (`%i[a b]`, `%w[a b]`, `["a", "b"]`, `[:a, 1, true]`)
//! whose entries become allowed values instead of types.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::utils::{is_known_type, normalize_type_token};
use crate::types::AllowedValue;
use crate::value::Value;

static INTEGER_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

static FLOAT_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());

static BARE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._-]+$").unwrap());

static ANGLE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z._-]*$").unwrap());

/// Split a type annotation into normalized tokens
pub fn parse_type_annotation(annotation: Option<&str>) -> Vec<String> {
    let Some(annotation) = annotation else {
        return Vec::new();
    };

    let mut cleaned = annotation.trim();
    cleaned = cleaned.strip_prefix('@').unwrap_or(cleaned);
    if cleaned.len() >= 2 && cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = cleaned[1..cleaned.len() - 1].trim();
    }
    if cleaned.len() >= 2 && cleaned.starts_with('[') && cleaned.ends_with(']') {
        cleaned = &cleaned[1..cleaned.len() - 1];
    }

    split_top_level(cleaned)
        .iter()
        .map(|token| normalize_type_token(token))
        .filter(|token| !token.is_empty())
        .collect()
}

// Split on `,` and `|` outside of `<...>` and `%x[...]`
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '<' | '[' => {
                depth += 1;
                current.push(c);
            }
            '>' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' | '|' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Expand a percent-literal array into its entries (`%i[a b]` -> `:a`, `:b`)
pub fn expand_annotation_token(token: &str) -> Vec<String> {
    let stripped = token.trim();
    if stripped.is_empty() {
        return Vec::new();
    }

    let percent = ["%i[", "%I[", "%w[", "%W["]
        .iter()
        .find(|prefix| stripped.starts_with(**prefix) && stripped.ends_with(']'));

    match percent {
        Some(prefix) => {
            let symbols = prefix.eq_ignore_ascii_case("%i[");
            stripped[3..stripped.len() - 1]
                .split_whitespace()
                .map(|entry| {
                    if symbols {
                        format!(":{}", entry)
                    } else {
                        entry.to_string()
                    }
                })
                .collect()
        }
        None => vec![stripped.to_string()],
    }
}

pub fn is_percent_literal(token: &str) -> bool {
    let token = token.trim();
    token.starts_with('%') && token.contains('[') && token.ends_with(']')
}

/// Typed literal for a single enumeration entry, if it is one
pub fn literal_entry(token: &str) -> Option<Value> {
    let mut stripped = token.trim();
    if stripped.is_empty() {
        return None;
    }
    if stripped.starts_with('[') && !stripped.ends_with(']') {
        stripped = &stripped[1..];
    }
    if stripped.ends_with(']') && !stripped.contains('[') {
        stripped = &stripped[..stripped.len() - 1];
    }

    let lowered = stripped.to_lowercase();
    match lowered.as_str() {
        "nil" | "null" | "~" => return Some(Value::Nil),
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }

    if let Some(name) = stripped.strip_prefix(':') {
        return (!name.is_empty()).then(|| Value::symbol(name));
    }

    for quote in ['"', '\''] {
        if stripped.len() >= 2 && stripped.starts_with(quote) && stripped.ends_with(quote) {
            return Some(Value::str(&stripped[1..stripped.len() - 1]));
        }
    }

    if INTEGER_LITERAL.is_match(stripped) {
        return stripped.parse().ok().map(Value::Integer);
    }
    if FLOAT_LITERAL.is_match(stripped) {
        return stripped.parse().ok().map(Value::Float);
    }
    if BARE_LITERAL.is_match(stripped) {
        return Some(Value::str(stripped));
    }

    None
}

/// Separate type names from literal choices.
///
/// Known type names stay types. Percent arrays and tokens that are literals as a
/// whole become allowed values only. Anything else stays a (possibly unknown) type.
pub fn partition_type_tokens(tokens: Vec<String>) -> (Vec<String>, Vec<AllowedValue>) {
    let mut types = Vec::new();
    let mut allowed: Vec<AllowedValue> = Vec::new();

    for token in tokens {
        if is_percent_literal(&token) {
            for entry in expand_annotation_token(&token) {
                if let Some(value) = literal_entry(&entry) {
                    push_allowed(&mut allowed, value);
                }
            }
        } else if is_known_type(&token) {
            types.push(token);
        } else if let Some(value) = literal_entry(&token) {
            push_allowed(&mut allowed, value);
        } else {
            types.push(token);
        }
    }

    (types, allowed)
}

fn push_allowed(allowed: &mut Vec<AllowedValue>, value: Value) {
    let entry = AllowedValue::literal(value);
    if !allowed.contains(&entry) {
        allowed.push(entry);
    }
}

pub fn merge_allowed_values(
    mut primary: Vec<AllowedValue>,
    additional: Vec<AllowedValue>,
) -> Vec<AllowedValue> {
    for entry in additional {
        if !primary.contains(&entry) {
            primary.push(entry);
        }
    }
    primary
}

/// `NAME`, `<name>`, `[NAME]`, `NAME...`, `[<name>...]`
pub fn is_placeholder_token(token: &str) -> bool {
    let mut candidate = token.trim();
    candidate = candidate.strip_prefix('@').unwrap_or(candidate);
    if candidate.is_empty() {
        return false;
    }

    if candidate.len() >= 2 && candidate.starts_with('[') && candidate.ends_with(']') {
        candidate = candidate[1..candidate.len() - 1].trim();
    }
    let without_separators = candidate.replace([',', '|'], "");
    let mut candidate = without_separators.as_str();
    if candidate.is_empty() {
        return false;
    }

    candidate = candidate.strip_suffix("...").unwrap_or(candidate).trim();
    if candidate.is_empty() {
        return false;
    }

    if candidate.len() >= 2 && candidate.starts_with('<') && candidate.ends_with('>') {
        ANGLE_PLACEHOLDER.is_match(&candidate[1..candidate.len() - 1])
    } else {
        let cleaned: String = candidate
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        !cleaned.is_empty()
            && cleaned == cleaned.to_uppercase()
            && cleaned.chars().any(|c| c.is_ascii_uppercase())
    }
}

/// Whether a documentation token is a type annotation rather than description text
pub fn is_type_token(token: &str) -> bool {
    let stripped = token.trim();
    if stripped.is_empty() {
        return false;
    }
    if stripped.starts_with('@') {
        return true;
    }
    if is_percent_literal(stripped) {
        return true;
    }
    if stripped.starts_with('[') && stripped.ends_with(']') {
        return !parse_type_annotation(Some(stripped)).is_empty();
    }
    if stripped.starts_with('(') && stripped.ends_with(')') {
        let parsed = parse_type_annotation(Some(stripped));
        return !parsed.is_empty()
            && parsed.iter().all(|ty| {
                is_known_type(ty) || ty.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            });
    }

    let normalized = normalize_type_token(stripped);
    if normalized.starts_with("Array<") && normalized.ends_with('>') {
        return true;
    }
    if normalized.ends_with("[]") && normalized.len() > 2 {
        return true;
    }

    let parts = parse_type_annotation(Some(stripped));
    !parts.is_empty() && parts.iter().all(|ty| is_known_type(ty))
}

/// Merge whitespace-split tokens back together when a `[`, `(` or `%x[` group spans several
pub fn combine_bracketed_tokens<'a, I>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut combined = Vec::new();
    let mut buffer: Option<String> = None;
    let mut closing = ']';

    for token in tokens {
        if let Some(buf) = buffer.as_mut() {
            if !token.is_empty() {
                buf.push(' ');
            }
            buf.push_str(token);
            if token.contains(closing) {
                combined.extend(buffer.take());
            }
        } else if token.starts_with('[') && !token.contains(']') {
            buffer = Some(token.to_string());
            closing = ']';
        } else if token.starts_with('(') && !token.contains(')') {
            buffer = Some(token.to_string());
            closing = ')';
        } else if token.starts_with('%') && token.contains('[') && !token.contains(']') {
            buffer = Some(token.to_string());
            closing = ']';
        } else {
            combined.push(token.to_string());
        }
    }

    combined.extend(buffer);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_annotation_forms() {
        assert_eq!(parse_type_annotation(Some("[String, nil]")), vec!["String", "nil"]);
        assert_eq!(parse_type_annotation(Some("(Integer)")), vec!["Integer"]);
        assert_eq!(parse_type_annotation(Some("Integer|Float")), vec!["Integer", "Float"]);
        assert_eq!(parse_type_annotation(Some("[Array<String>]")), vec!["Array<String>"]);
        assert_eq!(parse_type_annotation(Some("[String[]]")), vec!["String[]"]);
        assert_eq!(parse_type_annotation(Some("%i[info warn]")), vec!["%i[info warn]"]);
        assert!(parse_type_annotation(None).is_empty());
    }

    #[test]
    fn test_partition_separates_literals() {
        let (types, allowed) = partition_type_tokens(vec!["%i[info warn]".into()]);
        assert!(types.is_empty());
        assert_eq!(
            allowed,
            vec![
                AllowedValue::literal(Value::symbol("info")),
                AllowedValue::literal(Value::symbol("warn")),
            ]
        );

        let tokens = parse_type_annotation(Some(r#"["text", "json", 3, true]"#));
        let (types, allowed) = partition_type_tokens(tokens);
        assert!(types.is_empty());
        assert_eq!(allowed.len(), 4);
        assert_eq!(allowed[0].value, Value::str("text"));
        assert_eq!(allowed[2].value, Value::Integer(3));
        assert_eq!(allowed[3].value, Value::Bool(true));

        let (types, allowed) = partition_type_tokens(vec!["String".into(), "Strng".into()]);
        assert_eq!(types, vec!["String", "Strng"]);
        assert!(allowed.is_empty());
    }

    #[test]
    fn test_literal_entry_kinds() {
        assert_eq!(literal_entry(":debug"), Some(Value::symbol("debug")));
        assert_eq!(literal_entry("'json'"), Some(Value::str("json")));
        assert_eq!(literal_entry("-2"), Some(Value::Integer(-2)));
        assert_eq!(literal_entry("0.5"), Some(Value::Float(0.5)));
        assert_eq!(literal_entry("null"), Some(Value::Nil));
        assert_eq!(literal_entry("plain-word"), Some(Value::str("plain-word")));
        assert_eq!(literal_entry("Capital"), None);
        assert_eq!(literal_entry(":"), None);
    }

    #[test]
    fn test_placeholder_tokens() {
        assert!(is_placeholder_token("NAME"));
        assert!(is_placeholder_token("[LIMIT]"));
        assert!(is_placeholder_token("TAG..."));
        assert!(is_placeholder_token("<file.path>"));
        assert!(is_placeholder_token("@OUTPUT_DIR"));
        assert!(!is_placeholder_token("name"));
        assert!(!is_placeholder_token("[String]"));
        assert!(!is_placeholder_token("123"));
    }

    #[test]
    fn test_type_token_detection() {
        assert!(is_type_token("[String]"));
        assert!(is_type_token("Integer"));
        assert!(is_type_token("String[]"));
        assert!(is_type_token("Array<Integer>"));
        assert!(is_type_token("%i[info warn]"));
        assert!(is_type_token("String|nil"));
        assert!(is_type_token("@Widget"));
        assert!(!is_type_token("Optional"));
        assert!(!is_type_token("the"));
        assert!(!is_type_token("(optional)"));
    }

    #[test]
    fn test_combine_bracketed_tokens() {
        let line = r#"--format TARGET ["text", "json"] Output (in order) here"#;
        let combined = combine_bracketed_tokens(line.split_whitespace());
        assert_eq!(
            combined,
            vec![
                "--format",
                "TARGET",
                r#"["text", "json"]"#,
                "Output",
                "(in order)",
                "here"
            ]
        );

        let combined = combine_bracketed_tokens("LEVEL %i[info warn error] Severity".split_whitespace());
        assert_eq!(combined, vec!["LEVEL", "%i[info warn error]", "Severity"]);
    }
}
