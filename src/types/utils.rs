//! Type-name and placeholder helpers shared by the parser, converter and help output.

use crate::types::ValueMode;
use crate::value::Value;

/// Type names the converter chain and validation understand
pub const KNOWN_TYPES: &[&str] = &[
    "String",
    "Integer",
    "Fixnum",
    "Float",
    "Numeric",
    "Boolean",
    "TrueClass",
    "FalseClass",
    "Symbol",
    "Array",
    "Hash",
    "JSON",
    "Time",
    "Date",
    "DateTime",
    "BigDecimal",
    "Decimal",
    "File",
    "Pathname",
    "nil",
    "NilClass",
];

pub fn is_nil_type(ty: &str) -> bool {
    matches!(ty, "nil" | "NilClass")
}

pub fn is_boolean_type(ty: &str) -> bool {
    matches!(ty, "Boolean" | "TrueClass" | "FalseClass")
}

/// Element type of `T[]` or `Array<T>`
pub fn list_element_type(ty: &str) -> Option<&str> {
    if let Some(inner) = ty.strip_prefix("Array<").and_then(|rest| rest.strip_suffix('>')) {
        return Some(inner.trim());
    }
    ty.strip_suffix("[]").map(str::trim)
}

pub fn is_known_type(ty: &str) -> bool {
    match list_element_type(ty) {
        Some(inner) => is_known_type(inner),
        None => KNOWN_TYPES.contains(&ty),
    }
}

/// Closest known type name within edit distance 2
pub fn suggest_type(ty: &str) -> Option<&'static str> {
    let base = list_element_type(ty).unwrap_or(ty);
    KNOWN_TYPES
        .iter()
        .map(|known| (strsim::levenshtein(&base.to_lowercase(), &known.to_lowercase()), *known))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Normalize one type token: strips `@`, outer parentheses and a `type:` prefix,
/// and capitalizes lowercase `name[]` forms.
pub fn normalize_type_token(token: &str) -> String {
    let mut trimmed = token.trim();
    trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if trimmed.starts_with('(') && trimmed.ends_with(')') && trimmed.len() >= 2 {
        trimmed = trimmed[1..trimmed.len() - 1].trim();
    }
    if let Some(rest) = strip_type_prefix(trimmed) {
        trimmed = rest;
    }
    if trimmed.is_empty() {
        return String::new();
    }

    if trimmed.contains('<') && trimmed.ends_with('>') {
        trimmed.to_string()
    } else if let Some(base) = trimmed.strip_suffix("[]") {
        if base == base.to_lowercase() {
            format!("{}[]", capitalize(base))
        } else {
            format!("{}[]", base)
        }
    } else {
        trimmed.to_string()
    }
}

// `type:` / `type :`, case-insensitive
fn strip_type_prefix(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    let rest = lower.strip_prefix("type")?;
    let trimmed = rest.trim_start();
    if !trimmed.starts_with(':') {
        return None;
    }
    let offset = text.len() - trimmed.len() + 1;
    Some(text[offset..].trim())
}

/// Normalize and de-duplicate a list of type tokens, keeping first occurrence order
pub fn normalize_type_list<I, S>(types: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for ty in types {
        let token = normalize_type_token(ty.as_ref());
        if !token.is_empty() && !normalized.contains(&token) {
            normalized.push(token);
        }
    }
    normalized
}

/// Shape of a value placeholder such as `[TAG...]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderInfo {
    /// Wrapped in `[...]`: the value may be omitted
    pub optional: bool,
    /// `...` suffix or comma list: the value is repeated
    pub list: bool,
    pub base: Option<String>,
}

pub fn analyze_placeholder(placeholder: Option<&str>) -> PlaceholderInfo {
    let Some(placeholder) = placeholder else {
        return PlaceholderInfo::default();
    };

    let trimmed = placeholder.trim();
    let optional = trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']');
    let core = if optional {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    };

    let sanitized = core.replace(['[', ']'], "").replace("...", "");
    let list = sanitized.contains(',') || core.contains("...") || core.contains("[,");
    let base: String = sanitized
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    PlaceholderInfo {
        optional,
        list,
        base: (!base.is_empty()).then_some(base),
    }
}

/// Fill in implied types from the placeholder shape
pub fn infer_types_from_placeholder(
    mut types: Vec<String>,
    info: &PlaceholderInfo,
    include_optional_boolean: bool,
) -> Vec<String> {
    if types.is_empty() {
        if info.optional {
            if include_optional_boolean {
                types.push("Boolean".to_string());
            }
            types.push(if info.list { "String[]" } else { "String" }.to_string());
        } else if info.list {
            types.push("String[]".to_string());
        } else if info.base.is_some() {
            types.push("String".to_string());
        }
    } else if info.optional
        && include_optional_boolean
        && !types.iter().any(|ty| is_boolean_type(ty))
    {
        types.insert(0, "Boolean".to_string());
    }

    let mut unique: Vec<String> = Vec::with_capacity(types.len());
    for ty in types {
        if !unique.contains(&ty) {
            unique.push(ty);
        }
    }
    unique
}

/// Decide how an option consumes its value
pub fn determine_value_mode(
    value_placeholder: Option<&str>,
    types: &[String],
    optional_value: bool,
) -> ValueMode {
    if optional_value {
        return ValueMode::Optional;
    }
    if types.iter().any(|ty| is_boolean_type(ty)) {
        return ValueMode::BooleanFlag;
    }

    let has_value_type = types
        .iter()
        .any(|ty| !is_boolean_type(ty) && !is_nil_type(ty));
    if value_placeholder.is_some() || has_value_type {
        ValueMode::Required
    } else {
        ValueMode::NotRequired
    }
}

pub fn normalize_long_option(option: &str) -> String {
    if option.starts_with("--") {
        option.to_string()
    } else {
        format!("--{}", option.trim_start_matches('-'))
    }
}

pub fn normalize_short_option(option: &str) -> String {
    if option.starts_with('-') {
        option.to_string()
    } else {
        format!("-{}", option)
    }
}

pub fn default_placeholder_for(keyword: &str) -> String {
    keyword.to_uppercase()
}

/// `dry_run` -> `--dry-run`
pub fn long_flag_for(keyword: &str) -> String {
    format!("--{}", keyword.replace('_', "-"))
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_boolean_string(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "false" | "t" | "f" | "yes" | "no" | "y" | "n" | "1" | "0"
    )
}

pub fn convert_boolean(value: &Value) -> std::result::Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Str(text) => match text.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "0" => Ok(false),
            _ => Err(format!("Cannot convert to boolean: {}", text)),
        },
        other => Err(format!("Cannot convert to boolean: {}", other)),
    }
}

/// Whether `value` is an instance of the documented type. `None` for unknown types.
pub fn value_matches_type(value: &Value, ty: &str) -> Option<bool> {
    if let Some(inner) = list_element_type(ty) {
        if !is_known_type(inner) {
            return None;
        }
        return Some(match value {
            Value::List(items) => items
                .iter()
                .all(|item| value_matches_type(item, inner).unwrap_or(true)),
            _ => false,
        });
    }

    let matched = match ty {
        "String" => matches!(value, Value::Str(_)),
        "Integer" | "Fixnum" => matches!(value, Value::Integer(_)),
        "Float" => matches!(value, Value::Float(_)),
        "Numeric" => value.is_numeric() || matches!(value, Value::Decimal(_)),
        "Boolean" => matches!(value, Value::Bool(_)),
        "TrueClass" => matches!(value, Value::Bool(true)),
        "FalseClass" => matches!(value, Value::Bool(false)),
        "Symbol" => matches!(value, Value::Symbol(_)),
        "Array" => matches!(value, Value::List(_)),
        "Hash" => matches!(value, Value::Map(_)),
        "JSON" => !matches!(value, Value::Symbol(_) | Value::Path(_)),
        "Date" => matches!(value, Value::Date(_)),
        "Time" | "DateTime" => matches!(value, Value::Time(_)),
        "BigDecimal" | "Decimal" => matches!(value, Value::Decimal(_)),
        "File" | "Pathname" => matches!(value, Value::Path(_)),
        "nil" | "NilClass" => matches!(value, Value::Nil),
        _ => return None,
    };
    Some(matched)
}

/// `[A, B]` label for inline annotations
pub fn format_inline_type_label(types: &[String]) -> Option<String> {
    let mut unique: Vec<&str> = Vec::new();
    for ty in types.iter().map(String::as_str).filter(|ty| !ty.is_empty()) {
        if !unique.contains(&ty) {
            unique.push(ty);
        }
    }
    if unique.is_empty() {
        None
    } else {
        Some(format!("[{}]", unique.join(", ")))
    }
}
