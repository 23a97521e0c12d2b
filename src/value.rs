//! Typed argument values produced by conversion.
//!
//! Values keep their kind: a symbol never equals a string with the same text,
//! and an integer never equals a float. Validation against documented choices
//! relies on that.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A converted command-line value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    List(Vec<Value>),
    /// Ordered key/value pairs (insertion order is kept)
    Map(Vec<(Value, Value)>),
    Date(NaiveDate),
    Time(DateTime<FixedOffset>),
    /// Canonical decimal text, e.g. `12.50`
    Decimal(String),
    Path(PathBuf),
}

/// Keyword arguments keyed by parameter name
pub type KeywordArgs = BTreeMap<String, Value>;

/// Output of the argument parser: positional values plus keyword map
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArguments {
    pub positional: Vec<Value>,
    pub keywords: KeywordArgs,
}

impl ParsedArguments {
    pub fn new(positional: Vec<Value>, keywords: KeywordArgs) -> Self {
        Self {
            positional,
            keywords,
        }
    }
}

impl Value {
    pub fn str(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Short kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::List(_) => "Array",
            Value::Map(_) => "Hash",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::Decimal(_) => "Decimal",
            Value::Path(_) => "Pathname",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Plain text form: strings and symbols without decoration, everything else
    /// as its literal rendering.
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::Str(s) | Value::Symbol(s) | Value::Decimal(s) => s.clone(),
            Value::Nil => String::new(),
            Value::Path(p) => p.to_string_lossy().to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(pairs) => serde_json::Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_plain_string(), v.to_json()))
                    .collect(),
            ),
            other => serde_json::Value::String(other.to_plain_string()),
        }
    }

    /// Build a value from parsed JSON; object keys become strings
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in text.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Str(s) => write_quoted(f, s),
            Value::Symbol(s) => write!(f, ":{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match k {
                        Value::Symbol(name) => write!(f, "{}: {}", name, v)?,
                        other => write!(f, "{} => {}", other, v)?,
                    }
                }
                write!(f, "}}")
            }
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(&k.to_plain_string(), v)?;
                }
                map.end()
            }
            other => serializer.serialize_str(&other.to_plain_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_aware_equality() {
        assert_ne!(Value::symbol("info"), Value::str("info"));
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_eq!(Value::List(vec![Value::Nil]), Value::List(vec![Value::Nil]));
    }

    #[test]
    fn test_display_literal_forms() {
        let map = Value::Map(vec![
            (Value::symbol("greeting"), Value::str("hi")),
            (Value::str("times"), Value::Integer(2)),
        ]);
        assert_eq!(map.to_string(), "{greeting: \"hi\", \"times\" => 2}");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::symbol("warn").to_string(), ":warn");
    }

    #[test]
    fn test_json_serialization() {
        let parsed = ParsedArguments::new(
            vec![Value::symbol("info"), Value::Nil],
            KeywordArgs::from([("tags".to_string(), Value::List(vec![Value::str("a")]))]),
        );
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, r#"{"positional":["info",null],"keywords":{"tags":["a"]}}"#);
    }

    #[test]
    fn test_from_json_keeps_number_kinds() {
        let value = Value::from_json(serde_json::json!({"x": 1, "y": 1.5}));
        assert_eq!(
            value,
            Value::Map(vec![
                (Value::str("x"), Value::Integer(1)),
                (Value::str("y"), Value::Float(1.5)),
            ])
        );
    }
}
