//! Type-directed conversion chains built from documented type lists.

use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use regex::Regex;

use crate::types::utils::{is_nil_type, list_element_type, parse_list};
use crate::types::AllowedValue;
use crate::value::Value;

static DECIMAL_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

static FLOAT_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d[\d_]*(?:\.\d[\d_]*)?|\.\d+)(?:[eE][+-]?\d+)?$").unwrap()
});

static INTEGER_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d[\d_]*$").unwrap());

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d %b %Y", "%b %d %Y"];

const NAIVE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Converter for one documented type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeConverter {
    Str,
    Integer,
    /// Also used for `Numeric`
    Float,
    Boolean,
    Symbol,
    Decimal,
    Date,
    Time,
    Json,
    Hash,
    Path,
    /// Comma-separated or literal list; elements go through the inner converter
    List(Option<Box<TypeConverter>>),
}

impl TypeConverter {
    /// `None` for nil types and for names nothing can convert to
    pub fn for_type(ty: &str) -> Option<Self> {
        let normalized = ty.trim();
        if is_nil_type(normalized) {
            return None;
        }
        if let Some(inner) = list_element_type(normalized) {
            return Some(TypeConverter::List(
                TypeConverter::for_type(inner).map(Box::new),
            ));
        }

        Some(match normalized {
            "String" => TypeConverter::Str,
            "Integer" | "Fixnum" => TypeConverter::Integer,
            "Float" | "Numeric" => TypeConverter::Float,
            "Boolean" | "TrueClass" | "FalseClass" => TypeConverter::Boolean,
            "Symbol" => TypeConverter::Symbol,
            "BigDecimal" | "Decimal" => TypeConverter::Decimal,
            "Date" => TypeConverter::Date,
            "Time" | "DateTime" => TypeConverter::Time,
            "JSON" => TypeConverter::Json,
            "Hash" => TypeConverter::Hash,
            "File" | "Pathname" => TypeConverter::Path,
            "Array" => TypeConverter::List(None),
            _ => return None,
        })
    }

    /// Convert the provisionally typed `value`; `raw` is the text it came from
    pub fn convert(&self, value: &Value, raw: &str) -> Result<Value, String> {
        match self {
            TypeConverter::Str => Ok(match value {
                Value::Str(text) => Value::str(text),
                _ => Value::str(raw),
            }),
            TypeConverter::Integer => convert_integer(value),
            TypeConverter::Float => convert_float(value),
            TypeConverter::Boolean => crate::types::utils::convert_boolean(value).map(Value::Bool),
            TypeConverter::Symbol => match value {
                Value::Str(text) => Ok(Value::symbol(text)),
                Value::Symbol(_) => Ok(value.clone()),
                other => Err(format!("cannot convert {} to Symbol", other.kind_name())),
            },
            TypeConverter::Decimal => convert_decimal(value, raw),
            TypeConverter::Date => convert_date(value),
            TypeConverter::Time => convert_time(value),
            TypeConverter::Json => match value {
                Value::Str(text) => serde_json::from_str::<serde_json::Value>(text)
                    .map(Value::from_json)
                    .map_err(|e| e.to_string()),
                Value::Symbol(_) | Value::Path(_) => {
                    Err(format!("cannot convert {} to JSON", value.kind_name()))
                }
                other => Ok(other.clone()),
            },
            TypeConverter::Hash => match value {
                Value::Map(_) => Ok(value.clone()),
                Value::Str(text) => match serde_json::from_str::<serde_json::Value>(text) {
                    Ok(json @ serde_json::Value::Object(_)) => Ok(Value::from_json(json)),
                    Ok(_) => Err("expected a JSON object".to_string()),
                    Err(e) => Err(e.to_string()),
                },
                other => Err(format!("cannot convert {} to Hash", other.kind_name())),
            },
            TypeConverter::Path => match value {
                Value::Str(text) => Ok(Value::Path(PathBuf::from(text))),
                Value::Path(_) => Ok(value.clone()),
                _ => Ok(Value::Path(PathBuf::from(raw.trim()))),
            },
            TypeConverter::List(inner) => {
                let items: Vec<Value> = match value {
                    Value::List(items) => items.clone(),
                    Value::Str(text) => parse_list(text).into_iter().map(Value::Str).collect(),
                    other => parse_list(&other.to_plain_string())
                        .into_iter()
                        .map(Value::Str)
                        .collect(),
                };
                let Some(inner) = inner else {
                    return Ok(Value::List(items));
                };
                items
                    .iter()
                    .map(|item| inner.convert(item, &item.to_plain_string()))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
        }
    }
}

fn convert_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Integer(_) => Ok(value.clone()),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(Value::Integer(*f as i64)),
        Value::Str(text) if INTEGER_TEXT.is_match(text.trim()) => text
            .trim()
            .replace('_', "")
            .parse()
            .map(Value::Integer)
            .map_err(|e| format!("invalid value for Integer(): {:?} ({})", text, e)),
        other => Err(format!("invalid value for Integer(): {}", other)),
    }
}

fn convert_float(value: &Value) -> Result<Value, String> {
    match value {
        Value::Float(_) => Ok(value.clone()),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Str(text) | Value::Decimal(text) if FLOAT_TEXT.is_match(text.trim()) => text
            .trim()
            .replace('_', "")
            .parse()
            .map(Value::Float)
            .map_err(|e| format!("invalid value for Float(): {:?} ({})", text, e)),
        other => Err(format!("invalid value for Float(): {}", other)),
    }
}

fn convert_decimal(value: &Value, raw: &str) -> Result<Value, String> {
    let text = match value {
        Value::Str(text) | Value::Decimal(text) => text.trim().to_string(),
        Value::Integer(_) | Value::Float(_) => raw.trim().to_string(),
        other => return Err(format!("cannot convert {} to Decimal", other.kind_name())),
    };
    if DECIMAL_TEXT.is_match(&text) {
        Ok(Value::Decimal(text))
    } else {
        Err(format!("invalid value for BigDecimal(): {:?}", text))
    }
}

fn date_text(value: &Value) -> Option<String> {
    match value {
        Value::Str(text) => Some(text.trim().to_string()),
        Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

fn convert_date(value: &Value) -> Result<Value, String> {
    if let Value::Date(_) = value {
        return Ok(value.clone());
    }
    if let Value::Time(time) = value {
        return Ok(Value::Date(time.date_naive()));
    }
    let text = date_text(value).ok_or_else(|| format!("invalid date: {}", value))?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
        .map(Value::Date)
        .ok_or_else(|| format!("invalid date: {:?}", text))
}

fn convert_time(value: &Value) -> Result<Value, String> {
    match value {
        Value::Time(_) => return Ok(value.clone()),
        Value::Date(date) => {
            return midnight_utc(*date)
                .map(Value::Time)
                .ok_or_else(|| format!("no time information in {}", value))
        }
        _ => {}
    }
    let text = date_text(value).ok_or_else(|| format!("no time information in {}", value))?;
    parse_time(&text)
        .map(Value::Time)
        .ok_or_else(|| format!("no time information in {:?}", text))
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().with_timezone(&utc()))
}

fn parse_time(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time);
    }
    if let Ok(time) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S %z") {
        return Some(time);
    }
    if let Ok(time) = DateTime::parse_from_rfc2822(text) {
        return Some(time);
    }
    NAIVE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc().with_timezone(&utc()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(midnight_utc)
        })
}

/// Converters for a documented type list, tried in order
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterChain {
    converters: Vec<TypeConverter>,
    allow_nil: bool,
    expects_list: bool,
}

impl ConverterChain {
    /// `None` when the list yields neither a converter nor a nil type
    pub fn for_types(types: &[String]) -> Option<Self> {
        let allow_nil = types.iter().any(|ty| is_nil_type(ty.trim()));
        let converters: Vec<TypeConverter> =
            types.iter().filter_map(|ty| TypeConverter::for_type(ty)).collect();
        if converters.is_empty() && !allow_nil {
            return None;
        }
        let expects_list = converters
            .iter()
            .any(|converter| matches!(converter, TypeConverter::List(Some(_))));
        Some(Self {
            converters,
            allow_nil,
            expects_list,
        })
    }

    /// Chain for the elements of a rest parameter: `T[]` contributes `T`
    pub fn for_element_types(types: &[String]) -> Option<Self> {
        let element_types: Vec<String> = types
            .iter()
            .map(|ty| list_element_type(ty).unwrap_or(ty).to_string())
            .collect();
        Self::for_types(&element_types)
    }

    /// Run the chain; the error is the last converter's message
    pub fn convert(&self, value: Value, raw: &str) -> Result<Value, String> {
        if self.allow_nil {
            match &value {
                Value::Nil => return Ok(Value::Nil),
                Value::Str(text) if text.trim().eq_ignore_ascii_case("nil") => {
                    return Ok(Value::Nil)
                }
                _ => {}
            }
        }
        if self.converters.is_empty() {
            return Ok(value);
        }

        // A comma list must not be read as a single number
        let input = if self.expects_list && value.is_numeric() && raw.contains(',') {
            Value::str(raw)
        } else {
            value
        };

        let mut last_error = None;
        for converter in &self.converters {
            match converter.convert(&input, raw) {
                Ok(converted) => return Ok(converted),
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.unwrap_or_else(|| format!("Could not convert value '{}'", raw)))
    }
}

/// Swap a string for an allowed symbol of the same name, and the reverse
pub fn normalize_choice(value: Value, allowed: &[AllowedValue]) -> Value {
    if allowed.is_empty() || allowed.iter().any(|entry| entry.value == value) {
        return value;
    }
    let swapped = match &value {
        Value::Str(text) => Value::symbol(text),
        Value::Symbol(name) => Value::str(name),
        _ => return value,
    };
    if allowed.iter().any(|entry| entry.value == swapped) {
        swapped
    } else {
        value
    }
}
