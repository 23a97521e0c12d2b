//! Structured (`--json-args`) argument coercion.

use crate::error::{DocargsError, Result};
use crate::value::Value;

/// Parse every string as JSON, recursing into lists and map values
pub fn coerce_json_value(value: Value) -> Result<Value> {
    match value {
        Value::Str(text) => serde_json::from_str::<serde_json::Value>(&text)
            .map(Value::from_json)
            .map_err(|e| DocargsError::ModeCoercion(format!("Failed to parse as JSON: {}", e))),
        Value::List(items) => items
            .into_iter()
            .map(coerce_json_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Value::Map(pairs) => pairs
            .into_iter()
            .map(|(key, item)| coerce_json_value(item).map(|item| (key, item)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Map),
        other => Ok(other),
    }
}
