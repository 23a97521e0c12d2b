//! Documentation data model.
//!
//! Definitions are drafted by the metadata parser, finalised once during
//! reconciliation and never mutated afterwards. The registry hands out clones.

pub mod utils;

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::value::Value;

/// Documentation dialect a definition was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocFormat {
    /// `@param name [Type] (--flag) description`
    TaggedParam,
    /// `NAME [Type] description` / `--flag VALUE [Type] description`
    Concise,
    /// Synthesized for a parameter that has no documentation line
    AutoGenerated,
}

/// How an option consumes the token after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    /// Never takes a value; may consume a following boolean literal
    BooleanFlag,
    /// Must be followed by a value
    Required,
    /// Takes the next token unless it looks like another flag
    Optional,
    /// Takes no value and is not boolean typed
    NotRequired,
}

impl ValueMode {
    pub fn boolean_flag(self) -> bool {
        self == ValueMode::BooleanFlag
    }

    /// `None` when the decision is left to the optional-value rule
    pub fn requires_value(self) -> Option<bool> {
        match self {
            ValueMode::Required => Some(true),
            ValueMode::BooleanFlag | ValueMode::NotRequired => Some(false),
            ValueMode::Optional => None,
        }
    }

    pub fn optional_value(self) -> bool {
        self == ValueMode::Optional
    }
}

/// One literal accepted by a definition, e.g. `:info` from `%i[info warn]`
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedValue {
    pub value: Value,
}

impl AllowedValue {
    pub fn literal(value: Value) -> Self {
        Self { value }
    }
}

impl Serialize for AllowedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("kind", "literal")?;
        map.serialize_entry("value", &self.value)?;
        map.end()
    }
}

/// A keyword-style option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDefinition {
    pub keyword: String,
    pub long: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value_mode: ValueMode,
    /// Default as written in the declaration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub inline_type_annotation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_type_text: Option<String>,
    pub doc_format: DocFormat,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<AllowedValue>,
}

impl OptionDefinition {
    pub fn boolean_flag(&self) -> bool {
        self.value_mode.boolean_flag()
    }

    pub fn requires_value(&self) -> Option<bool> {
        self.value_mode.requires_value()
    }

    pub fn optional_value(&self) -> bool {
        self.value_mode.optional_value()
    }

    /// Label used in error messages: long flag, else short flag, else keyword
    pub fn display_flag(&self) -> &str {
        if !self.long.is_empty() {
            &self.long
        } else if let Some(short) = &self.short {
            short
        } else {
            &self.keyword
        }
    }
}

/// A positional argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionalDefinition {
    pub placeholder: String,
    pub label: String,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Live parameter this definition was bound to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub inline_type_annotation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_type_text: Option<String>,
    pub doc_format: DocFormat,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<AllowedValue>,
}

impl PositionalDefinition {
    /// Fallback for a positional parameter that has no documentation line
    pub fn auto_generated(name: &str, default_value: Option<String>) -> Self {
        Self {
            placeholder: name.to_string(),
            label: name.to_uppercase(),
            types: Vec::new(),
            description: None,
            param_name: Some(name.to_string()),
            default_value,
            inline_type_annotation: false,
            inline_type_text: None,
            doc_format: DocFormat::AutoGenerated,
            allowed_values: Vec::new(),
        }
    }
}

/// Declared return type; informational only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnDefinition {
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parsed and reconciled documentation for one callable
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodDocumentation {
    /// Compact one-line summary (blank lines dropped)
    pub summary: Option<String>,
    /// Summary paragraph as written, blank lines kept
    pub summary_lines: Vec<String>,
    pub detail_lines: Vec<String>,
    pub positionals: Vec<PositionalDefinition>,
    /// Live parameter name to index into `positionals`
    #[serde(skip)]
    pub positional_index: BTreeMap<String, usize>,
    pub options: Vec<OptionDefinition>,
    pub returns: Vec<ReturnDefinition>,
}

impl MethodDocumentation {
    pub fn positional_for(&self, param_name: &str) -> Option<&PositionalDefinition> {
        self.positional_index
            .get(param_name)
            .and_then(|&index| self.positionals.get(index))
    }

    pub fn option_for(&self, keyword: &str) -> Option<&OptionDefinition> {
        self.options.iter().find(|opt| opt.keyword == keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.detail_lines.is_empty()
            && self.positionals.is_empty()
            && self.options.is_empty()
            && self.returns.is_empty()
    }
}
