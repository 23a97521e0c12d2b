//! Callable reflection.
//!
//! The resolution pipeline never inspects code directly. Everything it needs to
//! know about a target (parameter kinds, names, default source text and where the
//! declaration lives) comes through the [`Callable`] trait. [`Signature`] is the
//! explicit declaration used by library callers; [`script::ScriptMethod`] is
//! produced by scanning `def` declarations out of a script file.

pub mod script;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use script::{ScriptMethod, ScriptScanner};

/// Kind of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Required,
    Optional,
    Rest,
    KeywordRequired,
    Keyword,
    KeywordRest,
    Block,
}

impl ParamKind {
    pub fn is_fixed_positional(&self) -> bool {
        matches!(self, ParamKind::Required | ParamKind::Optional)
    }

    pub fn is_named_keyword(&self) -> bool {
        matches!(self, ParamKind::KeywordRequired | ParamKind::Keyword)
    }
}

/// Whether a documented name binds by position or by keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    Positional,
    Keyword,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub kind: ParamKind,
    pub name: String,
    /// Default value exactly as written in source, unevaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Where a callable is declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line of the declaration
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Line reported for documentation problems: the line just above the declaration
    pub fn comment_line(&self) -> usize {
        self.line.saturating_sub(1).max(1)
    }
}

/// Reflection interface consumed by the documentation and argument pipeline
pub trait Callable {
    fn name(&self) -> &str;

    /// Declared parameters in declaration order
    fn parameters(&self) -> &[Parameter];

    fn source_location(&self) -> Option<&SourceLocation>;

    /// Comment block supplied directly instead of read from a source file
    fn inline_documentation(&self) -> Option<&[String]> {
        None
    }

    /// Names of explicitly declared keyword parameters
    fn keyword_names(&self) -> Vec<&str> {
        self.parameters()
            .iter()
            .filter(|p| p.kind.is_named_keyword())
            .map(|p| p.name.as_str())
            .collect()
    }

    fn has_keyword_rest(&self) -> bool {
        self.parameters()
            .iter()
            .any(|p| p.kind == ParamKind::KeywordRest)
    }

    /// True when `--name` could legally be passed to this callable
    fn accepts_keyword(&self, name: &str) -> bool {
        self.has_keyword_rest() || self.keyword_names().contains(&name)
    }

    fn parameter_role(&self, name: &str) -> Option<ParameterRole> {
        let param = self.parameters().iter().find(|p| p.name == name)?;
        match param.kind {
            ParamKind::Required | ParamKind::Optional | ParamKind::Rest => {
                Some(ParameterRole::Positional)
            }
            ParamKind::KeywordRequired | ParamKind::Keyword => Some(ParameterRole::Keyword),
            ParamKind::KeywordRest | ParamKind::Block => None,
        }
    }

    fn default_for(&self, name: &str) -> Option<&str> {
        self.parameters()
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.default.as_deref())
    }
}

/// Explicitly declared callable signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    name: String,
    parameters: Vec<Parameter>,
    location: Option<SourceLocation>,
    documentation: Option<Vec<String>>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declaration site used to find the preceding comment block
    pub fn at(mut self, file: impl AsRef<Path>, line: usize) -> Self {
        self.location = Some(SourceLocation::new(file.as_ref(), line));
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn required(self, name: &str) -> Self {
        self.param(Parameter::new(ParamKind::Required, name))
    }

    pub fn optional(self, name: &str, default: &str) -> Self {
        self.param(Parameter::new(ParamKind::Optional, name).with_default(default))
    }

    pub fn rest(self, name: &str) -> Self {
        self.param(Parameter::new(ParamKind::Rest, name))
    }

    pub fn keyword_required(self, name: &str) -> Self {
        self.param(Parameter::new(ParamKind::KeywordRequired, name))
    }

    pub fn keyword(self, name: &str, default: &str) -> Self {
        self.param(Parameter::new(ParamKind::Keyword, name).with_default(default))
    }

    pub fn keyword_rest(self, name: &str) -> Self {
        self.param(Parameter::new(ParamKind::KeywordRest, name))
    }

    /// Attach the comment block directly (marker already stripped)
    pub fn with_documentation<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documentation = Some(lines.into_iter().map(Into::into).collect());
        self
    }
}

impl Callable for Signature {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn source_location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    fn inline_documentation(&self) -> Option<&[String]> {
        self.documentation.as_deref()
    }
}
