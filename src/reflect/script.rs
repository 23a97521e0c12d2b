//! Reflects `def` declarations out of `#`-commented script files.
//!
//! Recognised forms:
//! - `def name(a, b = 1, *rest, key:, opt: 2, **options, &block)`
//! - `def self.name(...)`
//! - `def name a, b` (no parentheses, single line)
//!
//! Parameter lists may span several lines; lines are accumulated until the
//! parentheses balance.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::{Callable, ParamKind, Parameter, SourceLocation};
use crate::error::Result;

static DEF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*def\s+(?:self\.)?([A-Za-z_][A-Za-z0-9_]*[?!]?)(.*)$").unwrap()
});

static VISIBILITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(private|public|protected)\s*$").unwrap());

static OPTIONAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+)$").unwrap());

static KEYWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*):\s*(.*)$").unwrap());

/// A method reflected from a script file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMethod {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub location: SourceLocation,
}

impl Callable for ScriptMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn source_location(&self) -> Option<&SourceLocation> {
        Some(&self.location)
    }
}

/// Scanner for `def` style method declarations
#[derive(Debug, Default)]
pub struct ScriptScanner;

impl ScriptScanner {
    pub fn new() -> Self {
        Self
    }

    /// Read `path` and return every exposed method in declaration order
    pub fn scan<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ScriptMethod>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(self.scan_source(path, &content))
    }

    pub fn scan_source(&self, path: &Path, content: &str) -> Vec<ScriptMethod> {
        let lines: Vec<&str> = content.lines().collect();
        let mut methods = Vec::new();
        let mut exposed = true;

        let mut index = 0;
        while index < lines.len() {
            let line = lines[index];

            if let Some(cap) = VISIBILITY_PATTERN.captures(line) {
                exposed = &cap[1] == "public";
                index += 1;
                continue;
            }

            let Some(cap) = DEF_PATTERN.captures(line) else {
                index += 1;
                continue;
            };

            let name = cap[1].to_string();
            let (signature, consumed) = collect_signature(&lines, index);
            let parameters = extract_parameter_source(&signature)
                .map(|source| split_parameters(&source))
                .unwrap_or_default()
                .into_iter()
                .filter_map(|token| classify_parameter(&token))
                .collect();

            if exposed && !name.starts_with('_') {
                methods.push(ScriptMethod {
                    name,
                    parameters,
                    location: SourceLocation::new(PathBuf::from(path), index + 1),
                });
            }

            index += consumed.max(1);
        }

        methods
    }
}

/// Accumulate lines from `start` until the parameter list is balanced
fn collect_signature(lines: &[&str], start: usize) -> (String, usize) {
    let mut signature = String::new();
    let mut index = start;
    while index < lines.len() {
        signature.push_str(lines[index]);
        signature.push('\n');
        index += 1;
        if signature_balanced(&signature) {
            break;
        }
    }
    (signature, index - start)
}

fn signature_balanced(signature: &str) -> bool {
    let code = code_chars(signature);
    let open = code.iter().filter(|(_, c)| *c == '(').count();
    let close = code.iter().filter(|(_, c)| *c == ')').count();
    if open == 0 {
        return !signature.trim_end().ends_with(',');
    }
    close >= open
}

/// Characters outside string literals and `#` comments, with their byte offsets
fn code_chars(text: &str) -> Vec<(usize, char)> {
    let mut code = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut comment = false;

    for (offset, c) in text.char_indices() {
        if comment {
            comment = c != '\n';
            continue;
        }
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '#' => comment = true,
            _ => code.push((offset, c)),
        }
    }
    code
}

/// The raw text between the outer parentheses, or after the name when there are none
fn extract_parameter_source(signature: &str) -> Option<String> {
    let cap = DEF_PATTERN.captures(signature.lines().next()?)?;
    let after_name = cap.get(2)?.as_str();

    if after_name.trim_start().starts_with('(') {
        let joined = signature.replacen(&cap[0], after_name, 1);
        let start = joined.find('(')?;
        let mut depth = 0usize;
        for (offset, c) in code_chars(&joined[start..]) {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(joined[start + 1..start + offset].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    } else {
        let bare = after_name.split('#').next().unwrap_or("").trim();
        if bare.is_empty() || bare.starts_with('=') || bare.starts_with(';') {
            None
        } else {
            Some(bare.to_string())
        }
    }
}

/// Split on commas that are not nested inside brackets or quotes
fn split_parameters(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in source.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                let token = current.trim().to_string();
                if !token.is_empty() {
                    tokens.push(token);
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let token = current.trim().to_string();
    if !token.is_empty() {
        tokens.push(token);
    }
    tokens
}

fn classify_parameter(token: &str) -> Option<Parameter> {
    let token = token.trim();
    if let Some(name) = token.strip_prefix("**") {
        let name = if name.is_empty() { "**" } else { name };
        return Some(Parameter::new(ParamKind::KeywordRest, name));
    }
    if let Some(name) = token.strip_prefix('*') {
        let name = if name.is_empty() { "*" } else { name };
        return Some(Parameter::new(ParamKind::Rest, name));
    }
    if let Some(name) = token.strip_prefix('&') {
        return Some(Parameter::new(ParamKind::Block, name));
    }
    if let Some(cap) = KEYWORD_PATTERN.captures(token) {
        let default = cap[2].trim();
        return Some(if default.is_empty() {
            Parameter::new(ParamKind::KeywordRequired, &cap[1])
        } else {
            Parameter::new(ParamKind::Keyword, &cap[1]).with_default(default)
        });
    }
    if let Some(cap) = OPTIONAL_PATTERN.captures(token) {
        return Some(Parameter::new(ParamKind::Optional, &cap[1]).with_default(cap[2].trim()));
    }
    if token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') && !token.is_empty() {
        return Some(Parameter::new(ParamKind::Required, token));
    }
    None
}
