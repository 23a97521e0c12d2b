//! Runtime flags and the diagnostic sink.
//!
//! The parser and registry report documentation problems and invalid input
//! here; whether they are fatal is decided by the flags on this type, never by
//! the caller that found them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::error::{DocargsError, Result};

/// Category of a documentation problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A live parameter has no documentation line
    DocumentationGap,
    /// A documented positional has no live parameter
    ExtraDocumentation,
    /// `@param` line while `@param` comments are disabled
    DisallowedAnnotationStyle,
    /// A documented type name nothing can convert to
    UnknownType,
}

/// One recorded documentation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentationIssue {
    pub kind: IssueKind,
    /// Message prefixed with `file:line` when known
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl fmt::Display for DocumentationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Flags consulted by the pipeline plus accumulated documentation issues
#[derive(Debug)]
pub struct Environment {
    allow_param_comments: Cell<bool>,
    strict_input: Cell<bool>,
    doc_check: Cell<bool>,
    comment_marker: String,
    issues: RefCell<Vec<DocumentationIssue>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Environment {
    pub fn new(config: &Config) -> Self {
        Self {
            allow_param_comments: Cell::new(config.allow_param_comments),
            strict_input: Cell::new(config.strict_input),
            doc_check: Cell::new(false),
            comment_marker: config.comment_marker.clone(),
            issues: RefCell::new(Vec::new()),
        }
    }

    pub fn allow_param_comments(&self) -> bool {
        self.allow_param_comments.get()
    }

    pub fn set_allow_param_comments(&self, allowed: bool) {
        self.allow_param_comments.set(allowed);
    }

    /// Doc-check mode: no fallback synthesis, issues are printed as they are found
    pub fn enable_doc_check(&self) {
        self.doc_check.set(true);
    }

    pub fn doc_check_mode(&self) -> bool {
        self.doc_check.get()
    }

    pub fn enable_strict_input(&self) {
        self.strict_input.set(true);
    }

    pub fn strict_input(&self) -> bool {
        self.strict_input.get()
    }

    pub fn comment_marker(&self) -> &str {
        &self.comment_marker
    }

    pub fn documentation_issues(&self) -> Vec<DocumentationIssue> {
        self.issues.borrow().clone()
    }

    pub fn clear_documentation_issues(&self) {
        self.issues.borrow_mut().clear();
    }

    /// Record a documentation problem; logged immediately in doc-check mode
    pub fn handle_documentation_issue(
        &self,
        kind: IssueKind,
        message: impl Into<String>,
        file: Option<&Path>,
        line: Option<usize>,
    ) {
        let message = message.into();
        let location = file.map(|file| {
            let display = display_path(file);
            match line {
                Some(line) => format!("{}:{}", display, line),
                None => display,
            }
        });

        let formatted = match &location {
            Some(location) => format!("{} {}", location, message),
            None => message,
        };

        if self.doc_check_mode() {
            tracing::warn!("documentation mismatch: {}", formatted);
        } else {
            tracing::debug!("documentation mismatch: {}", formatted);
        }

        self.issues.borrow_mut().push(DocumentationIssue {
            kind,
            message: formatted,
            location,
        });
    }

    /// Reject (strict input) or warn about a value outside its documented domain
    pub fn handle_input_violation(&self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        if self.strict_input() {
            return Err(DocargsError::InputViolation(message));
        }
        tracing::warn!("{} (use --strict to abort on invalid input)", message);
        Ok(())
    }
}

/// Path relative to the working directory when it lives underneath it
fn display_path(file: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| file.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| file.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_location_formatting() {
        let env = Environment::default();
        env.handle_documentation_issue(
            IssueKind::DocumentationGap,
            "Documentation is missing for positional argument 'name'",
            Some(Path::new("lib/sample.rb")),
            Some(4),
        );
        env.handle_documentation_issue(IssueKind::UnknownType, "no location", None, Some(1));

        let issues = env.documentation_issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].location.as_deref(), Some("lib/sample.rb:4"));
        assert_eq!(
            issues[0].message,
            "lib/sample.rb:4 Documentation is missing for positional argument 'name'"
        );
        assert_eq!(issues[1].message, "no location");

        env.clear_documentation_issues();
        assert!(env.documentation_issues().is_empty());
    }

    #[test]
    fn test_input_violation_policy() {
        let env = Environment::default();
        assert!(env.handle_input_violation("bad value").is_ok());

        env.enable_strict_input();
        let err = env.handle_input_violation("bad value").unwrap_err();
        assert!(matches!(err, DocargsError::InputViolation(ref m) if m == "bad value"));
    }

    #[test]
    fn test_flags_from_config() {
        let config = Config {
            allow_param_comments: false,
            strict_input: true,
            ..Config::default()
        };
        let env = Environment::new(&config);
        assert!(!env.allow_param_comments());
        assert!(env.strict_input());
        assert!(!env.doc_check_mode());
        env.enable_doc_check();
        assert!(env.doc_check_mode());
    }
}
