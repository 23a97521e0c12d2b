//! Error types for argument resolution and documentation handling.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, DocargsError>;

/// Errors raised while resolving documented arguments
#[derive(Debug, Error)]
pub enum DocargsError {
    /// A value-taking option reached the end of input or another flag
    #[error("Option '{option}' requires a value")]
    OptionValueMissing { option: String },

    /// None of the declared type converters accepted the raw value
    #[error("Value '{value}' for {target} is invalid: {reason}")]
    TypeConversion {
        target: String,
        value: String,
        reason: String,
    },

    #[error("--json-args cannot be combined with --eval-args or --eval-lax")]
    ModeConflict,

    /// The active json/eval mode could not coerce a value
    #[error("{0}")]
    ModeCoercion(String),

    /// A converted value is outside its documented types or choices (strict input)
    #[error("{0}")]
    InputViolation(String),

    #[error("documentation check found {0} issue(s)")]
    DocumentationCheck(usize),

    #[error("Command '{0}' is not available")]
    CommandNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DocargsError {
    /// Conversion failure for a `--flag` style option
    pub fn option_conversion(label: &str, value: &str, reason: impl Into<String>) -> Self {
        DocargsError::TypeConversion {
            target: format!("option '{}'", label),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Conversion failure for a positional argument
    pub fn positional_conversion(label: &str, value: &str, reason: impl Into<String>) -> Self {
        DocargsError::TypeConversion {
            target: format!("argument '{}'", label),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
