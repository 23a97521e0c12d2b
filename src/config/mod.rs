//! Configuration loading and defaults.
//!
//! Settings come from `.docargs.json` with environment overrides applied on top.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".docargs.json";

/// Enables or disables `@param` comments (`on`/`1`/`true` enable)
pub const ALLOW_PARAM_COMMENT_ENV: &str = "DOCARGS_ALLOW_PARAM_COMMENT";

/// `true` turns on debug tracing
pub const DEBUG_ENV: &str = "DOCARGS_DEBUG";

fn default_true() -> bool {
    true
}

fn default_comment_marker() -> String {
    "#".to_string()
}

/// Main docargs configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Accept `@param name [Type]` documentation lines
    #[serde(default = "default_true")]
    pub allow_param_comments: bool,

    /// Abort instead of warning when a value is outside its documented types/choices
    #[serde(default)]
    pub strict_input: bool,

    /// Debug tracing of the argument parser
    #[serde(default)]
    pub debug: bool,

    /// Line prefix that marks a documentation comment
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_param_comments: true,
            strict_input: false,
            debug: false,
            comment_marker: default_comment_marker(),
        }
    }
}

impl Config {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load config from `path`, or defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `DOCARGS_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ALLOW_PARAM_COMMENT_ENV) {
            self.allow_param_comments =
                matches!(value.trim().to_lowercase().as_str(), "on" | "1" | "true");
        }
        if let Some(value) = lookup(DEBUG_ENV) {
            if value.trim() == "true" {
                self.debug = true;
            }
        }
        self
    }
}
