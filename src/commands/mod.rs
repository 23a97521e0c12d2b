//! CLI command implementations.
//!
//! Each command is in its own submodule and takes an options struct.

pub mod check;
pub mod inspect;
pub mod list;
pub mod parse;
pub mod usage;

pub use check::{execute_check, CheckOptions};
pub use inspect::{execute_inspect, InspectOptions};
pub use list::{execute_list, ListOptions};
pub use parse::{execute_parse, ParseOptions};
pub use usage::{execute_usage, UsageOptions};

use std::path::Path;
use std::rc::Rc;

use crate::config::Config;
use crate::environment::Environment;
use crate::error::{DocargsError, Result};
use crate::reflect::{Callable, ScriptMethod, ScriptScanner};
use crate::registry::DocumentationRegistry;

/// Environment and registry shared by one command run
pub(crate) fn open_registry(config: &Config) -> Rc<DocumentationRegistry> {
    let environment = Rc::new(Environment::new(config));
    Rc::new(DocumentationRegistry::new(environment))
}

/// Find `name` in `file`; `dry-run` also finds `dry_run`
pub(crate) fn find_method(file: &Path, name: &str) -> Result<ScriptMethod> {
    let methods = ScriptScanner::new().scan(file)?;
    let normalized = name.replace('-', "_");
    methods
        .iter()
        .find(|method| method.name() == name)
        .or_else(|| {
            tracing::debug!("tried snake_case conversion: {} -> {}", name, normalized);
            methods.iter().find(|method| method.name() == normalized)
        })
        .cloned()
        .ok_or_else(|| DocargsError::CommandNotFound(name.to_string()))
}

/// Program prefix shown in rendered usage lines
pub(crate) fn program_for(file: &Path) -> String {
    format!("docargs parse {}", file.display())
}
