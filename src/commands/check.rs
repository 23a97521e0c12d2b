use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::error::DocargsError;
use crate::reflect::ScriptScanner;

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Glob patterns of scripts to check
    pub patterns: Vec<String>,
    pub config: Config,
}

/// Execute the check command.
///
/// Every exposed method is parsed in doc-check mode, so no fallback
/// definitions are synthesized and every mismatch is collected.
pub fn execute_check(options: CheckOptions) -> Result<()> {
    let mut files = Vec::new();
    for pattern in &options.patterns {
        let matches = glob::glob(pattern)
            .map_err(|e| anyhow::anyhow!("Invalid pattern '{}': {}", pattern, e))?;
        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping unreadable path: {}", e),
            }
        }
    }
    files.sort();
    files.dedup();

    if files.is_empty() {
        println!("{} No files matched", style("✗").red());
        return Ok(());
    }

    let registry = super::open_registry(&options.config);
    let environment = registry.environment();
    environment.enable_doc_check();

    let scanner = ScriptScanner::new();
    let mut method_count = 0;
    for file in &files {
        for method in scanner.scan(file)? {
            registry.metadata_for(&method);
            method_count += 1;
        }
    }

    let issues = environment.documentation_issues();
    if issues.is_empty() {
        println!(
            "{} {} method(s) in {} file(s) documented",
            style("✓").green(),
            method_count,
            files.len()
        );
        return Ok(());
    }

    for issue in &issues {
        println!("{} {}", style("✗").red(), issue);
    }
    Err(DocargsError::DocumentationCheck(issues.len()).into())
}
