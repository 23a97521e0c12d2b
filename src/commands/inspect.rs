use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;

/// Options for the inspect command
#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub file: PathBuf,
    pub method: String,
    pub config: Config,
}

/// Execute the inspect command: print the reconciled documentation as JSON
pub fn execute_inspect(options: InspectOptions) -> Result<()> {
    let method = super::find_method(&options.file, &options.method)?;
    let registry = super::open_registry(&options.config);
    let metadata = registry.metadata_for(&method);

    println!("{}", serde_json::to_string_pretty(&metadata)?);

    for issue in registry.environment().documentation_issues() {
        eprintln!("{} {}", style("→").dim(), issue);
    }
    Ok(())
}
