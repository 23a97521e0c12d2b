use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;
use crate::help::HelpRenderer;
use crate::reflect::ScriptScanner;

/// Options for the list command
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Script to scan for methods
    pub file: PathBuf,
    pub config: Config,
}

/// Execute the list command
pub fn execute_list(options: ListOptions) -> Result<()> {
    let methods = ScriptScanner::new().scan(&options.file)?;
    let renderer = HelpRenderer::new(super::open_registry(&options.config));
    println!(
        "{}",
        renderer.command_list(&super::program_for(&options.file), &methods)
    );
    Ok(())
}
