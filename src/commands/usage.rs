use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;
use crate::help::HelpRenderer;
use crate::reflect::Callable;

/// Options for the usage command
#[derive(Debug, Clone)]
pub struct UsageOptions {
    pub file: PathBuf,
    /// Method name; dashes stand for underscores
    pub method: String,
    pub config: Config,
}

/// Execute the usage command
pub fn execute_usage(options: UsageOptions) -> Result<()> {
    let method = super::find_method(&options.file, &options.method)?;
    let renderer = HelpRenderer::new(super::open_registry(&options.config));
    println!(
        "{}",
        renderer.usage_for(&super::program_for(&options.file), method.name(), &method)
    );
    Ok(())
}
