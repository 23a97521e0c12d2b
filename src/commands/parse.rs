use std::path::PathBuf;

use anyhow::Result;

use crate::arguments::ArgumentParser;
use crate::config::Config;
use crate::error::DocargsError;
use crate::mode::ArgumentModeController;
use crate::reflect::Callable;
use crate::value::ParsedArguments;

/// Options for the parse command
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub file: PathBuf,
    pub method: String,
    /// Tokens handed to the method
    pub tokens: Vec<String>,
    pub json_args: bool,
    pub eval_args: bool,
    pub eval_lax: bool,
    pub strict: bool,
    pub config: Config,
}

/// Execute the parse command: resolve tokens and print them as JSON
pub fn execute_parse(options: ParseOptions) -> Result<()> {
    let parsed = resolve(&options)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

/// Full pipeline for one invocation, inside the requested argument mode
pub fn resolve(options: &ParseOptions) -> crate::error::Result<ParsedArguments> {
    let eval = options.eval_args || options.eval_lax;
    if options.json_args && eval {
        return Err(DocargsError::ModeConflict);
    }

    let method = super::find_method(&options.file, &options.method)?;
    let registry = super::open_registry(&options.config);
    if options.strict {
        registry.environment().enable_strict_input();
    }
    let parser = ArgumentParser::new(registry);
    let modes = ArgumentModeController::new();

    modes.with_json_mode(options.json_args, || {
        modes.with_eval_mode(eval, options.eval_lax, || {
            let mut parsed = parser.parse(&options.tokens, Some(&method as &dyn Callable))?;
            modes.apply_argument_coercions(&mut parsed.positional, &mut parsed.keywords)?;
            parser.validate_inputs(&method, &parsed)?;
            Ok(parsed)
        })
    })
}
