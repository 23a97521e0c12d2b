//! Command-line token parsing against reconciled documentation.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use crate::arguments::converter::ValueConverter;
use crate::arguments::stream::TokenStream;
use crate::arguments::types::{normalize_choice, ConverterChain};
use crate::environment::Environment;
use crate::error::{DocargsError, Result};
use crate::mode::ArgumentModeController;
use crate::reflect::{Callable, ParamKind};
use crate::registry::DocumentationRegistry;
use crate::types::utils::{
    is_boolean_string, is_known_type, list_element_type, long_flag_for, value_matches_type,
};
use crate::types::{AllowedValue, MethodDocumentation, OptionDefinition, ValueMode};
use crate::value::{KeywordArgs, ParsedArguments, Value};

// ============================================================================
// Token patterns
// ============================================================================

/// `-n`, `--name`, `--name=value`
static OPTION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^-{1,2}([a-zA-Z0-9_-]+)(?:=(.*))?$").unwrap());

/// `name=value` without a dash prefix
static ASSIGNMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([A-Za-z_]\w*)=(.*)$").unwrap());

/// Negative numbers are values, not flags
static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());

/// True when `token` would be read as a flag rather than a value
pub fn looks_like_option(token: &str) -> bool {
    token != "--" && token.starts_with('-') && !NUMERIC_TOKEN.is_match(token)
}

fn is_option_token(token: &str) -> bool {
    OPTION_TOKEN.is_match(token) && !NUMERIC_TOKEN.is_match(token)
}

/// Value captured for an option before conversion
#[derive(Debug, Clone, Copy, PartialEq)]
enum Captured<'a> {
    /// Embedded `=value` or a consumed following token
    Token(&'a str),
    /// Presence alone; converted like the text `true`
    Implicit,
    /// Optional-value option given without a value; stored as `true` unconverted
    Omitted,
}

/// Lookup tables built once per parse call
struct ParseContext<'m> {
    keyword_names: Vec<String>,
    aliases: HashMap<String, String>,
    options: HashMap<&'m str, &'m OptionDefinition>,
    converters: HashMap<&'m str, ConverterChain>,
}

impl<'m> ParseContext<'m> {
    fn new(metadata: &'m MethodDocumentation, callable: Option<&dyn Callable>) -> Self {
        let keyword_names = callable
            .map(|c| c.keyword_names().into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        let mut aliases = HashMap::new();
        let mut options = HashMap::new();
        let mut converters = HashMap::new();
        for option in &metadata.options {
            if let Some(short) = &option.short {
                aliases.insert(
                    short.trim_start_matches('-').replace('-', "_"),
                    option.keyword.clone(),
                );
            }
            options.insert(option.keyword.as_str(), option);
            if let Some(chain) = ConverterChain::for_types(&option.types) {
                converters.insert(option.keyword.as_str(), chain);
            }
        }

        Self {
            keyword_names,
            aliases,
            options,
            converters,
        }
    }

    /// Exact keyword, else the single live keyword starting with `key`
    fn resolve_keyword(&self, key: &str) -> Option<String> {
        if self.keyword_names.iter().any(|name| name == key) {
            return Some(key.to_string());
        }
        let matching: Vec<&String> = self
            .keyword_names
            .iter()
            .filter(|name| name.starts_with(key))
            .collect();
        tracing::debug!("prefix matching for '{}': found {:?}", key, matching);

        match matching.as_slice() {
            [only] => {
                tracing::debug!("unambiguous prefix match found: '{}'", only);
                Some((*only).clone())
            }
            _ => {
                tracing::debug!("no unique match found for '{}'", key);
                None
            }
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Turns command-line tokens into positional and keyword values for a callable
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    environment: Rc<Environment>,
    registry: Rc<DocumentationRegistry>,
    converter: ValueConverter,
    modes: ArgumentModeController,
}

impl ArgumentParser {
    pub fn new(registry: Rc<DocumentationRegistry>) -> Self {
        let modes = ArgumentModeController::new();
        Self {
            environment: Rc::clone(registry.environment()),
            registry,
            converter: ValueConverter::new(modes),
            modes,
        }
    }

    /// Parse `tokens` for `callable`; without a callable every option is undocumented
    pub fn parse(
        &self,
        tokens: &[String],
        callable: Option<&dyn Callable>,
    ) -> Result<ParsedArguments> {
        let metadata = callable
            .map(|c| self.registry.metadata_for(c))
            .unwrap_or_default();
        let context = ParseContext::new(&metadata, callable);
        tracing::debug!(
            "available keyword parameters: {:?}",
            context.keyword_names
        );

        let mut positional = Vec::new();
        let mut raw_positional: Vec<&str> = Vec::new();
        let mut keywords = KeywordArgs::new();
        let mut stream = TokenStream::new(tokens);

        while let Some(token) = stream.consume() {
            if token == "--" {
                for rest in stream.consume_remaining() {
                    positional.push(self.converter.convert(rest));
                    raw_positional.push(rest);
                }
                break;
            }

            if is_option_token(token) {
                self.process_option(token, &mut stream, &context, &mut keywords)?;
            } else if let Some(caps) = ASSIGNMENT_TOKEN.captures(token) {
                let value = caps.get(2).map_or("", |m| m.as_str());
                keywords.insert(caps[1].to_string(), self.converter.convert(value));
            } else {
                positional.push(self.converter.convert(token));
                raw_positional.push(token);
            }
        }

        if let Some(callable) = callable {
            self.convert_positionals(callable, &metadata, &raw_positional, &mut positional)?;
        }

        tracing::debug!(
            "final parsed - positional: {:?}, keywords: {:?}",
            positional,
            keywords
        );
        Ok(ParsedArguments::new(positional, keywords))
    }

    fn process_option<'a>(
        &self,
        token: &'a str,
        stream: &mut TokenStream<'a>,
        context: &ParseContext<'_>,
        keywords: &mut KeywordArgs,
    ) -> Result<()> {
        let Some(caps) = OPTION_TOKEN.captures(token) else {
            return Ok(());
        };
        let name = caps.get(1).map_or("", |m| m.as_str());
        let embedded = caps.get(2).map(|m| m.as_str());

        let cli_key = name.replace('-', "_");
        let cli_key = context.aliases.get(&cli_key).cloned().unwrap_or(cli_key);
        tracing::debug!("processing option '{}' -> '{}'", name, cli_key);

        let key = context.resolve_keyword(&cli_key).unwrap_or(cli_key);
        let definition = context.options.get(key.as_str()).copied();
        let label = definition
            .map(|d| d.display_flag().to_string())
            .unwrap_or_else(|| long_flag_for(&key));

        let captured = match embedded {
            Some(value) => Captured::Token(value),
            None => capture_value(definition, stream, &label)?,
        };
        let value = self.convert_option_value(&key, captured, definition, context, &label)?;
        keywords.insert(key, value);
        Ok(())
    }

    fn convert_option_value(
        &self,
        key: &str,
        captured: Captured<'_>,
        definition: Option<&OptionDefinition>,
        context: &ParseContext<'_>,
        label: &str,
    ) -> Result<Value> {
        let raw = match captured {
            Captured::Omitted => return Ok(Value::Bool(true)),
            Captured::Implicit => "true",
            Captured::Token(text) => text,
        };
        if self.modes.raw_mode() {
            return Ok(Value::str(raw));
        }

        let provisional = self.converter.convert(raw);
        let value = match context.converters.get(key) {
            Some(chain) => chain
                .convert(provisional, raw)
                .map_err(|reason| DocargsError::option_conversion(label, raw, reason))?,
            None => provisional,
        };
        Ok(match definition {
            Some(definition) => normalize_choice(value, &definition.allowed_values),
            None => value,
        })
    }

    /// Run documented positional types over the values bound to live parameters
    fn convert_positionals(
        &self,
        callable: &dyn Callable,
        metadata: &MethodDocumentation,
        raw: &[&str],
        positional: &mut [Value],
    ) -> Result<()> {
        if self.modes.raw_mode() {
            return Ok(());
        }

        for (index, param, element) in bind_positionals(callable, positional.len()) {
            let Some(definition) = metadata.positional_for(&param.name) else {
                continue;
            };
            let chain = if element {
                ConverterChain::for_element_types(&definition.types)
            } else {
                ConverterChain::for_types(&definition.types)
            };

            let slot = &mut positional[index];
            let value = std::mem::replace(slot, Value::Nil);
            let value = match &chain {
                Some(chain) => chain.convert(value, raw[index]).map_err(|reason| {
                    DocargsError::positional_conversion(&definition.label, raw[index], reason)
                })?,
                None => value,
            };
            *slot = normalize_choice(value, &definition.allowed_values);
        }
        Ok(())
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check bound values against documented types and choices.
    ///
    /// Each violation goes through the environment, which warns or fails
    /// depending on strict input.
    pub fn validate_inputs(&self, callable: &dyn Callable, arguments: &ParsedArguments) -> Result<()> {
        let metadata = self.registry.metadata_for(callable);
        self.validate_with(&metadata, callable, arguments)
    }

    pub fn validate_with(
        &self,
        metadata: &MethodDocumentation,
        callable: &dyn Callable,
        arguments: &ParsedArguments,
    ) -> Result<()> {
        for (index, param, element) in bind_positionals(callable, arguments.positional.len()) {
            let Some(definition) = metadata.positional_for(&param.name) else {
                continue;
            };
            let types: Vec<String> = if element {
                definition
                    .types
                    .iter()
                    .map(|ty| list_element_type(ty).unwrap_or(ty).to_string())
                    .collect()
            } else {
                definition.types.clone()
            };
            let value = &arguments.positional[index];
            if !value_accepted(value, &types, &definition.allowed_values) {
                self.environment.handle_input_violation(violation_message(
                    value,
                    &format!("argument '{}'", definition.label),
                    &types,
                    &definition.allowed_values,
                ))?;
            }
        }

        for (keyword, value) in &arguments.keywords {
            let Some(option) = metadata.option_for(keyword) else {
                continue;
            };
            if option.value_mode == ValueMode::Optional && *value == Value::Bool(true) {
                continue;
            }
            if !value_accepted(value, &option.types, &option.allowed_values) {
                self.environment.handle_input_violation(violation_message(
                    value,
                    &format!("option '{}'", option.display_flag()),
                    &option.types,
                    &option.allowed_values,
                ))?;
            }
        }
        Ok(())
    }
}

fn capture_value<'a>(
    definition: Option<&OptionDefinition>,
    stream: &mut TokenStream<'a>,
    label: &str,
) -> Result<Captured<'a>> {
    let next = stream.current();
    let captured = match definition.map(|d| d.value_mode) {
        Some(ValueMode::BooleanFlag) => match next {
            Some(token) if is_boolean_string(token) => Captured::Token(token),
            _ => Captured::Implicit,
        },
        Some(ValueMode::Optional) => match next {
            Some(token) if !looks_like_option(token) => Captured::Token(token),
            _ => Captured::Omitted,
        },
        Some(ValueMode::NotRequired) => Captured::Implicit,
        Some(ValueMode::Required) => match next {
            Some(token) if !looks_like_option(token) => Captured::Token(token),
            _ => {
                return Err(DocargsError::OptionValueMissing {
                    option: label.to_string(),
                })
            }
        },
        None => match next {
            Some(token) if !looks_like_option(token) => Captured::Token(token),
            _ => Captured::Implicit,
        },
    };
    if matches!(captured, Captured::Token(_)) {
        stream.advance(1);
    }
    Ok(captured)
}

/// `(value index, parameter, is rest element)` for every bound positional
fn bind_positionals(
    callable: &dyn Callable,
    count: usize,
) -> Vec<(usize, &crate::reflect::Parameter, bool)> {
    let mut bound = Vec::new();
    let mut index = 0;
    for param in callable.parameters() {
        if index >= count {
            break;
        }
        if param.kind.is_fixed_positional() {
            bound.push((index, param, false));
            index += 1;
        } else if param.kind == ParamKind::Rest {
            bound.extend((index..count).map(|i| (i, param, true)));
            index = count;
        }
    }
    bound
}

fn value_accepted(value: &Value, types: &[String], allowed: &[AllowedValue]) -> bool {
    let known: Vec<&str> = types
        .iter()
        .map(String::as_str)
        .filter(|ty| is_known_type(ty))
        .collect();
    if known.is_empty() && allowed.is_empty() {
        return true;
    }
    if allowed.iter().any(|entry| entry.value == *value) {
        return true;
    }
    if known
        .iter()
        .any(|ty| value_matches_type(value, ty) == Some(true))
    {
        return true;
    }

    match value {
        Value::List(items) if !allowed.is_empty() => items.iter().all(|item| {
            allowed.iter().any(|entry| entry.value == *item)
                || known.iter().any(|ty| {
                    list_element_type(ty)
                        .is_some_and(|inner| value_matches_type(item, inner) == Some(true))
                })
        }),
        _ => false,
    }
}

fn violation_message(
    value: &Value,
    target: &str,
    types: &[String],
    allowed: &[AllowedValue],
) -> String {
    let mut expected = Vec::new();
    let known: Vec<&str> = types
        .iter()
        .map(String::as_str)
        .filter(|ty| is_known_type(ty))
        .collect();
    if !known.is_empty() {
        expected.push(known.join(" | "));
    }
    if !allowed.is_empty() {
        let choices: Vec<String> = allowed.iter().map(|entry| entry.value.to_string()).collect();
        expected.push(format!("one of {}", choices.join(", ")));
    }
    format!(
        "Value {} for {} is invalid: expected {}",
        value,
        target,
        expected.join(" or ")
    )
}
