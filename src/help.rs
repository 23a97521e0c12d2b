//! Help text rendered from reconciled documentation.

use std::rc::Rc;

use crate::reflect::{Callable, ParamKind};
use crate::registry::DocumentationRegistry;
use crate::types::utils::{is_boolean_type, is_nil_type, long_flag_for};
use crate::types::{DocFormat, MethodDocumentation, OptionDefinition, PositionalDefinition};

/// Renders command listings and per-command usage
#[derive(Debug, Clone)]
pub struct HelpRenderer {
    registry: Rc<DocumentationRegistry>,
}

struct PositionalRow<'m> {
    label: String,
    definition: Option<&'m PositionalDefinition>,
}

impl HelpRenderer {
    pub fn new(registry: Rc<DocumentationRegistry>) -> Self {
        Self { registry }
    }

    /// One-line description: the summary, else a parameter sketch
    pub fn method_description(&self, callable: &dyn Callable) -> String {
        let metadata = self.registry.metadata_for(callable);
        if let Some(summary) = metadata.summary.filter(|s| !s.is_empty()) {
            return summary;
        }

        let sketch: Vec<String> = callable
            .parameters()
            .iter()
            .filter_map(|param| {
                let flag = long_flag_for(&param.name);
                Some(match param.kind {
                    ParamKind::Required => format!("<{}>", param.name),
                    ParamKind::Optional => format!("[<{}>]", param.name),
                    ParamKind::Rest => format!("[<{}>...]", param.name),
                    ParamKind::KeywordRequired => format!("{}=<value>", flag),
                    ParamKind::Keyword => format!("[{}=<value>]", flag),
                    ParamKind::KeywordRest => "[--<option>...]".to_string(),
                    ParamKind::Block => return None,
                })
            })
            .collect();

        if sketch.is_empty() {
            "(no arguments)".to_string()
        } else {
            sketch.join(" ")
        }
    }

    /// Full usage text for one command
    pub fn usage_for(&self, program: &str, command: &str, callable: &dyn Callable) -> String {
        let metadata = self.registry.metadata_for(callable);
        let params = format_parameters(callable, &metadata);
        let mut lines = vec![format!("Usage: {} {} {}", program, command, params)
            .trim()
            .to_string()];

        let rows = ordered_positionals(callable, &metadata);
        if !rows.is_empty() {
            let width = rows.iter().map(|row| row.label.len()).max().unwrap_or(0);
            lines.push(String::new());
            lines.push("Positional arguments:".to_string());
            for row in &rows {
                let description = row
                    .definition
                    .map(positional_description)
                    .unwrap_or_default();
                lines.push(table_line(&row.label, width, &description));
            }
        }

        if !metadata.options.is_empty() {
            let labels: Vec<String> = metadata.options.iter().map(flag_with_placeholder).collect();
            let width = labels.iter().map(String::len).max().unwrap_or(0);
            if lines.last().is_some_and(|line| !line.is_empty()) {
                lines.push(String::new());
            }
            lines.push("Options:".to_string());
            for (option, label) in metadata.options.iter().zip(&labels) {
                lines.push(table_line(label, width, &option_description(option)));
            }
        }

        if !metadata.returns.is_empty() {
            if lines.last().is_some_and(|line| !line.is_empty()) {
                lines.push(String::new());
            }
            lines.push("Return values:".to_string());
            for ret in &metadata.returns {
                let mut line = format!("  {}", ret.types.join(" | "));
                if let Some(description) = ret.description.as_deref().filter(|d| !d.is_empty()) {
                    line.push_str("  ");
                    line.push_str(description);
                }
                lines.push(line);
            }
        }

        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }

        let mut sections = Vec::new();
        let summary = metadata.summary_lines.join("\n").trim_end().to_string();
        if !summary.is_empty() {
            sections.push(summary);
        }
        sections.push(lines.join("\n"));
        let details = metadata.detail_lines.join("\n").trim_end().to_string();
        if !details.is_empty() {
            sections.push(details);
        }
        sections.join("\n\n")
    }

    /// Listing of every command with its description
    pub fn command_list<C: Callable>(&self, program: &str, commands: &[C]) -> String {
        let mut lines = vec![format!("Usage: {} COMMAND [arguments]", program), String::new()];
        if commands.is_empty() {
            lines.push("No commands available.".to_string());
            return lines.join("\n");
        }

        lines.push("Available commands:".to_string());
        for command in commands {
            let description = self.method_description(command);
            let line = format!("  {:<20} {}", command.name(), description);
            lines.push(line.trim_end().to_string());
        }
        lines.push(String::new());
        lines.push(format!("Detailed command help: {} COMMAND --help", program));
        lines.push("Enable debug logging: --verbose or DOCARGS_DEBUG=true".to_string());
        lines.join("\n")
    }
}

fn table_line(label: &str, width: usize, description: &str) -> String {
    if description.is_empty() {
        format!("  {:<width$}", label, width = width).trim_end().to_string()
    } else {
        format!("  {:<width$}  {}", label, description, width = width)
    }
}

fn format_parameters(callable: &dyn Callable, metadata: &MethodDocumentation) -> String {
    callable
        .parameters()
        .iter()
        .filter_map(|param| {
            let positional_label = || {
                metadata
                    .positional_for(&param.name)
                    .map(|doc| doc.label.clone())
                    .unwrap_or_else(|| param.name.to_uppercase())
            };
            let option_label = || match metadata.option_for(&param.name) {
                Some(option) if option.doc_format == DocFormat::AutoGenerated => {
                    let flag = long_flag_for(&param.name);
                    if option.boolean_flag() {
                        flag
                    } else {
                        format!("{}=<value>", flag)
                    }
                }
                Some(option) => flag_with_placeholder(option),
                None => format!("{}=<value>", long_flag_for(&param.name)),
            };

            Some(match param.kind {
                ParamKind::Required => format!("<{}>", positional_label()),
                ParamKind::Optional => format!("[<{}>]", positional_label()),
                ParamKind::Rest => format!("[<{}>...]", param.name),
                ParamKind::KeywordRequired => option_label(),
                ParamKind::Keyword => format!("[{}]", option_label()),
                ParamKind::KeywordRest => "[--<option>...]".to_string(),
                ParamKind::Block => return None,
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn ordered_positionals<'m>(
    callable: &dyn Callable,
    metadata: &'m MethodDocumentation,
) -> Vec<PositionalRow<'m>> {
    callable
        .parameters()
        .iter()
        .filter(|param| param.kind.is_fixed_positional())
        .map(|param| {
            let definition = metadata.positional_for(&param.name);
            let base = definition
                .map(|doc| doc.label.clone())
                .unwrap_or_else(|| param.name.to_uppercase());
            let label = if param.kind == ParamKind::Optional {
                format!("[{}]", base)
            } else {
                base
            };
            PositionalRow { label, definition }
        })
        .collect()
}

/// `[A, B]` for the concise dialect, `(type: A | B)` otherwise
fn type_display(types: &[String], inline: bool, format: DocFormat) -> Option<String> {
    if inline {
        return None;
    }
    let mut unique: Vec<&str> = Vec::new();
    for ty in types.iter().map(String::as_str).filter(|ty| !ty.is_empty()) {
        if !unique.contains(&ty) {
            unique.push(ty);
        }
    }
    if unique.is_empty() {
        return None;
    }
    Some(if format == DocFormat::Concise {
        format!("[{}]", unique.join(", "))
    } else {
        format!("(type: {})", unique.join(" | "))
    })
}

fn describe(
    inline_text: Option<&str>,
    type_info: Option<String>,
    format: DocFormat,
    description: Option<&str>,
    default_value: Option<&str>,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(text) = inline_text {
        parts.push(text.to_string());
    }
    let type_first = format == DocFormat::Concise;
    if type_first {
        parts.extend(type_info.clone());
    }
    if let Some(description) = description {
        parts.push(description.to_string());
    }
    if !type_first {
        parts.extend(type_info);
    }
    if let Some(default) = default_value.filter(|d| !d.is_empty()) {
        parts.push(format!("(default: {})", default));
    }
    parts.join(" ")
}

fn positional_description(definition: &PositionalDefinition) -> String {
    describe(
        definition
            .inline_type_annotation
            .then_some(definition.inline_type_text.as_deref())
            .flatten(),
        type_display(
            &definition.types,
            definition.inline_type_annotation,
            definition.doc_format,
        ),
        definition.doc_format,
        definition.description.as_deref(),
        definition.default_value.as_deref(),
    )
}

fn option_description(option: &OptionDefinition) -> String {
    describe(
        option
            .inline_type_annotation
            .then_some(option.inline_type_text.as_deref())
            .flatten(),
        type_display(&option.types, option.inline_type_annotation, option.doc_format),
        option.doc_format,
        option.description.as_deref(),
        option.default_value.as_deref(),
    )
}

/// `-s, --long PLACEHOLDER`
fn flag_with_placeholder(option: &OptionDefinition) -> String {
    let flags: Vec<&str> = option
        .short
        .as_deref()
        .into_iter()
        .chain((!option.long.is_empty()).then_some(option.long.as_str()))
        .collect();
    let flag_label = if flags.is_empty() {
        long_flag_for(&option.keyword)
    } else {
        flags.join(", ")
    };
    match value_placeholder(option) {
        Some(placeholder) => format!("{} {}", flag_label, placeholder),
        None => flag_label,
    }
}

fn value_placeholder(option: &OptionDefinition) -> Option<&str> {
    if option.boolean_flag() {
        return None;
    }
    if let Some(name) = option.value_name.as_deref().filter(|n| !n.is_empty()) {
        return Some(name);
    }
    option
        .types
        .iter()
        .map(String::as_str)
        .find(|ty| !is_nil_type(ty) && !is_boolean_type(ty))
}
