//! Comment block parser.
//!
//! Lines are read top to bottom. Leading free text is the summary; the first
//! line recognised as structured documentation ends the summary, and every
//! unrecognised line after it is detail text. Recognisers are tried in order:
//! tagged `@param`, return, tagless option, positional.

use std::path::Path;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use super::annotation::{
    combine_bracketed_tokens, is_placeholder_token, is_type_token, merge_allowed_values,
    parse_type_annotation, partition_type_tokens,
};
use super::reconcile::reconcile;
use crate::environment::{Environment, IssueKind};
use crate::reflect::{Callable, ParameterRole};
use crate::types::utils::{
    analyze_placeholder, default_placeholder_for, determine_value_mode,
    format_inline_type_label, infer_types_from_placeholder, is_known_type, long_flag_for,
    normalize_long_option, normalize_short_option, normalize_type_list, suggest_type,
    PlaceholderInfo,
};
use crate::types::{
    AllowedValue, DocFormat, MethodDocumentation, OptionDefinition, PositionalDefinition,
    ReturnDefinition, ValueMode,
};

/// Matches: @param name rest
/// Groups: 1=parameter name, 2=remainder (types, flags, description)
static TAGGED_PARAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@param\s+([A-Za-z0-9_]+)(.*)$").unwrap());

/// Matches: @return [Type] description
static RETURN_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@return\s+(.*)$").unwrap());

/// Matches: => Type description / => [Type] description
static RETURN_ARROW_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^=>\s+(.*)$").unwrap());

/// Matches: return Type description
static RETURN_WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^return\s+(\S+)(?:\s+(.*))?$").unwrap());

/// One recognised documentation line
#[derive(Debug, Clone, PartialEq)]
pub enum DocLine {
    Option(OptionDefinition),
    Positional(PositionalDefinition),
    Return(ReturnDefinition),
}

/// Where issues for the callable being parsed are reported
#[derive(Debug, Clone, Copy)]
pub(crate) struct IssueSite<'a> {
    pub file: Option<&'a Path>,
    pub line: Option<usize>,
}

impl<'a> IssueSite<'a> {
    pub fn for_callable(callable: &'a dyn Callable) -> Self {
        let location = callable.source_location();
        Self {
            file: location.map(|loc| loc.file.as_path()),
            line: location.map(|loc| loc.comment_line()),
        }
    }
}

/// Unvalidated option fields collected from one line
struct OptionDraft {
    keyword: String,
    long: String,
    short: Option<String>,
    value_name: Option<String>,
    types: Vec<String>,
    description: Option<String>,
    inline_type_annotation: bool,
    doc_format: DocFormat,
    allowed_values: Vec<AllowedValue>,
}

/// Parses comment blocks into reconciled [`MethodDocumentation`]
#[derive(Debug)]
pub struct MetadataParser {
    environment: Rc<Environment>,
}

impl MetadataParser {
    pub fn new(environment: Rc<Environment>) -> Self {
        Self { environment }
    }

    /// Parse `comment_lines` (marker already stripped) and reconcile against `callable`
    pub fn parse(&self, comment_lines: &[String], callable: &dyn Callable) -> MethodDocumentation {
        let site = IssueSite::for_callable(callable);
        let mut draft = MethodDocumentation::default();

        let mut summary_compact: Vec<&str> = Vec::new();
        let mut summary_display: Vec<String> = Vec::new();
        let mut detail_lines: Vec<String> = Vec::new();
        let mut summary_phase = true;

        for content in comment_lines {
            let stripped = content.trim();
            if summary_phase && stripped.is_empty() {
                summary_display.push(String::new());
                continue;
            }

            if stripped.starts_with("@param") && !self.environment.allow_param_comments() {
                self.environment.handle_documentation_issue(
                    IssueKind::DisallowedAnnotationStyle,
                    format!(
                        "@param notation is disabled. Enable it via {}=ON.",
                        crate::config::ALLOW_PARAM_COMMENT_ENV
                    ),
                    site.file,
                    site.line,
                );
                if self.environment.doc_check_mode() {
                    continue;
                }
            }

            match self.classify_line(stripped, callable, site) {
                Some(DocLine::Option(option)) => {
                    draft.options.retain(|existing| existing.keyword != option.keyword);
                    draft.options.push(option);
                    summary_phase = false;
                }
                Some(DocLine::Positional(positional)) => {
                    draft.positionals.push(positional);
                    summary_phase = false;
                }
                Some(DocLine::Return(ret)) => {
                    draft.returns.push(ret);
                    summary_phase = false;
                }
                None if summary_phase => {
                    summary_display.push(content.trim_end().to_string());
                    summary_compact.push(stripped);
                }
                None => detail_lines.push(content.trim_end().to_string()),
            }
        }

        let summary = summary_compact.join(" ");
        draft.summary = (!summary.is_empty()).then_some(summary);
        draft.summary_lines = trim_blank_edges(summary_display);
        draft.detail_lines = trim_blank_edges(detail_lines);

        reconcile(&self.environment, callable, draft, site)
    }

    /// Try each recogniser in priority order
    pub(crate) fn classify_line(
        &self,
        line: &str,
        callable: &dyn Callable,
        site: IssueSite<'_>,
    ) -> Option<DocLine> {
        if let Some(doc) = self.parse_tagged_param_line(line, callable, site) {
            return Some(doc);
        }
        if let Some(ret) = parse_return_line(line) {
            return Some(DocLine::Return(ret));
        }
        if let Some(option) = self.parse_tagless_option_line(line, callable, site) {
            return Some(DocLine::Option(option));
        }
        self.parse_positional_line(line, site)
            .map(DocLine::Positional)
    }

    // ========================================================================
    // Tagged `@param name [Types] (--long -s VALUE) description`
    // ========================================================================

    fn parse_tagged_param_line(
        &self,
        line: &str,
        callable: &dyn Callable,
        site: IssueSite<'_>,
    ) -> Option<DocLine> {
        let cap = TAGGED_PARAM_PATTERN.captures(line)?;
        let param_name = cap[1].to_string();
        let mut rest = cap.get(2).map(|m| m.as_str()).unwrap_or("");
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        rest = rest.trim_start();

        let mut type_text = None;
        if let Some((inner, after)) = take_balanced(rest, '[', ']') {
            type_text = Some(inner);
            rest = after.trim_start();
        }

        let mut flag_text = None;
        if let Some((inner, after)) = take_balanced(rest, '(', ')') {
            flag_text = Some(inner);
            rest = after.trim_start();
        }

        let description = non_empty(rest);
        let (mut types, mut allowed) = partition_type_tokens(parse_type_annotation(type_text));

        let mut long_option = None;
        let mut short_option = None;
        let mut value_name: Option<String> = None;
        let mut type_token: Option<String> = None;

        let flag_tokens = combine_bracketed_tokens(flag_text.unwrap_or("").split_whitespace());
        for token in flag_tokens.iter().flat_map(|token| split_alternatives(token)) {
            let without_at = token.strip_prefix('@').unwrap_or(token.as_str()).to_string();
            if token.starts_with('-') {
                let (flag, inline_value) = split_inline_value(&token);
                if token.starts_with("--") {
                    long_option = Some(flag);
                } else {
                    short_option = Some(flag);
                }
                if value_name.is_none() {
                    value_name = inline_value;
                }
            } else if value_name.is_none() && is_placeholder_token(&without_at) {
                value_name = Some(without_at);
            } else if type_token.is_none() && is_type_token(&token) {
                type_token = Some(token);
            } else if value_name.is_none() {
                value_name = Some(without_at);
            }
        }

        if types.is_empty() {
            if let Some(inline) = &type_token {
                let (inline_types, inline_allowed) =
                    partition_type_tokens(parse_type_annotation(Some(inline)));
                types = inline_types;
                allowed = merge_allowed_values(allowed, inline_allowed);
            }
        }

        let draft = OptionDraft {
            long: long_option.unwrap_or_else(|| long_flag_for(&param_name)),
            keyword: param_name,
            short: short_option,
            value_name,
            types,
            description,
            inline_type_annotation: type_token.is_some(),
            doc_format: DocFormat::TaggedParam,
            allowed_values: allowed,
        };

        let as_option = match callable.parameter_role(&draft.keyword) {
            Some(ParameterRole::Positional) => false,
            Some(ParameterRole::Keyword) => true,
            None => callable.accepts_keyword(&draft.keyword),
        };

        if as_option {
            Some(DocLine::Option(self.build_option_definition(draft, site)))
        } else {
            Some(DocLine::Positional(self.tagged_positional(draft, site)))
        }
    }

    /// Positional built from a tagged line: explicit types only, no Boolean default
    fn tagged_positional(&self, draft: OptionDraft, site: IssueSite<'_>) -> PositionalDefinition {
        let placeholder = draft
            .value_name
            .clone()
            .unwrap_or_else(|| default_placeholder_for(&draft.keyword));
        let info = analyze_placeholder(draft.value_name.as_deref());
        let types = self.resolve_types(&draft.types, &draft.allowed_values, &info, false, site);
        let inline_type_text = draft
            .inline_type_annotation
            .then(|| inline_label(&types, &draft.allowed_values))
            .flatten();

        PositionalDefinition {
            label: clean_label(&placeholder),
            placeholder,
            types,
            description: draft.description,
            param_name: Some(draft.keyword),
            default_value: None,
            inline_type_annotation: draft.inline_type_annotation,
            inline_type_text,
            doc_format: draft.doc_format,
            allowed_values: draft.allowed_values,
        }
    }

    // ========================================================================
    // Tagless `--long -s VALUE [Types] description`
    // ========================================================================

    fn parse_tagless_option_line(
        &self,
        line: &str,
        callable: &dyn Callable,
        site: IssueSite<'_>,
    ) -> Option<OptionDefinition> {
        if !line.starts_with('-') {
            return None;
        }

        let tokens: Vec<String> = combine_bracketed_tokens(line.split_whitespace())
            .into_iter()
            .flat_map(|token| {
                if token.starts_with('-') && token.contains('/') {
                    split_alternatives(&token)
                } else {
                    vec![token]
                }
            })
            .collect();

        let mut long_option: Option<String> = None;
        let mut short_option: Option<String> = None;
        let mut inline_from_long = None;
        let mut inline_from_short = None;
        let mut remaining = Vec::new();

        for token in tokens {
            if long_option.is_none() && token.starts_with("--") {
                let (flag, value) = split_inline_value(&token);
                long_option = Some(flag);
                inline_from_long = value;
            } else if short_option.is_none() && token.starts_with('-') && !token.starts_with("--") {
                let (flag, value) = split_inline_value(&token);
                short_option = Some(flag);
                inline_from_short = value;
            } else {
                remaining.push(token);
            }
        }

        let long_option = long_option?;
        let keyword = long_option.trim_start_matches("--").replace('-', "_");
        if !callable.accepts_keyword(&keyword) {
            return None;
        }

        let mut value_name = inline_from_long.or(inline_from_short);
        let mut type_token: Option<String> = None;
        let mut description_tokens = Vec::new();

        for token in remaining {
            let without_at = token.strip_prefix('@').unwrap_or(token.as_str()).to_string();
            if value_name.is_none() && is_placeholder_token(&without_at) {
                value_name = Some(without_at);
            } else if type_token.is_none() && is_type_token(&token) {
                type_token = Some(token);
            } else {
                description_tokens.push(token);
            }
        }

        let (types, allowed) = partition_type_tokens(parse_type_annotation(type_token.as_deref()));

        Some(self.build_option_definition(
            OptionDraft {
                keyword,
                long: long_option,
                short: short_option,
                value_name,
                types,
                description: non_empty(&description_tokens.join(" ")),
                inline_type_annotation: type_token.is_some(),
                doc_format: DocFormat::Concise,
                allowed_values: allowed,
            },
            site,
        ))
    }

    // ========================================================================
    // Positional `NAME [Types] description`
    // ========================================================================

    fn parse_positional_line(&self, line: &str, site: IssueSite<'_>) -> Option<PositionalDefinition> {
        if line.starts_with('-') {
            return None;
        }

        let mut tokens = combine_bracketed_tokens(line.split_whitespace()).into_iter();
        let placeholder = tokens.next()?;
        let label = clean_label(&placeholder);
        if !is_placeholder_token(&label) {
            return None;
        }

        let mut rest: Vec<String> = tokens.collect();
        let type_token = match rest.first() {
            Some(first) if is_type_token(first) => Some(rest.remove(0)),
            _ => None,
        };

        let (types, allowed) = partition_type_tokens(parse_type_annotation(type_token.as_deref()));
        let info = analyze_placeholder(Some(&placeholder));
        let types = self.resolve_types(&types, &allowed, &info, false, site);

        let inline_type_annotation = type_token.is_some();
        let inline_type_text = inline_type_annotation
            .then(|| inline_label(&types, &allowed))
            .flatten();

        Some(PositionalDefinition {
            label: if label.is_empty() { placeholder.clone() } else { label },
            placeholder,
            types,
            description: non_empty(&rest.join(" ")),
            param_name: None,
            default_value: None,
            inline_type_annotation,
            inline_type_text,
            doc_format: DocFormat::Concise,
            allowed_values: allowed,
        })
    }

    // ========================================================================
    // Definition building
    // ========================================================================

    fn build_option_definition(&self, draft: OptionDraft, site: IssueSite<'_>) -> OptionDefinition {
        let mut value_placeholder = draft.value_name.as_deref().and_then(non_empty);
        let mut info = analyze_placeholder(value_placeholder.as_deref());

        let mut types = self.resolve_types(&draft.types, &draft.allowed_values, &info, true, site);
        if types.is_empty() && value_placeholder.is_none() && draft.allowed_values.is_empty() {
            types.push("Boolean".to_string());
        }

        let mut value_mode = determine_value_mode(value_placeholder.as_deref(), &types, info.optional);
        if value_mode == ValueMode::NotRequired && !draft.allowed_values.is_empty() {
            value_mode = ValueMode::Required;
        }

        if value_placeholder.is_none() && value_mode == ValueMode::Required {
            let synthesized = default_placeholder_for(&draft.keyword);
            info = analyze_placeholder(Some(&synthesized));
            value_placeholder = Some(synthesized);
            if info.optional {
                value_mode = ValueMode::Optional;
            }
        }

        let inline_type_text = draft
            .inline_type_annotation
            .then(|| inline_label(&types, &draft.allowed_values))
            .flatten();

        OptionDefinition {
            long: normalize_long_option(&draft.long),
            short: draft.short.as_deref().map(normalize_short_option),
            keyword: draft.keyword,
            value_name: value_placeholder,
            types,
            description: draft.description.as_deref().and_then(non_empty),
            value_mode,
            default_value: None,
            inline_type_annotation: draft.inline_type_annotation,
            inline_type_text,
            doc_format: draft.doc_format,
            allowed_values: draft.allowed_values,
        }
    }

    /// Normalize declared types, report unknown ones and infer from the placeholder.
    /// A choice list without types stays untyped.
    fn resolve_types(
        &self,
        declared: &[String],
        allowed: &[AllowedValue],
        info: &PlaceholderInfo,
        include_optional_boolean: bool,
        site: IssueSite<'_>,
    ) -> Vec<String> {
        let normalized = normalize_type_list(declared);
        for ty in normalized.iter().filter(|ty| !is_known_type(ty)) {
            let message = match suggest_type(ty) {
                Some(suggestion) => {
                    format!("Unknown type '{}' (did you mean '{}'?)", ty, suggestion)
                }
                None => format!("Unknown type '{}'", ty),
            };
            self.environment.handle_documentation_issue(
                IssueKind::UnknownType,
                message,
                site.file,
                site.line,
            );
        }

        if normalized.is_empty() && !allowed.is_empty() {
            return normalized;
        }
        infer_types_from_placeholder(normalized, info, include_optional_boolean)
    }
}

/// Build an option definition for a keyword parameter that has no documentation
pub(crate) fn auto_option_definition(keyword: &str) -> OptionDefinition {
    OptionDefinition {
        keyword: keyword.to_string(),
        long: long_flag_for(keyword),
        short: None,
        value_name: Some(default_placeholder_for(keyword)),
        types: vec!["String".to_string()],
        description: None,
        value_mode: ValueMode::Required,
        default_value: None,
        inline_type_annotation: false,
        inline_type_text: None,
        doc_format: DocFormat::AutoGenerated,
        allowed_values: Vec::new(),
    }
}

// ============================================================================
// Return lines
// ============================================================================

/// `@return [Type] desc`, `=> Type desc` or `return Type desc`
pub fn parse_return_line(line: &str) -> Option<ReturnDefinition> {
    if let Some(cap) = RETURN_TAG_PATTERN.captures(line) {
        let rest = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let (inner, after) = take_balanced(rest, '[', ']')?;
        return Some(ReturnDefinition {
            types: parse_type_annotation(Some(inner)),
            description: non_empty(after),
        });
    }

    if let Some(cap) = RETURN_ARROW_PATTERN.captures(line) {
        let rest = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let (type_text, description) = match take_balanced(rest, '[', ']') {
            Some((inner, after)) => (inner.to_string(), after),
            None => {
                let (first, after) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                (first.to_string(), after)
            }
        };
        return Some(ReturnDefinition {
            types: parse_type_annotation(Some(&type_text)),
            description: non_empty(description),
        });
    }

    let cap = RETURN_WORD_PATTERN.captures(line)?;
    Some(ReturnDefinition {
        types: parse_type_annotation(cap.get(1).map(|m| m.as_str())),
        description: cap.get(2).and_then(|m| non_empty(m.as_str())),
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Split `open ... close` off the front of `text`, respecting nesting
fn take_balanced(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    if !text.starts_with(open) {
        return None;
    }
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((&text[open.len_utf8()..index], &text[index + close.len_utf8()..]));
            }
        }
    }
    None
}

// `--verbose/-v` -> [`--verbose`, `-v`]
fn split_alternatives(token: &str) -> Vec<String> {
    token
        .split('/')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_inline_value(token: &str) -> (String, Option<String>) {
    match token.split_once('=') {
        Some((flag, value)) => (flag.to_string(), non_empty(value)),
        None => (token.to_string(), None),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn clean_label(placeholder: &str) -> String {
    placeholder.replace(['[', ']'], "")
}

/// Inline display text: the type list, or the literal choices when untyped
fn inline_label(types: &[String], allowed: &[AllowedValue]) -> Option<String> {
    format_inline_type_label(types).or_else(|| {
        (!allowed.is_empty()).then(|| {
            let entries: Vec<String> = allowed.iter().map(|entry| entry.value.to_string()).collect();
            format!("[{}]", entries.join(", "))
        })
    })
}

fn trim_blank_edges(lines: Vec<String>) -> Vec<String> {
    let Some(first) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return Vec::new();
    };
    let last = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(first);
    lines[first..=last].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Signature;
    use crate::value::Value;

    fn parser() -> (Rc<Environment>, MetadataParser) {
        let env = Rc::new(Environment::default());
        (Rc::clone(&env), MetadataParser::new(env))
    }

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_summary_and_detail_phases() {
        let (_, parser) = parser();
        let sig = Signature::new("run").required("target");
        let doc = parser.parse(
            &lines(&[
                "Run the thing.",
                "",
                "Second paragraph.",
                "TARGET [String] What to run",
                "",
                "Examples follow.",
            ]),
            &sig,
        );
        assert_eq!(doc.summary.as_deref(), Some("Run the thing. Second paragraph."));
        assert_eq!(doc.summary_lines, vec!["Run the thing.", "", "Second paragraph."]);
        assert_eq!(doc.detail_lines, vec!["Examples follow."]);
        assert_eq!(doc.positionals[0].label, "TARGET");
    }

    #[test]
    fn test_tagged_param_roles() {
        let (_, parser) = parser();
        let sig = Signature::new("greet")
            .required("name")
            .keyword("greeting", "'Hello'")
            .keyword("shout", "false");
        let doc = parser.parse(
            &lines(&[
                "@param name [String] Person to greet",
                "@param greeting [String] (--greeting -g GREETING) Greeting prefix",
                "@param shout [Boolean] (--shout -s) Emit uppercase output",
            ]),
            &sig,
        );

        assert_eq!(doc.positionals.len(), 1);
        assert_eq!(doc.positionals[0].label, "NAME");
        assert_eq!(doc.positionals[0].types, vec!["String"]);

        let greeting = doc.option_for("greeting").unwrap();
        assert_eq!(greeting.short.as_deref(), Some("-g"));
        assert_eq!(greeting.value_name.as_deref(), Some("GREETING"));
        assert_eq!(greeting.value_mode, ValueMode::Required);
        assert_eq!(greeting.default_value.as_deref(), Some("'Hello'"));
        assert_eq!(greeting.doc_format, DocFormat::TaggedParam);

        let shout = doc.option_for("shout").unwrap();
        assert!(shout.boolean_flag());
        assert_eq!(shout.types, vec!["Boolean"]);
    }

    #[test]
    fn test_tagged_param_nested_brackets() {
        let (_, parser) = parser();
        let sig = Signature::new("tag").keyword("labels", "nil");
        let doc = parser.parse(
            &lines(&["@param labels [String[]] (--labels LABEL...) Labels to apply"]),
            &sig,
        );
        let labels = doc.option_for("labels").unwrap();
        assert_eq!(labels.types, vec!["String[]"]);
        assert_eq!(labels.description.as_deref(), Some("Labels to apply"));
    }

    #[test]
    fn test_tagless_option_inline_type_and_optional_value() {
        let (_, parser) = parser();
        let sig = Signature::new("toggle")
            .required("target")
            .keyword("enable", "false")
            .keyword("limit", "nil");
        let doc = parser.parse(
            &lines(&[
                "TARGET [String] Target identifier",
                "--enable [Boolean] Switch on the feature",
                "--limit [LIMIT] Integer Optional limit (nil allowed)",
            ]),
            &sig,
        );

        let limit = doc.option_for("limit").unwrap();
        assert!(limit.optional_value());
        assert_eq!(limit.types, vec!["Boolean", "Integer"]);
        assert_eq!(limit.inline_type_text.as_deref(), Some("[Boolean, Integer]"));
        assert_eq!(limit.description.as_deref(), Some("Optional limit (nil allowed)"));

        let enable = doc.option_for("enable").unwrap();
        assert!(enable.boolean_flag());
        assert_eq!(enable.doc_format, DocFormat::Concise);
    }

    #[test]
    fn test_option_without_placeholder_or_type_is_boolean_flag() {
        let (_, parser) = parser();
        let sig = Signature::new("run").keyword("dry_run", "nil");
        let doc = parser.parse(&lines(&["--dry-run Only print actions"]), &sig);
        let dry = doc.option_for("dry_run").unwrap();
        assert_eq!(dry.value_mode, ValueMode::BooleanFlag);
        assert_eq!(dry.types, vec!["Boolean"]);
        assert_eq!(dry.requires_value(), Some(false));
    }

    #[test]
    fn test_choice_enumerations() {
        let (_, parser) = parser();
        let sig = Signature::new("report")
            .required("level")
            .keyword("format", "'text'");
        let doc = parser.parse(
            &lines(&[
                "LEVEL %i[info warn error] Report severity",
                r#"--format TARGET ["text", "json", "yaml"] Output format"#,
            ]),
            &sig,
        );

        let level = &doc.positionals[0];
        assert!(level.types.is_empty());
        assert_eq!(level.allowed_values.len(), 3);
        assert_eq!(level.allowed_values[0].value, Value::symbol("info"));
        assert_eq!(level.inline_type_text.as_deref(), Some("[:info, :warn, :error]"));

        let format = doc.option_for("format").unwrap();
        assert_eq!(format.value_mode, ValueMode::Required);
        assert_eq!(format.allowed_values[1].value, Value::str("json"));
        assert_eq!(format.value_name.as_deref(), Some("TARGET"));
    }

    #[test]
    fn test_untyped_choice_option_gets_placeholder() {
        let (_, parser) = parser();
        let sig = Signature::new("log").keyword("level", "nil");
        let doc = parser.parse(&lines(&["--level %i[info warn] Log level"]), &sig);
        let level = doc.option_for("level").unwrap();
        assert_eq!(level.value_mode, ValueMode::Required);
        assert_eq!(level.value_name.as_deref(), Some("LEVEL"));
        assert!(level.types.is_empty());
    }

    #[test]
    fn test_return_spellings() {
        for line in ["@return [String] The text", "=> [String] The text", "=> String The text", "return String The text"] {
            let ret = parse_return_line(line).unwrap();
            assert_eq!(ret.types, vec!["String"], "{}", line);
            assert_eq!(ret.description.as_deref(), Some("The text"), "{}", line);
        }
        assert!(parse_return_line("Returns nothing").is_none());
    }

    #[test]
    fn test_tagless_option_for_unknown_keyword_is_detail_text() {
        let (_, parser) = parser();
        let sig = Signature::new("greet").required("name");
        let doc = parser.parse(
            &lines(&["NAME [String] Sample argument", "--ghost [Boolean] Option not implemented"]),
            &sig,
        );
        assert!(doc.options.is_empty());
        assert_eq!(doc.detail_lines, vec!["--ghost [Boolean] Option not implemented"]);
    }

    #[test]
    fn test_unknown_type_reports_suggestion() {
        let (env, parser) = parser();
        let sig = Signature::new("count").required("amount");
        let doc = parser.parse(&lines(&["AMOUNT [Integr] How many"]), &sig);
        assert_eq!(doc.positionals[0].types, vec!["Integr"]);

        let issues = env.documentation_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnknownType);
        assert!(issues[0].message.contains("did you mean 'Integer'"));
    }

    #[test]
    fn test_disallowed_param_comments() {
        let (env, parser) = parser();
        env.set_allow_param_comments(false);
        let sig = Signature::new("greet").required("name");

        let doc = parser.parse(&lines(&["@param name [String] Who"]), &sig);
        assert_eq!(doc.positionals[0].types, vec!["String"]);
        assert_eq!(env.documentation_issues()[0].kind, IssueKind::DisallowedAnnotationStyle);

        env.clear_documentation_issues();
        env.enable_doc_check();
        let doc = parser.parse(&lines(&["@param name [String] Who"]), &sig);
        assert!(doc.positionals.is_empty());
        assert!(doc.detail_lines.is_empty());
        assert!(doc.summary.is_none());
    }

    #[test]
    fn test_take_balanced() {
        assert_eq!(take_balanced("[A[]] rest", '[', ']'), Some(("A[]", " rest")));
        assert_eq!(take_balanced("(x)", '(', ')'), Some(("x", "")));
        assert_eq!(take_balanced("[open", '[', ']'), None);
        assert_eq!(take_balanced("none", '[', ']'), None);
    }
}
