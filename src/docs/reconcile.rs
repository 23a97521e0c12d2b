//! Alignment of parsed documentation with the live parameter list.
//!
//! Positional documentation binds to positional parameters strictly by order.
//! Options bind by keyword. Missing documentation is reported and, outside of
//! doc-check mode, replaced by generated fallbacks; surplus positional
//! documentation is reported and demoted to detail text.

use std::collections::VecDeque;

use super::parser::{auto_option_definition, IssueSite};
use crate::environment::{Environment, IssueKind};
use crate::reflect::{Callable, ParamKind};
use crate::types::utils::convert_boolean;
use crate::types::{DocFormat, MethodDocumentation, PositionalDefinition, ValueMode};
use crate::value::Value;

pub(crate) fn reconcile(
    environment: &Environment,
    callable: &dyn Callable,
    mut draft: MethodDocumentation,
    site: IssueSite<'_>,
) -> MethodDocumentation {
    let mut pending: VecDeque<PositionalDefinition> = std::mem::take(&mut draft.positionals).into();
    let mut documented_options = std::mem::take(&mut draft.options);
    let mut positionals = Vec::new();
    let mut ordered_options = Vec::new();

    for param in callable.parameters() {
        let name = param.name.as_str();
        match param.kind {
            ParamKind::Required | ParamKind::Optional => match pending.pop_front() {
                Some(mut doc) => {
                    doc.param_name = Some(name.to_string());
                    doc.default_value = param.default.clone();
                    positionals.push(doc);
                }
                None => {
                    environment.handle_documentation_issue(
                        IssueKind::DocumentationGap,
                        format!("Documentation is missing for positional argument '{}'", name),
                        site.file,
                        site.line,
                    );
                    if !environment.doc_check_mode() {
                        positionals.push(PositionalDefinition::auto_generated(
                            name,
                            param.default.clone(),
                        ));
                    }
                }
            },
            ParamKind::Rest => {
                if let Some(mut doc) = pending.pop_front() {
                    doc.param_name = Some(name.to_string());
                    positionals.push(doc);
                }
            }
            ParamKind::KeywordRequired | ParamKind::Keyword => {
                match documented_options.iter().position(|opt| opt.keyword == name) {
                    Some(index) => ordered_options.push(documented_options.remove(index)),
                    None => {
                        environment.handle_documentation_issue(
                            IssueKind::DocumentationGap,
                            format!("Documentation is missing for keyword argument ':{}'", name),
                            site.file,
                            site.line,
                        );
                        if !environment.doc_check_mode() {
                            ordered_options.push(auto_option_definition(name));
                        }
                    }
                }
            }
            ParamKind::KeywordRest | ParamKind::Block => {}
        }
    }

    ordered_options.append(&mut documented_options);

    if !pending.is_empty() {
        let extra: Vec<&str> = pending.iter().map(|doc| doc.placeholder.as_str()).collect();
        environment.handle_documentation_issue(
            IssueKind::ExtraDocumentation,
            format!("Extra positional argument comments were found: {}", extra.join(", ")),
            site.file,
            site.line,
        );
        draft
            .detail_lines
            .extend(pending.iter().filter_map(detail_line_for_extra_positional));
    }

    for option in &mut ordered_options {
        let Some(default) = callable.default_for(&option.keyword) else {
            continue;
        };
        option.default_value = Some(default.to_string());
        if boolean_default(default) {
            option.value_mode = ValueMode::BooleanFlag;
            if option.doc_format == DocFormat::AutoGenerated {
                option.value_name = None;
                option.types = vec!["Boolean".to_string()];
            }
        }
    }

    draft.positional_index = positionals
        .iter()
        .enumerate()
        .filter_map(|(index, doc)| doc.param_name.clone().map(|name| (name, index)))
        .collect();
    draft.positionals = positionals;
    draft.options = ordered_options;
    draft
}

/// Boolean words (`true`, `No`, `y`, ...) make a flag; integer defaults stay values
fn boolean_default(default: &str) -> bool {
    let text = default.trim();
    text.parse::<i64>().is_err() && convert_boolean(&Value::str(text)).is_ok()
}

/// `PLACEHOLDER [Types] description` for positional docs with no parameter
fn detail_line_for_extra_positional(doc: &PositionalDefinition) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    let placeholder = doc.placeholder.trim();
    let placeholder = if placeholder.is_empty() { doc.label.trim() } else { placeholder };
    if !placeholder.is_empty() {
        parts.push(placeholder.to_string());
    }

    match doc.inline_type_text.as_deref().filter(|text| !text.is_empty()) {
        Some(text) => parts.push(text.to_string()),
        None if !doc.types.is_empty() => parts.push(format!("[{}]", doc.types.join(", "))),
        None => {}
    }

    if let Some(description) = doc.description.as_deref().map(str::trim) {
        if !description.is_empty() {
            parts.push(description.to_string());
        }
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::MetadataParser;
    use crate::reflect::Signature;
    use std::rc::Rc;

    fn parse(env: &Rc<Environment>, sig: &Signature, text: &[&str]) -> MethodDocumentation {
        let lines: Vec<String> = text.iter().map(|s| s.to_string()).collect();
        MetadataParser::new(Rc::clone(env)).parse(&lines, sig)
    }

    #[test]
    fn test_positionals_bind_by_order() {
        let env = Rc::new(Environment::default());
        let sig = Signature::new("copy").required("source").optional("target", "nil");
        let doc = parse(&env, &sig, &["FROM [String] Source", "TO [String] Target"]);

        assert_eq!(doc.positional_for("source").unwrap().label, "FROM");
        let target = doc.positional_for("target").unwrap();
        assert_eq!(target.label, "TO");
        assert_eq!(target.default_value.as_deref(), Some("nil"));
        assert!(env.documentation_issues().is_empty());
    }

    #[test]
    fn test_gap_creates_fallbacks() {
        let env = Rc::new(Environment::default());
        let sig = Signature::new("run")
            .required("first")
            .required("second")
            .keyword("mode", "'fast'")
            .keyword("force", "false");
        let doc = parse(&env, &sig, &["FIRST [String] First"]);

        let second = doc.positional_for("second").unwrap();
        assert_eq!(second.doc_format, DocFormat::AutoGenerated);
        assert_eq!(second.label, "SECOND");

        let mode = doc.option_for("mode").unwrap();
        assert_eq!(mode.long, "--mode");
        assert_eq!(mode.value_name.as_deref(), Some("MODE"));
        assert_eq!(mode.value_mode, ValueMode::Required);
        assert_eq!(mode.default_value.as_deref(), Some("'fast'"));

        let force = doc.option_for("force").unwrap();
        assert!(force.boolean_flag());
        assert_eq!(force.value_name, None);
        assert_eq!(force.types, vec!["Boolean"]);

        let kinds: Vec<IssueKind> = env.documentation_issues().iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![IssueKind::DocumentationGap; 3]);
    }

    #[test]
    fn test_two_positionals_and_keyword_with_one_doc() {
        let env = Rc::new(Environment::default());
        let sig = Signature::new("move")
            .required("source")
            .required("target")
            .keyword("mode", "nil");
        let doc = parse(&env, &sig, &["SOURCE [String] What to move"]);

        assert_eq!(doc.positional_for("source").unwrap().doc_format, DocFormat::Concise);
        let target = doc.positional_for("target").unwrap();
        assert_eq!(target.doc_format, DocFormat::AutoGenerated);
        assert_eq!(target.label, "TARGET");
        assert_eq!(doc.option_for("mode").unwrap().doc_format, DocFormat::AutoGenerated);

        let kinds: Vec<IssueKind> = env.documentation_issues().iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![IssueKind::DocumentationGap; 2]);
    }

    #[test]
    fn test_boolean_defaults_make_flags() {
        let env = Rc::new(Environment::default());
        let sig = Signature::new("run")
            .keyword("force", "FALSE")
            .keyword("quiet", "yes")
            .keyword("count", "1")
            .keyword("label", "'on'");
        let doc = parse(&env, &sig, &["Run it."]);

        assert!(doc.option_for("force").unwrap().boolean_flag());
        assert!(doc.option_for("quiet").unwrap().boolean_flag());
        let count = doc.option_for("count").unwrap();
        assert_eq!(count.value_mode, ValueMode::Required);
        assert_eq!(count.default_value.as_deref(), Some("1"));
        assert_eq!(doc.option_for("label").unwrap().value_mode, ValueMode::Required);
    }

    #[test]
    fn test_gap_without_fallback_in_doc_check() {
        let env = Rc::new(Environment::default());
        env.enable_doc_check();
        let sig = Signature::new("run").required("first").keyword("mode", "nil");
        let doc = parse(&env, &sig, &["Summary only."]);

        assert!(doc.positionals.is_empty());
        assert!(doc.options.is_empty());
        assert_eq!(env.documentation_issues().len(), 2);
    }

    #[test]
    fn test_extra_positional_docs_become_detail_lines() {
        let env = Rc::new(Environment::default());
        let sig = Signature::new("greet").required("name");
        let doc = parse(
            &env,
            &sig,
            &[
                "NAME [String] Person",
                "EXTRA [Integer] Not implemented",
                "MORE Unused",
            ],
        );

        assert_eq!(doc.positionals.len(), 1);
        assert_eq!(
            doc.detail_lines,
            vec!["EXTRA [Integer] Not implemented", "MORE [String] Unused"]
        );

        let issues = env.documentation_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::ExtraDocumentation);
        assert!(issues[0]
            .message
            .ends_with("Extra positional argument comments were found: EXTRA, MORE"));
    }

    #[test]
    fn test_rest_parameter_binds_remaining_doc() {
        let env = Rc::new(Environment::default());
        let sig = Signature::new("tag").required("target").rest("labels");
        let doc = parse(&env, &sig, &["TARGET Thing to tag", "LABEL... Labels"]);

        let labels = doc.positional_for("labels").unwrap();
        assert_eq!(labels.types, vec!["String[]"]);

        let sig = Signature::new("tag").rest("labels");
        let doc = parse(&env, &sig, &["Summary."]);
        assert!(doc.positionals.is_empty());
        assert!(env.documentation_issues().is_empty());
    }

    #[test]
    fn test_undocumented_keyword_options_keep_declaration_order() {
        let env = Rc::new(Environment::default());
        let sig = Signature::new("run")
            .keyword("alpha", "nil")
            .keyword("beta", "nil")
            .keyword_rest("rest");
        let doc = parse(
            &env,
            &sig,
            &["--extra VALUE Captured by rest", "--beta VALUE Beta", "--alpha VALUE Alpha"],
        );
        let order: Vec<&str> = doc.options.iter().map(|o| o.keyword.as_str()).collect();
        assert_eq!(order, vec!["alpha", "beta", "extra"]);
    }
}
