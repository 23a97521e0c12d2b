//! Documentation parsing and reconciliation against script fixtures.

use std::path::PathBuf;
use std::rc::Rc;

use docargs::{
    Callable, DocFormat, DocumentationRegistry, Environment, IssueKind, ScriptMethod,
    ScriptScanner, Signature, Value, ValueMode,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/doc_examples.rb")
}

fn method(name: &str) -> ScriptMethod {
    ScriptScanner::new()
        .scan(fixture_path())
        .unwrap()
        .into_iter()
        .find(|m| m.name() == name)
        .unwrap_or_else(|| panic!("fixture method {} not found", name))
}

fn registry() -> (Rc<Environment>, DocumentationRegistry) {
    let env = Rc::new(Environment::default());
    (Rc::clone(&env), DocumentationRegistry::new(env))
}

fn issue_count(env: &Environment, kind: IssueKind) -> usize {
    env.documentation_issues()
        .iter()
        .filter(|issue| issue.kind == kind)
        .count()
}

// =============================================================================
// Tagged documentation
// =============================================================================

mod tagged_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_greet_documentation() {
        let (env, registry) = registry();
        let doc = registry.metadata_for(&method("greet"));

        assert_eq!(
            doc.summary.as_deref(),
            Some("Compose a friendly greeting. Supports both positional and keyword documentation using tags.")
        );

        assert_eq!(doc.positionals.len(), 1);
        assert_eq!(doc.positionals[0].label, "NAME");
        assert_eq!(doc.positionals[0].types, vec!["String"]);
        assert_eq!(doc.positionals[0].param_name.as_deref(), Some("name"));

        let greeting = doc.option_for("greeting").unwrap();
        assert_eq!(greeting.long, "--greeting");
        assert_eq!(greeting.short.as_deref(), Some("-g"));
        assert_eq!(greeting.value_name.as_deref(), Some("GREETING"));
        assert_eq!(greeting.value_mode, ValueMode::Required);
        assert_eq!(greeting.default_value.as_deref(), Some("'Hello'"));

        let shout = doc.option_for("shout").unwrap();
        assert_eq!(shout.value_mode, ValueMode::BooleanFlag);
        assert_eq!(shout.short.as_deref(), Some("-s"));

        let punctuation = doc.option_for("punctuation").unwrap();
        assert_eq!(punctuation.types, vec!["String", "nil"]);
        assert_eq!(punctuation.value_name.as_deref(), Some("PUNCT"));

        assert_eq!(doc.returns.len(), 1);
        assert_eq!(doc.returns[0].types, vec!["String"]);
        assert_eq!(doc.returns[0].description.as_deref(), Some("Finalised greeting"));

        assert!(env.documentation_issues().is_empty());
    }

    #[test]
    fn test_disallowed_param_comments_are_reported() {
        let (env, registry) = registry();
        env.set_allow_param_comments(false);
        registry.metadata_for(&method("process"));

        assert!(issue_count(&env, IssueKind::DisallowedAnnotationStyle) >= 1);
        let issue = &env.documentation_issues()[0];
        assert!(issue.message.contains("DOCARGS_ALLOW_PARAM_COMMENT=ON"));
        assert!(issue.location.as_deref().unwrap().ends_with(":22"));
    }
}

// =============================================================================
// Concise documentation
// =============================================================================

mod concise_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_documentation() {
        let (_, registry) = registry();
        let doc = registry.metadata_for(&method("describe"));

        let labels: Vec<&str> = doc.positionals.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["SUBJECT", "COUNT"]);
        assert_eq!(doc.positionals[1].types, vec!["Integer"]);
        assert_eq!(doc.positionals[1].default_value.as_deref(), Some("1"));
        assert_eq!(doc.positionals[1].doc_format, DocFormat::Concise);

        let style = doc.option_for("style").unwrap();
        assert_eq!(style.short.as_deref(), Some("-s"));
        assert_eq!(style.value_name.as_deref(), Some("STYLE"));
        assert_eq!(style.types, vec!["String"]);

        let tags = doc.option_for("tags").unwrap();
        assert_eq!(tags.types, vec!["Array<String>"]);
        assert!(tags.inline_type_annotation);
    }

    #[test]
    fn test_optional_value_option() {
        let (_, registry) = registry();
        let doc = registry.metadata_for(&method("toggle"));

        let limit = doc.option_for("limit").unwrap();
        assert_eq!(limit.value_mode, ValueMode::Optional);
        assert_eq!(limit.requires_value(), None);

        let enable = doc.option_for("enable").unwrap();
        assert!(enable.boolean_flag());
        assert_eq!(enable.requires_value(), Some(false));
    }

    #[test]
    fn test_literal_placeholder_round_trip() {
        let (_, registry) = registry();
        let sig = Signature::new("repeat")
            .required("count")
            .with_documentation(["COUNT [Integer] How many times"]);
        let doc = registry.metadata_for(&sig);

        let count = &doc.positionals[0];
        assert_eq!(count.label, "COUNT");
        assert_eq!(count.types, vec!["Integer"]);
        assert_eq!(count.description.as_deref(), Some("How many times"));
        assert!(count.allowed_values.is_empty());
    }

    #[test]
    fn test_choice_sets() {
        let (_, registry) = registry();
        let doc = registry.metadata_for(&method("report"));

        let allowed: Vec<Value> = doc.positionals[0]
            .allowed_values
            .iter()
            .map(|entry| entry.value.clone())
            .collect();
        assert_eq!(allowed, vec![Value::symbol("info"), Value::symbol("warn")]);

        let format = doc.option_for("format").unwrap();
        assert_eq!(format.allowed_values.len(), 2);
        assert_eq!(format.allowed_values[0].value, Value::str("text"));
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

mod reconcile_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fallback_definitions() {
        let (env, registry) = registry();
        let doc = registry.metadata_for(&method("fallback"));

        assert_eq!(
            doc.summary.as_deref(),
            Some("Deliberately underspecified to exercise fallbacks.")
        );
        assert_eq!(doc.positionals.len(), 2);
        assert!(doc
            .positionals
            .iter()
            .all(|p| p.doc_format == DocFormat::AutoGenerated));
        assert_eq!(doc.positionals[1].label, "ATTEMPTS");
        assert_eq!(doc.positionals[1].default_value.as_deref(), Some("3"));

        let safe_mode = doc.option_for("safe_mode").unwrap();
        assert_eq!(safe_mode.long, "--safe-mode");
        assert!(safe_mode.boolean_flag());
        assert_eq!(safe_mode.value_name, None);

        let tag = doc.option_for("tag").unwrap();
        assert_eq!(tag.value_mode, ValueMode::Required);
        assert_eq!(tag.doc_format, DocFormat::AutoGenerated);

        assert_eq!(issue_count(&env, IssueKind::DocumentationGap), 4);
    }

    #[test]
    fn test_partial_documentation_gaps() {
        let (env, registry) = registry();
        let sig = Signature::new("pair")
            .required("left")
            .required("right")
            .keyword("mode", "nil")
            .with_documentation(["LEFT [String] Left side"]);
        let doc = registry.metadata_for(&sig);

        assert_eq!(doc.positionals[0].doc_format, DocFormat::Concise);
        assert_eq!(doc.positionals[1].doc_format, DocFormat::AutoGenerated);
        assert_eq!(doc.option_for("mode").unwrap().doc_format, DocFormat::AutoGenerated);
        assert_eq!(issue_count(&env, IssueKind::DocumentationGap), 2);
    }

    #[test]
    fn test_doc_check_mode_skips_fallbacks() {
        let (env, registry) = registry();
        env.enable_doc_check();
        let doc = registry.metadata_for(&method("fallback"));

        assert!(doc.positionals.is_empty());
        assert!(doc.options.is_empty());
        assert_eq!(issue_count(&env, IssueKind::DocumentationGap), 4);
    }

    #[test]
    fn test_extra_positional_documentation() {
        let (env, registry) = registry();
        let doc = registry.metadata_for(&method("copy"));

        assert_eq!(doc.positionals.len(), 2);
        assert_eq!(issue_count(&env, IssueKind::ExtraDocumentation), 1);
        assert!(doc
            .detail_lines
            .iter()
            .any(|line| line == "MODE [Symbol] Copy mode"));
    }

    #[test]
    fn test_unknown_type_suggestion() {
        let (env, registry) = registry();
        let sig = Signature::new("greet")
            .required("name")
            .with_documentation(["NAME [Strng] Who"]);
        registry.metadata_for(&sig);

        let issues = env.documentation_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnknownType);
        assert!(issues[0].message.contains("did you mean 'String'"));
    }
}

// =============================================================================
// Caching
// =============================================================================

mod cache_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repeated_lookups_match() {
        let (env, registry) = registry();
        let greet = method("greet");
        let first = registry.metadata_for(&greet);
        let second = registry.metadata_for(&greet);
        assert_eq!(first, second);

        env.enable_doc_check();
        let checked = registry.metadata_for(&greet);
        assert_eq!(first, checked);
    }
}
