//! Argument parsing, conversion, modes and validation against script fixtures.

use std::path::PathBuf;
use std::rc::Rc;

use docargs::commands::parse::{resolve, ParseOptions};
use docargs::{
    ArgumentModeController, ArgumentParser, Callable, Config, DocargsError,
    DocumentationRegistry, Environment, ParsedArguments, ScriptMethod, ScriptScanner, Value,
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

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn parser_with(env: Rc<Environment>) -> ArgumentParser {
    ArgumentParser::new(Rc::new(DocumentationRegistry::new(env)))
}

fn parse(name: &str, items: &[&str]) -> ParsedArguments {
    let parser = parser_with(Rc::new(Environment::default()));
    parser
        .parse(&tokens(items), Some(&method(name) as &dyn Callable))
        .unwrap()
}

fn options(name: &str, items: &[&str]) -> ParseOptions {
    ParseOptions {
        file: fixture_path(),
        method: name.to_string(),
        tokens: tokens(items),
        json_args: false,
        eval_args: false,
        eval_lax: false,
        strict: false,
        config: Config::default(),
    }
}

// =============================================================================
// Default parsing
// =============================================================================

mod parsing_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tagged_options() {
        let parsed = parse(
            "greet",
            &["Alice", "--greeting", "Hi", "-s", "--punctuation", "!"],
        );
        assert_eq!(parsed.positional, vec![Value::str("Alice")]);
        assert_eq!(parsed.keywords["greeting"], Value::str("Hi"));
        assert_eq!(parsed.keywords["shout"], Value::Bool(true));
        assert_eq!(parsed.keywords["punctuation"], Value::str("!"));
    }

    #[test]
    fn test_concise_options_and_list_type() {
        let parsed = parse(
            "describe",
            &["subject", "2", "-s", "dramatic", "--tags", "alpha,beta"],
        );
        assert_eq!(
            parsed.positional,
            vec![Value::str("subject"), Value::Integer(2)]
        );
        assert_eq!(parsed.keywords["style"], Value::str("dramatic"));
        assert_eq!(
            parsed.keywords["tags"],
            Value::List(vec![Value::str("alpha"), Value::str("beta")])
        );

        let parsed = parse("describe", &["subject", "--tags", r#"["x","y"]"#]);
        assert_eq!(
            parsed.keywords["tags"],
            Value::List(vec![Value::str("x"), Value::str("y")])
        );
    }

    #[test]
    fn test_boolean_and_optional_value_options() {
        let parsed = parse("toggle", &["runner", "--enable", "--limit"]);
        assert_eq!(parsed.keywords["enable"], Value::Bool(true));
        assert_eq!(parsed.keywords["limit"], Value::Bool(true));

        let parsed = parse("toggle", &["runner", "--limit", "5"]);
        assert_eq!(parsed.keywords["limit"], Value::Integer(5));

        let parsed = parse("toggle", &["runner", "--enable", "false"]);
        assert_eq!(parsed.keywords["enable"], Value::Bool(false));
        assert_eq!(parsed.positional, vec![Value::str("runner")]);

        let parsed = parse("toggle", &["--enable", "runner"]);
        assert_eq!(parsed.keywords["enable"], Value::Bool(true));
        assert_eq!(parsed.positional, vec![Value::str("runner")]);
    }

    #[test]
    fn test_structured_positional() {
        let parsed = parse("process", &[r#"{"feature":true}"#, "-v"]);
        assert_eq!(
            parsed.positional,
            vec![Value::Map(vec![(Value::str("feature"), Value::Bool(true))])]
        );
        assert_eq!(parsed.keywords["verbose"], Value::Bool(true));
    }

    #[test]
    fn test_missing_required_value() {
        let parser = parser_with(Rc::new(Environment::default()));
        let greet = method("greet");
        let err = parser
            .parse(&tokens(&["Alice", "--greeting"]), Some(&greet as &dyn Callable))
            .unwrap_err();
        assert!(matches!(err, DocargsError::OptionValueMissing { .. }));
    }

    #[test]
    fn test_positional_conversion_failure() {
        let parser = parser_with(Rc::new(Environment::default()));
        let describe = method("describe");
        let err = parser
            .parse(&tokens(&["subject", "many"]), Some(&describe as &dyn Callable))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value 'many' for argument 'COUNT' is invalid: invalid value for Integer(): \"many\""
        );
    }

    #[test]
    fn test_default_conversion_without_callable() {
        let parser = parser_with(Rc::new(Environment::default()));
        let parsed = parser
            .parse(
                &tokens(&["true", "FALSE", "42", "3.5", "null", "1,2,3", r#"["a","b"]"#]),
                None,
            )
            .unwrap();
        assert_eq!(
            parsed.positional,
            vec![
                Value::Bool(true),
                Value::Bool(false),
                Value::Integer(42),
                Value::Float(3.5),
                Value::Nil,
                Value::str("1,2,3"),
                Value::List(vec![Value::str("a"), Value::str("b")]),
            ]
        );
    }
}

// =============================================================================
// Validation
// =============================================================================

mod validation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_choice_validation_policy() {
        let env = Rc::new(Environment::default());
        let parser = parser_with(Rc::clone(&env));
        let report = method("report");

        let accepted = parser
            .parse(&tokens(&[":info"]), Some(&report as &dyn Callable))
            .unwrap();
        assert!(parser.validate_inputs(&report, &accepted).is_ok());

        let rejected = parser
            .parse(&tokens(&[":error"]), Some(&report as &dyn Callable))
            .unwrap();
        assert_eq!(rejected.positional, vec![Value::symbol("error")]);
        assert!(parser.validate_inputs(&report, &rejected).is_ok());

        env.enable_strict_input();
        let err = parser.validate_inputs(&report, &rejected).unwrap_err();
        assert!(matches!(err, DocargsError::InputViolation(_)));
        assert_eq!(rejected.positional, vec![Value::symbol("error")]);

        let bare = parser
            .parse(&tokens(&["error"]), Some(&report as &dyn Callable))
            .unwrap();
        assert!(parser.validate_inputs(&report, &bare).is_err());
    }

    #[test]
    fn test_string_choice_normalized() {
        let parsed = parse("report", &["warn", "--format", "json"]);
        assert_eq!(parsed.positional, vec![Value::symbol("warn")]);
        assert_eq!(parsed.keywords["format"], Value::str("json"));
    }
}

// =============================================================================
// Argument modes
// =============================================================================

mod mode_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_mode_pipeline() {
        let mut opts = options("toggle", &[r#""runner""#, "--enable", "--limit", "7"]);
        opts.json_args = true;
        let parsed = resolve(&opts).unwrap();

        assert_eq!(parsed.positional, vec![Value::str("runner")]);
        assert_eq!(parsed.keywords["enable"], Value::Bool(true));
        assert_eq!(parsed.keywords["limit"], Value::Integer(7));
        assert!(!ArgumentModeController::new().json_mode());
    }

    #[test]
    fn test_json_mode_rejects_invalid_json() {
        let mut opts = options("toggle", &["runner"]);
        opts.json_args = true;
        let err = resolve(&opts).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse as JSON"), "{}", err);
    }

    #[test]
    fn test_eval_mode_pipeline() {
        let mut opts = options("toggle", &[r#""runner""#, "--limit", "2 + 3"]);
        opts.eval_args = true;
        let parsed = resolve(&opts).unwrap();
        assert_eq!(parsed.positional, vec![Value::str("runner")]);
        assert_eq!(parsed.keywords["limit"], Value::Integer(5));

        let mut opts = options("toggle", &["runner"]);
        opts.eval_args = true;
        let err = resolve(&opts).unwrap_err();
        assert!(err.to_string().starts_with("Failed to evaluate expression"), "{}", err);

        opts.eval_lax = true;
        let parsed = resolve(&opts).unwrap();
        assert_eq!(parsed.positional, vec![Value::str("runner")]);
        assert!(!ArgumentModeController::new().eval_mode());
    }

    #[test]
    fn test_conflicting_modes() {
        let mut opts = options("toggle", &["runner"]);
        opts.json_args = true;
        opts.eval_lax = true;
        assert!(matches!(resolve(&opts), Err(DocargsError::ModeConflict)));
    }

    #[test]
    fn test_strict_flag_and_method_aliases() {
        let mut opts = options("report", &["error"]);
        opts.strict = true;
        assert!(matches!(resolve(&opts), Err(DocargsError::InputViolation(_))));

        let missing = options("no-such-method", &[]);
        assert!(matches!(resolve(&missing), Err(DocargsError::CommandNotFound(_))));
    }
}
