#![forbid(unsafe_code)]

//! # docargs
//!
//! Documentation-driven command-line arguments.
//!
//! A method's comment block is the single source of truth for its command-line
//! surface: the comments are parsed into option and positional definitions,
//! reconciled against the method's declared parameters, and used to turn raw
//! tokens into typed values.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use docargs::{ArgumentParser, DocumentationRegistry, Environment, Signature, Value};
//!
//! let sig = Signature::new("greet")
//!     .required("name")
//!     .keyword("shout", "false")
//!     .with_documentation(["NAME [String] Who to greet", "--shout Uppercase output"]);
//!
//! let registry = Rc::new(DocumentationRegistry::new(Rc::new(Environment::default())));
//! let parser = ArgumentParser::new(registry);
//! let tokens = vec!["Ada".to_string(), "--shout".to_string()];
//! let parsed = parser.parse(&tokens, Some(&sig)).unwrap();
//!
//! assert_eq!(parsed.positional, vec![Value::str("Ada")]);
//! assert_eq!(parsed.keywords["shout"], Value::Bool(true));
//! ```

pub mod arguments;
pub mod commands;
pub mod config;
pub mod docs;
pub mod environment;
pub mod error;
pub mod help;
pub mod mode;
pub mod reflect;
pub mod registry;
pub mod types;
pub mod value;

// Re-exports
pub use arguments::{ArgumentParser, ConverterChain, TokenStream, TypeConverter, ValueConverter};
pub use config::Config;
pub use docs::{CommentExtractor, MetadataParser};
pub use environment::{DocumentationIssue, Environment, IssueKind};
pub use error::{DocargsError, Result};
pub use help::HelpRenderer;
pub use mode::ArgumentModeController;
pub use reflect::{Callable, ParamKind, Parameter, ScriptMethod, ScriptScanner, Signature, SourceLocation};
pub use registry::DocumentationRegistry;
pub use types::{
    AllowedValue, DocFormat, MethodDocumentation, OptionDefinition, PositionalDefinition,
    ReturnDefinition, ValueMode,
};
pub use value::{KeywordArgs, ParsedArguments, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
