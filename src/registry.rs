//! Documentation lookup with per-declaration caching.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::docs::{CommentExtractor, MetadataParser};
use crate::environment::Environment;
use crate::reflect::Callable;
use crate::types::MethodDocumentation;

/// Cache key: declaration site plus the flags that change parse results
type CacheKey = (PathBuf, usize, bool, bool);

/// Resolves the reconciled documentation for a callable.
///
/// Results for file-backed callables are cached per declaration site and per
/// (doc-check, `@param` allowed) flag combination, so toggling either flag
/// yields a fresh parse. Callers always receive an independent copy.
#[derive(Debug)]
pub struct DocumentationRegistry {
    environment: Rc<Environment>,
    extractor: CommentExtractor,
    parser: MetadataParser,
    cache: RefCell<HashMap<CacheKey, MethodDocumentation>>,
}

impl DocumentationRegistry {
    pub fn new(environment: Rc<Environment>) -> Self {
        Self {
            extractor: CommentExtractor::new(environment.comment_marker()),
            parser: MetadataParser::new(Rc::clone(&environment)),
            environment,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn environment(&self) -> &Rc<Environment> {
        &self.environment
    }

    /// Documentation for `callable`.
    ///
    /// Inline documentation is parsed on every call. A callable with neither a
    /// source location nor inline documentation has no documentation at all.
    pub fn metadata_for(&self, callable: &dyn Callable) -> MethodDocumentation {
        if let Some(lines) = callable.inline_documentation() {
            return self.parser.parse(lines, callable);
        }

        let Some(location) = callable.source_location() else {
            return MethodDocumentation::default();
        };

        let key: CacheKey = (
            location.file.clone(),
            location.line,
            self.environment.doc_check_mode(),
            self.environment.allow_param_comments(),
        );
        if let Some(cached) = self.cache.borrow().get(&key) {
            tracing::trace!("documentation cache hit for {}", callable.name());
            return cached.clone();
        }

        let comment_lines = self.extractor.extract(&location.file, location.line);
        let metadata = self.parser.parse(&comment_lines, callable);
        self.cache.borrow_mut().insert(key, metadata.clone());
        metadata
    }

    /// Drop cached documentation and cached file contents
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
        self.extractor.reset();
    }
}
