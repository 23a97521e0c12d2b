//! Comment block extraction.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Reads the contiguous comment block directly above a declaration.
///
/// Files are read once and cached until [`CommentExtractor::reset`].
#[derive(Debug)]
pub struct CommentExtractor {
    marker: String,
    file_cache: RefCell<HashMap<PathBuf, Rc<Vec<String>>>>,
}

impl Default for CommentExtractor {
    fn default() -> Self {
        Self::new("#")
    }
}

impl CommentExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            file_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Comment bodies above 1-based `line`, top to bottom, marker stripped.
    /// An unreadable file yields no documentation.
    pub fn extract(&self, file: &Path, line: usize) -> Vec<String> {
        let Some(lines) = self.cached_lines_for(file) else {
            return Vec::new();
        };

        let mut block = Vec::new();
        let mut index = line.checked_sub(2);
        while let Some(i) = index {
            match lines.get(i) {
                Some(text) if self.is_comment_line(text) => block.push(self.strip_marker(text)),
                _ => break,
            }
            index = i.checked_sub(1);
        }

        block.reverse();
        block
    }

    pub fn reset(&self) {
        self.file_cache.borrow_mut().clear();
    }

    fn cached_lines_for(&self, file: &Path) -> Option<Rc<Vec<String>>> {
        if let Some(lines) = self.file_cache.borrow().get(file) {
            return Some(Rc::clone(lines));
        }

        let content = match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!("no documentation source {}: {}", file.display(), err);
                return None;
            }
        };
        let lines = Rc::new(content.lines().map(str::to_string).collect::<Vec<_>>());
        self.file_cache
            .borrow_mut()
            .insert(file.to_path_buf(), Rc::clone(&lines));
        Some(lines)
    }

    fn is_comment_line(&self, line: &str) -> bool {
        line.trim_start().starts_with(self.marker.as_str())
    }

    fn strip_marker(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        trimmed
            .strip_prefix(self.marker.as_str())
            .unwrap_or(trimmed)
            .trim_start()
            .to_string()
    }
}
