//! Documentation comments: extraction, parsing and reconciliation.

pub mod annotation;
pub mod extractor;
pub mod parser;
mod reconcile;

pub use extractor::CommentExtractor;
pub use parser::{DocLine, MetadataParser};
