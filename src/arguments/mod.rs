//! Argument resolution: token stream, default conversion, typed conversion
//! and the parser that ties them to a callable's documentation.

pub mod converter;
pub mod parser;
pub mod stream;
pub mod types;

pub use converter::ValueConverter;
pub use parser::{looks_like_option, ArgumentParser};
pub use stream::TokenStream;
pub use types::{ConverterChain, TypeConverter};
