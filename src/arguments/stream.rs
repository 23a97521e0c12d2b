//! Cursor over command-line tokens.

/// Mutable read position over a borrowed token list
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    tokens: &'a [String],
    index: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn current(&self) -> Option<&'a str> {
        self.tokens.get(self.index).map(String::as_str)
    }

    /// Token `offset` positions ahead of the current one
    pub fn peek(&self, offset: usize) -> Option<&'a str> {
        self.tokens.get(self.index + offset).map(String::as_str)
    }

    pub fn advance(&mut self, count: usize) {
        self.index = (self.index + count).min(self.tokens.len());
    }

    pub fn consume(&mut self) -> Option<&'a str> {
        let value = self.current();
        self.advance(1);
        value
    }

    /// Everything from the current position on; the stream is finished afterwards
    pub fn consume_remaining(&mut self) -> &'a [String] {
        let remaining = &self.tokens[self.index..];
        self.index = self.tokens.len();
        remaining
    }

    pub fn finished(&self) -> bool {
        self.index >= self.tokens.len()
    }
}
