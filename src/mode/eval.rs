//! Expression (`--eval-args`) argument coercion.
//!
//! A deliberately small literal language:
//!
//! ```text
//! expr    := sum
//! sum     := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := '-' unary | primary
//! primary := INT | FLOAT | STRING | SYMBOL | true | false | nil
//!          | '[' (expr (',' expr)* ','?)? ']'
//!          | '{' (entry (',' entry)* ','?)? '}'
//!          | '(' expr ')'
//! entry   := LABEL expr | expr '=>' expr
//! ```
//!
//! `LABEL` is `name:` or `"name":` and produces a symbol key.

use crate::error::{DocargsError, Result};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Label(String),
    Ident(String),
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Arrow,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

type EvalResult<T> = std::result::Result<T, String>;

/// Nesting limit for brackets, braces, parentheses and unary minus
const MAX_DEPTH: usize = 128;

// ============================================================================
// Lexer
// ============================================================================

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// `:` directly after a key, and not the start of `::`
    fn at_label_colon(&self) -> bool {
        self.peek() == Some(':') && self.peek_at(1) != Some(':')
    }

    fn tokenize(mut self) -> EvalResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }

            let token = match c {
                '0'..='9' => self.number()?,
                '"' | '\'' => {
                    let text = self.string()?;
                    if self.at_label_colon() {
                        self.pos += 1;
                        Token::Label(text)
                    } else {
                        Token::Str(text)
                    }
                }
                ':' => {
                    self.pos += 1;
                    match self.peek() {
                        Some('"' | '\'') => Token::Symbol(self.string()?),
                        Some(next) if is_ident_start(next) => Token::Symbol(self.identifier()),
                        _ => return Err(format!("unexpected ':' at offset {}", self.pos - 1)),
                    }
                }
                c if is_ident_start(c) => {
                    let name = self.identifier();
                    if self.at_label_colon() {
                        self.pos += 1;
                        Token::Label(name)
                    } else {
                        Token::Ident(name)
                    }
                }
                '=' if self.peek_at(1) == Some('>') => {
                    self.pos += 2;
                    Token::Arrow
                }
                _ => {
                    self.pos += 1;
                    match c {
                        '[' => Token::LBracket,
                        ']' => Token::RBracket,
                        '{' => Token::LBrace,
                        '}' => Token::RBrace,
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        ',' => Token::Comma,
                        '+' => Token::Plus,
                        '-' => Token::Minus,
                        '*' => Token::Star,
                        '/' => Token::Slash,
                        '%' => Token::Percent,
                        other => return Err(format!("unexpected character '{}'", other)),
                    }
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn number(&mut self) -> EvalResult<Token> {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c != '_' {
                break;
            }
            self.pos += 1;
        }

        let fractional = self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
        if !fractional {
            return digits
                .parse()
                .map(Token::Int)
                .map_err(|e| format!("invalid integer '{}': {}", digits, e));
        }

        self.pos += 1;
        digits.push('.');
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c != '_' {
                break;
            }
            self.pos += 1;
        }
        digits
            .parse()
            .map(Token::Float)
            .map_err(|e| format!("invalid float '{}': {}", digits, e))
    }

    fn string(&mut self) -> EvalResult<String> {
        let quote = self.bump().unwrap_or('"');
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string literal".to_string()),
                Some(c) if c == quote => return Ok(text),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| "unterminated string literal".to_string())?;
                    match (quote, escaped) {
                        ('"', 'n') => text.push('\n'),
                        ('"', 't') => text.push('\t'),
                        ('"', 'r') => text.push('\r'),
                        ('"', '0') => text.push('\0'),
                        (_, '\\') => text.push('\\'),
                        (q, e) if q == e => text.push(e),
                        ('"', other) => text.push(other),
                        (_, other) => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if let Some(suffix @ ('?' | '!')) = self.peek() {
            name.push(suffix);
            self.pos += 1;
        }
        name
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

// ============================================================================
// Parser / evaluator
// ============================================================================

struct Evaluator {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Evaluator {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, context: &str) -> EvalResult<()> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(format!("expected {} but found {}", context, describe(self.peek())))
        }
    }

    fn parse_expr(&mut self) -> EvalResult<Value> {
        self.parse_sum()
    }

    fn parse_sum(&mut self) -> EvalResult<Value> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => '+',
                Some(Token::Minus) => '-',
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = apply_binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> EvalResult<Value> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => '*',
                Some(Token::Slash) => '/',
                Some(Token::Percent) => '%',
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = apply_binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> EvalResult<Value> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(format!("expression nested deeper than {} levels", MAX_DEPTH));
        }
        let value = self.parse_negation();
        self.depth -= 1;
        value
    }

    fn parse_negation(&mut self) -> EvalResult<Value> {
        if self.match_token(&Token::Minus) {
            return match self.parse_unary()? {
                Value::Integer(i) => i
                    .checked_neg()
                    .map(Value::Integer)
                    .ok_or_else(|| "integer overflow".to_string()),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(format!("undefined unary '-' for {}", other.kind_name())),
            };
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> EvalResult<Value> {
        match self.advance() {
            Some(Token::Int(i)) => Ok(Value::Integer(i)),
            Some(Token::Float(f)) => Ok(Value::Float(f)),
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::Symbol(s)) => Ok(Value::Symbol(s)),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "nil" => Ok(Value::Nil),
                _ => Err(format!("undefined name '{}'", name)),
            },
            Some(Token::LParen) => {
                let value = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(value)
            }
            Some(Token::LBracket) => self.parse_array(),
            Some(Token::LBrace) => self.parse_hash(),
            other => Err(format!("unexpected {}", describe(other.as_ref()))),
        }
    }

    fn parse_array(&mut self) -> EvalResult<Value> {
        let mut items = Vec::new();
        while !self.match_token(&Token::RBracket) {
            items.push(self.parse_expr()?);
            if !self.match_token(&Token::Comma) {
                self.expect(&Token::RBracket, "',' or ']'")?;
                break;
            }
        }
        Ok(Value::List(items))
    }

    fn parse_hash(&mut self) -> EvalResult<Value> {
        let mut pairs = Vec::new();
        while !self.match_token(&Token::RBrace) {
            let key = match self.peek().cloned() {
                Some(Token::Label(name)) => {
                    self.pos += 1;
                    Value::Symbol(name)
                }
                _ => {
                    let key = self.parse_expr()?;
                    self.expect(&Token::Arrow, "'=>'")?;
                    key
                }
            };
            let value = self.parse_expr()?;
            pairs.push((key, value));
            if !self.match_token(&Token::Comma) {
                self.expect(&Token::RBrace, "',' or '}'")?;
                break;
            }
        }
        Ok(Value::Map(pairs))
    }
}

fn describe(token: Option<&Token>) -> String {
    match token {
        None => "end of input".to_string(),
        Some(Token::Label(name)) => format!("label '{}:'", name),
        Some(Token::Ident(name)) => format!("'{}'", name),
        Some(other) => format!("{:?}", other),
    }
}

fn apply_binary(op: char, left: Value, right: Value) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_op(op, a, b).map(Value::Integer),
        (Value::Integer(a), Value::Float(b)) => float_op(op, a as f64, b),
        (Value::Float(a), Value::Integer(b)) => float_op(op, a, b as f64),
        (Value::Float(a), Value::Float(b)) => float_op(op, a, b),
        (Value::Str(a), Value::Str(b)) if op == '+' => Ok(Value::Str(a + &b)),
        (Value::List(mut a), Value::List(b)) if op == '+' => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (left, right) => Err(format!(
            "undefined operator '{}' for {} and {}",
            op,
            left.kind_name(),
            right.kind_name()
        )),
    }
}

// Division and remainder round toward negative infinity
fn integer_op(op: char, a: i64, b: i64) -> EvalResult<i64> {
    let overflow = || "integer overflow".to_string();
    match op {
        '+' => a.checked_add(b).ok_or_else(overflow),
        '-' => a.checked_sub(b).ok_or_else(overflow),
        '*' => a.checked_mul(b).ok_or_else(overflow),
        '/' | '%' if b == 0 => Err("divided by 0".to_string()),
        '/' => {
            let quotient = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                Ok(quotient - 1)
            } else {
                Ok(quotient)
            }
        }
        '%' => {
            let remainder = a.checked_rem(b).ok_or_else(overflow)?;
            if remainder != 0 && ((remainder < 0) != (b < 0)) {
                Ok(remainder + b)
            } else {
                Ok(remainder)
            }
        }
        _ => Err(format!("unknown operator '{}'", op)),
    }
}

fn float_op(op: char, a: f64, b: f64) -> EvalResult<Value> {
    let result = match op {
        '+' => a + b,
        '-' => a - b,
        '*' => a * b,
        '/' => a / b,
        '%' => a - b * (a / b).floor(),
        _ => return Err(format!("unknown operator '{}'", op)),
    };
    Ok(Value::Float(result))
}

/// Evaluate a single expression
pub fn evaluate(source: &str) -> EvalResult<Value> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut evaluator = Evaluator {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = evaluator.parse_expr()?;
    match evaluator.peek() {
        None => Ok(value),
        Some(token) => Err(format!("unexpected {} after expression", describe(Some(token)))),
    }
}

/// Evaluate every string, recursing into lists and map values.
///
/// With `lax`, a string that fails to evaluate is kept as-is and a warning is logged.
pub fn coerce_eval_value(value: Value, lax: bool) -> Result<Value> {
    match value {
        Value::Str(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Value::str(trimmed));
            }
            match evaluate(trimmed) {
                Ok(evaluated) => Ok(evaluated),
                Err(reason) if lax => {
                    tracing::warn!(
                        "Failed to evaluate argument as an expression ({}); passing it through as a string",
                        reason
                    );
                    Ok(Value::Str(text))
                }
                Err(reason) => Err(DocargsError::ModeCoercion(format!(
                    "Failed to evaluate expression: {}",
                    reason
                ))),
            }
        }
        Value::List(items) => items
            .into_iter()
            .map(|item| coerce_eval_value(item, lax))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Value::Map(pairs) => pairs
            .into_iter()
            .map(|(key, item)| coerce_eval_value(item, lax).map(|item| (key, item)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Map),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(evaluate("1_000").unwrap(), Value::Integer(1000));
        assert_eq!(evaluate("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(evaluate(r#""a\tb""#).unwrap(), Value::str("a\tb"));
        assert_eq!(evaluate(r"'it\'s'").unwrap(), Value::str("it's"));
        assert_eq!(evaluate(":ready").unwrap(), Value::symbol("ready"));
        assert_eq!(evaluate(r#":"two words""#).unwrap(), Value::symbol("two words"));
        assert_eq!(evaluate("nil").unwrap(), Value::Nil);
        assert_eq!(evaluate("false").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_collections() {
        assert_eq!(
            evaluate("[1, :a, 'b',]").unwrap(),
            Value::List(vec![Value::Integer(1), Value::symbol("a"), Value::str("b")])
        );
        assert_eq!(
            evaluate(r#"{name: "x", "k": 1, 2 => [true]}"#).unwrap(),
            Value::Map(vec![
                (Value::symbol("name"), Value::str("x")),
                (Value::symbol("k"), Value::Integer(1)),
                (Value::Integer(2), Value::List(vec![Value::Bool(true)])),
            ])
        );
        assert_eq!(evaluate("{}").unwrap(), Value::Map(vec![]));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(evaluate("1 + 2 * 3").unwrap(), Value::Integer(7));
        assert_eq!(evaluate("(1 + 2) * 3").unwrap(), Value::Integer(9));
        assert_eq!(evaluate("-7 / 2").unwrap(), Value::Integer(-4));
        assert_eq!(evaluate("-7 % 3").unwrap(), Value::Integer(2));
        assert_eq!(evaluate("1 + 0.5").unwrap(), Value::Float(1.5));
        assert_eq!(evaluate("'a' + 'b'").unwrap(), Value::str("ab"));
        assert_eq!(
            evaluate("[1] + [2]").unwrap(),
            Value::List(vec![Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn test_errors() {
        assert!(evaluate("1 / 0").unwrap_err().contains("divided by 0"));
        assert!(evaluate("system").unwrap_err().contains("undefined name"));
        assert!(evaluate("'a' - 'b'").unwrap_err().contains("undefined operator"));
        assert!(evaluate("[1, 2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("`ls`").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let err = evaluate(&"[".repeat(200_000)).unwrap_err();
        assert!(err.contains("nested deeper than 128"), "{}", err);
        assert!(evaluate(&"-".repeat(10_000)).unwrap_err().contains("nested deeper"));

        let nested = format!("{}1{}", "[".repeat(100), "]".repeat(100));
        assert!(evaluate(&nested).is_ok());

        let err = coerce_eval_value(Value::str("(".repeat(5_000)), false).unwrap_err();
        assert!(err.to_string().starts_with("Failed to evaluate expression"));
    }

    #[test]
    fn test_coerce_strict_and_lax() {
        let err = coerce_eval_value(Value::str("foo bar"), false).unwrap_err();
        assert!(err.to_string().starts_with("Failed to evaluate expression:"));

        assert_eq!(
            coerce_eval_value(Value::str("foo bar"), true).unwrap(),
            Value::str("foo bar")
        );
        assert_eq!(
            coerce_eval_value(Value::List(vec![Value::str("1 + 1"), Value::Bool(true)]), false)
                .unwrap(),
            Value::List(vec![Value::Integer(2), Value::Bool(true)])
        );
        assert_eq!(coerce_eval_value(Value::str("  "), false).unwrap(), Value::str(""));
    }
}
