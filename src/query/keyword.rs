//! Keyword expression grammar
//!
//! The grid hands keywords to the backend untouched, but local data sources and
//! the CLI need to understand them. The grammar is the backend's search syntax:
//!
//! ```text
//! expr    := and ( "||" and )*
//! and     := primary ( "&&" primary )*
//! primary := "(" expr ")" | term
//! term    := field ( "==" | "!=" | "=" ) value
//! value   := '"' ( escaped char )* '"' | bare word
//! ```
//!
//! - `field=value`: case-insensitive pattern match (regex, literal if invalid)
//! - `field==value`: exact match
//! - `field!=value`: no value matches; `field!=""` means "field is not empty"
//!
//! A value that compiles neither as a pattern nor as a literal is a parse
//! error. Nesting and operator chains are limited to [`MAX_DEPTH`] levels.
//!
//! ```
//! use assetgrid::query::KeywordExpr;
//!
//! let expr = KeywordExpr::parse(r#"title="admin" && (statuscode==200 || statuscode==302)"#)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(expr.fields(), vec!["title", "statuscode"]);
//! ```

use super::error::KeywordError;
use crate::Row;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Deepest expression tree and parenthesis nesting `parse` accepts
pub const MAX_DEPTH: usize = 256;

/// Compiled size limit of a term's pattern, the `regex` default
const PATTERN_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Comparison operator of a term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`
    Contains,
    /// `==`
    Exact,
    /// `!=`
    NotContains,
}

impl Comparison {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Contains => "=",
            Self::Exact => "==",
            Self::NotContains => "!=",
        }
    }
}

/// A single `field<op>value` comparison
#[derive(Debug, Clone)]
pub struct Term {
    pub field: String,
    pub op: Comparison,
    pub value: String,
    pattern: Regex,
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.op == other.op && self.value == other.value
    }
}

impl Term {
    /// Build a term, compiling its matcher
    ///
    /// # Errors
    ///
    /// Returns `KeywordError::InvalidPattern` if the value cannot be compiled,
    /// not even as a literal.
    pub fn new(field: impl Into<String>, op: Comparison, value: impl Into<String>) -> Result<Self, KeywordError> {
        Self::with_size_limit(field, op, value, PATTERN_SIZE_LIMIT)
    }

    fn with_size_limit(
        field: impl Into<String>,
        op: Comparison,
        value: impl Into<String>,
        size_limit: usize,
    ) -> Result<Self, KeywordError> {
        let field = field.into();
        let value = value.into();
        let pattern = compile_pattern(op, &value, size_limit).map_err(|e| KeywordError::InvalidPattern {
            field: field.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            field,
            op,
            value,
            pattern,
        })
    }

    fn matches(&self, row: &Row) -> bool {
        let candidates = row.text_values(&self.field);
        let hit = |c: &String| self.pattern.is_match(c);
        match self.op {
            Comparison::NotContains if self.value.is_empty() => {
                candidates.iter().any(|c| !c.is_empty())
            }
            Comparison::NotContains => !candidates.iter().any(hit),
            Comparison::Contains | Comparison::Exact => candidates.iter().any(hit),
        }
    }
}

fn compile_pattern(op: Comparison, value: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    let build = |source: &str, case_insensitive: bool| {
        RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .size_limit(size_limit)
            .build()
    };

    let literal = regex::escape(value);
    match op {
        Comparison::Exact => build(&format!("^{literal}$"), false),
        Comparison::Contains | Comparison::NotContains => build(value, true).or_else(|_| build(&literal, true)),
    }
}

/// Parsed keyword expression
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordExpr {
    Term(Term),
    And(Box<KeywordExpr>, Box<KeywordExpr>),
    Or(Box<KeywordExpr>, Box<KeywordExpr>),
}

impl KeywordExpr {
    /// Parse an expression; blank input yields `None` (matches everything)
    ///
    /// # Errors
    ///
    /// Returns `KeywordError` describing the first syntax problem found.
    pub fn parse(input: &str) -> Result<Option<Self>, KeywordError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Ok(None);
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            end: input.len(),
            nesting: 0,
        };
        let (expr, _) = parser.parse_or()?;

        match parser.tokens.get(parser.pos) {
            None => Ok(Some(expr)),
            Some(Spanned {
                token: Token::Close,
                pos,
            }) => Err(KeywordError::UnbalancedParen(*pos)),
            Some(spanned) => Err(KeywordError::MissingCombinator(spanned.pos)),
        }
    }

    /// Check a row against the expression
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::Term(term) => term.matches(row),
            Self::And(left, right) => left.matches(row) && right.matches(row),
            Self::Or(left, right) => left.matches(row) || right.matches(row),
        }
    }

    /// Field names referenced by the expression, in first-use order
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Term(term) => {
                if !out.contains(&term.field.as_str()) {
                    out.push(&term.field);
                }
            }
            Self::And(left, right) | Self::Or(left, right) => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
        }
    }
}

impl fmt::Display for KeywordExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(term) => {
                let escaped = term.value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "{}{}\"{}\"", term.field, term.op.symbol(), escaped)
            }
            Self::And(left, right) => {
                for (i, side) in [left, right].into_iter().enumerate() {
                    if i > 0 {
                        write!(f, " && ")?;
                    }
                    if matches!(side.as_ref(), Self::Or(..)) {
                        write!(f, "({side})")?;
                    } else {
                        write!(f, "{side}")?;
                    }
                }
                Ok(())
            }
            Self::Or(left, right) => write!(f, "{left} || {right}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Term(Term),
    And,
    Or,
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    pos: usize,
}

fn is_boundary(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'(' | b')' => true,
        b'&' => bytes.get(i + 1) == Some(&b'&'),
        b'|' => bytes.get(i + 1) == Some(&b'|'),
        c => c.is_ascii_whitespace(),
    }
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, KeywordError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let token = match bytes[i] {
            c if c.is_ascii_whitespace() => {
                i += 1;
                continue;
            }
            b'(' => Token::Open,
            b')' => Token::Close,
            b'&' if bytes.get(i + 1) == Some(&b'&') => Token::And,
            b'|' if bytes.get(i + 1) == Some(&b'|') => Token::Or,
            _ => {
                let (term, next) = lex_term(input, i)?;
                tokens.push(Spanned {
                    token: Token::Term(term),
                    pos: i,
                });
                i = next;
                continue;
            }
        };

        let width = if matches!(token, Token::And | Token::Or) { 2 } else { 1 };
        tokens.push(Spanned { token, pos: i });
        i += width;
    }

    Ok(tokens)
}

fn lex_term(input: &str, start: usize) -> Result<(Term, usize), KeywordError> {
    let bytes = input.as_bytes();
    let mut i = start;
    while i < bytes.len() && !is_boundary(bytes, i) && bytes[i] != b'=' && bytes[i] != b'!' {
        i += 1;
    }
    let field = input[start..i].trim();
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let rest = &input[i..];
    let (op, width) = if rest.starts_with("==") {
        (Comparison::Exact, 2)
    } else if rest.starts_with("!=") {
        (Comparison::NotContains, 2)
    } else if rest.starts_with('=') {
        (Comparison::Contains, 1)
    } else {
        let mut end = i;
        while end < bytes.len() && !is_boundary(bytes, end) {
            end += 1;
        }
        return Err(KeywordError::MissingOperator(input[start..end].to_string()));
    };

    if field.is_empty() {
        return Err(KeywordError::EmptyField(start));
    }

    i += width;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let (value, next) = if bytes.get(i) == Some(&b'"') {
        lex_quoted(input, i)?
    } else {
        let mut end = i;
        while end < bytes.len() && !is_boundary(bytes, end) {
            end += 1;
        }
        (input[i..end].to_string(), end)
    };

    Ok((Term::new(field, op, value)?, next))
}

fn lex_quoted(input: &str, open: usize) -> Result<(String, usize), KeywordError> {
    let mut value = String::new();
    let mut chars = input[open + 1..].char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok((value, open + 1 + offset + 1)),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            _ => value.push(c),
        }
    }

    Err(KeywordError::UnterminatedQuote(open))
}

/// Recursive-descent parser; each rule yields the expression and its tree depth
struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    /// Depth of a node joining subtrees of depth `left` and `right`
    fn combine(left: usize, right: usize, at: usize) -> Result<usize, KeywordError> {
        let depth = left.max(right) + 1;
        if depth > MAX_DEPTH {
            return Err(KeywordError::TooDeep(at));
        }
        Ok(depth)
    }

    /// Consume the combinator under the cursor, returning its position
    fn advance(&mut self) -> usize {
        let at = self.tokens.get(self.pos).map_or(self.end, |s| s.pos);
        self.pos += 1;
        at
    }

    fn parse_or(&mut self) -> Result<(KeywordExpr, usize), KeywordError> {
        let (mut left, mut depth) = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            let at = self.advance();
            let (right, right_depth) = self.parse_and()?;
            depth = Self::combine(depth, right_depth, at)?;
            left = KeywordExpr::Or(Box::new(left), Box::new(right));
        }
        Ok((left, depth))
    }

    fn parse_and(&mut self) -> Result<(KeywordExpr, usize), KeywordError> {
        let (mut left, mut depth) = self.parse_primary()?;
        while self.peek() == Some(&Token::And) {
            let at = self.advance();
            let (right, right_depth) = self.parse_primary()?;
            depth = Self::combine(depth, right_depth, at)?;
            left = KeywordExpr::And(Box::new(left), Box::new(right));
        }
        Ok((left, depth))
    }

    fn parse_primary(&mut self) -> Result<(KeywordExpr, usize), KeywordError> {
        let Some(spanned) = self.tokens.get(self.pos).cloned() else {
            return Err(self.error_at_end());
        };
        self.pos += 1;

        match spanned.token {
            Token::Term(term) => Ok((KeywordExpr::Term(term), 1)),
            Token::Open => {
                self.nesting += 1;
                if self.nesting > MAX_DEPTH {
                    return Err(KeywordError::TooDeep(spanned.pos));
                }
                let inner = self.parse_or()?;
                self.nesting -= 1;
                match self.tokens.get(self.pos) {
                    Some(Spanned {
                        token: Token::Close,
                        ..
                    }) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    None => Err(KeywordError::UnbalancedParen(spanned.pos)),
                    Some(other) => Err(KeywordError::MissingCombinator(other.pos)),
                }
            }
            Token::Close => Err(KeywordError::UnbalancedParen(spanned.pos)),
            Token::And | Token::Or => Err(KeywordError::DanglingOperator(spanned.pos)),
        }
    }

    fn error_at_end(&self) -> KeywordError {
        match self.tokens.last() {
            Some(Spanned {
                token: Token::Open,
                pos,
            }) => KeywordError::UnbalancedParen(*pos),
            Some(Spanned {
                token: Token::And | Token::Or,
                pos,
            }) => KeywordError::DanglingOperator(*pos),
            _ => KeywordError::DanglingOperator(self.end),
        }
    }
}
