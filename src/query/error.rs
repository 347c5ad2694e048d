//! Error types for keyword expressions
//!
//! Positions are byte offsets into the expression text.

use thiserror::Error;

/// Errors raised while parsing a keyword expression
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeywordError {
    /// A `(` without its `)` or a stray `)`
    #[error("Unbalanced parenthesis at position {0}")]
    UnbalancedParen(usize),

    /// `&&` or `||` without an operand on one side
    #[error("Operator without operand at position {0}")]
    DanglingOperator(usize),

    /// Two operands not joined by `&&` or `||`
    #[error("Expected '&&' or '||' at position {0}")]
    MissingCombinator(usize),

    /// A term that is not `field<op>value`
    #[error("Term '{0}' has no comparison operator (=, ==, !=)")]
    MissingOperator(String),

    /// A term with an empty field name
    #[error("Term at position {0} has no field name")]
    EmptyField(usize),

    /// A quoted value missing its closing quote
    #[error("Unterminated quote starting at position {0}")]
    UnterminatedQuote(usize),

    /// Parentheses or combinators nested past the parser's limit
    #[error("Expression nested too deeply at position {0}")]
    TooDeep(usize),

    /// A value that compiles neither as a pattern nor as a literal
    #[error("Value of '{field}' cannot be matched: {reason}")]
    InvalidPattern { field: String, reason: String },
}
