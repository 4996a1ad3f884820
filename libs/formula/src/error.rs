//! Error types for formula compilation and solving

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Syntax and solver errors.
///
/// Positions are 0-based character offsets into the formula text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unexpected character '{found}' at position {pos}")]
    UnexpectedChar { found: char, pos: usize },

    #[error("unexpected end of input at position {pos}")]
    UnexpectedEnd { pos: usize },

    #[error("expected '{expected}' at position {pos}")]
    ExpectedChar { expected: char, pos: usize },

    #[error("expected a number at position {pos}")]
    ExpectedNumber { pos: usize },

    #[error("multiple dots in number at position {pos}")]
    MultipleDots { pos: usize },

    #[error("exponent marker at start of number at position {pos}")]
    ExponentAtStart { pos: usize },

    #[error("invalid number at position {pos}")]
    InvalidNumber { pos: usize },

    #[error("unfinished string starting at position {pos}")]
    UnfinishedString { pos: usize },

    #[error("a variable is needed here (position {pos})")]
    VariableRequired { pos: usize },

    #[error("function {function} takes {min} to {max} arguments, got {got}")]
    ArityOutOfRange {
        function: &'static str,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("nonexistent function: {0}")]
    UnknownFunction(String),

    #[error("divide by zero")]
    DivisionByZero,

    #[error("invalid entity: {0}")]
    UnknownEntity(String),

    #[error("weighting of '{name}' is not a positive integer")]
    InvalidWeight { name: String },

    #[error("formula too deeply nested (max depth: {max})")]
    TooDeep { max: usize },

    #[error("numeric overflow")]
    Overflow,
}

impl Error {
    /// Character position the error was raised at, if it came from the parser.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::UnexpectedChar { pos, .. }
            | Error::UnexpectedEnd { pos }
            | Error::ExpectedChar { pos, .. }
            | Error::ExpectedNumber { pos }
            | Error::MultipleDots { pos }
            | Error::ExponentAtStart { pos }
            | Error::InvalidNumber { pos }
            | Error::UnfinishedString { pos }
            | Error::VariableRequired { pos } => Some(*pos),
            _ => None,
        }
    }
}
