//! Formula lexer - one-character-lookahead stream over a character source
//!
//! The lexer never buffers more than the current character, so any sequential
//! source (a string, an iterator, a decoder over a reader) can feed it.

use crate::error::{Error, Result};
use std::str::Chars;

/// A sequential provider of characters.
///
/// `read_char` is called at most once per position. `close` is invoked exactly
/// once, the first time `read_char` signals end of input.
pub trait CharSource {
    fn read_char(&mut self) -> Option<char>;

    fn close(&mut self) {}
}

impl CharSource for Chars<'_> {
    fn read_char(&mut self) -> Option<char> {
        self.next()
    }
}

/// Adapts any `char` iterator into a [`CharSource`].
#[derive(Debug, Clone)]
pub struct IterSource<I>(pub I);

impl<I: Iterator<Item = char>> CharSource for IterSource<I> {
    fn read_char(&mut self) -> Option<char> {
        self.0.next()
    }
}

/// The formula lexer
pub struct Lexer<S: CharSource> {
    source: Option<S>,
    current: Option<char>,
    position: usize,
}

impl<'a> Lexer<Chars<'a>> {
    /// Create a lexer over a string slice
    pub fn for_str(input: &'a str) -> Self {
        Self::new(input.chars())
    }
}

impl<S: CharSource> Lexer<S> {
    /// Create a new lexer, reading the first character eagerly
    pub fn new(source: S) -> Self {
        let mut lexer = Self {
            source: Some(source),
            current: None,
            position: 0,
        };
        lexer.fill();
        lexer
    }

    fn fill(&mut self) {
        self.current = self.source.as_mut().and_then(|source| source.read_char());
        if self.current.is_none() {
            self.release();
        }
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }

    /// Current character without consuming it
    pub fn peek(&self) -> Option<char> {
        self.current
    }

    /// Consume and return the current character
    pub fn pop(&mut self) -> Option<char> {
        let c = self.current?;
        self.position += 1;
        self.fill();
        Some(c)
    }

    /// Skip whitespace characters
    pub fn skip_blanks(&mut self) {
        while matches!(self.current, Some(c) if c.is_whitespace()) {
            self.pop();
        }
    }

    /// Skip whitespace, then consume `expected` if it is the current character
    pub fn is_next(&mut self, expected: char) -> bool {
        self.skip_blanks();
        if self.current == Some(expected) {
            self.pop();
            true
        } else {
            false
        }
    }

    /// Like [`Lexer::is_next`], but a missing character is an error
    pub fn expect(&mut self, expected: char) -> Result<()> {
        if self.is_next(expected) {
            Ok(())
        } else {
            Err(Error::ExpectedChar {
                expected,
                pos: self.position,
            })
        }
    }

    /// Number of characters consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_eof(&self) -> bool {
        self.current.is_none()
    }

    /// Error describing the current character (or end of input) as unexpected
    pub(crate) fn unexpected(&self) -> Error {
        match self.current {
            Some(found) => Error::UnexpectedChar {
                found,
                pos: self.position,
            },
            None => Error::UnexpectedEnd { pos: self.position },
        }
    }
}
