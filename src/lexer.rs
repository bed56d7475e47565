//! #### Syntax & Rules
//!
//! | Token               | Example                   | Syntax Rules                                                                                        |
//! |---------------------|---------------------------|-----------------------------------------------------------------------------------------------------|
//! | `Root`              | `$`                       | Must be the first character of the expression and may only appear once.                            |
//! | `Property`          | `.name`                   | Starts with a `.` followed by one or more `a-z`, `A-Z` or `_` characters.                           |
//! | `BracketExpression` | `[.name == 'Lima']`       | Starts with `[` and ends at the first unescaped `]`. The contents are compiled as a [`Predicate`].  |
//!
//! Brackets do not nest: an unescaped `]` always closes the current bracket expression, including
//! one that appears inside a quoted literal. Write `\]` to put a `]` into a literal.

use crate::predicate::{self, Predicate};
use log::debug;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The lexed token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub start: usize,
    pub len: usize,
    pub kind: TokenKind,
}

/// The kind of `Token`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    Root,
    Property(String),
    BracketExpression(Bracket),
}

/// A bracket expression along with its compiled predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bracket {
    pub raw: String,
    pub predicate: Predicate,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TokenKind::Root => write!(f, "$"),
            TokenKind::Property(name) => write!(f, ".{}", name),
            TokenKind::BracketExpression(bracket) => write!(f, "[{}]", bracket.raw),
        }
    }
}

/// A lexer for path expressions.
pub struct Tokenizer<'a> {
    pos: usize,
    src: &'a str,
}

impl<'a> Tokenizer<'a> {
    /// Creates a new `Tokenizer` to iterate over tokens
    #[inline]
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self { pos: 0, src }
    }

    /// Lexes the whole expression, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the expression is empty or malformed.
    pub fn tokenize(src: &'a str) -> Result<Vec<Token>> {
        if src.is_empty() {
            return Err(Error::EmptyExpression);
        }
        Tokenizer::new(src).collect()
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        let remaining = &self.src[self.pos..];
        let b = match remaining.as_bytes().first() {
            Some(b) => *b,
            None => return Ok(None),
        };
        let start = self.pos;

        let (kind, len) = match b {
            b'$' if start == 0 => (TokenKind::Root, 1),
            b'$' => return Err(Error::RootNotFirst(start)),
            _ if start == 0 => return Err(Error::MissingRoot(first_char(remaining))),
            b'.' => tokenize_property(remaining.as_bytes(), start)?,
            b'[' => tokenize_bracket(remaining, start)?,
            _ => {
                return Err(Error::UnexpectedCharacter {
                    index: start,
                    character: first_char(remaining),
                })
            }
        };
        let token = Token { start, len, kind };
        debug!("lexed {:?}", token);
        self.pos += len;
        Ok(Some(token))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.next_token();
        if next.is_err() {
            self.pos = self.src.len();
        }
        next.transpose()
    }
}

#[inline]
fn first_char(data: &str) -> char {
    data.chars().next().unwrap_or_default()
}

#[inline]
/// Consumes bytes while a predicate evaluates to true.
fn take_while<F>(data: &[u8], mut pred: F) -> Option<usize>
where
    F: FnMut(u8) -> bool,
{
    let mut current_index = 0;

    for b in data {
        if !pred(*b) {
            break;
        }
        current_index += 1;
    }

    if current_index == 0 {
        None
    } else {
        Some(current_index)
    }
}

#[inline]
fn tokenize_property(data: &[u8], start: usize) -> Result<(TokenKind, usize)> {
    match take_while(&data[1..], |c| c.is_ascii_alphabetic() || c == b'_') {
        Some(end) => Ok((
            TokenKind::Property(String::from_utf8_lossy(&data[1..=end]).into_owned()),
            end + 1,
        )),
        None => Err(Error::EmptyProperty(start)),
    }
}

#[inline]
fn tokenize_bracket(data: &str, start: usize) -> Result<(TokenKind, usize)> {
    let body = &data[1..];
    match find_closing_bracket(body.as_bytes()) {
        Some(end) => {
            let raw = &body[..end];
            if raw.trim().is_empty() {
                return Err(Error::EmptyBracket(start));
            }
            let predicate = Predicate::compile(raw)
                .map_err(|source| Error::InvalidPredicate { index: start, source })?;
            debug!("compiled bracket expression `{}` as {}", raw, predicate);
            Ok((
                TokenKind::BracketExpression(Bracket {
                    raw: raw.to_string(),
                    predicate,
                }),
                end + 2,
            ))
        }
        None => Err(Error::UnterminatedBracket(start)),
    }
}

/// Finds the first `]` that is not preceded by a `\`.
#[inline]
fn find_closing_bracket(data: &[u8]) -> Option<usize> {
    let mut escaped = false;
    for (i, b) in data.iter().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b']' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Result of a single tokenization attempt.
pub type Result<T> = std::result::Result<T, Error>;

/// Syntax errors found while lexing a path expression.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("empty expression")]
    EmptyExpression,

    #[error("expression must start with root `$`, found `{0}`")]
    MissingRoot(char),

    #[error("root `$` must be first, found at index {0}")]
    RootNotFirst(usize),

    #[error("empty property name after `.` at index {0}")]
    EmptyProperty(usize),

    #[error("unterminated bracket expression starting at index {0}")]
    UnterminatedBracket(usize),

    #[error("empty bracket expression at index {0}")]
    EmptyBracket(usize),

    #[error("invalid bracket expression at index {index}: {source}")]
    InvalidPredicate {
        index: usize,
        source: predicate::Error,
    },

    #[error("unexpected character `{character}` at index {index}")]
    UnexpectedCharacter { index: usize, character: char },
}
