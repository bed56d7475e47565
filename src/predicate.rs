//! Compiles the text captured between `[` and `]` into a [`Predicate`].
//!
//! #### Syntax & Rules
//!
//! | Part       | Example            | Syntax Rules                                                              |
//! |------------|--------------------|---------------------------------------------------------------------------|
//! | `Property` | `.name`            | Starts with a `.` followed by one or more `a-z`, `A-Z` or `_` characters. |
//! | `Equals`   | `==`               | N/A                                                                       |
//! | `NotEquals`| `!=`               | N/A                                                                       |
//! | `String`   | `'Buenos Aires'`   | Delimited by `'` or `"`. A `\` makes the next character literal.          |
//! | `Number`   | `-12.5`            | A JSON number. Integers are kept exact.                                   |
//! | `Bool`     | `true`             | Accepts `true` and `false` only.                                          |
//! | `Null`     | `null`             | N/A                                                                       |
//!
//! Whitespace around the operator is ignored.

use serde::Serialize;
use serde_json::Number;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The comparison applied between an element's property and the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOp {
    Equals,
    NotEquals,
}

impl ComparisonOp {
    /// Splits a leading operator off `data`, returning the operator and the remaining text.
    fn split(data: &str) -> Result<(Self, &str)> {
        if let Some(rest) = data.strip_prefix("==") {
            Ok((ComparisonOp::Equals, rest))
        } else if let Some(rest) = data.strip_prefix("!=") {
            Ok((ComparisonOp::NotEquals, rest))
        } else if data.is_empty() {
            Err(Error::MissingOperator)
        } else {
            let op: String = data.chars().take_while(|c| !c.is_whitespace()).collect();
            Err(Error::UnsupportedOperator(op))
        }
    }
}

impl Display for ComparisonOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonOp::Equals => write!(f, "=="),
            ComparisonOp::NotEquals => write!(f, "!="),
        }
    }
}

/// A typed scalar on the right hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Null,
    String(String),
    Number(Number),
    Bool(bool),
}

impl Literal {
    fn parse(data: &str) -> Result<Self> {
        match data {
            "" => Err(Error::MissingLiteral),
            "true" => Ok(Literal::Bool(true)),
            "false" => Ok(Literal::Bool(false)),
            "null" => Ok(Literal::Null),
            _ => match data.as_bytes()[0] {
                quote @ (b'\'' | b'"') => parse_string(data, char::from(quote)),
                b'-' | b'0'..=b'9' => parse_number(data),
                _ => Err(Error::InvalidLiteral(data.to_string())),
            },
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::String(s) => write!(f, "'{}'", s.replace('\\', r"\\").replace('\'', r"\'")),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A compiled bracket expression: `.<property> <operator> <literal>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub property: String,
    pub operator: ComparisonOp,
    pub literal: Literal,
}

impl Predicate {
    /// Compiles the raw text found between the brackets of a path step.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the left hand side is not a `.property` reference, the operator is
    /// missing or unknown, or the literal is missing or malformed.
    pub fn compile(raw: &str) -> Result<Self> {
        let text = raw.trim();
        let rest = text
            .strip_prefix('.')
            .ok_or_else(|| Error::MissingProperty(text.to_string()))?;

        let name_len = rest
            .bytes()
            .take_while(|c| c.is_ascii_alphabetic() || *c == b'_')
            .count();
        if name_len == 0 {
            return Err(Error::EmptyProperty(text.to_string()));
        }
        let (property, rest) = rest.split_at(name_len);

        let (operator, rest) = ComparisonOp::split(rest.trim_start())?;
        let literal = Literal::parse(rest.trim())?;

        Ok(Predicate {
            property: property.to_string(),
            operator,
            literal,
        })
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, ".{} {} {}", self.property, self.operator, self.literal)
    }
}

fn parse_string(data: &str, quote: char) -> Result<Literal> {
    let mut s = String::new();
    let mut chars = data.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => s.push(escaped),
                None => break,
            },
            _ if c == quote => {
                let trailing = &data[i + c.len_utf8()..];
                return if trailing.is_empty() {
                    Ok(Literal::String(s))
                } else {
                    Err(Error::TrailingCharacters(trailing.to_string()))
                };
            }
            _ => s.push(c),
        }
    }
    Err(Error::UnterminatedString(data.to_string()))
}

fn parse_number(data: &str) -> Result<Literal> {
    serde_json::from_str::<Number>(data)
        .map(Literal::Number)
        .map_err(|_| Error::InvalidLiteral(data.to_string()))
}

/// Result of compiling a predicate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the predicate compiler.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("expected `.property` on the left hand side, found `{0}`")]
    MissingProperty(String),

    #[error("empty property name in `{0}`")]
    EmptyProperty(String),

    #[error("missing comparison operator")]
    MissingOperator,

    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    #[error("missing literal after operator")]
    MissingLiteral,

    #[error("invalid literal `{0}`")]
    InvalidLiteral(String),

    #[error("unterminated string `{0}`")]
    UnterminatedString(String),

    #[error("unexpected characters after literal `{0}`")]
    TrailingCharacters(String),
}
