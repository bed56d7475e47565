//! A compiled path expression that can be applied to many documents.
//!
//! ```rust
//! use jpath::document::Document;
//! use jpath::Path;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let path = Path::parse("$.user.locations[.name == 'Lima']")?;
//!     let doc: Document = r#"{"user":{"locations":[{"name":"Lima"},{"name":"Quito"}]}}"#.parse()?;
//!     assert_eq!(r#"{"name":"Lima"}"#, path.evaluate(&doc)?);
//!     Ok(())
//! }
//! ```

use crate::document::{self, Document};
use crate::evaluator::{self, Evaluator, Selection};
use crate::lexer::{self, Token, Tokenizer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// A lexed path expression with every bracket expression already compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    tokens: Vec<Token>,
}

impl Path {
    /// Lexes `expression` and compiles its bracket expressions.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the expression is not valid syntax.
    pub fn parse(expression: &str) -> lexer::Result<Self> {
        Ok(Path {
            tokens: Tokenizer::tokenize(expression)?,
        })
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Applies the path to `doc`, returning the selected part of the document.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the path does not match the shape of the document.
    #[inline]
    pub fn select(&self, doc: &Document) -> evaluator::Result<Selection> {
        Evaluator::new(doc).evaluate(&self.tokens)
    }

    /// Applies the path to `doc` and serializes the selection.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the path does not match the shape of the document.
    pub fn evaluate(&self, doc: &Document) -> evaluator::Result<String> {
        Ok(self.select(doc)?.serialize(doc))
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = lexer::Error;

    fn from_str(s: &str) -> lexer::Result<Self> {
        Path::parse(s)
    }
}

/// Parses `expression`, then `json`, and returns the serialized selection.
///
/// # Errors
///
/// Will return `Err` if the expression is invalid, the document is not valid JSON or the
/// expression does not match the document. The expression is checked before the document.
pub fn query(expression: &str, json: &str) -> Result<String> {
    let path = Path::parse(expression)?;
    let doc: Document = json.parse()?;
    Ok(path.evaluate(&doc)?)
}

/// Result type for `query`.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error raised while running a query.
#[derive(Error, Debug)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] lexer::Error),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] evaluator::Error),

    #[error(transparent)]
    Document(#[from] document::Error),
}
