//! # JPath
//!
//! Is a JSON path expression lexer, evaluator, cli and library.
//!
//! #### Expressions
//! An expression starts at the root `$`, descends through object properties with `.name` and
//! filters arrays with bracket expressions such as `[.name == 'Buenos Aires']`.
//!
//! ```text
//! Expr      := '$' Step*
//! Step      := '.' Identifier | '[' Predicate ']'
//! Predicate := '.' Identifier ('==' | '!=') Literal
//! ```
//!
//! ```rust
//! use jpath::document::Document;
//! use jpath::Path;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>>{
//!     let src = r#"{"user":{"locations":[{"name":"Lima"},{"name":"Buenos Aires"}]}}"#;
//!     let expression = "$.user.locations[.name == 'Buenos Aires']";
//!
//!     let path = Path::parse(expression)?;
//!     let doc: Document = src.parse()?;
//!     assert_eq!(r#"{"name":"Buenos Aires"}"#, path.evaluate(&doc)?);
//!     Ok(())
//! }
//! ```
//!
//!

/// JSON document model
pub mod document;

/// Expression evaluator
pub mod evaluator;

/// Path expression lexer
pub mod lexer;

/// Compiled path expressions
pub mod path;

/// Bracket expression compiler
pub mod predicate;

pub use path::{query, Error, Path, Result};
