//! Walks a [`Document`] guided by a token stream.
//!
//! The cursor starts at the document root and is re-seated by every token:
//!
//! - `$` keeps the cursor at the root.
//! - `.name` moves to the field `name` of the current object.
//! - `[predicate]` filters the current array. A single match becomes the new cursor, zero or
//!   several matches become an array of the matching elements.
//!
//! Elements that lack the predicate's property, or whose value has a different JSON type than
//! the literal, never match.

use crate::document::{Document, Node, NodeId, NodeKind};
use crate::lexer::{Token, TokenKind};
use crate::predicate::{ComparisonOp, Literal, Predicate};
use log::{debug, trace};
use serde_json::{Number, Value};
use thiserror::Error;

/// The part of the document selected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A single node of the document.
    Node(NodeId),
    /// The elements matched by a bracket expression, in document order.
    Matches(Vec<NodeId>),
}

impl Selection {
    #[must_use]
    pub fn kind(&self, doc: &Document) -> NodeKind {
        match self {
            Selection::Node(id) => doc.kind(*id),
            Selection::Matches(_) => NodeKind::Array,
        }
    }

    /// Rebuilds the selection as a `serde_json::Value`.
    #[must_use]
    pub fn to_value(&self, doc: &Document) -> Value {
        match self {
            Selection::Node(id) => doc.to_value(*id),
            Selection::Matches(ids) => Value::Array(ids.iter().map(|id| doc.to_value(*id)).collect()),
        }
    }

    /// Renders the selection as compact, canonical JSON text.
    #[must_use]
    pub fn serialize(&self, doc: &Document) -> String {
        self.to_value(doc).to_string()
    }
}

/// Applies token streams to a single document.
pub struct Evaluator<'a> {
    doc: &'a Document,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub fn new(doc: &'a Document) -> Self {
        Evaluator { doc }
    }

    /// Runs `tokens` against the document and returns the final selection.
    ///
    /// # Errors
    ///
    /// Will return `Err` on the first token that does not fit the shape of the document.
    pub fn evaluate(&self, tokens: &[Token]) -> Result<Selection> {
        let mut current = Selection::Node(self.doc.root());

        for (i, token) in tokens.iter().enumerate() {
            trace!("applying {} to {:?}", token, current);
            current = match &token.kind {
                TokenKind::Root if i == 0 => current,
                TokenKind::Root => return Err(Error::RootNotFirst(token.start)),
                TokenKind::Property(name) => self.property(&current, name)?,
                TokenKind::BracketExpression(bracket) => {
                    self.filter(&current, &bracket.predicate)?
                }
            };
        }
        Ok(current)
    }

    fn property(&self, current: &Selection, name: &str) -> Result<Selection> {
        let id = match current {
            Selection::Node(id) => *id,
            Selection::Matches(_) => return Err(Error::PropertyOfArray(name.to_string())),
        };

        match self.doc.node(id) {
            Node::Object(_) => self
                .doc
                .find_field(id, name)
                .map(Selection::Node)
                .ok_or_else(|| Error::NoSuchField(name.to_string())),
            Node::Array(_) => Err(Error::PropertyOfArray(name.to_string())),
            node => Err(Error::PropertyOfScalar {
                property: name.to_string(),
                kind: node.kind(),
            }),
        }
    }

    fn filter(&self, current: &Selection, predicate: &Predicate) -> Result<Selection> {
        let elements = match current {
            Selection::Node(id) => self.doc.elements(*id).ok_or_else(|| Error::NotAnArray {
                predicate: predicate.to_string(),
                kind: self.doc.kind(*id),
            })?,
            Selection::Matches(ids) => ids.as_slice(),
        };

        let mut matches: Vec<NodeId> = elements
            .iter()
            .copied()
            .filter(|element| self.matches(predicate, *element))
            .collect();
        debug!(
            "[{}] matched {} of {} elements",
            predicate,
            matches.len(),
            elements.len()
        );

        if matches.len() == 1 {
            Ok(Selection::Node(matches.remove(0)))
        } else {
            Ok(Selection::Matches(matches))
        }
    }

    fn matches(&self, predicate: &Predicate, element: NodeId) -> bool {
        let value = match self.doc.find_field(element, &predicate.property) {
            Some(value) => value,
            None => return false,
        };

        let equal = match (&predicate.literal, self.doc.node(value)) {
            (Literal::String(s1), Node::String(s2)) => s1 == s2,
            (Literal::Number(n1), Node::Number(n2)) => numbers_equal(n1, n2),
            (Literal::Bool(b1), Node::Bool(b2)) => b1 == b2,
            (Literal::Null, Node::Null) => true,
            _ => return false,
        };

        match predicate.operator {
            ComparisonOp::Equals => equal,
            ComparisonOp::NotEquals => !equal,
        }
    }
}

/// Integers compare exactly, anything involving a float compares as `f64`.
fn numbers_equal(n1: &Number, n2: &Number) -> bool {
    if let (Some(i1), Some(i2)) = (n1.as_i64(), n2.as_i64()) {
        i1 == i2
    } else if let (Some(u1), Some(u2)) = (n1.as_u64(), n2.as_u64()) {
        u1 == u2
    } else if n1.is_f64() || n2.is_f64() {
        n1.as_f64() == n2.as_f64()
    } else {
        false
    }
}

/// Result type for evaluating an expression.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a well formed expression does not fit the document.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("root `$` must be the first token, found at index {0}")]
    RootNotFirst(usize),

    #[error("cannot access property of scalar: `{property}` on {kind}")]
    PropertyOfScalar { property: String, kind: NodeKind },

    #[error("cannot access property of array; use a bracket expression: `{0}`")]
    PropertyOfArray(String),

    #[error("no such field: {0}")]
    NoSuchField(String),

    #[error("cannot apply bracket expression `[{predicate}]` to {kind}")]
    NotAnArray { predicate: String, kind: NodeKind },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;

    const CITIES: &str = r#"{"user":{"locations":[
        {"name":"Lima","population":10,"capital":true},
        {"name":"Buenos Aires","population":15,"capital":true,"zip":null},
        {"name":"Rosario","population":1.5,"capital":false},
        {"city":"Lima"},
        "Lima",
        {"name":7}
    ]}}"#;

    fn run(expression: &str, src: &str) -> anyhow::Result<Result<String>> {
        let doc: Document = src.parse()?;
        let tokens = Tokenizer::tokenize(expression)?;
        Ok(Evaluator::new(&doc)
            .evaluate(&tokens)
            .map(|selection| selection.serialize(&doc)))
    }

    #[test]
    fn root_only() -> anyhow::Result<()> {
        assert_eq!(Ok(r#"{"a":1}"#.to_string()), run("$", r#"{"a":1}"#)?);
        Ok(())
    }

    #[test]
    fn nested_properties() -> anyhow::Result<()> {
        let src = r#"{"user":{"name":"Ana"}}"#;
        assert_eq!(Ok(r#""Ana""#.to_string()), run("$.user.name", src)?);
        assert_eq!(Ok(r#"{"name":"Ana"}"#.to_string()), run("$.user", src)?);
        Ok(())
    }

    #[test]
    fn missing_field() -> anyhow::Result<()> {
        let src = r#"{"user":{"name":"Ana"}}"#;
        assert_eq!(
            Err(Error::NoSuchField("email".to_string())),
            run("$.user.email", src)?
        );
        assert_eq!(
            Err(Error::NoSuchField("account".to_string())),
            run("$.account.name", src)?
        );
        Ok(())
    }

    #[test]
    fn property_of_scalar() -> anyhow::Result<()> {
        assert_eq!(
            Err(Error::PropertyOfScalar {
                property: "b".to_string(),
                kind: NodeKind::Number
            }),
            run("$.a.b", r#"{"a":1}"#)?
        );
        assert_eq!(
            Err(Error::PropertyOfScalar {
                property: "b".to_string(),
                kind: NodeKind::Null
            }),
            run("$.a.b", r#"{"a":null}"#)?
        );
        Ok(())
    }

    #[test]
    fn property_of_array() -> anyhow::Result<()> {
        assert_eq!(
            Err(Error::PropertyOfArray("name".to_string())),
            run("$.user.locations.name", CITIES)?
        );
        assert_eq!(
            Err(Error::PropertyOfArray("population".to_string())),
            run("$.user.locations[.capital == true].population", CITIES)?
        );
        Ok(())
    }

    #[test]
    fn bracket_on_non_array() -> anyhow::Result<()> {
        assert_eq!(
            Err(Error::NotAnArray {
                predicate: ".name == 'x'".to_string(),
                kind: NodeKind::Object
            }),
            run("$.user[.name == 'x']", CITIES)?
        );
        Ok(())
    }

    #[test]
    fn filter_single_match() -> anyhow::Result<()> {
        assert_eq!(
            Ok(r#"{"name":"Buenos Aires","population":15,"capital":true,"zip":null}"#.to_string()),
            run("$.user.locations[.name == 'Buenos Aires']", CITIES)?
        );
        assert_eq!(
            Ok("1.5".to_string()),
            run("$.user.locations[.population == 1.5].population", CITIES)?
        );
        assert_eq!(
            Ok(r#""Buenos Aires""#.to_string()),
            run("$.user.locations[.zip == null].name", CITIES)?
        );
        Ok(())
    }

    #[test]
    fn filter_many_matches() -> anyhow::Result<()> {
        assert_eq!(
            Ok(concat!(
                r#"[{"name":"Lima","population":10,"capital":true},"#,
                r#"{"name":"Buenos Aires","population":15,"capital":true,"zip":null}]"#
            )
            .to_string()),
            run("$.user.locations[.capital == true]", CITIES)?
        );
        Ok(())
    }

    #[test]
    fn filter_no_match() -> anyhow::Result<()> {
        assert_eq!(
            Ok("[]".to_string()),
            run("$.user.locations[.name == 'Quito']", CITIES)?
        );
        assert_eq!(Ok("[]".to_string()), run("$.items[.name == 'x']", r#"{"items":[]}"#)?);
        Ok(())
    }

    #[test]
    fn filter_type_mismatch_never_matches() -> anyhow::Result<()> {
        assert_eq!(
            Ok("[]".to_string()),
            run("$.user.locations[.name == 7.5]", CITIES)?
        );
        assert_eq!(
            Ok(r#"{"name":7}"#.to_string()),
            run("$.user.locations[.name == 7]", CITIES)?
        );
        assert_eq!(
            Ok("[]".to_string()),
            run("$.user.locations[.capital == 'true']", CITIES)?
        );
        Ok(())
    }

    #[test]
    fn filter_large_integers_compare_exactly() -> anyhow::Result<()> {
        let src = r#"{"items":[{"id":9007199254740992},{"id":9007199254740993},{"id":-3}]}"#;
        assert_eq!(
            Ok(r#"{"id":9007199254740993}"#.to_string()),
            run("$.items[.id == 9007199254740993]", src)?
        );
        assert_eq!(
            Ok(r#"{"id":-3}"#.to_string()),
            run("$.items[.id == -3]", src)?
        );
        assert_eq!(
            Ok(r#"{"id":-3}"#.to_string()),
            run("$.items[.id == -3.0]", src)?
        );
        assert_eq!(
            Ok(r#"{"name":"Lima","population":10,"capital":true}"#.to_string()),
            run("$.user.locations[.population == 10.0]", CITIES)?
        );
        Ok(())
    }

    #[test]
    fn filter_not_equals() -> anyhow::Result<()> {
        assert_eq!(
            Ok(r#"{"name":"Rosario","population":1.5,"capital":false}"#.to_string()),
            run("$.user.locations[.capital != true]", CITIES)?
        );
        Ok(())
    }

    #[test]
    fn chained_filters() -> anyhow::Result<()> {
        assert_eq!(
            Ok(r#"{"name":"Lima","population":10,"capital":true}"#.to_string()),
            run(
                "$.user.locations[.capital == true][.population == 10]",
                CITIES
            )?
        );
        Ok(())
    }

    #[test]
    fn root_not_first() -> anyhow::Result<()> {
        let doc: Document = "{}".parse()?;
        let mut tokens = Tokenizer::tokenize("$")?;
        tokens.push(Token {
            start: 1,
            len: 1,
            kind: TokenKind::Root,
        });
        assert_eq!(
            Err(Error::RootNotFirst(1)),
            Evaluator::new(&doc).evaluate(&tokens)
        );
        Ok(())
    }

    #[test]
    fn evaluation_is_repeatable() -> anyhow::Result<()> {
        let doc: Document = CITIES.parse()?;
        let tokens = Tokenizer::tokenize("$.user.locations[.capital == true]")?;
        let evaluator = Evaluator::new(&doc);
        let first = evaluator.evaluate(&tokens)?;
        let second = evaluator.evaluate(&tokens)?;
        assert_eq!(first, second);
        assert_eq!(first.serialize(&doc), second.serialize(&doc));
        assert_eq!(NodeKind::Array, first.kind(&doc));
        Ok(())
    }
}
