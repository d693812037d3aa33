//! AST for the PSQL query language.
//!
//! Plain-data trees built bottom-up by the parser. Every pass consumes them
//! through exhaustive pattern matching, so adding a node kind is a
//! compile-time-checked change in each pass.

use crate::lexer::Token;

/// A complete source program: an ordered sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Use(UseStatement),
    Language(LanguageStatement),
    Query(Query),
}

/// `use namespace [as alias];`
#[derive(Debug, Clone, PartialEq)]
pub struct UseStatement {
    pub namespace: String,
    pub alias: Option<String>,
}

/// `lang code;`
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageStatement {
    pub code: String,
}

/// `query name projections [filter expression]*;`
///
/// Filters are implicitly AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub name: String,
    pub projections: Vec<Projection>,
    pub filters: Vec<Expression>,
}

/// One entry of a query's projection list.
///
/// Either a named field (`namespace::field [as alias]`) or a wildcard
/// (`namespace::*`, `field` is `None`). The parser guarantees a wildcard is
/// the sole projection of its query.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub namespace: String,
    pub field: Option<String>,
    pub alias: Option<String>,
    pub wildcard: bool,
}

/// Boolean connective of a binary filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    /// `namespace::field.function(arg, ...)` - arguments are literal terminals.
    FunctionCall {
        namespace: String,
        field: String,
        function: String,
        arguments: Vec<Token>,
    },
    /// A bare `namespace::field` used as a boolean literal.
    FieldRef { namespace: String, field: String },
}
