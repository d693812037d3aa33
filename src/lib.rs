//! PSQL Core - Storage-independent PSQL query language parser and executor.
//!
//! This crate provides the core components for parsing and executing PSQL
//! queries against in-memory collections of typed records, without any
//! storage or transport dependencies. A host application supplies the data
//! (any type implementing the [`Fielder`] capability), a field-type schema,
//! and a query string; the engine returns named, projected result sets.
//!
//! # Main Components
//!
//! - **Lexer**: Turns query text into a replayable token stream
//! - **Parser**: Builds an AST via recursive descent
//! - **Analyzers**: Namespace resolution, then type/arity checking
//! - **Interpreter**: Compiles filters into predicates over bound data
//! - **Executor**: Scans, filters, and projects the bound records
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use psql_core::{Engine, NamespaceValues, ValueKind};
//! use serde_json::json;
//!
//! let mut fields = HashMap::new();
//! fields.insert("name".to_string(), ValueKind::String);
//! fields.insert("hp".to_string(), ValueKind::Integer);
//! let mut schema = HashMap::new();
//! schema.insert("Pokemon".to_string(), fields);
//!
//! let engine = Engine::new(schema);
//!
//! let mut bindings = HashMap::new();
//! bindings.insert(
//!     "Pokemon".to_string(),
//!     NamespaceValues::new(
//!         vec![
//!             json!({"name": "Pikachu", "hp": 55}),
//!             json!({"name": "Onix", "hp": 35}),
//!         ],
//!         json!({"name": "", "hp": 0}),
//!     ),
//! );
//!
//! let results = engine
//!     .run("use Pokemon as P; query strong P::{name} filter P::hp.gt(50);", &bindings)
//!     .unwrap();
//! assert_eq!(results["strong"], vec![json!({"name": "Pikachu"})]);
//! ```

pub mod analyzer;
pub mod ast;
pub mod error;
pub mod executor;
pub mod functions;
pub mod interpreter;
pub mod lexer;
pub mod parser;

// Re-export main types for convenience
pub use analyzer::{analyze_namespaces, analyze_semantics, AliasMap, Schema};
pub use ast::{
    BinaryOperator, Expression, LanguageStatement, Program, Projection, Query, Statement,
    UseStatement,
};
pub use error::{PsqlError, PsqlResult};
pub use executor::{execute, Engine, Fielder, NamespaceValues};
pub use functions::{FilterFunction, FunctionRegistry, ValueKind};
pub use interpreter::{interpret, InterpretedQuery, Predicate};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, Parser};
