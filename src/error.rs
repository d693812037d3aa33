//! Error types for psql-core.
//!
//! Four fatal error kinds, one per pipeline stage. Every stage stops at its
//! first error; there is no recovery or diagnostic aggregation.

use thiserror::Error;

/// PSQL error type
#[derive(Error, Debug)]
pub enum PsqlError {
    #[error("Lex error: unexpected character '{character}' at offset {offset}")]
    Lex { character: char, offset: usize },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Semantic error: {0}")]
    Semantic(String),

    #[error("Expression error: {0}")]
    Expression(String),
}

/// Result type for PSQL operations
pub type PsqlResult<T> = Result<T, PsqlError>;

impl serde::Serialize for PsqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
