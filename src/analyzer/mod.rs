//! Semantic validation passes.
//!
//! Two single-pass checks run between parsing and interpretation: namespace
//! resolution (`use` statements and every namespaced reference) and
//! type/arity checking against a declared schema. Each pass allocates its
//! bookkeeping fresh per call and stops at the first error.

pub mod namespace;
pub mod semantic;

pub use namespace::{analyze_namespaces, AliasMap};
pub use semantic::{analyze_semantics, Schema};
