//! Filter function registry.
//!
//! Functions are registered per value kind and looked up by lowercase name.
//! The registry is built once at startup and threaded into the passes that
//! need it; it is never mutated after construction, so shared concurrent
//! reads are safe.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::lexer::{Token, TokenKind};

/// Runtime classification of a field value. Doubles as the declared field
/// type in the namespace schema: semantic analysis keys the capability lookup
/// by the declared type, predicate compilation by the runtime kind of the
/// bound dummy record's field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ValueKind {
    /// Classify a JSON value. Nulls, arrays, and objects have no kind and
    /// cannot be filtered through the registry.
    pub fn of(value: &Value) -> Option<ValueKind> {
        match value {
            Value::String(_) => Some(ValueKind::String),
            Value::Bool(_) => Some(ValueKind::Boolean),
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Some(ValueKind::Integer)
                } else {
                    Some(ValueKind::Float)
                }
            }
            _ => None,
        }
    }
}

type FilterRunner = Arc<dyn Fn(&Value, &[Token]) -> bool + Send + Sync>;

/// A registered filter function: its expected argument token kinds and the
/// runner applied to a field value at scan time. Runners are total - an
/// absent or mistyped value simply fails the predicate.
#[derive(Clone)]
pub struct FilterFunction {
    pub expected_argument_kinds: Vec<TokenKind>,
    runner: FilterRunner,
}

impl FilterFunction {
    fn new(
        expected_argument_kinds: Vec<TokenKind>,
        runner: impl Fn(&Value, &[Token]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            expected_argument_kinds,
            runner: Arc::new(runner),
        }
    }

    pub fn run(&self, value: &Value, arguments: &[Token]) -> bool {
        (self.runner)(value, arguments)
    }
}

/// Nested lookup: value kind, then lowercase function name.
pub struct FunctionRegistry {
    functions: HashMap<ValueKind, HashMap<String, FilterFunction>>,
}

impl FunctionRegistry {
    fn register(&mut self, kind: ValueKind, name: &str, function: FilterFunction) {
        self.functions
            .entry(kind)
            .or_default()
            .insert(name.to_string(), function);
    }

    /// Look up a function by value kind and (case-insensitive) name.
    pub fn get(&self, kind: ValueKind, name: &str) -> Option<&FilterFunction> {
        self.functions
            .get(&kind)
            .and_then(|by_name| by_name.get(&name.to_lowercase()))
    }

    /// Whether any value kind registers a function under this name.
    pub fn is_known(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.functions
            .values()
            .any(|by_name| by_name.contains_key(&name))
    }

    /// The standard function table.
    pub fn standard() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        // String-valued fields
        registry.register(
            ValueKind::String,
            "starts_with",
            FilterFunction::new(vec![TokenKind::StringLiteral], |value, arguments| {
                match (value.as_str(), string_arg(arguments, 0)) {
                    (Some(s), Some(prefix)) => s.starts_with(prefix),
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::String,
            "ends_with",
            FilterFunction::new(vec![TokenKind::StringLiteral], |value, arguments| {
                match (value.as_str(), string_arg(arguments, 0)) {
                    (Some(s), Some(suffix)) => s.ends_with(suffix),
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::String,
            "contains",
            FilterFunction::new(vec![TokenKind::StringLiteral], |value, arguments| {
                match (value.as_str(), string_arg(arguments, 0)) {
                    (Some(s), Some(needle)) => s.contains(needle),
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::String,
            "eq",
            FilterFunction::new(vec![TokenKind::StringLiteral], |value, arguments| {
                match (value.as_str(), string_arg(arguments, 0)) {
                    (Some(s), Some(other)) => s == other,
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::String,
            "matches",
            FilterFunction::new(vec![TokenKind::StringLiteral], |value, arguments| {
                match (value.as_str(), string_arg(arguments, 0)) {
                    (Some(s), Some(pattern)) => Regex::new(pattern)
                        .map(|re| re.is_match(s))
                        .unwrap_or(false),
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::String,
            "longer_than",
            FilterFunction::new(vec![TokenKind::Number], |value, arguments| {
                match (value.as_str(), integer_arg(arguments, 0)) {
                    (Some(s), Some(n)) => s.chars().count() as i64 > n,
                    _ => false,
                }
            }),
        );

        // Integer-valued fields
        registry.register(
            ValueKind::Integer,
            "gt",
            FilterFunction::new(vec![TokenKind::Number], |value, arguments| {
                match (value.as_i64(), integer_arg(arguments, 0)) {
                    (Some(v), Some(n)) => v > n,
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::Integer,
            "lt",
            FilterFunction::new(vec![TokenKind::Number], |value, arguments| {
                match (value.as_i64(), integer_arg(arguments, 0)) {
                    (Some(v), Some(n)) => v < n,
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::Integer,
            "eq",
            FilterFunction::new(vec![TokenKind::Number], |value, arguments| {
                match (value.as_i64(), integer_arg(arguments, 0)) {
                    (Some(v), Some(n)) => v == n,
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::Integer,
            "between",
            FilterFunction::new(
                vec![TokenKind::Number, TokenKind::Number],
                |value, arguments| {
                    match (
                        value.as_i64(),
                        integer_arg(arguments, 0),
                        integer_arg(arguments, 1),
                    ) {
                        (Some(v), Some(low), Some(high)) => v >= low && v <= high,
                        _ => false,
                    }
                },
            ),
        );

        // Float-valued fields
        registry.register(
            ValueKind::Float,
            "gt",
            FilterFunction::new(vec![TokenKind::Number], |value, arguments| {
                match (value.as_f64(), float_arg(arguments, 0)) {
                    (Some(v), Some(n)) => v > n,
                    _ => false,
                }
            }),
        );
        registry.register(
            ValueKind::Float,
            "lt",
            FilterFunction::new(vec![TokenKind::Number], |value, arguments| {
                match (value.as_f64(), float_arg(arguments, 0)) {
                    (Some(v), Some(n)) => v < n,
                    _ => false,
                }
            }),
        );

        // Boolean-valued fields
        registry.register(
            ValueKind::Boolean,
            "is",
            FilterFunction::new(vec![TokenKind::True], |value, arguments| {
                match (value.as_bool(), boolean_arg(arguments, 0)) {
                    (Some(v), Some(expected)) => v == expected,
                    _ => false,
                }
            }),
        );

        registry
    }
}

fn string_arg(arguments: &[Token], index: usize) -> Option<&str> {
    arguments
        .get(index)
        .filter(|t| t.kind == TokenKind::StringLiteral)
        .map(|t| t.text.as_str())
}

fn integer_arg(arguments: &[Token], index: usize) -> Option<i64> {
    arguments
        .get(index)
        .filter(|t| t.kind == TokenKind::Number)
        .and_then(|t| t.text.parse().ok())
}

fn float_arg(arguments: &[Token], index: usize) -> Option<f64> {
    arguments
        .get(index)
        .filter(|t| t.kind == TokenKind::Number)
        .and_then(|t| t.text.parse().ok())
}

fn boolean_arg(arguments: &[Token], index: usize) -> Option<bool> {
    arguments.get(index).and_then(|t| match t.kind {
        TokenKind::True => Some(true),
        TokenKind::False => Some(false),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn string_token(text: &str) -> Token {
        Token {
            kind: TokenKind::StringLiteral,
            text: text.to_string(),
            start: 0,
            end: 0,
        }
    }

    fn number_token(text: &str) -> Token {
        Token {
            kind: TokenKind::Number,
            text: text.to_string(),
            start: 0,
            end: 0,
        }
    }

    #[test]
    fn test_value_kind_classification() {
        assert_eq!(ValueKind::of(&json!("x")), Some(ValueKind::String));
        assert_eq!(ValueKind::of(&json!(5)), Some(ValueKind::Integer));
        assert_eq!(ValueKind::of(&json!(5.5)), Some(ValueKind::Float));
        assert_eq!(ValueKind::of(&json!(true)), Some(ValueKind::Boolean));
        assert_eq!(ValueKind::of(&json!(null)), None);
        assert_eq!(ValueKind::of(&json!([1])), None);
    }

    #[test]
    fn test_string_functions() {
        let registry = FunctionRegistry::standard();

        let starts_with = registry.get(ValueKind::String, "starts_with").unwrap();
        assert!(starts_with.run(&json!("Pikachu"), &[string_token("Pika")]));
        assert!(!starts_with.run(&json!("Onix"), &[string_token("Pika")]));

        let contains = registry.get(ValueKind::String, "contains").unwrap();
        assert!(contains.run(&json!("Charmander"), &[string_token("mand")]));

        let matches = registry.get(ValueKind::String, "matches").unwrap();
        assert!(matches.run(&json!("Pikachu"), &[string_token("^P.*u$")]));
        assert!(!matches.run(&json!("Pikachu"), &[string_token("^Q")]));

        let longer_than = registry.get(ValueKind::String, "longer_than").unwrap();
        assert!(longer_than.run(&json!("Pikachu"), &[number_token("5")]));
        assert!(!longer_than.run(&json!("Mew"), &[number_token("5")]));
    }

    #[test]
    fn test_integer_functions() {
        let registry = FunctionRegistry::standard();

        let gt = registry.get(ValueKind::Integer, "gt").unwrap();
        assert!(gt.run(&json!(55), &[number_token("50")]));
        assert!(!gt.run(&json!(35), &[number_token("50")]));

        let between = registry.get(ValueKind::Integer, "between").unwrap();
        assert!(between.run(&json!(55), &[number_token("10"), number_token("90")]));
        assert!(!between.run(&json!(5), &[number_token("10"), number_token("90")]));
    }

    #[test]
    fn test_boolean_is() {
        let registry = FunctionRegistry::standard();
        let is = registry.get(ValueKind::Boolean, "is").unwrap();

        let true_token = Token {
            kind: TokenKind::True,
            text: "true".to_string(),
            start: 0,
            end: 0,
        };
        assert!(is.run(&json!(true), &[true_token.clone()]));
        assert!(!is.run(&json!(false), &[true_token]));
    }

    #[test]
    fn test_runners_are_total_on_mistyped_values() {
        let registry = FunctionRegistry::standard();
        let gt = registry.get(ValueKind::Integer, "gt").unwrap();
        assert!(!gt.run(&json!("not a number"), &[number_token("50")]));
        assert!(!gt.run(&json!(55), &[string_token("50")]));
    }

    #[test]
    fn test_invalid_regex_fails_the_predicate() {
        let registry = FunctionRegistry::standard();
        let matches = registry.get(ValueKind::String, "matches").unwrap();
        assert!(!matches.run(&json!("abc"), &[string_token("(")]));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::standard();
        assert!(registry.get(ValueKind::String, "STARTS_WITH").is_some());
    }

    #[test]
    fn test_lookup_is_kind_scoped() {
        let registry = FunctionRegistry::standard();
        assert!(registry.get(ValueKind::Integer, "starts_with").is_none());
        assert!(registry.is_known("starts_with"));
        assert!(!registry.is_known("levitates"));
    }
}
