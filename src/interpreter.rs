//! Interpreter: compiles validated programs into executable queries.
//!
//! One traversal in document order. Filter expressions become predicate
//! closures over the host's record type; function calls are resolved against
//! the bound data's dummy record, which is a stricter, runtime-shaped check
//! than the schema-based semantic pass.

use std::collections::HashMap;

use serde_json::Value;

use crate::analyzer::namespace::AliasMap;
use crate::ast::{BinaryOperator, Expression, Program, Projection, Statement};
use crate::error::{PsqlError, PsqlResult};
use crate::executor::{Fielder, NamespaceValues};
use crate::functions::{FunctionRegistry, ValueKind};

/// A compiled boolean test over one record.
pub type Predicate<F> = Box<dyn Fn(&F) -> bool>;

/// The validated, compiled, executable form of a source `query` statement.
/// `language` is the language code active at the point the query was declared.
pub struct InterpretedQuery<F> {
    pub name: String,
    pub projections: Vec<Projection>,
    pub predicates: Vec<Predicate<F>>,
    pub language: String,
}

/// Walk the program once, producing one `InterpretedQuery` per `query`
/// statement. `lang` statements update the language context for queries
/// declared after them; earlier queries keep the previous value.
pub fn interpret<F: Fielder + 'static>(
    program: &Program,
    aliases: &AliasMap,
    registry: &FunctionRegistry,
    bindings: &HashMap<String, NamespaceValues<F>>,
    default_language: &str,
) -> PsqlResult<Vec<InterpretedQuery<F>>> {
    let mut language = default_language.to_string();
    let mut queries = Vec::new();

    for statement in &program.statements {
        match statement {
            Statement::Use(_) => {}

            Statement::Language(l) => {
                language = l.code.clone();
            }

            Statement::Query(query) => {
                let target = query.projections.first().ok_or_else(|| {
                    PsqlError::Expression(format!("query '{}' has no projections", query.name))
                })?;
                // The scan target must be bound even for filterless queries.
                resolve_binding(&target.namespace, aliases, bindings)?;

                let mut predicates = Vec::with_capacity(query.filters.len());
                for filter in &query.filters {
                    predicates.push(compile(filter, aliases, registry, bindings)?);
                }

                tracing::debug!(
                    "compiled query '{}': {} projection(s), {} predicate(s), lang {}",
                    query.name,
                    query.projections.len(),
                    predicates.len(),
                    language
                );

                queries.push(InterpretedQuery {
                    name: query.name.clone(),
                    projections: query.projections.clone(),
                    predicates,
                    language: language.clone(),
                });
            }
        }
    }

    Ok(queries)
}

/// Compile one filter expression into a predicate closure.
fn compile<F: Fielder + 'static>(
    expression: &Expression,
    aliases: &AliasMap,
    registry: &FunctionRegistry,
    bindings: &HashMap<String, NamespaceValues<F>>,
) -> PsqlResult<Predicate<F>> {
    match expression {
        Expression::Binary { op, left, right } => {
            let left = compile(left, aliases, registry, bindings)?;
            let right = compile(right, aliases, registry, bindings)?;
            Ok(match op {
                BinaryOperator::And => Box::new(move |record: &F| left(record) && right(record)),
                BinaryOperator::Or => Box::new(move |record: &F| left(record) || right(record)),
            })
        }

        Expression::Not(inner) => {
            let inner = compile(inner, aliases, registry, bindings)?;
            Ok(Box::new(move |record: &F| !inner(record)))
        }

        Expression::FieldRef { field, .. } => {
            let field = field.clone();
            Ok(Box::new(move |record: &F| {
                matches!(record.get_field(&field), Some(Value::Bool(true)))
            }))
        }

        Expression::FunctionCall {
            namespace,
            field,
            function,
            arguments,
        } => {
            let values = resolve_binding(namespace, aliases, bindings)?;

            // Probe the dummy record to learn the runtime type of the field.
            let dummy_value = values.dummy.get_field(field).ok_or_else(|| {
                PsqlError::Expression(format!(
                    "no field '{}' on data bound for namespace '{}'",
                    field, namespace
                ))
            })?;
            let kind = ValueKind::of(&dummy_value).ok_or_else(|| {
                PsqlError::Expression(format!(
                    "field '{}' of namespace '{}' has no filterable runtime type",
                    field, namespace
                ))
            })?;

            let filter_function = registry
                .get(kind, function)
                .ok_or_else(|| {
                    PsqlError::Expression(format!(
                        "no function '{}' registered for {:?}-valued fields",
                        function, kind
                    ))
                })?
                .clone();

            if filter_function.expected_argument_kinds.len() != arguments.len() {
                return Err(PsqlError::Expression(format!(
                    "function '{}' expects {} argument(s), got {}",
                    function,
                    filter_function.expected_argument_kinds.len(),
                    arguments.len()
                )));
            }

            let field = field.clone();
            let arguments = arguments.clone();
            Ok(Box::new(move |record: &F| {
                match record.get_field(&field) {
                    Some(value) => filter_function.run(&value, &arguments),
                    None => false,
                }
            }))
        }
    }
}

pub(crate) fn resolve_binding<'b, F>(
    namespace: &str,
    aliases: &AliasMap,
    bindings: &'b HashMap<String, NamespaceValues<F>>,
) -> PsqlResult<&'b NamespaceValues<F>> {
    let original = aliases.get(namespace).ok_or_else(|| {
        PsqlError::Expression(format!("namespace not imported: {}", namespace))
    })?;
    bindings.get(original).ok_or_else(|| {
        PsqlError::Expression(format!("no data bound for namespace '{}'", original))
    })
}
