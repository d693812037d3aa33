//! Type, arity, and language checking pass.

use std::collections::{HashMap, HashSet};

use crate::analyzer::namespace::AliasMap;
use crate::ast::{Expression, Program, Statement};
use crate::error::{PsqlError, PsqlResult};
use crate::functions::{FunctionRegistry, ValueKind};

/// Declared field types per namespace.
pub type Schema = HashMap<String, HashMap<String, ValueKind>>;

/// Validate query-name uniqueness, projection fields against the schema,
/// function applicability and arity for every function call, and language
/// codes against the allowed set. Fails on the first violation.
pub fn analyze_semantics(
    program: &Program,
    aliases: &AliasMap,
    schema: &Schema,
    registry: &FunctionRegistry,
    allowed_languages: &HashSet<String>,
) -> PsqlResult<()> {
    let mut seen_names: HashSet<&str> = HashSet::new();

    for statement in &program.statements {
        match statement {
            Statement::Use(_) => {}

            Statement::Language(language) => {
                if !allowed_languages.contains(&language.code) {
                    return Err(PsqlError::Semantic(format!(
                        "unsupported language code: {}",
                        language.code
                    )));
                }
            }

            Statement::Query(query) => {
                if !seen_names.insert(query.name.as_str()) {
                    return Err(PsqlError::Semantic(format!(
                        "duplicate query name: {}",
                        query.name
                    )));
                }

                for projection in &query.projections {
                    let fields = resolve_fields(&projection.namespace, aliases, schema)?;
                    if !projection.wildcard {
                        let field = projection.field.as_deref().unwrap_or_default();
                        if !fields.contains_key(field) {
                            return Err(PsqlError::Semantic(format!(
                                "unknown field '{}' in namespace '{}'",
                                field, projection.namespace
                            )));
                        }
                    }
                }

                for filter in &query.filters {
                    check_expression(filter, aliases, schema, registry)?;
                }
            }
        }
    }

    Ok(())
}

fn resolve_fields<'a>(
    namespace: &str,
    aliases: &AliasMap,
    schema: &'a Schema,
) -> PsqlResult<&'a HashMap<String, ValueKind>> {
    let original = aliases.get(namespace).ok_or_else(|| {
        PsqlError::Semantic(format!("namespace not imported: {}", namespace))
    })?;
    schema.get(original).ok_or_else(|| {
        PsqlError::Semantic(format!("no schema for namespace: {}", original))
    })
}

fn check_expression(
    expression: &Expression,
    aliases: &AliasMap,
    schema: &Schema,
    registry: &FunctionRegistry,
) -> PsqlResult<()> {
    match expression {
        Expression::Binary { left, right, .. } => {
            check_expression(left, aliases, schema, registry)?;
            check_expression(right, aliases, schema, registry)
        }

        Expression::Not(inner) => check_expression(inner, aliases, schema, registry),

        Expression::FieldRef { namespace, field } => {
            let fields = resolve_fields(namespace, aliases, schema)?;
            if !fields.contains_key(field) {
                return Err(PsqlError::Semantic(format!(
                    "unknown field '{}' in namespace '{}'",
                    field, namespace
                )));
            }
            Ok(())
        }

        Expression::FunctionCall {
            namespace,
            field,
            function,
            arguments,
        } => {
            let fields = resolve_fields(namespace, aliases, schema)?;
            let field_type = fields.get(field).ok_or_else(|| {
                PsqlError::Semantic(format!(
                    "unknown field '{}' in namespace '{}'",
                    field, namespace
                ))
            })?;

            let signature = match registry.get(*field_type, function) {
                Some(signature) => signature,
                None if registry.is_known(function) => {
                    return Err(PsqlError::Semantic(format!(
                        "function '{}' is not applicable to {:?}-valued field '{}'",
                        function, field_type, field
                    )));
                }
                None => {
                    return Err(PsqlError::Semantic(format!(
                        "unknown function: {}",
                        function
                    )));
                }
            };

            if signature.expected_argument_kinds.len() != arguments.len() {
                return Err(PsqlError::Semantic(format!(
                    "function '{}' expects {} argument(s), got {}",
                    function,
                    signature.expected_argument_kinds.len(),
                    arguments.len()
                )));
            }

            Ok(())
        }
    }
}
