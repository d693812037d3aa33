//! Namespace resolution pass.

use std::collections::{HashMap, HashSet};

use crate::ast::{Expression, Program, Statement};
use crate::error::{PsqlError, PsqlResult};

/// Alias (or original name) to original namespace name.
pub type AliasMap = HashMap<String, String>;

/// Validate `use` statements against the host's available namespace names and
/// build the alias map. Every namespaced reference elsewhere in the tree must
/// resolve through it; references appear in document order, so a namespace
/// must be imported before its first use.
pub fn analyze_namespaces(
    program: &Program,
    available: &HashSet<String>,
) -> PsqlResult<AliasMap> {
    let mut aliases = AliasMap::new();

    for statement in &program.statements {
        match statement {
            Statement::Use(use_statement) => {
                if !available.contains(&use_statement.namespace) {
                    return Err(PsqlError::Semantic(format!(
                        "unknown namespace: {}",
                        use_statement.namespace
                    )));
                }
                let key = use_statement
                    .alias
                    .clone()
                    .unwrap_or_else(|| use_statement.namespace.clone());
                if aliases.contains_key(&key) {
                    return Err(PsqlError::Semantic(format!("alias already used: {}", key)));
                }
                aliases.insert(key, use_statement.namespace.clone());
            }

            Statement::Language(_) => {}

            Statement::Query(query) => {
                for projection in &query.projections {
                    check_imported(&projection.namespace, &aliases)?;
                }
                for filter in &query.filters {
                    check_expression(filter, &aliases)?;
                }
            }
        }
    }

    Ok(aliases)
}

fn check_imported(namespace: &str, aliases: &AliasMap) -> PsqlResult<()> {
    if aliases.contains_key(namespace) {
        Ok(())
    } else {
        Err(PsqlError::Semantic(format!(
            "namespace not imported: {}",
            namespace
        )))
    }
}

fn check_expression(expression: &Expression, aliases: &AliasMap) -> PsqlResult<()> {
    match expression {
        Expression::Binary { left, right, .. } => {
            check_expression(left, aliases)?;
            check_expression(right, aliases)
        }
        Expression::Not(inner) => check_expression(inner, aliases),
        Expression::FunctionCall { namespace, .. } | Expression::FieldRef { namespace, .. } => {
            check_imported(namespace, aliases)
        }
    }
}
