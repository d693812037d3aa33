//! Query executor.
//!
//! Runs compiled queries against host-bound data sets: one linear scan per
//! query, in-line predicate evaluation, projection into JSON objects. The
//! bound collections are treated as read-only snapshots; nothing here
//! mutates them.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::analyzer::namespace::{analyze_namespaces, AliasMap};
use crate::analyzer::semantic::{analyze_semantics, Schema};
use crate::ast::Projection;
use crate::error::{PsqlError, PsqlResult};
use crate::functions::FunctionRegistry;
use crate::interpreter::{interpret, resolve_binding, InterpretedQuery};
use crate::parser;

/// Field-access capability a host record type must expose to participate in
/// filtering and projection. The engine is otherwise data-type agnostic.
pub trait Fielder {
    /// Field names, in the record's own order.
    fn field_names(&self) -> Vec<String>;

    /// The value of a field, if present.
    fn get_field(&self, name: &str) -> Option<Value>;

    fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }
}

/// JSON objects are records; any other JSON value exposes no fields.
impl Fielder for Value {
    fn field_names(&self) -> Vec<String> {
        match self {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(name)).cloned()
    }

    fn has_field(&self, name: &str) -> bool {
        self.as_object()
            .map(|map| map.contains_key(name))
            .unwrap_or(false)
    }
}

/// A namespace's bound data: the scannable records plus a dummy instance used
/// only to introspect field names and runtime types before any real row is
/// touched. Supplied by the host, never mutated by the engine.
pub struct NamespaceValues<F> {
    pub values: Vec<F>,
    pub dummy: F,
}

impl<F: Fielder> NamespaceValues<F> {
    pub fn new(values: Vec<F>, dummy: F) -> Self {
        Self { values, dummy }
    }
}

/// Run compiled queries against the bound data sets, returning one ordered
/// result list per query name. A query's scan target is its first
/// projection's namespace; an empty predicate list passes every record.
pub fn execute<F: Fielder + 'static>(
    queries: &[InterpretedQuery<F>],
    aliases: &AliasMap,
    bindings: &HashMap<String, NamespaceValues<F>>,
) -> PsqlResult<HashMap<String, Vec<Value>>> {
    let mut results = HashMap::new();

    for query in queries {
        let target = query.projections.first().ok_or_else(|| {
            PsqlError::Expression(format!("query '{}' has no projections", query.name))
        })?;
        let namespace_values = resolve_binding(&target.namespace, aliases, bindings)?;

        let mut rows = Vec::new();
        'scan: for record in &namespace_values.values {
            for predicate in &query.predicates {
                if !predicate(record) {
                    continue 'scan;
                }
            }
            rows.push(project(record, &query.projections));
        }

        tracing::debug!(
            "query '{}': {} of {} record(s) matched",
            query.name,
            rows.len(),
            namespace_values.values.len()
        );

        results.insert(query.name.clone(), rows);
    }

    Ok(results)
}

/// Build one projected output record. A wildcard copies every field under its
/// original name; a named projection copies the source value under its alias
/// if present, else the field name. An absent field projects as `null`.
fn project<F: Fielder>(record: &F, projections: &[Projection]) -> Value {
    let mut object = Map::new();

    for projection in projections {
        if projection.wildcard {
            for name in record.field_names() {
                if let Some(value) = record.get_field(&name) {
                    object.insert(name, value);
                }
            }
        } else if let Some(field) = &projection.field {
            let key = projection.alias.clone().unwrap_or_else(|| field.clone());
            object.insert(key, record.get_field(field).unwrap_or(Value::Null));
        }
    }

    Value::Object(object)
}

/// The host boundary: schema, function registry, and language configuration
/// bundled with a `run` entry point that drives the whole pipeline for one
/// source string.
pub struct Engine {
    available_namespaces: HashSet<String>,
    schema: Schema,
    registry: FunctionRegistry,
    allowed_languages: HashSet<String>,
    default_language: String,
}

impl Engine {
    /// Engine over a schema, with the standard function registry and English
    /// as the only allowed (and default) language.
    pub fn new(schema: Schema) -> Self {
        Self {
            available_namespaces: schema.keys().cloned().collect(),
            schema,
            registry: FunctionRegistry::standard(),
            allowed_languages: ["en".to_string()].into_iter().collect(),
            default_language: "en".to_string(),
        }
    }

    /// Replace the allowed language codes and the default.
    pub fn with_languages(mut self, allowed: &[&str], default: &str) -> Self {
        self.allowed_languages = allowed.iter().map(|s| s.to_string()).collect();
        self.default_language = default.to_string();
        self
    }

    /// Replace the function registry.
    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Lex, parse, analyze, interpret, and execute one PSQL program against
    /// the given bindings.
    pub fn run<F: Fielder + 'static>(
        &self,
        source: &str,
        bindings: &HashMap<String, NamespaceValues<F>>,
    ) -> PsqlResult<HashMap<String, Vec<Value>>> {
        let program = parser::parse(source)?;
        tracing::debug!("parsed program with {} statement(s)", program.statements.len());

        let aliases = analyze_namespaces(&program, &self.available_namespaces)?;
        analyze_semantics(
            &program,
            &aliases,
            &self.schema,
            &self.registry,
            &self.allowed_languages,
        )?;

        let queries = interpret(
            &program,
            &aliases,
            &self.registry,
            bindings,
            &self.default_language,
        )?;
        execute(&queries, &aliases, bindings)
    }
}
