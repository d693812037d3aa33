use super::parse;
use crate::ast::{BinaryOperator, Expression, Statement};
use crate::error::PsqlError;
use crate::lexer::TokenKind;

#[test]
fn test_empty_program() {
    let program = parse("").unwrap();
    assert!(program.statements.is_empty());
}

#[test]
fn test_use_without_alias() {
    let program = parse("use Pokemon;").unwrap();
    assert_eq!(program.statements.len(), 1);
    match &program.statements[0] {
        Statement::Use(u) => {
            assert_eq!(u.namespace, "Pokemon");
            assert_eq!(u.alias, None);
        }
        other => panic!("expected use statement, got {:?}", other),
    }
}

#[test]
fn test_use_with_alias() {
    let program = parse("use Pokemon as P;").unwrap();
    match &program.statements[0] {
        Statement::Use(u) => {
            assert_eq!(u.namespace, "Pokemon");
            assert_eq!(u.alias.as_deref(), Some("P"));
        }
        other => panic!("expected use statement, got {:?}", other),
    }
}

#[test]
fn test_language_statement() {
    let program = parse("lang en;").unwrap();
    match &program.statements[0] {
        Statement::Language(l) => assert_eq!(l.code, "en"),
        other => panic!("expected lang statement, got {:?}", other),
    }
}

#[test]
fn test_wildcard_query() {
    let program = parse("query all P::*;").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => {
            assert_eq!(q.name, "all");
            assert_eq!(q.projections.len(), 1);
            assert!(q.projections[0].wildcard);
            assert_eq!(q.projections[0].namespace, "P");
            assert_eq!(q.projections[0].field, None);
            assert!(q.filters.is_empty());
        }
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_brace_projection_list() {
    let program = parse("query short P::{name, hp as health};").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => {
            assert_eq!(q.projections.len(), 2);
            assert_eq!(q.projections[0].namespace, "P");
            assert_eq!(q.projections[0].field.as_deref(), Some("name"));
            assert_eq!(q.projections[0].alias, None);
            assert_eq!(q.projections[1].field.as_deref(), Some("hp"));
            assert_eq!(q.projections[1].alias.as_deref(), Some("health"));
            assert!(!q.projections[1].wildcard);
        }
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_top_level_projection_list_mixed_namespaces() {
    let program = parse("query q P::name as n, T::kind;").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => {
            assert_eq!(q.projections.len(), 2);
            assert_eq!(q.projections[0].namespace, "P");
            assert_eq!(q.projections[0].alias.as_deref(), Some("n"));
            assert_eq!(q.projections[1].namespace, "T");
            assert_eq!(q.projections[1].field.as_deref(), Some("kind"));
        }
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_wildcard_after_named_projection_is_an_error() {
    let result = parse("query q P::name, P::*;");
    assert!(matches!(result, Err(PsqlError::Parse(_))));
}

#[test]
fn test_named_projection_after_wildcard_is_an_error() {
    let result = parse("query q P::*, P::name;");
    assert!(matches!(result, Err(PsqlError::Parse(_))));
}

#[test]
fn test_filter_function_call() {
    let program = parse("query p P::{name} filter P::name.starts_with(\"Pika\");").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => {
            assert_eq!(q.filters.len(), 1);
            match &q.filters[0] {
                Expression::FunctionCall {
                    namespace,
                    field,
                    function,
                    arguments,
                } => {
                    assert_eq!(namespace, "P");
                    assert_eq!(field, "name");
                    assert_eq!(function, "starts_with");
                    assert_eq!(arguments.len(), 1);
                    assert_eq!(arguments[0].kind, TokenKind::StringLiteral);
                    assert_eq!(arguments[0].text, "Pika");
                }
                other => panic!("expected function call, got {:?}", other),
            }
        }
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_filter_and_or_precedence() {
    // a or b and c parses as a or (b and c)
    let program =
        parse("query q P::{x} filter P::a.gt(1) or P::b.gt(2) and P::c.gt(3);").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => match &q.filters[0] {
            Expression::Binary { op, right, .. } => {
                assert_eq!(*op, BinaryOperator::Or);
                assert!(matches!(
                    right.as_ref(),
                    Expression::Binary {
                        op: BinaryOperator::And,
                        ..
                    }
                ));
            }
            other => panic!("expected binary expression, got {:?}", other),
        },
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_parenthesized_expression() {
    // (a or b) and c keeps the or on the left
    let program =
        parse("query q P::{x} filter (P::a.gt(1) or P::b.gt(2)) and P::c.gt(3);").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => match &q.filters[0] {
            Expression::Binary { op, left, .. } => {
                assert_eq!(*op, BinaryOperator::And);
                assert!(matches!(
                    left.as_ref(),
                    Expression::Binary {
                        op: BinaryOperator::Or,
                        ..
                    }
                ));
            }
            other => panic!("expected binary expression, got {:?}", other),
        },
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_not_expression() {
    let program = parse("query q P::{x} filter not P::a.gt(1);").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => {
            assert!(matches!(&q.filters[0], Expression::Not(_)));
        }
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_bare_field_reference_filter() {
    let program = parse("query q P::{x} filter P::shiny;").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => match &q.filters[0] {
            Expression::FieldRef { namespace, field } => {
                assert_eq!(namespace, "P");
                assert_eq!(field, "shiny");
            }
            other => panic!("expected field reference, got {:?}", other),
        },
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_repeated_filter_clauses() {
    let program = parse("query q P::{x} filter P::a.gt(1) filter P::b.gt(2);").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => assert_eq!(q.filters.len(), 2),
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_multiple_arguments() {
    let program = parse("query q P::{x} filter P::hp.between(10, 90);").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => match &q.filters[0] {
            Expression::FunctionCall { arguments, .. } => {
                assert_eq!(arguments.len(), 2);
                assert_eq!(arguments[0].text, "10");
                assert_eq!(arguments[1].text, "90");
            }
            other => panic!("expected function call, got {:?}", other),
        },
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_boolean_literal_argument() {
    let program = parse("query q P::{x} filter P::shiny.is(true);").unwrap();
    match &program.statements[0] {
        Statement::Query(q) => match &q.filters[0] {
            Expression::FunctionCall { arguments, .. } => {
                assert_eq!(arguments[0].kind, TokenKind::True);
            }
            other => panic!("expected function call, got {:?}", other),
        },
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_four_statement_program() {
    let program = parse(
        "use orig as alias; lang de; query all a::*; query filtered a::* filter a::name.lt(1);",
    )
    .unwrap();
    assert_eq!(program.statements.len(), 4);

    match &program.statements[0] {
        Statement::Use(u) => {
            assert_eq!(u.namespace, "orig");
            assert_eq!(u.alias.as_deref(), Some("alias"));
        }
        other => panic!("expected use statement, got {:?}", other),
    }

    match &program.statements[2] {
        Statement::Query(q) => {
            assert_eq!(q.projections.len(), 1);
            assert!(q.filters.is_empty());
        }
        other => panic!("expected query, got {:?}", other),
    }

    match &program.statements[3] {
        Statement::Query(q) => {
            assert_eq!(q.projections.len(), 1);
            assert_eq!(q.filters.len(), 1);
        }
        other => panic!("expected query, got {:?}", other),
    }
}

#[test]
fn test_missing_semicolon() {
    let result = parse("use Pokemon");
    assert!(matches!(result, Err(PsqlError::Parse(_))));
}

#[test]
fn test_unexpected_top_level_token() {
    let result = parse("select * from x;");
    assert!(matches!(result, Err(PsqlError::Parse(_))));
}

#[test]
fn test_parse_error_renders_line_and_caret() {
    let err = parse("query q P::name,, T::kind;").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("query q P::name,, T::kind;"));
    assert!(message.contains('^'));
}

#[test]
fn test_non_literal_argument_is_an_error() {
    let result = parse("query q P::{x} filter P::name.eq(name);");
    assert!(matches!(result, Err(PsqlError::Parse(_))));
}

#[test]
fn test_lex_error_propagates() {
    let result = parse("query q P::{x} filter P::hp = 5;");
    assert!(matches!(result, Err(PsqlError::Lex { .. })));
}
