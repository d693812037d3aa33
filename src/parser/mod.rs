//! Parser for the PSQL query language.
//!
//! Recursive descent with one token of lookahead over the lexer. Parsing is
//! all-or-nothing: the first error aborts and propagates to the caller.

#[cfg(test)]
mod tests;

use crate::ast::{
    BinaryOperator, Expression, LanguageStatement, Program, Projection, Query, Statement,
    UseStatement,
};
use crate::error::{PsqlError, PsqlResult};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parser for PSQL programs
pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    /// Create a parser over an input string, priming the lookahead token.
    pub fn new(input: &str) -> PsqlResult<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> PsqlResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consume the current token if its kind is in `expected`, else fail with
    /// a rendered diagnostic.
    fn expect(&mut self, expected: &[TokenKind]) -> PsqlResult<Token> {
        if expected.contains(&self.current.kind) {
            let token = self.current.clone();
            self.advance()?;
            Ok(token)
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Parse error carrying the expected-kind set, the actual token, and the
    /// source line with a caret under the offending token.
    fn unexpected(&self, expected: &[TokenKind]) -> PsqlError {
        let (line, column) = self.lexer.context_line(self.current.start);
        let caret = format!("{}^", " ".repeat(column));
        PsqlError::Parse(format!(
            "expected one of {:?}, got {:?} ('{}')\n{}\n{}",
            expected, self.current.kind, self.current.text, line, caret
        ))
    }

    /// Parse a complete program: `statement*` until end of input.
    pub fn parse(&mut self) -> PsqlResult<Program> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::Eof) {
            let statement = match self.current.kind {
                TokenKind::Use => Statement::Use(self.parse_use()?),
                TokenKind::Lang => Statement::Language(self.parse_language()?),
                TokenKind::Query => Statement::Query(self.parse_query()?),
                _ => {
                    return Err(self.unexpected(&[
                        TokenKind::Use,
                        TokenKind::Lang,
                        TokenKind::Query,
                    ]));
                }
            };
            statements.push(statement);
        }

        Ok(Program { statements })
    }

    /// `use Identifier (as Identifier)? ';'`
    fn parse_use(&mut self) -> PsqlResult<UseStatement> {
        self.expect(&[TokenKind::Use])?;
        let namespace = self.expect(&[TokenKind::Identifier])?.text;
        let alias = self.parse_alias()?;
        self.expect(&[TokenKind::Semicolon])?;
        Ok(UseStatement { namespace, alias })
    }

    /// `lang Identifier ';'`
    fn parse_language(&mut self) -> PsqlResult<LanguageStatement> {
        self.expect(&[TokenKind::Lang])?;
        let code = self.expect(&[TokenKind::Identifier])?.text;
        self.expect(&[TokenKind::Semicolon])?;
        Ok(LanguageStatement { code })
    }

    /// `query Identifier projections (filter expression)* ';'`
    fn parse_query(&mut self) -> PsqlResult<Query> {
        self.expect(&[TokenKind::Query])?;
        let name = self.expect(&[TokenKind::Identifier])?.text;
        let projections = self.parse_projections()?;

        let mut filters = Vec::new();
        while self.check(TokenKind::Filter) {
            self.advance()?;
            filters.push(self.parse_expression()?);
        }

        self.expect(&[TokenKind::Semicolon])?;
        Ok(Query {
            name,
            projections,
            filters,
        })
    }

    /// Parse a projection list. Three surface forms normalize to one
    /// `Vec<Projection>`:
    /// - `ns::*` (wildcard, necessarily the sole projection)
    /// - `ns::{field [as alias], ...}`
    /// - `ns::field [as alias], ns2::field [as alias], ...`
    fn parse_projections(&mut self) -> PsqlResult<Vec<Projection>> {
        let namespace = self.expect(&[TokenKind::Namespace])?.text;
        self.expect(&[TokenKind::DoubleColon])?;

        match self.current.kind {
            TokenKind::Star => {
                self.advance()?;
                if self.check(TokenKind::Comma) {
                    return Err(PsqlError::Parse(
                        "a wildcard projection must be the only projection of its query"
                            .to_string(),
                    ));
                }
                Ok(vec![Projection {
                    namespace,
                    field: None,
                    alias: None,
                    wildcard: true,
                }])
            }

            TokenKind::LeftBrace => {
                self.advance()?;
                let mut projections = Vec::new();
                loop {
                    let field = self.expect(&[TokenKind::Identifier])?.text;
                    let alias = self.parse_alias()?;
                    projections.push(Projection {
                        namespace: namespace.clone(),
                        field: Some(field),
                        alias,
                        wildcard: false,
                    });
                    if self.check(TokenKind::Comma) {
                        self.advance()?;
                    } else {
                        break;
                    }
                }
                self.expect(&[TokenKind::RightBrace])?;
                Ok(projections)
            }

            TokenKind::Identifier => {
                let field = self.expect(&[TokenKind::Identifier])?.text;
                let alias = self.parse_alias()?;
                let mut projections = vec![Projection {
                    namespace,
                    field: Some(field),
                    alias,
                    wildcard: false,
                }];

                while self.check(TokenKind::Comma) {
                    self.advance()?;
                    let namespace = self.expect(&[TokenKind::Namespace])?.text;
                    self.expect(&[TokenKind::DoubleColon])?;
                    if self.check(TokenKind::Star) {
                        return Err(PsqlError::Parse(
                            "a wildcard projection must be the only projection of its query"
                                .to_string(),
                        ));
                    }
                    let field = self.expect(&[TokenKind::Identifier])?.text;
                    let alias = self.parse_alias()?;
                    projections.push(Projection {
                        namespace,
                        field: Some(field),
                        alias,
                        wildcard: false,
                    });
                }

                Ok(projections)
            }

            _ => Err(self.unexpected(&[
                TokenKind::Star,
                TokenKind::LeftBrace,
                TokenKind::Identifier,
            ])),
        }
    }

    /// Optional `as Identifier`.
    fn parse_alias(&mut self) -> PsqlResult<Option<String>> {
        if self.check(TokenKind::As) {
            self.advance()?;
            Ok(Some(self.expect(&[TokenKind::Identifier])?.text))
        } else {
            Ok(None)
        }
    }

    /// Parse a filter expression. Precedence, lowest to highest:
    /// `or` (left-assoc), `and` (left-assoc), primary.
    pub(crate) fn parse_expression(&mut self) -> PsqlResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PsqlResult<Expression> {
        let mut left = self.parse_and()?;

        while self.check(TokenKind::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expression::Binary {
                op: BinaryOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> PsqlResult<Expression> {
        let mut left = self.parse_primary()?;

        while self.check(TokenKind::And) {
            self.advance()?;
            let right = self.parse_primary()?;
            left = Expression::Binary {
                op: BinaryOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// A primary term: parenthesized expression, `not`-prefixed term, or a
    /// namespaced field reference with an optional function call.
    fn parse_primary(&mut self) -> PsqlResult<Expression> {
        match self.current.kind {
            TokenKind::LeftParen => {
                self.advance()?;
                let expression = self.parse_expression()?;
                self.expect(&[TokenKind::RightParen])?;
                Ok(expression)
            }

            TokenKind::Not => {
                self.advance()?;
                let inner = self.parse_primary()?;
                Ok(Expression::Not(Box::new(inner)))
            }

            TokenKind::Namespace => {
                let namespace = self.current.text.clone();
                self.advance()?;
                self.expect(&[TokenKind::DoubleColon])?;
                let field = self.expect(&[TokenKind::Identifier])?.text;

                if self.check(TokenKind::Dot) {
                    self.advance()?;
                    let function = self.expect(&[TokenKind::FunctionName])?.text;
                    self.expect(&[TokenKind::LeftParen])?;
                    let arguments = self.parse_arguments()?;
                    self.expect(&[TokenKind::RightParen])?;
                    Ok(Expression::FunctionCall {
                        namespace,
                        field,
                        function,
                        arguments,
                    })
                } else {
                    Ok(Expression::FieldRef { namespace, field })
                }
            }

            _ => Err(self.unexpected(&[
                TokenKind::LeftParen,
                TokenKind::Not,
                TokenKind::Namespace,
            ])),
        }
    }

    /// Comma list of literal argument terminals, possibly empty.
    fn parse_arguments(&mut self) -> PsqlResult<Vec<Token>> {
        let mut arguments = Vec::new();

        if self.check(TokenKind::RightParen) {
            return Ok(arguments);
        }

        loop {
            let token = self.expect(&[
                TokenKind::Number,
                TokenKind::StringLiteral,
                TokenKind::True,
                TokenKind::False,
            ])?;
            arguments.push(token);

            if self.check(TokenKind::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }

        Ok(arguments)
    }
}

/// Parse a PSQL program string into an AST
pub fn parse(input: &str) -> PsqlResult<Program> {
    let mut parser = Parser::new(input)?;
    parser.parse()
}
