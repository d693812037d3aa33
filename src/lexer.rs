//! Lexer for the PSQL query language.
//!
//! Produces a lazy stream of classified tokens with source offsets. The
//! stream is replayable: `advance_to` rewinds the cursor to an absolute
//! offset and re-lexing from there yields the same tokens again.

use crate::error::{PsqlError, PsqlResult};

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords (case-insensitive in source)
    Use,
    As,
    Filter,
    Map,
    Query,
    Lang,
    And,
    Or,
    Not,
    True,
    False,

    // Identifiers and literals
    Identifier,
    /// Identifier immediately followed by `::`
    Namespace,
    /// Identifier immediately followed by `(`
    FunctionName,
    Number,
    StringLiteral,

    // Operators
    Ampersand,     // &
    DoubleAmp,     // &&
    Pipe,          // |
    DoublePipe,    // ||
    LessThan,      // <
    LessThanEq,    // <=
    LeftShift,     // <<
    Diamond,       // <>
    GreaterThan,   // >
    GreaterThanEq, // >=
    RightShift,    // >>
    Equal,         // ==
    DoubleColon,   // ::

    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }
    Star,         // *
    Comma,        // ,
    Dot,          // .
    Semicolon,    // ;

    // Special
    Eof,
}

/// A classified source token. Immutable; offsets are char positions into the
/// source, `end` exclusive. For string literals `text` is the content between
/// the quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Reset the cursor to an absolute offset. Tokens produced after a rewind
    /// are identical to the ones produced on the first pass.
    pub fn advance_to(&mut self, offset: usize) {
        self.position = offset;
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn make(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.text_from(start),
            start,
            end: self.position,
        }
    }

    /// Single-character token.
    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        self.advance();
        self.make(kind, start)
    }

    /// Two-character token when the next char matches, else the one-char kind.
    fn one_or_two(&mut self, two: char, double: TokenKind, single: TokenKind, start: usize) -> Token {
        self.advance();
        if self.current_char() == Some(two) {
            self.advance();
            self.make(double, start)
        } else {
            self.make(single, start)
        }
    }

    fn read_number(&mut self, start: usize) -> Token {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        self.make(TokenKind::Number, start)
    }

    fn read_string(&mut self, start: usize) -> PsqlResult<Token> {
        self.advance(); // skip opening quote

        let content_start = self.position;
        while let Some(ch) = self.current_char() {
            if ch == '"' {
                let text = self.text_from(content_start);
                self.advance(); // skip closing quote
                return Ok(Token {
                    kind: TokenKind::StringLiteral,
                    text,
                    start,
                    end: self.position,
                });
            }
            self.advance();
        }

        Err(PsqlError::Lex {
            character: '"',
            offset: start,
        })
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text_from(start);

        // Reclassification, in priority order: namespace, function name,
        // keyword, plain identifier.
        let kind = if self.current_char() == Some(':') && self.peek_char() == Some(':') {
            TokenKind::Namespace
        } else if self.current_char() == Some('(') {
            TokenKind::FunctionName
        } else {
            match text.to_lowercase().as_str() {
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                "use" => TokenKind::Use,
                "as" => TokenKind::As,
                "filter" => TokenKind::Filter,
                "map" => TokenKind::Map,
                "query" => TokenKind::Query,
                "lang" => TokenKind::Lang,
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                _ => TokenKind::Identifier,
            }
        };

        Token {
            kind,
            text,
            start,
            end: self.position,
        }
    }

    /// Return the next token without consuming it.
    pub fn peek_next_token(&mut self) -> PsqlResult<Token> {
        let saved = self.position;
        let token = self.next_token();
        self.position = saved;
        token
    }

    /// Advance and return the next token, or an `Eof` token at end of input.
    pub fn next_token(&mut self) -> PsqlResult<Token> {
        self.skip_whitespace();

        let start = self.position;
        let token = match self.current_char() {
            None => Token {
                kind: TokenKind::Eof,
                text: String::new(),
                start,
                end: start,
            },

            Some('(') => self.single(TokenKind::LeftParen, start),
            Some(')') => self.single(TokenKind::RightParen, start),
            Some('[') => self.single(TokenKind::LeftBracket, start),
            Some(']') => self.single(TokenKind::RightBracket, start),
            Some('{') => self.single(TokenKind::LeftBrace, start),
            Some('}') => self.single(TokenKind::RightBrace, start),
            Some('*') => self.single(TokenKind::Star, start),
            Some(',') => self.single(TokenKind::Comma, start),
            Some('.') => self.single(TokenKind::Dot, start),
            Some(';') => self.single(TokenKind::Semicolon, start),

            Some('&') => self.one_or_two('&', TokenKind::DoubleAmp, TokenKind::Ampersand, start),
            Some('|') => self.one_or_two('|', TokenKind::DoublePipe, TokenKind::Pipe, start),

            Some('<') => {
                self.advance();
                match self.current_char() {
                    Some('<') => {
                        self.advance();
                        self.make(TokenKind::LeftShift, start)
                    }
                    Some('=') => {
                        self.advance();
                        self.make(TokenKind::LessThanEq, start)
                    }
                    Some('>') => {
                        self.advance();
                        self.make(TokenKind::Diamond, start)
                    }
                    _ => self.make(TokenKind::LessThan, start),
                }
            }

            Some('>') => {
                self.advance();
                match self.current_char() {
                    Some('>') => {
                        self.advance();
                        self.make(TokenKind::RightShift, start)
                    }
                    Some('=') => {
                        self.advance();
                        self.make(TokenKind::GreaterThanEq, start)
                    }
                    _ => self.make(TokenKind::GreaterThan, start),
                }
            }

            Some('=') => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    self.advance();
                    self.make(TokenKind::Equal, start)
                } else {
                    return Err(PsqlError::Lex {
                        character: '=',
                        offset: start,
                    });
                }
            }

            Some(':') => {
                if self.peek_char() == Some(':') {
                    self.advance();
                    self.advance();
                    self.make(TokenKind::DoubleColon, start)
                } else {
                    return Err(PsqlError::Lex {
                        character: ':',
                        offset: start,
                    });
                }
            }

            Some('"') => return self.read_string(start),

            Some(ch) if ch.is_ascii_digit() => self.read_number(start),

            Some(ch) if ch.is_alphabetic() => self.read_identifier(start),

            Some(ch) => {
                return Err(PsqlError::Lex {
                    character: ch,
                    offset: start,
                });
            }
        };

        Ok(token)
    }

    /// Lex the whole input into a token vector (trailing `Eof` included).
    pub fn tokenize(&mut self) -> PsqlResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    /// The source line containing `offset` plus the column of `offset` within
    /// it. Used for parse-error diagnostics.
    pub fn context_line(&self, offset: usize) -> (String, usize) {
        let offset = offset.min(self.input.len());

        let mut line_start = 0;
        for i in (0..offset).rev() {
            if self.input[i] == '\n' {
                line_start = i + 1;
                break;
            }
        }

        let mut line_end = self.input.len();
        for (i, ch) in self.input.iter().enumerate().skip(offset) {
            if *ch == '\n' {
                line_end = i;
                break;
            }
        }

        let line: String = self.input[line_start..line_end].iter().collect();
        (line, offset - line_start)
    }
}
