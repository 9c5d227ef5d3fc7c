use super::{
    ast::{Command, CommandKind},
    diag::{Diagnostic, Position, codes},
    lexer::{Token, TokenKind, TokenStream},
};

/// A structural failure inside a command grammar.
///
/// Returned by [`ParseContext::expect`] when the required token is absent.
/// The parser records it as a syntax error and synchronizes; it never
/// reaches the caller of `parse`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A different token was found where `expected` was required.
    #[error("expected {expected}, found {found} '{text}'")]
    UnexpectedToken {
        /// The token kind the grammar required.
        expected: TokenKind,
        /// The token kind actually found.
        found: TokenKind,
        /// Source text of the found token.
        text: String,
        /// Location of the found token.
        position: Position,
    },
    /// Input ended where `expected` was required.
    #[error("expected {expected}, found end of input")]
    UnexpectedEnd {
        /// The token kind the grammar required.
        expected: TokenKind,
        /// Location of the end of input.
        position: Position,
    },
}

impl ParseError {
    /// Where the failure was detected.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEnd { position, .. } => *position,
        }
    }

    /// Convert into the syntax diagnostic recorded by the parser.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let expected = match self {
            ParseError::UnexpectedToken { expected, .. }
            | ParseError::UnexpectedEnd { expected, .. } => expected.to_string(),
        };
        Diagnostic::error(
            codes::SYNTAX_UNEXPECTED_TOKEN,
            self.to_string(),
            self.position(),
        )
        .with_context(ctx!("expected" => expected))
    }
}

/// Marker and code of a command being parsed.
#[derive(Debug, Clone, Copy)]
pub struct CommandHead<'src> {
    /// Command code without marker.
    pub code: &'src str,
    /// Location of the marker.
    pub position: Position,
}

/// Per-call parse state: the token stream, a cursor into it, and the
/// diagnostics gathered so far.
///
/// A fresh context is built for every parse, so nothing carries over
/// between calls. Grammar rules receive it mutably and move the cursor
/// through the tokens they consume.
#[derive(Debug)]
pub struct ParseContext<'src> {
    source: &'src str,
    tokens: Vec<Token<'src>>,
    cursor: usize,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl<'src> ParseContext<'src> {
    /// Start a parse over `stream`, seeding the errors with its lexical errors.
    pub fn new(source: &'src str, stream: TokenStream<'src>) -> Self {
        let mut tokens = stream.tokens;
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfStream) {
            let position = tokens.last().map_or_else(Position::start, |t| {
                Position::new(
                    t.position.line,
                    t.position.column + t.raw.chars().count(),
                    t.end(),
                )
            });
            tokens.push(Token {
                kind: TokenKind::EndOfStream,
                value: "",
                position,
                raw: "",
            });
        }
        Self {
            source,
            tokens,
            cursor: 0,
            errors: stream.errors,
            warnings: Vec::new(),
        }
    }

    // ── Token navigation ────────────────────────────────────────────────

    /// The token at the cursor. At the end this is the end-of-stream token.
    pub fn peek(&self) -> &Token<'src> {
        self.peek_nth(0)
    }

    /// The token `n` positions after the cursor, clamped to end-of-stream.
    pub fn peek_nth(&self, n: usize) -> &Token<'src> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.cursor + n).min(last)]
    }

    /// Whether the cursor is on the end-of-stream token.
    pub fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfStream
    }

    /// Whether the token at the cursor has the given kind.
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the token at the cursor. The cursor never moves past
    /// end-of-stream.
    pub fn advance(&mut self) -> Token<'src> {
        let tok = *self.peek();
        if tok.kind != TokenKind::EndOfStream {
            self.cursor += 1;
        }
        tok
    }

    /// Consume the token at the cursor if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token<'src>> {
        self.check(kind).then(|| self.advance())
    }

    /// Consume a token of the given kind or fail without moving the cursor.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = *self.peek();
        Err(if found.kind == TokenKind::EndOfStream {
            ParseError::UnexpectedEnd {
                expected: kind,
                position: found.position,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: kind,
                found: found.kind,
                text: found.raw.to_owned(),
                position: found.position,
            }
        })
    }

    /// Whether a command (marker followed by code) starts at the cursor.
    pub fn at_command(&self) -> bool {
        self.check(TokenKind::CommandMarker) && self.peek_nth(1).kind == TokenKind::CommandCode
    }

    /// Code of the command starting at the cursor, if any.
    pub fn command_code(&self) -> Option<&'src str> {
        self.at_command().then(|| self.peek_nth(1).value)
    }

    /// Consume the marker and code of the command at the cursor.
    pub fn begin_command(&mut self) -> Result<CommandHead<'src>, ParseError> {
        let marker = self.expect(TokenKind::CommandMarker)?;
        let code = self.expect(TokenKind::CommandCode)?;
        Ok(CommandHead {
            code: code.value,
            position: marker.position,
        })
    }

    /// Consume consecutive parameter tokens.
    pub fn take_parameters(&mut self) -> Vec<Token<'src>> {
        let mut params = Vec::new();
        while let Some(tok) = self.eat(TokenKind::Parameter) {
            params.push(tok);
        }
        params
    }

    /// If the next command, skipping line breaks, has the given code,
    /// consume its marker and code and return its head.
    ///
    /// The cursor does not move when there is no match.
    pub fn eat_command(&mut self, code: &str) -> Option<CommandHead<'src>> {
        let mut idx = self.cursor;
        while self.tokens[idx].kind == TokenKind::Newline {
            idx += 1;
        }
        let marker = self.tokens[idx];
        let code_tok = self.tokens.get(idx + 1)?;
        if marker.kind != TokenKind::CommandMarker
            || code_tok.kind != TokenKind::CommandCode
            || code_tok.value != code
        {
            return None;
        }
        let head = CommandHead {
            code: code_tok.value,
            position: marker.position,
        };
        self.cursor = idx + 2;
        Some(head)
    }

    /// Skip past a structural failure: advance one token, then stop at the
    /// next line break or command marker.
    pub fn synchronize(&mut self) {
        self.advance();
        while !self.at_end()
            && !self.check(TokenKind::Newline)
            && !self.check(TokenKind::CommandMarker)
        {
            self.advance();
        }
    }

    // ── Node assembly ───────────────────────────────────────────────────

    /// Byte offset just past the last consumed token.
    fn consumed_end(&self) -> usize {
        self.cursor
            .checked_sub(1)
            .map_or(0, |idx| self.tokens[idx].end())
    }

    /// Build the node for `head`, taking its raw text from the marker up to
    /// the last consumed token. The raw text is empty when the token offsets
    /// do not fit the source.
    pub fn finish(
        &self,
        head: CommandHead<'src>,
        parameters: &[Token<'src>],
        kind: CommandKind,
    ) -> Command {
        let start = head.position.offset;
        let end = self.consumed_end().max(start);
        Command {
            code: head.code.to_owned(),
            raw_text: self.source.get(start..end).unwrap_or_default().to_owned(),
            position: head.position,
            parameters: parameters.iter().map(|t| t.value.to_owned()).collect(),
            kind,
        }
    }

    // ── Diagnostics ─────────────────────────────────────────────────────

    /// Record an error.
    pub fn error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    /// Record a warning.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }

    /// Errors recorded so far (lexical errors first).
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Hand over the collected `(errors, warnings)`.
    pub(crate) fn into_diagnostics(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings)
    }
}
