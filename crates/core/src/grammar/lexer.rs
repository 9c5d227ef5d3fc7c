use serde::Serialize;

use super::diag::{Diagnostic, Position, codes};

/// Classification of a ZPL lexer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// Command marker character (`^` by default).
    CommandMarker,
    /// Command code directly after a marker (e.g. `FO`, `B3`, `A`).
    CommandCode,
    /// One positional parameter of a command.
    Parameter,
    /// Verbatim field content after `^FD`/`^FV`, up to the end of the line.
    StringContent,
    /// A `//` line comment or `/* */` block comment.
    Comment,
    /// A line break (`\n`, `\r\n`, or a lone `\r`).
    Newline,
    /// End of input. Always the last token, and only once.
    EndOfStream,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::CommandMarker => "command marker",
            TokenKind::CommandCode => "command code",
            TokenKind::Parameter => "parameter",
            TokenKind::StringContent => "field content",
            TokenKind::Comment => "comment",
            TokenKind::Newline => "line break",
            TokenKind::EndOfStream => "end of input",
        })
    }
}

/// A token that borrows its text directly from the source input.
///
/// `raw` is always the exact source slice starting at `position.offset`.
/// `value` is the meaningful text: for comments it excludes the `//`, `/*`
/// and `*/` delimiters, for newlines it is always `"\n"`, and for every other
/// kind it equals `raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokenKind,
    /// Semantic text of the token.
    pub value: &'a str,
    /// Location of the token's first character.
    pub position: Position,
    /// Exact source text of the token.
    pub raw: &'a str,
}

impl Token<'_> {
    /// Byte offset one past the token's last character.
    pub fn end(&self) -> usize {
        self.position.offset + self.raw.len()
    }
}

/// Output of [`tokenize`]: the token stream plus any lexical errors.
#[derive(Debug, Clone, Serialize)]
pub struct TokenStream<'a> {
    /// Tokens in source order, terminated by exactly one
    /// [`TokenKind::EndOfStream`].
    pub tokens: Vec<Token<'a>>,
    /// Lexical errors, in source order.
    pub errors: Vec<Diagnostic>,
}

/// Lexical settings: which character introduces a command and which one
/// separates parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    /// Command marker (default `^`).
    pub command_prefix: char,
    /// Parameter delimiter (default `,`).
    pub delimiter: char,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            command_prefix: '^',
            delimiter: ',',
        }
    }
}

/// Codes whose remaining line, up to the next marker, is field content
/// rather than a parameter list.
const FIELD_CONTENT_CODES: [&str; 2] = ["FD", "FV"];

/// Tokenize ZPL input with the default marker (`^`) and delimiter (`,`).
///
/// Never fails: unscannable input is recorded in [`TokenStream::errors`] and
/// skipped. Runs in time linear in the input length.
pub fn tokenize(input: &str) -> TokenStream<'_> {
    tokenize_with_config(input, &LexerConfig::default())
}

/// Tokenize ZPL input with a custom command marker and delimiter.
pub fn tokenize_with_config<'a>(input: &'a str, config: &LexerConfig) -> TokenStream<'a> {
    Scanner::new(input, *config).run()
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '@'
}

struct Scanner<'a> {
    input: &'a str,
    config: LexerConfig,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token<'a>>,
    errors: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, config: LexerConfig) -> Self {
        Self {
            input,
            config,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    // ── Character navigation ────────────────────────────────────────────

    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    /// Consume one character, keeping line/column in step.
    ///
    /// `\r\n` counts as a single line break: the `\r` advances the column and
    /// the `\n` starts the new line.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        let line_break = c == '\n' || (c == '\r' && self.peek() != Some('\n'));
        if line_break {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn is_newline(c: char) -> bool {
        c == '\n' || c == '\r'
    }

    fn at_comment_start(&self) -> bool {
        self.peek() == Some('/') && matches!(self.peek_nth(1), Some('/' | '*'))
    }

    fn push(&mut self, kind: TokenKind, start: Position, value: &'a str) {
        let raw = &self.input[start.offset..self.offset];
        self.tokens.push(Token {
            kind,
            value,
            position: start,
            raw,
        });
    }

    fn push_raw(&mut self, kind: TokenKind, start: Position) {
        let raw = &self.input[start.offset..self.offset];
        self.push(kind, start, raw);
    }

    // ── Top-level loop ──────────────────────────────────────────────────

    fn run(mut self) -> TokenStream<'a> {
        while let Some(c) = self.peek() {
            if c == self.config.command_prefix {
                self.scan_command();
            } else if Self::is_newline(c) {
                self.scan_newline();
            } else if self.at_comment_start() {
                self.scan_comment();
            } else if c.is_whitespace() {
                self.bump();
            } else {
                self.scan_unexpected();
            }
        }

        let end = self.position();
        self.push(TokenKind::EndOfStream, end, "");
        TokenStream {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn scan_newline(&mut self) {
        let start = self.position();
        if self.bump() == Some('\r') && self.peek() == Some('\n') {
            self.bump();
        }
        self.push(TokenKind::Newline, start, "\n");
    }

    /// Skip one character that no rule accepts and report it.
    fn scan_unexpected(&mut self) {
        let start = self.position();
        let Some(c) = self.bump() else {
            return;
        };
        self.errors.push(
            Diagnostic::error(
                codes::LEXER_UNEXPECTED_CHARACTER,
                format!("unexpected character '{c}' outside of a command"),
                start,
            )
            .with_context(ctx!("found" => c.to_string())),
        );
    }

    // ── Comments ────────────────────────────────────────────────────────

    fn scan_comment(&mut self) {
        let start = self.position();
        self.bump();
        if self.bump() == Some('/') {
            let body_start = self.offset;
            while let Some(c) = self.peek() {
                if Self::is_newline(c) {
                    break;
                }
                self.bump();
            }
            let body = &self.input[body_start..self.offset];
            self.push(TokenKind::Comment, start, body);
            return;
        }

        // Block comment: "/*" has been consumed.
        let body_start = self.offset;
        match self.rest().find("*/") {
            Some(rel) => {
                let body_end = body_start + rel;
                while self.offset < body_end + 2 {
                    self.bump();
                }
                let body = &self.input[body_start..body_end];
                self.push(TokenKind::Comment, start, body);
            }
            None => {
                while self.bump().is_some() {}
                let body = &self.input[body_start..];
                self.push(TokenKind::Comment, start, body);
                self.errors.push(
                    Diagnostic::error(
                        codes::LEXER_UNTERMINATED_COMMENT,
                        "block comment is not closed before end of input",
                        start,
                    )
                    .with_context(ctx!("expected" => "*/")),
                );
            }
        }
    }

    // ── Commands ────────────────────────────────────────────────────────

    fn scan_command(&mut self) {
        let marker = self.position();
        self.bump();
        self.push_raw(TokenKind::CommandMarker, marker);

        let len = self.code_length();
        if len == 0 {
            let found = self
                .peek()
                .map_or_else(|| "end of input".to_owned(), |c| format!("'{c}'"));
            self.errors.push(
                Diagnostic::error(
                    codes::LEXER_MISSING_COMMAND_CODE,
                    format!(
                        "expected command code after '{}', found {found}",
                        self.config.command_prefix
                    ),
                    marker,
                )
                .with_context(ctx!("found" => found)),
            );
            return;
        }

        let code_start = self.position();
        for _ in 0..len {
            self.bump();
        }
        self.push_raw(TokenKind::CommandCode, code_start);

        let code = &self.input[code_start.offset..self.offset];
        if FIELD_CONTENT_CODES.contains(&code) {
            self.scan_field_content();
        } else {
            self.scan_parameters();
        }
    }

    /// Number of characters forming the command code at the cursor.
    ///
    /// Codes are at most two characters; longer runs belong to the first
    /// parameter (`^FO50` is `FO` + `50`). `A` takes its font name directly
    /// after it, so `^ADN` is `A` + `DN`, while `^A@` stays a two-character code.
    fn code_length(&self) -> usize {
        match (self.peek(), self.peek_nth(1)) {
            (Some(first), _) if !is_code_char(first) => 0,
            (None, _) => 0,
            (Some('A'), Some('@')) => 2,
            (Some('A'), _) => 1,
            (Some(_), Some(second)) if is_code_char(second) => 2,
            (Some(_), _) => 1,
        }
    }

    /// Split the rest of the line into parameter tokens.
    fn scan_parameters(&mut self) {
        while let Some(c) = self.peek() {
            if c == self.config.command_prefix || Self::is_newline(c) {
                break;
            }
            if c == self.config.delimiter || c.is_whitespace() {
                self.bump();
                continue;
            }
            let start = self.position();
            while let Some(c) = self.peek() {
                if c == self.config.command_prefix
                    || c == self.config.delimiter
                    || Self::is_newline(c)
                    || c.is_whitespace()
                {
                    break;
                }
                self.bump();
            }
            self.push_raw(TokenKind::Parameter, start);
        }
    }

    /// Take the rest of the line, up to the next marker, as one content token.
    ///
    /// Trailing whitespace is left for the top-level loop.
    fn scan_field_content(&mut self) {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c == self.config.command_prefix || Self::is_newline(c))
            .unwrap_or(rest.len());
        let content = rest[..end].trim_end();
        if content.is_empty() {
            return;
        }
        let start = self.position();
        let stop = self.offset + content.len();
        while self.offset < stop {
            self.bump();
        }
        self.push_raw(TokenKind::StringContent, start);
    }
}
