//! ZPL label front end: tokenizer and parser.
//!
//! Turns ZPL (Zebra Programming Language) label source into a [`Document`]:
//! a list of typed commands plus diagnostics. The main entry points are
//! [`parse_str`] for parsing with the built-in command set, [`Parser`] for a
//! custom command set or settings, and [`tokenize`] for the raw token stream.
//!
//! Parsing never fails. Malformed input is reported in
//! [`Metadata::errors`](grammar::ast::Metadata::errors) and the parser
//! resumes at the next line or command.

#![warn(missing_docs)]

/// ZPL grammar: lexer, parser, command rules, AST, and related utilities.
pub mod grammar;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Lexer
pub use grammar::lexer::{LexerConfig, Token, TokenKind, TokenStream, tokenize, tokenize_with_config};

// Parser
pub use grammar::context::{CommandHead, ParseContext, ParseError};
pub use grammar::parser::{Parser, ParserConfig, parse_str};
pub use grammar::rules::{CommandRule, Registry};

// AST
pub use grammar::ast::{Command, CommandKind, Document, LineColor, Metadata, Orientation};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, Position, Severity, codes};

// Serialization helpers
pub use grammar::dump::{to_pretty_json, tokens_to_pretty_json};
