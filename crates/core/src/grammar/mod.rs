/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// ZPL abstract syntax tree types.
pub mod ast;
/// Per-parse cursor, token consumption, and structural errors.
pub mod context;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for documents and token streams.
pub mod dump;
/// ZPL lexer: tokenizes raw input into a stream of borrowed tokens.
pub mod lexer;
/// ZPL parser: drives the command grammars over the token stream.
pub mod parser;
/// Command grammars and the registry mapping codes to them.
pub mod rules;
