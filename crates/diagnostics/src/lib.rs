//! Diagnostics for the ZPL label front end.
//!
//! Provides [`Diagnostic`], [`Severity`], and [`Position`] types used to report
//! lexical errors, syntax errors, and warnings from the tokenizer and parser.
//! Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants auto-generated from the diagnostics table.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── Position ─────────────────────────────────────────────────────────────

/// A location in the source text.
///
/// `line` and `column` are **1-indexed** and meant for display; `column`
/// counts characters, not bytes. `offset` is the 0-indexed byte offset from
/// the start of the source and is what tooling should slice with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column, in characters.
    pub column: usize,
    /// 0-indexed byte offset.
    pub offset: usize,
}

impl Position {
    /// Create a position from its parts.
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// The position of the first character of any source.
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ── Severity ─────────────────────────────────────────────────────────────

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Lexical or syntax error. Parsing still continues.
    Error,
    /// Informational warning; never affects the validity of produced nodes.
    Warn,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// A diagnostic message produced by the tokenizer or parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g., `"ZPL0102"`). See [`codes`].
    pub code: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Where in the source the problem was found.
    pub position: Position,
    /// Optional hint on how to fix the input. Only set on warnings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        code: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            position,
            suggestion: None,
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        code: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self::new(code, Severity::Error, message, position)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        code: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self::new(code, Severity::Warn, message, position)
    }

    /// Attach a fix-it suggestion (builder pattern).
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"command"`, `"expected"`, `"found"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Whether this diagnostic has [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.code)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}",
            self.severity, self.code, self.message, self.position
        )
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
///
/// Generated from `spec/diagnostics.json` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the severity a diagnostic code is emitted with, if the code is known.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}
