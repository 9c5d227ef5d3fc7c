//! Shared test helpers for `zpl_label_core` integration tests.

#![allow(unreachable_pub)]

use zpl_label_core::{Command, Document, TokenKind, tokenize};

/// Command codes in document order.
#[allow(dead_code)]
pub fn codes(doc: &Document) -> Vec<&str> {
    doc.commands.iter().map(|c| c.code.as_str()).collect()
}

/// Kind names (`"label-start"`, `"field-data"`, ...) in document order.
#[allow(dead_code)]
pub fn kinds(doc: &Document) -> Vec<&'static str> {
    doc.commands.iter().map(Command::kind_name).collect()
}

/// Diagnostic codes of all recorded errors.
#[allow(dead_code)]
pub fn error_codes(doc: &Document) -> Vec<String> {
    doc.metadata
        .errors
        .iter()
        .map(|d| d.code.to_string())
        .collect()
}

/// Diagnostic codes of all recorded warnings.
#[allow(dead_code)]
pub fn warning_codes(doc: &Document) -> Vec<String> {
    doc.metadata
        .warnings
        .iter()
        .map(|d| d.code.to_string())
        .collect()
}

/// Token kinds of `input`, in order.
#[allow(dead_code)]
pub fn token_kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).tokens.iter().map(|t| t.kind).collect()
}

/// Assert that a document has no errors, printing them otherwise.
#[allow(dead_code)]
pub fn assert_clean(doc: &Document) {
    assert!(
        doc.metadata.errors.is_empty(),
        "expected no errors, got: {:#?}",
        doc.metadata.errors
    );
}

/// The single command with `code`, panicking if there is not exactly one.
#[allow(dead_code)]
pub fn only<'a>(doc: &'a Document, code: &str) -> &'a Command {
    let mut found = doc.commands.iter().filter(|c| c.code == code);
    let cmd = found
        .next()
        .unwrap_or_else(|| panic!("no ^{code} in {:?}", codes(doc)));
    assert!(found.next().is_none(), "more than one ^{code}");
    cmd
}
