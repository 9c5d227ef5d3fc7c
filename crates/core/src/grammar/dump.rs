use super::{ast::Document, lexer::TokenStream};

/// Serialize a document to a pretty-printed JSON string.
pub fn to_pretty_json(doc: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(doc)
}

/// Serialize a token stream (tokens and lexical errors) to pretty-printed JSON.
pub fn tokens_to_pretty_json(stream: &TokenStream<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(stream)
}
