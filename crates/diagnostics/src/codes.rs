//! Diagnostic ID constants.
//!
//! Generated from `spec/diagnostics.json` at build time. Codes are grouped by
//! origin: `ZPL00xx` lexical, `ZPL01xx` syntax, `ZPL02xx` parser warnings.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
