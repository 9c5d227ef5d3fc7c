use std::sync::LazyLock;

use super::{
    ast::{Command, CommandKind, Document, Metadata},
    context::ParseContext,
    lexer::{LexerConfig, tokenize_with_config},
    rules::{self, Registry},
};

/// Padding added to the largest field-origin x to derive a label width.
pub const DEFAULT_LABEL_WIDTH_PADDING: i32 = 100;

/// Settings for a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Command marker and parameter delimiter.
    pub lexer: LexerConfig,
    /// Added to the largest field-origin x for
    /// [`Metadata::derived_label_width`].
    pub label_width_padding: i32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lexer: LexerConfig::default(),
            label_width_padding: DEFAULT_LABEL_WIDTH_PADDING,
        }
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

static DEFAULT_PARSER: LazyLock<Parser> = LazyLock::new(Parser::new);

/// Parse a ZPL input string with the built-in command set.
pub fn parse_str(input: &str) -> Document {
    DEFAULT_PARSER.parse(input)
}

/// A reusable parser: a command registry plus settings.
///
/// Holds no per-parse state, so one parser can serve any number of calls,
/// including concurrent ones.
#[derive(Debug, Default)]
pub struct Parser {
    registry: Registry,
    config: ParserConfig,
}

impl Parser {
    /// Parser with the built-in command set and default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with the built-in command set and custom settings.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            registry: Registry::builtin(),
            config,
        }
    }

    /// Parser with a custom command set and default settings.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            config: ParserConfig::default(),
        }
    }

    /// The command set in use.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The settings in use.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `input` into a [`Document`].
    ///
    /// Never fails: lexical and syntax problems end up in
    /// [`Metadata::errors`], unsupported commands in [`Metadata::warnings`],
    /// and parsing continues after each of them.
    pub fn parse(&self, input: &str) -> Document {
        let stream = tokenize_with_config(input, &self.config.lexer);
        let mut ctx = ParseContext::new(input, stream);
        let mut commands = Vec::new();

        while !ctx.at_end() {
            let Some(code) = ctx.command_code() else {
                ctx.advance();
                continue;
            };
            let result = match self.registry.get(code) {
                Some(rule) => rule.parse(&mut ctx),
                None => rules::unsupported(&mut ctx, &self.registry),
            };
            match result {
                Ok(command) => commands.push(command),
                Err(err) => {
                    ctx.error(err.to_diagnostic());
                    ctx.synchronize();
                }
            }
        }

        let (errors, warnings) = ctx.into_diagnostics();
        let metadata = Metadata {
            source_text: input.to_owned(),
            errors,
            warnings,
            derived_label_width: derived_label_width(&commands, self.config.label_width_padding),
            derived_label_length: derived_label_length(&commands),
        };
        Document { commands, metadata }
    }
}

// ─── Derived metadata ───────────────────────────────────────────────────────

fn derived_label_width(commands: &[Command], padding: i32) -> Option<i32> {
    commands
        .iter()
        .filter_map(|c| match c.kind {
            CommandKind::FieldOrigin { x, .. } => Some(x),
            _ => None,
        })
        .max()
        .map(|x| x.saturating_add(padding))
}

fn derived_label_length(commands: &[Command]) -> Option<i32> {
    commands.iter().find_map(|c| match c.kind {
        CommandKind::LabelLength { length } => Some(length),
        _ => None,
    })
}
