use std::collections::BTreeMap;

use super::{
    ast::{Command, CommandKind, LineColor, Orientation},
    context::{ParseContext, ParseError},
    diag::{Diagnostic, codes},
    lexer::{Token, TokenKind},
};

/// A grammar for one command code.
///
/// A rule is invoked with the cursor on the command's marker. It consumes the
/// tokens belonging to the command and returns the node, or a [`ParseError`]
/// when the input does not have the structure it requires; the parser then
/// records the error and synchronizes.
///
/// Any `Fn(&mut ParseContext<'_>) -> Result<Command, ParseError>` is a rule.
pub trait CommandRule: Send + Sync {
    /// Parse one command starting at the cursor.
    fn parse(&self, ctx: &mut ParseContext<'_>) -> Result<Command, ParseError>;
}

impl<F> CommandRule for F
where
    F: Fn(&mut ParseContext<'_>) -> Result<Command, ParseError> + Send + Sync,
{
    fn parse(&self, ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
        self(ctx)
    }
}

/// Command codes declared by the command set but without a defined grammar
/// (field reverse, change font, graphic field). They go through the generic
/// fallback.
pub const UNDEFINED_GRAMMAR_CODES: [&str; 3] = ["FR", "CF", "GF"];

/// Maps command codes to their grammar rules.
pub struct Registry {
    rules: BTreeMap<String, Box<dyn CommandRule>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.rules.keys()).finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// A registry without any rules: every command is generic.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// The built-in command set.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register("XA", label_start);
        reg.register("XZ", label_end);
        reg.register("LL", label_length);
        reg.register("LH", label_home);
        reg.register("FO", field_origin);
        reg.register("GB", graphic_box);
        reg.register("FD", field_data);
        reg.register("FS", orphaned_field_separator);
        for code in ["BC", "B3", "BN"] {
            reg.register(code, barcode);
        }
        reg.register("A", font);
        reg
    }

    /// Add or replace the rule for `code`, returning the previous one.
    pub fn register(
        &mut self,
        code: impl Into<String>,
        rule: impl CommandRule + 'static,
    ) -> Option<Box<dyn CommandRule>> {
        self.rules.insert(code.into(), Box::new(rule))
    }

    /// The rule for `code`, if one is registered.
    pub fn get(&self, code: &str) -> Option<&dyn CommandRule> {
        self.rules.get(code).map(|r| r.as_ref())
    }

    /// Whether `code` has a rule.
    pub fn contains(&self, code: &str) -> bool {
        self.rules.contains_key(code)
    }

    /// Registered codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// A registered code one substitution away from `code`, when exactly one
    /// exists.
    pub fn closest_code(&self, code: &str) -> Option<&str> {
        let mut candidates = self.codes().filter(|known| {
            known.len() == code.len()
                && known
                    .chars()
                    .zip(code.chars())
                    .filter(|(a, b)| a != b)
                    .count()
                    == 1
        });
        let first = candidates.next()?;
        candidates.next().is_none().then_some(first)
    }
}

// ── Parameter values ────────────────────────────────────────────────────

fn param<'src>(params: &[Token<'src>], idx: usize) -> Option<&'src str> {
    params.get(idx).map(|t| t.value)
}

/// Base-10 integer, or `default` when absent or not a number.
pub fn int_or(value: Option<&str>, default: i32) -> i32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// `Y` → true, `N` → false, anything else → `default`.
pub fn bool_or(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        Some("Y") => true,
        Some("N") => false,
        _ => default,
    }
}

fn orientation_or_default(value: Option<&str>) -> Orientation {
    value.and_then(Orientation::from_param).unwrap_or_default()
}

// ── Command grammars ────────────────────────────────────────────────────

fn label_start(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let params = ctx.take_parameters();
    Ok(ctx.finish(head, &params, CommandKind::LabelStart))
}

fn label_end(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let params = ctx.take_parameters();
    Ok(ctx.finish(head, &params, CommandKind::LabelEnd))
}

fn label_length(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let params = ctx.take_parameters();
    let length = int_or(param(&params, 0), 100);
    Ok(ctx.finish(head, &params, CommandKind::LabelLength { length }))
}

/// Read the `x,y` pair of `^LH`/`^FO`. A missing value is an error, but the
/// command is still produced with 0 in its place.
fn coordinates(
    ctx: &mut ParseContext<'_>,
    kind: fn(i32, i32) -> CommandKind,
) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let mut params = Vec::new();
    let mut missing = Vec::new();
    for name in ["x", "y"] {
        match ctx.expect(TokenKind::Parameter) {
            Ok(tok) => params.push(tok),
            Err(_) => missing.push(name),
        }
    }
    params.extend(ctx.take_parameters());

    if !missing.is_empty() {
        let missing = missing.join(",");
        ctx.error(
            Diagnostic::error(
                codes::SYNTAX_MISSING_PARAMETER,
                format!(
                    "^{} expects x and y parameters; missing {missing}",
                    head.code
                ),
                head.position,
            )
            .with_context(ctx!(
                "command" => head.code,
                "expected" => "2",
                "found" => params.len().to_string(),
                "missing" => missing,
            )),
        );
    }

    let x = int_or(param(&params, 0), 0);
    let y = int_or(param(&params, 1), 0);
    Ok(ctx.finish(head, &params, kind(x, y)))
}

fn label_home(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    coordinates(ctx, |x, y| CommandKind::LabelHome { x, y })
}

fn field_origin(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    coordinates(ctx, |x, y| CommandKind::FieldOrigin { x, y })
}

fn graphic_box(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let params = ctx.take_parameters();
    let kind = CommandKind::GraphicBox {
        width: int_or(param(&params, 0), 1),
        height: int_or(param(&params, 1), 1),
        thickness: int_or(param(&params, 2), 1),
        color: param(&params, 3).map_or_else(LineColor::default, LineColor::from_param),
        rounding: param(&params, 4).and_then(|v| v.trim().parse().ok()),
    };
    Ok(ctx.finish(head, &params, kind))
}

/// Field content directly after an `^FD` head. Plain parameters are accepted
/// too, for token streams produced with a different content rule.
fn field_content<'src>(ctx: &mut ParseContext<'src>) -> Option<Token<'src>> {
    ctx.eat(TokenKind::StringContent)
        .or_else(|| ctx.eat(TokenKind::Parameter))
}

fn field_data(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let content = field_content(ctx);
    let mut params: Vec<_> = content.into_iter().collect();
    let stop_command = ctx.eat_command("FS").is_some();
    if stop_command {
        params.extend(ctx.take_parameters());
    }
    let kind = CommandKind::FieldData {
        content: content.map(|t| t.value.to_owned()).unwrap_or_default(),
        stop_command,
    };
    Ok(ctx.finish(head, &params, kind))
}

fn barcode(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let mut params = ctx.take_parameters();

    let mut data = String::new();
    let mut trailing = Vec::new();
    if ctx.eat_command("FD").is_some() {
        if let Some(tok) = field_content(ctx) {
            data = tok.value.to_owned();
        }
        if ctx.eat_command("FS").is_some() {
            trailing = ctx.take_parameters();
        }
    }

    let kind = CommandKind::Barcode {
        orientation: orientation_or_default(param(&params, 0)),
        height: int_or(param(&params, 1), 10),
        print_interpretation_line: bool_or(param(&params, 2), true),
        print_above_code: bool_or(param(&params, 3), false),
        mode: param(&params, 4).map(str::to_owned),
        data,
    };
    // stray parameters of the closing ^FS stay visible after the barcode's own
    params.extend(trailing);
    Ok(ctx.finish(head, &params, kind))
}

/// `^Afo,h,w`: the font name and orientation share the first parameter.
fn font(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let params = ctx.take_parameters();

    let (font, orientation) = match param(&params, 0) {
        Some(first) => {
            let mut chars = first.chars();
            let font = chars.next().map(String::from).unwrap_or_else(|| "0".into());
            let rest = chars.as_str();
            let orientation = if rest.is_empty() {
                Orientation::default()
            } else {
                orientation_or_default(Some(rest))
            };
            (font, orientation)
        }
        None => ("0".to_owned(), Orientation::default()),
    };
    let height = int_or(param(&params, 1), 10);
    let width = param(&params, 2).map(|w| int_or(Some(w), height));

    let kind = CommandKind::Font {
        font,
        orientation,
        height,
        width,
    };
    Ok(ctx.finish(head, &params, kind))
}

fn orphaned_field_separator(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let params = ctx.take_parameters();
    ctx.warn(
        Diagnostic::warn(
            codes::PARSER_ORPHANED_FIELD_SEPARATOR,
            format!(
                "^{} at line {}, column {} does not close any field data",
                head.code, head.position.line, head.position.column
            ),
            head.position,
        )
        .with_suggestion("remove it, or put field data (^FD) before it")
        .with_context(ctx!("command" => head.code)),
    );
    Ok(ctx.finish(head, &params, CommandKind::Generic))
}

/// Fallback for codes without a rule: keep every parameter and warn.
pub(crate) fn unsupported(
    ctx: &mut ParseContext<'_>,
    registry: &Registry,
) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let mut params = Vec::new();
    while let Some(tok) = ctx
        .eat(TokenKind::Parameter)
        .or_else(|| ctx.eat(TokenKind::StringContent))
    {
        params.push(tok);
    }

    let suggestion = if UNDEFINED_GRAMMAR_CODES.contains(&head.code) {
        Some(format!(
            "no grammar is defined for ^{} yet; its parameters are kept in source order",
            head.code
        ))
    } else {
        registry
            .closest_code(head.code)
            .map(|known| format!("did you mean ^{known}?"))
    };

    let mut warning = Diagnostic::warn(
        codes::PARSER_UNSUPPORTED_COMMAND,
        format!(
            "unsupported command ^{} at line {}, column {}",
            head.code, head.position.line, head.position.column
        ),
        head.position,
    )
    .with_context(ctx!("command" => head.code));
    if let Some(suggestion) = suggestion {
        warning = warning.with_suggestion(suggestion);
    }
    ctx.warn(warning);

    Ok(ctx.finish(head, &params, CommandKind::Generic))
}
