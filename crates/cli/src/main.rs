mod render;

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser as ClapParser, Subcommand};
use zpl_label_core::{
    Diagnostic, Document, LexerConfig, Parser, ParserConfig, to_pretty_json,
    tokenize_with_config, tokens_to_pretty_json,
};
use zpl_label_diagnostics as diag;

use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(ClapParser, Debug)]
#[command(
    name = "zpl-label",
    version,
    about = "Tokenize, parse, and syntax-check ZPL label files"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_enum)]
    output: Option<Format>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse a ZPL file and print the document as JSON.
    Parse(InputArgs),

    /// Print the token stream of a ZPL file.
    Tokens(InputArgs),

    /// Syntax-check a ZPL file.
    #[command(visible_alias = "syntax-check")]
    Check(InputArgs),

    /// Explain a diagnostic code (e.g. ZPL0102).
    Explain { id: String },
}

/// Input file plus lexer and parser settings.
#[derive(Args, Debug)]
struct InputArgs {
    /// ZPL file to read, or `-` for stdin.
    file: String,

    /// Character that introduces a command.
    #[arg(long, default_value_t = '^')]
    prefix: char,

    /// Character that separates parameters.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Padding added to the largest field origin for the derived label width.
    #[arg(long, default_value_t = zpl_label_core::grammar::parser::DEFAULT_LABEL_WIDTH_PADDING)]
    width_padding: i32,
}

impl InputArgs {
    fn lexer_config(&self) -> Result<LexerConfig> {
        if self.prefix == self.delimiter {
            bail!(
                "--prefix and --delimiter must differ (both are '{}')",
                self.prefix
            );
        }
        Ok(LexerConfig {
            command_prefix: self.prefix,
            delimiter: self.delimiter,
        })
    }

    fn parser(&self) -> Result<Parser> {
        Ok(Parser::with_config(ParserConfig {
            lexer: self.lexer_config()?,
            label_width_padding: self.width_padding,
        }))
    }

    /// Display name for diagnostics.
    fn name(&self) -> &str {
        if self.file == "-" { "<stdin>" } else { &self.file }
    }

    fn read(&self) -> Result<String> {
        if self.file == "-" {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            return Ok(input);
        }
        fs::read_to_string(&self.file).with_context(|| format!("failed to read {}", self.file))
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output);

    match cli.cmd {
        Cmd::Parse(args) => cmd_parse(&args, format)?,
        Cmd::Tokens(args) => cmd_tokens(&args, format)?,
        Cmd::Check(args) => cmd_check(&args, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn all_diagnostics(doc: &Document) -> Vec<Diagnostic> {
    let mut all = doc.metadata.errors.clone();
    all.extend(doc.metadata.warnings.iter().cloned());
    all.sort_by_key(|d| d.position);
    all
}

fn cmd_parse(args: &InputArgs, format: Format) -> Result<()> {
    let input = args.read()?;
    let doc = args.parser()?.parse(&input);

    // The document goes to stdout in both modes; pretty mode adds rendered
    // diagnostics on stderr.
    println!(
        "{}",
        to_pretty_json(&doc).context("failed to serialize document")?
    );
    if format == Format::Pretty {
        let diagnostics = all_diagnostics(&doc);
        render_diagnostics(&input, args.name(), &diagnostics);
        print_summary(&diagnostics);
    }

    exit_on_errors(&doc.metadata.errors);
    Ok(())
}

fn cmd_tokens(args: &InputArgs, format: Format) -> Result<()> {
    let input = args.read()?;
    let stream = tokenize_with_config(&input, &args.lexer_config()?);

    println!(
        "{}",
        tokens_to_pretty_json(&stream).context("failed to serialize tokens")?
    );
    if format == Format::Pretty {
        render_diagnostics(&input, args.name(), &stream.errors);
        print_summary(&stream.errors);
    }

    exit_on_errors(&stream.errors);
    Ok(())
}

fn cmd_check(args: &InputArgs, format: Format) -> Result<()> {
    let input = args.read()?;
    let doc = args.parser()?.parse(&input);
    let ok = !doc.has_errors();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "errors": doc.metadata.errors,
                "warnings": doc.metadata.warnings,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            let diagnostics = all_diagnostics(&doc);
            render_diagnostics(&input, args.name(), &diagnostics);
            print_summary(&diagnostics);
            if ok {
                eprintln!("syntax ok");
            }
        }
    }

    exit_on_errors(&doc.metadata.errors);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    let id = id.to_ascii_uppercase();
    let text = diag::explain(&id);
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "severity": diag::default_severity(&id),
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // The explanation is the command's output, so stdout.
            if let Some(text) = text {
                use ariadne::Fmt;
                println!("{}: {}", id.as_str().fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 if any diagnostic is an error. Warnings never change
/// the exit code.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics.iter().any(Diagnostic::is_error) {
        process::exit(1);
    }
}
