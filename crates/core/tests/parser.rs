//! Parser driver tests: recovery, fallbacks, custom command sets, and the
//! serialized document shape.

mod common;

use std::sync::Arc;

use common::{assert_clean, codes, error_codes, kinds, only, warning_codes};
use zpl_label_core::{
    Command, CommandKind, Document, Orientation, ParseContext, ParseError, Parser, ParserConfig,
    Registry, TokenKind, codes as diag_codes, parse_str,
};

#[test]
fn empty_input_gives_empty_document() {
    let doc = parse_str("");
    assert!(doc.commands.is_empty());
    assert_clean(&doc);
    assert!(doc.metadata.warnings.is_empty());
    assert_eq!(doc.metadata.derived_label_width, None);
    assert_eq!(doc.metadata.derived_label_length, None);
}

#[test]
fn comments_and_blank_lines_produce_no_nodes() {
    let doc = parse_str("// a\n\n/* b */\n^XA\n\n^XZ\n// end");
    assert_clean(&doc);
    assert_eq!(codes(&doc), ["XA", "XZ"]);
}

#[test]
fn lexical_errors_come_first_and_parsing_continues() {
    let doc = parse_str("^XA\nbad\n^FO5\n^XZ");
    assert_eq!(
        error_codes(&doc),
        [
            diag_codes::LEXER_UNEXPECTED_CHARACTER,
            diag_codes::LEXER_UNEXPECTED_CHARACTER,
            diag_codes::LEXER_UNEXPECTED_CHARACTER,
            diag_codes::SYNTAX_MISSING_PARAMETER,
        ]
    );
    assert_eq!(codes(&doc), ["XA", "FO", "XZ"]);
}

#[test]
fn missing_parameter_context() {
    let doc = parse_str("^LH7");
    let err = &doc.metadata.errors[0];
    assert_eq!(err.code, diag_codes::SYNTAX_MISSING_PARAMETER);
    assert!(err.message.contains("missing y"), "{}", err.message);
    let ctx = err.context.as_ref().expect("context");
    assert_eq!(ctx["command"], "LH");
    assert_eq!(ctx["found"], "1");
    assert_eq!(ctx["missing"], "y");
    assert_eq!(doc.commands[0].kind, CommandKind::LabelHome { x: 7, y: 0 });
}

#[test]
fn invalid_numbers_fall_back_to_defaults() {
    let doc = parse_str("^LLabc^GBx,y,z^FOa,b^BCN,tall");
    assert_clean(&doc);
    assert_eq!(only(&doc, "LL").kind, CommandKind::LabelLength { length: 100 });
    assert!(matches!(
        only(&doc, "GB").kind,
        CommandKind::GraphicBox {
            width: 1,
            height: 1,
            thickness: 1,
            ..
        }
    ));
    assert_eq!(only(&doc, "FO").kind, CommandKind::FieldOrigin { x: 0, y: 0 });
    assert!(matches!(
        only(&doc, "BC").kind,
        CommandKind::Barcode { height: 10, .. }
    ));
}

#[test]
fn invalid_enum_letters_fall_back_to_defaults() {
    let doc = parse_str("^GB1,1,1,X^BCX,5^AQZ,12");
    assert_clean(&doc);
    assert!(matches!(
        only(&doc, "GB").kind,
        CommandKind::GraphicBox {
            color: zpl_label_core::LineColor::Black,
            ..
        }
    ));
    assert!(matches!(
        only(&doc, "BC").kind,
        CommandKind::Barcode {
            orientation: Orientation::Normal,
            height: 5,
            ..
        }
    ));
    match &only(&doc, "A").kind {
        CommandKind::Font {
            font,
            orientation,
            height,
            ..
        } => {
            assert_eq!(font, "Q");
            assert_eq!(*orientation, Orientation::Normal);
            assert_eq!(*height, 12);
        }
        other => panic!("expected font, got {other:?}"),
    }
}

#[test]
fn graphic_box_optional_fields() {
    let doc = parse_str("^GB100,50,2,W,3");
    assert_eq!(
        doc.commands[0].kind,
        CommandKind::GraphicBox {
            width: 100,
            height: 50,
            thickness: 2,
            color: zpl_label_core::LineColor::White,
            rounding: Some(3),
        }
    );
}

#[test]
fn font_width_absent_or_defaulted_to_height() {
    let doc = parse_str("^A0N,30^A0N,30,x^A0");
    let widths: Vec<_> = doc
        .commands
        .iter()
        .map(|c| match c.kind {
            CommandKind::Font { width, height, .. } => (height, width),
            _ => panic!("expected font"),
        })
        .collect();
    assert_eq!(widths, [(30, None), (30, Some(30)), (10, None)]);
}

#[test]
fn field_data_ends_at_line_break() {
    let doc = parse_str("^XA\n^FDabc\nstray\n^XZ");
    assert_eq!(
        doc.commands[1].kind,
        CommandKind::FieldData {
            content: "abc".into(),
            stop_command: false,
        }
    );
    assert_eq!(error_codes(&doc).len(), 5);
    assert!(
        error_codes(&doc)
            .iter()
            .all(|c| c == diag_codes::LEXER_UNEXPECTED_CHARACTER)
    );
    assert_eq!(codes(&doc), ["XA", "FD", "XZ"]);
}

#[test]
fn closing_field_separator_parameters_are_kept() {
    let doc = parse_str("^FDabc^FS1,2");
    let fd = only(&doc, "FD");
    assert_eq!(fd.parameters, ["abc", "1", "2"]);
    assert_eq!(fd.raw_text, "^FDabc^FS1,2");

    let doc = parse_str("^BCN,40^FD99^FS7");
    let bc = only(&doc, "BC");
    assert_eq!(bc.parameters, ["N", "40", "7"]);
    assert_eq!(bc.raw_text, "^BCN,40^FD99^FS7");
    assert!(matches!(bc.kind, CommandKind::Barcode { mode: None, .. }));
}

#[test]
fn barcode_without_field_data() {
    let doc = parse_str("^BCN,50\n^XZ");
    assert_eq!(kinds(&doc), ["barcode", "label-end"]);
    match &doc.commands[0].kind {
        CommandKind::Barcode { data, mode, .. } => {
            assert!(data.is_empty());
            assert!(mode.is_none());
        }
        other => panic!("expected barcode, got {other:?}"),
    }
}

#[test]
fn barcode_interpretation_defaults() {
    let doc = parse_str("^BN^FD1^FS");
    assert!(matches!(
        doc.commands[0].kind,
        CommandKind::Barcode {
            print_interpretation_line: true,
            print_above_code: false,
            ..
        }
    ));
    assert_eq!(doc.commands.len(), 1);
}

#[test]
fn unsupported_command_keeps_parameters_and_warns() {
    let doc = parse_str("^XA^PW812,extra^XZ");
    assert_clean(&doc);
    assert_eq!(warning_codes(&doc), [diag_codes::PARSER_UNSUPPORTED_COMMAND]);
    let pw = only(&doc, "PW");
    assert_eq!(pw.kind, CommandKind::Generic);
    assert_eq!(pw.parameters, ["812", "extra"]);
    assert_eq!(pw.raw_text, "^PW812,extra");
}

#[test]
fn unsupported_command_suggests_close_code() {
    let doc = parse_str("^GX10,10");
    let warning = &doc.metadata.warnings[0];
    assert_eq!(warning.suggestion.as_deref(), Some("did you mean ^GB?"));
}

#[test]
fn commands_without_grammar_are_generic() {
    let doc = parse_str("^FR^CF0,30^GFA,4,4,1,FFFF");
    assert_clean(&doc);
    assert_eq!(kinds(&doc), ["generic", "generic", "generic"]);
    assert_eq!(doc.commands[2].parameters, ["A", "4", "4", "1", "FFFF"]);
    for warning in &doc.metadata.warnings {
        let suggestion = warning.suggestion.as_deref().unwrap_or_default();
        assert!(suggestion.contains("no grammar"), "{suggestion}");
    }
    assert_eq!(doc.metadata.warnings.len(), 3);
}

#[test]
fn orphaned_field_separator_warns() {
    let doc = parse_str("^XA^FS^XZ");
    assert_clean(&doc);
    assert_eq!(
        warning_codes(&doc),
        [diag_codes::PARSER_ORPHANED_FIELD_SEPARATOR]
    );
    assert_eq!(codes(&doc), ["XA", "FS", "XZ"]);
}

#[test]
fn parameters_are_kept_in_source_order_with_duplicates() {
    let doc = parse_str("^GB5,5,5");
    assert_eq!(doc.commands[0].parameters, ["5", "5", "5"]);
}

#[test]
fn positions_point_at_markers() {
    let doc = parse_str("^XA\n  ^FO1,2");
    let fo = only(&doc, "FO");
    assert_eq!((fo.position.line, fo.position.column), (2, 3));
    assert_eq!(fo.position.offset, 6);
}

// ── Custom command sets ─────────────────────────────────────────────────

/// `^ZZ` requires exactly one parameter and fails structurally without it.
fn strict_rule(ctx: &mut ParseContext<'_>) -> Result<Command, ParseError> {
    let head = ctx.begin_command()?;
    let value = ctx.expect(TokenKind::Parameter)?;
    Ok(ctx.finish(head, &[value], CommandKind::Generic))
}

fn strict_parser() -> Parser {
    let mut registry = Registry::builtin();
    registry.register("ZZ", strict_rule);
    Parser::with_registry(registry)
}

#[test]
fn custom_rule_is_dispatched() {
    let doc = strict_parser().parse("^ZZ42");
    assert_clean(&doc);
    assert!(doc.metadata.warnings.is_empty());
    assert_eq!(doc.commands[0].parameters, ["42"]);
}

#[test]
fn structural_failure_synchronizes_to_next_line() {
    let doc = strict_parser().parse("^XA\n^ZZ\n^FO1,2\n^XZ");
    assert_eq!(error_codes(&doc), [diag_codes::SYNTAX_UNEXPECTED_TOKEN]);
    assert_eq!(codes(&doc), ["XA", "FO", "XZ"]);

    let err = &doc.metadata.errors[0];
    assert!(
        err.message.starts_with("expected parameter, found line break"),
        "{}",
        err.message
    );
    assert_eq!(err.position.offset, 7);
    assert_eq!(err.context.as_ref().unwrap()["expected"], "parameter");
}

#[test]
fn failure_on_a_marker_drops_the_rest_of_the_line() {
    // recovery always moves past the offending token first, so the ^FO
    // marker that stopped ^ZZ is skipped along with its parameters
    let doc = strict_parser().parse("^XA^ZZ^FO1,2\n^XZ");
    assert_eq!(error_codes(&doc), [diag_codes::SYNTAX_UNEXPECTED_TOKEN]);
    assert_eq!(
        doc.metadata.errors[0].message,
        "expected parameter, found command marker '^'"
    );
    assert_eq!(doc.metadata.errors[0].position.offset, 6);
    assert_eq!(codes(&doc), ["XA", "XZ"]);
}

#[test]
fn structural_failure_at_end_of_input() {
    let doc = strict_parser().parse("^XA\n^ZZ");
    assert_eq!(error_codes(&doc), [diag_codes::SYNTAX_UNEXPECTED_TOKEN]);
    assert!(doc.metadata.errors[0].message.ends_with("end of input"));
    assert_eq!(codes(&doc), ["XA"]);
}

#[test]
fn closure_rules_and_replacing_builtins() {
    let mut registry = Registry::builtin();
    let previous = registry.register("XA", |ctx: &mut ParseContext<'_>| {
        let head = ctx.begin_command()?;
        Ok(ctx.finish(head, &[], CommandKind::LabelEnd))
    });
    assert!(previous.is_some());
    let doc = Parser::with_registry(registry).parse("^XA");
    assert_eq!(doc.commands[0].kind, CommandKind::LabelEnd);
}

#[test]
fn empty_registry_makes_everything_generic() {
    let doc = Parser::with_registry(Registry::empty()).parse("^XA^FDhi^FS^XZ");
    assert_eq!(kinds(&doc), ["generic", "generic", "generic", "generic"]);
    assert_eq!(doc.commands[1].parameters, ["hi"]);
    assert_eq!(doc.metadata.warnings.len(), 4);
}

#[test]
fn one_parser_serves_concurrent_calls() {
    let parser = Arc::new(Parser::with_config(ParserConfig {
        label_width_padding: 10,
        ..ParserConfig::default()
    }));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let parser = Arc::clone(&parser);
            std::thread::spawn(move || parser.parse(&format!("^XA^FO{i},0^XZ")))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let doc = handle.join().expect("parser thread panicked");
        assert_eq!(doc.metadata.derived_label_width, Some(i as i32 + 10));
        assert_clean(&doc);
    }
}

#[test]
fn repeated_parses_do_not_leak_state() {
    let parser = Parser::new();
    let broken = parser.parse("^FO1");
    assert!(broken.has_errors());
    let clean = parser.parse("^FO1,2");
    assert_clean(&clean);
    assert!(clean.metadata.warnings.is_empty());
}

// ── Serialized shape ────────────────────────────────────────────────────

#[test]
fn document_json_shape() {
    let doc = parse_str("^XA^FO1,2^BCN,40^FD99^FS^XZ");
    let json = serde_json::to_value(&doc).unwrap();

    let fo = &json["commands"][1];
    assert_eq!(fo["kind"], "field-origin");
    assert_eq!(fo["code"], "FO");
    assert_eq!(fo["rawText"], "^FO1,2");
    assert_eq!(fo["x"], 1);
    assert_eq!(fo["y"], 2);

    let bc = &json["commands"][2];
    assert_eq!(bc["kind"], "barcode");
    assert_eq!(bc["orientation"], "N");
    assert_eq!(bc["printInterpretationLine"], true);
    assert_eq!(bc["data"], "99");
    assert!(bc.get("mode").is_none());

    assert_eq!(json["metadata"]["derivedLabelWidth"], 101);
    assert!(json["metadata"].get("derivedLabelLength").is_none());
}

#[test]
fn document_round_trips_through_json() {
    let doc = parse_str("^XA\n^LL400\n^FO10,10^A0N,20,20^FDx^FS\n^QQ\n^XZ");
    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}
