use serde::{Deserialize, Serialize};

use super::diag::{Diagnostic, Position};

/// The result of parsing one source text: commands plus metadata.
///
/// This is the only value that outlives a parse call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Commands in source order.
    pub commands: Vec<Command>,
    /// Source text, diagnostics, and derived label dimensions.
    pub metadata: Metadata,
}

impl Document {
    /// Whether parsing recorded any lexical or syntax error.
    pub fn has_errors(&self) -> bool {
        !self.metadata.errors.is_empty()
    }

    /// Iterate over commands with the given code (without marker, e.g. `"FO"`).
    pub fn commands_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Command> {
        self.commands.iter().filter(move |c| c.code == code)
    }
}

/// Document-level information gathered while parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// The full input that was parsed.
    pub source_text: String,
    /// Lexical errors followed by syntax errors.
    pub errors: Vec<Diagnostic>,
    /// Warnings such as unsupported commands.
    pub warnings: Vec<Diagnostic>,
    /// Largest field-origin x plus padding; absent without any `^FO`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_label_width: Option<i32>,
    /// Length from the first `^LL`; absent without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_label_length: Option<i32>,
}

/// One parsed command.
///
/// The shared fields are the same for every command; `kind` carries the
/// typed fields of the specific command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Command code without the marker (e.g. `"FO"`).
    pub code: String,
    /// Source text from the marker through the last token the command used.
    pub raw_text: String,
    /// Location of the command marker.
    pub position: Position,
    /// Raw parameter values in source order. Not deduplicated.
    pub parameters: Vec<String>,
    /// Command-specific fields.
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    /// Short name of the command kind, as used in serialized output.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Typed fields per command kind.
///
/// Commands without a grammar are kept as [`CommandKind::Generic`]; their
/// parameters are still available on [`Command::parameters`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
#[non_exhaustive]
pub enum CommandKind {
    /// `^XA`: start of a label format.
    LabelStart,
    /// `^XZ`: end of a label format.
    LabelEnd,
    /// `^LL`: label length in dots.
    LabelLength {
        /// Label length; 100 when missing or invalid.
        length: i32,
    },
    /// `^LH`: label home, the origin all field positions are relative to.
    LabelHome {
        /// Horizontal offset.
        x: i32,
        /// Vertical offset.
        y: i32,
    },
    /// `^FO`: field origin.
    FieldOrigin {
        /// Horizontal position.
        x: i32,
        /// Vertical position.
        y: i32,
    },
    /// `^GB`: graphic box.
    GraphicBox {
        /// Box width; 1 when missing.
        width: i32,
        /// Box height; 1 when missing.
        height: i32,
        /// Border thickness; 1 when missing.
        thickness: i32,
        /// Line color.
        color: LineColor,
        /// Corner rounding, only when given as a number.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rounding: Option<i32>,
    },
    /// `^FD`: field data, with the `^FS` that closes it folded in.
    FieldData {
        /// Field text, verbatim.
        content: String,
        /// Whether a `^FS` directly followed and was consumed.
        stop_command: bool,
    },
    /// `^BC`, `^B3`, `^BN`: a barcode with its field data.
    Barcode {
        /// Barcode orientation.
        orientation: Orientation,
        /// Bar height; 10 when missing.
        height: i32,
        /// Print the human-readable line.
        print_interpretation_line: bool,
        /// Print the human-readable line above the code.
        print_above_code: bool,
        /// Raw fifth parameter.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<String>,
        /// Content of the following `^FD`, or empty.
        data: String,
    },
    /// `^A`: scalable/bitmapped font selection.
    Font {
        /// Font name; `"0"` when missing.
        font: String,
        /// Text orientation.
        orientation: Orientation,
        /// Character height; 10 when missing.
        height: i32,
        /// Character width. Absent when the source omits it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<i32>,
    },
    /// Any command without a grammar.
    Generic,
}

impl CommandKind {
    /// Short name of the kind, as used in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::LabelStart => "label-start",
            CommandKind::LabelEnd => "label-end",
            CommandKind::LabelLength { .. } => "label-length",
            CommandKind::LabelHome { .. } => "label-home",
            CommandKind::FieldOrigin { .. } => "field-origin",
            CommandKind::GraphicBox { .. } => "graphic-box",
            CommandKind::FieldData { .. } => "field-data",
            CommandKind::Barcode { .. } => "barcode",
            CommandKind::Font { .. } => "font",
            CommandKind::Generic => "generic",
        }
    }
}

/// Rotation of a field, as the single-letter ZPL parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// `N`: normal.
    #[default]
    #[serde(rename = "N")]
    Normal,
    /// `R`: rotated 90 degrees clockwise.
    #[serde(rename = "R")]
    Rotated,
    /// `I`: inverted 180 degrees.
    #[serde(rename = "I")]
    Inverted,
    /// `B`: read from bottom up, 270 degrees.
    #[serde(rename = "B")]
    Bottom,
}

impl Orientation {
    /// Parse the single-letter form; `None` for anything else.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            "N" => Some(Orientation::Normal),
            "R" => Some(Orientation::Rotated),
            "I" => Some(Orientation::Inverted),
            "B" => Some(Orientation::Bottom),
            _ => None,
        }
    }
}

/// Line color of a graphic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineColor {
    /// `B`
    #[default]
    #[serde(rename = "B")]
    Black,
    /// `W`
    #[serde(rename = "W")]
    White,
}

impl LineColor {
    /// `W` is white; everything else is black.
    pub fn from_param(value: &str) -> Self {
        if value.trim() == "W" {
            LineColor::White
        } else {
            LineColor::Black
        }
    }
}
