pub use zpl_label_diagnostics::{Diagnostic, Position, Severity, codes};
