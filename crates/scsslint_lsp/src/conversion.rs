//! LSP type conversion utilities.

use std::path::Path;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range, Url};

use scsslint_core::{
    Diagnostic as CoreDiagnostic, DiagnosticRange, ProcessFault, Severity as CoreSeverity,
};

/// Diagnostic source name shown by clients.
pub const SOURCE: &str = "scss-lint";

/// Converts an engine range to an LSP range.
pub fn to_lsp_range(range: &DiagnosticRange) -> Range {
    Range::new(
        Position::new(range.start_line, range.start_col),
        Position::new(range.end_line, range.end_col),
    )
}

/// Converts an engine diagnostic to an LSP diagnostic.
pub fn to_lsp_diagnostic(diag: &CoreDiagnostic) -> Diagnostic {
    let severity = match diag.severity {
        CoreSeverity::Error => DiagnosticSeverity::ERROR,
        CoreSeverity::Warning => DiagnosticSeverity::WARNING,
    };

    Diagnostic {
        range: to_lsp_range(&diag.range),
        severity: Some(severity),
        source: Some(SOURCE.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

/// Converts a process fault to an LSP diagnostic anchored at the top of
/// the file.
pub fn fault_to_lsp_diagnostic(fault: &ProcessFault) -> Diagnostic {
    Diagnostic {
        range: Range::new(Position::new(0, 0), Position::new(0, 0)),
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(SOURCE.to_string()),
        message: fault.message.clone(),
        ..Default::default()
    }
}

/// Turns a publication key (a URI for documents, a file-system path for
/// config files) into a URL diagnostics can be published against.
pub fn key_to_url(key: &str) -> Option<Url> {
    Url::parse(key)
        .ok()
        .or_else(|| Url::from_file_path(Path::new(key)).ok())
}
