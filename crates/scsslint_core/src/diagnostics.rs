//! Diagnostic data model.

/// Severity of a parsed lint diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A zero-based (line, column) range.
///
/// Every parsed diagnostic spans from its reported position to the start
/// of the following line, regardless of the actual token length.
/// Downstream highlighting must tolerate this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl DiagnosticRange {
    /// The range convention used for every diagnostic: from the given
    /// position to the start of the next line.
    pub fn to_next_line_start(start_line: u32, start_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line: start_line + 1,
            end_col: 0,
        }
    }
}

/// A structured rule violation surfaced to the editing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub range: DiagnosticRange,
    pub message: String,
    pub severity: Severity,
}

/// Prefix distinguishing infrastructure failures from rule violations.
pub const FAULT_PREFIX: &str = "Error running linter: ";

/// A problem running or configuring the linter itself, anchored at the
/// top of the file rather than at a source position.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessFault {
    pub message: String,
}

impl ProcessFault {
    /// Wraps a raw output line (or error text) in the fault prefix.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self {
            message: format!("{FAULT_PREFIX}{}", raw.as_ref()),
        }
    }
}

/// The result of one linter invocation.
///
/// Created once per process run and consumed exactly once by the
/// reconciler; no history is kept beyond the current diagnostics for a
/// document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LintRunResult {
    /// Parsed diagnostics in output order.
    pub diagnostics: Vec<Diagnostic>,
    /// Lines that indicated the linter itself failed.
    pub faults: Vec<ProcessFault>,
}

impl LintRunResult {
    /// Builds a result carrying a single fault and no diagnostics.
    pub fn from_fault(message: impl AsRef<str>) -> Self {
        Self {
            diagnostics: Vec::new(),
            faults: vec![ProcessFault::new(message)],
        }
    }

    /// Error-severity diagnostics, in output order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Warning-severity diagnostics, in output order.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_spans_to_next_line_start() {
        let range = DiagnosticRange::to_next_line_start(2, 4);
        assert_eq!(range.start_line, 2);
        assert_eq!(range.start_col, 4);
        assert_eq!(range.end_line, 3);
        assert_eq!(range.end_col, 0);
    }

    #[test]
    fn test_fault_message_is_prefixed() {
        let fault = ProcessFault::new("sh: scss-lint: command not found");
        assert_eq!(
            fault.message,
            "Error running linter: sh: scss-lint: command not found"
        );
    }

    #[test]
    fn test_severity_partitions() {
        let result = LintRunResult {
            diagnostics: vec![
                Diagnostic {
                    range: DiagnosticRange::to_next_line_start(0, 0),
                    message: "a".into(),
                    severity: Severity::Error,
                },
                Diagnostic {
                    range: DiagnosticRange::to_next_line_start(1, 0),
                    message: "b".into(),
                    severity: Severity::Warning,
                },
            ],
            faults: Vec::new(),
        };
        assert_eq!(result.errors().count(), 1);
        assert_eq!(result.warnings().count(), 1);
    }
}
