//! Linter output parsing.
//!
//! The linter's output is free text, not a stable machine contract. Each
//! line is classified by an explicit ordered pipeline: the error
//! fingerprint is tried first, then the warning fingerprint, then the
//! fault fallback; blank lines are skipped. Parsing never fails; a line
//! that matches nothing becomes a fault and stays visible in the raw
//! output for logging.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::config::FinalNewlinePolicy;
use crate::diagnostics::{Diagnostic, DiagnosticRange, LintRunResult, ProcessFault, Severity};

/// Message of the synthetic trailing-newline diagnostic.
pub const FINAL_NEWLINE_MESSAGE: &str = "FinalNewline: Files should end with a trailing newline";

/// Classification of a single output line.
///
/// Variant order is classification order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// `<anything>:<line>:<col> [E] <message>`, 1-based fields.
    Error { line: u32, col: u32, message: String },
    /// `<anything>:<line>:<col> [W] <message>`, 1-based fields.
    Warning { line: u32, col: u32, message: String },
    /// Any other non-empty line: the linter itself failed.
    Fault(String),
    /// Empty after trimming; skipped.
    Blank,
}

fn error_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^:]*:(\d+):(\d+) \[E\] (.*)$").expect("Invalid error line regex")
    })
}

fn warning_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^:]*:(\d+):(\d+) \[W\] (.*)$").expect("Invalid warning line regex")
    })
}

fn capture_location(caps: &Captures<'_>) -> Option<(u32, u32)> {
    let line: u32 = caps.get(1)?.as_str().parse().ok()?;
    let col: u32 = caps.get(2)?.as_str().parse().ok()?;
    Some((line, col))
}

/// Classifies one raw output line.
pub fn classify_line(raw_line: &str) -> LineClass {
    let line = raw_line.trim();
    if line.is_empty() {
        return LineClass::Blank;
    }
    if let Some(caps) = error_line_re().captures(line)
        && let Some((line_num, col)) = capture_location(&caps)
    {
        return LineClass::Error {
            line: line_num,
            col,
            message: caps[3].to_string(),
        };
    }
    if let Some(caps) = warning_line_re().captures(line)
        && let Some((line_num, col)) = capture_location(&caps)
    {
        return LineClass::Warning {
            line: line_num,
            col,
            message: caps[3].to_string(),
        };
    }
    LineClass::Fault(line.to_string())
}

/// Parses raw linter output into a structured run result.
///
/// Numeric fields are converted from the linter's 1-based positions to
/// 0-based ranges whose end is forced to the start of the following
/// line. When the trailing-newline policy applies and the document does
/// not end in a newline, a synthetic diagnostic is appended after all
/// parsed lines.
pub fn parse(raw_output: &str, policy: FinalNewlinePolicy, document_text: &str) -> LintRunResult {
    let mut result = LintRunResult::default();

    for raw_line in raw_output.lines() {
        match classify_line(raw_line) {
            LineClass::Error { line, col, message } => result.diagnostics.push(Diagnostic {
                range: DiagnosticRange::to_next_line_start(
                    line.saturating_sub(1),
                    col.saturating_sub(1),
                ),
                message,
                severity: Severity::Error,
            }),
            LineClass::Warning { line, col, message } => result.diagnostics.push(Diagnostic {
                range: DiagnosticRange::to_next_line_start(
                    line.saturating_sub(1),
                    col.saturating_sub(1),
                ),
                message,
                severity: Severity::Warning,
            }),
            LineClass::Fault(text) => {
                debug!("Unrecognized linter output: {}", text);
                result.faults.push(ProcessFault::new(&text));
            }
            LineClass::Blank => {}
        }
    }

    append_final_newline_diagnostic(&mut result, policy, document_text);
    result
}

/// The trailing-newline heuristic: one synthetic diagnostic at the line
/// following the last line of the document, appended after all parsed
/// lines and never replacing them.
fn append_final_newline_diagnostic(
    result: &mut LintRunResult,
    policy: FinalNewlinePolicy,
    document_text: &str,
) {
    if policy == FinalNewlinePolicy::Disabled
        || document_text.is_empty()
        || document_text.ends_with('\n')
    {
        return;
    }
    let next_line = document_text.lines().count() as u32;
    let severity = match policy {
        FinalNewlinePolicy::Error => Severity::Error,
        _ => Severity::Warning,
    };
    result.diagnostics.push(Diagnostic {
        range: DiagnosticRange::to_next_line_start(next_line, 0),
        message: FINAL_NEWLINE_MESSAGE.to_string(),
        severity,
    });
}
