//! Staleness-safe diagnostic reconciliation.
//!
//! Multiple lint cycles can be in flight for the same document because
//! nothing cancels an older process when a newer trigger fires. Results
//! are validated at completion time, not ordered by completion time: a
//! result is published only when the editor that initiated the cycle is
//! still the active one and no newer cycle has been started for the
//! document.

use std::collections::HashMap;

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticRange, LintRunResult, ProcessFault};
use crate::settings::LintSettings;
use crate::status;

/// Identity of the editor view that initiated a cycle.
pub type EditorId = String;

/// Key identifying a document in the published collections.
pub type DocumentKey = String;

/// Cycle identity captured at trigger time and checked at completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTicket {
    pub document: DocumentKey,
    pub editor: EditorId,
    /// Monotonically increasing per document.
    pub token: u64,
}

/// Highlight ranges forwarded to the rendering collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    pub errors: Vec<DiagnosticRange>,
    pub warnings: Vec<DiagnosticRange>,
    pub error_color: String,
    pub warning_color: String,
}

/// Everything one validated cycle publishes.
///
/// Consumers replace prior state for each key wholesale; nothing is
/// merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub document: DocumentKey,
    pub diagnostics: Vec<Diagnostic>,
    /// Present when `showHighlights` is enabled.
    pub highlights: Option<Highlights>,
    /// Faults are keyed separately (by the config file when one was
    /// resolved) so infrastructure failures stay visible independent of
    /// the linted document.
    pub fault_key: DocumentKey,
    pub faults: Vec<ProcessFault>,
    pub status_text: String,
}

/// Owns per-document cycle state and rejects stale results.
#[derive(Debug, Default)]
pub struct DiagnosticReconciler {
    active_editor: Option<EditorId>,
    /// Highest token issued per document.
    issued: HashMap<DocumentKey, u64>,
}

impl DiagnosticReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the currently active editor, or `None` when no editor is
    /// focused.
    pub fn set_active_editor(&mut self, editor: Option<EditorId>) {
        self.active_editor = editor;
    }

    pub fn active_editor(&self) -> Option<&EditorId> {
        self.active_editor.as_ref()
    }

    /// Issues the identity for a new cycle.
    pub fn begin_cycle(&mut self, document: DocumentKey, editor: EditorId) -> CycleTicket {
        let token = self.issued.entry(document.clone()).or_insert(0);
        *token += 1;
        CycleTicket {
            document,
            editor,
            token: *token,
        }
    }

    /// Validates a completed cycle and turns it into a publication.
    ///
    /// Returns `None` when the result is stale: the initiating editor is
    /// no longer the active one, or a newer cycle has been started for
    /// the document. Stale results are discarded entirely; no surface
    /// changes.
    pub fn apply(
        &mut self,
        ticket: &CycleTicket,
        result: LintRunResult,
        fault_key: DocumentKey,
        settings: &LintSettings,
    ) -> Option<Publication> {
        if self.active_editor.as_ref() != Some(&ticket.editor) {
            debug!(
                "Discarding stale result for {} (editor no longer active)",
                ticket.document
            );
            return None;
        }
        let newest = self.issued.get(&ticket.document).copied().unwrap_or(0);
        if ticket.token < newest {
            debug!(
                "Discarding superseded result for {} (cycle {} < {})",
                ticket.document, ticket.token, newest
            );
            return None;
        }

        let highlights = settings.show_highlights.then(|| Highlights {
            errors: result.errors().map(|d| d.range).collect(),
            warnings: result.warnings().map(|d| d.range).collect(),
            error_color: settings.error_background_color.clone(),
            warning_color: settings.warning_background_color.clone(),
        });
        let status_text = status::render_status(&settings.status_bar_text, &result);

        Some(Publication {
            document: ticket.document.clone(),
            diagnostics: result.diagnostics,
            highlights,
            fault_key,
            faults: result.faults,
            status_text,
        })
    }

    /// Drops all cycle state for a closed document.
    pub fn forget(&mut self, document: &DocumentKey) {
        self.issued.remove(document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    fn result_with_one_error() -> LintRunResult {
        LintRunResult {
            diagnostics: vec![Diagnostic {
                range: DiagnosticRange::to_next_line_start(0, 0),
                message: "Bad indent".to_string(),
                severity: Severity::Error,
            }],
            faults: Vec::new(),
        }
    }

    fn apply(
        reconciler: &mut DiagnosticReconciler,
        ticket: &CycleTicket,
    ) -> Option<Publication> {
        reconciler.apply(
            ticket,
            result_with_one_error(),
            "cfg".to_string(),
            &LintSettings::default(),
        )
    }

    #[test]
    fn test_current_cycle_publishes() {
        let mut reconciler = DiagnosticReconciler::new();
        reconciler.set_active_editor(Some("editor-1".to_string()));
        let ticket = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());

        let publication = apply(&mut reconciler, &ticket).expect("current cycle must publish");
        assert_eq!(publication.document, "doc");
        assert_eq!(publication.diagnostics.len(), 1);
        assert!(publication.highlights.is_some());
    }

    #[test]
    fn test_editor_change_discards_result() {
        let mut reconciler = DiagnosticReconciler::new();
        reconciler.set_active_editor(Some("editor-1".to_string()));
        let ticket = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());

        // The user switches editors while the linter runs.
        reconciler.set_active_editor(Some("editor-2".to_string()));
        assert!(apply(&mut reconciler, &ticket).is_none());
    }

    #[test]
    fn test_no_active_editor_discards_result() {
        let mut reconciler = DiagnosticReconciler::new();
        reconciler.set_active_editor(Some("editor-1".to_string()));
        let ticket = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());

        reconciler.set_active_editor(None);
        assert!(apply(&mut reconciler, &ticket).is_none());
    }

    #[test]
    fn test_superseded_cycle_discarded_even_if_it_finishes_last() {
        let mut reconciler = DiagnosticReconciler::new();
        reconciler.set_active_editor(Some("editor-1".to_string()));
        let old = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());
        let new = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());

        // The slower, older process completes after the newer one began.
        assert!(apply(&mut reconciler, &old).is_none());
        assert!(apply(&mut reconciler, &new).is_some());
    }

    #[test]
    fn test_tokens_are_per_document() {
        let mut reconciler = DiagnosticReconciler::new();
        reconciler.set_active_editor(Some("editor-1".to_string()));
        let a = reconciler.begin_cycle("a".to_string(), "editor-1".to_string());
        let _b = reconciler.begin_cycle("b".to_string(), "editor-1".to_string());

        // A cycle for another document never supersedes this one.
        assert!(apply(&mut reconciler, &a).is_some());
    }

    #[test]
    fn test_highlights_gated_by_setting() {
        let mut reconciler = DiagnosticReconciler::new();
        reconciler.set_active_editor(Some("editor-1".to_string()));
        let ticket = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());

        let settings = LintSettings {
            show_highlights: false,
            ..Default::default()
        };
        let publication = reconciler
            .apply(&ticket, result_with_one_error(), "cfg".to_string(), &settings)
            .unwrap();
        assert!(publication.highlights.is_none());
    }

    #[test]
    fn test_forget_resets_tokens() {
        let mut reconciler = DiagnosticReconciler::new();
        reconciler.set_active_editor(Some("editor-1".to_string()));
        let first = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());
        assert_eq!(first.token, 1);
        reconciler.forget(&"doc".to_string());
        let fresh = reconciler.begin_cycle("doc".to_string(), "editor-1".to_string());
        assert_eq!(fresh.token, 1);
    }
}
