//! Event-driven pipeline orchestration.
//!
//! Each lifecycle event invokes the full pipeline once: resolve config,
//! build and execute the command, parse the output, reconcile the
//! result. There is no time slicing and no cancellation of in-flight
//! processes; staleness is handled entirely at completion time by the
//! reconciler.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::command::TriggerEvent;
use crate::engine::{CycleOutcome, LintEngine, LintRequest, SkipReason};
use crate::reconcile::{DiagnosticReconciler, DocumentKey, EditorId, Publication};
use crate::settings::SettingsProvider;

/// Snapshot of the active document at trigger time.
#[derive(Debug, Clone)]
pub struct DocumentView {
    pub key: DocumentKey,
    pub editor: EditorId,
    pub path: PathBuf,
    pub text: String,
    pub language_id: String,
}

/// What the surface should do after one event.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    /// Clear diagnostics and hide status for the document (wrong
    /// language), or just hide status when no editor is active.
    Cleared(Option<DocumentKey>),
    /// Nothing ran and surfaces are untouched.
    Skipped,
    /// A validated publication to forward to the rendering collaborator.
    Publish(Publication),
    /// The completed cycle was stale and discarded.
    Stale,
}

/// Subscribes the pipeline to editor lifecycle events.
pub struct TriggerScheduler {
    engine: LintEngine,
    settings: Arc<dyn SettingsProvider>,
    reconciler: Mutex<DiagnosticReconciler>,
}

impl TriggerScheduler {
    pub fn new(engine: LintEngine, settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            engine,
            settings,
            reconciler: Mutex::new(DiagnosticReconciler::new()),
        }
    }

    /// Handles one lifecycle event end to end.
    ///
    /// Settings are a fresh read at the top of every cycle. `TextChange`
    /// events are gated on `runOnTextChange`; documents whose language
    /// is not configured get their surfaces cleared instead of linted.
    pub async fn on_event(
        &self,
        trigger: TriggerEvent,
        view: Option<DocumentView>,
        workspace_root: Option<PathBuf>,
    ) -> ScheduleOutcome {
        let settings = self.settings.settings();

        let Some(view) = view else {
            self.reconciler.lock().set_active_editor(None);
            return ScheduleOutcome::Cleared(None);
        };

        self.reconciler
            .lock()
            .set_active_editor(Some(view.editor.clone()));

        if !settings.is_language_enabled(&view.language_id) {
            debug!(
                "Language '{}' not configured for linting, clearing {}",
                view.language_id, view.key
            );
            return ScheduleOutcome::Cleared(Some(view.key));
        }

        if trigger == TriggerEvent::TextChange && !settings.run_on_text_change {
            return ScheduleOutcome::Skipped;
        }

        let ticket = self
            .reconciler
            .lock()
            .begin_cycle(view.key.clone(), view.editor.clone());

        let request = LintRequest {
            document_path: view.path.clone(),
            document_text: view.text.clone(),
            trigger,
            workspace_root,
        };

        match self.engine.run_cycle(&request, &settings).await {
            CycleOutcome::Skipped(SkipReason::Excluded) => ScheduleOutcome::Skipped,
            CycleOutcome::Completed { result, config } => {
                let fault_key = config
                    .config_file
                    .as_ref()
                    .map(|path| path.to_string_lossy().into_owned())
                    .unwrap_or_else(|| view.key.clone());
                match self
                    .reconciler
                    .lock()
                    .apply(&ticket, result, fault_key, &settings)
                {
                    Some(publication) => ScheduleOutcome::Publish(publication),
                    None => ScheduleOutcome::Stale,
                }
            }
        }
    }

    /// Drops reconciler state for a closed document.
    pub fn forget_document(&self, key: &DocumentKey) {
        self.reconciler.lock().forget(key);
    }
}
