//! ScssLint bridge LSP server.
//!
//! Adapts editor lifecycle notifications to the engine's trigger events:
//! `didOpen` is the initial activation (or an active-editor change),
//! `didSave` lints the saved file, and `didChange` lints the live buffer
//! after a debounced quiet period. Diagnostics are published per
//! document, linter faults are published against the config file, and
//! status text and highlight ranges travel as custom notifications.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, error, info};

use scsslint_core::{
    DocumentView, LintEngine, LintSettings, Publication, ScheduleOutcome, SystemProcessHost,
    TriggerEvent, TriggerScheduler,
};

mod conversion;
mod debounce;
pub mod notify;
mod state;

use notify::{HighlightsNotification, HighlightsParams, StatusNotification, StatusParams};
use state::{BackendState, DocumentData, SharedSettings, SharedState};

/// The LSP backend for the scss-lint bridge.
#[derive(Clone)]
pub struct Backend {
    /// LSP client for publishing diagnostics and notifications.
    client: Client,
    /// Shared state.
    state: SharedState,
    /// Pipeline driver; one lint cycle per trigger event.
    scheduler: Arc<TriggerScheduler>,
}

impl Backend {
    /// Creates a new backend with the given client.
    pub fn new(client: Client) -> Self {
        let state: SharedState = Arc::new(BackendState::new());
        let engine = LintEngine::new(Arc::new(SystemProcessHost::new()));
        let scheduler = Arc::new(TriggerScheduler::new(
            engine,
            Arc::new(SharedSettings(state.clone())),
        ));

        Self {
            client,
            state,
            scheduler,
        }
    }

    /// Snapshot of an open document for the scheduler.
    fn document_view(&self, uri: &Url) -> Option<DocumentView> {
        let path = uri.to_file_path().ok()?;
        let docs = match self.state.documents.read() {
            Ok(g) => g,
            Err(e) => {
                error!("Documents lock poisoned: {}", e);
                return None;
            }
        };
        let doc = docs.get(uri)?;
        Some(DocumentView {
            key: uri.to_string(),
            editor: uri.to_string(),
            path,
            text: doc.text.clone(),
            language_id: doc.language_id.clone(),
        })
    }

    /// Runs one lint cycle for a trigger and applies the outcome.
    async fn run_trigger(&self, uri: &Url, trigger: TriggerEvent) {
        debug!("Trigger {:?} for {}", trigger, uri);
        let view = self.document_view(uri);
        let workspace_root = match self.state.workspace_root.read() {
            Ok(g) => g.clone(),
            Err(e) => {
                error!("Workspace root lock poisoned: {}", e);
                None
            }
        };

        let outcome = self.scheduler.on_event(trigger, view, workspace_root).await;
        self.apply_outcome(outcome).await;
    }

    async fn apply_outcome(&self, outcome: ScheduleOutcome) {
        match outcome {
            ScheduleOutcome::Publish(publication) => self.publish(publication).await,
            ScheduleOutcome::Cleared(Some(key)) => {
                if let Some(url) = conversion::key_to_url(&key) {
                    self.client
                        .publish_diagnostics(url.clone(), Vec::new(), None)
                        .await;
                    self.client
                        .send_notification::<HighlightsNotification>(HighlightsParams::cleared(
                            url,
                        ))
                        .await;
                }
                self.client
                    .send_notification::<StatusNotification>(StatusParams { text: None })
                    .await;
            }
            ScheduleOutcome::Cleared(None) => {
                self.client
                    .send_notification::<StatusNotification>(StatusParams { text: None })
                    .await;
            }
            ScheduleOutcome::Skipped | ScheduleOutcome::Stale => {}
        }
    }

    /// Publishes a validated cycle, replacing prior state per key.
    async fn publish(&self, publication: Publication) {
        let mut document_diagnostics: Vec<Diagnostic> = publication
            .diagnostics
            .iter()
            .map(conversion::to_lsp_diagnostic)
            .collect();
        let fault_diagnostics: Vec<Diagnostic> = publication
            .faults
            .iter()
            .map(conversion::fault_to_lsp_diagnostic)
            .collect();

        // Without a resolved config file, faults share the document key;
        // publishing them separately would overwrite the rule
        // violations.
        let faults_share_document = publication.fault_key == publication.document;
        if faults_share_document {
            document_diagnostics.extend(fault_diagnostics.iter().cloned());
        }

        if let Some(url) = conversion::key_to_url(&publication.document) {
            self.client
                .publish_diagnostics(url.clone(), document_diagnostics, None)
                .await;

            if let Some(highlights) = &publication.highlights {
                self.client
                    .send_notification::<HighlightsNotification>(HighlightsParams {
                        uri: url,
                        errors: highlights.errors.iter().map(conversion::to_lsp_range).collect(),
                        warnings: highlights
                            .warnings
                            .iter()
                            .map(conversion::to_lsp_range)
                            .collect(),
                        error_color: highlights.error_color.clone(),
                        warning_color: highlights.warning_color.clone(),
                    })
                    .await;
            }
        }

        if !faults_share_document
            && let Some(fault_url) = conversion::key_to_url(&publication.fault_key)
        {
            self.client
                .publish_diagnostics(fault_url, fault_diagnostics, None)
                .await;
        }

        self.client
            .send_notification::<StatusNotification>(StatusParams {
                text: Some(publication.status_text),
            })
            .await;
    }

    /// Replaces the stored settings object.
    fn update_settings(&self, value: &serde_json::Value) {
        // Hosts may nest the section under its configuration key.
        let section = value.get("scssLint").unwrap_or(value);
        let settings = LintSettings::from_json(section);
        match self.state.settings.write() {
            Ok(mut guard) => *guard = settings,
            Err(e) => error!("Settings lock poisoned: {}", e),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("scss-lint bridge initializing...");

        if let Some(path) = params.root_uri.and_then(|u| u.to_file_path().ok()) {
            match self.state.workspace_root.write() {
                Ok(mut root) => *root = Some(path),
                Err(e) => error!("Workspace root lock poisoned: {}", e),
            }
        }

        if let Some(options) = params.initialization_options {
            self.update_settings(&options);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "scsslint-bridge".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "scss-lint bridge initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("scss-lint bridge shutting down...");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document opened: {}", uri);

        {
            let mut docs = match self.state.documents.write() {
                Ok(g) => g,
                Err(e) => {
                    error!("Documents lock poisoned: {}", e);
                    return;
                }
            };
            docs.insert(
                uri.clone(),
                DocumentData {
                    text: params.text_document.text,
                    version: params.text_document.version,
                    language_id: params.text_document.language_id,
                },
            );
        }

        // The first open is the activation pass; later opens are the
        // editing surface switching editors.
        let trigger = if self.state.activated.swap(true, Ordering::SeqCst) {
            TriggerEvent::ActiveEditorChange
        } else {
            TriggerEvent::Init
        };
        self.run_trigger(&uri, trigger).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // Full sync: the last change carries the whole document.
        let Some(change) = params.content_changes.into_iter().next_back() else {
            return;
        };

        {
            let mut docs = match self.state.documents.write() {
                Ok(g) => g,
                Err(e) => {
                    error!("Documents lock poisoned: {}", e);
                    return;
                }
            };
            if let Some(doc) = docs.get_mut(&uri) {
                doc.text = change.text;
                doc.version = version;
            }
        }

        let backend = self.clone();
        debounce::spawn_debounced_lint(self.state.clone(), uri, version, move |uri| async move {
            backend.run_trigger(&uri, TriggerEvent::TextChange).await;
        });
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document saved: {}", uri);

        if let Some(text) = params.text {
            let mut docs = match self.state.documents.write() {
                Ok(g) => g,
                Err(e) => {
                    error!("Documents lock poisoned: {}", e);
                    return;
                }
            };
            if let Some(doc) = docs.get_mut(&uri) {
                doc.text = text;
            }
        }

        self.run_trigger(&uri, TriggerEvent::Save).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document closed: {}", uri);

        {
            let mut docs = match self.state.documents.write() {
                Ok(g) => g,
                Err(e) => {
                    error!("Documents lock poisoned: {}", e);
                    return;
                }
            };
            docs.remove(&uri);
        }
        self.scheduler.forget_document(&uri.to_string());

        self.client
            .publish_diagnostics(uri.clone(), Vec::new(), None)
            .await;
        self.client
            .send_notification::<HighlightsNotification>(HighlightsParams::cleared(uri))
            .await;
        self.client
            .send_notification::<StatusNotification>(StatusParams { text: None })
            .await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        debug!("Configuration changed");
        self.update_settings(&params.settings);
    }
}

/// Starts the LSP server on stdio.
///
/// Does not return unless the client disconnects or the server shuts
/// down.
pub async fn run() {
    info!("scss-lint bridge LSP server starting...");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
