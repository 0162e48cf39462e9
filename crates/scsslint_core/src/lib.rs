//! # scsslint_core
//!
//! Lint invocation and diagnostic reconciliation engine for the external
//! `scss-lint` stylesheet linter.
//!
//! This crate provides:
//! - `.scss-lint.yml` discovery and raw-text probing
//! - Safe cross-platform command construction (including piping live,
//!   unsaved buffer content through the shell)
//! - Resilient parsing of the linter's text output into typed diagnostics
//! - Staleness-safe reconciliation of results against the active editor
//! - Event-driven scheduling of lint cycles
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scsslint_core::{LintEngine, LintRequest, LintSettings, SystemProcessHost, TriggerEvent};
//!
//! let engine = LintEngine::new(Arc::new(SystemProcessHost::new()));
//! let request = LintRequest {
//!     document_path: "style/main.scss".into(),
//!     document_text: std::fs::read_to_string("style/main.scss")?,
//!     trigger: TriggerEvent::Save,
//!     workspace_root: None,
//! };
//! let outcome = engine.run_cycle(&request, &LintSettings::default()).await;
//! ```

pub mod command;
pub mod config;
mod diagnostics;
mod engine;
mod error;
pub mod parser;
pub mod process;
mod reconcile;
mod scheduler;
mod settings;
pub mod status;

pub use command::{LintCommand, Shell, TriggerEvent, escape_for_shell};
pub use config::{CONFIG_FILE_NAME, FinalNewlinePolicy, ResolvedConfig};
pub use diagnostics::{
    Diagnostic, DiagnosticRange, FAULT_PREFIX, LintRunResult, ProcessFault, Severity,
};
pub use engine::{CycleOutcome, LintEngine, LintRequest, SkipReason};
pub use error::LintError;
pub use process::{ProcessHost, ProcessOutput, SystemProcessHost};
pub use reconcile::{
    CycleTicket, DiagnosticReconciler, DocumentKey, EditorId, Highlights, Publication,
};
pub use scheduler::{DocumentView, ScheduleOutcome, TriggerScheduler};
pub use settings::{LintSettings, SettingsProvider};
