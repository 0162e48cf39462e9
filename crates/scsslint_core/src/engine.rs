//! One lint cycle: resolve, gate, build, execute, parse.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::command::{self, Shell, TriggerEvent};
use crate::config::{self, ResolvedConfig};
use crate::diagnostics::LintRunResult;
use crate::parser;
use crate::process::ProcessHost;
use crate::settings::LintSettings;

/// Everything a cycle needs from the editing surface.
#[derive(Debug, Clone)]
pub struct LintRequest {
    /// On-disk path of the document.
    pub document_path: PathBuf,
    /// Live buffer content, which may be ahead of the file on disk.
    pub document_text: String,
    /// The event that started this cycle.
    pub trigger: TriggerEvent,
    /// Workspace root, the base for relative `configDir` settings.
    pub workspace_root: Option<PathBuf>,
}

/// Why a cycle ended before the linter was spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The document matched an exclusion pattern; surfaces untouched.
    Excluded,
}

/// Outcome of one cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Abandoned with no process spawned and no diagnostics changed.
    Skipped(SkipReason),
    /// The linter ran (or failed to run); the result carries the
    /// diagnostics and faults to reconcile.
    Completed {
        result: LintRunResult,
        config: ResolvedConfig,
    },
}

/// Drives a single linter invocation end to end.
///
/// Stateless apart from the process host: settings arrive as an
/// argument, and the resolved configuration lives only for the cycle.
#[derive(Clone)]
pub struct LintEngine {
    host: Arc<dyn ProcessHost>,
    shell: Shell,
}

impl LintEngine {
    /// Creates an engine targeting the host operating system's shell.
    pub fn new(host: Arc<dyn ProcessHost>) -> Self {
        Self {
            host,
            shell: Shell::host(),
        }
    }

    /// Creates an engine with an explicit shell, for tests.
    pub fn with_shell(host: Arc<dyn ProcessHost>, shell: Shell) -> Self {
        Self { host, shell }
    }

    /// Runs one lint cycle for the given request.
    ///
    /// Process failures are not errors: they degrade to a result whose
    /// only content is a fault diagnostic.
    pub async fn run_cycle(&self, request: &LintRequest, settings: &LintSettings) -> CycleOutcome {
        let config = config::resolve(
            &request.document_path,
            settings,
            request.workspace_root.as_deref(),
        );

        if config.is_excluded(&request.document_path) {
            debug!(
                "{} matches an exclude pattern, skipping cycle",
                request.document_path.display()
            );
            return CycleOutcome::Skipped(SkipReason::Excluded);
        }

        let command = command::build(
            &config,
            &request.document_path,
            &request.document_text,
            request.trigger,
            self.shell,
        );

        let result = match self.host.run(&command).await {
            Ok(output) => {
                // The shell can start while the linter itself is missing;
                // the only trace is on stderr.
                if output.stdout.is_empty() && !output.stderr.is_empty() {
                    debug!("Linter wrote only to stderr: {}", output.stderr.trim_end());
                }
                parser::parse(&output.stdout, config.final_newline, &request.document_text)
            }
            Err(e) => LintRunResult::from_fault(e.to_string()),
        };

        CycleOutcome::Completed { result, config }
    }
}
