//! LSP backend state management.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

use tower_lsp::lsp_types::Url;
use tracing::error;

use scsslint_core::{LintSettings, SettingsProvider};

/// Document content cache.
#[derive(Debug)]
pub(crate) struct DocumentData {
    pub text: String,
    pub version: i32,
    pub language_id: String,
}

/// Shared backend state.
pub(crate) struct BackendState {
    /// Open document contents.
    pub documents: RwLock<HashMap<Url, DocumentData>>,
    /// Current editor settings; replaced wholesale on configuration
    /// changes and read fresh at the top of every lint cycle.
    pub settings: RwLock<LintSettings>,
    /// Workspace root path.
    pub workspace_root: RwLock<Option<PathBuf>>,
    /// Whether the first document has been opened (the initial
    /// activation pass).
    pub activated: AtomicBool,
}

impl fmt::Debug for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendState")
            .field("documents", &"<HashMap<Url, DocumentData>>")
            .field("workspace_root", &self.workspace_root)
            .finish()
    }
}

impl BackendState {
    /// Creates a new empty state.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            settings: RwLock::new(LintSettings::default()),
            workspace_root: RwLock::new(None),
            activated: AtomicBool::new(false),
        }
    }
}

impl Default for BackendState {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for shared state.
pub(crate) type SharedState = Arc<BackendState>;

/// Fresh settings reads backed by the shared state.
pub(crate) struct SharedSettings(pub SharedState);

impl SettingsProvider for SharedSettings {
    fn settings(&self) -> LintSettings {
        match self.0.settings.read() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                error!("Settings lock poisoned: {}", e);
                LintSettings::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_settings_reads_current_value() {
        let state = Arc::new(BackendState::new());
        let provider = SharedSettings(state.clone());
        assert!(!provider.settings().run_on_text_change);

        {
            let mut settings = state.settings.write().unwrap();
            settings.run_on_text_change = true;
        }
        assert!(provider.settings().run_on_text_change);
    }
}
