//! Debouncing for text-change notifications.
//!
//! Text changes fire at typing frequency. Each change schedules a lint
//! after a short quiet period; the lint only runs if the document
//! version is still the one the change carried, so only the last change
//! in a burst starts a cycle.

use std::time::Duration;

use tower_lsp::lsp_types::Url;
use tracing::error;

use crate::state::{BackendState, SharedState};

/// Quiet period before a text change starts a lint cycle.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Spawns a debounced lint task.
///
/// Waits for the quiet period, then invokes `on_current` only if the
/// document version is unchanged.
pub(crate) fn spawn_debounced_lint<F, Fut>(
    state: SharedState,
    uri: Url,
    version: i32,
    on_current: F,
) where
    F: FnOnce(Url) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(DEFAULT_DEBOUNCE_MS)).await;

        if version_is_current(&state, &uri, version) {
            on_current(uri).await;
        }
    });
}

/// Checks whether the document version is still current.
fn version_is_current(state: &BackendState, uri: &Url, version: i32) -> bool {
    let docs = match state.documents.read() {
        Ok(g) => g,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return false;
        }
    };

    docs.get(uri)
        .map(|doc| doc.version == version)
        .unwrap_or(false)
}
