//! Custom notifications for surfaces the LSP does not model.
//!
//! Status-bar text and background-color decorations have no standard
//! protocol representation, so they travel as server-to-client custom
//! notifications the editor extension renders.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{Range, Url};

/// Status-bar text for the active editor; `None` hides it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub text: Option<String>,
}

pub enum StatusNotification {}

impl Notification for StatusNotification {
    type Params = StatusParams;
    const METHOD: &'static str = "scssLint/status";
}

/// Inline highlight ranges for one document, replacing any previous set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightsParams {
    pub uri: Url,
    pub errors: Vec<Range>,
    pub warnings: Vec<Range>,
    pub error_color: String,
    pub warning_color: String,
}

impl HighlightsParams {
    /// An empty set that clears all decorations for the document.
    pub fn cleared(uri: Url) -> Self {
        Self {
            uri,
            errors: Vec::new(),
            warnings: Vec::new(),
            error_color: String::new(),
            warning_color: String::new(),
        }
    }
}

pub enum HighlightsNotification {}

impl Notification for HighlightsNotification {
    type Params = HighlightsParams;
    const METHOD: &'static str = "scssLint/highlights";
}
