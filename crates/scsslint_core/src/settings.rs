//! The editor-facing settings surface.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

/// Settings supplied by the host editor's configuration.
///
/// Reloaded at the start of every lint cycle and never assumed stable
/// between cycles; the host may change any of these at any time.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LintSettings {
    /// Background color for error highlight decorations.
    pub error_background_color: String,
    /// Background color for warning highlight decorations.
    pub warning_background_color: String,
    /// Language identifiers eligible for linting.
    pub languages: Vec<String>,
    /// Status-bar template with named placeholders; substituted
    /// textually, never evaluated.
    pub status_bar_text: String,
    /// Whether to emit inline highlight ranges.
    pub show_highlights: bool,
    /// Whether `TextChange` events trigger lint cycles.
    pub run_on_text_change: bool,
    /// Explicit config directory, overriding upward discovery.
    pub config_dir: Option<PathBuf>,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            error_background_color: "rgba(200, 0, 0, 0.35)".to_string(),
            warning_background_color: "rgba(200, 160, 0, 0.35)".to_string(),
            languages: vec!["scss".to_string()],
            status_bar_text: "$(alert) scss-lint: {errors.length} errors, {warnings.length} warnings"
                .to_string(),
            show_highlights: true,
            run_on_text_change: false,
            config_dir: None,
        }
    }
}

impl LintSettings {
    /// Deserializes settings from the host's configuration JSON.
    ///
    /// Unknown keys are ignored; a malformed object degrades to the
    /// defaults rather than failing the lint cycle.
    pub fn from_json(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Malformed settings object, using defaults: {}", e);
            Self::default()
        })
    }

    /// Whether the given language identifier is configured for linting.
    pub fn is_language_enabled(&self, language_id: &str) -> bool {
        self.languages.iter().any(|l| l == language_id)
    }
}

/// A fresh settings read performed at the top of each lint cycle.
pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> LintSettings;
}

impl SettingsProvider for LintSettings {
    fn settings(&self) -> LintSettings {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = LintSettings::default();
        assert_eq!(settings.languages, vec!["scss".to_string()]);
        assert!(settings.show_highlights);
        assert!(!settings.run_on_text_change);
        assert!(settings.config_dir.is_none());
    }

    #[test]
    fn test_from_json_camel_case_keys() {
        let value = serde_json::json!({
            "errorBackgroundColor": "#f00",
            "warningBackgroundColor": "#fa0",
            "languages": ["scss", "sass"],
            "statusBarText": "{errors.length}E {warnings.length}W",
            "showHighlights": false,
            "runOnTextChange": true,
            "configDir": "config/lint"
        });

        let settings = LintSettings::from_json(&value);
        assert_eq!(settings.error_background_color, "#f00");
        assert_eq!(settings.languages.len(), 2);
        assert!(!settings.show_highlights);
        assert!(settings.run_on_text_change);
        assert_eq!(settings.config_dir, Some(PathBuf::from("config/lint")));
    }

    #[test]
    fn test_from_json_partial_object_fills_defaults() {
        let value = serde_json::json!({ "languages": ["sass"] });
        let settings = LintSettings::from_json(&value);
        assert_eq!(settings.languages, vec!["sass".to_string()]);
        assert!(settings.show_highlights);
    }

    #[test]
    fn test_from_json_malformed_falls_back_to_defaults() {
        let value = serde_json::json!({ "languages": "not-an-array" });
        let settings = LintSettings::from_json(&value);
        assert_eq!(settings, LintSettings::default());
    }

    #[test]
    fn test_language_filter() {
        let settings = LintSettings::default();
        assert!(settings.is_language_enabled("scss"));
        assert!(!settings.is_language_enabled("rust"));
    }
}
