//! Status-bar text rendering.

use crate::diagnostics::LintRunResult;

/// Substitutes the named placeholders of a status template.
///
/// Supported placeholders: `{diagnostics.length}`, `{errors.length}`,
/// `{warnings.length}`, `{exits.length}`. Substitution is purely
/// textual; the template is never evaluated as code.
pub fn render_status(template: &str, result: &LintRunResult) -> String {
    template
        .replace(
            "{diagnostics.length}",
            &result.diagnostics.len().to_string(),
        )
        .replace("{errors.length}", &result.errors().count().to_string())
        .replace("{warnings.length}", &result.warnings().count().to_string())
        .replace("{exits.length}", &result.faults.len().to_string())
}
