//! External command construction and shell escaping.
//!
//! Two document-content strategies exist: file-based cycles pass the
//! saved path to the linter, text-change cycles pipe the live buffer
//! through the shell with a `--stdin-file-path` so the linter still
//! resolves names and excludes consistently. The buffer is arbitrary,
//! user-authored text, so the escaping must guarantee it can never
//! execute as a second shell command.

use std::path::{Path, PathBuf};

use crate::config::ResolvedConfig;

/// Name of the external linter binary.
pub const LINTER_BIN: &str = "scss-lint";

/// Editor lifecycle event that starts a lint cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Init,
    Save,
    ActiveEditorChange,
    TextChange,
}

impl TriggerEvent {
    /// Text-change cycles lint the live, possibly-unsaved buffer over
    /// standard input; every other trigger lints the file on disk.
    pub fn uses_stdin(self) -> bool {
        matches!(self, TriggerEvent::TextChange)
    }
}

/// Shell family the command line is built for.
///
/// Chosen once from the host operating system, never per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// POSIX `sh`: backslash escaping inside a double-quoted literal.
    Sh,
    /// Windows `cmd.exe`: environment-variable indirection, since cmd has
    /// no escape sequence for newlines.
    Cmd,
}

impl Shell {
    /// The shell for the host operating system.
    pub fn host() -> Self {
        if cfg!(windows) { Shell::Cmd } else { Shell::Sh }
    }

    /// Program name to execute.
    pub fn program(self) -> &'static str {
        match self {
            Shell::Sh => "sh",
            Shell::Cmd => "cmd",
        }
    }

    /// Flag introducing the command string.
    pub fn command_flag(self) -> &'static str {
        match self {
            Shell::Sh => "-c",
            Shell::Cmd => "/C",
        }
    }
}

/// A ready-to-execute linter invocation, opaque to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LintCommand {
    pub shell: Shell,
    pub command_line: String,
    /// Environment overrides required by the escaping strategy.
    pub env: Vec<(String, String)>,
    /// Process working directory; the config directory for file-based
    /// invocations.
    pub working_dir: Option<PathBuf>,
}

/// Escapes arbitrary document text for the given shell.
///
/// The escaped text is transparent to the linter and opaque to the
/// shell: it reaches the linter's standard input unchanged and cannot
/// terminate the quoted literal or start a second command. Returns the
/// escaped text plus any environment overrides the strategy needs.
pub fn escape_for_shell(text: &str, shell: Shell) -> (String, Vec<(String, String)>) {
    match shell {
        Shell::Sh => (escape_sh(text), Vec::new()),
        Shell::Cmd => escape_cmd(text),
    }
}

/// Inside a double-quoted `sh` literal only four characters stay live.
fn escape_sh(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '`' | '$' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `cmd.exe` substitutions, applied in order.
///
/// `%` must be rewritten first so the variable references inserted by
/// later substitutions survive. Newlines and metacharacters are routed
/// through environment variables expanded by the shell.
const CMD_SUBSTITUTIONS: &[(&str, &str, &str)] = &[
    ("%", "SCSSLINT_PCT", "%"),
    ("\r\n", "SCSSLINT_NL", "\n"),
    ("\n", "SCSSLINT_NL", "\n"),
    ("\"", "SCSSLINT_QUOTE", "\""),
    ("^", "SCSSLINT_CARET", "^"),
    ("&", "SCSSLINT_AMP", "&"),
    ("|", "SCSSLINT_PIPE", "|"),
    ("<", "SCSSLINT_LT", "<"),
    (">", "SCSSLINT_GT", ">"),
];

fn escape_cmd(text: &str) -> (String, Vec<(String, String)>) {
    let mut out = text.to_string();
    let mut env: Vec<(String, String)> = Vec::new();
    for (needle, var, value) in CMD_SUBSTITUTIONS {
        if out.contains(needle) {
            out = out.replace(needle, &format!("%{var}%"));
            if !env.iter().any(|(name, _)| name == var) {
                env.push((var.to_string(), value.to_string()));
            }
        }
    }
    (out, env)
}

/// Quotes a file-system path for the command line.
fn quote_path(path: &Path, shell: Shell) -> String {
    let raw = path.to_string_lossy();
    match shell {
        Shell::Sh => format!("\"{}\"", escape_sh(&raw)),
        // cmd has no in-quote escape for double quotes; strip them.
        Shell::Cmd => format!("\"{}\"", raw.replace('"', "")),
    }
}

/// Builds the platform command line for one lint cycle.
pub fn build(
    config: &ResolvedConfig,
    document_path: &Path,
    document_text: &str,
    trigger: TriggerEvent,
    shell: Shell,
) -> LintCommand {
    let config_flag = config
        .config_file
        .as_ref()
        .map(|path| format!(" -c {}", quote_path(path, shell)))
        .unwrap_or_default();
    let path = quote_path(document_path, shell);

    if trigger.uses_stdin() {
        let (escaped, env) = escape_for_shell(document_text, shell);
        let command_line = match shell {
            Shell::Sh => format!(
                "printf '%s' \"{escaped}\" | {LINTER_BIN} --no-color{config_flag} --stdin-file-path={path}"
            ),
            Shell::Cmd => format!(
                "echo {escaped}| {LINTER_BIN} --no-color{config_flag} --stdin-file-path={path}"
            ),
        };
        LintCommand {
            shell,
            command_line,
            env,
            working_dir: None,
        }
    } else {
        LintCommand {
            shell,
            command_line: format!("{LINTER_BIN} --no-color{config_flag} {path}"),
            env: Vec::new(),
            working_dir: config.config_dir.clone(),
        }
    }
}
