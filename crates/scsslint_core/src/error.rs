//! Engine error types.

use thiserror::Error;

/// Errors that can occur while driving the external linter.
///
/// None of these are fatal to the host: configuration errors degrade to
/// "no config" and process errors degrade to fault diagnostics.
#[derive(Debug, Error)]
pub enum LintError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process execution error.
    #[error("Process error: {0}")]
    Process(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LintError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a process execution error.
    pub fn process(message: impl Into<String>) -> Self {
        Self::Process(message.into())
    }
}
