//! Error handling for the archc CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use archc_core::error::ArchError;

pub use archc_core::error::ErrorCategory as CoreCategory;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The compilation ran but reported error diagnostics.
    #[error("Compilation failed with {errors} error(s)")]
    CompilationFailed { errors: usize },

    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `archc-core` or an adapter.
    #[error("{0}")]
    Core(#[from] ArchError),

    #[error("Output could not be serialised: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    pub fn config(error: anyhow::Error) -> Self {
        Self::ConfigError {
            message: format!("{error:#}"),
            source: None,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],
            Self::CompilationFailed { .. } => vec![
                "Fix the error diagnostics listed above".into(),
                "Use --lenient to generate despite validation errors".into(),
            ],
            Self::ConfigError { .. } => vec![
                format!("Check your config file at {}", crate::config::AppConfig::config_path().display()),
                "Environment overrides use ARCHC_<SECTION>__<KEY>".into(),
            ],
            Self::Core(core) => core.suggestions(),
            Self::Serialization(_) => vec!["This is a bug, please report it".into()],
            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
                "Check available disk space".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::CompilationFailed { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::Serialization(_) | Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut lines = vec![
            String::new(),
            format!("{} {}", "✗".red().bold(), "Error:".red().bold()),
            String::new(),
            format!("  {}", self.to_string().red()),
        ];

        if verbose {
            for cause in self.causes() {
                lines.push(format!("  {} {}", "→".dimmed(), cause.dimmed()));
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            lines.push(String::new());
            lines.push("Suggestions:".yellow().bold().to_string());
            lines.extend(suggestions.into_iter().map(|s| format!("  {s}")));
        }

        if !verbose {
            lines.push(String::new());
            lines.push(format!(
                "{} {}",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed()
            ));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut lines = vec![String::new(), format!("Error: {self}")];

        if verbose {
            lines.extend(self.causes().into_iter().map(|cause| format!("  Caused by: {cause}")));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            lines.push(String::new());
            lines.push("Suggestions:".into());
            lines.extend(suggestions.into_iter().map(|s| format!("  {s}")));
        }

        if !verbose {
            lines.push(String::new());
            lines.push("Use -v / --verbose for more details.".into());
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut source = self.source();
        while let Some(err) = source {
            causes.push(err.to_string());
            source = err.source();
        }
        causes
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use archc_core::application::ApplicationError;
    use std::io;

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn compilation_failure_is_a_user_error() {
        assert_eq!(CliError::CompilationFailed { errors: 2 }.exit_code(), 2);
    }

    #[test]
    fn missing_model_is_not_found() {
        let err = CliError::Core(
            ApplicationError::ModelNotFound {
                path: "model.json".into(),
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn exit_code_configuration() {
        let err = CliError::ConfigError {
            message: "x".into(),
            source: None,
        };
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn exit_code_internal() {
        let err = CliError::from(io::Error::other("e"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn invalid_options_map_to_configuration() {
        let err = CliError::Core(
            ApplicationError::InvalidOptions {
                reason: "bad".into(),
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 4);
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let s = CliError::CompilationFailed { errors: 1 }.format_plain(false);
        assert!(s.contains("Error: Compilation failed with 1 error(s)"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_omits_hint() {
        let s = CliError::InvalidInput { message: "x".into() }.format_plain(true);
        assert!(!s.contains("--verbose"));
    }
}
