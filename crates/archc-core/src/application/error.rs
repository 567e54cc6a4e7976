//! Application layer errors.
//!
//! These errors represent failures in orchestration, not analysis results.
//! Findings about the analyzed sources are diagnostics, see
//! `crate::domain::diagnostics`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The source model could not be found.
    #[error("Source model not found: {path}")]
    ModelNotFound { path: PathBuf },

    /// The source model exists but cannot be read.
    #[error("Invalid source model {path}: {reason}")]
    InvalidModel { path: PathBuf, reason: String },

    /// The plugin catalog could not produce its plugins.
    #[error("Plugin discovery failed: {reason}")]
    PluginDiscovery { reason: String },

    /// A plugin gave up while generating.
    #[error("Plugin '{plugin}' failed: {reason}")]
    PluginFailed { plugin: String, reason: String },

    /// Plugin options could not be read.
    #[error("Invalid plugin options: {reason}")]
    InvalidOptions { reason: String },
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn plugin_failed(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PluginFailed {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::ModelNotFound { path } => vec![
                format!("Nothing found at {}", path.display()),
                "Pass a JSON model file or a directory of JSON files".into(),
            ],
            Self::InvalidModel { path, .. } => vec![
                format!("Check the JSON in {}", path.display()),
                "Types are written in canonical form, e.g. java.util.List<com.acme.Order>".into(),
            ],
            Self::PluginDiscovery { .. } => vec![
                "Run: archc plugins to see the available plugin ids".into(),
                "Check the ids listed in your plugin manifest".into(),
            ],
            Self::InvalidOptions { .. } => vec![
                "Options live in [plugins.<plugin-id>] tables".into(),
                "Values may be strings, booleans, integers, lists or tables".into(),
            ],
            Self::PluginFailed { plugin, .. } => vec![
                format!("Check the options given to '{}'", plugin),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } => ErrorCategory::Internal,
            Self::ModelNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidModel { .. } => ErrorCategory::Validation,
            Self::PluginDiscovery { .. } | Self::InvalidOptions { .. } => ErrorCategory::Configuration,
            Self::PluginFailed { .. } => ErrorCategory::Internal,
        }
    }
}
