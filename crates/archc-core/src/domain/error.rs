// ============================================================================
// domain/error.rs - DOMAIN CONSTRUCTION AND INVARIANT ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Raised when a domain value cannot be constructed (missing required data,
/// malformed names or type references) or when a pure domain algorithm is
/// handed input it cannot work with (malformed custom blocks).
///
/// All errors are:
/// - Cloneable (so they can be attached to diagnostics)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid type reference '{input}': {reason}")]
    InvalidTypeReference { input: String, reason: String },

    #[error("Duplicate member '{member}' in {owner}")]
    DuplicateMember { owner: String, member: String },

    #[error("Invalid diagnostic code {code}: {reason}")]
    InvalidDiagnosticCode { code: String, reason: String },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    // ========================================================================
    // Algorithm Input Errors
    // ========================================================================
    #[error("Malformed custom blocks at line {line}: {reason}")]
    MalformedCustomBlocks { line: usize, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingRequiredField { field } => vec![
                format!("Provide a value for '{}'", field),
                "Check the source element the model was extracted from".into(),
            ],
            Self::InvalidTypeReference { input, .. } => vec![
                format!("Could not read type '{}'", input),
                "Use the canonical form, e.g. java.util.List<com.acme.Order>".into(),
            ],
            Self::MalformedCustomBlocks { line, .. } => vec![
                format!("Check the custom block markers around line {}", line),
                "Every 'archc:custom-begin <id>' needs a matching 'archc:custom-end <id>'".into(),
                "Custom blocks cannot be nested and ids must be unique".into(),
            ],
            Self::DuplicateMember { owner, member } => vec![
                format!("'{}' declares '{}' more than once", owner, member),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidName { .. }
            | Self::InvalidTypeReference { .. }
            | Self::DuplicateMember { .. }
            | Self::MalformedCustomBlocks { .. } => ErrorCategory::Validation,
            Self::InvalidArtifact(_) => ErrorCategory::Validation,
            Self::MissingRequiredField { .. } | Self::InvalidDiagnosticCode { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
