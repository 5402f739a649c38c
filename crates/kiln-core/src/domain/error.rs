// ============================================================================
// domain/error.rs - ENVIRONMENT & SYMBOL ERRORS
// ============================================================================

use thiserror::Error;

/// Domain error type.
///
/// All errors are:
/// - Cloneable (collected into run reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Symbol graph
    // ========================================================================
    #[error("symbol graph unavailable for project '{project}': {reason}")]
    GraphAccess { project: String, reason: String },

    #[error("project '{project}' has no symbol source")]
    NoSymbolSource { project: String },

    #[error("symbols for project '{project}' were already collected")]
    AlreadyCollected { project: String },

    // ========================================================================
    // Environment construction
    // ========================================================================
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("Duplicate project name: {name}")]
    DuplicateProject { name: String },

    #[error("Projects '{first}' and '{second}' share the directory {directory}")]
    SharedProjectDirectory {
        first: String,
        second: String,
        directory: String,
    },

    // ========================================================================
    // Administrator protocol
    // ========================================================================
    #[error("administrator '{administrator}' cannot move from {from} to {to}")]
    InvalidTransition {
        administrator: String,
        from: String,
        to: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::GraphAccess { project, .. } => vec![
                format!("Check the symbol manifest of project '{}'", project),
                "Regenerate the manifest with your front end and retry".into(),
            ],
            Self::DuplicateProject { name } => vec![
                format!("Two projects are named '{}'", name),
                "Rename one of the project directories".into(),
            ],
            Self::SharedProjectDirectory { directory, .. } => vec![
                format!("Only one project may generate into {}", directory),
                "The source root belongs to the common project; move manifests into subdirectories"
                    .into(),
            ],
            Self::InvalidEnvironment(msg) => vec![
                "Check the [generation] and [output] configuration".into(),
                format!("Details: {}", msg),
            ],
            _ => vec!["This is likely a bug in a plugin or the orchestrator".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::GraphAccess { .. } => ErrorCategory::NotFound,
            Self::InvalidEnvironment(_)
            | Self::DuplicateProject { .. }
            | Self::SharedProjectDirectory { .. } => ErrorCategory::Validation,
            Self::NoSymbolSource { .. }
            | Self::AlreadyCollected { .. }
            | Self::InvalidTransition { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
