//! Application layer errors.
//!
//! These errors represent failures in orchestration: plugins, output and
//! run control. Symbol and environment errors are `DomainError`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorCategory;

/// The run phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initialize,
    Collect,
    Generate,
    Write,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialize => "initialize",
            Self::Collect => "collect",
            Self::Generate => "generate",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Errors that occur during orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A plugin's administrator failed in one phase.
    #[error("administrator '{name}' failed during {phase}: {reason}")]
    Administrator {
        name: String,
        phase: Phase,
        reason: String,
    },

    /// Two administrators registered under one name.
    #[error("administrator '{name}' is already registered")]
    DuplicateAdministrator { name: String },

    /// Two generated units resolved to the same output file.
    #[error("generated output collision at {path}")]
    OutputCollision { path: PathBuf },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The run was cancelled before `phase` started.
    #[error("run cancelled before {phase}")]
    Cancelled { phase: Phase },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Administrator { name, .. } => vec![
                format!("Plugin '{}' reported an error", name),
                "Re-run with -vv to see the plugin's diagnostics".into(),
            ],
            Self::DuplicateAdministrator { name } => vec![
                format!("Only one plugin may register as '{}'", name),
                "Remove the duplicate from the plugin list".into(),
            ],
            Self::OutputCollision { path } => vec![
                format!("Two generators produced {}", path.display()),
                "Give the generated units distinct file names".into(),
                "Or switch to the per-project output strategy".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Run `kiln clean` before retrying".into(),
            ],
            Self::Cancelled { .. } => vec![
                "The run was cancelled".into(),
                "Partial output can be removed with `kiln clean`".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Administrator { .. } => ErrorCategory::Plugin,
            Self::DuplicateAdministrator { .. } => ErrorCategory::Configuration,
            Self::OutputCollision { .. } => ErrorCategory::Validation,
            Self::FilesystemError { .. } => ErrorCategory::Internal,
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
        }
    }
}
