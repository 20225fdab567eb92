//! Error types for workflow operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a single workflow operation.
///
/// Each variant is displayable as-is in the log pane; none of them is fatal to
/// the application.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The caller invoked an operation without the required prior state
    #[error("{0}")]
    Precondition(String),

    /// A child process failed or could not be launched
    #[error("external tool failed: {0}")]
    ExternalTool(String),

    /// A configured file is absent
    #[error("required file not found: {}", .0.display())]
    MissingResource(PathBuf),

    /// A filesystem operation failed mid-operation
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The detection run was cancelled by the user
    #[error("detection cancelled")]
    Cancelled,
}

impl WorkflowError {
    pub fn no_folder() -> Self {
        WorkflowError::Precondition("no folder selected".into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        WorkflowError::Io {
            context: context.into(),
            source,
        }
    }

    /// Short category label for the log pane.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Precondition(_) => "precondition",
            WorkflowError::ExternalTool(_) => "external tool",
            WorkflowError::MissingResource(_) => "missing resource",
            WorkflowError::Io { .. } => "io",
            WorkflowError::Cancelled => "cancelled",
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
