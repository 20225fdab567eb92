use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A validated, absolute image folder chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFolder(PathBuf);

impl SelectedFolder {
    /// Wrap an already canonical directory path. Validation lives in
    /// [`crate::picker::resolve_folder`].
    pub(crate) fn new_unchecked(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, p: impl AsRef<Path>) -> PathBuf {
        self.0.join(p)
    }
}

impl std::fmt::Display for SelectedFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Outcome of a folder selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderResult {
    Selected(SelectedFolder),
    Cancelled,
}

/// Captured result of one detector execution.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl DetectionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Where the detector's label directory was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum OutputLocation {
    /// `<folder>/labels/labels`
    Nested(PathBuf),
    /// `<folder>/labels`
    Flat(PathBuf),
    /// Detector exited 0 but neither candidate directory exists.
    NotFound,
}

impl OutputLocation {
    pub fn dir(&self) -> Option<&Path> {
        match self {
            OutputLocation::Nested(p) | OutputLocation::Flat(p) => Some(p),
            OutputLocation::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub folder: PathBuf,
    pub moved_count: usize,
    pub output: OutputLocation,
    /// File names moved into the folder, sorted.
    pub moved: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    pub finished_at: String,
}

/// Progress and result messages produced by workflow operations.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    Info(String),
    Warning(String),
    Error(String),
    FolderSelected(PathBuf),
    DetectionStarted { command: String },
    GenerationFinished(Box<GenerationReport>),
    /// A detection run started (`true`) or ended (`false`).
    Busy(bool),
}

impl WorkflowEvent {
    /// Render a human-readable line for the log pane or stderr.
    pub fn to_message(&self) -> String {
        match self {
            WorkflowEvent::Info(msg) => msg.clone(),
            WorkflowEvent::Warning(msg) => format!("Warning: {msg}"),
            WorkflowEvent::Error(msg) => format!("Error: {msg}"),
            WorkflowEvent::FolderSelected(p) => format!("Folder selected: {}", p.display()),
            WorkflowEvent::DetectionStarted { command } => format!("Running command: {command}"),
            WorkflowEvent::GenerationFinished(r) => format!(
                "Labels generated and moved successfully! Total labels: {}",
                r.moved_count
            ),
            WorkflowEvent::Busy(true) => "Detection running…".into(),
            WorkflowEvent::Busy(false) => "Ready".into(),
        }
    }
}
