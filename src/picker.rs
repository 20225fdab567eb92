//! Folder selection.
//!
//! A picker only produces a candidate path (or nothing, when the user
//! cancels). Turning that into a [`SelectedFolder`] is done by
//! [`resolve_folder`], so every front end validates the same way.

use crate::error::{WorkflowError, WorkflowResult};
use crate::model::SelectedFolder;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub trait FolderPicker {
    /// Ask for a folder. `None` means the user cancelled.
    fn pick(&mut self) -> Option<PathBuf>;
}

/// A picker that returns a path chosen elsewhere (a CLI flag or the TUI
/// input line).
#[derive(Debug, Clone, Default)]
pub struct FixedPicker(pub Option<PathBuf>);

impl FolderPicker for FixedPicker {
    fn pick(&mut self) -> Option<PathBuf> {
        self.0.take()
    }
}

/// Line prompt over any reader/writer pair. An empty line cancels.
pub struct PromptPicker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> FolderPicker for PromptPicker<R, W> {
    fn pick(&mut self) -> Option<PathBuf> {
        let home = dirs::home_dir()
            .map(|h| h.display().to_string())
            .unwrap_or_else(|| "~".into());
        let _ = write!(
            self.output,
            "Select your images folder (relative to the current directory, ~ = {home}; empty to cancel): "
        );
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(trimmed))
                }
            }
        }
    }
}

/// Expand a leading `~` against the home directory.
pub fn expand_home(raw: &Path) -> PathBuf {
    let Ok(rest) = raw.strip_prefix("~") else {
        return raw.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => raw.to_path_buf(),
    }
}

/// Validate a picked path: it must exist and be a directory. The result is
/// canonical (absolute, symlinks resolved).
pub fn resolve_folder(raw: &Path) -> WorkflowResult<SelectedFolder> {
    if raw.as_os_str().is_empty() {
        return Err(WorkflowError::no_folder());
    }
    let expanded = expand_home(raw);
    let canonical = std::fs::canonicalize(&expanded).map_err(|_| {
        WorkflowError::Precondition(format!("folder does not exist: {}", expanded.display()))
    })?;
    if !canonical.is_dir() {
        return Err(WorkflowError::Precondition(format!(
            "not a directory: {}",
            canonical.display()
        )));
    }
    Ok(SelectedFolder::new_unchecked(canonical))
}
