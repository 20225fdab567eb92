//! External detector execution.
//!
//! The detector is run as a child process and awaited to completion; its exit
//! code and output streams are captured. A cancel request drops the wait,
//! which kills the child.

mod invocation;

pub use invocation::{DetectionInvocation, RUN_NAME};

use crate::error::{WorkflowError, WorkflowResult};
use crate::model::DetectionOutcome;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum DetectorControl {
    /// Terminate the running detector; the run fails
    Cancel,
}

/// Run the invocation to completion.
///
/// Launch failures map to [`WorkflowError::ExternalTool`]. A non-zero exit is
/// NOT an error here: the caller decides based on the returned outcome.
pub async fn run_detector(
    inv: &DetectionInvocation,
    control_rx: Option<&mut mpsc::UnboundedReceiver<DetectorControl>>,
) -> WorkflowResult<DetectionOutcome> {
    let started = Instant::now();
    let child = Command::new(&inv.program)
        .args(&inv.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            WorkflowError::ExternalTool(format!(
                "could not launch {}: {e}",
                inv.program.display()
            ))
        })?;
    tracing::debug!(pid = child.id(), program = %inv.program.display(), "detector started");

    let wait = child.wait_with_output();
    let output = match control_rx {
        Some(rx) => {
            tokio::select! {
                out = wait => out,
                Some(DetectorControl::Cancel) = rx.recv() => {
                    tracing::warn!("detector cancelled, child killed");
                    return Err(WorkflowError::Cancelled);
                }
            }
        }
        None => wait.await,
    }
    .map_err(|e| WorkflowError::ExternalTool(format!("waiting for detector failed: {e}")))?;

    let outcome = DetectionOutcome {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        elapsed: started.elapsed(),
    };
    tracing::debug!(
        exit_code = ?outcome.exit_code,
        stdout_lines = outcome.stdout.lines().count(),
        elapsed = %humantime::format_duration(outcome.elapsed),
        "detector exited"
    );
    Ok(outcome)
}
