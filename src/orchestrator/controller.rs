//! Workflow command controller.
//!
//! Owns the single `LabelWorkflow`, applies UI commands to it one at a time and
//! emits events for presentation layers. At most one detection run is in
//! flight; other workflow commands are refused until it finishes.

use crate::detector::DetectorControl;
use crate::error::WorkflowResult;
use crate::model::{GenerationReport, WorkflowEvent};
use crate::picker::FixedPicker;
use crate::workflow::{EventSink, LabelWorkflow};
use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    /// `None` means the user cancelled the picker.
    SelectFolder(Option<PathBuf>),
    Generate,
    AddClasses,
    OpenAnnotator,
    Cancel,
    Quit,
}

/// Internal handle for a running detection task.
struct RunCtx {
    ctrl_tx: UnboundedSender<DetectorControl>,
    handle: Option<tokio::task::JoinHandle<WorkflowResult<GenerationReport>>>,
}

/// Spawn a generation run on a snapshot of the workflow.
fn start_run(workflow: &LabelWorkflow, events: &EventSink) -> RunCtx {
    let (ctrl_tx, mut ctrl_rx) = mpsc::unbounded_channel::<DetectorControl>();
    let wf = workflow.clone();
    let ev = events.clone();
    let _ = events.send(WorkflowEvent::Busy(true));
    let handle = tokio::spawn(async move { wf.generate_labels(&ev, Some(&mut ctrl_rx)).await });
    RunCtx {
        ctrl_tx,
        handle: Some(handle),
    }
}

fn request_cancel(ctx: &RunCtx, events: &EventSink) {
    let _ = ctx.ctrl_tx.send(DetectorControl::Cancel);
    let _ = events.send(WorkflowEvent::Info("Cancelling…".into()));
}

/// Apply UI commands to the workflow until `Quit` (or the command channel
/// closes). Operation failures are reported as events and never end the loop.
pub(crate) async fn run_controller(
    mut workflow: LabelWorkflow,
    events: EventSink,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut run_ctx: Option<RunCtx> = None;
    let mut quit_pending = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv(), if !quit_pending => {
                match cmd {
                    Some(UiCommand::Quit) | None => {
                        // Quit waits for an in-flight run so its cleanup is not cut short.
                        quit_pending = true;
                        match &run_ctx {
                            Some(ctx) => request_cancel(ctx, &events),
                            None => break,
                        }
                    }
                    Some(UiCommand::Cancel) => match &run_ctx {
                        Some(ctx) => request_cancel(ctx, &events),
                        None => {
                            let _ = events.send(WorkflowEvent::Info("No detection is running".into()));
                        }
                    },
                    Some(other) if run_ctx.is_some() => {
                        tracing::debug!(?other, "command refused while detection runs");
                        let _ = events.send(WorkflowEvent::Warning(
                            "Label generation in progress; wait for it or cancel first".into(),
                        ));
                    }
                    Some(UiCommand::SelectFolder(path)) => {
                        let _ = workflow.select_folder(&mut FixedPicker(path), &events);
                    }
                    Some(UiCommand::Generate) => {
                        run_ctx = Some(start_run(&workflow, &events));
                    }
                    Some(UiCommand::AddClasses) => {
                        let _ = workflow.add_classes_file(&events);
                    }
                    Some(UiCommand::OpenAnnotator) => {
                        let _ = workflow.open_annotator(&events);
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            maybe_done = async {
                if let Some(ctx) = &mut run_ctx {
                    if let Some(h) = ctx.handle.as_mut() {
                        return Some(h.await);
                    }
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    // The workflow already reported success or failure; only a panic
                    // needs surfacing here.
                    if let Err(e) = join_res {
                        tracing::error!(error = %e, "generation task failed");
                        let _ = events.send(WorkflowEvent::Error(format!(
                            "Label generation task failed: {e}"
                        )));
                    }
                    run_ctx = None;
                    let _ = events.send(WorkflowEvent::Busy(false));
                    if quit_pending {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
