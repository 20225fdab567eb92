use crate::config::{AppConfig, ConfigOverrides};
use crate::detector::DetectorControl;
use crate::model::{FolderResult, WorkflowEvent};
use crate::picker::{FixedPicker, PromptPicker};
use crate::workflow::LabelWorkflow;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "autolabel",
    version,
    about = "Auto-label an image folder with YOLO and open it in LabelImg"
)]
pub struct Cli {
    /// Images folder to work on (prompted for when omitted)
    #[arg(long, short, global = true)]
    pub folder: Option<PathBuf>,

    /// Config file (default: <config dir>/autolabel/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Detector executable
    #[arg(long, global = true)]
    pub detector: Option<PathBuf>,

    /// Model weights passed to the detector
    #[arg(long = "model", global = true)]
    pub model_weights: Option<PathBuf>,

    /// Class list copied into the folder as classes.txt
    #[arg(long, global = true)]
    pub classes_file: Option<PathBuf>,

    /// Annotation editor executable
    #[arg(long, global = true)]
    pub annotator: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run a single action and exit (no TUI)
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the detector and move the generated labels into the folder
    Generate,
    /// Copy the configured class list into the folder
    Classes,
    /// Launch the annotator on the folder
    Annotate,
    /// Print the effective configuration
    Config,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            detector: self.detector.clone(),
            model_weights: self.model_weights.clone(),
            classes_file: self.classes_file.clone(),
            annotator: self.annotator.clone(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = AppConfig::resolve(args.config.as_deref(), &args.overrides())?;

    let Some(command) = args.command else {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(cfg, args.folder.clone()).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            return Err(anyhow::anyhow!(
                "built without TUI support; use one of: generate, classes, annotate, config"
            ));
        }
    };

    if command == Command::Config {
        let text = if args.json {
            serde_json::to_string_pretty(&cfg)?
        } else {
            cfg.to_toml()?
        };
        println!("{}", text.trim_end());
        return Ok(());
    }

    run_command(&args, cfg, command).await
}

/// Run one workflow action, streaming progress to stderr and the result to
/// stdout.
async fn run_command(args: &Cli, cfg: AppConfig, command: Command) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<WorkflowEvent>();

    // Errors are returned to main and printed there once.
    let fwd_tx = out_tx.clone();
    let forward = tokio::spawn(async move {
        while let Some(ev) = evt_rx.recv().await {
            match ev {
                WorkflowEvent::Error(_) | WorkflowEvent::Busy(_) => {}
                other => {
                    let _ = fwd_tx.send(OutputLine::Stderr(other.to_message()));
                }
            }
        }
    });

    let mut workflow = LabelWorkflow::new(cfg);
    let picked = match args.folder.clone() {
        Some(p) => workflow.select_folder(&mut FixedPicker(Some(p)), &evt_tx),
        None => {
            let stdin = std::io::stdin();
            let mut picker = PromptPicker::new(stdin.lock(), std::io::stderr());
            workflow.select_folder(&mut picker, &evt_tx)
        }
    };

    let result = match picked {
        Ok(FolderResult::Selected(_)) => perform(&workflow, command, args.json, &evt_tx).await,
        Ok(FolderResult::Cancelled) => Err(anyhow::anyhow!("no folder selected")),
        Err(e) => Err(e.into()),
    };

    drop(evt_tx);
    let _ = forward.await;
    if let Ok(lines) = &result {
        for line in lines {
            let _ = out_tx.send(OutputLine::Stdout(line.clone()));
        }
    }
    drop(out_tx);
    let _ = out_handle.await;

    result.map(|_| ())
}

/// Execute the action and return the lines to print on stdout.
async fn perform(
    workflow: &LabelWorkflow,
    command: Command,
    json: bool,
    events: &crate::workflow::EventSink,
) -> Result<Vec<String>> {
    match command {
        Command::Generate => {
            let (ctrl_tx, mut ctrl_rx) = mpsc::unbounded_channel::<DetectorControl>();
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = ctrl_tx.send(DetectorControl::Cancel);
                }
            });
            let res = workflow.generate_labels(events, Some(&mut ctrl_rx)).await;
            ctrl_c.abort();
            let report = res.context("label generation failed")?;

            if json {
                Ok(vec![serde_json::to_string_pretty(&report)?])
            } else {
                Ok(crate::text_summary::build_text_summary(&report).lines)
            }
        }
        Command::Classes => {
            let dst = workflow
                .add_classes_file(events)
                .context("could not add classes file")?;
            Ok(vec![dst.display().to_string()])
        }
        Command::Annotate => {
            let pid = workflow
                .open_annotator(events)
                .context("could not open annotator")?;
            let folder = workflow
                .selected()
                .map(|f| f.to_string())
                .unwrap_or_default();
            Ok(vec![if json {
                serde_json::json!({ "pid": pid, "folder": folder }).to_string()
            } else {
                format!("Annotator started on {folder} (pid {pid})")
            }])
        }
        Command::Config => Ok(Vec::new()),
    }
}
