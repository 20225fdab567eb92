mod cli;
mod config;
mod detector;
mod error;
mod model;
mod orchestrator;
mod picker;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod workflow;

use anyhow::Result;
use clap::Parser;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `<data_local_dir>/autolabel/autolabel.log`, used while the TUI owns the
/// terminal.
fn log_file() -> Option<std::fs::File> {
    let dir = dirs::data_local_dir()?.join("autolabel");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("autolabel.log"))
        .ok()
}

fn init_tracing(args: &cli::Cli) {
    // Command mode already prints progress lines and the final error.
    let default = match (args.verbose, args.is_interactive()) {
        (true, _) => "autolabel=debug,info",
        (false, true) => "autolabel=info,warn",
        (false, false) => "off",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let (file_layer, stderr_layer) = if args.is_interactive() {
        let layer = log_file().map(|f| fmt::layer().with_ansi(false).with_writer(Mutex::new(f)));
        (layer, None)
    } else {
        (None, Some(fmt::layer().with_writer(std::io::stderr)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_tracing(&args);
    let is_non_tui = !args.is_interactive();

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success, especially for non-TUI modes
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}
