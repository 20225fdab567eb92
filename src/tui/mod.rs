mod help;
mod state;

use crate::config::AppConfig;
use crate::model::{OutputLocation, WorkflowEvent};
use crate::orchestrator::{self, UiCommand};
use crate::workflow::LabelWorkflow;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use state::{push_wrapped_status_kv, LogLevel, UiState};
use std::path::PathBuf;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(cfg: AppConfig, initial_folder: Option<PathBuf>) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<WorkflowEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    if initial_folder.is_some() {
        let _ = cmd_tx.send(UiCommand::SelectFolder(initial_folder));
    }

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_cfg = cfg.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_cfg, event_rx, cmd_tx));

    let res = orchestrator::run_controller(LabelWorkflow::new(cfg), event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    cfg: AppConfig,
    mut event_rx: UnboundedReceiver<WorkflowEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::new(cfg);

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if (k.modifiers, k.code) == (KeyModifiers::CONTROL, KeyCode::Char('c')) {
                    let _ = cmd_tx.send(UiCommand::Quit);
                    break Ok(());
                }

                if let Some(input) = state.input.as_mut() {
                    match k.code {
                        KeyCode::Enter => {
                            let raw = input.trim().to_string();
                            state.input = None;
                            let picked = (!raw.is_empty()).then(|| PathBuf::from(raw));
                            let _ = cmd_tx.send(UiCommand::SelectFolder(picked));
                        }
                        KeyCode::Esc => {
                            state.input = None;
                            let _ = cmd_tx.send(UiCommand::SelectFolder(None));
                        }
                        KeyCode::Backspace => {
                            input.pop();
                        }
                        KeyCode::Char(c) => input.push(c),
                        _ => {}
                    }
                    continue;
                }

                match k.code {
                    KeyCode::Char('q') => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    KeyCode::Char('o') => {
                        state.tab = 0;
                        state.input = Some(state.input_seed());
                    }
                    KeyCode::Char('g') => {
                        let _ = cmd_tx.send(UiCommand::Generate);
                    }
                    KeyCode::Char('c') => {
                        let _ = cmd_tx.send(UiCommand::AddClasses);
                    }
                    KeyCode::Char('l') => {
                        let _ = cmd_tx.send(UiCommand::OpenAnnotator);
                    }
                    KeyCode::Char('x') => {
                        let _ = cmd_tx.send(UiCommand::Cancel);
                    }
                    KeyCode::Tab => {
                        state.tab = (state.tab + 1) % 2;
                    }
                    KeyCode::Char('?') => {
                        state.tab = 1;
                    }
                    KeyCode::Up | KeyCode::Char('k') => state.scroll_up(1),
                    KeyCode::Down | KeyCode::Char('j') => state.scroll_down(1),
                    KeyCode::PageUp => state.scroll_up(10),
                    KeyCode::PageDown => state.scroll_down(10),
                    KeyCode::End => state.log_scroll = 0,
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Workspace"), Line::from("Help")])
        .select(state.tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Auto Labeling & Annotation Tool (YOLO)"),
        )
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_workspace(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_workspace(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let input_height = if state.input.is_some() { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(8),
                Constraint::Min(3),
                Constraint::Length(input_height),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    draw_status(rows[0], f, state);
    draw_log(rows[1], f, state);
    if let Some(input) = &state.input {
        let p = Paragraph::new(Line::from(vec![
            Span::raw(input.as_str()),
            Span::styled("█", Style::default().fg(Color::Gray)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select Your Images Folder (Enter = confirm, Esc = cancel)"),
        );
        f.render_widget(p, rows[2]);
    }
    draw_keybar(rows[3], f, state);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let folder = state
        .folder
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none selected)".into());
    push_wrapped_status_kv(&mut lines, "Folder", &folder, area.width);
    push_wrapped_status_kv(
        &mut lines,
        "Model",
        &state.config.model_weights.display().to_string(),
        area.width,
    );
    if let Some(r) = &state.last_report {
        let where_ = match &r.output {
            OutputLocation::Nested(_) => "labels/labels",
            OutputLocation::Flat(_) => "labels",
            OutputLocation::NotFound => "no output found",
        };
        push_wrapped_status_kv(
            &mut lines,
            "Last run",
            &format!(
                "{} labels ({where_}, {})",
                r.moved_count,
                humantime::format_duration(Duration::from_secs(r.elapsed.as_secs()))
            ),
            area.width,
        );
    }
    let status_style = if state.busy {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(state.info_level.color())
    };
    lines.push(Line::from(Span::styled(state.info.clone(), status_style)));

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}

fn draw_log(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = state
        .visible_log(height)
        .iter()
        .map(|(level, text)| {
            Line::from(Span::styled(text.as_str(), Style::default().fg(level.color())))
        })
        .collect();
    let title = if state.log_scroll > 0 {
        format!("Terminal Output (↑{})", state.log_scroll)
    } else {
        "Terminal Output".to_string()
    };
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_keybar(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Magenta));
    let mut spans = vec![
        key("o"),
        Span::raw(" folder  "),
        key("g"),
        Span::raw(" generate labels  "),
        key("c"),
        Span::raw(" classes file  "),
        key("l"),
        Span::raw(" open annotator  "),
    ];
    if state.busy {
        spans.push(key("x"));
        spans.push(Span::raw(" cancel  "));
    }
    spans.push(key("?"));
    spans.push(Span::raw(" help  "));
    spans.push(key("q"));
    spans.push(Span::raw(" quit"));

    let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}
