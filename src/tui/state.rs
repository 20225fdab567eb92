use crate::config::AppConfig;
use crate::model::{GenerationReport, WorkflowEvent};
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};
use std::path::PathBuf;

const MAX_LOG_LINES: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Command,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn color(self) -> Color {
        match self {
            LogLevel::Info => Color::Gray,
            LogLevel::Command => Color::Cyan,
            LogLevel::Success => Color::Green,
            LogLevel::Warning => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

pub struct UiState {
    pub tab: usize,
    pub config: AppConfig,
    pub folder: Option<PathBuf>,
    pub busy: bool,
    pub info: String,
    pub info_level: LogLevel,
    /// Terminal output pane, oldest first
    pub log: Vec<(LogLevel, String)>,
    /// Lines scrolled up from the bottom of the log
    pub log_scroll: usize,
    /// Folder path being typed, when the input line is open
    pub input: Option<String>,
    pub last_report: Option<GenerationReport>,
}

impl UiState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            tab: 0,
            config,
            folder: None,
            busy: false,
            info: "Press o to select an images folder".into(),
            info_level: LogLevel::Info,
            log: Vec::new(),
            log_scroll: 0,
            input: None,
            last_report: None,
        }
    }

    pub fn push_log(&mut self, level: LogLevel, msg: impl Into<String>) {
        // Multi-line messages (detector stderr) keep one entry per line.
        for line in msg.into().lines() {
            self.log.push((level, line.to_string()));
        }
        if self.log.len() > MAX_LOG_LINES {
            let _ = self.log.drain(0..(self.log.len() - MAX_LOG_LINES));
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.log_scroll = (self.log_scroll + n).min(self.log.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.log_scroll = self.log_scroll.saturating_sub(n);
    }

    /// Visible slice of the log for a pane of `height` rows.
    pub fn visible_log(&self, height: usize) -> &[(LogLevel, String)] {
        let end = self.log.len().saturating_sub(self.log_scroll);
        let start = end.saturating_sub(height);
        &self.log[start..end]
    }

    /// Path the input line starts from when it is opened.
    pub fn input_seed(&self) -> String {
        match &self.folder {
            Some(p) => p.display().to_string(),
            None => "~/".into(),
        }
    }

    pub fn apply_event(&mut self, ev: WorkflowEvent) {
        let msg = ev.to_message();
        let level = match &ev {
            WorkflowEvent::Info(_) | WorkflowEvent::FolderSelected(_) => LogLevel::Info,
            WorkflowEvent::DetectionStarted { .. } => LogLevel::Command,
            WorkflowEvent::GenerationFinished(_) => LogLevel::Success,
            WorkflowEvent::Warning(_) => LogLevel::Warning,
            WorkflowEvent::Error(_) => LogLevel::Error,
            WorkflowEvent::Busy(_) => LogLevel::Info,
        };
        match ev {
            WorkflowEvent::FolderSelected(p) => self.folder = Some(p),
            WorkflowEvent::GenerationFinished(r) => self.last_report = Some(*r),
            WorkflowEvent::Busy(b) => {
                self.busy = b;
                // Status only; the log already has the outcome.
                if b {
                    self.info = msg;
                    self.info_level = LogLevel::Command;
                }
                return;
            }
            _ => {}
        }
        // Keep the status line to the first line of long error text.
        self.info = msg.lines().next().unwrap_or_default().to_string();
        self.info_level = level;
        self.push_log(level, msg);
        self.log_scroll = 0;
    }
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Account for borders (2 chars on each side)
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_update_folder_and_log() {
        let mut s = UiState::new(AppConfig::default());
        s.apply_event(WorkflowEvent::FolderSelected(PathBuf::from("/imgs")));
        s.apply_event(WorkflowEvent::Busy(true));
        s.apply_event(WorkflowEvent::Error(
            "Label generation failed: external tool failed: line one\nline two".into(),
        ));
        s.apply_event(WorkflowEvent::Busy(false));

        assert_eq!(s.folder, Some(PathBuf::from("/imgs")));
        assert!(!s.busy);
        assert_eq!(s.log.len(), 3);
        assert_eq!(s.log[0].1, "Folder selected: /imgs");
        assert_eq!(s.log[1].0, LogLevel::Error);
        assert_eq!(s.log[2].1, "line two");
        assert_eq!(s.info_level, LogLevel::Error);
        assert!(s.info.ends_with("line one"));
    }

    #[test]
    fn log_is_bounded_and_scrolls() {
        let mut s = UiState::new(AppConfig::default());
        for i in 0..(MAX_LOG_LINES + 10) {
            s.push_log(LogLevel::Info, format!("line {i}"));
        }
        assert_eq!(s.log.len(), MAX_LOG_LINES);
        assert_eq!(s.visible_log(3).last().unwrap().1, format!("line {}", MAX_LOG_LINES + 9));

        s.scroll_up(5);
        assert_eq!(s.visible_log(3).last().unwrap().1, format!("line {}", MAX_LOG_LINES + 4));
        s.scroll_down(100);
        assert_eq!(s.log_scroll, 0);
    }

    #[test]
    fn wrapped_status_splits_long_values() {
        let mut out = Vec::new();
        push_wrapped_status_kv(&mut out, "Folder", &"x".repeat(30), 20);
        assert!(out.len() > 1);
        push_wrapped_status_kv(&mut out, "Empty", "   ", 20);
        assert!(out.len() > 1);
    }
}
