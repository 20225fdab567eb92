use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit (cancels a running detection first)"),
        ]),
        key_line("o", 11, "Select images folder"),
        key_line("g", 11, "Auto-generate labels with the detector"),
        key_line("c", 11, "Add classes file"),
        key_line("l", 11, "Open the annotator on the folder"),
        key_line("x", 11, "Cancel running detection"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Terminal output:"),
        key_line("↑/↓", 2, "or j/k  Scroll"),
        key_line("End", 9, "Jump to newest"),
        Line::from(""),
        Line::from("Folder input:"),
        key_line("Enter", 7, "Confirm"),
        key_line("Esc", 9, "Cancel (keeps the current folder)"),
        Line::from(""),
        Line::from("Generated labels are moved next to the images; the detector's"),
        Line::from("labels/ directory is removed afterwards."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
