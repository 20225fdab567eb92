//! Text summary builder for command-mode output.

use crate::model::{GenerationReport, OutputLocation};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn describe_output(output: &OutputLocation) -> String {
    match output {
        OutputLocation::Nested(p) => format!("{} (nested)", p.display()),
        OutputLocation::Flat(p) => format!("{} (flat)", p.display()),
        OutputLocation::NotFound => "not found (detector wrote no label directory)".into(),
    }
}

/// Build a text summary from a finished generation run.
pub(crate) fn build_text_summary(report: &GenerationReport) -> TextSummary {
    let mut lines = vec![
        format!("Folder: {}", report.folder.display()),
        format!("Detector output: {}", describe_output(&report.output)),
        format!("Labels moved: {}", report.moved_count),
        format!(
            "Elapsed: {}",
            humantime::format_duration(std::time::Duration::from_millis(
                report.elapsed.as_millis() as u64
            ))
        ),
    ];
    if !report.moved.is_empty() {
        lines.push(format!("Files: {}", report.moved.join(", ")));
    }
    TextSummary { lines }
}
