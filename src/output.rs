//! CLI output formatting.
//!
//! Every image gets a header line naming source and output, followed by an
//! indented line tracing its dimensions through the pipeline:
//!
//! ```text
//! Resizing 2 images
//! scan.png → scan(1).jpg
//!     1000x500 → trim 900x400 → scale 735x326
//! blank.png: failed
//!     Geometry error: Trim region is empty: ...
//!
//! 1 processed, 1 failed
//! ```
//!
//! Format functions are pure and return `Vec<String>`; `print_*` wrappers
//! write them to stdout.

use crate::pipeline::{BatchSummary, ImageReport, ProcessEvent};
use std::path::Path;

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn dims((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

/// Header + dimension trail for one finished image.
pub fn format_report(report: &ImageReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {}",
        display_name(&report.source),
        display_name(&report.output)
    )];

    let mut trail = dims(report.original);
    if let Some(t) = report.trimmed {
        trail.push_str(&format!(" → trim {}", dims(t)));
    }
    if let Some(s) = report.scaled {
        trail.push_str(&format!(" → scale {}", dims(s)));
    }
    lines.push(format!("    {trail}"));

    if report.attempts > 1 {
        lines.push(format!(
            "    Saved as fallback name after {} attempts",
            report.attempts
        ));
    }
    lines
}

/// Header + error line for an image that could not be processed.
pub fn format_failure(source: &Path, error: &str) -> Vec<String> {
    vec![
        format!("{}: failed", display_name(source)),
        format!("    {error}"),
    ]
}

pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { image_count: 1 } => vec!["Resizing 1 image".to_string()],
        ProcessEvent::Started { image_count } => vec![format!("Resizing {image_count} images")],
        ProcessEvent::ImageProcessed(report) => format_report(report),
        ProcessEvent::ImageFailed { source, error } => format_failure(source, error),
    }
}

pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    vec![String::new(), summary.to_string()]
}

pub fn print_report(report: &ImageReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &BatchSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
