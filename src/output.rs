//! CLI output formatting.
//!
//! Output is **information-centric, not file-centric**: each line leads with
//! what happened (step, size, scale factor) and shows the written file as
//! context. Files always land next to the source, so only file names are
//! shown.
//!
//! # Output Format
//!
//! ## Pipeline
//!
//! ```text
//! dusk.jpg
//!     upscale 4x → dusk_scaled.jpg
//!     001 crop 3840x2160 → dusk_scaled_cropped.jpg
//!     002 blur 3840x2160 → dusk_scaled_cropped_blurred.jpg (in memory)
//!     003 mix 3840x2160 → dusk_scaled_mixed.png
//!     004 feather 3880x2200 → dusk_edgy_blurred.jpg
//! Output: dusk_edgy_blurred.jpg
//! ```
//!
//! ## Single steps
//!
//! ```text
//! crop 1770x1000 → wide_cropped.jpg
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::Layer;
use crate::pipeline::{PipelineReport, ScaleDecision, Step, StepRecord};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name of a path, falling back to the whole path.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `step WxH → name`, with ` (in memory)` when nothing was written.
fn step_line(step: Step, dimensions: (u32, u32), identity: &Path, saved: bool) -> String {
    let (w, h) = dimensions;
    let mut line = format!("{} {}x{} → {}", step, w, h, file_label(identity));
    if !saved {
        line.push_str(" (in memory)");
    }
    line
}

fn scale_line(scale: &ScaleDecision, scaled: &Path) -> String {
    match scale.level {
        Some(level) if !scale.skipped => {
            format!("upscale {}x → {}", level, file_label(scaled))
        }
        _ => format!("upscale skipped, {} exists", file_label(scaled)),
    }
}

// ============================================================================
// Pipeline output
// ============================================================================

/// Format a pipeline report as display lines.
pub fn format_pipeline_report(report: &PipelineReport) -> Vec<String> {
    let mut lines = vec![file_label(&report.source)];
    lines.push(format!(
        "{}{}",
        indent(1),
        scale_line(&report.scale, &report.scaled)
    ));

    for (i, record) in report.steps.iter().enumerate() {
        let StepRecord {
            step,
            identity,
            dimensions,
            saved,
        } = record;
        lines.push(format!(
            "{}{} {}",
            indent(1),
            format_index(i + 1),
            step_line(*step, *dimensions, identity, *saved)
        ));
    }

    if let Some(output) = report.final_output() {
        lines.push(format!("Output: {}", file_label(output)));
    }
    lines
}

/// Print a pipeline report to stdout.
pub fn print_pipeline_report(report: &PipelineReport) {
    for line in format_pipeline_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Single-step output
// ============================================================================

/// Format the result of a single step run from the CLI. Single steps always save.
pub fn format_step_output(step: Step, layer: &Layer) -> String {
    let identity = layer.identity.as_deref().unwrap_or(Path::new("-"));
    step_line(step, layer.dimensions(), identity, true)
}

pub fn print_step_output(step: Step, layer: &Layer) {
    println!("{}", format_step_output(step, layer));
}

/// Format the scale level for an image.
pub fn format_scale_level(path: &Path, level: u32) -> String {
    format!("{}: {}x", file_label(path), level)
}

pub fn print_scale_level(path: &Path, level: u32) {
    println!("{}", format_scale_level(path, level));
}
