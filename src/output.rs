//! CLI output formatting for every stage of a run.
//!
//! # Output Format
//!
//! ## Intake
//!
//! ```text
//! Found 3 images
//!     Rejected notes.txt: not a supported image type
//!     Rejected huge.tiff: too large (73400320 bytes, limit 52428800)
//! ```
//!
//! ## Compression
//!
//! ```text
//! ==> Compressing 3 images → webp
//!     001 photo.jpg → optimized_photo.webp (58% smaller)
//!     002 banner.png → optimized_banner.webp (12% larger)
//!     003 broken.png: failed (Failed to decode source: ...)
//! Completed 2, failed 1 of 3
//!     Size: 1.2 MB → 455.3 KB (63% saved)
//!     Formats: webp 2
//! ```
//!
//! ## Export
//!
//! ```text
//! ==> Exported 2 files to optimized/
//!     webp: 2
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects. The one exception to "one call, one stage" is
//! [`EventPrinter`], which numbers items as driver events stream in.

use crate::config::{PRESETS, PresetMode};
use crate::driver::DriverEvent;
use crate::export::ExportSummary;
use crate::intake::Intake;
use crate::naming::output_file_name;
use crate::registry::ImageRecord;
use crate::stats::Stats;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Human-readable size with 1024-based units, rounded to two decimals.
///
/// ```text
/// 0       → 0 Bytes
/// 1536    → 1.5 KB
/// 1048576 → 1 MB
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut exp = 0;
    while exp < UNITS.len() - 1 && bytes >= 1u64 << (10 * (exp + 1)) {
        exp += 1;
    }
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exp])
}

/// `58% smaller`, `12% larger`, `same size`.
fn format_ratio(ratio: i64) -> String {
    match ratio {
        0 => "same size".to_string(),
        r if r > 0 => format!("{r}% smaller"),
        r => format!("{}% larger", -r),
    }
}

// ============================================================================
// Intake
// ============================================================================

pub fn format_intake(intake: &Intake) -> Vec<String> {
    let mut lines = vec![format!("Found {}", plural(intake.accepted.len(), "image"))];
    for rejection in &intake.rejected {
        let name = rejection
            .path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| rejection.path.display().to_string());
        lines.push(format!("    Rejected {}: {}", name, rejection.reason));
    }
    lines
}

pub fn print_intake(intake: &Intake) {
    for line in format_intake(intake) {
        println!("{}", line);
    }
}

// ============================================================================
// Compression
// ============================================================================

/// Aggregate statistics block.
pub fn format_stats(stats: &Stats) -> Vec<String> {
    let mut lines = vec![format!(
        "Completed {}, failed {} of {}",
        stats.completed, stats.failed, stats.total
    )];
    if stats.pending > 0 {
        lines.push(format!("    Pending: {}", stats.pending));
    }
    if stats.completed > 0 {
        lines.push(format!(
            "    Size: {} \u{2192} {} ({}% saved)",
            format_bytes(stats.total_source_size),
            format_bytes(stats.total_result_size),
            stats.savings_percent
        ));
        let formats: Vec<String> = stats
            .format_counts
            .iter()
            .map(|(format, count)| format!("{format} {count}"))
            .collect();
        lines.push(format!("    Formats: {}", formats.join(", ")));
    }
    lines
}

pub fn print_stats(stats: &Stats) {
    for line in format_stats(stats) {
        println!("{}", line);
    }
}

/// Turns driver events into display lines, numbering items as they start.
#[derive(Debug, Default)]
pub struct EventPrinter {
    index: usize,
}

impl EventPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(&mut self, event: &DriverEvent) -> Vec<String> {
        match event {
            DriverEvent::Started { pending, format } => {
                self.index = 0;
                vec![format!(
                    "==> Compressing {} \u{2192} {}",
                    plural(*pending, "image"),
                    format
                )]
            }
            DriverEvent::ItemStarted { .. } => {
                self.index += 1;
                Vec::new()
            }
            DriverEvent::ItemCompleted {
                name,
                output_name,
                compression_ratio,
                ..
            } => vec![format!(
                "    {} {} \u{2192} {} ({})",
                format_index(self.index),
                name,
                output_name,
                format_ratio(*compression_ratio)
            )],
            DriverEvent::ItemFailed { name, error, .. } => vec![format!(
                "    {} {}: failed ({})",
                format_index(self.index),
                name,
                error
            )],
            DriverEvent::Paused { remaining } => vec![format!(
                "==> Paused, {} still pending",
                plural(*remaining, "image")
            )],
            DriverEvent::Finished { stats } => format_stats(stats),
        }
    }

    pub fn print(&mut self, event: &DriverEvent) {
        for line in self.format(event) {
            println!("{}", line);
        }
    }
}

// ============================================================================
// Export
// ============================================================================

pub fn format_export(summary: &ExportSummary, dir: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "==> Exported {} to {}",
        plural(summary.files.len(), "file"),
        dir.display()
    )];
    for (format, count) in &summary.format_counts {
        lines.push(format!("    {}: {}", format, count));
    }
    lines
}

pub fn print_export(summary: &ExportSummary, dir: &Path) {
    for line in format_export(summary, dir) {
        println!("{}", line);
    }
}

/// The result kept from the previous batch, if any.
pub fn format_last_completed(record: Option<&ImageRecord>) -> Vec<String> {
    let Some((record, result)) = record.and_then(|r| r.result().map(|res| (r, res))) else {
        return Vec::new();
    };
    vec![format!(
        "Last converted: {} \u{2192} {} ({}, {})",
        record.name(),
        output_file_name(record.name(), result.output_format()),
        format_bytes(result.size()),
        format_ratio(result.compression_ratio())
    )]
}

// ============================================================================
// Presets
// ============================================================================

pub fn format_presets(active: PresetMode) -> Vec<String> {
    let mut lines = Vec::new();
    for (mode, preset) in &PRESETS {
        let marker = if *mode == active { "*" } else { " " };
        lines.push(format!(
            "{} {:<10} {} ({})",
            marker,
            mode.tag(),
            preset.name,
            preset.description
        ));
        lines.push(format!(
            "      quality {:.2}, max {}\u{00d7}{}, {}",
            preset.quality, preset.max_width, preset.max_height, preset.format
        ));
        lines.push(format!("      {}. {}", preset.use_case, preset.performance_tip));
    }
    let marker = if active == PresetMode::Custom { "*" } else { " " };
    lines.push(format!(
        "{} {:<10} Your own quality, bounds and format",
        marker,
        PresetMode::Custom.tag()
    ));
    lines
}

pub fn print_presets(active: PresetMode) {
    for line in format_presets(active) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
