//! Derived statistics over a registry snapshot.
//!
//! Nothing here is stored: [`Stats::from_records`] recomputes everything from
//! the records it is given, so the numbers can never drift from the registry.

use crate::config::OutputFormat;
use crate::registry::{ImageRecord, StatusKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Percentage of `original` saved by shrinking it to `result`.
///
/// Rounds half up (`-2.5 → -2`, `2.5 → 3`), so a file that grew yields a
/// negative value. Returns 0 when `original` is 0.
pub fn percent_saved(original: u64, result: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let saved = original as f64 - result as f64;
    (saved * 100.0 / original as f64 + 0.5).floor() as i64
}

/// Aggregate numbers for the current batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub compressing: usize,
    pub completed: usize,
    pub failed: usize,
    /// Sum of source sizes over every record.
    pub total_source_size: u64,
    /// Sum of result sizes over completed records.
    pub total_result_size: u64,
    /// `percent_saved(total_source_size, total_result_size)`.
    pub savings_percent: i64,
    /// Completed records grouped by the format they were produced in.
    pub format_counts: BTreeMap<OutputFormat, usize>,
}

impl Stats {
    pub fn from_records(records: &[ImageRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            stats.total_source_size += record.source_size();
            match record.status().kind() {
                StatusKind::Pending => stats.pending += 1,
                StatusKind::Compressing => stats.compressing += 1,
                StatusKind::Error => stats.failed += 1,
                StatusKind::Completed => stats.completed += 1,
            }
            if let Some(result) = record.result() {
                stats.total_result_size += result.size();
                *stats.format_counts.entry(result.output_format()).or_insert(0) += 1;
            }
        }

        stats.savings_percent = percent_saved(stats.total_source_size, stats.total_result_size);
        stats
    }
}
