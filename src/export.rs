//! Export: writing completed results to disk.
//!
//! Every file is named with [`output_file_name`] using the output format
//! recorded when the record was compressed, never the current configuration.
//!
//! | Operation | Writes |
//! |---|---|
//! | [`export_record`] | One completed record |
//! | [`export_all`] | Every completed record, with per-format counts |
//! | [`export_by_format`] | Completed records whose recorded format matches |
//!
//! Records that are pending, compressing or failed are skipped by the batch
//! exports. Within one batch export no file is written twice: when two records
//! map to the same name (e.g. `x/photo.jpg` and `y/photo.jpg`), later ones are
//! numbered like repeated browser downloads, `optimized_photo (1).webp`.

use crate::config::OutputFormat;
use crate::naming::{numbered_file_name, output_file_name};
use crate::registry::ImageRecord;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No compressed images to export")]
    NothingToExport,
    #[error("Image '{0}' has no compressed result")]
    NotCompleted(String),
}

/// What a batch export wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub format_counts: BTreeMap<OutputFormat, usize>,
}

/// Write one completed record into `dir`, returning the written path.
pub fn export_record(record: &ImageRecord, dir: &Path) -> Result<PathBuf, ExportError> {
    let file_name = export_name(record)?;
    write_result(record, dir, &file_name)
}

fn export_name(record: &ImageRecord) -> Result<String, ExportError> {
    record
        .result()
        .map(|result| output_file_name(record.name(), result.output_format()))
        .ok_or_else(|| ExportError::NotCompleted(record.name().to_string()))
}

fn write_result(record: &ImageRecord, dir: &Path, file_name: &str) -> Result<PathBuf, ExportError> {
    let result = record
        .result()
        .ok_or_else(|| ExportError::NotCompleted(record.name().to_string()))?;
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, result.bytes())?;
    debug!(path = %path.display(), size = result.size(), "exported");
    Ok(path)
}

/// First name not yet taken in this batch. Compared case-insensitively so
/// case-folding filesystems can't collide either.
fn unique_name(file_name: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = file_name.clone();
    let mut copy = 0;
    while !taken.insert(candidate.to_lowercase()) {
        copy += 1;
        candidate = numbered_file_name(&file_name, copy);
    }
    candidate
}

/// Write every completed record into `dir`.
pub fn export_all(records: &[ImageRecord], dir: &Path) -> Result<ExportSummary, ExportError> {
    export_matching(records, dir, |_| true)
}

/// Write the completed records produced as `format` into `dir`.
pub fn export_by_format(
    records: &[ImageRecord],
    format: OutputFormat,
    dir: &Path,
) -> Result<ExportSummary, ExportError> {
    export_matching(records, dir, |f| f == format)
}

fn export_matching(
    records: &[ImageRecord],
    dir: &Path,
    keep: impl Fn(OutputFormat) -> bool,
) -> Result<ExportSummary, ExportError> {
    let selected: Vec<&ImageRecord> = records
        .iter()
        .filter(|r| r.result().is_some_and(|res| keep(res.output_format())))
        .collect();
    if selected.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut summary = ExportSummary::default();
    let mut taken = HashSet::new();
    for record in selected {
        let file_name = unique_name(export_name(record)?, &mut taken);
        let path = write_result(record, dir, &file_name)?;
        if let Some(result) = record.result() {
            *summary.format_counts.entry(result.output_format()).or_insert(0) += 1;
        }
        summary.files.push(path);
    }
    info!(
        files = summary.files.len(),
        dir = %dir.display(),
        "export complete"
    );
    Ok(summary)
}
