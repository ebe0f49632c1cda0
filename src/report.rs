//! Machine-readable run report, written with `--report <path>`.
//!
//! ```json
//! {
//!   "stats": { "total": 2, "completed": 1, "failed": 1, ... },
//!   "records": [
//!     {
//!       "id": 1,
//!       "name": "photo.jpg",
//!       "status": "completed",
//!       "source_size": 48211,
//!       "source_sha256": "9f86d0…",
//!       "output": {
//!         "name": "optimized_photo.webp",
//!         "format": "webp",
//!         "size": 20113,
//!         "compression_ratio": 58,
//!         "sha256": "2c26b4…"
//!       }
//!     },
//!     { "id": 2, "name": "broken.png", "status": "error", ... , "output": null }
//!   ]
//! }
//! ```

use crate::config::OutputFormat;
use crate::naming::output_file_name;
use crate::registry::{ImageRecord, RecordId, StatusKind, content_digest};
use crate::stats::Stats;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub stats: Stats,
    pub records: Vec<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub id: RecordId,
    pub name: String,
    pub status: StatusKind,
    pub source_size: u64,
    pub source_sha256: String,
    pub output: Option<ReportOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutput {
    pub name: String,
    pub format: OutputFormat,
    pub size: u64,
    pub compression_ratio: i64,
    pub sha256: String,
}

impl ReportEntry {
    fn from_record(record: &ImageRecord) -> Self {
        let output = record.result().map(|result| ReportOutput {
            name: output_file_name(record.name(), result.output_format()),
            format: result.output_format(),
            size: result.size(),
            compression_ratio: result.compression_ratio(),
            sha256: content_digest(result.bytes()),
        });
        Self {
            id: record.id(),
            name: record.name().to_string(),
            status: record.status().kind(),
            source_size: record.source_size(),
            source_sha256: content_digest(record.source()),
            output,
        }
    }
}

impl RunReport {
    pub fn from_records(records: &[ImageRecord]) -> Self {
        Self {
            stats: Stats::from_records(records),
            records: records.iter().map(ReportEntry::from_record).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CompressionResult, Registry, Transition};
    use crate::test_helpers::record;
    use tempfile::TempDir;

    fn sample() -> RunReport {
        let (a, b) = (record("photo.jpg", &[0; 10]), record("broken.png", b"??"));
        let (ida, idb) = (a.id(), b.id());
        let mut registry = Registry::new();
        registry.add([a, b]);
        registry.transition(
            ida,
            Transition::Completed(CompressionResult::new(10, vec![1; 4], OutputFormat::Webp)),
        );
        registry.transition(idb, Transition::Failed);
        RunReport::from_records(registry.snapshot())
    }

    #[test]
    fn entries_follow_record_state() {
        let report = sample();
        assert_eq!(report.records.len(), 2);

        let ok = &report.records[0];
        assert_eq!(ok.status, StatusKind::Completed);
        let output = ok.output.as_ref().unwrap();
        assert_eq!(output.name, "optimized_photo.webp");
        assert_eq!(output.size, 4);
        assert_eq!(output.compression_ratio, 60);
        assert_eq!(output.sha256, content_digest(&[1; 4]));

        let failed = &report.records[1];
        assert_eq!(failed.status, StatusKind::Error);
        assert!(failed.output.is_none());
        assert_eq!(report.stats.failed, 1);
    }

    #[test]
    fn json_uses_lowercase_tags() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["records"][0]["status"], "completed");
        assert_eq!(json["records"][0]["output"]["format"], "webp");
        assert_eq!(json["records"][1]["status"], "error");
        assert!(json["records"][1]["output"].is_null());
        assert_eq!(json["stats"]["completed"], 1);
        assert_eq!(json["stats"]["format_counts"]["webp"], 1);
    }

    #[test]
    fn write_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("reports/run.json");
        sample().write(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("optimized_photo.webp"));
    }
}
