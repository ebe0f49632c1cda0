//! Intake: turning paths on disk into pending records.
//!
//! Inputs may be files or directories. Directories are walked recursively in
//! file-name order; explicitly named files are taken in the order given.
//!
//! ```text
//! inputs ─▶ walk ─▶ filter by extension ─▶ filter by size ─▶ read (parallel)
//!                         │                      │                 │
//!                         ▼                      ▼                 ▼
//!                    InvalidType             TooLarge          Unreadable
//! ```
//!
//! Files found while walking a directory that don't look like images are
//! skipped quietly; a file named explicitly on the command line is reported as
//! `InvalidType` instead. Rejections never reach the registry.
//!
//! Reading happens on the rayon pool. Output order always matches walk order.

use crate::registry::ImageRecord;
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Accepted file extensions, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["jpeg", "jpg", "png", "gif", "webp", "bmp", "tiff", "tif"];

/// 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeOptions {
    /// Files strictly larger than this are rejected.
    pub max_file_size: u64,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    TooLarge { size: u64, limit: u64 },
    InvalidType,
    Unreadable(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { size, limit } => {
                write!(f, "too large ({size} bytes, limit {limit})")
            }
            Self::InvalidType => f.write_str("not a supported image type"),
            Self::Unreadable(message) => write!(f, "unreadable: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub path: PathBuf,
    pub reason: RejectionReason,
}

/// Outcome of an intake pass.
#[derive(Debug, Default)]
pub struct Intake {
    pub accepted: Vec<ImageRecord>,
    pub rejected: Vec<Rejection>,
}

/// `true` when `path` has one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Candidate file discovered during the walk, before it is read.
struct Candidate {
    path: PathBuf,
    explicit: bool,
}

/// Collect records from files and directories.
///
/// Missing inputs are an error, as is any other failure to stat a named
/// input. Everything that goes wrong with an individual file after that
/// becomes a [`Rejection`].
pub fn collect(inputs: &[PathBuf], options: &IntakeOptions) -> Result<Intake, IntakeError> {
    let mut candidates = Vec::new();
    let mut rejected = Vec::new();

    for input in inputs {
        let metadata = match fs::metadata(input) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(IntakeError::NotFound(input.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        if metadata.is_dir() {
            walk_dir(input, &mut candidates, &mut rejected);
        } else {
            candidates.push(Candidate {
                path: input.clone(),
                explicit: true,
            });
        }
    }

    let mut checked = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match check(&candidate, options) {
            Ok(Some(path)) => checked.push(path),
            Ok(None) => {}
            Err(rejection) => rejected.push(rejection),
        }
    }

    let reads: Vec<Result<ImageRecord, Rejection>> = checked.par_iter().map(|p| read(p)).collect();

    let mut intake = Intake {
        accepted: Vec::with_capacity(reads.len()),
        rejected,
    };
    for read in reads {
        match read {
            Ok(record) => intake.accepted.push(record),
            Err(rejection) => intake.rejected.push(rejection),
        }
    }

    for rejection in &intake.rejected {
        warn!(path = %rejection.path.display(), reason = %rejection.reason, "file rejected");
    }
    info!(
        accepted = intake.accepted.len(),
        rejected = intake.rejected.len(),
        "intake complete"
    );
    Ok(intake)
}

fn walk_dir(root: &Path, candidates: &mut Vec<Candidate>, rejected: &mut Vec<Rejection>) {
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => candidates.push(Candidate {
                path: entry.into_path(),
                explicit: false,
            }),
            Ok(_) => {}
            Err(err) => rejected.push(Rejection {
                path: err.path().unwrap_or(root).to_path_buf(),
                reason: RejectionReason::Unreadable(err.to_string()),
            }),
        }
    }
}

/// Extension and size checks. `Ok(None)` means "skip quietly".
fn check(candidate: &Candidate, options: &IntakeOptions) -> Result<Option<PathBuf>, Rejection> {
    let path = &candidate.path;
    let reject = |reason| Rejection {
        path: path.clone(),
        reason,
    };

    if !is_supported(path) {
        if candidate.explicit {
            return Err(reject(RejectionReason::InvalidType));
        }
        debug!(path = %path.display(), "skipping non-image file");
        return Ok(None);
    }

    let size = fs::metadata(path)
        .map_err(|e| reject(RejectionReason::Unreadable(e.to_string())))?
        .len();
    if size > options.max_file_size {
        return Err(reject(RejectionReason::TooLarge {
            size,
            limit: options.max_file_size,
        }));
    }
    Ok(Some(path.clone()))
}

fn read(path: &Path) -> Result<ImageRecord, Rejection> {
    let bytes = fs::read(path).map_err(|e| Rejection {
        path: path.to_path_buf(),
        reason: RejectionReason::Unreadable(e.to_string()),
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(%name, size = bytes.len(), "file accepted");
    Ok(ImageRecord::new(name, bytes))
}
