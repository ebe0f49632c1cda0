//! Image registry: the ordered collection of records and their status lifecycle.
//!
//! The registry is the single piece of shared mutable state in a batch. It is
//! only mutated through [`Registry::add`], [`Registry::remove`],
//! [`Registry::transition`], [`Registry::clear`] and [`Registry::clear_all`].
//!
//! ## Record Lifecycle
//!
//! ```text
//!            transition(Compressing)          transition(Completed(..))
//! Pending ─────────────────────────▶ Compressing ─────────────────────▶ Completed
//!                                         │
//!                                         │ transition(Failed)
//!                                         ▼
//!                                       Error
//! ```
//!
//! Records are created `Pending` and leave the registry only through explicit
//! removal or a clear. The compression driver never deletes records.
//!
//! ## Completion Snapshot
//!
//! A completed record carries its [`CompressionResult`] inside the status, so
//! result bytes, ratio, and output format exist only in that state. The output
//! format is the one configured when the record was dequeued and never changes
//! afterwards, even if the configuration does.
//!
//! The most recently completed record is also copied into a separate
//! "last completed" slot that survives [`Registry::clear`], so a user starting
//! a new batch can still see their previous result.

use crate::config::OutputFormat;
use crate::stats::percent_saved;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque record identifier, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

/// SHA-256 of a byte buffer, returned as a hex string.
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Display-only handle onto a record's source image.
///
/// Shares the source buffer instead of copying it; the handle is released
/// together with the record that owns it.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    key: String,
    bytes: Arc<[u8]>,
}

impl PreviewHandle {
    fn for_source(bytes: &Arc<[u8]>) -> Self {
        let digest = content_digest(bytes);
        Self {
            key: format!("preview:{}", &digest[..12]),
            bytes: Arc::clone(bytes),
        }
    }

    /// Stable key derived from the source content.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Output of a successful compression, frozen at completion time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    bytes: Arc<[u8]>,
    compression_ratio: i64,
    output_format: OutputFormat,
}

impl CompressionResult {
    /// `compression_ratio = round((source_size - len) / source_size * 100)`.
    pub fn new(source_size: u64, bytes: Vec<u8>, output_format: OutputFormat) -> Self {
        let compression_ratio = percent_saved(source_size, bytes.len() as u64);
        Self {
            bytes: bytes.into(),
            compression_ratio,
            output_format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn compression_ratio(&self) -> i64 {
        self.compression_ratio
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Pending,
    Compressing,
    Completed(CompressionResult),
    Error,
}

/// Status without its payload, for counting and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Compressing,
    Completed,
    Error,
}

impl Status {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Pending => StatusKind::Pending,
            Self::Compressing => StatusKind::Compressing,
            Self::Completed(_) => StatusKind::Completed,
            Self::Error => StatusKind::Error,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Compressing => "compressing",
            Self::Completed => "completed",
            Self::Error => "error",
        })
    }
}

/// One uploaded image and its processing state.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    id: RecordId,
    name: String,
    source: Arc<[u8]>,
    preview: PreviewHandle,
    status: Status,
}

impl ImageRecord {
    /// Create a `Pending` record with a fresh id.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let source: Arc<[u8]> = bytes.into();
        Self {
            id: RecordId::next(),
            name: name.into(),
            preview: PreviewHandle::for_source(&source),
            source,
            status: Status::Pending,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Original file name, used for output naming.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Shared handle on the source bytes, for work done outside the registry lock.
    pub fn source_shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.source)
    }

    pub fn source_size(&self) -> u64 {
        self.source.len() as u64
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Result payload, present only when completed.
    pub fn result(&self) -> Option<&CompressionResult> {
        match &self.status {
            Status::Completed(result) => Some(result),
            _ => None,
        }
    }
}

/// A status change requested on a record.
#[derive(Debug, Clone)]
pub enum Transition {
    Compressing,
    Completed(CompressionResult),
    Failed,
}

/// Ordered collection of records, keyed by id.
#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<ImageRecord>,
    last_completed: Option<ImageRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records at the end, in `Pending` status.
    ///
    /// A record whose id is already present is skipped.
    pub fn add(&mut self, records: impl IntoIterator<Item = ImageRecord>) {
        for mut record in records {
            if self.position(record.id).is_some() {
                warn!(id = %record.id, "record already registered, skipping");
                continue;
            }
            record.status = Status::Pending;
            debug!(id = %record.id, name = %record.name, "record added");
            self.records.push(record);
        }
    }

    /// Delete the record with `id`. Returns `false` when it was absent.
    pub fn remove(&mut self, id: RecordId) -> bool {
        match self.position(id) {
            Some(pos) => {
                let removed = self.records.remove(pos);
                debug!(id = %removed.id, "record removed");
                true
            }
            None => false,
        }
    }

    /// Move a record to a new status.
    ///
    /// Returns `false` without touching anything when `id` is absent, which
    /// happens when a record is removed while it is being compressed.
    pub fn transition(&mut self, id: RecordId, transition: Transition) -> bool {
        let Some(pos) = self.position(id) else {
            debug!(%id, "transition on missing record ignored");
            return false;
        };
        let record = &mut self.records[pos];
        record.status = match transition {
            Transition::Compressing => Status::Compressing,
            Transition::Completed(result) => Status::Completed(result),
            Transition::Failed => Status::Error,
        };
        if record.result().is_some() {
            self.last_completed = Some(record.clone());
        }
        true
    }

    /// Empty the registry. The last-completed slot is kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Empty the registry and forget the last completed record.
    pub fn clear_all(&mut self) {
        self.records.clear();
        self.last_completed = None;
    }

    /// Current records in insertion order.
    pub fn snapshot(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Oldest record still waiting to be compressed.
    pub fn next_pending(&self) -> Option<&ImageRecord> {
        self.records
            .iter()
            .find(|r| r.status.kind() == StatusKind::Pending)
    }

    pub fn pending_count(&self) -> usize {
        self.count(StatusKind::Pending)
    }

    pub fn count(&self, kind: StatusKind) -> usize {
        self.records
            .iter()
            .filter(|r| r.status.kind() == kind)
            .count()
    }

    pub fn last_completed(&self) -> Option<&ImageRecord> {
        self.last_completed.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}
