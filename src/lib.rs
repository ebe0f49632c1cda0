//! # Web Optimizer
//!
//! A batch image compressor for the web. Feed it photos, pick a preset, and it
//! shrinks every image one after another into web-friendly JPEG, PNG or WebP,
//! reporting per-file and batch savings.
//!
//! # Architecture: A Queue Over A Registry
//!
//! ```text
//!  intake ──▶ Registry ◀──────── Driver ──▶ Encoder
//!   (files)     │   ▲   transitions   │   (one call per record)
//!               │   └─────────────────┘
//!               ▼
//!      stats / export / report
//! ```
//!
//! - The [`registry::Registry`] is the only shared mutable state. Every record
//!   moves `Pending → Compressing → Completed | Error` through an explicit
//!   transition API.
//! - The [`driver::Driver`] pulls the oldest pending record, hands it to the
//!   [`encoder::Encoder`], and writes the outcome back. Exactly one record is
//!   compressed at a time.
//! - Everything else ([`stats`], [`export`], [`report`], [`output`]) reads a
//!   registry snapshot and never mutates it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`registry`] | Image records, status lifecycle, last-completed slot |
//! | [`driver`] | Sequential scheduler: start / pause / reset, progress, events |
//! | [`encoder`] | `Encoder` trait and the pure-Rust `RustEncoder` |
//! | [`config`] | Presets, the shared `CompressionConfig`, `web-optimizer.toml` loading |
//! | [`intake`] | Files and directories → pending records, with size/type rejections |
//! | [`naming`] | `optimized_<stem>.<ext>` output names |
//! | [`stats`] | Counts, sizes and savings derived from a snapshot |
//! | [`export`] | Writes completed results to disk, all or by format |
//! | [`report`] | JSON run report with per-file digests |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Image At A Time
//!
//! The driver never runs two encoder calls concurrently. Compressing a large
//! photo already saturates memory bandwidth, and serial processing keeps the
//! progress display and pause semantics simple: pausing lets the image in
//! flight finish and leaves the rest `Pending`.
//!
//! ## Results Are Frozen At Completion
//!
//! A completed record stores its bytes, ratio and output format. Changing the
//! preset afterwards affects only records that have not started yet, so file
//! names and exports always agree with what was actually produced.
//!
//! ## Pure-Rust Encoding
//!
//! [`encoder::RustEncoder`] uses the `image` crate for decoding, Lanczos3
//! resizing and encoding. No system libraries are needed; the binary is
//! self-contained.

pub mod config;
pub mod driver;
pub mod encoder;
pub mod export;
pub mod intake;
pub mod naming;
pub mod output;
pub mod registry;
pub mod report;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_helpers;
