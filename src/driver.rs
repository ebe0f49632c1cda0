//! Compression driver: feeds pending records to the encoder, one at a time.
//!
//! ## State Machine
//!
//! ```text
//!            start() [pending > 0]
//!   Idle ─────────────────────────▶ Running ──┐
//!    ▲                                 │  ▲    │ item finished,
//!    │ pause() / reset()               │  └────┘ pending remain
//!    │ or no pending left              │
//!    └─────────────────────────────────┘
//! ```
//!
//! Each iteration of [`Driver::run`] first checks the running flag. Pausing is
//! cooperative: an encoder call already in flight is never interrupted and its
//! result is applied normally; the driver just does not pick up the next
//! record.
//!
//! ## Per-Item Protocol
//!
//! 1. Take the oldest `Pending` record (FIFO, no skipping or reordering).
//! 2. Mark it `Compressing` and snapshot the configuration.
//! 3. Call the encoder once. The registry lock is released during the call, so
//!    the record may be removed while it is being compressed.
//! 4. Mark it `Completed` (with the snapshotted output format) or `Error`. If
//!    the record was removed in the meantime, the transition is a no-op and
//!    no item notice is sent.
//!
//! Errors never stop the queue and are not retried.
//!
//! ## Observability
//!
//! [`DriverHandle`] exposes the state and the 0–100 progress of the item in
//! flight to other threads. Progress resets to 0 at the start and end of every
//! item. Lifecycle notices are sent as [`DriverEvent`]s on an optional channel;
//! nothing in the driver depends on them being received.

use crate::config::{CompressionConfig, OutputFormat};
use crate::encoder::Encoder;
use crate::naming::output_file_name;
use crate::registry::{CompressionResult, RecordId, Registry, Transition};
use crate::stats::Stats;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DriverError {
    #[error("No pending images to process")]
    NothingPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

/// Why [`Driver::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No pending records remain.
    Completed,
    /// The driver was paused (or never started) with work possibly left.
    Paused,
}

/// Result of a single [`Driver::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed(RecordId),
    Failed(RecordId),
    /// The record was removed while it was being compressed; its outcome
    /// was discarded without a notice.
    Dropped(RecordId),
    /// Nothing was pending.
    Idle,
}

/// Notices emitted while the queue runs.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Started {
        pending: usize,
        format: OutputFormat,
    },
    ItemStarted {
        id: RecordId,
        name: String,
    },
    ItemCompleted {
        id: RecordId,
        name: String,
        output_name: String,
        format: OutputFormat,
        compression_ratio: i64,
    },
    ItemFailed {
        id: RecordId,
        name: String,
        error: String,
    },
    Paused {
        remaining: usize,
    },
    Finished {
        stats: Stats,
    },
}

#[derive(Debug, Default)]
struct Shared {
    running: AtomicBool,
    progress: AtomicU8,
}

impl Shared {
    fn set_progress(&self, value: u8) {
        self.progress.store(value.min(100), Ordering::Relaxed);
    }

    fn stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }
}

/// Cloneable control surface usable from other threads.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    shared: Arc<Shared>,
}

impl DriverHandle {
    /// Stop after the item in flight. Idempotent.
    pub fn pause(&self) {
        if self.shared.stop() {
            info!("pause requested");
        }
    }

    /// Stop and clear transient progress. Record statuses are untouched.
    pub fn reset(&self) {
        self.shared.stop();
        self.shared.set_progress(0);
    }

    pub fn state(&self) -> DriverState {
        if self.shared.running.load(Ordering::SeqCst) {
            DriverState::Running
        } else {
            DriverState::Idle
        }
    }

    /// Progress of the item in flight, 0–100.
    pub fn progress(&self) -> u8 {
        self.shared.progress.load(Ordering::Relaxed)
    }
}

/// Sequential scheduler over a shared [`Registry`].
pub struct Driver<E> {
    registry: Arc<Mutex<Registry>>,
    config: Arc<RwLock<CompressionConfig>>,
    encoder: E,
    handle: DriverHandle,
    events: Option<Sender<DriverEvent>>,
}

impl<E: Encoder> Driver<E> {
    pub fn new(
        registry: Arc<Mutex<Registry>>,
        config: Arc<RwLock<CompressionConfig>>,
        encoder: E,
    ) -> Self {
        Self {
            registry,
            config,
            encoder,
            handle: DriverHandle {
                shared: Arc::new(Shared::default()),
            },
            events: None,
        }
    }

    /// Send lifecycle notices to `events`.
    pub fn with_events(mut self, events: Sender<DriverEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn handle(&self) -> DriverHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> DriverState {
        self.handle.state()
    }

    pub fn progress(&self) -> u8 {
        self.handle.progress()
    }

    /// `Idle → Running`. Fails without changing state when nothing is pending.
    pub fn start(&self) -> Result<(), DriverError> {
        let pending = self.lock_registry().pending_count();
        if pending == 0 {
            debug!("start ignored: nothing pending");
            return Err(DriverError::NothingPending);
        }

        let format = self.read_config().format();
        self.handle.shared.set_progress(0);
        self.handle.shared.running.store(true, Ordering::SeqCst);
        info!(pending, %format, "compression started");
        self.emit(DriverEvent::Started { pending, format });
        Ok(())
    }

    pub fn pause(&self) {
        self.handle.pause();
    }

    pub fn reset(&self) {
        self.handle.reset();
    }

    /// Process records until none are pending or the driver is paused.
    pub fn run(&mut self) -> RunOutcome {
        loop {
            if self.state() == DriverState::Idle {
                let remaining = self.lock_registry().pending_count();
                info!(remaining, "compression paused");
                self.emit(DriverEvent::Paused { remaining });
                return RunOutcome::Paused;
            }

            if self.step() == StepOutcome::Idle {
                self.handle.shared.stop();
                let stats = Stats::from_records(self.lock_registry().snapshot());
                info!(
                    completed = stats.completed,
                    failed = stats.failed,
                    "all images processed"
                );
                self.emit(DriverEvent::Finished { stats });
                return RunOutcome::Completed;
            }
        }
    }

    /// Compress the oldest pending record, if any.
    ///
    /// This is the building block of [`Driver::run`] and also a manual
    /// single-step: it does not consult or change the running state, so it
    /// works while the driver is `Idle`. Takes `&mut self` so at most one
    /// encoder call can be in flight per driver.
    pub fn step(&mut self) -> StepOutcome {
        let (id, name, source, config) = {
            let mut registry = self.lock_registry();
            let Some(record) = registry.next_pending() else {
                return StepOutcome::Idle;
            };
            let (id, name, source) = (record.id(), record.name().to_string(), record.source_shared());
            registry.transition(id, Transition::Compressing);
            (id, name, source, self.read_config().clone())
        };

        self.handle.shared.set_progress(0);
        debug!(%id, %name, "compressing");
        self.emit(DriverEvent::ItemStarted {
            id,
            name: name.clone(),
        });

        let shared = Arc::clone(&self.handle.shared);
        let on_progress = move |value: u8| shared.set_progress(value);
        let encoded = self
            .encoder
            .encode(&source, &config.encode_options(), &on_progress);
        self.handle.shared.set_progress(0);

        match encoded {
            Ok(bytes) => {
                let format = config.format();
                let result = CompressionResult::new(source.len() as u64, bytes, format);
                let compression_ratio = result.compression_ratio();
                if !self
                    .lock_registry()
                    .transition(id, Transition::Completed(result))
                {
                    debug!(%id, "record removed while compressing, result dropped");
                    return StepOutcome::Dropped(id);
                }
                let output_name = output_file_name(&name, format);
                info!(%id, %output_name, compression_ratio, "compressed");
                self.emit(DriverEvent::ItemCompleted {
                    id,
                    name,
                    output_name,
                    format,
                    compression_ratio,
                });
                StepOutcome::Completed(id)
            }
            Err(err) => {
                if !self.lock_registry().transition(id, Transition::Failed) {
                    debug!(%id, error = %err, "record removed while compressing, failure dropped");
                    return StepOutcome::Dropped(id);
                }
                warn!(%id, %name, error = %err, "compression failed");
                self.emit(DriverEvent::ItemFailed {
                    id,
                    name,
                    error: err.to_string(),
                });
                StepOutcome::Failed(id)
            }
        }
    }

    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_config(&self) -> std::sync::RwLockReadGuard<'_, CompressionConfig> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: DriverEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresetMode;
    use crate::encoder::backend::tests::MockEncoder;
    use crate::registry::{Status, StatusKind};
    use crate::test_helpers::{names, record, shared};
    use std::sync::mpsc;

    struct Fixture {
        registry: Arc<Mutex<Registry>>,
        config: Arc<RwLock<CompressionConfig>>,
        encoder: Arc<MockEncoder>,
        ids: Vec<RecordId>,
    }

    /// Registry with one pending record per `(name, bytes)` pair.
    fn fixture(items: &[(&str, &[u8])], encoder: MockEncoder) -> Fixture {
        let records: Vec<_> = items.iter().map(|(n, b)| record(n, b)).collect();
        let ids = records.iter().map(|r| r.id()).collect();
        let mut registry = Registry::new();
        registry.add(records);
        Fixture {
            registry: shared(registry),
            config: Arc::new(RwLock::new(CompressionConfig::default())),
            encoder: Arc::new(encoder),
            ids,
        }
    }

    impl Fixture {
        fn driver(&self) -> Driver<Arc<MockEncoder>> {
            Driver::new(
                Arc::clone(&self.registry),
                Arc::clone(&self.config),
                Arc::clone(&self.encoder),
            )
        }

        fn kind(&self, index: usize) -> Option<StatusKind> {
            let registry = self.registry.lock().unwrap();
            registry.get(self.ids[index]).map(|r| r.status().kind())
        }
    }

    const ABC: &[(&str, &[u8])] = &[
        ("a.png", b"AAAAAAAA"),
        ("b.png", b"BBBBBBBB"),
        ("c.png", b"CCCCCCCC"),
    ];

    #[test]
    fn start_with_nothing_pending_fails() {
        let fx = fixture(&[], MockEncoder::new());
        let driver = fx.driver();
        assert_eq!(driver.start(), Err(DriverError::NothingPending));
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn start_moves_to_running() {
        let fx = fixture(ABC, MockEncoder::new());
        let driver = fx.driver();
        driver.start().unwrap();
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn processes_in_fifo_order() {
        let fx = fixture(ABC, MockEncoder::new());
        let mut driver = fx.driver();
        driver.start().unwrap();

        assert_eq!(driver.run(), RunOutcome::Completed);
        assert_eq!(
            fx.encoder.sources(),
            vec![b"AAAAAAAA".to_vec(), b"BBBBBBBB".to_vec(), b"CCCCCCCC".to_vec()]
        );
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(fx.registry.lock().unwrap().pending_count(), 0);
    }

    #[test]
    fn completed_records_carry_ratio_and_format() {
        let fx = fixture(ABC, MockEncoder::new());
        let mut driver = fx.driver();
        driver.start().unwrap();
        driver.run();

        let registry = fx.registry.lock().unwrap();
        for record in registry.snapshot() {
            let result = record.result().unwrap();
            assert_eq!(result.size(), 4);
            assert_eq!(result.compression_ratio(), 50);
            assert_eq!(result.output_format(), OutputFormat::Webp);
        }
    }

    #[test]
    fn failure_is_scoped_to_one_record() {
        let fx = fixture(ABC, MockEncoder::new().failing_on(b"BBBBBBBB"));
        let mut driver = fx.driver();
        driver.start().unwrap();

        assert_eq!(driver.run(), RunOutcome::Completed);
        assert_eq!(fx.kind(0), Some(StatusKind::Completed));
        assert_eq!(fx.kind(1), Some(StatusKind::Error));
        assert_eq!(fx.kind(2), Some(StatusKind::Completed));
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(fx.registry.lock().unwrap().pending_count(), 0);
    }

    #[test]
    fn never_two_records_compressing() {
        let fx = fixture(ABC, MockEncoder::new());
        let observed = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let registry = Arc::clone(&fx.registry);
            let observed = Arc::clone(&observed);
            fx.encoder.on_call(i, move || {
                let count = registry.lock().unwrap().count(StatusKind::Compressing);
                observed.lock().unwrap().push(count);
            });
        }

        let mut driver = fx.driver();
        driver.start().unwrap();
        driver.run();

        assert_eq!(*observed.lock().unwrap(), vec![1, 1, 1]);
        assert_eq!(fx.encoder.max_in_flight(), 1);
    }

    #[test]
    fn removing_record_mid_flight_is_tolerated() {
        let fx = fixture(ABC, MockEncoder::new());
        let registry = Arc::clone(&fx.registry);
        let b = fx.ids[1];
        fx.encoder.on_call(1, move || {
            assert!(registry.lock().unwrap().remove(b));
        });

        let (tx, rx) = mpsc::channel();
        let mut driver = fx.driver().with_events(tx);
        driver.start().unwrap();
        assert_eq!(driver.run(), RunOutcome::Completed);
        drop(driver);

        let registry = fx.registry.lock().unwrap();
        assert!(registry.get(b).is_none());
        assert_eq!(names(registry.snapshot()), ["a.png", "c.png"]);
        assert_eq!(registry.count(StatusKind::Completed), 2);

        // The removed record gets no completion notice
        let completed: Vec<_> = rx
            .iter()
            .filter_map(|e| match e {
                DriverEvent::ItemCompleted { id, .. } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(completed, vec![fx.ids[0], fx.ids[2]]);
    }

    #[test]
    fn removing_failing_record_mid_flight_is_tolerated() {
        let fx = fixture(ABC, MockEncoder::new().failing_on(b"BBBBBBBB"));
        let registry = Arc::clone(&fx.registry);
        let b = fx.ids[1];
        fx.encoder.on_call(1, move || {
            registry.lock().unwrap().remove(b);
        });

        let (tx, rx) = mpsc::channel();
        let mut driver = fx.driver().with_events(tx);
        driver.start().unwrap();
        driver.run();
        drop(driver);

        assert!(fx.registry.lock().unwrap().get(b).is_none());
        assert_eq!(fx.registry.lock().unwrap().count(StatusKind::Error), 0);
        assert!(
            !rx.iter()
                .any(|e| matches!(e, DriverEvent::ItemFailed { .. }))
        );
    }

    #[test]
    fn step_reports_dropped_when_record_removed_mid_flight() {
        let fx = fixture(&[("a.png", b"AAAA")], MockEncoder::new());
        let registry = Arc::clone(&fx.registry);
        let a = fx.ids[0];
        fx.encoder.on_call(0, move || {
            registry.lock().unwrap().remove(a);
        });

        let mut driver = fx.driver();
        assert_eq!(driver.step(), StepOutcome::Dropped(a));
        assert!(fx.registry.lock().unwrap().last_completed().is_none());
    }

    #[test]
    fn step_works_as_manual_single_step_while_idle() {
        let fx = fixture(ABC, MockEncoder::new());
        let mut driver = fx.driver();

        assert_eq!(driver.step(), StepOutcome::Completed(fx.ids[0]));
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(fx.kind(1), Some(StatusKind::Pending));
        assert_eq!(fx.encoder.get_calls().len(), 1);
    }

    #[test]
    fn pause_during_last_item_reports_paused_with_nothing_left() {
        let fx = fixture(&[("a.png", b"AAAA"), ("b.png", b"BBBB")], MockEncoder::new());
        let (tx, rx) = mpsc::channel();
        let mut driver = fx.driver().with_events(tx);
        let handle = driver.handle();
        fx.encoder.on_call(1, move || handle.pause());

        driver.start().unwrap();
        assert_eq!(driver.run(), RunOutcome::Paused);
        drop(driver);

        assert_eq!(fx.kind(1), Some(StatusKind::Completed));
        assert_eq!(fx.registry.lock().unwrap().pending_count(), 0);
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.last(), Some(&DriverEvent::Paused { remaining: 0 }));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, DriverEvent::Finished { .. }))
        );
    }

    #[test]
    fn pause_during_second_item_withholds_third() {
        let fx = fixture(ABC, MockEncoder::new());
        let mut driver = fx.driver();
        let handle = driver.handle();
        fx.encoder.on_call(1, move || handle.pause());

        driver.start().unwrap();
        assert_eq!(driver.run(), RunOutcome::Paused);
        assert_eq!(fx.kind(0), Some(StatusKind::Completed));
        assert_eq!(fx.kind(1), Some(StatusKind::Completed));
        assert_eq!(fx.kind(2), Some(StatusKind::Pending));
        assert_eq!(fx.encoder.get_calls().len(), 2);

        // Resuming picks up where it left off
        driver.start().unwrap();
        assert_eq!(driver.run(), RunOutcome::Completed);
        assert_eq!(fx.kind(2), Some(StatusKind::Completed));
        assert_eq!(fx.encoder.get_calls().len(), 3);
    }

    #[test]
    fn pause_during_failing_item_still_records_error() {
        let fx = fixture(ABC, MockEncoder::new().failing_on(b"BBBBBBBB"));
        let mut driver = fx.driver();
        let handle = driver.handle();
        fx.encoder.on_call(1, move || handle.pause());

        driver.start().unwrap();
        assert_eq!(driver.run(), RunOutcome::Paused);
        assert_eq!(fx.kind(1), Some(StatusKind::Error));
        assert_eq!(fx.kind(2), Some(StatusKind::Pending));
    }

    #[test]
    fn run_without_start_does_nothing() {
        let fx = fixture(ABC, MockEncoder::new());
        let mut driver = fx.driver();
        assert_eq!(driver.run(), RunOutcome::Paused);
        assert!(fx.encoder.get_calls().is_empty());
    }

    #[test]
    fn reset_stops_without_touching_statuses() {
        let fx = fixture(ABC, MockEncoder::new());
        let mut driver = fx.driver();
        driver.start().unwrap();
        assert!(matches!(driver.step(), StepOutcome::Completed(_)));

        driver.reset();
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.progress(), 0);
        assert_eq!(fx.kind(0), Some(StatusKind::Completed));
        assert_eq!(fx.kind(1), Some(StatusKind::Pending));
        assert_eq!(driver.run(), RunOutcome::Paused);
    }

    #[test]
    fn progress_is_visible_in_flight_and_cleared_after() {
        let fx = fixture(&[("a.png", b"AAAA")], MockEncoder::new());
        let mut driver = fx.driver();
        let handle = driver.handle();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        fx.encoder.on_call(0, move || {
            *seen_clone.lock().unwrap() = Some(handle.progress());
        });

        driver.start().unwrap();
        driver.run();
        assert_eq!(*seen.lock().unwrap(), Some(50));
        assert_eq!(driver.progress(), 0);
    }

    #[test]
    fn output_format_is_snapshotted_at_dequeue() {
        let fx = fixture(ABC, MockEncoder::new());
        let config = Arc::clone(&fx.config);
        // Change the configuration while the first item is in flight
        fx.encoder.on_call(0, move || {
            config.write().unwrap().select_preset(PresetMode::Background);
        });

        let mut driver = fx.driver();
        driver.start().unwrap();
        driver.run();

        let registry = fx.registry.lock().unwrap();
        let formats: Vec<_> = registry
            .snapshot()
            .iter()
            .map(|r| r.result().unwrap().output_format())
            .collect();
        assert_eq!(
            formats,
            vec![OutputFormat::Webp, OutputFormat::Jpeg, OutputFormat::Jpeg]
        );

        let calls = fx.encoder.get_calls();
        assert_eq!(calls[0].max_dimension, 1920);
        assert_eq!(calls[0].quality.value(), 0.85);
        assert_eq!(calls[1].quality.value(), 0.70);
    }

    #[test]
    fn completed_record_is_not_rewritten_by_later_config_changes() {
        let fx = fixture(&[("a.png", b"AAAAAAAA")], MockEncoder::new());
        let mut driver = fx.driver();
        driver.start().unwrap();
        driver.run();

        fx.config
            .write()
            .unwrap()
            .select_preset(PresetMode::Background);
        let registry = fx.registry.lock().unwrap();
        let result = registry.get(fx.ids[0]).unwrap().result().unwrap();
        assert_eq!(result.output_format(), OutputFormat::Webp);
        assert_eq!(result.compression_ratio(), 50);
    }

    #[test]
    fn records_added_while_running_are_picked_up() {
        let fx = fixture(&[("a.png", b"AAAA")], MockEncoder::new());
        let registry = Arc::clone(&fx.registry);
        fx.encoder.on_call(0, move || {
            registry.lock().unwrap().add([record("late.png", b"LATE")]);
        });

        let mut driver = fx.driver();
        driver.start().unwrap();
        assert_eq!(driver.run(), RunOutcome::Completed);
        assert_eq!(fx.encoder.sources(), vec![b"AAAA".to_vec(), b"LATE".to_vec()]);
    }

    #[test]
    fn events_describe_the_run() {
        let fx = fixture(
            &[("a.jpeg", b"AAAA"), ("b.png", b"BBBB")],
            MockEncoder::new().failing_on(b"BBBB"),
        );
        let (tx, rx) = mpsc::channel();
        let mut driver = fx.driver().with_events(tx);
        driver.start().unwrap();
        driver.run();
        drop(driver);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            DriverEvent::Started {
                pending: 2,
                format: OutputFormat::Webp
            }
        );
        assert!(matches!(&events[1], DriverEvent::ItemStarted { name, .. } if name == "a.jpeg"));
        assert!(matches!(
            &events[2],
            DriverEvent::ItemCompleted { output_name, compression_ratio: 50, .. }
                if output_name == "optimized_a.webp"
        ));
        assert!(matches!(&events[3], DriverEvent::ItemStarted { name, .. } if name == "b.png"));
        assert!(matches!(&events[4], DriverEvent::ItemFailed { name, .. } if name == "b.png"));
        assert!(matches!(
            &events[5],
            DriverEvent::Finished { stats } if stats.completed == 1 && stats.failed == 1
        ));
    }

    #[test]
    fn pause_emits_remaining_count() {
        let fx = fixture(ABC, MockEncoder::new());
        let (tx, rx) = mpsc::channel();
        let mut driver = fx.driver().with_events(tx);
        let handle = driver.handle();
        fx.encoder.on_call(0, move || handle.pause());

        driver.start().unwrap();
        driver.run();
        drop(driver);

        let last = rx.iter().last().unwrap();
        assert_eq!(last, DriverEvent::Paused { remaining: 2 });
    }

    #[test]
    fn step_on_empty_registry_is_idle() {
        let fx = fixture(&[], MockEncoder::new());
        let mut driver = fx.driver();
        assert_eq!(driver.step(), StepOutcome::Idle);
    }

    #[test]
    fn error_status_has_no_result() {
        let fx = fixture(&[("a.png", b"AAAA")], MockEncoder::new().failing_on(b"AAAA"));
        let mut driver = fx.driver();
        driver.start().unwrap();
        driver.run();
        let registry = fx.registry.lock().unwrap();
        let r = registry.get(fx.ids[0]).unwrap();
        assert_eq!(r.status(), &Status::Error);
        assert!(r.result().is_none());
    }
}
