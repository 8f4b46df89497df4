use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::chunk::{chunk_key, ChunkRecord, Fragment, FragmentOutcome};
use crate::models::config::RecorderConfiguration;
use crate::models::error::RecorderError;
use crate::models::recording_result::SessionSummary;
use crate::models::state::{CompletionReason, RecorderState};
use crate::session::grace_timer::GraceTimer;
use crate::session::recording_session::{Admission, RecordingSession};
use crate::traits::capture_source::CaptureSource;
use crate::traits::chunk_store::ChunkStore;
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::quota_oracle::QuotaOracle;
use crate::traits::recorder_delegate::RecorderDelegate;

/// Internal mutable pipeline state, protected by `parking_lot::Mutex`.
struct PipelineInner {
    state: RecorderState,
    session: RecordingSession,
    /// Bumped on every start; sinks from older sessions are ignored.
    generation: u64,
    source: Option<Arc<dyn CaptureSource>>,
    grace_timer: Option<GraceTimer>,
}

/// Side effects collected under the lock and run after it is released.
#[derive(Default)]
struct Effects {
    states: Vec<RecorderState>,
    persisted: Option<(u64, usize)>,
    error: Option<RecorderError>,
    finished: Option<SessionSummary>,
    stop_source: Option<Arc<dyn CaptureSource>>,
}

struct Shared {
    inner: Mutex<PipelineInner>,
    store: Arc<dyn ChunkStore>,
    quota: Arc<dyn QuotaOracle>,
    clock: Arc<dyn Clock>,
    delegate: Mutex<Option<Arc<dyn RecorderDelegate>>>,
    min_free_bytes: u64,
    grace_period: std::time::Duration,
}

/// Chunked capture pipeline.
///
/// Consumes fragments from a `CaptureSource`, rejects stale ones by
/// timestamp, and persists the rest to a `ChunkStore` under gap-free
/// sequence indices while watching the storage quota.
///
/// ```text
/// [CaptureSource] → FragmentSink → quota check → dedup → [ChunkStore]
/// ```
///
/// State transitions: `Idle → Capturing → Finishing → Idle`. Fragment
/// handling is serialized by the pipeline lock, so concurrent deliveries are
/// processed one at a time in lock-acquisition order.
pub struct ChunkPipeline {
    shared: Arc<Shared>,
}

/// Handle a capture source uses to deliver fragments to the pipeline.
///
/// Bound to the session it was created for; once a newer session starts,
/// deliveries through an old sink are ignored.
#[derive(Clone)]
pub struct FragmentSink {
    shared: Weak<Shared>,
    generation: u64,
}

impl FragmentSink {
    /// Hand one fragment to the pipeline.
    pub fn deliver(&self, fragment: Fragment) -> Result<FragmentOutcome, RecorderError> {
        match self.shared.upgrade() {
            Some(shared) => shared.handle_fragment(self.generation, fragment),
            None => Ok(FragmentOutcome::Ignored),
        }
    }
}

impl ChunkPipeline {
    pub fn new(store: Arc<dyn ChunkStore>, quota: Arc<dyn QuotaOracle>, config: &RecorderConfiguration) -> Self {
        Self::with_clock(store, quota, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        store: Arc<dyn ChunkStore>,
        quota: Arc<dyn QuotaOracle>,
        clock: Arc<dyn Clock>,
        config: &RecorderConfiguration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(PipelineInner {
                    state: RecorderState::Idle,
                    session: RecordingSession::new(),
                    generation: 0,
                    source: None,
                    grace_timer: None,
                }),
                store,
                quota,
                clock,
                delegate: Mutex::new(None),
                min_free_bytes: config.min_free_bytes,
                grace_period: config.grace_period,
            }),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn RecorderDelegate>) {
        *self.shared.delegate.lock() = Some(delegate);
    }

    pub fn state(&self) -> RecorderState {
        self.shared.inner.lock().state
    }

    /// Snapshot of the current (or most recent) session counters.
    pub fn session(&self) -> RecordingSession {
        self.shared.inner.lock().session.clone()
    }

    /// Start a new session. Transitions: idle → capturing.
    ///
    /// Clears the previous session's chunks. A session that is still
    /// finishing is closed first; a capturing one is an error.
    pub fn start(&self, source: Arc<dyn CaptureSource>) -> Result<String, RecorderError> {
        let shared = &self.shared;
        let mut effects = Effects::default();

        let (generation, session_id) = {
            let mut inner = shared.inner.lock();
            match inner.state {
                RecorderState::Capturing => {
                    return Err(RecorderError::InvalidState(
                        "a recording session is already active".into(),
                    ));
                }
                RecorderState::Finishing => {
                    shared.finish_locked(&mut inner, CompletionReason::Superseded, &mut effects);
                }
                RecorderState::Idle => {}
            }

            if let Err(e) = shared.store.clear() {
                log::error!("Failed to clear previous chunks: {}", e);
                drop(inner);
                shared.emit(effects);
                return Err(RecorderError::PersistenceFailure(e));
            }

            inner.generation += 1;
            inner.session = RecordingSession::new();
            inner.source = Some(Arc::clone(&source));
            inner.state = RecorderState::Capturing;
            effects.states.push(RecorderState::Capturing);
            log::info!("Recording session {} started", inner.session.id);
            (inner.generation, inner.session.id.clone())
        };
        shared.emit(effects);

        let sink = FragmentSink {
            shared: Arc::downgrade(shared),
            generation,
        };
        if let Err(e) = source.start(sink) {
            log::error!("Capture source failed to start: {}", e);
            let mut effects = Effects::default();
            {
                let mut inner = shared.inner.lock();
                if inner.generation == generation && !inner.state.is_idle() {
                    shared.finish_locked(&mut inner, CompletionReason::Aborted(e.clone()), &mut effects);
                }
            }
            // The source never started; do not ask it to stop.
            effects.stop_source = None;
            shared.emit(effects);
            return Err(e);
        }

        Ok(session_id)
    }

    /// Request stop. Transitions: capturing → finishing.
    ///
    /// Does not flush anything itself: the session completes when the
    /// source's flush fragment arrives or the grace period elapses,
    /// whichever comes first. Stopping an already finishing session is a
    /// no-op.
    pub fn stop(&self) -> Result<(), RecorderError> {
        let shared = &self.shared;
        let mut effects = Effects::default();

        let source = {
            let mut inner = shared.inner.lock();
            match inner.state {
                RecorderState::Idle => {
                    return Err(RecorderError::InvalidState("no active recording session".into()));
                }
                RecorderState::Finishing => return Ok(()),
                RecorderState::Capturing => {}
            }

            inner.session.finishing = true;
            inner.state = RecorderState::Finishing;
            effects.states.push(RecorderState::Finishing);

            let generation = inner.generation;
            let weak = Arc::downgrade(shared);
            inner.grace_timer = Some(GraceTimer::schedule(shared.grace_period, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.on_grace_elapsed(generation);
                }
            }));
            log::info!(
                "Stop requested for session {}; waiting up to {:?} for final fragment",
                inner.session.id,
                shared.grace_period
            );
            inner.source.clone()
        };
        shared.emit(effects);

        // Outside the lock: sources may deliver their flush fragment synchronously.
        if let Some(source) = source {
            source.stop();
        }
        Ok(())
    }

    /// Deliver a fragment to whichever session is current.
    ///
    /// Prefer the `FragmentSink` handed to the source, which also rejects
    /// fragments that belong to an earlier session.
    pub fn ingest(&self, fragment: Fragment) -> Result<FragmentOutcome, RecorderError> {
        let generation = self.shared.inner.lock().generation;
        self.shared.handle_fragment(generation, fragment)
    }
}

impl Drop for ChunkPipeline {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.inner.lock().grace_timer.take() {
            timer.cancel();
        }
    }
}

impl Shared {
    fn handle_fragment(&self, generation: u64, fragment: Fragment) -> Result<FragmentOutcome, RecorderError> {
        let mut effects = Effects::default();
        let result = {
            let mut inner = self.inner.lock();
            self.process_locked(&mut inner, generation, fragment, &mut effects)
        };
        self.emit(effects);
        result
    }

    fn process_locked(
        &self,
        inner: &mut PipelineInner,
        generation: u64,
        fragment: Fragment,
        effects: &mut Effects,
    ) -> Result<FragmentOutcome, RecorderError> {
        if inner.generation != generation || !inner.state.accepts_fragments() {
            log::debug!("Ignoring fragment of {} bytes: no matching active session", fragment.len());
            return Ok(FragmentOutcome::Ignored);
        }

        if let Some(estimate) = self.quota.estimate() {
            let available_bytes = estimate.available_bytes();
            if available_bytes < self.min_free_bytes {
                let error = RecorderError::QuotaExceeded {
                    available_bytes,
                    floor_bytes: self.min_free_bytes,
                };
                log::warn!("Low storage space, aborting session: {}", error);
                self.finish_locked(inner, CompletionReason::Aborted(error.clone()), effects);
                return Err(error);
            }
        }

        if fragment.is_empty() {
            if inner.session.finishing {
                inner.session.last_fragment_seen = true;
                self.finish_locked(inner, CompletionReason::Flushed, effects);
                return Ok(FragmentOutcome::Finalized);
            }
            let inactive = inner.source.as_ref().is_some_and(|s| s.is_inactive());
            if inactive {
                self.finish_locked(inner, CompletionReason::SourceInactive, effects);
                return Ok(FragmentOutcome::Finalized);
            }
            log::debug!("Heartbeat fragment");
            return Ok(FragmentOutcome::Heartbeat);
        }

        // A non-finite timecode would poison the watermark; treat it as absent.
        let timestamp = fragment
            .timecode
            .filter(|t| t.is_finite())
            .unwrap_or_else(|| self.clock.now_ms());
        if let Admission::Drop { watermark } = inner.session.admit(timestamp) {
            log::debug!(
                "Dropping fragment with timestamp {} behind watermark {}",
                timestamp,
                watermark
            );
            return Ok(FragmentOutcome::Dropped { timestamp, watermark });
        }

        let sequence_index = inner.session.next_sequence_index;
        let bytes = fragment.len();
        let key = chunk_key(sequence_index);
        let record = ChunkRecord {
            sequence_index,
            payload: fragment.payload,
            capture_timestamp: timestamp,
        };

        if let Err(e) = self.store.put(&key, record) {
            log::error!("Failed to persist {}: {}", key, e);
            let error = RecorderError::PersistenceFailure(e);
            self.finish_locked(inner, CompletionReason::Aborted(error.clone()), effects);
            return Err(error);
        }

        inner.session.record_persisted(bytes);
        effects.persisted = Some((sequence_index, bytes));
        log::debug!("Persisted {} ({} bytes, timestamp {})", key, bytes, timestamp);

        if inner.session.finishing {
            inner.session.last_fragment_seen = true;
            self.finish_locked(inner, CompletionReason::Flushed, effects);
        }

        Ok(FragmentOutcome::Persisted { sequence_index, bytes })
    }

    fn on_grace_elapsed(&self, generation: u64) {
        let mut effects = Effects::default();
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation
                || !inner.state.is_finishing()
                || inner.session.last_fragment_seen
            {
                return;
            }
            log::warn!(
                "No final fragment within {:?}; completing session {} with {} chunks",
                self.grace_period,
                inner.session.id,
                inner.session.next_sequence_index
            );
            self.finish_locked(&mut inner, CompletionReason::GracePeriodElapsed, &mut effects);
        }
        self.emit(effects);
    }

    /// Return to idle and record the summary. Persisted chunks are kept.
    fn finish_locked(&self, inner: &mut PipelineInner, reason: CompletionReason, effects: &mut Effects) {
        if let Some(timer) = inner.grace_timer.take() {
            timer.cancel();
        }
        let source = inner.source.take();
        if let CompletionReason::Aborted(error) = &reason {
            effects.error = Some(error.clone());
            effects.stop_source = source;
        }

        inner.state = RecorderState::Idle;
        effects.states.push(RecorderState::Idle);

        let session = &inner.session;
        log::info!(
            "Recording session {} finished ({:?}): {} chunks, {} bytes, {} dropped",
            session.id,
            reason,
            session.next_sequence_index,
            session.bytes_persisted,
            session.chunks_dropped
        );
        effects.finished = Some(SessionSummary {
            session_id: session.id.clone(),
            chunks_persisted: session.next_sequence_index,
            bytes_persisted: session.bytes_persisted,
            chunks_dropped: session.chunks_dropped,
            reason,
        });
    }

    fn emit(&self, effects: Effects) {
        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            if let Some((sequence_index, bytes)) = effects.persisted {
                delegate.on_chunk_persisted(sequence_index, bytes);
            }
            if let Some(ref error) = effects.error {
                delegate.on_error(error);
            }
            for state in &effects.states {
                delegate.on_state_changed(*state);
            }
            if let Some(ref summary) = effects.finished {
                delegate.on_session_finished(summary);
            }
        }
        if let Some(source) = effects.stop_source {
            source.stop();
        }
    }
}
