//! Session recorder: captures editor snapshots for deterministic replay.

use crate::state::EditorState;
use crate::storage::{Storage, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// One captured snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: usize,
    /// Milliseconds since recording started.
    pub elapsed_ms: u64,
    pub state: Arc<EditorState>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    frames: Vec<Frame>,
}

/// Records editor snapshots while running.
///
/// `start`, `stop`, `clear` and `replay` may be called any number of times in
/// any state.
#[derive(Debug, Clone)]
pub struct Recorder {
    /// Minimum time between captures.
    cadence: Duration,
    recording: bool,
    frames: Vec<Frame>,
    started_at: Option<Instant>,
    last_capture: Option<Instant>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Recorder {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence,
            recording: false,
            frames: Vec::new(),
            started_at: None,
            last_capture: None,
        }
    }

    pub fn with_cadence_ms(cadence_ms: u64) -> Self {
        Self::new(Duration::from_millis(cadence_ms))
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn set_cadence(&mut self, cadence: Duration) {
        self.cadence = cadence;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn start(&mut self) {
        if self.recording {
            return;
        }
        self.recording = true;
        self.started_at.get_or_insert_with(Instant::now);
        log::debug!("Recorder started ({} frames kept)", self.frames.len());
    }

    pub fn stop(&mut self) {
        if !self.recording {
            return;
        }
        self.recording = false;
        log::debug!("Recorder stopped with {} frames", self.frames.len());
    }

    /// Drop all frames. Recording continues if it was running.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.last_capture = None;
        self.started_at = self.recording.then(Instant::now);
    }

    /// Offer a transient snapshot. Returns whether it was captured: the
    /// recorder must be running, the snapshot must differ from the last frame,
    /// and the cadence must have elapsed.
    pub fn tick(&mut self, state: &Arc<EditorState>) -> bool {
        if !self.accepts(state) {
            return false;
        }
        let now = Instant::now();
        if let Some(last) = self.last_capture {
            if now.duration_since(last) < self.cadence {
                return false;
            }
        }
        self.push(state, now);
        true
    }

    /// Offer a committed snapshot. Same as [`Recorder::tick`] but never
    /// throttled by the cadence.
    pub fn capture(&mut self, state: &Arc<EditorState>) -> bool {
        if !self.accepts(state) {
            return false;
        }
        self.push(state, Instant::now());
        true
    }

    fn accepts(&self, state: &Arc<EditorState>) -> bool {
        self.recording
            && !self
                .frames
                .last()
                .is_some_and(|frame| Arc::ptr_eq(&frame.state, state))
    }

    fn push(&mut self, state: &Arc<EditorState>, now: Instant) {
        let elapsed_ms = self
            .started_at
            .map_or(0, |start| now.duration_since(start).as_millis() as u64);
        self.frames.push(Frame {
            index: self.frames.len(),
            elapsed_ms,
            state: Arc::clone(state),
        });
        self.last_capture = Some(now);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Captured snapshots in order.
    pub fn replay(&self) -> impl Iterator<Item = &Arc<EditorState>> + '_ {
        self.frames.iter().map(|frame| &frame.state)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Session {
            frames: self.frames.clone(),
        })
    }

    /// Replace the frames with a serialized session. Stops recording.
    pub fn load_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let session: Session = serde_json::from_str(json)?;
        self.stop();
        self.frames = session.frames;
        self.started_at = None;
        self.last_capture = None;
        Ok(())
    }

    /// Persist the session under `key`.
    pub async fn save<S: Storage + ?Sized>(&self, storage: &S, key: &str) -> StorageResult<()> {
        let json = self
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        storage.save(key, &json).await
    }

    /// Load a session saved with [`Recorder::save`].
    pub async fn load<S: Storage + ?Sized>(&mut self, storage: &S, key: &str) -> StorageResult<()> {
        let json = storage.load(key).await?;
        self.load_json(&json)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
