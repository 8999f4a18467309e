//! Playback capabilities the engine drives.
//!
//! Two heterogeneous backends sit behind these traits: one that plays
//! pre-recorded assets and one that synthesizes speech. Platforms supply
//! implementations; absence of either is expressed as `None` at engine
//! construction.

use crate::error::AudioError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Opaque handle to an asset loaded by an [`AssetBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    id: u64,
    path: String,
}

impl AssetHandle {
    pub fn new(id: u64, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Callback a backend fires when an asset plays to its natural end.
pub struct PlaybackEnd {
    notify: Box<dyn FnOnce() + Send>,
}

impl PlaybackEnd {
    pub fn new(notify: impl FnOnce() + Send + 'static) -> Self {
        Self {
            notify: Box::new(notify),
        }
    }

    /// A callback that does nothing.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn finished(self) {
        (self.notify)()
    }
}

impl std::fmt::Debug for PlaybackEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEnd").finish_non_exhaustive()
    }
}

/// Capability to load and play pre-recorded audio assets.
#[async_trait]
pub trait AssetBackend: Send + Sync {
    /// Load the asset at `path` until it can play through.
    ///
    /// Missing assets yield [`AudioError::AssetNotFound`]. The engine bounds
    /// this call with its load timeout.
    async fn load(&self, path: &str) -> Result<AssetHandle, AudioError>;

    /// Start playing from the beginning; resolves once the backend has
    /// acknowledged the start. `on_end` fires on natural end only.
    async fn play(
        &self,
        handle: &AssetHandle,
        volume: f32,
        on_end: PlaybackEnd,
    ) -> Result<(), AudioError>;

    /// Halt and rewind. Idempotent.
    fn stop(&self, handle: &AssetHandle);
}

/// An installed synthetic voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
    pub is_local: bool,
}

/// One request to the speech synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// `None` uses the platform default voice.
    pub voice: Option<Voice>,
}

/// Capability to speak text with a synthetic voice.
pub trait SpeechSynthesizer: Send + Sync {
    fn voices(&self) -> Vec<Voice>;

    /// Drop any in-flight utterance.
    fn cancel(&self);

    /// Queue an utterance for speaking. Returns once accepted; progress is
    /// reported through `observer`.
    fn speak(&self, utterance: Utterance, observer: UtteranceObserver) -> Result<(), AudioError>;
}

/// Shared "an utterance is active" flag.
#[derive(Debug, Default)]
pub struct SpeechActivity {
    speaking: AtomicBool,
    current: AtomicU64,
    idle: Arc<Notify>,
}

impl SpeechActivity {
    pub fn new(idle: Arc<Notify>) -> Self {
        Self {
            speaking: AtomicBool::new(false),
            current: AtomicU64::new(0),
            idle,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Marks a new utterance as the active one and returns its id.
    pub(crate) fn begin(&self) -> u64 {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.speaking.store(true, Ordering::SeqCst);
        id
    }

    /// Invalidates every outstanding utterance.
    pub(crate) fn cancel(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
        self.set_idle();
    }

    fn is_current(&self, id: u64) -> bool {
        self.current.load(Ordering::SeqCst) == id
    }

    fn set_idle(&self) {
        self.speaking.store(false, Ordering::SeqCst);
        self.idle.notify_waiters();
    }
}

/// Receives lifecycle events for one utterance.
///
/// Events from an utterance that has since been cancelled or replaced are
/// ignored, so a late end event never clears the flag of its successor.
#[derive(Debug, Clone)]
pub struct UtteranceObserver {
    activity: Arc<SpeechActivity>,
    utterance_id: u64,
}

impl UtteranceObserver {
    pub(crate) fn new(activity: Arc<SpeechActivity>, utterance_id: u64) -> Self {
        Self {
            activity,
            utterance_id,
        }
    }

    /// An observer bound to nothing, for driving synthesizers directly.
    pub fn detached() -> Self {
        let activity = Arc::new(SpeechActivity::default());
        let utterance_id = activity.begin();
        Self::new(activity, utterance_id)
    }

    pub fn is_current(&self) -> bool {
        self.activity.is_current(self.utterance_id)
    }

    pub fn started(&self) {
        if self.is_current() {
            self.activity.speaking.store(true, Ordering::SeqCst);
        }
    }

    pub fn finished(&self) {
        if self.is_current() {
            self.activity.set_idle();
        }
    }

    pub fn failed(&self, reason: &str) {
        tracing::error!(reason, "speech synthesis error");
        self.finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_end_runs_callback_once() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let end = PlaybackEnd::new(move || flag.store(true, Ordering::SeqCst));
        end.finished();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_observer_flips_flag() {
        let activity = Arc::new(SpeechActivity::new(Arc::new(Notify::new())));
        let id = activity.begin();
        let observer = UtteranceObserver::new(Arc::clone(&activity), id);
        observer.started();
        assert!(activity.is_speaking());
        observer.finished();
        assert!(!activity.is_speaking());
    }

    #[test]
    fn test_stale_observer_is_ignored() {
        let activity = Arc::new(SpeechActivity::new(Arc::new(Notify::new())));
        let old = UtteranceObserver::new(Arc::clone(&activity), activity.begin());
        let _new = UtteranceObserver::new(Arc::clone(&activity), activity.begin());

        old.failed("interrupted");
        assert!(activity.is_speaking());
        assert!(!old.is_current());
    }

    #[test]
    fn test_cancel_clears_flag() {
        let activity = Arc::new(SpeechActivity::new(Arc::new(Notify::new())));
        let observer = UtteranceObserver::new(Arc::clone(&activity), activity.begin());
        activity.cancel();
        assert!(!activity.is_speaking());
        assert!(!observer.is_current());
    }
}
