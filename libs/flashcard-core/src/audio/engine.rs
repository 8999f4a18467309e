//! Audio playback engine.
//!
//! Plays a pronunciation by walking the resolver's candidate files in order,
//! caching every asset that loads, and falling back to synthetic speech once
//! the candidates are exhausted. At most one playback of either backend is
//! current at any time: every request stops its predecessor first.
//!
//! Requests are ordered by a generation counter. `stop()` and every new
//! `play()` bump it; an in-flight request that finds the counter moved on
//! abandons its attempt, and end-of-asset callbacks from superseded
//! playbacks are ignored.

use super::backend::{AssetBackend, AssetHandle, PlaybackEnd, SpeechSynthesizer, Voice};
use super::resolver::AssetRef;
use super::speech::{SpeechFallback, SpeechOptions};
use super::{AudioConfig, PlayOptions, QueueItem};
use crate::error::AudioError;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Snapshot of the asset cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub size: usize,
    pub asset_paths: Vec<String>,
}

#[derive(Debug, Default)]
struct PlaybackState {
    current: Option<AssetHandle>,
    is_playing: bool,
    cache: HashMap<String, AssetHandle>,
    generation: u64,
}

enum LocalOutcome {
    Played,
    Exhausted,
    Superseded,
}

/// Pronunciation player over an asset backend and a speech fallback.
pub struct AudioEngine {
    config: AudioConfig,
    fallback_enabled: AtomicBool,
    assets: Option<Arc<dyn AssetBackend>>,
    speech: SpeechFallback,
    state: Arc<Mutex<PlaybackState>>,
    idle: Arc<Notify>,
}

impl AudioEngine {
    /// Create an engine from the probed capabilities; either may be absent.
    pub fn new(
        config: AudioConfig,
        assets: Option<Arc<dyn AssetBackend>>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    ) -> Self {
        let idle = Arc::new(Notify::new());
        info!(
            asset_playback = assets.is_some(),
            speech = synthesizer.is_some(),
            "audio capabilities detected"
        );
        Self {
            fallback_enabled: AtomicBool::new(config.fallback_enabled),
            config,
            assets,
            speech: SpeechFallback::new(synthesizer, Arc::clone(&idle)),
            state: Arc::new(Mutex::new(PlaybackState::default())),
            idle,
        }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn has_asset_support(&self) -> bool {
        self.assets.is_some()
    }

    pub fn has_speech_support(&self) -> bool {
        self.speech.is_available()
    }

    pub fn set_fallback_enabled(&self, enabled: bool) {
        self.fallback_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled.load(Ordering::SeqCst)
    }

    /// True while an asset or an utterance is active.
    pub fn is_playing(&self) -> bool {
        self.lock_state().is_playing || self.speech.is_speaking()
    }

    /// Candidate files for `text` under the configured resolution mode.
    pub fn asset_ref(&self, text: &str, category: Category, options: &PlayOptions) -> AssetRef {
        AssetRef::new(
            &self.config.base_path,
            category,
            text,
            &options.key_words,
            self.config.resolution,
        )
    }

    /// The first path a pronunciation of `text` would try.
    pub fn asset_path(&self, text: &str, category: Category, options: &PlayOptions) -> String {
        let asset = self.asset_ref(text, category, options);
        asset.paths().into_iter().next().unwrap_or_default()
    }

    /// Pronounce `text`, preferring recorded assets over synthetic speech.
    ///
    /// Never fails loudly: every miss is absorbed and only total exhaustion
    /// comes back as `false`.
    pub async fn play(&self, text: &str, category: Category, options: &PlayOptions) -> bool {
        let ticket = self.halt();

        match self.play_local(ticket, text, category, options).await {
            Ok(LocalOutcome::Played) => true,
            Ok(LocalOutcome::Superseded) => {
                debug!(text, "playback request superseded");
                false
            }
            Ok(LocalOutcome::Exhausted) => {
                if self.can_fall_back() {
                    info!(text, "local audio unavailable, using speech synthesis");
                }
                self.fall_back(ticket, text, options)
            }
            Err(e) => {
                error!(text, error = %e, "audio playback error");
                self.fall_back(ticket, text, options)
            }
        }
    }

    /// Play each item in turn, waiting for one to end before the next.
    ///
    /// Returns how many items were started. A `stop()` or an unrelated
    /// `play()` while the queue runs ends the queue.
    pub async fn play_queue(&self, items: &[QueueItem]) -> usize {
        let mut started = 0;
        for item in items {
            if item.text.is_empty() {
                continue;
            }
            if self.play(&item.text, item.category, &item.options).await {
                started += 1;
            }
            let ticket = self.generation();
            self.wait_for_end().await;
            if self.generation() != ticket {
                debug!(started, "playback queue interrupted");
                break;
            }
        }
        started
    }

    /// Resolves once neither backend is active.
    pub async fn wait_for_end(&self) {
        loop {
            let notified = self.idle.notified();
            if !self.is_playing() {
                return;
            }
            notified.await;
        }
    }

    /// Halt both backends. Idempotent.
    pub fn stop(&self) {
        self.halt();
    }

    pub fn clear_cache(&self) {
        let mut state = self.lock_state();
        let dropped = state.cache.len();
        state.cache.clear();
        info!(dropped, "audio cache cleared");
    }

    pub fn cache_info(&self) -> CacheInfo {
        let state = self.lock_state();
        let mut asset_paths: Vec<String> = state.cache.keys().cloned().collect();
        asset_paths.sort();
        CacheInfo {
            size: asset_paths.len(),
            asset_paths,
        }
    }

    pub fn list_voices(&self) -> Vec<Voice> {
        self.speech.list_voices()
    }

    /// Handle of the asset currently playing, if any.
    pub fn current_handle(&self) -> Option<AssetHandle> {
        self.lock_state().current.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().expect("playback state lock")
    }

    fn generation(&self) -> u64 {
        self.lock_state().generation
    }

    /// Stops whatever is current and opens a new generation.
    fn halt(&self) -> u64 {
        let (ticket, previous) = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.is_playing = false;
            (state.generation, state.current.take())
        };

        if let (Some(assets), Some(handle)) = (&self.assets, previous) {
            debug!(path = handle.path(), "stopping current asset");
            assets.stop(&handle);
        }
        self.speech.stop();
        self.idle.notify_waiters();
        ticket
    }

    fn can_fall_back(&self) -> bool {
        self.fallback_enabled() && self.speech.is_available()
    }

    fn fall_back(&self, ticket: u64, text: &str, options: &PlayOptions) -> bool {
        if !self.can_fall_back() {
            warn!(text, "no audio played and speech fallback unavailable");
            return false;
        }
        if self.generation() != ticket {
            return false;
        }
        self.speech.speak(text, &SpeechOptions::from(options))
    }

    async fn play_local(
        &self,
        ticket: u64,
        text: &str,
        category: Category,
        options: &PlayOptions,
    ) -> Result<LocalOutcome, AudioError> {
        let Some(assets) = &self.assets else {
            debug!("asset playback unavailable");
            return Ok(LocalOutcome::Exhausted);
        };

        for path in self.asset_ref(text, category, options).paths() {
            match self.try_asset(assets, ticket, &path, options).await {
                Ok(LocalOutcome::Exhausted) => {}
                Ok(outcome) => {
                    if matches!(outcome, LocalOutcome::Played) {
                        info!(path, "playing local audio");
                    }
                    return Ok(outcome);
                }
                Err(e) if e.is_candidate_miss() => {
                    debug!(path, error = %e, "audio candidate unavailable");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(text, "no candidate audio file could be played");
        Ok(LocalOutcome::Exhausted)
    }

    async fn try_asset(
        &self,
        assets: &Arc<dyn AssetBackend>,
        ticket: u64,
        path: &str,
        options: &PlayOptions,
    ) -> Result<LocalOutcome, AudioError> {
        let cached = self.lock_state().cache.get(path).cloned();
        let handle = match cached {
            Some(handle) => {
                debug!(path, "audio cache hit");
                handle
            }
            None => {
                let timeout = self.config.load_timeout;
                let handle = tokio::time::timeout(timeout, assets.load(path))
                    .await
                    .map_err(|_| AudioError::AssetLoadTimeout {
                        path: path.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    })??;
                self.lock_state()
                    .cache
                    .insert(path.to_string(), handle.clone());
                handle
            }
        };

        self.start(assets, ticket, handle, options.asset_volume())
            .await
    }

    async fn start(
        &self,
        assets: &Arc<dyn AssetBackend>,
        ticket: u64,
        handle: AssetHandle,
        volume: f32,
    ) -> Result<LocalOutcome, AudioError> {
        {
            let mut state = self.lock_state();
            if state.generation != ticket {
                return Ok(LocalOutcome::Superseded);
            }
            state.current = Some(handle.clone());
            state.is_playing = true;
        }

        let on_end = {
            let state = Arc::clone(&self.state);
            let idle = Arc::clone(&self.idle);
            PlaybackEnd::new(move || {
                let mut state = state.lock().expect("playback state lock");
                if state.generation == ticket {
                    state.current = None;
                    state.is_playing = false;
                    drop(state);
                    idle.notify_waiters();
                }
            })
        };

        if let Err(e) = assets.play(&handle, volume, on_end).await {
            let mut state = self.lock_state();
            if state.generation == ticket {
                state.current = None;
                state.is_playing = false;
            }
            drop(state);
            self.idle.notify_waiters();
            return Err(e);
        }

        let superseded_by_other = {
            let state = self.lock_state();
            (state.generation != ticket).then(|| state.current.as_ref() != Some(&handle))
        };
        match superseded_by_other {
            None => Ok(LocalOutcome::Played),
            Some(true) => {
                assets.stop(&handle);
                Ok(LocalOutcome::Superseded)
            }
            // the successor already owns this handle
            Some(false) => Ok(LocalOutcome::Superseded),
        }
    }
}
