//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext holding a temp audio root and progress directory
//! - In-memory asset and speech backends that record what they were asked
//!   to play

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use flashcard_core::audio::{
    AssetBackend, AssetHandle, PlaybackEnd, SpeechSynthesizer, Utterance, UtteranceObserver,
    Voice,
};
use flashcard_core::{AudioEngine, AudioError, Category};
use tempfile::TempDir;

use vocab_flashcards_backend::config::Config;
use vocab_flashcards_backend::services::corpus;
use vocab_flashcards_backend::{build_router, AppState};

/// Asset backend over the files present in the temp audio root.
#[derive(Default)]
pub struct FakeAssets {
    next_id: AtomicU64,
    played: Mutex<Vec<String>>,
    stopped: Mutex<HashSet<String>>,
}

impl FakeAssets {
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> HashSet<String> {
        self.stopped.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetBackend for FakeAssets {
    async fn load(&self, path: &str) -> Result<AssetHandle, AudioError> {
        if !std::path::Path::new(path).is_file() {
            return Err(AudioError::AssetNotFound(path.to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(AssetHandle::new(id, path))
    }

    async fn play(
        &self,
        handle: &AssetHandle,
        _volume: f32,
        _on_end: PlaybackEnd,
    ) -> Result<(), AudioError> {
        self.played.lock().unwrap().push(handle.path().to_string());
        Ok(())
    }

    fn stop(&self, handle: &AssetHandle) {
        self.stopped
            .lock()
            .unwrap()
            .insert(handle.path().to_string());
    }
}

/// Speech synthesizer that finishes every utterance immediately.
#[derive(Default)]
pub struct FakeSpeech {
    spoken: Mutex<Vec<Utterance>>,
}

impl FakeSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|utterance| utterance.text.clone())
            .collect()
    }
}

impl SpeechSynthesizer for FakeSpeech {
    fn voices(&self) -> Vec<Voice> {
        vec![fixtures::voice("Samantha", "en-US")]
    }

    fn cancel(&self) {}

    fn speak(&self, utterance: Utterance, observer: UtteranceObserver) -> Result<(), AudioError> {
        self.spoken.lock().unwrap().push(utterance);
        observer.started();
        observer.finished();
        Ok(())
    }
}

/// Test context with the bundled corpus and recording backends.
pub struct TestContext {
    pub dir: TempDir,
    pub assets: Arc<FakeAssets>,
    pub speech: Arc<FakeSpeech>,
    state: AppState,
}

impl TestContext {
    /// Context with both playback backends available.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Context where the host can play nothing.
    pub fn without_playback() -> Self {
        Self::build(false)
    }

    fn build(playback: bool) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config {
            audio_dir: dir.path().join("audio"),
            data_dir: dir.path().join("data"),
            ..Config::default()
        };
        std::fs::create_dir_all(&config.audio_dir).expect("Failed to create audio dir");

        let assets = Arc::new(FakeAssets::default());
        let speech = Arc::new(FakeSpeech::default());
        let engine = if playback {
            AudioEngine::new(
                config.audio_config(),
                Some(assets.clone() as Arc<dyn AssetBackend>),
                Some(speech.clone() as Arc<dyn SpeechSynthesizer>),
            )
        } else {
            AudioEngine::new(config.audio_config(), None, None)
        };

        let corpus = corpus::bundled().expect("Bundled corpus must be valid");
        let state = AppState::with_engine(config, corpus, engine);

        Self {
            dir,
            assets,
            speech,
            state,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.dir.path().join("audio")
    }

    /// Write a recording under `{audio_dir}/{category}/{filename}` and return its path.
    pub fn write_audio(&self, category: Category, filename: &str) -> String {
        let dir = self.audio_dir().join(category.as_str());
        std::fs::create_dir_all(&dir).expect("Failed to create category dir");
        let path = dir.join(filename);
        std::fs::write(&path, fixtures::MP3_BYTES).expect("Failed to write audio file");
        path.to_string_lossy().into_owned()
    }
}
