//! Pronunciation audio: filename resolution, asset playback with caching,
//! and synthetic speech fallback.

pub mod backend;
pub mod engine;
pub mod resolver;
pub mod speech;

use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use backend::{
    AssetBackend, AssetHandle, PlaybackEnd, SpeechSynthesizer, Utterance, UtteranceObserver, Voice,
};
pub use engine::{AudioEngine, CacheInfo};
pub use resolver::{resolve, sanitize, sanitize_without_punctuation, AssetRef, ResolutionMode};
pub use speech::{SpeechFallback, SpeechOptions};

/// Default time an asset may take to become playable.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(3);

/// Audio engine configuration.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Content root holding `{category}/{filename}.mp3`.
    pub base_path: String,
    pub load_timeout: Duration,
    pub fallback_enabled: bool,
    pub resolution: ResolutionMode,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            base_path: "./audio".to_string(),
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            fallback_enabled: true,
            resolution: ResolutionMode::default(),
        }
    }
}

/// Per-request playback options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayOptions {
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub rate: Option<f32>,
    #[serde(default)]
    pub pitch: Option<f32>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default, alias = "keyWords")]
    pub key_words: Vec<String>,
    #[serde(default, alias = "voiceName")]
    pub voice_name: Option<String>,
}

impl PlayOptions {
    pub fn with_key_words(key_words: Vec<String>) -> Self {
        Self {
            key_words,
            ..Default::default()
        }
    }

    /// Asset volume; zero or unset plays at full volume.
    pub fn asset_volume(&self) -> f32 {
        self.volume.filter(|v| *v != 0.0).unwrap_or(1.0)
    }
}

/// One entry of a sequential playback queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub text: String,
    pub category: Category,
    #[serde(default)]
    pub options: PlayOptions,
}
