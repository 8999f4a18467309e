//! Synthetic speech fallback.

use super::backend::{SpeechActivity, SpeechSynthesizer, Utterance, UtteranceObserver, Voice};
use super::PlayOptions;
use crate::error::AudioError;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, warn};

/// Parameters of a synthesized utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice_name: Option<String>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            rate: 0.8,
            pitch: 1.0,
            volume: 1.0,
            voice_name: None,
        }
    }
}

impl From<&PlayOptions> for SpeechOptions {
    fn from(options: &PlayOptions) -> Self {
        let defaults = Self::default();
        // zero counts as unset
        let or_default = |value: Option<f32>, default: f32| {
            value.filter(|v| *v != 0.0).unwrap_or(default)
        };
        Self {
            lang: options
                .lang
                .clone()
                .filter(|lang| !lang.is_empty())
                .unwrap_or(defaults.lang),
            rate: or_default(options.rate, defaults.rate),
            pitch: or_default(options.pitch, defaults.pitch),
            volume: or_default(options.volume, defaults.volume),
            voice_name: options.voice_name.clone(),
        }
    }
}

/// Wraps an optional [`SpeechSynthesizer`] behind a single-flight `speak`.
pub struct SpeechFallback {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    activity: Arc<SpeechActivity>,
}

impl SpeechFallback {
    pub fn new(synthesizer: Option<Arc<dyn SpeechSynthesizer>>, idle: Arc<Notify>) -> Self {
        Self {
            synthesizer,
            activity: Arc::new(SpeechActivity::new(idle)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.activity.is_speaking()
    }

    /// Speak `text`, replacing any utterance in flight.
    ///
    /// Reports acceptance of the utterance, not its completion.
    pub fn speak(&self, text: &str, options: &SpeechOptions) -> bool {
        match self.try_speak(text, options) {
            Ok(()) => true,
            Err(AudioError::SpeechCapabilityUnavailable) => {
                warn!("speech synthesis unavailable");
                false
            }
            Err(e) => {
                error!(error = %e, "speech synthesis failed");
                false
            }
        }
    }

    pub fn try_speak(&self, text: &str, options: &SpeechOptions) -> Result<(), AudioError> {
        let synthesizer = self
            .synthesizer
            .as_ref()
            .ok_or(AudioError::SpeechCapabilityUnavailable)?;

        synthesizer.cancel();
        self.activity.cancel();

        let voice = options.voice_name.as_deref().and_then(|name| {
            synthesizer
                .voices()
                .into_iter()
                .find(|voice| voice.name == name)
        });

        let utterance = Utterance {
            text: text.to_string(),
            lang: options.lang.clone(),
            rate: options.rate,
            pitch: options.pitch,
            volume: options.volume,
            voice,
        };

        let id = self.activity.begin();
        let observer = UtteranceObserver::new(Arc::clone(&self.activity), id);
        synthesizer.speak(utterance, observer.clone()).map_err(|e| {
            observer.finished();
            match e {
                AudioError::SpeechSubmissionFailed(_) => e,
                other => AudioError::SpeechSubmissionFailed(other.to_string()),
            }
        })
    }

    /// Cancel the in-flight utterance, if any. Idempotent.
    pub fn stop(&self) {
        if let Some(synthesizer) = &self.synthesizer {
            synthesizer.cancel();
        }
        self.activity.cancel();
    }

    /// Installed voices; empty when speech is unavailable.
    pub fn list_voices(&self) -> Vec<Voice> {
        self.synthesizer
            .as_ref()
            .map(|synthesizer| synthesizer.voices())
            .unwrap_or_default()
    }
}
