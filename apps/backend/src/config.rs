//! Service configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use flashcard_core::audio::{AudioConfig, ResolutionMode};
use flashcard_core::quiz::{DEFAULT_MAX_QUESTIONS, DEFAULT_MIN_QUESTIONS};
use thiserror::Error;

/// Directory name under the platform data dir.
const APP_DIR: &str = "vocab-flashcards";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("MIN_QUESTIONS ({min}) exceeds MAX_QUESTIONS ({max})")]
    QuestionBounds { min: usize, max: usize },
}

/// Runtime configuration of the service.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` uses the bundled corpus.
    pub corpus_path: Option<PathBuf>,
    /// Content root holding `{category}/{filename}.mp3`.
    pub audio_dir: PathBuf,
    /// Where `progress.json` lives.
    pub data_dir: PathBuf,
    /// Pronounce through native players on this machine.
    pub local_playback: bool,
    pub audio_load_timeout: Duration,
    pub speech_fallback: bool,
    pub max_questions: usize,
    pub min_questions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            corpus_path: None,
            audio_dir: PathBuf::from("./audio"),
            data_dir: default_data_dir(),
            local_playback: false,
            audio_load_timeout: flashcard_core::audio::DEFAULT_LOAD_TIMEOUT,
            speech_fallback: true,
            max_questions: DEFAULT_MAX_QUESTIONS,
            min_questions: DEFAULT_MIN_QUESTIONS,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// Env vars:
    /// - HOST, PORT: listen address
    /// - CORPUS_PATH: corpus JSON file (bundled corpus when unset)
    /// - AUDIO_DIR: audio content root
    /// - DATA_DIR: progress storage directory
    /// - LOCAL_PLAYBACK: enable native playback backends
    /// - AUDIO_LOAD_TIMEOUT_MS: per-candidate load timeout
    /// - SPEECH_FALLBACK: synthesize speech when no asset plays
    /// - MAX_QUESTIONS, MIN_QUESTIONS: bounds on test length
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let config = Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var(&var, "PORT")?.unwrap_or(defaults.port),
            corpus_path: var("CORPUS_PATH").map(PathBuf::from),
            audio_dir: var("AUDIO_DIR").map(PathBuf::from).unwrap_or(defaults.audio_dir),
            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            local_playback: parse_bool(&var, "LOCAL_PLAYBACK")?.unwrap_or(defaults.local_playback),
            audio_load_timeout: parse_var::<u64, _>(&var, "AUDIO_LOAD_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.audio_load_timeout),
            speech_fallback: parse_bool(&var, "SPEECH_FALLBACK")?
                .unwrap_or(defaults.speech_fallback),
            max_questions: parse_var(&var, "MAX_QUESTIONS")?.unwrap_or(defaults.max_questions),
            min_questions: parse_var(&var, "MIN_QUESTIONS")?.unwrap_or(defaults.min_questions),
        };

        if config.min_questions > config.max_questions {
            return Err(ConfigError::QuestionBounds {
                min: config.min_questions,
                max: config.max_questions,
            });
        }
        Ok(config)
    }

    /// `host:port` to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.data_dir.join("progress.json")
    }

    /// Engine configuration rooted at the audio directory.
    pub fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            base_path: self.audio_dir.to_string_lossy().into_owned(),
            load_timeout: self.audio_load_timeout,
            fallback_enabled: self.speech_fallback,
            resolution: ResolutionMode::Candidates,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!("./{APP_DIR}")))
}

fn parse_var<T, F>(var: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

fn parse_bool<F>(var: &F, name: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.audio_dir, PathBuf::from("./audio"));
        assert!(config.corpus_path.is_none());
        assert!(!config.local_playback);
        assert!(config.speech_fallback);
        assert_eq!(config.audio_load_timeout, Duration::from_secs(3));
        assert_eq!((config.min_questions, config.max_questions), (5, 50));
        assert!(config.data_dir.ends_with(APP_DIR));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("AUDIO_DIR", "/srv/audio"),
            ("DATA_DIR", "/tmp/vocab"),
            ("LOCAL_PLAYBACK", "true"),
            ("AUDIO_LOAD_TIMEOUT_MS", "500"),
            ("SPEECH_FALLBACK", "off"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.local_playback);
        assert_eq!(config.progress_path(), PathBuf::from("/tmp/vocab/progress.json"));

        let audio = config.audio_config();
        assert_eq!(audio.base_path, "/srv/audio");
        assert_eq!(audio.load_timeout, Duration::from_millis(500));
        assert!(!audio.fallback_enabled);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("PORT", " "), ("HOST", "")]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
        assert!(matches!(
            config_from(&[("LOCAL_PLAYBACK", "maybe")]),
            Err(ConfigError::Invalid {
                name: "LOCAL_PLAYBACK",
                ..
            })
        ));
    }

    #[test]
    fn test_question_bounds_must_be_ordered() {
        assert_eq!(
            config_from(&[("MIN_QUESTIONS", "20"), ("MAX_QUESTIONS", "10")]).unwrap_err(),
            ConfigError::QuestionBounds { min: 20, max: 10 }
        );
    }
}
