//! Native playback through command-line audio players and speech tools.
//!
//! Each backend is only constructed when its program is found on `PATH`;
//! otherwise the engine runs without that capability.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flashcard_core::audio::{
    AssetBackend, AssetHandle, PlaybackEnd, SpeechSynthesizer, Utterance, UtteranceObserver,
    Voice,
};
use flashcard_core::AudioError;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Audio players tried in order.
const PLAYERS: [Player; 3] = [Player::Afplay, Player::Mpg123, Player::Ffplay];

/// Speech tools tried in order.
const SPEAKERS: [Speaker; 3] = [Speaker::Say, Speaker::EspeakNg, Speaker::SpdSay];

/// Words per minute at rate 1.0 for `say` and `espeak-ng`.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Afplay,
    Mpg123,
    Ffplay,
}

impl Player {
    pub fn program(&self) -> &'static str {
        match self {
            Self::Afplay => "afplay",
            Self::Mpg123 => "mpg123",
            Self::Ffplay => "ffplay",
        }
    }

    /// Command line arguments to play `path` at `volume` (0.0 to 1.0).
    pub fn args(&self, path: &Path, volume: f32) -> Vec<String> {
        let volume = volume.clamp(0.0, 1.0);
        let path = path.to_string_lossy().into_owned();
        match self {
            Self::Afplay => vec!["-v".into(), format!("{volume:.2}"), path],
            Self::Mpg123 => vec![
                "-q".into(),
                "-f".into(),
                ((volume * 32768.0).round() as u32).to_string(),
                path,
            ],
            Self::Ffplay => vec![
                "-nodisp".into(),
                "-autoexit".into(),
                "-loglevel".into(),
                "quiet".into(),
                "-volume".into(),
                ((volume * 100.0).round() as u32).to_string(),
                path,
            ],
        }
    }
}

/// Finds the first `candidates` program available on `PATH`.
fn probe<T: Copy>(candidates: &[T], program: impl Fn(&T) -> &'static str) -> Option<(T, PathBuf)> {
    candidates
        .iter()
        .find_map(|candidate| which::which(program(candidate)).ok().map(|path| (*candidate, path)))
}

/// Kill switches of running child processes, keyed by handle id.
///
/// Each entry carries the spawn number it was registered under, so an exit
/// from a replaced child never drops the switch of its replay.
#[derive(Debug, Default)]
struct RunningChildren {
    next_spawn: AtomicU64,
    children: Mutex<HashMap<u64, (u64, oneshot::Sender<()>)>>,
}

impl RunningChildren {
    /// Registers `kill` for `id`, killing any child it replaces. Returns the spawn number.
    fn insert(&self, id: u64, kill: oneshot::Sender<()>) -> u64 {
        let spawn = self.next_spawn.fetch_add(1, Ordering::SeqCst);
        let previous = self.lock().insert(id, (spawn, kill));
        if let Some((_, previous)) = previous {
            let _ = previous.send(());
        }
        spawn
    }

    fn kill(&self, id: u64) -> bool {
        match self.lock().remove(&id) {
            Some((_, kill)) => kill.send(()).is_ok(),
            None => false,
        }
    }

    /// Drops the switch for `id` if it still belongs to `spawn`.
    fn forget(&self, id: u64, spawn: u64) {
        let mut children = self.lock();
        if children.get(&id).is_some_and(|(current, _)| *current == spawn) {
            children.remove(&id);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, (u64, oneshot::Sender<()>)>> {
        self.children.lock().expect("child process lock")
    }
}

/// Waits for `child` to exit or be killed; runs `on_exit` only on a natural exit.
fn supervise<F>(mut child: Child, kill: oneshot::Receiver<()>, on_exit: F)
where
    F: FnOnce(std::io::Result<std::process::ExitStatus>) + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            status = child.wait() => on_exit(status),
            Ok(()) = kill => {
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "child already exited");
                }
            }
        }
    });
}

/// Plays local audio files through a command-line player.
pub struct CommandAssetBackend {
    player: Player,
    program: PathBuf,
    next_id: AtomicU64,
    running: Arc<RunningChildren>,
}

impl CommandAssetBackend {
    /// The first installed player, if any.
    pub fn probe() -> Option<Self> {
        let Some((player, program)) = probe(&PLAYERS, Player::program) else {
            warn!("no command-line audio player found");
            return None;
        };
        info!(player = player.program(), "local audio playback available");
        Some(Self::new(player, program))
    }

    pub fn new(player: Player, program: PathBuf) -> Self {
        Self {
            player,
            program,
            next_id: AtomicU64::new(1),
            running: Arc::new(RunningChildren::default()),
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }
}

#[async_trait]
impl AssetBackend for CommandAssetBackend {
    async fn load(&self, path: &str) -> Result<AssetHandle, AudioError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| AudioError::AssetNotFound(path.to_string()))?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(AudioError::AssetNotFound(path.to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(AssetHandle::new(id, path))
    }

    async fn play(
        &self,
        handle: &AssetHandle,
        volume: f32,
        on_end: PlaybackEnd,
    ) -> Result<(), AudioError> {
        let child = Command::new(&self.program)
            .args(self.player.args(Path::new(handle.path()), volume))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;

        let (kill_tx, kill_rx) = oneshot::channel();
        let spawn = self.running.insert(handle.id(), kill_tx);

        let running = Arc::clone(&self.running);
        let id = handle.id();
        supervise(child, kill_rx, move |status| {
            running.forget(id, spawn);
            if let Err(e) = status {
                warn!(error = %e, "audio player failed");
            }
            on_end.finished();
        });
        Ok(())
    }

    fn stop(&self, handle: &AssetHandle) {
        if self.running.kill(handle.id()) {
            debug!(path = handle.path(), "audio player stopped");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Say,
    EspeakNg,
    SpdSay,
}

impl Speaker {
    pub fn program(&self) -> &'static str {
        match self {
            Self::Say => "say",
            Self::EspeakNg => "espeak-ng",
            Self::SpdSay => "spd-say",
        }
    }

    /// Command line arguments speaking `utterance`.
    pub fn args(&self, utterance: &Utterance) -> Vec<String> {
        let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round() as u32;
        let mut args = Vec::new();
        match self {
            Self::Say => {
                args.extend(["-r".to_string(), words_per_minute.to_string()]);
                if let Some(voice) = &utterance.voice {
                    args.extend(["-v".to_string(), voice.name.clone()]);
                }
            }
            Self::EspeakNg => {
                let voice = utterance
                    .voice
                    .as_ref()
                    .map_or_else(|| utterance.lang.to_lowercase(), |voice| voice.lang.clone());
                let pitch = (utterance.pitch * 50.0).clamp(0.0, 99.0).round() as u32;
                let amplitude = (utterance.volume * 100.0).clamp(0.0, 200.0).round() as u32;
                args.extend([
                    "-v".to_string(),
                    voice,
                    "-s".to_string(),
                    words_per_minute.to_string(),
                    "-p".to_string(),
                    pitch.to_string(),
                    "-a".to_string(),
                    amplitude.to_string(),
                ]);
            }
            Self::SpdSay => {
                let scale = |value: f32| {
                    (((value - 1.0) * 100.0).clamp(-100.0, 100.0).round() as i32).to_string()
                };
                let language = utterance.lang.split('-').next().unwrap_or("en").to_string();
                args.extend([
                    "-w".to_string(),
                    "-l".to_string(),
                    language,
                    "-r".to_string(),
                    scale(utterance.rate),
                    "-p".to_string(),
                    scale(utterance.pitch),
                    "-i".to_string(),
                    scale(utterance.volume),
                ]);
            }
        }
        args.push(utterance.text.clone());
        args
    }

    /// Installed voices, where the tool can list them.
    fn list_voices(&self, program: &Path) -> Vec<Voice> {
        let flag = match self {
            Self::Say => &["-v", "?"][..],
            Self::EspeakNg => &["--voices"][..],
            Self::SpdSay => return Vec::new(),
        };
        let output = match std::process::Command::new(program).args(flag).output() {
            Ok(output) if output.status.success() => output,
            Ok(_) | Err(_) => {
                debug!(speaker = self.program(), "voice listing unavailable");
                return Vec::new();
            }
        };
        let listing = String::from_utf8_lossy(&output.stdout);
        match self {
            Self::Say => parse_say_voices(&listing),
            Self::EspeakNg => parse_espeak_voices(&listing),
            Self::SpdSay => Vec::new(),
        }
    }
}

/// Parses `say -v '?'` output: `Name  en_US  # sample sentence`.
pub fn parse_say_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter_map(|line| {
            let described = line.split('#').next()?.trim_end();
            let (name, lang) = described.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() || lang.is_empty() {
                return None;
            }
            Some(Voice {
                name: name.to_string(),
                lang: lang.replace('_', "-"),
                is_local: true,
            })
        })
        .collect()
}

/// Parses `espeak-ng --voices` output, skipping the header row.
pub fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _priority = columns.next()?;
            let lang = columns.next()?;
            let _age_gender = columns.next()?;
            let name = columns.next()?;
            Some(Voice {
                name: name.replace('_', " "),
                lang: lang.to_string(),
                is_local: true,
            })
        })
        .collect()
}

/// Speaks text through a command-line speech tool.
pub struct CommandSpeechSynthesizer {
    speaker: Speaker,
    program: PathBuf,
    voices: Vec<Voice>,
    current: Mutex<Option<oneshot::Sender<()>>>,
}

impl CommandSpeechSynthesizer {
    /// The first installed speech tool, if any.
    pub fn probe() -> Option<Self> {
        let Some((speaker, program)) = probe(&SPEAKERS, Speaker::program) else {
            warn!("no command-line speech synthesizer found");
            return None;
        };
        let voices = speaker.list_voices(&program);
        info!(
            speaker = speaker.program(),
            voices = voices.len(),
            "speech synthesis available"
        );
        Some(Self::new(speaker, program, voices))
    }

    pub fn new(speaker: Speaker, program: PathBuf, voices: Vec<Voice>) -> Self {
        Self {
            speaker,
            program,
            voices,
            current: Mutex::new(None),
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }
}

impl SpeechSynthesizer for CommandSpeechSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn cancel(&self) {
        let current = self.current.lock().expect("speech process lock").take();
        if let Some(kill) = current {
            let _ = kill.send(());
        }
    }

    fn speak(&self, utterance: Utterance, observer: UtteranceObserver) -> Result<(), AudioError> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| AudioError::Backend(format!("no async runtime: {e}")))?;

        let child = Command::new(&self.program)
            .args(self.speaker.args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AudioError::SpeechSubmissionFailed(e.to_string()))?;

        let (kill_tx, kill_rx) = oneshot::channel();
        if let Some(previous) = self
            .current
            .lock()
            .expect("speech process lock")
            .replace(kill_tx)
        {
            let _ = previous.send(());
        }

        observer.started();
        supervise(child, kill_rx, move |status| match status {
            Ok(status) if status.success() => observer.finished(),
            Ok(status) => observer.failed(&format!("speech tool exited with {status}")),
            Err(e) => observer.failed(&e.to_string()),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replaced_child_exit_keeps_replay_kill_switch() {
        let running = RunningChildren::default();
        let (first_tx, mut first_rx) = oneshot::channel();
        let first = running.insert(7, first_tx);
        let (second_tx, mut second_rx) = oneshot::channel();
        running.insert(7, second_tx);

        // replacing a child kills it
        assert_eq!(first_rx.try_recv(), Ok(()));

        running.forget(7, first);
        assert!(running.kill(7));
        assert_eq!(second_rx.try_recv(), Ok(()));
    }

    #[test]
    fn test_natural_exit_forgets_kill_switch() {
        let running = RunningChildren::default();
        let (kill_tx, _kill_rx) = oneshot::channel();
        let spawn = running.insert(3, kill_tx);
        running.forget(3, spawn);
        assert!(!running.kill(3));
    }

    fn utterance(voice: Option<Voice>) -> Utterance {
        Utterance {
            text: "Only drink clean water!".into(),
            lang: "en-US".into(),
            rate: 0.8,
            pitch: 1.0,
            volume: 1.0,
            voice,
        }
    }

    #[test]
    fn test_player_args() {
        let path = Path::new("./audio/vocabulary/near.mp3");
        assert_eq!(
            Player::Afplay.args(path, 0.5),
            vec!["-v", "0.50", "./audio/vocabulary/near.mp3"]
        );
        assert_eq!(
            Player::Mpg123.args(path, 1.0),
            vec!["-q", "-f", "32768", "./audio/vocabulary/near.mp3"]
        );
        assert_eq!(
            Player::Ffplay.args(path, 2.0),
            vec![
                "-nodisp",
                "-autoexit",
                "-loglevel",
                "quiet",
                "-volume",
                "100",
                "./audio/vocabulary/near.mp3"
            ]
        );
    }

    #[test]
    fn test_say_args() {
        let samantha = Voice {
            name: "Samantha".into(),
            lang: "en-US".into(),
            is_local: true,
        };
        assert_eq!(
            Speaker::Say.args(&utterance(Some(samantha))),
            vec!["-r", "140", "-v", "Samantha", "Only drink clean water!"]
        );
    }

    #[test]
    fn test_espeak_args() {
        assert_eq!(
            Speaker::EspeakNg.args(&utterance(None)),
            vec!["-v", "en-us", "-s", "140", "-p", "50", "-a", "100", "Only drink clean water!"]
        );
    }

    #[test]
    fn test_spd_say_args() {
        assert_eq!(
            Speaker::SpdSay.args(&utterance(None)),
            vec!["-w", "-l", "en", "-r", "-20", "-p", "0", "-i", "0", "Only drink clean water!"]
        );
    }

    #[test]
    fn test_parse_say_voices() {
        let listing = "Alex                en_US    # Most people recognize me by my voice.\n\
                       Bad News            en_US    # The light you see at the end of the tunnel.\n\
                       Ting-Ting           zh_CN    # 你好，我叫婷婷。\n";
        let voices = parse_say_voices(listing);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].name, "Bad News");
        assert_eq!(voices[1].lang, "en-US");
        assert_eq!(voices[2].lang, "zh-CN");
    }

    #[test]
    fn test_parse_espeak_voices() {
        let listing = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                       5  af              --/M      Afrikaans          gmw/af\n \
                       2  en-us           --/M      English_(America)  gmw/en-US            (en 3)\n";
        let voices = parse_espeak_voices(listing);
        assert_eq!(
            voices,
            vec![
                Voice {
                    name: "Afrikaans".into(),
                    lang: "af".into(),
                    is_local: true,
                },
                Voice {
                    name: "English (America)".into(),
                    lang: "en-us".into(),
                    is_local: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_is_not_found() {
        let backend = CommandAssetBackend::new(Player::Mpg123, PathBuf::from("mpg123"));
        let result = backend.load("/definitely/not/here.mp3").await;
        assert_eq!(
            result,
            Err(AudioError::AssetNotFound("/definitely/not/here.mp3".into()))
        );
    }

    #[tokio::test]
    async fn test_load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("near.mp3");
        std::fs::write(&path, b"ID3").unwrap();

        let backend = CommandAssetBackend::new(Player::Mpg123, PathBuf::from("mpg123"));
        let path = path.to_string_lossy().into_owned();
        let first = backend.load(&path).await.unwrap();
        let second = backend.load(&path).await.unwrap();
        assert_eq!(first.path(), path);
        assert_ne!(first.id(), second.id());
    }
}
