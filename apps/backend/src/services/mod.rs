pub mod corpus;
pub mod playback;
pub mod progress;
pub mod sessions;

pub use playback::{CommandAssetBackend, CommandSpeechSynthesizer};
pub use progress::ProgressStore;
pub use sessions::{SessionStore, StoredSession};
