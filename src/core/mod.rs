//! Speech facade and its provider plumbing.

pub mod audio;
pub mod azure;
pub mod backend;
pub mod facade;
pub mod settings;
pub mod ssml;
pub mod voices;

// Re-export commonly used types for convenience
pub use audio::{AudioInput, MAX_AUDIO_BYTES, SUPPORTED_AUDIO_TYPES, SynthesizedAudio, WavInfo};
pub use azure::{AzureSpeechClient, ClientOptions, PropertyId};
pub use backend::{ProviderError, SpeechBackend, SynthesisOutcome, Synthesizer};
pub use facade::{SpeechHandle, SpeechService};
pub use settings::{SpeechSettings, SpeechSettingsUpdate};
pub use ssml::SynthesisRequest;
pub use voices::{CHINESE_LOCALE_FAMILY, VoiceDescriptor, VoiceGender, VoiceKind, VoiceStatus};
