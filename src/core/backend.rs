//! Provider seam behind the speech facade.
//!
//! The facade talks to the remote service only through [`SpeechBackend`] and
//! the per-call [`Synthesizer`] it hands out. [`AzureSpeechClient`] is the
//! production implementation; tests substitute their own.
//!
//! [`AzureSpeechClient`]: super::azure::AzureSpeechClient

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use super::audio::AudioInput;
use super::azure::ClientOptions;

/// How a single synthesis call ended, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Synthesis completed; the buffer may still be empty.
    Completed(Bytes),
    /// The provider canceled synthesis, optionally explaining why.
    Canceled {
        reason: String,
        error_details: Option<String>,
    },
    /// Transport or provider failure with an optional message.
    Failed(Option<String>),
}

/// Failure reported by the provider for catalog or recognition calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// HTTP status when the provider answered with a non-2xx response
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) if self.message.is_empty() => write!(f, "HTTP error! status: {status}"),
            Some(status) => write!(f, "HTTP error! status: {status}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A synthesizer resource scoped to one synthesis call.
///
/// `close` releases the resource; the facade guarantees it is called exactly
/// once per synthesizer, whatever the outcome of `speak_ssml`.
#[async_trait]
pub trait Synthesizer: Send {
    async fn speak_ssml(&mut self, ssml: &str) -> SynthesisOutcome;

    fn close(&mut self);
}

/// Remote speech service operations used by the facade.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Allocate a synthesizer bound to the current client options.
    fn new_synthesizer(&self, options: &ClientOptions) -> Box<dyn Synthesizer>;

    /// Single-shot recognition of a complete audio file.
    async fn recognize_once(
        &self,
        options: &ClientOptions,
        audio: &AudioInput,
    ) -> Result<String, ProviderError>;

    /// Fetch the provider's full voice catalog as raw JSON records.
    async fn fetch_voice_catalog(&self) -> Result<Vec<serde_json::Value>, ProviderError>;
}
