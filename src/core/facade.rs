//! The speech facade: configuration, SSML shaping and error mapping in front of
//! the remote speech provider.
//!
//! [`SpeechService`] owns the client options, the selected voice and the
//! prosody settings. Every provider call goes through a [`SpeechHandle`], a
//! cheap snapshot of the backend and options that can outlive a borrow of the
//! service (the HTTP layer takes one under a read lock and releases the lock
//! before any network traffic).

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::audio::{AudioInput, SynthesizedAudio};
use super::azure::{AzureSpeechClient, ClientOptions, OutputFormat, PropertyId};
use super::backend::{SpeechBackend, SynthesisOutcome, Synthesizer};
use super::settings::{SpeechSettings, SpeechSettingsUpdate};
use super::ssml::SynthesisRequest;
use super::voices::{CHINESE_LOCALE_FAMILY, VoiceDescriptor, filter_and_sort, parse_catalog};
use crate::config::SpeechConfig;
use crate::errors::{SpeechError, SpeechResult};

/// Closes the wrapped synthesizer when dropped, whichever way the call ends.
struct SynthesizerGuard {
    synthesizer: Box<dyn Synthesizer>,
}

impl SynthesizerGuard {
    fn new(synthesizer: Box<dyn Synthesizer>) -> Self {
        Self { synthesizer }
    }

    async fn speak_ssml(&mut self, ssml: &str) -> SynthesisOutcome {
        self.synthesizer.speak_ssml(ssml).await
    }
}

impl Drop for SynthesizerGuard {
    fn drop(&mut self) {
        self.synthesizer.close();
    }
}

/// Snapshot of the backend and client options taken from a [`SpeechService`].
#[derive(Clone)]
pub struct SpeechHandle {
    backend: Arc<dyn SpeechBackend>,
    options: ClientOptions,
}

impl SpeechHandle {
    /// Run one single-shot synthesis for a prepared request.
    pub async fn synthesize_request(
        &self,
        request: &SynthesisRequest,
    ) -> SpeechResult<SynthesizedAudio> {
        let ssml = request.to_ssml();

        let mut options = self.options.clone();
        options.synthesis_voice_name = Some(request.voice.clone());

        debug!(
            voice = %request.voice,
            chars = request.text.chars().count(),
            "Starting speech synthesis"
        );

        let mut synthesizer = SynthesizerGuard::new(self.backend.new_synthesizer(&options));
        let outcome = synthesizer.speak_ssml(&ssml).await;
        drop(synthesizer);

        match outcome {
            SynthesisOutcome::Completed(audio) if audio.is_empty() => {
                warn!(voice = %request.voice, "Synthesis completed without audio");
                Err(SpeechError::EmptyResult)
            }
            SynthesisOutcome::Completed(audio) => {
                info!(voice = %request.voice, bytes = audio.len(), "Speech synthesis completed");
                Ok(SynthesizedAudio::new(audio))
            }
            SynthesisOutcome::Canceled {
                reason,
                error_details,
            } => {
                warn!(%reason, details = ?error_details, "Speech synthesis canceled");
                Err(SpeechError::canceled(error_details))
            }
            SynthesisOutcome::Failed(message) => {
                warn!(error = ?message, "Speech synthesis failed");
                Err(SpeechError::failed(message))
            }
        }
    }

    /// Transcribe a complete audio file. The input is assumed to be validated.
    pub async fn recognize(&self, audio: &AudioInput) -> SpeechResult<String> {
        let text = self
            .backend
            .recognize_once(&self.options, audio)
            .await
            .map_err(|e| {
                warn!(file = %audio.file_name, error = %e, "Speech recognition failed");
                SpeechError::RecognitionFailed(e.to_string())
            })?;

        info!(file = %audio.file_name, chars = text.chars().count(), "Speech recognition completed");
        Ok(text)
    }

    /// Fetch the catalog and return the Chinese-locale voices, sorted.
    pub async fn list_voices(&self) -> SpeechResult<Vec<VoiceDescriptor>> {
        let raw = self.backend.fetch_voice_catalog().await.map_err(|e| {
            warn!(status = ?e.status, error = %e, "Voice catalog fetch failed");
            SpeechError::CatalogFetch {
                status: e.status,
                message: e.to_string(),
            }
        })?;

        let voices = filter_and_sort(parse_catalog(raw), CHINESE_LOCALE_FAMILY);
        if voices.is_empty() {
            warn!("Voice catalog contains no {} voices", CHINESE_LOCALE_FAMILY);
        }
        Ok(voices)
    }
}

/// Speech facade over the Azure Speech service.
///
/// Setters take `&mut self`; calls take `&self`, so several requests may be
/// in flight at once, each with its own synthesizer.
pub struct SpeechService {
    config: SpeechConfig,
    options: ClientOptions,
    backend: Arc<dyn SpeechBackend>,
    settings: SpeechSettings,
}

impl std::fmt::Debug for SpeechService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechService")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SpeechService {
    /// Validate `config` and connect the facade to Azure Speech.
    ///
    /// # Errors
    ///
    /// [`SpeechError::Configuration`] when the region or subscription key is
    /// missing or malformed. This is fatal: nothing else will work until the
    /// configuration is fixed.
    pub fn new(config: SpeechConfig) -> SpeechResult<Self> {
        config.validate()?;
        let client = AzureSpeechClient::new(&config)?;
        Self::with_backend(config, Arc::new(client))
    }

    /// Like [`SpeechService::new`], with a caller-supplied backend.
    pub fn with_backend(config: SpeechConfig, backend: Arc<dyn SpeechBackend>) -> SpeechResult<Self> {
        config.validate()?;

        let mut options = ClientOptions::from_config(&config);
        let default_voice = config.default_voice.trim();
        if !default_voice.is_empty() {
            options.synthesis_voice_name = Some(default_voice.to_string());
        }
        options.output_format = OutputFormat::Detailed;
        options.set_property(PropertyId::SpeechServiceResponseRequestSentenceBoundary, "true");
        options.set_property(
            PropertyId::SpeechServiceResponseOutputFormatOption,
            OutputFormat::Detailed.property_value(),
        );
        options.set_property(PropertyId::SpeechServiceResponseRequestWordLevelTimestamps, "true");
        options.set_property(
            PropertyId::SpeechServiceConnectionInitialSilenceTimeoutMs,
            config.initial_silence_timeout_ms.to_string(),
        );
        options.set_property(
            PropertyId::SpeechServiceConnectionEndSilenceTimeoutMs,
            config.end_silence_timeout_ms.to_string(),
        );
        options.set_property(PropertyId::SpeechServiceConnectionReconnectOnError, "true");

        info!(
            region = %config.region,
            synthesis_language = %options.synthesis_language,
            recognition_language = %options.recognition_language,
            voice = ?options.synthesis_voice_name,
            "Speech service initialized"
        );

        Ok(Self {
            config,
            options,
            backend,
            settings: SpeechSettings::default(),
        })
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    pub fn client_options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn current_voice(&self) -> Option<&str> {
        self.options.synthesis_voice_name.as_deref()
    }

    pub fn settings(&self) -> SpeechSettings {
        self.settings
    }

    /// Select the voice for later synthesis calls.
    ///
    /// A blank id is ignored with a warning. The id is not checked against the
    /// catalog; an unknown voice fails at the next synthesis call.
    pub fn set_voice(&mut self, voice_id: &str) {
        let voice_id = voice_id.trim();
        if voice_id.is_empty() {
            warn!("Ignoring empty voice id");
            return;
        }
        info!(voice = %voice_id, "Setting voice");
        self.options.synthesis_voice_name = Some(voice_id.to_string());
    }

    /// Merge a partial settings update; absent fields keep their values.
    pub fn set_settings(&mut self, update: SpeechSettingsUpdate) {
        self.settings.merge(update);
        debug!(
            pitch = self.settings.pitch,
            rate = self.settings.rate,
            volume = self.settings.volume,
            "Updated speech settings"
        );
    }

    /// Select the first voice of `voices`, if any, and return it.
    pub fn select_default_voice<'a>(
        &mut self,
        voices: &'a [VoiceDescriptor],
    ) -> Option<&'a VoiceDescriptor> {
        let first = voices.first()?;
        self.set_voice(&first.id);
        Some(first)
    }

    /// Check preconditions and capture voice, language and settings for one call.
    ///
    /// # Errors
    ///
    /// [`SpeechError::Validation`] when no voice is selected or `text` is blank.
    pub fn prepare_synthesis(&self, text: &str) -> SpeechResult<SynthesisRequest> {
        let voice = self.current_voice().ok_or_else(|| {
            SpeechError::Validation("Voice not selected".to_string())
        })?;
        if text.trim().is_empty() {
            return Err(SpeechError::Validation(
                "Text to synthesize must not be empty".to_string(),
            ));
        }

        Ok(SynthesisRequest {
            voice: voice.to_string(),
            language: self.options.synthesis_language.clone(),
            text: text.to_string(),
            settings: self.settings,
        })
    }

    /// Snapshot the backend and current client options.
    pub fn handle(&self) -> SpeechHandle {
        SpeechHandle {
            backend: self.backend.clone(),
            options: self.options.clone(),
        }
    }

    /// Synthesize `text` with the current voice and settings into WAV audio.
    pub async fn synthesize(&self, text: &str) -> SpeechResult<SynthesizedAudio> {
        let request = self.prepare_synthesis(text)?;
        self.synthesize_request(&request).await
    }

    pub async fn synthesize_request(
        &self,
        request: &SynthesisRequest,
    ) -> SpeechResult<SynthesizedAudio> {
        self.handle().synthesize_request(request).await
    }

    pub async fn recognize(&self, audio: &AudioInput) -> SpeechResult<String> {
        self.handle().recognize(audio).await
    }

    pub async fn list_voices(&self) -> SpeechResult<Vec<VoiceDescriptor>> {
        self.handle().list_voices().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scriptable in-memory backend.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::core::backend::ProviderError;

    #[derive(Default)]
    pub struct Calls {
        pub synthesizers: AtomicUsize,
        pub speaks: AtomicUsize,
        pub closes: AtomicUsize,
        pub recognitions: AtomicUsize,
        pub catalog_fetches: AtomicUsize,
        pub last_ssml: Mutex<Option<String>>,
        pub last_voice: Mutex<Option<String>>,
    }

    impl Calls {
        pub fn count(counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }
    }

    pub struct MockBackend {
        pub calls: Arc<Calls>,
        pub outcome: SynthesisOutcome,
        pub recognition: Result<String, ProviderError>,
        pub catalog: Result<Vec<serde_json::Value>, ProviderError>,
    }

    impl MockBackend {
        pub fn new(outcome: SynthesisOutcome) -> Self {
            Self {
                calls: Arc::new(Calls::default()),
                outcome,
                recognition: Ok(String::new()),
                catalog: Ok(Vec::new()),
            }
        }
    }

    struct MockSynthesizer {
        calls: Arc<Calls>,
        outcome: SynthesisOutcome,
    }

    #[async_trait]
    impl Synthesizer for MockSynthesizer {
        async fn speak_ssml(&mut self, ssml: &str) -> SynthesisOutcome {
            self.calls.speaks.fetch_add(1, Ordering::SeqCst);
            *self.calls.last_ssml.lock().unwrap() = Some(ssml.to_string());
            self.outcome.clone()
        }

        fn close(&mut self) {
            self.calls.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SpeechBackend for MockBackend {
        fn new_synthesizer(&self, options: &ClientOptions) -> Box<dyn Synthesizer> {
            self.calls.synthesizers.fetch_add(1, Ordering::SeqCst);
            *self.calls.last_voice.lock().unwrap() = options.synthesis_voice_name.clone();
            Box::new(MockSynthesizer {
                calls: self.calls.clone(),
                outcome: self.outcome.clone(),
            })
        }

        async fn recognize_once(
            &self,
            _options: &ClientOptions,
            _audio: &AudioInput,
        ) -> Result<String, ProviderError> {
            self.calls.recognitions.fetch_add(1, Ordering::SeqCst);
            self.recognition.clone()
        }

        async fn fetch_voice_catalog(&self) -> Result<Vec<serde_json::Value>, ProviderError> {
            self.calls.catalog_fetches.fetch_add(1, Ordering::SeqCst);
            self.catalog.clone()
        }
    }
}
