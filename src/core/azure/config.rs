//! Azure Speech client options and endpoints.
//!
//! [`ClientOptions`] mirrors the provider SDK's speech config object: the
//! current voice and languages plus a bag of string-valued properties keyed
//! by [`PropertyId`]. The REST client translates the properties it
//! understands into query parameters and transport behaviour.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SpeechConfig;

/// Audio format requested from the synthesis endpoint (24 kHz 16-bit mono WAV).
pub const SYNTHESIS_OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

pub const VOICES_LIST_PATH: &str = "/cognitiveservices/voices/list";
pub const SYNTHESIS_PATH: &str = "/cognitiveservices/v1";
pub const RECOGNITION_PATH: &str = "/speech/recognition/conversation/cognitiveservices/v1";

/// Header carrying the subscription key on every request.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
pub const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
pub const USER_AGENT: &str = concat!("voicedesk/", env!("CARGO_PKG_VERSION"));

/// Regional text-to-speech base URL.
pub fn tts_base_url(region: &str) -> String {
    format!("https://{region}.tts.speech.microsoft.com")
}

/// Regional speech-to-text base URL.
pub fn stt_base_url(region: &str) -> String {
    format!("https://{region}.stt.speech.microsoft.com")
}

/// Provider properties the facade sets at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyId {
    /// Report sentence boundaries during synthesis
    SpeechServiceResponseRequestSentenceBoundary,
    /// "Simple" or "Detailed" recognition output
    SpeechServiceResponseOutputFormatOption,
    SpeechServiceResponseRequestWordLevelTimestamps,
    SpeechServiceConnectionInitialSilenceTimeoutMs,
    SpeechServiceConnectionEndSilenceTimeoutMs,
    /// Re-send a request once when the connection fails
    SpeechServiceConnectionReconnectOnError,
}

/// Recognition result detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Simple,
    Detailed,
}

impl OutputFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
        }
    }

    /// Value stored under [`PropertyId::SpeechServiceResponseOutputFormatOption`].
    pub fn property_value(&self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::Detailed => "Detailed",
        }
    }
}

/// Remote client configuration owned by the facade.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub region: String,
    pub synthesis_voice_name: Option<String>,
    pub synthesis_language: String,
    pub recognition_language: String,
    pub output_format: OutputFormat,
    properties: HashMap<PropertyId, String>,
}

impl ClientOptions {
    /// Options bound to the configured region and languages, with no properties set.
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            region: config.region.clone(),
            synthesis_voice_name: None,
            synthesis_language: config.synthesis_language.clone(),
            recognition_language: config.recognition_language.clone(),
            output_format: OutputFormat::default(),
            properties: HashMap::new(),
        }
    }

    pub fn set_property(&mut self, id: PropertyId, value: impl Into<String>) {
        self.properties.insert(id, value.into());
    }

    pub fn property(&self, id: PropertyId) -> Option<&str> {
        self.properties.get(&id).map(String::as_str)
    }

    /// Whether a boolean property is set to `"true"`.
    pub fn is_enabled(&self, id: PropertyId) -> bool {
        self.property(id)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Query parameters for a short-audio recognition request.
    pub fn recognition_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("language", self.recognition_language.clone()),
            ("format", self.output_format.as_str().to_string()),
        ];
        if self.is_enabled(PropertyId::SpeechServiceResponseRequestWordLevelTimestamps) {
            query.push(("wordLevelTimestamps", "true".to_string()));
        }
        if let Some(ms) = self.property(PropertyId::SpeechServiceConnectionInitialSilenceTimeoutMs)
        {
            query.push(("initialSilenceTimeoutMs", ms.to_string()));
        }
        if let Some(ms) = self.property(PropertyId::SpeechServiceConnectionEndSilenceTimeoutMs) {
            query.push(("endSilenceTimeoutMs", ms.to_string()));
        }
        query
    }
}

/// Resolved endpoint URLs for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureEndpoints {
    tts_base: String,
    stt_base: String,
}

impl AzureEndpoints {
    pub fn from_config(config: &SpeechConfig) -> Self {
        let tts_base = config
            .tts_endpoint
            .clone()
            .unwrap_or_else(|| tts_base_url(&config.region));
        let stt_base = config
            .stt_endpoint
            .clone()
            .unwrap_or_else(|| stt_base_url(&config.region));
        Self {
            tts_base: tts_base.trim_end_matches('/').to_string(),
            stt_base: stt_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn voices_list_url(&self) -> String {
        format!("{}{VOICES_LIST_PATH}", self.tts_base)
    }

    pub fn synthesis_url(&self) -> String {
        format!("{}{SYNTHESIS_PATH}", self.tts_base)
    }

    pub fn recognition_url(&self) -> String {
        format!("{}{RECOGNITION_PATH}", self.stt_base)
    }
}
