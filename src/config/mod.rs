//! Configuration module for the Voicedesk speech facade
//!
//! Configuration is assembled from `.env` files (loaded by the binary with
//! `dotenvy`), environment variables and an optional YAML file.
//! Priority: YAML > ENV vars > .env values > defaults.
//!
//! Absence or malformed shape of the Azure region or subscription key is a
//! fatal [`SpeechError::Configuration`]; there is no degraded mode.
//!
//! # Example
//! ```rust,no_run
//! use voicedesk::config::SpeechConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = SpeechConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallbacks
//! let config = SpeechConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Serving on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;
use zeroize::Zeroizing;

use crate::errors::{SpeechError, SpeechResult};

mod yaml;

pub use yaml::{AzureYaml, SecurityYaml, ServerYaml, YamlConfig};

/// Voice used until the caller selects another one.
pub const DEFAULT_VOICE: &str = "zh-CN-XiaoxiaoNeural";
/// Default synthesis and recognition language.
pub const DEFAULT_LANGUAGE: &str = "zh-CN";
/// Initial and end silence timeout applied to recognition requests.
pub const DEFAULT_SILENCE_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Azure subscription keys are 32 hex characters (legacy) or longer.
pub const MIN_SUBSCRIPTION_KEY_LEN: usize = 32;

pub const ENV_REGION: &str = "AZURE_SPEECH_REGION";
pub const ENV_SUBSCRIPTION_KEY: &str = "AZURE_SPEECH_SUBSCRIPTION_KEY";
pub const ENV_VOICE: &str = "AZURE_SPEECH_VOICE";
pub const ENV_SYNTHESIS_LANGUAGE: &str = "AZURE_SPEECH_SYNTHESIS_LANGUAGE";
pub const ENV_RECOGNITION_LANGUAGE: &str = "AZURE_SPEECH_RECOGNITION_LANGUAGE";
pub const ENV_CONNECT_TIMEOUT: &str = "AZURE_SPEECH_CONNECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "AZURE_SPEECH_REQUEST_TIMEOUT_SECS";
pub const ENV_TTS_ENDPOINT: &str = "AZURE_SPEECH_TTS_ENDPOINT";
pub const ENV_STT_ENDPOINT: &str = "AZURE_SPEECH_STT_ENDPOINT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";

static REGION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+[0-9]*$").expect("region pattern is valid"));
static SUBSCRIPTION_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("key pattern is valid"));

/// Speech facade configuration
///
/// Immutable once the facade has been constructed. The subscription key is
/// zeroized on drop and never printed by the `Debug` implementation.
#[derive(Clone)]
pub struct SpeechConfig {
    /// Azure region where the Speech resource is deployed (e.g., "eastasia")
    pub region: String,
    /// Azure Speech subscription key, tied to `region`
    pub subscription_key: Zeroizing<String>,
    /// Voice selected at startup; empty means "no voice selected"
    pub default_voice: String,
    pub synthesis_language: String,
    pub recognition_language: String,

    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub initial_silence_timeout_ms: u64,
    pub end_silence_timeout_ms: u64,

    /// Text-to-speech base URL override (defaults to the regional endpoint)
    pub tts_endpoint: Option<String>,
    /// Speech-to-text base URL override (defaults to the regional endpoint)
    pub stt_endpoint: Option<String>,

    // HTTP surface
    pub host: String,
    pub port: u16,
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("region", &self.region)
            .field("has_subscription_key", &!self.subscription_key.is_empty())
            .field("default_voice", &self.default_voice)
            .field("synthesis_language", &self.synthesis_language)
            .field("recognition_language", &self.recognition_language)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("initial_silence_timeout_ms", &self.initial_silence_timeout_ms)
            .field("end_silence_timeout_ms", &self.end_silence_timeout_ms)
            .field("tts_endpoint", &self.tts_endpoint)
            .field("stt_endpoint", &self.stt_endpoint)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl SpeechConfig {
    /// Build a configuration with defaults for everything but the credentials.
    ///
    /// No validation happens here; [`SpeechConfig::validate`] runs when the
    /// facade is constructed.
    pub fn new(region: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            subscription_key: Zeroizing::new(subscription_key.into()),
            default_voice: DEFAULT_VOICE.to_string(),
            synthesis_language: DEFAULT_LANGUAGE.to_string(),
            recognition_language: DEFAULT_LANGUAGE.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            initial_silence_timeout_ms: DEFAULT_SILENCE_TIMEOUT_MS,
            end_silence_timeout_ms: DEFAULT_SILENCE_TIMEOUT_MS,
            tts_endpoint: None,
            stt_endpoint: None,
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_allowed_origins: None,
        }
    }

    /// Load and validate configuration from environment variables.
    pub fn from_env() -> SpeechResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> SpeechResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::load_unvalidated(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to environment
    /// variables for anything the file leaves out.
    pub fn from_file(path: &Path) -> SpeechResult<Self> {
        let yaml = YamlConfig::from_file(path)?;
        let mut config = Self::load_unvalidated(&|key: &str| std::env::var(key).ok())?;
        config.apply_yaml(yaml);
        config.validate()?;
        Ok(config)
    }

    fn load_unvalidated<F>(lookup: &F) -> SpeechResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::new(
            get(ENV_REGION).unwrap_or_default(),
            get(ENV_SUBSCRIPTION_KEY).unwrap_or_default(),
        );

        if let Some(voice) = get(ENV_VOICE) {
            config.default_voice = voice;
        }
        if let Some(language) = get(ENV_SYNTHESIS_LANGUAGE) {
            config.synthesis_language = language;
        }
        if let Some(language) = get(ENV_RECOGNITION_LANGUAGE) {
            config.recognition_language = language;
        }
        if let Some(value) = get(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout_secs = parse_number(ENV_CONNECT_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_REQUEST_TIMEOUT) {
            config.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT, &value)?;
        }
        config.tts_endpoint = get(ENV_TTS_ENDPOINT);
        config.stt_endpoint = get(ENV_STT_ENDPOINT);

        if let Some(host) = get(ENV_HOST) {
            config.host = host;
        }
        if let Some(value) = get(ENV_PORT) {
            config.port = parse_number(ENV_PORT, &value)?;
        }
        config.cors_allowed_origins = get(ENV_CORS_ALLOWED_ORIGINS);

        Ok(config)
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
        }

        if let Some(azure) = yaml.azure {
            if let Some(region) = azure.region {
                self.region = region;
            }
            if let Some(key) = azure.subscription_key {
                self.subscription_key = Zeroizing::new(key);
            }
            if let Some(voice) = azure.voice {
                self.default_voice = voice;
            }
            if let Some(language) = azure.synthesis_language {
                self.synthesis_language = language;
            }
            if let Some(language) = azure.recognition_language {
                self.recognition_language = language;
            }
            if let Some(secs) = azure.connect_timeout_secs {
                self.connect_timeout_secs = secs;
            }
            if let Some(secs) = azure.request_timeout_secs {
                self.request_timeout_secs = secs;
            }
            if let Some(ms) = azure.initial_silence_timeout_ms {
                self.initial_silence_timeout_ms = ms;
            }
            if let Some(ms) = azure.end_silence_timeout_ms {
                self.end_silence_timeout_ms = ms;
            }
            if azure.tts_endpoint.is_some() {
                self.tts_endpoint = azure.tts_endpoint;
            }
            if azure.stt_endpoint.is_some() {
                self.stt_endpoint = azure.stt_endpoint;
            }
        }

        if let Some(security) = yaml.security
            && security.cors_allowed_origins.is_some()
        {
            self.cors_allowed_origins = security.cors_allowed_origins;
        }
    }

    /// Check the coarse shape of the credentials and endpoint overrides.
    pub fn validate(&self) -> SpeechResult<()> {
        if self.region.is_empty() {
            return Err(SpeechError::Configuration(format!(
                "Azure region is missing. Set {ENV_REGION} or azure.region"
            )));
        }
        if !REGION_PATTERN.is_match(&self.region) {
            return Err(SpeechError::Configuration(format!(
                "Azure region '{}' is malformed; expected a lowercase region name such as 'eastasia'",
                self.region
            )));
        }

        if self.subscription_key.is_empty() {
            return Err(SpeechError::Configuration(format!(
                "Azure subscription key is missing. Set {ENV_SUBSCRIPTION_KEY} or azure.subscription_key"
            )));
        }
        if self.subscription_key.len() < MIN_SUBSCRIPTION_KEY_LEN
            || !SUBSCRIPTION_KEY_PATTERN.is_match(&self.subscription_key)
        {
            return Err(SpeechError::Configuration(format!(
                "Azure subscription key is malformed; expected at least {MIN_SUBSCRIPTION_KEY_LEN} alphanumeric characters"
            )));
        }

        for (name, endpoint) in [
            ("tts_endpoint", &self.tts_endpoint),
            ("stt_endpoint", &self.stt_endpoint),
        ] {
            if let Some(endpoint) = endpoint {
                let url = Url::parse(endpoint).map_err(|e| {
                    SpeechError::Configuration(format!("Invalid {name} '{endpoint}': {e}"))
                })?;
                if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
                    return Err(SpeechError::Configuration(format!(
                        "Invalid {name} '{endpoint}': expected an http(s) URL with a host"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Socket address for the HTTP surface.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> SpeechResult<T> {
    value.parse().map_err(|_| {
        SpeechError::Configuration(format!("{key} must be a non-negative integer, got '{value}'"))
    })
}
