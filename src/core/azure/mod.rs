//! Azure Speech service integration.
//!
//! REST client for the three Azure Speech operations the facade needs:
//!
//! - voice catalog listing (`GET /cognitiveservices/voices/list`)
//! - single-shot SSML synthesis to 24 kHz 16-bit mono WAV
//! - short-audio recognition with detailed output
//!
//! The module is organized into focused submodules:
//!
//! - [`config`]: client options, provider property ids and endpoint URLs
//! - [`messages`]: recognition response wire types
//! - [`client`]: [`AzureSpeechClient`], the [`SpeechBackend`] implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use voicedesk::config::SpeechConfig;
//! use voicedesk::core::azure::{AzureSpeechClient, ClientOptions};
//! use voicedesk::core::backend::SpeechBackend;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SpeechConfig::from_env()?;
//! let client = AzureSpeechClient::new(&config)?;
//!
//! let mut synthesizer = client.new_synthesizer(&ClientOptions::from_config(&config));
//! let outcome = synthesizer
//!     .speak_ssml(r#"<speak version="1.0" xml:lang="zh-CN">你好</speak>"#)
//!     .await;
//! synthesizer.close();
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! # API Reference
//!
//! - Text to speech: `https://{region}.tts.speech.microsoft.com`
//! - Speech to text: `https://{region}.stt.speech.microsoft.com`
//! - Authentication: `Ocp-Apim-Subscription-Key` header
//!
//! [`SpeechBackend`]: crate::core::backend::SpeechBackend

mod client;
mod config;
mod messages;


pub use client::{AzureSpeechClient, AzureSynthesizer};
pub use config::{
    AzureEndpoints, ClientOptions, OUTPUT_FORMAT_HEADER, OutputFormat, PropertyId,
    SUBSCRIPTION_KEY_HEADER, SYNTHESIS_OUTPUT_FORMAT, stt_base_url, tts_base_url,
};
pub use messages::{NBestEntry, RecognitionResponse, RecognitionStatus, WordTiming};
