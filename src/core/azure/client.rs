//! REST client for the Azure Speech service.

use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::config::{
    AzureEndpoints, ClientOptions, OUTPUT_FORMAT_HEADER, PropertyId, SUBSCRIPTION_KEY_HEADER,
    SYNTHESIS_OUTPUT_FORMAT, USER_AGENT,
};
use super::messages::{RecognitionResponse, RecognitionStatus};
use crate::config::SpeechConfig;
use crate::core::audio::AudioInput;
use crate::core::backend::{ProviderError, SpeechBackend, SynthesisOutcome, Synthesizer};
use crate::errors::{SpeechError, SpeechResult};

/// Cancellation reason reported when the service rejects a synthesis request.
const CANCEL_REASON_ERROR: &str = "Error";

/// Shared HTTP state for every call made against one Azure Speech resource.
pub(super) struct ClientInner {
    pub(super) http: Client,
    endpoints: AzureEndpoints,
    subscription_key: Zeroizing<String>,
    /// Requests put on the wire, retries included.
    #[cfg(test)]
    pub(super) attempts: AtomicUsize,
}

impl ClientInner {
    /// Send a request built by `build`, re-sending once on a connection error
    /// when `reconnect` is set.
    pub(super) async fn send(
        &self,
        reconnect: bool,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, reqwest::Error> {
        match self.attempt(&build).await {
            Err(e) if reconnect && e.is_connect() => {
                warn!("Azure Speech connection failed, retrying once: {}", e);
                self.attempt(&build).await
            }
            other => other,
        }
    }

    async fn attempt(
        &self,
        build: &impl Fn() -> RequestBuilder,
    ) -> Result<Response, reqwest::Error> {
        #[cfg(test)]
        self.attempts.fetch_add(1, Ordering::SeqCst);
        build().send().await
    }
}

/// Azure Speech backend over the public REST endpoints.
#[derive(Clone)]
pub struct AzureSpeechClient {
    pub(super) inner: Arc<ClientInner>,
}

impl std::fmt::Debug for AzureSpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSpeechClient")
            .field("endpoints", &self.inner.endpoints)
            .finish_non_exhaustive()
    }
}

impl AzureSpeechClient {
    pub fn new(config: &SpeechConfig) -> SpeechResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let endpoints = AzureEndpoints::from_config(config);
        info!(
            "Azure Speech client ready (region: {}, voices: {})",
            config.region,
            endpoints.voices_list_url()
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoints,
                subscription_key: config.subscription_key.clone(),
                #[cfg(test)]
                attempts: AtomicUsize::new(0),
            }),
        })
    }

    pub fn endpoints(&self) -> &AzureEndpoints {
        &self.inner.endpoints
    }
}

#[async_trait]
impl SpeechBackend for AzureSpeechClient {
    fn new_synthesizer(&self, options: &ClientOptions) -> Box<dyn Synthesizer> {
        Box::new(AzureSynthesizer::new(self.inner.clone(), options))
    }

    async fn recognize_once(
        &self,
        options: &ClientOptions,
        audio: &AudioInput,
    ) -> Result<String, ProviderError> {
        let inner = &self.inner;
        let url = inner.endpoints.recognition_url();
        let query = options.recognition_query();
        let reconnect = options.is_enabled(PropertyId::SpeechServiceConnectionReconnectOnError);

        debug!(
            "Recognizing {} ({} bytes, {}) in {}",
            audio.file_name,
            audio.data.len(),
            audio.media_type,
            options.recognition_language
        );

        let response = inner
            .send(reconnect, || {
                inner
                    .http
                    .post(&url)
                    .query(&query)
                    .header(SUBSCRIPTION_KEY_HEADER, inner.subscription_key.as_str())
                    .header(reqwest::header::CONTENT_TYPE, audio.content_type())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .body(audio.data.clone())
            })
            .await
            .map_err(|e| ProviderError::transport(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                Some(status.as_u16()),
                non_empty_or(body, status.canonical_reason().unwrap_or("request failed")),
            ));
        }

        let parsed: RecognitionResponse = response.json().await.map_err(|e| {
            ProviderError::transport(format!("Failed to parse recognition response: {e}"))
        })?;

        match parsed.recognition_status {
            RecognitionStatus::Success => {
                Ok(parsed.best_text().unwrap_or_default().to_string())
            }
            // Silence and unmatched speech carry no transcript.
            RecognitionStatus::NoMatch | RecognitionStatus::InitialSilenceTimeout => {
                debug!(
                    "Recognition produced no text: {}",
                    parsed.recognition_status.describe()
                );
                Ok(String::new())
            }
            other => Err(ProviderError::transport(other.describe())),
        }
    }

    async fn fetch_voice_catalog(&self) -> Result<Vec<serde_json::Value>, ProviderError> {
        let inner = &self.inner;
        let url = inner.endpoints.voices_list_url();

        let response = inner
            .send(false, || {
                inner
                    .http
                    .get(&url)
                    .header(SUBSCRIPTION_KEY_HEADER, inner.subscription_key.as_str())
            })
            .await
            .map_err(|e| ProviderError::transport(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Azure voices list returned {}: {}", status, body);
            return Err(ProviderError::new(Some(status.as_u16()), non_empty_or(body, "")));
        }

        response
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|e| ProviderError::transport(format!("Failed to parse voice catalog: {e}")))
    }
}

/// One-shot synthesizer bound to the options captured at creation.
pub struct AzureSynthesizer {
    id: Uuid,
    inner: Arc<ClientInner>,
    voice: Option<String>,
    reconnect: bool,
    closed: bool,
}

impl AzureSynthesizer {
    pub(super) fn new(inner: Arc<ClientInner>, options: &ClientOptions) -> Self {
        let id = Uuid::new_v4();
        debug!("Opened synthesizer {}", id);
        Self {
            id,
            inner,
            voice: options.synthesis_voice_name.clone(),
            reconnect: options.is_enabled(PropertyId::SpeechServiceConnectionReconnectOnError),
            closed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

#[async_trait]
impl Synthesizer for AzureSynthesizer {
    async fn speak_ssml(&mut self, ssml: &str) -> SynthesisOutcome {
        if self.closed {
            return SynthesisOutcome::Failed(Some("synthesizer is closed".to_string()));
        }

        let inner = &self.inner;
        let url = inner.endpoints.synthesis_url();
        let body = Bytes::copy_from_slice(ssml.as_bytes());

        debug!(
            "Synthesizer {} speaking {} bytes of SSML (voice: {:?})",
            self.id,
            body.len(),
            self.voice
        );

        let result = inner
            .send(self.reconnect, || {
                inner
                    .http
                    .post(&url)
                    .header(SUBSCRIPTION_KEY_HEADER, inner.subscription_key.as_str())
                    .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
                    .header(OUTPUT_FORMAT_HEADER, SYNTHESIS_OUTPUT_FORMAT)
                    .body(body.clone())
            })
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return SynthesisOutcome::Failed(Some(describe_transport_error(&e))),
        };

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!("Azure synthesis returned {}: {}", status, details);
            let details = if details.trim().is_empty() {
                status.canonical_reason().map(str::to_string)
            } else {
                Some(details)
            };
            return SynthesisOutcome::Canceled {
                reason: CANCEL_REASON_ERROR.to_string(),
                error_details: details,
            };
        }

        match response.bytes().await {
            Ok(audio) => SynthesisOutcome::Completed(audio),
            Err(e) => SynthesisOutcome::Failed(Some(describe_transport_error(&e))),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!("Closed synthesizer {}", self.id);
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request to Azure Speech timed out: {e}")
    } else if e.is_connect() {
        format!("Failed to connect to Azure Speech: {e}")
    } else {
        format!("Azure Speech request failed: {e}")
    }
}

fn non_empty_or(body: String, fallback: &str) -> String {
    if body.trim().is_empty() {
        fallback.to_string()
    } else {
        body
    }
}
