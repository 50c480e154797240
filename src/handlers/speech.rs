use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiError, api_error, json_payload};
use crate::core::{AudioInput, SynthesizedAudio};
use crate::errors::SpeechError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeResponse {
    pub text: String,
}

/// Synthesize text with the current voice and settings; responds with WAV bytes.
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_payload(payload)?;
    // Snapshot under the read lock; the provider call runs without it.
    let (prepared, handle) = {
        let speech = state.speech.read().await;
        let prepared = speech.prepare_synthesis(&request.text).map_err(api_error)?;
        (prepared, speech.handle())
    };

    let audio = handle
        .synthesize_request(&prepared)
        .await
        .map_err(api_error)?;

    if let Some(info) = audio.wav_info() {
        debug!(
            sample_rate = info.sample_rate,
            duration_ms = info.duration_ms,
            "Returning synthesized audio"
        );
    }

    Ok((
        [
            (header::CONTENT_TYPE, SynthesizedAudio::MIME_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        audio.into_bytes(),
    )
        .into_response())
}

/// Transcribe an uploaded audio file sent as the raw request body.
pub async fn recognize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RecognizeResponse>, ApiError> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            api_error(SpeechError::InvalidAudio(
                "Content-Type header is required".to_string(),
            ))
        })?;

    let audio = AudioInput::new("upload", media_type, body);
    audio.validate().map_err(api_error)?;

    info!(
        media_type = %audio.media_type,
        bytes = audio.data.len(),
        "Received audio for recognition"
    );

    let handle = state.speech.read().await.handle();
    let text = handle.recognize(&audio).await.map_err(api_error)?;
    Ok(Json(RecognizeResponse { text }))
}
