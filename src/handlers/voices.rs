use std::sync::Arc;

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, api_error, json_payload};
use crate::core::VoiceDescriptor;
use crate::errors::SpeechError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSelection {
    /// Selected voice, `null` when none is selected
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetVoiceRequest {
    pub voice_id: String,
}

/// Chinese-locale voices from the provider catalog, sorted by locale and name.
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VoiceDescriptor>>, ApiError> {
    let handle = state.speech.read().await.handle();
    let voices = handle.list_voices().await.map_err(api_error)?;
    Ok(Json(voices))
}

pub async fn get_voice(State(state): State<Arc<AppState>>) -> Json<VoiceSelection> {
    let speech = state.speech.read().await;
    Json(VoiceSelection {
        voice_id: speech.current_voice().map(str::to_string),
    })
}

/// Select a voice. The id is not checked against the catalog.
pub async fn set_voice(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetVoiceRequest>, JsonRejection>,
) -> Result<Json<VoiceSelection>, ApiError> {
    let request = json_payload(payload)?;
    if request.voice_id.trim().is_empty() {
        return Err(api_error(SpeechError::Validation(
            "voice_id must not be empty".to_string(),
        )));
    }

    let mut speech = state.speech.write().await;
    speech.set_voice(&request.voice_id);
    Ok(Json(VoiceSelection {
        voice_id: speech.current_voice().map(str::to_string),
    }))
}
