use std::sync::Arc;

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};

use super::{ApiError, json_payload};
use crate::core::{SpeechSettings, SpeechSettingsUpdate};
use crate::state::AppState;

/// Current prosody settings.
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SpeechSettings> {
    Json(state.speech.read().await.settings())
}

/// Merge a partial settings update and return the result.
///
/// Values are not range-checked; the client is expected to clamp them.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeechSettingsUpdate>, JsonRejection>,
) -> Result<Json<SpeechSettings>, ApiError> {
    let update = json_payload(payload)?;
    let mut speech = state.speech.write().await;
    speech.set_settings(update);
    Ok(Json(speech.settings()))
}
