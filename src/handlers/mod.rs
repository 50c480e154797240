//! HTTP request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Health check endpoint
//! - `voices` - Voice catalog and voice selection
//! - `settings` - Prosody settings
//! - `speech` - Synthesis and recognition

use axum::{extract::rejection::JsonRejection, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::SpeechError;

pub mod api;
pub mod settings;
pub mod speech;
pub mod voices;

/// JSON error body returned by every handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a facade error: caller mistakes are 400, provider-side
/// failures 502, anything else 500.
pub fn status_for(err: &SpeechError) -> StatusCode {
    match err {
        SpeechError::Validation(_) | SpeechError::InvalidAudio(_) => StatusCode::BAD_REQUEST,
        SpeechError::EmptyResult
        | SpeechError::SynthesisCanceled(_)
        | SpeechError::SynthesisFailed(_)
        | SpeechError::CatalogFetch { .. }
        | SpeechError::RecognitionFailed(_) => StatusCode::BAD_GATEWAY,
        SpeechError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a facade error into an HTTP error response.
pub fn api_error(err: SpeechError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(code = err.code(), "Request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
    )
}

/// Unwrap a JSON body; a rejection becomes a `VALIDATION_ERROR` response.
pub fn json_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(api_error(SpeechError::Validation(rejection.body_text()))),
    }
}
