use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::core::MAX_AUDIO_BYTES;
use crate::handlers::{api, settings, speech, voices};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router.
///
/// CORS is applied in main.rs once the configuration is known.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route("/voices", get(voices::list_voices))
        .route("/voice", get(voices::get_voice).put(voices::set_voice))
        .route(
            "/settings",
            get(settings::get_settings).patch(settings::update_settings),
        )
        .route("/synthesize", post(speech::synthesize))
        // Oversized uploads get a descriptive 400 from validation rather than
        // a bare 413, up to twice the limit.
        .route(
            "/recognize",
            post(speech::recognize).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES * 2)),
        )
        .layer(TraceLayer::new_for_http())
}
