pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::SpeechConfig;
pub use crate::core::*;
pub use errors::{SpeechError, SpeechResult, UNKNOWN_ERROR};
pub use state::AppState;
