use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::SpeechConfig;
use crate::core::SpeechService;
use crate::errors::SpeechResult;

/// Application state shared by the HTTP handlers.
///
/// The facade sits behind a `RwLock`: setters take the write lock, everything
/// else takes a read lock just long enough to snapshot a request or handle.
/// Server settings are read back through [`SpeechService::config`].
pub struct AppState {
    pub speech: RwLock<SpeechService>,
}

impl AppState {
    /// Build the facade from `config` and wrap it for sharing.
    pub fn new(config: SpeechConfig) -> SpeechResult<Arc<Self>> {
        let speech = SpeechService::new(config)?;
        Ok(Self::from_service(speech))
    }

    pub fn from_service(speech: SpeechService) -> Arc<Self> {
        Arc::new(Self {
            speech: RwLock::new(speech),
        })
    }

    /// Listen address from the configuration the facade was built with.
    pub async fn address(&self) -> String {
        self.speech.read().await.config().address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_exposes_service_config() {
        let mut config = SpeechConfig::new("eastasia", "0123456789abcdef0123456789abcdef");
        config.host = "127.0.0.1".to_string();
        config.port = 4100;

        let state = AppState::new(config).unwrap();
        assert_eq!(state.address().await, "127.0.0.1:4100");
        assert_eq!(state.speech.read().await.config().region, "eastasia");
    }
}
