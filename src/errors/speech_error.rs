use thiserror::Error;

/// Placeholder used when the provider does not supply any diagnostic text.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Errors surfaced by the speech facade.
///
/// Every variant except [`SpeechError::Configuration`] is transient: the
/// operation failed, facade state is unaffected and the caller may retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    /// Missing or malformed startup configuration. Fatal.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller violated a precondition (no voice selected, blank text).
    #[error("{0}")]
    Validation(String),

    /// The provider reported success but returned no audio.
    #[error("No audio data received from speech synthesis")]
    EmptyResult,

    #[error("Speech synthesis canceled: {0}")]
    SynthesisCanceled(String),

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Non-2xx response or transport failure while fetching the voice catalog.
    #[error("Failed to fetch voice catalog: {message}")]
    CatalogFetch {
        status: Option<u16>,
        message: String,
    },

    #[error("Speech recognition failed: {0}")]
    RecognitionFailed(String),

    /// Audio rejected by caller-side validation (media type or size).
    #[error("Invalid audio input: {0}")]
    InvalidAudio(String),
}

impl SpeechError {
    /// Whether the application is unusable until configuration is fixed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::EmptyResult => "EMPTY_RESULT",
            Self::SynthesisCanceled(_) => "SYNTHESIS_CANCELED",
            Self::SynthesisFailed(_) => "SYNTHESIS_FAILED",
            Self::CatalogFetch { .. } => "CATALOG_FETCH_FAILED",
            Self::RecognitionFailed(_) => "RECOGNITION_FAILED",
            Self::InvalidAudio(_) => "INVALID_AUDIO",
        }
    }

    pub(crate) fn canceled(detail: Option<String>) -> Self {
        Self::SynthesisCanceled(non_empty_or_unknown(detail))
    }

    pub(crate) fn failed(message: Option<String>) -> Self {
        Self::SynthesisFailed(non_empty_or_unknown(message))
    }
}

fn non_empty_or_unknown(message: Option<String>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Result type alias for facade operations.
pub type SpeechResult<T> = Result<T, SpeechError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(SpeechError::Configuration("missing region".into()).is_fatal());
        assert!(!SpeechError::Validation("blank".into()).is_fatal());
        assert!(!SpeechError::EmptyResult.is_fatal());
        assert!(
            !SpeechError::CatalogFetch {
                status: Some(401),
                message: "unauthorized".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_canceled_without_detail_reports_unknown_error() {
        let err = SpeechError::canceled(None);
        assert_eq!(err, SpeechError::SynthesisCanceled(UNKNOWN_ERROR.into()));
        assert!(err.to_string().contains("unknown error"));

        let blank = SpeechError::canceled(Some("   ".into()));
        assert_eq!(blank, SpeechError::SynthesisCanceled(UNKNOWN_ERROR.into()));
    }

    #[test]
    fn test_failed_keeps_provider_message() {
        let err = SpeechError::failed(Some("connection reset".into()));
        assert_eq!(err.to_string(), "Speech synthesis failed: connection reset");
    }

    #[test]
    fn test_catalog_fetch_display_mentions_catalog() {
        let err = SpeechError::CatalogFetch {
            status: Some(503),
            message: "HTTP error! status: 503".into(),
        };
        assert!(err.to_string().starts_with("Failed to fetch voice catalog"));
        assert_eq!(err.code(), "CATALOG_FETCH_FAILED");
    }
}
