//! Wire types for the Azure short-audio recognition endpoint.

use serde::Deserialize;

/// Recognition outcome reported in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RecognitionStatus {
    Success,
    NoMatch,
    InitialSilenceTimeout,
    BabbleTimeout,
    Error,
    #[serde(other)]
    Unknown,
}

impl RecognitionStatus {
    /// Human-readable explanation for a non-success status.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Success => "recognition succeeded",
            Self::NoMatch => "speech was detected but no words could be matched",
            Self::InitialSilenceTimeout => "the audio began with silence and timed out",
            Self::BabbleTimeout => "the audio began with noise and timed out",
            Self::Error => "the recognition service reported an internal error",
            Self::Unknown => "the recognition service returned an unknown status",
        }
    }
}

/// One word with its timing, present when word-level timestamps are requested.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WordTiming {
    pub word: String,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub duration: u64,
}

/// A candidate transcription in detailed output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NBestEntry {
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub lexical: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub words: Vec<WordTiming>,
}

/// Response body of the recognition endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecognitionResponse {
    pub recognition_status: RecognitionStatus,
    #[serde(default)]
    pub display_text: Option<String>,
    /// Offset in 100-nanosecond units
    #[serde(default)]
    pub offset: Option<u64>,
    /// Duration in 100-nanosecond units
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default, rename = "NBest")]
    pub n_best: Vec<NBestEntry>,
}

impl RecognitionResponse {
    /// Best transcription: `DisplayText`, else the first `NBest` display form.
    pub fn best_text(&self) -> Option<&str> {
        self.display_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                self.n_best
                    .first()
                    .map(|n| n.display.as_str())
                    .filter(|t| !t.is_empty())
            })
    }
}
