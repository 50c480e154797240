//! Audio buffers crossing the facade boundary.
//!
//! - [`AudioInput`]: an uploaded file handed to recognition, plus the
//!   caller-side checks (media type allow-list, 10 MiB ceiling).
//! - [`SynthesizedAudio`]: the WAV buffer returned by synthesis.

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;

use crate::errors::{SpeechError, SpeechResult};

/// Largest audio file accepted for recognition (10 MiB).
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// Media types accepted for recognition.
pub const SUPPORTED_AUDIO_TYPES: &[&str] = &[
    "audio/wav",
    "audio/x-wav",
    "audio/wave",
    "audio/mp3",
    "audio/mpeg",
    "audio/ogg",
];

/// An audio file submitted for recognition.
#[derive(Debug, Clone)]
pub struct AudioInput {
    pub file_name: String,
    /// Declared media type, without parameters (e.g. `audio/wav`)
    pub media_type: String,
    pub data: Bytes,
}

impl AudioInput {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: normalize_media_type(&media_type.into()),
            data: data.into(),
        }
    }

    /// Read a file from disk, inferring the media type from its extension and,
    /// failing that, from its magic bytes.
    pub async fn from_path(path: &Path) -> SpeechResult<Self> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            SpeechError::InvalidAudio(format!("Failed to read {}: {e}", path.display()))
        })?;

        let media_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(media_type_for_extension)
            .unwrap_or_else(|| detect_audio_format(&data).0);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        Ok(Self::new(file_name, media_type, data))
    }

    /// Caller-side validation: allowed media type and size ceiling.
    ///
    /// The facade itself does not call this; it trusts its input.
    pub fn validate(&self) -> SpeechResult<()> {
        if !SUPPORTED_AUDIO_TYPES.contains(&self.media_type.as_str()) {
            return Err(SpeechError::InvalidAudio(format!(
                "Unsupported audio type '{}'; expected one of: {}",
                self.media_type,
                SUPPORTED_AUDIO_TYPES.join(", ")
            )));
        }
        if self.data.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio file is empty".to_string()));
        }
        if self.data.len() > MAX_AUDIO_BYTES {
            return Err(SpeechError::InvalidAudio(format!(
                "Audio file is {} bytes; the limit is {} bytes (10 MiB)",
                self.data.len(),
                MAX_AUDIO_BYTES
            )));
        }
        Ok(())
    }

    /// `Content-Type` header for the recognition request.
    pub fn content_type(&self) -> &'static str {
        match self.media_type.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" => "audio/wav; codecs=audio/pcm",
            "audio/ogg" => "audio/ogg; codecs=opus",
            "audio/mp3" | "audio/mpeg" => "audio/mpeg",
            _ => "application/octet-stream",
        }
    }
}

fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "wav" | "wave" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "ogg" | "opus" => Some("audio/ogg"),
        _ => None,
    }
}

/// Detect audio format from magic bytes.
pub fn detect_audio_format(data: &[u8]) -> (&'static str, &'static str) {
    if data.len() < 12 {
        return ("application/octet-stream", "bin");
    }

    if data.starts_with(b"ID3") || (data[0] == 0xFF && (data[1] & 0xE0) == 0xE0) {
        return ("audio/mpeg", "mp3");
    }
    if data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
        return ("audio/wav", "wav");
    }
    if data.starts_with(b"OggS") {
        return ("audio/ogg", "ogg");
    }

    ("application/octet-stream", "bin")
}

/// Header facts about a synthesized WAV buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_ms: u64,
}

/// Audio returned by a successful synthesis call (RIFF/WAV).
///
/// The buffer is owned by the caller; the facade keeps no reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    data: Bytes,
}

impl SynthesizedAudio {
    pub const MIME_TYPE: &'static str = "audio/wav";

    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Parse the WAV header. `None` if the buffer is not a readable WAV file.
    pub fn wav_info(&self) -> Option<WavInfo> {
        let reader = hound::WavReader::new(Cursor::new(self.data.as_ref())).ok()?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return None;
        }
        let duration_ms = u64::from(reader.duration()) * 1000 / u64::from(spec.sample_rate);
        Some(WavInfo {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            duration_ms,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A mono 16-bit PCM WAV buffer of `samples` samples at `sample_rate`.
    pub fn wav_bytes(sample_rate: u32, samples: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..samples {
                writer.write_sample((i % 64) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }
}
