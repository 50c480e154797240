//! Prosody settings held by the speech facade.

use serde::{Deserialize, Serialize};

/// Pitch, rate and volume applied to every synthesis request.
///
/// Pitch and rate are multiplicative factors (UI range 0.5–2.0), volume is a
/// gain in 0.0–1.0. All three fields are always present; range checks are the
/// caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    pub pitch: f64,
    pub rate: f64,
    pub volume: f64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
        }
    }
}

impl SpeechSettings {
    /// Overwrite the fields present in `update`, keep the rest.
    pub fn merge(&mut self, update: SpeechSettingsUpdate) {
        if let Some(pitch) = update.pitch {
            self.pitch = pitch;
        }
        if let Some(rate) = update.rate {
            self.rate = rate;
        }
        if let Some(volume) = update.volume {
            self.volume = volume;
        }
    }
}

/// Partial settings update; `None` fields keep their previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl SpeechSettingsUpdate {
    pub fn pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pitch.is_none() && self.rate.is_none() && self.volume.is_none()
    }
}

impl From<SpeechSettings> for SpeechSettingsUpdate {
    fn from(settings: SpeechSettings) -> Self {
        Self {
            pitch: Some(settings.pitch),
            rate: Some(settings.rate),
            volume: Some(settings.volume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unity() {
        let settings = SpeechSettings::default();
        assert_eq!(settings.pitch, 1.0);
        assert_eq!(settings.rate, 1.0);
        assert_eq!(settings.volume, 1.0);
    }

    #[test]
    fn test_sequential_partial_updates_keep_other_fields() {
        let mut settings = SpeechSettings {
            pitch: 1.0,
            rate: 1.0,
            volume: 0.6,
        };

        settings.merge(SpeechSettingsUpdate::default().pitch(1.5));
        settings.merge(SpeechSettingsUpdate::default().rate(0.8));

        assert_eq!(settings.pitch, 1.5);
        assert_eq!(settings.rate, 0.8);
        assert_eq!(settings.volume, 0.6);
    }

    #[test]
    fn test_full_update_replaces_everything() {
        let mut settings = SpeechSettings::default();
        let replacement = SpeechSettings {
            pitch: 0.5,
            rate: 2.0,
            volume: 0.25,
        };
        settings.merge(replacement.into());
        assert_eq!(settings, replacement);
    }

    #[test]
    fn test_update_deserializes_partial_json() {
        let update: SpeechSettingsUpdate = serde_json::from_str(r#"{"rate": 1.2}"#).unwrap();
        assert_eq!(update.rate, Some(1.2));
        assert!(update.pitch.is_none());
        assert!(update.volume.is_none());
        assert!(!update.is_empty());

        let empty: SpeechSettingsUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
