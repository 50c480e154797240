//! Voice catalog schema and the catalog-to-descriptor adaptation.
//!
//! The provider returns an untyped JSON array. Each element is decoded into a
//! [`CatalogEntry`] on its own; malformed elements or elements missing `Name`
//! or `Locale` are logged and skipped instead of failing the whole catalog.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Locale family the facade exposes. Fixed per deployment.
pub const CHINESE_LOCALE_FAMILY: &str = "zh-";

// Azure TTS Voices API response structures
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogEntry {
    /// Full voice name, e.g., "Microsoft Server Speech Text to Speech Voice (zh-CN, XiaoxiaoNeural)"
    #[serde(default)]
    pub name: Option<String>,
    /// Locale code, e.g., "zh-CN"
    #[serde(default)]
    pub locale: Option<String>,
    /// Localized display name, e.g., "晓晓"
    #[serde(default)]
    pub local_name: Option<String>,
    /// "Female", "Male" or "Neutral"
    #[serde(default)]
    pub gender: Option<String>,
    /// "Neural" or "Standard"
    #[serde(default)]
    pub voice_type: Option<String>,
    /// "GA", "Preview" or "Deprecated"
    #[serde(default)]
    pub status: Option<String>,
    /// Short name usable as voice ID, e.g., "zh-CN-XiaoxiaoNeural"
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Female,
    Male,
    Neutral,
    Unknown,
}

impl VoiceGender {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("female") => Self::Female,
            Some("male") => Self::Male,
            Some("neutral") => Self::Neutral,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum VoiceKind {
    Neural,
    Standard,
    Other(String),
}

impl VoiceKind {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("neural") => Self::Neural,
            Some(v) if v.eq_ignore_ascii_case("standard") => Self::Standard,
            Some(v) => Self::Other(v.to_string()),
            None => Self::Other(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Neural => "Neural",
            Self::Standard => "Standard",
            Self::Other(v) => v,
        }
    }
}

impl From<VoiceKind> for String {
    fn from(kind: VoiceKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum VoiceStatus {
    Ga,
    Preview,
    Deprecated,
    Other(String),
}

impl VoiceStatus {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("ga") => Self::Ga,
            Some(v) if v.eq_ignore_ascii_case("preview") => Self::Preview,
            Some(v) if v.eq_ignore_ascii_case("deprecated") => Self::Deprecated,
            Some(v) => Self::Other(v.to_string()),
            None => Self::Other(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ga => "GA",
            Self::Preview => "Preview",
            Self::Deprecated => "Deprecated",
            Self::Other(v) => v,
        }
    }
}

impl From<VoiceStatus> for String {
    fn from(status: VoiceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// UI-facing voice record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceDescriptor {
    /// Canonical voice name, accepted by `set_voice`
    pub id: String,
    /// Short voice name, e.g., "zh-CN-XiaoxiaoNeural"
    pub short_name: String,
    pub locale: String,
    /// Localized name, falling back to the canonical name
    pub display_name: String,
    pub gender: VoiceGender,
    pub voice_kind: VoiceKind,
    pub status: VoiceStatus,
}

impl fmt::Display for VoiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.locale)
    }
}

impl TryFrom<CatalogEntry> for VoiceDescriptor {
    type Error = String;

    fn try_from(entry: CatalogEntry) -> Result<Self, Self::Error> {
        let id = entry
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| "catalog entry is missing Name".to_string())?;
        let locale = entry
            .locale
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| format!("catalog entry '{id}' is missing Locale"))?;

        let display_name = entry
            .local_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.clone());
        let short_name = entry.short_name.unwrap_or_else(|| id.clone());

        Ok(Self {
            gender: VoiceGender::parse(entry.gender.as_deref()),
            voice_kind: VoiceKind::parse(entry.voice_type.as_deref()),
            status: VoiceStatus::parse(entry.status.as_deref()),
            id,
            short_name,
            locale,
            display_name,
        })
    }
}

impl VoiceDescriptor {
    /// Whether the voice's locale belongs to `family` (e.g. `"zh-"`), case-insensitively.
    pub fn in_locale_family(&self, family: &str) -> bool {
        self.locale
            .to_ascii_lowercase()
            .starts_with(&family.to_ascii_lowercase())
    }
}

/// Decode raw catalog JSON into descriptors, skipping invalid entries.
pub fn parse_catalog(raw: Vec<serde_json::Value>) -> Vec<VoiceDescriptor> {
    let total = raw.len();
    let voices: Vec<VoiceDescriptor> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let entry: CatalogEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed voice catalog entry");
                    return None;
                }
            };
            match VoiceDescriptor::try_from(entry) {
                Ok(voice) => Some(voice),
                Err(reason) => {
                    warn!(index, %reason, "Skipping incomplete voice catalog entry");
                    None
                }
            }
        })
        .collect();

    debug!(total, valid = voices.len(), "Parsed voice catalog");
    voices
}

/// Keep voices in `family` and order them by locale, then display name.
pub fn filter_and_sort(voices: Vec<VoiceDescriptor>, family: &str) -> Vec<VoiceDescriptor> {
    let mut filtered: Vec<VoiceDescriptor> = voices
        .into_iter()
        .filter(|v| v.in_locale_family(family))
        .collect();

    filtered.sort_by(|a, b| {
        a.locale
            .cmp(&b.locale)
            .then_with(|| compare_display_names(&a.display_name, &b.display_name))
    });
    filtered
}

/// Case-insensitive comparison with a byte-order tie-break, so the ordering is total.
fn compare_display_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, locale: &str, local_name: &str) -> serde_json::Value {
        json!({
            "Name": name,
            "ShortName": name,
            "Locale": locale,
            "LocalName": local_name,
            "Gender": "Female",
            "VoiceType": "Neural",
            "Status": "GA"
        })
    }

    #[test]
    fn test_catalog_entry_maps_all_fields() {
        let voices = parse_catalog(vec![json!({
            "Name": "Microsoft Server Speech Text to Speech Voice (zh-CN, YunxiNeural)",
            "DisplayName": "Yunxi",
            "LocalName": "云希",
            "ShortName": "zh-CN-YunxiNeural",
            "Gender": "Male",
            "Locale": "zh-CN",
            "VoiceType": "Neural",
            "Status": "GA",
            "WordsPerMinute": "293"
        })]);

        assert_eq!(voices.len(), 1);
        let voice = &voices[0];
        assert_eq!(
            voice.id,
            "Microsoft Server Speech Text to Speech Voice (zh-CN, YunxiNeural)"
        );
        assert_eq!(voice.short_name, "zh-CN-YunxiNeural");
        assert_eq!(voice.display_name, "云希");
        assert_eq!(voice.gender, VoiceGender::Male);
        assert_eq!(voice.voice_kind, VoiceKind::Neural);
        assert_eq!(voice.status, VoiceStatus::Ga);
        assert_eq!(voice.to_string(), "云希 (zh-CN)");
    }

    #[test]
    fn test_display_name_falls_back_to_name() {
        let voices = parse_catalog(vec![json!({"Name": "zh-HK-HiuGaaiNeural", "Locale": "zh-HK"})]);
        assert_eq!(voices[0].display_name, "zh-HK-HiuGaaiNeural");
        assert_eq!(voices[0].gender, VoiceGender::Unknown);
    }

    #[test]
    fn test_incomplete_and_malformed_entries_are_skipped() {
        let voices = parse_catalog(vec![
            json!({"Locale": "zh-CN", "LocalName": "无名"}),
            json!({"Name": "zh-CN-A", "LocalName": "甲"}),
            json!({"Name": 42, "Locale": "zh-CN"}),
            json!("not an object"),
            entry("zh-CN-B", "zh-CN", "乙"),
        ]);

        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].id, "zh-CN-B");
    }

    #[test]
    fn test_empty_catalog_is_empty_not_error() {
        let voices = filter_and_sort(parse_catalog(Vec::new()), CHINESE_LOCALE_FAMILY);
        assert!(voices.is_empty());
    }

    #[test]
    fn test_filters_to_chinese_family_and_sorts() {
        let voices = parse_catalog(vec![
            entry("zh-TW-HsiaoChenNeural", "zh-TW", "HsiaoChen"),
            entry("en-US-JennyNeural", "en-US", "Jenny"),
            entry("zh-CN-YunxiNeural", "zh-CN", "Yunxi"),
        ]);

        let sorted = filter_and_sort(voices, CHINESE_LOCALE_FAMILY);
        let ids: Vec<&str> = sorted.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["zh-CN-YunxiNeural", "zh-TW-HsiaoChenNeural"]);
    }

    #[test]
    fn test_sorts_by_display_name_within_locale() {
        let voices = parse_catalog(vec![
            entry("zh-CN-3", "zh-CN", "yunyang"),
            entry("zh-CN-1", "zh-CN", "Xiaoxiao"),
            entry("zh-CN-2", "zh-CN", "Yunxi"),
            entry("zh-HK-1", "zh-HK", "Aaron"),
        ]);

        let sorted = filter_and_sort(voices, CHINESE_LOCALE_FAMILY);
        let names: Vec<&str> = sorted.iter().map(|v| v.display_name.as_str()).collect();
        assert_eq!(names, vec!["Xiaoxiao", "Yunxi", "yunyang", "Aaron"]);
    }

    #[test]
    fn test_locale_family_match_is_case_insensitive() {
        let voices = parse_catalog(vec![entry("legacy", "ZH-cn", "Legacy")]);
        assert!(voices[0].in_locale_family(CHINESE_LOCALE_FAMILY));
        assert!(!voices[0].in_locale_family("en-"));
    }

    #[test]
    fn test_unknown_kind_and_status_are_preserved() {
        let voices = parse_catalog(vec![json!({
            "Name": "zh-CN-X",
            "Locale": "zh-CN",
            "VoiceType": "NeuralHD",
            "Status": "Beta"
        })]);

        let json = serde_json::to_value(&voices[0]).unwrap();
        assert_eq!(json["voice_kind"], "NeuralHD");
        assert_eq!(json["status"], "Beta");
        assert_eq!(json["gender"], "unknown");
    }
}
