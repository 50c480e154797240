//! SSML document construction for synthesis requests.
//!
//! The facade sends one `<speak>` document per call:
//!
//! ```xml
//! <speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="zh-CN">
//!   <voice name="zh-CN-XiaoxiaoNeural">
//!     <prosody pitch="+20%" rate="1.0" volume="73%">text</prosody>
//!   </voice>
//! </speak>
//! ```
//!
//! Pitch is mapped from a multiplicative factor to a signed percentage
//! (`round((pitch - 1) * 50)`), rate is passed through with one decimal, and
//! volume becomes `round(volume * 100)` percent.

use super::settings::SpeechSettings;

/// W3C synthesis namespace required on the root element.
pub const SSML_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";

/// Escape the XML metacharacters that can appear in element content.
///
/// Only `&`, `<` and `>` are replaced: the text is never placed inside an
/// attribute value, so quotes pass through unchanged.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a value placed inside a double-quoted attribute (`& < > "`).
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Signed pitch percentage for a multiplicative pitch factor.
pub fn pitch_percentage(pitch: f64) -> i64 {
    ((pitch - 1.0) * 50.0).round() as i64
}

/// Volume percentage for a 0.0–1.0 gain.
pub fn volume_percentage(volume: f64) -> i64 {
    (volume * 100.0).round() as i64
}

/// `pitch` attribute value, e.g. `+50%`, `0%`, `-25%`.
pub fn format_pitch(pitch: f64) -> String {
    let percent = pitch_percentage(pitch);
    if percent > 0 {
        format!("+{percent}%")
    } else {
        format!("{percent}%")
    }
}

/// `rate` attribute value with exactly one decimal, e.g. `1.0`.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}")
}

/// `volume` attribute value, e.g. `73%`.
pub fn format_volume(volume: f64) -> String {
    format!("{}%", volume_percentage(volume))
}

/// A synthesis request captured at call time.
///
/// Voice, language and settings are copied out of the facade when the request
/// is prepared, so later setter calls never affect a request in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub voice: String,
    pub language: String,
    pub text: String,
    pub settings: SpeechSettings,
}

impl SynthesisRequest {
    /// Render the request as a single-line SSML document.
    pub fn to_ssml(&self) -> String {
        format!(
            r#"<speak version="1.0" xmlns="{ns}" xml:lang="{lang}"><voice name="{voice}"><prosody pitch="{pitch}" rate="{rate}" volume="{volume}">{text}</prosody></voice></speak>"#,
            ns = SSML_NAMESPACE,
            lang = escape_attribute(&self.language),
            voice = escape_attribute(&self.voice),
            pitch = format_pitch(self.settings.pitch),
            rate = format_rate(self.settings.rate),
            volume = format_volume(self.settings.volume),
            text = escape_text(&self.text),
        )
    }
}
