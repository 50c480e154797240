//! End-to-end facade tests against a mocked Azure Speech service.
//!
//! The real REST client is pointed at a `wiremock` server for both the
//! text-to-speech and speech-to-text hosts.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voicedesk::{
    AudioInput, SpeechConfig, SpeechError, SpeechService, SpeechSettingsUpdate, UNKNOWN_ERROR,
};

const KEY: &str = "0123456789abcdef0123456789abcdef";

fn test_config(server: &MockServer) -> SpeechConfig {
    let mut config = SpeechConfig::new("eastasia", KEY);
    config.tts_endpoint = Some(server.uri());
    config.stt_endpoint = Some(server.uri());
    config.request_timeout_secs = 5;
    config
}

/// Minimal RIFF header followed by a few bytes of silence.
fn fake_wav() -> Vec<u8> {
    let mut data = b"RIFF\x24\0\0\0WAVE".to_vec();
    data.extend_from_slice(&[0u8; 32]);
    data
}

#[tokio::test]
async fn test_voice_catalog_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cognitiveservices/voices/list"))
        .and(header("Ocp-Apim-Subscription-Key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "Name": "Microsoft Server Speech Text to Speech Voice (zh-TW, HsiaoChenNeural)",
                "ShortName": "zh-TW-HsiaoChenNeural",
                "Locale": "zh-TW",
                "LocalName": "曉臻",
                "Gender": "Female",
                "VoiceType": "Neural",
                "Status": "GA"
            },
            {
                "Name": "Microsoft Server Speech Text to Speech Voice (en-US, JennyNeural)",
                "ShortName": "en-US-JennyNeural",
                "Locale": "en-US",
                "LocalName": "Jenny",
                "Gender": "Female",
                "VoiceType": "Neural",
                "Status": "GA"
            },
            {
                "Name": "Microsoft Server Speech Text to Speech Voice (zh-CN, YunxiNeural)",
                "ShortName": "zh-CN-YunxiNeural",
                "Locale": "zh-CN",
                "LocalName": "云希",
                "Gender": "Male",
                "VoiceType": "Neural",
                "Status": "GA"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = SpeechService::new(test_config(&server)).unwrap();
    let voices = service.list_voices().await.unwrap();

    let locales: Vec<&str> = voices.iter().map(|v| v.locale.as_str()).collect();
    assert_eq!(locales, vec!["zh-CN", "zh-TW"]);
    assert_eq!(voices[0].short_name, "zh-CN-YunxiNeural");
    assert_eq!(voices[0].display_name, "云希");

    let selected = service.select_default_voice(&voices).unwrap();
    assert_eq!(selected.id, voices[0].id);
    assert_eq!(service.current_voice(), Some(voices[0].id.as_str()));
}

#[tokio::test]
async fn test_catalog_unauthorized_is_catalog_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cognitiveservices/voices/list"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let service = SpeechService::new(test_config(&server)).unwrap();
    let err = service.list_voices().await.unwrap_err();

    assert!(matches!(err, SpeechError::CatalogFetch { status: Some(401), .. }));
    assert!(!err.is_fatal());
    assert!(err.to_string().starts_with("Failed to fetch voice catalog"));
}

#[tokio::test]
async fn test_synthesize_sends_prosody_markup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .and(header("Content-Type", "application/ssml+xml"))
        .and(header("X-Microsoft-OutputFormat", "riff-24khz-16bit-mono-pcm"))
        .and(body_string_contains(
            r#"<prosody pitch="-25%" rate="0.8" volume="70%">1 &lt; 2 &amp;&amp; 3 &gt; 2</prosody>"#,
        ))
        .and(body_string_contains(r#"<voice name="zh-CN-XiaochenNeural">"#))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(fake_wav()))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = SpeechService::new(test_config(&server)).unwrap();
    service.set_voice("zh-CN-XiaochenNeural");
    service.set_settings(SpeechSettingsUpdate::default().pitch(0.5));
    service.set_settings(SpeechSettingsUpdate::default().rate(0.8).volume(0.7));

    let audio = service.synthesize("1 < 2 && 3 > 2").await.unwrap();
    assert_eq!(audio.as_bytes(), fake_wav().as_slice());
}

#[tokio::test]
async fn test_synthesize_empty_body_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let service = SpeechService::new(test_config(&server)).unwrap();
    assert_eq!(
        service.synthesize("你好").await.unwrap_err(),
        SpeechError::EmptyResult
    );
}

#[tokio::test]
async fn test_synthesize_rejection_without_detail_reports_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid SSML"))
        .mount(&server)
        .await;

    let service = SpeechService::new(test_config(&server)).unwrap();
    assert_eq!(
        service.synthesize("你好").await.unwrap_err(),
        SpeechError::SynthesisCanceled("Invalid SSML".to_string())
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        // 599 carries no canonical reason phrase
        .respond_with(ResponseTemplate::new(599))
        .mount(&server)
        .await;

    let service = SpeechService::new(test_config(&server)).unwrap();
    assert_eq!(
        service.synthesize("你好").await.unwrap_err(),
        SpeechError::SynthesisCanceled(UNKNOWN_ERROR.to_string())
    );
}

#[tokio::test]
async fn test_blank_text_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(fake_wav()))
        .expect(0)
        .mount(&server)
        .await;

    let service = SpeechService::new(test_config(&server)).unwrap();
    let err = service.synthesize("   ").await.unwrap_err();
    assert!(matches!(err, SpeechError::Validation(_)));
}

#[tokio::test]
async fn test_recognize_detailed_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/speech/recognition/conversation/cognitiveservices/v1"))
        .and(query_param("language", "zh-CN"))
        .and(query_param("format", "detailed"))
        .and(query_param("wordLevelTimestamps", "true"))
        .and(query_param("initialSilenceTimeoutMs", "5000"))
        .and(query_param("endSilenceTimeoutMs", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RecognitionStatus": "Success",
            "Offset": 100000,
            "Duration": 15000000,
            "NBest": [{
                "Confidence": 0.97,
                "Lexical": "今天 天气 很 好",
                "Display": "今天天气很好。",
                "Words": []
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = SpeechService::new(test_config(&server)).unwrap();
    let audio = AudioInput::new("weather.wav", "audio/wav", fake_wav());
    assert_eq!(service.recognize(&audio).await.unwrap(), "今天天气很好。");
}

#[tokio::test]
async fn test_recognize_rejected_audio_is_recognition_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/speech/recognition/conversation/cognitiveservices/v1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Unsupported audio format"))
        .mount(&server)
        .await;

    let service = SpeechService::new(test_config(&server)).unwrap();
    let audio = AudioInput::new("clip.ogg", "audio/ogg", vec![0u8; 64]);
    match service.recognize(&audio).await.unwrap_err() {
        SpeechError::RecognitionFailed(message) => {
            assert!(message.contains("Unsupported audio format"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
