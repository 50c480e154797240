use serde::Deserialize;
use std::path::Path;

use crate::errors::{SpeechError, SpeechResult};

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in the
/// file take priority over environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///
/// azure:
///   region: "eastasia"
///   subscription_key: "your-subscription-key"
///   voice: "zh-CN-XiaoxiaoNeural"
///   synthesis_language: "zh-CN"
///   recognition_language: "zh-CN"
///   connect_timeout_secs: 10
///   request_timeout_secs: 60
///
/// security:
///   cors_allowed_origins: "http://localhost:5173"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub azure: Option<AzureYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Azure Speech settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AzureYaml {
    /// Azure region where the Speech resource is deployed (e.g., "eastasia", "westus2")
    pub region: Option<String>,
    /// Subscription key from Azure Portal (Speech resource → Keys and Endpoint)
    pub subscription_key: Option<String>,
    pub voice: Option<String>,
    pub synthesis_language: Option<String>,
    pub recognition_language: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub initial_silence_timeout_ms: Option<u64>,
    pub end_silence_timeout_ms: Option<u64>,
    /// Override for the text-to-speech base URL (testing, sovereign clouds)
    pub tts_endpoint: Option<String>,
    /// Override for the speech-to-text base URL
    pub stt_endpoint: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// Comma-separated list of origins, or "*"
    pub cors_allowed_origins: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns [`SpeechError::Configuration`] if the file cannot be read or the
    /// YAML is malformed.
    pub fn from_file(path: &Path) -> SpeechResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SpeechError::Configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents)
            .map_err(|e| SpeechError::Configuration(format!("Failed to parse YAML config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080

azure:
  region: "eastasia"
  subscription_key: "0123456789abcdef0123456789abcdef"
  voice: "zh-CN-YunxiNeural"
  synthesis_language: "zh-CN"
  recognition_language: "zh-TW"
  connect_timeout_secs: 5
  request_timeout_secs: 30

security:
  cors_allowed_origins: "*"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.expect("server should be present");
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(8080));

        let azure = config.azure.expect("azure should be present");
        assert_eq!(azure.region.as_deref(), Some("eastasia"));
        assert_eq!(azure.voice.as_deref(), Some("zh-CN-YunxiNeural"));
        assert_eq!(azure.recognition_language.as_deref(), Some("zh-TW"));
        assert_eq!(azure.connect_timeout_secs, Some(5));
        assert!(azure.tts_endpoint.is_none());

        assert_eq!(
            config.security.unwrap().cors_allowed_origins.as_deref(),
            Some("*")
        );
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.azure.is_none());
        assert!(config.security.is_none());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "azure:\n  region: \"westus2\"\n").unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();
        assert_eq!(
            config.azure.unwrap().region.as_deref(),
            Some("westus2")
        );
    }

    #[test]
    fn test_from_file_not_found() {
        let path = PathBuf::from("/nonexistent/config.yaml");
        let err = YamlConfig::from_file(&path).unwrap_err();

        assert!(err.is_fatal());
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");

        fs::write(&config_path, "invalid: yaml: content:").unwrap();

        let err = YamlConfig::from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML"));
    }
}
