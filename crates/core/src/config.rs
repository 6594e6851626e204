use crate::types::MessageKind;
use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `DIALOG_BRIDGE__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Where the `{accessToken, botId}` file lives and which environment
/// variable overrides the stored token.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_credentials_path")]
    pub path: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerConfig {
    /// Platforms whose events are tracked at all.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
    /// Enabled mapping-table entries.
    #[serde(default = "default_kinds")]
    pub kinds: Vec<MessageKind>,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    3000
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_credentials_path() -> String {
    "config/botpress-dialog.json".to_string()
}
fn default_token_env() -> String {
    "DIALOG_TOKEN".to_string()
}
fn default_base_url() -> String {
    "https://api.dialoganalytics.com/v1".to_string()
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_queue_capacity() -> usize {
    10_000
}
fn default_platforms() -> Vec<String> {
    vec!["facebook".to_string()]
}
fn default_kinds() -> Vec<MessageKind> {
    MessageKind::ALL.to_vec()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
            token_env: default_token_env(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            platforms: default_platforms(),
            kinds: default_kinds(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("DIALOG_BRIDGE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("normalizer.platforms")
                    .with_list_parse_key("normalizer.kinds"),
            )
            .build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.http_port, 3000);
        assert_eq!(config.credentials.token_env, "DIALOG_TOKEN");
        assert_eq!(config.normalizer.platforms, vec!["facebook".to_string()]);
        assert_eq!(config.normalizer.kinds.len(), MessageKind::ALL.len());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
http_port = 8088

[analytics]
base_url = "http://localhost:9999"

[normalizer]
kinds = ["incoming_text", "outgoing_template"]
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.http_port, 8088);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.analytics.base_url, "http://localhost:9999");
        assert_eq!(config.analytics.queue_capacity, 10_000);
        assert_eq!(
            config.normalizer.kinds,
            vec![MessageKind::IncomingText, MessageKind::OutgoingTemplate]
        );
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/dialog-bridge.toml")));
        assert!(result.is_err());
    }
}
